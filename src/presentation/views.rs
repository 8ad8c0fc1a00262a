//! View structs and template rendering helpers.
//!
//! Handlers build these from domain records; everything the templates print
//! is preformatted here so the templates stay logic-free.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::application::forms::FieldError;
use crate::application::pagination::Paginated;
use crate::domain::entities::{CommentRecord, GroupRecord, PostRecord};

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute] UTC");

fn format_timestamp(value: OffsetDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).unwrap_or_default()
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "template rendering failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Template rendering failed",
            )
                .into_response()
        }
    }
}

pub fn render_not_found_response() -> Response {
    render_template_response(NotFoundTemplate {}, StatusCode::NOT_FOUND)
}

#[derive(Clone)]
pub struct GroupLinkView {
    pub title: String,
    pub slug: String,
}

#[derive(Clone)]
pub struct PostView {
    pub id: String,
    pub text: String,
    pub author: String,
    pub published: String,
    pub group: Option<GroupLinkView>,
    pub image: Option<String>,
}

impl From<&PostRecord> for PostView {
    fn from(post: &PostRecord) -> Self {
        Self {
            id: post.id.to_string(),
            text: post.text.clone(),
            author: post.author_username.clone(),
            published: format_timestamp(post.pub_date),
            group: post.group.as_ref().map(|group| GroupLinkView {
                title: group.title.clone(),
                slug: group.slug.clone(),
            }),
            image: post.image.clone(),
        }
    }
}

#[derive(Clone)]
pub struct CommentView {
    pub author: String,
    pub text: String,
    pub created: String,
}

impl From<&CommentRecord> for CommentView {
    fn from(comment: &CommentRecord) -> Self {
        Self {
            author: comment.author_username.clone(),
            text: comment.text.clone(),
            created: format_timestamp(comment.created),
        }
    }
}

#[derive(Clone)]
pub struct PageNavView {
    pub page: u32,
    pub total_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page: u32,
    pub next_page: u32,
}

/// One page of posts plus pager controls, shared by every listing template.
#[derive(Clone)]
pub struct PostListView {
    pub posts: Vec<PostView>,
    pub nav: PageNavView,
}

impl From<&Paginated<PostRecord>> for PostListView {
    fn from(page: &Paginated<PostRecord>) -> Self {
        Self {
            posts: page.items.iter().map(PostView::from).collect(),
            nav: PageNavView {
                page: page.page,
                total_pages: page.total_pages,
                has_previous: page.has_previous(),
                has_next: page.has_next(),
                previous_page: page.page.saturating_sub(1).max(1),
                next_page: page.page.saturating_add(1).min(page.total_pages),
            },
        }
    }
}

#[derive(Clone)]
pub struct FieldErrorView {
    pub field: String,
    pub message: String,
}

pub fn field_error_views(errors: &[FieldError]) -> Vec<FieldErrorView> {
    errors
        .iter()
        .map(|error| FieldErrorView {
            field: error.field.to_string(),
            message: error.message.clone(),
        })
        .collect()
}

#[derive(Clone)]
pub struct GroupOptionView {
    pub id: String,
    pub title: String,
}

impl From<&GroupRecord> for GroupOptionView {
    fn from(group: &GroupRecord) -> Self {
        Self {
            id: group.id.to_string(),
            title: group.title.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ViewerView {
    pub is_self: bool,
    pub is_following: bool,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub list: PostListView,
}

#[derive(Template)]
#[template(path = "group_list.html")]
pub struct GroupTemplate {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub list: PostListView,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub username: String,
    pub post_count: u64,
    pub list: PostListView,
    pub viewer: Option<ViewerView>,
}

#[derive(Template)]
#[template(path = "post_detail.html")]
pub struct PostDetailTemplate {
    pub post: PostView,
    pub author_post_count: u64,
    pub comments: Vec<CommentView>,
    pub errors: Vec<FieldErrorView>,
}

#[derive(Template)]
#[template(path = "post_form.html")]
pub struct PostFormTemplate {
    pub is_edit: bool,
    pub action: String,
    pub text: String,
    pub selected_group: String,
    pub groups: Vec<GroupOptionView>,
    pub errors: Vec<FieldErrorView>,
}

#[derive(Template)]
#[template(path = "follow.html")]
pub struct FollowTemplate {
    pub list: PostListView,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {}
