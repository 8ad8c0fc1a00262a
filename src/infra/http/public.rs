use std::io::ErrorKind;

use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tokio::fs;
use tracing::error;
use uuid::Uuid;

use crate::{
    application::{error::AppError, feed::PostDetail},
    infra::uploads::UploadStorageError,
    presentation::views::{
        CommentView, FieldErrorView, FollowTemplate, GroupTemplate, IndexTemplate, PostDetailTemplate,
        PostView, ProfileTemplate, ViewerView, render_not_found_response, render_template_response,
    },
};

use super::{CurrentUser, HttpState, MaybeUser};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct PageQuery {
    pub page: Option<String>,
}

/// Translate errors the handler has no better answer for. NotFound gets the
/// rendered 404 page; everything else falls back to the plain mapping.
pub(super) fn app_error_response(err: AppError) -> Response {
    match err {
        AppError::NotFound => render_not_found_response(),
        other => other.into_response(),
    }
}

pub(super) fn post_detail_template(
    detail: &PostDetail,
    errors: Vec<FieldErrorView>,
) -> PostDetailTemplate {
    PostDetailTemplate {
        post: PostView::from(&detail.post),
        author_post_count: detail.author_post_count,
        comments: detail.comments.iter().map(CommentView::from).collect(),
        errors,
    }
}

pub(super) async fn index(
    State(state): State<HttpState>,
    Query(query): Query<PageQuery>,
) -> Response {
    match state.feed.list_all(query.page.as_deref()).await {
        Ok(page) => render_template_response(
            IndexTemplate {
                title: "Latest updates".to_string(),
                list: (&page).into(),
            },
            StatusCode::OK,
        ),
        Err(err) => app_error_response(err),
    }
}

pub(super) async fn group_index(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    match state.feed.list_by_group(&slug, query.page.as_deref()).await {
        Ok((group, page)) => render_template_response(
            GroupTemplate {
                title: group.title,
                slug: group.slug,
                description: group.description,
                list: (&page).into(),
            },
            StatusCode::OK,
        ),
        Err(err) => app_error_response(err),
    }
}

pub(super) async fn profile(
    State(state): State<HttpState>,
    MaybeUser(viewer): MaybeUser,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    let feed = match state
        .feed
        .list_by_author(&username, query.page.as_deref())
        .await
    {
        Ok(feed) => feed,
        Err(err) => return app_error_response(err),
    };

    let viewer = match viewer {
        Some(user) if user.id == feed.user.id => Some(ViewerView {
            is_self: true,
            is_following: false,
        }),
        Some(user) => match state.follows.is_following(user.id, feed.user.id).await {
            Ok(is_following) => Some(ViewerView {
                is_self: false,
                is_following,
            }),
            Err(err) => return app_error_response(err),
        },
        None => None,
    };

    render_template_response(
        ProfileTemplate {
            username: feed.user.username.clone(),
            post_count: feed.posts.total_items,
            list: (&feed.posts).into(),
            viewer,
        },
        StatusCode::OK,
    )
}

pub(super) async fn post_detail(State(state): State<HttpState>, Path(id): Path<String>) -> Response {
    let Ok(post_id) = Uuid::parse_str(&id) else {
        return render_not_found_response();
    };

    match state.feed.post_detail(post_id).await {
        Ok(detail) => {
            render_template_response(post_detail_template(&detail, Vec::new()), StatusCode::OK)
        }
        Err(err) => app_error_response(err),
    }
}

pub(super) async fn follow_index(
    State(state): State<HttpState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PageQuery>,
) -> Response {
    match state.feed.list_followed(user.id, query.page.as_deref()).await {
        Ok(page) => render_template_response(
            FollowTemplate {
                list: (&page).into(),
            },
            StatusCode::OK,
        ),
        Err(err) => app_error_response(err),
    }
}

pub(super) async fn serve_media(State(state): State<HttpState>, Path(path): Path<String>) -> Response {
    let absolute = match state.uploads.resolve(&path) {
        Ok(absolute) => absolute,
        Err(UploadStorageError::InvalidPath) => return render_not_found_response(),
        Err(err) => {
            error!(path = %path, error = %err, "failed to resolve stored upload");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match fs::read(&absolute).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&absolute).first_or_octet_stream();
            ([(CONTENT_TYPE, mime.as_ref().to_string())], bytes).into_response()
        }
        Err(err) if err.kind() == ErrorKind::NotFound => render_not_found_response(),
        Err(err) => {
            error!(path = %path, error = %err, "failed to read stored upload");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub(super) async fn not_found() -> Response {
    render_not_found_response()
}
