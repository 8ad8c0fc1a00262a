//! Authenticated mutations: posting, editing, commenting, following.
//!
//! Validation failures re-render the originating form with the field errors
//! attached; successful mutations answer with a 302 back to a GET page.

use axum::{
    Form,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use crate::{
    application::{error::AppError, forms::PostInput},
    presentation::views::{
        FieldErrorView, GroupOptionView, PostFormTemplate, field_error_views,
        render_not_found_response, render_template_response,
    },
};

use super::{
    CurrentUser, HttpState, found,
    public::{app_error_response, post_detail_template},
};

async fn post_form_response(
    state: &HttpState,
    is_edit: bool,
    action: String,
    input: &PostInput,
    errors: Vec<FieldErrorView>,
) -> Response {
    let groups = match state.feed.list_groups().await {
        Ok(groups) => groups,
        Err(err) => return app_error_response(err),
    };

    render_template_response(
        PostFormTemplate {
            is_edit,
            action,
            text: input.text.clone(),
            selected_group: input.group.clone().unwrap_or_default(),
            groups: groups.iter().map(GroupOptionView::from).collect(),
            errors,
        },
        StatusCode::OK,
    )
}

/// Pull the post form fields out of a multipart submission, storing the
/// image payload if one was attached.
async fn read_post_form(
    state: &HttpState,
    mut multipart: Multipart,
) -> Result<(PostInput, Option<String>), Response> {
    let mut input = PostInput::default();
    let mut image = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(_) => {
                return Err(
                    (StatusCode::BAD_REQUEST, "Malformed form submission").into_response()
                );
            }
        };

        match field.name() {
            Some("text") => {
                input.text = field.text().await.map_err(|_| {
                    (StatusCode::BAD_REQUEST, "Malformed form submission").into_response()
                })?;
            }
            Some("group") => {
                input.group = Some(field.text().await.map_err(|_| {
                    (StatusCode::BAD_REQUEST, "Malformed form submission").into_response()
                })?);
            }
            Some("image") => {
                let file_name = field.file_name().map(str::to_string);
                let data = field.bytes().await.map_err(|_| {
                    (StatusCode::BAD_REQUEST, "Malformed form submission").into_response()
                })?;
                // Browsers submit an empty part when no file was picked.
                if !data.is_empty() {
                    let stored = state
                        .uploads
                        .store_image(file_name.as_deref(), data)
                        .await
                        .map_err(|err| {
                            error!(error = %err, "failed to store uploaded image");
                            StatusCode::INTERNAL_SERVER_ERROR.into_response()
                        })?;
                    image = Some(stored);
                }
            }
            _ => {}
        }
    }

    Ok((input, image))
}

pub(super) async fn create_form(
    State(state): State<HttpState>,
    CurrentUser(_user): CurrentUser,
) -> Response {
    post_form_response(
        &state,
        false,
        "/create/".to_string(),
        &PostInput::default(),
        Vec::new(),
    )
    .await
}

pub(super) async fn create_submit(
    State(state): State<HttpState>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> Response {
    let (input, image) = match read_post_form(&state, multipart).await {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };

    match state.posts.create(user.id, &input, image).await {
        Ok(_) => found(&format!("/profile/{}/", user.username)),
        Err(AppError::Validation(errors)) => {
            post_form_response(
                &state,
                false,
                "/create/".to_string(),
                &input,
                field_error_views(&errors),
            )
            .await
        }
        Err(err) => app_error_response(err),
    }
}

pub(super) async fn edit_form(
    State(state): State<HttpState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Response {
    let Ok(post_id) = Uuid::parse_str(&id) else {
        return render_not_found_response();
    };

    let detail = match state.feed.post_detail(post_id).await {
        Ok(detail) => detail,
        Err(err) => return app_error_response(err),
    };

    // Only the author gets the edit form; everyone else lands on the post.
    if detail.post.author_id != user.id {
        return found(&format!("/posts/{post_id}/"));
    }

    let input = PostInput {
        text: detail.post.text.clone(),
        group: detail.post.group.as_ref().map(|group| group.id.to_string()),
    };

    post_form_response(
        &state,
        true,
        format!("/posts/{post_id}/edit/"),
        &input,
        Vec::new(),
    )
    .await
}

pub(super) async fn edit_submit(
    State(state): State<HttpState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Response {
    let Ok(post_id) = Uuid::parse_str(&id) else {
        return render_not_found_response();
    };

    let (input, image) = match read_post_form(&state, multipart).await {
        Ok(parsed) => parsed,
        Err(response) => return response,
    };

    match state.posts.edit(post_id, user.id, &input, image).await {
        Ok(post) => found(&format!("/posts/{}/", post.id)),
        Err(AppError::Forbidden) => found(&format!("/posts/{post_id}/")),
        Err(AppError::Validation(errors)) => {
            post_form_response(
                &state,
                true,
                format!("/posts/{post_id}/edit/"),
                &input,
                field_error_views(&errors),
            )
            .await
        }
        Err(err) => app_error_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CommentForm {
    #[serde(default)]
    text: String,
}

pub(super) async fn add_comment(
    State(state): State<HttpState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Form(form): Form<CommentForm>,
) -> Response {
    let Ok(post_id) = Uuid::parse_str(&id) else {
        return render_not_found_response();
    };

    match state.comments.add(post_id, user.id, &form.text).await {
        Ok(_) => found(&format!("/posts/{post_id}/")),
        Err(AppError::Validation(errors)) => {
            // Re-render the detail page with the form errors attached.
            match state.feed.post_detail(post_id).await {
                Ok(detail) => render_template_response(
                    post_detail_template(&detail, field_error_views(&errors)),
                    StatusCode::OK,
                ),
                Err(err) => app_error_response(err),
            }
        }
        Err(err) => app_error_response(err),
    }
}

pub(super) async fn follow_author(
    State(state): State<HttpState>,
    CurrentUser(user): CurrentUser,
    Path(username): Path<String>,
) -> Response {
    match state.follows.follow(user.id, &username).await {
        Ok(author) => found(&format!("/profile/{}/", author.username)),
        Err(err) => app_error_response(err),
    }
}

pub(super) async fn unfollow_author(
    State(state): State<HttpState>,
    CurrentUser(user): CurrentUser,
    Path(username): Path<String>,
) -> Response {
    match state.follows.unfollow(user.id, &username).await {
        Ok(author) => found(&format!("/profile/{}/", author.username)),
        Err(err) => app_error_response(err),
    }
}
