mod actions;
mod middleware;
mod public;
mod session;

pub use session::{AuthedUser, CurrentUser, MaybeUser, SESSION_COOKIE, SessionStore};

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, StatusCode, header::LOCATION},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    application::{
        comments::CommentService, feed::FeedService, follows::FollowService, posts::PostService,
    },
    cache::{CacheState, page_cache_layer},
    infra::uploads::UploadStorage,
};

#[derive(Clone)]
pub struct HttpState {
    pub feed: Arc<FeedService>,
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub follows: Arc<FollowService>,
    pub sessions: Arc<SessionStore>,
    pub uploads: Arc<UploadStorage>,
    pub cache: Option<CacheState>,
}

/// A plain 302 pointing at `location`. Mutations answer with this so a
/// browser lands back on a regular GET page.
pub fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(LOCATION, value)]).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

pub fn build_router(state: HttpState) -> Router {
    // Only the front page is cached; every other page either depends on the
    // viewer or is a mutation target.
    let cached_routes = Router::new().route("/", get(public::index));

    let cached_routes = if let Some(cache_state) = state.cache.clone() {
        cached_routes.layer(from_fn_with_state(cache_state, page_cache_layer))
    } else {
        cached_routes
    };

    let uncached_routes = Router::new()
        .route("/group/{slug}/", get(public::group_index))
        .route("/profile/{username}/", get(public::profile))
        .route("/profile/{username}/follow", post(actions::follow_author))
        .route(
            "/profile/{username}/unfollow",
            post(actions::unfollow_author),
        )
        .route("/posts/{id}/", get(public::post_detail))
        .route(
            "/posts/{id}/edit/",
            get(actions::edit_form).post(actions::edit_submit),
        )
        .route("/posts/{id}/comment", post(actions::add_comment))
        .route(
            "/create/",
            get(actions::create_form).post(actions::create_submit),
        )
        .route("/follow/", get(public::follow_index))
        .route("/media/{*path}", get(public::serve_media));

    cached_routes
        .merge(uncached_routes)
        .fallback(public::not_found)
        .with_state(state)
        .layer(from_fn(middleware::log_responses))
}
