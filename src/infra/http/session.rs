//! Cookie-backed session lookup.
//!
//! Authentication itself (login, registration, password handling) lives in a
//! separate service; this side only resolves an opaque session token to the
//! account it was issued for. Requests that require an account are redirected
//! to the login page with a `next` parameter pointing back.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::Response,
};
use axum_extra::extract::CookieJar;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::entities::UserRecord;

use super::{HttpState, found};

pub const SESSION_COOKIE: &str = "sid";

/// The account a session token resolves to.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: Uuid,
    pub username: String,
}

/// In-process session registry mapping opaque tokens to accounts.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, AuthedUser>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh token for the given account.
    pub fn issue(&self, user: &UserRecord) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.insert(
            token.clone(),
            AuthedUser {
                id: user.id,
                username: user.username.clone(),
            },
        );
        token
    }

    pub fn resolve(&self, token: &str) -> Option<AuthedUser> {
        self.sessions.get(token).map(|entry| entry.clone())
    }

    pub fn revoke(&self, token: &str) {
        self.sessions.remove(token);
    }
}

fn session_user<S>(parts: &Parts, state: &S) -> Option<AuthedUser>
where
    HttpState: FromRef<S>,
{
    let state = HttpState::from_ref(state);
    let jar = CookieJar::from_headers(&parts.headers);
    let token = jar.get(SESSION_COOKIE)?;
    state.sessions.resolve(token.value())
}

/// Extractor for routes that require an account. Anonymous requests are
/// redirected to the login page with `next` pointing back at the original
/// path.
pub struct CurrentUser(pub AuthedUser);

impl<S> FromRequestParts<S> for CurrentUser
where
    HttpState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match session_user(parts, state) {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or("/");
                // The original target may carry its own query string, so it
                // must not appear verbatim inside the login URL's query.
                let next = urlencoding::encode(next);
                Err(found(&format!("/auth/login/?next={next}")))
            }
        }
    }
}

/// Extractor for routes that adapt to the viewer but stay public.
pub struct MaybeUser(pub Option<AuthedUser>);

impl<S> FromRequestParts<S> for MaybeUser
where
    HttpState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(session_user(parts, state)))
    }
}
