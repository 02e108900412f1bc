//! Session middleware
//!
//! Resolves the session cookie against the session store and exposes
//! the authenticated identity to handlers.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;

use super::session::SESSION_COOKIE;
use crate::AppState;
use crate::error::AppError;

/// Extractor for the current authenticated user
///
/// Reads the `session_id` cookie and looks the identifier up in the
/// session store. Rejects with 401 when the cookie is absent or the
/// store has no live entry for it.
///
/// # Usage
/// ```ignore
/// async fn handler(CurrentUser(username): CurrentUser) -> String {
///     format!("Welcome, {username}")
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let jar = CookieJar::from_headers(&parts.headers);
        let session_id = jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_owned())
            .ok_or(AppError::Unauthorized)?;

        let username = state
            .sessions
            .get(&session_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(CurrentUser(username))
    }
}
