//! GitHub OAuth flow
//!
//! Implements the OAuth 2.0 authorization code flow with GitHub and
//! the session routes gated on it.

use axum::{
    Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;

use super::middleware::CurrentUser;
use super::session::{SESSION_COOKIE, generate_session_id};
use crate::AppState;
use crate::error::AppError;
use crate::metrics::{OAUTH_CALLBACKS_TOTAL, SESSIONS_CREATED_TOTAL, SIGNIN_REDIRECTS_TOTAL};

/// Create authentication router
///
/// Routes:
/// - GET /signin - Redirect to the GitHub authorization page
/// - GET /callback - OAuth callback
/// - GET /test - Protected greeting
/// - GET /signout - Clear session
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/signin", get(signin))
        .route("/callback", get(callback))
        .route("/test", get(protected))
        .route("/signout", get(signout))
}

// =============================================================================
// Sign-in
// =============================================================================

/// GET /signin
///
/// Unconditionally redirects the browser to the GitHub authorization
/// page, embedding the public client identifier. No local state is
/// created.
async fn signin(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let github = &state.config.auth.github;

    let mut authorize_url = url::Url::parse(&github.authorize_url)
        .map_err(|e| AppError::Config(format!("invalid authorize URL: {e}")))?;
    authorize_url
        .query_pairs_mut()
        .append_pair("client_id", &github.client_id);

    SIGNIN_REDIRECTS_TOTAL.inc();
    Ok(redirect_found(authorize_url.as_str()))
}

// =============================================================================
// Callback
// =============================================================================

/// Query parameters from the GitHub callback
#[derive(Debug, Deserialize)]
struct CallbackParams {
    /// Authorization code
    code: String,
}

/// GET /callback
///
/// Handles the OAuth callback from GitHub.
///
/// # Steps
/// 1. Validate the `code` query parameter (before any outbound call)
/// 2. Exchange the code for an access token
/// 3. Fetch the user's login with the token
/// 4. Write the session to the store, then set the cookie
/// 5. Redirect to /test
async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    if params.code.trim().is_empty() {
        OAUTH_CALLBACKS_TOTAL.with_label_values(&["invalid_code"]).inc();
        return Err(AppError::Validation("Bad Request".to_string()));
    }

    match establish_session(&state, &params.code, jar).await {
        Ok(response) => {
            OAUTH_CALLBACKS_TOTAL.with_label_values(&["success"]).inc();
            Ok(response.into_response())
        }
        Err(error) => {
            OAUTH_CALLBACKS_TOTAL.with_label_values(&["failure"]).inc();
            Err(error)
        }
    }
}

/// Drive the callback state machine: token exchange, identity
/// resolution, session creation.
///
/// The access token lives only on this stack frame and is never
/// persisted or logged.
async fn establish_session(
    state: &AppState,
    code: &str,
    jar: CookieJar,
) -> Result<(CookieJar, Response), AppError> {
    let access_token = state.github.exchange_code(code).await?;

    let username = state
        .github
        .fetch_username(&access_token)
        .await?
        .ok_or(AppError::IdentityUnresolved)?;

    let session_id = generate_session_id();
    let ttl_seconds = state.config.session.ttl_seconds;

    // The store write must succeed before the browser learns the
    // identifier; a failed write therefore never leaves a cookie
    // pointing at nothing.
    state
        .sessions
        .put(&session_id, &username, chrono::Duration::seconds(ttl_seconds))
        .await?;

    SESSIONS_CREATED_TOTAL.inc();
    tracing::info!(username = %username, "Session established");

    let cookie = session_cookie(session_id, ttl_seconds);
    Ok((jar.add(cookie), redirect_found("/test")))
}

// =============================================================================
// Protected resource
// =============================================================================

/// GET /test
///
/// Greets the signed-in user. `CurrentUser` rejects with 401 when no
/// valid session is presented.
async fn protected(CurrentUser(username): CurrentUser) -> String {
    format!("Welcome, {username}")
}

// =============================================================================
// Sign-out
// =============================================================================

/// GET /signout
///
/// Deletes the session store entry and instructs the browser to drop
/// the cookie. A missing cookie is a no-op success; a store deletion
/// failure surfaces as a server error.
async fn signout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, &'static str), AppError> {
    let session_id = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_owned());
    let Some(session_id) = session_id else {
        return Ok((jar, "Signed out"));
    };

    state.sessions.delete(&session_id).await?;
    tracing::info!("Session deleted");

    // Empty value plus a negative max-age makes the browser discard
    // the cookie immediately.
    Ok((jar.add(session_cookie(String::new(), -60)), "Signed out"))
}

// =============================================================================
// Helpers
// =============================================================================

/// 302 Found redirect. `axum::response::Redirect` sends 303/307/308,
/// none of which match the browser-facing flow here.
fn redirect_found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}

/// Build the session cookie: HTTP-only, secure, SameSite=None (the
/// OAuth redirect is cross-site), root path scope.
fn session_cookie(value: String, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(time::Duration::seconds(max_age_seconds))
        .path("/")
        .build()
}
