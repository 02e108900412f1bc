//! Photon - GitHub OAuth sign-in service
//!
//! Redirects the browser to GitHub, exchanges the returned
//! authorization code for an access token, fetches the user's
//! identity, and establishes a cookie-based session backed by a
//! TTL key-value store.
//!
//! # Modules
//!
//! - `auth`: OAuth flow, session storage, session middleware
//! - `config`: Configuration management
//! - `error`: Error types
//! - `metrics`: Prometheus instruments

pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;

use std::sync::Arc;

use auth::github::{GitHubClient, IdentityProvider};
use auth::session::{MemorySessionStore, SessionStore};

/// User-Agent the service identifies itself with on provider calls
pub const APP_USER_AGENT: &str = "photon";

/// Application state shared across all handlers
///
/// This struct is cloned for each request and contains the shared
/// collaborators: configuration, session store, and identity provider
/// client.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Session store (identifier -> identity, TTL-bound)
    pub sessions: Arc<dyn SessionStore>,

    /// Identity provider client (GitHub)
    pub github: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Initialize application state with production collaborators.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be constructed
    pub fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        let http_client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| error::AppError::Internal(e.into()))?;

        let sessions =
            MemorySessionStore::new(chrono::Duration::seconds(config.session.ttl_seconds));
        let github = GitHubClient::new(config.auth.github.clone(), http_client);

        Ok(Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            github: Arc::new(github),
        })
    }

    /// Build state from explicit collaborators.
    ///
    /// Used by integration tests to substitute deterministic fakes for
    /// the session store or the identity provider.
    pub fn with_collaborators(
        config: config::AppConfig,
        sessions: Arc<dyn SessionStore>,
        github: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            sessions,
            github,
        }
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::trace::TraceLayer;

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(auth::auth_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .merge(metrics::metrics_router())
}

async fn health_check() -> &'static str {
    "OK"
}
