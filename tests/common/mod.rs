//! Common test utilities for E2E tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use photon::auth::github::GitHubClient;
use photon::auth::session::{MemorySessionStore, SessionStore};
use photon::error::AppError;
use photon::{AppState, config};
use tokio::net::TcpListener;

// =============================================================================
// Stub GitHub provider
// =============================================================================

/// Scripted behavior for the stub GitHub provider
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StubBehavior {
    /// Token and user endpoints both succeed
    Success,
    /// Token endpoint returns a non-success status
    TokenError,
    /// Token endpoint returns 200 with no access_token field
    TokenMissing,
    /// User endpoint returns a non-success status
    UserError,
    /// User endpoint returns 200 with no login field
    UserMissingLogin,
}

#[derive(Clone)]
struct StubState {
    behavior: StubBehavior,
    token_calls: Arc<AtomicUsize>,
    user_calls: Arc<AtomicUsize>,
}

/// Stub GitHub provider spawned on an ephemeral port
///
/// Serves the token and user endpoints the real provider would, with
/// call counters so tests can assert how many outbound calls the
/// service actually made.
pub struct StubGitHub {
    pub base_url: String,
    token_calls: Arc<AtomicUsize>,
    user_calls: Arc<AtomicUsize>,
}

impl StubGitHub {
    pub async fn spawn(behavior: StubBehavior) -> Self {
        let token_calls = Arc::new(AtomicUsize::new(0));
        let user_calls = Arc::new(AtomicUsize::new(0));
        let state = StubState {
            behavior,
            token_calls: token_calls.clone(),
            user_calls: user_calls.clone(),
        };

        let app = Router::new()
            .route("/login/oauth/access_token", post(stub_token))
            .route("/user", get(stub_user))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            token_calls,
            user_calls,
        }
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    pub fn user_calls(&self) -> usize {
        self.user_calls.load(Ordering::SeqCst)
    }
}

async fn stub_token(State(state): State<StubState>) -> axum::response::Response {
    state.token_calls.fetch_add(1, Ordering::SeqCst);

    match state.behavior {
        StubBehavior::TokenError => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "server_error" })),
        )
            .into_response(),
        StubBehavior::TokenMissing => {
            Json(serde_json::json!({ "error": "bad_verification_code" })).into_response()
        }
        _ => Json(serde_json::json!({
            "access_token": "gho_test_token",
            "scope": "",
            "token_type": "bearer",
        }))
        .into_response(),
    }
}

async fn stub_user(State(state): State<StubState>) -> axum::response::Response {
    state.user_calls.fetch_add(1, Ordering::SeqCst);

    match state.behavior {
        StubBehavior::UserError => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "message": "boom" })),
        )
            .into_response(),
        StubBehavior::UserMissingLogin => Json(serde_json::json!({ "id": 1 })).into_response(),
        _ => Json(serde_json::json!({ "login": "octocat", "id": 1 })).into_response(),
    }
}

// =============================================================================
// Failing session store
// =============================================================================

/// Session store fake whose every operation fails
///
/// Used to assert that store failures surface as server errors and
/// never leave a cookie behind.
pub struct FailingSessionStore;

#[axum::async_trait]
impl SessionStore for FailingSessionStore {
    async fn get(&self, _session_id: &str) -> Result<Option<String>, AppError> {
        Err(AppError::SessionStore("store unavailable".to_string()))
    }

    async fn put(
        &self,
        _session_id: &str,
        _username: &str,
        _ttl: chrono::Duration,
    ) -> Result<(), AppError> {
        Err(AppError::SessionStore("store unavailable".to_string()))
    }

    async fn delete(&self, _session_id: &str) -> Result<(), AppError> {
        Err(AppError::SessionStore("store unavailable".to_string()))
    }
}

// =============================================================================
// Test server
// =============================================================================

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub sessions: Arc<MemorySessionStore>,
    pub github: StubGitHub,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server with a well-behaved provider stub
    pub async fn new() -> Self {
        Self::with_behavior(StubBehavior::Success).await
    }

    /// Create a new test server with a scripted provider stub
    pub async fn with_behavior(behavior: StubBehavior) -> Self {
        let github_stub = StubGitHub::spawn(behavior).await;
        let config = test_config(&github_stub.base_url);

        let sessions = Arc::new(MemorySessionStore::new(chrono::Duration::seconds(
            config.session.ttl_seconds,
        )));
        let state = AppState::with_collaborators(
            config.clone(),
            sessions.clone(),
            Arc::new(GitHubClient::new(
                config.auth.github.clone(),
                http_client(),
            )),
        );

        let addr = spawn_app(state).await;

        Self {
            addr,
            sessions,
            github: github_stub,
            client: no_redirect_client(),
        }
    }

    /// Create a test server whose session store always fails
    pub async fn with_failing_store() -> Self {
        let github_stub = StubGitHub::spawn(StubBehavior::Success).await;
        let config = test_config(&github_stub.base_url);

        // Kept around only so the struct shape stays uniform; the
        // router never sees this store.
        let sessions = Arc::new(MemorySessionStore::new(chrono::Duration::seconds(
            config.session.ttl_seconds,
        )));
        let state = AppState::with_collaborators(
            config.clone(),
            Arc::new(FailingSessionStore),
            Arc::new(GitHubClient::new(
                config.auth.github.clone(),
                http_client(),
            )),
        );

        let addr = spawn_app(state).await;

        Self {
            addr,
            sessions,
            github: github_stub,
            client: no_redirect_client(),
        }
    }

    /// Get base URL for requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }
}

async fn spawn_app(state: AppState) -> String {
    let app = photon::build_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Wait a bit for server to start
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

    format!("http://{}", addr)
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(photon::APP_USER_AGENT)
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .unwrap()
}

fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .unwrap()
}

/// Test configuration pointing the provider client at the stub
fn test_config(github_base: &str) -> config::AppConfig {
    config::AppConfig {
        server: config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        auth: config::AuthConfig {
            github: config::GitHubOAuthConfig {
                client_id: "test-client-id".to_string(),
                client_secret: "test-client-secret".to_string(),
                authorize_url: format!("{}/login/oauth/authorize", github_base),
                token_url: format!("{}/login/oauth/access_token", github_base),
                user_url: format!("{}/user", github_base),
            },
        },
        session: config::SessionConfig { ttl_seconds: 86_400 },
        logging: config::LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}
