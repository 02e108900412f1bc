//! GitHub identity provider client
//!
//! Encapsulates the two outbound calls of the authorization code flow:
//! exchanging the code for an access token, and fetching the
//! authenticated user's login with that token.

use axum::async_trait;
use serde::Deserialize;

use crate::config::GitHubOAuthConfig;
use crate::error::AppError;

/// Pinned GitHub REST API version sent on user-info requests
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Identity provider operations needed by the callback handler.
///
/// Abstracted so tests can substitute deterministic fakes for the
/// real network calls.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<String, AppError>;

    /// Fetch the login of the user the token belongs to.
    ///
    /// Returns `None` when the provider answered successfully but the
    /// response carried no usable handle.
    async fn fetch_username(&self, access_token: &str) -> Result<Option<String>, AppError>;
}

/// GitHub token response
#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: Option<String>,
}

/// GitHub user info
#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: Option<String>,
}

/// Identity provider client backed by the GitHub REST API
pub struct GitHubClient {
    config: GitHubOAuthConfig,
    http_client: reqwest::Client,
}

impl GitHubClient {
    pub fn new(config: GitHubOAuthConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }
}

#[async_trait]
impl IdentityProvider for GitHubClient {
    async fn exchange_code(&self, code: &str) -> Result<String, AppError> {
        let response = self
            .http_client
            .post(&self.config.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&serde_json::json!({
                "client_id": self.config.client_id,
                "client_secret": self.config.client_secret,
                "code": code,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(
                status = %response.status(),
                "GitHub token endpoint returned an error"
            );
            return Err(AppError::Upstream(
                "Failed to get an access token".to_string(),
            ));
        }

        let body: AccessTokenResponse = response.json().await?;
        body.access_token.ok_or_else(|| {
            tracing::warn!("GitHub token response carried no access token");
            AppError::Upstream("Failed to get an access token".to_string())
        })
    }

    async fn fetch_username(&self, access_token: &str) -> Result<Option<String>, AppError> {
        let response = self
            .http_client
            .get(&self.config.user_url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(
                status = %response.status(),
                "GitHub user endpoint returned an error"
            );
            return Err(AppError::Upstream(
                "Failed to get the user info".to_string(),
            ));
        }

        let user: GitHubUser = response.json().await?;
        Ok(user.login)
    }
}
