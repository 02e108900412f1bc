//! GitHub OAuth authentication
//!
//! Handles:
//! - GitHub OAuth flow
//! - Server-side session storage
//! - Session middleware

pub mod github;
mod middleware;
mod oauth;
pub mod session;

pub use github::{GitHubClient, IdentityProvider};
pub use middleware::CurrentUser;
pub use oauth::auth_router;
pub use session::{MemorySessionStore, SESSION_COOKIE, SessionStore, generate_session_id};
