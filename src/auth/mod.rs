//! Identity provider authentication
//!
//! Handles:
//! - OAuth flow against the provider
//! - Session management
//! - Page authentication middleware

mod middleware;
mod oauth;
pub mod session;

pub use middleware::{CurrentUser, SESSION_COOKIE, require_session};
pub use oauth::auth_router;
pub use session::{Session, create_session_token, verify_session_token};
