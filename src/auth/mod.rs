//! Authentication
//!
//! Handles:
//! - Password hashing
//! - Signed session tokens
//! - Request extractors for the acting account

mod middleware;
pub mod password;
pub mod session;

pub use middleware::{AdminUser, CurrentUser, SESSION_COOKIE};
pub use session::{Session, create_session_token, verify_session_token};
