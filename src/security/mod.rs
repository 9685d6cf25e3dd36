//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! POST /login
//!     → rate_limit.rs (per-IP token bucket)
//!     → sessions.rs (digest check, session issue)
//!     → Set-Cookie
//!
//! Authenticated request:
//!     → session cookie looked up (http/middleware/session.rs)
//!     → CurrentUser attached to request extensions
//! ```
//!
//! # Design Decisions
//! - Fail closed: a missing or expired session never falls through
//! - Passwords only ever exist as SHA-256 digests, in config and memory

pub mod rate_limit;
pub mod sessions;

pub use sessions::{CurrentUser, SessionStore};
