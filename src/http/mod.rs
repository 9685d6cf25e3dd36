//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layer stack)
//!     → request.rs (request ID)
//!     → middleware/session.rs (cookie → CurrentUser)
//!     → domain handlers (orgs / incidents / compliance / health)
//!     → response.rs (HTML fragments, wire headers)
//! ```

pub mod auth;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
