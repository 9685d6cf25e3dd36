//! HTML-over-the-wire compliance console.

pub mod compliance;
pub mod config;
pub mod health;
pub mod http;
pub mod incidents;
pub mod lifecycle;
pub mod observability;
pub mod orgs;
pub mod security;
pub mod shell;
pub mod store;
pub mod ui;

pub use config::schema::ConsoleConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use shell::{BusyIndicator, Shell};
