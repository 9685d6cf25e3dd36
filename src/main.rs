//! wire-console
//!
//! An incident & compliance console served as HTML over the wire,
//! built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌─────────────────────────────────────────────┐
//!                        │                 WIRE CONSOLE                 │
//!                        │                                              │
//!     Wire request       │  ┌─────────┐    ┌───────────┐   ┌─────────┐ │
//!     ───────────────────┼─▶│  http   │───▶│ sessions  │──▶│ domain  │ │
//!     (HX-Request)       │  │ server  │    │middleware │   │handlers │ │
//!                        │  └─────────┘    └───────────┘   └────┬────┘ │
//!                        │                                      │      │
//!                        │                                      ▼      │
//!     HTML fragment      │  ┌─────────┐    ┌───────────┐   ┌─────────┐ │
//!     ◀──────────────────┼──│   ui    │◀───│  orgs /   │◀──│  store  │ │
//!                        │  │fragments│    │ incidents │   │(dashmap)│ │
//!                        │  └─────────┘    └───────────┘   └─────────┘ │
//!                        │                                              │
//!                        │  ┌────────────────────────────────────────┐ │
//!                        │  │          Cross-Cutting Concerns         │ │
//!                        │  │  config · health · observability ·      │ │
//!                        │  │  security · lifecycle                   │ │
//!                        │  └────────────────────────────────────────┘ │
//!                        └─────────────────────────────────────────────┘
//!
//!     Client side: shell::WireRuntime issues the requests and feeds the
//!     lifecycle events the shell::BusyIndicator hooks consume.
//! ```

use std::path::PathBuf;

use tokio::net::TcpListener;

use wire_console::config::loader::load_config;
use wire_console::config::watcher::ConfigWatcher;
use wire_console::config::ConsoleConfig;
use wire_console::http::HttpServer;
use wire_console::lifecycle::{signals, Shutdown};
use wire_console::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init("wire_console=debug,tower_http=debug");

    tracing::info!("wire-console v{} starting", env!("CARGO_PKG_VERSION"));

    // Load configuration; fall back to defaults when no file is given.
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let (config, watcher_handle, config_updates) = match &config_path {
        Some(path) => {
            let config = load_config(path)?;
            let (watcher, updates) = ConfigWatcher::new(path);
            let handle = watcher.run()?;
            (config, Some(handle), updates)
        }
        None => {
            tracing::warn!("No config file given, using defaults (no accounts!)");
            let (_tx, updates) = tokio::sync::mpsc::unbounded_channel::<ConsoleConfig>();
            (ConsoleConfig::default(), None, updates)
        }
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        users = config.users.len(),
        "Configuration loaded"
    );

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(address = %local_addr, "Listening for connections");

    // Metrics exporter
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Shutdown coordination: signals trigger the broadcast.
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    // Create and run the HTTP server
    let server = HttpServer::new(config);
    server.run(listener, config_updates, server_shutdown).await?;

    drop(watcher_handle);
    tracing::info!("Shutdown complete");
    Ok(())
}
