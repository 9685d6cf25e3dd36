//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::sync::mpsc;

use wire_console::config::schema::LoginRateLimitConfig;
use wire_console::config::{ConsoleConfig, UserConfig};
use wire_console::http::server::AppState;
use wire_console::lifecycle::Shutdown;
use wire_console::security::sessions::hash_password;
use wire_console::HttpServer;

/// Build a config with the given (username, password) accounts. Login
/// rate limits are opened up so tests can sign in freely.
pub fn test_config(users: &[(&str, &str)]) -> ConsoleConfig {
    let mut config = ConsoleConfig::default();
    config.security.login = LoginRateLimitConfig { rps: 100, burst: 200 };
    for (username, password) in users {
        config.users.push(UserConfig {
            username: (*username).to_string(),
            password_sha256: hash_password(password),
            email: format!("{}@example.com", username),
            display_name: String::new(),
        });
    }
    config
}

/// Start a console on `addr`. Returns the shutdown handle and the shared
/// state, so tests can assert on the store directly.
pub async fn start_console(addr: SocketAddr, mut config: ConsoleConfig) -> (Shutdown, AppState) {
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let (_, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config);
    let state = server.state().clone();
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    // Wait for the server to start accepting.
    tokio::time::sleep(Duration::from_millis(200)).await;

    (shutdown, state)
}
