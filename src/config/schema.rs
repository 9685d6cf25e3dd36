//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! console. All types derive Serde traits for deserialization from config
//! files.

use serde::{Deserialize, Serialize};

/// Root configuration for the console.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Shell / UI settings.
    pub ui: UiConfig,

    /// Invitation settings.
    pub invites: InviteConfig,

    /// Incident reporting settings.
    pub incidents: IncidentConfig,

    /// Session and login protection settings.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Accounts allowed to sign in.
    pub users: Vec<UserConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes. Form posts are small; this is
    /// a ceiling, not a tuning knob.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Shell / UI settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiConfig {
    /// Class held on the document root while wire requests are in flight.
    pub busy_class: String,

    /// Console title rendered into the page shell.
    pub title: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            busy_class: "hx-busy".to_string(),
            title: "Wire Console".to_string(),
        }
    }
}

/// Invitation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InviteConfig {
    /// Days until a pending invite expires.
    pub expiry_days: i64,
}

impl Default for InviteConfig {
    fn default() -> Self {
        Self { expiry_days: 7 }
    }
}

/// Incident reporting settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IncidentConfig {
    /// Hours from awareness to the reporting deadline.
    pub report_window_hours: i64,
}

impl Default for IncidentConfig {
    fn default() -> Self {
        Self {
            report_window_hours: 72,
        }
    }
}

/// Session and login protection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Seconds a session stays valid after login.
    pub session_ttl_secs: u64,

    /// Login attempt rate limiting.
    pub login: LoginRateLimitConfig,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 24 * 60 * 60,
            login: LoginRateLimitConfig::default(),
        }
    }
}

/// Token-bucket limits applied to login attempts, keyed by client IP.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoginRateLimitConfig {
    /// Sustained attempts per second.
    pub rps: u32,

    /// Burst capacity.
    pub burst: u32,
}

impl Default for LoginRateLimitConfig {
    fn default() -> Self {
        Self { rps: 5, burst: 10 }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus metrics exporter.
    pub metrics_enabled: bool,

    /// Address the metrics exporter binds to.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// An account allowed to sign in to the console.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserConfig {
    /// Login name, unique across users.
    pub username: String,

    /// Hex-encoded SHA-256 digest of the password.
    pub password_sha256: String,

    /// Contact email, used to match invites.
    #[serde(default)]
    pub email: String,

    /// Name shown in member panels. Falls back to the username.
    #[serde(default)]
    pub display_name: String,
}
