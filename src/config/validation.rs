//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Detect duplicate accounts and malformed password digests
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: ConsoleConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::ConsoleConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidBindAddress(String),
    InvalidMetricsAddress(String),
    ZeroRequestTimeout,
    ZeroBodyLimit,
    EmptyBusyClass,
    BusyClassHasWhitespace(String),
    NonPositiveInviteExpiry(i64),
    NonPositiveReportWindow(i64),
    ZeroSessionTtl,
    EmptyUsername,
    DuplicateUsername(String),
    BadPasswordDigest(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "listener.bind_address '{}' is not a socket address", addr)
            }
            ValidationError::InvalidMetricsAddress(addr) => {
                write!(f, "observability.metrics_address '{}' is not a socket address", addr)
            }
            ValidationError::ZeroRequestTimeout => write!(f, "timeouts.request_secs must be > 0"),
            ValidationError::ZeroBodyLimit => write!(f, "limits.max_body_bytes must be > 0"),
            ValidationError::EmptyBusyClass => write!(f, "ui.busy_class must not be empty"),
            ValidationError::BusyClassHasWhitespace(class) => {
                write!(f, "ui.busy_class '{}' must be a single class name", class)
            }
            ValidationError::NonPositiveInviteExpiry(days) => {
                write!(f, "invites.expiry_days must be > 0 (got {})", days)
            }
            ValidationError::NonPositiveReportWindow(hours) => {
                write!(f, "incidents.report_window_hours must be > 0 (got {})", hours)
            }
            ValidationError::ZeroSessionTtl => write!(f, "security.session_ttl_secs must be > 0"),
            ValidationError::EmptyUsername => write!(f, "users entry with empty username"),
            ValidationError::DuplicateUsername(name) => {
                write!(f, "duplicate username '{}'", name)
            }
            ValidationError::BadPasswordDigest(name) => {
                write!(f, "user '{}' password_sha256 must be 64 hex characters", name)
            }
        }
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ConsoleConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.ui.busy_class.is_empty() {
        errors.push(ValidationError::EmptyBusyClass);
    } else if config.ui.busy_class.chars().any(char::is_whitespace) {
        errors.push(ValidationError::BusyClassHasWhitespace(
            config.ui.busy_class.clone(),
        ));
    }

    if config.invites.expiry_days <= 0 {
        errors.push(ValidationError::NonPositiveInviteExpiry(
            config.invites.expiry_days,
        ));
    }

    if config.incidents.report_window_hours <= 0 {
        errors.push(ValidationError::NonPositiveReportWindow(
            config.incidents.report_window_hours,
        ));
    }

    if config.security.session_ttl_secs == 0 {
        errors.push(ValidationError::ZeroSessionTtl);
    }

    let mut seen = HashSet::new();
    for user in &config.users {
        if user.username.is_empty() {
            errors.push(ValidationError::EmptyUsername);
            continue;
        }
        if !seen.insert(user.username.as_str()) {
            errors.push(ValidationError::DuplicateUsername(user.username.clone()));
        }
        let digest_ok = user.password_sha256.len() == 64
            && user.password_sha256.chars().all(|c| c.is_ascii_hexdigit());
        if !digest_ok {
            errors.push(ValidationError::BadPasswordDigest(user.username.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::UserConfig;

    fn digest64() -> String {
        "a".repeat(64)
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = ConsoleConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ConsoleConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.timeouts.request_secs = 0;
        config.ui.busy_class = "two words".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_duplicate_and_bad_digest_users() {
        let mut config = ConsoleConfig::default();
        config.users.push(UserConfig {
            username: "ola".into(),
            password_sha256: digest64(),
            email: String::new(),
            display_name: String::new(),
        });
        config.users.push(UserConfig {
            username: "ola".into(),
            password_sha256: "short".into(),
            email: String::new(),
            display_name: String::new(),
        });

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::DuplicateUsername("ola".into())));
        assert!(errors.contains(&ValidationError::BadPasswordDigest("ola".into())));
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = ConsoleConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
