//! Lifecycle event model.
//!
//! Event names are the external contract the shell binds to; they follow
//! the wire library's published names so stylesheets and scripts written
//! against it keep working.

use serde::{Deserialize, Serialize};

/// Fired on the event target just before a request goes out.
pub const EVENT_BEFORE_REQUEST: &str = "htmx:beforeRequest";

/// Fired after a successful response has been loaded into the document.
pub const EVENT_AFTER_ON_LOAD: &str = "htmx:afterOnLoad";

/// Fired when a response comes back with an error status, or the request
/// fails outright (in which case the detail carries no transport handle).
pub const EVENT_RESPONSE_ERROR: &str = "htmx:responseError";

/// Transport-level information attached to error events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransportHandle {
    /// HTTP status code, when a response was received at all.
    pub status: Option<u16>,
}

/// Structured payload carried by lifecycle events. Every field is
/// optional; consumers navigate it defensively.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventDetail {
    /// Transport handle for the triggering request, if one exists.
    pub xhr: Option<TransportHandle>,
    /// Request path, for logging.
    pub path: Option<String>,
}

/// An event dispatched on the shell's event target.
#[derive(Debug, Clone)]
pub struct WireEvent {
    name: String,
    detail: Option<EventDetail>,
}

impl WireEvent {
    /// Create an event with no detail payload.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: None,
        }
    }

    /// Create an event carrying a detail payload.
    pub fn with_detail(name: impl Into<String>, detail: EventDetail) -> Self {
        Self {
            name: name.into(),
            detail: Some(detail),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn detail(&self) -> Option<&EventDetail> {
        self.detail.as_ref()
    }

    /// Status code from the detail's transport handle, if every link in
    /// the chain is present.
    pub fn status(&self) -> Option<u16> {
        self.detail
            .as_ref()
            .and_then(|d| d.xhr.as_ref())
            .and_then(|xhr| xhr.status)
    }

    /// Request path from the detail, if present.
    pub fn path(&self) -> Option<&str> {
        self.detail.as_ref().and_then(|d| d.path.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_navigation() {
        let full = WireEvent::with_detail(
            EVENT_RESPONSE_ERROR,
            EventDetail {
                xhr: Some(TransportHandle { status: Some(500) }),
                path: None,
            },
        );
        assert_eq!(full.status(), Some(500));

        let no_status = WireEvent::with_detail(
            EVENT_RESPONSE_ERROR,
            EventDetail {
                xhr: Some(TransportHandle { status: None }),
                path: None,
            },
        );
        assert_eq!(no_status.status(), None);

        let no_xhr = WireEvent::with_detail(EVENT_RESPONSE_ERROR, EventDetail::default());
        assert_eq!(no_xhr.status(), None);

        let bare = WireEvent::new(EVENT_RESPONSE_ERROR);
        assert_eq!(bare.status(), None);
    }
}
