//! Client shell runtime for the HTML-over-the-wire console.
//!
//! # Data Flow
//! ```text
//! WireRuntime (runtime.rs)
//!     issues HTTP request against the console
//!     → dispatches htmx:beforeRequest on the EventTarget (target.rs)
//!     → response loaded  → htmx:afterOnLoad
//!     → response error   → htmx:responseError (detail carries status)
//!
//! BusyIndicator (indicator.rs)
//!     subscribes to the three lifecycle events
//!     → maintains an in-flight count
//!     → toggles the busy class on the RootElement (dom.rs)
//!     → warns on response errors
//! ```
//!
//! # Design Decisions
//! - The event target is injected, never a process-wide global, so the
//!   hooks can be constructed, tested, and torn down independently
//! - Dispatch is synchronous; handlers run to completion on the
//!   dispatching thread and never block or await
//! - Installing the hooks requires the wire runtime handle to be present;
//!   a shell without one gets no listeners and no errors

pub mod dom;
pub mod event;
pub mod indicator;
pub mod runtime;
pub mod target;

use std::sync::Arc;

pub use dom::RootElement;
pub use event::{EventDetail, TransportHandle, WireEvent};
pub use indicator::{BusyIndicator, IndicatorHandle};
pub use runtime::{WireError, WireResponse, WireRuntime};
pub use target::{EventTarget, ListenerGuard};

/// The application shell: one event target, one root element, and
/// (when connected) the wire runtime that feeds them.
pub struct Shell {
    target: EventTarget,
    root: Arc<RootElement>,
    runtime: Option<Arc<WireRuntime>>,
}

impl Shell {
    /// Create a shell with no wire runtime attached.
    ///
    /// Lifecycle hooks check for the runtime before registering, so a
    /// detached shell stays inert.
    pub fn detached() -> Self {
        Self {
            target: EventTarget::new(),
            root: Arc::new(RootElement::new()),
            runtime: None,
        }
    }

    /// Create a shell wired to a console at `base_url`.
    pub fn connect(base_url: &str) -> Result<Self, WireError> {
        let target = EventTarget::new();
        let runtime = WireRuntime::new(base_url, target.clone())?;
        Ok(Self {
            target,
            root: Arc::new(RootElement::new()),
            runtime: Some(Arc::new(runtime)),
        })
    }

    /// The shared event target requests and hooks dispatch through.
    pub fn target(&self) -> &EventTarget {
        &self.target
    }

    /// The root element whose class set reflects shell state.
    pub fn root(&self) -> &Arc<RootElement> {
        &self.root
    }

    /// The wire runtime handle, if one is attached.
    pub fn runtime(&self) -> Option<&Arc<WireRuntime>> {
        self.runtime.as_ref()
    }
}
