//! Request lifecycle hooks: busy indicator and error logging.
//!
//! # Responsibilities
//! - Track how many wire requests are in flight
//! - Hold the busy class on the root element while the count is non-zero
//! - Warn (with the status code when one exists) on response errors
//!
//! # Design Decisions
//! - In-flight requests are reference counted, not a single flag, so
//!   overlapping requests cannot clear the indicator early
//! - Error events settle their request; a failed request must not leave
//!   the indicator stuck
//! - Installation requires the wire runtime handle; without it nothing is
//!   registered and nothing fails

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::observability::metrics;
use crate::shell::dom::RootElement;
use crate::shell::event::{EVENT_AFTER_ON_LOAD, EVENT_BEFORE_REQUEST, EVENT_RESPONSE_ERROR};
use crate::shell::target::ListenerGuard;
use crate::shell::Shell;

/// Class held on the root element while requests are in flight.
pub const DEFAULT_BUSY_CLASS: &str = "hx-busy";

/// Installer for the lifecycle hooks.
pub struct BusyIndicator {
    busy_class: String,
}

/// Handle to installed hooks. Dropping it removes all three listeners.
pub struct IndicatorHandle {
    in_flight: Arc<AtomicUsize>,
    _guards: Vec<ListenerGuard>,
}

impl IndicatorHandle {
    /// Requests currently in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

impl BusyIndicator {
    pub fn new() -> Self {
        Self {
            busy_class: DEFAULT_BUSY_CLASS.to_string(),
        }
    }

    /// Use a custom busy class name.
    pub fn with_class(busy_class: impl Into<String>) -> Self {
        Self {
            busy_class: busy_class.into(),
        }
    }

    pub fn busy_class(&self) -> &str {
        &self.busy_class
    }

    /// Install the hooks on the shell's event target.
    ///
    /// Returns `None` without registering anything when the shell has no
    /// wire runtime handle.
    pub fn install(&self, shell: &Shell) -> Option<IndicatorHandle> {
        if shell.runtime().is_none() {
            tracing::debug!("wire runtime not present, lifecycle hooks not installed");
            return None;
        }

        let target = shell.target();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let mut guards = Vec::with_capacity(3);

        {
            let root = Arc::clone(shell.root());
            let count = Arc::clone(&in_flight);
            let class = self.busy_class.clone();
            guards.push(target.subscribe(EVENT_BEFORE_REQUEST, move |_event| {
                let previous = count.fetch_add(1, Ordering::SeqCst);
                metrics::record_wire_in_flight(previous + 1);
                if previous == 0 {
                    root.add_class(&class);
                }
            }));
        }

        {
            let root = Arc::clone(shell.root());
            let count = Arc::clone(&in_flight);
            let class = self.busy_class.clone();
            guards.push(target.subscribe(EVENT_AFTER_ON_LOAD, move |_event| {
                settle(&count, &root, &class);
            }));
        }

        {
            let root = Arc::clone(shell.root());
            let count = Arc::clone(&in_flight);
            let class = self.busy_class.clone();
            guards.push(target.subscribe(EVENT_RESPONSE_ERROR, move |event| {
                tracing::warn!(status = ?event.status(), path = ?event.path(), "HTMX request failed");
                settle(&count, &root, &class);
            }));
        }

        Some(IndicatorHandle {
            in_flight,
            _guards: guards,
        })
    }
}

impl Default for BusyIndicator {
    fn default() -> Self {
        Self::new()
    }
}

/// Settle one in-flight request. The count is clamped at zero; a
/// completion with nothing outstanding is ignored.
fn settle(count: &AtomicUsize, root: &RootElement, class: &str) {
    let previous = count
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .unwrap_or(0);
    let now = previous.saturating_sub(1);
    metrics::record_wire_in_flight(now);
    if now == 0 {
        root.remove_class(class);
    }
}
