//! Event target: a synchronous listener registry.
//!
//! # Responsibilities
//! - Register listeners keyed by event name
//! - Dispatch events to every matching listener, in registration order
//! - Remove listeners by id, or automatically via an RAII guard
//!
//! # Design Decisions
//! - Dispatch is synchronous: handlers run to completion on the
//!   dispatching thread, matching the single-threaded UI dispatch model
//!   the hooks were written for
//! - Matching callbacks are collected before invocation so a handler may
//!   register or remove listeners without deadlocking the registry
//! - The target is a cheap clone over shared state, so producers,
//!   subscribers, and teardown guards can all hold it

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::shell::event::WireEvent;

/// Identifier returned by [`EventTarget::add_listener`].
pub type ListenerId = u64;

type Callback = Arc<dyn Fn(&WireEvent) + Send + Sync>;

struct Registration {
    id: ListenerId,
    event: String,
    callback: Callback,
}

#[derive(Default)]
struct Inner {
    listeners: Mutex<Vec<Registration>>,
    next_id: AtomicU64,
}

/// A registry of event listeners, dispatching synchronously. Clones share
/// the same registry.
#[derive(Clone, Default)]
pub struct EventTarget {
    inner: Arc<Inner>,
}

impl EventTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `event`. Returns its id for later removal.
    pub fn add_listener<F>(&self, event: impl Into<String>, callback: F) -> ListenerId
    where
        F: Fn(&WireEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let mut listeners = self
            .inner
            .listeners
            .lock()
            .expect("listener registry poisoned");
        listeners.push(Registration {
            id,
            event: event.into(),
            callback: Arc::new(callback),
        });
        id
    }

    /// Remove a listener by id. Returns false if it was already gone.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self
            .inner
            .listeners
            .lock()
            .expect("listener registry poisoned");
        let before = listeners.len();
        listeners.retain(|r| r.id != id);
        listeners.len() != before
    }

    /// Register a listener whose registration is dropped with the guard.
    pub fn subscribe<F>(&self, event: impl Into<String>, callback: F) -> ListenerGuard
    where
        F: Fn(&WireEvent) + Send + Sync + 'static,
    {
        let id = self.add_listener(event, callback);
        ListenerGuard {
            target: self.clone(),
            id,
        }
    }

    /// Number of listeners registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        let listeners = self
            .inner
            .listeners
            .lock()
            .expect("listener registry poisoned");
        listeners.iter().filter(|r| r.event == event).count()
    }

    /// Dispatch an event to all listeners registered for its name.
    pub fn dispatch(&self, event: &WireEvent) {
        let callbacks: Vec<Callback> = {
            let listeners = self
                .inner
                .listeners
                .lock()
                .expect("listener registry poisoned");
            listeners
                .iter()
                .filter(|r| r.event == event.name())
                .map(|r| Arc::clone(&r.callback))
                .collect()
        };
        for callback in callbacks {
            callback(event);
        }
    }
}

/// RAII handle for a listener registration.
///
/// Dropping the guard removes the listener, so installed hooks are torn
/// down when their handle goes out of scope.
pub struct ListenerGuard {
    target: EventTarget,
    id: ListenerId,
}

impl ListenerGuard {
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.target.remove_listener(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_dispatch_reaches_matching_listeners() {
        let target = EventTarget::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h = hits.clone();
        target.add_listener("a", move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        let h = hits.clone();
        target.add_listener("b", move |_| {
            h.fetch_add(10, Ordering::SeqCst);
        });

        target.dispatch(&WireEvent::new("a"));
        target.dispatch(&WireEvent::new("a"));
        target.dispatch(&WireEvent::new("b"));

        assert_eq!(hits.load(Ordering::SeqCst), 12);
    }

    #[test]
    fn test_remove_listener() {
        let target = EventTarget::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h = hits.clone();
        let id = target.add_listener("a", move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        assert!(target.remove_listener(id));
        assert!(!target.remove_listener(id));

        target.dispatch(&WireEvent::new("a"));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_clones_share_the_registry() {
        let target = EventTarget::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h = hits.clone();
        target.clone().add_listener("a", move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        target.dispatch(&WireEvent::new("a"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_guard_tears_down_on_drop() {
        let target = EventTarget::new();
        let hits = Arc::new(AtomicUsize::new(0));

        {
            let h = hits.clone();
            let _guard = target.subscribe("a", move |_| {
                h.fetch_add(1, Ordering::SeqCst);
            });
            assert_eq!(target.listener_count("a"), 1);
            target.dispatch(&WireEvent::new("a"));
        }

        assert_eq!(target.listener_count("a"), 0);
        target.dispatch(&WireEvent::new("a"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_may_remove_itself() {
        let target = EventTarget::new();
        let id = Arc::new(AtomicU64::new(0));

        let t = target.clone();
        let id_inner = id.clone();
        let registered = target.add_listener("a", move |_| {
            t.remove_listener(id_inner.load(Ordering::SeqCst));
        });
        id.store(registered, Ordering::SeqCst);

        target.dispatch(&WireEvent::new("a"));
        assert_eq!(target.listener_count("a"), 0);
    }
}
