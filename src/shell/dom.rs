//! Root element handle and its class set.
//!
//! The shell owns a single root element; its class list is the only piece
//! of document state the lifecycle hooks mutate. Stylesheets key off the
//! busy class to switch the cursor while requests are in flight.

use std::sync::Mutex;

/// An ordered set of CSS class names. Add and remove are idempotent.
#[derive(Debug, Default, Clone)]
pub struct ClassSet {
    classes: Vec<String>,
}

impl ClassSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class. Returns false if it was already present.
    pub fn add(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.classes.push(name.to_string());
        true
    }

    /// Remove a class. Returns false if it was absent.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.classes.len();
        self.classes.retain(|c| c != name);
        self.classes.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.iter().any(|c| c == name)
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Render as a `class` attribute value.
    pub fn to_attr(&self) -> String {
        self.classes.join(" ")
    }
}

/// The document root element, shared across handlers.
///
/// Interior locking keeps class mutation safe from whichever thread
/// dispatches the lifecycle events.
pub struct RootElement {
    classes: Mutex<ClassSet>,
}

impl RootElement {
    pub fn new() -> Self {
        Self {
            classes: Mutex::new(ClassSet::new()),
        }
    }

    /// Add a class to the root element. Idempotent.
    pub fn add_class(&self, name: &str) -> bool {
        self.classes.lock().expect("class set poisoned").add(name)
    }

    /// Remove a class from the root element. Idempotent.
    pub fn remove_class(&self, name: &str) -> bool {
        self.classes.lock().expect("class set poisoned").remove(name)
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.lock().expect("class set poisoned").contains(name)
    }

    /// Snapshot of the `class` attribute value.
    pub fn class_attr(&self) -> String {
        self.classes.lock().expect("class set poisoned").to_attr()
    }
}

impl Default for RootElement {
    fn default() -> Self {
        Self::new()
    }
}
