//! Host editor seam
//!
//! Everything Toggler needs from the editor it runs in: access to the
//! selections of the active editing surface, text replacement, opening the
//! configuration file, command registration and user notifications.

use std::fmt;
use std::io;
use std::path::Path;

/// Message surfaced to the user by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Warning(String),
    Error { message: String, detail: String },
}

/// Disposal handle returned by [`Host::register_command`]
///
/// Disposing (or dropping) the handle unregisters the command.
#[derive(Default)]
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(dispose: impl FnOnce() + 'static) -> Self {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    /// Handle with nothing to release
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.dispose.is_some())
            .finish()
    }
}

/// Editor operations consumed by the plugin.
///
/// Selections are addressed by index; an implementation keeps the remaining
/// selections valid when one of them is replaced.
pub trait Host {
    /// Number of selections (cursors) in the active editing surface; zero when
    /// there is no active editor
    fn selection_count(&self) -> usize;

    /// Text covered by a selection; empty for a bare cursor
    fn selected_text(&self, index: usize) -> String;

    /// Expand a selection to the word under its cursor
    fn select_word(&mut self, index: usize);

    /// Replace the selected text, leaving the new text selected when `select` is set
    fn insert_text(&mut self, index: usize, text: &str, select: bool);

    /// Open a file for editing; the host reports saves back through
    /// [`crate::plugin::Toggler::config_saved`]
    fn open_file(&mut self, path: &Path) -> io::Result<()>;

    /// Register a named command; the host routes invocations to
    /// [`crate::plugin::Toggler::dispatch`]
    fn register_command(&mut self, name: &'static str) -> Subscription;

    fn notify(&mut self, notification: Notification);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_subscription_disposes_once() {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let subscription = Subscription::new(move || counter.set(counter.get() + 1));

        subscription.dispose();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_subscription_disposes_on_drop() {
        let count = Rc::new(Cell::new(0));
        {
            let counter = Rc::clone(&count);
            let _subscription = Subscription::new(move || counter.set(counter.get() + 1));
        }
        assert_eq!(count.get(), 1);

        drop(Subscription::empty());
    }
}
