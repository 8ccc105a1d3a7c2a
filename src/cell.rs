//! The owner-side slot for a [`ListenerRegistry`] handle.
//!
//! [`ListenerCell`] stores the current handle and applies the reassignment
//! contract on every call, so an observable set can expose plain
//! `add_listener`/`remove_listener`/`fire` methods. Listeners may call back
//! into the same cell while being notified.
//!
//! # Examples
//!
//! ```rust
//! use observable_listeners::cell::ListenerCell;
//! use observable_listeners::change::SimpleChange;
//! use observable_listeners::listener::Listener;
//!
//! let cell: ListenerCell<u32> = ListenerCell::new();
//! assert!(!cell.has_listeners());
//!
//! let listener = Listener::invalidation(|| {});
//! cell.add_listener(Some(listener.clone())).unwrap();
//! assert!(cell.has_listeners());
//!
//! cell.fire(&SimpleChange::added(3).into());
//!
//! cell.remove_listener(Some(&listener)).unwrap();
//! assert!(cell.handle().is_none());
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::change::SetChange;
use crate::error::RegistryError;
use crate::fault::{FaultReporter, default_reporter};
use crate::listener::Listener;
use crate::registry::ListenerRegistry;

/// Holds the listener registry of one observable set.
pub struct ListenerCell<T> {
    handle: RefCell<Option<ListenerRegistry<T>>>,
    reporter: Rc<dyn FaultReporter>,
}

impl<T> ListenerCell<T> {
    /// Creates an empty cell that logs listener faults with the default
    /// reporter.
    pub fn new() -> Self {
        Self::with_reporter(Rc::new(default_reporter()))
    }

    /// Creates an empty cell that sends listener faults to `reporter`.
    pub fn with_reporter(reporter: Rc<dyn FaultReporter>) -> Self {
        Self {
            handle: RefCell::new(None),
            reporter,
        }
    }

    /// Returns a clone of the current handle.
    pub fn handle(&self) -> Option<ListenerRegistry<T>> {
        self.handle.borrow().clone()
    }

    /// Registers a listener.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidArgument`] if `listener` is `None`.
    pub fn add_listener(&self, listener: Option<Listener<T>>) -> Result<(), RegistryError> {
        let current = self.handle();
        let next = ListenerRegistry::add(current.as_ref(), listener)?;
        *self.handle.borrow_mut() = Some(next);
        Ok(())
    }

    /// Unregisters the first registration of a listener.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidArgument`] if `listener` is `None`.
    pub fn remove_listener(&self, listener: Option<&Listener<T>>) -> Result<(), RegistryError> {
        let current = self.handle();
        let next = ListenerRegistry::remove(current.as_ref(), listener)?;
        *self.handle.borrow_mut() = next;
        Ok(())
    }

    /// Returns `true` if at least one listener is registered.
    pub fn has_listeners(&self) -> bool {
        ListenerRegistry::has_listeners(self.handle.borrow().as_ref())
    }
}

impl<T: Clone> ListenerCell<T> {
    /// Notifies every registered listener of `change`.
    ///
    /// The handle is cloned out of the cell first, so listeners may add,
    /// remove or fire through this cell while being notified.
    pub fn fire(&self, change: &SetChange<T>) {
        let current = self.handle();
        ListenerRegistry::fire_with(current.as_ref(), change, self.reporter.as_ref());
    }
}

impl<T> Default for ListenerCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ListenerCell<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ListenerCell")
            .field("handle", &self.handle.borrow())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
