//! The listener registry of an observable set.
//!
//! This module provides [`ListenerRegistry`], the handle an observable set
//! uses to keep its invalidation and change listeners and to notify them.
//!
//! # Handle Contract
//!
//! The owner stores an `Option<ListenerRegistry<T>>`, where `None` is the
//! empty registry. Every `add` and `remove` returns the handle the owner must
//! store next. The returned handle may be the same registry or a new one, and
//! `remove` returns `None` once the last listener is gone, so the previous
//! handle must never be relied upon after a call.
//!
//! # Storage
//!
//! Each listener kind has its own track that moves through
//! `Empty -> Single -> Many` as listeners are added and back as they are
//! removed. See [`StorageShape`].
//!
//! # Reentrancy
//!
//! Listeners may call `add`, `remove` and `fire` on the registry that is
//! notifying them. A running `fire` notifies exactly the listeners that were
//! registered when it started and are still registered when their turn
//! comes: listeners added meanwhile wait for the next `fire`, listeners
//! removed before their turn are skipped.
//!
//! # Examples
//!
//! ```rust
//! use observable_listeners::change::SimpleChange;
//! use observable_listeners::listener::Listener;
//! use observable_listeners::registry::ListenerRegistry;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let calls = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&calls);
//! let listener = Listener::invalidation(move || counter.set(counter.get() + 1));
//!
//! let mut handle: Option<ListenerRegistry<i32>> = None;
//! handle = Some(ListenerRegistry::add(handle.as_ref(), Some(listener.clone())).unwrap());
//!
//! ListenerRegistry::fire(handle.as_ref(), &SimpleChange::added(1).into());
//! assert_eq!(calls.get(), 1);
//!
//! handle = ListenerRegistry::remove(handle.as_ref(), Some(&listener)).unwrap();
//! assert!(handle.is_none());
//! ```

mod dispatch;
mod track;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::change::SetChange;
use crate::error::{Operation, RegistryError};
use crate::fault::{FaultReporter, default_reporter};
use crate::listener::{
    InvalidationListener, Listener, ListenerKind, SetChangeListener, SetComplexChangeListener,
};

use self::track::Track;

/// The storage shape of one listener track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageShape {
    /// No listener; nothing is allocated.
    Empty,
    /// One listener held directly.
    Single,
    /// Two or more listeners held in an ordered sequence.
    Many,
}

/// Mutable registry state behind the shared handle.
struct RegistryState<T> {
    invalidation: Track<Listener<T>>,
    change: Track<Listener<T>>,
    /// Number of `fire` calls currently running on this registry.
    dispatch_depth: usize,
}

impl<T> RegistryState<T> {
    const fn new() -> Self {
        Self {
            invalidation: Track::Empty,
            change: Track::Empty,
            dispatch_depth: 0,
        }
    }

    fn track_mut(&mut self, kind: ListenerKind) -> &mut Track<Listener<T>> {
        match kind {
            ListenerKind::Invalidation => &mut self.invalidation,
            ListenerKind::Change | ListenerKind::ComplexChange => &mut self.change,
        }
    }

    fn live_len(&self) -> usize {
        self.invalidation.live_len() + self.change.live_len()
    }

    fn compact(&mut self) {
        let dropped = self.invalidation.compact() + self.change.compact();
        if dropped > 0 {
            crate::trace_event!(dropped, "compacted listener tombstones after dispatch");
        }
    }
}

/// A registry of invalidation and change listeners for one observable set.
///
/// Cloning the handle is cheap and yields another handle to the same
/// registry. The registry is confined to the thread that created it.
///
/// # Type Parameters
///
/// * `T` - The element type of the observed set.
pub struct ListenerRegistry<T> {
    state: Rc<RefCell<RegistryState<T>>>,
}

impl<T> ListenerRegistry<T> {
    fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(RegistryState::new())),
        }
    }

    /// Registers a listener and returns the handle to store.
    ///
    /// The listener goes to the track of its kind, after every listener
    /// already registered there. Registering the same listener twice yields
    /// two independent registrations.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidArgument`] if `listener` is `None`.
    /// The registry is left untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use observable_listeners::listener::Listener;
    /// use observable_listeners::registry::{ListenerRegistry, StorageShape};
    ///
    /// let listener: Listener<i32> = Listener::invalidation(|| {});
    /// let handle = ListenerRegistry::add(None, Some(listener.clone())).unwrap();
    /// assert_eq!(handle.invalidation_shape(), StorageShape::Single);
    ///
    /// let handle = ListenerRegistry::add(Some(&handle), Some(listener)).unwrap();
    /// assert_eq!(handle.invalidation_shape(), StorageShape::Many);
    /// ```
    pub fn add(handle: Option<&Self>, listener: Option<Listener<T>>) -> Result<Self, RegistryError> {
        let listener = listener.ok_or(RegistryError::InvalidArgument {
            operation: Operation::Add,
        })?;
        let registry = handle.cloned().unwrap_or_else(Self::new);
        {
            let mut state = registry.state.borrow_mut();
            let track = state.track_mut(listener.kind());
            let before = track.shape();
            track.push(listener);
            let after = track.shape();
            if before != after {
                crate::trace_event!(?before, ?after, "listener track promoted");
            }
        }
        Ok(registry)
    }

    /// Registers an invalidation listener.
    ///
    /// # Errors
    ///
    /// Same as [`ListenerRegistry::add`].
    pub fn add_invalidation(
        handle: Option<&Self>,
        listener: Option<Rc<dyn InvalidationListener>>,
    ) -> Result<Self, RegistryError> {
        Self::add(handle, listener.map(Listener::Invalidation))
    }

    /// Registers a simple change listener.
    ///
    /// # Errors
    ///
    /// Same as [`ListenerRegistry::add`].
    pub fn add_change(
        handle: Option<&Self>,
        listener: Option<Rc<dyn SetChangeListener<T>>>,
    ) -> Result<Self, RegistryError> {
        Self::add(handle, listener.map(Listener::Change))
    }

    /// Registers a complex change listener.
    ///
    /// # Errors
    ///
    /// Same as [`ListenerRegistry::add`].
    pub fn add_complex_change(
        handle: Option<&Self>,
        listener: Option<Rc<dyn SetComplexChangeListener<T>>>,
    ) -> Result<Self, RegistryError> {
        Self::add(handle, listener.map(Listener::ComplexChange))
    }

    /// Unregisters the first registration of `listener` and returns the
    /// handle to store.
    ///
    /// Removing a listener that is not registered, or removing from an empty
    /// handle, changes nothing. The remaining listeners keep their relative
    /// order. Returns `Ok(None)` when no listener of either kind is left.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidArgument`] if `listener` is `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use observable_listeners::listener::Listener;
    /// use observable_listeners::registry::ListenerRegistry;
    ///
    /// let listener: Listener<i32> = Listener::invalidation(|| {});
    /// let handle = ListenerRegistry::add(None, Some(listener.clone())).unwrap();
    /// let handle = ListenerRegistry::add(Some(&handle), Some(listener.clone())).unwrap();
    ///
    /// let handle = ListenerRegistry::remove(Some(&handle), Some(&listener)).unwrap();
    /// assert_eq!(handle.as_ref().map(ListenerRegistry::invalidation_len), Some(1));
    ///
    /// let handle = ListenerRegistry::remove(handle.as_ref(), Some(&listener)).unwrap();
    /// assert!(handle.is_none());
    /// ```
    pub fn remove(
        handle: Option<&Self>,
        listener: Option<&Listener<T>>,
    ) -> Result<Option<Self>, RegistryError> {
        let listener = listener.ok_or(RegistryError::InvalidArgument {
            operation: Operation::Remove,
        })?;
        let Some(registry) = handle else {
            return Ok(None);
        };
        let live = {
            let mut state = registry.state.borrow_mut();
            let deferred = state.dispatch_depth > 0;
            let track = state.track_mut(listener.kind());
            let before = track.shape();
            if track.remove_first(|entry| entry.same_listener(listener), deferred) {
                let after = track.shape();
                if before != after {
                    crate::trace_event!(?before, ?after, deferred, "listener track demoted");
                }
            }
            state.live_len()
        };
        Ok((live > 0).then(|| registry.clone()))
    }

    /// Returns `true` if at least one listener of either kind is registered.
    pub fn has_listeners(handle: Option<&Self>) -> bool {
        handle.is_some_and(|registry| registry.state.borrow().live_len() > 0)
    }

    /// Returns the storage shape of the invalidation track.
    ///
    /// While a `fire` is running the shape may lag behind removals until
    /// the dispatch finishes.
    pub fn invalidation_shape(&self) -> StorageShape {
        self.state.borrow().invalidation.shape()
    }

    /// Returns the storage shape of the change track.
    pub fn change_shape(&self) -> StorageShape {
        self.state.borrow().change.shape()
    }

    /// Returns the number of registered invalidation listeners.
    pub fn invalidation_len(&self) -> usize {
        self.state.borrow().invalidation.live_len()
    }

    /// Returns the number of registered change listeners of both kinds.
    pub fn change_len(&self) -> usize {
        self.state.borrow().change.live_len()
    }
}

impl<T: Clone> ListenerRegistry<T> {
    /// Notifies every listener of `change`, reporting listener faults to the
    /// default reporter.
    ///
    /// Invalidation listeners are notified first, then change listeners,
    /// each in registration order. Complex change listeners receive `change`
    /// once; simple change listeners receive one call per changed element.
    /// Does nothing on an empty handle.
    pub fn fire(handle: Option<&Self>, change: &SetChange<T>) {
        Self::fire_with(handle, change, &default_reporter());
    }

    /// Like [`ListenerRegistry::fire`], with an explicit fault reporter.
    ///
    /// A panicking listener is reported and skipped; the remaining
    /// listeners are still notified and nothing propagates to the caller.
    pub fn fire_with(handle: Option<&Self>, change: &SetChange<T>, reporter: &dyn FaultReporter) {
        if let Some(registry) = handle {
            dispatch::fire(registry, change, reporter);
        }
    }
}

impl<T> Clone for ListenerRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T> fmt::Debug for ListenerRegistry<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        formatter
            .debug_struct("ListenerRegistry")
            .field("invalidation", &state.invalidation.shape())
            .field("invalidation_len", &state.invalidation.live_len())
            .field("change", &state.change.shape())
            .field("change_len", &state.change.live_len())
            .field("dispatch_depth", &state.dispatch_depth)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
