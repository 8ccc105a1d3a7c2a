//! Listener capabilities and the tagged [`Listener`] handle.
//!
//! Three listener kinds exist:
//!
//! - [`InvalidationListener`]: told that the set changed, without details.
//! - [`SetChangeListener`]: told about every single element that changed.
//! - [`SetComplexChangeListener`]: told about a whole batch at once.
//!
//! Closures implement the matching trait, and [`Listener`] wraps any of them
//! in a shared pointer. The pointer is the listener's identity: a cloned
//! `Listener` removes the registration it was cloned from.
//!
//! # Examples
//!
//! ```rust
//! use observable_listeners::change::SimpleChange;
//! use observable_listeners::listener::{Listener, ListenerKind};
//!
//! let listener: Listener<i32> = Listener::change(|change: &SimpleChange<i32>| {
//!     let _ = change.element();
//! });
//! assert_eq!(listener.kind(), ListenerKind::Change);
//!
//! let alias = listener.clone();
//! assert!(alias.same_listener(&listener));
//! ```

use std::fmt;
use std::rc::Rc;

use crate::change::{ComplexChange, SimpleChange};

/// A listener that only learns that the observed set is no longer valid.
pub trait InvalidationListener {
    /// Called once per fired change.
    fn invalidated(&self);
}

impl<F> InvalidationListener for F
where
    F: Fn() + ?Sized,
{
    #[inline]
    fn invalidated(&self) {
        self();
    }
}

/// A listener that receives one notification per changed element.
pub trait SetChangeListener<T> {
    /// Called with a single-element change.
    fn on_changed(&self, change: &SimpleChange<T>);
}

impl<T, F> SetChangeListener<T> for F
where
    F: Fn(&SimpleChange<T>) + ?Sized,
{
    #[inline]
    fn on_changed(&self, change: &SimpleChange<T>) {
        self(change);
    }
}

/// A listener that receives one notification per fired change, however many
/// elements it touches.
pub trait SetComplexChangeListener<T> {
    /// Called with the whole batch.
    fn on_changed(&self, change: &ComplexChange<T>);
}

impl<T, F> SetComplexChangeListener<T> for F
where
    F: Fn(&ComplexChange<T>) + ?Sized,
{
    #[inline]
    fn on_changed(&self, change: &ComplexChange<T>) {
        self(change);
    }
}

/// The kind of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// An [`InvalidationListener`].
    Invalidation,
    /// A [`SetChangeListener`].
    Change,
    /// A [`SetComplexChangeListener`].
    ComplexChange,
}

impl fmt::Display for ListenerKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Invalidation => "invalidation listener",
            Self::Change => "change listener",
            Self::ComplexChange => "complex change listener",
        };
        formatter.write_str(name)
    }
}

/// A shared, identity-comparable listener of one of the three kinds.
///
/// # Type Parameters
///
/// * `T` - The element type of the observed set.
pub enum Listener<T> {
    /// Invalidation kind.
    Invalidation(Rc<dyn InvalidationListener>),
    /// Simple change kind.
    Change(Rc<dyn SetChangeListener<T>>),
    /// Complex change kind.
    ComplexChange(Rc<dyn SetComplexChangeListener<T>>),
}

impl<T> Listener<T> {
    /// Wraps a closure as an invalidation listener.
    pub fn invalidation<F>(listener: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self::Invalidation(Rc::new(listener))
    }

    /// Wraps a closure as a simple change listener.
    pub fn change<F>(listener: F) -> Self
    where
        F: Fn(&SimpleChange<T>) + 'static,
    {
        Self::Change(Rc::new(listener))
    }

    /// Wraps a closure as a complex change listener.
    pub fn complex_change<F>(listener: F) -> Self
    where
        F: Fn(&ComplexChange<T>) + 'static,
    {
        Self::ComplexChange(Rc::new(listener))
    }

    /// Returns the kind of this listener.
    #[inline]
    pub const fn kind(&self) -> ListenerKind {
        match self {
            Self::Invalidation(_) => ListenerKind::Invalidation,
            Self::Change(_) => ListenerKind::Change,
            Self::ComplexChange(_) => ListenerKind::ComplexChange,
        }
    }

    /// Returns `true` if both handles point at the same listener.
    ///
    /// Listeners of different kinds are never the same, even when they share
    /// an allocation.
    pub fn same_listener(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Invalidation(left), Self::Invalidation(right)) => {
                std::ptr::addr_eq(Rc::as_ptr(left), Rc::as_ptr(right))
            }
            (Self::Change(left), Self::Change(right)) => {
                std::ptr::addr_eq(Rc::as_ptr(left), Rc::as_ptr(right))
            }
            (Self::ComplexChange(left), Self::ComplexChange(right)) => {
                std::ptr::addr_eq(Rc::as_ptr(left), Rc::as_ptr(right))
            }
            _ => false,
        }
    }

    fn address(&self) -> *const () {
        match self {
            Self::Invalidation(listener) => Rc::as_ptr(listener).cast(),
            Self::Change(listener) => Rc::as_ptr(listener).cast(),
            Self::ComplexChange(listener) => Rc::as_ptr(listener).cast(),
        }
    }
}

impl<T> Clone for Listener<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Invalidation(listener) => Self::Invalidation(Rc::clone(listener)),
            Self::Change(listener) => Self::Change(Rc::clone(listener)),
            Self::ComplexChange(listener) => Self::ComplexChange(Rc::clone(listener)),
        }
    }
}

impl<T> fmt::Debug for Listener<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Listener")
            .field("kind", &self.kind())
            .field("address", &self.address())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::cell::Cell;

    #[rstest]
    fn test_closure_invalidation_listener_is_called() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let listener: Listener<i32> = Listener::invalidation(move || counter.set(counter.get() + 1));

        if let Listener::Invalidation(inner) = &listener {
            inner.invalidated();
        }
        assert_eq!(calls.get(), 1);
    }

    #[rstest]
    fn test_clone_is_same_listener() {
        let listener: Listener<i32> = Listener::invalidation(|| {});
        let alias = listener.clone();
        assert!(listener.same_listener(&alias));
    }

    #[rstest]
    fn test_distinct_closures_are_different_listeners() {
        let first: Listener<i32> = Listener::invalidation(|| {});
        let second: Listener<i32> = Listener::invalidation(|| {});
        assert!(!first.same_listener(&second));
    }

    #[rstest]
    fn test_kinds_never_match_each_other() {
        struct Both;
        impl SetChangeListener<i32> for Both {
            fn on_changed(&self, _change: &SimpleChange<i32>) {}
        }
        impl SetComplexChangeListener<i32> for Both {
            fn on_changed(&self, _change: &ComplexChange<i32>) {}
        }

        let shared = Rc::new(Both);
        let simple: Listener<i32> = Listener::Change(shared.clone());
        let complex: Listener<i32> = Listener::ComplexChange(shared);
        assert!(!simple.same_listener(&complex));
    }

    #[rstest]
    #[case(Listener::invalidation(|| {}), ListenerKind::Invalidation, "invalidation listener")]
    #[case(Listener::change(|_: &SimpleChange<i32>| {}), ListenerKind::Change, "change listener")]
    #[case(
        Listener::complex_change(|_: &ComplexChange<i32>| {}),
        ListenerKind::ComplexChange,
        "complex change listener"
    )]
    fn test_kind_and_display(
        #[case] listener: Listener<i32>,
        #[case] kind: ListenerKind,
        #[case] text: &str,
    ) {
        assert_eq!(listener.kind(), kind);
        assert_eq!(kind.to_string(), text);
    }
}
