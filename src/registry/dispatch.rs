//! The `fire` algorithm.
//!
//! 1. Read the position count of both tracks before notifying anyone.
//! 2. Mark the registry as dispatching so removals tombstone instead of
//!    shifting.
//! 3. Visit every invalidation position, then every change position, below
//!    the recorded counts, re-reading each slot right before its turn.
//! 4. Compact the tracks when the outermost dispatch ends.
//!
//! Every single listener call runs through [`isolate`].

use std::cell::{OnceCell, RefCell};
use std::slice;

use super::{ListenerRegistry, RegistryState};
use crate::change::{ComplexChange, SetChange, SimpleChange};
use crate::fault::{FaultReporter, isolate};
use crate::listener::{Listener, ListenerKind};

/// Keeps the dispatch depth raised for the lifetime of one `fire`.
///
/// Dropping the outermost guard, on return or while unwinding, compacts the
/// tombstones left by reentrant removals.
struct DispatchGuard<'a, T> {
    state: &'a RefCell<RegistryState<T>>,
}

impl<'a, T> DispatchGuard<'a, T> {
    fn enter(state: &'a RefCell<RegistryState<T>>) -> Self {
        state.borrow_mut().dispatch_depth += 1;
        Self { state }
    }
}

impl<T> Drop for DispatchGuard<'_, T> {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.dispatch_depth -= 1;
        if state.dispatch_depth == 0 {
            state.compact();
        }
    }
}

/// The shapes of one fired change, each computed at most once per `fire`.
struct ChangeViews<'a, T> {
    change: &'a SetChange<T>,
    adapted: OnceCell<ComplexChange<T>>,
    parts: OnceCell<Vec<SimpleChange<T>>>,
}

impl<'a, T: Clone> ChangeViews<'a, T> {
    const fn new(change: &'a SetChange<T>) -> Self {
        Self {
            change,
            adapted: OnceCell::new(),
            parts: OnceCell::new(),
        }
    }

    /// The change as seen by a complex change listener.
    fn complex(&self) -> &ComplexChange<T> {
        match self.change {
            SetChange::Complex(change) => change,
            SetChange::Simple(change) => self.adapted.get_or_init(|| change.clone().into()),
        }
    }

    /// The single-element changes a simple change listener receives.
    fn simple_parts(&self) -> &[SimpleChange<T>] {
        match self.change {
            SetChange::Simple(change) => slice::from_ref(change),
            SetChange::Complex(change) => self.parts.get_or_init(|| change.iter_simple().collect()),
        }
    }
}

pub(super) fn fire<T: Clone>(
    registry: &ListenerRegistry<T>,
    change: &SetChange<T>,
    reporter: &dyn FaultReporter,
) {
    let (invalidation_bound, change_bound) = {
        let state = registry.state.borrow();
        if state.live_len() == 0 {
            return;
        }
        (
            state.invalidation.position_count(),
            state.change.position_count(),
        )
    };
    let _guard = DispatchGuard::enter(&registry.state);

    for position in 0..invalidation_bound {
        let Some(listener) = registry.state.borrow().invalidation.slot(position) else {
            continue;
        };
        if let Listener::Invalidation(listener) = listener {
            isolate(ListenerKind::Invalidation, reporter, || listener.invalidated());
        }
    }

    let views = ChangeViews::new(change);
    for position in 0..change_bound {
        let Some(listener) = registry.state.borrow().change.slot(position) else {
            continue;
        };
        match listener {
            Listener::Change(listener) => {
                for part in views.simple_parts() {
                    isolate(ListenerKind::Change, reporter, || listener.on_changed(part));
                }
            }
            Listener::ComplexChange(listener) => {
                let complex = views.complex();
                isolate(ListenerKind::ComplexChange, reporter, || {
                    listener.on_changed(complex);
                });
            }
            Listener::Invalidation(_) => {}
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
