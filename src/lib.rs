//! # observable-listeners
//!
//! Listener bookkeeping and change notification for observable sets.
//!
//! ## Overview
//!
//! An observable set keeps two independent kinds of listeners:
//!
//! - **Invalidation listeners** learn that the set changed.
//! - **Change listeners** learn what changed, either one element at a time
//!   ([`SetChangeListener`](listener::SetChangeListener)) or one batch at a
//!   time ([`SetComplexChangeListener`](listener::SetComplexChangeListener)).
//!
//! [`ListenerRegistry`](registry::ListenerRegistry) stores both kinds with
//! an allocation-free path for zero or one listener per kind, notifies them
//! in registration order, tolerates listeners that register, unregister or
//! fire from inside a notification, and isolates panicking listeners.
//!
//! ## Feature Flags
//!
//! - `tracing` (default): route listener faults and storage transitions
//!   through the `tracing` facade. Without it faults go to stderr.
//!
//! ## Example
//!
//! ```rust
//! use observable_listeners::prelude::*;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//!
//! let listeners: ListenerCell<&str> = ListenerCell::new();
//! listeners
//!     .add_listener(Some(Listener::change(move |change: &SimpleChange<&str>| {
//!         sink.borrow_mut().push(*change.element());
//!     })))
//!     .unwrap();
//!
//! listeners.fire(&ComplexChange::new(["pear"], ["apple"]).into());
//! assert_eq!(*seen.borrow(), vec!["apple", "pear"]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Emits a `tracing` trace event when the `tracing` feature is enabled.
macro_rules! trace_event {
    ($($argument:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::trace!($($argument)*);
    };
}
pub(crate) use trace_event;

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use observable_listeners::prelude::*;
/// ```
pub mod prelude {
    pub use crate::cell::ListenerCell;
    pub use crate::change::{ChangeKind, ComplexChange, SetChange, SimpleChange};
    pub use crate::error::{Operation, RegistryError};
    pub use crate::fault::{
        FaultReporter, ListenerFault, SilentFaultReporter, TracingFaultReporter,
    };
    pub use crate::listener::{
        InvalidationListener, Listener, ListenerKind, SetChangeListener, SetComplexChangeListener,
    };
    pub use crate::registry::{ListenerRegistry, StorageShape};
}

pub mod cell;
pub mod change;
pub mod error;
pub mod fault;
pub mod listener;
pub mod registry;
