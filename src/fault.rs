//! Listener fault isolation and reporting.
//!
//! A listener that panics while being notified must not stop the remaining
//! listeners. [`ListenerRegistry::fire`](crate::registry::ListenerRegistry::fire)
//! catches the panic, converts it into a [`ListenerFault`] and hands it to a
//! [`FaultReporter`] together with the current thread, then moves on.
//!
//! The reporter is always injected: per call with
//! [`ListenerRegistry::fire_with`](crate::registry::ListenerRegistry::fire_with),
//! per owner with [`ListenerCell::with_reporter`](crate::cell::ListenerCell::with_reporter),
//! or [`default_reporter`] otherwise.
//!
//! # Examples
//!
//! ```rust
//! use observable_listeners::fault::{FaultReporter, ListenerFault};
//! use std::cell::Cell;
//! use std::thread::Thread;
//!
//! let reported = Cell::new(0);
//! let reporter = |_thread: &Thread, _fault: &ListenerFault| reported.set(reported.get() + 1);
//! reporter.report(&std::thread::current(), &ListenerFault::new(
//!     observable_listeners::listener::ListenerKind::Invalidation,
//!     "boom",
//! ));
//! assert_eq!(reported.get(), 1);
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread::Thread;

use crate::listener::ListenerKind;

const NON_STRING_PAYLOAD: &str = "listener panicked with a non-string payload";

/// A fault raised by a listener body during dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerFault {
    kind: ListenerKind,
    message: String,
}

impl ListenerFault {
    /// Creates a fault for a listener of the given kind.
    pub fn new(kind: ListenerKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Builds a fault from a caught panic payload.
    ///
    /// `&str` and `String` payloads become the message.
    pub fn from_panic(kind: ListenerKind, payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|message| (*message).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| NON_STRING_PAYLOAD.to_owned());
        Self { kind, message }
    }

    /// Returns the kind of the listener that failed.
    #[inline]
    pub const fn kind(&self) -> ListenerKind {
        self.kind
    }

    /// Returns the fault message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ListenerFault {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} panicked: {}", self.kind, self.message)
    }
}

impl std::error::Error for ListenerFault {}

/// Receives faults raised by listeners.
///
/// Implemented for any `Fn(&Thread, &ListenerFault)`.
pub trait FaultReporter {
    /// Handles one fault. `thread` is the thread the listener ran on.
    ///
    /// A panic raised here is caught and dropped; dispatch continues with
    /// the next listener.
    fn report(&self, thread: &Thread, fault: &ListenerFault);
}

impl<F> FaultReporter for F
where
    F: Fn(&Thread, &ListenerFault) + ?Sized,
{
    #[inline]
    fn report(&self, thread: &Thread, fault: &ListenerFault) {
        self(thread, fault);
    }
}

/// Logs every fault at error level.
///
/// With the `tracing` feature disabled the fault is written to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFaultReporter;

impl FaultReporter for TracingFaultReporter {
    fn report(&self, thread: &Thread, fault: &ListenerFault) {
        let thread_name = thread.name().unwrap_or("<unnamed>");
        #[cfg(feature = "tracing")]
        tracing::error!(
            thread = thread_name,
            kind = %fault.kind(),
            message = fault.message(),
            "listener fault during change notification"
        );
        #[cfg(not(feature = "tracing"))]
        eprintln!("listener fault on thread '{thread_name}': {fault}");
    }
}

/// Drops every fault.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentFaultReporter;

impl FaultReporter for SilentFaultReporter {
    #[inline]
    fn report(&self, _thread: &Thread, _fault: &ListenerFault) {}
}

/// Returns the reporter used when none is injected.
#[inline]
pub const fn default_reporter() -> TracingFaultReporter {
    TracingFaultReporter
}

/// Runs one listener invocation, forwarding a panic to `reporter`.
///
/// Returns `false` if the invocation panicked. A panic raised by the
/// reporter itself is discarded.
pub(crate) fn isolate<F>(kind: ListenerKind, reporter: &dyn FaultReporter, invocation: F) -> bool
where
    F: FnOnce(),
{
    match catch_unwind(AssertUnwindSafe(invocation)) {
        Ok(()) => true,
        Err(payload) => {
            let fault = ListenerFault::from_panic(kind, payload.as_ref());
            let thread = std::thread::current();
            let _ = catch_unwind(AssertUnwindSafe(|| reporter.report(&thread, &fault)));
            false
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::cell::RefCell;

    #[rstest]
    fn test_from_panic_with_str_payload() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        let fault = ListenerFault::from_panic(ListenerKind::Change, payload.as_ref());
        assert_eq!(fault.message(), "boom");
        assert_eq!(fault.kind(), ListenerKind::Change);
    }

    #[rstest]
    fn test_from_panic_with_string_payload() {
        let payload: Box<dyn Any + Send> = Box::new(String::from("formatted 42"));
        let fault = ListenerFault::from_panic(ListenerKind::Invalidation, payload.as_ref());
        assert_eq!(fault.message(), "formatted 42");
    }

    #[rstest]
    fn test_from_panic_with_other_payload() {
        let payload: Box<dyn Any + Send> = Box::new(17_u8);
        let fault = ListenerFault::from_panic(ListenerKind::ComplexChange, payload.as_ref());
        assert_eq!(fault.message(), NON_STRING_PAYLOAD);
    }

    #[rstest]
    fn test_display() {
        let fault = ListenerFault::new(ListenerKind::Invalidation, "boom");
        assert_eq!(fault.to_string(), "invalidation listener panicked: boom");
    }

    #[rstest]
    fn test_isolate_reports_panic_and_returns_false() {
        let faults = RefCell::new(Vec::new());
        let reporter = |_: &Thread, fault: &ListenerFault| faults.borrow_mut().push(fault.clone());

        let completed = isolate(ListenerKind::Change, &reporter, || panic!("listener failed"));

        assert!(!completed);
        assert_eq!(
            *faults.borrow(),
            vec![ListenerFault::new(ListenerKind::Change, "listener failed")]
        );
    }

    #[rstest]
    fn test_isolate_passes_through_success() {
        let faults = RefCell::new(Vec::<ListenerFault>::new());
        let reporter = |_: &Thread, fault: &ListenerFault| faults.borrow_mut().push(fault.clone());

        assert!(isolate(ListenerKind::Invalidation, &reporter, || {}));
        assert!(faults.borrow().is_empty());
    }

    #[rstest]
    fn test_isolate_contains_panicking_reporter() {
        let reports = std::cell::Cell::new(0);
        let reporter = |_: &Thread, _: &ListenerFault| {
            reports.set(reports.get() + 1);
            if reports.get() > 0 {
                panic!("reporter failed");
            }
        };

        let completed = isolate(ListenerKind::ComplexChange, &reporter, || panic!("listener failed"));

        assert!(!completed);
        assert_eq!(reports.get(), 1);
    }

    #[rstest]
    fn test_reporter_receives_current_thread() {
        let seen = RefCell::new(None);
        let reporter = |thread: &Thread, _: &ListenerFault| *seen.borrow_mut() = Some(thread.id());

        isolate(ListenerKind::Invalidation, &reporter, || panic!("x"));

        assert_eq!(*seen.borrow(), Some(std::thread::current().id()));
    }
}
