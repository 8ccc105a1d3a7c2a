//! Error types for registry operations.
//!
//! Only precondition violations are reported as errors. Faults raised by
//! listener bodies never reach the caller; see [`crate::fault`].

use std::fmt;

/// The registry operation that rejected its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Registering a listener.
    Add,
    /// Unregistering a listener.
    Remove,
}

impl fmt::Display for Operation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => formatter.write_str("add"),
            Self::Remove => formatter.write_str("remove"),
        }
    }
}

/// Represents errors returned by [`ListenerRegistry`](crate::registry::ListenerRegistry).
///
/// # Examples
///
/// ```rust
/// use observable_listeners::error::{Operation, RegistryError};
///
/// let error = RegistryError::InvalidArgument { operation: Operation::Add };
/// assert_eq!(format!("{error}"), "add: listener must not be absent");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The listener argument was absent. Nothing was changed.
    InvalidArgument {
        /// The rejected operation.
        operation: Operation,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { operation } => {
                write!(formatter, "{operation}: listener must not be absent")
            }
        }
    }
}

impl std::error::Error for RegistryError {}
