//! Per-kind listener storage with automatic shape transitions.
//!
//! # State Transitions
//!
//! ```text
//!              push                 push
//!     Empty ─────────► Single ─────────────► Many
//!       ▲                │  ▲                  │
//!       │ remove         │  │ remove / compact │
//!       └────────────────┘  └──────────────────┘
//! ```
//!
//! While a dispatch is running, positions must stay stable: a removal only
//! tombstones its slot (a removed `Single` becomes a `Many` holding one
//! tombstone), pushes only append, and nothing is demoted. [`Track::compact`]
//! restores the canonical shape once the outermost dispatch has finished.

use smallvec::SmallVec;

use super::StorageShape;

/// Number of slots a `Many` track holds before spilling to the heap.
const INLINE_LISTENERS: usize = 4;

type Slots<L> = SmallVec<[Option<L>; INLINE_LISTENERS]>;

/// Ordered storage for the listeners of one kind.
pub(crate) enum Track<L> {
    /// No listener.
    Empty,
    /// Exactly one listener, stored without a container.
    Single(L),
    /// Two or more slots. `None` marks a listener removed during dispatch.
    Many {
        slots: Slots<L>,
        live: usize,
    },
}

impl<L: Clone> Track<L> {
    #[inline]
    pub(crate) const fn new() -> Self {
        Self::Empty
    }

    pub(crate) const fn shape(&self) -> StorageShape {
        match self {
            Self::Empty => StorageShape::Empty,
            Self::Single(_) => StorageShape::Single,
            Self::Many { .. } => StorageShape::Many,
        }
    }

    /// Number of registered, not removed, listeners.
    pub(crate) const fn live_len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Single(_) => 1,
            Self::Many { live, .. } => *live,
        }
    }

    /// Number of positions, tombstones included.
    ///
    /// A dispatch visits exactly the positions below the count it read when
    /// it started.
    pub(crate) fn position_count(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Single(_) => 1,
            Self::Many { slots, .. } => slots.len(),
        }
    }

    /// Returns the live listener at `position`, if any.
    pub(crate) fn slot(&self, position: usize) -> Option<L> {
        match self {
            Self::Empty => None,
            Self::Single(listener) => (position == 0).then(|| listener.clone()),
            Self::Many { slots, .. } => slots.get(position).and_then(Clone::clone),
        }
    }

    /// Appends a listener, promoting `Empty -> Single -> Many`.
    pub(crate) fn push(&mut self, listener: L) {
        match self {
            Self::Empty => *self = Self::Single(listener),
            Self::Single(existing) => {
                let mut slots: Slots<L> = SmallVec::new();
                slots.push(Some(existing.clone()));
                slots.push(Some(listener));
                *self = Self::Many { slots, live: 2 };
            }
            Self::Many { slots, live } => {
                slots.push(Some(listener));
                *live += 1;
            }
        }
    }

    /// Removes the first live listener matching `is_target`.
    ///
    /// With `deferred` set the slot is tombstoned in place; otherwise the
    /// track is compacted immediately. Returns `true` if a listener was
    /// removed.
    pub(crate) fn remove_first<P>(&mut self, is_target: P, deferred: bool) -> bool
    where
        P: Fn(&L) -> bool,
    {
        match self {
            Self::Empty => false,
            Self::Single(listener) => {
                if !is_target(listener) {
                    return false;
                }
                *self = if deferred {
                    let mut slots: Slots<L> = SmallVec::new();
                    slots.push(None);
                    Self::Many { slots, live: 0 }
                } else {
                    Self::Empty
                };
                true
            }
            Self::Many { slots, live } => {
                let Some(position) = slots
                    .iter()
                    .position(|slot| slot.as_ref().is_some_and(&is_target))
                else {
                    return false;
                };
                slots[position] = None;
                *live -= 1;
                if !deferred {
                    self.compact();
                }
                true
            }
        }
    }

    /// Drops tombstones and demotes to the smallest shape that fits.
    ///
    /// Returns the number of tombstones dropped.
    pub(crate) fn compact(&mut self) -> usize {
        let Self::Many { slots, live } = self else {
            return 0;
        };
        let live = *live;
        let dropped = slots.len() - live;
        match live {
            0 => *self = Self::Empty,
            1 => {
                let survivor = slots.iter_mut().find_map(Option::take);
                *self = survivor.map_or(Self::Empty, Self::Single);
            }
            _ => slots.retain(|slot| slot.is_some()),
        }
        dropped
    }
}

impl<L: Clone> Default for Track<L> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
