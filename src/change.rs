//! Change descriptions delivered to change listeners.
//!
//! An observable set reports a mutation either as a [`SimpleChange`] (one
//! element added or removed) or as a [`ComplexChange`] (a batch of added and
//! removed elements). [`SetChange`] is the value the owner passes to
//! [`ListenerRegistry::fire`](crate::registry::ListenerRegistry::fire).
//!
//! # Examples
//!
//! ```rust
//! use observable_listeners::change::{ComplexChange, SetChange, SimpleChange};
//!
//! let simple = SimpleChange::removed("apple");
//! assert!(simple.was_removed());
//! assert_eq!(simple.element_removed(), Some(&"apple"));
//!
//! let complex = ComplexChange::new(["kiwi"], ["apple", "pear"]);
//! let fan_out: Vec<_> = complex.iter_simple().collect();
//! assert_eq!(fan_out.len(), 3);
//!
//! let change: SetChange<&str> = complex.into();
//! assert!(!change.is_simple());
//! ```

use smallvec::SmallVec;

/// Inline capacity of the element sequences of a [`ComplexChange`].
const INLINE_ELEMENTS: usize = 4;

/// Direction of a single-element change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// The element was added to the set.
    Added,
    /// The element was removed from the set.
    Removed,
}

/// A change affecting exactly one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleChange<T> {
    element: T,
    kind: ChangeKind,
}

impl<T> SimpleChange<T> {
    /// Creates a change reporting that `element` was added.
    #[inline]
    pub const fn added(element: T) -> Self {
        Self {
            element,
            kind: ChangeKind::Added,
        }
    }

    /// Creates a change reporting that `element` was removed.
    #[inline]
    pub const fn removed(element: T) -> Self {
        Self {
            element,
            kind: ChangeKind::Removed,
        }
    }

    /// Returns the direction of this change.
    #[inline]
    pub const fn kind(&self) -> ChangeKind {
        self.kind
    }

    /// Returns the affected element.
    #[inline]
    pub const fn element(&self) -> &T {
        &self.element
    }

    /// Returns `true` if the element was added.
    #[inline]
    pub const fn was_added(&self) -> bool {
        matches!(self.kind, ChangeKind::Added)
    }

    /// Returns `true` if the element was removed.
    #[inline]
    pub const fn was_removed(&self) -> bool {
        matches!(self.kind, ChangeKind::Removed)
    }

    /// Returns the added element, or `None` for a removal.
    #[inline]
    pub const fn element_added(&self) -> Option<&T> {
        match self.kind {
            ChangeKind::Added => Some(&self.element),
            ChangeKind::Removed => None,
        }
    }

    /// Returns the removed element, or `None` for an addition.
    #[inline]
    pub const fn element_removed(&self) -> Option<&T> {
        match self.kind {
            ChangeKind::Removed => Some(&self.element),
            ChangeKind::Added => None,
        }
    }
}

/// A batch change: a set of added elements and a set of removed elements.
///
/// Each side keeps the order in which elements were supplied; duplicates
/// within one side are dropped at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexChange<T> {
    added: SmallVec<[T; INLINE_ELEMENTS]>,
    removed: SmallVec<[T; INLINE_ELEMENTS]>,
}

impl<T: PartialEq> ComplexChange<T> {
    /// Creates a batch change from the added and removed elements.
    ///
    /// Repeated elements are dropped, keeping the first occurrence.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use observable_listeners::change::ComplexChange;
    ///
    /// let change = ComplexChange::new([1, 2, 2], Vec::<i32>::new());
    /// assert_eq!(change.added(), &[1, 2]);
    /// assert!(change.removed().is_empty());
    /// ```
    pub fn new<A, R>(added: A, removed: R) -> Self
    where
        A: IntoIterator<Item = T>,
        R: IntoIterator<Item = T>,
    {
        Self {
            added: distinct(added),
            removed: distinct(removed),
        }
    }
}

fn distinct<T, I>(elements: I) -> SmallVec<[T; INLINE_ELEMENTS]>
where
    T: PartialEq,
    I: IntoIterator<Item = T>,
{
    let mut result: SmallVec<[T; INLINE_ELEMENTS]> = SmallVec::new();
    for element in elements {
        if !result.contains(&element) {
            result.push(element);
        }
    }
    result
}

impl<T> ComplexChange<T> {
    /// Returns the added elements.
    #[inline]
    pub fn added(&self) -> &[T] {
        &self.added
    }

    /// Returns the removed elements.
    #[inline]
    pub fn removed(&self) -> &[T] {
        &self.removed
    }

    /// Returns `true` if at least one element was added.
    #[inline]
    pub fn was_added(&self) -> bool {
        !self.added.is_empty()
    }

    /// Returns `true` if at least one element was removed.
    #[inline]
    pub fn was_removed(&self) -> bool {
        !self.removed.is_empty()
    }

    /// Returns the total number of element deltas.
    #[inline]
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len()
    }

    /// Returns `true` if the change carries no element at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl<T: Clone> ComplexChange<T> {
    /// Splits this change into single-element changes.
    ///
    /// Removed elements come first, then added elements, each side in its
    /// stored order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use observable_listeners::change::{ComplexChange, SimpleChange};
    ///
    /// let change = ComplexChange::new([3], [1, 2]);
    /// let parts: Vec<SimpleChange<i32>> = change.iter_simple().collect();
    /// assert_eq!(
    ///     parts,
    ///     vec![
    ///         SimpleChange::removed(1),
    ///         SimpleChange::removed(2),
    ///         SimpleChange::added(3),
    ///     ]
    /// );
    /// ```
    pub fn iter_simple(&self) -> impl Iterator<Item = SimpleChange<T>> + '_ {
        self.removed
            .iter()
            .cloned()
            .map(SimpleChange::removed)
            .chain(self.added.iter().cloned().map(SimpleChange::added))
    }
}

impl<T> From<SimpleChange<T>> for ComplexChange<T> {
    fn from(change: SimpleChange<T>) -> Self {
        let mut side: SmallVec<[T; INLINE_ELEMENTS]> = SmallVec::new();
        let kind = change.kind;
        side.push(change.element);
        match kind {
            ChangeKind::Added => Self {
                added: side,
                removed: SmallVec::new(),
            },
            ChangeKind::Removed => Self {
                added: SmallVec::new(),
                removed: side,
            },
        }
    }
}

/// The change event an owner fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetChange<T> {
    /// A single element was added or removed.
    Simple(SimpleChange<T>),
    /// A batch of elements was added and/or removed.
    Complex(ComplexChange<T>),
}

impl<T> SetChange<T> {
    /// Returns `true` for the single-element shape.
    #[inline]
    pub const fn is_simple(&self) -> bool {
        matches!(self, Self::Simple(_))
    }
}

impl<T> From<SimpleChange<T>> for SetChange<T> {
    fn from(change: SimpleChange<T>) -> Self {
        Self::Simple(change)
    }
}

impl<T> From<ComplexChange<T>> for SetChange<T> {
    fn from(change: ComplexChange<T>) -> Self {
        Self::Complex(change)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SimpleChange::added(7), true, Some(7), None)]
    #[case(SimpleChange::removed(7), false, None, Some(7))]
    fn test_simple_change_accessors(
        #[case] change: SimpleChange<i32>,
        #[case] added: bool,
        #[case] element_added: Option<i32>,
        #[case] element_removed: Option<i32>,
    ) {
        assert_eq!(change.was_added(), added);
        assert_eq!(change.was_removed(), !added);
        assert_eq!(change.element_added().copied(), element_added);
        assert_eq!(change.element_removed().copied(), element_removed);
        assert_eq!(*change.element(), 7);
    }

    #[rstest]
    fn test_complex_change_drops_duplicates_per_side() {
        let change = ComplexChange::new([1, 1, 2], [2, 3, 3]);
        assert_eq!(change.added(), &[1, 2]);
        assert_eq!(change.removed(), &[2, 3]);
        assert_eq!(change.len(), 4);
    }

    #[rstest]
    fn test_empty_complex_change() {
        let change: ComplexChange<i32> = ComplexChange::new([], []);
        assert!(change.is_empty());
        assert!(!change.was_added());
        assert!(!change.was_removed());
        assert_eq!(change.iter_simple().count(), 0);
    }

    #[rstest]
    fn test_simple_adapts_to_complex() {
        let change: ComplexChange<&str> = SimpleChange::removed("a").into();
        assert!(change.added().is_empty());
        assert_eq!(change.removed(), &["a"]);

        let change: ComplexChange<&str> = SimpleChange::added("b").into();
        assert_eq!(change.added(), &["b"]);
        assert!(change.removed().is_empty());
    }

    #[rstest]
    fn test_iter_simple_removed_before_added() {
        let change = ComplexChange::new(["x"], ["y"]);
        let kinds: Vec<ChangeKind> = change.iter_simple().map(|c| c.kind()).collect();
        assert_eq!(kinds, vec![ChangeKind::Removed, ChangeKind::Added]);
    }

    #[rstest]
    fn test_set_change_from_shapes() {
        let simple: SetChange<i32> = SimpleChange::added(1).into();
        let complex: SetChange<i32> = ComplexChange::new([1], []).into();
        assert!(simple.is_simple());
        assert!(!complex.is_simple());
    }
}
