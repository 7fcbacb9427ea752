//! Typed row and column indices in two coordinate spaces.
//!
//! Every index carries two compile-time tags:
//!
//! - its **space**: [`Model`] (logical, stable data order) or [`View`]
//!   (the order currently displayed after sorting and filtering)
//! - its **axis**: [`Row`] or [`Column`]
//!
//! Indices of different spaces or axes are different types, so comparing a
//! model row against a view row does not compile. Conversion between spaces
//! goes through caller-supplied integer maps; the display layer owns those
//! maps and the data core never assumes any particular sort or filter.
//!
//! # Example
//!
//! ```
//! use horizon_grid::index::{ModelRow, ViewRow};
//!
//! // The display shows rows in reverse order.
//! let count = 5;
//! let reverse = move |i: i64| count - 1 - i;
//!
//! let model = ModelRow::new(1);
//! let view: ViewRow = model.to_view(reverse);
//! assert_eq!(view.value(), 3);
//! assert_eq!(view.to_model(reverse), model);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::model::TabularModel;

/// The raw value of an index that does not address anything.
pub const NOT_FOUND: i64 = -1;

/// Runtime tag for a coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpaceKind {
    /// Logical data order.
    Model,
    /// Displayed order.
    View,
}

/// Runtime tag for an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisKind {
    /// Rows.
    Row,
    /// Columns.
    Column,
}

impl fmt::Display for AxisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisKind::Row => f.write_str("row"),
            AxisKind::Column => f.write_str("column"),
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A coordinate space marker.
pub trait Space: sealed::Sealed + Copy + Send + Sync + 'static {
    /// The runtime tag of this space.
    const KIND: SpaceKind;
    /// Short name used in debug output.
    const NAME: &'static str;
}

/// An axis marker.
pub trait Axis: sealed::Sealed + Copy + Send + Sync + 'static {
    /// The runtime tag of this axis.
    const KIND: AxisKind;
    /// Short name used in debug output.
    const NAME: &'static str;

    /// Number of addressable entries along this axis of a model.
    fn extent<M: TabularModel + ?Sized>(model: &M) -> usize;
}

/// Logical data order.
#[derive(Debug, Clone, Copy)]
pub struct Model;

/// Displayed order.
#[derive(Debug, Clone, Copy)]
pub struct View;

/// Row axis.
#[derive(Debug, Clone, Copy)]
pub struct Row;

/// Column axis.
#[derive(Debug, Clone, Copy)]
pub struct Column;

impl sealed::Sealed for Model {}
impl sealed::Sealed for View {}
impl sealed::Sealed for Row {}
impl sealed::Sealed for Column {}

impl Space for Model {
    const KIND: SpaceKind = SpaceKind::Model;
    const NAME: &'static str = "Model";
}

impl Space for View {
    const KIND: SpaceKind = SpaceKind::View;
    const NAME: &'static str = "View";
}

impl Axis for Row {
    const KIND: AxisKind = AxisKind::Row;
    const NAME: &'static str = "Row";

    fn extent<M: TabularModel + ?Sized>(model: &M) -> usize {
        model.row_count()
    }
}

impl Axis for Column {
    const KIND: AxisKind = AxisKind::Column;
    const NAME: &'static str = "Column";

    fn extent<M: TabularModel + ?Sized>(model: &M) -> usize {
        model.column_count()
    }
}

/// An integer handle tagged with a coordinate space and an axis.
pub struct Index<S: Space, A: Axis> {
    value: i64,
    _marker: PhantomData<fn() -> (S, A)>,
}

/// An index in logical data order.
pub type ModelIndex<A> = Index<Model, A>;
/// An index in displayed order.
pub type ViewIndex<A> = Index<View, A>;
/// A row in logical data order.
pub type ModelRow = Index<Model, Row>;
/// A column in logical data order.
pub type ModelColumn = Index<Model, Column>;
/// A row in displayed order.
pub type ViewRow = Index<View, Row>;
/// A column in displayed order.
pub type ViewColumn = Index<View, Column>;

impl<S: Space, A: Axis> Index<S, A> {
    /// Create an index for a zero-based position.
    #[inline]
    pub fn new(value: usize) -> Self {
        Self::from_raw(value as i64)
    }

    /// Create an index from a raw value, which may be [`NOT_FOUND`].
    #[inline]
    pub const fn from_raw(value: i64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    /// The "not found" index.
    #[inline]
    pub const fn not_found() -> Self {
        Self::from_raw(NOT_FOUND)
    }

    /// The raw integer value.
    #[inline]
    pub const fn value(self) -> i64 {
        self.value
    }

    /// The position as `usize`, or `None` for negative values.
    #[inline]
    pub fn as_usize(self) -> Option<usize> {
        usize::try_from(self.value).ok()
    }

    /// Returns `true` unless this is a negative ("not found") index.
    #[inline]
    pub const fn is_found(self) -> bool {
        self.value >= 0
    }

    /// Returns `true` if the index addresses an existing entry of `model`.
    pub fn is_valid<M: TabularModel + ?Sized>(self, model: &M) -> bool {
        self.as_usize().is_some_and(|i| i < A::extent(model))
    }
}

impl<A: Axis> Index<Model, A> {
    /// Convert to display order using the given map.
    pub fn to_view(self, conversion: impl Fn(i64) -> i64) -> Index<View, A> {
        Index::from_raw(conversion(self.value))
    }
}

impl<A: Axis> Index<View, A> {
    /// Convert to logical order using the given map.
    pub fn to_model(self, conversion: impl Fn(i64) -> i64) -> Index<Model, A> {
        Index::from_raw(conversion(self.value))
    }
}

/// Convert a model index to display order.
pub fn to_view<A: Axis>(index: ModelIndex<A>, conversion: impl Fn(i64) -> i64) -> ViewIndex<A> {
    index.to_view(conversion)
}

/// Convert a display index to logical order.
pub fn to_model<A: Axis>(index: ViewIndex<A>, conversion: impl Fn(i64) -> i64) -> ModelIndex<A> {
    index.to_model(conversion)
}

/// Convert every element of a set to display order, preserving order.
pub fn to_view_set<A: Axis>(
    set: &IndexSet<Model, A>,
    conversion: impl Fn(i64) -> i64,
) -> IndexSet<View, A> {
    set.iter().map(|i| i.to_view(&conversion)).collect()
}

/// Convert every element of a set to logical order, preserving order.
pub fn to_model_set<A: Axis>(
    set: &IndexSet<View, A>,
    conversion: impl Fn(i64) -> i64,
) -> IndexSet<Model, A> {
    set.iter().map(|i| i.to_model(&conversion)).collect()
}

// Manual impls so the marker types need no bounds.

impl<S: Space, A: Axis> Clone for Index<S, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: Space, A: Axis> Copy for Index<S, A> {}

impl<S: Space, A: Axis> PartialEq for Index<S, A> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<S: Space, A: Axis> Eq for Index<S, A> {}

impl<S: Space, A: Axis> PartialOrd for Index<S, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S: Space, A: Axis> Ord for Index<S, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<S: Space, A: Axis> Hash for Index<S, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<S: Space, A: Axis> fmt::Debug for Index<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}({})", S::NAME, A::NAME, self.value)
    }
}

impl<S: Space, A: Axis> fmt::Display for Index<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// An ordered sequence of indices of one space and axis.
///
/// Equality is positional: two sets are equal when they hold the same
/// indices in the same order.
pub struct IndexSet<S: Space, A: Axis> {
    indices: Vec<Index<S, A>>,
}

impl<S: Space, A: Axis> IndexSet<S, A> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            indices: Vec::new(),
        }
    }

    /// Create a set from zero-based positions.
    pub fn from_values(values: impl IntoIterator<Item = usize>) -> Self {
        values.into_iter().map(Index::new).collect()
    }

    /// Append an index.
    pub fn push(&mut self, index: Index<S, A>) {
        self.indices.push(index);
    }

    /// First index, if any.
    pub fn first(&self) -> Option<Index<S, A>> {
        self.indices.first().copied()
    }

    /// Last index, if any.
    pub fn last(&self) -> Option<Index<S, A>> {
        self.indices.last().copied()
    }

    /// Number of indices.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if the set holds no indices.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns `true` if the set holds `index`.
    pub fn contains(&self, index: Index<S, A>) -> bool {
        self.indices.contains(&index)
    }

    /// Iterate in order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Index<S, A>> + ExactSizeIterator + '_ {
        self.indices.iter().copied()
    }

    /// The indices as a slice.
    pub fn as_slice(&self) -> &[Index<S, A>] {
        &self.indices
    }

    /// A copy of this set sorted ascending with duplicates removed.
    pub fn sorted(&self) -> Self {
        let mut indices = self.indices.clone();
        indices.sort();
        indices.dedup();
        Self { indices }
    }
}

impl<S: Space, A: Axis> Default for IndexSet<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Space, A: Axis> Clone for IndexSet<S, A> {
    fn clone(&self) -> Self {
        Self {
            indices: self.indices.clone(),
        }
    }
}

impl<S: Space, A: Axis> PartialEq for IndexSet<S, A> {
    fn eq(&self, other: &Self) -> bool {
        self.indices == other.indices
    }
}

impl<S: Space, A: Axis> Eq for IndexSet<S, A> {}

impl<S: Space, A: Axis> fmt::Debug for IndexSet<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.indices.iter()).finish()
    }
}

impl<S: Space, A: Axis> FromIterator<Index<S, A>> for IndexSet<S, A> {
    fn from_iter<I: IntoIterator<Item = Index<S, A>>>(iter: I) -> Self {
        Self {
            indices: iter.into_iter().collect(),
        }
    }
}

impl<S: Space, A: Axis> IntoIterator for IndexSet<S, A> {
    type Item = Index<S, A>;
    type IntoIter = std::vec::IntoIter<Index<S, A>>;

    fn into_iter(self) -> Self::IntoIter {
        self.indices.into_iter()
    }
}

impl<S: Space, A: Axis> From<Vec<Index<S, A>>> for IndexSet<S, A> {
    fn from(indices: Vec<Index<S, A>>) -> Self {
        Self { indices }
    }
}

/// A type-erased index, for code paths that must carry indices of either
/// space or axis through one channel (e.g. a selection snapshot).
///
/// Comparing or downcasting across spaces or axes is a programming error and
/// panics.
#[derive(Debug, Clone, Copy, Hash)]
pub struct AnyIndex {
    space: SpaceKind,
    axis: AxisKind,
    value: i64,
}

impl AnyIndex {
    /// The coordinate space of the erased index.
    pub fn space(&self) -> SpaceKind {
        self.space
    }

    /// The axis of the erased index.
    pub fn axis(&self) -> AxisKind {
        self.axis
    }

    /// The raw value.
    pub fn value(&self) -> i64 {
        self.value
    }

    /// Recover the typed index.
    ///
    /// # Panics
    ///
    /// Panics if `S`/`A` do not match the erased space and axis.
    pub fn downcast<S: Space, A: Axis>(self) -> Index<S, A> {
        assert_same_kind(self.space, self.axis, S::KIND, A::KIND);
        Index::from_raw(self.value)
    }
}

impl<S: Space, A: Axis> From<Index<S, A>> for AnyIndex {
    fn from(index: Index<S, A>) -> Self {
        Self {
            space: S::KIND,
            axis: A::KIND,
            value: index.value,
        }
    }
}

impl PartialEq for AnyIndex {
    /// # Panics
    ///
    /// Panics when the two indices belong to different spaces or axes.
    fn eq(&self, other: &Self) -> bool {
        assert_same_kind(self.space, self.axis, other.space, other.axis);
        self.value == other.value
    }
}

impl Eq for AnyIndex {}

fn assert_same_kind(space: SpaceKind, axis: AxisKind, other_space: SpaceKind, other_axis: AxisKind) {
    assert!(
        space == other_space && axis == other_axis,
        "index space violation: {space:?} {axis} index used as {other_space:?} {other_axis} index"
    );
}
