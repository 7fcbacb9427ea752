//! Coordinates of entered nested tables.

use std::fmt;

/// A cell position inside one level of nested tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinate {
    /// Zero-based row.
    pub row: usize,
    /// Zero-based column.
    pub column: usize,
}

impl Coordinate {
    /// Create a coordinate.
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// The stack of coordinates leading from the top-level grid to the currently
/// entered nested table. Empty means the top level is shown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NavigationPath {
    coordinates: Vec<Coordinate>,
}

impl NavigationPath {
    /// Create an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entered levels.
    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    /// Returns `true` at the top level.
    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// The innermost coordinate.
    pub fn last(&self) -> Option<Coordinate> {
        self.coordinates.last().copied()
    }

    /// Coordinates, outermost first.
    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    /// Iterate over coordinates, outermost first.
    pub fn iter(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.coordinates.iter().copied()
    }

    pub(crate) fn push(&mut self, coordinate: Coordinate) {
        self.coordinates.push(coordinate);
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.coordinates.truncate(len);
    }

    pub(crate) fn clear(&mut self) {
        self.coordinates.clear();
    }
}

impl fmt::Display for NavigationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("top")?;
        for coordinate in &self.coordinates {
            write!(f, " > {coordinate}")?;
        }
        Ok(())
    }
}
