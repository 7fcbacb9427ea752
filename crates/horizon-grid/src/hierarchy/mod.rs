//! Hierarchical columns.
//!
//! Semi-structured sources deliver columns grouped into sub-columns, with each
//! row holding nested arrays of values. This module flattens such a schema
//! into one linear sequence of leaf columns.
//!
//! - [`ColumnTree`]: arena of column nodes with dense depth-first leaf numbers
//! - [`HierarchicalReader`]: cached path, leaf, depth and ancestor queries plus
//!   value extraction and type inference
//! - [`CollapseState`]: collapsed subtrees and the leaves they hide
//! - [`HierarchicalModel`]: a [`TabularModel`](crate::model::TabularModel)
//!   exposing one column per leaf over a wrapped model
//!
//! # Example
//!
//! ```
//! use horizon_grid::hierarchy::{ColumnNameNode, HierarchicalReader};
//!
//! let reader = HierarchicalReader::new(&[
//!     ColumnNameNode::group("user", vec![
//!         ColumnNameNode::leaf("name"),
//!         ColumnNameNode::leaf("age"),
//!     ]),
//!     ColumnNameNode::leaf("score"),
//! ]);
//!
//! assert_eq!(reader.leaf_count(), 3);
//! assert_eq!(reader.path_of_leaf(0), Some(&[0, 0][..]));
//! assert_eq!(reader.path_of_leaf(2), Some(&[1][..]));
//! ```

mod collapse;
mod model;
mod reader;
mod tree;

pub use collapse::CollapseState;
pub use model::HierarchicalModel;
pub use reader::HierarchicalReader;
pub use tree::{ColumnNameNode, ColumnTree, NodeId};
