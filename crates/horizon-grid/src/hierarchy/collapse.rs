//! Collapsing of hierarchical column subtrees.

use std::collections::HashSet;

use super::reader::HierarchicalReader;
use super::tree::NodeId;

/// Which leaf columns are collapsed or hidden by a collapse.
///
/// Collapsing the subtree of an ancestor keeps the clicked leaf visible as the
/// "collapsed subtree" representative and hides every other leaf under that
/// ancestor.
#[derive(Debug, Clone, Default)]
pub struct CollapseState {
    collapsed: HashSet<NodeId>,
    hidden: HashSet<NodeId>,
}

impl CollapseState {
    /// Create a state with nothing collapsed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle the collapse of the subtree rooted at `column`'s ancestor at
    /// `depth`.
    ///
    /// Returns `false` (and changes nothing) when there is no such ancestor or
    /// the ancestor is a leaf.
    pub fn collapse_subtree(&mut self, reader: &HierarchicalReader, column: NodeId, depth: usize) -> bool {
        let Some(ancestor) = reader.ancestor_at_depth(column, depth) else {
            return false;
        };
        if reader.tree().is_leaf(ancestor) {
            return false;
        }

        let leaves = reader.leaves_in_subtree(ancestor);
        if self.collapsed.contains(&column) {
            for leaf in &leaves {
                self.collapsed.remove(leaf);
                self.hidden.remove(leaf);
            }
        } else {
            for &leaf in &leaves {
                if leaf == column {
                    self.hidden.remove(&leaf);
                    self.collapsed.insert(leaf);
                } else {
                    self.collapsed.remove(&leaf);
                    self.hidden.insert(leaf);
                }
            }
        }
        true
    }

    /// Returns `true` if `column` represents a collapsed subtree.
    pub fn is_collapsed_subtree(&self, column: NodeId) -> bool {
        self.collapsed.contains(&column)
    }

    /// Returns `true` if `column` is hidden because a subtree was collapsed.
    pub fn is_hidden_due_to_collapse(&self, column: NodeId) -> bool {
        self.hidden.contains(&column)
    }

    /// Expand everything.
    pub fn clear(&mut self) {
        self.collapsed.clear();
        self.hidden.clear();
    }
}
