//! Cached queries over a hierarchical column tree.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::{GridError, Result};
use crate::logging::targets;
use crate::model::GridRow;
use crate::value::{CellValue, ColumnType, TypeMerger};

use super::tree::{ColumnNameNode, ColumnTree, NodeId};

/// Read access to a hierarchical column tree with cached lookups.
///
/// The leaf list and every leaf's ancestor chain are derived once from a
/// single depth-first walk when the tree is (re)built. Path validity is cached
/// per distinct path value. All caches are dropped together whenever
/// [`set_columns`](Self::set_columns) rebuilds the tree.
#[derive(Debug, Default)]
pub struct HierarchicalReader {
    tree: ColumnTree,
    /// For every leaf, its ancestors from the top level down, itself last.
    leaf_ancestors: Vec<Vec<NodeId>>,
    valid_paths: Mutex<HashMap<Vec<usize>, bool>>,
    depth_of_hierarchy: usize,
}

impl HierarchicalReader {
    /// Build a reader for the given top-level column names.
    pub fn new(roots: &[ColumnNameNode]) -> Self {
        let mut reader = Self::default();
        reader.set_columns(roots);
        reader
    }

    /// Rebuild the tree and drop every cached query.
    pub fn set_columns(&mut self, roots: &[ColumnNameNode]) {
        let _span = tracing::debug_span!(
            target: targets::HIERARCHY,
            "horizon_grid::hierarchy",
            roots = roots.len()
        )
        .entered();

        self.tree = ColumnTree::build(roots);
        self.leaf_ancestors = collect_leaf_ancestors(&self.tree);
        self.valid_paths.lock().clear();
        self.depth_of_hierarchy = self.max_depth(|_| false);

        tracing::debug!(
            target: targets::HIERARCHY,
            nodes = self.tree.len(),
            leaves = self.leaf_count(),
            depth = self.depth_of_hierarchy,
            "column tree rebuilt"
        );
    }

    /// The underlying tree.
    pub fn tree(&self) -> &ColumnTree {
        &self.tree
    }

    /// Leaf nodes in leaf-number order.
    pub fn leaves(&self) -> &[NodeId] {
        self.tree.leaves()
    }

    /// Number of leaf columns.
    pub fn leaf_count(&self) -> usize {
        self.tree.leaves().len()
    }

    /// Path of the leaf with leaf number `leaf`.
    pub fn path_of_leaf(&self, leaf: usize) -> Option<&[usize]> {
        self.tree.leaf(leaf).map(|id| self.tree.path(id))
    }

    /// Ancestors of the leaf with leaf number `leaf`, top level first and the
    /// leaf itself last.
    pub fn ancestors_of_leaf(&self, leaf: usize) -> Option<&[NodeId]> {
        self.leaf_ancestors.get(leaf).map(Vec::as_slice)
    }

    /// Returns `true` if some leaf's path starts with `path`.
    ///
    /// Results are cached by path value.
    pub fn is_valid_path(&self, path: &[usize]) -> bool {
        if path.is_empty() {
            return false;
        }
        if let Some(&cached) = self.valid_paths.lock().get(path) {
            return cached;
        }
        let valid = self
            .tree
            .leaves()
            .iter()
            .any(|&leaf| self.tree.path(leaf).starts_with(path));
        self.valid_paths.lock().insert(path.to_vec(), valid);
        valid
    }

    /// Number of cached path validity results.
    pub fn cached_path_count(&self) -> usize {
        self.valid_paths.lock().len()
    }

    /// The ancestor of `node` at `depth` (top level = 1). A node is its own
    /// ancestor at its own depth.
    pub fn ancestor_at_depth(&self, node: NodeId, depth: usize) -> Option<NodeId> {
        let node_depth = self.tree.depth(node);
        if depth == 0 || depth > node_depth {
            return None;
        }
        let mut current = node;
        for _ in depth..node_depth {
            current = self.tree.parent(current)?;
        }
        Some(current)
    }

    /// The other children of `node`'s parent (or the other top-level nodes).
    pub fn siblings(&self, node: NodeId) -> Vec<NodeId> {
        let all = match self.tree.parent(node) {
            Some(parent) => self.tree.children(parent),
            None => self.tree.roots(),
        };
        all.iter().copied().filter(|&id| id != node).collect()
    }

    /// All leaves under `node`, in leaf-number order. A leaf yields itself.
    pub fn leaves_in_subtree(&self, node: NodeId) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let children = self.tree.children(current);
            if children.is_empty() {
                leaves.push(current);
            } else {
                stack.extend(children.iter().rev());
            }
        }
        leaves
    }

    /// Depth of the deepest branch, ignoring nodes matching `skip` (and
    /// everything below them).
    pub fn max_depth(&self, skip: impl Fn(NodeId) -> bool) -> usize {
        fn depth_of(tree: &ColumnTree, node: NodeId, skip: &dyn Fn(NodeId) -> bool) -> usize {
            1 + tree
                .children(node)
                .iter()
                .filter(|&&child| !skip(child))
                .map(|&child| depth_of(tree, child, skip))
                .max()
                .unwrap_or(0)
        }
        self.tree
            .roots()
            .iter()
            .filter(|&&root| !skip(root))
            .map(|&root| depth_of(&self.tree, root, &skip))
            .max()
            .unwrap_or(0)
    }

    /// Recompute the stored number of header lines.
    pub fn update_depth_of_hierarchy(&mut self, skip: impl Fn(NodeId) -> bool) -> usize {
        self.depth_of_hierarchy = self.max_depth(skip);
        self.depth_of_hierarchy
    }

    /// Number of header lines needed to show every level.
    pub fn depth_of_hierarchy(&self) -> usize {
        self.depth_of_hierarchy
    }

    /// Header text for a leaf, one line per level from the top down.
    pub fn header_lines(&self, leaf: usize) -> Vec<String> {
        self.ancestors_of_leaf(leaf)
            .map(|chain| chain.iter().map(|&id| self.tree.name(id).to_string()).collect())
            .unwrap_or_default()
    }

    /// Returns `true` if `node` is the last non-skipped leaf of `ancestor`'s
    /// subtree.
    pub fn is_right_most_child_of_ancestor(
        &self,
        node: NodeId,
        ancestor: NodeId,
        skip: impl Fn(NodeId) -> bool,
    ) -> bool {
        self.leaves_in_subtree(ancestor)
            .into_iter()
            .rev()
            .find(|&leaf| !skip(leaf))
            == Some(node)
    }

    /// The nearest ancestor of `node` having a direct leaf child whose leaf
    /// number is selected.
    pub fn closest_ancestor_with_selected_direct_leaf(
        &self,
        node: NodeId,
        selected: impl Fn(usize) -> bool,
    ) -> Option<NodeId> {
        self.ancestors(node)
            .find(|&ancestor| self.has_selected_direct_leaf(ancestor, &selected))
    }

    /// The highest ancestor of `node` having a direct leaf child whose leaf
    /// number is selected.
    pub fn last_ancestor_with_selected_direct_leaf(
        &self,
        node: NodeId,
        selected: impl Fn(usize) -> bool,
    ) -> Option<NodeId> {
        self.ancestors(node)
            .filter(|&ancestor| self.has_selected_direct_leaf(ancestor, &selected))
            .last()
    }

    fn has_selected_direct_leaf(&self, node: NodeId, selected: &impl Fn(usize) -> bool) -> bool {
        self.tree
            .children(node)
            .iter()
            .filter_map(|&child| self.tree.leaf_number(child))
            .any(selected)
    }

    /// Proper ancestors of `node`, nearest first.
    fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.tree.parent(node), |&id| self.tree.parent(id))
    }

    /// Resolve `path` against a row's flat values.
    ///
    /// The first path element indexes the row; every further element indexes
    /// into the array value reached so far. Any gap is an error for this row.
    pub fn value_at(&self, row: &GridRow, path: &[usize]) -> Result<CellValue> {
        let fail = |reason: String| {
            tracing::warn!(
                target: targets::HIERARCHY,
                row = row.number(),
                ?path,
                %reason,
                "hierarchical path error"
            );
            GridError::hierarchical_path(row.number(), path, reason)
        };

        let Some((&first, rest)) = path.split_first() else {
            return Err(fail("empty path".to_string()));
        };
        let mut current = row.value(first).ok_or_else(|| {
            fail(format!("index {first} past end of row of length {}", row.len()))
        })?;
        for (depth, &position) in rest.iter().enumerate() {
            let values = current.as_array().ok_or_else(|| {
                fail(format!("value at depth {} is not a collection", depth + 1))
            })?;
            current = values.get(position).ok_or_else(|| {
                fail(format!(
                    "index {position} past end of collection of length {} at depth {}",
                    values.len(),
                    depth + 1
                ))
            })?;
        }
        Ok(current.clone())
    }

    /// Infer the type of the column at `path` by sampling at most
    /// `sample_size` rows. Rows the path does not resolve in are skipped.
    pub fn infer_type(&self, rows: &[GridRow], path: &[usize], sample_size: usize) -> ColumnType {
        if let Some(node) = self.tree.node_at_path(path)
            && !self.tree.is_leaf(node)
        {
            return ColumnType::Array;
        }
        let mut merger = TypeMerger::new();
        for row in rows.iter().take(sample_size) {
            if let Ok(value) = self.value_at(row, path) {
                merger.observe(&value);
            }
        }
        merger.result()
    }
}

fn collect_leaf_ancestors(tree: &ColumnTree) -> Vec<Vec<NodeId>> {
    fn walk(tree: &ColumnTree, node: NodeId, stack: &mut Vec<NodeId>, out: &mut Vec<Vec<NodeId>>) {
        stack.push(node);
        if tree.is_leaf(node) {
            out.push(stack.clone());
        } else {
            for &child in tree.children(node) {
                walk(tree, child, stack, out);
            }
        }
        stack.pop();
    }

    let mut out = Vec::with_capacity(tree.leaves().len());
    let mut stack = Vec::new();
    for &root in tree.roots() {
        walk(tree, root, &mut stack, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader() -> HierarchicalReader {
        HierarchicalReader::new(&[
            ColumnNameNode::group(
                "user",
                vec![
                    ColumnNameNode::leaf("name"),
                    ColumnNameNode::group(
                        "address",
                        vec![ColumnNameNode::leaf("city"), ColumnNameNode::leaf("zip")],
                    ),
                ],
            ),
            ColumnNameNode::leaf("score"),
        ])
    }

    fn row() -> GridRow {
        GridRow::new(
            7,
            vec![
                CellValue::Array(vec![
                    "ann".into(),
                    CellValue::Array(vec!["oslo".into(), 150i64.into()]),
                ]),
                10i64.into(),
            ],
        )
    }

    #[test]
    fn test_leaves_and_paths() {
        let reader = reader();
        assert_eq!(reader.leaf_count(), 4);
        assert_eq!(reader.path_of_leaf(2), Some(&[0, 1, 1][..]));
        assert_eq!(reader.path_of_leaf(3), Some(&[1][..]));
        assert_eq!(reader.header_lines(1), vec!["user", "address", "city"]);
        assert_eq!(reader.depth_of_hierarchy(), 3);
    }

    #[test]
    fn test_is_valid_path_caches_by_value() {
        let reader = reader();
        assert!(reader.is_valid_path(&[0, 1]));
        assert!(!reader.is_valid_path(&[0, 2]));
        assert!(!reader.is_valid_path(&[]));
        assert_eq!(reader.cached_path_count(), 2);

        let path = vec![0, 1];
        assert!(reader.is_valid_path(&path));
        assert_eq!(reader.cached_path_count(), 2);
    }

    #[test]
    fn test_ancestor_and_siblings() {
        let reader = reader();
        let tree = reader.tree();
        let city = tree.leaf(1).unwrap();
        let user = tree.roots()[0];
        assert_eq!(reader.ancestor_at_depth(city, 1), Some(user));
        assert_eq!(reader.ancestor_at_depth(city, 3), Some(city));
        assert_eq!(reader.ancestor_at_depth(city, 4), None);

        let siblings = reader.siblings(city);
        assert_eq!(siblings.len(), 1);
        assert_eq!(tree.name(siblings[0]), "zip");
        assert_eq!(reader.leaves_in_subtree(user).len(), 3);
    }

    #[test]
    fn test_max_depth_with_skip() {
        let reader = reader();
        let address = reader.tree().node_at_path(&[0, 1]).unwrap();
        assert_eq!(reader.max_depth(|_| false), 3);
        assert_eq!(reader.max_depth(|id| id == address), 2);
    }

    #[test]
    fn test_value_at() {
        let reader = reader();
        let row = row();
        assert_eq!(
            reader.value_at(&row, &[0, 1, 0]).unwrap(),
            CellValue::Text("oslo".into())
        );
        assert_eq!(reader.value_at(&row, &[1]).unwrap(), CellValue::Integer(10));
    }

    #[test]
    fn test_value_at_errors_carry_row_and_path() {
        let reader = reader();
        let row = row();
        let err = reader.value_at(&row, &[1, 0]).unwrap_err();
        match err {
            GridError::HierarchicalPath { row, path, .. } => {
                assert_eq!(row, 7);
                assert_eq!(path, vec![1, 0]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(reader.value_at(&row, &[0, 5]).is_err());
        assert!(reader.value_at(&row, &[]).is_err());
    }

    #[test]
    fn test_right_most_and_selected_ancestors() {
        let reader = reader();
        let tree = reader.tree();
        let user = tree.roots()[0];
        let zip = tree.leaf(2).unwrap();
        let city = tree.leaf(1).unwrap();
        assert!(reader.is_right_most_child_of_ancestor(zip, user, |_| false));
        assert!(reader.is_right_most_child_of_ancestor(city, user, |id| id == zip));

        // "name" (leaf 0) is a direct leaf of "user"; "city" (leaf 1) of "address".
        let address = tree.parent(city).unwrap();
        assert_eq!(
            reader.closest_ancestor_with_selected_direct_leaf(zip, |leaf| leaf == 1),
            Some(address)
        );
        assert_eq!(
            reader.last_ancestor_with_selected_direct_leaf(zip, |leaf| leaf <= 1),
            Some(user)
        );
        assert_eq!(
            reader.closest_ancestor_with_selected_direct_leaf(zip, |leaf| leaf == 3),
            None
        );
    }

    #[test]
    fn test_infer_type() {
        let reader = reader();
        let rows = vec![row(), row()];
        assert_eq!(reader.infer_type(&rows, &[0, 1, 1], 200), ColumnType::Integer);
        assert_eq!(reader.infer_type(&rows, &[0, 1], 200), ColumnType::Array);
        assert_eq!(reader.infer_type(&rows, &[0, 0], 200), ColumnType::String);
    }
}
