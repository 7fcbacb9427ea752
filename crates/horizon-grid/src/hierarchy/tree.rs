//! Arena-backed hierarchical column tree.

/// A column name node as delivered by the data producer.
///
/// Groups carry children; leaves have none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNameNode {
    /// Display name.
    pub name: String,
    /// Sub-columns, in order.
    pub children: Vec<ColumnNameNode>,
}

impl ColumnNameNode {
    /// Create a leaf column name.
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Create a column group.
    pub fn group(name: impl Into<String>, children: Vec<ColumnNameNode>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }
}

/// Handle of a node inside a [`ColumnTree`].
///
/// Handles are only meaningful for the tree that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena position of the node.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node stored in the arena.
#[derive(Debug, Clone)]
struct ColumnNode {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Child positions from the top level down to this node.
    path: Vec<usize>,
    /// Dense leaf column number; `None` for groups.
    leaf_number: Option<usize>,
}

/// A tree of hierarchical columns stored as an arena.
///
/// Parents and children refer to each other by [`NodeId`], never by
/// reference. Leaves are numbered by a single left-to-right depth-first pass,
/// so leaf numbers are dense over `0..leaf_count()`.
#[derive(Debug, Clone, Default)]
pub struct ColumnTree {
    nodes: Vec<ColumnNode>,
    roots: Vec<NodeId>,
    leaves: Vec<NodeId>,
}

impl ColumnTree {
    /// Build the tree for the given top-level column names.
    pub fn build(roots: &[ColumnNameNode]) -> Self {
        let mut tree = Self::default();
        for (position, root) in roots.iter().enumerate() {
            let id = tree.insert(root, None, vec![position]);
            tree.roots.push(id);
        }
        tree
    }

    fn insert(&mut self, source: &ColumnNameNode, parent: Option<NodeId>, path: Vec<usize>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let leaf_number = source.children.is_empty().then(|| {
            self.leaves.push(id);
            self.leaves.len() - 1
        });
        self.nodes.push(ColumnNode {
            name: source.name.clone(),
            parent,
            children: Vec::with_capacity(source.children.len()),
            path: path.clone(),
            leaf_number,
        });
        for (position, child) in source.children.iter().enumerate() {
            let mut child_path = path.clone();
            child_path.push(position);
            let child_id = self.insert(child, Some(id), child_path);
            self.nodes[id.0].children.push(child_id);
        }
        id
    }

    fn node(&self, id: NodeId) -> &ColumnNode {
        &self.nodes[id.0]
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` for a tree without columns.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level nodes, in order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Leaf nodes in leaf-number order.
    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves
    }

    /// The leaf with leaf number `leaf`.
    pub fn leaf(&self, leaf: usize) -> Option<NodeId> {
        self.leaves.get(leaf).copied()
    }

    /// Display name of a node.
    pub fn name(&self, id: NodeId) -> &str {
        &self.node(id).name
    }

    /// Parent of a node; `None` at the top level.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Children of a node, in order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Child positions from the top level down to the node.
    pub fn path(&self, id: NodeId) -> &[usize] {
        &self.node(id).path
    }

    /// Depth of a node; top-level nodes have depth 1.
    pub fn depth(&self, id: NodeId) -> usize {
        self.node(id).path.len()
    }

    /// Leaf column number; `None` for groups.
    pub fn leaf_number(&self, id: NodeId) -> Option<usize> {
        self.node(id).leaf_number
    }

    /// Returns `true` for nodes without children.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.node(id).children.is_empty()
    }

    /// Returns `true` for top-level nodes.
    pub fn is_top_level(&self, id: NodeId) -> bool {
        self.node(id).parent.is_none()
    }

    /// The node reached by following `path` from the top level.
    pub fn node_at_path(&self, path: &[usize]) -> Option<NodeId> {
        let (&first, rest) = path.split_first()?;
        let mut current = *self.roots.get(first)?;
        for &position in rest {
            current = *self.node(current).children.get(position)?;
        }
        Some(current)
    }

    /// Iterate over all node handles in depth-first order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_score() -> ColumnTree {
        ColumnTree::build(&[
            ColumnNameNode::group(
                "user",
                vec![ColumnNameNode::leaf("name"), ColumnNameNode::leaf("age")],
            ),
            ColumnNameNode::leaf("score"),
        ])
    }

    #[test]
    fn test_leaf_numbering_is_depth_first() {
        let tree = user_score();
        let names: Vec<&str> = tree.leaves().iter().map(|&id| tree.name(id)).collect();
        assert_eq!(names, vec!["name", "age", "score"]);
        for (number, &leaf) in tree.leaves().iter().enumerate() {
            assert_eq!(tree.leaf_number(leaf), Some(number));
        }
    }

    #[test]
    fn test_paths_and_parents() {
        let tree = user_score();
        let name = tree.leaf(0).unwrap();
        assert_eq!(tree.path(name), &[0, 0]);
        assert_eq!(tree.depth(name), 2);
        let user = tree.parent(name).unwrap();
        assert_eq!(tree.name(user), "user");
        assert!(tree.is_top_level(user));
        assert_eq!(tree.leaf_number(user), None);
        assert_eq!(tree.node_at_path(&[1]), tree.leaf(2));
        assert_eq!(tree.node_at_path(&[0, 5]), None);
        assert_eq!(tree.node_at_path(&[]), None);
    }
}
