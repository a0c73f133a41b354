//! Expression trees, stored as flat arenas.
//!
//! Nodes reference the catalog by position and each other by [`NodeId`], so a
//! tree is two integers deep: cheap to clone, cheap to walk, nothing to drop
//! recursively. Consumers resolve references through checked lookups; a
//! dangling reference is an invariant breach, not a panic.

/// Index of a node within its [`Tree`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single expression node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Applies the operator at a catalog position to ordered operands.
    Operator {
        operator: usize,
        operands: Vec<NodeId>,
    },
    /// A literal value, carried verbatim into the compiled program.
    Constant { value: u32 },
    /// Reads the input kind at a catalog position.
    Input { input: usize },
}

/// An expression tree: a node arena plus the root's id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    /// Assemble a tree from its arena and root.
    ///
    /// References are not validated here; the compiler, evaluator, and
    /// composer all check them as they walk.
    pub fn new(nodes: Vec<Node>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    /// Root node id.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Checked node lookup.
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// All nodes, in arena order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Total node count, leaves included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
