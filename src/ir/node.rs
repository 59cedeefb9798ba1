//! Nodes and node identifiers.
//!
//! This module provides [`NodeId`], a strongly-typed index into a [`Graph`](crate::ir::Graph)'s
//! node arena, and [`Node`], the immutable record stored at that index.

use std::fmt;

use crate::ir::{Mode, Opcode};

/// A strongly-typed identifier for nodes within a graph.
///
/// `NodeId` wraps a `usize` index, providing type safety to prevent accidental
/// mixing of node indices with other integer values. Ids are assigned
/// sequentially starting from 0 as nodes are added, and stay stable for the
/// lifetime of the graph. Analyses use them to index per-node side tables.
///
/// # Examples
///
/// ```rust
/// use carebits::ir::NodeId;
///
/// let node = NodeId::new(5);
/// assert_eq!(node.index(), 5);
///
/// let data = vec![10, 20, 30, 40, 50, 60];
/// assert_eq!(data[node.index()], 60);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Creates a new `NodeId` from a raw index value.
    ///
    /// Normal usage obtains ids from the graph's constructors; this is for
    /// tests and for callers that store ids externally.
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        NodeId(index)
    }

    /// Returns the raw 0-based index of this node.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        NodeId(index)
    }
}

/// A single operation of the graph.
///
/// Nodes are created through the [`Graph`](crate::ir::Graph) constructors,
/// which validate operand counts and modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) opcode: Opcode,
    pub(crate) mode: Mode,
    pub(crate) block: Option<NodeId>,
    pub(crate) operands: Vec<NodeId>,
}

impl Node {
    /// Returns the operation of this node.
    #[must_use]
    pub const fn opcode(&self) -> &Opcode {
        &self.opcode
    }

    /// Returns the result mode of this node.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the block this node belongs to; `None` for blocks themselves.
    #[must_use]
    pub const fn block(&self) -> Option<NodeId> {
        self.block
    }

    /// Returns the operand edges in order.
    #[must_use]
    pub fn operands(&self) -> &[NodeId] {
        &self.operands
    }

    /// Returns operand `index`, if present.
    #[must_use]
    pub fn operand(&self, index: usize) -> Option<NodeId> {
        self.operands.get(index).copied()
    }

    /// Returns the number of operands.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.operands.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_roundtrip() {
        let id = NodeId::new(42);
        assert_eq!(id.index(), 42);
        assert_eq!(NodeId::from(42), id);
        assert_eq!(format!("{id}"), "n42");
        assert_eq!(format!("{id:?}"), "NodeId(42)");
    }

    #[test]
    fn test_node_accessors() {
        let node = Node {
            opcode: Opcode::Add,
            mode: Mode::I32,
            block: Some(NodeId::new(0)),
            operands: vec![NodeId::new(1), NodeId::new(2)],
        };
        assert_eq!(node.arity(), 2);
        assert_eq!(node.operand(1), Some(NodeId::new(2)));
        assert_eq!(node.operand(2), None);
        assert_eq!(node.block(), Some(NodeId::new(0)));
        assert_eq!(node.mode(), Mode::I32);
    }
}
