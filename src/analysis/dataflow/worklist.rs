//! FIFO worklist of graph nodes.
//!
//! Nodes are pushed at the back and popped from the front. With deduplication
//! enabled, a node that is already waiting is not queued a second time; the
//! pending entry will observe the newer state when it is processed anyway.

use std::collections::VecDeque;

use crate::ir::NodeId;

/// Queue of nodes pending re-evaluation.
#[derive(Debug, Clone)]
pub struct Worklist {
    /// Pending nodes, front is processed next.
    queue: VecDeque<NodeId>,
    /// Whether each node is currently in the queue (for deduplication).
    queued: Vec<bool>,
    /// Whether duplicate pushes are suppressed.
    deduplicate: bool,
}

impl Worklist {
    /// Creates an empty worklist for a graph with `capacity` nodes.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of nodes of the graph; ids must be below it
    /// * `deduplicate` - Suppress pushes of nodes that are already queued
    #[must_use]
    pub fn new(capacity: usize, deduplicate: bool) -> Self {
        Worklist {
            queue: VecDeque::with_capacity(capacity),
            queued: vec![false; capacity],
            deduplicate,
        }
    }

    /// Appends a node at the back.
    ///
    /// # Returns
    ///
    /// `false` if the push was suppressed because the node is already queued.
    pub fn push(&mut self, node: NodeId) -> bool {
        let index = node.index();
        if index >= self.queued.len() {
            self.queued.resize(index + 1, false);
        }
        if self.deduplicate && self.queued[index] {
            return false;
        }
        self.queued[index] = true;
        self.queue.push_back(node);
        true
    }

    /// Removes and returns the node at the front.
    pub fn pop(&mut self) -> Option<NodeId> {
        let node = self.queue.pop_front()?;
        if let Some(flag) = self.queued.get_mut(node.index()) {
            *flag = false;
        }
        Some(node)
    }

    /// Returns `true` if the node is waiting in the queue.
    ///
    /// Only tracked exactly with deduplication; without it a node popped once
    /// may still have a later entry pending.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        if self.deduplicate {
            self.queued.get(node.index()).copied().unwrap_or(false)
        } else {
            self.queue.contains(&node)
        }
    }

    /// Returns the number of pending entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut list = Worklist::new(4, true);
        assert!(list.push(NodeId::new(2)));
        assert!(list.push(NodeId::new(0)));
        assert!(list.push(NodeId::new(3)));
        assert_eq!(list.len(), 3);
        assert_eq!(list.pop(), Some(NodeId::new(2)));
        assert_eq!(list.pop(), Some(NodeId::new(0)));
        assert_eq!(list.pop(), Some(NodeId::new(3)));
        assert_eq!(list.pop(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_deduplication() {
        let mut list = Worklist::new(2, true);
        assert!(list.push(NodeId::new(1)));
        assert!(!list.push(NodeId::new(1)));
        assert!(list.contains(NodeId::new(1)));
        assert_eq!(list.len(), 1);
        assert_eq!(list.pop(), Some(NodeId::new(1)));
        assert!(!list.contains(NodeId::new(1)));
        // may be queued again once processed
        assert!(list.push(NodeId::new(1)));
    }

    #[test]
    fn test_duplicates_allowed() {
        let mut list = Worklist::new(2, false);
        assert!(list.push(NodeId::new(1)));
        assert!(list.push(NodeId::new(1)));
        assert_eq!(list.len(), 2);
        list.pop();
        assert!(list.contains(NodeId::new(1)));
    }

    #[test]
    fn test_grows_past_capacity() {
        let mut list = Worklist::new(1, true);
        assert!(list.push(NodeId::new(5)));
        assert!(!list.push(NodeId::new(5)));
        assert_eq!(list.pop(), Some(NodeId::new(5)));
    }
}
