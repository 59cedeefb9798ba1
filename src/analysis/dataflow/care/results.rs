//! Final masks of a don't-care analysis run.

use std::fmt::Write;

use crate::{
    analysis::dataflow::care::{CareMask, CareStats},
    ir::{render_dot, BitValue, Graph, NodeId},
};

/// The care-masks of every node after the analysis reached its fixpoint.
///
/// Masks are indexed by the [`NodeId`]s of the analyzed graph; querying with
/// ids of another graph gives meaningless answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CareResults {
    masks: Vec<CareMask>,
    stats: CareStats,
}

impl CareResults {
    pub(crate) fn new(masks: Vec<CareMask>, stats: CareStats) -> Self {
        CareResults { masks, stats }
    }

    /// Returns the mask of a node.
    #[must_use]
    pub fn mask(&self, node: NodeId) -> Option<CareMask> {
        self.masks.get(node.index()).copied()
    }

    /// Returns `true` if bit `bit` of `node` can never influence observable
    /// behaviour.
    ///
    /// Unknown nodes answer `false`.
    #[must_use]
    pub fn is_dont_care(&self, node: NodeId, bit: u32) -> bool {
        self.mask(node).is_some_and(|mask| !mask.cares_about(bit))
    }

    /// Returns the don't-care bits of an integer node, the complement of its mask.
    #[must_use]
    pub fn dont_care_bits(&self, node: NodeId) -> Option<BitValue> {
        self.mask(node)
            .and_then(|mask| mask.as_bits().map(BitValue::not))
    }

    /// Returns `true` if no bit of the node is demanded at all.
    ///
    /// Such nodes cannot affect anything observable.
    #[must_use]
    pub fn is_dead(&self, node: NodeId) -> bool {
        self.mask(node).is_some_and(|mask| mask.is_zero())
    }

    /// Iterates over all nodes and their masks.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &CareMask)> + '_ {
        self.masks
            .iter()
            .enumerate()
            .map(|(index, mask)| (NodeId::new(index), mask))
    }

    /// Returns the number of nodes covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.masks.len()
    }

    /// Returns `true` if the analyzed graph had no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// Returns the counters of the run that produced these results.
    #[must_use]
    pub const fn stats(&self) -> &CareStats {
        &self.stats
    }

    /// Returns the graph listing with each node's mask appended.
    ///
    /// # Arguments
    ///
    /// * `graph` - The analyzed graph
    #[must_use]
    pub fn dump(&self, graph: &Graph) -> String {
        let mut out = String::new();
        for (id, node) in graph.nodes() {
            let mask = self
                .mask(id)
                .map_or_else(|| "?".to_string(), |mask| mask.to_string());
            let _ = writeln!(
                out,
                "{:>6}: {:<8} {:<4} care {mask}",
                id.to_string(),
                node.opcode().name(),
                node.mode().to_string()
            );
        }
        out
    }

    /// Generates a DOT representation of the graph with each node's mask.
    ///
    /// # Arguments
    ///
    /// * `graph` - The analyzed graph
    /// * `title` - Optional title for the graph
    #[must_use]
    pub fn to_dot(&self, graph: &Graph, title: Option<&str>) -> String {
        render_dot(graph, title, |id| self.mask(id).map(|mask| format!("care {mask}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Mode;

    fn results() -> CareResults {
        CareResults::new(
            vec![
                CareMask::Flag(true),
                CareMask::Bits(BitValue::new(Mode::U8, 0x0F)),
                CareMask::Bits(BitValue::zero(Mode::U8)),
            ],
            CareStats::default(),
        )
    }

    #[test]
    fn test_queries() {
        let results = results();
        let n1 = NodeId::new(1);
        assert!(results.is_dont_care(n1, 4));
        assert!(!results.is_dont_care(n1, 3));
        assert_eq!(results.dont_care_bits(n1).unwrap().raw(), 0xF0);
        assert_eq!(results.dont_care_bits(NodeId::new(0)), None);
        assert!(results.is_dead(NodeId::new(2)));
        assert!(!results.is_dead(n1));
        assert!(!results.is_dont_care(NodeId::new(3), 0));
        assert_eq!(results.len(), 3);
        assert_eq!(results.iter().count(), 3);
    }

    #[test]
    fn test_dump() {
        let graph = Graph::new();
        let results = CareResults::new(
            vec![CareMask::Flag(true); graph.node_count()],
            CareStats::default(),
        );
        let dump = results.dump(&graph);
        assert_eq!(dump.lines().count(), graph.node_count());
        assert!(dump.contains("n4: End      X    care true"));
    }
}
