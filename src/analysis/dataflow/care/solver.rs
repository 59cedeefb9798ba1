//! Worklist-driven fixpoint solver of the don't-care analysis.
//!
//! # Algorithm
//!
//! 1. Set every node's mask to the bottom of its mode
//! 2. Demand `Full` of the graph's `End` node
//! 3. While the worklist is non-empty:
//!    a. Pop a node
//!    b. Compute the demands it places on other nodes from its current mask
//!    c. Merge each demand into the target's mask; queue targets that grew
//!
//! # Complexity
//!
//! Every successful merge sets at least one new bit, so the number of merges
//! is bounded by the sum of the node widths (1 for non-integer nodes). Each
//! merge queues at most one propagation.

use log::{debug, trace, warn};

use crate::{
    analysis::dataflow::{
        care::{transfer::transfer, CareConfig, CareMask, CareResults, Demand},
        JoinSemiLattice, Worklist,
    },
    ir::{Graph, NodeId, Overflow},
};

/// Counters collected during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CareStats {
    /// Demands placed, including those that changed nothing.
    pub demands: usize,
    /// Demands that grew a stored mask.
    pub merges: usize,
    /// Nodes popped from the worklist and propagated.
    pub propagations: usize,
    /// Nodes entered into the worklist.
    pub pushes: usize,
    /// Pushes suppressed because the node was already queued.
    pub skipped: usize,
}

/// One run of the don't-care analysis over one graph.
///
/// The analysis owns the mask side table and borrows the graph immutably for
/// its whole lifetime.
///
/// # Usage
///
/// ```rust
/// use carebits::prelude::*;
///
/// let mut graph = Graph::new();
/// let block = graph.start_block();
/// let a = graph.new_param(0, Mode::U32)?;
/// let low = graph.new_conv(block, a, Mode::U8)?;
/// let mem = graph.initial_mem();
/// graph.new_return(block, mem, &[low])?;
///
/// let mut analysis = CareAnalysis::new(&graph, CareConfig::default());
/// analysis.solve();
/// let results = analysis.into_results();
/// assert_eq!(results.mask(a), Some(CareMask::Bits(BitValue::new(Mode::U32, 0xFF))));
/// # Ok::<(), carebits::Error>(())
/// ```
pub struct CareAnalysis<'g> {
    /// The graph being analyzed.
    graph: &'g Graph,
    /// Run configuration.
    config: CareConfig,
    /// Current mask of every node, indexed by node id.
    masks: Vec<CareMask>,
    /// Nodes whose mask grew since they were last propagated.
    worklist: Worklist,
    /// Counters.
    stats: CareStats,
}

impl<'g> CareAnalysis<'g> {
    /// Creates an analysis with every mask at bottom and an empty worklist.
    ///
    /// # Arguments
    ///
    /// * `graph` - The graph to analyze
    /// * `config` - Run configuration
    ///
    /// # Panics
    ///
    /// Panics if `config.overflow` is not [`Overflow::Wrap`]; the mask
    /// arithmetic is only correct with wrapping overflow.
    #[must_use]
    pub fn new(graph: &'g Graph, config: CareConfig) -> Self {
        assert!(
            config.overflow == Overflow::Wrap,
            "don't-care analysis requires wrapping overflow, got {:?}",
            config.overflow
        );

        let mut masks = vec![CareMask::Flag(false); graph.node_count()];
        graph.walk(|id, node| masks[id.index()] = CareMask::bottom(node.mode()));

        CareAnalysis {
            graph,
            config,
            masks,
            worklist: Worklist::new(graph.node_count(), config.deduplicate),
            stats: CareStats::default(),
        }
    }

    /// Runs the analysis to its fixpoint.
    ///
    /// Calling this again on a finished analysis changes nothing: the end node
    /// is already at top, so the seed merges nothing and queues nothing.
    pub fn solve(&mut self) {
        debug!("care analysis: {} nodes", self.graph.node_count());
        self.seed();
        while self.step().is_some() {}
        debug!(
            "care analysis done: {} merges, {} propagations, {} skipped pushes",
            self.stats.merges, self.stats.propagations, self.stats.skipped
        );
    }

    /// Places the initial `Full` demand on the graph's `End` node.
    pub fn seed(&mut self) {
        self.demand(self.graph.end(), Demand::Full);
    }

    /// Propagates one node from the front of the worklist.
    ///
    /// # Returns
    ///
    /// The propagated node, or `None` if the worklist was empty.
    pub fn step(&mut self) -> Option<NodeId> {
        let node = self.worklist.pop()?;
        self.propagate(node);
        Some(node)
    }

    /// Merges a demand into a node's mask.
    ///
    /// The demand is resolved against the node's mode first (see
    /// [`Demand::resolve`]). If the merged mask differs from the stored one it
    /// is stored and the node is queued.
    ///
    /// # Arguments
    ///
    /// * `node` - The node the demand is placed on
    /// * `requested` - The demanded bits
    ///
    /// # Returns
    ///
    /// `true` if the node's mask grew.
    pub fn demand(&mut self, node: NodeId, requested: Demand) -> bool {
        self.stats.demands += 1;
        let Some(target) = self.graph.node(node) else {
            warn!("demand on {node}, which is not part of the graph");
            return false;
        };

        let requested = requested.resolve(target.mode());
        let stored = self.masks[node.index()];
        let merged = stored.join(&requested);
        if merged == stored {
            return false;
        }

        trace!("{node}: {stored} -> {merged}");
        self.masks[node.index()] = merged;
        self.stats.merges += 1;
        if self.worklist.push(node) {
            self.stats.pushes += 1;
        } else {
            self.stats.skipped += 1;
        }
        true
    }

    fn propagate(&mut self, node: NodeId) {
        let Some(current) = self.graph.node(node) else {
            return;
        };
        self.stats.propagations += 1;
        let care = self.masks[node.index()];
        for (target, demand) in transfer(self.graph, current, care, self.config.overflow) {
            self.demand(target, demand);
        }
    }

    /// Returns the current mask of a node.
    #[must_use]
    pub fn mask(&self, node: NodeId) -> Option<CareMask> {
        self.masks.get(node.index()).copied()
    }

    /// Returns the current masks of all nodes, indexed by node id.
    #[must_use]
    pub fn masks(&self) -> &[CareMask] {
        &self.masks
    }

    /// Returns the number of pending worklist entries.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.worklist.len()
    }

    /// Returns the counters collected so far.
    #[must_use]
    pub const fn stats(&self) -> &CareStats {
        &self.stats
    }

    /// Returns the run configuration.
    #[must_use]
    pub const fn config(&self) -> &CareConfig {
        &self.config
    }

    /// Finishes the run and hands the masks over to the caller.
    #[must_use]
    pub fn into_results(self) -> CareResults {
        CareResults::new(self.masks, self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ir::{BitValue, Mode},
        test,
    };

    #[test]
    fn test_initial_masks_are_bottom() {
        let fixture = test::masked_return();
        let analysis = CareAnalysis::new(&fixture.graph, CareConfig::default());
        assert_eq!(analysis.mask(fixture.a), Some(CareMask::bottom(Mode::U8)));
        assert_eq!(analysis.mask(fixture.graph.end()), Some(CareMask::Flag(false)));
        assert_eq!(analysis.pending(), 0);
    }

    #[test]
    fn test_solve() {
        let fixture = test::masked_return();
        let mut analysis = CareAnalysis::new(&fixture.graph, CareConfig::default());
        analysis.solve();
        assert_eq!(analysis.mask(fixture.and), Some(CareMask::top(Mode::U8)));
        assert_eq!(
            analysis.mask(fixture.a),
            Some(CareMask::Bits(BitValue::new(Mode::U8, 0x0F)))
        );
        assert_eq!(analysis.pending(), 0);
        assert!(analysis.stats().merges > 0);
        assert_eq!(analysis.stats().pushes, analysis.stats().merges);
    }

    #[test]
    fn test_solve_loop() {
        let fixture = test::counting_loop();
        let mut analysis = CareAnalysis::new(&fixture.graph, CareConfig::default());
        analysis.solve();

        // the exit compare reads all of i, only the low byte of sum is returned
        assert_eq!(analysis.mask(fixture.i), Some(CareMask::top(Mode::U32)));
        assert_eq!(analysis.mask(fixture.next_i), Some(CareMask::top(Mode::U32)));
        assert_eq!(analysis.mask(fixture.n), Some(CareMask::top(Mode::U32)));
        let low = Some(CareMask::Bits(BitValue::new(Mode::U32, 0xFF)));
        assert_eq!(analysis.mask(fixture.sum), low);
        assert_eq!(analysis.mask(fixture.next_sum), low);
    }

    #[test]
    fn test_solve_diamond() {
        let fixture = test::diamond();
        let mut analysis = CareAnalysis::new(&fixture.graph, CareConfig::default());
        analysis.solve();
        assert_eq!(analysis.mask(fixture.max), Some(CareMask::top(Mode::I8)));
        assert_eq!(analysis.mask(fixture.less), Some(CareMask::Flag(true)));
        assert_eq!(analysis.mask(fixture.join), Some(CareMask::Flag(true)));
    }

    #[test]
    fn test_demand_reports_growth() {
        let fixture = test::masked_return();
        let a = fixture.a;
        let mut analysis = CareAnalysis::new(&fixture.graph, CareConfig::default());
        assert!(analysis.demand(a, BitValue::new(Mode::U8, 0x01).into()));
        assert!(!analysis.demand(a, BitValue::new(Mode::U8, 0x01).into()));
        assert!(!analysis.demand(a, BitValue::zero(Mode::U8).into()));
        assert!(analysis.demand(a, BitValue::new(Mode::U8, 0x02).into()));
        assert_eq!(analysis.mask(a), Some(CareMask::Bits(BitValue::new(Mode::U8, 0x03))));
        assert!(!analysis.demand(NodeId::new(10_000), Demand::Full));
    }

    #[test]
    fn test_deduplicated_pushes_are_counted() {
        let fixture = test::masked_return();
        let a = fixture.a;
        let mut analysis = CareAnalysis::new(&fixture.graph, CareConfig::default());
        analysis.demand(a, BitValue::new(Mode::U8, 0x01).into());
        analysis.demand(a, BitValue::new(Mode::U8, 0x02).into());
        assert_eq!(analysis.pending(), 1);
        assert_eq!(analysis.stats().skipped, 1);

        let mut analysis =
            CareAnalysis::new(&fixture.graph, CareConfig::new().with_deduplicate(false));
        analysis.demand(a, BitValue::new(Mode::U8, 0x01).into());
        analysis.demand(a, BitValue::new(Mode::U8, 0x02).into());
        assert_eq!(analysis.pending(), 2);
    }

    #[test]
    #[should_panic(expected = "wrapping overflow")]
    fn test_saturating_overflow_is_rejected() {
        let graph = Graph::new();
        let _ = CareAnalysis::new(&graph, CareConfig::new().with_overflow(Overflow::Saturate));
    }
}
