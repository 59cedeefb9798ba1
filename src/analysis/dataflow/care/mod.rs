//! Don't-care bit analysis.
//!
//! For every node of a graph this analysis computes a [`CareMask`]: the bits
//! of the node's result that can possibly influence observable behaviour.
//! Every other bit is "don't care" and may take any value without changing
//! what the function does. Consumers use the masks to narrow operations,
//! drop redundant conversions, or fold values whose demanded bits are known.
//!
//! # Architecture
//!
//! The analysis runs backwards from the graph's `End` node:
//!
//! - [`Demand`] - what a node asks of an operand
//! - [`CareAnalysis::demand`] - merges a demand into the stored mask (bitwise OR)
//! - [`transfer`] - per-opcode rules deriving operand demands from a node's mask
//! - [`CareAnalysis::solve`] - drains the worklist to the fixpoint
//! - [`CareResults`] - the final side table
//!
//! The result is conservative: a bit may be reported as cared-for when it is
//! not, never the other way round. Shifts by unknown amounts, division,
//! comparisons and everything non-integer fall back to coarse demands.
//!
//! # Example
//!
//! ```rust
//! use carebits::prelude::*;
//!
//! // return (a + b) & 7
//! let mut graph = Graph::new();
//! let block = graph.start_block();
//! let a = graph.new_param(0, Mode::U8)?;
//! let b = graph.new_param(1, Mode::U8)?;
//! let sum = graph.new_add(block, a, b, Mode::U8)?;
//! let seven = graph.new_const(BitValue::new(Mode::U8, 7));
//! let low = graph.new_and(block, sum, seven, Mode::U8)?;
//! let mem = graph.initial_mem();
//! graph.new_return(block, mem, &[low])?;
//!
//! let results = analyze(&graph);
//! assert_eq!(results.mask(a), Some(CareMask::Bits(BitValue::new(Mode::U8, 0b111))));
//! assert!(results.is_dont_care(b, 3));
//! # Ok::<(), carebits::Error>(())
//! ```

mod config;
mod mask;
mod results;
mod solver;
mod transfer;

use rayon::prelude::*;

pub use config::CareConfig;
pub use mask::{CareMask, Demand};
pub use results::CareResults;
pub use solver::{CareAnalysis, CareStats};
pub use transfer::{lsb_and_above, msb_and_below, transfer};

use crate::ir::Graph;

/// Runs the don't-care analysis with the default configuration.
///
/// # Arguments
///
/// * `graph` - The graph to analyze
///
/// # Returns
///
/// The care-mask of every node.
#[must_use]
pub fn analyze(graph: &Graph) -> CareResults {
    analyze_with(graph, CareConfig::default())
}

/// Runs the don't-care analysis with an explicit configuration.
///
/// # Panics
///
/// Panics if the configuration does not use wrapping overflow.
#[must_use]
pub fn analyze_with(graph: &Graph, config: CareConfig) -> CareResults {
    let mut analysis = CareAnalysis::new(graph, config);
    analysis.solve();
    analysis.into_results()
}

/// Analyzes independent graphs in parallel.
///
/// Each graph gets its own single-threaded run; results are in input order.
#[must_use]
pub fn analyze_all(graphs: &[Graph]) -> Vec<CareResults> {
    graphs.par_iter().map(analyze).collect()
}
