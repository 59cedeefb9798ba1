//! Program analyses over the IR.
//!
//! # Architecture
//!
//! - [`dataflow`] - fixpoint framework and the don't-care bit analysis
//!
//! # Usage
//!
//! ```rust
//! use carebits::{analysis::analyze, ir::Graph};
//!
//! let graph = Graph::new();
//! let results = analyze(&graph);
//! assert_eq!(results.len(), graph.node_count());
//! ```

pub mod dataflow;

pub use dataflow::care::{
    analyze, analyze_all, analyze_with, CareAnalysis, CareConfig, CareMask, CareResults,
    CareStats, Demand,
};
