//! Data flow analysis framework over the node graph.
//!
//! This module provides the pieces fixpoint analyses are built from and the
//! analyses themselves.
//!
//! # Architecture
//!
//! - **Lattice**: [`JoinSemiLattice`] defines how abstract values combine
//! - **Worklist**: [`Worklist`] holds the nodes whose value changed
//! - **Analysis**: per-node transfer rules plus a driver loop
//!
//! # Analyses Provided
//!
//! - [`care`]: backward don't-care bit analysis
//!
//! # Thread Safety
//!
//! All result types in this module are `Send` and `Sync`. A single analysis
//! run is sequential; independent graphs can be analyzed in parallel with
//! [`care::analyze_all`].

pub mod care;

mod lattice;
mod worklist;

pub use lattice::JoinSemiLattice;
pub use worklist::Worklist;
