//! # carebits Prelude
//!
//! This module provides a convenient prelude for the most commonly used types
//! and functions of the carebits library. Import it to get quick access to
//! graph construction and the don't-care analysis.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all carebits operations
pub use crate::Error;

/// The result type used throughout carebits
pub use crate::Result;

// ================================================================================================
// IR
// ================================================================================================

/// Graph container and node handles
pub use crate::ir::{Graph, Node, NodeId};

/// Node result types
pub use crate::ir::{Mode, ModeKind};

/// Operations
pub use crate::ir::{Opcode, Relation};

/// Fixed-width arithmetic
pub use crate::ir::{BitValue, Overflow};

/// Reference interpreter
pub use crate::ir::Evaluator;

// ================================================================================================
// Don't-Care Analysis
// ================================================================================================

/// Entry points
pub use crate::analysis::{analyze, analyze_all, analyze_with};

/// Analysis state, configuration and results
pub use crate::analysis::{CareAnalysis, CareConfig, CareMask, CareResults, CareStats, Demand};

/// Lattice trait implemented by care-masks
pub use crate::analysis::dataflow::JoinSemiLattice;
