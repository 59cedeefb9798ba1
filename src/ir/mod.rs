//! Sea-of-nodes intermediate representation.
//!
//! This module provides the program representation the analyses run on:
//!
//! - [`Graph`] - arena of [`Node`]s with a validated construction API
//! - [`Mode`] / [`ModeKind`] - result type of every node
//! - [`Opcode`] / [`Relation`] - the closed set of operations
//! - [`BitValue`] / [`Overflow`] - fixed-width two's-complement arithmetic
//! - [`Evaluator`] - reference interpreter used as ground truth in tests
//!
//! # Architecture
//!
//! There is no separate instruction list: data dependencies, memory
//! dependencies and control dependencies are all operand edges between nodes.
//! Control flow is expressed with `Block` nodes whose operands are the
//! control-producing nodes (`Jmp`, `Proj` of a `Cond`) jumping into them.
//! Every other node points at the block it belongs to.
//!
//! # Example
//!
//! ```rust
//! use carebits::ir::{BitValue, Graph, Mode};
//!
//! let mut graph = Graph::new();
//! let block = graph.start_block();
//! let wide = graph.new_param(0, Mode::U32)?;
//! let narrow = graph.new_conv(block, wide, Mode::U8)?;
//! let mem = graph.initial_mem();
//! graph.new_return(block, mem, &[narrow])?;
//!
//! println!("{graph}");
//! # Ok::<(), carebits::Error>(())
//! ```

mod bitvalue;
mod dot;
mod eval;
mod graph;
mod mode;
mod node;
mod opcode;

pub(crate) use dot::render as render_dot;

pub use bitvalue::{BitValue, Overflow};
pub use dot::escape_dot;
pub use eval::{Evaluator, DEFAULT_STEP_LIMIT};
pub use graph::Graph;
pub use mode::{Mode, ModeKind};
pub use node::{Node, NodeId};
pub use opcode::{Opcode, OpcodeKind, Relation};
