// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # carebits
//!
//! A backward don't-care bit analysis over a sea-of-nodes compiler IR.
//!
//! For every value in a function, `carebits` computes which bits of the value
//! can influence anything observable: the returned results, memory, control
//! flow. All other bits are "don't care". An optimizer can use this to narrow
//! arithmetic, drop masking operations and conversions, or pick cheaper
//! instructions, knowing the bits it disturbs are never looked at.
//!
//! ## Features
//!
//! - **Sound** - masks over-approximate; a don't-care bit provably never matters
//! - **Fixpoint over cycles** - loops and phis converge through a monotone worklist solver
//! - **Per-opcode rules** - carries, shifts, masks, sign extension and multiplication are tracked bit by bit
//! - **Self-contained IR** - graph builder, fixed-width arithmetic and a reference interpreter
//! - **Inspectable** - text dumps and Graphviz output annotated with masks
//!
//! ## Quick Start
//!
//! ```rust
//! use carebits::prelude::*;
//!
//! // return (x >> 4) as u8, with x: u32
//! let mut graph = Graph::new();
//! let block = graph.start_block();
//! let x = graph.new_param(0, Mode::U32)?;
//! let four = graph.new_const(BitValue::new(Mode::U32, 4));
//! let shifted = graph.new_shr(block, x, four, Mode::U32)?;
//! let low = graph.new_conv(block, shifted, Mode::U8)?;
//! let mem = graph.initial_mem();
//! graph.new_return(block, mem, &[low])?;
//!
//! let results = analyze(&graph);
//! // only bits 4..=11 of x reach the result
//! assert_eq!(results.mask(x), Some(CareMask::Bits(BitValue::new(Mode::U32, 0xFF0))));
//! # Ok::<(), carebits::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`ir`] - graph, modes, opcodes, bit values and the reference interpreter
//! - [`analysis`] - data flow framework and the don't-care analysis
//! - [`prelude`] - convenient re-exports of commonly used types
//! - [`Error`] and [`Result`] - error handling for graph construction and evaluation
//!
//! ## Logging
//!
//! The analysis reports through the [`log`](https://docs.rs/log) facade: one
//! `debug` record per run, one `trace` record per mask change. Install any
//! logger to see them; the library never installs one itself.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use carebits::prelude::*;
///
/// let graph = Graph::new();
/// let results = analyze(&graph);
/// assert!(results.mask(graph.end()).is_some_and(|mask| mask.is_top()));
/// ```
pub mod prelude;

/// Sea-of-nodes IR: graph construction, modes, opcodes and bit values.
///
/// # Key Types
///
/// - [`ir::Graph`] - the function body, an arena of nodes
/// - [`ir::Mode`] - result type of a node
/// - [`ir::Opcode`] - operation of a node
/// - [`ir::BitValue`] - fixed-width two's-complement value
/// - [`ir::Evaluator`] - reference interpreter
pub mod ir;

/// Program analyses over the IR.
///
/// # Key Types
///
/// - [`analysis::CareAnalysis`] - one run of the don't-care analysis
/// - [`analysis::CareResults`] - final care-masks
/// - [`analysis::CareConfig`] - run configuration
pub mod analysis;

/// `carebits` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `carebits` Error type
///
/// Errors come from graph construction and evaluation; the analysis itself
/// cannot fail.
///
/// # Examples
///
/// ```rust
/// use carebits::{Error, ir::{Graph, Mode}};
///
/// let mut graph = Graph::new();
/// let block = graph.start_block();
/// let a = graph.new_param(0, Mode::U8)?;
/// let b = graph.new_param(1, Mode::U16)?;
/// match graph.new_add(block, a, b, Mode::U8) {
///     Err(Error::ModeMismatch { expected, found }) => println!("{expected} vs {found}"),
///     Err(e) => println!("Error: {e}"),
///     Ok(_) => unreachable!(),
/// }
/// # Ok::<(), carebits::Error>(())
/// ```
pub use error::Error;

pub use analysis::{analyze, analyze_all, analyze_with};
