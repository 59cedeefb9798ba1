//! Lattice traits for data flow analysis.
//!
//! A lattice defines how abstract values combine when information arrives
//! from more than one place. Backward analyses such as the don't-care
//! analysis only ever move values upward, so the framework needs the join
//! half of the structure.
//!
//! # Lattice Theory Background
//!
//! - **Partial Order**: Elements can be compared (≤)
//! - **Join (∨)**: Least upper bound of two elements
//! - **Bottom (⊥)**: Least element, the starting value of every node
//! - **Top (⊤)**: Greatest element, after which nothing can change
//!
//! A solver terminates if every ascending chain is finite. For a lattice of
//! bit masks under OR the chain length is the number of bits.

use std::fmt::Debug;

/// A join semi-lattice with a join (least upper bound) operation.
///
/// The join must satisfy:
///
/// - **Idempotent**: `x.join(x) = x`
/// - **Commutative**: `x.join(y) = y.join(x)`
/// - **Associative**: `x.join(y.join(z)) = (x.join(y)).join(z)`
///
/// # Examples
///
/// ```rust
/// use carebits::analysis::dataflow::JoinSemiLattice;
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Seen(bool);
///
/// impl JoinSemiLattice for Seen {
///     fn join(&self, other: &Self) -> Self {
///         Seen(self.0 || other.0)
///     }
///     fn is_top(&self) -> bool {
///         self.0
///     }
///     fn is_bottom(&self) -> bool {
///         !self.0
///     }
/// }
///
/// assert!(Seen(false).leq(&Seen(true)));
/// assert!(!Seen(true).leq(&Seen(false)));
/// ```
pub trait JoinSemiLattice: Clone + Debug + PartialEq {
    /// Computes the join (least upper bound) of two lattice elements.
    #[must_use]
    fn join(&self, other: &Self) -> Self;

    /// Returns `true` if this is the top element.
    ///
    /// Joining anything into top leaves it unchanged.
    fn is_top(&self) -> bool;

    /// Returns `true` if this is the bottom element.
    ///
    /// Bottom is the identity for join: `x.join(bottom) = x`.
    fn is_bottom(&self) -> bool;

    /// Returns `true` if `self ≤ other` in the lattice order.
    fn leq(&self, other: &Self) -> bool {
        self.join(other) == *other
    }
}
