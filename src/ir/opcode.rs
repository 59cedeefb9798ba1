//! Operation codes of IR nodes.
//!
//! [`Opcode`] is a closed set: every pass that inspects nodes matches on it
//! exhaustively, so adding an operation forces every analysis to decide how to
//! treat it.
//!
//! # Operand Conventions
//!
//! | Opcode | Operands |
//! |---|---|
//! | `Block` | control predecessors |
//! | `Start` | none |
//! | `End` | keep-alive nodes |
//! | `Return` | memory, results... |
//! | `Jmp` | none |
//! | `Cond` | selector |
//! | `Proj` | tuple |
//! | `Param`, `Const`, `Address`, `Unknown` | none |
//! | `Phi` | one value per block predecessor, in predecessor order |
//! | `Conv`, `Not`, `Minus` | operand |
//! | binary arithmetic, bitwise, shifts, `Cmp` | left, right |
//! | `Mux` | selector, false value, true value |
//! | `Confirm` | value, bound |
//! | `Load` | memory, address |
//! | `Store` | memory, address, value |
//! | `Call` | memory, callee, arguments... |
//! | `Sync` | memories... |

use bitflags::bitflags;
use strum::{EnumCount, EnumDiscriminants, EnumIter, IntoStaticStr};

use crate::ir::BitValue;

bitflags! {
    /// The relation tested by a `Cmp` node.
    ///
    /// A comparison holds if the actual relation between its operands is one
    /// of the flags set. `LESS | EQUAL` is "less or equal", `LESS | GREATER`
    /// is "not equal".
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Relation: u8 {
        /// Left operand is smaller.
        const LESS = 0b0001;
        /// Both operands are equal.
        const EQUAL = 0b0010;
        /// Left operand is greater.
        const GREATER = 0b0100;
        /// Operands are unordered (floating point only).
        const UNORDERED = 0b1000;

        /// `<=`
        const LESS_EQUAL = Self::LESS.bits() | Self::EQUAL.bits();
        /// `>=`
        const GREATER_EQUAL = Self::GREATER.bits() | Self::EQUAL.bits();
        /// `!=` on ordered operands
        const LESS_GREATER = Self::LESS.bits() | Self::GREATER.bits();
    }
}

impl Relation {
    /// Returns `true` if this relation accepts the given ordering.
    #[must_use]
    pub fn holds(self, ordering: std::cmp::Ordering) -> bool {
        let actual = match ordering {
            std::cmp::Ordering::Less => Relation::LESS,
            std::cmp::Ordering::Equal => Relation::EQUAL,
            std::cmp::Ordering::Greater => Relation::GREATER,
        };
        self.intersects(actual)
    }
}

/// The operation performed by a node.
///
/// The generated [`OpcodeKind`] names each variant without its payload.
///
/// ```rust
/// use carebits::ir::{Opcode, OpcodeKind, Relation};
///
/// let kind = OpcodeKind::from(&Opcode::Cmp(Relation::LESS));
/// assert_eq!(kind, OpcodeKind::Cmp);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, EnumDiscriminants, IntoStaticStr)]
#[strum_discriminants(
    name(OpcodeKind),
    derive(Hash, EnumIter, EnumCount, IntoStaticStr),
    allow(missing_docs)
)]
pub enum Opcode {
    // ========================================================================
    // Control flow
    // ========================================================================
    /// Basic block; merges control flow from its predecessors.
    Block,
    /// Function entry; produces the initial memory as `Proj(0)`.
    Start,
    /// Graph terminal; the root from which every observable effect is reached.
    End,
    /// Function exit with memory and result values.
    Return,
    /// Unconditional jump.
    Jmp,
    /// Two-way branch; `Proj(0)` is the false exit, `Proj(1)` the true exit.
    Cond,
    /// Selects one component of a tuple-producing node.
    Proj(u32),

    // ========================================================================
    // Values
    // ========================================================================
    /// Function parameter.
    Param(u32),
    /// Integer or boolean constant.
    Const(BitValue),
    /// Address of a global entity.
    Address(u32),
    /// Undefined value.
    Unknown,
    /// SSA merge of values flowing in from the block's predecessors.
    Phi,
    /// Conversion between modes.
    Conv,

    // ========================================================================
    // Bitwise
    // ========================================================================
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Eor,
    /// Bitwise complement.
    Not,
    /// Left shift.
    Shl,
    /// Logical right shift.
    Shr,
    /// Arithmetic right shift.
    Shrs,

    // ========================================================================
    // Arithmetic
    // ========================================================================
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Arithmetic negation.
    Minus,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
    /// Remainder.
    Mod,

    // ========================================================================
    // Comparison and selection
    // ========================================================================
    /// Comparison producing a boolean.
    Cmp(Relation),
    /// Conditional select without control flow.
    Mux,
    /// Asserts a relation between a value and a bound; passes the value through.
    Confirm(Relation),

    // ========================================================================
    // Memory
    // ========================================================================
    /// Memory read; `Proj(0)` is the memory, `Proj(1)` the loaded value.
    Load,
    /// Memory write.
    Store,
    /// Function call; `Proj(0)` is the memory, `Proj(1)` the result.
    Call,
    /// Merges several memory states.
    Sync,
}

impl Opcode {
    /// Returns the name of this opcode.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Returns the constant value if this is a `Const`.
    #[must_use]
    pub const fn as_const(&self) -> Option<&BitValue> {
        match self {
            Opcode::Const(value) => Some(value),
            _ => None,
        }
    }

    /// Returns `true` for the binary operations taking a left and right operand.
    #[must_use]
    pub const fn is_binop(&self) -> bool {
        matches!(
            self,
            Opcode::And
                | Opcode::Or
                | Opcode::Eor
                | Opcode::Shl
                | Opcode::Shr
                | Opcode::Shrs
                | Opcode::Add
                | Opcode::Sub
                | Opcode::Mul
                | Opcode::Div
                | Opcode::Mod
        )
    }

    /// Returns the exact operand count, or `None` if the opcode is variadic.
    #[must_use]
    pub const fn arity(&self) -> Option<usize> {
        match self {
            Opcode::Start
            | Opcode::Jmp
            | Opcode::Param(_)
            | Opcode::Const(_)
            | Opcode::Address(_)
            | Opcode::Unknown => Some(0),
            Opcode::Cond | Opcode::Proj(_) | Opcode::Conv | Opcode::Not | Opcode::Minus => {
                Some(1)
            }
            Opcode::Cmp(_) | Opcode::Confirm(_) | Opcode::Load => Some(2),
            Opcode::Mux | Opcode::Store => Some(3),
            _ if self.is_binop() => Some(2),
            Opcode::Block
            | Opcode::End
            | Opcode::Return
            | Opcode::Phi
            | Opcode::Call
            | Opcode::Sync => None,
            _ => None,
        }
    }
}
