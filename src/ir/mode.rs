//! Result modes of IR nodes.
//!
//! Every node produces a value of some [`Mode`]. The mode decides how the
//! don't-care analysis represents the node's care-mask: integer modes get a
//! per-bit mask of the same width, every other category gets a single flag.
//!
//! # Categories
//!
//! - **Int**: fixed-width two's-complement integers, 1 to 64 bits, signed or unsigned
//! - **Bool**: the result of comparisons and the selector of `Mux`/`Cond`
//! - **Control**: execution flow ("X"), produced by jumps, returns and control projections
//! - **Memory**: the memory state threaded through loads, stores and calls
//! - **Tuple**: multi-result nodes, taken apart with `Proj`
//! - **Block**: basic blocks
//! - **Reference**: pointers, treated as opaque
//! - **Float**: floating point values, treated as opaque

use std::fmt;

use strum::{Display, EnumCount, EnumIter, IntoStaticStr};

use crate::{Error, Result};

/// The category of a [`Mode`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter, IntoStaticStr,
)]
pub enum ModeKind {
    /// Fixed-width two's-complement integer.
    Int,
    /// Boolean truth value.
    Bool,
    /// Control flow (execution).
    Control,
    /// Memory state.
    Memory,
    /// Tuple of results.
    Tuple,
    /// Basic block.
    Block,
    /// Opaque pointer.
    Reference,
    /// Opaque floating point value.
    Float,
}

/// The result mode of a node: category, width and signedness.
///
/// Only integer modes carry a meaningful width and signedness. Non-integer
/// modes report the nominal width they would occupy (1 for booleans, 64 for
/// references, 32/64 for floats, 0 otherwise).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mode {
    kind: ModeKind,
    bits: u8,
    signed: bool,
}

impl Mode {
    /// Signed 8-bit integer.
    pub const I8: Mode = Mode::new_int(8, true);
    /// Unsigned 8-bit integer.
    pub const U8: Mode = Mode::new_int(8, false);
    /// Signed 16-bit integer.
    pub const I16: Mode = Mode::new_int(16, true);
    /// Unsigned 16-bit integer.
    pub const U16: Mode = Mode::new_int(16, false);
    /// Signed 32-bit integer.
    pub const I32: Mode = Mode::new_int(32, true);
    /// Unsigned 32-bit integer.
    pub const U32: Mode = Mode::new_int(32, false);
    /// Signed 64-bit integer.
    pub const I64: Mode = Mode::new_int(64, true);
    /// Unsigned 64-bit integer.
    pub const U64: Mode = Mode::new_int(64, false);
    /// Boolean.
    pub const B: Mode = Mode::other(ModeKind::Bool, 1);
    /// Control flow.
    pub const X: Mode = Mode::other(ModeKind::Control, 0);
    /// Memory state.
    pub const M: Mode = Mode::other(ModeKind::Memory, 0);
    /// Tuple.
    pub const T: Mode = Mode::other(ModeKind::Tuple, 0);
    /// Basic block.
    pub const BB: Mode = Mode::other(ModeKind::Block, 0);
    /// Reference (pointer).
    pub const P: Mode = Mode::other(ModeKind::Reference, 64);
    /// 32-bit float.
    pub const F32: Mode = Mode::other(ModeKind::Float, 32);
    /// 64-bit float.
    pub const F64: Mode = Mode::other(ModeKind::Float, 64);

    const fn new_int(bits: u8, signed: bool) -> Self {
        Mode {
            kind: ModeKind::Int,
            bits,
            signed,
        }
    }

    const fn other(kind: ModeKind, bits: u8) -> Self {
        Mode {
            kind,
            bits,
            signed: false,
        }
    }

    /// Creates an integer mode of the given width.
    ///
    /// # Arguments
    ///
    /// * `bits` - The width in bits, `1..=64`
    /// * `signed` - Whether values of this mode are interpreted as signed
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMode`] if `bits` is zero or larger than 64.
    pub fn int(bits: u32, signed: bool) -> Result<Self> {
        match u8::try_from(bits) {
            Ok(width @ 1..=64) => Ok(Self::new_int(width, signed)),
            _ => Err(Error::InvalidMode(bits)),
        }
    }

    /// Returns the category of this mode.
    #[must_use]
    pub const fn kind(self) -> ModeKind {
        self.kind
    }

    /// Returns the width of this mode in bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.bits as u32
    }

    /// Returns `true` for signed integer modes.
    #[must_use]
    pub const fn is_signed(self) -> bool {
        self.signed
    }

    /// Returns `true` for integer modes.
    #[must_use]
    pub const fn is_int(self) -> bool {
        matches!(self.kind, ModeKind::Int)
    }

    /// Returns `true` for the boolean mode.
    #[must_use]
    pub const fn is_bool(self) -> bool {
        matches!(self.kind, ModeKind::Bool)
    }

    /// Returns `true` for the control flow mode.
    #[must_use]
    pub const fn is_control(self) -> bool {
        matches!(self.kind, ModeKind::Control)
    }

    /// Returns `true` for the memory mode.
    #[must_use]
    pub const fn is_memory(self) -> bool {
        matches!(self.kind, ModeKind::Memory)
    }

    /// Returns `true` for the tuple mode.
    #[must_use]
    pub const fn is_tuple(self) -> bool {
        matches!(self.kind, ModeKind::Tuple)
    }

    /// Returns `true` for the block mode.
    #[must_use]
    pub const fn is_block(self) -> bool {
        matches!(self.kind, ModeKind::Block)
    }

    /// Returns the unsigned integer mode of the same width.
    ///
    /// Non-integer modes are returned unchanged.
    #[must_use]
    pub const fn as_unsigned(self) -> Self {
        if self.is_int() {
            Self::new_int(self.bits, false)
        } else {
            self
        }
    }

    /// Returns the signed integer mode of the same width.
    ///
    /// Non-integer modes are returned unchanged.
    #[must_use]
    pub const fn as_signed(self) -> Self {
        if self.is_int() {
            Self::new_int(self.bits, true)
        } else {
            self
        }
    }

    /// Returns the bit pattern with every bit of this mode set.
    ///
    /// For non-integer modes this is `1`, the pattern of `true`.
    #[must_use]
    pub const fn width_mask(self) -> u64 {
        match self.kind {
            ModeKind::Int if self.bits >= 64 => u64::MAX,
            ModeKind::Int => (1u64 << (self.bits as u32)) - 1,
            _ => 1,
        }
    }
}

impl fmt::Debug for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ModeKind::Int => write!(f, "{}{}", if self.signed { 'i' } else { 'u' }, self.bits),
            ModeKind::Bool => write!(f, "b"),
            ModeKind::Control => write!(f, "X"),
            ModeKind::Memory => write!(f, "M"),
            ModeKind::Tuple => write!(f, "T"),
            ModeKind::Block => write!(f, "BB"),
            ModeKind::Reference => write!(f, "P"),
            ModeKind::Float => write!(f, "f{}", self.bits),
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::{EnumCount, IntoEnumIterator};

    use super::*;

    #[test]
    fn test_int_constructor_bounds() {
        assert_eq!(Mode::int(8, true).unwrap(), Mode::I8);
        assert_eq!(Mode::int(64, false).unwrap(), Mode::U64);
        assert!(Mode::int(13, false).unwrap().is_int());
        assert!(matches!(Mode::int(0, true), Err(Error::InvalidMode(0))));
        assert!(matches!(Mode::int(65, true), Err(Error::InvalidMode(65))));
    }

    #[test]
    fn test_width_mask() {
        assert_eq!(Mode::U8.width_mask(), 0xFF);
        assert_eq!(Mode::I32.width_mask(), 0xFFFF_FFFF);
        assert_eq!(Mode::U64.width_mask(), u64::MAX);
        assert_eq!(Mode::int(1, false).unwrap().width_mask(), 1);
        assert_eq!(Mode::B.width_mask(), 1);
    }

    #[test]
    fn test_signedness_flips() {
        assert_eq!(Mode::I16.as_unsigned(), Mode::U16);
        assert_eq!(Mode::U32.as_signed(), Mode::I32);
        assert_eq!(Mode::M.as_unsigned(), Mode::M);
    }

    #[test]
    fn test_categories() {
        assert!(Mode::B.is_bool());
        assert!(Mode::X.is_control());
        assert!(Mode::M.is_memory());
        assert!(Mode::T.is_tuple());
        assert!(Mode::BB.is_block());
        assert!(!Mode::P.is_int());
        assert!(!Mode::F64.is_int());
        assert_eq!(ModeKind::iter().count(), ModeKind::COUNT);
    }

    #[test]
    fn test_display() {
        assert_eq!(Mode::I32.to_string(), "i32");
        assert_eq!(Mode::U8.to_string(), "u8");
        assert_eq!(Mode::X.to_string(), "X");
        assert_eq!(Mode::F32.to_string(), "f32");
        assert_eq!(ModeKind::Memory.to_string(), "Memory");
    }
}
