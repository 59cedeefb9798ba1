//! Care-masks and demands.
//!
//! A [`CareMask`] records which bits of a node's result can influence
//! observable behaviour. Integer nodes get one bit of mask per bit of result;
//! every other node (booleans, control flow, memory, tuples, pointers, floats)
//! is tracked as a whole with a single flag.
//!
//! A [`Demand`] is what one node asks of an operand during propagation:
//! either a concrete mask, or [`Demand::Full`] when the user cannot say which
//! bits matter and all of them must be assumed to.

use std::fmt;

use crate::{
    analysis::dataflow::JoinSemiLattice,
    ir::{BitValue, Mode},
};

/// The bits of a node's result that some observable behaviour depends on.
///
/// The order is bitwise inclusion, with `false < true` for flags. Bottom is
/// "nothing demanded", top is "every bit matters".
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum CareMask {
    /// Per-bit mask of an integer node, in the node's own mode.
    Bits(BitValue),
    /// Whole-value flag of a non-integer node.
    Flag(bool),
}

impl CareMask {
    /// Returns the least mask for a node of `mode`.
    #[must_use]
    pub const fn bottom(mode: Mode) -> Self {
        if mode.is_int() {
            CareMask::Bits(BitValue::zero(mode))
        } else {
            CareMask::Flag(false)
        }
    }

    /// Returns the greatest mask for a node of `mode`.
    #[must_use]
    pub const fn top(mode: Mode) -> Self {
        if mode.is_int() {
            CareMask::Bits(BitValue::all_ones(mode))
        } else {
            CareMask::Flag(true)
        }
    }

    /// Wraps a bit pattern; boolean values become flags.
    #[must_use]
    pub const fn from_value(value: BitValue) -> Self {
        if value.mode().is_int() {
            CareMask::Bits(value)
        } else {
            CareMask::Flag(!value.is_zero())
        }
    }

    /// Returns the mask as a bit pattern; a flag reads as a one-bit boolean.
    #[must_use]
    pub const fn to_value(&self) -> BitValue {
        match self {
            CareMask::Bits(value) => *value,
            CareMask::Flag(flag) => BitValue::from_bool(*flag),
        }
    }

    /// Returns the per-bit mask of an integer node.
    #[must_use]
    pub const fn as_bits(&self) -> Option<&BitValue> {
        match self {
            CareMask::Bits(value) => Some(value),
            CareMask::Flag(_) => None,
        }
    }

    /// Returns `true` if this mask can be stored for a node of `mode`
    /// without conversion.
    #[must_use]
    pub fn fits(&self, mode: Mode) -> bool {
        match self {
            CareMask::Bits(value) => mode.is_int() && value.mode() == mode,
            CareMask::Flag(_) => !mode.is_int(),
        }
    }

    /// Returns `true` if no bit is demanded.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        match self {
            CareMask::Bits(value) => value.is_zero(),
            CareMask::Flag(flag) => !*flag,
        }
    }

    /// Returns `true` if bit `bit` is demanded.
    ///
    /// A flag answers for every bit position.
    #[must_use]
    pub const fn cares_about(&self, bit: u32) -> bool {
        match self {
            CareMask::Bits(value) => value.bit(bit),
            CareMask::Flag(flag) => *flag,
        }
    }

    /// Returns the number of demanded bits; a set flag counts as one.
    #[must_use]
    pub const fn count(&self) -> u32 {
        match self {
            CareMask::Bits(value) => value.count_ones(),
            CareMask::Flag(flag) => *flag as u32,
        }
    }

    /// Returns the length of the longest strictly ascending chain from bottom
    /// for a node of `mode`: its width, or 1 for flags.
    #[must_use]
    pub const fn height(mode: Mode) -> u32 {
        if mode.is_int() {
            mode.bits()
        } else {
            1
        }
    }
}

impl JoinSemiLattice for CareMask {
    /// Join is bitwise OR; mixing the two kinds gives the set of both.
    fn join(&self, other: &Self) -> Self {
        match (self, other) {
            (CareMask::Bits(a), CareMask::Bits(b)) if a.mode() == b.mode() => {
                CareMask::Bits(a.or(b))
            }
            (CareMask::Flag(a), CareMask::Flag(b)) => CareMask::Flag(*a || *b),
            // different kinds or widths only meet through a misuse; answer with top
            (CareMask::Bits(a), _) => CareMask::Bits(BitValue::all_ones(a.mode())),
            (CareMask::Flag(_), _) => CareMask::Flag(true),
        }
    }

    fn is_top(&self) -> bool {
        match self {
            CareMask::Bits(value) => value.is_all_ones(),
            CareMask::Flag(flag) => *flag,
        }
    }

    fn is_bottom(&self) -> bool {
        self.is_zero()
    }
}

impl fmt::Display for CareMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CareMask::Bits(value) => write!(f, "{value}"),
            CareMask::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

impl fmt::Debug for CareMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CareMask::Bits(value) => write!(f, "Bits({value:?})"),
            CareMask::Flag(flag) => write!(f, "Flag({flag})"),
        }
    }
}

/// A request placed on an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demand {
    /// Every bit matters; used where bits cannot be tracked individually.
    Full,
    /// Exactly these bits matter.
    Mask(CareMask),
}

impl Demand {
    /// Turns the demand into a mask for a node of `mode`.
    ///
    /// `Full` becomes the node's top. A mask of another mode or kind is
    /// degraded: if it demands nothing it becomes the node's bottom,
    /// otherwise the node's top.
    #[must_use]
    pub fn resolve(self, mode: Mode) -> CareMask {
        match self {
            Demand::Full => CareMask::top(mode),
            Demand::Mask(mask) if mask.fits(mode) => mask,
            Demand::Mask(mask) if mask.is_zero() => CareMask::bottom(mode),
            Demand::Mask(_) => CareMask::top(mode),
        }
    }
}

impl From<CareMask> for Demand {
    fn from(mask: CareMask) -> Self {
        Demand::Mask(mask)
    }
}

impl From<BitValue> for Demand {
    fn from(value: BitValue) -> Self {
        Demand::Mask(CareMask::from_value(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bottom_and_top() {
        assert_eq!(CareMask::bottom(Mode::U8), CareMask::Bits(BitValue::zero(Mode::U8)));
        assert_eq!(CareMask::top(Mode::I16).to_value().raw(), 0xFFFF);
        assert_eq!(CareMask::bottom(Mode::B), CareMask::Flag(false));
        assert_eq!(CareMask::top(Mode::M), CareMask::Flag(true));
        assert!(CareMask::top(Mode::X).is_top());
        assert!(CareMask::bottom(Mode::U64).is_bottom());
    }

    #[test]
    fn test_join_is_or() {
        let a = CareMask::Bits(BitValue::new(Mode::U8, 0b0011));
        let b = CareMask::Bits(BitValue::new(Mode::U8, 0b0110));
        assert_eq!(a.join(&b), CareMask::Bits(BitValue::new(Mode::U8, 0b0111)));
        assert_eq!(a.join(&a), a);
        assert!(a.leq(&a.join(&b)));
        assert!(!a.join(&b).leq(&a));
        assert_eq!(CareMask::Flag(false).join(&CareMask::Flag(true)), CareMask::Flag(true));
    }

    #[test]
    fn test_resolve_full() {
        assert_eq!(Demand::Full.resolve(Mode::U32), CareMask::top(Mode::U32));
        assert_eq!(Demand::Full.resolve(Mode::B), CareMask::Flag(true));
    }

    #[test]
    fn test_resolve_cross_mode() {
        let narrow = Demand::from(BitValue::new(Mode::U8, 0x01));
        assert_eq!(narrow.resolve(Mode::U32), CareMask::top(Mode::U32));
        assert_eq!(narrow.resolve(Mode::B), CareMask::Flag(true));
        assert_eq!(narrow.resolve(Mode::U8).to_value().raw(), 0x01);

        let nothing = Demand::from(BitValue::zero(Mode::I8));
        assert_eq!(nothing.resolve(Mode::U8), CareMask::bottom(Mode::U8));
        assert_eq!(nothing.resolve(Mode::M), CareMask::Flag(false));

        // signedness is part of the mode
        let signed = Demand::from(BitValue::new(Mode::I8, 0x10));
        assert_eq!(signed.resolve(Mode::U8), CareMask::top(Mode::U8));

        assert_eq!(Demand::from(CareMask::Flag(true)).resolve(Mode::I8), CareMask::top(Mode::I8));
        assert_eq!(
            Demand::from(CareMask::Flag(false)).resolve(Mode::I8),
            CareMask::bottom(Mode::I8)
        );
    }

    #[test]
    fn test_queries() {
        let mask = CareMask::Bits(BitValue::new(Mode::U8, 0b1010));
        assert!(mask.cares_about(1));
        assert!(!mask.cares_about(2));
        assert_eq!(mask.count(), 2);
        assert!(CareMask::Flag(true).cares_about(17));
        assert_eq!(CareMask::height(Mode::I32), 32);
        assert_eq!(CareMask::height(Mode::T), 1);
        assert_eq!(CareMask::from_value(BitValue::from_bool(true)), CareMask::Flag(true));
        assert_eq!(mask.to_string(), "0x0a");
        assert_eq!(format!("{:?}", CareMask::Flag(false)), "Flag(false)");
    }
}
