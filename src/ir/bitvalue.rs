//! Fixed-width two's-complement bit values.
//!
//! [`BitValue`] is the arithmetic engine behind both the IR's constants and the
//! don't-care analysis' care-masks. A value is an immutable bit pattern of
//! 1 to 64 bits tagged with its [`Mode`]; every operation returns a new value.
//!
//! # Overflow
//!
//! Bitwise operations and shifts are exact. Arithmetic (negation, addition,
//! subtraction, multiplication) goes through an [`Overflow`] policy:
//!
//! - [`Overflow::Wrap`] keeps the low bits of the exact result (non-saturating)
//! - [`Overflow::Saturate`] clamps the exact result to the mode's range
//!
//! The don't-care analysis builds its "every bit below the highest demanded
//! bit" masks as `(1 << (h + 1)) - 1`, which only yields all-ones for the top
//! bit when arithmetic wraps. It therefore insists on [`Overflow::Wrap`].
//!
//! # Shifts
//!
//! Shift amounts at or above the width are not reduced modulo the width: the
//! logical shifts produce zero and the arithmetic right shift produces the
//! sign fill.
//!
//! # Example
//!
//! ```rust
//! use carebits::ir::{BitValue, Mode, Overflow};
//!
//! let a = BitValue::new(Mode::U8, 0xF0);
//! let b = BitValue::new(Mode::U8, 0x3C);
//! assert_eq!(a.and(&b).raw(), 0x30);
//! assert_eq!(a.add(&b, Overflow::Wrap).raw(), 0x2C);
//! assert_eq!(a.add(&b, Overflow::Saturate).raw(), 0xFF);
//! assert_eq!(b.highest_bit(), Some(5));
//! ```

use std::{cmp::Ordering, fmt};

use crate::ir::Mode;

/// Integer overflow policy of the arithmetic operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Overflow {
    /// Keep the low bits of the exact result.
    #[default]
    Wrap,
    /// Clamp the exact result to the representable range of the mode.
    Saturate,
}

/// An immutable fixed-width two's-complement value.
///
/// The stored pattern is always truncated to the width of the mode, so two
/// values of the same mode compare equal exactly when their bits are equal.
/// Boolean values use the pattern `0` or `1`.
///
/// Binary operations expect both operands in the same mode and produce a
/// value in the mode of `self`; combining different modes is a caller bug
/// and trips a debug assertion.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitValue {
    bits: u64,
    mode: Mode,
}

impl BitValue {
    /// Creates a value from a raw bit pattern, truncated to the mode's width.
    #[must_use]
    pub const fn new(mode: Mode, raw: u64) -> Self {
        BitValue {
            bits: raw & mode.width_mask(),
            mode,
        }
    }

    /// Creates a value from a signed integer, truncated to the mode's width.
    #[must_use]
    pub const fn from_i64(mode: Mode, value: i64) -> Self {
        Self::new(mode, value as u64)
    }

    /// Creates a boolean value.
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        Self::new(Mode::B, value as u64)
    }

    /// The value with no bit set.
    #[must_use]
    pub const fn zero(mode: Mode) -> Self {
        Self::new(mode, 0)
    }

    /// The value `1`.
    #[must_use]
    pub const fn one(mode: Mode) -> Self {
        Self::new(mode, 1)
    }

    /// The value with every bit of the mode set.
    #[must_use]
    pub const fn all_ones(mode: Mode) -> Self {
        Self::new(mode, u64::MAX)
    }

    /// The pattern with only the top bit set, the minimum of the signed reading.
    #[must_use]
    pub const fn sign_bit_value(mode: Mode) -> Self {
        Self::new(mode, 1u64 << (mode.bits().saturating_sub(1)))
    }

    /// The smallest value of the mode: the signed minimum, or zero for unsigned modes.
    #[must_use]
    pub const fn min(mode: Mode) -> Self {
        if mode.is_signed() {
            Self::sign_bit_value(mode)
        } else {
            Self::zero(mode)
        }
    }

    /// The largest value of the mode.
    #[must_use]
    pub const fn max(mode: Mode) -> Self {
        if mode.is_signed() {
            Self::new(mode, mode.width_mask() >> 1)
        } else {
            Self::all_ones(mode)
        }
    }

    /// Returns the mode of this value.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the raw bit pattern, zero-extended to 64 bits.
    #[must_use]
    pub const fn raw(&self) -> u64 {
        self.bits
    }

    /// Returns the value read according to the mode's signedness.
    #[must_use]
    pub const fn to_i128(&self) -> i128 {
        if self.mode.is_signed() && self.sign_bit() {
            self.bits as i128 - (1i128 << self.mode.bits())
        } else {
            self.bits as i128
        }
    }

    /// Returns `true` if no bit is set.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.bits == 0
    }

    /// Returns `true` if every bit of the mode is set.
    #[must_use]
    pub const fn is_all_ones(&self) -> bool {
        self.bits == self.mode.width_mask()
    }

    /// Returns `true` if the top bit of the mode is set.
    #[must_use]
    pub const fn sign_bit(&self) -> bool {
        match self.mode.bits() {
            0 => false,
            width => (self.bits >> (width - 1)) & 1 == 1,
        }
    }

    /// Returns bit `index`, or `false` past the width.
    #[must_use]
    pub const fn bit(&self, index: u32) -> bool {
        index < 64 && (self.bits >> index) & 1 == 1
    }

    /// Returns a copy with bit `index` inverted; past the width nothing changes.
    #[must_use]
    pub const fn flip_bit(&self, index: u32) -> Self {
        if index >= 64 {
            return *self;
        }
        Self::new(self.mode, self.bits ^ (1u64 << index))
    }

    /// Returns the position of the highest set bit, or `None` for zero.
    #[must_use]
    pub const fn highest_bit(&self) -> Option<u32> {
        if self.bits == 0 {
            None
        } else {
            Some(63 - self.bits.leading_zeros())
        }
    }

    /// Returns the position of the lowest set bit, or `None` for zero.
    #[must_use]
    pub const fn lowest_bit(&self) -> Option<u32> {
        if self.bits == 0 {
            None
        } else {
            Some(self.bits.trailing_zeros())
        }
    }

    /// Returns the number of set bits.
    #[must_use]
    pub const fn count_ones(&self) -> u32 {
        self.bits.count_ones()
    }

    /// Bitwise AND.
    #[must_use]
    pub fn and(&self, other: &Self) -> Self {
        debug_assert_eq!(self.mode, other.mode, "and of mismatched modes");
        Self::new(self.mode, self.bits & other.bits)
    }

    /// Bitwise OR.
    #[must_use]
    pub fn or(&self, other: &Self) -> Self {
        debug_assert_eq!(self.mode, other.mode, "or of mismatched modes");
        Self::new(self.mode, self.bits | other.bits)
    }

    /// Bitwise XOR.
    #[must_use]
    pub fn xor(&self, other: &Self) -> Self {
        debug_assert_eq!(self.mode, other.mode, "xor of mismatched modes");
        Self::new(self.mode, self.bits ^ other.bits)
    }

    /// Bitwise complement within the mode's width.
    #[must_use]
    pub const fn not(&self) -> Self {
        Self::new(self.mode, !self.bits)
    }

    /// Logical left shift. Amounts at or above the width give zero.
    #[must_use]
    pub const fn shl(&self, amount: u32) -> Self {
        if amount >= self.mode.bits() {
            Self::zero(self.mode)
        } else {
            Self::new(self.mode, self.bits << amount)
        }
    }

    /// Logical right shift. Amounts at or above the width give zero.
    #[must_use]
    pub const fn shr(&self, amount: u32) -> Self {
        if amount >= self.mode.bits() {
            Self::zero(self.mode)
        } else {
            Self::new(self.mode, self.bits >> amount)
        }
    }

    /// Arithmetic right shift on the top bit, whatever the mode's signedness.
    ///
    /// Amounts at or above the width fill every bit with the sign.
    #[must_use]
    pub const fn shrs(&self, amount: u32) -> Self {
        let width = self.mode.bits();
        let fill = if self.sign_bit() { u64::MAX } else { 0 };
        if amount >= width {
            return Self::new(self.mode, fill);
        }
        let shifted = self.bits >> amount;
        // the bits vacated at the top of the mode
        let vacated = self.mode.width_mask() & !(self.mode.width_mask() >> amount);
        Self::new(self.mode, shifted | (fill & vacated))
    }

    /// Shift left by the amount held in another value, read as unsigned.
    #[must_use]
    pub const fn shl_by(&self, amount: &Self) -> Self {
        self.shl(amount.shift_amount())
    }

    /// Logical shift right by the amount held in another value, read as unsigned.
    #[must_use]
    pub const fn shr_by(&self, amount: &Self) -> Self {
        self.shr(amount.shift_amount())
    }

    /// Arithmetic shift right by the amount held in another value, read as unsigned.
    #[must_use]
    pub const fn shrs_by(&self, amount: &Self) -> Self {
        self.shrs(amount.shift_amount())
    }

    /// Reads this value as an unsigned shift amount, clamped to `u32::MAX`.
    #[must_use]
    pub const fn shift_amount(&self) -> u32 {
        if self.bits > u32::MAX as u64 {
            u32::MAX
        } else {
            self.bits as u32
        }
    }

    /// Arithmetic negation.
    #[must_use]
    pub fn neg(&self, overflow: Overflow) -> Self {
        self.arith(-self.to_i128(), overflow)
    }

    /// Addition.
    #[must_use]
    pub fn add(&self, other: &Self, overflow: Overflow) -> Self {
        debug_assert_eq!(self.mode, other.mode, "add of mismatched modes");
        self.arith(self.to_i128() + other.to_i128(), overflow)
    }

    /// Subtraction.
    #[must_use]
    pub fn sub(&self, other: &Self, overflow: Overflow) -> Self {
        debug_assert_eq!(self.mode, other.mode, "sub of mismatched modes");
        self.arith(self.to_i128() - other.to_i128(), overflow)
    }

    /// Multiplication.
    #[must_use]
    pub fn mul(&self, other: &Self, overflow: Overflow) -> Self {
        debug_assert_eq!(self.mode, other.mode, "mul of mismatched modes");
        // 64x64 bit products overflow i128 only for both operands near the unsigned max
        match self.to_i128().checked_mul(other.to_i128()) {
            Some(exact) => self.arith(exact, overflow),
            None => match overflow {
                Overflow::Wrap => Self::new(self.mode, self.bits.wrapping_mul(other.bits)),
                Overflow::Saturate => Self::max(self.mode),
            },
        }
    }

    /// Division rounding toward zero, or `None` for a zero divisor.
    ///
    /// The one overflowing case, the signed minimum divided by `-1`, follows
    /// the overflow policy like the other arithmetic.
    #[must_use]
    pub fn div(&self, other: &Self, overflow: Overflow) -> Option<Self> {
        debug_assert_eq!(self.mode, other.mode, "div of mismatched modes");
        if other.is_zero() {
            return None;
        }
        Some(self.arith(self.to_i128() / other.to_i128(), overflow))
    }

    /// Remainder with the sign of the dividend, or `None` for a zero divisor.
    #[must_use]
    pub fn rem(&self, other: &Self) -> Option<Self> {
        debug_assert_eq!(self.mode, other.mode, "rem of mismatched modes");
        if other.is_zero() {
            return None;
        }
        Some(Self::new(self.mode, (self.to_i128() % other.to_i128()) as u64))
    }

    /// Brings an exact result back into the mode according to the overflow policy.
    fn arith(&self, exact: i128, overflow: Overflow) -> Self {
        match overflow {
            Overflow::Wrap => Self::new(self.mode, exact as u64),
            Overflow::Saturate => {
                let lo = Self::min(self.mode).to_i128();
                let hi = Self::max(self.mode).to_i128();
                Self::new(self.mode, exact.clamp(lo, hi) as u64)
            }
        }
    }

    /// Compares two values of the same mode according to its signedness.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        debug_assert_eq!(self.mode, other.mode, "compare of mismatched modes");
        self.to_i128().cmp(&other.to_i128())
    }

    /// Converts into another mode.
    ///
    /// Between integer modes the value is sign- or zero-extended according to
    /// the source signedness and then truncated to the target width. Converting
    /// to a boolean tests for non-zero; converting a boolean to an integer
    /// gives `0` or `1`.
    #[must_use]
    pub const fn convert(&self, mode: Mode) -> Self {
        if mode.is_bool() {
            return Self::from_bool(self.bits != 0);
        }
        let extended = if self.mode.is_int() && self.mode.is_signed() && self.sign_bit() {
            self.bits | !self.mode.width_mask()
        } else {
            self.bits
        };
        Self::new(mode, extended)
    }
}

impl fmt::Display for BitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mode.is_int() {
            let digits = self.mode.bits().div_ceil(4) as usize;
            write!(f, "0x{:0width$x}", self.bits, width = digits)
        } else {
            write!(f, "{}", self.bits != 0)
        }
    }
}

impl fmt::Debug for BitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self, self.mode)
    }
}
