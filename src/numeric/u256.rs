// ============================================================================
// 256-bit Unsigned Kernel
// Four 64-bit limbs with explicit carry, borrow and overflow reporting
// ============================================================================

use super::errors::{NumericError, NumericResult};
use std::cmp::Ordering;
use std::fmt;

/// Largest exponent `n` for which `10^n` fits in 256 bits.
pub const MAX_POW10: u8 = 77;

/// 256-bit unsigned integer stored as four 64-bit limbs, least significant first.
///
/// Every arithmetic method reports overflow (or borrow) alongside the wrapped
/// result; it is up to the caller to treat the flag as a failure. The type is
/// `Copy` and never allocates.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct U256([u64; 4]);

// ============================================================================
// Limb Primitives
// ============================================================================

/// `a + b + carry`, returning `(sum, carry_out)`.
#[inline(always)]
pub(crate) const fn add_carry(a: u64, b: u64, carry: u64) -> (u64, u64) {
    let sum = a as u128 + b as u128 + carry as u128;
    (sum as u64, (sum >> 64) as u64)
}

/// `a - b - borrow`, returning `(difference, borrow_out)`.
#[inline(always)]
pub(crate) const fn sub_borrow(a: u64, b: u64, borrow: u64) -> (u64, u64) {
    let (diff, b1) = a.overflowing_sub(b);
    let (diff, b2) = diff.overflowing_sub(borrow);
    (diff, (b1 | b2) as u64)
}

/// Full 64x64 -> 128 product as `(hi, lo)`.
#[inline(always)]
pub(crate) const fn mul_wide(a: u64, b: u64) -> (u64, u64) {
    let product = a as u128 * b as u128;
    ((product >> 64) as u64, product as u64)
}

/// `z + x * y + carry` as `(hi, lo)`. Cannot overflow 128 bits.
#[inline(always)]
const fn mul_step(z: u64, x: u64, y: u64, carry: u64) -> (u64, u64) {
    let t = x as u128 * y as u128 + z as u128 + carry as u128;
    ((t >> 64) as u64, t as u64)
}

// ============================================================================
// Power-of-Ten Table
// ============================================================================

const POW10: [U256; MAX_POW10 as usize + 1] = {
    let mut table = [U256::ZERO; MAX_POW10 as usize + 1];
    table[0] = U256::ONE;
    let mut i = 1;
    while i < table.len() {
        table[i] = table[i - 1].overflowing_mul_u64(10).0;
        i += 1;
    }
    table
};

/// `10^n` for `n <= 77`.
///
/// # Errors
/// Returns `Range` when `10^n` does not fit in 256 bits.
#[inline]
pub fn pow10(n: u8) -> NumericResult<U256> {
    POW10.get(n as usize).copied().ok_or(NumericError::Range)
}

impl U256 {
    pub const ZERO: Self = Self([0, 0, 0, 0]);

    pub const ONE: Self = Self([1, 0, 0, 0]);

    /// 2^256 - 1
    pub const MAX: Self = Self([u64::MAX; 4]);

    // ========================================================================
    // Construction
    // ========================================================================

    #[inline]
    pub const fn from_limbs(limbs: [u64; 4]) -> Self {
        Self(limbs)
    }

    #[inline]
    pub const fn from_u64(value: u64) -> Self {
        Self([value, 0, 0, 0])
    }

    #[inline]
    pub const fn from_u128(value: u128) -> Self {
        Self([value as u64, (value >> 64) as u64, 0, 0])
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Limbs, least significant first.
    #[inline]
    pub const fn limbs(&self) -> [u64; 4] {
        self.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        (self.0[0] | self.0[1] | self.0[2] | self.0[3]) == 0
    }

    /// True when the value fits in the lowest limb.
    #[inline]
    pub const fn fits_u64(&self) -> bool {
        (self.0[1] | self.0[2] | self.0[3]) == 0
    }

    /// The lowest 64 bits.
    #[inline]
    pub const fn low_u64(&self) -> u64 {
        self.0[0]
    }

    pub const fn to_u128(&self) -> Option<u128> {
        if (self.0[2] | self.0[3]) != 0 {
            return None;
        }
        Some(((self.0[1] as u128) << 64) | self.0[0] as u128)
    }

    pub const fn leading_zeros(&self) -> u32 {
        let mut i = 4;
        while i > 0 {
            i -= 1;
            if self.0[i] != 0 {
                return (3 - i as u32) * 64 + self.0[i].leading_zeros();
            }
        }
        256
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    /// Carry-chain addition; the flag is set when a carry leaves the top limb.
    #[inline]
    pub const fn overflowing_add(self, rhs: Self) -> (Self, bool) {
        let (z0, carry) = add_carry(self.0[0], rhs.0[0], 0);
        let (z1, carry) = add_carry(self.0[1], rhs.0[1], carry);
        let (z2, carry) = add_carry(self.0[2], rhs.0[2], carry);
        let (z3, carry) = add_carry(self.0[3], rhs.0[3], carry);
        (Self([z0, z1, z2, z3]), carry != 0)
    }

    /// Borrow-chain subtraction; the flag is set iff `self < rhs`.
    #[inline]
    pub const fn overflowing_sub(self, rhs: Self) -> (Self, bool) {
        let (z0, borrow) = sub_borrow(self.0[0], rhs.0[0], 0);
        let (z1, borrow) = sub_borrow(self.0[1], rhs.0[1], borrow);
        let (z2, borrow) = sub_borrow(self.0[2], rhs.0[2], borrow);
        let (z3, borrow) = sub_borrow(self.0[3], rhs.0[3], borrow);
        (Self([z0, z1, z2, z3]), borrow != 0)
    }

    /// `self < other`, computed as "self - other borrows".
    #[inline]
    pub const fn lt(&self, other: &Self) -> bool {
        let (_, borrow) = sub_borrow(self.0[0], other.0[0], 0);
        let (_, borrow) = sub_borrow(self.0[1], other.0[1], borrow);
        let (_, borrow) = sub_borrow(self.0[2], other.0[2], borrow);
        let (_, borrow) = sub_borrow(self.0[3], other.0[3], borrow);
        borrow != 0
    }

    /// Full 256x256 -> 512 schoolbook product, limbs least significant first.
    pub(crate) const fn widening_mul(self, rhs: Self) -> [u64; 8] {
        let mut res = [0u64; 8];
        let mut i = 0;
        while i < 4 {
            let mut carry = 0;
            let mut j = 0;
            while j < 4 {
                let (hi, lo) = mul_step(res[i + j], self.0[j], rhs.0[i], carry);
                res[i + j] = lo;
                carry = hi;
                j += 1;
            }
            res[i + 4] = carry;
            i += 1;
        }
        res
    }

    /// Low 256 bits of the product; the flag is set when any high limb is nonzero.
    #[inline]
    pub const fn overflowing_mul(self, rhs: Self) -> (Self, bool) {
        let p = self.widening_mul(rhs);
        (
            Self([p[0], p[1], p[2], p[3]]),
            (p[4] | p[5] | p[6] | p[7]) != 0,
        )
    }

    /// Multiply by a single limb.
    pub const fn overflowing_mul_u64(self, rhs: u64) -> (Self, bool) {
        let (c, z0) = mul_step(0, self.0[0], rhs, 0);
        let (c, z1) = mul_step(0, self.0[1], rhs, c);
        let (c, z2) = mul_step(0, self.0[2], rhs, c);
        let (c, z3) = mul_step(0, self.0[3], rhs, c);
        (Self([z0, z1, z2, z3]), c != 0)
    }

    #[inline]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.overflowing_add(rhs) {
            (sum, false) => Some(sum),
            (_, true) => None,
        }
    }

    #[inline]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.overflowing_sub(rhs) {
            (diff, false) => Some(diff),
            (_, true) => None,
        }
    }

    #[inline]
    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        match self.overflowing_mul(rhs) {
            (product, false) => Some(product),
            (_, true) => None,
        }
    }

    /// `self >> 1`
    #[inline]
    pub const fn halve(self) -> Self {
        Self([
            (self.0[0] >> 1) | (self.0[1] << 63),
            (self.0[1] >> 1) | (self.0[2] << 63),
            (self.0[2] >> 1) | (self.0[3] << 63),
            self.0[3] >> 1,
        ])
    }
}

impl Ord for U256 {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        if self == other {
            Ordering::Equal
        } else if self.lt(other) {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }
}

impl PartialOrd for U256 {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<u64> for U256 {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<u128> for U256 {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

impl fmt::Debug for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "U256(0x{:016x}{:016x}{:016x}{:016x})",
            self.0[3], self.0[2], self.0[1], self.0[0]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    #[test]
    fn test_add_carries_across_limbs() {
        let x = U256::from_limbs([u64::MAX, u64::MAX, 0, 0]);
        let (z, overflow) = x.overflowing_add(U256::ONE);
        assert_eq!(z.limbs(), [0, 0, 1, 0]);
        assert!(!overflow);
    }

    #[test]
    fn test_add_overflow() {
        let (z, overflow) = U256::MAX.overflowing_add(U256::ONE);
        assert!(z.is_zero());
        assert!(overflow);
        assert_eq!(U256::MAX.checked_add(U256::ONE), None);
    }

    #[test]
    fn test_sub_borrow() {
        let (z, borrow) = U256::ZERO.overflowing_sub(U256::ONE);
        assert_eq!(z, U256::MAX);
        assert!(borrow);

        let x = U256::from_limbs([0, 0, 0, 1]);
        let (z, borrow) = x.overflowing_sub(U256::ONE);
        assert_eq!(z.limbs(), [u64::MAX, u64::MAX, u64::MAX, 0]);
        assert!(!borrow);
    }

    #[test]
    fn test_lt_is_total_order() {
        let small = U256::from_limbs([u64::MAX, 0, 0, 0]);
        let big = U256::from_limbs([0, 1, 0, 0]);
        assert!(small.lt(&big));
        assert!(!big.lt(&small));
        assert!(!big.lt(&big));
        assert!(small < big);
        assert_eq!(big.cmp(&big), Ordering::Equal);
    }

    #[test]
    fn test_mul_cross_limb() {
        // 2^64 * 2^64 = 2^128
        let x = U256::from_limbs([0, 1, 0, 0]);
        let (z, overflow) = x.overflowing_mul(x);
        assert_eq!(z.limbs(), [0, 0, 1, 0]);
        assert!(!overflow);
    }

    #[test]
    fn test_mul_overflow() {
        // 2^128 * 2^128 = 2^256 does not fit
        let x = U256::from_limbs([0, 0, 1, 0]);
        let (z, overflow) = x.overflowing_mul(x);
        assert!(z.is_zero());
        assert!(overflow);

        // MAX * 1 fits, MAX * 2 does not
        assert_eq!(U256::MAX.checked_mul(U256::ONE), Some(U256::MAX));
        assert_eq!(U256::MAX.checked_mul(U256::from_u64(2)), None);
    }

    #[test]
    fn test_widening_mul_high_half() {
        // (2^256 - 1)^2 = 2^512 - 2^257 + 1
        let p = U256::MAX.widening_mul(U256::MAX);
        assert_eq!(p[0], 1);
        assert_eq!(&p[1..4], &[0, 0, 0]);
        assert_eq!(p[4], u64::MAX - 1);
        assert_eq!(&p[5..8], &[u64::MAX, u64::MAX, u64::MAX]);
    }

    #[test]
    fn test_pow10_table() {
        assert_eq!(pow10(0).unwrap(), U256::ONE);
        assert_eq!(pow10(19).unwrap().limbs(), [10_000_000_000_000_000_000, 0, 0, 0]);
        assert_eq!(
            pow10(38).unwrap().limbs(),
            [687399551400673280, 5421010862427522170, 0, 0]
        );
        assert_eq!(
            pow10(57).unwrap().limbs(),
            [5332261958806667264, 17004971331911604867, 2938735877055718769, 0]
        );
        assert_eq!(
            pow10(76).unwrap().limbs(),
            [0, 8607968719199866880, 532749306367912313, 1593091911132452277]
        );
        assert!(pow10(77).is_ok());
        assert_eq!(pow10(78), Err(NumericError::Range));
    }

    #[test]
    fn test_halve_and_leading_zeros() {
        let x = U256::from_limbs([0, 1, 0, 0]);
        assert_eq!(x.halve().limbs(), [1 << 63, 0, 0, 0]);
        assert_eq!(U256::ZERO.leading_zeros(), 256);
        assert_eq!(U256::ONE.leading_zeros(), 255);
        assert_eq!(U256::MAX.leading_zeros(), 0);
        assert_eq!(x.leading_zeros(), 191);
    }

    quickcheck! {
        fn prop_add_matches_u128(a: u128, b: u128) -> bool {
            let (sum, carry) = a.overflowing_add(b);
            let (z, overflow) = U256::from_u128(a).overflowing_add(U256::from_u128(b));
            !overflow && z.limbs() == [sum as u64, (sum >> 64) as u64, carry as u64, 0]
        }

        fn prop_mul_matches_u128(a: u64, b: u64) -> bool {
            let (z, overflow) = U256::from_u64(a).overflowing_mul(U256::from_u64(b));
            !overflow && z.to_u128() == Some(a as u128 * b as u128)
        }

        fn prop_sub_borrow_iff_less(a: u128, b: u128) -> bool {
            let (_, borrow) = U256::from_u128(a).overflowing_sub(U256::from_u128(b));
            borrow == (a < b) && U256::from_u128(a).lt(&U256::from_u128(b)) == (a < b)
        }
    }
}
