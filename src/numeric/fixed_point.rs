// ============================================================================
// Fixed-Point 256
// Signed fixed-scale decimal with a 256-bit magnitude
// ============================================================================

use super::codec::{self, DecimalText};
use super::errors::{NumericError, NumericResult};
use super::u256::{pow10, U256, MAX_POW10};
use num_bigint::{BigInt, BigUint, Sign};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};
use std::str::FromStr;

/// Scale used when none is given (`FromStr`, serde, the associated constants).
pub const DEFAULT_SCALE: u8 = 6;

/// Largest supported scale; 10^77 is the largest power of ten below 2^256.
pub const MAX_SCALE: u8 = MAX_POW10;

/// Signed decimal `(-1)^negative × magnitude × 10^-scale`.
///
/// Values are immutable and `Copy`; every operation returns a new value.
/// A zero magnitude is never negative.
///
/// Binary operations first bring both operands to the larger of the two
/// scales (upscaling the other one, `Range` if that overflows) and the result
/// carries that common scale.
///
/// # Example
/// ```ignore
/// use perp_feed::numeric::FixedPoint256;
///
/// let price = FixedPoint256::from_text("2.50", 2)?;
/// let qty = FixedPoint256::from_text("4", 2)?;
/// let notional = price.checked_mul(qty)?;
/// assert_eq!(notional.to_string(), "10");
/// assert_eq!(notional.to_fixed_string().as_str(), "10.00");
/// ```
#[derive(Clone, Copy)]
pub struct FixedPoint256 {
    magnitude: U256,
    negative: bool,
    scale: u8,
}

/// Multiplies a magnitude by `10^by`.
#[inline]
fn upscale(magnitude: U256, by: u8) -> NumericResult<U256> {
    if by == 0 {
        return Ok(magnitude);
    }
    magnitude
        .checked_mul(pow10(by)?)
        .ok_or(NumericError::Range)
}

#[inline]
fn check_scale(scale: u8) -> NumericResult<()> {
    if scale > MAX_SCALE {
        Err(NumericError::Range)
    } else {
        Ok(())
    }
}

impl FixedPoint256 {
    /// Zero at `DEFAULT_SCALE`
    pub const ZERO: Self = Self::normalized(U256::ZERO, false, DEFAULT_SCALE);

    /// One at `DEFAULT_SCALE`
    pub const ONE: Self = Self::normalized(U256::from_u64(1_000_000), false, DEFAULT_SCALE);

    /// Largest positive value at `DEFAULT_SCALE`
    pub const MAX: Self = Self::normalized(U256::MAX, false, DEFAULT_SCALE);

    // ========================================================================
    // Construction
    // ========================================================================

    #[inline]
    const fn normalized(magnitude: U256, negative: bool, scale: u8) -> Self {
        Self {
            magnitude,
            negative: negative && !magnitude.is_zero(),
            scale,
        }
    }

    /// `units × 10^-6`, at `DEFAULT_SCALE`.
    #[inline]
    pub const fn from_micros(units: u64) -> Self {
        Self::normalized(U256::from_u64(units), false, DEFAULT_SCALE)
    }

    /// Builds a value from its raw parts.
    ///
    /// # Errors
    /// `Range` if `scale > MAX_SCALE`.
    pub fn from_parts(magnitude: U256, negative: bool, scale: u8) -> NumericResult<Self> {
        check_scale(scale)?;
        Ok(Self::normalized(magnitude, negative, scale))
    }

    pub fn zero(scale: u8) -> NumericResult<Self> {
        Self::from_parts(U256::ZERO, false, scale)
    }

    pub fn one(scale: u8) -> NumericResult<Self> {
        check_scale(scale)?;
        Ok(Self::normalized(pow10(scale)?, false, scale))
    }

    pub fn max(scale: u8) -> NumericResult<Self> {
        Self::from_parts(U256::MAX, false, scale)
    }

    /// `value × 10^scale`, i.e. the integer `value` expressed at `scale`.
    ///
    /// # Errors
    /// `Range` if the scale is invalid or the scaled magnitude overflows.
    pub fn from_i64(value: i64, scale: u8) -> NumericResult<Self> {
        check_scale(scale)?;
        let magnitude = upscale(U256::from_u64(value.unsigned_abs()), scale)?;
        Ok(Self::normalized(magnitude, value < 0, scale))
    }

    /// Parses decimal text (`[+-]digits[.digits]`) at `scale`, rounding
    /// surplus fractional digits half-up.
    ///
    /// # Errors
    /// `EmptyInput`, `Syntax` or `Range` as described in [`codec::parse_fixed`].
    pub fn from_text(text: &str, scale: u8) -> NumericResult<Self> {
        let (magnitude, negative) = codec::parse_fixed(text, scale)?;
        Ok(Self::normalized(magnitude, negative, scale))
    }

    /// Parses a signed integer string as the unscaled magnitude
    /// (`from_raw_str("-1500", 3)` is -1.5).
    pub fn from_raw_str(text: &str, scale: u8) -> NumericResult<Self> {
        let (magnitude, negative) = codec::parse_raw(text, scale)?;
        Ok(Self::normalized(magnitude, negative, scale))
    }

    /// Takes an arbitrary-precision integer as the unscaled magnitude.
    ///
    /// # Errors
    /// - `NilOperand` if `value` is `None`
    /// - `Range` if it needs more than 256 bits or the scale is invalid
    pub fn from_bigint(value: Option<&BigInt>, scale: u8) -> NumericResult<Self> {
        let value = value.ok_or(NumericError::NilOperand)?;
        check_scale(scale)?;

        let unsigned = value.magnitude();
        if unsigned.bits() > 256 {
            return Err(NumericError::Range);
        }

        let mut limbs = [0u64; 4];
        for (limb, digit) in limbs.iter_mut().zip(unsigned.to_u64_digits()) {
            *limb = digit;
        }
        Ok(Self::normalized(
            U256::from_limbs(limbs),
            value.sign() == Sign::Minus,
            scale,
        ))
    }

    /// Formats the float with its shortest round-trip representation and
    /// parses that text at `scale`.
    ///
    /// # Errors
    /// `Syntax` for NaN and infinities, otherwise as [`Self::from_text`].
    pub fn from_f64(value: f64, scale: u8) -> NumericResult<Self> {
        if !value.is_finite() {
            return Err(NumericError::Syntax);
        }
        Self::from_text(&value.to_string(), scale)
    }

    /// Converts a `rust_decimal::Decimal`, rounding half-up to `scale`.
    pub fn from_decimal(value: Decimal, scale: u8) -> NumericResult<Self> {
        check_scale(scale)?;
        let mantissa = value.mantissa();
        let exact = Self::normalized(
            U256::from_u128(mantissa.unsigned_abs()),
            mantissa < 0,
            value.scale() as u8,
        );
        exact.rescale(scale)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub const fn magnitude(&self) -> U256 {
        self.magnitude
    }

    #[inline]
    pub const fn scale(&self) -> u8 {
        self.scale
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.negative
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        !self.negative && !self.magnitude.is_zero()
    }

    /// -1, 0 or 1.
    #[inline]
    pub const fn signum(&self) -> i32 {
        if self.magnitude.is_zero() {
            0
        } else if self.negative {
            -1
        } else {
            1
        }
    }

    #[inline]
    pub const fn abs(self) -> Self {
        Self::normalized(self.magnitude, false, self.scale)
    }

    /// Same value at another scale; shrinking the scale rounds half-up.
    ///
    /// # Errors
    /// `Range` if the scale is invalid or growing it overflows.
    pub fn rescale(self, scale: u8) -> NumericResult<Self> {
        check_scale(scale)?;
        let magnitude = match scale.cmp(&self.scale) {
            Ordering::Equal => self.magnitude,
            Ordering::Greater => upscale(self.magnitude, scale - self.scale)?,
            Ordering::Less => {
                let divisor = pow10(self.scale - scale)?;
                let (quot, rem) = self.magnitude.div_rem(divisor)?;
                if rem >= divisor.halve() {
                    // quot <= MAX / 10
                    quot.checked_add(U256::ONE).ok_or(NumericError::Range)?
                } else {
                    quot
                }
            },
        };
        Ok(Self::normalized(magnitude, self.negative, scale))
    }

    /// Both magnitudes at the larger of the two scales.
    fn align(self, rhs: Self) -> NumericResult<(U256, U256, u8)> {
        match self.scale.cmp(&rhs.scale) {
            Ordering::Equal => Ok((self.magnitude, rhs.magnitude, self.scale)),
            Ordering::Less => Ok((
                upscale(self.magnitude, rhs.scale - self.scale)?,
                rhs.magnitude,
                rhs.scale,
            )),
            Ordering::Greater => Ok((
                self.magnitude,
                upscale(rhs.magnitude, self.scale - rhs.scale)?,
                self.scale,
            )),
        }
    }

    // ========================================================================
    // Arithmetic Operations
    // ========================================================================

    /// Checked addition.
    ///
    /// # Errors
    /// `Range` if scale alignment or the sum overflows.
    pub fn checked_add(self, rhs: Self) -> NumericResult<Self> {
        let (a, b, scale) = self.align(rhs)?;

        if self.negative == rhs.negative {
            let sum = a.checked_add(b).ok_or(NumericError::Range)?;
            return Ok(Self::normalized(sum, self.negative, scale));
        }

        // Opposite signs: the larger magnitude wins the sign.
        if a >= b {
            Ok(Self::normalized(a.overflowing_sub(b).0, self.negative, scale))
        } else {
            Ok(Self::normalized(b.overflowing_sub(a).0, rhs.negative, scale))
        }
    }

    /// Checked subtraction.
    ///
    /// # Errors
    /// `Range` if scale alignment or the difference overflows.
    #[inline]
    pub fn checked_sub(self, rhs: Self) -> NumericResult<Self> {
        self.checked_add(-rhs)
    }

    /// Checked multiplication with round half-up.
    ///
    /// The raw product of the aligned magnitudes must fit in 256 bits; it is
    /// then brought back to the common scale as `(p + 10^s / 2) / 10^s`.
    ///
    /// # Errors
    /// `Range` if any intermediate overflows.
    pub fn checked_mul(self, rhs: Self) -> NumericResult<Self> {
        let (a, b, scale) = self.align(rhs)?;
        let unit = pow10(scale)?;

        let product = a.checked_mul(b).ok_or(NumericError::Range)?;
        let rounded = product
            .checked_add(unit.halve())
            .ok_or(NumericError::Range)?;
        let magnitude = rounded.checked_div(unit)?;

        Ok(Self::normalized(magnitude, self.negative != rhs.negative, scale))
    }

    /// Checked division with round half-up: `(a × 10^s + b / 2) / b`.
    ///
    /// # Errors
    /// - `DivisionByZero` if `rhs` is zero
    /// - `Range` if any intermediate overflows
    pub fn checked_div(self, rhs: Self) -> NumericResult<Self> {
        if rhs.is_zero() {
            return Err(NumericError::DivisionByZero);
        }
        let (a, b, scale) = self.align(rhs)?;

        let numerator = upscale(a, scale)?
            .checked_add(b.halve())
            .ok_or(NumericError::Range)?;
        let magnitude = numerator.checked_div(b)?;

        Ok(Self::normalized(magnitude, self.negative != rhs.negative, scale))
    }

    /// Product of the aligned magnitudes with no rescale step.
    /// The smaller-scale operand is upscaled to the common scale first.
    pub fn raw_mul(self, rhs: Self) -> NumericResult<Self> {
        let (a, b, scale) = self.align(rhs)?;
        let magnitude = a.checked_mul(b).ok_or(NumericError::Range)?;
        Ok(Self::normalized(magnitude, self.negative != rhs.negative, scale))
    }

    /// Truncating quotient of the aligned magnitudes with no rescale step.
    /// The smaller-scale operand is upscaled to the common scale first.
    pub fn raw_div(self, rhs: Self) -> NumericResult<Self> {
        let (a, b, scale) = self.align(rhs)?;
        let magnitude = a.checked_div(b)?;
        Ok(Self::normalized(magnitude, self.negative != rhs.negative, scale))
    }

    /// Remainder of the aligned magnitudes, carrying the dividend's sign.
    ///
    /// # Errors
    /// - `DivisionByZero` if `rhs` is zero
    /// - `Range` if scale alignment overflows
    pub fn checked_rem(self, rhs: Self) -> NumericResult<Self> {
        let (a, b, scale) = self.align(rhs)?;
        let magnitude = a.checked_rem(b)?;
        Ok(Self::normalized(magnitude, self.negative, scale))
    }

    /// Like [`Self::checked_rem`], except that a zero divisor yields zero.
    pub fn modulo(self, rhs: Self) -> NumericResult<Self> {
        let (a, b, scale) = self.align(rhs)?;
        Ok(Self::normalized(a.rem_or_zero(b), self.negative, scale))
    }

    /// Snaps the magnitude to a multiple of `|step|`, toward zero or (with
    /// `up`) away from it. Exact multiples are returned unchanged.
    ///
    /// # Errors
    /// - `DivisionByZero` if `step` is zero
    /// - `Range` if rounding up overflows
    pub fn round_to_step(self, step: Self, up: bool) -> NumericResult<Self> {
        let (a, b, scale) = self.align(step)?;
        let (quot, rem) = a.div_rem(b)?;

        if rem.is_zero() {
            return Ok(Self::normalized(a, self.negative, scale));
        }

        // quot * b <= a
        let mut magnitude = quot.overflowing_mul(b).0;
        if up {
            magnitude = magnitude.checked_add(b).ok_or(NumericError::Range)?;
        }
        Ok(Self::normalized(magnitude, self.negative, scale))
    }

    // ========================================================================
    // Conversions
    // ========================================================================

    /// The value as an integer count of `10^-scale` units, rounded half-up.
    ///
    /// # Errors
    /// `Range` if the scale is invalid or the count does not fit in an `i64`.
    pub fn to_i64(self, scale: u8) -> NumericResult<i64> {
        let units = self.rescale(scale)?.magnitude;
        if !units.fits_u64() {
            return Err(NumericError::Range);
        }
        let units = units.low_u64();
        if self.negative {
            0i64.checked_sub_unsigned(units).ok_or(NumericError::Range)
        } else {
            i64::try_from(units).map_err(|_| NumericError::Range)
        }
    }

    /// The signed unscaled magnitude.
    pub fn to_bigint(self) -> BigInt {
        let unsigned = self
            .magnitude
            .limbs()
            .iter()
            .rev()
            .fold(BigUint::default(), |acc, &limb| (acc << 64u32) | BigUint::from(limb));
        let sign = if self.negative { Sign::Minus } else { Sign::Plus };
        BigInt::from_biguint(sign, unsigned)
    }

    /// Nearest `f64`, via the canonical text.
    pub fn to_f64(self) -> f64 {
        // Canonical text is always a plain decimal literal.
        self.to_text().parse().unwrap_or(f64::NAN)
    }

    /// Converts to `rust_decimal::Decimal`, rounding half-up to 28 fractional
    /// digits when the scale is larger.
    ///
    /// # Errors
    /// `Range` if the magnitude exceeds the 96-bit mantissa.
    pub fn to_decimal(self) -> NumericResult<Decimal> {
        let value = self.rescale(self.scale.min(28))?;
        let mantissa = value
            .magnitude
            .to_u128()
            .and_then(|m| i128::try_from(m).ok())
            .ok_or(NumericError::Range)?;
        let mantissa = if value.negative { -mantissa } else { mantissa };
        Decimal::try_from_i128_with_scale(mantissa, u32::from(value.scale))
            .map_err(|_| NumericError::Range)
    }

    /// Canonical form: trailing fractional zeros trimmed.
    #[inline]
    pub fn to_text(self) -> DecimalText {
        codec::render(self.magnitude, self.negative, self.scale, true)
    }

    /// Padded form with exactly `scale` fractional digits (`"10.00"`).
    #[inline]
    pub fn to_fixed_string(self) -> DecimalText {
        codec::render(self.magnitude, self.negative, self.scale, false)
    }

    // ========================================================================
    // Comparison helpers
    // ========================================================================

    /// Compares magnitudes across scales. An upscale that overflows 256 bits
    /// belongs to the larger magnitude.
    fn cmp_magnitude(&self, other: &Self) -> Ordering {
        match self.scale.cmp(&other.scale) {
            Ordering::Equal => self.magnitude.cmp(&other.magnitude),
            Ordering::Less => match upscale(self.magnitude, other.scale - self.scale) {
                Ok(m) => m.cmp(&other.magnitude),
                Err(_) => Ordering::Greater,
            },
            Ordering::Greater => match upscale(other.magnitude, self.scale - other.scale) {
                Ok(m) => self.magnitude.cmp(&m),
                Err(_) => Ordering::Less,
            },
        }
    }

    /// The same value at its smallest exact scale.
    fn reduced(self) -> (U256, u8) {
        if self.magnitude.is_zero() {
            return (U256::ZERO, 0);
        }
        let mut magnitude = self.magnitude;
        let mut scale = self.scale;
        while scale > 0 {
            let (quot, rem) = magnitude.div_rem_limb(10);
            if rem != 0 {
                break;
            }
            magnitude = quot;
            scale -= 1;
        }
        (magnitude, scale)
    }
}

// ============================================================================
// Trait Implementations
// ============================================================================

impl Default for FixedPoint256 {
    #[inline]
    fn default() -> Self {
        Self::ZERO
    }
}

impl PartialEq for FixedPoint256 {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FixedPoint256 {}

impl PartialOrd for FixedPoint256 {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FixedPoint256 {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.cmp_magnitude(other),
            (true, true) => other.cmp_magnitude(self),
        }
    }
}

impl Hash for FixedPoint256 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let (magnitude, scale) = self.reduced();
        magnitude.hash(state);
        scale.hash(state);
        self.negative.hash(state);
    }
}

impl Neg for FixedPoint256 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self::Output {
        Self::normalized(self.magnitude, !self.negative, self.scale)
    }
}

// Infallible operators panic on failure; use checked_* on untrusted input.
impl Add for FixedPoint256 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        self.checked_add(rhs).expect("FixedPoint256 addition overflow")
    }
}

impl Sub for FixedPoint256 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        self.checked_sub(rhs).expect("FixedPoint256 subtraction overflow")
    }
}

impl Mul for FixedPoint256 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self::Output {
        self.checked_mul(rhs).expect("FixedPoint256 multiplication overflow")
    }
}

impl Div for FixedPoint256 {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self::Output {
        self.checked_div(rhs).expect("FixedPoint256 division failed")
    }
}

impl Rem for FixedPoint256 {
    type Output = Self;

    #[inline]
    fn rem(self, rhs: Self) -> Self::Output {
        self.checked_rem(rhs).expect("FixedPoint256 remainder failed")
    }
}

// ============================================================================
// Display and Debug
// ============================================================================

impl fmt::Debug for FixedPoint256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedPoint256({}, scale={})", self, self.scale)
    }
}

impl fmt::Display for FixedPoint256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.to_text())
    }
}

// ============================================================================
// String Parsing
// ============================================================================

impl FromStr for FixedPoint256 {
    type Err = NumericError;

    /// Parses at `DEFAULT_SCALE`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s, DEFAULT_SCALE)
    }
}

// ============================================================================
// Tests
// ============================================================================
