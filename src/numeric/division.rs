// ============================================================================
// Division Engine
// Multiword division for U256: reciprocal fast path and Knuth Algorithm D
// ============================================================================
//
// Both paths work on normalized operands: divisor and dividend are shifted
// left until the divisor's top limb has its high bit set. The single-limb path
// divides by a precomputed reciprocal ("Improved division by invariant
// integers", Moller & Granlund, Algorithm 4). The multi-limb path is Knuth,
// TAOCP vol. 2, section 4.3.1, Algorithm D with 64-bit digits.

use super::errors::{NumericError, NumericResult};
use super::u256::{mul_wide, U256};

/// Reciprocal of a normalized divisor: `floor((2^128 - 1) / d) - 2^64`.
#[inline]
pub(crate) fn reciprocal_2by1(d: u64) -> u64 {
    debug_assert!(d >> 63 == 1, "divisor must be normalized");
    let numerator = ((!d as u128) << 64) | u64::MAX as u128;
    (numerator / d as u128) as u64
}

/// Divides `<uh, ul>` by the normalized `d` using its reciprocal `v`.
///
/// Requires `uh < d`. Returns `(quotient, remainder)`.
#[inline]
pub(crate) fn udivrem_2by1(uh: u64, ul: u64, d: u64, v: u64) -> (u64, u64) {
    let (qh, ql) = mul_wide(v, uh);
    let (ql, carry) = ql.overflowing_add(ul);
    let mut q = qh.wrapping_add(uh).wrapping_add(carry as u64).wrapping_add(1);

    let mut r = ul.wrapping_sub(q.wrapping_mul(d));

    if r > ql {
        q = q.wrapping_sub(1);
        r = r.wrapping_add(d);
    }

    if r >= d {
        q = q.wrapping_add(1);
        r -= d;
    }

    (q, r)
}

/// `x += y`, returning the carry out. Requires `x.len() >= y.len()`.
fn add_to(x: &mut [u64], y: &[u64]) -> u64 {
    let mut carry = 0u64;
    for (xi, &yi) in x.iter_mut().zip(y) {
        let sum = *xi as u128 + yi as u128 + carry as u128;
        *xi = sum as u64;
        carry = (sum >> 64) as u64;
    }
    carry
}

/// `x -= y * multiplier`, returning the borrow out. Requires `x.len() >= y.len()`.
fn sub_mul_to(x: &mut [u64], y: &[u64], multiplier: u64) -> u64 {
    let mut borrow = 0u64;
    for (xi, &yi) in x.iter_mut().zip(y) {
        let (s, c1) = xi.overflowing_sub(borrow);
        let (ph, pl) = mul_wide(yi, multiplier);
        let (t, c2) = s.overflowing_sub(pl);
        *xi = t;
        borrow = ph + c1 as u64 + c2 as u64;
    }
    borrow
}

/// Divides `u` by the single normalized limb `d`.
///
/// Quotient limbs are written to `quot[..u.len() - 1]`; the top limb of `u`
/// must be below `d`.
fn udivrem_by1(quot: &mut [u64], u: &[u64], d: u64) -> u64 {
    let reciprocal = reciprocal_2by1(d);
    let mut rem = u[u.len() - 1];
    for j in (0..u.len() - 1).rev() {
        let (q, r) = udivrem_2by1(rem, u[j], d, reciprocal);
        quot[j] = q;
        rem = r;
    }
    rem
}

/// Algorithm D on a normalized multi-limb divisor `d` (at least two limbs).
///
/// Quotient digits go to `quot[..u.len() - d.len()]`; `u` is left holding the
/// (still normalized) remainder in its low `d.len()` limbs.
fn udivrem_knuth(quot: &mut [u64], u: &mut [u64], d: &[u64]) {
    let n = d.len();
    let dh = d[n - 1];
    let dl = d[n - 2];
    let reciprocal = reciprocal_2by1(dh);

    for j in (0..u.len().saturating_sub(n)).rev() {
        let u2 = u[j + n];
        let u1 = u[j + n - 1];
        let u0 = u[j + n - 2];

        let mut qhat;
        if u2 >= dh {
            // Estimate does not fit in a limb.
            qhat = u64::MAX;
        } else {
            let (q, r) = udivrem_2by1(u2, u1, dh, reciprocal);
            qhat = q;
            let mut rhat = r;
            for _ in 0..2 {
                let (ph, pl) = mul_wide(qhat, dl);
                if ph > rhat || (ph == rhat && pl > u0) {
                    qhat -= 1;
                    let (next, overflow) = rhat.overflowing_add(dh);
                    if overflow {
                        break;
                    }
                    rhat = next;
                } else {
                    break;
                }
            }
        }

        let borrow = sub_mul_to(&mut u[j..j + n], d, qhat);
        u[j + n] = u2.wrapping_sub(borrow);
        if u2 < borrow {
            // Subtracted one divisor too many.
            qhat = qhat.wrapping_sub(1);
            let carry = add_to(&mut u[j..j + n], d);
            u[j + n] = u[j + n].wrapping_add(carry);
        }

        quot[j] = qhat;
    }
}

/// Bits that spill out of the top of a limb when shifting left by `shift`.
#[inline(always)]
fn spill(limb: u64, shift: u32) -> u64 {
    if shift == 0 {
        0
    } else {
        limb >> (64 - shift)
    }
}

/// Bits that move into a limb from its upper neighbour when shifting right by `shift`.
#[inline(always)]
fn carry_in(limb: u64, shift: u32) -> u64 {
    if shift == 0 {
        0
    } else {
        limb << (64 - shift)
    }
}

/// Divides `u` by the nonzero `d`, writing the quotient into `quot` and
/// returning the remainder.
fn udivrem(quot: &mut [u64; 4], u: &[u64; 4], d: &U256) -> U256 {
    let d = d.limbs();
    let d_len = match d.iter().rposition(|&limb| limb != 0) {
        Some(top) => top + 1,
        None => unreachable!("udivrem called with a zero divisor"),
    };
    let u_len = match u.iter().rposition(|&limb| limb != 0) {
        Some(top) => top + 1,
        None => return U256::ZERO,
    };

    let shift = d[d_len - 1].leading_zeros();

    let mut dn = [0u64; 4];
    for i in (1..d_len).rev() {
        dn[i] = (d[i] << shift) | spill(d[i - 1], shift);
    }
    dn[0] = d[0] << shift;

    let mut un = [0u64; 5];
    un[u_len] = spill(u[u_len - 1], shift);
    for i in (1..u_len).rev() {
        un[i] = (u[i] << shift) | spill(u[i - 1], shift);
    }
    un[0] = u[0] << shift;

    if d_len == 1 {
        let rem = udivrem_by1(quot, &un[..=u_len], dn[0]);
        return U256::from_u64(rem >> shift);
    }

    udivrem_knuth(quot, &mut un[..=u_len], &dn[..d_len]);

    let mut rem = [0u64; 4];
    for i in 0..d_len - 1 {
        rem[i] = (un[i] >> shift) | carry_in(un[i + 1], shift);
    }
    rem[d_len - 1] = un[d_len - 1] >> shift;

    U256::from_limbs(rem)
}

impl U256 {
    /// Quotient and remainder of `self / divisor`.
    ///
    /// # Errors
    /// Returns `DivisionByZero` when `divisor` is zero.
    pub fn div_rem(self, divisor: Self) -> NumericResult<(Self, Self)> {
        if divisor.is_zero() {
            return Err(NumericError::DivisionByZero);
        }
        if self.lt(&divisor) {
            return Ok((Self::ZERO, self));
        }
        if self == divisor {
            return Ok((Self::ONE, Self::ZERO));
        }
        if self.fits_u64() {
            // divisor <= self, so it fits too
            let (x, y) = (self.low_u64(), divisor.low_u64());
            return Ok((Self::from_u64(x / y), Self::from_u64(x % y)));
        }

        let mut quot = [0u64; 4];
        let rem = udivrem(&mut quot, &self.limbs(), &divisor);
        Ok((Self::from_limbs(quot), rem))
    }

    /// `self / divisor`, truncating.
    ///
    /// # Errors
    /// Returns `DivisionByZero` when `divisor` is zero.
    #[inline]
    pub fn checked_div(self, divisor: Self) -> NumericResult<Self> {
        self.div_rem(divisor).map(|(q, _)| q)
    }

    /// `self % divisor`.
    ///
    /// # Errors
    /// Returns `DivisionByZero` when `divisor` is zero.
    #[inline]
    pub fn checked_rem(self, divisor: Self) -> NumericResult<Self> {
        self.div_rem(divisor).map(|(_, r)| r)
    }

    /// Division by a single nonzero limb through the reciprocal path.
    ///
    /// Used where the divisor is a known constant (decimal formatting).
    pub(crate) fn div_rem_limb(self, divisor: u64) -> (Self, u64) {
        debug_assert!(divisor != 0, "limb divisor must be nonzero");
        let shift = divisor.leading_zeros();
        let u = self.limbs();

        let mut un = [0u64; 5];
        un[4] = spill(u[3], shift);
        for i in (1..4).rev() {
            un[i] = (u[i] << shift) | spill(u[i - 1], shift);
        }
        un[0] = u[0] << shift;

        let mut quot = [0u64; 4];
        let rem = udivrem_by1(&mut quot, &un, divisor << shift);
        (Self::from_limbs(quot), rem >> shift)
    }

    /// `self % divisor`, yielding zero for a zero divisor.
    #[inline]
    pub fn rem_or_zero(self, divisor: Self) -> Self {
        self.checked_rem(divisor).unwrap_or(Self::ZERO)
    }
}
