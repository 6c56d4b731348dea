// ============================================================================
// Fee Schedule
// Taker-fee adjustment of displayed prices
// ============================================================================

use super::Side;
use crate::numeric::{FixedPoint256, NumericResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 8 bps
pub const AEVO_TAKER_RATE: FixedPoint256 = FixedPoint256::from_micros(800);

/// 2 bps
pub const VERTEX_TAKER_RATE: FixedPoint256 = FixedPoint256::from_micros(200);

/// Taker fee rate applied to book prices.
///
/// A taker selling into a bid receives `price × (1 - rate)`; a taker lifting
/// an ask pays `price × (1 + rate)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeeSchedule {
    pub taker_rate: FixedPoint256,
}

impl FeeSchedule {
    pub fn new(taker_rate: FixedPoint256) -> Self {
        Self { taker_rate }
    }

    /// No fee; net prices equal book prices.
    pub fn zero() -> Self {
        Self::new(FixedPoint256::ZERO)
    }

    pub fn aevo() -> Self {
        Self::new(AEVO_TAKER_RATE)
    }

    pub fn vertex() -> Self {
        Self::new(VERTEX_TAKER_RATE)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.taker_rate.is_negative() {
            return Err("Taker fee rate cannot be negative".to_string());
        }
        if self.taker_rate >= FixedPoint256::ONE {
            return Err("Taker fee rate must be below 1".to_string());
        }
        Ok(())
    }

    /// Fee-adjusted price for a level on `side`, at the larger of the price
    /// and rate scales.
    ///
    /// # Errors
    /// `Range` if scale alignment or the product overflows.
    pub fn net_price(&self, side: Side, price: FixedPoint256) -> NumericResult<FixedPoint256> {
        let one = FixedPoint256::one(price.scale())?;
        let factor = match side {
            Side::Bid => one.checked_sub(self.taker_rate)?,
            Side::Ask => one.checked_add(self.taker_rate)?,
        };
        price.checked_mul(factor)
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::zero()
    }
}
