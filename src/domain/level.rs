// ============================================================================
// Price Level Domain Model
// ============================================================================

use crate::numeric::FixedPoint256;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }

    /// True if `price` is at least as good as `reference` from this side's
    /// point of view (higher for bids, lower for asks).
    pub fn at_least_as_good(self, price: &FixedPoint256, reference: &FixedPoint256) -> bool {
        match self {
            Side::Bid => price >= reference,
            Side::Ask => price <= reference,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bid => f.write_str("bid"),
            Side::Ask => f.write_str("ask"),
        }
    }
}

/// Aggregated liquidity at one price.
///
/// `net_price` is the price after taker fees, fixed when the level is first
/// inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PriceLevel {
    pub price: FixedPoint256,
    pub amount: FixedPoint256,
    pub net_price: FixedPoint256,
}

impl PriceLevel {
    pub fn new(price: FixedPoint256, net_price: FixedPoint256, amount: FixedPoint256) -> Self {
        Self {
            price,
            amount,
            net_price,
        }
    }

    /// Notional value `price × amount`.
    pub fn notional(&self) -> crate::numeric::NumericResult<FixedPoint256> {
        self.price.checked_mul(self.amount)
    }
}
