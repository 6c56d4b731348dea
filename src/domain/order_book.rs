// ============================================================================
// Order Book Domain Model
// ============================================================================

use crossbeam_skiplist::SkipMap;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

use super::{PriceLevel, Side};
use crate::numeric::{FixedPoint256, NumericResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Inline capacity of snapshot level lists; matches the default display depth.
pub const SNAPSHOT_INLINE_LEVELS: usize = 10;

pub type SnapshotLevels = SmallVec<[PriceLevel; SNAPSHOT_INLINE_LEVELS]>;

// ============================================================================
// Level Change
// ============================================================================

/// Outcome of applying one `(price, amount)` pair to a book side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LevelChange {
    /// New price inserted
    Added,
    /// Amount replaced at an existing price
    Updated,
    /// Zero amount removed an existing price
    Removed,
    /// Zero amount for a price that was not in the book
    Ignored,
}

// ============================================================================
// Order Book Side
// ============================================================================

/// Lock-free order book side (bids or asks).
///
/// Levels are keyed by price in a skip list; bids are read from the back
/// (highest first), asks from the front (lowest first).
pub struct OrderBookSide {
    pub levels: Arc<SkipMap<FixedPoint256, PriceLevel>>,
    pub side: Side,
}

impl OrderBookSide {
    pub fn new(side: Side) -> Self {
        Self {
            levels: Arc::new(SkipMap::new()),
            side,
        }
    }

    /// Insert, replace or delete the level at `price`.
    ///
    /// The net price is recorded only when the level is inserted; later
    /// updates replace the amount alone.
    pub fn modify_level(
        &self,
        price: FixedPoint256,
        net_price: FixedPoint256,
        amount: FixedPoint256,
    ) -> LevelChange {
        match self.levels.get(&price) {
            None if amount.is_zero() => LevelChange::Ignored,
            None => {
                self.levels
                    .insert(price, PriceLevel::new(price, net_price, amount));
                LevelChange::Added
            },
            Some(_) if amount.is_zero() => {
                self.levels.remove(&price);
                LevelChange::Removed
            },
            Some(entry) => {
                let mut level = *entry.value();
                level.amount = amount;
                self.levels.insert(price, level);
                LevelChange::Updated
            },
        }
    }

    /// Get the best (top-of-book) level
    pub fn best(&self) -> Option<PriceLevel> {
        match self.side {
            // Highest bid (last in sorted order)
            Side::Bid => self.levels.back().map(|entry| *entry.value()),
            // Lowest ask (first in sorted order)
            Side::Ask => self.levels.front().map(|entry| *entry.value()),
        }
    }

    pub fn get(&self, price: &FixedPoint256) -> Option<PriceLevel> {
        self.levels.get(price).map(|entry| *entry.value())
    }

    /// Iterate levels best first
    pub fn iter_best_first(&self) -> Box<dyn Iterator<Item = PriceLevel> + '_> {
        match self.side {
            Side::Bid => Box::new(self.levels.iter().rev().map(|entry| *entry.value())),
            Side::Ask => Box::new(self.levels.iter().map(|entry| *entry.value())),
        }
    }

    /// Up to `num_levels` levels, best first
    pub fn levels(&self, num_levels: usize) -> SnapshotLevels {
        self.iter_best_first().take(num_levels).collect()
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Cumulative amount of every level priced at least as well as `price`.
    ///
    /// # Errors
    /// `Range` if the sum overflows.
    pub fn total_amount_through(&self, price: &FixedPoint256) -> NumericResult<FixedPoint256> {
        let mut total = FixedPoint256::zero(0)?;
        for level in self
            .iter_best_first()
            .take_while(|level| self.side.at_least_as_good(&level.price, price))
        {
            total = total.checked_add(level.amount)?;
        }
        Ok(total)
    }

    pub fn clear(&self) {
        self.levels.clear();
    }
}

// ============================================================================
// Order Book
// ============================================================================

/// Both sides of one instrument's book.
pub struct OrderBook {
    pub instrument: String,
    pub bids: OrderBookSide,
    pub asks: OrderBookSide,
}

impl OrderBook {
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            bids: OrderBookSide::new(Side::Bid),
            asks: OrderBookSide::new(Side::Ask),
        }
    }

    pub fn side(&self, side: Side) -> &OrderBookSide {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    pub fn modify_level(
        &self,
        side: Side,
        price: FixedPoint256,
        net_price: FixedPoint256,
        amount: FixedPoint256,
    ) -> LevelChange {
        self.side(side).modify_level(price, net_price, amount)
    }

    pub fn top(&self, side: Side) -> Option<PriceLevel> {
        self.side(side).best()
    }

    pub fn depth(&self, side: Side) -> usize {
        self.side(side).depth()
    }

    pub fn levels(&self, side: Side, num_levels: usize) -> SnapshotLevels {
        self.side(side).levels(num_levels)
    }

    pub fn total_amount_through(
        &self,
        side: Side,
        price: &FixedPoint256,
    ) -> NumericResult<FixedPoint256> {
        self.side(side).total_amount_through(price)
    }

    pub fn clear(&self) {
        self.bids.clear();
        self.asks.clear();
    }

    pub fn snapshot(&self, depth: usize) -> OrderBookSnapshot {
        OrderBookSnapshot::with_depth(
            self.instrument.clone(),
            self.bids.levels(depth),
            self.asks.levels(depth),
        )
    }
}

// ============================================================================
// Order Book Snapshot
// ============================================================================

/// Immutable snapshot of the order book state
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBookSnapshot {
    pub instrument: String,
    /// Bid levels, best first
    pub bids: SnapshotLevels,
    /// Ask levels, best first
    pub asks: SnapshotLevels,
    /// Current spread (ask - bid)
    pub spread: Option<FixedPoint256>,
    /// Mid price
    pub mid_price: Option<FixedPoint256>,
}

impl OrderBookSnapshot {
    pub fn new(instrument: String) -> Self {
        Self {
            instrument,
            bids: SnapshotLevels::new(),
            asks: SnapshotLevels::new(),
            spread: None,
            mid_price: None,
        }
    }

    pub fn with_depth(instrument: String, bids: SnapshotLevels, asks: SnapshotLevels) -> Self {
        let (spread, mid_price) = match (bids.first(), asks.first()) {
            (Some(bid), Some(ask)) => (
                ask.price.checked_sub(bid.price).ok(),
                Self::midpoint(bid.price, ask.price).ok(),
            ),
            _ => (None, None),
        };

        Self {
            instrument,
            bids,
            asks,
            spread,
            mid_price,
        }
    }

    fn midpoint(bid: FixedPoint256, ask: FixedPoint256) -> NumericResult<FixedPoint256> {
        let two = FixedPoint256::from_i64(2, 0)?;
        bid.checked_add(ask)?.checked_div(two)
    }

    pub fn best_bid(&self) -> Option<FixedPoint256> {
        self.bids.first().map(|level| level.price)
    }

    pub fn best_ask(&self) -> Option<FixedPoint256> {
        self.asks.first().map(|level| level.price)
    }
}

impl fmt::Display for OrderBookSnapshot {
    /// Asks from worst to best, a `---` separator, then bids from best to
    /// worst; one `price\t -- \t amount` line per level.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for level in self.asks.iter().rev() {
            writeln!(
                f,
                "{}\t -- \t {}",
                level.price.to_fixed_string(),
                level.amount.to_fixed_string()
            )?;
        }
        writeln!(f, "---")?;
        for level in &self.bids {
            writeln!(
                f,
                "{}\t -- \t {}",
                level.price.to_fixed_string(),
                level.amount.to_fixed_string()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(text: &str) -> FixedPoint256 {
        text.parse().unwrap()
    }

    fn seeded_book() -> OrderBook {
        let book = OrderBook::new("ETH-PERP");
        for (price, amount) in [("2000", "1"), ("1999.5", "2"), ("1999", "3")] {
            book.modify_level(Side::Bid, fp(price), fp(price), fp(amount));
        }
        for (price, amount) in [("2000.5", "4"), ("2001", "5"), ("2001.5", "6")] {
            book.modify_level(Side::Ask, fp(price), fp(price), fp(amount));
        }
        book
    }

    #[test]
    fn test_modify_level_transitions() {
        let side = OrderBookSide::new(Side::Bid);
        let price = fp("100");

        assert_eq!(side.modify_level(price, fp("99.9"), fp("0")), LevelChange::Ignored);
        assert_eq!(side.depth(), 0);

        assert_eq!(side.modify_level(price, fp("99.9"), fp("1.5")), LevelChange::Added);
        assert_eq!(side.modify_level(price, fp("50"), fp("2")), LevelChange::Updated);

        let level = side.get(&price).unwrap();
        assert_eq!(level.amount, fp("2"));
        // Net price stays as first recorded.
        assert_eq!(level.net_price, fp("99.9"));

        assert_eq!(side.modify_level(price, fp("99.9"), fp("0")), LevelChange::Removed);
        assert!(side.get(&price).is_none());
    }

    #[test]
    fn test_price_key_ignores_scale() {
        let side = OrderBookSide::new(Side::Ask);
        side.modify_level(fp("100.5"), fp("100.5"), fp("1"));
        let same_price = FixedPoint256::from_text("100.50", 2).unwrap();
        assert_eq!(
            side.modify_level(same_price, same_price, fp("3")),
            LevelChange::Updated
        );
        assert_eq!(side.depth(), 1);
    }

    #[test]
    fn test_best_and_levels() {
        let book = seeded_book();
        assert_eq!(book.top(Side::Bid).unwrap().price, fp("2000"));
        assert_eq!(book.top(Side::Ask).unwrap().price, fp("2000.5"));

        let bids: Vec<_> = book.levels(Side::Bid, 2).iter().map(|l| l.price).collect();
        assert_eq!(bids, vec![fp("2000"), fp("1999.5")]);
        let asks: Vec<_> = book.levels(Side::Ask, 10).iter().map(|l| l.price).collect();
        assert_eq!(asks, vec![fp("2000.5"), fp("2001"), fp("2001.5")]);

        assert_eq!(book.depth(Side::Bid), 3);
    }

    #[test]
    fn test_total_amount_through() {
        let book = seeded_book();
        assert_eq!(book.total_amount_through(Side::Bid, &fp("1999.5")).unwrap(), fp("3"));
        assert_eq!(book.total_amount_through(Side::Bid, &fp("1990")).unwrap(), fp("6"));
        assert!(book.total_amount_through(Side::Bid, &fp("2100")).unwrap().is_zero());
        assert_eq!(book.total_amount_through(Side::Ask, &fp("2001")).unwrap(), fp("9"));
    }

    #[test]
    fn test_clear() {
        let book = seeded_book();
        book.clear();
        assert_eq!(book.depth(Side::Bid), 0);
        assert!(book.top(Side::Ask).is_none());
    }

    #[test]
    fn test_snapshot_metrics() {
        let snapshot = seeded_book().snapshot(10);
        assert_eq!(snapshot.best_bid(), Some(fp("2000")));
        assert_eq!(snapshot.best_ask(), Some(fp("2000.5")));
        assert_eq!(snapshot.spread, Some(fp("0.5")));
        assert_eq!(snapshot.mid_price, Some(fp("2000.25")));

        let empty = OrderBook::new("ETH-PERP").snapshot(10);
        assert!(empty.spread.is_none());
        assert!(empty.mid_price.is_none());
    }

    #[test]
    fn test_snapshot_display() {
        let rendered = seeded_book().snapshot(2).to_string();
        let expected = "\
2001.000000\t -- \t 5.000000
2000.500000\t -- \t 4.000000
---
2000.000000\t -- \t 1.000000
1999.500000\t -- \t 2.000000
";
        assert_eq!(rendered, expected);
    }
}
