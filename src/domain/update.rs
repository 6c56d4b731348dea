// ============================================================================
// Book Update
// Venue-neutral decoded book data
// ============================================================================

use crate::numeric::FixedPoint256;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UpdateKind {
    /// Full book; replaces everything held so far
    Snapshot,
    /// Level changes on top of the current book
    Delta,
}

/// `(price, amount)` pair; a zero amount deletes the level
pub type LevelUpdate = (FixedPoint256, FixedPoint256);

/// One decoded book message, already at the feed's price and amount scales.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BookUpdate {
    pub kind: UpdateKind,
    pub bids: Vec<LevelUpdate>,
    pub asks: Vec<LevelUpdate>,
    /// Venue ordering key, when the venue provides one
    pub sequence: Option<i64>,
}

impl BookUpdate {
    pub fn snapshot(bids: Vec<LevelUpdate>, asks: Vec<LevelUpdate>) -> Self {
        Self {
            kind: UpdateKind::Snapshot,
            bids,
            asks,
            sequence: None,
        }
    }

    pub fn delta(bids: Vec<LevelUpdate>, asks: Vec<LevelUpdate>) -> Self {
        Self {
            kind: UpdateKind::Delta,
            bids,
            asks,
            sequence: None,
        }
    }

    pub fn with_sequence(mut self, sequence: i64) -> Self {
        self.sequence = Some(sequence);
        self
    }

    pub fn level_count(&self) -> usize {
        self.bids.len() + self.asks.len()
    }

    pub fn is_snapshot(&self) -> bool {
        self.kind == UpdateKind::Snapshot
    }
}
