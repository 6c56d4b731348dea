// ============================================================================
// Book Feed
// Applies decoded venue updates to a fee-adjusted order book
// ============================================================================

use crate::domain::{
    BookUpdate, FeedConfig, LevelChange, LevelUpdate, OrderBook, OrderBookSnapshot, Side,
    UpdateKind,
};
use crate::engine::{FeedError, FeedResult};
use crate::interfaces::{BookEvent, EventHandler, VenueCodec};
use crate::numeric::FixedPoint256;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Frame counters since the feed was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    /// Updates applied to the book
    pub applied: u64,
    /// Frames dropped as undecodable
    pub rejected: u64,
    /// Deltas skipped as stale
    pub skipped: u64,
}

/// `(price, net_price, amount)`
type AdjustedLevel = (FixedPoint256, FixedPoint256, FixedPoint256);

/// Sequencing state; held for the whole of one update so concurrent
/// writers apply updates one at a time.
struct FeedState {
    last_sequence: Option<i64>,
}

/// Live order book for one venue stream.
///
/// Frames go through the venue codec, levels are fee-adjusted with the
/// configured taker rate and applied to the book, and every level change is
/// reported to the event handler. Readers may take snapshots concurrently
/// with a writer. Such readers see level changes as they land: while a
/// snapshot is applied the sides are cleared and then rebuilt, so a
/// concurrent reader may briefly observe an empty or partial book.
pub struct BookFeed {
    config: FeedConfig,

    book: OrderBook,

    /// Venue wire format
    codec: Box<dyn VenueCodec>,

    /// Event handler for processing events
    event_handler: Arc<dyn EventHandler>,

    state: Mutex<FeedState>,

    applied: AtomicU64,
    rejected: AtomicU64,
    skipped: AtomicU64,
}

impl BookFeed {
    /// Create a new book feed
    pub fn new(
        config: FeedConfig,
        codec: Box<dyn VenueCodec>,
        event_handler: Arc<dyn EventHandler>,
    ) -> Self {
        Self {
            book: OrderBook::new(config.instrument.clone()),
            config,
            codec,
            event_handler,
            state: Mutex::new(FeedState {
                last_sequence: None,
            }),
            applied: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
        }
    }

    /// Decode one text frame and apply it.
    ///
    /// Frames without book data yield no events. A frame that fails to
    /// decode is counted, reported as `FrameRejected` and returned as the
    /// error; the book is left untouched.
    pub fn handle_frame(&self, frame: &str) -> FeedResult<Vec<BookEvent>> {
        match self.codec.decode(frame) {
            Ok(Some(update)) => self.apply(update),
            Ok(None) => Ok(Vec::new()),
            Err(err) => {
                self.reject(&err);
                Err(err)
            },
        }
    }

    /// Decode a REST snapshot body (Vertex `market_liquidity`) and apply it.
    pub fn handle_snapshot_body(&self, body: &str) -> FeedResult<Vec<BookEvent>> {
        match self.codec.decode_snapshot(body) {
            Ok(update) => self.apply(update),
            Err(err) => {
                self.reject(&err);
                Err(err)
            },
        }
    }

    /// Apply one decoded update.
    ///
    /// A snapshot clears the book and resets the sequence. A delta whose
    /// sequence is not newer than the last one is skipped.
    ///
    /// Every level is fee-adjusted before the book is touched, so a frame
    /// is applied whole or not at all.
    ///
    /// # Errors
    /// `Numeric` if a wire price overflows its fee adjustment; the frame is
    /// counted as rejected and the book and sequence are left as they were.
    pub fn apply(&self, update: BookUpdate) -> FeedResult<Vec<BookEvent>> {
        let (bids, asks) = match self.fee_adjusted_sides(&update) {
            Ok(levels) => levels,
            Err(err) => {
                self.reject(&err);
                return Err(err);
            },
        };

        let mut state = self.state.lock();
        let mut events = Vec::with_capacity(update.level_count() + 1);

        match update.kind {
            UpdateKind::Snapshot => {
                self.book.clear();
                state.last_sequence = update.sequence;
                events.push(BookEvent::SnapshotApplied {
                    instrument: self.book.instrument.clone(),
                    sequence: update.sequence,
                    levels: update.level_count(),
                    timestamp: Utc::now(),
                });
            },
            UpdateKind::Delta => {
                if let (Some(sequence), Some(last_sequence)) = (update.sequence, state.last_sequence) {
                    if sequence <= last_sequence {
                        self.skipped.fetch_add(1, Ordering::Relaxed);
                        let event = BookEvent::UpdateSkipped {
                            sequence,
                            last_sequence,
                            timestamp: Utc::now(),
                        };
                        drop(state);
                        self.event_handler.on_event(event.clone());
                        return Ok(vec![event]);
                    }
                }
                if update.sequence.is_some() {
                    state.last_sequence = update.sequence;
                }
            },
        }

        self.apply_levels(Side::Bid, &bids, &mut events);
        self.apply_levels(Side::Ask, &asks, &mut events);
        drop(state);

        self.applied.fetch_add(1, Ordering::Relaxed);
        self.event_handler.on_events(events.clone());

        Ok(events)
    }

    /// Get order book snapshot at the configured display depth
    pub fn snapshot(&self) -> OrderBookSnapshot {
        self.book.snapshot(self.config.display_depth)
    }

    /// Text rendering of [`Self::snapshot`]
    pub fn render(&self) -> String {
        self.snapshot().to_string()
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn codec(&self) -> &dyn VenueCodec {
        self.codec.as_ref()
    }

    pub fn subscribe_request(&self, id: u64) -> String {
        self.codec.subscribe_request(id)
    }

    pub fn last_sequence(&self) -> Option<i64> {
        self.state.lock().last_sequence
    }

    pub fn stats(&self) -> FeedStats {
        FeedStats {
            applied: self.applied.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }

    // ========================================================================
    // Private methods
    // ========================================================================

    fn fee_adjusted_sides(
        &self,
        update: &BookUpdate,
    ) -> FeedResult<(Vec<AdjustedLevel>, Vec<AdjustedLevel>)> {
        let bids = self.fee_adjusted(Side::Bid, &update.bids)?;
        let asks = self.fee_adjusted(Side::Ask, &update.asks)?;
        Ok((bids, asks))
    }

    /// Pair each level with its fee-adjusted price.
    fn fee_adjusted(&self, side: Side, levels: &[LevelUpdate]) -> FeedResult<Vec<AdjustedLevel>> {
        levels
            .iter()
            .map(|&(price, amount)| -> FeedResult<AdjustedLevel> {
                let net_price = self.config.taker_fee.net_price(side, price)?;
                Ok((price, net_price, amount))
            })
            .collect()
    }

    fn apply_levels(&self, side: Side, levels: &[AdjustedLevel], events: &mut Vec<BookEvent>) {
        for &(price, net_price, amount) in levels {
            let change = self.book.modify_level(side, price, net_price, amount);
            if change != LevelChange::Ignored {
                events.push(BookEvent::LevelChanged {
                    side,
                    price,
                    net_price,
                    amount,
                    change,
                    timestamp: Utc::now(),
                });
            }
        }
    }

    fn reject(&self, err: &FeedError) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(venue = self.codec.name(), error = %err, "dropping frame");
        self.event_handler.on_event(BookEvent::FrameRejected {
            reason: err.to_string(),
            timestamp: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeeSchedule;
    use crate::interfaces::NoOpEventHandler;
    use crate::numeric::{FixedPoint256, NumericError};

    fn fp(text: &str) -> FixedPoint256 {
        text.parse().unwrap()
    }

    /// Decodes `"<kind> <seq> <side> <price> <amount>"` test frames.
    struct LineCodec;

    impl VenueCodec for LineCodec {
        fn name(&self) -> &str {
            "line"
        }

        fn subscribe_request(&self, id: u64) -> String {
            format!("sub {}", id)
        }

        fn decode(&self, frame: &str) -> FeedResult<Option<BookUpdate>> {
            let parts: Vec<&str> = frame.split_whitespace().collect();
            let [kind, seq, side, price, amount] = parts.as_slice() else {
                return if frame == "ping" {
                    Ok(None)
                } else {
                    Err(FeedError::Decode(format!("bad frame {:?}", frame)))
                };
            };
            let level = vec![(price.parse::<FixedPoint256>()?, amount.parse::<FixedPoint256>()?)];
            let (bids, asks) = if *side == "bid" {
                (level, Vec::new())
            } else {
                (Vec::new(), level)
            };
            let update = match *kind {
                "snap" => BookUpdate::snapshot(bids, asks),
                _ => BookUpdate::delta(bids, asks),
            };
            Ok(Some(update.with_sequence(seq.parse().map_err(|_| {
                FeedError::Decode("bad sequence".to_string())
            })?)))
        }
    }

    fn feed() -> BookFeed {
        let config = FeedConfig::aevo("ETH-PERP").with_taker_fee(FeeSchedule::aevo());
        BookFeed::new(config, Box::new(LineCodec), Arc::new(NoOpEventHandler))
    }

    #[test]
    fn test_delta_applies_fee_adjusted_levels() {
        let feed = feed();
        let events = feed.handle_frame("delta 1 bid 2000 1.5").unwrap();

        assert_eq!(events.len(), 1);
        let level = feed.book().top(Side::Bid).unwrap();
        assert_eq!(level.net_price, fp("1998.4"));
        assert_eq!(level.amount, fp("1.5"));

        feed.handle_frame("delta 2 ask 2001 2").unwrap();
        assert_eq!(feed.book().top(Side::Ask).unwrap().net_price, fp("2002.6008"));
    }

    #[test]
    fn test_snapshot_clears_book() {
        let feed = feed();
        feed.handle_frame("delta 1 bid 2000 1").unwrap();
        feed.handle_frame("delta 2 bid 1999 1").unwrap();

        let events = feed.handle_frame("snap 10 ask 2001 3").unwrap();
        assert!(matches!(
            events[0],
            BookEvent::SnapshotApplied { sequence: Some(10), levels: 1, .. }
        ));
        assert_eq!(feed.book().depth(Side::Bid), 0);
        assert_eq!(feed.book().depth(Side::Ask), 1);
        assert_eq!(feed.last_sequence(), Some(10));
    }

    #[test]
    fn test_stale_delta_skipped() {
        let feed = feed();
        feed.handle_frame("snap 10 bid 2000 1").unwrap();

        let events = feed.handle_frame("delta 10 bid 2000 5").unwrap();
        assert!(matches!(events[0], BookEvent::UpdateSkipped { sequence: 10, last_sequence: 10, .. }));
        assert_eq!(feed.book().top(Side::Bid).unwrap().amount, fp("1"));

        feed.handle_frame("delta 11 bid 2000 5").unwrap();
        assert_eq!(feed.book().top(Side::Bid).unwrap().amount, fp("5"));
        assert_eq!(feed.stats(), FeedStats { applied: 2, rejected: 0, skipped: 1 });
    }

    #[test]
    fn test_rejected_frames_counted() {
        let feed = feed();
        assert!(feed.handle_frame("ping").unwrap().is_empty());
        assert!(matches!(feed.handle_frame("garbage"), Err(FeedError::Decode(_))));
        assert_eq!(
            feed.handle_frame("delta 1 bid 1.2.3 1").unwrap_err(),
            FeedError::Numeric(NumericError::Syntax)
        );
        assert_eq!(feed.stats().rejected, 2);
        assert_eq!(feed.book().depth(Side::Bid), 0);
    }

    #[test]
    fn test_fee_overflow_rejects_whole_frame() {
        let feed = feed();
        feed.handle_frame("snap 5 bid 1999 2").unwrap();

        let update = BookUpdate::delta(
            vec![(fp("2000"), fp("1")), (FixedPoint256::MAX, fp("1"))],
            vec![(fp("2001"), fp("1"))],
        )
        .with_sequence(7);
        let err = feed.apply(update).unwrap_err();
        assert_eq!(err, FeedError::Numeric(NumericError::Range));
        assert!(!err.is_fatal());

        // nothing from the rejected frame reached the book
        assert_eq!(feed.book().depth(Side::Bid), 1);
        assert_eq!(feed.book().depth(Side::Ask), 0);
        assert_eq!(feed.book().top(Side::Bid).unwrap().price, fp("1999"));
        assert_eq!(feed.last_sequence(), Some(5));
        assert_eq!(feed.stats(), FeedStats { applied: 1, rejected: 1, skipped: 0 });

        // the same sequence is still accepted once the frame is valid
        feed.handle_frame("delta 7 bid 2000 1").unwrap();
        assert_eq!(feed.book().depth(Side::Bid), 2);
        assert_eq!(feed.last_sequence(), Some(7));
        assert_eq!(feed.stats(), FeedStats { applied: 2, rejected: 1, skipped: 0 });
    }

    #[test]
    fn test_fee_overflow_on_wire_price() {
        let feed = feed();
        let huge = format!("1{}", "0".repeat(70));
        let err = feed.handle_frame(&format!("delta 1 ask {} 1", huge)).unwrap_err();
        assert_eq!(err, FeedError::Numeric(NumericError::Range));
        assert_eq!(feed.book().depth(Side::Ask), 0);
        assert_eq!(feed.last_sequence(), None);
        assert_eq!(feed.stats().rejected, 1);
    }

    #[test]
    fn test_render() {
        let feed = feed();
        feed.handle_frame("delta 1 bid 2000 1").unwrap();
        feed.handle_frame("delta 2 ask 2001 2").unwrap();
        assert_eq!(
            feed.render(),
            "2001.000000\t -- \t 2.000000\n---\n2000.000000\t -- \t 1.000000\n"
        );
        assert_eq!(feed.subscribe_request(3), "sub 3");
    }
}
