// ============================================================================
// Perp Feed Library
// Exact 256-bit decimals and fee-adjusted order books for derivatives venues
// ============================================================================

//! # Perp Feed
//!
//! Order-book feed client for perpetual-futures venues, built on an exact
//! 256-bit fixed-point decimal.
//!
//! ## Features
//!
//! - **`FixedPoint256`**: signed decimals with up to 77 fractional digits,
//!   half-up rounding and checked arithmetic
//! - **Lock-free book sides** keyed by price (crossbeam skip lists)
//! - **Venue codecs** for Aevo and Vertex websocket frames
//! - **Fee-adjusted prices** for every level, using the venue taker rate
//! - **Event handlers** for every level change
//!
//! ## Example
//!
//! ```rust
//! use perp_feed::prelude::*;
//! use std::sync::Arc;
//!
//! let feed = create_feed(FeedConfig::aevo("ETH-PERP"), Arc::new(NoOpEventHandler)).unwrap();
//!
//! feed.handle_frame(
//!     r#"{"channel":"orderbook:ETH-PERP","data":{"type":"snapshot",
//!         "bids":[["2000","1.5"]],"asks":[["2001","2"]],"last_updated":"1"}}"#,
//! )
//! .unwrap();
//!
//! let snapshot = feed.snapshot();
//! println!("Best bid: {:?}", snapshot.best_bid());
//! println!("Spread: {:?}", snapshot.spread);
//! print!("{}", snapshot);
//! ```

pub mod domain;
pub mod engine;
pub mod interfaces;
pub mod numeric;
#[cfg(feature = "serde")]
pub mod venue;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{
        BookUpdate, Environment, FeeSchedule, FeedConfig, LevelChange, OrderBook, OrderBookSide,
        OrderBookSnapshot, PriceLevel, Side, UpdateKind, Venue,
    };
    pub use crate::engine::{create_feed, BookFeed, BookFeedBuilder, FeedError, FeedResult, FeedStats};
    #[cfg(feature = "async")]
    pub use crate::engine::{run_feed, spawn_feed};
    pub use crate::interfaces::{
        BookEvent, EventHandler, LoggingEventHandler, NoOpEventHandler, VenueCodec,
    };
    pub use crate::numeric::{FixedPoint256, NumericError, NumericResult};
    #[cfg(feature = "serde")]
    pub use crate::venue::{AevoCodec, VertexCodec};
}

#[cfg(all(test, feature = "serde"))]
mod integration_tests {
    use super::prelude::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<BookEvent>>,
    }

    impl EventHandler for Recorder {
        fn on_event(&self, event: BookEvent) {
            self.events.lock().push(event);
        }
    }

    fn fp(text: &str) -> FixedPoint256 {
        text.parse().unwrap()
    }

    #[test]
    fn test_end_to_end_aevo() {
        let recorder = Arc::new(Recorder::default());
        let feed = create_feed(FeedConfig::aevo("ETH-PERP"), recorder.clone()).unwrap();

        let snapshot = r#"{"channel":"orderbook:ETH-PERP","data":{"type":"snapshot",
            "bids":[["2000","1"],["1999.5","2"]],"asks":[["2000.5","3"]],"last_updated":"100"}}"#;
        let events = feed.handle_frame(snapshot).unwrap();
        assert_eq!(events.len(), 4);

        // Remove the best bid, stale update ignored
        let update = r#"{"channel":"orderbook:ETH-PERP","data":{"type":"update",
            "bids":[["2000","0"]],"asks":[],"last_updated":"101"}}"#;
        feed.handle_frame(update).unwrap();
        let stale = r#"{"channel":"orderbook:ETH-PERP","data":{"type":"update",
            "bids":[["1999","9"]],"asks":[],"last_updated":"101"}}"#;
        feed.handle_frame(stale).unwrap();

        let snapshot = feed.snapshot();
        assert_eq!(snapshot.best_bid(), Some(fp("1999.5")));
        assert_eq!(snapshot.best_ask(), Some(fp("2000.5")));
        assert_eq!(snapshot.spread, Some(fp("1")));
        assert_eq!(feed.stats(), FeedStats { applied: 2, rejected: 0, skipped: 1 });

        let bid = feed.book().top(Side::Bid).unwrap();
        assert_eq!(bid.net_price, fp("1997.9004"));

        let recorded = recorder.events.lock();
        assert!(recorded.iter().any(|e| matches!(
            e,
            BookEvent::LevelChanged { change: LevelChange::Removed, .. }
        )));
        assert!(matches!(recorded.last(), Some(BookEvent::UpdateSkipped { .. })));
    }

    #[test]
    fn test_end_to_end_vertex_bootstrap() {
        let feed = create_feed(FeedConfig::vertex(4), Arc::new(NoOpEventHandler)).unwrap();
        assert_eq!(
            feed.codec().snapshot_query().as_deref(),
            Some("/query?type=market_liquidity&product_id=4&depth=100")
        );

        let body = r#"{"status":"success","data":{
            "bids":[["1999000000000000000000","2000000000000000000"]],
            "asks":[["2001000000000000000000","1000000000000000000"]],
            "timestamp":"50"}}"#;
        feed.handle_snapshot_body(body).unwrap();

        let old = r#"{"type":"book_depth","min_timestamp":"40","product_id":4,
            "bids":[],"asks":[["2001000000000000000000","0"]]}"#;
        feed.handle_frame(old).unwrap();
        assert_eq!(feed.book().depth(Side::Ask), 1);

        let fresh = old.replace(r#""40""#, r#""60""#);
        feed.handle_frame(&fresh).unwrap();
        assert_eq!(feed.book().depth(Side::Ask), 0);
        assert_eq!(feed.snapshot().spread, None);

        assert_eq!(
            feed.render(),
            "---\n1999.000000\t -- \t 2.000000\n"
        );
    }
}
