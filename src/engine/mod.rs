// ============================================================================
// Engine Module
// Feed state machine, its errors and construction
// ============================================================================

mod book_feed;
mod errors;

pub mod factory;
#[cfg(feature = "async")]
pub mod pump;

pub use book_feed::{BookFeed, FeedStats};
pub use errors::{FeedError, FeedResult};
pub use factory::{create_feed, BookFeedBuilder};
#[cfg(feature = "async")]
pub use pump::{run_feed, spawn_feed, PumpHandle};
