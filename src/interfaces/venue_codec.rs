// ============================================================================
// Venue Codec Interface
// Defines the contract for venue wire formats
// ============================================================================

use crate::domain::BookUpdate;
use crate::engine::{FeedError, FeedResult};

/// Strategy pattern interface for venue wire formats
/// Implementations: Aevo, Vertex
pub trait VenueCodec: Send + Sync {
    /// Get the venue name for logging/metrics
    fn name(&self) -> &str;

    /// Text frame that subscribes to the configured book stream
    fn subscribe_request(&self, id: u64) -> String;

    /// Decode one text frame.
    ///
    /// # Returns
    /// `Ok(None)` for frames that carry no book data (acks, pongs, other
    /// channels).
    fn decode(&self, frame: &str) -> FeedResult<Option<BookUpdate>>;

    /// REST path of the starting book, for venues whose stream only carries
    /// deltas
    fn snapshot_query(&self) -> Option<String> {
        None
    }

    /// Decode the body returned by [`VenueCodec::snapshot_query`].
    fn decode_snapshot(&self, _body: &str) -> FeedResult<BookUpdate> {
        Err(FeedError::Decode(format!(
            "{} has no REST snapshot",
            self.name()
        )))
    }
}
