// ============================================================================
// Event Handler Interface
// Defines the contract for handling book feed events
// ============================================================================

use crate::domain::{LevelChange, Side};
use crate::numeric::FixedPoint256;
use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Events emitted by the book feed
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BookEvent {
    /// Book cleared and rebuilt from a snapshot
    SnapshotApplied {
        instrument: String,
        sequence: Option<i64>,
        levels: usize,
        timestamp: DateTime<Utc>,
    },

    /// One price level inserted, updated or removed
    LevelChanged {
        side: Side,
        price: FixedPoint256,
        net_price: FixedPoint256,
        amount: FixedPoint256,
        change: LevelChange,
        timestamp: DateTime<Utc>,
    },

    /// Delta not newer than the last applied sequence
    UpdateSkipped {
        sequence: i64,
        last_sequence: i64,
        timestamp: DateTime<Utc>,
    },

    /// Frame dropped because it could not be decoded
    FrameRejected {
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

/// Event handler trait for processing book feed events
/// Implementations can handle logging, metrics, display refresh, etc.
pub trait EventHandler: Send + Sync {
    /// Handle a book event
    fn on_event(&self, event: BookEvent);

    /// Batch event handler (optional optimization)
    fn on_events(&self, events: Vec<BookEvent>) {
        for event in events {
            self.on_event(event);
        }
    }
}

/// No-op event handler for testing
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn on_event(&self, _event: BookEvent) {
        // Do nothing
    }
}

/// Logging event handler
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn on_event(&self, event: BookEvent) {
        tracing::debug!("Book feed event: {:?}", event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct Recorder(Mutex<Vec<BookEvent>>);

    impl EventHandler for Recorder {
        fn on_event(&self, event: BookEvent) {
            self.0.lock().push(event);
        }
    }

    #[test]
    fn test_noop_handler() {
        let handler = NoOpEventHandler;
        handler.on_event(BookEvent::FrameRejected {
            reason: "bad frame".to_string(),
            timestamp: Utc::now(),
        });
        // Should not panic
    }

    #[test]
    fn test_batch_delegates_to_single() {
        let recorder = Recorder(Mutex::new(Vec::new()));
        recorder.on_events(vec![
            BookEvent::UpdateSkipped {
                sequence: 1,
                last_sequence: 2,
                timestamp: Utc::now(),
            },
            BookEvent::LevelChanged {
                side: Side::Bid,
                price: FixedPoint256::ONE,
                net_price: FixedPoint256::ONE,
                amount: FixedPoint256::ONE,
                change: LevelChange::Added,
                timestamp: Utc::now(),
            },
        ]);
        assert_eq!(recorder.0.lock().len(), 2);
    }
}
