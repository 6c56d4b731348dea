// ============================================================================
// Frame Pump
// Drives a book feed from an async frame channel
// ============================================================================

use crate::engine::{BookFeed, FeedResult, FeedStats};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Handles to a pump running on the tokio runtime
pub struct PumpHandle {
    /// Send raw text frames here
    pub frames: mpsc::Sender<String>,
    /// Send `true` to stop the pump
    pub shutdown: watch::Sender<bool>,
    pub task: JoinHandle<FeedResult<FeedStats>>,
}

/// Feeds frames from `frames` into `feed` until the channel closes or
/// `shutdown` turns `true`.
///
/// Rejected frames are logged and skipped. A fatal error stops the pump and
/// is returned.
pub async fn run_feed(
    feed: Arc<BookFeed>,
    mut frames: mpsc::Receiver<String>,
    mut shutdown: watch::Receiver<bool>,
) -> FeedResult<FeedStats> {
    let venue = feed.codec().name().to_string();
    // A dropped shutdown sender can no longer signal; keep draining frames.
    let mut watching = true;

    loop {
        if *shutdown.borrow() {
            tracing::debug!(venue = %venue, "shutdown requested");
            break;
        }

        tokio::select! {
            biased;

            changed = shutdown.changed(), if watching => {
                if changed.is_err() {
                    watching = false;
                }
            }

            frame = frames.recv() => {
                let Some(frame) = frame else {
                    tracing::debug!(venue = %venue, "frame channel closed");
                    break;
                };

                match feed.handle_frame(&frame) {
                    Ok(_) => {},
                    Err(err) if err.is_fatal() => {
                        tracing::error!(venue = %venue, error = %err, "book feed stopped");
                        return Err(err);
                    },
                    // already counted and logged by the feed
                    Err(_) => {},
                }
            }
        }
    }

    Ok(feed.stats())
}

/// Spawns [`run_feed`] with a frame channel sized by the feed's
/// `channel_capacity`.
pub fn spawn_feed(feed: Arc<BookFeed>) -> PumpHandle {
    let (frames, frame_rx) = mpsc::channel(feed.config().channel_capacity);
    let (shutdown, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(run_feed(feed, frame_rx, shutdown_rx));

    PumpHandle {
        frames,
        shutdown,
        task,
    }
}
