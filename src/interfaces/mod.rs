// ============================================================================
// Interfaces Module
// Contains all trait definitions and contracts
// ============================================================================

mod event_handler;
mod venue_codec;

pub use event_handler::{BookEvent, EventHandler, LoggingEventHandler, NoOpEventHandler};
pub use venue_codec::VenueCodec;
