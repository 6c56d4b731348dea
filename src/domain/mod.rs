// ============================================================================
// Domain Models Module
// Book levels, sides, fees and feed configuration
// ============================================================================

pub mod config;
pub mod fee;
pub mod level;
pub mod order_book;
pub mod update;

pub use config::{Environment, FeedConfig, Venue};
pub use fee::FeeSchedule;
pub use level::{PriceLevel, Side};
pub use order_book::{LevelChange, OrderBook, OrderBookSide, OrderBookSnapshot, SnapshotLevels};
pub use update::{BookUpdate, LevelUpdate, UpdateKind};
