// ============================================================================
// Book Feed Factory
// Creates book feeds with the codec of the configured venue
// ============================================================================

use crate::domain::{Environment, FeeSchedule, FeedConfig, Venue};
use crate::engine::BookFeed;
use crate::interfaces::{EventHandler, VenueCodec};
use std::sync::Arc;

// ============================================================================
// Factory Functions
// ============================================================================

/// Creates a book feed from configuration
///
/// # Arguments
/// * `config` - Feed configuration
/// * `event_handler` - Event handler for book events
///
/// # Returns
/// * `Result<BookFeed, String>` - Configured feed or error
///
/// # Example
/// ```
/// use perp_feed::prelude::*;
/// use perp_feed::engine::factory::create_feed;
/// use std::sync::Arc;
///
/// let config = FeedConfig::aevo("ETH-PERP");
/// let feed = create_feed(config, Arc::new(NoOpEventHandler)).unwrap();
/// assert_eq!(feed.book().instrument, "ETH-PERP");
/// ```
pub fn create_feed(
    config: FeedConfig,
    event_handler: Arc<dyn EventHandler>,
) -> Result<BookFeed, String> {
    config.validate()?;

    let codec = create_codec(&config)?;

    Ok(BookFeed::new(config, codec, event_handler))
}

/// Creates the wire codec for the configured venue
#[cfg(feature = "serde")]
fn create_codec(config: &FeedConfig) -> Result<Box<dyn VenueCodec>, String> {
    use crate::venue::{AevoCodec, VertexCodec};

    match config.venue {
        Venue::Aevo => Ok(Box::new(AevoCodec::new(config))),
        Venue::Vertex => VertexCodec::new(config)
            .map(|codec| Box::new(codec) as Box<dyn VenueCodec>)
            .map_err(|err| err.to_string()),
    }
}

#[cfg(not(feature = "serde"))]
fn create_codec(config: &FeedConfig) -> Result<Box<dyn VenueCodec>, String> {
    Err(format!("the {} codec needs the `serde` feature", config.venue))
}

// ============================================================================
// Builder Pattern
// ============================================================================

/// Builder for creating book feeds with fluent API
///
/// # Example
/// ```
/// use perp_feed::prelude::*;
/// use perp_feed::engine::factory::BookFeedBuilder;
/// use std::sync::Arc;
///
/// let feed = BookFeedBuilder::vertex(4)
///     .testnet()
///     .with_display_depth(5)
///     .build(Arc::new(NoOpEventHandler))
///     .unwrap();
/// assert_eq!(feed.config().display_depth, 5);
/// ```
pub struct BookFeedBuilder {
    config: FeedConfig,
}

impl BookFeedBuilder {
    /// Create a new builder for an instrument on a venue
    pub fn new(venue: Venue, instrument: impl Into<String>) -> Self {
        Self {
            config: FeedConfig::new(venue, instrument),
        }
    }

    /// Aevo feed for an instrument name such as `ETH-PERP`
    pub fn aevo(instrument: impl Into<String>) -> Self {
        Self {
            config: FeedConfig::aevo(instrument),
        }
    }

    /// Vertex feed for a numeric product id
    pub fn vertex(product_id: u32) -> Self {
        Self {
            config: FeedConfig::vertex(product_id),
        }
    }

    // ========================================================================
    // Environment
    // ========================================================================

    pub fn mainnet(mut self) -> Self {
        self.config.environment = Environment::Mainnet;
        self
    }

    pub fn testnet(mut self) -> Self {
        self.config.environment = Environment::Testnet;
        self
    }

    // ========================================================================
    // Book Configuration
    // ========================================================================

    pub fn with_product_id(mut self, product_id: u32) -> Self {
        self.config.product_id = Some(product_id);
        self
    }

    /// Override the venue's default taker fee
    pub fn with_taker_fee(mut self, taker_fee: FeeSchedule) -> Self {
        self.config.taker_fee = taker_fee;
        self
    }

    /// Decimal places kept for prices and amounts
    pub fn with_scales(mut self, price_scale: u8, amount_scale: u8) -> Self {
        self.config.price_scale = price_scale;
        self.config.amount_scale = amount_scale;
        self
    }

    pub fn with_display_depth(mut self, depth: usize) -> Self {
        self.config.display_depth = depth;
        self
    }

    pub fn with_liquidity_depth(mut self, depth: usize) -> Self {
        self.config.liquidity_depth = depth;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Build the book feed
    pub fn build(self, event_handler: Arc<dyn EventHandler>) -> Result<BookFeed, String> {
        create_feed(self.config, event_handler)
    }

    /// Get the configuration without building (for inspection)
    pub fn get_config(&self) -> &FeedConfig {
        &self.config
    }
}
