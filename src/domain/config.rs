// ============================================================================
// Feed Configuration
// Venue, environment and scaling for one order-book feed
// ============================================================================

use super::FeeSchedule;
use crate::numeric::{DEFAULT_SCALE, MAX_SCALE};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Venue and Environment
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Environment {
    Testnet,
    Mainnet,
}

/// Derivatives venues with a supported book feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Venue {
    /// Aevo: decimal-string levels, snapshot then updates on one channel
    Aevo,
    /// Vertex: x18 integer levels, deltas over websocket, snapshot over REST
    Vertex,
}

impl Venue {
    pub fn name(&self) -> &'static str {
        match self {
            Venue::Aevo => "aevo",
            Venue::Vertex => "vertex",
        }
    }

    pub fn ws_url(&self, env: Environment) -> &'static str {
        match (self, env) {
            (Venue::Aevo, Environment::Mainnet) => "wss://ws.aevo.xyz",
            (Venue::Aevo, Environment::Testnet) => "wss://ws-testnet.aevo.xyz",
            (Venue::Vertex, Environment::Mainnet) => {
                "wss://gateway.prod.vertexprotocol.com/v1/subscribe"
            },
            (Venue::Vertex, Environment::Testnet) => {
                "wss://gateway.sepolia-test.vertexprotocol.com/v1/subscribe"
            },
        }
    }

    pub fn http_url(&self, env: Environment) -> &'static str {
        match (self, env) {
            (Venue::Aevo, Environment::Mainnet) => "https://api.aevo.xyz",
            (Venue::Aevo, Environment::Testnet) => "https://api-testnet.aevo.xyz",
            (Venue::Vertex, Environment::Mainnet) => "https://gateway.prod.vertexprotocol.com/v1",
            (Venue::Vertex, Environment::Testnet) => {
                "https://gateway.sepolia-test.vertexprotocol.com/v1"
            },
        }
    }

    /// Default taker fee for the venue
    pub fn default_fees(&self) -> FeeSchedule {
        match self {
            Venue::Aevo => FeeSchedule::aevo(),
            Venue::Vertex => FeeSchedule::vertex(),
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Complete Feed Configuration
// ============================================================================

/// Configuration for one order-book feed
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeedConfig {
    pub venue: Venue,

    pub environment: Environment,

    /// Venue instrument name (e.g., "ETH-PERP")
    pub instrument: String,

    /// Numeric product id; required by Vertex
    pub product_id: Option<u32>,

    /// Taker fee used for net prices
    pub taker_fee: FeeSchedule,

    /// Fractional digits kept for prices
    pub price_scale: u8,

    /// Fractional digits kept for amounts
    pub amount_scale: u8,

    /// Levels per side rendered by snapshots
    pub display_depth: usize,

    /// Levels requested from the REST liquidity query
    pub liquidity_depth: usize,

    /// Bound of the frame channel feeding the pump
    pub channel_capacity: usize,
}

impl FeedConfig {
    /// Create a new configuration with required parameters
    pub fn new(venue: Venue, instrument: impl Into<String>) -> Self {
        Self {
            venue,
            environment: Environment::Mainnet,
            instrument: instrument.into(),
            product_id: None,
            taker_fee: venue.default_fees(),
            price_scale: DEFAULT_SCALE,
            amount_scale: DEFAULT_SCALE,
            display_depth: 10,
            liquidity_depth: 100,
            channel_capacity: 10_000,
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_product_id(mut self, product_id: u32) -> Self {
        self.product_id = Some(product_id);
        self
    }

    pub fn with_taker_fee(mut self, taker_fee: FeeSchedule) -> Self {
        self.taker_fee = taker_fee;
        self
    }

    pub fn with_scales(mut self, price_scale: u8, amount_scale: u8) -> Self {
        self.price_scale = price_scale;
        self.amount_scale = amount_scale;
        self
    }

    pub fn with_display_depth(mut self, depth: usize) -> Self {
        self.display_depth = depth;
        self
    }

    pub fn with_liquidity_depth(mut self, depth: usize) -> Self {
        self.liquidity_depth = depth;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn ws_url(&self) -> &'static str {
        self.venue.ws_url(self.environment)
    }

    pub fn http_url(&self) -> &'static str {
        self.venue.http_url(self.environment)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.instrument.is_empty() {
            return Err("Instrument cannot be empty".to_string());
        }

        if self.venue == Venue::Vertex && self.product_id.is_none() {
            return Err("Vertex feeds require a product id".to_string());
        }

        if self.price_scale > MAX_SCALE || self.amount_scale > MAX_SCALE {
            return Err(format!("Scales cannot exceed {}", MAX_SCALE));
        }

        if self.display_depth == 0 {
            return Err("Display depth must be positive".to_string());
        }

        if self.channel_capacity == 0 {
            return Err("Channel capacity must be positive".to_string());
        }

        self.taker_fee.validate()
    }
}

// ============================================================================
// Preset Configurations (Factory Methods)
// ============================================================================

impl FeedConfig {
    /// Aevo orderbook channel for `instrument`, 8 bps taker fee
    pub fn aevo(instrument: impl Into<String>) -> Self {
        Self::new(Venue::Aevo, instrument)
    }

    /// Vertex book_depth stream for `product_id`, 2 bps taker fee
    pub fn vertex(product_id: u32) -> Self {
        Self::new(Venue::Vertex, format!("product:{}", product_id)).with_product_id(product_id)
    }
}
