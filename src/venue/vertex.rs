// ============================================================================
// Vertex Codec
// ============================================================================

use serde::Deserialize;

use super::{decode_levels, parse_sequence, WireNumber};
use crate::domain::{BookUpdate, FeedConfig, UpdateKind};
use crate::engine::{FeedError, FeedResult};
use crate::interfaces::VenueCodec;

/// Stream type of incremental book depth frames
pub const BOOK_DEPTH_STREAM: &str = "book_depth";

/// Vertex writes prices and amounts as integers scaled by 10^18.
pub const X18_SCALE: u8 = 18;

/// Gateway path of the `market_liquidity` query.
pub fn liquidity_query_path(product_id: u32, depth: usize) -> String {
    format!(
        "/query?type=market_liquidity&product_id={}&depth={}",
        product_id, depth
    )
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct StreamTag {
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BookDepth {
    min_timestamp: String,
    product_id: u32,
    #[serde(default)]
    bids: Vec<Vec<String>>,
    #[serde(default)]
    asks: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct MarketLiquidity {
    status: String,
    #[serde(default)]
    data: Option<LiquidityData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LiquidityData {
    #[serde(default)]
    bids: Vec<Vec<String>>,
    #[serde(default)]
    asks: Vec<Vec<String>>,
    timestamp: String,
}

// ============================================================================
// Codec
// ============================================================================

/// Vertex book codec.
///
/// Websocket `book_depth` frames are deltas sequenced by `min_timestamp`; the
/// starting book comes from the REST `market_liquidity` query, decoded with
/// [`VertexCodec::decode_liquidity`].
#[derive(Debug, Clone)]
pub struct VertexCodec {
    product_id: u32,
    price_scale: u8,
    amount_scale: u8,
    liquidity_depth: usize,
}

impl VertexCodec {
    /// # Errors
    /// `Config` if the configuration has no product id.
    pub fn new(config: &FeedConfig) -> FeedResult<Self> {
        let product_id = config
            .product_id
            .ok_or_else(|| FeedError::Config("Vertex feeds require a product id".to_string()))?;
        Ok(Self {
            product_id,
            price_scale: config.price_scale,
            amount_scale: config.amount_scale,
            liquidity_depth: config.liquidity_depth,
        })
    }

    pub fn product_id(&self) -> u32 {
        self.product_id
    }

    /// Path of the snapshot query for this product
    pub fn liquidity_query(&self) -> String {
        liquidity_query_path(self.product_id, self.liquidity_depth)
    }

    /// Decodes a `market_liquidity` response body into a snapshot sequenced
    /// by its `timestamp`.
    pub fn decode_liquidity(&self, body: &str) -> FeedResult<BookUpdate> {
        let response: MarketLiquidity = serde_json::from_str(body)?;
        if response.status != "success" {
            return Err(FeedError::Decode(format!(
                "market_liquidity status {:?}: {}",
                response.status,
                response.error.unwrap_or_default()
            )));
        }
        let data = response
            .data
            .ok_or_else(|| FeedError::Decode("market_liquidity without data".to_string()))?;

        Ok(BookUpdate {
            kind: UpdateKind::Snapshot,
            bids: decode_levels(&data.bids, WireNumber::X18, self.price_scale, self.amount_scale)?,
            asks: decode_levels(&data.asks, WireNumber::X18, self.price_scale, self.amount_scale)?,
            sequence: Some(parse_sequence(&data.timestamp, "timestamp")?),
        })
    }
}

impl VenueCodec for VertexCodec {
    fn name(&self) -> &str {
        "vertex"
    }

    fn subscribe_request(&self, id: u64) -> String {
        serde_json::json!({
            "id": id,
            "method": "subscribe",
            "stream": {
                "type": BOOK_DEPTH_STREAM,
                "product_id": self.product_id,
            },
        })
        .to_string()
    }

    fn snapshot_query(&self) -> Option<String> {
        Some(self.liquidity_query())
    }

    fn decode_snapshot(&self, body: &str) -> FeedResult<BookUpdate> {
        self.decode_liquidity(body)
    }

    fn decode(&self, frame: &str) -> FeedResult<Option<BookUpdate>> {
        let tag: StreamTag = serde_json::from_str(frame)?;
        if tag.kind.as_deref() != Some(BOOK_DEPTH_STREAM) {
            return Ok(None);
        }

        let depth: BookDepth = serde_json::from_str(frame)?;
        if depth.product_id != self.product_id {
            return Ok(None);
        }

        Ok(Some(BookUpdate {
            kind: UpdateKind::Delta,
            bids: decode_levels(&depth.bids, WireNumber::X18, self.price_scale, self.amount_scale)?,
            asks: decode_levels(&depth.asks, WireNumber::X18, self.price_scale, self.amount_scale)?,
            sequence: Some(parse_sequence(&depth.min_timestamp, "min_timestamp")?),
        }))
    }
}
