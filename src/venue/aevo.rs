// ============================================================================
// Aevo Codec
// ============================================================================

use serde::Deserialize;

use super::{decode_levels, parse_sequence, WireNumber};
use crate::domain::{BookUpdate, FeedConfig, UpdateKind};
use crate::engine::{FeedError, FeedResult};
use crate::interfaces::VenueCodec;

/// Main channel carrying book snapshots and updates
pub const ORDERBOOK_CHANNEL: &str = "orderbook";

const CHANNEL_SEPARATOR: char = ':';

/// Text before the first `:` of a channel name (`"orderbook:ETH-PERP"` gives
/// `"orderbook"`).
pub fn main_channel(channel: &str) -> &str {
    channel
        .split_once(CHANNEL_SEPARATOR)
        .map_or(channel, |(main, _)| main)
}

// ============================================================================
// Wire Types
// ============================================================================

/// Only the routing fields; the payload is left undecoded.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Response<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct OrderbookData {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    instrument_name: Option<String>,
    #[serde(default)]
    bids: Vec<Vec<String>>,
    #[serde(default)]
    asks: Vec<Vec<String>>,
    #[serde(default)]
    last_updated: Option<String>,
}

// ============================================================================
// Codec
// ============================================================================

/// Aevo websocket book codec.
///
/// Levels arrive as decimal strings; `snapshot` frames replace the book and
/// `update` frames modify it. `last_updated` becomes the sequence.
#[derive(Debug, Clone)]
pub struct AevoCodec {
    instrument: String,
    price_scale: u8,
    amount_scale: u8,
}

impl AevoCodec {
    pub fn new(config: &FeedConfig) -> Self {
        Self {
            instrument: config.instrument.clone(),
            price_scale: config.price_scale,
            amount_scale: config.amount_scale,
        }
    }

    pub fn channel(&self) -> String {
        format!("{}{}{}", ORDERBOOK_CHANNEL, CHANNEL_SEPARATOR, self.instrument)
    }

    fn is_own_channel(&self, channel: &str) -> bool {
        main_channel(channel) == ORDERBOOK_CHANNEL
            && channel
                .split_once(CHANNEL_SEPARATOR)
                .map_or(true, |(_, instrument)| instrument == self.instrument)
    }
}

impl VenueCodec for AevoCodec {
    fn name(&self) -> &str {
        "aevo"
    }

    fn subscribe_request(&self, id: u64) -> String {
        serde_json::json!({
            "id": id,
            "op": "subscribe",
            "data": [self.channel()],
        })
        .to_string()
    }

    fn decode(&self, frame: &str) -> FeedResult<Option<BookUpdate>> {
        let envelope: Envelope = serde_json::from_str(frame)?;

        let channel = match envelope.channel {
            Some(channel) => channel,
            None => {
                return match envelope.error {
                    Some(error) => Err(FeedError::Decode(format!("venue error: {}", error))),
                    None => Ok(None),
                }
            },
        };
        if !self.is_own_channel(&channel) {
            return Ok(None);
        }

        let response: Response<OrderbookData> = serde_json::from_str(frame)?;
        let data = response.data;

        if let Some(name) = &data.instrument_name {
            if name != &self.instrument {
                return Ok(None);
            }
        }

        let kind = match data.kind.as_str() {
            "snapshot" => UpdateKind::Snapshot,
            "update" => UpdateKind::Delta,
            other => {
                return Err(FeedError::Decode(format!("unknown book frame type {:?}", other)))
            },
        };

        let update = BookUpdate {
            kind,
            bids: decode_levels(&data.bids, WireNumber::Decimal, self.price_scale, self.amount_scale)?,
            asks: decode_levels(&data.asks, WireNumber::Decimal, self.price_scale, self.amount_scale)?,
            sequence: data
                .last_updated
                .as_deref()
                .map(|text| parse_sequence(text, "last_updated"))
                .transpose()?,
        };
        Ok(Some(update))
    }
}
