// ============================================================================
// Venue Codecs Module
// Wire formats of the supported derivatives venues
// ============================================================================

mod aevo;
mod vertex;

pub use aevo::{main_channel, AevoCodec, ORDERBOOK_CHANNEL};
pub use vertex::{liquidity_query_path, VertexCodec, BOOK_DEPTH_STREAM, X18_SCALE};

use crate::domain::LevelUpdate;
use crate::engine::{FeedError, FeedResult};
use crate::numeric::{FixedPoint256, NumericResult};

/// How a venue writes numbers on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WireNumber {
    /// Decimal text, e.g. `"2000.5"`
    Decimal,
    /// Integer text scaled by 10^18, e.g. `"2000500000000000000000"`
    X18,
}

impl WireNumber {
    pub(crate) fn parse(self, text: &str, scale: u8) -> NumericResult<FixedPoint256> {
        match self {
            WireNumber::Decimal => FixedPoint256::from_text(text, scale),
            WireNumber::X18 => FixedPoint256::from_raw_str(text, X18_SCALE)?.rescale(scale),
        }
    }
}

/// Converts `[[price, amount, ..], ..]` string pairs into level updates.
pub(crate) fn decode_levels(
    raw: &[Vec<String>],
    format: WireNumber,
    price_scale: u8,
    amount_scale: u8,
) -> FeedResult<Vec<LevelUpdate>> {
    raw.iter()
        .map(|pair| match pair.as_slice() {
            [price, amount, ..] => Ok((
                format.parse(price, price_scale)?,
                format.parse(amount, amount_scale)?,
            )),
            _ => Err(FeedError::Decode(format!(
                "level needs price and amount, got {} fields",
                pair.len()
            ))),
        })
        .collect()
}

/// Parses a stringified integer field such as a timestamp.
pub(crate) fn parse_sequence(text: &str, field: &str) -> FeedResult<i64> {
    text.parse()
        .map_err(|err| FeedError::Decode(format!("{}: {}", field, err)))
}
