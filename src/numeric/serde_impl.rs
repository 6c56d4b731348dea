// ============================================================================
// Serde Support
// Canonical-string (de)serialization for FixedPoint256
// ============================================================================

use super::fixed_point::{FixedPoint256, DEFAULT_SCALE};
use super::u256::U256;
use serde::de::{self, DeserializeSeed, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

impl Serialize for FixedPoint256 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FixedPoint256 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        DecimalSeed::new(DEFAULT_SCALE).deserialize(deserializer)
    }
}

/// Deserializes a `FixedPoint256` at a scale chosen by the surrounding code.
///
/// Accepts decimal strings and JSON numbers. Strings are parsed with the same
/// half-up rounding as [`FixedPoint256::from_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalSeed {
    pub scale: u8,
}

impl DecimalSeed {
    pub const fn new(scale: u8) -> Self {
        Self { scale }
    }
}

impl<'de> DeserializeSeed<'de> for DecimalSeed {
    type Value = FixedPoint256;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DecimalVisitor { scale: self.scale })
    }
}

struct DecimalVisitor {
    scale: u8,
}

impl<'de> Visitor<'de> for DecimalVisitor {
    type Value = FixedPoint256;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a decimal string or number at scale {}", self.scale)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        FixedPoint256::from_text(v, self.scale).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        FixedPoint256::from_i64(v, self.scale).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        FixedPoint256::from_parts(U256::from_u64(v), false, 0)
            .and_then(|x| x.rescale(self.scale))
            .map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        FixedPoint256::from_f64(v, self.scale).map_err(E::custom)
    }
}

/// `deserialize_with` helper for 18-decimal integer strings (`"1500000000000000000"`
/// is 1.5).
pub mod x18 {
    use super::*;

    pub const SCALE: u8 = 18;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<FixedPoint256, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RawVisitor;

        impl<'de> Visitor<'de> for RawVisitor {
            type Value = FixedPoint256;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer string scaled by 10^18")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                FixedPoint256::from_raw_str(v, SCALE).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(RawVisitor)
    }
}
