// ============================================================================
// Numeric Module
// 256-bit fixed-point decimal arithmetic
// ============================================================================
//
// This module provides:
// - U256: four-limb unsigned kernel (add/sub/mul with overflow flags)
// - Division engine: reciprocal 2-by-1 division and Knuth Algorithm D
// - Decimal codec: text <-> magnitude in 19-digit chunks
// - FixedPoint256: sign-magnitude decimal with a per-value scale
// - NumericError: Error types for arithmetic and parsing
//
// Design principles:
// - No floating-point operations on the arithmetic path
// - No silent wraparound: overflow is reported as Range
// - Stack-only values and text buffers

pub mod codec;
mod division;
mod errors;
mod fixed_point;
#[cfg(feature = "serde")]
mod serde_impl;
mod u256;

pub use codec::{DecimalText, MagnitudeText};
pub use errors::{NumericError, NumericResult};
pub use fixed_point::{FixedPoint256, DEFAULT_SCALE, MAX_SCALE};
#[cfg(feature = "serde")]
pub use serde_impl::{x18, DecimalSeed};
pub use u256::{pow10, U256, MAX_POW10};
