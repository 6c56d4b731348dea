// ============================================================================
// Decimal Codec
// Decimal text <-> U256 magnitude, and fixed-point rendering/parsing
// ============================================================================

use super::errors::{NumericError, NumericResult};
use super::u256::{pow10, U256, MAX_POW10};
use arrayvec::{ArrayString, ArrayVec};
use std::fmt;
use std::iter;

/// Number of decimal digits in 2^256 - 1.
pub const MAX_DIGITS: usize = 78;

const MAX_MAGNITUDE_TEXT: &[u8] =
    b"115792089237316195423570985008687907853269984665640564039457584007913129639935";

/// 19 decimal digits always fit in a u64.
const CHUNK_DIGITS: usize = 19;

const CHUNK_DIVISOR: u64 = 10_000_000_000_000_000_000;

/// Sign, leading "0." and up to `MAX_DIGITS` digits.
pub const RENDER_CAPACITY: usize = MAX_DIGITS + 3;

/// Digits of a magnitude, no sign, no point.
pub type MagnitudeText = ArrayString<MAX_DIGITS>;

/// A rendered fixed-point value.
pub type DecimalText = ArrayString<RENDER_CAPACITY>;

// ============================================================================
// Parsing
// ============================================================================

/// Parses an unsigned decimal integer into a magnitude.
///
/// Accepts one leading `+` and any number of leading zeros.
///
/// # Errors
/// - `EmptyInput` for an empty string (or a lone `+`)
/// - `Syntax` for anything other than ASCII digits
/// - `Range` if the value exceeds 2^256 - 1
pub fn parse_magnitude(text: &str) -> NumericResult<U256> {
    let text = text.strip_prefix('+').unwrap_or(text);
    if text.is_empty() {
        return Err(NumericError::EmptyInput);
    }

    let bytes = text.as_bytes();
    if !bytes.iter().all(u8::is_ascii_digit) {
        return Err(NumericError::Syntax);
    }

    let first_significant = bytes
        .iter()
        .position(|&b| b != b'0')
        .unwrap_or(bytes.len());
    magnitude_from_digits(&bytes[first_significant..])
}

/// Builds a magnitude from ASCII digits with no leading zeros.
///
/// Digits are consumed in 19-digit chunks from the least significant end and
/// combined as `sum(chunk_k * 10^(19k))`.
fn magnitude_from_digits(digits: &[u8]) -> NumericResult<U256> {
    if digits.len() > MAX_DIGITS
        || (digits.len() == MAX_DIGITS && digits > MAX_MAGNITUDE_TEXT)
    {
        return Err(NumericError::Range);
    }

    let mut value = U256::ZERO;
    for (k, chunk) in digits.rchunks(CHUNK_DIGITS).enumerate() {
        let part = U256::from_u64(chunk_value(chunk));
        let term = if k == 0 {
            part
        } else {
            part.checked_mul(pow10((k * CHUNK_DIGITS) as u8)?)
                .ok_or(NumericError::Range)?
        };
        value = value.checked_add(term).ok_or(NumericError::Range)?;
    }
    Ok(value)
}

#[inline]
fn chunk_value(chunk: &[u8]) -> u64 {
    chunk
        .iter()
        .fold(0u64, |acc, &b| acc * 10 + u64::from(b - b'0'))
}

/// Parses decimal text (`[+-]digits[.digits]`) at a fixed scale.
///
/// Missing fractional digits are padded with zeros; surplus fractional digits
/// are rounded half-up on the first dropped digit. Returns the magnitude and
/// the sign (never negative for a zero magnitude).
///
/// # Errors
/// - `EmptyInput` for an empty string
/// - `Syntax` for stray characters or a sign/point without digits
/// - `Range` if the scaled magnitude exceeds 256 bits or `scale > 77`
pub fn parse_fixed(text: &str, scale: u8) -> NumericResult<(U256, bool)> {
    if scale > MAX_POW10 {
        return Err(NumericError::Range);
    }
    if text.is_empty() {
        return Err(NumericError::EmptyInput);
    }

    let (negative, body) = split_sign(text);
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(NumericError::Syntax);
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(NumericError::Syntax);
    }

    let scale = scale as usize;
    let frac = frac_part.as_bytes();
    let kept = &frac[..frac.len().min(scale)];
    let padding = scale.saturating_sub(frac.len());

    let mut digits: ArrayVec<u8, MAX_DIGITS> = ArrayVec::new();
    let scaled_digits = int_part
        .bytes()
        .chain(kept.iter().copied())
        .chain(iter::repeat(b'0').take(padding));
    for b in scaled_digits {
        if digits.is_empty() && b == b'0' {
            continue;
        }
        digits.try_push(b).map_err(|_| NumericError::Range)?;
    }

    let mut magnitude = magnitude_from_digits(&digits)?;
    if frac.len() > scale && frac[scale] >= b'5' {
        magnitude = magnitude
            .checked_add(U256::ONE)
            .ok_or(NumericError::Range)?;
    }

    Ok((magnitude, negative && !magnitude.is_zero()))
}

/// Parses signed integer text as an unscaled magnitude (`"-1500"` at scale 3
/// is -1.5).
///
/// # Errors
/// Same as [`parse_magnitude`]; `Range` also when `scale > 77`.
pub fn parse_raw(text: &str, scale: u8) -> NumericResult<(U256, bool)> {
    if scale > MAX_POW10 {
        return Err(NumericError::Range);
    }
    if text.is_empty() {
        return Err(NumericError::EmptyInput);
    }

    let (negative, body) = match text.strip_prefix('-') {
        Some("") => return Err(NumericError::Syntax),
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let magnitude = parse_magnitude(body)?;
    Ok((magnitude, negative && !magnitude.is_zero()))
}

fn split_sign(text: &str) -> (bool, &str) {
    if let Some(rest) = text.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = text.strip_prefix('+') {
        (false, rest)
    } else {
        (false, text)
    }
}

// ============================================================================
// Formatting
// ============================================================================

/// Formats a magnitude as decimal digits.
///
/// Repeatedly divides by 10^19, emitting each remainder as a zero-padded
/// 19-digit chunk; only the most significant chunk loses its padding.
pub fn format_magnitude(value: U256) -> MagnitudeText {
    let mut buf = [b'0'; MAX_DIGITS + CHUNK_DIGITS];
    let mut pos = buf.len();
    let mut rest = value;

    loop {
        let (quot, rem) = rest.div_rem_limb(CHUNK_DIVISOR);
        write_chunk(&mut buf[pos - CHUNK_DIGITS..pos], rem);
        pos -= CHUNK_DIGITS;
        rest = quot;
        if rest.is_zero() {
            break;
        }
    }

    let start = buf[pos..]
        .iter()
        .position(|&b| b != b'0')
        .map_or(buf.len() - 1, |offset| pos + offset);

    let mut out = MagnitudeText::new();
    for &b in &buf[start..] {
        out.push(char::from(b));
    }
    out
}

fn write_chunk(dst: &mut [u8], mut value: u64) {
    for digit in dst.iter_mut().rev() {
        *digit = b'0' + (value % 10) as u8;
        value /= 10;
    }
}

/// Renders `magnitude * 10^-scale` with a sign.
///
/// With `trim`, trailing fractional zeros (and a bare point) are dropped,
/// giving the canonical form; without it exactly `scale` fractional digits
/// are kept. A minus sign is written only for nonzero negative values.
pub fn render(magnitude: U256, negative: bool, scale: u8, trim: bool) -> DecimalText {
    let digits = format_magnitude(magnitude);
    let scale = scale as usize;
    let mut out = DecimalText::new();

    if negative && !magnitude.is_zero() {
        out.push('-');
    }

    if scale == 0 {
        out.push_str(&digits);
        return out;
    }

    if digits.len() <= scale {
        out.push_str("0.");
        for _ in digits.len()..scale {
            out.push('0');
        }
        out.push_str(&digits);
    } else {
        let split = digits.len() - scale;
        out.push_str(&digits[..split]);
        out.push('.');
        out.push_str(&digits[split..]);
    }

    if trim {
        let kept = out.trim_end_matches('0').trim_end_matches('.').len();
        out.truncate(kept);
    }
    out
}

impl fmt::Display for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format_magnitude(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_TEXT: &str =
        "115792089237316195423570985008687907853269984665640564039457584007913129639935";

    #[test]
    fn test_parse_small() {
        assert_eq!(parse_magnitude("0").unwrap(), U256::ZERO);
        assert_eq!(parse_magnitude("000").unwrap(), U256::ZERO);
        assert_eq!(parse_magnitude("+42").unwrap(), U256::from_u64(42));
        assert_eq!(parse_magnitude("0007").unwrap(), U256::from_u64(7));
    }

    #[test]
    fn test_parse_chunk_boundaries() {
        assert_eq!(
            parse_magnitude("9999999999999999999").unwrap(),
            U256::from_u64(9_999_999_999_999_999_999)
        );
        assert_eq!(
            parse_magnitude("10000000000000000000").unwrap(),
            pow10(19).unwrap()
        );
        let ten38 = format!("1{}", "0".repeat(38));
        assert_eq!(parse_magnitude(&ten38).unwrap(), pow10(38).unwrap());
    }

    #[test]
    fn test_parse_max() {
        assert_eq!(parse_magnitude(MAX_TEXT).unwrap(), U256::MAX);
        assert_eq!(format_magnitude(U256::MAX).as_str(), MAX_TEXT);
    }

    #[test]
    fn test_parse_range_errors() {
        let above_max =
            "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert_eq!(parse_magnitude(above_max), Err(NumericError::Range));

        let too_long = "1".repeat(79);
        assert_eq!(parse_magnitude(&too_long), Err(NumericError::Range));

        // Leading zeros do not count against the digit limit.
        let padded = format!("000{}", MAX_TEXT);
        assert_eq!(parse_magnitude(&padded).unwrap(), U256::MAX);
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(parse_magnitude(""), Err(NumericError::EmptyInput));
        assert_eq!(parse_magnitude("+"), Err(NumericError::EmptyInput));
        assert_eq!(parse_magnitude("12a4"), Err(NumericError::Syntax));
        assert_eq!(parse_magnitude("-5"), Err(NumericError::Syntax));
        assert_eq!(parse_magnitude("1.5"), Err(NumericError::Syntax));
    }

    #[test]
    fn test_format() {
        assert_eq!(format_magnitude(U256::ZERO).as_str(), "0");
        assert_eq!(format_magnitude(U256::from_u64(1234)).as_str(), "1234");
        assert_eq!(
            format_magnitude(pow10(19).unwrap()).as_str(),
            "10000000000000000000"
        );
        let x = pow10(40).unwrap().checked_add(U256::from_u64(5)).unwrap();
        assert_eq!(
            format_magnitude(x).as_str(),
            format!("1{}5", "0".repeat(39))
        );
        assert_eq!(format!("{:>6}", U256::from_u64(42)), "    42");
    }

    #[test]
    fn test_render_canonical() {
        let m = U256::from_u64(123_456_000);
        assert_eq!(render(m, false, 6, true).as_str(), "123.456");
        assert_eq!(render(m, true, 6, true).as_str(), "-123.456");
        assert_eq!(render(U256::ONE, true, 6, true).as_str(), "-0.000001");
        assert_eq!(render(U256::ZERO, true, 6, true).as_str(), "0");
        assert_eq!(render(U256::from_u64(1000), false, 2, true).as_str(), "10");
        assert_eq!(render(U256::from_u64(1000), false, 0, true).as_str(), "1000");
    }

    #[test]
    fn test_render_padded() {
        assert_eq!(render(U256::from_u64(1000), false, 2, false).as_str(), "10.00");
        assert_eq!(render(U256::ZERO, false, 3, false).as_str(), "0.000");
        assert_eq!(render(U256::from_u64(5), true, 4, false).as_str(), "-0.0005");
    }

    #[test]
    fn test_render_extremes() {
        let text = render(U256::MAX, true, 77, false);
        assert_eq!(text.len(), 80);
        assert!(text.starts_with("-1.1579"));

        let tiny = render(U256::ONE, true, 77, false);
        assert_eq!(tiny.len(), 80);
        assert!(tiny.ends_with("0001"));
    }

    #[test]
    fn test_parse_fixed_scaling() {
        assert_eq!(
            parse_fixed("123.456", 6).unwrap(),
            (U256::from_u64(123_456_000), false)
        );
        assert_eq!(parse_fixed("-0.000001", 6).unwrap(), (U256::ONE, true));
        assert_eq!(parse_fixed("+5", 2).unwrap(), (U256::from_u64(500), false));
        assert_eq!(parse_fixed(".5", 1).unwrap(), (U256::from_u64(5), false));
        assert_eq!(parse_fixed("7.", 0).unwrap(), (U256::from_u64(7), false));
        assert_eq!(parse_fixed("-0", 6).unwrap(), (U256::ZERO, false));
    }

    #[test]
    fn test_parse_fixed_rounds_half_up() {
        assert_eq!(parse_fixed("1.2345", 2).unwrap().0, U256::from_u64(123));
        assert_eq!(parse_fixed("1.235", 2).unwrap().0, U256::from_u64(124));
        assert_eq!(parse_fixed("1.2349999", 3).unwrap().0, U256::from_u64(1235));
        assert_eq!(parse_fixed("0.004", 2).unwrap(), (U256::ZERO, false));
        assert_eq!(parse_fixed("-0.005", 2).unwrap(), (U256::ONE, true));
        assert_eq!(parse_fixed("9.99", 1).unwrap().0, U256::from_u64(100));
    }

    #[test]
    fn test_parse_fixed_errors() {
        assert_eq!(parse_fixed("", 2), Err(NumericError::EmptyInput));
        assert_eq!(parse_fixed("-", 2), Err(NumericError::Syntax));
        assert_eq!(parse_fixed(".", 2), Err(NumericError::Syntax));
        assert_eq!(parse_fixed("1.2.3", 2), Err(NumericError::Syntax));
        assert_eq!(parse_fixed("1e5", 2), Err(NumericError::Syntax));
        assert_eq!(parse_fixed(" 1", 2), Err(NumericError::Syntax));
        assert_eq!(parse_fixed("1", 78), Err(NumericError::Range));
        assert_eq!(parse_fixed(MAX_TEXT, 1), Err(NumericError::Range));
        assert_eq!(parse_fixed(MAX_TEXT, 0).unwrap().0, U256::MAX);
    }

    #[test]
    fn test_parse_raw() {
        assert_eq!(parse_raw("-1500", 3).unwrap(), (U256::from_u64(1500), true));
        assert_eq!(parse_raw("0", 18).unwrap(), (U256::ZERO, false));
        assert_eq!(parse_raw("-", 3), Err(NumericError::Syntax));
        assert_eq!(parse_raw("", 3), Err(NumericError::EmptyInput));
        assert_eq!(parse_raw("1.5", 3), Err(NumericError::Syntax));
    }
}
