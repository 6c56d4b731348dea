// ============================================================================
// Numeric Errors
// Error types for 256-bit fixed-point arithmetic and decimal parsing
// ============================================================================

use std::fmt;

/// Errors that can occur while building or operating on fixed-point values.
///
/// Parsing and conversion failures (`EmptyInput`, `Syntax`, `NilOperand`, and
/// `Range` on construction) are recoverable: the offending input is rejected.
/// `Range` and `DivisionByZero` raised by arithmetic on validated operands
/// indicate a defect in the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericError {
    /// Magnitude does not fit in 256 bits (or the scale exceeds `MAX_SCALE`)
    Range,
    /// Empty string given to a parser
    EmptyInput,
    /// Non-decimal characters in numeric text
    Syntax,
    /// Divisor magnitude is zero
    DivisionByZero,
    /// A required arbitrary-precision input was absent
    NilOperand,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::Range => {
                write!(f, "range error: magnitude exceeds 256 bits")
            },
            NumericError::EmptyInput => write!(f, "empty input"),
            NumericError::Syntax => write!(f, "syntax error: not a decimal string"),
            NumericError::DivisionByZero => write!(f, "division by zero"),
            NumericError::NilOperand => write!(f, "nil operand"),
        }
    }
}

impl std::error::Error for NumericError {}

/// Result type alias for numeric operations
pub type NumericResult<T> = Result<T, NumericError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            NumericError::Range.to_string(),
            "range error: magnitude exceeds 256 bits"
        );
        assert_eq!(NumericError::DivisionByZero.to_string(), "division by zero");
        assert_eq!(NumericError::NilOperand.to_string(), "nil operand");
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(NumericError::Syntax, NumericError::Syntax);
        assert_ne!(NumericError::Syntax, NumericError::EmptyInput);
    }
}
