//! Validation of user-entered amounts

use thiserror::Error;

pub const MAX_AMOUNT: f64 = 1_000_000_000.0;
/// Inputs must be shorter than this many characters.
pub const MAX_INPUT_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("Please enter an amount")]
    Empty,
    #[error("Invalid input, please enter a number")]
    NotANumber,
    #[error("Entered number must be less than 10 symbols long")]
    TooLong,
    #[error("Amount must be between 0 and 1000000000")]
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Amount(f64);

impl Amount {
    /// Parses an amount, rounding anything past two fraction digits.
    pub fn parse(input: &str) -> Result<Self, AmountError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(AmountError::Empty);
        }

        let value: f64 = text.parse().map_err(|_| AmountError::NotANumber)?;
        if !value.is_finite() {
            return Err(AmountError::NotANumber);
        }
        if text.chars().count() >= MAX_INPUT_LEN {
            return Err(AmountError::TooLong);
        }
        if !(0.0..=MAX_AMOUNT).contains(&value) {
            return Err(AmountError::OutOfRange);
        }

        let fraction_digits = text.split_once('.').map_or(0, |(_, frac)| frac.len());
        let value = if fraction_digits > 2 {
            (value * 100.0).round() / 100.0
        } else {
            value
        };
        Ok(Amount(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn convert(&self, rate: f64) -> f64 {
        self.0 * rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer_and_short_fraction() {
        assert_eq!(Amount::parse("100").unwrap().value(), 100.0);
        assert_eq!(Amount::parse(" 12.5 ").unwrap().value(), 12.5);
        assert_eq!(Amount::parse("0.07").unwrap().value(), 0.07);
    }

    #[test]
    fn test_parse_rounds_long_fraction() {
        assert_eq!(Amount::parse("1.23456").unwrap().value(), 1.23);
        assert_eq!(Amount::parse("2.678").unwrap().value(), 2.68);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Amount::parse("   "), Err(AmountError::Empty));
        assert_eq!(Amount::parse("12a"), Err(AmountError::NotANumber));
        assert_eq!(Amount::parse("inf"), Err(AmountError::NotANumber));
        assert_eq!(Amount::parse("1234567890"), Err(AmountError::TooLong));
        assert_eq!(Amount::parse("-5"), Err(AmountError::OutOfRange));
        assert_eq!(
            AmountError::NotANumber.to_string(),
            "Invalid input, please enter a number"
        );
    }

    #[test]
    fn test_convert() {
        let amount = Amount::parse("100").unwrap();
        assert!((amount.convert(0.85) - 85.0).abs() < 1e-9);
    }
}
