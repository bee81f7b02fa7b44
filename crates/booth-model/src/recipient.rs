//! Phone numbers entered at the kiosk.

use std::fmt;
use std::str::FromStr;

use booth_common::BoothError;
use serde::{Deserialize, Serialize};

pub const MIN_RECIPIENT_DIGITS: usize = 10;
pub const MAX_RECIPIENT_DIGITS: usize = 15;

/// Digits-only phone number, 10 to 15 digits long.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecipientNumber(String);

impl RecipientNumber {
    /// Parse user input, ignoring separators such as spaces, dashes and `+`.
    pub fn parse(input: &str) -> Result<Self, BoothError> {
        let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
        if input.chars().any(|c| c.is_alphabetic()) {
            return Err(BoothError::validation(format!(
                "phone number '{input}' contains letters"
            )));
        }
        if digits.len() < MIN_RECIPIENT_DIGITS {
            return Err(BoothError::validation(format!(
                "phone number needs at least {MIN_RECIPIENT_DIGITS} digits"
            )));
        }
        if digits.len() > MAX_RECIPIENT_DIGITS {
            return Err(BoothError::validation(format!(
                "phone number has more than {MAX_RECIPIENT_DIGITS} digits"
            )));
        }
        Ok(Self(digits))
    }

    pub fn digits(&self) -> &str {
        &self.0
    }

    /// Kiosk display form: `XXX-XXX-XXXX`, trailing digits appended.
    pub fn display_format(&self) -> String {
        format_partial(&self.0)
    }
}

/// Format a partially typed number the way the keypad shows it.
pub fn format_partial(digits: &str) -> String {
    let digits: String = digits
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(MAX_RECIPIENT_DIGITS)
        .collect();
    match digits.len() {
        0..=3 => digits,
        4..=6 => format!("{}-{}", &digits[..3], &digits[3..]),
        _ => format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..]),
    }
}

impl fmt::Display for RecipientNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecipientNumber {
    type Err = BoothError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RecipientNumber {
    type Error = BoothError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RecipientNumber> for String {
    fn from(value: RecipientNumber) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_separators() {
        let n = RecipientNumber::parse("+1 555-123-4567").unwrap();
        assert_eq!(n.digits(), "15551234567");
    }

    #[test]
    fn test_length_bounds() {
        assert!(RecipientNumber::parse("555123456").is_err());
        assert!(RecipientNumber::parse("5551234567").is_ok());
        assert!(RecipientNumber::parse("123456789012345").is_ok());
        assert!(RecipientNumber::parse("1234567890123456").is_err());
        assert!(RecipientNumber::parse("555-CALL-NOW").is_err());
    }

    #[test]
    fn test_display_format() {
        assert_eq!(format_partial("55"), "55");
        assert_eq!(format_partial("55512"), "555-12");
        assert_eq!(format_partial("5551234567"), "555-123-4567");
        let n = RecipientNumber::parse("5551234567").unwrap();
        assert_eq!(n.display_format(), "555-123-4567");
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<RecipientNumber>("\"12\"").is_err());
        let n: RecipientNumber = serde_json::from_str("\"5551234567\"").unwrap();
        assert_eq!(serde_json::to_string(&n).unwrap(), "\"5551234567\"");
    }
}
