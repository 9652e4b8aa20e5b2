//! Ticker symbols.
//!
//! A ticker is 1-5 letters optionally followed by digits (`AAPL`, `GOOGL`,
//! `ABC1`). Input is trimmed and upper-cased before matching, so `aapl` is
//! accepted and normalized to `AAPL`.

use super::range::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MAX_LETTERS: usize = 5;

/// Returns true if `raw` is a valid ticker after normalization.
pub fn validate_ticker(raw: &str) -> bool {
    matches_ticker_pattern(&normalize(raw))
}

fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// `^[A-Z]{1,5}[0-9]*$`
fn matches_ticker_pattern(s: &str) -> bool {
    let letters = s.bytes().take_while(|b| b.is_ascii_uppercase()).count();
    if letters == 0 || letters > MAX_LETTERS {
        return false;
    }
    s.bytes().skip(letters).all(|b| b.is_ascii_digit())
}

/// Validated, upper-case ticker symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalized = normalize(raw);
        if matches_ticker_pattern(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(ValidationError::InvalidTicker(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Ticker {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Ticker {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(t: Ticker) -> Self {
        t.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_common_symbols() {
        for s in ["AAPL", "MSFT", "GOOGL", "V", "ABC1", "X2024"] {
            assert!(validate_ticker(s), "{s} should be valid");
        }
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert!(validate_ticker("aapl"));
        assert_eq!(Ticker::parse("  msft ").unwrap().as_str(), "MSFT");
    }

    #[test]
    fn rejects_malformed_symbols() {
        for s in ["", "   ", "1AAPL", "TOOLONG", "BRK-B", "AB.C", "A1B", "$SPY"] {
            assert!(!validate_ticker(s), "{s} should be invalid");
        }
    }

    #[test]
    fn parse_error_keeps_raw_input() {
        let err = Ticker::parse("brk-b").unwrap_err();
        assert_eq!(err, ValidationError::InvalidTicker("brk-b".into()));
    }

    #[test]
    fn serde_goes_through_validation() {
        let t: Ticker = serde_json::from_str("\"nvda\"").unwrap();
        assert_eq!(t.as_str(), "NVDA");
        assert!(serde_json::from_str::<Ticker>("\"9ABC\"").is_err());
    }

    proptest! {
        #[test]
        fn pattern_conforming_symbols_validate(s in "[A-Z]{1,5}[0-9]{0,4}") {
            prop_assert!(validate_ticker(&s));
        }

        #[test]
        fn digit_first_symbols_fail(s in "[0-9][A-Z0-9]{0,6}") {
            prop_assert!(!validate_ticker(&s));
        }

        #[test]
        fn special_characters_fail(
            head in "[A-Z]{1,3}",
            special in "[-./$#@!]",
            tail in "[A-Z]{0,2}",
        ) {
            let s = format!("{head}{special}{tail}");
            prop_assert!(!validate_ticker(&s));
        }
    }
}
