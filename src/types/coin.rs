//! Coin types and the validated arguments of coin governance
//!
//! [`CoinName`], [`CoinSymbol`] and [`Message`] validate on construction, so a
//! value of these types is always within range by the time it reaches the core.

use super::error::LedgerError;
use super::ids::{CoinKey, ExternalId};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A currency type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coin {
    /// Internal key (the default coin is key 1)
    pub key: CoinKey,
    /// Caller-facing identifier
    pub external_id: ExternalId,
    /// Display name
    pub name: String,
    /// Short symbol shown next to amounts
    pub symbol: String,
}

/// Validated coin name: 3-45 characters of ASCII letters, digits and spaces
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CoinName(String);

impl CoinName {
    pub const MIN_LEN: usize = 3;
    pub const MAX_LEN: usize = 45;

    /// Validate and wrap a coin name
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the name is shorter than 3 or longer than 45
    /// characters, or contains anything other than letters, digits and spaces.
    pub fn new(name: impl Into<String>) -> Result<Self, LedgerError> {
        let name = name.into();
        let len = name.chars().count();

        if !(Self::MIN_LEN..=Self::MAX_LEN).contains(&len) {
            return Err(LedgerError::invalid_argument(
                "name",
                format!(
                    "must be between {} and {} characters",
                    Self::MIN_LEN,
                    Self::MAX_LEN
                ),
            ));
        }

        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ') {
            return Err(LedgerError::invalid_argument(
                "name",
                "must only contain letters, numbers, and spaces",
            ));
        }

        Ok(CoinName(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CoinName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CoinName {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CoinName::new(s)
    }
}

/// Validated coin symbol: 1-3 characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CoinSymbol(String);

impl CoinSymbol {
    pub const MAX_LEN: usize = 3;

    /// Validate and wrap a coin symbol
    ///
    /// Length is counted in characters, so symbols such as `μ` are one character.
    pub fn new(symbol: impl Into<String>) -> Result<Self, LedgerError> {
        let symbol = symbol.into();
        let len = symbol.chars().count();

        if len == 0 || len > Self::MAX_LEN {
            return Err(LedgerError::invalid_argument(
                "symbol",
                format!("must be between 1 and {} characters", Self::MAX_LEN),
            ));
        }

        Ok(CoinSymbol(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CoinSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CoinSymbol {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CoinSymbol::new(s)
    }
}

/// Validated free-text message attached to transactions and requests (0-64 characters)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Message(String);

impl Message {
    pub const MAX_LEN: usize = 64;

    /// Validate and wrap a message
    pub fn new(message: impl Into<String>) -> Result<Self, LedgerError> {
        let message = message.into();
        if message.chars().count() > Self::MAX_LEN {
            return Err(LedgerError::invalid_argument(
                "message",
                format!("must be at most {} characters", Self::MAX_LEN),
            ));
        }
        Ok(Message(message))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Message {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Message::new(s)
    }
}

/// Arguments of coin creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCoin {
    pub name: CoinName,
    pub symbol: CoinSymbol,
}

/// Fields to change on an existing coin
///
/// At least one field must be present for the update to be accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoinUpdate {
    pub name: Option<CoinName>,
    pub symbol: Option<CoinSymbol>,
}

impl CoinUpdate {
    /// Whether the update carries no field at all
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.symbol.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::minimum("abc")]
    #[case::with_spaces("Test Coin 2")]
    #[case::maximum("a23456789012345678901234567890123456789012345")]
    fn test_coin_name_accepts_valid_names(#[case] name: &str) {
        assert_eq!(CoinName::new(name).unwrap().as_str(), name);
    }

    #[rstest]
    #[case::empty("")]
    #[case::too_short("ab")]
    #[case::too_long("a234567890123456789012345678901234567890123456")]
    #[case::punctuation("coin!")]
    #[case::non_ascii("cöin")]
    fn test_coin_name_rejects_invalid_names(#[case] name: &str) {
        let result = CoinName::new(name);
        assert!(matches!(
            result,
            Err(LedgerError::InvalidArgument { ref field, .. }) if field == "name"
        ));
    }

    #[rstest]
    #[case::single("T")]
    #[case::multibyte("μ")]
    #[case::maximum("TST")]
    fn test_coin_symbol_accepts_valid_symbols(#[case] symbol: &str) {
        assert_eq!(CoinSymbol::new(symbol).unwrap().as_str(), symbol);
    }

    #[rstest]
    #[case::empty("")]
    #[case::too_long("TEST")]
    fn test_coin_symbol_rejects_invalid_symbols(#[case] symbol: &str) {
        assert!(CoinSymbol::new(symbol).is_err());
    }

    #[test]
    fn test_message_allows_empty_and_maximum_length() {
        assert!(Message::new("").is_ok());
        assert!(Message::new("m".repeat(Message::MAX_LEN)).is_ok());
    }

    #[test]
    fn test_message_rejects_over_maximum_length() {
        assert!(Message::new("m".repeat(Message::MAX_LEN + 1)).is_err());
    }

    #[test]
    fn test_coin_update_is_empty() {
        assert!(CoinUpdate::default().is_empty());

        let update = CoinUpdate {
            symbol: Some(CoinSymbol::new("X").unwrap()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
