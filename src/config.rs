//! Ledger and store configuration
//!
//! Invalid values never abort startup: each constructor logs a warning and
//! falls back to the default for the offending field.

use crate::types::{CoinName, CoinSymbol};
use std::path::PathBuf;

/// Number of items per history page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Name and symbol of the coin seeded as key 1 in a fresh store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultCoin {
    pub name: String,
    pub symbol: String,
}

impl Default for DefaultCoin {
    fn default() -> Self {
        Self {
            name: "Universal Coin".to_string(),
            symbol: "μ".to_string(),
        }
    }
}

impl DefaultCoin {
    /// Create a DefaultCoin, validating name and symbol like any other coin
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        let default = Self::default();
        let name = name.into();
        let symbol = symbol.into();

        let name = match CoinName::new(name.clone()) {
            Ok(valid) => valid.as_str().to_string(),
            Err(e) => {
                tracing::warn!(%name, error = %e, "invalid default coin name, using {}", default.name);
                default.name
            }
        };

        let symbol = match CoinSymbol::new(symbol.clone()) {
            Ok(valid) => valid.as_str().to_string(),
            Err(e) => {
                tracing::warn!(%symbol, error = %e, "invalid default coin symbol, using {}", default.symbol);
                default.symbol
            }
        };

        Self { name, symbol }
    }
}

/// Settings of the [`Ledger`](crate::core::Ledger) operation surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Coin seeded into a fresh store
    pub default_coin: DefaultCoin,

    /// Number of items per history page
    pub page_size: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_coin: DefaultCoin::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl LedgerConfig {
    /// Create a LedgerConfig with custom values
    pub fn new(default_coin: DefaultCoin, page_size: usize) -> Self {
        let page_size = if page_size == 0 {
            tracing::warn!(
                "invalid page_size ({}), using default ({})",
                page_size,
                DEFAULT_PAGE_SIZE
            );
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };

        Self {
            default_coin,
            page_size,
        }
    }
}

/// Connection settings of the SQLite backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteConfig {
    /// Database file, created if missing
    pub path: PathBuf,

    /// Pool size
    ///
    /// Every unit of work holds the write lock for its whole life, so extra
    /// connections wait on it rather than run in parallel.
    pub max_connections: u32,
}

impl SqliteConfig {
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 1;

    /// Create a SqliteConfig, falling back to one connection for a zero pool size
    pub fn new(path: impl Into<PathBuf>, max_connections: u32) -> Self {
        let max_connections = if max_connections == 0 {
            tracing::warn!(
                "invalid max_connections ({}), using default ({})",
                max_connections,
                Self::DEFAULT_MAX_CONNECTIONS
            );
            Self::DEFAULT_MAX_CONNECTIONS
        } else {
            max_connections
        };

        Self {
            path: path.into(),
            max_connections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::custom(25, 25)]
    #[case::one(1, 1)]
    #[case::zero_falls_back(0, DEFAULT_PAGE_SIZE)]
    fn test_ledger_config_page_size(#[case] requested: usize, #[case] expected: usize) {
        let config = LedgerConfig::new(DefaultCoin::default(), requested);
        assert_eq!(config.page_size, expected);
    }

    #[rstest]
    #[case::valid("Office Coin", "OC", "Office Coin", "OC")]
    #[case::invalid_name("x!", "OC", "Universal Coin", "OC")]
    #[case::invalid_symbol("Office Coin", "TOOLONG", "Office Coin", "μ")]
    fn test_default_coin_validation(
        #[case] name: &str,
        #[case] symbol: &str,
        #[case] expected_name: &str,
        #[case] expected_symbol: &str,
    ) {
        let coin = DefaultCoin::new(name, symbol);
        assert_eq!(coin.name, expected_name);
        assert_eq!(coin.symbol, expected_symbol);
    }

    #[test]
    fn test_sqlite_config_zero_connections_fall_back() {
        let config = SqliteConfig::new("coins.db", 0);
        assert_eq!(config.max_connections, SqliteConfig::DEFAULT_MAX_CONNECTIONS);
    }
}
