//! Entry (balance) types
//!
//! An entry is the balance a user holds in one coin. There is at most one entry
//! per (user, coin) pair; a missing entry means a balance of zero.

use super::ids::{Amount, CoinKey, EntryKey, ExternalId, UserKey};
use serde::Serialize;

/// Balance record of one user in one coin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Internal key
    pub key: EntryKey,

    /// Owner of the balance
    pub user: UserKey,

    /// Coin the balance is denominated in
    pub coin: CoinKey,

    /// Current balance; never negative
    pub amount: Amount,
}

/// An entry joined with its coin, as listed to the owning user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Holding {
    /// Internal key of the coin
    pub coin_key: CoinKey,

    /// External identifier of the coin
    pub coin_id: ExternalId,

    /// Coin display name
    pub name: String,

    /// Coin symbol
    pub symbol: String,

    /// Balance held
    pub amount: Amount,
}
