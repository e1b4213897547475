//! Transaction types
//!
//! A transaction is the immutable record of one completed transfer. Records are
//! append-only; the store assigns monotonically increasing keys, which double as
//! the pagination cursor for history listings.

use super::ids::{Amount, CoinKey, ExternalId, TransactionKey, UserKey};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A completed transfer as stored
///
/// Sender and receiver are soft references: a record stays readable even if
/// the user it points to has since been removed, in which case the field is
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    /// Internal key, also the pagination cursor
    pub key: TransactionKey,

    /// Caller-facing identifier
    pub external_id: ExternalId,

    /// User whose entry was debited
    pub sender: Option<UserKey>,

    /// User whose entry was credited
    pub receiver: Option<UserKey>,

    /// Coin that moved
    pub coin: CoinKey,

    /// Amount moved; always positive
    pub amount: Amount,

    /// Free-text message (0-64 characters)
    pub message: String,

    /// Server time of the transfer, millisecond precision
    pub created_at: DateTime<Utc>,
}

/// A transaction about to be appended
///
/// The engine fills in the identifier and the timestamp; the store only
/// assigns the key. Issued coins have no sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub external_id: ExternalId,
    pub sender: Option<UserKey>,
    pub receiver: UserKey,
    pub coin: CoinKey,
    pub amount: Amount,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl NewTransaction {
    /// Attach the store-assigned key, producing the stored record
    pub fn into_record(self, key: TransactionKey) -> TransactionRecord {
        TransactionRecord {
            key,
            external_id: self.external_id,
            sender: self.sender,
            receiver: Some(self.receiver),
            coin: self.coin,
            amount: self.amount,
            message: self.message,
            created_at: self.created_at,
        }
    }
}
