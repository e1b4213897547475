//! Charge request types
//!
//! A request asks `sender` to pay `requester`. It is pending from creation until
//! the sender accepts it (which produces exactly one transaction) or declines it.
//! Both outcomes delete the request, so a resolved request is simply absent.

use super::ids::{Amount, CoinKey, ExternalId, RequestKey, UserKey};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A pending charge request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestRecord {
    /// Internal key, also the pagination cursor
    pub key: RequestKey,

    /// Caller-facing identifier used to accept or decline
    pub external_id: ExternalId,

    /// User who will receive the amount
    pub requester: UserKey,

    /// User asked to pay
    pub sender: UserKey,

    pub coin: CoinKey,

    /// Requested amount; always positive
    pub amount: Amount,

    pub message: String,

    pub created_at: DateTime<Utc>,
}

/// A request about to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRequest {
    pub external_id: ExternalId,
    pub requester: UserKey,
    pub sender: UserKey,
    pub coin: CoinKey,
    pub amount: Amount,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl NewRequest {
    /// Attach the store-assigned key, producing the stored record
    pub fn into_record(self, key: RequestKey) -> RequestRecord {
        RequestRecord {
            key,
            external_id: self.external_id,
            requester: self.requester,
            sender: self.sender,
            coin: self.coin,
            amount: self.amount,
            message: self.message,
            created_at: self.created_at,
        }
    }
}
