//! Combined transfer/charge submission
//!
//! Clients post one form for both directions of payment: with `charging` unset
//! the caller pays `target`, with it set the caller asks `target` to pay.

use super::coin::Message;
use super::ids::{Amount, ExternalId};
use super::request::RequestRecord;
use super::transaction::TransactionRecord;
use serde::Serialize;

/// A payment or a charge request aimed at another user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Account identifier of the other party
    pub target: ExternalId,

    /// External identifier of the coin
    pub coin: ExternalId,

    pub amount: Amount,

    pub message: Message,

    /// Ask `target` to pay instead of paying `target`
    pub charging: bool,
}

/// Outcome of a [`Submission`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Submitted {
    /// The transfer was executed
    Transferred(TransactionRecord),
    /// A charge request is now pending
    Requested(RequestRecord),
}
