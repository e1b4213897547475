//! Request workflow
//!
//! A request is created pending and ends in one of two ways, both of which
//! delete it:
//!
//! ```text
//! Pending ──accept──▶ (transfer sender → requester, then delete)
//!    │
//!    └────decline───▶ (delete)
//! ```
//!
//! Only the request's sender may resolve it. Anyone else gets `NotFound`, the
//! same answer as for a request that never existed or was already resolved.

use crate::core::transfer::{self, validate_amount, TransferOrder};
use crate::core::traits::UnitOfWork;
use crate::types::ids::{new_external_id, now_millis};
use crate::types::{
    Amount, CoinKey, ExternalId, LedgerError, Message, NewRequest, RequestRecord,
    TransactionRecord, UserKey,
};

/// A charge request to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeOrder {
    pub coin: CoinKey,
    /// User who will receive the amount
    pub requester: UserKey,
    /// User asked to pay
    pub sender: UserKey,
    pub amount: Amount,
    pub message: Message,
}

/// Store a pending request; no entry is touched
///
/// # Errors
///
/// - `InvalidArgument` if the amount is 0 or too large
/// - `Conflict` if requester and sender are the same user
pub async fn create<U: UnitOfWork>(
    unit: &mut U,
    order: ChargeOrder,
) -> Result<RequestRecord, LedgerError> {
    validate_amount(order.amount)?;
    if order.requester == order.sender {
        return Err(LedgerError::self_target());
    }

    unit.insert_request(NewRequest {
        external_id: new_external_id(),
        requester: order.requester,
        sender: order.sender,
        coin: order.coin,
        amount: order.amount,
        message: order.message.as_str().to_string(),
        created_at: now_millis(),
    })
    .await
}

/// Lock a request that `acting_user` may resolve
async fn claim<U: UnitOfWork>(
    unit: &mut U,
    request_id: ExternalId,
    acting_user: UserKey,
) -> Result<RequestRecord, LedgerError> {
    unit.request_for_update(request_id)
        .await?
        .filter(|request| request.sender == acting_user)
        .ok_or_else(|| LedgerError::not_found("Request", request_id))
}

/// Pay a request: transfer from its sender to its requester, then delete it
///
/// The transfer and the delete share `unit`; if the transfer fails the request
/// stays pending once the unit is dropped.
///
/// # Errors
///
/// - `NotFound` if the request does not exist or `acting_user` is not its sender
/// - any error of [`transfer::execute`], `InsufficientFunds` in particular
pub async fn accept<U: UnitOfWork>(
    unit: &mut U,
    request_id: ExternalId,
    acting_user: UserKey,
) -> Result<TransactionRecord, LedgerError> {
    let request = claim(unit, request_id, acting_user).await?;

    let record = transfer::execute(
        unit,
        TransferOrder {
            coin: request.coin,
            sender: request.sender,
            receiver: request.requester,
            amount: request.amount,
            message: Message::new(request.message)?,
        },
    )
    .await?;

    if !unit.delete_request(request.key).await? {
        return Err(LedgerError::not_found("Request", request_id));
    }
    Ok(record)
}

/// Refuse a request: delete it without any transfer
///
/// # Returns
///
/// The request as it was before deletion
///
/// # Errors
///
/// Returns `NotFound` if the request does not exist or `acting_user` is not its sender.
pub async fn decline<U: UnitOfWork>(
    unit: &mut U,
    request_id: ExternalId,
    acting_user: UserKey,
) -> Result<RequestRecord, LedgerError> {
    let request = claim(unit, request_id, acting_user).await?;

    if !unit.delete_request(request.key).await? {
        return Err(LedgerError::not_found("Request", request_id));
    }
    Ok(request)
}
