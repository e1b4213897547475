//! Transaction and request history
//!
//! Listings are newest first and paged by a descending numeric cursor: a page
//! holds the items with key at or below the cursor, and carries the key the
//! next page starts at. Each page is fetched with one extra row to learn
//! whether another page exists.

use crate::core::traits::UnitOfWork;
use crate::types::{
    ExternalId, LedgerError, Page, RequestRecord, TransactionRecord, UserKey,
};

fn validate_cursor(cursor: Option<i64>) -> Result<(), LedgerError> {
    match cursor {
        Some(value) if value <= 0 => Err(LedgerError::invalid_argument(
            "cursor",
            "must be greater than 0",
        )),
        _ => Ok(()),
    }
}

/// Transactions `user` sent or received
///
/// # Arguments
///
/// * `cursor` - Key of the newest transaction to include; `None` starts at the newest
/// * `page_size` - Maximum number of items in the page
pub async fn search_transactions<U: UnitOfWork>(
    unit: &mut U,
    user: UserKey,
    cursor: Option<i64>,
    page_size: usize,
) -> Result<Page<TransactionRecord>, LedgerError> {
    validate_cursor(cursor)?;
    let rows = unit
        .transactions_for_user(user, cursor, page_size.saturating_add(1))
        .await?;
    Ok(Page::from_overfetch(rows, page_size, |t| t.key))
}

/// Pending requests where `user` is the sender or the requester
pub async fn search_requests<U: UnitOfWork>(
    unit: &mut U,
    user: UserKey,
    cursor: Option<i64>,
    page_size: usize,
) -> Result<Page<RequestRecord>, LedgerError> {
    validate_cursor(cursor)?;
    let rows = unit
        .requests_for_user(user, cursor, page_size.saturating_add(1))
        .await?;
    Ok(Page::from_overfetch(rows, page_size, |r| r.key))
}

/// One transaction, visible only to its sender and receiver
///
/// Anyone else gets `NotFound`, as for a transaction that does not exist.
pub async fn get_transaction<U: UnitOfWork>(
    unit: &mut U,
    user: UserKey,
    transaction_id: ExternalId,
) -> Result<TransactionRecord, LedgerError> {
    unit.transaction(transaction_id)
        .await?
        .filter(|t| t.sender == Some(user) || t.receiver == Some(user))
        .ok_or_else(|| LedgerError::not_found("Transaction", transaction_id))
}
