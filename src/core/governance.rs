//! Coin governance
//!
//! Creating a coin makes the creator its owner. Every later change to the coin,
//! issuing new units included, goes through the permission engine.

use crate::core::entry_store;
use crate::core::permissions;
use crate::core::registry;
use crate::core::transfer::validate_amount;
use crate::core::traits::UnitOfWork;
use crate::types::ids::{new_external_id, now_millis};
use crate::types::{
    Action, Amount, Coin, CoinKey, CoinUpdate, ExternalId, LedgerError, Message, NewCoin,
    NewTransaction, TransactionRecord, UserKey,
};

/// Create a coin owned by `creator`
///
/// The coin row, its Owner role and the creator's binding to it are written
/// through the same unit.
pub async fn create_coin<U: UnitOfWork>(
    unit: &mut U,
    creator: UserKey,
    coin: &NewCoin,
) -> Result<Coin, LedgerError> {
    let created = unit
        .insert_coin(new_external_id(), coin.name.as_str(), coin.symbol.as_str())
        .await?;
    permissions::assign_owner_role(unit, created.key, creator).await?;
    Ok(created)
}

/// Rename a coin and/or change its symbol
///
/// # Arguments
///
/// * `unit` - Unit of work the update runs in
/// * `user` - Acting user
/// * `coin_id` - External identifier of the coin
/// * `update` - Fields to change; at least one must be set
///
/// # Returns
///
/// The coin as updated
///
/// # Errors
///
/// - `InvalidArgument` if `update` carries no field
/// - `NotFound` if the coin does not exist
/// - `Unauthorized` if the user may not edit the coin's info
pub async fn update_coin<U: UnitOfWork>(
    unit: &mut U,
    user: UserKey,
    coin_id: ExternalId,
    update: &CoinUpdate,
) -> Result<Coin, LedgerError> {
    if update.is_empty() {
        return Err(LedgerError::invalid_argument(
            "update",
            "at least one of name or symbol is required",
        ));
    }

    let coin = registry::resolve_coin(unit, coin_id).await?;
    permissions::require(unit, coin.key, user, Action::EditCoinInfo).await?;

    unit.update_coin(
        coin.key,
        update.name.as_ref().map(|name| name.as_str()),
        update.symbol.as_ref().map(|symbol| symbol.as_str()),
    )
    .await?
    .ok_or_else(|| LedgerError::not_found("Coin", coin_id))
}

/// Credit newly issued units of `coin` to `recipient`
///
/// The issuance is appended to the history as a transaction without a sender.
///
/// # Errors
///
/// - `InvalidArgument` if the amount is 0 or too large
/// - `Unauthorized` if `caller` may not issue the coin
/// - `ArithmeticOverflow` if the recipient's balance would exceed the maximum
pub async fn issue<U: UnitOfWork>(
    unit: &mut U,
    caller: UserKey,
    coin: CoinKey,
    recipient: UserKey,
    amount: Amount,
    message: &Message,
) -> Result<TransactionRecord, LedgerError> {
    validate_amount(amount)?;
    permissions::require(unit, coin, caller, Action::IssueCoins).await?;

    entry_store::credit(unit, recipient, coin, amount).await?;
    unit.insert_transaction(NewTransaction {
        external_id: new_external_id(),
        sender: None,
        receiver: recipient,
        coin,
        amount,
        message: message.as_str().to_string(),
        created_at: now_millis(),
    })
    .await
}
