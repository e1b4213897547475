//! Transfer engine
//!
//! Moves an amount from one entry to another and appends the transaction
//! record, all through one unit of work. The steps run in a fixed order:
//!
//! 1. Lock and read the sender's entry; reject if it does not cover the amount
//! 2. Lock and read the receiver's entry (it may not exist yet)
//! 3. Debit the sender
//! 4. Credit the receiver, opening an entry if needed
//! 5. Append the transaction with a fresh identifier and the server time
//!
//! Nothing is visible to other units until the caller commits, and a failure at
//! any step leaves the caller with a unit it must drop.

use crate::core::entry_store;
use crate::core::traits::UnitOfWork;
use crate::types::ids::{new_external_id, now_millis};
use crate::types::{
    Amount, CoinKey, LedgerError, Message, NewTransaction, TransactionRecord, UserKey, MAX_AMOUNT,
};

/// A transfer to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOrder {
    pub coin: CoinKey,
    pub sender: UserKey,
    pub receiver: UserKey,
    pub amount: Amount,
    pub message: Message,
}

/// Reject amounts no transfer or request may carry
///
/// # Errors
///
/// Returns `InvalidArgument` for 0 or for amounts above [`MAX_AMOUNT`].
pub fn validate_amount(amount: Amount) -> Result<(), LedgerError> {
    if amount == 0 {
        return Err(LedgerError::invalid_argument("amount", "must be greater than 0"));
    }
    if amount > MAX_AMOUNT {
        return Err(LedgerError::invalid_argument(
            "amount",
            format!("must be at most {}", MAX_AMOUNT),
        ));
    }
    Ok(())
}

/// Execute a transfer inside `unit`
///
/// # Arguments
///
/// * `unit` - Unit of work the transfer runs in; the caller commits it
/// * `order` - Coin, parties, amount and message of the transfer
///
/// # Returns
///
/// * `Ok(TransactionRecord)` - The appended transaction
/// * `Err(LedgerError)` - If the transfer was rejected
///
/// # Errors
///
/// - `InvalidArgument` if the amount is 0 or too large
/// - `Conflict` if sender and receiver are the same user
/// - `InsufficientFunds` if the sender's balance does not cover the amount
/// - `ArithmeticOverflow` if the receiver's balance would exceed the maximum
pub async fn execute<U: UnitOfWork>(
    unit: &mut U,
    order: TransferOrder,
) -> Result<TransactionRecord, LedgerError> {
    validate_amount(order.amount)?;
    if order.sender == order.receiver {
        return Err(LedgerError::self_target());
    }

    let sender_entry = entry_store::get_or_imply_entry(unit, order.sender, order.coin).await?;
    entry_store::ensure_covers(sender_entry.as_ref(), order.sender, order.coin, order.amount)?;

    let receiver_entry =
        entry_store::get_or_imply_entry(unit, order.receiver, order.coin).await?;

    entry_store::debit(unit, order.sender, order.coin, sender_entry, order.amount).await?;
    entry_store::credit_or_create(unit, order.receiver, order.coin, receiver_entry, order.amount)
        .await?;

    unit.insert_transaction(NewTransaction {
        external_id: new_external_id(),
        sender: Some(order.sender),
        receiver: order.receiver,
        coin: order.coin,
        amount: order.amount,
        message: order.message.as_str().to_string(),
        created_at: now_millis(),
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entry_store::{balance_of, credit};
    use crate::core::testing::{register, TestLedger};
    use crate::core::traits::Store;
    use crate::types::DEFAULT_COIN;
    use rstest::rstest;

    fn order(sender: UserKey, receiver: UserKey, amount: Amount) -> TransferOrder {
        TransferOrder {
            coin: DEFAULT_COIN,
            sender,
            receiver,
            amount,
            message: Message::new("gift").unwrap(),
        }
    }

    #[rstest]
    #[case::zero(0)]
    #[case::above_maximum(MAX_AMOUNT + 1)]
    fn test_validate_amount_rejects(#[case] amount: Amount) {
        assert!(matches!(
            validate_amount(amount),
            Err(LedgerError::InvalidArgument { .. })
        ));
    }

    #[tokio::test]
    async fn test_transfer_moves_balance_and_records_transaction() {
        let ledger = TestLedger::new();
        let alice = register(&ledger, "alice").await;
        let bob = register(&ledger, "bob1").await;

        let mut unit = ledger.store.begin().await.unwrap();
        credit(&mut unit, alice.key, DEFAULT_COIN, 10).await.unwrap();

        let record = execute(&mut unit, order(alice.key, bob.key, 4)).await.unwrap();
        assert_eq!(record.sender, Some(alice.key));
        assert_eq!(record.receiver, Some(bob.key));
        assert_eq!(record.amount, 4);
        assert_eq!(record.message, "gift");

        assert_eq!(balance_of(&mut unit, alice.key, DEFAULT_COIN).await.unwrap(), 6);
        assert_eq!(balance_of(&mut unit, bob.key, DEFAULT_COIN).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_transfer_to_self_conflicts() {
        let ledger = TestLedger::new();
        let alice = register(&ledger, "alice").await;

        let mut unit = ledger.store.begin().await.unwrap();
        credit(&mut unit, alice.key, DEFAULT_COIN, 10).await.unwrap();

        let result = execute(&mut unit, order(alice.key, alice.key, 1)).await;
        assert_eq!(result, Err(LedgerError::self_target()));
    }

    #[tokio::test]
    async fn test_transfer_with_insufficient_funds_writes_nothing() {
        let ledger = TestLedger::new();
        let alice = register(&ledger, "alice").await;
        let bob = register(&ledger, "bob1").await;

        let mut unit = ledger.store.begin().await.unwrap();
        credit(&mut unit, alice.key, DEFAULT_COIN, 3).await.unwrap();

        let result = execute(&mut unit, order(alice.key, bob.key, 4)).await;
        assert_eq!(
            result,
            Err(LedgerError::insufficient_funds(alice.key, DEFAULT_COIN, 3, 4))
        );
        assert_eq!(balance_of(&mut unit, alice.key, DEFAULT_COIN).await.unwrap(), 3);
        assert_eq!(balance_of(&mut unit, bob.key, DEFAULT_COIN).await.unwrap(), 0);
        assert!(unit
            .transactions_for_user(alice.key, None, 10)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_transfer_opens_receiver_entry_in_new_coin() {
        let ledger = TestLedger::new();
        let alice = register(&ledger, "alice").await;
        let bob = register(&ledger, "bob1").await;
        let coin = ledger.coin(&alice, "Second Coin").await;

        let mut unit = ledger.store.begin().await.unwrap();
        credit(&mut unit, alice.key, coin.key, 5).await.unwrap();
        assert_eq!(unit.entry_for_update(bob.key, coin.key).await.unwrap(), None);

        let mut transfer = order(alice.key, bob.key, 5);
        transfer.coin = coin.key;
        execute(&mut unit, transfer).await.unwrap();

        assert_eq!(balance_of(&mut unit, alice.key, coin.key).await.unwrap(), 0);
        assert_eq!(balance_of(&mut unit, bob.key, coin.key).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_transfer_overflowing_receiver_is_rejected() {
        let ledger = TestLedger::new();
        let alice = register(&ledger, "alice").await;
        let bob = register(&ledger, "bob1").await;

        let mut unit = ledger.store.begin().await.unwrap();
        credit(&mut unit, alice.key, DEFAULT_COIN, 1).await.unwrap();
        credit(&mut unit, bob.key, DEFAULT_COIN, MAX_AMOUNT).await.unwrap();

        let result = execute(&mut unit, order(alice.key, bob.key, 1)).await;
        assert_eq!(result, Err(LedgerError::arithmetic_overflow("credit", bob.key)));
    }
}
