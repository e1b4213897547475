//! Entry store
//!
//! The only place balances change. Every function here works on rows the
//! caller has already read through [`UnitOfWork::entry_for_update`], so the
//! balance it checks is the balance it writes over.
//!
//! Balances are never clamped: a debit that does not fit fails, a credit that
//! would exceed [`MAX_AMOUNT`] fails, and in both cases nothing is written.

use crate::core::traits::UnitOfWork;
use crate::types::{Amount, CoinKey, Entry, LedgerError, UserKey, MAX_AMOUNT};

/// Lock and read the entry of a user in a coin
///
/// # Returns
///
/// `None` if the user holds no entry in the coin, which means a balance of 0
pub async fn get_or_imply_entry<U: UnitOfWork>(
    unit: &mut U,
    user: UserKey,
    coin: CoinKey,
) -> Result<Option<Entry>, LedgerError> {
    unit.entry_for_update(user, coin).await
}

/// Balance of a user in a coin, 0 when there is no entry
pub async fn balance_of<U: UnitOfWork>(
    unit: &mut U,
    user: UserKey,
    coin: CoinKey,
) -> Result<Amount, LedgerError> {
    Ok(get_or_imply_entry(unit, user, coin)
        .await?
        .map_or(0, |entry| entry.amount))
}

/// Check that an entry read under lock covers `amount`
///
/// # Errors
///
/// Returns `InsufficientFunds` if the entry is absent or holds less than `amount`
pub fn ensure_covers(
    entry: Option<&Entry>,
    user: UserKey,
    coin: CoinKey,
    amount: Amount,
) -> Result<(), LedgerError> {
    let available = entry.map_or(0, |entry| entry.amount);
    if available < amount {
        return Err(LedgerError::insufficient_funds(user, coin, available, amount));
    }
    Ok(())
}

/// Subtract `amount` from an entry read under lock
///
/// # Arguments
///
/// * `unit` - Unit of work the entry was read in
/// * `user` - Owner of the entry, for error reporting
/// * `coin` - Coin of the entry, for error reporting
/// * `entry` - The locked entry, `None` if the user holds none
/// * `amount` - Amount to subtract
///
/// # Returns
///
/// * `Ok(Entry)` - The entry with its new balance
/// * `Err(LedgerError::InsufficientFunds)` - If the balance does not cover `amount`
pub async fn debit<U: UnitOfWork>(
    unit: &mut U,
    user: UserKey,
    coin: CoinKey,
    entry: Option<Entry>,
    amount: Amount,
) -> Result<Entry, LedgerError> {
    ensure_covers(entry.as_ref(), user, coin, amount)?;

    let mut entry = entry
        .ok_or_else(|| LedgerError::insufficient_funds(user, coin, 0, amount))?;
    entry.amount -= amount;

    unit.set_entry_amount(entry.key, entry.amount).await?;
    Ok(entry)
}

/// Add `amount` to an entry read under lock, creating the entry if absent
///
/// A new entry is opened with `amount` as its balance.
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if the new balance would exceed [`MAX_AMOUNT`]
pub async fn credit_or_create<U: UnitOfWork>(
    unit: &mut U,
    user: UserKey,
    coin: CoinKey,
    entry: Option<Entry>,
    amount: Amount,
) -> Result<Entry, LedgerError> {
    match entry {
        Some(mut entry) => {
            let new_amount = entry
                .amount
                .checked_add(amount)
                .filter(|total| *total <= MAX_AMOUNT)
                .ok_or_else(|| LedgerError::arithmetic_overflow("credit", user))?;

            unit.set_entry_amount(entry.key, new_amount).await?;
            entry.amount = new_amount;
            Ok(entry)
        }
        None => {
            if amount > MAX_AMOUNT {
                return Err(LedgerError::arithmetic_overflow("credit", user));
            }
            unit.insert_entry(user, coin, amount).await
        }
    }
}

/// Lock the entry of a user and credit it
///
/// Used where balance enters the ledger without a matching debit, such as
/// funding a freshly created coin.
pub async fn credit<U: UnitOfWork>(
    unit: &mut U,
    user: UserKey,
    coin: CoinKey,
    amount: Amount,
) -> Result<Entry, LedgerError> {
    let entry = get_or_imply_entry(unit, user, coin).await?;
    credit_or_create(unit, user, coin, entry, amount).await
}
