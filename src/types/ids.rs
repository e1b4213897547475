//! Identifier and quantity types shared by every component
//!
//! Internal keys are the numeric row keys of the backing store. They never leave
//! the process boundary on their own; callers address users, coins, requests and
//! transactions through [`ExternalId`]s.

use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

/// Internal key of a user row
pub type UserKey = i64;

/// Internal key of a coin row
pub type CoinKey = i64;

/// Internal key of an entry (balance) row
pub type EntryKey = i64;

/// Internal key of a transaction row
///
/// Transaction keys increase monotonically and double as the pagination cursor.
pub type TransactionKey = i64;

/// Internal key of a request row
pub type RequestKey = i64;

/// Internal key of a role row
pub type RoleKey = i64;

/// Stable, caller-facing identifier, distinct from the storage keys
pub type ExternalId = Uuid;

/// Whole units of a coin
///
/// Balances are non-negative integers; there is no fractional unit.
pub type Amount = u64;

/// Largest balance any backend can hold
///
/// The relational backend stores amounts as signed 64-bit integers.
pub const MAX_AMOUNT: Amount = i64::MAX as Amount;

/// Key of the default coin, pre-seeded in every store
pub const DEFAULT_COIN: CoinKey = 1;

/// Generate a fresh external identifier
pub fn new_external_id() -> ExternalId {
    Uuid::new_v4()
}

/// Current server time truncated to millisecond precision
///
/// Every backend stores timestamps as epoch milliseconds, so records carry
/// exactly the precision they will be read back with.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_now_millis_has_no_sub_millisecond_component() {
        let now = now_millis();
        assert_eq!(now.nanosecond() % 1_000_000, 0);
    }

    #[test]
    fn test_new_external_ids_are_unique() {
        assert_ne!(new_external_id(), new_external_id());
    }

    #[test]
    fn test_max_amount_fits_signed_storage() {
        assert_eq!(i64::try_from(MAX_AMOUNT), Ok(i64::MAX));
    }
}
