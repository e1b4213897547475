//! Identity and coin registry
//!
//! Maps caller-facing identifiers to internal keys. Lookups that miss are
//! `NotFound`; nothing here writes except [`register_user`].

use crate::core::traits::UnitOfWork;
use crate::types::{
    Coin, ExternalId, LedgerError, User, UserName, DEFAULT_COIN, MAX_SEARCH_TERM_LEN,
};

/// Number of users returned by a name search
pub const USER_SEARCH_LIMIT: usize = 10;

/// Create a user together with its zero balance in the default coin
///
/// Both rows are written through the same unit, so a user never exists
/// without a default-coin entry.
///
/// # Errors
///
/// Returns `Conflict` if the account identifier is already registered.
pub async fn register_user<U: UnitOfWork>(
    unit: &mut U,
    account_id: ExternalId,
    name: &UserName,
) -> Result<User, LedgerError> {
    let user = unit.insert_user(account_id, name.as_str()).await?;
    unit.insert_entry(user.key, DEFAULT_COIN, 0).await?;
    Ok(user)
}

/// Resolve an account identifier to its user
pub async fn resolve_user<U: UnitOfWork>(
    unit: &mut U,
    account_id: ExternalId,
) -> Result<User, LedgerError> {
    unit.user_by_account_id(account_id)
        .await?
        .ok_or_else(|| LedgerError::not_found("User", account_id))
}

/// Resolve a coin external identifier to its coin
pub async fn resolve_coin<U: UnitOfWork>(
    unit: &mut U,
    external_id: ExternalId,
) -> Result<Coin, LedgerError> {
    unit.coin_by_external_id(external_id)
        .await?
        .ok_or_else(|| LedgerError::not_found("Coin", external_id))
}

/// Users whose name starts with `term`
///
/// # Errors
///
/// Returns `InvalidArgument` for an empty term or one longer than 50 characters.
pub async fn search_users<U: UnitOfWork>(unit: &mut U, term: &str) -> Result<Vec<User>, LedgerError> {
    let len = term.chars().count();
    if len == 0 || len > MAX_SEARCH_TERM_LEN {
        return Err(LedgerError::invalid_argument(
            "search term",
            format!("must be between 1 and {} characters", MAX_SEARCH_TERM_LEN),
        ));
    }
    unit.users_by_name_prefix(term, USER_SEARCH_LIMIT).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entry_store::balance_of;
    use crate::core::traits::Store;
    use crate::store::MemoryStore;
    use crate::types::ids::new_external_id;

    fn name(value: &str) -> UserName {
        UserName::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_register_user_opens_default_coin_entry() {
        let store = MemoryStore::default();
        let mut unit = store.begin().await.unwrap();

        let user = register_user(&mut unit, new_external_id(), &name("alice"))
            .await
            .unwrap();
        let entry = unit.entry_for_update(user.key, DEFAULT_COIN).await.unwrap();
        assert_eq!(entry.map(|e| e.amount), Some(0));
        assert_eq!(balance_of(&mut unit, user.key, DEFAULT_COIN).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_register_user_twice_conflicts() {
        let store = MemoryStore::default();
        let mut unit = store.begin().await.unwrap();
        let account_id = new_external_id();

        register_user(&mut unit, account_id, &name("alice")).await.unwrap();
        let result = register_user(&mut unit, account_id, &name("alice")).await;
        assert!(matches!(result, Err(LedgerError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_resolution_misses_are_not_found() {
        let store = MemoryStore::default();
        let mut unit = store.begin().await.unwrap();
        let unknown = new_external_id();

        assert_eq!(
            resolve_user(&mut unit, unknown).await,
            Err(LedgerError::not_found("User", unknown))
        );
        assert_eq!(
            resolve_coin(&mut unit, unknown).await,
            Err(LedgerError::not_found("Coin", unknown))
        );
    }

    #[tokio::test]
    async fn test_search_users_by_prefix() {
        let store = MemoryStore::default();
        let mut unit = store.begin().await.unwrap();
        for user in ["alice", "alina", "bob_", "Albert"] {
            register_user(&mut unit, new_external_id(), &name(user))
                .await
                .unwrap();
        }

        let names: Vec<String> = search_users(&mut unit, "al")
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["alina", "alice", "Albert"]);
    }

    #[tokio::test]
    async fn test_search_users_rejects_empty_term() {
        let store = MemoryStore::default();
        let mut unit = store.begin().await.unwrap();
        assert!(search_users(&mut unit, "").await.is_err());
    }
}
