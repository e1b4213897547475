//! In-memory store
//!
//! All tables live behind one async mutex. A unit of work holds the owned guard
//! for its whole lifetime, so units run one at a time and every read inside a
//! unit is effectively "for update". The first write of a unit snapshots the
//! tables; dropping the unit without committing restores that snapshot.

use crate::config::DefaultCoin;
use crate::core::traits::{Store, UnitOfWork};
use crate::types::{
    Action, Amount, Coin, CoinKey, Entry, EntryKey, ExternalId, Holding, Level, LedgerError,
    NewRequest, NewTransaction, RequestKey, RequestRecord, Role, RoleKey, TransactionKey,
    TransactionRecord, User, UserKey, UserRole, DEFAULT_COIN, MAX_AMOUNT, OWNER_LEVEL,
    OWNER_ROLE_NAME,
};
use crate::types::ids::new_external_id;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Last key handed out per table
#[derive(Debug, Clone, Default)]
struct Sequences {
    users: i64,
    coins: i64,
    entries: i64,
    transactions: i64,
    requests: i64,
    roles: i64,
    user_roles: i64,
}

fn next_key(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<UserKey, User>,
    coins: BTreeMap<CoinKey, Coin>,
    entries: BTreeMap<EntryKey, Entry>,
    /// One entry per (user, coin)
    entry_index: HashMap<(UserKey, CoinKey), EntryKey>,
    transactions: BTreeMap<TransactionKey, TransactionRecord>,
    requests: BTreeMap<RequestKey, RequestRecord>,
    roles: BTreeMap<RoleKey, Role>,
    user_roles: BTreeMap<i64, UserRole>,
    permissions: HashMap<(CoinKey, Action), Level>,
    sequences: Sequences,
}

impl Tables {
    /// Fresh tables holding only the default coin and its Owner role
    fn seeded(default_coin: &DefaultCoin) -> Self {
        let mut tables = Tables::default();

        let coin_key = next_key(&mut tables.sequences.coins);
        debug_assert_eq!(coin_key, DEFAULT_COIN);
        tables.coins.insert(
            coin_key,
            Coin {
                key: coin_key,
                external_id: new_external_id(),
                name: default_coin.name.clone(),
                symbol: default_coin.symbol.clone(),
            },
        );

        let role_key = next_key(&mut tables.sequences.roles);
        tables.roles.insert(
            role_key,
            Role {
                key: role_key,
                coin: coin_key,
                name: OWNER_ROLE_NAME.to_string(),
                level: OWNER_LEVEL,
            },
        );

        tables
    }
}

/// Store keeping every table in process memory
#[derive(Debug, Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Create a store seeded with the default coin
    pub fn new(default_coin: &DefaultCoin) -> Self {
        MemoryStore {
            tables: Arc::new(Mutex::new(Tables::seeded(default_coin))),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new(&DefaultCoin::default())
    }
}

#[async_trait]
impl Store for MemoryStore {
    type Unit = MemoryUnit;

    async fn begin(&self) -> Result<MemoryUnit, LedgerError> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        tracing::debug!("memory unit of work started");
        Ok(MemoryUnit {
            guard,
            snapshot: None,
        })
    }
}

/// Exclusive unit of work over the in-memory tables
pub struct MemoryUnit {
    guard: OwnedMutexGuard<Tables>,
    /// Tables as they were before the first write of this unit
    snapshot: Option<Tables>,
}

impl MemoryUnit {
    fn read(&self) -> &Tables {
        &self.guard
    }

    fn write(&mut self) -> &mut Tables {
        if self.snapshot.is_none() {
            self.snapshot = Some((*self.guard).clone());
        }
        &mut self.guard
    }
}

impl Drop for MemoryUnit {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.guard = snapshot;
            tracing::debug!("memory unit of work rolled back");
        }
    }
}

fn check_amount(amount: Amount) -> Result<(), LedgerError> {
    if amount > MAX_AMOUNT {
        return Err(LedgerError::invalid_argument(
            "amount",
            format!("must be at most {}", MAX_AMOUNT),
        ));
    }
    Ok(())
}

/// Keep at most `limit` rows with key at or below the cursor, newest first
fn newest_first<'a, T: Clone + 'a>(
    rows: impl DoubleEndedIterator<Item = (&'a i64, &'a T)>,
    at_or_before: Option<i64>,
    limit: usize,
    visible: impl Fn(&T) -> bool,
) -> Vec<T> {
    let cursor = at_or_before.unwrap_or(i64::MAX);
    rows.rev()
        .filter(|(key, row)| **key <= cursor && visible(*row))
        .take(limit)
        .map(|(_, row)| row.clone())
        .collect()
}

#[async_trait]
impl UnitOfWork for MemoryUnit {
    async fn insert_user(
        &mut self,
        account_id: ExternalId,
        name: &str,
    ) -> Result<User, LedgerError> {
        let tables = self.write();
        if tables.users.values().any(|u| u.account_id == account_id) {
            return Err(LedgerError::conflict(format!(
                "account {} is already registered",
                account_id
            )));
        }

        let key = next_key(&mut tables.sequences.users);
        let user = User {
            key,
            account_id,
            name: name.to_string(),
        };
        tables.users.insert(key, user.clone());
        Ok(user)
    }

    async fn user_by_account_id(
        &mut self,
        account_id: ExternalId,
    ) -> Result<Option<User>, LedgerError> {
        Ok(self
            .read()
            .users
            .values()
            .find(|u| u.account_id == account_id)
            .cloned())
    }

    async fn users_by_name_prefix(
        &mut self,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<User>, LedgerError> {
        let prefix = prefix.to_ascii_lowercase();
        let mut users: Vec<User> = self
            .read()
            .users
            .values()
            .filter(|u| u.name.to_ascii_lowercase().starts_with(&prefix))
            .cloned()
            .collect();
        users.sort_by(|a, b| b.name.cmp(&a.name));
        users.truncate(limit);
        Ok(users)
    }

    async fn insert_coin(
        &mut self,
        external_id: ExternalId,
        name: &str,
        symbol: &str,
    ) -> Result<Coin, LedgerError> {
        let tables = self.write();
        let key = next_key(&mut tables.sequences.coins);
        let coin = Coin {
            key,
            external_id,
            name: name.to_string(),
            symbol: symbol.to_string(),
        };
        tables.coins.insert(key, coin.clone());
        Ok(coin)
    }

    async fn coin(&mut self, key: CoinKey) -> Result<Option<Coin>, LedgerError> {
        Ok(self.read().coins.get(&key).cloned())
    }

    async fn coin_by_external_id(
        &mut self,
        external_id: ExternalId,
    ) -> Result<Option<Coin>, LedgerError> {
        Ok(self
            .read()
            .coins
            .values()
            .find(|c| c.external_id == external_id)
            .cloned())
    }

    async fn update_coin(
        &mut self,
        key: CoinKey,
        name: Option<&str>,
        symbol: Option<&str>,
    ) -> Result<Option<Coin>, LedgerError> {
        if !self.read().coins.contains_key(&key) {
            return Ok(None);
        }

        let tables = self.write();
        let Some(coin) = tables.coins.get_mut(&key) else {
            return Ok(None);
        };
        if let Some(name) = name {
            coin.name = name.to_string();
        }
        if let Some(symbol) = symbol {
            coin.symbol = symbol.to_string();
        }
        Ok(Some(coin.clone()))
    }

    async fn entry_for_update(
        &mut self,
        user: UserKey,
        coin: CoinKey,
    ) -> Result<Option<Entry>, LedgerError> {
        let tables = self.read();
        Ok(tables
            .entry_index
            .get(&(user, coin))
            .and_then(|key| tables.entries.get(key))
            .cloned())
    }

    async fn insert_entry(
        &mut self,
        user: UserKey,
        coin: CoinKey,
        amount: Amount,
    ) -> Result<Entry, LedgerError> {
        check_amount(amount)?;
        let tables = self.read();
        if tables.entry_index.contains_key(&(user, coin)) {
            return Err(LedgerError::conflict(format!(
                "user {} already holds an entry in coin {}",
                user, coin
            )));
        }
        if !tables.users.contains_key(&user) {
            return Err(LedgerError::not_found("User", user));
        }
        if !tables.coins.contains_key(&coin) {
            return Err(LedgerError::not_found("Coin", coin));
        }

        let tables = self.write();
        let key = next_key(&mut tables.sequences.entries);
        let entry = Entry {
            key,
            user,
            coin,
            amount,
        };
        tables.entries.insert(key, entry.clone());
        tables.entry_index.insert((user, coin), key);
        Ok(entry)
    }

    async fn set_entry_amount(
        &mut self,
        key: EntryKey,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        check_amount(amount)?;
        if !self.read().entries.contains_key(&key) {
            return Err(LedgerError::not_found("Entry", key));
        }

        if let Some(entry) = self.write().entries.get_mut(&key) {
            entry.amount = amount;
        }
        Ok(())
    }

    async fn holdings(&mut self, user: UserKey) -> Result<Vec<Holding>, LedgerError> {
        let tables = self.read();
        let mut holdings: Vec<Holding> = tables
            .entries
            .values()
            .filter(|entry| entry.user == user)
            .filter_map(|entry| {
                tables.coins.get(&entry.coin).map(|coin| Holding {
                    coin_key: coin.key,
                    coin_id: coin.external_id,
                    name: coin.name.clone(),
                    symbol: coin.symbol.clone(),
                    amount: entry.amount,
                })
            })
            .collect();
        holdings.sort_by_key(|holding| holding.coin_key);
        Ok(holdings)
    }

    async fn insert_transaction(
        &mut self,
        transaction: NewTransaction,
    ) -> Result<TransactionRecord, LedgerError> {
        let tables = self.write();
        let key = next_key(&mut tables.sequences.transactions);
        let record = transaction.into_record(key);
        tables.transactions.insert(key, record.clone());
        Ok(record)
    }

    async fn transaction(
        &mut self,
        external_id: ExternalId,
    ) -> Result<Option<TransactionRecord>, LedgerError> {
        Ok(self
            .read()
            .transactions
            .values()
            .find(|t| t.external_id == external_id)
            .cloned())
    }

    async fn transactions_for_user(
        &mut self,
        user: UserKey,
        at_or_before: Option<TransactionKey>,
        limit: usize,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        Ok(newest_first(
            self.read().transactions.iter(),
            at_or_before,
            limit,
            |t| t.sender == Some(user) || t.receiver == Some(user),
        ))
    }

    async fn insert_request(&mut self, request: NewRequest) -> Result<RequestRecord, LedgerError> {
        let tables = self.write();
        let key = next_key(&mut tables.sequences.requests);
        let record = request.into_record(key);
        tables.requests.insert(key, record.clone());
        Ok(record)
    }

    async fn request_for_update(
        &mut self,
        external_id: ExternalId,
    ) -> Result<Option<RequestRecord>, LedgerError> {
        Ok(self
            .read()
            .requests
            .values()
            .find(|r| r.external_id == external_id)
            .cloned())
    }

    async fn delete_request(&mut self, key: RequestKey) -> Result<bool, LedgerError> {
        if !self.read().requests.contains_key(&key) {
            return Ok(false);
        }
        Ok(self.write().requests.remove(&key).is_some())
    }

    async fn requests_for_user(
        &mut self,
        user: UserKey,
        at_or_before: Option<RequestKey>,
        limit: usize,
    ) -> Result<Vec<RequestRecord>, LedgerError> {
        Ok(newest_first(
            self.read().requests.iter(),
            at_or_before,
            limit,
            |r| r.sender == user || r.requester == user,
        ))
    }

    async fn insert_role(
        &mut self,
        coin: CoinKey,
        name: &str,
        level: Level,
    ) -> Result<Role, LedgerError> {
        if !self.read().coins.contains_key(&coin) {
            return Err(LedgerError::not_found("Coin", coin));
        }

        let tables = self.write();
        let key = next_key(&mut tables.sequences.roles);
        let role = Role {
            key,
            coin,
            name: name.to_string(),
            level,
        };
        tables.roles.insert(key, role.clone());
        Ok(role)
    }

    async fn role(&mut self, key: RoleKey) -> Result<Option<Role>, LedgerError> {
        Ok(self.read().roles.get(&key).cloned())
    }

    async fn insert_user_role(
        &mut self,
        user: UserKey,
        role: RoleKey,
    ) -> Result<UserRole, LedgerError> {
        let tables = self.read();
        if !tables.users.contains_key(&user) {
            return Err(LedgerError::not_found("User", user));
        }
        if !tables.roles.contains_key(&role) {
            return Err(LedgerError::not_found("Role", role));
        }

        let tables = self.write();
        let key = next_key(&mut tables.sequences.user_roles);
        let user_role = UserRole { key, user, role };
        tables.user_roles.insert(key, user_role.clone());
        Ok(user_role)
    }

    async fn roles_of_user(
        &mut self,
        user: UserKey,
        coin: Option<CoinKey>,
    ) -> Result<Vec<Role>, LedgerError> {
        let tables = self.read();
        let mut roles: Vec<Role> = tables
            .user_roles
            .values()
            .filter(|binding| binding.user == user)
            .filter_map(|binding| tables.roles.get(&binding.role))
            .filter(|role| coin.map_or(true, |coin| role.coin == coin))
            .cloned()
            .collect();
        roles.sort_by_key(|role| role.key);
        roles.dedup_by_key(|role| role.key);
        Ok(roles)
    }

    async fn permission(
        &mut self,
        coin: CoinKey,
        action: Action,
    ) -> Result<Option<Level>, LedgerError> {
        Ok(self.read().permissions.get(&(coin, action)).copied())
    }

    async fn upsert_permission(
        &mut self,
        coin: CoinKey,
        action: Action,
        level: Level,
    ) -> Result<(), LedgerError> {
        if !self.read().coins.contains_key(&coin) {
            return Err(LedgerError::not_found("Coin", coin));
        }
        self.write().permissions.insert((coin, action), level);
        Ok(())
    }

    async fn commit(mut self) -> Result<(), LedgerError> {
        self.snapshot = None;
        tracing::debug!("memory unit of work committed");
        Ok(())
    }
}
