//! Core traits for the backing store
//!
//! The engine never talks to a database directly. It asks a [`Store`] for a
//! [`UnitOfWork`], performs every read and write of one operation through that
//! unit, and commits it. A unit that is dropped without `commit` rolls back, so
//! an early `?` return or a cancelled future leaves no partial effect.
//!
//! Methods named `*_for_update` take the row lock before reading, so that the
//! value read cannot change before the unit commits.

use crate::types::{
    Action, Amount, Coin, CoinKey, Entry, EntryKey, ExternalId, Holding, Level, LedgerError,
    NewRequest, NewTransaction, RequestKey, RequestRecord, Role, RoleKey, TransactionKey,
    TransactionRecord, User, UserKey, UserRole,
};
use async_trait::async_trait;

/// A transactional backing store
///
/// Implementations are cheap handles; clone them freely across tasks.
#[async_trait]
pub trait Store: Clone + Send + Sync + 'static {
    /// Unit of work type handed out by [`Store::begin`]
    type Unit: UnitOfWork;

    /// Open a new unit of work
    async fn begin(&self) -> Result<Self::Unit, LedgerError>;
}

/// One atomic unit of reads and writes
#[async_trait]
pub trait UnitOfWork: Send {
    // Users

    /// Insert a user and return it with its new key
    async fn insert_user(&mut self, account_id: ExternalId, name: &str)
        -> Result<User, LedgerError>;

    /// Look up a user by account identifier
    async fn user_by_account_id(
        &mut self,
        account_id: ExternalId,
    ) -> Result<Option<User>, LedgerError>;

    /// Users whose name starts with `prefix` (ASCII case-insensitive), by
    /// name descending, at most `limit` of them
    async fn users_by_name_prefix(
        &mut self,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<User>, LedgerError>;

    // Coins

    /// Insert a coin and return it with its new key
    async fn insert_coin(
        &mut self,
        external_id: ExternalId,
        name: &str,
        symbol: &str,
    ) -> Result<Coin, LedgerError>;

    /// Look up a coin by key
    async fn coin(&mut self, key: CoinKey) -> Result<Option<Coin>, LedgerError>;

    /// Look up a coin by external identifier
    async fn coin_by_external_id(
        &mut self,
        external_id: ExternalId,
    ) -> Result<Option<Coin>, LedgerError>;

    /// Change the name and/or symbol of a coin, returning the updated coin
    async fn update_coin(
        &mut self,
        key: CoinKey,
        name: Option<&str>,
        symbol: Option<&str>,
    ) -> Result<Option<Coin>, LedgerError>;

    // Entries

    /// Lock and read the entry of a user in a coin
    async fn entry_for_update(
        &mut self,
        user: UserKey,
        coin: CoinKey,
    ) -> Result<Option<Entry>, LedgerError>;

    /// Insert an entry with an opening balance
    ///
    /// Fails with `Conflict` if the user already holds an entry in the coin.
    async fn insert_entry(
        &mut self,
        user: UserKey,
        coin: CoinKey,
        amount: Amount,
    ) -> Result<Entry, LedgerError>;

    /// Overwrite the balance of an entry
    async fn set_entry_amount(&mut self, key: EntryKey, amount: Amount)
        -> Result<(), LedgerError>;

    /// Every entry of a user joined with its coin, ordered by coin key
    async fn holdings(&mut self, user: UserKey) -> Result<Vec<Holding>, LedgerError>;

    // Transactions

    /// Append a transaction and return the stored record
    async fn insert_transaction(
        &mut self,
        transaction: NewTransaction,
    ) -> Result<TransactionRecord, LedgerError>;

    /// Look up a transaction by external identifier
    async fn transaction(
        &mut self,
        external_id: ExternalId,
    ) -> Result<Option<TransactionRecord>, LedgerError>;

    /// Transactions the user sent or received with key at or below the cursor,
    /// newest first, at most `limit` of them
    async fn transactions_for_user(
        &mut self,
        user: UserKey,
        at_or_before: Option<TransactionKey>,
        limit: usize,
    ) -> Result<Vec<TransactionRecord>, LedgerError>;

    // Requests

    /// Store a request and return the stored record
    async fn insert_request(&mut self, request: NewRequest) -> Result<RequestRecord, LedgerError>;

    /// Lock and read a pending request
    async fn request_for_update(
        &mut self,
        external_id: ExternalId,
    ) -> Result<Option<RequestRecord>, LedgerError>;

    /// Delete a request, returning whether it existed
    async fn delete_request(&mut self, key: RequestKey) -> Result<bool, LedgerError>;

    /// Requests where the user is sender or requester, with key at or below the
    /// cursor, newest first, at most `limit` of them
    async fn requests_for_user(
        &mut self,
        user: UserKey,
        at_or_before: Option<RequestKey>,
        limit: usize,
    ) -> Result<Vec<RequestRecord>, LedgerError>;

    // Roles and permissions

    /// Insert a role on a coin
    async fn insert_role(
        &mut self,
        coin: CoinKey,
        name: &str,
        level: Level,
    ) -> Result<Role, LedgerError>;

    /// Look up a role by key
    async fn role(&mut self, key: RoleKey) -> Result<Option<Role>, LedgerError>;

    /// Bind a user to a role
    async fn insert_user_role(
        &mut self,
        user: UserKey,
        role: RoleKey,
    ) -> Result<UserRole, LedgerError>;

    /// Roles bound to a user, restricted to one coin when given, ordered by role key
    async fn roles_of_user(
        &mut self,
        user: UserKey,
        coin: Option<CoinKey>,
    ) -> Result<Vec<Role>, LedgerError>;

    /// Level the coin requires for an action, if configured
    async fn permission(
        &mut self,
        coin: CoinKey,
        action: Action,
    ) -> Result<Option<Level>, LedgerError>;

    /// Set the level the coin requires for an action
    async fn upsert_permission(
        &mut self,
        coin: CoinKey,
        action: Action,
        level: Level,
    ) -> Result<(), LedgerError>;

    /// Make every write of this unit durable and visible
    async fn commit(self) -> Result<(), LedgerError>;
}
