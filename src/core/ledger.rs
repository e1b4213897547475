//! Ledger operation surface
//!
//! [`Ledger`] is what the outer layers call. Each operation opens one unit of
//! work, resolves external identifiers, runs the engine steps and commits.
//! Any error drops the unit, so an operation either happens completely or not
//! at all.
//!
//! The caller is an already authenticated user key. Other parties, coins,
//! requests and transactions are addressed by their external identifiers.

use crate::config::{LedgerConfig, SqliteConfig};
use crate::core::governance;
use crate::core::history;
use crate::core::permissions;
use crate::core::registry;
use crate::core::requests::{self, ChargeOrder};
use crate::core::transfer::{self, TransferOrder};
use crate::core::traits::{Store, UnitOfWork};
use crate::core::entry_store;
use crate::store::{MemoryStore, SqliteStore};
use crate::types::ids::new_external_id;
use crate::types::{
    Action, Amount, Coin, CoinUpdate, ExternalId, Holding, LedgerError, Level, Message, NewCoin,
    Page, RequestRecord, Role, RoleKey, RoleName, Submission, Submitted, TransactionRecord, User,
    UserKey, UserName,
};
use tracing::{error, info, warn};

/// Log the outcome of a rejected operation and pass it through
fn report<T>(
    operation: &'static str,
    caller: Option<UserKey>,
    result: Result<T, LedgerError>,
) -> Result<T, LedgerError> {
    if let Err(e) = &result {
        if e.is_retryable() {
            error!(operation, ?caller, error = %e, "operation failed");
        } else {
            warn!(operation, ?caller, error = %e, "operation rejected");
        }
    }
    result
}

/// Entry point of every ledger operation
#[derive(Debug, Clone)]
pub struct Ledger<S: Store> {
    store: S,
    config: LedgerConfig,
}

impl Ledger<MemoryStore> {
    /// Ledger over a fresh in-memory store seeded with the configured default coin
    pub fn in_memory(config: LedgerConfig) -> Self {
        let store = MemoryStore::new(&config.default_coin);
        Ledger::new(store, config)
    }
}

impl Ledger<SqliteStore> {
    /// Ledger over a SQLite database, created and seeded if needed
    pub async fn open(sqlite: &SqliteConfig, config: LedgerConfig) -> Result<Self, LedgerError> {
        let store = SqliteStore::connect(sqlite, &config.default_coin).await?;
        Ok(Ledger::new(store, config))
    }
}

impl<S: Store> Ledger<S> {
    /// Create a ledger over an existing store
    pub fn new(store: S, config: LedgerConfig) -> Self {
        Ledger { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // Identity

    /// Register a user under a fresh account identifier
    ///
    /// The user starts with a zero balance in the default coin.
    pub async fn register_user(&self, name: &UserName) -> Result<User, LedgerError> {
        let result = async {
            let mut unit = self.store.begin().await?;
            let user = registry::register_user(&mut unit, new_external_id(), name).await?;
            unit.commit().await?;
            info!(user = user.key, account_id = %user.account_id, "user registered");
            Ok::<_, LedgerError>(user)
        }
        .await;
        report("register_user", None, result)
    }

    /// Resolve an account identifier to its user
    pub async fn resolve_user(&self, account_id: ExternalId) -> Result<User, LedgerError> {
        let mut unit = self.store.begin().await?;
        let user = registry::resolve_user(&mut unit, account_id).await?;
        unit.commit().await?;
        Ok(user)
    }

    /// Users whose name starts with `term`, at most ten
    pub async fn search_users(&self, term: &str) -> Result<Vec<User>, LedgerError> {
        let mut unit = self.store.begin().await?;
        let users = registry::search_users(&mut unit, term).await?;
        unit.commit().await?;
        Ok(users)
    }

    // Transfers and requests

    /// Pay `receiver` from the caller's balance
    ///
    /// # Errors
    ///
    /// - `NotFound` if the coin or the receiver does not resolve
    /// - `Conflict` if the receiver is the caller
    /// - `InsufficientFunds` if the caller's balance does not cover `amount`
    pub async fn transfer(
        &self,
        caller: UserKey,
        coin_id: ExternalId,
        receiver: ExternalId,
        amount: Amount,
        message: Message,
    ) -> Result<TransactionRecord, LedgerError> {
        let result = async {
            let mut unit = self.store.begin().await?;
            let coin = registry::resolve_coin(&mut unit, coin_id).await?;
            let receiver = registry::resolve_user(&mut unit, receiver).await?;

            let record = transfer::execute(
                &mut unit,
                TransferOrder {
                    coin: coin.key,
                    sender: caller,
                    receiver: receiver.key,
                    amount,
                    message,
                },
            )
            .await?;
            unit.commit().await?;

            info!(
                transaction = %record.external_id,
                sender = caller,
                receiver = receiver.key,
                coin = coin.key,
                amount,
                "transfer committed"
            );
            Ok::<_, LedgerError>(record)
        }
        .await;
        report("transfer", Some(caller), result)
    }

    /// Ask `sender` to pay the caller
    pub async fn create_request(
        &self,
        caller: UserKey,
        coin_id: ExternalId,
        sender: ExternalId,
        amount: Amount,
        message: Message,
    ) -> Result<RequestRecord, LedgerError> {
        let result = async {
            let mut unit = self.store.begin().await?;
            let coin = registry::resolve_coin(&mut unit, coin_id).await?;
            let sender = registry::resolve_user(&mut unit, sender).await?;

            let request = requests::create(
                &mut unit,
                ChargeOrder {
                    coin: coin.key,
                    requester: caller,
                    sender: sender.key,
                    amount,
                    message,
                },
            )
            .await?;
            unit.commit().await?;

            info!(
                request = %request.external_id,
                requester = caller,
                sender = sender.key,
                coin = coin.key,
                amount,
                "request created"
            );
            Ok::<_, LedgerError>(request)
        }
        .await;
        report("create_request", Some(caller), result)
    }

    /// Pay another user or ask them to pay, depending on `submission.charging`
    pub async fn submit(
        &self,
        caller: UserKey,
        submission: Submission,
    ) -> Result<Submitted, LedgerError> {
        let Submission {
            target,
            coin,
            amount,
            message,
            charging,
        } = submission;

        if charging {
            self.create_request(caller, coin, target, amount, message)
                .await
                .map(Submitted::Requested)
        } else {
            self.transfer(caller, coin, target, amount, message)
                .await
                .map(Submitted::Transferred)
        }
    }

    /// Pay a request addressed to the caller
    ///
    /// # Errors
    ///
    /// - `NotFound` if the request does not exist, was already resolved, or is
    ///   not addressed to the caller
    /// - `InsufficientFunds` if the caller cannot cover it; the request stays pending
    pub async fn accept_request(
        &self,
        caller: UserKey,
        request_id: ExternalId,
    ) -> Result<TransactionRecord, LedgerError> {
        let result = async {
            let mut unit = self.store.begin().await?;
            let record = requests::accept(&mut unit, request_id, caller).await?;
            unit.commit().await?;

            info!(
                request = %request_id,
                transaction = %record.external_id,
                sender = caller,
                amount = record.amount,
                "request accepted"
            );
            Ok::<_, LedgerError>(record)
        }
        .await;
        report("accept_request", Some(caller), result)
    }

    /// Refuse a request addressed to the caller
    pub async fn decline_request(
        &self,
        caller: UserKey,
        request_id: ExternalId,
    ) -> Result<(), LedgerError> {
        let result = async {
            let mut unit = self.store.begin().await?;
            requests::decline(&mut unit, request_id, caller).await?;
            unit.commit().await?;

            info!(request = %request_id, sender = caller, "request declined");
            Ok::<_, LedgerError>(())
        }
        .await;
        report("decline_request", Some(caller), result)
    }

    // Coins

    /// Create a coin owned by the caller
    pub async fn create_coin(&self, caller: UserKey, coin: &NewCoin) -> Result<Coin, LedgerError> {
        let result = async {
            let mut unit = self.store.begin().await?;
            let created = governance::create_coin(&mut unit, caller, coin).await?;
            unit.commit().await?;

            info!(coin = %created.external_id, name = %created.name, owner = caller, "coin created");
            Ok::<_, LedgerError>(created)
        }
        .await;
        report("create_coin", Some(caller), result)
    }

    /// Rename a coin and/or change its symbol
    pub async fn update_coin(
        &self,
        caller: UserKey,
        coin_id: ExternalId,
        update: &CoinUpdate,
    ) -> Result<Coin, LedgerError> {
        let result = async {
            let mut unit = self.store.begin().await?;
            let coin = governance::update_coin(&mut unit, caller, coin_id, update).await?;
            unit.commit().await?;

            info!(coin = %coin.external_id, name = %coin.name, symbol = %coin.symbol, "coin updated");
            Ok::<_, LedgerError>(coin)
        }
        .await;
        report("update_coin", Some(caller), result)
    }

    /// Credit newly issued units of a coin to `recipient`
    pub async fn issue(
        &self,
        caller: UserKey,
        coin_id: ExternalId,
        recipient: ExternalId,
        amount: Amount,
        message: Message,
    ) -> Result<TransactionRecord, LedgerError> {
        let result = async {
            let mut unit = self.store.begin().await?;
            let coin = registry::resolve_coin(&mut unit, coin_id).await?;
            let recipient = registry::resolve_user(&mut unit, recipient).await?;
            let record =
                governance::issue(&mut unit, caller, coin.key, recipient.key, amount, &message)
                    .await?;
            unit.commit().await?;

            info!(
                transaction = %record.external_id,
                coin = coin.key,
                recipient = recipient.key,
                amount,
                "coins issued"
            );
            Ok::<_, LedgerError>(record)
        }
        .await;
        report("issue", Some(caller), result)
    }

    /// Look up a coin
    pub async fn get_coin(&self, coin_id: ExternalId) -> Result<Coin, LedgerError> {
        let mut unit = self.store.begin().await?;
        let coin = registry::resolve_coin(&mut unit, coin_id).await?;
        unit.commit().await?;
        Ok(coin)
    }

    /// Every balance the caller holds, with its coin
    pub async fn list_entries(&self, caller: UserKey) -> Result<Vec<Holding>, LedgerError> {
        let mut unit = self.store.begin().await?;
        let holdings = unit.holdings(caller).await?;
        unit.commit().await?;
        Ok(holdings)
    }

    /// Balance of `user` in one coin, 0 without an entry
    pub async fn balance(&self, user: UserKey, coin_id: ExternalId) -> Result<Amount, LedgerError> {
        let mut unit = self.store.begin().await?;
        let coin = registry::resolve_coin(&mut unit, coin_id).await?;
        let amount = entry_store::balance_of(&mut unit, user, coin.key).await?;
        unit.commit().await?;
        Ok(amount)
    }

    // Roles

    /// Roles bound to the caller across all coins
    pub async fn list_roles(&self, caller: UserKey) -> Result<Vec<Role>, LedgerError> {
        let mut unit = self.store.begin().await?;
        let roles = unit.roles_of_user(caller, None).await?;
        unit.commit().await?;
        Ok(roles)
    }

    /// Create a role on a coin
    pub async fn add_role(
        &self,
        caller: UserKey,
        coin_id: ExternalId,
        name: &RoleName,
        level: Level,
    ) -> Result<Role, LedgerError> {
        let result = async {
            let mut unit = self.store.begin().await?;
            let coin = registry::resolve_coin(&mut unit, coin_id).await?;
            let role = permissions::add_role(&mut unit, caller, coin.key, name, level).await?;
            unit.commit().await?;

            info!(role = role.key, coin = coin.key, level, "role added");
            Ok::<_, LedgerError>(role)
        }
        .await;
        report("add_role", Some(caller), result)
    }

    /// Bind another user to a role of a coin
    pub async fn assign_role(
        &self,
        caller: UserKey,
        coin_id: ExternalId,
        target: ExternalId,
        role: RoleKey,
    ) -> Result<Role, LedgerError> {
        let result = async {
            let mut unit = self.store.begin().await?;
            let coin = registry::resolve_coin(&mut unit, coin_id).await?;
            let target = registry::resolve_user(&mut unit, target).await?;
            let role =
                permissions::assign_role(&mut unit, caller, coin.key, target.key, role).await?;
            unit.commit().await?;

            info!(role = role.key, coin = coin.key, user = target.key, "role assigned");
            Ok::<_, LedgerError>(role)
        }
        .await;
        report("assign_role", Some(caller), result)
    }

    /// Set the level a coin requires for an action
    pub async fn set_permission(
        &self,
        caller: UserKey,
        coin_id: ExternalId,
        action: Action,
        level: Level,
    ) -> Result<(), LedgerError> {
        let result = async {
            let mut unit = self.store.begin().await?;
            let coin = registry::resolve_coin(&mut unit, coin_id).await?;
            permissions::set_permission(&mut unit, caller, coin.key, action, level).await?;
            unit.commit().await?;

            info!(coin = coin.key, %action, level, "permission set");
            Ok::<_, LedgerError>(())
        }
        .await;
        report("set_permission", Some(caller), result)
    }

    // History

    /// One page of the caller's transactions, newest first
    pub async fn search_transactions(
        &self,
        caller: UserKey,
        cursor: Option<i64>,
    ) -> Result<Page<TransactionRecord>, LedgerError> {
        let mut unit = self.store.begin().await?;
        let page =
            history::search_transactions(&mut unit, caller, cursor, self.config.page_size).await?;
        unit.commit().await?;
        Ok(page)
    }

    /// One page of the requests the caller sent or received, newest first
    pub async fn search_requests(
        &self,
        caller: UserKey,
        cursor: Option<i64>,
    ) -> Result<Page<RequestRecord>, LedgerError> {
        let mut unit = self.store.begin().await?;
        let page =
            history::search_requests(&mut unit, caller, cursor, self.config.page_size).await?;
        unit.commit().await?;
        Ok(page)
    }

    /// One transaction the caller took part in
    pub async fn get_transaction(
        &self,
        caller: UserKey,
        transaction_id: ExternalId,
    ) -> Result<TransactionRecord, LedgerError> {
        let mut unit = self.store.begin().await?;
        let record = history::get_transaction(&mut unit, caller, transaction_id).await?;
        unit.commit().await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DefaultCoin;
    use crate::types::{CoinName, CoinSymbol};

    fn ledger() -> Ledger<MemoryStore> {
        Ledger::in_memory(LedgerConfig::new(DefaultCoin::default(), 10))
    }

    async fn user(ledger: &Ledger<MemoryStore>, name: &str) -> User {
        ledger
            .register_user(&UserName::new(name).unwrap())
            .await
            .unwrap()
    }

    async fn funded_coin(ledger: &Ledger<MemoryStore>, owner: &User, amount: Amount) -> Coin {
        let coin = ledger
            .create_coin(
                owner.key,
                &NewCoin {
                    name: CoinName::new("Team Coin").unwrap(),
                    symbol: CoinSymbol::new("TC").unwrap(),
                },
            )
            .await
            .unwrap();
        ledger
            .issue(owner.key, coin.external_id, owner.account_id, amount, Message::default())
            .await
            .unwrap();
        coin
    }

    #[tokio::test]
    async fn test_submit_dispatches_on_charging() {
        let ledger = ledger();
        let alice = user(&ledger, "alice").await;
        let bob = user(&ledger, "bob1").await;
        let coin = funded_coin(&ledger, &alice, 10).await;

        let paid = ledger
            .submit(
                alice.key,
                Submission {
                    target: bob.account_id,
                    coin: coin.external_id,
                    amount: 3,
                    message: Message::default(),
                    charging: false,
                },
            )
            .await
            .unwrap();
        assert!(matches!(paid, Submitted::Transferred(ref t) if t.amount == 3));

        let charged = ledger
            .submit(
                alice.key,
                Submission {
                    target: bob.account_id,
                    coin: coin.external_id,
                    amount: 2,
                    message: Message::default(),
                    charging: true,
                },
            )
            .await
            .unwrap();
        assert!(matches!(charged, Submitted::Requested(ref r) if r.sender == bob.key));

        assert_eq!(ledger.balance(alice.key, coin.external_id).await.unwrap(), 7);
        assert_eq!(ledger.balance(bob.key, coin.external_id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_transfer_to_unknown_receiver_is_not_found() {
        let ledger = ledger();
        let alice = user(&ledger, "alice").await;
        let coin = funded_coin(&ledger, &alice, 10).await;
        let unknown = new_external_id();

        let result = ledger
            .transfer(alice.key, coin.external_id, unknown, 1, Message::default())
            .await;
        assert_eq!(result, Err(LedgerError::not_found("User", unknown)));
    }

    #[tokio::test]
    async fn test_failed_operation_rolls_back_everything() {
        let ledger = ledger();
        let alice = user(&ledger, "alice").await;
        let bob = user(&ledger, "bob1").await;
        let coin = funded_coin(&ledger, &alice, 5).await;

        let result = ledger
            .transfer(alice.key, coin.external_id, bob.account_id, 6, Message::default())
            .await;
        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));

        assert_eq!(ledger.balance(alice.key, coin.external_id).await.unwrap(), 5);
        let history = ledger.search_transactions(bob.key, None).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_list_entries_and_roles() {
        let ledger = ledger();
        let alice = user(&ledger, "alice").await;
        let coin = funded_coin(&ledger, &alice, 9).await;

        let holdings = ledger.list_entries(alice.key).await.unwrap();
        let amounts: Vec<(String, Amount)> =
            holdings.into_iter().map(|h| (h.name, h.amount)).collect();
        assert_eq!(
            amounts,
            vec![("Universal Coin".to_string(), 0), ("Team Coin".to_string(), 9)]
        );

        let roles = ledger.list_roles(alice.key).await.unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].coin, coin.key);
    }

    #[tokio::test]
    async fn test_page_size_follows_config() {
        let ledger = Ledger::in_memory(LedgerConfig::new(DefaultCoin::default(), 2));
        let alice = user(&ledger, "alice").await;
        let bob = user(&ledger, "bob1").await;
        let coin = funded_coin(&ledger, &alice, 3).await;
        for _ in 0..3 {
            ledger
                .transfer(alice.key, coin.external_id, bob.account_id, 1, Message::default())
                .await
                .unwrap();
        }

        let page = ledger.search_transactions(bob.key, None).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.next_cursor.is_some());
    }
}
