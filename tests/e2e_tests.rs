//! End-to-end integration tests
//!
//! These tests drive the public [`Ledger`] surface the way a service would:
//! register users, create and fund a coin, then move balances through direct
//! transfers and payment requests.
//!
//! Each scenario is written once, generic over the store, and run twice: once
//! against the in-memory store and once against a SQLite database in a
//! temporary directory.

#[cfg(test)]
mod tests {
    use clap::Parser;
    use coin_ledger::cli::{self, CliArgs};
    use coin_ledger::types::{CoinName, CoinSymbol, CoinUpdate, NewCoin, RoleName, UserName};
    use coin_ledger::{
        Action, Amount, Coin, Ledger, LedgerConfig, LedgerError, MemoryStore, Message, SqliteConfig,
        SqliteStore, Store, User,
    };
    use futures::future::join_all;
    use tempfile::TempDir;

    fn memory_ledger() -> Ledger<MemoryStore> {
        Ledger::in_memory(LedgerConfig::default())
    }

    /// SQLite ledger in a fresh directory; keep the directory alive for the test
    async fn sqlite_ledger() -> (Ledger<SqliteStore>, TempDir) {
        sqlite_ledger_with_pool(1).await
    }

    async fn sqlite_ledger_with_pool(max_connections: u32) -> (Ledger<SqliteStore>, TempDir) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = SqliteConfig::new(dir.path().join("ledger.db"), max_connections);
        let ledger = Ledger::open(&config, LedgerConfig::default())
            .await
            .expect("Failed to open ledger");
        (ledger, dir)
    }

    async fn user<S: Store>(ledger: &Ledger<S>, name: &str) -> User {
        ledger
            .register_user(&UserName::new(name).unwrap())
            .await
            .unwrap()
    }

    /// Coin C owned by `owner`, with `amount` issued to the owner
    async fn funded_coin<S: Store>(ledger: &Ledger<S>, owner: &User, amount: Amount) -> Coin {
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
            .issue(
                owner.key,
                coin.external_id,
                owner.account_id,
                amount,
                Message::new("seed").unwrap(),
            )
            .await
            .unwrap();
        coin
    }

    async fn balance<S: Store>(ledger: &Ledger<S>, user: &User, coin: &Coin) -> Amount {
        ledger.balance(user.key, coin.external_id).await.unwrap()
    }

    async fn transfers_then_rejects_overdraft<S: Store>(ledger: Ledger<S>) {
        let a = user(&ledger, "alice").await;
        let b = user(&ledger, "bob1").await;
        let c = funded_coin(&ledger, &a, 10).await;

        let record = ledger
            .transfer(a.key, c.external_id, b.account_id, 4, Message::new("gift").unwrap())
            .await
            .unwrap();
        assert_eq!(record.amount, 4);
        assert_eq!(record.sender, Some(a.key));
        assert_eq!(record.receiver, Some(b.key));
        assert_eq!(balance(&ledger, &a, &c).await, 6);
        assert_eq!(balance(&ledger, &b, &c).await, 4);

        let result = ledger
            .transfer(a.key, c.external_id, b.account_id, 100, Message::new("too much").unwrap())
            .await;
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientFunds {
                available: 6,
                requested: 100,
                ..
            })
        ));
        assert_eq!(balance(&ledger, &a, &c).await, 6);
        assert_eq!(balance(&ledger, &b, &c).await, 4);

        let history = ledger.search_transactions(b.key, None).await.unwrap();
        assert_eq!(history.items.len(), 1);
        assert_eq!(history.items[0].external_id, record.external_id);
    }

    async fn accepted_request_moves_funds_once<S: Store>(ledger: Ledger<S>) {
        let a = user(&ledger, "alice").await;
        let b = user(&ledger, "bob1").await;
        let c = funded_coin(&ledger, &a, 10).await;
        ledger
            .transfer(a.key, c.external_id, b.account_id, 4, Message::default())
            .await
            .unwrap();

        let request = ledger
            .create_request(b.key, c.external_id, a.account_id, 4, Message::default())
            .await
            .unwrap();
        assert_eq!(balance(&ledger, &a, &c).await, 6);

        let record = ledger
            .accept_request(a.key, request.external_id)
            .await
            .unwrap();
        assert_eq!(record.amount, 4);
        assert_eq!(balance(&ledger, &a, &c).await, 2);
        assert_eq!(balance(&ledger, &b, &c).await, 8);

        let again = ledger.accept_request(a.key, request.external_id).await;
        assert!(matches!(again, Err(LedgerError::NotFound { .. })));
        let decline = ledger.decline_request(a.key, request.external_id).await;
        assert!(matches!(decline, Err(LedgerError::NotFound { .. })));

        let history = ledger.search_transactions(a.key, None).await.unwrap();
        assert_eq!(history.items.len(), 3);
        assert_eq!(balance(&ledger, &a, &c).await, 2);
    }

    async fn only_the_sender_resolves_a_request<S: Store>(ledger: Ledger<S>) {
        let a = user(&ledger, "alice").await;
        let b = user(&ledger, "bob1").await;
        let c = funded_coin(&ledger, &a, 10).await;

        let request = ledger
            .create_request(b.key, c.external_id, a.account_id, 3, Message::default())
            .await
            .unwrap();

        let by_requester = ledger.accept_request(b.key, request.external_id).await;
        assert!(matches!(by_requester, Err(LedgerError::NotFound { .. })));
        let declined_by_requester = ledger.decline_request(b.key, request.external_id).await;
        assert!(matches!(declined_by_requester, Err(LedgerError::NotFound { .. })));

        let pending = ledger.search_requests(a.key, None).await.unwrap();
        assert_eq!(pending.items.len(), 1);

        ledger
            .decline_request(a.key, request.external_id)
            .await
            .unwrap();
        assert!(ledger.search_requests(a.key, None).await.unwrap().is_empty());
        assert_eq!(balance(&ledger, &a, &c).await, 10);
    }

    async fn update_coin_requires_privileged_role<S: Store>(ledger: Ledger<S>) {
        let a = user(&ledger, "alice").await;
        let b = user(&ledger, "bob1").await;
        let carol = user(&ledger, "carol").await;
        let c = funded_coin(&ledger, &a, 10).await;

        let member = ledger
            .add_role(a.key, c.external_id, &RoleName::new("Member").unwrap(), 2)
            .await
            .unwrap();
        ledger
            .assign_role(a.key, c.external_id, b.account_id, member.key)
            .await
            .unwrap();

        let rename = CoinUpdate {
            name: Some(CoinName::new("Renamed Coin").unwrap()),
            symbol: None,
        };
        for outsider in [&b, &carol] {
            let result = ledger.update_coin(outsider.key, c.external_id, &rename).await;
            assert!(matches!(
                result,
                Err(LedgerError::Unauthorized {
                    action: Action::EditCoinInfo,
                    ..
                })
            ));
        }
        assert_eq!(ledger.get_coin(c.external_id).await.unwrap().name, "Team Coin");

        ledger
            .set_permission(a.key, c.external_id, Action::EditCoinInfo, 2)
            .await
            .unwrap();
        let renamed = ledger
            .update_coin(b.key, c.external_id, &rename)
            .await
            .unwrap();
        assert_eq!(renamed.name, "Renamed Coin");
        assert_eq!(renamed.symbol, "TC");
    }

    async fn concurrent_transfers_conserve_supply<S: Store>(ledger: Ledger<S>) {
        let a = user(&ledger, "alice").await;
        let b = user(&ledger, "bob1").await;
        let carol = user(&ledger, "carol").await;
        let c = funded_coin(&ledger, &a, 30).await;

        let attempts = (0..20).flat_map(|_| [&b, &carol]).map(|receiver| {
            ledger.transfer(a.key, c.external_id, receiver.account_id, 1, Message::default())
        });
        let results = join_all(attempts).await;

        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        let overdrawn = results
            .iter()
            .filter(|r| matches!(r, Err(LedgerError::InsufficientFunds { .. })))
            .count();
        assert_eq!(succeeded, 30);
        assert_eq!(overdrawn, 10);

        let a_balance = balance(&ledger, &a, &c).await;
        let b_balance = balance(&ledger, &b, &c).await;
        let carol_balance = balance(&ledger, &carol, &c).await;
        assert_eq!(a_balance, 0);
        assert_eq!(a_balance + b_balance + carol_balance, 30);
    }

    async fn concurrent_funded_transfers_all_succeed<S: Store>(ledger: Ledger<S>) {
        let a = user(&ledger, "alice").await;
        let b = user(&ledger, "bob1").await;
        let c = funded_coin(&ledger, &a, 100).await;

        let attempts = (0..40).map(|_| {
            ledger.transfer(a.key, c.external_id, b.account_id, 1, Message::default())
        });
        let results = join_all(attempts).await;

        let failures: Vec<&LedgerError> = results.iter().filter_map(|r| r.as_ref().err()).collect();
        assert!(failures.is_empty(), "transfers failed: {:?}", failures);
        assert_eq!(balance(&ledger, &a, &c).await, 60);
        assert_eq!(balance(&ledger, &b, &c).await, 40);
    }

    async fn underfunded_accept_keeps_request_pending<S: Store>(ledger: Ledger<S>) {
        let a = user(&ledger, "alice").await;
        let b = user(&ledger, "bob1").await;
        let c = funded_coin(&ledger, &a, 3).await;

        let request = ledger
            .create_request(b.key, c.external_id, a.account_id, 5, Message::default())
            .await
            .unwrap();

        let result = ledger.accept_request(a.key, request.external_id).await;
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientFunds {
                available: 3,
                requested: 5,
                ..
            })
        ));
        let pending = ledger.search_requests(a.key, None).await.unwrap();
        assert_eq!(pending.items.len(), 1);
        assert_eq!(pending.items[0].external_id, request.external_id);
        assert_eq!(balance(&ledger, &a, &c).await, 3);
        assert_eq!(balance(&ledger, &b, &c).await, 0);

        ledger
            .issue(a.key, c.external_id, a.account_id, 2, Message::default())
            .await
            .unwrap();
        let record = ledger
            .accept_request(a.key, request.external_id)
            .await
            .unwrap();
        assert_eq!(record.amount, 5);
        assert_eq!(balance(&ledger, &a, &c).await, 0);
        assert_eq!(balance(&ledger, &b, &c).await, 5);
        assert!(ledger.search_requests(a.key, None).await.unwrap().is_empty());
    }

    async fn history_pages_newest_first<S: Store>(ledger: Ledger<S>) {
        let a = user(&ledger, "alice").await;
        let b = user(&ledger, "bob1").await;
        let c = funded_coin(&ledger, &a, 25).await;
        for _ in 0..25 {
            ledger
                .transfer(a.key, c.external_id, b.account_id, 1, Message::default())
                .await
                .unwrap();
        }

        let mut cursor = None;
        let mut seen = Vec::new();
        loop {
            let page = ledger.search_transactions(b.key, cursor).await.unwrap();
            assert!(page.items.len() <= 10);
            seen.extend(page.items.iter().map(|t| t.key));
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        assert_eq!(seen.len(), 25);
        assert!(seen.windows(2).all(|pair| pair[0] > pair[1]));
    }

    #[tokio::test]
    async fn test_transfer_scenario_memory() {
        transfers_then_rejects_overdraft(memory_ledger()).await;
    }

    #[tokio::test]
    async fn test_transfer_scenario_sqlite() {
        let (ledger, _dir) = sqlite_ledger().await;
        transfers_then_rejects_overdraft(ledger).await;
    }

    #[tokio::test]
    async fn test_request_scenario_memory() {
        accepted_request_moves_funds_once(memory_ledger()).await;
    }

    #[tokio::test]
    async fn test_request_scenario_sqlite() {
        let (ledger, _dir) = sqlite_ledger().await;
        accepted_request_moves_funds_once(ledger).await;
    }

    #[tokio::test]
    async fn test_request_exclusivity_memory() {
        only_the_sender_resolves_a_request(memory_ledger()).await;
    }

    #[tokio::test]
    async fn test_request_exclusivity_sqlite() {
        let (ledger, _dir) = sqlite_ledger().await;
        only_the_sender_resolves_a_request(ledger).await;
    }

    #[tokio::test]
    async fn test_permission_gate_memory() {
        update_coin_requires_privileged_role(memory_ledger()).await;
    }

    #[tokio::test]
    async fn test_permission_gate_sqlite() {
        let (ledger, _dir) = sqlite_ledger().await;
        update_coin_requires_privileged_role(ledger).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_transfers_memory() {
        concurrent_transfers_conserve_supply(memory_ledger()).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_transfers_sqlite() {
        let (ledger, _dir) = sqlite_ledger().await;
        concurrent_transfers_conserve_supply(ledger).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_funded_transfers_memory() {
        concurrent_funded_transfers_all_succeed(memory_ledger()).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_funded_transfers_sqlite_pool_of_four() {
        let (ledger, _dir) = sqlite_ledger_with_pool(4).await;
        concurrent_funded_transfers_all_succeed(ledger).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_transfers_sqlite_pool_of_four() {
        let (ledger, _dir) = sqlite_ledger_with_pool(4).await;
        concurrent_transfers_conserve_supply(ledger).await;
    }

    #[tokio::test]
    async fn test_underfunded_accept_memory() {
        underfunded_accept_keeps_request_pending(memory_ledger()).await;
    }

    #[tokio::test]
    async fn test_underfunded_accept_sqlite() {
        let (ledger, _dir) = sqlite_ledger().await;
        underfunded_accept_keeps_request_pending(ledger).await;
    }

    #[tokio::test]
    async fn test_history_pagination_memory() {
        history_pages_newest_first(memory_ledger()).await;
    }

    #[tokio::test]
    async fn test_history_pagination_sqlite() {
        let (ledger, _dir) = sqlite_ledger().await;
        history_pages_newest_first(ledger).await;
    }

    #[tokio::test]
    async fn test_sqlite_state_survives_reopen() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = SqliteConfig::new(dir.path().join("ledger.db"), 1);

        let ledger = Ledger::open(&config, LedgerConfig::default()).await.unwrap();
        let a = user(&ledger, "alice").await;
        let c = funded_coin(&ledger, &a, 7).await;
        ledger.store().close().await;

        let reopened = Ledger::open(&config, LedgerConfig::default()).await.unwrap();
        assert_eq!(balance(&reopened, &a, &c).await, 7);
        let holdings = reopened.list_entries(a.key).await.unwrap();
        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].name, "Universal Coin");
    }

    #[tokio::test]
    async fn test_cli_register_and_list_entries() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let database = dir.path().join("cli.db");
        let database = database.to_str().unwrap();

        let mut output = Vec::new();
        let args =
            CliArgs::try_parse_from(["coin-ledger", "--database", database, "register", "alice"])
                .unwrap();
        cli::run(args, &mut output).await.unwrap();

        let registered = String::from_utf8(output).unwrap();
        let row = registered.lines().nth(1).expect("missing user row");
        let account_id = row.split(',').nth(1).unwrap().to_string();

        let mut output = Vec::new();
        let args = CliArgs::try_parse_from([
            "coin-ledger",
            "--database",
            database,
            "--as",
            &account_id,
            "entries",
        ])
        .unwrap();
        cli::run(args, &mut output).await.unwrap();

        let entries = String::from_utf8(output).unwrap();
        assert_eq!(
            entries.lines().next(),
            Some("coin_key,coin_id,name,symbol,amount")
        );
        assert!(entries.lines().nth(1).unwrap().ends_with(",Universal Coin,μ,0"));
    }
}
