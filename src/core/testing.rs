//! Fixtures shared by the core unit tests

use crate::config::LedgerConfig;
use crate::core::ledger::Ledger;
use crate::store::MemoryStore;
use crate::types::{Coin, CoinName, CoinSymbol, NewCoin, User, UserName};

/// In-memory ledger plus a handle on its store for driving engine steps directly
///
/// Helpers commit their own unit, so never call them while a unit is open.
pub(crate) struct TestLedger {
    pub store: MemoryStore,
    pub ledger: Ledger<MemoryStore>,
}

impl TestLedger {
    pub fn new() -> Self {
        let ledger = Ledger::in_memory(LedgerConfig::default());
        let store = ledger.store().clone();
        TestLedger { store, ledger }
    }

    /// Create a coin owned by `owner`
    pub async fn coin(&self, owner: &User, name: &str) -> Coin {
        let coin = NewCoin {
            name: CoinName::new(name).unwrap(),
            symbol: CoinSymbol::new("TC").unwrap(),
        };
        self.ledger.create_coin(owner.key, &coin).await.unwrap()
    }
}

pub(crate) async fn register(ledger: &TestLedger, name: &str) -> User {
    ledger
        .ledger
        .register_user(&UserName::new(name).unwrap())
        .await
        .unwrap()
}
