//! SQLite store
//!
//! Each unit of work is one sqlx transaction on a pooled connection, opened
//! with `BEGIN IMMEDIATE` so units that share rows run one after the other.
//! Dropping the unit drops the transaction, which rolls it back.
//!
//! Storage encoding:
//! - external identifiers are stored as hyphenated UUID text
//! - timestamps are stored as epoch milliseconds
//! - amounts and levels are stored as signed 64-bit integers, checked on the
//!   way in and out

use crate::config::{DefaultCoin, SqliteConfig};
use crate::core::traits::{Store, UnitOfWork};
use crate::types::{
    Action, Amount, Coin, CoinKey, Entry, EntryKey, ExternalId, Holding, Level, LedgerError,
    NewRequest, NewTransaction, RequestKey, RequestRecord, Role, RoleKey, TransactionKey,
    TransactionRecord, User, UserKey, UserRole, DEFAULT_COIN, MAX_AMOUNT, OWNER_LEVEL,
    OWNER_ROLE_NAME,
};
use crate::types::ids::new_external_id;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Row, Sqlite, Transaction};
use std::time::Duration;
use uuid::Uuid;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        account_id  TEXT    NOT NULL UNIQUE,
        name        TEXT    NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS coins (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        external_id TEXT    NOT NULL UNIQUE,
        name        TEXT    NOT NULL,
        symbol      TEXT    NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS entries (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        coin_id     INTEGER NOT NULL REFERENCES coins(id) ON DELETE CASCADE,
        amount      INTEGER NOT NULL CHECK (amount >= 0),
        UNIQUE (user_id, coin_id)
    )",
    "CREATE TABLE IF NOT EXISTS transactions (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        external_id TEXT    NOT NULL UNIQUE,
        sender_id   INTEGER REFERENCES users(id) ON DELETE SET NULL,
        receiver_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
        coin_id     INTEGER NOT NULL REFERENCES coins(id) ON DELETE CASCADE,
        amount      INTEGER NOT NULL CHECK (amount > 0),
        message     TEXT    NOT NULL,
        created_at  INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS transactions_sender ON transactions (sender_id, id)",
    "CREATE INDEX IF NOT EXISTS transactions_receiver ON transactions (receiver_id, id)",
    "CREATE TABLE IF NOT EXISTS requests (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        external_id  TEXT    NOT NULL UNIQUE,
        requester_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        sender_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        coin_id      INTEGER NOT NULL REFERENCES coins(id) ON DELETE CASCADE,
        amount       INTEGER NOT NULL CHECK (amount > 0),
        message      TEXT    NOT NULL,
        created_at   INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS roles (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        coin_id     INTEGER NOT NULL REFERENCES coins(id) ON DELETE CASCADE,
        name        TEXT    NOT NULL,
        level       INTEGER NOT NULL CHECK (level >= 0)
    )",
    "CREATE TABLE IF NOT EXISTS user_roles (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        role_id     INTEGER NOT NULL REFERENCES roles(id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS permissions (
        coin_id     INTEGER NOT NULL REFERENCES coins(id) ON DELETE CASCADE,
        action      TEXT    NOT NULL,
        level       INTEGER NOT NULL CHECK (level >= 0),
        PRIMARY KEY (coin_id, action)
    )",
];

const TRANSACTION_COLUMNS: &str =
    "id, external_id, sender_id, receiver_id, coin_id, amount, message, created_at";

const REQUEST_COLUMNS: &str =
    "id, external_id, requester_id, sender_id, coin_id, amount, message, created_at";

/// Store backed by a SQLite database file
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database, apply the schema and seed the
    /// default coin
    ///
    /// Seeding is idempotent: an existing default coin keeps its name and
    /// symbol.
    ///
    /// # Errors
    ///
    /// Returns `StoreFailure` if the file cannot be opened or the schema cannot
    /// be applied.
    pub async fn connect(
        config: &SqliteConfig,
        default_coin: &DefaultCoin,
    ) -> Result<Self, LedgerError> {
        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        let store = SqliteStore { pool };
        store.apply_schema().await?;
        store.seed(default_coin).await?;

        tracing::info!(
            path = %config.path.display(),
            max_connections = config.max_connections,
            "sqlite store ready"
        );
        Ok(store)
    }

    async fn apply_schema(&self) -> Result<(), LedgerError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn seed(&self, default_coin: &DefaultCoin) -> Result<(), LedgerError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT OR IGNORE INTO coins (id, external_id, name, symbol) VALUES (?, ?, ?, ?)",
        )
        .bind(DEFAULT_COIN)
        .bind(new_external_id().to_string())
        .bind(&default_coin.name)
        .bind(&default_coin.symbol)
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT OR IGNORE INTO roles (id, coin_id, name, level) VALUES (1, ?, ?, ?)")
            .bind(DEFAULT_COIN)
            .bind(OWNER_ROLE_NAME)
            .bind(i64::from(OWNER_LEVEL))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Store for SqliteStore {
    type Unit = SqliteUnit;

    /// Open a unit holding the database write lock
    ///
    /// `BEGIN IMMEDIATE` takes the lock before the first read, so a unit never
    /// reads a snapshot another unit is about to change. Competing units wait
    /// for the lock up to the busy timeout.
    async fn begin(&self) -> Result<SqliteUnit, LedgerError> {
        let tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;
        Ok(SqliteUnit { tx })
    }
}

/// Unit of work wrapping one SQLite transaction
pub struct SqliteUnit {
    tx: Transaction<'static, Sqlite>,
}

fn decode_id(text: &str) -> Result<ExternalId, LedgerError> {
    Uuid::parse_str(text)
        .map_err(|e| LedgerError::store_failure(format!("invalid identifier '{}': {}", text, e)))
}

fn decode_amount(value: i64) -> Result<Amount, LedgerError> {
    Amount::try_from(value)
        .map_err(|_| LedgerError::store_failure(format!("negative amount {} in store", value)))
}

fn encode_amount(amount: Amount) -> Result<i64, LedgerError> {
    i64::try_from(amount).map_err(|_| {
        LedgerError::invalid_argument("amount", format!("must be at most {}", MAX_AMOUNT))
    })
}

fn decode_level(value: i64) -> Result<Level, LedgerError> {
    Level::try_from(value)
        .map_err(|_| LedgerError::store_failure(format!("invalid role level {} in store", value)))
}

fn decode_time(millis: i64) -> Result<DateTime<Utc>, LedgerError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| LedgerError::store_failure(format!("invalid timestamp {}", millis)))
}

fn user_from_row(row: &SqliteRow) -> Result<User, LedgerError> {
    Ok(User {
        key: row.try_get("id")?,
        account_id: decode_id(row.try_get("account_id")?)?,
        name: row.try_get("name")?,
    })
}

fn coin_from_row(row: &SqliteRow) -> Result<Coin, LedgerError> {
    Ok(Coin {
        key: row.try_get("id")?,
        external_id: decode_id(row.try_get("external_id")?)?,
        name: row.try_get("name")?,
        symbol: row.try_get("symbol")?,
    })
}

fn entry_from_row(row: &SqliteRow) -> Result<Entry, LedgerError> {
    Ok(Entry {
        key: row.try_get("id")?,
        user: row.try_get("user_id")?,
        coin: row.try_get("coin_id")?,
        amount: decode_amount(row.try_get("amount")?)?,
    })
}

fn transaction_from_row(row: &SqliteRow) -> Result<TransactionRecord, LedgerError> {
    Ok(TransactionRecord {
        key: row.try_get("id")?,
        external_id: decode_id(row.try_get("external_id")?)?,
        sender: row.try_get("sender_id")?,
        receiver: row.try_get("receiver_id")?,
        coin: row.try_get("coin_id")?,
        amount: decode_amount(row.try_get("amount")?)?,
        message: row.try_get("message")?,
        created_at: decode_time(row.try_get("created_at")?)?,
    })
}

fn request_from_row(row: &SqliteRow) -> Result<RequestRecord, LedgerError> {
    Ok(RequestRecord {
        key: row.try_get("id")?,
        external_id: decode_id(row.try_get("external_id")?)?,
        requester: row.try_get("requester_id")?,
        sender: row.try_get("sender_id")?,
        coin: row.try_get("coin_id")?,
        amount: decode_amount(row.try_get("amount")?)?,
        message: row.try_get("message")?,
        created_at: decode_time(row.try_get("created_at")?)?,
    })
}

fn role_from_row(row: &SqliteRow) -> Result<Role, LedgerError> {
    Ok(Role {
        key: row.try_get("id")?,
        coin: row.try_get("coin_id")?,
        name: row.try_get("name")?,
        level: decode_level(row.try_get("level")?)?,
    })
}

impl SqliteUnit {
    /// Whether a row with the given key exists in `table`
    async fn exists(&mut self, table: &str, key: i64) -> Result<bool, LedgerError> {
        let row = sqlx::query(&format!("SELECT 1 FROM {} WHERE id = ?", table))
            .bind(key)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.is_some())
    }

    async fn require(&mut self, table: &str, entity: &str, key: i64) -> Result<(), LedgerError> {
        if self.exists(table, key).await? {
            Ok(())
        } else {
            Err(LedgerError::not_found(entity, key))
        }
    }
}

#[async_trait]
impl UnitOfWork for SqliteUnit {
    async fn insert_user(
        &mut self,
        account_id: ExternalId,
        name: &str,
    ) -> Result<User, LedgerError> {
        let result = sqlx::query("INSERT INTO users (account_id, name) VALUES (?, ?)")
            .bind(account_id.to_string())
            .bind(name)
            .execute(&mut *self.tx)
            .await?;

        Ok(User {
            key: result.last_insert_rowid(),
            account_id,
            name: name.to_string(),
        })
    }

    async fn user_by_account_id(
        &mut self,
        account_id: ExternalId,
    ) -> Result<Option<User>, LedgerError> {
        let row = sqlx::query("SELECT id, account_id, name FROM users WHERE account_id = ?")
            .bind(account_id.to_string())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn users_by_name_prefix(
        &mut self,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<User>, LedgerError> {
        let pattern = format!(
            "{}%",
            prefix
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_")
        );
        let rows = sqlx::query(
            "SELECT id, account_id, name FROM users
             WHERE name LIKE ? ESCAPE '\\'
             ORDER BY name DESC
             LIMIT ?",
        )
        .bind(pattern)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&mut *self.tx)
        .await?;

        rows.iter().map(user_from_row).collect()
    }

    async fn insert_coin(
        &mut self,
        external_id: ExternalId,
        name: &str,
        symbol: &str,
    ) -> Result<Coin, LedgerError> {
        let result = sqlx::query("INSERT INTO coins (external_id, name, symbol) VALUES (?, ?, ?)")
            .bind(external_id.to_string())
            .bind(name)
            .bind(symbol)
            .execute(&mut *self.tx)
            .await?;

        Ok(Coin {
            key: result.last_insert_rowid(),
            external_id,
            name: name.to_string(),
            symbol: symbol.to_string(),
        })
    }

    async fn coin(&mut self, key: CoinKey) -> Result<Option<Coin>, LedgerError> {
        let row = sqlx::query("SELECT id, external_id, name, symbol FROM coins WHERE id = ?")
            .bind(key)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.as_ref().map(coin_from_row).transpose()
    }

    async fn coin_by_external_id(
        &mut self,
        external_id: ExternalId,
    ) -> Result<Option<Coin>, LedgerError> {
        let row =
            sqlx::query("SELECT id, external_id, name, symbol FROM coins WHERE external_id = ?")
                .bind(external_id.to_string())
                .fetch_optional(&mut *self.tx)
                .await?;
        row.as_ref().map(coin_from_row).transpose()
    }

    async fn update_coin(
        &mut self,
        key: CoinKey,
        name: Option<&str>,
        symbol: Option<&str>,
    ) -> Result<Option<Coin>, LedgerError> {
        let result = sqlx::query(
            "UPDATE coins SET name = COALESCE(?, name), symbol = COALESCE(?, symbol) WHERE id = ?",
        )
        .bind(name)
        .bind(symbol)
        .bind(key)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.coin(key).await
    }

    async fn entry_for_update(
        &mut self,
        user: UserKey,
        coin: CoinKey,
    ) -> Result<Option<Entry>, LedgerError> {
        // The unit already holds the write lock, see `SqliteStore::begin`
        let row = sqlx::query(
            "SELECT id, user_id, coin_id, amount FROM entries WHERE user_id = ? AND coin_id = ?",
        )
        .bind(user)
        .bind(coin)
        .fetch_optional(&mut *self.tx)
        .await?;
        row.as_ref().map(entry_from_row).transpose()
    }

    async fn insert_entry(
        &mut self,
        user: UserKey,
        coin: CoinKey,
        amount: Amount,
    ) -> Result<Entry, LedgerError> {
        let stored = encode_amount(amount)?;
        self.require("users", "User", user).await?;
        self.require("coins", "Coin", coin).await?;

        let result = sqlx::query("INSERT INTO entries (user_id, coin_id, amount) VALUES (?, ?, ?)")
            .bind(user)
            .bind(coin)
            .bind(stored)
            .execute(&mut *self.tx)
            .await?;

        Ok(Entry {
            key: result.last_insert_rowid(),
            user,
            coin,
            amount,
        })
    }

    async fn set_entry_amount(
        &mut self,
        key: EntryKey,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let result = sqlx::query("UPDATE entries SET amount = ? WHERE id = ?")
            .bind(encode_amount(amount)?)
            .bind(key)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::not_found("Entry", key));
        }
        Ok(())
    }

    async fn holdings(&mut self, user: UserKey) -> Result<Vec<Holding>, LedgerError> {
        let rows = sqlx::query(
            "SELECT c.id, c.external_id, c.name, c.symbol, e.amount
             FROM entries e JOIN coins c ON c.id = e.coin_id
             WHERE e.user_id = ?
             ORDER BY c.id",
        )
        .bind(user)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.iter()
            .map(|row| -> Result<Holding, LedgerError> {
                Ok(Holding {
                    coin_key: row.try_get("id")?,
                    coin_id: decode_id(row.try_get("external_id")?)?,
                    name: row.try_get("name")?,
                    symbol: row.try_get("symbol")?,
                    amount: decode_amount(row.try_get("amount")?)?,
                })
            })
            .collect()
    }

    async fn insert_transaction(
        &mut self,
        transaction: NewTransaction,
    ) -> Result<TransactionRecord, LedgerError> {
        let result = sqlx::query(
            "INSERT INTO transactions
                (external_id, sender_id, receiver_id, coin_id, amount, message, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(transaction.external_id.to_string())
        .bind(transaction.sender)
        .bind(transaction.receiver)
        .bind(transaction.coin)
        .bind(encode_amount(transaction.amount)?)
        .bind(&transaction.message)
        .bind(transaction.created_at.timestamp_millis())
        .execute(&mut *self.tx)
        .await?;

        Ok(transaction.into_record(result.last_insert_rowid()))
    }

    async fn transaction(
        &mut self,
        external_id: ExternalId,
    ) -> Result<Option<TransactionRecord>, LedgerError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM transactions WHERE external_id = ?",
            TRANSACTION_COLUMNS
        ))
        .bind(external_id.to_string())
        .fetch_optional(&mut *self.tx)
        .await?;
        row.as_ref().map(transaction_from_row).transpose()
    }

    async fn transactions_for_user(
        &mut self,
        user: UserKey,
        at_or_before: Option<TransactionKey>,
        limit: usize,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM transactions
             WHERE (sender_id = ? OR receiver_id = ?) AND id <= ?
             ORDER BY id DESC
             LIMIT ?",
            TRANSACTION_COLUMNS
        ))
        .bind(user)
        .bind(user)
        .bind(at_or_before.unwrap_or(i64::MAX))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&mut *self.tx)
        .await?;

        rows.iter().map(transaction_from_row).collect()
    }

    async fn insert_request(&mut self, request: NewRequest) -> Result<RequestRecord, LedgerError> {
        let result = sqlx::query(
            "INSERT INTO requests
                (external_id, requester_id, sender_id, coin_id, amount, message, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(request.external_id.to_string())
        .bind(request.requester)
        .bind(request.sender)
        .bind(request.coin)
        .bind(encode_amount(request.amount)?)
        .bind(&request.message)
        .bind(request.created_at.timestamp_millis())
        .execute(&mut *self.tx)
        .await?;

        Ok(request.into_record(result.last_insert_rowid()))
    }

    async fn request_for_update(
        &mut self,
        external_id: ExternalId,
    ) -> Result<Option<RequestRecord>, LedgerError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM requests WHERE external_id = ?",
            REQUEST_COLUMNS
        ))
        .bind(external_id.to_string())
        .fetch_optional(&mut *self.tx)
        .await?;
        row.as_ref().map(request_from_row).transpose()
    }

    async fn delete_request(&mut self, key: RequestKey) -> Result<bool, LedgerError> {
        let result = sqlx::query("DELETE FROM requests WHERE id = ?")
            .bind(key)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn requests_for_user(
        &mut self,
        user: UserKey,
        at_or_before: Option<RequestKey>,
        limit: usize,
    ) -> Result<Vec<RequestRecord>, LedgerError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM requests
             WHERE (sender_id = ? OR requester_id = ?) AND id <= ?
             ORDER BY id DESC
             LIMIT ?",
            REQUEST_COLUMNS
        ))
        .bind(user)
        .bind(user)
        .bind(at_or_before.unwrap_or(i64::MAX))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&mut *self.tx)
        .await?;

        rows.iter().map(request_from_row).collect()
    }

    async fn insert_role(
        &mut self,
        coin: CoinKey,
        name: &str,
        level: Level,
    ) -> Result<Role, LedgerError> {
        self.require("coins", "Coin", coin).await?;

        let result = sqlx::query("INSERT INTO roles (coin_id, name, level) VALUES (?, ?, ?)")
            .bind(coin)
            .bind(name)
            .bind(i64::from(level))
            .execute(&mut *self.tx)
            .await?;

        Ok(Role {
            key: result.last_insert_rowid(),
            coin,
            name: name.to_string(),
            level,
        })
    }

    async fn role(&mut self, key: RoleKey) -> Result<Option<Role>, LedgerError> {
        let row = sqlx::query("SELECT id, coin_id, name, level FROM roles WHERE id = ?")
            .bind(key)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.as_ref().map(role_from_row).transpose()
    }

    async fn insert_user_role(
        &mut self,
        user: UserKey,
        role: RoleKey,
    ) -> Result<UserRole, LedgerError> {
        self.require("users", "User", user).await?;
        self.require("roles", "Role", role).await?;

        let result = sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES (?, ?)")
            .bind(user)
            .bind(role)
            .execute(&mut *self.tx)
            .await?;

        Ok(UserRole {
            key: result.last_insert_rowid(),
            user,
            role,
        })
    }

    async fn roles_of_user(
        &mut self,
        user: UserKey,
        coin: Option<CoinKey>,
    ) -> Result<Vec<Role>, LedgerError> {
        let rows = sqlx::query(
            "SELECT DISTINCT r.id, r.coin_id, r.name, r.level
             FROM user_roles ur JOIN roles r ON r.id = ur.role_id
             WHERE ur.user_id = ? AND (? IS NULL OR r.coin_id = ?)
             ORDER BY r.id",
        )
        .bind(user)
        .bind(coin)
        .bind(coin)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.iter().map(role_from_row).collect()
    }

    async fn permission(
        &mut self,
        coin: CoinKey,
        action: Action,
    ) -> Result<Option<Level>, LedgerError> {
        let level: Option<i64> =
            sqlx::query_scalar("SELECT level FROM permissions WHERE coin_id = ? AND action = ?")
                .bind(coin)
                .bind(action.as_str())
                .fetch_optional(&mut *self.tx)
                .await?;
        level.map(decode_level).transpose()
    }

    async fn upsert_permission(
        &mut self,
        coin: CoinKey,
        action: Action,
        level: Level,
    ) -> Result<(), LedgerError> {
        self.require("coins", "Coin", coin).await?;

        sqlx::query(
            "INSERT INTO permissions (coin_id, action, level) VALUES (?, ?, ?)
             ON CONFLICT (coin_id, action) DO UPDATE SET level = excluded.level",
        )
        .bind(coin)
        .bind(action.as_str())
        .bind(i64::from(level))
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn commit(self) -> Result<(), LedgerError> {
        self.tx.commit().await?;
        Ok(())
    }
}
