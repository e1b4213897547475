use crate::config::{DefaultCoin, LedgerConfig, SqliteConfig, DEFAULT_PAGE_SIZE};
use crate::types::{
    Action, Amount, CoinName, CoinSymbol, ExternalId, Level, Message, RoleKey, RoleName, UserName,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Operate a shared coin ledger
#[derive(Parser, Debug)]
#[command(name = "coin-ledger")]
#[command(about = "Operate a shared coin ledger", long_about = None)]
pub struct CliArgs {
    /// SQLite database file
    #[arg(
        long = "database",
        env = "COIN_LEDGER_DATABASE",
        value_name = "PATH",
        default_value = "coins.db",
        help = "Path to the SQLite database, created if missing"
    )]
    pub database: PathBuf,

    /// Connection pool size
    #[arg(
        long = "max-connections",
        env = "COIN_LEDGER_MAX_CONNECTIONS",
        value_name = "COUNT",
        help = "Maximum number of database connections (default: 1)"
    )]
    pub max_connections: Option<u32>,

    /// Name of the coin seeded into a fresh database
    #[arg(
        long = "default-coin-name",
        env = "COIN_LEDGER_DEFAULT_COIN_NAME",
        value_name = "NAME",
        help = "Name of the default coin (default: Universal Coin)"
    )]
    pub default_coin_name: Option<String>,

    /// Symbol of the coin seeded into a fresh database
    #[arg(
        long = "default-coin-symbol",
        env = "COIN_LEDGER_DEFAULT_COIN_SYMBOL",
        value_name = "SYMBOL",
        help = "Symbol of the default coin (default: μ)"
    )]
    pub default_coin_symbol: Option<String>,

    /// Number of items per history page
    #[arg(
        long = "page-size",
        env = "COIN_LEDGER_PAGE_SIZE",
        value_name = "SIZE",
        help = "Items per page of transactions or requests (default: 10)"
    )]
    pub page_size: Option<usize>,

    /// Account identifier of the acting user
    #[arg(
        long = "as",
        env = "COIN_LEDGER_ACCOUNT",
        value_name = "ACCOUNT_ID",
        help = "Account identifier of the user performing the command"
    )]
    pub caller: Option<ExternalId>,

    #[command(subcommand)]
    pub command: Command,
}

/// Ledger commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Register a new user
    Register {
        #[arg(value_name = "NAME")]
        name: UserName,
    },

    /// Find users by name prefix
    SearchUsers {
        #[arg(value_name = "TERM")]
        term: String,
    },

    /// Create a coin owned by the acting user
    CreateCoin {
        #[arg(value_name = "NAME")]
        name: CoinName,
        #[arg(value_name = "SYMBOL")]
        symbol: CoinSymbol,
    },

    /// Rename a coin or change its symbol
    UpdateCoin {
        #[arg(value_name = "COIN_ID")]
        coin: ExternalId,
        #[arg(long = "name", value_name = "NAME")]
        name: Option<CoinName>,
        #[arg(long = "symbol", value_name = "SYMBOL")]
        symbol: Option<CoinSymbol>,
    },

    /// Show one coin
    ShowCoin {
        #[arg(value_name = "COIN_ID")]
        coin: ExternalId,
    },

    /// Issue new units of a coin to a user
    Issue {
        #[arg(value_name = "COIN_ID")]
        coin: ExternalId,
        #[arg(value_name = "ACCOUNT_ID")]
        recipient: ExternalId,
        #[arg(value_name = "AMOUNT")]
        amount: Amount,
        #[arg(long = "message", value_name = "TEXT")]
        message: Option<Message>,
    },

    /// Pay another user, or ask them to pay with --charge
    Send {
        #[arg(value_name = "COIN_ID")]
        coin: ExternalId,
        #[arg(value_name = "ACCOUNT_ID")]
        target: ExternalId,
        #[arg(value_name = "AMOUNT")]
        amount: Amount,
        #[arg(long = "message", value_name = "TEXT")]
        message: Option<Message>,
        #[arg(long = "charge", help = "Request the amount from the target instead of paying it")]
        charge: bool,
    },

    /// Pay a request addressed to the acting user
    Accept {
        #[arg(value_name = "REQUEST_ID")]
        request: ExternalId,
    },

    /// Refuse a request addressed to the acting user
    Decline {
        #[arg(value_name = "REQUEST_ID")]
        request: ExternalId,
    },

    /// List the acting user's balances
    Entries,

    /// Show the acting user's balance in one coin
    Balance {
        #[arg(value_name = "COIN_ID")]
        coin: ExternalId,
    },

    /// List the acting user's transactions, newest first
    Transactions {
        #[arg(long = "cursor", value_name = "KEY")]
        cursor: Option<i64>,
    },

    /// List the acting user's requests, newest first
    Requests {
        #[arg(long = "cursor", value_name = "KEY")]
        cursor: Option<i64>,
    },

    /// Show one transaction of the acting user
    ShowTransaction {
        #[arg(value_name = "TRANSACTION_ID")]
        transaction: ExternalId,
    },

    /// List the acting user's roles
    Roles,

    /// Add a role to a coin
    AddRole {
        #[arg(value_name = "COIN_ID")]
        coin: ExternalId,
        #[arg(value_name = "NAME")]
        name: RoleName,
        #[arg(value_name = "LEVEL")]
        level: Level,
    },

    /// Bind a user to a role of a coin
    AssignRole {
        #[arg(value_name = "COIN_ID")]
        coin: ExternalId,
        #[arg(value_name = "ACCOUNT_ID")]
        user: ExternalId,
        #[arg(value_name = "ROLE")]
        role: RoleKey,
    },

    /// Set the level a coin requires for an action
    SetPermission {
        #[arg(value_name = "COIN_ID")]
        coin: ExternalId,
        #[arg(value_name = "ACTION")]
        action: Action,
        #[arg(value_name = "LEVEL")]
        level: Level,
    },
}

impl CliArgs {
    /// Create a LedgerConfig from CLI arguments
    ///
    /// Missing values take their defaults; invalid ones are reported by the
    /// config constructors and replaced by defaults as well.
    pub fn to_ledger_config(&self) -> LedgerConfig {
        let default_coin = if self.default_coin_name.is_some() || self.default_coin_symbol.is_some()
        {
            let default = DefaultCoin::default();
            DefaultCoin::new(
                self.default_coin_name.clone().unwrap_or(default.name),
                self.default_coin_symbol.clone().unwrap_or(default.symbol),
            )
        } else {
            DefaultCoin::default()
        };

        LedgerConfig::new(default_coin, self.page_size.unwrap_or(DEFAULT_PAGE_SIZE))
    }

    /// Create a SqliteConfig from CLI arguments
    pub fn to_sqlite_config(&self) -> SqliteConfig {
        SqliteConfig::new(
            self.database.clone(),
            self.max_connections
                .unwrap_or(SqliteConfig::DEFAULT_MAX_CONNECTIONS),
        )
    }
}
