//! Coin Ledger Library
//! # Overview
//!
//! This library keeps balances of internal coins shared by a group of users and
//! moves them atomically between users, either directly or through payment
//! requests.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (User, Coin, Entry, TransactionRecord, etc.)
//! - [`config`] - Ledger and store configuration
//! - [`cli`] - CLI arguments parsing and command dispatch
//! - [`core`] - Business logic components:
//!   - [`core::entry_store`] - Balance reads, debits and credits
//!   - [`core::transfer`] - Atomic transfers between two users
//!   - [`core::requests`] - Payment requests and their acceptance
//!   - [`core::permissions`] - Per-coin roles and action gates
//!   - [`core::governance`] - Coin creation, edits and issuance
//!   - [`core::history`] - Paginated transaction and request search
//!   - [`core::ledger`] - The operation surface
//! - [`store`] - In-memory and SQLite backends
//! - [`io`] - CSV output
//!
//! # Operations
//!
//! - **Transfer**: Move units of a coin from the caller to another user
//! - **Request**: Ask another user to pay the caller; the payer accepts or declines
//! - **Issue**: Credit newly created units of a coin, gated by role level
//! - **Govern**: Create coins, rename them, and manage roles and permissions
//!
//! # Guarantees
//!
//! Every operation runs in one unit of work: it either applies completely or
//! leaves no trace. Balances never go negative, and a transfer never creates or
//! destroys units.

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod store;
pub mod types;

pub use config::{DefaultCoin, LedgerConfig, SqliteConfig};
pub use core::{Ledger, Store, UnitOfWork};
pub use store::{MemoryStore, SqliteStore};
pub use types::{
    Action, Amount, Coin, ExternalId, Holding, LedgerError, Message, Page, RequestRecord, Role,
    Submission, Submitted, TransactionRecord, User,
};
