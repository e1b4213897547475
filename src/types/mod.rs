//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `ids`: Internal keys, external identifiers and amounts
//! - `user`, `coin`, `entry`: Registry and balance records
//! - `transaction`, `request`: Transfer history and pending charges
//! - `role`: Per-coin roles, permissions and actions
//! - `page`, `submission`: Listing and submission envelopes
//! - `error`: Error types for the ledger

pub mod coin;
pub mod entry;
pub mod error;
pub mod ids;
pub mod page;
pub mod request;
pub mod role;
pub mod submission;
pub mod transaction;
pub mod user;

pub use coin::{Coin, CoinName, CoinSymbol, CoinUpdate, Message, NewCoin};
pub use entry::{Entry, Holding};
pub use error::LedgerError;
pub use ids::{
    Amount, CoinKey, EntryKey, ExternalId, RequestKey, RoleKey, TransactionKey, UserKey,
    DEFAULT_COIN, MAX_AMOUNT,
};
pub use page::Page;
pub use request::{NewRequest, RequestRecord};
pub use role::{Action, Level, Role, RoleName, UserRole, OWNER_LEVEL, OWNER_ROLE_NAME};
pub use submission::{Submission, Submitted};
pub use transaction::{NewTransaction, TransactionRecord};
pub use user::{User, UserName, MAX_SEARCH_TERM_LEN};
