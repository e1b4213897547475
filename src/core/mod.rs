//! Core ledger logic
//!
//! - `traits` - store and unit-of-work abstractions
//! - `entry_store` - balance reads, debits and credits
//! - `transfer` - atomic movement of units between two users
//! - `requests` - payment requests and their acceptance
//! - `permissions` - roles, levels and action gates
//! - `governance` - coin creation, edits and issuance
//! - `registry` - users and coin lookup
//! - `history` - paginated transaction and request search
//! - `ledger` - the operation surface tying the above to a store

pub mod entry_store;
pub mod governance;
pub mod history;
pub mod ledger;
pub mod permissions;
pub mod registry;
pub mod requests;
pub mod traits;
pub mod transfer;

#[cfg(test)]
pub(crate) mod testing;

pub use ledger::Ledger;
pub use traits::{Store, UnitOfWork};
