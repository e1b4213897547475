//! User types
//!
//! Users are created by the registration flow; the core only reads them to map
//! an authenticated account identifier to an internal key.

use super::error::LedgerError;
use super::ids::{ExternalId, UserKey};
use serde::Serialize;
use std::str::FromStr;

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Internal key
    pub key: UserKey,

    /// Stable account identifier handed out at registration
    ///
    /// Immutable for the lifetime of the user.
    pub account_id: ExternalId,

    /// Display name
    pub name: String,
}

/// Validated display name of a new user (4-45 characters)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    pub const MIN_LEN: usize = 4;
    pub const MAX_LEN: usize = 45;

    pub fn new(name: impl Into<String>) -> Result<Self, LedgerError> {
        let name = name.into();
        let len = name.trim().chars().count();
        if len < Self::MIN_LEN || name.chars().count() > Self::MAX_LEN {
            return Err(LedgerError::invalid_argument(
                "name",
                format!(
                    "must be between {} and {} characters",
                    Self::MIN_LEN,
                    Self::MAX_LEN
                ),
            ));
        }
        Ok(UserName(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for UserName {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserName::new(s)
    }
}

/// Longest prefix accepted by user search
pub const MAX_SEARCH_TERM_LEN: usize = 50;
