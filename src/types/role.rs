//! Role and permission types
//!
//! Each coin carries its own privilege hierarchy. A [`Role`] is a named tier with
//! a numeric level where a lower level means more privilege; [`OWNER_LEVEL`] is
//! the top of every hierarchy. Each coin maps an [`Action`] to the level it
//! requires.

use super::error::LedgerError;
use super::ids::{CoinKey, RoleKey, UserKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Privilege level of a role; lower is more privileged
pub type Level = u32;

/// Level of the Owner role created with every coin
pub const OWNER_LEVEL: Level = 0;

/// Name of the role created with every coin
pub const OWNER_ROLE_NAME: &str = "Owner";

/// Coin-mutating actions gated by the permission engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Rename a coin or change its symbol
    EditCoinInfo,
    /// Create a new role on a coin
    AddRole,
    /// Change the permission requirements of a coin
    EditRoles,
    /// Bind a user to one of the coin's roles
    AssignRole,
    /// Credit new units of the coin to a user
    IssueCoins,
}

impl Action {
    /// All actions, in declaration order
    pub const ALL: [Action; 5] = [
        Action::EditCoinInfo,
        Action::AddRole,
        Action::EditRoles,
        Action::AssignRole,
        Action::IssueCoins,
    ];

    /// Storage and display name of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::EditCoinInfo => "EDIT_COIN_INFO",
            Action::AddRole => "ADD_ROLE",
            Action::EditRoles => "EDIT_ROLES",
            Action::AssignRole => "ASSIGN_ROLE",
            Action::IssueCoins => "ISSUE_COINS",
        }
    }

    /// Level required when the coin has no permission row for this action
    ///
    /// Unconfigured actions are reserved for owners.
    pub fn default_level(&self) -> Level {
        OWNER_LEVEL
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LedgerError::invalid_argument("action", format!("unknown action '{}'", s)))
    }
}

/// Validated role display name (1-32 characters)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoleName(String);

impl RoleName {
    /// Maximum length in characters
    pub const MAX_LEN: usize = 32;

    /// Validate and wrap a role name
    pub fn new(name: impl Into<String>) -> Result<Self, LedgerError> {
        let name = name.into();
        let len = name.trim().chars().count();
        if len == 0 || name.chars().count() > Self::MAX_LEN {
            return Err(LedgerError::invalid_argument(
                "role name",
                format!("must be between 1 and {} characters", Self::MAX_LEN),
            ));
        }
        Ok(RoleName(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RoleName {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoleName::new(s)
    }
}

/// A named privilege tier on one coin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    pub key: RoleKey,
    pub coin: CoinKey,
    pub name: String,
    pub level: Level,
}

/// Assignment of a user to a role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRole {
    pub key: i64,
    pub user: UserKey,
    pub role: RoleKey,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::exact("EDIT_COIN_INFO", Action::EditCoinInfo)]
    #[case::lowercase("add_role", Action::AddRole)]
    #[case::padded(" EDIT_ROLES ", Action::EditRoles)]
    #[case::assign("ASSIGN_ROLE", Action::AssignRole)]
    #[case::issue("issue_coins", Action::IssueCoins)]
    fn test_action_parsing(#[case] input: &str, #[case] expected: Action) {
        assert_eq!(input.parse::<Action>().unwrap(), expected);
    }

    #[test]
    fn test_action_parsing_rejects_unknown_actions() {
        let result = "DELETE_EVERYTHING".parse::<Action>();
        assert!(matches!(result, Err(LedgerError::InvalidArgument { .. })));
    }

    #[test]
    fn test_action_names_round_trip_through_display() {
        for action in Action::ALL {
            assert_eq!(action.to_string().parse::<Action>().unwrap(), action);
        }
    }

    #[test]
    fn test_unconfigured_actions_require_owner() {
        for action in Action::ALL {
            assert_eq!(action.default_level(), OWNER_LEVEL);
        }
    }

    #[rstest]
    #[case::empty("")]
    #[case::blank("   ")]
    #[case::too_long("a role name that is far too long for the column")]
    fn test_role_name_rejects_invalid_names(#[case] name: &str) {
        assert!(RoleName::new(name).is_err());
    }

    #[test]
    fn test_role_name_accepts_valid_name() {
        assert_eq!(RoleName::new("Moderator").unwrap().as_str(), "Moderator");
    }
}
