//! Role and permission engine
//!
//! A user's standing on a coin is the lowest level among the roles bound to
//! them on that coin. An action is allowed when that level is at or below the
//! level the coin requires for the action. Coins without a permission row for
//! an action fall back to [`Action::default_level`], which admits owners only.
//!
//! Administrative operations can never hand out more privilege than the caller
//! holds: new roles, role assignments and permission levels are all bounded by
//! the caller's own level.

use crate::core::traits::UnitOfWork;
use crate::types::{
    Action, CoinKey, Level, LedgerError, Role, RoleKey, RoleName, UserKey, OWNER_LEVEL,
    OWNER_ROLE_NAME,
};

/// Create the Owner role of a new coin and bind `user` to it
pub async fn assign_owner_role<U: UnitOfWork>(
    unit: &mut U,
    coin: CoinKey,
    user: UserKey,
) -> Result<Role, LedgerError> {
    let role = unit.insert_role(coin, OWNER_ROLE_NAME, OWNER_LEVEL).await?;
    unit.insert_user_role(user, role.key).await?;
    Ok(role)
}

/// Most privileged level `user` holds on `coin`, `None` without any role
pub async fn effective_level<U: UnitOfWork>(
    unit: &mut U,
    coin: CoinKey,
    user: UserKey,
) -> Result<Option<Level>, LedgerError> {
    let roles = unit.roles_of_user(user, Some(coin)).await?;
    Ok(roles.iter().map(|role| role.level).min())
}

/// Level `coin` requires for `action`
pub async fn required_level<U: UnitOfWork>(
    unit: &mut U,
    coin: CoinKey,
    action: Action,
) -> Result<Level, LedgerError> {
    Ok(unit
        .permission(coin, action)
        .await?
        .unwrap_or_else(|| action.default_level()))
}

/// Decide whether `user` may perform `action` on `coin`
pub async fn authorize<U: UnitOfWork>(
    unit: &mut U,
    coin: CoinKey,
    user: UserKey,
    action: Action,
) -> Result<bool, LedgerError> {
    match require(unit, coin, user, action).await {
        Ok(_) => Ok(true),
        Err(LedgerError::Unauthorized { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Require that `user` may perform `action` on `coin`
///
/// # Returns
///
/// The user's effective level on the coin
///
/// # Errors
///
/// Returns `Unauthorized` if the user holds no role on the coin or their level
/// is above the required level. Store errors are passed through.
pub async fn require<U: UnitOfWork>(
    unit: &mut U,
    coin: CoinKey,
    user: UserKey,
    action: Action,
) -> Result<Level, LedgerError> {
    let Some(level) = effective_level(unit, coin, user).await? else {
        return Err(LedgerError::unauthorized(user, coin, action));
    };

    let required = required_level(unit, coin, action).await?;
    if level > required {
        return Err(LedgerError::unauthorized(user, coin, action));
    }
    Ok(level)
}

/// Reject levels more privileged than the caller's own
fn ensure_within(
    caller_level: Level,
    level: Level,
    caller: UserKey,
    coin: CoinKey,
    action: Action,
) -> Result<(), LedgerError> {
    if level < caller_level {
        return Err(LedgerError::unauthorized(caller, coin, action));
    }
    Ok(())
}

/// Create a role on `coin`
///
/// # Errors
///
/// Returns `Unauthorized` if the caller may not add roles or `level` is more
/// privileged than the caller's own level.
pub async fn add_role<U: UnitOfWork>(
    unit: &mut U,
    caller: UserKey,
    coin: CoinKey,
    name: &RoleName,
    level: Level,
) -> Result<Role, LedgerError> {
    let caller_level = require(unit, coin, caller, Action::AddRole).await?;
    ensure_within(caller_level, level, caller, coin, Action::AddRole)?;
    unit.insert_role(coin, name.as_str(), level).await
}

/// Bind `target` to a role of `coin`
///
/// Binding a user to a role they already hold is allowed and has no effect on
/// their effective level.
///
/// # Errors
///
/// - `Unauthorized` if the caller may not assign roles or the role is more
///   privileged than the caller's own level
/// - `NotFound` if the role does not exist on `coin`
pub async fn assign_role<U: UnitOfWork>(
    unit: &mut U,
    caller: UserKey,
    coin: CoinKey,
    target: UserKey,
    role: RoleKey,
) -> Result<Role, LedgerError> {
    let caller_level = require(unit, coin, caller, Action::AssignRole).await?;

    let role = unit
        .role(role)
        .await?
        .filter(|found| found.coin == coin)
        .ok_or_else(|| LedgerError::not_found("Role", role))?;
    ensure_within(caller_level, role.level, caller, coin, Action::AssignRole)?;

    unit.insert_user_role(target, role.key).await?;
    Ok(role)
}

/// Set the level `coin` requires for `action`
///
/// # Errors
///
/// Returns `Unauthorized` if the caller may not edit roles or `level` is more
/// privileged than the caller's own level.
pub async fn set_permission<U: UnitOfWork>(
    unit: &mut U,
    caller: UserKey,
    coin: CoinKey,
    action: Action,
    level: Level,
) -> Result<(), LedgerError> {
    let caller_level = require(unit, coin, caller, Action::EditRoles).await?;
    ensure_within(caller_level, level, caller, coin, Action::EditRoles)?;
    unit.upsert_permission(coin, action, level).await
}
