//! Access checks for accounts and financial groups.
//!
//! Pure reads: the guard never writes. A missing row is `NotFound`, an
//! existing row the caller has no relationship with is `Unauthorized`.

use uuid::Uuid;

use crate::{
    Account, AccountReader, EngineError, FinancialGroup, GroupDirectory, GroupRole, ResultEngine,
};

/// Resolve an account the caller may act on.
///
/// Accounts are not shared through groups: only the owner passes.
pub async fn can_act_on_account<R>(
    reader: &R,
    user_id: Uuid,
    account_id: i32,
) -> ResultEngine<Account>
where
    R: AccountReader + ?Sized,
{
    let account = reader
        .account(account_id)
        .await?
        .ok_or_else(|| EngineError::NotFound("account".to_string()))?;
    if !account.is_owned_by(user_id) {
        return Err(EngineError::Unauthorized(format!(
            "account {account_id} belongs to another user"
        )));
    }
    Ok(account)
}

/// Resolve a group and the caller's role in it, requiring at least `required`.
pub async fn can_act_on_group<D>(
    directory: &D,
    user_id: Uuid,
    group_id: i32,
    required: GroupRole,
) -> ResultEngine<(FinancialGroup, GroupRole)>
where
    D: GroupDirectory + ?Sized,
{
    let group = directory
        .group(group_id)
        .await?
        .ok_or_else(|| EngineError::NotFound("financial group".to_string()))?;

    let role = if group.is_owned_by(user_id) {
        GroupRole::Owner
    } else if directory.is_member(group_id, user_id).await? {
        GroupRole::Member
    } else {
        return Err(EngineError::Unauthorized(format!(
            "not a member of financial group {group_id}"
        )));
    };

    if !role.satisfies(required) {
        return Err(EngineError::Unauthorized(format!(
            "{} role required on financial group {group_id}",
            required.as_str()
        )));
    }
    Ok((group, role))
}
