use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, FinancialGroup, GroupDirectory, GroupRole, GroupSummary, GroupView,
    ResultEngine, group_members, groups, guard, users,
    util::{normalize_required_name, now_seconds, page_bounds, parse_uuid},
};

use super::{Engine, Page, with_tx};

async fn require_user(db: &DatabaseTransaction, user_id: Uuid) -> ResultEngine<()> {
    users::Entity::find_by_id(user_id.to_string())
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| EngineError::NotFound("user".to_string()))
}

async fn insert_membership(
    db: &DatabaseTransaction,
    group_id: i32,
    user_id: Uuid,
) -> ResultEngine<()> {
    group_members::ActiveModel {
        financial_group_id: ActiveValue::Set(group_id),
        user_id: ActiveValue::Set(user_id.to_string()),
    }
    .insert(db)
    .await?;
    Ok(())
}

impl Engine {
    pub async fn create_group(
        &self,
        user_id: Uuid,
        name: &str,
        image_id: Option<i32>,
    ) -> ResultEngine<FinancialGroup> {
        let name = normalize_required_name(name, "financial group")?;
        with_tx!(self, |unit| {
            let model = groups::ActiveModel::new_group(name, user_id, image_id, now_seconds())
                .insert(unit.connection())
                .await?;
            FinancialGroup::try_from(model)
        })
    }

    /// Return a group with the caller's role and every user in it.
    pub async fn group(&self, user_id: Uuid, group_id: i32) -> ResultEngine<GroupView> {
        with_tx!(self, |unit| {
            let (group, role) =
                guard::can_act_on_group(&unit, user_id, group_id, GroupRole::Member).await?;
            let rows = group_members::Entity::find()
                .filter(group_members::Column::FinancialGroupId.eq(group_id))
                .order_by_asc(group_members::Column::UserId)
                .all(unit.connection())
                .await?;
            let mut members = Vec::with_capacity(rows.len() + 1);
            members.push(group.owner_id);
            for row in rows {
                members.push(parse_uuid(&row.user_id, "user")?);
            }
            Ok(GroupView {
                group,
                role,
                members,
            })
        })
    }

    /// Groups owned by `user_id` (`Owner`) or joined by it (`Member`).
    pub async fn list_groups(
        &self,
        user_id: Uuid,
        role: GroupRole,
        page: u64,
        size: u64,
    ) -> ResultEngine<Page<GroupSummary>> {
        let (offset, limit) = page_bounds(page, size)?;
        with_tx!(self, |unit| {
            let query = match role {
                GroupRole::Owner => {
                    groups::Entity::find().filter(groups::Column::UserId.eq(user_id.to_string()))
                }
                GroupRole::Member => groups::Entity::find()
                    .inner_join(group_members::Entity)
                    .filter(group_members::Column::UserId.eq(user_id.to_string())),
            };
            let total = query.clone().count(unit.connection()).await?;
            let items = query
                .order_by_asc(groups::Column::Id)
                .offset(offset)
                .limit(limit)
                .all(unit.connection())
                .await?
                .into_iter()
                .map(|model| GroupSummary {
                    id: model.id,
                    name: model.name,
                })
                .collect();
            Ok(Page::new(items, page, size, total))
        })
    }

    /// Add `member_id` to a group. Owner only.
    pub async fn add_group_member(
        &self,
        user_id: Uuid,
        group_id: i32,
        member_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |unit| {
            let (group, _) =
                guard::can_act_on_group(&unit, user_id, group_id, GroupRole::Owner).await?;
            require_user(unit.connection(), member_id).await?;
            if group.is_owned_by(member_id) {
                return Err(EngineError::InvalidInput(
                    "the owner is already part of the group".to_string(),
                ));
            }
            if unit.is_member(group_id, member_id).await? {
                return Err(EngineError::InvalidInput(
                    "user is already a member".to_string(),
                ));
            }
            insert_membership(unit.connection(), group_id, member_id).await
        })
    }

    /// Remove `member_id` from a group.
    ///
    /// The owner may remove anyone but themselves; a member may only remove
    /// themselves.
    pub async fn remove_group_member(
        &self,
        user_id: Uuid,
        group_id: i32,
        member_id: Uuid,
    ) -> ResultEngine<()> {
        let required = if user_id == member_id {
            GroupRole::Member
        } else {
            GroupRole::Owner
        };
        with_tx!(self, |unit| {
            let (group, _) = guard::can_act_on_group(&unit, user_id, group_id, required).await?;
            if group.is_owned_by(member_id) {
                return Err(EngineError::InvalidInput(
                    "the owner cannot leave the group, transfer ownership first".to_string(),
                ));
            }
            let res = group_members::Entity::delete_by_id((group_id, member_id.to_string()))
                .exec(unit.connection())
                .await?;
            if res.rows_affected == 0 {
                return Err(EngineError::NotFound("group member".to_string()));
            }
            Ok(())
        })
    }

    /// Hand the group to one of its members. The previous owner stays on as
    /// a member.
    pub async fn transfer_group_ownership(
        &self,
        user_id: Uuid,
        group_id: i32,
        new_owner_id: Uuid,
    ) -> ResultEngine<FinancialGroup> {
        if user_id == new_owner_id {
            return Err(EngineError::InvalidInput(
                "user already owns the group".to_string(),
            ));
        }
        with_tx!(self, |unit| {
            guard::can_act_on_group(&unit, user_id, group_id, GroupRole::Owner).await?;
            if !unit.is_member(group_id, new_owner_id).await? {
                return Err(EngineError::InvalidInput(
                    "new owner must be a member of the group".to_string(),
                ));
            }

            group_members::Entity::delete_by_id((group_id, new_owner_id.to_string()))
                .exec(unit.connection())
                .await?;
            insert_membership(unit.connection(), group_id, user_id).await?;
            groups::Entity::update_many()
                .col_expr(groups::Column::UserId, Expr::value(new_owner_id.to_string()))
                .col_expr(groups::Column::UpdatedAt, Expr::value(now_seconds()))
                .filter(groups::Column::Id.eq(group_id))
                .exec(unit.connection())
                .await?;

            unit.group(group_id)
                .await?
                .ok_or_else(|| EngineError::NotFound("financial group".to_string()))
        })
    }

    /// Delete a group and its memberships. Owner only.
    pub async fn delete_group(&self, user_id: Uuid, group_id: i32) -> ResultEngine<()> {
        with_tx!(self, |unit| {
            guard::can_act_on_group(&unit, user_id, group_id, GroupRole::Owner).await?;
            group_members::Entity::delete_many()
                .filter(group_members::Column::FinancialGroupId.eq(group_id))
                .exec(unit.connection())
                .await?;
            groups::Entity::delete_by_id(group_id)
                .exec(unit.connection())
                .await?;
            tracing::info!(user_id = %user_id, group_id, "financial group deleted");
            Ok(())
        })
    }
}
