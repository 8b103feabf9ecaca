//! The module contains `Account` and its database entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, util::parse_uuid};

/// Whether an account holds the user's own money or mirrors a counterparty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    #[default]
    #[serde(rename = "self")]
    Own,
    External,
}

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Own => "self",
            Self::External => "external",
        }
    }
}

impl TryFrom<&str> for AccountKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "self" => Ok(Self::Own),
            "external" => Ok(Self::External),
            other => Err(EngineError::InvalidInput(format!(
                "invalid account type: {other}"
            ))),
        }
    }
}

/// An account.
///
/// The balance is never written directly: it changes only through
/// [`AccountStore::apply_delta`](crate::AccountStore::apply_delta).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub id: i32,
    pub user_id: Uuid,
    pub name: String,
    pub category_id: Option<i32>,
    pub kind: AccountKind,
    pub balance: MoneyCents,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Fields of an account that may be changed after creation.
///
/// Only the fields set to `Some` are written.
#[derive(Clone, Debug, Default)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub category_id: Option<i32>,
    pub kind: Option<AccountKind>,
}

impl AccountPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.category_id.is_none() && self.kind.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: String,
    pub name: String,
    pub category_id: Option<i32>,
    pub kind: String,
    pub balance_minor: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    /// Build an active model that only touches the columns present in `patch`.
    pub(crate) fn from_patch(id: i32, patch: &AccountPatch, now: DateTime<Utc>) -> Self {
        let mut active = Self {
            id: ActiveValue::Unchanged(id),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };
        if let Some(name) = &patch.name {
            active.name = ActiveValue::Set(name.clone());
        }
        if let Some(category_id) = patch.category_id {
            active.category_id = ActiveValue::Set(Some(category_id));
        }
        if let Some(kind) = patch.kind {
            active.kind = ActiveValue::Set(kind.as_str().to_string());
        }
        active
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            user_id: parse_uuid(&model.user_id, "user")?,
            name: model.name,
            category_id: model.category_id,
            kind: AccountKind::try_from(model.kind.as_str())?,
            balance: MoneyCents::new(model.balance_minor),
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_storage_names() {
        for kind in [AccountKind::Own, AccountKind::External] {
            assert_eq!(AccountKind::try_from(kind.as_str()).unwrap(), kind);
        }
        assert!(AccountKind::try_from("savings").is_err());
    }

    #[test]
    fn patch_only_sets_present_columns() {
        let patch = AccountPatch {
            name: Some("Bank".to_string()),
            ..Default::default()
        };
        let active = ActiveModel::from_patch(7, &patch, Utc::now());
        assert!(matches!(active.name, ActiveValue::Set(ref n) if n == "Bank"));
        assert!(matches!(active.category_id, ActiveValue::NotSet));
        assert!(matches!(active.kind, ActiveValue::NotSet));
        assert!(matches!(active.balance_minor, ActiveValue::NotSet));
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(AccountPatch::default().is_empty());
    }
}
