//! Ledger entries.
//!
//! A [`LedgerEntry`] is one signed monetary record attached to one account.
//! Amounts are signed integer minor units:
//! - positive values credit the account
//! - negative values debit the account
//!
//! Entries are append-only. The only write after insertion is the link-back
//! that pairs the two entries of a transfer.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Transfer,
    Income,
    Expense,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for EntryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "transfer" => Ok(Self::Transfer),
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidInput(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerEntry {
    pub id: i32,
    pub user_id: Uuid,
    pub account_id: i32,
    pub amount: MoneyCents,
    pub kind: EntryKind,
    pub linked_entry_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// An entry that has not been written yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewEntry {
    pub user_id: Uuid,
    pub account_id: i32,
    pub amount: MoneyCents,
    pub kind: EntryKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: String,
    pub account_id: i32,
    pub amount_minor: i64,
    pub transaction_type: String,
    pub linked_transaction_id: Option<i32>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&NewEntry> for ActiveModel {
    fn from(entry: &NewEntry) -> Self {
        Self {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(entry.user_id.to_string()),
            account_id: ActiveValue::Set(entry.account_id),
            amount_minor: ActiveValue::Set(entry.amount.cents()),
            transaction_type: ActiveValue::Set(entry.kind.as_str().to_string()),
            linked_transaction_id: ActiveValue::Set(None),
            created_at: ActiveValue::Set(entry.created_at),
        }
    }
}

impl TryFrom<Model> for LedgerEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            user_id: parse_uuid(&model.user_id, "user")?,
            account_id: model.account_id,
            amount: MoneyCents::new(model.amount_minor),
            kind: EntryKind::try_from(model.transaction_type.as_str())?,
            linked_entry_id: model.linked_transaction_id,
            created_at: model.created_at,
        })
    }
}
