//! Financial groups: named sets of users sharing a budget.
//!
//! A group has exactly one owner, stored on the group row. Other users join
//! through [`group_members`](crate::group_members).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

/// Role of a user inside a financial group.
///
/// - `owner`: can delete the group and manage members.
/// - `member`: read access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupRole {
    Owner,
    Member,
}

impl GroupRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Member => "member",
        }
    }

    /// Returns `true` when a user holding `self` may perform an operation that
    /// requires `required`.
    pub fn satisfies(self, required: GroupRole) -> bool {
        match required {
            Self::Owner => self == Self::Owner,
            Self::Member => true,
        }
    }
}

impl TryFrom<&str> for GroupRole {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "owner" => Ok(Self::Owner),
            "member" => Ok(Self::Member),
            other => Err(EngineError::InvalidInput(format!("invalid role: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinancialGroup {
    pub id: i32,
    pub name: String,
    pub owner_id: Uuid,
    pub image_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FinancialGroup {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

/// A group as seen by one of its users.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupView {
    pub group: FinancialGroup,
    pub role: GroupRole,
    /// Every user of the group, owner first.
    pub members: Vec<Uuid>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupSummary {
    pub id: i32,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "financial_groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub user_id: String,
    pub image_id: Option<i32>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::group_members::Entity")]
    Members,
}

impl Related<super::group_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn new_group(
        name: String,
        owner_id: Uuid,
        image_id: Option<i32>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(name),
            user_id: ActiveValue::Set(owner_id.to_string()),
            image_id: ActiveValue::Set(image_id),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
    }
}

impl TryFrom<Model> for FinancialGroup {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            name: model.name,
            owner_id: parse_uuid(&model.user_id, "user")?,
            image_id: model.image_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
