//! Membership relation between users and financial groups.
//!
//! The owner is never stored here: ownership lives on the group row and
//! implies membership.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "user_financial_groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub financial_group_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::FinancialGroupId",
        to = "super::groups::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    FinancialGroups,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialGroups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
