//! TesterGroup entity for SeaORM.
//!
//! Group membership is the `tester.tester_group_id` foreign key; creator and
//! owner are plain id columns resolved through lookups, never object graphs.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tester_groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub created_by_id: i32,
    pub owner_id: i32,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tester::Entity",
        from = "Column::CreatedById",
        to = "super::tester::Column::Id"
    )]
    CreatedBy,
    #[sea_orm(
        belongs_to = "super::tester::Entity",
        from = "Column::OwnerId",
        to = "super::tester::Column::Id"
    )]
    Owner,
}

impl ActiveModelBehavior for ActiveModel {}
