//! TestCaseVersion entity for SeaORM.
//!
//! Versions are immutable snapshots. The `version` number is assigned
//! server-side, starts at 1 per test case, and is never reused.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "test_case_versions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub test_case_id: i32,
    pub created_by: i32,
    pub release_ready: bool,
    pub version: i32,
    pub name: Option<String>,
    pub description: Option<String>,
    pub steps: Option<String>,
    pub expected_result: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::test_case::Entity",
        from = "Column::TestCaseId",
        to = "super::test_case::Column::Id",
        on_delete = "Cascade"
    )]
    TestCase,
    #[sea_orm(
        belongs_to = "super::tester::Entity",
        from = "Column::CreatedBy",
        to = "super::tester::Column::Id"
    )]
    Creator,
    #[sea_orm(has_many = "super::execution::Entity")]
    Executions,
}

impl Related<super::test_case::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TestCase.def()
    }
}

impl Related<super::execution::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Executions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
