//! Execution entity for SeaORM.
//!
//! `(run_id, test_case_version_id)` is unique: at most one execution per
//! version per run. The version reference is immutable after creation.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "executions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub device_id: i32,
    pub run_id: i32,
    pub test_case_version_id: i32,
    pub executed_by: i32,
    pub status_id: i32,
    pub attachment_id: Option<i32>,
    pub actual_result: Option<String>,
    pub executed_at: Option<DateTimeUtc>,
    pub execution_order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::device::Entity",
        from = "Column::DeviceId",
        to = "super::device::Column::Id"
    )]
    Device,
    #[sea_orm(
        belongs_to = "super::run::Entity",
        from = "Column::RunId",
        to = "super::run::Column::Id",
        on_delete = "Cascade"
    )]
    Run,
    #[sea_orm(
        belongs_to = "super::test_case_version::Entity",
        from = "Column::TestCaseVersionId",
        to = "super::test_case_version::Column::Id"
    )]
    TestCaseVersion,
    #[sea_orm(
        belongs_to = "super::tester::Entity",
        from = "Column::ExecutedBy",
        to = "super::tester::Column::Id"
    )]
    Executor,
    #[sea_orm(
        belongs_to = "super::status::Entity",
        from = "Column::StatusId",
        to = "super::status::Column::Id"
    )]
    Status,
    #[sea_orm(
        belongs_to = "super::attachment::Entity",
        from = "Column::AttachmentId",
        to = "super::attachment::Column::Id"
    )]
    Attachment,
}

impl Related<super::device::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Device.def()
    }
}

impl Related<super::tester::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Executor.def()
    }
}

impl Related<super::run::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Run.def()
    }
}

impl Related<super::test_case_version::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TestCaseVersion.def()
    }
}

impl Related<super::status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Status.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
