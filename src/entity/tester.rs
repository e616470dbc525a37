//! Tester entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "testers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub tester_group_id: Option<i32>,
    pub tester_type_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// bcrypt hash, never the plaintext password.
    pub password_hash: String,
    pub active: bool,
    pub created_at: DateTimeUtc,
    pub last_login_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tester_type::Entity",
        from = "Column::TesterTypeId",
        to = "super::tester_type::Column::Id"
    )]
    TesterType,
    #[sea_orm(
        belongs_to = "super::tester_group::Entity",
        from = "Column::TesterGroupId",
        to = "super::tester_group::Column::Id"
    )]
    TesterGroup,
    #[sea_orm(has_many = "super::execution::Entity")]
    Executions,
}

impl Related<super::tester_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TesterType.def()
    }
}

impl Related<super::tester_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TesterGroup.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
