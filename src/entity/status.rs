//! Status entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "statuses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub status_set_id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Well-known role tag (`not_run`, `passed`, ...), assigned at seed time.
    pub role: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::status_set::Entity",
        from = "Column::StatusSetId",
        to = "super::status_set::Column::Id"
    )]
    StatusSet,
    #[sea_orm(has_many = "super::execution::Entity")]
    Executions,
}

impl Related<super::status_set::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusSet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
