//! TesterType entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tester_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tester::Entity")]
    Testers,
}

impl Related<super::tester::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Testers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
