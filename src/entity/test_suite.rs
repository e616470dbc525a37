//! TestSuite entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "test_suites")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::suitcase::Entity")]
    Suitcases,
}

impl Related<super::suitcase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Suitcases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
