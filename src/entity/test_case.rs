//! TestCase entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "test_cases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub scenario_id: i32,
    pub status_set_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::scenario::Entity",
        from = "Column::ScenarioId",
        to = "super::scenario::Column::Id"
    )]
    Scenario,
    #[sea_orm(
        belongs_to = "super::status_set::Entity",
        from = "Column::StatusSetId",
        to = "super::status_set::Column::Id"
    )]
    StatusSet,
    #[sea_orm(has_many = "super::test_case_version::Entity")]
    Versions,
    #[sea_orm(has_many = "super::suitcase::Entity")]
    Suitcases,
}

impl Related<super::scenario::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scenario.def()
    }
}

impl Related<super::test_case_version::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Versions.def()
    }
}

impl Related<super::suitcase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Suitcases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
