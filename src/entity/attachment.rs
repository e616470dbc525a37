//! Attachment entity for SeaORM.
//!
//! Only the `(filename, relative_path)` tuple lives here; file bytes are the
//! storage service's concern. Parent/children nesting is the
//! `parent_attachment_id` column, resolved on demand.

use sea_orm::entity::prelude::*;
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "attachments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub parent_attachment_id: Option<i32>,
    pub uploaded_by: i32,
    pub resolution_id: Option<i32>,
    pub filename: String,
    pub relative_path: String,
    pub uploaded_at: DateTimeUtc,
    pub presentmon_file: Option<bool>,
    pub presentmon_version: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub settings: Option<JsonValue>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentAttachmentId",
        to = "Column::Id"
    )]
    Parent,
    #[sea_orm(
        belongs_to = "super::tester::Entity",
        from = "Column::UploadedBy",
        to = "super::tester::Column::Id"
    )]
    Uploader,
    #[sea_orm(
        belongs_to = "super::resolution::Entity",
        from = "Column::ResolutionId",
        to = "super::resolution::Column::Id"
    )]
    Resolution,
}

impl Related<super::resolution::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Resolution.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
