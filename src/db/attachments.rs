//! Database queries for attachment metadata.
//!
//! Rows hold the `(filename, relative_path)` tuple; bytes live with the
//! storage service.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde_json::Value as JsonValue;

use crate::entity::attachment;
use crate::error::{AppError, AppResult};

use super::{clamp_page, DbPool};

/// Partial metadata update for an attachment. The stored file tuple is
/// immutable; only descriptive references change.
#[derive(Debug, Default)]
pub struct AttachmentUpdate {
    pub parent_attachment_id: Option<i32>,
    pub resolution_id: Option<i32>,
    pub presentmon_file: Option<bool>,
    pub presentmon_version: Option<String>,
    pub settings: Option<JsonValue>,
}

/// Represents an attachment row to be inserted.
pub struct NewAttachment {
    pub parent_attachment_id: Option<i32>,
    pub uploaded_by: i32,
    pub resolution_id: Option<i32>,
    pub filename: String,
    pub relative_path: String,
    pub presentmon_file: Option<bool>,
    pub presentmon_version: Option<String>,
    pub settings: Option<JsonValue>,
}

impl DbPool {
    pub async fn list_attachments(
        &self,
        uploaded_by: Option<i32>,
        parent_attachment_id: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<attachment::Model>, u64)> {
        let mut select = attachment::Entity::find();
        if let Some(uploaded_by) = uploaded_by {
            select = select.filter(attachment::Column::UploadedBy.eq(uploaded_by));
        }
        if let Some(parent_id) = parent_attachment_id {
            select = select.filter(attachment::Column::ParentAttachmentId.eq(parent_id));
        }

        let total = select.clone().count(self.connection()).await?;
        let (limit, offset) = clamp_page(limit, offset);
        let rows = select
            .order_by_desc(attachment::Column::UploadedAt)
            .offset(offset)
            .limit(limit)
            .all(self.connection())
            .await?;

        Ok((rows, total))
    }

    pub async fn get_attachment(&self, id: i32) -> AppResult<Option<attachment::Model>> {
        Ok(attachment::Entity::find_by_id(id)
            .one(self.connection())
            .await?)
    }

    /// Child attachments of a parent (e.g. capture files grouped under a
    /// screenshot), oldest first.
    pub async fn get_attachment_children(&self, id: i32) -> AppResult<Vec<attachment::Model>> {
        Ok(attachment::Entity::find()
            .filter(attachment::Column::ParentAttachmentId.eq(id))
            .order_by_asc(attachment::Column::Id)
            .all(self.connection())
            .await?)
    }

    pub async fn update_attachment(
        &self,
        id: i32,
        update: AttachmentUpdate,
    ) -> AppResult<attachment::Model> {
        let existing = self
            .get_attachment(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attachment {}", id)))?;

        if let Some(parent_id) = update.parent_attachment_id {
            if parent_id == id {
                return Err(AppError::InvalidInput(
                    "Attachment cannot be its own parent".to_string(),
                ));
            }
            if self.get_attachment(parent_id).await?.is_none() {
                return Err(AppError::InvalidInput(format!(
                    "Attachment {} does not exist",
                    parent_id
                )));
            }
        }
        if let Some(resolution_id) = update.resolution_id
            && self.get_resolution(resolution_id).await?.is_none()
        {
            return Err(AppError::InvalidInput(format!(
                "Resolution {} does not exist",
                resolution_id
            )));
        }

        let mut active: attachment::ActiveModel = existing.into();
        if update.parent_attachment_id.is_some() {
            active.parent_attachment_id = Set(update.parent_attachment_id);
        }
        if update.resolution_id.is_some() {
            active.resolution_id = Set(update.resolution_id);
        }
        if update.presentmon_file.is_some() {
            active.presentmon_file = Set(update.presentmon_file);
        }
        if update.presentmon_version.is_some() {
            active.presentmon_version = Set(update.presentmon_version);
        }
        if update.settings.is_some() {
            active.settings = Set(update.settings);
        }
        Ok(active.update(self.connection()).await?)
    }

    pub async fn insert_attachment(&self, new: NewAttachment) -> AppResult<attachment::Model> {
        if self.get_tester(new.uploaded_by).await?.is_none() {
            return Err(AppError::InvalidInput(format!(
                "Tester {} does not exist",
                new.uploaded_by
            )));
        }
        if let Some(parent_id) = new.parent_attachment_id
            && self.get_attachment(parent_id).await?.is_none()
        {
            return Err(AppError::InvalidInput(format!(
                "Attachment {} does not exist",
                parent_id
            )));
        }
        if let Some(resolution_id) = new.resolution_id
            && self.get_resolution(resolution_id).await?.is_none()
        {
            return Err(AppError::InvalidInput(format!(
                "Resolution {} does not exist",
                resolution_id
            )));
        }

        let model = attachment::ActiveModel {
            parent_attachment_id: Set(new.parent_attachment_id),
            uploaded_by: Set(new.uploaded_by),
            resolution_id: Set(new.resolution_id),
            filename: Set(new.filename),
            relative_path: Set(new.relative_path),
            uploaded_at: Set(Utc::now()),
            presentmon_file: Set(new.presentmon_file),
            presentmon_version: Set(new.presentmon_version),
            settings: Set(new.settings),
            ..Default::default()
        };
        Ok(model.insert(self.connection()).await?)
    }
}
