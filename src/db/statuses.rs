//! Database queries for status sets and statuses.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entity::{status, status_set};
use crate::error::{AppError, AppResult};
use crate::models::StatusRole;

use super::{clamp_page, DbPool};

impl DbPool {
    // ---- status sets ----

    pub async fn list_status_sets(
        &self,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<status_set::Model>, u64)> {
        let select = status_set::Entity::find();
        let total = select.clone().count(self.connection()).await?;
        let (limit, offset) = clamp_page(limit, offset);
        let rows = select
            .order_by_asc(status_set::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.connection())
            .await?;

        Ok((rows, total))
    }

    pub async fn get_status_set(&self, id: i32) -> AppResult<Option<status_set::Model>> {
        Ok(status_set::Entity::find_by_id(id)
            .one(self.connection())
            .await?)
    }

    pub async fn insert_status_set(&self, name: String) -> AppResult<status_set::Model> {
        let duplicate = status_set::Entity::find()
            .filter(status_set::Column::Name.eq(&name))
            .one(self.connection())
            .await?;
        if duplicate.is_some() {
            return Err(AppError::Conflict(format!(
                "Status set '{}' already exists",
                name
            )));
        }

        let model = status_set::ActiveModel {
            name: Set(name),
            ..Default::default()
        };
        Ok(model.insert(self.connection()).await?)
    }

    pub async fn update_status_set(&self, id: i32, name: String) -> AppResult<status_set::Model> {
        let existing = self
            .get_status_set(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Status set {}", id)))?;

        let mut active: status_set::ActiveModel = existing.into();
        active.name = Set(name);
        Ok(active.update(self.connection()).await?)
    }

    // ---- statuses ----

    pub async fn list_statuses(
        &self,
        status_set_id: Option<i32>,
        role: Option<StatusRole>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<status::Model>, u64)> {
        let mut select = status::Entity::find();
        if let Some(status_set_id) = status_set_id {
            select = select.filter(status::Column::StatusSetId.eq(status_set_id));
        }
        if let Some(role) = role {
            select = select.filter(status::Column::Role.eq(role.as_str()));
        }

        let total = select.clone().count(self.connection()).await?;
        let (limit, offset) = clamp_page(limit, offset);
        let rows = select
            .order_by_asc(status::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.connection())
            .await?;

        Ok((rows, total))
    }

    pub async fn get_status(&self, id: i32) -> AppResult<Option<status::Model>> {
        Ok(status::Entity::find_by_id(id).one(self.connection()).await?)
    }

    /// Find a status by well-known role, lowest id first so the seeded
    /// default set wins over later additions.
    pub async fn find_status_by_role(&self, role: StatusRole) -> AppResult<Option<status::Model>> {
        Ok(status::Entity::find()
            .filter(status::Column::Role.eq(role.as_str()))
            .order_by_asc(status::Column::Id)
            .one(self.connection())
            .await?)
    }

    pub async fn insert_status(
        &self,
        status_set_id: i32,
        name: String,
        description: Option<String>,
        role: StatusRole,
    ) -> AppResult<status::Model> {
        if self.get_status_set(status_set_id).await?.is_none() {
            return Err(AppError::InvalidInput(format!(
                "Status set {} does not exist",
                status_set_id
            )));
        }

        let duplicate = status::Entity::find()
            .filter(status::Column::StatusSetId.eq(status_set_id))
            .filter(status::Column::Name.eq(&name))
            .one(self.connection())
            .await?;
        if duplicate.is_some() {
            return Err(AppError::Conflict(format!(
                "Status '{}' already exists in status set {}",
                name, status_set_id
            )));
        }

        let model = status::ActiveModel {
            status_set_id: Set(status_set_id),
            name: Set(name),
            description: Set(description),
            role: Set(role.as_str().to_string()),
            ..Default::default()
        };
        Ok(model.insert(self.connection()).await?)
    }

    pub async fn update_status(
        &self,
        id: i32,
        name: Option<String>,
        description: Option<String>,
        role: Option<StatusRole>,
    ) -> AppResult<status::Model> {
        let existing = self
            .get_status(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Status {}", id)))?;

        let mut active: status::ActiveModel = existing.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if description.is_some() {
            active.description = Set(description);
        }
        if let Some(role) = role {
            active.role = Set(role.as_str().to_string());
        }
        Ok(active.update(self.connection()).await?)
    }
}
