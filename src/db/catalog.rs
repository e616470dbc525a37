//! Database queries for the flat catalog entities: clients, projects,
//! devices, resolutions, and scenarios.

use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entity::{client, device, project, resolution, scenario};
use crate::error::{AppError, AppResult};

use super::{clamp_page, DbPool};

/// Fields accepted when creating or updating a device.
#[derive(Debug, Default)]
pub struct DeviceFields {
    pub name_external: Option<String>,
    pub name_internal: Option<String>,
    pub cpu: Option<String>,
    pub gpu: Option<String>,
    pub ram: Option<String>,
}

impl DbPool {
    // ---- clients ----

    pub async fn list_clients(
        &self,
        name: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<client::Model>, u64)> {
        let mut select = client::Entity::find();
        if let Some(name) = name {
            select = select
                .filter(Expr::col(client::Column::Name).ilike(format!("%{}%", name)));
        }

        let total = select.clone().count(self.connection()).await?;
        let (limit, offset) = clamp_page(limit, offset);
        let rows = select
            .order_by_asc(client::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.connection())
            .await?;

        Ok((rows, total))
    }

    pub async fn get_client(&self, id: i32) -> AppResult<Option<client::Model>> {
        Ok(client::Entity::find_by_id(id).one(self.connection()).await?)
    }

    pub async fn insert_client(&self, name: String) -> AppResult<client::Model> {
        let model = client::ActiveModel {
            name: Set(name),
            ..Default::default()
        };
        Ok(model.insert(self.connection()).await?)
    }

    pub async fn update_client(&self, id: i32, name: String) -> AppResult<client::Model> {
        let existing = self
            .get_client(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Client {}", id)))?;

        let mut active: client::ActiveModel = existing.into();
        active.name = Set(name);
        Ok(active.update(self.connection()).await?)
    }

    // ---- projects ----

    pub async fn list_projects(
        &self,
        client_id: Option<i32>,
        name: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<project::Model>, u64)> {
        let mut select = project::Entity::find();
        if let Some(client_id) = client_id {
            select = select.filter(project::Column::ClientId.eq(client_id));
        }
        if let Some(name) = name {
            select = select
                .filter(Expr::col(project::Column::Name).ilike(format!("%{}%", name)));
        }

        let total = select.clone().count(self.connection()).await?;
        let (limit, offset) = clamp_page(limit, offset);
        let rows = select
            .order_by_asc(project::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.connection())
            .await?;

        Ok((rows, total))
    }

    pub async fn get_project(&self, id: i32) -> AppResult<Option<project::Model>> {
        Ok(project::Entity::find_by_id(id).one(self.connection()).await?)
    }

    pub async fn insert_project(&self, client_id: i32, name: String) -> AppResult<project::Model> {
        if self.get_client(client_id).await?.is_none() {
            return Err(AppError::InvalidInput(format!(
                "Client {} does not exist",
                client_id
            )));
        }

        let model = project::ActiveModel {
            client_id: Set(client_id),
            name: Set(name),
            ..Default::default()
        };
        Ok(model.insert(self.connection()).await?)
    }

    pub async fn update_project(
        &self,
        id: i32,
        client_id: Option<i32>,
        name: Option<String>,
    ) -> AppResult<project::Model> {
        let existing = self
            .get_project(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {}", id)))?;

        let mut active: project::ActiveModel = existing.into();
        if let Some(client_id) = client_id {
            if self.get_client(client_id).await?.is_none() {
                return Err(AppError::InvalidInput(format!(
                    "Client {} does not exist",
                    client_id
                )));
            }
            active.client_id = Set(client_id);
        }
        if let Some(name) = name {
            active.name = Set(name);
        }
        Ok(active.update(self.connection()).await?)
    }

    // ---- devices ----

    pub async fn list_devices(
        &self,
        project_id: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<device::Model>, u64)> {
        let mut select = device::Entity::find();
        if let Some(project_id) = project_id {
            select = select.filter(device::Column::ProjectId.eq(project_id));
        }

        let total = select.clone().count(self.connection()).await?;
        let (limit, offset) = clamp_page(limit, offset);
        let rows = select
            .order_by_asc(device::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.connection())
            .await?;

        Ok((rows, total))
    }

    pub async fn get_device(&self, id: i32) -> AppResult<Option<device::Model>> {
        Ok(device::Entity::find_by_id(id).one(self.connection()).await?)
    }

    pub async fn insert_device(
        &self,
        project_id: i32,
        fields: DeviceFields,
    ) -> AppResult<device::Model> {
        if self.get_project(project_id).await?.is_none() {
            return Err(AppError::InvalidInput(format!(
                "Project {} does not exist",
                project_id
            )));
        }

        let model = device::ActiveModel {
            project_id: Set(project_id),
            name_external: Set(fields.name_external),
            name_internal: Set(fields.name_internal),
            cpu: Set(fields.cpu),
            gpu: Set(fields.gpu),
            ram: Set(fields.ram),
            ..Default::default()
        };
        Ok(model.insert(self.connection()).await?)
    }

    pub async fn update_device(
        &self,
        id: i32,
        project_id: Option<i32>,
        fields: DeviceFields,
    ) -> AppResult<device::Model> {
        let existing = self
            .get_device(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Device {}", id)))?;

        let mut active: device::ActiveModel = existing.into();
        if let Some(project_id) = project_id {
            if self.get_project(project_id).await?.is_none() {
                return Err(AppError::InvalidInput(format!(
                    "Project {} does not exist",
                    project_id
                )));
            }
            active.project_id = Set(project_id);
        }
        if fields.name_external.is_some() {
            active.name_external = Set(fields.name_external);
        }
        if fields.name_internal.is_some() {
            active.name_internal = Set(fields.name_internal);
        }
        if fields.cpu.is_some() {
            active.cpu = Set(fields.cpu);
        }
        if fields.gpu.is_some() {
            active.gpu = Set(fields.gpu);
        }
        if fields.ram.is_some() {
            active.ram = Set(fields.ram);
        }
        Ok(active.update(self.connection()).await?)
    }

    // ---- resolutions ----

    pub async fn list_resolutions(
        &self,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<resolution::Model>, u64)> {
        let select = resolution::Entity::find();
        let total = select.clone().count(self.connection()).await?;
        let (limit, offset) = clamp_page(limit, offset);
        let rows = select
            .order_by_asc(resolution::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.connection())
            .await?;

        Ok((rows, total))
    }

    pub async fn get_resolution(&self, id: i32) -> AppResult<Option<resolution::Model>> {
        Ok(resolution::Entity::find_by_id(id)
            .one(self.connection())
            .await?)
    }

    pub async fn insert_resolution(&self, h: i32, w: i32) -> AppResult<resolution::Model> {
        let duplicate = resolution::Entity::find()
            .filter(resolution::Column::H.eq(h))
            .filter(resolution::Column::W.eq(w))
            .one(self.connection())
            .await?;
        if duplicate.is_some() {
            return Err(AppError::Conflict(format!(
                "Resolution {}x{} already exists",
                h, w
            )));
        }

        let model = resolution::ActiveModel {
            h: Set(h),
            w: Set(w),
            ..Default::default()
        };
        Ok(model.insert(self.connection()).await?)
    }

    // ---- scenarios ----

    pub async fn list_scenarios(
        &self,
        name: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<scenario::Model>, u64)> {
        let mut select = scenario::Entity::find();
        if let Some(name) = name {
            select = select
                .filter(Expr::col(scenario::Column::Name).ilike(format!("%{}%", name)));
        }

        let total = select.clone().count(self.connection()).await?;
        let (limit, offset) = clamp_page(limit, offset);
        let rows = select
            .order_by_asc(scenario::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.connection())
            .await?;

        Ok((rows, total))
    }

    pub async fn get_scenario(&self, id: i32) -> AppResult<Option<scenario::Model>> {
        Ok(scenario::Entity::find_by_id(id).one(self.connection()).await?)
    }

    pub async fn insert_scenario(&self, name: String) -> AppResult<scenario::Model> {
        let duplicate = scenario::Entity::find()
            .filter(scenario::Column::Name.eq(&name))
            .one(self.connection())
            .await?;
        if duplicate.is_some() {
            return Err(AppError::Conflict(format!(
                "Scenario '{}' already exists",
                name
            )));
        }

        let model = scenario::ActiveModel {
            name: Set(name),
            ..Default::default()
        };
        Ok(model.insert(self.connection()).await?)
    }

    pub async fn update_scenario(&self, id: i32, name: String) -> AppResult<scenario::Model> {
        let existing = self
            .get_scenario(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Scenario {}", id)))?;

        let mut active: scenario::ActiveModel = existing.into();
        active.name = Set(name);
        Ok(active.update(self.connection()).await?)
    }
}
