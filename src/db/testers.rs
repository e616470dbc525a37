//! Database queries for testers, tester types, and tester groups.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entity::{tester, tester_group, tester_type};
use crate::error::{AppError, AppResult};

use super::{clamp_page, DbPool};

/// Query parameters for testers.
#[derive(Debug, Default)]
pub struct QueryTestersParams {
    pub tester_type_id: Option<i32>,
    pub tester_group_id: Option<i32>,
    pub active: Option<bool>,
    pub limit: i64,
    pub offset: i64,
}

/// Fields for creating a tester. The password arrives already hashed.
pub struct NewTester {
    pub tester_type_id: i32,
    pub tester_group_id: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Partial update for a tester.
#[derive(Debug, Default)]
pub struct TesterUpdate {
    pub tester_type_id: Option<i32>,
    pub tester_group_id: Option<i32>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub active: Option<bool>,
}

impl DbPool {
    // ---- tester types ----

    pub async fn list_tester_types(
        &self,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<tester_type::Model>, u64)> {
        let select = tester_type::Entity::find();
        let total = select.clone().count(self.connection()).await?;
        let (limit, offset) = clamp_page(limit, offset);
        let rows = select
            .order_by_asc(tester_type::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.connection())
            .await?;

        Ok((rows, total))
    }

    pub async fn get_tester_type(&self, id: i32) -> AppResult<Option<tester_type::Model>> {
        Ok(tester_type::Entity::find_by_id(id)
            .one(self.connection())
            .await?)
    }

    pub async fn insert_tester_type(
        &self,
        name: String,
        description: Option<String>,
    ) -> AppResult<tester_type::Model> {
        let duplicate = tester_type::Entity::find()
            .filter(tester_type::Column::Name.eq(&name))
            .one(self.connection())
            .await?;
        if duplicate.is_some() {
            return Err(AppError::Conflict(format!(
                "Tester type '{}' already exists",
                name
            )));
        }

        let model = tester_type::ActiveModel {
            name: Set(name),
            description: Set(description),
            ..Default::default()
        };
        Ok(model.insert(self.connection()).await?)
    }

    pub async fn update_tester_type(
        &self,
        id: i32,
        name: Option<String>,
        description: Option<String>,
    ) -> AppResult<tester_type::Model> {
        let existing = self
            .get_tester_type(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tester type {}", id)))?;

        let mut active: tester_type::ActiveModel = existing.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if description.is_some() {
            active.description = Set(description);
        }
        Ok(active.update(self.connection()).await?)
    }

    /// The tier assigned to self-registered accounts.
    pub async fn find_default_tester_type(&self) -> AppResult<Option<tester_type::Model>> {
        Ok(tester_type::Entity::find()
            .filter(tester_type::Column::Name.eq("Tester"))
            .one(self.connection())
            .await?)
    }

    /// Whether the tester type marks the admin tier.
    pub async fn is_admin_tester_type(&self, tester_type_id: i32) -> AppResult<bool> {
        Ok(self
            .get_tester_type(tester_type_id)
            .await?
            .map(|t| t.name == "Admin")
            .unwrap_or(false))
    }

    // ---- tester groups ----

    pub async fn list_tester_groups(
        &self,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<tester_group::Model>, u64)> {
        let select = tester_group::Entity::find();
        let total = select.clone().count(self.connection()).await?;
        let (limit, offset) = clamp_page(limit, offset);
        let rows = select
            .order_by_asc(tester_group::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.connection())
            .await?;

        Ok((rows, total))
    }

    pub async fn get_tester_group(&self, id: i32) -> AppResult<Option<tester_group::Model>> {
        Ok(tester_group::Entity::find_by_id(id)
            .one(self.connection())
            .await?)
    }

    pub async fn insert_tester_group(
        &self,
        name: String,
        created_by_id: i32,
        owner_id: i32,
    ) -> AppResult<tester_group::Model> {
        for tester_id in [created_by_id, owner_id] {
            if self.get_tester(tester_id).await?.is_none() {
                return Err(AppError::InvalidInput(format!(
                    "Tester {} does not exist",
                    tester_id
                )));
            }
        }

        let duplicate = tester_group::Entity::find()
            .filter(tester_group::Column::Name.eq(&name))
            .one(self.connection())
            .await?;
        if duplicate.is_some() {
            return Err(AppError::Conflict(format!(
                "Tester group '{}' already exists",
                name
            )));
        }

        let model = tester_group::ActiveModel {
            name: Set(name),
            created_by_id: Set(created_by_id),
            owner_id: Set(owner_id),
            ..Default::default()
        };
        Ok(model.insert(self.connection()).await?)
    }

    pub async fn update_tester_group(
        &self,
        id: i32,
        name: Option<String>,
        owner_id: Option<i32>,
    ) -> AppResult<tester_group::Model> {
        let existing = self
            .get_tester_group(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tester group {}", id)))?;

        let mut active: tester_group::ActiveModel = existing.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(owner_id) = owner_id {
            if self.get_tester(owner_id).await?.is_none() {
                return Err(AppError::InvalidInput(format!(
                    "Tester {} does not exist",
                    owner_id
                )));
            }
            active.owner_id = Set(owner_id);
        }
        Ok(active.update(self.connection()).await?)
    }

    // ---- testers ----

    pub async fn list_testers(
        &self,
        params: &QueryTestersParams,
    ) -> AppResult<(Vec<tester::Model>, u64)> {
        let mut select = tester::Entity::find();
        if let Some(tester_type_id) = params.tester_type_id {
            select = select.filter(tester::Column::TesterTypeId.eq(tester_type_id));
        }
        if let Some(tester_group_id) = params.tester_group_id {
            select = select.filter(tester::Column::TesterGroupId.eq(tester_group_id));
        }
        if let Some(active) = params.active {
            select = select.filter(tester::Column::Active.eq(active));
        }

        let total = select.clone().count(self.connection()).await?;
        let (limit, offset) = clamp_page(params.limit, params.offset);
        let rows = select
            .order_by_asc(tester::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.connection())
            .await?;

        Ok((rows, total))
    }

    pub async fn get_tester(&self, id: i32) -> AppResult<Option<tester::Model>> {
        Ok(tester::Entity::find_by_id(id).one(self.connection()).await?)
    }

    pub async fn find_tester_by_email(&self, email: &str) -> AppResult<Option<tester::Model>> {
        Ok(tester::Entity::find()
            .filter(tester::Column::Email.eq(email))
            .one(self.connection())
            .await?)
    }

    pub async fn insert_tester(&self, new: NewTester) -> AppResult<tester::Model> {
        if self.get_tester_type(new.tester_type_id).await?.is_none() {
            return Err(AppError::InvalidInput(format!(
                "Tester type {} does not exist",
                new.tester_type_id
            )));
        }
        if let Some(group_id) = new.tester_group_id
            && self.get_tester_group(group_id).await?.is_none()
        {
            return Err(AppError::InvalidInput(format!(
                "Tester group {} does not exist",
                group_id
            )));
        }
        if self.find_tester_by_email(&new.email).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Tester with email '{}' already exists",
                new.email
            )));
        }

        let model = tester::ActiveModel {
            tester_type_id: Set(new.tester_type_id),
            tester_group_id: Set(new.tester_group_id),
            first_name: Set(new.first_name),
            last_name: Set(new.last_name),
            email: Set(new.email),
            password_hash: Set(new.password_hash),
            active: Set(true),
            created_at: Set(Utc::now()),
            last_login_at: Set(None),
            ..Default::default()
        };
        Ok(model.insert(self.connection()).await?)
    }

    pub async fn update_tester(&self, id: i32, update: TesterUpdate) -> AppResult<tester::Model> {
        let existing = self
            .get_tester(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tester {}", id)))?;

        let mut active: tester::ActiveModel = existing.into();
        if let Some(tester_type_id) = update.tester_type_id {
            if self.get_tester_type(tester_type_id).await?.is_none() {
                return Err(AppError::InvalidInput(format!(
                    "Tester type {} does not exist",
                    tester_type_id
                )));
            }
            active.tester_type_id = Set(tester_type_id);
        }
        if let Some(group_id) = update.tester_group_id {
            if self.get_tester_group(group_id).await?.is_none() {
                return Err(AppError::InvalidInput(format!(
                    "Tester group {} does not exist",
                    group_id
                )));
            }
            active.tester_group_id = Set(Some(group_id));
        }
        if let Some(first_name) = update.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = update.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(is_active) = update.active {
            active.active = Set(is_active);
        }
        Ok(active.update(self.connection()).await?)
    }

    /// Stamp a successful login.
    pub async fn touch_last_login(&self, id: i32) -> AppResult<()> {
        let existing = self
            .get_tester(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tester {}", id)))?;

        let mut active: tester::ActiveModel = existing.into();
        active.last_login_at = Set(Some(Utc::now()));
        active.update(self.connection()).await?;
        Ok(())
    }
}
