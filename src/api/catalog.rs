//! CRUD handlers for the flat catalog entities: clients, projects, devices,
//! resolutions, and scenarios.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AuthenticatedTester;
use crate::db::catalog::DeviceFields;
use crate::db::DbPool;
use crate::entity::{client, device, project, resolution, scenario};
use crate::error::{AppError, AppResult};

/// Generic pagination query.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paginated list envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
}

// ---- clients ----

#[derive(Debug, Serialize, ToSchema)]
pub struct ClientResponse {
    pub id: i32,
    pub name: String,
}

impl From<client::Model> for ClientResponse {
    fn from(m: client::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClientBody {
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QueryClientsQuery {
    pub name: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// List clients.
#[utoipa::path(
    get,
    path = "/api/v1/clients",
    tag = "Catalog",
    responses((status = 200, description = "List of clients"))
)]
pub async fn list_clients(
    pool: web::Data<DbPool>,
    query: web::Query<QueryClientsQuery>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let (rows, total) = pool
        .list_clients(
            query.name.as_deref(),
            query.limit.unwrap_or(20),
            query.offset.unwrap_or(0),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ListResponse {
        items: rows.into_iter().map(ClientResponse::from).collect::<Vec<_>>(),
        total: total as i64,
    }))
}

/// Get a client by id.
#[utoipa::path(
    get,
    path = "/api/v1/clients/{id}",
    tag = "Catalog",
    responses(
        (status = 200, description = "The client", body = ClientResponse),
        (status = 404, description = "Client not found")
    )
)]
pub async fn get_client(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let client = pool
        .get_client(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Client {}", id)))?;

    Ok(HttpResponse::Ok().json(ClientResponse::from(client)))
}

/// Create a client.
#[utoipa::path(
    post,
    path = "/api/v1/clients",
    tag = "Catalog",
    request_body = ClientBody,
    responses((status = 201, description = "Client created", body = ClientResponse))
)]
pub async fn create_client(
    pool: web::Data<DbPool>,
    body: web::Json<ClientBody>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let created = pool.insert_client(body.into_inner().name).await?;
    Ok(HttpResponse::Created().json(ClientResponse::from(created)))
}

/// Update a client.
#[utoipa::path(
    patch,
    path = "/api/v1/clients/{id}",
    tag = "Catalog",
    request_body = ClientBody,
    responses(
        (status = 200, description = "Client updated", body = ClientResponse),
        (status = 404, description = "Client not found")
    )
)]
pub async fn update_client(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<ClientBody>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let updated = pool
        .update_client(path.into_inner(), body.into_inner().name)
        .await?;
    Ok(HttpResponse::Ok().json(ClientResponse::from(updated)))
}

// ---- projects ----

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectResponse {
    pub id: i32,
    pub client_id: i32,
    pub name: String,
}

impl From<project::Model> for ProjectResponse {
    fn from(m: project::Model) -> Self {
        Self {
            id: m.id,
            client_id: m.client_id,
            name: m.name,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProjectBody {
    pub client_id: i32,
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProjectBody {
    pub client_id: Option<i32>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QueryProjectsQuery {
    pub client_id: Option<i32>,
    pub name: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// List projects.
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    tag = "Catalog",
    responses((status = 200, description = "List of projects"))
)]
pub async fn list_projects(
    pool: web::Data<DbPool>,
    query: web::Query<QueryProjectsQuery>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let (rows, total) = pool
        .list_projects(
            query.client_id,
            query.name.as_deref(),
            query.limit.unwrap_or(20),
            query.offset.unwrap_or(0),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ListResponse {
        items: rows
            .into_iter()
            .map(ProjectResponse::from)
            .collect::<Vec<_>>(),
        total: total as i64,
    }))
}

/// Get a project by id.
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    tag = "Catalog",
    responses(
        (status = 200, description = "The project", body = ProjectResponse),
        (status = 404, description = "Project not found")
    )
)]
pub async fn get_project(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let project = pool
        .get_project(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {}", id)))?;

    Ok(HttpResponse::Ok().json(ProjectResponse::from(project)))
}

/// Create a project.
#[utoipa::path(
    post,
    path = "/api/v1/projects",
    tag = "Catalog",
    request_body = CreateProjectBody,
    responses((status = 201, description = "Project created", body = ProjectResponse))
)]
pub async fn create_project(
    pool: web::Data<DbPool>,
    body: web::Json<CreateProjectBody>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let created = pool.insert_project(body.client_id, body.name).await?;
    Ok(HttpResponse::Created().json(ProjectResponse::from(created)))
}

/// Update a project.
#[utoipa::path(
    patch,
    path = "/api/v1/projects/{id}",
    tag = "Catalog",
    request_body = UpdateProjectBody,
    responses(
        (status = 200, description = "Project updated", body = ProjectResponse),
        (status = 404, description = "Project not found")
    )
)]
pub async fn update_project(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateProjectBody>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let updated = pool
        .update_project(path.into_inner(), body.client_id, body.name)
        .await?;
    Ok(HttpResponse::Ok().json(ProjectResponse::from(updated)))
}

// ---- devices ----

#[derive(Debug, Serialize, ToSchema)]
pub struct DeviceResponse {
    pub id: i32,
    pub project_id: i32,
    pub name_external: Option<String>,
    pub name_internal: Option<String>,
    pub cpu: Option<String>,
    pub gpu: Option<String>,
    pub ram: Option<String>,
}

impl From<device::Model> for DeviceResponse {
    fn from(m: device::Model) -> Self {
        Self {
            id: m.id,
            project_id: m.project_id,
            name_external: m.name_external,
            name_internal: m.name_internal,
            cpu: m.cpu,
            gpu: m.gpu,
            ram: m.ram,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDeviceBody {
    pub project_id: i32,
    pub name_external: Option<String>,
    pub name_internal: Option<String>,
    pub cpu: Option<String>,
    pub gpu: Option<String>,
    pub ram: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDeviceBody {
    pub project_id: Option<i32>,
    pub name_external: Option<String>,
    pub name_internal: Option<String>,
    pub cpu: Option<String>,
    pub gpu: Option<String>,
    pub ram: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QueryDevicesQuery {
    pub project_id: Option<i32>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// List devices.
#[utoipa::path(
    get,
    path = "/api/v1/devices",
    tag = "Catalog",
    responses((status = 200, description = "List of devices"))
)]
pub async fn list_devices(
    pool: web::Data<DbPool>,
    query: web::Query<QueryDevicesQuery>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let (rows, total) = pool
        .list_devices(
            query.project_id,
            query.limit.unwrap_or(20),
            query.offset.unwrap_or(0),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ListResponse {
        items: rows
            .into_iter()
            .map(DeviceResponse::from)
            .collect::<Vec<_>>(),
        total: total as i64,
    }))
}

/// Get a device by id.
#[utoipa::path(
    get,
    path = "/api/v1/devices/{id}",
    tag = "Catalog",
    responses(
        (status = 200, description = "The device", body = DeviceResponse),
        (status = 404, description = "Device not found")
    )
)]
pub async fn get_device(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let device = pool
        .get_device(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Device {}", id)))?;

    Ok(HttpResponse::Ok().json(DeviceResponse::from(device)))
}

/// Create a device.
#[utoipa::path(
    post,
    path = "/api/v1/devices",
    tag = "Catalog",
    request_body = CreateDeviceBody,
    responses((status = 201, description = "Device created", body = DeviceResponse))
)]
pub async fn create_device(
    pool: web::Data<DbPool>,
    body: web::Json<CreateDeviceBody>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let created = pool
        .insert_device(
            body.project_id,
            DeviceFields {
                name_external: body.name_external,
                name_internal: body.name_internal,
                cpu: body.cpu,
                gpu: body.gpu,
                ram: body.ram,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(DeviceResponse::from(created)))
}

/// Update a device.
#[utoipa::path(
    patch,
    path = "/api/v1/devices/{id}",
    tag = "Catalog",
    request_body = UpdateDeviceBody,
    responses(
        (status = 200, description = "Device updated", body = DeviceResponse),
        (status = 404, description = "Device not found")
    )
)]
pub async fn update_device(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateDeviceBody>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let updated = pool
        .update_device(
            path.into_inner(),
            body.project_id,
            DeviceFields {
                name_external: body.name_external,
                name_internal: body.name_internal,
                cpu: body.cpu,
                gpu: body.gpu,
                ram: body.ram,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(DeviceResponse::from(updated)))
}

// ---- resolutions ----

#[derive(Debug, Serialize, ToSchema)]
pub struct ResolutionResponse {
    pub id: i32,
    pub h: i32,
    pub w: i32,
}

impl From<resolution::Model> for ResolutionResponse {
    fn from(m: resolution::Model) -> Self {
        Self {
            id: m.id,
            h: m.h,
            w: m.w,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateResolutionBody {
    pub h: i32,
    pub w: i32,
}

/// List display resolutions.
#[utoipa::path(
    get,
    path = "/api/v1/resolutions",
    tag = "Catalog",
    responses((status = 200, description = "List of resolutions"))
)]
pub async fn list_resolutions(
    pool: web::Data<DbPool>,
    query: web::Query<PageQuery>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let (rows, total) = pool
        .list_resolutions(query.limit.unwrap_or(20), query.offset.unwrap_or(0))
        .await?;

    Ok(HttpResponse::Ok().json(ListResponse {
        items: rows
            .into_iter()
            .map(ResolutionResponse::from)
            .collect::<Vec<_>>(),
        total: total as i64,
    }))
}

/// Get a resolution by id.
#[utoipa::path(
    get,
    path = "/api/v1/resolutions/{id}",
    tag = "Catalog",
    responses(
        (status = 200, description = "The resolution", body = ResolutionResponse),
        (status = 404, description = "Resolution not found")
    )
)]
pub async fn get_resolution(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let resolution = pool
        .get_resolution(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resolution {}", id)))?;

    Ok(HttpResponse::Ok().json(ResolutionResponse::from(resolution)))
}

/// Create a display resolution.
#[utoipa::path(
    post,
    path = "/api/v1/resolutions",
    tag = "Catalog",
    request_body = CreateResolutionBody,
    responses(
        (status = 201, description = "Resolution created", body = ResolutionResponse),
        (status = 409, description = "Resolution already exists")
    )
)]
pub async fn create_resolution(
    pool: web::Data<DbPool>,
    body: web::Json<CreateResolutionBody>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    if body.h <= 0 || body.w <= 0 {
        return Err(AppError::InvalidInput(
            "Resolution dimensions must be positive".to_string(),
        ));
    }
    let created = pool.insert_resolution(body.h, body.w).await?;
    Ok(HttpResponse::Created().json(ResolutionResponse::from(created)))
}

// ---- scenarios ----

#[derive(Debug, Serialize, ToSchema)]
pub struct ScenarioResponse {
    pub id: i32,
    pub name: String,
}

impl From<scenario::Model> for ScenarioResponse {
    fn from(m: scenario::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ScenarioBody {
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QueryScenariosQuery {
    pub name: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// List scenarios.
#[utoipa::path(
    get,
    path = "/api/v1/scenarios",
    tag = "Catalog",
    responses((status = 200, description = "List of scenarios"))
)]
pub async fn list_scenarios(
    pool: web::Data<DbPool>,
    query: web::Query<QueryScenariosQuery>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let (rows, total) = pool
        .list_scenarios(
            query.name.as_deref(),
            query.limit.unwrap_or(20),
            query.offset.unwrap_or(0),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ListResponse {
        items: rows
            .into_iter()
            .map(ScenarioResponse::from)
            .collect::<Vec<_>>(),
        total: total as i64,
    }))
}

/// Get a scenario by id.
#[utoipa::path(
    get,
    path = "/api/v1/scenarios/{id}",
    tag = "Catalog",
    responses(
        (status = 200, description = "The scenario", body = ScenarioResponse),
        (status = 404, description = "Scenario not found")
    )
)]
pub async fn get_scenario(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let scenario = pool
        .get_scenario(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Scenario {}", id)))?;

    Ok(HttpResponse::Ok().json(ScenarioResponse::from(scenario)))
}

/// Create a scenario.
#[utoipa::path(
    post,
    path = "/api/v1/scenarios",
    tag = "Catalog",
    request_body = ScenarioBody,
    responses(
        (status = 201, description = "Scenario created", body = ScenarioResponse),
        (status = 409, description = "Scenario already exists")
    )
)]
pub async fn create_scenario(
    pool: web::Data<DbPool>,
    body: web::Json<ScenarioBody>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let created = pool.insert_scenario(body.into_inner().name).await?;
    Ok(HttpResponse::Created().json(ScenarioResponse::from(created)))
}

/// Update a scenario.
#[utoipa::path(
    patch,
    path = "/api/v1/scenarios/{id}",
    tag = "Catalog",
    request_body = ScenarioBody,
    responses(
        (status = 200, description = "Scenario updated", body = ScenarioResponse),
        (status = 404, description = "Scenario not found")
    )
)]
pub async fn update_scenario(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<ScenarioBody>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let updated = pool
        .update_scenario(path.into_inner(), body.into_inner().name)
        .await?;
    Ok(HttpResponse::Ok().json(ScenarioResponse::from(updated)))
}

/// Configure catalog routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/clients")
            .route(web::get().to(list_clients))
            .route(web::post().to(create_client)),
    )
    .service(
        web::resource("/clients/{id}")
            .route(web::get().to(get_client))
            .route(web::patch().to(update_client)),
    )
    .service(
        web::resource("/projects")
            .route(web::get().to(list_projects))
            .route(web::post().to(create_project)),
    )
    .service(
        web::resource("/projects/{id}")
            .route(web::get().to(get_project))
            .route(web::patch().to(update_project)),
    )
    .service(
        web::resource("/devices")
            .route(web::get().to(list_devices))
            .route(web::post().to(create_device)),
    )
    .service(
        web::resource("/devices/{id}")
            .route(web::get().to(get_device))
            .route(web::patch().to(update_device)),
    )
    .service(
        web::resource("/resolutions")
            .route(web::get().to(list_resolutions))
            .route(web::post().to(create_resolution)),
    )
    .service(web::resource("/resolutions/{id}").route(web::get().to(get_resolution)))
    .service(
        web::resource("/scenarios")
            .route(web::get().to(list_scenarios))
            .route(web::post().to(create_scenario)),
    )
    .service(
        web::resource("/scenarios/{id}")
            .route(web::get().to(get_scenario))
            .route(web::patch().to(update_scenario)),
    );
}
