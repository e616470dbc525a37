//! Attachment endpoints: multipart upload, metadata, and download.

use actix_files::NamedFile;
use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

use crate::auth::AuthenticatedTester;
use crate::db::attachments::{AttachmentUpdate, NewAttachment};
use crate::db::DbPool;
use crate::entity::attachment;
use crate::error::{AppError, AppResult};
use crate::services::AttachmentStorage;

use super::catalog::ListResponse;

#[derive(Debug, Serialize, ToSchema)]
pub struct AttachmentResponse {
    pub id: i32,
    pub parent_attachment_id: Option<i32>,
    pub uploaded_by: i32,
    pub resolution_id: Option<i32>,
    pub filename: String,
    pub relative_path: String,
    pub uploaded_at: DateTime<Utc>,
    pub presentmon_file: Option<bool>,
    pub presentmon_version: Option<String>,
    #[schema(value_type = Object)]
    pub settings: Option<JsonValue>,
}

impl From<attachment::Model> for AttachmentResponse {
    fn from(m: attachment::Model) -> Self {
        Self {
            id: m.id,
            parent_attachment_id: m.parent_attachment_id,
            uploaded_by: m.uploaded_by,
            resolution_id: m.resolution_id,
            filename: m.filename,
            relative_path: m.relative_path,
            uploaded_at: m.uploaded_at,
            presentmon_file: m.presentmon_file,
            presentmon_version: m.presentmon_version,
            settings: m.settings,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAttachmentBody {
    pub parent_attachment_id: Option<i32>,
    pub resolution_id: Option<i32>,
    pub presentmon_file: Option<bool>,
    pub presentmon_version: Option<String>,
    #[schema(value_type = Object)]
    pub settings: Option<JsonValue>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QueryAttachmentsQuery {
    pub uploaded_by: Option<i32>,
    pub parent_attachment_id: Option<i32>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Form fields accepted alongside the file part.
#[derive(Debug, Default)]
struct UploadFields {
    parent_attachment_id: Option<i32>,
    resolution_id: Option<i32>,
    presentmon_file: Option<bool>,
    presentmon_version: Option<String>,
    settings: Option<JsonValue>,
    file: Option<(String, Vec<u8>)>,
}

async fn read_field_bytes(
    field: &mut actix_multipart::Field,
    max_size: usize,
    so_far: usize,
) -> AppResult<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
        if so_far + data.len() + chunk.len() > max_size {
            return Err(AppError::InvalidInput(format!(
                "Upload exceeds the {} byte limit",
                max_size
            )));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

async fn collect_upload(mut payload: Multipart, max_size: usize) -> AppResult<UploadFields> {
    let mut fields = UploadFields::default();
    let mut total: usize = 0;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?;

        let content_disposition = field
            .content_disposition()
            .ok_or_else(|| AppError::InvalidInput("Missing content disposition".to_string()))?;
        let field_name = content_disposition.get_name().map(str::to_string);
        let file_name = content_disposition.get_filename().map(str::to_string);

        let data = read_field_bytes(&mut field, max_size, total).await?;
        total += data.len();

        match field_name.as_deref() {
            Some("file") => {
                let original = file_name.unwrap_or_else(|| "attachment".to_string());
                fields.file = Some((original, data));
            }
            Some("parent_attachment_id") => {
                fields.parent_attachment_id = parse_int_field(&data, "parent_attachment_id")?;
            }
            Some("resolution_id") => {
                fields.resolution_id = parse_int_field(&data, "resolution_id")?;
            }
            Some("presentmon_file") => {
                let text = String::from_utf8_lossy(&data);
                fields.presentmon_file = Some(matches!(text.trim(), "true" | "1"));
            }
            Some("presentmon_version") => {
                fields.presentmon_version =
                    Some(String::from_utf8_lossy(&data).trim().to_string());
            }
            Some("settings") => {
                if !data.is_empty() {
                    fields.settings = Some(serde_json::from_slice(&data)?);
                }
            }
            _ => {
                // Unknown parts are ignored.
            }
        }
    }

    Ok(fields)
}

fn parse_int_field(data: &[u8], name: &str) -> AppResult<Option<i32>> {
    let text = String::from_utf8_lossy(data);
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<i32>()
        .map(Some)
        .map_err(|_| AppError::InvalidInput(format!("{} must be an integer", name)))
}

/// Upload an attachment.
///
/// Multipart body with a `file` part and optional `parent_attachment_id`,
/// `resolution_id`, `presentmon_file`, `presentmon_version`, and `settings`
/// parts.
#[utoipa::path(
    post,
    path = "/api/v1/attachments",
    tag = "Attachments",
    responses(
        (status = 201, description = "Attachment stored", body = AttachmentResponse),
        (status = 400, description = "Missing file part or oversized upload")
    )
)]
pub async fn upload_attachment(
    pool: web::Data<DbPool>,
    storage: web::Data<AttachmentStorage>,
    max_upload_size: web::Data<usize>,
    payload: Multipart,
    caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let fields = collect_upload(payload, *max_upload_size.get_ref()).await?;

    let Some((original_name, bytes)) = fields.file else {
        return Err(AppError::InvalidInput(
            "Missing 'file' part in upload".to_string(),
        ));
    };
    if bytes.is_empty() {
        return Err(AppError::InvalidInput("Uploaded file is empty".to_string()));
    }

    let stored = storage.save(&original_name, &bytes).await?;

    let created = pool
        .insert_attachment(NewAttachment {
            parent_attachment_id: fields.parent_attachment_id,
            uploaded_by: caller.tester_id,
            resolution_id: fields.resolution_id,
            filename: stored.filename,
            relative_path: stored.relative_path,
            presentmon_file: fields.presentmon_file,
            presentmon_version: fields.presentmon_version,
            settings: fields.settings,
        })
        .await?;

    Ok(HttpResponse::Created().json(AttachmentResponse::from(created)))
}

/// List attachments.
#[utoipa::path(
    get,
    path = "/api/v1/attachments",
    tag = "Attachments",
    responses((status = 200, description = "List of attachments"))
)]
pub async fn list_attachments(
    pool: web::Data<DbPool>,
    query: web::Query<QueryAttachmentsQuery>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let (rows, total) = pool
        .list_attachments(
            query.uploaded_by,
            query.parent_attachment_id,
            query.limit.unwrap_or(20),
            query.offset.unwrap_or(0),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ListResponse {
        items: rows
            .into_iter()
            .map(AttachmentResponse::from)
            .collect::<Vec<_>>(),
        total: total as i64,
    }))
}

/// Get attachment metadata.
#[utoipa::path(
    get,
    path = "/api/v1/attachments/{id}",
    tag = "Attachments",
    responses(
        (status = 200, description = "The attachment", body = AttachmentResponse),
        (status = 404, description = "Attachment not found")
    )
)]
pub async fn get_attachment(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let found = pool
        .get_attachment(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Attachment {}", id)))?;

    Ok(HttpResponse::Ok().json(AttachmentResponse::from(found)))
}

/// Update attachment metadata. The stored file tuple never changes.
#[utoipa::path(
    patch,
    path = "/api/v1/attachments/{id}",
    tag = "Attachments",
    request_body = UpdateAttachmentBody,
    responses(
        (status = 200, description = "Attachment updated", body = AttachmentResponse),
        (status = 404, description = "Attachment not found")
    )
)]
pub async fn update_attachment(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateAttachmentBody>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    let updated = pool
        .update_attachment(
            path.into_inner(),
            AttachmentUpdate {
                parent_attachment_id: body.parent_attachment_id,
                resolution_id: body.resolution_id,
                presentmon_file: body.presentmon_file,
                presentmon_version: body.presentmon_version,
                settings: body.settings,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(AttachmentResponse::from(updated)))
}

/// Child attachments of a parent.
#[utoipa::path(
    get,
    path = "/api/v1/attachments/{id}/children",
    tag = "Attachments",
    responses(
        (status = 200, description = "Child attachments"),
        (status = 404, description = "Attachment not found")
    )
)]
pub async fn get_attachment_children(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    if pool.get_attachment(id).await?.is_none() {
        return Err(AppError::NotFound(format!("Attachment {}", id)));
    }

    let rows = pool.get_attachment_children(id).await?;
    let items: Vec<AttachmentResponse> =
        rows.into_iter().map(AttachmentResponse::from).collect();
    let total = items.len() as i64;

    Ok(HttpResponse::Ok().json(ListResponse { items, total }))
}

/// Download an attachment's bytes.
#[utoipa::path(
    get,
    path = "/api/v1/attachments/{id}/download",
    tag = "Attachments",
    responses(
        (status = 200, description = "File content"),
        (status = 404, description = "Attachment not found")
    )
)]
pub async fn download_attachment(
    req: HttpRequest,
    pool: web::Data<DbPool>,
    storage: web::Data<AttachmentStorage>,
    path: web::Path<i32>,
    _caller: AuthenticatedTester,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let found = pool
        .get_attachment(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Attachment {}", id)))?;

    let file_path = storage.resolve(&found.filename, &found.relative_path)?;
    let file = NamedFile::open(file_path)
        .map_err(|_| AppError::NotFound(format!("Attachment {} content", id)))?;

    Ok(file.into_response(&req))
}

/// Configure attachment routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/attachments")
            .route(web::get().to(list_attachments))
            .route(web::post().to(upload_attachment)),
    )
    .service(
        web::resource("/attachments/{id}")
            .route(web::get().to(get_attachment))
            .route(web::patch().to(update_attachment)),
    )
    .service(
        web::resource("/attachments/{id}/children")
            .route(web::get().to(get_attachment_children)),
    )
    .service(
        web::resource("/attachments/{id}/download").route(web::get().to(download_attachment)),
    );
}
