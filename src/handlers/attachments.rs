// src/handlers/attachments.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        extract::{AppMultipart, AppPath, multipart_error},
    },
    config::AppState,
    handlers::{
        download::file_response,
        scope::{attachment_in_scope, attachment_tender, lot_in_scope, quote_in_scope},
    },
    middleware::{
        audit::RequestMeta,
        auth::AuthenticatedUser,
        tender_access::{AnyRole, RequireTenderRole},
    },
    models::{
        attachment::{Attachment, AttachmentTarget},
        audit::{AuditAction, AuditEntry},
        auth::Role,
    },
};

#[utoipa::path(
    get,
    path = "/api/attachments/tender/{tender_id}",
    tag = "Attachments",
    params(("tender_id" = Uuid, Path, description = "Tender ID")),
    responses((status = 200, description = "Tender attachments, newest first", body = [Attachment])),
    security(("api_jwt" = []))
)]
pub async fn list_tender_attachments(
    State(app_state): State<AppState>,
    access: RequireTenderRole<AnyRole>,
) -> Result<Json<Vec<Attachment>>, AppError> {
    let attachments = app_state
        .attachment_service
        .list_by_tender(access.tender_id)
        .await?;
    Ok(Json(attachments))
}

#[utoipa::path(
    get,
    path = "/api/attachments/lot/{lot_id}",
    tag = "Attachments",
    params(("lot_id" = Uuid, Path, description = "Lot ID")),
    responses((status = 200, description = "Lot attachments, newest first", body = [Attachment])),
    security(("api_jwt" = []))
)]
pub async fn list_lot_attachments(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(lot_id): AppPath<Uuid>,
) -> Result<Json<Vec<Attachment>>, AppError> {
    let lot = lot_in_scope(&app_state, &user, lot_id, None).await?;
    Ok(Json(app_state.attachment_service.list_by_lot(lot.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/attachments/quote/{quote_id}",
    tag = "Attachments",
    params(("quote_id" = Uuid, Path, description = "Quote ID")),
    responses((status = 200, description = "Quote attachments, newest first", body = [Attachment])),
    security(("api_jwt" = []))
)]
pub async fn list_quote_attachments(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(quote_id): AppPath<Uuid>,
) -> Result<Json<Vec<Attachment>>, AppError> {
    let quote = quote_in_scope(&app_state, &user, quote_id, None).await?;
    Ok(Json(app_state.attachment_service.list_by_quote(quote.id).await?))
}

// Multipart: `file` plus at least one of `tenderId`, `lotId`, `quoteId`
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct AttachmentUpload {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    tender_id: Option<Uuid>,
    lot_id: Option<Uuid>,
    quote_id: Option<Uuid>,
}

#[utoipa::path(
    post,
    path = "/api/attachments",
    tag = "Attachments",
    request_body(content = AttachmentUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File stored", body = Attachment),
        (status = 400, description = "No file or no target"),
        (status = 413, description = "File too large")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_attachment(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    meta: RequestMeta,
    AppMultipart(mut multipart): AppMultipart,
) -> Result<impl IntoResponse, AppError> {
    let max_size = app_state.config.max_file_size;

    let mut target = AttachmentTarget::default();
    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_size))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let mime = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| multipart_error(e, max_size))?;
                file = Some((filename, mime, bytes.to_vec()));
            }
            "tenderId" | "lotId" | "quoteId" => {
                let raw = field.text().await.map_err(|e| multipart_error(e, max_size))?;
                let id = parse_target_id(&name, &raw)?;
                match name.as_str() {
                    "tenderId" => target.tender_id = id,
                    "lotId" => target.lot_id = id,
                    _ => target.quote_id = id,
                }
            }
            _ => {}
        }
    }

    let (filename, mime, bytes) =
        file.ok_or_else(|| AppError::BadRequest("No file uploaded".into()))?;

    let tender_id =
        attachment_tender(&app_state, target.tender_id, target.lot_id, target.quote_id).await?;
    app_state
        .access_control
        .check(&user, tender_id, Some(Role::Manager))
        .await?;

    let attachment = app_state
        .attachment_service
        .upload(target, &filename, mime, &bytes, user.id)
        .await?;

    app_state.audit_service.record(meta.stamp(
        AuditEntry::new("attachment", attachment.id, AuditAction::Create)
            .by(user.id)
            .with_snapshot(&attachment),
    ));

    Ok((StatusCode::CREATED, Json(attachment)))
}

// Empty form values count as absent
fn parse_target_id(field: &str, raw: &str) -> Result<Option<Uuid>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Uuid::parse_str(raw)
        .map(Some)
        .map_err(|_| AppError::BadRequest(format!("Invalid {}", field)))
}

#[utoipa::path(
    get,
    path = "/api/attachments/{id}/download",
    tag = "Attachments",
    params(("id" = Uuid, Path, description = "Attachment ID")),
    responses(
        (status = 200, description = "File content under its original name"),
        (status = 404, description = "Attachment or file not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn download_attachment(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    let attachment = attachment_in_scope(&app_state, &user, id, None).await?;
    let bytes = app_state.attachment_service.read(&attachment).await?;

    let content_type = attachment
        .mime_type
        .as_deref()
        .unwrap_or("application/octet-stream");
    Ok(file_response(&attachment.original_filename, content_type, bytes))
}

#[utoipa::path(
    delete,
    path = "/api/attachments/{id}",
    tag = "Attachments",
    params(("id" = Uuid, Path, description = "Attachment ID")),
    responses(
        (status = 204, description = "Attachment and file removed"),
        (status = 404, description = "Attachment not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_attachment(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
    meta: RequestMeta,
) -> Result<StatusCode, AppError> {
    let attachment = attachment_in_scope(&app_state, &user, id, Some(Role::Manager)).await?;
    app_state.attachment_service.delete(&attachment).await?;

    app_state.audit_service.record(meta.stamp(
        AuditEntry::new("attachment", attachment.id, AuditAction::Delete)
            .by(user.id)
            .with_snapshot(&attachment),
    ));

    Ok(StatusCode::NO_CONTENT)
}
