// src/handlers/positions.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::{AppJson, AppMultipart, AppPath, multipart_error},
    },
    config::AppState,
    handlers::scope::{lot_in_scope, position_in_scope},
    middleware::{audit::RequestMeta, auth::AuthenticatedUser},
    models::{
        audit::{AuditAction, AuditEntry},
        auth::Role,
        position::{
            CreatePositionPayload, ImportResult, NewPosition, Position, UpdatePositionPayload,
        },
    },
};

#[utoipa::path(
    get,
    path = "/api/positions/lot/{lot_id}",
    tag = "Positions",
    params(("lot_id" = Uuid, Path, description = "Lot ID")),
    responses((status = 200, description = "Positions ordered by number", body = [Position])),
    security(("api_jwt" = []))
)]
pub async fn list_positions_by_lot(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(lot_id): AppPath<Uuid>,
) -> Result<Json<Vec<Position>>, AppError> {
    let lot = lot_in_scope(&app_state, &user, lot_id, None).await?;
    let positions = app_state.position_service.list_by_lot(lot.id).await?;
    Ok(Json(positions))
}

#[utoipa::path(
    get,
    path = "/api/positions/{id}",
    tag = "Positions",
    params(("id" = Uuid, Path, description = "Position ID")),
    responses(
        (status = 200, description = "Position", body = Position),
        (status = 404, description = "Position not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_position(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Position>, AppError> {
    let position = position_in_scope(&app_state, &user, id, None).await?;
    Ok(Json(position))
}

#[utoipa::path(
    post,
    path = "/api/positions",
    tag = "Positions",
    request_body = CreatePositionPayload,
    responses(
        (status = 201, description = "Position created", body = Position),
        (status = 404, description = "Lot not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_position(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    meta: RequestMeta,
    AppJson(payload): AppJson<CreatePositionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let lot = lot_in_scope(&app_state, &user, payload.lot_id, Some(Role::Manager)).await?;
    payload.validate()?;

    let position = app_state
        .position_service
        .create(lot.id, &NewPosition::from(payload))
        .await?;

    app_state.audit_service.record(meta.stamp(
        AuditEntry::new("position", position.id, AuditAction::Create)
            .by(user.id)
            .with_snapshot(&position),
    ));

    Ok((StatusCode::CREATED, Json(position)))
}

#[utoipa::path(
    put,
    path = "/api/positions/{id}",
    tag = "Positions",
    request_body = UpdatePositionPayload,
    params(("id" = Uuid, Path, description = "Position ID")),
    responses(
        (status = 200, description = "Position updated", body = Position),
        (status = 404, description = "Position not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_position(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
    meta: RequestMeta,
    AppJson(payload): AppJson<UpdatePositionPayload>,
) -> Result<Json<Position>, AppError> {
    position_in_scope(&app_state, &user, id, Some(Role::Manager)).await?;
    payload.validate()?;

    let position = app_state.position_service.update(id, payload).await?;

    app_state.audit_service.record(meta.stamp(
        AuditEntry::new("position", position.id, AuditAction::Update)
            .by(user.id)
            .with_snapshot(&position),
    ));

    Ok(Json(position))
}

#[utoipa::path(
    delete,
    path = "/api/positions/{id}",
    tag = "Positions",
    params(("id" = Uuid, Path, description = "Position ID")),
    responses(
        (status = 204, description = "Position deleted"),
        (status = 404, description = "Position not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_position(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
    meta: RequestMeta,
) -> Result<StatusCode, AppError> {
    let position = position_in_scope(&app_state, &user, id, Some(Role::Manager)).await?;
    app_state.position_service.delete(position.id).await?;

    app_state.audit_service.record(meta.stamp(
        AuditEntry::new("position", position.id, AuditAction::Delete)
            .by(user.id)
            .with_snapshot(&position),
    ));

    Ok(StatusCode::NO_CONTENT)
}

// Multipart field `file`: xlsx, xls or ods; the first sheet is read
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct SpreadsheetUpload {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/api/positions/import/{lot_id}",
    tag = "Positions",
    params(("lot_id" = Uuid, Path, description = "Lot ID")),
    request_body(content = SpreadsheetUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Positions imported", body = ImportResult),
        (status = 400, description = "No file or unreadable workbook"),
        (status = 404, description = "Lot not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn import_positions(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(lot_id): AppPath<Uuid>,
    meta: RequestMeta,
    AppMultipart(mut multipart): AppMultipart,
) -> Result<impl IntoResponse, AppError> {
    let lot = lot_in_scope(&app_state, &user, lot_id, Some(Role::Manager)).await?;
    let max_size = app_state.config.max_file_size;

    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_size))?
    {
        if field.name() == Some("file") {
            let bytes = field.bytes().await.map_err(|e| multipart_error(e, max_size))?;
            file = Some(bytes.to_vec());
        }
    }
    let file = file.ok_or_else(|| AppError::BadRequest("No file uploaded".into()))?;

    let positions = app_state.position_service.import(lot.id, file).await?;

    app_state.audit_service.record(meta.stamp(
        AuditEntry::new("lot", lot.id, AuditAction::Create)
            .by(user.id)
            .with_changes(serde_json::json!({ "importedPositions": positions.len() })),
    ));

    Ok((
        StatusCode::CREATED,
        Json(ImportResult {
            count: positions.len(),
            positions,
        }),
    ))
}
