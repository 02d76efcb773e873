// src/handlers/lots.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::{AppJson, AppPath},
    },
    config::AppState,
    handlers::scope::lot_in_scope,
    middleware::{
        audit::RequestMeta,
        auth::AuthenticatedUser,
        tender_access::{AnyRole, RequireTenderRole},
    },
    models::{
        audit::{AuditAction, AuditEntry},
        auth::Role,
        lot::{CreateLotPayload, Lot, UpdateLotPayload},
    },
    services::access_control::TenderIdSources,
};

#[utoipa::path(
    get,
    path = "/api/lots/tender/{tender_id}",
    tag = "Lots",
    params(("tender_id" = Uuid, Path, description = "Tender ID")),
    responses((status = 200, description = "Lots ordered by number", body = [Lot])),
    security(("api_jwt" = []))
)]
pub async fn list_lots_by_tender(
    State(app_state): State<AppState>,
    access: RequireTenderRole<AnyRole>,
) -> Result<Json<Vec<Lot>>, AppError> {
    let lots = app_state.lot_service.list_by_tender(access.tender_id).await?;
    Ok(Json(lots))
}

#[utoipa::path(
    get,
    path = "/api/lots/{id}",
    tag = "Lots",
    params(("id" = Uuid, Path, description = "Lot ID")),
    responses(
        (status = 200, description = "Lot", body = Lot),
        (status = 404, description = "Lot not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_lot(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Lot>, AppError> {
    let lot = lot_in_scope(&app_state, &user, id, None).await?;
    Ok(Json(lot))
}

#[utoipa::path(
    post,
    path = "/api/lots",
    tag = "Lots",
    request_body = CreateLotPayload,
    responses(
        (status = 201, description = "Lot created", body = Lot),
        (status = 409, description = "Lot number already used in this tender")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lot(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    meta: RequestMeta,
    AppJson(payload): AppJson<CreateLotPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .access_control
        .authorize(
            Some(&user),
            TenderIdSources::from_body(payload.tender_id),
            Some(Role::Manager),
        )
        .await?;
    payload.validate()?;

    let lot = app_state.lot_service.create(&payload).await?;

    app_state.audit_service.record(meta.stamp(
        AuditEntry::new("lot", lot.id, AuditAction::Create)
            .by(user.id)
            .with_snapshot(&lot),
    ));

    Ok((StatusCode::CREATED, Json(lot)))
}

#[utoipa::path(
    put,
    path = "/api/lots/{id}",
    tag = "Lots",
    request_body = UpdateLotPayload,
    params(("id" = Uuid, Path, description = "Lot ID")),
    responses(
        (status = 200, description = "Lot updated", body = Lot),
        (status = 404, description = "Lot not found"),
        (status = 409, description = "Lot number already used in this tender")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_lot(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
    meta: RequestMeta,
    AppJson(payload): AppJson<UpdateLotPayload>,
) -> Result<Json<Lot>, AppError> {
    let lot = lot_in_scope(&app_state, &user, id, Some(Role::Manager)).await?;
    payload.validate()?;

    let lot = app_state.lot_service.update(&lot, payload).await?;

    app_state.audit_service.record(meta.stamp(
        AuditEntry::new("lot", lot.id, AuditAction::Update)
            .by(user.id)
            .with_snapshot(&lot),
    ));

    Ok(Json(lot))
}

#[utoipa::path(
    delete,
    path = "/api/lots/{id}",
    tag = "Lots",
    params(("id" = Uuid, Path, description = "Lot ID")),
    responses(
        (status = 204, description = "Lot deleted with its positions"),
        (status = 404, description = "Lot not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_lot(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
    meta: RequestMeta,
) -> Result<StatusCode, AppError> {
    let lot = lot_in_scope(&app_state, &user, id, Some(Role::Manager)).await?;
    app_state.lot_service.delete(lot.id).await?;

    app_state.audit_service.record(meta.stamp(
        AuditEntry::new("lot", lot.id, AuditAction::Delete)
            .by(user.id)
            .with_snapshot(&lot),
    ));

    Ok(StatusCode::NO_CONTENT)
}
