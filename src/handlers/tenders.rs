// src/handlers/tenders.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::{AppJson, AppQuery},
    },
    config::AppState,
    middleware::{
        audit::RequestMeta,
        auth::AuthenticatedUser,
        tender_access::{AdminRole, AnyRole, ManagerRole, RequireTenderRole},
    },
    models::{
        audit::{AuditAction, AuditEntry},
        tender::{
            AssignRolePayload, CreateTenderPayload, Tender, TenderFilter, TenderRoleAssignment,
            UpdateTenderPayload,
        },
    },
};

#[utoipa::path(
    get,
    path = "/api/tenders",
    tag = "Tenders",
    params(TenderFilter),
    responses(
        (status = 200, description = "Tenders visible to the caller, newest first", body = [Tender])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_tenders(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppQuery(filter): AppQuery<TenderFilter>,
) -> Result<Json<Vec<Tender>>, AppError> {
    let tenders = app_state
        .tender_service
        .list_for_user(&user, filter.status)
        .await?;
    Ok(Json(tenders))
}

#[utoipa::path(
    post,
    path = "/api/tenders",
    tag = "Tenders",
    request_body = CreateTenderPayload,
    responses(
        (status = 201, description = "Tender created", body = Tender),
        (status = 409, description = "Tender number already exists")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_tender(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    meta: RequestMeta,
    AppJson(payload): AppJson<CreateTenderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let tender = app_state.tender_service.create(&payload, &user).await?;

    app_state.audit_service.record(meta.stamp(
        AuditEntry::new("tender", tender.id, AuditAction::Create)
            .by(user.id)
            .with_snapshot(&tender),
    ));

    Ok((StatusCode::CREATED, Json(tender)))
}

#[utoipa::path(
    get,
    path = "/api/tenders/{tender_id}",
    tag = "Tenders",
    params(("tender_id" = Uuid, Path, description = "Tender ID")),
    responses(
        (status = 200, description = "Tender", body = Tender),
        (status = 403, description = "No role on this tender"),
        (status = 404, description = "Tender not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_tender(
    State(app_state): State<AppState>,
    access: RequireTenderRole<AnyRole>,
) -> Result<Json<Tender>, AppError> {
    let tender = app_state.tender_service.get(access.tender_id).await?;
    Ok(Json(tender))
}

#[utoipa::path(
    put,
    path = "/api/tenders/{tender_id}",
    tag = "Tenders",
    request_body = UpdateTenderPayload,
    params(("tender_id" = Uuid, Path, description = "Tender ID")),
    responses(
        (status = 200, description = "Tender updated", body = Tender),
        (status = 403, description = "Manager role required"),
        (status = 404, description = "Tender not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_tender(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    access: RequireTenderRole<ManagerRole>,
    meta: RequestMeta,
    AppJson(payload): AppJson<UpdateTenderPayload>,
) -> Result<Json<Tender>, AppError> {
    payload.validate()?;

    let tender = app_state
        .tender_service
        .update(access.tender_id, payload)
        .await?;

    app_state.audit_service.record(meta.stamp(
        AuditEntry::new("tender", tender.id, AuditAction::Update)
            .by(user.id)
            .with_snapshot(&tender),
    ));

    Ok(Json(tender))
}

#[utoipa::path(
    delete,
    path = "/api/tenders/{tender_id}",
    tag = "Tenders",
    params(("tender_id" = Uuid, Path, description = "Tender ID")),
    responses(
        (status = 204, description = "Tender deleted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Tender not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_tender(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    access: RequireTenderRole<AdminRole>,
    meta: RequestMeta,
) -> Result<StatusCode, AppError> {
    app_state.tender_service.delete(access.tender_id).await?;

    app_state.audit_service.record(meta.stamp(
        AuditEntry::new("tender", access.tender_id, AuditAction::Delete).by(user.id),
    ));

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/tenders/{tender_id}/roles",
    tag = "Tenders",
    params(("tender_id" = Uuid, Path, description = "Tender ID")),
    responses(
        (status = 200, description = "Role assignments on the tender", body = [TenderRoleAssignment])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_tender_roles(
    State(app_state): State<AppState>,
    access: RequireTenderRole<AnyRole>,
) -> Result<Json<Vec<TenderRoleAssignment>>, AppError> {
    let roles = app_state.tender_service.list_roles(access.tender_id).await?;
    Ok(Json(roles))
}

// Upsert: assigning again replaces the previous role
#[utoipa::path(
    post,
    path = "/api/tenders/{tender_id}/roles",
    tag = "Tenders",
    request_body = AssignRolePayload,
    params(("tender_id" = Uuid, Path, description = "Tender ID")),
    responses(
        (status = 201, description = "Role assigned", body = TenderRoleAssignment),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Tender or user not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_tender_role(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    access: RequireTenderRole<AdminRole>,
    meta: RequestMeta,
    AppJson(payload): AppJson<AssignRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    let assignment = app_state
        .tender_service
        .assign_role(access.tender_id, &payload)
        .await?;

    app_state.audit_service.record(meta.stamp(
        AuditEntry::new("tender", access.tender_id, AuditAction::AssignRole)
            .by(user.id)
            .with_snapshot(&assignment),
    ));

    Ok((StatusCode::CREATED, Json(assignment)))
}
