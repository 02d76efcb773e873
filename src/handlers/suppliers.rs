// src/handlers/suppliers.rs

// The supplier directory is global; writes are gated by the caller's global role.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::{AppJson, AppPath},
    },
    config::AppState,
    middleware::{audit::RequestMeta, auth::AuthenticatedUser},
    models::{
        audit::{AuditAction, AuditEntry},
        auth::Role,
        supplier::{CreateSupplierPayload, Supplier, UpdateSupplierPayload},
    },
    services::access_control::require_global_role,
};

const EDITORS: [Role; 2] = [Role::Admin, Role::Manager];

#[utoipa::path(
    get,
    path = "/api/suppliers",
    tag = "Suppliers",
    responses((status = 200, description = "Suppliers ordered by name", body = [Supplier])),
    security(("api_jwt" = []))
)]
pub async fn list_suppliers(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Supplier>>, AppError> {
    Ok(Json(app_state.supplier_service.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/suppliers/{id}",
    tag = "Suppliers",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Supplier", body = Supplier),
        (status = 404, description = "Supplier not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_supplier(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Supplier>, AppError> {
    Ok(Json(app_state.supplier_service.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/suppliers",
    tag = "Suppliers",
    request_body = CreateSupplierPayload,
    responses(
        (status = 201, description = "Supplier created", body = Supplier),
        (status = 403, description = "Admin or manager required")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_supplier(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    meta: RequestMeta,
    AppJson(payload): AppJson<CreateSupplierPayload>,
) -> Result<impl IntoResponse, AppError> {
    require_global_role(&user, &EDITORS)?;
    payload.validate()?;

    let supplier = app_state.supplier_service.create(&payload, user.id).await?;

    app_state.audit_service.record(meta.stamp(
        AuditEntry::new("supplier", supplier.id, AuditAction::Create)
            .by(user.id)
            .with_snapshot(&supplier),
    ));

    Ok((StatusCode::CREATED, Json(supplier)))
}

#[utoipa::path(
    put,
    path = "/api/suppliers/{id}",
    tag = "Suppliers",
    request_body = UpdateSupplierPayload,
    params(("id" = Uuid, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Supplier updated", body = Supplier),
        (status = 404, description = "Supplier not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_supplier(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
    meta: RequestMeta,
    AppJson(payload): AppJson<UpdateSupplierPayload>,
) -> Result<Json<Supplier>, AppError> {
    require_global_role(&user, &EDITORS)?;
    payload.validate()?;

    let supplier = app_state.supplier_service.update(id, payload).await?;

    app_state.audit_service.record(meta.stamp(
        AuditEntry::new("supplier", supplier.id, AuditAction::Update)
            .by(user.id)
            .with_snapshot(&supplier),
    ));

    Ok(Json(supplier))
}

#[utoipa::path(
    delete,
    path = "/api/suppliers/{id}",
    tag = "Suppliers",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    responses(
        (status = 204, description = "Supplier deleted"),
        (status = 403, description = "Admin required"),
        (status = 409, description = "Supplier still has quotes")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_supplier(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
    meta: RequestMeta,
) -> Result<StatusCode, AppError> {
    require_global_role(&user, &[Role::Admin])?;

    app_state.supplier_service.delete(id).await?;

    app_state.audit_service.record(meta.stamp(
        AuditEntry::new("supplier", id, AuditAction::Delete).by(user.id),
    ));

    Ok(StatusCode::NO_CONTENT)
}
