// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::{error::AppError, extract::AppJson},
    config::AppState,
    middleware::{audit::RequestMeta, auth::AuthenticatedUser},
    models::{
        audit::{AuditAction, AuditEntry},
        auth::{AuthResponse, LoginUserPayload, RegisterUserPayload, Role, User, UserSummary},
    },
    services::access_control::require_global_role,
};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account is disabled")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<LoginUserPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let response = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await?;

    Ok(Json(response))
}

// Account creation is reserved to global admins
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "User created", body = UserSummary),
        (status = 403, description = "Only admins can register users"),
        (status = 409, description = "Email already registered")
    ),
    security(("api_jwt" = []))
)]
pub async fn register(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    meta: RequestMeta,
    AppJson(payload): AppJson<RegisterUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    require_global_role(&actor, &[Role::Admin])?;
    payload.validate()?;

    let user = app_state.auth_service.register_user(&payload).await?;
    let summary = UserSummary::from(&user);

    app_state.audit_service.record(meta.stamp(
        AuditEntry::new("user", user.id, AuditAction::Create)
            .by(actor.id)
            .with_snapshot(&summary),
    ));

    Ok((StatusCode::CREATED, Json(summary)))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}
