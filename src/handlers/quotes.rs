// src/handlers/quotes.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::{AppJson, AppPath},
    },
    config::AppState,
    handlers::scope::{lot_in_scope, quote_in_scope},
    middleware::{
        audit::RequestMeta,
        auth::AuthenticatedUser,
        tender_access::{AnyRole, RequireTenderRole},
    },
    models::{
        audit::{AuditAction, AuditEntry},
        auth::Role,
        quote::{
            CreateQuotePayload, Quote, QuoteDetail, ReplaceQuotePositionsPayload,
            UpdateQuotePayload,
        },
    },
    services::access_control::TenderIdSources,
};

#[utoipa::path(
    get,
    path = "/api/quotes/tender/{tender_id}",
    tag = "Quotes",
    params(("tender_id" = Uuid, Path, description = "Tender ID")),
    responses((status = 200, description = "Quotes of the tender, newest first", body = [Quote])),
    security(("api_jwt" = []))
)]
pub async fn list_quotes_by_tender(
    State(app_state): State<AppState>,
    access: RequireTenderRole<AnyRole>,
) -> Result<Json<Vec<Quote>>, AppError> {
    let quotes = app_state.quote_service.list_by_tender(access.tender_id).await?;
    Ok(Json(quotes))
}

#[utoipa::path(
    get,
    path = "/api/quotes/lot/{lot_id}",
    tag = "Quotes",
    params(("lot_id" = Uuid, Path, description = "Lot ID")),
    responses((status = 200, description = "Quotes of the lot, newest first", body = [Quote])),
    security(("api_jwt" = []))
)]
pub async fn list_quotes_by_lot(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(lot_id): AppPath<Uuid>,
) -> Result<Json<Vec<Quote>>, AppError> {
    let lot = lot_in_scope(&app_state, &user, lot_id, None).await?;
    let quotes = app_state.quote_service.list_by_lot(lot.id).await?;
    Ok(Json(quotes))
}

#[utoipa::path(
    get,
    path = "/api/quotes/{id}",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 200, description = "Quote with its line items", body = QuoteDetail),
        (status = 404, description = "Quote not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_quote(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<QuoteDetail>, AppError> {
    quote_in_scope(&app_state, &user, id, None).await?;
    let detail = app_state.quote_service.get_detail(id).await?;
    Ok(Json(detail))
}

// Any role on the tender may record a quote
#[utoipa::path(
    post,
    path = "/api/quotes",
    tag = "Quotes",
    request_body = CreateQuotePayload,
    responses(
        (status = 201, description = "Quote created with its line items", body = QuoteDetail),
        (status = 400, description = "Lot does not belong to the tender"),
        (status = 404, description = "Lot not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_quote(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    meta: RequestMeta,
    AppJson(payload): AppJson<CreateQuotePayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .access_control
        .authorize(Some(&user), TenderIdSources::from_body(payload.tender_id), None)
        .await?;
    payload.validate()?;

    let detail = app_state.quote_service.create(&payload, user.id).await?;

    app_state.audit_service.record(meta.stamp(
        AuditEntry::new("quote", detail.quote.id, AuditAction::Create)
            .by(user.id)
            .with_snapshot(&detail),
    ));

    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    put,
    path = "/api/quotes/{id}",
    tag = "Quotes",
    request_body = UpdateQuotePayload,
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 200, description = "Quote updated", body = Quote),
        (status = 404, description = "Quote not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_quote(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
    meta: RequestMeta,
    AppJson(payload): AppJson<UpdateQuotePayload>,
) -> Result<Json<Quote>, AppError> {
    quote_in_scope(&app_state, &user, id, Some(Role::Manager)).await?;
    payload.validate()?;

    let quote = app_state.quote_service.update(id, payload).await?;

    app_state.audit_service.record(meta.stamp(
        AuditEntry::new("quote", quote.id, AuditAction::Update)
            .by(user.id)
            .with_snapshot(&quote),
    ));

    Ok(Json(quote))
}

// Replaces the line items and recomputes the total
#[utoipa::path(
    put,
    path = "/api/quotes/{id}/positions",
    tag = "Quotes",
    request_body = ReplaceQuotePositionsPayload,
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 200, description = "Line items replaced", body = QuoteDetail),
        (status = 404, description = "Quote not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn replace_quote_positions(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
    meta: RequestMeta,
    AppJson(payload): AppJson<ReplaceQuotePositionsPayload>,
) -> Result<Json<QuoteDetail>, AppError> {
    quote_in_scope(&app_state, &user, id, Some(Role::Manager)).await?;
    payload.validate()?;

    let detail = app_state
        .quote_service
        .replace_positions(id, &payload.positions)
        .await?;

    app_state.audit_service.record(meta.stamp(
        AuditEntry::new("quote", id, AuditAction::Update)
            .by(user.id)
            .with_snapshot(&detail),
    ));

    Ok(Json(detail))
}

#[utoipa::path(
    post,
    path = "/api/quotes/{id}/submit",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 200, description = "Quote submitted", body = Quote),
        (status = 403, description = "Manager role required"),
        (status = 404, description = "Quote not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit_quote(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
    meta: RequestMeta,
) -> Result<Json<Quote>, AppError> {
    quote_in_scope(&app_state, &user, id, Some(Role::Manager)).await?;

    let quote = app_state.quote_service.submit(id).await?;

    app_state.audit_service.record(meta.stamp(
        AuditEntry::new("quote", quote.id, AuditAction::Submit).by(user.id),
    ));

    Ok(Json(quote))
}

#[utoipa::path(
    delete,
    path = "/api/quotes/{id}",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "Quote ID")),
    responses(
        (status = 204, description = "Quote deleted with its line items"),
        (status = 404, description = "Quote not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_quote(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
    meta: RequestMeta,
) -> Result<StatusCode, AppError> {
    let quote = quote_in_scope(&app_state, &user, id, Some(Role::Manager)).await?;
    app_state.quote_service.delete(quote.id).await?;

    app_state.audit_service.record(meta.stamp(
        AuditEntry::new("quote", quote.id, AuditAction::Delete)
            .by(user.id)
            .with_snapshot(&quote),
    ));

    Ok(StatusCode::NO_CONTENT)
}
