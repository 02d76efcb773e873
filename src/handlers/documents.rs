// src/handlers/documents.rs

use axum::{extract::State, response::Response};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::{error::AppError, extract::AppQuery},
    config::AppState,
    handlers::download::file_response,
    middleware::{
        i18n::Locale,
        tender_access::{AnyRole, RequireTenderRole},
    },
    services::document_service::{DocumentFormat, DocumentKind},
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DocumentQuery {
    /// `docx` (default) or `pdf`
    pub format: Option<String>,
}

async fn generate(
    app_state: &AppState,
    kind: DocumentKind,
    access: RequireTenderRole<AnyRole>,
    lang: Locale,
    query: DocumentQuery,
) -> Result<Response, AppError> {
    let format = DocumentFormat::parse(query.format.as_deref())?;

    let document = app_state
        .document_service
        .generate(kind, access.tender_id, format, lang.0)
        .await?;

    Ok(file_response(&document.filename, document.content_type, document.bytes))
}

#[utoipa::path(
    get,
    path = "/api/documents/tender/{tender_id}/invitation",
    tag = "Documents",
    params(("tender_id" = Uuid, Path, description = "Tender ID"), DocumentQuery),
    responses(
        (status = 200, description = "Invitation to quote"),
        (status = 400, description = "Unsupported format"),
        (status = 404, description = "Tender not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn invitation(
    State(app_state): State<AppState>,
    access: RequireTenderRole<AnyRole>,
    locale: Locale,
    AppQuery(query): AppQuery<DocumentQuery>,
) -> Result<Response, AppError> {
    generate(&app_state, DocumentKind::Invitation, access, locale, query).await
}

#[utoipa::path(
    get,
    path = "/api/documents/tender/{tender_id}/quote-form",
    tag = "Documents",
    params(("tender_id" = Uuid, Path, description = "Tender ID"), DocumentQuery),
    responses(
        (status = 200, description = "Blank quote form with every lot's positions"),
        (status = 400, description = "Unsupported format"),
        (status = 404, description = "Tender not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn quote_form(
    State(app_state): State<AppState>,
    access: RequireTenderRole<AnyRole>,
    locale: Locale,
    AppQuery(query): AppQuery<DocumentQuery>,
) -> Result<Response, AppError> {
    generate(&app_state, DocumentKind::QuoteForm, access, locale, query).await
}

#[utoipa::path(
    get,
    path = "/api/documents/tender/{tender_id}/protocol",
    tag = "Documents",
    params(("tender_id" = Uuid, Path, description = "Tender ID"), DocumentQuery),
    responses(
        (status = 200, description = "Evaluation protocol"),
        (status = 400, description = "Unsupported format"),
        (status = 404, description = "Tender not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn protocol(
    State(app_state): State<AppState>,
    access: RequireTenderRole<AnyRole>,
    locale: Locale,
    AppQuery(query): AppQuery<DocumentQuery>,
) -> Result<Response, AppError> {
    generate(&app_state, DocumentKind::Protocol, access, locale, query).await
}
