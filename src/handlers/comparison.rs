// src/handlers/comparison.rs

use axum::{extract::State, response::Response, Json};
use uuid::Uuid;

use crate::{
    common::{error::AppError, extract::AppPath},
    config::AppState,
    handlers::{download::file_response, scope::lot_in_scope},
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::comparison::ComparisonMatrix,
    services::comparison_service::export_xlsx,
};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[utoipa::path(
    get,
    path = "/api/comparison/lot/{lot_id}",
    tag = "Comparison",
    params(("lot_id" = Uuid, Path, description = "Lot ID")),
    responses(
        (status = 200, description = "Position by supplier matrix", body = ComparisonMatrix),
        (status = 404, description = "Lot not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_comparison(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    AppPath(lot_id): AppPath<Uuid>,
) -> Result<Json<ComparisonMatrix>, AppError> {
    let lot = lot_in_scope(&app_state, &user, lot_id, None).await?;
    let matrix = app_state.comparison_service.matrix(&lot).await?;
    Ok(Json(matrix))
}

#[utoipa::path(
    get,
    path = "/api/comparison/lot/{lot_id}/export",
    tag = "Comparison",
    params(
        ("lot_id" = Uuid, Path, description = "Lot ID"),
        ("accept-language" = Option<String>, Header, description = "ru or en column labels")
    ),
    responses(
        (status = 200, description = "Spreadsheet download (xlsx)"),
        (status = 404, description = "Lot not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_comparison(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Locale(lang): Locale,
    AppPath(lot_id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    let lot = lot_in_scope(&app_state, &user, lot_id, None).await?;
    let matrix = app_state.comparison_service.matrix(&lot).await?;

    let bytes = tokio::task::spawn_blocking(move || export_xlsx(&matrix, lang))
        .await
        .map_err(|e| anyhow::anyhow!("Spreadsheet export task failed: {}", e))??;

    let filename = format!("comparison_lot_{}.xlsx", lot.number);
    Ok(file_response(&filename, XLSX_CONTENT_TYPE, bytes))
}
