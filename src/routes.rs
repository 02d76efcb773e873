// src/routes.rs

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode, Uri},
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    common::error::{expose_internal_errors, ApiError},
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::auth::auth_guard,
};

// Room for multipart boundaries and the non-file fields
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(app_state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/health", get(handlers::health::health))
        .route("/api/auth/login", post(handlers::auth::login));

    let tender_routes = Router::new()
        .route(
            "/",
            get(handlers::tenders::list_tenders).post(handlers::tenders::create_tender),
        )
        .route(
            "/{tender_id}",
            get(handlers::tenders::get_tender)
                .put(handlers::tenders::update_tender)
                .delete(handlers::tenders::delete_tender),
        )
        .route(
            "/{tender_id}/roles",
            get(handlers::tenders::list_tender_roles).post(handlers::tenders::assign_tender_role),
        );

    let lot_routes = Router::new()
        .route("/", post(handlers::lots::create_lot))
        .route("/tender/{tender_id}", get(handlers::lots::list_lots_by_tender))
        .route(
            "/{id}",
            get(handlers::lots::get_lot)
                .put(handlers::lots::update_lot)
                .delete(handlers::lots::delete_lot),
        );

    let position_routes = Router::new()
        .route("/", post(handlers::positions::create_position))
        .route("/lot/{lot_id}", get(handlers::positions::list_positions_by_lot))
        .route("/import/{lot_id}", post(handlers::positions::import_positions))
        .route(
            "/{id}",
            get(handlers::positions::get_position)
                .put(handlers::positions::update_position)
                .delete(handlers::positions::delete_position),
        );

    let supplier_routes = Router::new()
        .route(
            "/",
            get(handlers::suppliers::list_suppliers).post(handlers::suppliers::create_supplier),
        )
        .route(
            "/{id}",
            get(handlers::suppliers::get_supplier)
                .put(handlers::suppliers::update_supplier)
                .delete(handlers::suppliers::delete_supplier),
        );

    let quote_routes = Router::new()
        .route("/", post(handlers::quotes::create_quote))
        .route("/tender/{tender_id}", get(handlers::quotes::list_quotes_by_tender))
        .route("/lot/{lot_id}", get(handlers::quotes::list_quotes_by_lot))
        .route(
            "/{id}",
            get(handlers::quotes::get_quote)
                .put(handlers::quotes::update_quote)
                .delete(handlers::quotes::delete_quote),
        )
        .route("/{id}/positions", put(handlers::quotes::replace_quote_positions))
        .route("/{id}/submit", post(handlers::quotes::submit_quote));

    let comparison_routes = Router::new()
        .route("/lot/{lot_id}", get(handlers::comparison::get_comparison))
        .route("/lot/{lot_id}/export", get(handlers::comparison::export_comparison));

    let document_routes = Router::new()
        .route("/tender/{tender_id}/invitation", get(handlers::documents::invitation))
        .route("/tender/{tender_id}/quote-form", get(handlers::documents::quote_form))
        .route("/tender/{tender_id}/protocol", get(handlers::documents::protocol));

    let attachment_routes = Router::new()
        .route("/", post(handlers::attachments::upload_attachment))
        .route(
            "/tender/{tender_id}",
            get(handlers::attachments::list_tender_attachments),
        )
        .route("/lot/{lot_id}", get(handlers::attachments::list_lot_attachments))
        .route("/quote/{quote_id}", get(handlers::attachments::list_quote_attachments))
        .route("/{id}", delete(handlers::attachments::delete_attachment))
        .route("/{id}/download", get(handlers::attachments::download_attachment));

    // Everything below requires a valid bearer token
    let protected_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/me", get(handlers::auth::get_me))
        .nest("/api/tenders", tender_routes)
        .nest("/api/lots", lot_routes)
        .nest("/api/positions", position_routes)
        .nest("/api/suppliers", supplier_routes)
        .nest("/api/quotes", quote_routes)
        .nest("/api/comparison", comparison_routes)
        .nest("/api/documents", document_routes)
        .nest("/api/attachments", attachment_routes)
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let body_limit = app_state.config.max_file_size + MULTIPART_OVERHEAD;
    let cors = cors_layer(&app_state.config.allowed_origins);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(route_not_found)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            expose_internal_errors,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// An empty list allows any origin.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

async fn route_not_found(method: Method, uri: Uri) -> impl IntoResponse {
    tracing::warn!("Route not found: {} {}", method, uri.path());
    ApiError::new(
        StatusCode::NOT_FOUND,
        format!("Route not found: {} {}", method, uri.path()),
    )
}
