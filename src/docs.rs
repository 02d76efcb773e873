// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Health ---
        handlers::health::health,

        // --- Auth ---
        handlers::auth::login,
        handlers::auth::register,
        handlers::auth::get_me,

        // --- Tenders ---
        handlers::tenders::list_tenders,
        handlers::tenders::create_tender,
        handlers::tenders::get_tender,
        handlers::tenders::update_tender,
        handlers::tenders::delete_tender,
        handlers::tenders::list_tender_roles,
        handlers::tenders::assign_tender_role,

        // --- Lots ---
        handlers::lots::list_lots_by_tender,
        handlers::lots::get_lot,
        handlers::lots::create_lot,
        handlers::lots::update_lot,
        handlers::lots::delete_lot,

        // --- Positions ---
        handlers::positions::list_positions_by_lot,
        handlers::positions::get_position,
        handlers::positions::create_position,
        handlers::positions::update_position,
        handlers::positions::delete_position,
        handlers::positions::import_positions,

        // --- Suppliers ---
        handlers::suppliers::list_suppliers,
        handlers::suppliers::get_supplier,
        handlers::suppliers::create_supplier,
        handlers::suppliers::update_supplier,
        handlers::suppliers::delete_supplier,

        // --- Quotes ---
        handlers::quotes::list_quotes_by_tender,
        handlers::quotes::list_quotes_by_lot,
        handlers::quotes::get_quote,
        handlers::quotes::create_quote,
        handlers::quotes::update_quote,
        handlers::quotes::replace_quote_positions,
        handlers::quotes::submit_quote,
        handlers::quotes::delete_quote,

        // --- Comparison ---
        handlers::comparison::get_comparison,
        handlers::comparison::export_comparison,

        // --- Documents ---
        handlers::documents::invitation,
        handlers::documents::quote_form,
        handlers::documents::protocol,

        // --- Attachments ---
        handlers::attachments::list_tender_attachments,
        handlers::attachments::list_lot_attachments,
        handlers::attachments::list_quote_attachments,
        handlers::attachments::upload_attachment,
        handlers::attachments::download_attachment,
        handlers::attachments::delete_attachment,
    ),
    components(
        schemas(
            handlers::health::HealthStatus,

            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::UserSummary,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Tenders ---
            models::tender::TenderStatus,
            models::tender::Tender,
            models::tender::CreateTenderPayload,
            models::tender::UpdateTenderPayload,
            models::tender::TenderRoleAssignment,
            models::tender::AssignRolePayload,

            // --- Lots / Positions ---
            models::lot::Lot,
            models::lot::CreateLotPayload,
            models::lot::UpdateLotPayload,
            models::position::Position,
            models::position::CreatePositionPayload,
            models::position::UpdatePositionPayload,
            models::position::ImportResult,

            // --- Suppliers ---
            models::supplier::Supplier,
            models::supplier::CreateSupplierPayload,
            models::supplier::UpdateSupplierPayload,

            // --- Quotes ---
            models::quote::QuoteStatus,
            models::quote::Quote,
            models::quote::QuotePosition,
            models::quote::QuoteDetail,
            models::quote::QuoteLineItemPayload,
            models::quote::CreateQuotePayload,
            models::quote::UpdateQuotePayload,
            models::quote::ReplaceQuotePositionsPayload,

            // --- Comparison ---
            models::comparison::ComparisonLot,
            models::comparison::ComparisonQuote,
            models::comparison::ComparisonPosition,
            models::comparison::ComparisonCell,
            models::comparison::ComparisonRow,
            models::comparison::ComparisonMatrix,

            // --- Uploads ---
            handlers::positions::SpreadsheetUpload,
            handlers::attachments::AttachmentUpload,

            // --- Attachments ---
            models::attachment::Attachment,
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Auth", description = "Login and user accounts"),
        (name = "Tenders", description = "Tenders and per-tender roles"),
        (name = "Lots", description = "Lots of a tender"),
        (name = "Positions", description = "Line items of a lot, including spreadsheet import"),
        (name = "Suppliers", description = "Supplier directory"),
        (name = "Quotes", description = "Supplier quotes and their line items"),
        (name = "Comparison", description = "Quote comparison matrix and export"),
        (name = "Documents", description = "Invitation, quote form and protocol (docx/pdf)"),
        (name = "Attachments", description = "Files attached to tenders, lots and quotes")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
