pub mod access_control;
pub mod attachment_service;
pub mod audit_service;
pub mod auth;
pub mod comparison_service;
pub mod document_service;
pub mod labels;
pub mod lot_service;
pub mod position_import;
pub mod position_service;
pub mod quote_service;
pub mod supplier_service;
pub mod tender_service;
