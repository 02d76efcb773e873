pub mod user_repo;
pub use user_repo::UserRepository;
pub mod tender_repo;
pub use tender_repo::TenderRepository;
pub mod lot_repo;
pub use lot_repo::LotRepository;
pub mod position_repo;
pub use position_repo::PositionRepository;
pub mod supplier_repo;
pub use supplier_repo::SupplierRepository;
pub mod quote_repo;
pub use quote_repo::QuoteRepository;
pub mod attachment_repo;
pub use attachment_repo::AttachmentRepository;
pub mod audit_repo;
pub use audit_repo::AuditRepository;
