pub mod attachments;
pub mod auth;
pub mod comparison;
pub mod documents;
pub mod download;
pub mod health;
pub mod lots;
pub mod positions;
pub mod quotes;
pub mod scope;
pub mod suppliers;
pub mod tenders;
