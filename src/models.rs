pub mod auth;
pub mod tender;
pub mod lot;
pub mod position;
pub mod supplier;
pub mod quote;
pub mod comparison;
pub mod attachment;
pub mod audit;
