// src/models/quote.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::common::error::AppError;

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "quote_status")]
pub enum QuoteStatus {
    Draft,
    Submitted,
    Evaluated,
    Rejected,
    Accepted,
}

impl QuoteStatus {
    /// Statuses that take part in the comparison matrix and the protocol.
    pub const COMPARABLE: [QuoteStatus; 3] = [
        QuoteStatus::Submitted,
        QuoteStatus::Evaluated,
        QuoteStatus::Accepted,
    ];

    pub fn is_comparable(self) -> bool {
        Self::COMPARABLE.contains(&self)
    }
}

// --- Rows ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: Uuid,
    pub tender_id: Uuid,
    pub lot_id: Uuid,
    pub supplier_id: Uuid,
    pub status: QuoteStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub valid_until: Option<NaiveDate>,
    // Fixed at creation (and whenever the line items are replaced)
    #[schema(example = "90.00")]
    pub total_amount: Option<Decimal>,
    #[schema(example = 14)]
    pub delivery_time_days: Option<i32>,
    pub payment_terms: Option<String>,
    pub warranty_period_months: Option<i32>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuotePosition {
    pub id: Uuid,
    pub quote_id: Uuid,
    pub position_id: Uuid,
    #[schema(example = "4.50")]
    pub unit_price: Decimal,
    #[schema(example = "20")]
    pub quantity: Decimal,
    #[schema(example = "90.00")]
    pub total_price: Decimal,
    pub delivery_time_days: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDetail {
    #[serde(flatten)]
    pub quote: Quote,
    pub positions: Vec<QuotePosition>,
}

// --- Payloads ---

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("Value cannot be negative".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteLineItemPayload {
    pub position_id: Uuid,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "4.50")]
    pub unit_price: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "20")]
    pub quantity: Decimal,

    pub delivery_time_days: Option<i32>,
    pub notes: Option<String>,
}

fn total_out_of_range() -> AppError {
    AppError::BadRequest("Line item total is out of range".into())
}

impl QuoteLineItemPayload {
    pub fn total_price(&self) -> Result<Decimal, AppError> {
        self.unit_price
            .checked_mul(self.quantity)
            .ok_or_else(total_out_of_range)
    }
}

/// Sum of `unit_price * quantity` over the line items; `None` when there are none.
pub fn quote_total(lines: &[QuoteLineItemPayload]) -> Result<Option<Decimal>, AppError> {
    if lines.is_empty() {
        return Ok(None);
    }
    let mut total = Decimal::ZERO;
    for line in lines {
        total = total
            .checked_add(line.total_price()?)
            .ok_or_else(total_out_of_range)?;
    }
    Ok(Some(total))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuotePayload {
    pub tender_id: Uuid,
    pub lot_id: Uuid,
    pub supplier_id: Uuid,
    pub status: Option<QuoteStatus>,
    pub valid_until: Option<NaiveDate>,
    pub delivery_time_days: Option<i32>,
    pub payment_terms: Option<String>,
    pub warranty_period_months: Option<i32>,
    pub notes: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub positions: Vec<QuoteLineItemPayload>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuotePayload {
    pub status: Option<QuoteStatus>,
    pub valid_until: Option<NaiveDate>,
    pub delivery_time_days: Option<i32>,
    pub payment_terms: Option<String>,
    pub warranty_period_months: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReplaceQuotePositionsPayload {
    #[validate(nested)]
    pub positions: Vec<QuoteLineItemPayload>,
}
