// src/models/position.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;
use validator::Validate;

// A line item of a lot
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: Uuid,
    pub lot_id: Uuid,
    #[schema(example = 1)]
    pub number: i32,
    #[schema(example = "A4 paper, 80 g/m2")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "pack")]
    pub unit: Option<String>,
    #[schema(example = "100")]
    pub quantity: Option<Decimal>,
    // Reference price
    #[schema(example = "4.50")]
    pub unit_price: Option<Decimal>,
    pub total_price: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column values for one insert; shared by single creation and bulk import.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewPosition {
    pub number: i32,
    pub name: String,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub total_price: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePositionPayload {
    pub lot_id: Uuid,

    #[validate(range(min = 1, message = "Position number must be positive"))]
    pub number: i32,

    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    pub description: Option<String>,
    pub unit: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub total_price: Option<Decimal>,
    pub notes: Option<String>,
}

impl From<CreatePositionPayload> for NewPosition {
    fn from(payload: CreatePositionPayload) -> Self {
        Self {
            number: payload.number,
            name: payload.name,
            description: payload.description,
            unit: payload.unit,
            quantity: payload.quantity,
            unit_price: payload.unit_price,
            total_price: payload.total_price,
            notes: payload.notes,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePositionPayload {
    #[validate(range(min = 1, message = "Position number must be positive"))]
    pub number: Option<i32>,

    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,

    pub description: Option<String>,
    pub unit: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub total_price: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImportResult {
    #[schema(example = 3)]
    pub count: usize,
    pub positions: Vec<Position>,
}
