// src/models/comparison.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;

use crate::models::{lot::Lot, position::Position, quote::Quote};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ComparisonLot {
    pub id: Uuid,
    pub number: i32,
    pub title: String,
}

impl From<&Lot> for ComparisonLot {
    fn from(lot: &Lot) -> Self {
        Self {
            id: lot.id,
            number: lot.number,
            title: lot.title.clone(),
        }
    }
}

/// A comparable quote together with the supplier identity shown in column headers.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonQuote {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub quote: Quote,
    pub supplier_name: String,
    pub supplier_inn: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ComparisonPosition {
    pub id: Uuid,
    pub number: i32,
    pub name: String,
    pub unit: Option<String>,
    pub quantity: Option<Decimal>,
}

impl From<&Position> for ComparisonPosition {
    fn from(position: &Position) -> Self {
        Self {
            id: position.id,
            number: position.number,
            name: position.name.clone(),
            unit: position.unit.clone(),
            quantity: position.quantity,
        }
    }
}

// One supplier's answer for one position; price fields stay null when the
// supplier did not quote that position.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonCell {
    pub quote_id: Uuid,
    pub supplier_name: String,
    pub supplier_inn: Option<String>,
    pub unit_price: Option<Decimal>,
    pub quantity: Option<Decimal>,
    pub total_price: Option<Decimal>,
    pub delivery_time_days: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ComparisonRow {
    pub position: ComparisonPosition,
    pub quotes: Vec<ComparisonCell>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ComparisonMatrix {
    pub lot: ComparisonLot,
    pub positions: Vec<Position>,
    pub quotes: Vec<ComparisonQuote>,
    pub comparison: Vec<ComparisonRow>,
}
