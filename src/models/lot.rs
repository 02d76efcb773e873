// src/models/lot.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: Uuid,
    pub tender_id: Uuid,
    #[schema(example = 1)]
    pub number: i32,
    #[schema(example = "Office paper")]
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLotPayload {
    pub tender_id: Uuid,

    #[validate(range(min = 1, message = "Lot number must be positive"))]
    #[schema(example = 1)]
    pub number: i32,

    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLotPayload {
    #[validate(range(min = 1, message = "Lot number must be positive"))]
    pub number: Option<i32>,

    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,

    pub description: Option<String>,
}
