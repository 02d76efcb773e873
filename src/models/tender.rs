// src/models/tender.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::auth::Role;

// Draft -> CollectingQuotes -> Evaluation -> Decision -> Closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tender_status")]
pub enum TenderStatus {
    Draft,
    CollectingQuotes,
    Evaluation,
    Decision,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tender {
    pub id: Uuid,
    #[schema(example = "T-001")]
    pub number: String,
    #[schema(example = "Paper supply")]
    pub title: String,
    pub description: Option<String>,
    pub status: TenderStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub submission_deadline: Option<DateTime<Utc>>,
    pub decision_date: Option<NaiveDate>,
    pub created_by: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenderPayload {
    #[validate(length(min = 1, message = "Title is required"))]
    #[schema(example = "Paper supply")]
    pub title: String,

    pub description: Option<String>,

    #[validate(length(min = 1, message = "Tender number is required"))]
    #[schema(example = "T-001")]
    pub number: String,

    pub status: Option<TenderStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub submission_deadline: Option<DateTime<Utc>>,

    // When present this user becomes the tender manager instead of the creator
    pub manager_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenderPayload {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TenderStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub submission_deadline: Option<DateTime<Utc>>,
    pub decision_date: Option<NaiveDate>,
    pub manager_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TenderFilter {
    pub status: Option<TenderStatus>,
}

// A tender-role grant joined with the user it belongs to
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenderRoleAssignment {
    pub id: Uuid,
    pub tender_id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub email: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignRolePayload {
    pub user_id: Uuid,
    #[schema(example = "evaluator")]
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_pascal_case_on_the_wire() {
        let status: TenderStatus = serde_json::from_str("\"CollectingQuotes\"").unwrap();
        assert_eq!(status, TenderStatus::CollectingQuotes);
        assert!(serde_json::from_str::<TenderStatus>("\"Archived\"").is_err());
    }

    #[test]
    fn create_payload_requires_number_and_title() {
        let payload: CreateTenderPayload =
            serde_json::from_str(r#"{"title": "", "number": "T-001"}"#).unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
        assert!(!errors.field_errors().contains_key("number"));
    }
}
