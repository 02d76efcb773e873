// src/common/error.rs

use std::collections::HashMap;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{config::AppState, models::auth::Role};

const GENERIC_INTERNAL_MESSAGE: &str = "Internal server error";

// Single error type shared by repositories, services and handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Tender ID required")]
    MissingTenderId,

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Access denied to this tender")]
    TenderAccessDenied,

    #[error("Requires {0} role or higher")]
    InsufficientRole(Role),

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("{0} not found")]
    ResourceNotFound(&'static str),

    #[error("User already exists")]
    EmailAlreadyExists,

    #[error("{0}")]
    Conflict(String),

    #[error("File exceeds the maximum upload size of {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("{0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// The rendered form of an error: `{ "error": { "message", "statusCode" } }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<Value>,
}

// Carries the real message of a 500 so the response layer can decide whether to expose it.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut error = json!({
            "message": self.message,
            "statusCode": self.status.as_u16(),
        });
        if let Some(details) = self.details {
            error["details"] = details;
        }
        (self.status, Json(json!({ "error": error }))).into_response()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::BadRequest(_) | AppError::MissingTenderId => {
                StatusCode::BAD_REQUEST
            }
            AppError::AuthenticationRequired
            | AppError::InvalidToken
            | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::AccountDisabled
            | AppError::TenderAccessDenied
            | AppError::InsufficientRole(_)
            | AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::DatabaseError(e) => match e.as_database_error() {
                Some(db_err) if db_err.is_unique_violation() => StatusCode::CONFLICT,
                Some(db_err) if db_err.is_foreign_key_violation() => StatusCode::BAD_REQUEST,
                _ => match e {
                    sqlx::Error::RowNotFound => StatusCode::NOT_FOUND,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                },
            },
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_api_error(&self) -> ApiError {
        let status = self.status();
        match self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => m.to_string(),
                            None => format!("{} is invalid", field),
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                // Surface the first message at the top level, the rest goes in details.
                let mut fields: Vec<&String> = details.keys().collect();
                fields.sort();
                let message = fields
                    .first()
                    .and_then(|f| details[*f].first().cloned())
                    .unwrap_or_else(|| "One or more fields are invalid".to_string());
                ApiError {
                    status,
                    message,
                    details: Some(json!(details)),
                }
            }
            AppError::DatabaseError(_) if status == StatusCode::CONFLICT => {
                ApiError::new(status, "Resource already exists")
            }
            AppError::DatabaseError(_) if status == StatusCode::BAD_REQUEST => {
                ApiError::new(status, "Referenced entity does not exist")
            }
            AppError::DatabaseError(_) if status == StatusCode::NOT_FOUND => {
                ApiError::new(status, "Resource not found")
            }
            _ if status == StatusCode::INTERNAL_SERVER_ERROR => {
                ApiError::new(status, GENERIC_INTERNAL_MESSAGE)
            }
            other => ApiError::new(status, other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let api_error = self.to_api_error();
        if api_error.status != StatusCode::INTERNAL_SERVER_ERROR {
            return api_error.into_response();
        }

        tracing::error!("Internal server error: {}", self);
        let mut response = api_error.into_response();
        response
            .extensions_mut()
            .insert(InternalErrorDetail(self.to_string()));
        response
    }
}

/// Outside production the real message of a 500 replaces the generic one.
pub async fn expose_internal_errors(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if !app_state.config.expose_internal_errors {
        return response;
    }

    match response.extensions().get::<InternalErrorDetail>().cloned() {
        Some(InternalErrorDetail(message)) => {
            ApiError::new(response.status(), message).into_response()
        }
        None => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Payload {
        #[validate(length(min = 1, message = "Title is required"))]
        title: String,
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn renders_uniform_error_body() {
        let response = AppError::ResourceNotFound("Tender").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Tender not found");
        assert_eq!(body["error"]["statusCode"], 404);
    }

    #[tokio::test]
    async fn validation_errors_carry_field_details() {
        let errors = Payload { title: String::new() }.validate().unwrap_err();
        let response = AppError::ValidationError(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Title is required");
        assert_eq!(body["error"]["details"]["title"][0], "Title is required");
    }

    #[tokio::test]
    async fn internal_errors_hide_message_but_keep_detail() {
        let response =
            AppError::InternalServerError(anyhow::anyhow!("pool exhausted")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = response.extensions().get::<InternalErrorDetail>().cloned();
        assert_eq!(detail.map(|d| d.0).as_deref(), Some("pool exhausted"));

        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], GENERIC_INTERNAL_MESSAGE);
    }

    #[test]
    fn maps_auth_failures_to_the_right_status() {
        assert_eq!(AppError::MissingTenderId.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::AuthenticationRequired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::TenderAccessDenied.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::InsufficientRole(Role::Manager).to_string(),
            "Requires manager role or higher"
        );
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::RowNotFound).status(),
            StatusCode::NOT_FOUND
        );
    }
}
