// src/models/attachment.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: Uuid,
    pub tender_id: Option<Uuid>,
    pub lot_id: Option<Uuid>,
    pub quote_id: Option<Uuid>,
    // Name on disk: <uuid>.<ext>
    pub filename: String,
    #[schema(example = "price_list.pdf")]
    pub original_filename: String,
    pub mime_type: Option<String>,
    pub size: i64,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub file_path: String,
    pub uploaded_by: Option<Uuid>,
    pub uploaded_at: DateTime<Utc>,
}

/// Where an upload is attached; at least one target must be set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttachmentTarget {
    pub tender_id: Option<Uuid>,
    pub lot_id: Option<Uuid>,
    pub quote_id: Option<Uuid>,
}

impl AttachmentTarget {
    pub fn is_empty(&self) -> bool {
        self.tender_id.is_none() && self.lot_id.is_none() && self.quote_id.is_none()
    }
}

/// Metadata of a file already written to the upload directory.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub filename: String,
    pub original_filename: String,
    pub mime_type: Option<String>,
    pub size: i64,
    pub file_path: String,
}
