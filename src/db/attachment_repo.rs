// src/db/attachment_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::attachment::{Attachment, AttachmentTarget, StoredFile},
};

#[derive(Clone)]
pub struct AttachmentRepository {
    pool: PgPool,
}

impl AttachmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list_where(&self, column: &str, id: Uuid) -> Result<Vec<Attachment>, AppError> {
        let sql = format!("SELECT * FROM attachments WHERE {column} = $1 ORDER BY uploaded_at DESC");
        let attachments = sqlx::query_as::<_, Attachment>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(attachments)
    }

    pub async fn list_by_tender(&self, tender_id: Uuid) -> Result<Vec<Attachment>, AppError> {
        self.list_where("tender_id", tender_id).await
    }

    pub async fn list_by_lot(&self, lot_id: Uuid) -> Result<Vec<Attachment>, AppError> {
        self.list_where("lot_id", lot_id).await
    }

    pub async fn list_by_quote(&self, quote_id: Uuid) -> Result<Vec<Attachment>, AppError> {
        self.list_where("quote_id", quote_id).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Attachment>, AppError> {
        let attachment = sqlx::query_as::<_, Attachment>("SELECT * FROM attachments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(attachment)
    }

    pub async fn create(
        &self,
        target: AttachmentTarget,
        file: &StoredFile,
        uploaded_by: Uuid,
    ) -> Result<Attachment, AppError> {
        let attachment = sqlx::query_as::<_, Attachment>(
            r#"
            INSERT INTO attachments (
                tender_id, lot_id, quote_id, filename, original_filename,
                mime_type, size, file_path, uploaded_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(target.tender_id)
        .bind(target.lot_id)
        .bind(target.quote_id)
        .bind(&file.filename)
        .bind(&file.original_filename)
        .bind(&file.mime_type)
        .bind(file.size)
        .bind(&file.file_path)
        .bind(uploaded_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(attachment)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM attachments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
