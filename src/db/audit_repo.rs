// src/db/audit_repo.rs

use sqlx::PgPool;

use crate::{common::error::AppError, models::audit::AuditEntry};

#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, entry: &AuditEntry) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (entity_type, entity_id, action, user_id, changes, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.entity_type)
        .bind(&entry.entity_id)
        .bind(entry.action.as_str())
        .bind(entry.user_id)
        .bind(&entry.changes)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
