// src/services/position_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::PositionRepository,
    models::position::{NewPosition, Position, UpdatePositionPayload},
    services::position_import,
};

#[derive(Clone)]
pub struct PositionService {
    repo: PositionRepository,
    pool: PgPool,
}

impl PositionService {
    pub fn new(repo: PositionRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn list_by_lot(&self, lot_id: Uuid) -> Result<Vec<Position>, AppError> {
        self.repo.list_by_lot(lot_id).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Position, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::ResourceNotFound("Position"))
    }

    pub async fn create(&self, lot_id: Uuid, position: &NewPosition) -> Result<Position, AppError> {
        self.repo.create(&self.pool, lot_id, position).await
    }

    pub async fn update(&self, id: Uuid, payload: UpdatePositionPayload) -> Result<Position, AppError> {
        self.repo
            .update(id, payload)
            .await?
            .ok_or(AppError::ResourceNotFound("Position"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::ResourceNotFound("Position"));
        }
        Ok(())
    }

    /// Parses the workbook and inserts every row on one transaction; any failed
    /// insert leaves nothing behind.
    pub async fn import(&self, lot_id: Uuid, file: Vec<u8>) -> Result<Vec<Position>, AppError> {
        let rows = tokio::task::spawn_blocking(move || position_import::parse_workbook(file))
            .await
            .map_err(|e| anyhow::anyhow!("Spreadsheet parsing task failed: {}", e))??;

        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(rows.len());
        for row in &rows {
            created.push(self.repo.create(&mut *tx, lot_id, row).await?);
        }
        tx.commit().await?;

        tracing::info!("Imported {} positions into lot {}", created.len(), lot_id);
        Ok(created)
    }
}
