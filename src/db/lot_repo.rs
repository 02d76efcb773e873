// src/db/lot_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{finish_update, push_set, update_statement},
        error::AppError,
    },
    models::lot::{CreateLotPayload, Lot, UpdateLotPayload},
};

#[derive(Clone)]
pub struct LotRepository {
    pool: PgPool,
}

impl LotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_tender(&self, tender_id: Uuid) -> Result<Vec<Lot>, AppError> {
        let lots = sqlx::query_as::<_, Lot>(
            "SELECT * FROM lots WHERE tender_id = $1 ORDER BY number",
        )
        .bind(tender_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lots)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Lot>, AppError> {
        let lot = sqlx::query_as::<_, Lot>("SELECT * FROM lots WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(lot)
    }

    /// Whether another lot of the tender already uses `number`.
    pub async fn number_taken(
        &self,
        tender_id: Uuid,
        number: i32,
        exclude: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM lots
                WHERE tender_id = $1 AND number = $2 AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(tender_id)
        .bind(number)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    pub async fn create(&self, payload: &CreateLotPayload) -> Result<Lot, AppError> {
        let lot = sqlx::query_as::<_, Lot>(
            r#"
            INSERT INTO lots (tender_id, number, title, description)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(payload.tender_id)
        .bind(payload.number)
        .bind(&payload.title)
        .bind(&payload.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(lot)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateLotPayload) -> Result<Option<Lot>, AppError> {
        let mut builder = update_statement("lots");
        push_set(&mut builder, "number", payload.number);
        push_set(&mut builder, "title", payload.title);
        push_set(&mut builder, "description", payload.description);
        finish_update(&mut builder, id);

        let lot = builder.build_query_as::<Lot>().fetch_optional(&self.pool).await?;
        Ok(lot)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM lots WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
