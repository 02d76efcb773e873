// src/db/position_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{finish_update, push_set, update_statement},
        error::AppError,
    },
    models::position::{NewPosition, Position, UpdatePositionPayload},
};

#[derive(Clone)]
pub struct PositionRepository {
    pool: PgPool,
}

impl PositionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_lot(&self, lot_id: Uuid) -> Result<Vec<Position>, AppError> {
        let positions = sqlx::query_as::<_, Position>(
            "SELECT * FROM positions WHERE lot_id = $1 ORDER BY number",
        )
        .bind(lot_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(positions)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Position>, AppError> {
        let position = sqlx::query_as::<_, Position>("SELECT * FROM positions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(position)
    }

    /// Takes any executor so bulk imports can run every insert on one transaction.
    pub async fn create<'e, E>(
        &self,
        executor: E,
        lot_id: Uuid,
        position: &NewPosition,
    ) -> Result<Position, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let created = sqlx::query_as::<_, Position>(
            r#"
            INSERT INTO positions (
                lot_id, number, name, description, unit, quantity, unit_price, total_price, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(lot_id)
        .bind(position.number)
        .bind(&position.name)
        .bind(&position.description)
        .bind(&position.unit)
        .bind(position.quantity)
        .bind(position.unit_price)
        .bind(position.total_price)
        .bind(&position.notes)
        .fetch_one(executor)
        .await?;
        Ok(created)
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: UpdatePositionPayload,
    ) -> Result<Option<Position>, AppError> {
        let mut builder = update_statement("positions");
        push_set(&mut builder, "number", payload.number);
        push_set(&mut builder, "name", payload.name);
        push_set(&mut builder, "description", payload.description);
        push_set(&mut builder, "unit", payload.unit);
        push_set(&mut builder, "quantity", payload.quantity);
        push_set(&mut builder, "unit_price", payload.unit_price);
        push_set(&mut builder, "total_price", payload.total_price);
        push_set(&mut builder, "notes", payload.notes);
        finish_update(&mut builder, id);

        let position = builder
            .build_query_as::<Position>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(position)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM positions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
