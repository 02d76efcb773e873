// src/db/supplier_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{finish_update, push_set, update_statement},
        error::AppError,
    },
    models::supplier::{CreateSupplierPayload, Supplier, UpdateSupplierPayload},
};

#[derive(Clone)]
pub struct SupplierRepository {
    pool: PgPool,
}

impl SupplierRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Supplier>, AppError> {
        let suppliers = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(suppliers)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Supplier>, AppError> {
        let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(supplier)
    }

    pub async fn create(
        &self,
        payload: &CreateSupplierPayload,
        created_by: Uuid,
    ) -> Result<Supplier, AppError> {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (name, inn, contact_person, email, phone, address, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.inn)
        .bind(&payload.contact_person)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.address)
        .bind(&payload.notes)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(supplier)
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: UpdateSupplierPayload,
    ) -> Result<Option<Supplier>, AppError> {
        let mut builder = update_statement("suppliers");
        push_set(&mut builder, "name", payload.name);
        push_set(&mut builder, "inn", payload.inn);
        push_set(&mut builder, "contact_person", payload.contact_person);
        push_set(&mut builder, "email", payload.email);
        push_set(&mut builder, "phone", payload.phone);
        push_set(&mut builder, "address", payload.address);
        push_set(&mut builder, "notes", payload.notes);
        finish_update(&mut builder, id);

        let supplier = builder
            .build_query_as::<Supplier>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(supplier)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_foreign_key_violation() {
                        return AppError::Conflict("Supplier has quotes and cannot be deleted".into());
                    }
                }
                AppError::from(e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
