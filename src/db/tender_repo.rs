// src/db/tender_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{finish_update, push_set, update_statement},
        error::AppError,
    },
    models::{
        auth::Role,
        tender::{CreateTenderPayload, Tender, TenderRoleAssignment, TenderStatus, UpdateTenderPayload},
    },
    services::access_control::TenderRoleStore,
};

#[derive(Clone)]
pub struct TenderRepository {
    pool: PgPool,
}

impl TenderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  TENDERS
    // =========================================================================

    pub async fn list_all(&self, status: Option<TenderStatus>) -> Result<Vec<Tender>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM tenders");
        if let Some(status) = status {
            builder.push(" WHERE status = ").push_bind(status);
        }
        builder.push(" ORDER BY created_at DESC");

        let tenders = builder.build_query_as::<Tender>().fetch_all(&self.pool).await?;
        Ok(tenders)
    }

    /// Tenders the user created or holds a tender-role on.
    pub async fn list_accessible(
        &self,
        user_id: Uuid,
        status: Option<TenderStatus>,
    ) -> Result<Vec<Tender>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT t.* FROM tenders t WHERE (t.created_by = ",
        );
        builder
            .push_bind(user_id)
            .push(" OR EXISTS (SELECT 1 FROM tender_roles tr WHERE tr.tender_id = t.id AND tr.user_id = ")
            .push_bind(user_id)
            .push("))");
        if let Some(status) = status {
            builder.push(" AND t.status = ").push_bind(status);
        }
        builder.push(" ORDER BY t.created_at DESC");

        let tenders = builder.build_query_as::<Tender>().fetch_all(&self.pool).await?;
        Ok(tenders)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Tender>, AppError> {
        let tender = sqlx::query_as::<_, Tender>("SELECT * FROM tenders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tender)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        payload: &CreateTenderPayload,
        created_by: Uuid,
    ) -> Result<Tender, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Tender>(
            r#"
            INSERT INTO tenders (
                number, title, description, status, start_date, end_date,
                submission_deadline, created_by, manager_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&payload.number)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.status.unwrap_or(TenderStatus::Draft))
        .bind(payload.start_date)
        .bind(payload.end_date)
        .bind(payload.submission_deadline)
        .bind(created_by)
        .bind(payload.manager_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::Conflict("Tender number already exists".into());
                }
            }
            e.into()
        })
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: UpdateTenderPayload,
    ) -> Result<Option<Tender>, AppError> {
        let mut builder = update_statement("tenders");
        push_set(&mut builder, "title", payload.title);
        push_set(&mut builder, "description", payload.description);
        push_set(&mut builder, "status", payload.status);
        push_set(&mut builder, "start_date", payload.start_date);
        push_set(&mut builder, "end_date", payload.end_date);
        push_set(&mut builder, "submission_deadline", payload.submission_deadline);
        push_set(&mut builder, "decision_date", payload.decision_date);
        push_set(&mut builder, "manager_id", payload.manager_id);
        finish_update(&mut builder, id);

        let tender = builder
            .build_query_as::<Tender>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(tender)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tenders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  TENDER ROLES
    // =========================================================================

    /// Last write wins for an existing (tender, user) pair.
    pub async fn assign_role<'e, E>(
        &self,
        executor: E,
        tender_id: Uuid,
        user_id: Uuid,
        role: Role,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO tender_roles (tender_id, user_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (tender_id, user_id) DO UPDATE SET role = EXCLUDED.role
            "#,
        )
        .bind(tender_id)
        .bind(user_id)
        .bind(role)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn find_role(&self, tender_id: Uuid, user_id: Uuid) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_scalar::<_, Role>(
            "SELECT role FROM tender_roles WHERE tender_id = $1 AND user_id = $2",
        )
        .bind(tender_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(role)
    }

    pub async fn list_roles(&self, tender_id: Uuid) -> Result<Vec<TenderRoleAssignment>, AppError> {
        let roles = sqlx::query_as::<_, TenderRoleAssignment>(
            r#"
            SELECT tr.id, tr.tender_id, tr.user_id, tr.role, u.email, u.full_name, tr.created_at
            FROM tender_roles tr
            JOIN users u ON u.id = tr.user_id
            WHERE tr.tender_id = $1
            ORDER BY tr.created_at
            "#,
        )
        .bind(tender_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }
}

#[async_trait]
impl TenderRoleStore for TenderRepository {
    async fn find_role(&self, tender_id: Uuid, user_id: Uuid) -> Result<Option<Role>, AppError> {
        TenderRepository::find_role(self, tender_id, user_id).await
    }
}
