// src/services/tender_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{TenderRepository, UserRepository},
    models::{
        auth::{Role, User},
        tender::{
            AssignRolePayload, CreateTenderPayload, Tender, TenderRoleAssignment, TenderStatus,
            UpdateTenderPayload,
        },
    },
};

#[derive(Clone)]
pub struct TenderService {
    repo: TenderRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl TenderService {
    pub fn new(repo: TenderRepository, user_repo: UserRepository, pool: PgPool) -> Self {
        Self { repo, user_repo, pool }
    }

    /// Global admins see every tender; everyone else only what they created or hold a role on.
    pub async fn list_for_user(
        &self,
        user: &User,
        status: Option<TenderStatus>,
    ) -> Result<Vec<Tender>, AppError> {
        if user.role == Role::Admin {
            self.repo.list_all(status).await
        } else {
            self.repo.list_accessible(user.id, status).await
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<Tender, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::ResourceNotFound("Tender"))
    }

    /// Inserts the tender and grants "manager" on it (to `manager_id` when given,
    /// otherwise to the creator) in one transaction.
    pub async fn create(&self, payload: &CreateTenderPayload, creator: &User) -> Result<Tender, AppError> {
        let mut tx = self.pool.begin().await?;

        let tender = self.repo.create(&mut *tx, payload, creator.id).await?;
        let manager = payload.manager_id.unwrap_or(creator.id);
        self.repo
            .assign_role(&mut *tx, tender.id, manager, Role::Manager)
            .await?;

        tx.commit().await?;

        tracing::info!("Tender {} created by {}", tender.number, creator.email);
        Ok(tender)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateTenderPayload) -> Result<Tender, AppError> {
        self.repo
            .update(id, payload)
            .await?
            .ok_or(AppError::ResourceNotFound("Tender"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::ResourceNotFound("Tender"));
        }
        Ok(())
    }

    pub async fn assign_role(
        &self,
        tender_id: Uuid,
        payload: &AssignRolePayload,
    ) -> Result<TenderRoleAssignment, AppError> {
        self.get(tender_id).await?;
        self.user_repo
            .find_by_id(payload.user_id)
            .await?
            .ok_or(AppError::ResourceNotFound("User"))?;

        self.repo
            .assign_role(&self.pool, tender_id, payload.user_id, payload.role)
            .await?;

        self.repo
            .list_roles(tender_id)
            .await?
            .into_iter()
            .find(|assignment| assignment.user_id == payload.user_id)
            .ok_or(AppError::ResourceNotFound("Tender role"))
    }

    pub async fn list_roles(&self, tender_id: Uuid) -> Result<Vec<TenderRoleAssignment>, AppError> {
        self.repo.list_roles(tender_id).await
    }
}
