// src/services/supplier_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::SupplierRepository,
    models::supplier::{CreateSupplierPayload, Supplier, UpdateSupplierPayload},
};

#[derive(Clone)]
pub struct SupplierService {
    repo: SupplierRepository,
}

impl SupplierService {
    pub fn new(repo: SupplierRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Supplier>, AppError> {
        self.repo.list_all().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Supplier, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::ResourceNotFound("Supplier"))
    }

    pub async fn create(&self, payload: &CreateSupplierPayload, created_by: Uuid) -> Result<Supplier, AppError> {
        self.repo.create(payload, created_by).await
    }

    pub async fn update(&self, id: Uuid, payload: UpdateSupplierPayload) -> Result<Supplier, AppError> {
        self.repo
            .update(id, payload)
            .await?
            .ok_or(AppError::ResourceNotFound("Supplier"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::ResourceNotFound("Supplier"));
        }
        Ok(())
    }
}
