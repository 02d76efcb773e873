// src/services/lot_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::LotRepository,
    models::lot::{CreateLotPayload, Lot, UpdateLotPayload},
};

#[derive(Clone)]
pub struct LotService {
    repo: LotRepository,
}

impl LotService {
    pub fn new(repo: LotRepository) -> Self {
        Self { repo }
    }

    pub async fn list_by_tender(&self, tender_id: Uuid) -> Result<Vec<Lot>, AppError> {
        self.repo.list_by_tender(tender_id).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Lot, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::ResourceNotFound("Lot"))
    }

    // Lot numbers are unique per tender; the schema does not enforce it.
    pub async fn create(&self, payload: &CreateLotPayload) -> Result<Lot, AppError> {
        if self.repo.number_taken(payload.tender_id, payload.number, None).await? {
            return Err(AppError::Conflict(format!(
                "Lot number {} already exists in this tender",
                payload.number
            )));
        }
        self.repo.create(payload).await
    }

    pub async fn update(&self, lot: &Lot, payload: UpdateLotPayload) -> Result<Lot, AppError> {
        if let Some(number) = payload.number {
            if number != lot.number
                && self.repo.number_taken(lot.tender_id, number, Some(lot.id)).await?
            {
                return Err(AppError::Conflict(format!(
                    "Lot number {} already exists in this tender",
                    number
                )));
            }
        }
        self.repo
            .update(lot.id, payload)
            .await?
            .ok_or(AppError::ResourceNotFound("Lot"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::ResourceNotFound("Lot"));
        }
        Ok(())
    }
}
