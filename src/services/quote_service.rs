// src/services/quote_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LotRepository, QuoteRepository},
    models::quote::{
        CreateQuotePayload, Quote, QuoteDetail, QuoteLineItemPayload, UpdateQuotePayload, quote_total,
    },
};

#[derive(Clone)]
pub struct QuoteService {
    repo: QuoteRepository,
    lot_repo: LotRepository,
    pool: PgPool,
}

impl QuoteService {
    pub fn new(repo: QuoteRepository, lot_repo: LotRepository, pool: PgPool) -> Self {
        Self { repo, lot_repo, pool }
    }

    pub async fn list_by_tender(&self, tender_id: Uuid) -> Result<Vec<Quote>, AppError> {
        self.repo.list_by_tender(tender_id).await
    }

    pub async fn list_by_lot(&self, lot_id: Uuid) -> Result<Vec<Quote>, AppError> {
        self.repo.list_by_lot(lot_id).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Quote, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::ResourceNotFound("Quote"))
    }

    pub async fn get_detail(&self, id: Uuid) -> Result<QuoteDetail, AppError> {
        let quote = self.get(id).await?;
        let positions = self.repo.list_positions(id).await?;
        Ok(QuoteDetail { quote, positions })
    }

    // ---
    // Quote creation: header row + line items, all or nothing
    // ---
    pub async fn create(&self, payload: &CreateQuotePayload, created_by: Uuid) -> Result<QuoteDetail, AppError> {
        let lot = self
            .lot_repo
            .find_by_id(payload.lot_id)
            .await?
            .ok_or(AppError::ResourceNotFound("Lot"))?;
        if lot.tender_id != payload.tender_id {
            return Err(AppError::BadRequest("Lot does not belong to this tender".into()));
        }

        let total = quote_total(&payload.positions)?;

        let mut tx = self.pool.begin().await?;

        let quote = self.repo.create(&mut *tx, payload, total, created_by).await?;
        let mut positions = Vec::with_capacity(payload.positions.len());
        for line in &payload.positions {
            // An error here drops `tx` uncommitted, which rolls the quote back too.
            positions.push(self.repo.add_line_item(&mut *tx, quote.id, line).await?);
        }

        tx.commit().await?;

        Ok(QuoteDetail { quote, positions })
    }

    /// Replaces every line item and recomputes the total in one transaction.
    pub async fn replace_positions(
        &self,
        id: Uuid,
        lines: &[QuoteLineItemPayload],
    ) -> Result<QuoteDetail, AppError> {
        let total = quote_total(lines)?;

        let mut tx = self.pool.begin().await?;

        self.repo.delete_line_items(&mut *tx, id).await?;
        let mut positions = Vec::with_capacity(lines.len());
        for line in lines {
            positions.push(self.repo.add_line_item(&mut *tx, id, line).await?);
        }
        let quote = self
            .repo
            .set_total(&mut *tx, id, total)
            .await?
            .ok_or(AppError::ResourceNotFound("Quote"))?;

        tx.commit().await?;

        Ok(QuoteDetail { quote, positions })
    }

    pub async fn update(&self, id: Uuid, payload: UpdateQuotePayload) -> Result<Quote, AppError> {
        self.repo
            .update(id, payload)
            .await?
            .ok_or(AppError::ResourceNotFound("Quote"))
    }

    pub async fn submit(&self, id: Uuid) -> Result<Quote, AppError> {
        self.repo
            .submit(id)
            .await?
            .ok_or(AppError::ResourceNotFound("Quote"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::ResourceNotFound("Quote"));
        }
        Ok(())
    }
}
