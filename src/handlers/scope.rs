// src/handlers/scope.rs

// Access checks for routes that reach a tender only through a child entity.

use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        attachment::Attachment, auth::{Role, User}, lot::Lot, position::Position, quote::Quote,
    },
};

pub async fn lot_in_scope(
    app_state: &AppState,
    user: &User,
    lot_id: Uuid,
    required: Option<Role>,
) -> Result<Lot, AppError> {
    let lot = app_state.lot_service.get(lot_id).await?;
    app_state.access_control.check(user, lot.tender_id, required).await?;
    Ok(lot)
}

pub async fn position_in_scope(
    app_state: &AppState,
    user: &User,
    position_id: Uuid,
    required: Option<Role>,
) -> Result<Position, AppError> {
    let position = app_state.position_service.get(position_id).await?;
    lot_in_scope(app_state, user, position.lot_id, required).await?;
    Ok(position)
}

pub async fn quote_in_scope(
    app_state: &AppState,
    user: &User,
    quote_id: Uuid,
    required: Option<Role>,
) -> Result<Quote, AppError> {
    let quote = app_state.quote_service.get(quote_id).await?;
    app_state.access_control.check(user, quote.tender_id, required).await?;
    Ok(quote)
}

/// Tender owning an attachment target; tender id first, then lot, then quote.
pub async fn attachment_tender(
    app_state: &AppState,
    tender_id: Option<Uuid>,
    lot_id: Option<Uuid>,
    quote_id: Option<Uuid>,
) -> Result<Uuid, AppError> {
    if let Some(id) = tender_id {
        return Ok(id);
    }
    if let Some(id) = lot_id {
        return Ok(app_state.lot_service.get(id).await?.tender_id);
    }
    if let Some(id) = quote_id {
        return Ok(app_state.quote_service.get(id).await?.tender_id);
    }
    Err(AppError::BadRequest("tenderId, lotId, or quoteId required".into()))
}

pub async fn attachment_in_scope(
    app_state: &AppState,
    user: &User,
    attachment_id: Uuid,
    required: Option<Role>,
) -> Result<Attachment, AppError> {
    let attachment = app_state.attachment_service.get(attachment_id).await?;
    let tender_id = attachment_tender(
        app_state,
        attachment.tender_id,
        attachment.lot_id,
        attachment.quote_id,
    )
    .await?;
    app_state.access_control.check(user, tender_id, required).await?;
    Ok(attachment)
}
