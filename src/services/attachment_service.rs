// src/services/attachment_service.rs

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::AttachmentRepository,
    models::attachment::{Attachment, AttachmentTarget, StoredFile},
};

#[derive(Clone)]
pub struct AttachmentService {
    repo: AttachmentRepository,
    upload_dir: PathBuf,
    max_file_size: usize,
}

impl AttachmentService {
    pub fn new(repo: AttachmentRepository, upload_dir: PathBuf, max_file_size: usize) -> Self {
        Self { repo, upload_dir, max_file_size }
    }

    pub async fn list_by_tender(&self, tender_id: Uuid) -> Result<Vec<Attachment>, AppError> {
        self.repo.list_by_tender(tender_id).await
    }

    pub async fn list_by_lot(&self, lot_id: Uuid) -> Result<Vec<Attachment>, AppError> {
        self.repo.list_by_lot(lot_id).await
    }

    pub async fn list_by_quote(&self, quote_id: Uuid) -> Result<Vec<Attachment>, AppError> {
        self.repo.list_by_quote(quote_id).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Attachment, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::ResourceNotFound("Attachment"))
    }

    /// Writes the upload as `<uuid>.<ext>` and records it. The file is removed
    /// again if the row cannot be inserted.
    pub async fn upload(
        &self,
        target: AttachmentTarget,
        original_filename: &str,
        mime_type: Option<String>,
        bytes: &[u8],
        uploaded_by: Uuid,
    ) -> Result<Attachment, AppError> {
        if target.is_empty() {
            return Err(AppError::BadRequest("tenderId, lotId, or quoteId required".into()));
        }
        if bytes.len() > self.max_file_size {
            return Err(AppError::PayloadTooLarge(self.max_file_size));
        }

        tokio::fs::create_dir_all(&self.upload_dir).await?;
        let filename = stored_name(original_filename);
        let path = self.upload_dir.join(&filename);
        tokio::fs::write(&path, bytes).await?;

        let stored = StoredFile {
            filename,
            original_filename: original_filename.to_string(),
            mime_type,
            size: bytes.len() as i64,
            file_path: path.to_string_lossy().into_owned(),
        };

        match self.repo.create(target, &stored, uploaded_by).await {
            Ok(attachment) => Ok(attachment),
            Err(e) => {
                remove_quietly(&path).await;
                Err(e)
            }
        }
    }

    pub async fn read(&self, attachment: &Attachment) -> Result<Vec<u8>, AppError> {
        match tokio::fs::read(&attachment.file_path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::ResourceNotFound("Attachment file"))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, attachment: &Attachment) -> Result<(), AppError> {
        if !self.repo.delete(attachment.id).await? {
            return Err(AppError::ResourceNotFound("Attachment"));
        }
        remove_quietly(Path::new(&attachment.file_path)).await;
        Ok(())
    }
}

fn stored_name(original_filename: &str) -> String {
    let extension = Path::new(original_filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext.to_ascii_lowercase()),
        None => Uuid::new_v4().to_string(),
    }
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!("Could not remove stored file {}: {}", path.display(), e);
    }
}
