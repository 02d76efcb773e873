// src/services/audit_service.rs

use crate::{db::AuditRepository, models::audit::AuditEntry};

#[derive(Clone)]
pub struct AuditService {
    repo: AuditRepository,
}

impl AuditService {
    pub fn new(repo: AuditRepository) -> Self {
        Self { repo }
    }

    /// Fire-and-forget: the write runs on its own task and a failure is only logged.
    pub fn record(&self, entry: AuditEntry) {
        let repo = self.repo.clone();
        tokio::spawn(async move {
            if let Err(e) = repo.insert(&entry).await {
                tracing::warn!(
                    "Failed to write audit log for {} {} ({}): {}",
                    entry.entity_type,
                    entry.entity_id,
                    entry.action,
                    e
                );
            }
        });
    }
}
