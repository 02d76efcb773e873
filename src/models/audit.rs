// src/models/audit.rs

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Submit,
    AssignRole,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
            AuditAction::Submit => "SUBMIT",
            AuditAction::AssignRole => "ASSIGN_ROLE",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row for `audit_logs`.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub entity_type: &'static str,
    pub entity_id: String,
    pub action: AuditAction,
    pub user_id: Option<Uuid>,
    pub changes: Option<Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl AuditEntry {
    pub fn new(entity_type: &'static str, entity_id: impl ToString, action: AuditAction) -> Self {
        Self {
            entity_type,
            entity_id: entity_id.to_string(),
            action,
            user_id: None,
            changes: None,
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn by(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_changes(mut self, changes: Value) -> Self {
        self.changes = Some(changes);
        self
    }

    /// Records the serialized entity as the change set.
    pub fn with_snapshot<T: Serialize>(mut self, entity: &T) -> Self {
        self.changes = serde_json::to_value(entity).ok();
        self
    }
}
