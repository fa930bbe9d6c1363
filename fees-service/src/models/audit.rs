//! Audit log model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    FeeCollected,
    FeeWaived,
    FeeStructureCreated,
    FeeStructureUpdated,
    FeeStructureArchived,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::FeeCollected => "fee_collected",
            AuditAction::FeeWaived => "fee_waived",
            AuditAction::FeeStructureCreated => "fee_structure_created",
            AuditAction::FeeStructureUpdated => "fee_structure_updated",
            AuditAction::FeeStructureArchived => "fee_structure_archived",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AuditEntry {
    pub entry_id: Uuid,
    pub school_id: Uuid,
    pub actor_id: Uuid,
    pub actor_role: String,
    pub action: String,
    pub student_id: Option<Uuid>,
    pub receipt_number: Option<String>,
    pub amount: Option<Decimal>,
    pub details: Option<serde_json::Value>,
    pub created_utc: DateTime<Utc>,
}

/// Input for appending an audit entry.
#[derive(Debug, Clone)]
pub struct RecordAudit {
    pub school_id: Uuid,
    pub actor_id: Uuid,
    pub actor_role: String,
    pub action: AuditAction,
    pub student_id: Option<Uuid>,
    pub receipt_number: Option<String>,
    pub amount: Option<Decimal>,
    pub details: Option<serde_json::Value>,
}
