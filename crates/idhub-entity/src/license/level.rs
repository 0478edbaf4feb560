//! Tenant-configured approval chain entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One step of a tenant's configured approval chain.
///
/// Tenants with no configured levels fall back to a single `ceo` stage.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApprovalLevel {
    /// Unique level identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Position in the chain (1 = first approver).
    pub step_order: i32,
    /// Department responsible for this step.
    pub department_name: String,
    /// Stage label override; falls back to the department name.
    pub stage: Option<String>,
    /// When the level was created.
    pub created_at: DateTime<Utc>,
}

impl ApprovalLevel {
    /// The stage label approvals are created with.
    pub fn stage_label(&self) -> &str {
        self.stage.as_deref().unwrap_or(&self.department_name)
    }
}
