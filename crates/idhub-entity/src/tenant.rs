//! Tenant directory entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A tenant organization.
///
/// Only the attributes the MFA resolver and license engine consult are
/// modeled here; tenant CRUD lives outside this workspace.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    /// Unique tenant identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Global MFA switch; `false` short-circuits every lower-precedence
    /// MFA rule for this tenant.
    pub mfa_enabled: bool,
    /// When the tenant was created.
    pub created_at: DateTime<Utc>,
}
