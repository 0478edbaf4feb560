//! MFA policy entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Second-factor delivery method. Only `Email` is exercised today; the
/// enum is kept for forward compatibility with the stored rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "mfa_method", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MfaMethod {
    /// Code delivered by email.
    Email,
    /// Time-based one-time password.
    Totp,
    /// Code delivered by SMS.
    Sms,
}

/// User-level MFA override.
///
/// Presence of a row beats the role-level policy; its boolean decides.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MfaOverride {
    /// Unique identifier.
    pub id: Uuid,
    /// The user this override applies to.
    pub user_id: Uuid,
    /// Delivery method the override configures.
    pub method: MfaMethod,
    /// Whether MFA is required for this user.
    pub enabled: bool,
    /// When the override was created.
    pub created_at: DateTime<Utc>,
    /// When the override was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Role-level MFA policy for a (tenant, role) pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoleMfaPolicy {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// The role this policy applies to.
    pub role_id: Uuid,
    /// Whether MFA is required for the role.
    pub mfa_required: bool,
    /// When the policy was created.
    pub created_at: DateTime<Utc>,
    /// When the policy was last updated.
    pub updated_at: DateTime<Utc>,
}
