//! Actor entity models, one table per kind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::ActorStatus;

/// Common capability shared by every actor kind.
///
/// The auth resolver works against this surface so it never needs to know
/// which concrete table a credential came from.
pub trait Credential {
    /// Unique actor identifier.
    fn id(&self) -> Uuid;
    /// Login email (matched case-insensitively).
    fn email(&self) -> &str;
    /// Argon2 password hash.
    fn password_hash(&self) -> &str;
    /// Current account status.
    fn status(&self) -> ActorStatus;
    /// Consecutive failed login attempts.
    fn failed_login_attempts(&self) -> i32;
}

/// A platform-level administrator. Not bound to any tenant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SuperAdmin {
    /// Unique identifier.
    pub id: Uuid,
    /// Login email.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Display username.
    pub username: Option<String>,
    /// Platform role reference.
    pub role_id: Option<Uuid>,
    /// Account status.
    pub status: ActorStatus,
    /// Consecutive failed login attempts.
    pub failed_login_attempts: i32,
    /// When the lockout policy deactivated the account.
    pub locked_at: Option<DateTime<Utc>>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A user belonging to a tenant organization.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TenantUser {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Login email.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Human-readable display name.
    pub display_name: Option<String>,
    /// Tenant role reference.
    pub role_id: Option<Uuid>,
    /// Account status.
    pub status: ActorStatus,
    /// Consecutive failed login attempts.
    pub failed_login_attempts: i32,
    /// When the lockout policy deactivated the account.
    pub locked_at: Option<DateTime<Utc>>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A user belonging to a department within a tenant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DepartmentUser {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning department.
    pub department_id: Uuid,
    /// Login email.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Full name.
    pub full_name: Option<String>,
    /// Account status.
    pub status: ActorStatus,
    /// Consecutive failed login attempts.
    pub failed_login_attempts: i32,
    /// When the lockout policy deactivated the account.
    pub locked_at: Option<DateTime<Utc>>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Role assignment for a department user.
///
/// Department users carry a many-to-many role set; the row flagged
/// `primary_role` resolves the subject's role id at login.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DepartmentRoleMapping {
    /// Unique identifier.
    pub id: Uuid,
    /// The department user this mapping belongs to.
    pub department_user_id: Uuid,
    /// Assigned role.
    pub role_id: Uuid,
    /// Whether this is the user's primary role.
    pub primary_role: bool,
    /// When the mapping was created.
    pub created_at: DateTime<Utc>,
}

impl Credential for SuperAdmin {
    fn id(&self) -> Uuid {
        self.id
    }
    fn email(&self) -> &str {
        &self.email
    }
    fn password_hash(&self) -> &str {
        &self.password_hash
    }
    fn status(&self) -> ActorStatus {
        self.status
    }
    fn failed_login_attempts(&self) -> i32 {
        self.failed_login_attempts
    }
}

impl Credential for TenantUser {
    fn id(&self) -> Uuid {
        self.id
    }
    fn email(&self) -> &str {
        &self.email
    }
    fn password_hash(&self) -> &str {
        &self.password_hash
    }
    fn status(&self) -> ActorStatus {
        self.status
    }
    fn failed_login_attempts(&self) -> i32 {
        self.failed_login_attempts
    }
}

impl Credential for DepartmentUser {
    fn id(&self) -> Uuid {
        self.id
    }
    fn email(&self) -> &str {
        &self.email
    }
    fn password_hash(&self) -> &str {
        &self.password_hash
    }
    fn status(&self) -> ActorStatus {
        self.status
    }
    fn failed_login_attempts(&self) -> i32 {
        self.failed_login_attempts
    }
}
