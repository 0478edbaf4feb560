//! Actor kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three authenticatable identity kinds.
///
/// Declaration order is the credential probe order: platform super-admins
/// first, then tenant users, then department users. Emails are not
/// globally unique across kinds, so the ordering is a deliberate
/// tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "actor_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// Platform-level administrator, not bound to any tenant.
    SuperAdmin,
    /// A user belonging to a tenant organization.
    TenantUser,
    /// A user belonging to a department within a tenant.
    DepartmentUser,
}

impl ActorKind {
    /// Whether this kind carries platform-administrative privilege.
    pub fn is_administrative(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::TenantUser => "tenant_user",
            Self::DepartmentUser => "department_user",
        }
    }
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActorKind {
    type Err = idhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "super_admin" => Ok(Self::SuperAdmin),
            "tenant_user" => Ok(Self::TenantUser),
            "department_user" => Ok(Self::DepartmentUser),
            _ => Err(idhub_core::AppError::validation(format!(
                "Invalid actor kind: '{s}'. Expected one of: super_admin, tenant_user, department_user"
            ))),
        }
    }
}
