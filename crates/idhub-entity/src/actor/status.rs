//! Actor account status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account status for an actor.
///
/// Actors are never deleted; `Deactivated` is the terminal soft-delete
/// state, also reached automatically by the lockout policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "actor_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActorStatus {
    /// Account is active and can log in.
    Active,
    /// Account is temporarily suspended by an administrator.
    Suspended,
    /// Account is permanently deactivated (admin action or lockout).
    Deactivated,
}

impl ActorStatus {
    /// Check if the actor can log in with this status.
    pub fn can_login(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Deactivated => "deactivated",
        }
    }
}

impl fmt::Display for ActorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActorStatus {
    type Err = idhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            "deactivated" => Ok(Self::Deactivated),
            _ => Err(idhub_core::AppError::validation(format!(
                "Invalid actor status: '{s}'. Expected one of: active, suspended, deactivated"
            ))),
        }
    }
}
