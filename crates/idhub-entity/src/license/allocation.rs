//! License allocation entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The kind of countable resource a tenant holds seats for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "resource_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// License seats.
    License,
    /// Communication channels.
    Channel,
    /// User accounts.
    User,
}

impl ResourceType {
    /// Return the resource type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::License => "license",
            Self::Channel => "channel",
            Self::User => "user",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = idhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "license" => Ok(Self::License),
            "channel" => Ok(Self::Channel),
            "user" => Ok(Self::User),
            _ => Err(idhub_core::AppError::validation(format!(
                "Invalid resource type: '{s}'. Expected one of: license, channel, user"
            ))),
        }
    }
}

/// Seat ceiling and usage for one (tenant, resource) pair.
///
/// `used_count <= allocated_count` holds at all times; a change that would
/// break it is rejected, never clamped.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LicenseAllocation {
    /// Unique allocation identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// The resource this allocation counts.
    pub resource_type: ResourceType,
    /// Seat ceiling.
    pub allocated_count: i32,
    /// Seats currently consumed.
    pub used_count: i32,
    /// When the allocation was created.
    pub created_at: DateTime<Utc>,
    /// When the allocation was last updated.
    pub updated_at: DateTime<Utc>,
}

impl LicenseAllocation {
    /// Seats still available under the ceiling.
    pub fn available(&self) -> i32 {
        (self.allocated_count - self.used_count).max(0)
    }

    /// Whether at least one more seat can be consumed.
    pub fn has_capacity(&self) -> bool {
        self.used_count < self.allocated_count
    }
}
