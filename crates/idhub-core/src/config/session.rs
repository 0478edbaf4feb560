//! Session lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Refresh-session lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Refresh credential TTL in days.
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_ttl_days: i64,
    /// Bytes of randomness in each raw refresh secret.
    #[serde(default = "default_secret_bytes")]
    pub refresh_secret_bytes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_ttl_days: default_refresh_ttl_days(),
            refresh_secret_bytes: default_secret_bytes(),
        }
    }
}

fn default_refresh_ttl_days() -> i64 {
    30
}

fn default_secret_bytes() -> usize {
    48
}
