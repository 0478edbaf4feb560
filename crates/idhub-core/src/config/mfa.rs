//! Multi-factor challenge configuration.

use serde::{Deserialize, Serialize};

/// Settings for the out-of-band OTP challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MfaConfig {
    /// Number of digits in a generated challenge code.
    #[serde(default = "default_otp_length")]
    pub otp_length: u32,
    /// Seconds a challenge code stays valid.
    #[serde(default = "default_otp_ttl")]
    pub otp_ttl_seconds: u64,
}

impl Default for MfaConfig {
    fn default() -> Self {
        Self {
            otp_length: default_otp_length(),
            otp_ttl_seconds: default_otp_ttl(),
        }
    }
}

fn default_otp_length() -> u32 {
    6
}

fn default_otp_ttl() -> u64 {
    300
}
