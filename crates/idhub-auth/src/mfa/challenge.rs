//! Out-of-band OTP challenge issue and verification.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;
use uuid::Uuid;

use idhub_cache::{CacheManager, keys};
use idhub_core::config::mfa::MfaConfig;
use idhub_core::error::AppError;
use idhub_core::result::AppResult;
use idhub_core::traits::cache::CacheProvider;
use idhub_core::traits::notifier::Notifier;

/// Stored challenge state. Only the code's hash is kept; the expiry is
/// embedded so providers with coarse TTLs still enforce it exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChallengeRecord {
    code_hash: String,
    expires_at: DateTime<Utc>,
}

/// Issues and verifies numeric OTP challenges.
///
/// Codes live in the cache under a per-actor key and are consumed on
/// first successful verification. Delivery goes through the notifier
/// fire-and-forget: a failed send is logged, never surfaced.
#[derive(Debug, Clone)]
pub struct MfaChallenger {
    cache: Option<CacheManager>,
    notifier: Arc<dyn Notifier>,
    config: MfaConfig,
}

impl MfaChallenger {
    /// Creates a challenger. Without a cache, challenges are unsupported
    /// and `issue` fails with a configuration error.
    pub fn new(cache: Option<CacheManager>, notifier: Arc<dyn Notifier>, config: MfaConfig) -> Self {
        Self {
            cache,
            notifier,
            config,
        }
    }

    /// Generate a challenge code for the actor, store its hash, and
    /// dispatch it to the given address.
    pub async fn issue(&self, actor_id: Uuid, recipient: &str) -> AppResult<()> {
        let Some(cache) = &self.cache else {
            return Err(AppError::configuration(
                "MFA challenges require a cache provider",
            ));
        };

        let code = generate_code(self.config.otp_length);
        let record = ChallengeRecord {
            code_hash: sha256_b64(&code),
            expires_at: Utc::now() + chrono::Duration::seconds(self.config.otp_ttl_seconds as i64),
        };

        cache
            .set_json(
                &keys::mfa_challenge(actor_id),
                &record,
                Duration::from_secs(self.config.otp_ttl_seconds),
            )
            .await?;

        if let Err(e) = self
            .notifier
            .send(recipient, "Your verification code", &code)
            .await
        {
            warn!(actor_id = %actor_id, error = %e, "Failed to deliver MFA challenge");
        }

        Ok(())
    }

    /// Check a submitted code against the outstanding challenge.
    ///
    /// A matching code consumes the challenge; expired, missing, or
    /// mismatched codes return `false`.
    pub async fn verify(&self, actor_id: Uuid, code: &str) -> AppResult<bool> {
        let Some(cache) = &self.cache else {
            return Err(AppError::configuration(
                "MFA challenges require a cache provider",
            ));
        };

        let key = keys::mfa_challenge(actor_id);
        let Some(record) = cache.get_json::<ChallengeRecord>(&key).await? else {
            return Ok(false);
        };

        if record.expires_at <= Utc::now() {
            cache.delete(&key).await?;
            return Ok(false);
        }

        if record.code_hash != sha256_b64(code) {
            return Ok(false);
        }

        cache.delete(&key).await?;
        Ok(true)
    }
}

/// Generate a zero-padded numeric code of the configured length.
fn generate_code(length: u32) -> String {
    let max = 10u32.pow(length);
    let n = rand::rng().random_range(0..max);
    format!("{n:0width$}", width = length as usize)
}

fn sha256_b64(input: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(input.as_bytes()))
}
