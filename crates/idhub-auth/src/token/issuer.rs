//! Access token issuing with configurable signing and TTL.

use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use idhub_core::config::auth::AuthConfig;
use idhub_core::error::AppError;
use idhub_core::result::AppResult;

use crate::resolver::AuthSubject;

use super::claims::Claims;

/// A signed, time-boxed bearer credential.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IssuedAccessToken {
    /// The raw JWT string.
    pub token: String,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}

/// Produces signed access tokens for authenticated subjects.
///
/// Downstream request-authorization middleware consumes the tokens; the
/// only contract this workspace relies on is that the session id is
/// embedded so per-request session validation stays possible.
pub trait AccessTokenIssuer: Send + Sync + std::fmt::Debug + 'static {
    /// Issue a token for the subject bound to the given session.
    fn issue(&self, subject: &AuthSubject, session_id: Uuid) -> AppResult<IssuedAccessToken>;
}

/// HMAC-SHA256 JWT issuer.
#[derive(Clone)]
pub struct JwtIssuer {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Key for decoding (verification).
    decoding_key: DecodingKey,
    /// Access token TTL in minutes.
    access_ttl_minutes: i64,
}

impl std::fmt::Debug for JwtIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIssuer")
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .finish()
    }
}

impl JwtIssuer {
    /// Creates a new issuer from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl_minutes: config.jwt_access_ttl_minutes as i64,
        }
    }

    /// Decode and verify a token this issuer signed.
    pub fn decode(&self, token: &str) -> AppResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| AppError::invalid_session(format!("Invalid access token: {e}")))?;
        Ok(data.claims)
    }
}

impl AccessTokenIssuer for JwtIssuer {
    fn issue(&self, subject: &AuthSubject, session_id: Uuid) -> AppResult<IssuedAccessToken> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::minutes(self.access_ttl_minutes);

        let claims = Claims {
            sub: subject.actor_id,
            sid: session_id,
            kind: subject.kind,
            tenant_id: subject.tenant_id,
            email: subject.email.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        Ok(IssuedAccessToken { token, expires_at })
    }
}
