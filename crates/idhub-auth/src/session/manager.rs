//! Session lifecycle manager — issue, rotate, revoke, validate.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use idhub_core::config::session::SessionConfig;
use idhub_core::error::AppError;
use idhub_core::result::AppResult;
use idhub_entity::actor::ActorKind;
use idhub_entity::session::{NewSession, Session, SessionStore};

use super::cache::SessionCache;

/// Manages the refresh-session lifecycle.
///
/// Sessions obey a single-session policy: issuing a new one revokes all
/// prior sessions for the actor inside the same store transaction, so at
/// most one row per actor is ever active. The optional cache is a
/// latency fast path only; every decision falls back to the store.
#[derive(Debug, Clone)]
pub struct SessionManager {
    /// Authoritative persistence.
    store: Arc<dyn SessionStore>,
    /// Optional fast-path mirror.
    cache: SessionCache,
    /// Refresh TTL in days.
    refresh_ttl_days: i64,
    /// Bytes of randomness per raw secret.
    secret_bytes: usize,
}

impl SessionManager {
    /// Creates a session manager.
    pub fn new(store: Arc<dyn SessionStore>, cache: SessionCache, config: &SessionConfig) -> Self {
        Self {
            store,
            cache,
            refresh_ttl_days: config.refresh_ttl_days,
            secret_bytes: config.refresh_secret_bytes,
        }
    }

    /// Issue a fresh session for an authenticated actor.
    ///
    /// Returns the raw secret — the only moment it exists server-side —
    /// and the stored row. All prior sessions for the actor are revoked
    /// in the same atomic unit as the insert.
    pub async fn issue(
        &self,
        actor_id: Uuid,
        actor_kind: ActorKind,
        tenant_id: Option<Uuid>,
        email: &str,
    ) -> AppResult<(String, Session)> {
        let (raw, token_hash) = self.generate_secret();
        let expires_at = Utc::now() + chrono::Duration::days(self.refresh_ttl_days);

        let session = self
            .store
            .issue(NewSession {
                actor_id,
                actor_kind,
                tenant_id,
                email: email.to_string(),
                token_hash,
                expires_at,
            })
            .await?;

        self.cache.record(&session).await;

        info!(actor_id = %actor_id, session_id = %session.id, "Session issued");
        Ok((raw, session))
    }

    /// Rotate a refresh secret, revoking the old session and linking it
    /// to its replacement.
    pub async fn rotate(&self, raw_secret: &str) -> AppResult<(String, Session)> {
        let presented_hash = sha256_b64(raw_secret);

        let session = self
            .store
            .find_by_token_hash(&presented_hash)
            .await?
            .ok_or_else(|| AppError::invalid_session("Invalid refresh token"))?;

        if session.revoked {
            return Err(AppError::revoked_session("Refresh token has been revoked"));
        }
        if session.is_expired() {
            return Err(AppError::expired_session("Refresh token has expired"));
        }

        // Fast-path reuse detection: a mirror whose recorded hash differs
        // from the presented one means a stale secret is being replayed
        // for a live session id. That is a stolen-token signal, not a
        // cache hiccup: revoke everything and fail loudly.
        if let Some(mirror) = self.cache.lookup(session.id).await {
            if mirror.token_hash != presented_hash {
                warn!(
                    actor_id = %session.actor_id,
                    session_id = %session.id,
                    "Refresh token reuse detected; revoking all sessions for actor"
                );
                self.store
                    .revoke_all_for_actor(session.actor_id, None)
                    .await?;
                self.cache.purge_actor(session.actor_id, None).await;
                return Err(AppError::token_reuse(
                    "Refresh token reuse detected; all sessions have been revoked",
                ));
            }
        }

        let (new_raw, new_hash) = self.generate_secret();
        let expires_at = Utc::now() + chrono::Duration::days(self.refresh_ttl_days);

        let new_session = self
            .store
            .rotate(
                session.id,
                NewSession {
                    actor_id: session.actor_id,
                    actor_kind: session.actor_kind,
                    tenant_id: session.tenant_id,
                    email: session.email.clone(),
                    token_hash: new_hash,
                    expires_at,
                },
            )
            .await?;

        self.cache.swap(session.id, &new_session).await;

        info!(
            actor_id = %session.actor_id,
            old_session_id = %session.id,
            new_session_id = %new_session.id,
            "Session rotated"
        );
        Ok((new_raw, new_session))
    }

    /// Check whether a session id names a live session.
    ///
    /// The cache answers first when enabled; a miss, an error, or a stale
    /// mirror falls through to the authoritative store.
    pub async fn validate(&self, session_id: Uuid) -> AppResult<bool> {
        if let Some(mirror) = self.cache.lookup(session_id).await {
            if mirror.expires_at > Utc::now() {
                return Ok(true);
            }
        }

        match self.store.find_by_id(session_id).await? {
            Some(session) => Ok(session.is_active()),
            None => Ok(false),
        }
    }

    /// Revoke one session on behalf of a caller.
    ///
    /// Allowed for the owning actor and for administrative kinds.
    /// Revoking an already-revoked session is a no-op success.
    pub async fn revoke(
        &self,
        session_id: Uuid,
        requested_by: Uuid,
        requester_kind: ActorKind,
    ) -> AppResult<()> {
        let session = self
            .store
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| AppError::not_found("Session not found"))?;

        if session.actor_id != requested_by && !requester_kind.is_administrative() {
            return Err(AppError::forbidden("Not allowed to revoke this session"));
        }

        self.store.revoke(session_id).await?;
        self.cache.purge(session_id, session.actor_id).await;

        info!(session_id = %session_id, requested_by = %requested_by, "Session revoked");
        Ok(())
    }

    /// Revoke every active session for an actor, optionally keeping one.
    pub async fn revoke_all(&self, actor_id: Uuid, keep: Option<Uuid>) -> AppResult<u64> {
        let revoked = self.store.revoke_all_for_actor(actor_id, keep).await?;
        self.cache.purge_actor(actor_id, keep).await;

        info!(actor_id = %actor_id, revoked, "Actor sessions revoked");
        Ok(revoked)
    }

    /// Revoke the session matching a raw secret (logout). Unknown or
    /// already-revoked secrets succeed silently.
    pub async fn revoke_by_secret(&self, raw_secret: &str) -> AppResult<()> {
        let hash = sha256_b64(raw_secret);
        let Some(session) = self.store.find_by_token_hash(&hash).await? else {
            return Ok(());
        };

        if !session.revoked {
            self.store.revoke(session.id).await?;
        }
        self.cache.purge(session.id, session.actor_id).await;
        Ok(())
    }

    /// Generate a raw secret and its storage hash.
    fn generate_secret(&self) -> (String, String) {
        let mut bytes = vec![0u8; self.secret_bytes];
        rand::rng().fill_bytes(&mut bytes);
        let raw = URL_SAFE_NO_PAD.encode(&bytes);
        let hash = sha256_b64(&raw);
        (raw, hash)
    }
}

fn sha256_b64(input: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(input.as_bytes()))
}
