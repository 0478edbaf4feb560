//! Fast-path session mirror over an optional cache provider.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use idhub_cache::{CacheManager, keys};
use idhub_core::traits::cache::CacheProvider;
use idhub_entity::session::Session;

/// Cached view of one session, keyed by session id.
///
/// The expiry is embedded so providers with coarse TTLs still answer
/// correctly; the mirror is never authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMirror {
    /// Hash of the session's current raw secret.
    pub token_hash: String,
    /// Owning actor.
    pub actor_id: Uuid,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
}

/// Capability-gated session mirror.
///
/// Every operation treats cache absence and cache errors identically to
/// a miss: reads return `None`, writes log a warning and continue. The
/// database remains the source of truth at every call site.
#[derive(Debug, Clone)]
pub struct SessionCache {
    inner: Option<CacheManager>,
    ttl: Duration,
}

impl SessionCache {
    /// Creates a session cache over an optional provider.
    pub fn new(inner: Option<CacheManager>, ttl: Duration) -> Self {
        Self { inner, ttl }
    }

    /// A cache that is always a miss.
    pub fn disabled() -> Self {
        Self {
            inner: None,
            ttl: Duration::ZERO,
        }
    }

    /// Whether a fast path is configured at all.
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Read the mirror for a session. Errors degrade to a miss.
    pub async fn lookup(&self, session_id: Uuid) -> Option<SessionMirror> {
        let cache = self.inner.as_ref()?;
        match cache
            .get_json::<SessionMirror>(&keys::session_by_id(session_id))
            .await
        {
            Ok(mirror) => mirror,
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Session cache read failed; treating as miss");
                None
            }
        }
    }

    /// Mirror a freshly issued session, displacing the actor's previous
    /// entry (single-session policy keeps one live entry per actor).
    pub async fn record(&self, session: &Session) {
        let Some(cache) = &self.inner else { return };

        let pointer_key = keys::actor_session(session.actor_id);
        if let Ok(Some(previous)) = cache.get(&pointer_key).await {
            if let Ok(previous_id) = previous.parse::<Uuid>() {
                if previous_id != session.id {
                    let _ = cache.delete(&keys::session_by_id(previous_id)).await;
                }
            }
        }

        let mirror = SessionMirror {
            token_hash: session.token_hash.clone(),
            actor_id: session.actor_id,
            expires_at: session.expires_at,
        };

        if let Err(e) = cache
            .set_json(&keys::session_by_id(session.id), &mirror, self.ttl)
            .await
        {
            warn!(session_id = %session.id, error = %e, "Session cache write failed; continuing with DB only");
            return;
        }
        if let Err(e) = cache
            .set(&pointer_key, &session.id.to_string(), self.ttl)
            .await
        {
            warn!(actor_id = %session.actor_id, error = %e, "Session pointer write failed");
        }
    }

    /// Replace the mirror of a rotated session.
    pub async fn swap(&self, old_id: Uuid, session: &Session) {
        let Some(cache) = &self.inner else { return };
        let _ = cache.delete(&keys::session_by_id(old_id)).await;
        self.record(session).await;
    }

    /// Drop the mirror of one session.
    pub async fn purge(&self, session_id: Uuid, actor_id: Uuid) {
        let Some(cache) = &self.inner else { return };
        let _ = cache.delete(&keys::session_by_id(session_id)).await;

        let pointer_key = keys::actor_session(actor_id);
        if let Ok(Some(pointer)) = cache.get(&pointer_key).await {
            if pointer.parse::<Uuid>().ok() == Some(session_id) {
                let _ = cache.delete(&pointer_key).await;
            }
        }
    }

    /// Drop every mirror for an actor, optionally keeping one session.
    pub async fn purge_actor(&self, actor_id: Uuid, keep: Option<Uuid>) {
        let Some(cache) = &self.inner else { return };

        let pointer_key = keys::actor_session(actor_id);
        if let Ok(Some(pointer)) = cache.get(&pointer_key).await {
            if let Ok(pointed_id) = pointer.parse::<Uuid>() {
                if keep != Some(pointed_id) {
                    let _ = cache.delete(&keys::session_by_id(pointed_id)).await;
                    let _ = cache.delete(&pointer_key).await;
                }
            }
        }
    }
}
