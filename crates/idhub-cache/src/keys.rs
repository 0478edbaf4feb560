//! Cache key builders for all idhub cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

use uuid::Uuid;

/// Prefix applied to all idhub cache keys.
const PREFIX: &str = "idhub";

// ── Session keys ───────────────────────────────────────────

/// Cache key for the session-validity mirror of one session.
pub fn session_by_id(session_id: Uuid) -> String {
    format!("{PREFIX}:session:{session_id}")
}

/// Cache key for the pointer to an actor's single active session.
pub fn actor_session(actor_id: Uuid) -> String {
    format!("{PREFIX}:session:actor:{actor_id}")
}

// ── MFA keys ───────────────────────────────────────────────

/// Cache key for an actor's outstanding MFA challenge.
pub fn mfa_challenge(actor_id: Uuid) -> String {
    format!("{PREFIX}:mfa:challenge:{actor_id}")
}
