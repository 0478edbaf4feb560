//! Session persistence seam.

use async_trait::async_trait;
use uuid::Uuid;

use idhub_core::result::AppResult;

use super::model::{NewSession, Session};

/// Persistence operations for refresh sessions.
///
/// Every method that the session lifecycle treats as "one atomic unit" is
/// a single store call: implementations must make the revoke-then-insert
/// pairs transactional so a partially applied rotation or issue is never
/// observable.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug + 'static {
    /// Atomically revoke every active session for the actor and insert the
    /// new row, enforcing the single-session invariant.
    async fn issue(&self, data: NewSession) -> AppResult<Session>;

    /// Atomically revoke the old session, insert the replacement, and link
    /// old to new via `replaced_by`.
    ///
    /// Fails with a revoked-session error when the old row was revoked
    /// concurrently (the in-transaction re-check lost the race).
    async fn rotate(&self, old_id: Uuid, data: NewSession) -> AppResult<Session>;

    /// Find a session by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>>;

    /// Find a session by the hash of its raw secret.
    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<Session>>;

    /// Revoke a session. Idempotent: returns `true` if the row was newly
    /// revoked, `false` if it was already revoked.
    async fn revoke(&self, id: Uuid) -> AppResult<bool>;

    /// Revoke every active session for the actor, optionally keeping one.
    /// Returns the number of sessions revoked.
    async fn revoke_all_for_actor(&self, actor_id: Uuid, keep: Option<Uuid>) -> AppResult<u64>;

    /// Count sessions for the actor that are neither revoked nor expired.
    async fn count_active_for_actor(&self, actor_id: Uuid) -> AppResult<i64>;
}
