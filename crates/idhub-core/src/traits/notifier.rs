//! Outbound notification seam.

use async_trait::async_trait;

use crate::result::AppResult;

/// Fire-and-forget delivery of challenge codes and informational messages.
///
/// Implementations live outside this workspace (SMTP relay, SMS gateway).
/// Callers log failures and never propagate them as request failures.
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug + 'static {
    /// Send a message to a recipient address.
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> AppResult<()>;
}

/// A notifier that only writes to the log. Useful for development and tests.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, recipient: &str, subject: &str, _body: &str) -> AppResult<()> {
        tracing::info!(recipient, subject, "Notification dispatched (log only)");
        Ok(())
    }
}
