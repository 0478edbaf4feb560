//! Fire-and-forget audit dispatch.
//!
//! Audit events ride a bounded channel consumed by a spawned worker, so
//! a slow or failing sink never blocks a state-machine transaction.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use idhub_entity::audit::{AuditEvent, AuditSink};

/// Cloneable sender half handed to services.
#[derive(Debug, Clone)]
pub struct AuditHandle {
    tx: mpsc::Sender<AuditEvent>,
}

impl AuditHandle {
    /// Enqueue an event without blocking. A full or closed queue drops
    /// the event with a warning; audit must never fail the caller.
    pub fn dispatch(&self, event: AuditEvent) {
        if let Err(e) = self.tx.try_send(event) {
            warn!(error = %e, "Audit event dropped");
        }
    }
}

/// Owns the audit worker task.
#[derive(Debug)]
pub struct AuditDispatcher {
    handle: AuditHandle,
    worker: JoinHandle<()>,
}

impl AuditDispatcher {
    /// Spawn the worker draining events into the sink.
    pub fn spawn(sink: Arc<dyn AuditSink>, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<AuditEvent>(capacity);

        let worker = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Err(e) = sink.append(event).await {
                    warn!(error = %e, "Failed to append audit event");
                }
            }
        });

        Self {
            handle: AuditHandle { tx },
            worker,
        }
    }

    /// A cloneable handle for services to dispatch through.
    pub fn handle(&self) -> AuditHandle {
        self.handle.clone()
    }

    /// Drain and stop the worker. The worker exits once every handle
    /// clone has been dropped; callers must release theirs first.
    pub async fn shutdown(self) {
        drop(self.handle);
        let _ = self.worker.await;
    }
}
