//! Best-effort audit trail of denied and failed authorization attempts.
//!
//! Writes are dispatched as detached tasks. Their outcome is never awaited by
//! the guard and a failing sink only produces a warning on the fallback
//! channel (`tracing`).

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use lumina_core::UserId;

use crate::{FeatureFlag, Role};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEntry {
    AccessDenied {
        user_id: Option<UserId>,
        user_role: Option<String>,
        route: String,
        reason: String,
        at: DateTime<Utc>,
    },
    AuthFailure {
        user_id: Option<UserId>,
        route: String,
        reason: String,
        at: DateTime<Utc>,
    },
    FeatureDenied {
        user_id: Option<UserId>,
        user_role: Option<Role>,
        route: String,
        reason: String,
        feature: FeatureFlag,
        at: DateTime<Utc>,
    },
}

impl AuditEntry {
    pub fn route(&self) -> &str {
        match self {
            AuditEntry::AccessDenied { route, .. }
            | AuditEntry::AuthFailure { route, .. }
            | AuditEntry::FeatureDenied { route, .. } => route,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuditError {
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}

/// Append-only destination for audit entries.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: &AuditEntry) -> Result<(), AuditError>;
}

/// Structured `tracing` events under the `audit` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        match entry {
            AuditEntry::AccessDenied {
                user_id,
                user_role,
                route,
                reason,
                ..
            } => tracing::warn!(
                target: "audit",
                user_id = ?user_id,
                user_role = ?user_role,
                route = %route,
                reason = %reason,
                "access denied"
            ),
            AuditEntry::AuthFailure {
                user_id,
                route,
                reason,
                ..
            } => tracing::warn!(
                target: "audit",
                user_id = ?user_id,
                route = %route,
                reason = %reason,
                "authentication failure"
            ),
            AuditEntry::FeatureDenied {
                user_id,
                user_role,
                route,
                reason,
                feature,
                ..
            } => tracing::warn!(
                target: "audit",
                user_id = ?user_id,
                user_role = ?user_role,
                route = %route,
                feature = %feature,
                reason = %reason,
                "feature denied"
            ),
        }
        Ok(())
    }
}

/// Keeps entries in memory (tests, admin inspection).
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn record(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        self.entries
            .lock()
            .map_err(|_| AuditError::Unavailable("lock poisoned".to_string()))?
            .push(entry.clone());
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuditSink;

#[async_trait]
impl AuditSink for NoopAuditSink {
    async fn record(&self, _entry: &AuditEntry) -> Result<(), AuditError> {
        Ok(())
    }
}

/// Fire-and-forget front for an [`AuditSink`].
#[derive(Clone)]
pub struct AuditDispatcher {
    sink: Arc<dyn AuditSink>,
}

impl AuditDispatcher {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    pub fn tracing() -> Self {
        Self::new(Arc::new(TracingAuditSink))
    }

    pub fn log_access_denied(
        &self,
        user_id: Option<UserId>,
        user_role: Option<&str>,
        route: &str,
        reason: impl Into<String>,
    ) {
        self.dispatch(AuditEntry::AccessDenied {
            user_id,
            user_role: user_role.map(str::to_string),
            route: route.to_string(),
            reason: reason.into(),
            at: Utc::now(),
        });
    }

    pub fn log_auth_failure(&self, user_id: Option<UserId>, route: &str, reason: impl Into<String>) {
        self.dispatch(AuditEntry::AuthFailure {
            user_id,
            route: route.to_string(),
            reason: reason.into(),
            at: Utc::now(),
        });
    }

    pub fn log_feature_denied(
        &self,
        user_id: Option<UserId>,
        user_role: Option<Role>,
        route: &str,
        feature: FeatureFlag,
        reason: impl Into<String>,
    ) {
        self.dispatch(AuditEntry::FeatureDenied {
            user_id,
            user_role,
            route: route.to_string(),
            reason: reason.into(),
            feature,
            at: Utc::now(),
        });
    }

    /// Spawn the write and return immediately.
    pub fn dispatch(&self, entry: AuditEntry) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(
                entry = ?entry,
                "no async runtime for audit sink; entry only logged locally"
            );
            return;
        };

        let sink = Arc::clone(&self.sink);
        // Detached; never awaited.
        drop(handle.spawn(async move {
            if let Err(e) = sink.record(&entry).await {
                tracing::warn!(
                    error = %e,
                    entry = ?entry,
                    "audit write failed; entry only logged locally"
                );
            }
        }));
    }
}

impl core::fmt::Debug for AuditDispatcher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuditDispatcher").finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Sink that always fails, simulating an unreachable audit backend.
    #[derive(Debug, Default)]
    pub struct FailingAuditSink;

    #[async_trait]
    impl AuditSink for FailingAuditSink {
        async fn record(&self, _entry: &AuditEntry) -> Result<(), AuditError> {
            Err(AuditError::Unavailable("network down".to_string()))
        }
    }

    /// Poll the sink briefly; writes land asynchronously.
    pub async fn entries_eventually(sink: &InMemoryAuditSink, expected: usize) -> Vec<AuditEntry> {
        for _ in 0..50 {
            let entries = sink.entries();
            if entries.len() >= expected {
                return entries;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        sink.entries()
    }
}
