use crate::prelude::{ScanError, ScanResult};
use crate::signal::SignalRecord;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Pluggable, possibly slow, possibly unavailable source of signals.
///
/// Implementations must honour `ctx`: once it is cancelled or its deadline
/// passes, `scan` should return whatever it has (or an error) instead of
/// waiting on the underlying scan. A scanner that ignores this can keep a
/// background task alive past the scan window.
#[async_trait]
pub trait Scanner: Send + Sync {
    async fn scan(&self, ctx: &ScanContext) -> ScanResult<Vec<SignalRecord>>;

    /// Stable identifier for diagnostics.
    fn name(&self) -> &str;

    /// Cheap capability check. Evaluated once, at registration.
    fn is_available(&self) -> bool;
}

/// Cancellation token plus optional deadline handed to every scan.
#[derive(Debug, Clone, Default)]
pub struct ScanContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl ScanContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Child context that expires after `timeout` (or at the parent's
    /// deadline, whichever comes first) and is cancelled with its parent.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        // An unrepresentable deadline means the parent's, or none at all.
        let candidate = Instant::now().checked_add(timeout);
        let deadline = match (self.deadline, candidate) {
            (Some(parent), Some(candidate)) => Some(parent.min(candidate)),
            (parent, None) => parent,
            (None, candidate) => candidate,
        };
        Self {
            token: self.token.child_token(),
            deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Completes once the context is cancelled or its deadline passes.
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }

    /// Runs `work` until it finishes or the context ends, whichever is first.
    pub async fn guard<T, F>(&self, scanner: &str, work: F) -> ScanResult<T>
    where
        F: Future<Output = ScanResult<T>>,
    {
        tokio::select! {
            biased;
            result = work => result,
            _ = self.done() => Err(ScanError::ScanTimeout {
                scanner: scanner.to_string(),
            }),
        }
    }
}
