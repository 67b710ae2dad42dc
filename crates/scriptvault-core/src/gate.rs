//! Process-wide request gate.
//!
//! Every inbound call, reads included, runs under one mutex so the
//! load-modify-save cycles of the snapshot log never interleave.

use crate::error::{VaultError, VaultResult};
use std::future::Future;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// How long a request waits for the gate by default.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(350_000);

/// A named mutex with a bounded-wait acquire.
///
/// Tokio's mutex is fair, so waiting requests are admitted in arrival order.
/// The guard releases the gate on drop, which covers early returns, errors
/// and panics alike.
#[derive(Debug)]
pub struct RequestGate {
    lock: Mutex<()>,
    wait: Duration,
}

impl RequestGate {
    pub fn new(wait: Duration) -> Self {
        Self {
            lock: Mutex::new(()),
            wait,
        }
    }

    /// The bounded wait applied by [`acquire`](Self::acquire).
    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Acquire the gate, failing with [`VaultError::LockTimeout`] once the
    /// wait bound passes.
    pub async fn acquire(&self) -> VaultResult<MutexGuard<'_, ()>> {
        match tokio::time::timeout(self.wait, self.lock.lock()).await {
            Ok(guard) => {
                debug!("Request gate acquired");
                Ok(guard)
            }
            Err(_) => {
                warn!(wait_ms = self.wait.as_millis() as u64, "Request gate timed out");
                Err(VaultError::LockTimeout)
            }
        }
    }

    /// Run `operation` while holding the gate. On timeout the operation is
    /// never polled.
    pub async fn run<F, T>(&self, operation: F) -> VaultResult<T>
    where
        F: Future<Output = VaultResult<T>>,
    {
        let _guard = self.acquire().await?;
        operation.await
    }
}

impl Default for RequestGate {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_TIMEOUT)
    }
}
