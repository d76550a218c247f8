//! Admission gate for outgoing requests
//!
//! A counting permit pool of [`BATCH_THRESHOLD`] permits. Every granted
//! permit is handed to a detached timer task that returns it to the pool
//! after `BATCH_THRESHOLD / max_requests_per_second` seconds, so at most
//! `BATCH_THRESHOLD` requests are ever inside their cooldown window and the
//! sustained rate stays under the ceiling.

use crate::config::DEFAULT_MAX_REQUESTS_PER_SECOND;
use crate::error::{Error, Result};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::trace;

/// Number of permits in the gate
pub const BATCH_THRESHOLD: u32 = 5;

/// Permit pool with per-grant cooldown
#[derive(Clone)]
pub struct AdmissionGate {
    permits: Arc<Semaphore>,
    max_requests_per_second: Arc<AtomicU32>,
}

impl AdmissionGate {
    /// Create a gate for the given ceiling
    pub fn new(max_requests_per_second: u32) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(BATCH_THRESHOLD as usize)),
            max_requests_per_second: Arc::new(AtomicU32::new(max_requests_per_second.max(1))),
        }
    }

    /// Current ceiling
    pub fn max_requests_per_second(&self) -> u32 {
        self.max_requests_per_second.load(Ordering::Relaxed)
    }

    /// Change the ceiling. Applies from the next grant; permits already
    /// cooling down keep the delay they were granted with.
    pub fn set_max_requests_per_second(&self, rps: u32) {
        self.max_requests_per_second.store(rps.max(1), Ordering::Relaxed);
    }

    /// Cooldown a permit granted now would get
    pub fn cooldown(&self) -> Duration {
        let rps = f64::from(self.max_requests_per_second());
        Duration::from_secs_f64(f64::from(BATCH_THRESHOLD) / rps)
    }

    /// Permits not currently cooling down
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Wait for a permit and schedule its release.
    ///
    /// Returns as soon as the permit is granted; the release happens on a
    /// spawned timer independent of the caller.
    pub async fn acquire(&self) -> Result<()> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| Error::Other("admission gate closed".to_string()))?;

        let cooldown = self.cooldown();
        trace!("Permit granted, releasing in {:?}", cooldown);
        tokio::spawn(async move {
            tokio::time::sleep(cooldown).await;
            drop(permit);
        });

        Ok(())
    }
}

impl Default for AdmissionGate {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS_PER_SECOND)
    }
}

impl std::fmt::Debug for AdmissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionGate")
            .field("max_requests_per_second", &self.max_requests_per_second())
            .field("available_permits", &self.available_permits())
            .finish()
    }
}
