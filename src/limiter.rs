//! Windowed rate limiter for outbound API calls
//!
//! TMDB throttles clients to a fixed number of requests per time window.
//! Every remote call in this crate is funneled through a shared
//! [`RateLimiter`] that admits at most `burst` calls per `window` across all
//! concurrent callers; excess callers queue on a fair semaphore until a slot
//! frees. The limiter is an explicitly constructed value handed to the
//! orchestrator, so tests can substitute a permissive one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

/// Admits at most `burst` calls per `window`, queuing excess callers
///
/// Each admitted call holds one semaphore permit. The permit is returned one
/// full window after the call completes, on a detached timer task, so the
/// caller observes only the call's own latency. tokio's semaphore hands out
/// permits in FIFO order, which makes queued callers starvation-free. A
/// panic or error inside the guarded future cannot leak a slot: the permit
/// is moved into the timer task only after the future resolves, and is
/// otherwise released on drop.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    permits: Arc<Semaphore>,
    window: Duration,
}

impl RateLimiter {
    /// Creates a limiter admitting `burst` calls per `window`
    pub fn new(burst: usize, window: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(burst)),
            window,
        }
    }

    /// Creates a limiter that never throttles
    ///
    /// Slots are returned the moment a call completes, so callers only
    /// contend when more than `Semaphore::MAX_PERMITS` calls are in flight.
    /// Intended for tests.
    pub fn unlimited() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(Semaphore::MAX_PERMITS)),
            window: Duration::ZERO,
        }
    }

    /// Runs `call` once a rate slot is available, then returns its output
    ///
    /// Blocks (asynchronously) while all slots are taken. The slot is freed
    /// `window` after the call finishes regardless of whether it succeeded,
    /// so a failed call consumes exactly one slot like any other.
    pub async fn call<F, T>(&self, call: F) -> T
    where
        F: std::future::Future<Output = T>,
    {
        // The semaphore is never closed, so acquire cannot fail.
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .unwrap_or_else(|_| unreachable!("rate limiter semaphore is never closed"));

        let output = call.await;

        if self.window.is_zero() {
            drop(permit);
        } else {
            let window = self.window;
            tokio::spawn(async move {
                tokio::time::sleep(window).await;
                drop(permit);
            });
        }

        output
    }

    /// Number of slots currently free
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}
