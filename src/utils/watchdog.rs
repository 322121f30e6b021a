//! Task liveness signaling.
//!
//! Long-running background tasks (e.g. a WebSocket receive loop sitting on a
//! quiet connection) reset a [`Watchdog`] on every bounded read so that an
//! external supervisor polling [`Watchdog::idle_time`] can distinguish a
//! quiet-but-healthy task from a hung one.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Shared liveness handle for a background task.
///
/// Cloning produces another handle to the same underlying timer, so the task
/// resets it while a supervisor reads it.
#[derive(Debug, Clone)]
pub struct Watchdog {
    last_reset: Arc<Mutex<Instant>>,
}

impl Watchdog {
    /// Create a new watchdog, considered alive as of now.
    pub fn new() -> Self {
        Self {
            last_reset: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Signal that the owning task is still making progress.
    pub fn reset(&self) {
        *self.last_reset.lock() = Instant::now();
    }

    /// Time elapsed since the last reset.
    pub fn idle_time(&self) -> Duration {
        self.last_reset.lock().elapsed()
    }
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_clears_idle_time() {
        let watchdog = Watchdog::new();
        std::thread::sleep(Duration::from_millis(20));
        assert!(watchdog.idle_time() >= Duration::from_millis(20));

        watchdog.reset();
        assert!(watchdog.idle_time() < Duration::from_millis(20));
    }

    #[test]
    fn test_clones_share_state() {
        let watchdog = Watchdog::new();
        let handle = watchdog.clone();
        std::thread::sleep(Duration::from_millis(20));

        handle.reset();
        assert!(watchdog.idle_time() < Duration::from_millis(20));
    }
}
