use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_HOLD_DURATION: Duration = Duration::from_secs(15 * 60);

/// Hold duration shared by every lease written through one service.
///
/// Clones share the same value, so an operator adjusting it through one
/// handle affects all subsequent holds. Holds already written keep the
/// expiry they were given.
#[derive(Debug, Clone)]
pub struct HoldDuration {
    millis: Arc<AtomicU64>,
}

impl HoldDuration {
    pub fn new(duration: Duration) -> Self {
        Self {
            millis: Arc::new(AtomicU64::new(to_millis(duration))),
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    pub fn get(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::Relaxed))
    }

    pub fn set(&self, duration: Duration) {
        self.millis.store(to_millis(duration), Ordering::Relaxed);
    }
}

impl Default for HoldDuration {
    fn default() -> Self {
        Self::new(DEFAULT_HOLD_DURATION)
    }
}

fn to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
