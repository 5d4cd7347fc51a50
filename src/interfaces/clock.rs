use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use crate::types::timestamp::Timestamp;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        // Pre-epoch wall clocks read as zero
        Timestamp::from_secs(chrono::Utc::now().timestamp().max(0) as u64)
    }
}

/// Clock that only moves when told to. Used by simulations and tests.
#[derive(Default)]
pub struct ManualClock {
    secs: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        ManualClock {
            secs: AtomicU64::new(start.as_secs()),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.secs.store(now.as_secs(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.secs.fetch_add(by.as_secs(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_secs(self.secs.load(Ordering::SeqCst))
    }
}
