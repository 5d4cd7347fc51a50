use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared pause flag. Clones observe the same state, so one operator action
/// gates every component holding a copy.
#[derive(Clone, Debug, Default)]
pub struct PauseSwitch {
    paused: Arc<AtomicBool>,
}

impl PauseSwitch {
    pub fn new() -> Self {
        PauseSwitch {
            paused: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn pause(&self) {
        if !self.paused.swap(true, Ordering::SeqCst) {
            tracing::warn!("Oracle reads PAUSED");
        }
    }

    pub fn resume(&self) {
        if self.paused.swap(false, Ordering::SeqCst) {
            tracing::info!("Oracle reads RESUMED");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}
