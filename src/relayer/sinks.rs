use std::sync::{Arc, Mutex};
use crate::error::{Error, Result};
use crate::interfaces::downstream_consumer::DownstreamConsumer;
use crate::types::fixed::Fixed18;
use crate::types::ids::DestinationKey;

/// Keeps every push in memory. Clones share the log, so a caller can hand
/// one clone to a relayer and inspect deliveries through another.
#[derive(Clone, Debug, Default)]
pub struct RecordingConsumer {
    pushes: Arc<Mutex<Vec<(DestinationKey, Fixed18)>>>,
}

impl RecordingConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pushes(&self) -> Vec<(DestinationKey, Fixed18)> {
        self.pushes.lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    /// Most recent value delivered for `key`.
    pub fn latest(&self, key: &DestinationKey) -> Option<Fixed18> {
        self.pushes().into_iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

impl DownstreamConsumer for RecordingConsumer {
    fn update_value(&mut self, key: &DestinationKey, value: Fixed18) -> Result<()> {
        let mut log = self.pushes.lock().map_err(|_| Error::PushFailed {
            key: key.clone(),
            reason: "push log poisoned".to_string(),
        })?;
        log.push((key.clone(), value));
        Ok(())
    }
}

/// Logs each push. Stands in for the consumer contract in dry runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingConsumer;

impl DownstreamConsumer for TracingConsumer {
    fn update_value(&mut self, key: &DestinationKey, value: Fixed18) -> Result<()> {
        tracing::info!(key = %key, value = %value, "updateValue");
        Ok(())
    }
}
