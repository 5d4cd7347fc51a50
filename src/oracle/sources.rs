use std::sync::{Arc, Mutex};
use crate::error::{Error, Result};
use crate::interfaces::value_source::ValueSource;
use crate::types::fixed::Fixed18;
use crate::types::ids::SourceId;

/// Operator-set value source. Clones share the same slot, so the holder of
/// one clone can move or break the value a feed reads through another.
#[derive(Clone, Debug)]
pub struct ManualSource {
    id: SourceId,
    value: Arc<Mutex<Option<Fixed18>>>,
}

impl ManualSource {
    pub fn new(value: Fixed18) -> Self {
        Self::named("manual", value)
    }

    pub fn named(id: impl Into<SourceId>, value: Fixed18) -> Self {
        ManualSource {
            id: id.into(),
            value: Arc::new(Mutex::new(Some(value))),
        }
    }

    pub fn set(&self, value: Fixed18) {
        if let Ok(mut slot) = self.value.lock() {
            *slot = Some(value);
        }
    }

    /// Make subsequent reads fail until the next `set`.
    pub fn fail(&self) {
        if let Ok(mut slot) = self.value.lock() {
            *slot = None;
        }
    }
}

impl ValueSource for ManualSource {
    fn value(&self) -> Result<Fixed18> {
        let slot = self.value.lock().map_err(|_| Error::SourceUnavailable {
            source_id: self.id.clone(),
            reason: "value slot poisoned".to_string(),
        })?;

        (*slot).ok_or_else(|| Error::SourceUnavailable {
            source_id: self.id.clone(),
            reason: "no value set".to_string(),
        })
    }
}
