use crate::error::{Error, Result};
use crate::oracle::handle::OracleHandle;
use crate::relayer::policy::DeviationPolicy;
use crate::types::fixed::Fixed18;
use crate::types::ids::{DestinationKey, SourceId};

/// One source relayed into one downstream slot.
#[derive(Debug)]
pub struct OracleBinding {
    pub source: OracleHandle,
    pub key: DestinationKey,
    pub policy: DeviationPolicy,
    pub last_pushed: Option<Fixed18>,
}

impl OracleBinding {
    pub fn source_id(&self) -> &SourceId {
        self.source.id()
    }
}

/// Bindings in insertion order. Source and key lookups both scan the same
/// entries, so the source -> key and key -> source views cannot disagree.
#[derive(Debug, Default)]
pub struct BindingRegistry {
    entries: Vec<OracleBinding>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        BindingRegistry {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, source: OracleHandle, key: DestinationKey, policy: DeviationPolicy) -> Result<()> {
        if self.by_source(source.id()).is_some() {
            return Err(Error::AlreadyRegistered(source.id().clone()));
        }
        if self.by_key(&key).is_some() {
            return Err(Error::KeyTaken(key));
        }

        self.entries.push(OracleBinding {
            source,
            key,
            policy,
            last_pushed: None,
        });
        Ok(())
    }

    /// Removes the binding, freeing both its source and its key.
    pub fn remove(&mut self, source_id: &SourceId) -> Result<OracleBinding> {
        let index = self.entries.iter()
            .position(|b| b.source_id() == source_id)
            .ok_or_else(|| Error::NotRegistered(source_id.clone()))?;
        Ok(self.entries.remove(index))
    }

    pub fn by_source(&self, source_id: &SourceId) -> Option<&OracleBinding> {
        self.entries.iter().find(|b| b.source_id() == source_id)
    }

    pub fn by_source_mut(&mut self, source_id: &SourceId) -> Option<&mut OracleBinding> {
        self.entries.iter_mut().find(|b| b.source_id() == source_id)
    }

    pub fn by_key(&self, key: &DestinationKey) -> Option<&OracleBinding> {
        self.entries.iter().find(|b| &b.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OracleBinding> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut OracleBinding> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
