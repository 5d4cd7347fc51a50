use std::collections::HashSet;
use crate::error::{Error, Result};
use crate::types::ids::OperatorId;

/// Authorized-caller set applied at the boundary of administrative entry
/// points. The core types never consult it themselves.
#[derive(Clone, Debug, Default)]
pub struct AccessControl {
    operators: HashSet<OperatorId>,
}

impl AccessControl {
    pub fn new() -> Self {
        AccessControl {
            operators: HashSet::new(),
        }
    }

    pub fn with_operator(mut self, operator_id: OperatorId) -> Self {
        self.operators.insert(operator_id);
        self
    }

    pub fn grant(&mut self, caller: &OperatorId, operator_id: OperatorId) -> Result<()> {
        self.require(caller)?;
        if self.operators.insert(operator_id) {
            tracing::info!("Added authorized operator: {}", operator_id);
        }
        Ok(())
    }

    pub fn revoke(&mut self, caller: &OperatorId, operator_id: &OperatorId) -> Result<()> {
        self.require(caller)?;
        if self.operators.remove(operator_id) {
            tracing::info!("Removed authorized operator: {}", operator_id);
        }
        Ok(())
    }

    pub fn is_authorized(&self, operator_id: &OperatorId) -> bool {
        self.operators.contains(operator_id)
    }

    pub fn require(&self, caller: &OperatorId) -> Result<()> {
        if self.is_authorized(caller) {
            Ok(())
        } else {
            tracing::warn!("Unauthorized administrative call by {}", caller);
            Err(Error::Unauthorized(*caller))
        }
    }

    /// Run `op` only if `caller` is authorized.
    ///
    /// ```ignore
    /// access.gated(&caller, || aggregator.add_source(handle))?;
    /// ```
    pub fn gated<T>(&self, caller: &OperatorId, op: impl FnOnce() -> Result<T>) -> Result<T> {
        self.require(caller)?;
        op()
    }
}
