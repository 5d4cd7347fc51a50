use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, TryLockError};
use crate::error::Error;
use crate::interfaces::oracle::Oracle;
use crate::observability::tracing::trace_refresh;
use crate::types::fixed::Fixed18;
use crate::types::ids::SourceId;

/// Result of one isolated refresh + poll against a single source.
#[derive(Debug)]
pub enum SourceOutcome {
    Valid(Fixed18),
    Stale,
    Failed(Error),
}

impl SourceOutcome {
    pub fn value(&self) -> Option<Fixed18> {
        match self {
            SourceOutcome::Valid(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, SourceOutcome::Valid(_))
    }
}

/// Addressable, shared reference to a feed or aggregator.
///
/// Identity is the `SourceId`; the same oracle may be referenced from
/// several aggregators or relayers. Calls go through a `Mutex` that is only
/// ever `try_lock`ed, so a source reached re-entrantly (for example an
/// aggregator listed inside itself) reads as busy instead of deadlocking.
#[derive(Clone)]
pub struct OracleHandle {
    id: SourceId,
    inner: Arc<Mutex<dyn Oracle>>,
}

impl OracleHandle {
    pub fn new<O: Oracle + 'static>(id: impl Into<SourceId>, oracle: O) -> Self {
        OracleHandle {
            id: id.into(),
            inner: Arc::new(Mutex::new(oracle)),
        }
    }

    /// Wrap an oracle the caller keeps a typed reference to, e.g. an
    /// aggregator that still needs administering after it is bound.
    /// While the caller holds that lock, every pass through this handle
    /// sees `SourceBusy`; administer between relay passes.
    pub fn from_shared<O: Oracle + 'static>(id: impl Into<SourceId>, shared: Arc<Mutex<O>>) -> Self {
        OracleHandle {
            id: id.into(),
            inner: shared,
        }
    }

    pub fn id(&self) -> &SourceId {
        &self.id
    }

    /// Refresh then poll, capturing every failure mode as an outcome.
    /// Never panics and never returns an error to the caller.
    pub fn refresh_and_poll(&self) -> SourceOutcome {
        let _span = trace_refresh(&self.id).entered();

        let mut oracle = match self.inner.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                return SourceOutcome::Failed(Error::SourceBusy(self.id.clone()));
            }
            Err(TryLockError::Poisoned(_)) => {
                return SourceOutcome::Failed(Error::SourcePanicked(self.id.clone()));
            }
        };

        let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
            oracle.refresh()?;
            oracle.poll()
        }));

        match attempt {
            Ok(Ok(reading)) if reading.is_valid => SourceOutcome::Valid(reading.value),
            Ok(Ok(_)) => SourceOutcome::Stale,
            Ok(Err(e)) => SourceOutcome::Failed(e),
            Err(_) => SourceOutcome::Failed(Error::SourcePanicked(self.id.clone())),
        }
    }
}

impl fmt::Debug for OracleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleHandle").field("id", &self.id).finish()
    }
}
