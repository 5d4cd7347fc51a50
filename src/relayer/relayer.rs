use serde::Serialize;
use crate::error::{Error, Result};
use crate::interfaces::downstream_consumer::DownstreamConsumer;
use crate::observability::metrics::{RELAYER_NOOPS, RELAYER_PUSHES, SOURCE_FAILURES};
use crate::observability::tracing::trace_relay;
use crate::oracle::handle::{OracleHandle, SourceOutcome};
use crate::relayer::binding::{BindingRegistry, OracleBinding};
use crate::relayer::policy::DeviationPolicy;
use crate::types::fixed::Fixed18;
use crate::types::ids::{DestinationKey, SourceId};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    pub pushed: Vec<(DestinationKey, Fixed18)>,
    pub below_threshold: usize,
    pub invalid: usize,
}

enum Evaluation {
    Updatable(Fixed18),
    BelowThreshold,
    Invalid,
}

/// Deviation-gated relay from bound oracles into a downstream consumer.
///
/// `check` answers "is there work" and stops at the first updatable binding.
/// `execute` pushes every binding whose fresh value crossed its threshold.
/// Whether a binding is updatable is recomputed from scratch on every call;
/// the only stored state is the last value pushed per binding.
pub struct Relayer<C: DownstreamConsumer> {
    bindings: BindingRegistry,
    consumer: C,
}

impl<C: DownstreamConsumer> Relayer<C> {
    pub fn new(consumer: C) -> Self {
        Relayer {
            bindings: BindingRegistry::new(),
            consumer,
        }
    }

    pub fn add_binding(&mut self, source: OracleHandle, key: DestinationKey, policy: DeviationPolicy) -> Result<()> {
        let source_id = source.id().clone();
        self.bindings.insert(source, key.clone(), policy)?;
        tracing::info!("Binding added: {} -> {} ({:?})", source_id, key, policy);
        Ok(())
    }

    pub fn remove_binding(&mut self, source_id: &SourceId) -> Result<OracleBinding> {
        let removed = self.bindings.remove(source_id)?;
        tracing::info!("Binding removed: {} -> {}", source_id, removed.key);
        Ok(removed)
    }

    pub fn set_threshold(&mut self, source_id: &SourceId, policy: DeviationPolicy) -> Result<()> {
        let binding = self.bindings.by_source_mut(source_id)
            .ok_or_else(|| Error::NotRegistered(source_id.clone()))?;
        binding.policy = policy;
        tracing::info!("Threshold for {} set to {:?}", source_id, policy);
        Ok(())
    }

    pub fn binding(&self, source_id: &SourceId) -> Option<&OracleBinding> {
        self.bindings.by_source(source_id)
    }

    pub fn binding_for_key(&self, key: &DestinationKey) -> Option<&OracleBinding> {
        self.bindings.by_key(key)
    }

    pub fn bindings(&self) -> impl Iterator<Item = &OracleBinding> {
        self.bindings.iter()
    }

    pub fn consumer(&self) -> &C {
        &self.consumer
    }

    /// True as soon as one binding is updatable. Refreshes the sources it
    /// visits but never touches the relayer's own pushed values.
    pub fn check(&self) -> bool {
        let _span = trace_relay("check").entered();

        self.bindings.iter()
            .any(|binding| matches!(evaluate(binding), Evaluation::Updatable(_)))
    }

    /// Visit every binding and push each one that crossed its threshold.
    ///
    /// Pushed values are only recorded once every push in the pass has
    /// succeeded. A consumer failure aborts the pass with no relayer state
    /// changed, so the next call retries every binding that crossed.
    pub fn execute(&mut self) -> Result<ExecutionReport> {
        let _span = trace_relay("execute").entered();
        let mut report = ExecutionReport::default();

        let updates: Vec<Option<Fixed18>> = self.bindings.iter()
            .map(|binding| match evaluate(binding) {
                Evaluation::Updatable(value) => Some(value),
                Evaluation::BelowThreshold => {
                    report.below_threshold += 1;
                    None
                }
                Evaluation::Invalid => {
                    report.invalid += 1;
                    None
                }
            })
            .collect();

        for (binding, update) in self.bindings.iter().zip(&updates) {
            let Some(value) = *update else {
                continue;
            };

            self.consumer.update_value(&binding.key, value).map_err(|e| {
                tracing::error!("Push to {} failed, pass aborted: {}", binding.key, e);
                Error::PushFailed {
                    key: binding.key.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        for (binding, update) in self.bindings.iter_mut().zip(updates) {
            let Some(value) = update else {
                continue;
            };

            tracing::info!(
                "Pushed {} = {} (previous {:?})",
                binding.key,
                value,
                binding.last_pushed.map(|v| v.to_string())
            );
            binding.last_pushed = Some(value);
            RELAYER_PUSHES.inc();
            report.pushed.push((binding.key.clone(), value));
        }

        if report.pushed.is_empty() {
            RELAYER_NOOPS.inc();
        }
        Ok(report)
    }

    /// `execute` if `check` finds work, otherwise `Error::NoUpdateNeeded`.
    pub fn execute_with_revert(&mut self) -> Result<ExecutionReport> {
        if !self.check() {
            RELAYER_NOOPS.inc();
            return Err(Error::NoUpdateNeeded);
        }
        self.execute()
    }
}

fn evaluate(binding: &OracleBinding) -> Evaluation {
    let value = match binding.source.refresh_and_poll() {
        SourceOutcome::Valid(value) => value,
        SourceOutcome::Stale => {
            SOURCE_FAILURES.inc();
            tracing::warn!("Binding {} skipped: source {} invalid", binding.key, binding.source_id());
            return Evaluation::Invalid;
        }
        SourceOutcome::Failed(Error::SourceBusy(source_id)) => {
            SOURCE_FAILURES.inc();
            tracing::warn!("Binding {} skipped: source {} is locked by another caller", binding.key, source_id);
            return Evaluation::Invalid;
        }
        SourceOutcome::Failed(e) => {
            SOURCE_FAILURES.inc();
            tracing::warn!("Binding {} skipped: source {} failed: {}", binding.key, binding.source_id(), e);
            return Evaluation::Invalid;
        }
    };

    match binding.policy.exceeds(binding.last_pushed, value) {
        Ok(true) => Evaluation::Updatable(value),
        Ok(false) => Evaluation::BelowThreshold,
        Err(e) => {
            tracing::warn!("Binding {} skipped: deviation check failed: {}", binding.key, e);
            Evaluation::Invalid
        }
    }
}
