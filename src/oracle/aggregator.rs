use crate::config::AggregatorConfig;
use crate::controls::PauseSwitch;
use crate::error::{Error, Result};
use crate::interfaces::oracle::{Oracle, Reading};
use crate::oracle::handle::{OracleHandle, SourceOutcome};
use crate::observability::metrics::{AGGREGATED_VALID_SOURCES, AGGREGATIONS_INVALID, SOURCE_FAILURES};
use crate::types::fixed::Fixed18;
use crate::types::ids::SourceId;

/// Combines independent oracles into one value: the truncating mean of
/// whichever sources produced a valid reading this pass.
///
/// A failing, stale, panicking or busy source is left out of the mean and
/// never aborts the pass. With zero valid readings the result is `(0, false)`
/// rather than the previous value.
pub struct Aggregator {
    sources: Vec<OracleHandle>,
    required_valid_values: usize,
    last_aggregated: Reading,
    pause: PauseSwitch,
}

impl Aggregator {
    pub fn new() -> Self {
        Aggregator {
            sources: Vec::new(),
            required_valid_values: 0,
            last_aggregated: Reading::invalid(),
            pause: PauseSwitch::new(),
        }
    }

    pub fn from_config(config: &AggregatorConfig) -> Self {
        let mut aggregator = Self::new();
        aggregator.required_valid_values = config.required_valid_values;
        aggregator
    }

    pub fn with_pause_switch(mut self, pause: PauseSwitch) -> Self {
        self.pause = pause;
        self
    }

    pub fn add_source(&mut self, source: OracleHandle) -> Result<()> {
        if self.position(source.id()).is_some() {
            return Err(Error::AlreadyRegistered(source.id().clone()));
        }

        tracing::info!("Aggregator source added: {}", source.id());
        self.sources.push(source);
        Ok(())
    }

    pub fn remove_source(&mut self, source_id: &SourceId) -> Result<OracleHandle> {
        let index = self.position(source_id)
            .ok_or_else(|| Error::NotRegistered(source_id.clone()))?;

        tracing::info!("Aggregator source removed: {}", source_id);
        Ok(self.sources.remove(index))
    }

    /// 0 restores the default: one valid reading is enough.
    pub fn set_required_valid_values(&mut self, required: usize) {
        self.required_valid_values = required;
    }

    pub fn required_valid_values(&self) -> usize {
        self.required_valid_values
    }

    pub fn sources(&self) -> impl Iterator<Item = &SourceId> {
        self.sources.iter().map(|s| s.id())
    }

    pub fn last_aggregated(&self) -> Reading {
        self.last_aggregated
    }

    /// Last aggregated reading, refused while the pause switch is engaged.
    pub fn latest(&self) -> Result<Reading> {
        if self.pause.is_paused() {
            return Err(Error::Paused);
        }
        Ok(self.last_aggregated)
    }

    /// Poll every source in insertion order and store the new aggregate.
    pub fn refresh_and_aggregate(&mut self) -> Reading {
        let valid: Vec<Fixed18> = self.sources.iter()
            .filter_map(|source| match source.refresh_and_poll() {
                SourceOutcome::Valid(value) => Some(value),
                SourceOutcome::Stale => {
                    SOURCE_FAILURES.inc();
                    tracing::warn!("Source {} excluded: stale", source.id());
                    None
                }
                SourceOutcome::Failed(e) => {
                    SOURCE_FAILURES.inc();
                    tracing::warn!("Source {} excluded: {}", source.id(), e);
                    None
                }
            })
            .collect();

        let reading = match Fixed18::mean(&valid) {
            Some(mean) => Reading {
                value: mean,
                is_valid: self.meets_quorum(valid.len()),
            },
            None => Reading::invalid(),
        };

        AGGREGATED_VALID_SOURCES.set(valid.len() as i64);
        if !reading.is_valid {
            AGGREGATIONS_INVALID.inc();
            tracing::warn!(
                "Aggregation invalid: {} of {} sources valid (required {})",
                valid.len(),
                self.sources.len(),
                self.required_valid_values
            );
        }

        self.last_aggregated = reading;
        reading
    }

    fn meets_quorum(&self, valid_count: usize) -> bool {
        if self.required_valid_values == 0 {
            valid_count > 0
        } else {
            valid_count >= self.required_valid_values
        }
    }

    fn position(&self, source_id: &SourceId) -> Option<usize> {
        self.sources.iter().position(|s| s.id() == source_id)
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Oracle for Aggregator {
    fn refresh(&mut self) -> Result<()> {
        self.refresh_and_aggregate();
        Ok(())
    }

    // Degrades to invalid while paused so relay passes skip it quietly
    fn poll(&self) -> Result<Reading> {
        if self.pause.is_paused() {
            return Ok(Reading::invalid());
        }
        Ok(self.last_aggregated)
    }
}
