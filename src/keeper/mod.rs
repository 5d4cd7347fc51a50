use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::time::{interval, MissedTickBehavior};
use crate::config::KeeperConfig;
use crate::error::{Error, Result};
use crate::interfaces::downstream_consumer::DownstreamConsumer;
use crate::relayer::relayer::{ExecutionReport, Relayer};

#[derive(Debug)]
pub enum TickOutcome {
    Pushed(ExecutionReport),
    NothingToDo,
    Failed(Error),
}

/// Periodic trigger for a relayer, standing in for an external keeper
/// network. Each tick is one `execute_with_revert` call.
///
/// Admin changes to a shared aggregator should be made between ticks. An
/// aggregator whose lock is held by an admin call when a tick reaches it
/// reads as `SourceBusy` and is skipped for that tick.
pub struct Keeper {
    interval: Duration,
}

impl Keeper {
    pub fn new(interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(Error::InvalidParameter("keeper interval must be > 0".to_string()));
        }
        Ok(Keeper { interval })
    }

    pub fn from_config(config: &KeeperConfig) -> Result<Self> {
        Keeper::new(config.interval())
    }

    pub async fn tick_once<C: DownstreamConsumer>(relayer: &Mutex<Relayer<C>>) -> TickOutcome {
        let mut relayer = relayer.lock().await;

        match relayer.execute_with_revert() {
            Ok(report) => {
                tracing::info!("Keeper pushed {} value(s)", report.pushed.len());
                TickOutcome::Pushed(report)
            }
            Err(e) if e.is_benign() => {
                tracing::debug!("Keeper tick: nothing to do");
                TickOutcome::NothingToDo
            }
            Err(e) => {
                tracing::error!("Keeper tick failed: {}", e);
                TickOutcome::Failed(e)
            }
        }
    }

    /// Tick until `shutdown` flips to true or its sender is dropped.
    pub async fn run<C: DownstreamConsumer>(
        &self,
        relayer: Arc<Mutex<Relayer<C>>>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!("Keeper started: interval={:?}", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    Self::tick_once(&relayer).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Keeper stopped");
    }
}
