use std::sync::{Arc, Mutex as StdMutex};
use anyhow::Context;
use tokio::sync::{watch, Mutex};
use oracle_relay::config::AppConfig;
use oracle_relay::interfaces::clock::{Clock, SystemClock};
use oracle_relay::keeper::{Keeper, TickOutcome};
use oracle_relay::observability;
use oracle_relay::oracle::{Aggregator, ManualSource, OracleHandle, SmoothedFeed};
use oracle_relay::relayer::{Relayer, TracingConsumer};
use oracle_relay::types::Fixed18;

// Dry run: three operator-set sources -> aggregator -> relayer -> log output.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("ORACLE_RELAY_ENV").unwrap_or_else(|_| "development".to_string());
    let config = AppConfig::load(&env).context("loading configuration")?;

    observability::tracing::init(&config.logging).context("installing tracing subscriber")?;
    observability::metrics::register_metrics().context("registering metrics")?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mut aggregator = Aggregator::from_config(&config.aggregator);
    for (i, price) in [100, 101, 99].into_iter().enumerate() {
        let source = ManualSource::named(format!("manual-{}", i), Fixed18::from_int(price));
        let feed = SmoothedFeed::from_config(Box::new(source), clock.clone(), &config.feed)?;
        aggregator.add_source(OracleHandle::new(format!("feed-{}", i), feed))?;
    }

    let aggregator = Arc::new(StdMutex::new(aggregator));
    let mut relayer = Relayer::new(TracingConsumer);
    relayer.add_binding(
        OracleHandle::from_shared("aggregator", aggregator),
        "demo".into(),
        config.relayer.default_policy,
    )?;
    let relayer = Arc::new(Mutex::new(relayer));

    if !config.keeper.enabled {
        match Keeper::tick_once(&relayer).await {
            TickOutcome::Pushed(report) => println!("{}", serde_json::to_string_pretty(&report)?),
            outcome => tracing::info!("Single pass: {:?}", outcome),
        }
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let keeper = Keeper::from_config(&config.keeper)?;
    let task = tokio::spawn({
        let relayer = relayer.clone();
        async move { keeper.run(relayer, shutdown_rx).await }
    });

    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
    shutdown_tx.send(true).ok();
    task.await.context("keeper task")?;

    let report = observability::metrics::render()?;
    println!("{}", report);
    Ok(())
}
