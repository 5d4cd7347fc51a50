mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;
use common::{clock, int, smoothed, MIN_INTERVAL};
use oracle_relay::access::AccessControl;
use oracle_relay::controls::PauseSwitch;
use oracle_relay::error::Error;
use oracle_relay::interfaces::oracle::Reading;
use oracle_relay::oracle::{Aggregator, ManualSource, OracleHandle};
use oracle_relay::relayer::{DeviationPolicy, RecordingConsumer, Relayer};
use oracle_relay::types::{DestinationKey, Fixed18, OperatorId, SourceId};

fn three_feed_aggregator(
    values: [i64; 3],
    clock: &Arc<oracle_relay::interfaces::clock::ManualClock>,
) -> (Arc<Mutex<Aggregator>>, Vec<ManualSource>) {
    let sources: Vec<ManualSource> = values.iter().map(|v| ManualSource::new(int(*v))).collect();
    let mut aggregator = Aggregator::new();
    for (i, source) in sources.iter().enumerate() {
        aggregator.add_source(smoothed(&format!("feed-{}", i), source, clock, 0.2)).unwrap();
    }
    (Arc::new(Mutex::new(aggregator)), sources)
}

#[test]
fn test_end_to_end_constant_sources() {
    let clock = clock();
    let (aggregator, _sources) = three_feed_aggregator([100, 100, 100], &clock);

    clock.advance(MIN_INTERVAL + Duration::from_secs(1));
    let reading = aggregator.lock().unwrap().refresh_and_aggregate();
    assert_eq!(reading, Reading::valid(Fixed18::from_raw(100 * Fixed18::SCALE)));

    let consumer = RecordingConsumer::new();
    let mut relayer = Relayer::new(consumer.clone());
    relayer.add_binding(
        OracleHandle::from_shared("aggregator", aggregator.clone()),
        "K".into(),
        DeviationPolicy::absolute(Fixed18::from_raw(100_000_000_000_000)).unwrap(),
    ).unwrap();

    relayer.execute_with_revert().unwrap();
    assert_eq!(consumer.pushes(), vec![(DestinationKey::from("K"), int(100))]);

    let second = relayer.execute_with_revert();
    assert!(matches!(second, Err(Error::NoUpdateNeeded)));
    assert_eq!(consumer.pushes().len(), 1);
}

#[test]
fn test_partial_outage_and_recovery() {
    let clock = clock();
    let (aggregator, sources) = three_feed_aggregator([100, 110, 120], &clock);
    sources[1].fail();

    let consumer = RecordingConsumer::new();
    let mut relayer = Relayer::new(consumer.clone());
    relayer.add_binding(
        OracleHandle::from_shared("aggregator", aggregator.clone()),
        "K".into(),
        DeviationPolicy::percentage(100).unwrap(),
    ).unwrap();

    relayer.execute_with_revert().unwrap();
    assert_eq!(consumer.latest(&"K".into()), Some(int(110)));

    // Everything down: the aggregate goes invalid and nothing is pushed
    for source in &sources {
        source.fail();
    }
    clock.advance(Duration::from_secs(700));
    assert!(!relayer.check());
    assert!(matches!(relayer.execute_with_revert(), Err(Error::NoUpdateNeeded)));
    assert_eq!(aggregator.lock().unwrap().last_aggregated(), Reading::invalid());

    // One source returns; its feed resumes from the old average: 100 + 0.2 * (130 - 100)
    sources[0].set(int(130));
    clock.advance(MIN_INTERVAL);
    let report = relayer.execute_with_revert().unwrap();
    assert_eq!(report.pushed, vec![(DestinationKey::from("K"), int(106))]);
}

#[test]
fn test_ema_lag_is_gated_by_threshold() {
    let clock = clock();
    let source = ManualSource::new(int(100));
    let consumer = RecordingConsumer::new();
    let mut relayer = Relayer::new(consumer.clone());
    relayer.add_binding(
        smoothed("feed", &source, &clock, 0.2),
        "K".into(),
        DeviationPolicy::percentage(1_000).unwrap(),
    ).unwrap();

    relayer.execute().unwrap();
    source.set(int(200));

    // 100 -> 120 (20% move, pushed) -> 136 (13.3% from 120, pushed) -> 148.8 (9.4%, held)
    clock.advance(MIN_INTERVAL);
    assert_eq!(relayer.execute().unwrap().pushed, vec![(DestinationKey::from("K"), int(120))]);

    clock.advance(MIN_INTERVAL);
    assert_eq!(relayer.execute().unwrap().pushed, vec![(DestinationKey::from("K"), int(136))]);

    clock.advance(MIN_INTERVAL);
    let held = relayer.execute().unwrap();
    assert!(held.pushed.is_empty());
    assert_eq!(held.below_threshold, 1);

    // Within the interval the EMA is frozen, so nothing moves either
    clock.advance(Duration::from_secs(10));
    assert!(!relayer.check());
}

#[test]
fn test_feeds_and_aggregators_bind_side_by_side() {
    let clock = clock();
    let (aggregator, _sources) = three_feed_aggregator([10, 20, 30], &clock);
    let direct = ManualSource::new(int(42));

    let consumer = RecordingConsumer::new();
    let mut relayer = Relayer::new(consumer.clone());
    relayer.add_binding(OracleHandle::from_shared("agg", aggregator), "AGG".into(), DeviationPolicy::percentage(1).unwrap()).unwrap();
    relayer.add_binding(smoothed("direct", &direct, &clock, 1.0), "DIRECT".into(), DeviationPolicy::percentage(1).unwrap()).unwrap();

    let report = relayer.execute().unwrap();
    assert_eq!(report.pushed, vec![
        (DestinationKey::from("AGG"), int(20)),
        (DestinationKey::from("DIRECT"), int(42)),
    ]);
}

#[test]
fn test_paused_aggregator_relays_nothing() {
    let clock = clock();
    let pause = PauseSwitch::new();
    let source = ManualSource::new(int(5));

    let mut aggregator = Aggregator::new().with_pause_switch(pause.clone());
    aggregator.add_source(smoothed("feed", &source, &clock, 1.0)).unwrap();

    let consumer = RecordingConsumer::new();
    let mut relayer = Relayer::new(consumer.clone());
    relayer.add_binding(OracleHandle::new("agg", aggregator), "K".into(), DeviationPolicy::percentage(1).unwrap()).unwrap();

    pause.pause();
    assert!(matches!(relayer.execute_with_revert(), Err(Error::NoUpdateNeeded)));
    assert!(consumer.pushes().is_empty());

    pause.resume();
    relayer.execute_with_revert().unwrap();
    assert_eq!(consumer.latest(&"K".into()), Some(int(5)));
}

#[test]
fn test_admin_calls_go_through_access_control() {
    let clock = clock();
    let admin = OperatorId::new();
    let stranger = OperatorId::new();
    let access = AccessControl::new().with_operator(admin);

    let (aggregator, _sources) = three_feed_aggregator([1, 2, 3], &clock);
    let extra = ManualSource::new(int(4));

    let denied = access.gated(&stranger, || {
        aggregator.lock().unwrap().add_source(smoothed("extra", &extra, &clock, 1.0))
    });
    assert!(matches!(denied, Err(Error::Unauthorized(_))));
    assert_eq!(aggregator.lock().unwrap().sources().count(), 3);

    access.gated(&admin, || {
        aggregator.lock().unwrap().add_source(smoothed("extra", &extra, &clock, 1.0))
    }).unwrap();
    access.gated(&admin, || {
        aggregator.lock().unwrap().remove_source(&SourceId::from("feed-0")).map(|_| ())
    }).unwrap();

    let ids: Vec<String> = aggregator.lock().unwrap().sources().map(|id| id.to_string()).collect();
    assert_eq!(ids, vec!["feed-1", "feed-2", "extra"]);
}
