#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use oracle_relay::interfaces::clock::ManualClock;
use oracle_relay::oracle::{ManualSource, OracleHandle, SmoothedFeed};
use oracle_relay::types::{Fixed18, SmoothingFactor, Timestamp};

pub const MIN_INTERVAL: Duration = Duration::from_secs(100);
pub const MAX_AGE: Duration = Duration::from_secs(600);

pub fn int(v: i64) -> Fixed18 {
    Fixed18::from_int(v)
}

pub fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(Timestamp::from_secs(1_700_000_000)))
}

pub fn smoothed(id: &str, source: &ManualSource, clock: &Arc<ManualClock>, alpha: f64) -> OracleHandle {
    let feed = SmoothedFeed::new(
        Box::new(source.clone()),
        clock.clone(),
        MIN_INTERVAL,
        MAX_AGE,
        SmoothingFactor::from_f64(alpha).unwrap(),
    ).unwrap();
    OracleHandle::new(id, feed)
}
