use std::sync::Arc;
use std::time::Duration;
use crate::config::FeedConfig;
use crate::error::{Error, Result};
use crate::interfaces::clock::Clock;
use crate::interfaces::oracle::{Oracle, Reading};
use crate::interfaces::value_source::ValueSource;
use crate::observability::metrics::FEED_REFRESHES;
use crate::types::fixed::Fixed18;
use crate::types::ratio::SmoothingFactor;
use crate::types::timestamp::Timestamp;

/// Exponential moving average over one raw `ValueSource`.
///
/// The average moves at most once per `min_update_interval` and reads as
/// invalid once `max_valid_age` has elapsed since the last move. The first
/// successful refresh adopts the raw value as-is.
pub struct SmoothedFeed {
    source: Box<dyn ValueSource>,
    clock: Arc<dyn Clock>,
    min_update_interval: Duration,
    max_valid_age: Duration,
    smoothing_factor: SmoothingFactor,
    last_update: Option<Timestamp>,
    current_ema: Option<Fixed18>,
}

impl SmoothedFeed {
    pub fn new(
        source: Box<dyn ValueSource>,
        clock: Arc<dyn Clock>,
        min_update_interval: Duration,
        max_valid_age: Duration,
        smoothing_factor: SmoothingFactor,
    ) -> Result<Self> {
        if max_valid_age.is_zero() {
            return Err(Error::InvalidParameter("max_valid_age must be > 0".to_string()));
        }

        Ok(SmoothedFeed {
            source,
            clock,
            min_update_interval,
            max_valid_age,
            smoothing_factor,
            last_update: None,
            current_ema: None,
        })
    }

    pub fn from_config(
        source: Box<dyn ValueSource>,
        clock: Arc<dyn Clock>,
        config: &FeedConfig,
    ) -> Result<Self> {
        Self::new(
            source,
            clock,
            config.min_update_interval(),
            config.max_valid_age(),
            config.smoothing_factor,
        )
    }

    pub fn current_ema(&self) -> Option<Fixed18> {
        self.current_ema
    }

    pub fn last_update_time(&self) -> Option<Timestamp> {
        self.last_update
    }

    pub fn smoothing_factor(&self) -> SmoothingFactor {
        self.smoothing_factor
    }

    /// Stale once `now >= last_update + max_valid_age`; never-updated feeds are stale.
    pub fn is_stale(&self) -> bool {
        match self.last_update {
            Some(last) => self.clock.now() >= last + self.max_valid_age,
            None => true,
        }
    }

    fn is_rate_limited(&self, now: Timestamp) -> bool {
        match self.last_update {
            Some(last) => now < last + self.min_update_interval,
            None => false,
        }
    }

    fn next_ema(&self, raw: Fixed18) -> Result<Fixed18> {
        match self.current_ema {
            None => Ok(raw),
            Some(ema) => {
                // ema + alpha * (raw - ema) / SCALE
                let delta = raw.checked_sub(ema)?;
                ema.checked_add(self.smoothing_factor.apply(delta)?)
            }
        }
    }
}

impl Oracle for SmoothedFeed {
    fn refresh(&mut self) -> Result<()> {
        let now = self.clock.now();

        if self.is_rate_limited(now) {
            tracing::debug!("Refresh skipped: within min update interval");
            return Ok(());
        }

        // Nothing is written unless the read and the arithmetic both succeed
        let raw = self.source.value()?;
        let ema = self.next_ema(raw)?;

        self.current_ema = Some(ema);
        self.last_update = Some(now);
        FEED_REFRESHES.inc();

        tracing::debug!(raw = %raw, ema = %ema, at = %now, "EMA updated");
        Ok(())
    }

    fn poll(&self) -> Result<Reading> {
        Ok(Reading {
            value: self.current_ema.unwrap_or(Fixed18::ZERO),
            is_valid: !self.is_stale(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::clock::ManualClock;
    use crate::interfaces::value_source::MockValueSource;
    use crate::oracle::sources::ManualSource;

    const INTERVAL: Duration = Duration::from_secs(100);
    const MAX_AGE: Duration = Duration::from_secs(300);

    fn feed_with(source: Box<dyn ValueSource>, alpha: f64) -> (SmoothedFeed, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Timestamp::from_secs(1_000)));
        let feed = SmoothedFeed::new(
            source,
            clock.clone(),
            INTERVAL,
            MAX_AGE,
            SmoothingFactor::from_f64(alpha).unwrap(),
        ).unwrap();
        (feed, clock)
    }

    #[test]
    fn test_first_refresh_bootstraps_from_raw_value() {
        let source = ManualSource::new(Fixed18::from_int(100));
        let (mut feed, _clock) = feed_with(Box::new(source), 0.2);

        assert!(!feed.poll().unwrap().is_valid);
        feed.refresh().unwrap();

        assert_eq!(feed.current_ema(), Some(Fixed18::from_int(100)));
        assert_eq!(feed.poll().unwrap(), Reading::valid(Fixed18::from_int(100)));
    }

    #[test]
    fn test_ema_step() {
        let source = ManualSource::new(Fixed18::from_int(100));
        let (mut feed, clock) = feed_with(Box::new(source.clone()), 0.2);
        feed.refresh().unwrap();

        source.set(Fixed18::from_int(200));
        clock.advance(INTERVAL);
        feed.refresh().unwrap();

        // 100 + 0.2 * (200 - 100)
        assert_eq!(feed.current_ema(), Some(Fixed18::from_int(120)));
    }

    #[test]
    fn test_negative_delta_truncates_toward_zero() {
        let source = ManualSource::new(Fixed18::from_raw(10));
        let (mut feed, clock) = feed_with(Box::new(source.clone()), 0.5);
        feed.refresh().unwrap();

        source.set(Fixed18::from_raw(7));
        clock.advance(INTERVAL);
        feed.refresh().unwrap();

        // delta -3 * 0.5 = -1.5 -> -1
        assert_eq!(feed.current_ema(), Some(Fixed18::from_raw(9)));
    }

    #[test]
    fn test_refresh_within_interval_is_noop() {
        let source = ManualSource::new(Fixed18::from_int(100));
        let (mut feed, clock) = feed_with(Box::new(source.clone()), 0.2);
        feed.refresh().unwrap();
        let first_update = feed.last_update_time();

        source.set(Fixed18::from_int(500));
        clock.advance(INTERVAL - Duration::from_secs(1));
        feed.refresh().unwrap();

        assert_eq!(feed.current_ema(), Some(Fixed18::from_int(100)));
        assert_eq!(feed.last_update_time(), first_update);
    }

    #[test]
    fn test_staleness_boundary_is_inclusive() {
        let source = ManualSource::new(Fixed18::from_int(1));
        let (mut feed, clock) = feed_with(Box::new(source), 1.0);
        feed.refresh().unwrap();

        clock.advance(MAX_AGE - Duration::from_secs(1));
        assert!(!feed.is_stale());

        clock.advance(Duration::from_secs(1));
        assert!(feed.is_stale());
        assert!(!feed.poll().unwrap().is_valid);
    }

    #[test]
    fn test_source_failure_leaves_state_untouched() {
        let mut source = MockValueSource::new();
        let mut calls = 0;
        source.expect_value().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Ok(Fixed18::from_int(50))
            } else {
                Err(Error::SourceUnavailable {
                    source_id: "pool".into(),
                    reason: "reverted".to_string(),
                })
            }
        });

        let (mut feed, clock) = feed_with(Box::new(source), 0.2);
        feed.refresh().unwrap();
        let first_update = feed.last_update_time();

        clock.advance(INTERVAL);
        assert!(matches!(feed.refresh(), Err(Error::SourceUnavailable { .. })));
        assert_eq!(feed.current_ema(), Some(Fixed18::from_int(50)));
        assert_eq!(feed.last_update_time(), first_update);
    }

    #[test]
    fn test_rejects_zero_max_age() {
        let clock = Arc::new(ManualClock::default());
        let result = SmoothedFeed::new(
            Box::new(ManualSource::new(Fixed18::ONE)),
            clock,
            INTERVAL,
            Duration::ZERO,
            SmoothingFactor::one(),
        );
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }
}
