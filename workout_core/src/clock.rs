//! Pause-aware elapsed-time clock for a live session.
//!
//! The clock never ticks on its own. It keeps timestamps only and
//! recomputes elapsed time from them, so a display refresh is purely
//! cosmetic. Callers pass `now` explicitly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Elapsed-time accumulator that excludes paused spans
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DurationClock {
    pub started_at: DateTime<Utc>,
    /// Cumulative time spent paused, in milliseconds
    pub paused_millis: i64,
    pub pause_started_at: Option<DateTime<Utc>>,
}

impl DurationClock {
    /// Start a clock running from `now`
    pub fn start(now: DateTime<Utc>) -> Self {
        Self {
            started_at: now,
            paused_millis: 0,
            pause_started_at: None,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.pause_started_at.is_some()
    }

    /// Freeze the clock at `now`
    ///
    /// Returns false (and changes nothing) if the clock is already paused.
    pub fn pause(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_paused() {
            return false;
        }
        self.pause_started_at = Some(now);
        tracing::debug!("Duration clock paused at {}", now);
        true
    }

    /// Unfreeze the clock, folding the paused span into `paused_millis`
    ///
    /// Returns false if the clock was not paused.
    pub fn resume(&mut self, now: DateTime<Utc>) -> bool {
        let Some(paused_at) = self.pause_started_at.take() else {
            return false;
        };
        let span = (now - paused_at).num_milliseconds().max(0);
        self.paused_millis += span;
        tracing::debug!("Duration clock resumed after {} ms paused", span);
        true
    }

    /// Whole seconds of running (non-paused) time
    ///
    /// While paused the result is computed against the pause instant, not
    /// `now`, so it stays constant until `resume`.
    pub fn elapsed(&self, now: DateTime<Utc>) -> u64 {
        let until = self.pause_started_at.unwrap_or(now);
        let running = (until - self.started_at).num_milliseconds() - self.paused_millis;
        (running.max(0) / 1000) as u64
    }

    /// Cumulative paused time in whole seconds, excluding an in-progress pause
    pub fn paused_seconds(&self) -> u64 {
        (self.paused_millis.max(0) / 1000) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap()
    }

    #[test]
    fn test_elapsed_non_decreasing_while_running() {
        let clock = DurationClock::start(t0());
        let mut last = 0;
        for ms in (0..10_000).step_by(250) {
            let now = t0() + Duration::milliseconds(ms);
            let elapsed = clock.elapsed(now);
            assert!(elapsed >= last);
            last = elapsed;
        }
        assert_eq!(last, 9);
    }

    #[test]
    fn test_elapsed_frozen_while_paused() {
        let mut clock = DurationClock::start(t0());
        let pause_at = t0() + Duration::seconds(42);
        clock.pause(pause_at);

        let readings: Vec<u64> = (0..3)
            .map(|i| clock.elapsed(pause_at + Duration::seconds(5 * i)))
            .collect();
        assert_eq!(readings, vec![42, 42, 42]);
    }

    #[test]
    fn test_resume_excludes_paused_span() {
        let mut clock = DurationClock::start(t0());
        clock.pause(t0() + Duration::seconds(60));
        let before = clock.elapsed(t0() + Duration::seconds(60));

        clock.resume(t0() + Duration::seconds(360));
        assert_eq!(clock.paused_seconds(), 300);
        assert_eq!(clock.elapsed(t0() + Duration::seconds(360)), before);
        assert_eq!(clock.elapsed(t0() + Duration::seconds(370)), 70);
    }

    #[test]
    fn test_pause_twice_keeps_first_instant() {
        let mut clock = DurationClock::start(t0());
        assert!(clock.pause(t0() + Duration::seconds(10)));
        assert!(!clock.pause(t0() + Duration::seconds(20)));
        assert_eq!(clock.elapsed(t0() + Duration::seconds(30)), 10);
    }

    #[test]
    fn test_resume_when_running_is_noop() {
        let mut clock = DurationClock::start(t0());
        assert!(!clock.resume(t0() + Duration::seconds(5)));
        assert_eq!(clock.paused_millis, 0);
    }

    #[test]
    fn test_sub_second_pauses_accumulate() {
        let mut clock = DurationClock::start(t0());
        for i in 0..4 {
            let at = t0() + Duration::seconds(10 * (i + 1));
            clock.pause(at);
            clock.resume(at + Duration::milliseconds(500));
        }
        // 2s paused in total across four half-second pauses
        assert_eq!(clock.elapsed(t0() + Duration::seconds(50)), 48);
    }
}
