//! Rest countdown between sets.
//!
//! Two states: Idle (no schedule, no remaining time) and Running (exactly
//! one 1 Hz [`Schedule`] plus the seconds left). The schedule lives in an
//! `Option` owned by the timer, so replacing or clearing it drops the old
//! handle first and a second countdown can never coexist with the first.

use crate::schedule::{Schedule, ScheduleRegistry};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Observable snapshot of the rest timer
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RestTimerState {
    pub remaining_seconds: Option<u32>,
    pub active: bool,
}

/// Outcome of advancing the countdown
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestTick {
    /// Timer was not running
    Idle,
    /// Still counting down
    Remaining(u32),
    /// Countdown reached zero on this advance and the timer went Idle
    Finished,
}

/// Single-instance rest countdown
#[derive(Debug)]
pub struct RestTimer {
    registry: ScheduleRegistry,
    remaining: Option<u32>,
    schedule: Option<Schedule>,
}

impl Default for RestTimer {
    fn default() -> Self {
        Self::new(ScheduleRegistry::new())
    }
}

impl RestTimer {
    pub fn new(registry: ScheduleRegistry) -> Self {
        Self {
            registry,
            remaining: None,
            schedule: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.schedule.is_some()
    }

    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub fn state(&self) -> RestTimerState {
        RestTimerState {
            remaining_seconds: self.remaining,
            active: self.is_running(),
        }
    }

    /// Begin a countdown of `seconds`, replacing any countdown in progress
    ///
    /// A zero-length rest leaves the timer Idle.
    pub fn start(&mut self, seconds: u32, now: DateTime<Utc>) {
        // Old handle must be gone before the new one registers.
        self.release();

        if seconds == 0 {
            return;
        }

        self.remaining = Some(seconds);
        self.schedule = Some(self.registry.every(Duration::seconds(1), now));
        tracing::debug!("Rest timer started: {}s", seconds);
    }

    /// Count down one second
    pub fn tick(&mut self) -> RestTick {
        if self.schedule.is_none() {
            return RestTick::Idle;
        }

        let left = self.remaining.unwrap_or(0).saturating_sub(1);
        if left == 0 {
            self.release();
            tracing::debug!("Rest timer finished");
            RestTick::Finished
        } else {
            self.remaining = Some(left);
            RestTick::Remaining(left)
        }
    }

    /// Cancel the countdown regardless of time left
    ///
    /// Returns whether a countdown was actually running.
    pub fn stop(&mut self) -> bool {
        let was_running = self.is_running();
        self.release();
        if was_running {
            tracing::debug!("Rest timer stopped");
        }
        was_running
    }

    /// Replace the time left without re-registering the schedule
    ///
    /// Only applies while running and for a positive value.
    pub fn edit(&mut self, new_seconds: u32) -> bool {
        if !self.is_running() || new_seconds == 0 {
            return false;
        }
        self.remaining = Some(new_seconds);
        tracing::debug!("Rest timer edited to {}s", new_seconds);
        true
    }

    /// Fire one tick per whole second that has come due by `now`
    pub fn poll(&mut self, now: DateTime<Utc>) -> RestTick {
        let due = match self.schedule.as_mut() {
            Some(schedule) => schedule.take_due(now),
            None => return RestTick::Idle,
        };

        let mut outcome = RestTick::Remaining(self.remaining.unwrap_or(0));
        for _ in 0..due {
            outcome = self.tick();
            if outcome == RestTick::Finished {
                break;
            }
        }
        outcome
    }

    fn release(&mut self) {
        self.schedule = None;
        self.remaining = None;
    }
}
