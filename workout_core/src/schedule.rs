//! Repeating schedules with guaranteed release.
//!
//! A [`Schedule`] is a registration handle: it exists exactly as long as the
//! repeating callback it stands for, and dropping it cancels the
//! registration. The [`ScheduleRegistry`] only counts live handles so hosts
//! and tests can check that nothing is orphaned.
//!
//! Everything here is single-threaded. A host event loop drives schedules by
//! asking each one how many periods have come due.

use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: Cell<u64>,
    live: Cell<usize>,
}

/// Hands out [`Schedule`] handles and tracks how many are alive
#[derive(Clone, Debug, Default)]
pub struct ScheduleRegistry {
    inner: Rc<RegistryInner>,
}

impl ScheduleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schedule firing every `period`, first due one period after `now`
    pub fn every(&self, period: Duration, now: DateTime<Utc>) -> Schedule {
        let id = self.inner.next_id.get() + 1;
        self.inner.next_id.set(id);
        self.inner.live.set(self.inner.live.get() + 1);
        tracing::debug!("Registered schedule #{} every {} ms", id, period.num_milliseconds());
        Schedule {
            id,
            period,
            next_due: now + period,
            registry: Rc::clone(&self.inner),
        }
    }

    /// Number of schedules currently registered
    pub fn live(&self) -> usize {
        self.inner.live.get()
    }
}

/// A live repeating registration; dropping it cancels the schedule
#[derive(Debug)]
pub struct Schedule {
    id: u64,
    period: Duration,
    next_due: DateTime<Utc>,
    registry: Rc<RegistryInner>,
}

impl Schedule {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn next_due(&self) -> DateTime<Utc> {
        self.next_due
    }

    /// Consume every period that has come due by `now`, returning how many
    pub fn take_due(&mut self, now: DateTime<Utc>) -> u32 {
        if self.period <= Duration::zero() {
            return 0;
        }
        let mut fired = 0;
        while self.next_due <= now {
            self.next_due = self.next_due + self.period;
            fired += 1;
        }
        fired
    }
}

impl Drop for Schedule {
    fn drop(&mut self) {
        self.registry.live.set(self.registry.live.get().saturating_sub(1));
        tracing::debug!("Released schedule #{}", self.id);
    }
}
