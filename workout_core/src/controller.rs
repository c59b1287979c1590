//! The workout flow controller.
//!
//! [`WorkoutController`] owns the live session and its rest timer. Nothing
//! else holds the session mutably; every interaction goes through the
//! controller, one discrete step at a time.
//!
//! Lifecycle:
//! - Building: a [`Session`] is produced by [`crate::builder`] and handed to
//!   [`WorkoutController::begin`]
//! - Active: Running or Paused (pausing also stops the rest timer)
//! - Finalizing: [`WorkoutController::complete`] writes the log; on failure
//!   the session stays Active so the user can retry
//! - Persisted or Discarded: the live session is gone and its rest timer
//!   schedule released

use crate::collaborators::{Feedback, WorkoutLogStore};
use crate::finalizer::finalize;
use crate::rest_timer::{RestTick, RestTimer, RestTimerState};
use crate::schedule::ScheduleRegistry;
use crate::tracker::{self, Direction, MetricsPatch};
use crate::{builder, Error, Exercise, PersistedLog, Result, Session};
use chrono::{DateTime, Utc};

/// Where the controller is in the session lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkoutPhase {
    /// No live session
    Idle,
    Running,
    Paused,
}

/// A session in progress together with its rest countdown
#[derive(Debug)]
struct LiveWorkout {
    session: Session,
    rest: RestTimer,
}

impl LiveWorkout {
    /// A paused workout never has a rest countdown running
    fn hold_rest_while_paused(&mut self) {
        if self.session.clock.is_paused() && self.rest.stop() {
            tracing::debug!("Rest not started while workout is paused");
        }
    }
}

/// Orchestrates one live workout at a time
#[derive(Debug)]
pub struct WorkoutController {
    user_id: Option<String>,
    registry: ScheduleRegistry,
    weight_increment: f64,
    live: Option<LiveWorkout>,
}

impl WorkoutController {
    /// `user_id` of `None` means nobody is signed in; workouts can be
    /// tracked but not saved.
    pub fn new(user_id: Option<String>) -> Self {
        Self::with_registry(user_id, ScheduleRegistry::new())
    }

    pub fn with_registry(user_id: Option<String>, registry: ScheduleRegistry) -> Self {
        Self {
            user_id: user_id.filter(|id| !id.trim().is_empty()),
            registry,
            weight_increment: tracker::DEFAULT_WEIGHT_INCREMENT,
            live: None,
        }
    }

    pub fn with_weight_increment(mut self, increment: f64) -> Self {
        if increment.is_finite() && increment > 0.0 {
            self.weight_increment = increment;
        }
        self
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Make `session` the live workout, discarding any previous one
    pub fn begin(&mut self, session: Session) {
        if let Some(previous) = self.live.take() {
            tracing::warn!("Discarding unfinished session {} for a new one", previous.session.id);
        }
        tracing::info!("Workout '{}' started ({})", session.name, session.id);
        self.live = Some(LiveWorkout {
            session,
            rest: RestTimer::new(self.registry.clone()),
        });
    }

    pub fn session(&self) -> Option<&Session> {
        self.live.as_ref().map(|l| &l.session)
    }

    pub fn phase(&self) -> WorkoutPhase {
        match &self.live {
            None => WorkoutPhase::Idle,
            Some(l) if l.session.clock.is_paused() => WorkoutPhase::Paused,
            Some(_) => WorkoutPhase::Running,
        }
    }

    pub fn rest_state(&self) -> RestTimerState {
        self.live
            .as_ref()
            .map(|l| l.rest.state())
            .unwrap_or_default()
    }

    /// Elapsed workout time in seconds, or `None` with no live session
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<u64> {
        self.session().map(|s| s.clock.elapsed(now))
    }

    fn live_mut(&mut self) -> Result<&mut LiveWorkout> {
        self.live.as_mut().ok_or(Error::NoActiveSession)
    }

    // ------------------------------------------------------------------
    // Set tracking
    // ------------------------------------------------------------------

    pub fn toggle_set(&mut self, ex_idx: usize, set_idx: usize, now: DateTime<Utc>) -> Result<Option<bool>> {
        let live = self.live_mut()?;
        let toggled = tracker::toggle_completion(&mut live.session, ex_idx, set_idx, &mut live.rest, now);
        live.hold_rest_while_paused();
        Ok(toggled)
    }

    pub fn update_set(&mut self, ex_idx: usize, set_idx: usize, patch: &MetricsPatch) -> Result<bool> {
        let live = self.live_mut()?;
        Ok(tracker::update_metrics(&mut live.session, ex_idx, set_idx, patch))
    }

    pub fn step_reps(&mut self, ex_idx: usize, set_idx: usize, delta: i32) -> Result<Option<u32>> {
        let live = self.live_mut()?;
        Ok(tracker::step_reps(&mut live.session, ex_idx, set_idx, delta))
    }

    /// Step weight by `steps` multiples of the configured increment
    pub fn step_weight(&mut self, ex_idx: usize, set_idx: usize, steps: i32) -> Result<Option<f64>> {
        let increment = self.weight_increment;
        let live = self.live_mut()?;
        Ok(tracker::step_weight(&mut live.session, ex_idx, set_idx, steps, increment))
    }

    pub fn add_set(&mut self, ex_idx: usize) -> Result<Option<u32>> {
        let live = self.live_mut()?;
        Ok(tracker::add_set(&mut live.session, ex_idx))
    }

    pub fn navigate(&mut self, direction: Direction, now: DateTime<Utc>) -> Result<bool> {
        let live = self.live_mut()?;
        let moved = tracker::navigate(&mut live.session, direction, &mut live.rest, now);
        live.hold_rest_while_paused();
        Ok(moved)
    }

    /// Point the set cursor at `set_idx` within the current exercise
    pub fn focus_set(&mut self, set_idx: usize) -> Result<bool> {
        let live = self.live_mut()?;
        let in_range = live
            .session
            .current_exercise()
            .is_some_and(|e| set_idx < e.sets.len());
        if in_range {
            live.session.current_set_index = set_idx;
        }
        Ok(in_range)
    }

    pub fn add_exercise(&mut self, exercise: &Exercise, rest_time: Option<u32>) -> Result<usize> {
        let live = self.live_mut()?;
        Ok(builder::add_exercise(&mut live.session, exercise, rest_time))
    }

    pub fn substitute_exercise(&mut self, ex_idx: usize, replacement: &Exercise) -> Result<bool> {
        let live = self.live_mut()?;
        Ok(builder::substitute_exercise(&mut live.session, ex_idx, replacement))
    }

    /// Apply history that arrived after the session started
    pub fn refresh_weights(&mut self, logs: &[PersistedLog]) -> Result<usize> {
        let live = self.live_mut()?;
        Ok(builder::refresh_weights(&mut live.session, logs))
    }

    // ------------------------------------------------------------------
    // Rest timer
    // ------------------------------------------------------------------

    /// Advance the rest countdown to `now`; call from the host loop
    pub fn poll_rest(&mut self, now: DateTime<Utc>) -> RestTick {
        match self.live.as_mut() {
            Some(live) => live.rest.poll(now),
            None => RestTick::Idle,
        }
    }

    pub fn edit_rest(&mut self, seconds: u32) -> Result<bool> {
        Ok(self.live_mut()?.rest.edit(seconds))
    }

    pub fn skip_rest(&mut self) -> Result<bool> {
        Ok(self.live_mut()?.rest.stop())
    }

    // ------------------------------------------------------------------
    // Pause / resume
    // ------------------------------------------------------------------

    /// Freeze the workout clock and cancel any rest countdown
    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<bool> {
        let live = self.live_mut()?;
        let paused = live.session.clock.pause(now);
        if paused {
            live.rest.stop();
            tracing::info!("Workout paused");
        }
        Ok(paused)
    }

    /// Restart the workout clock; the rest countdown stays stopped
    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<bool> {
        let live = self.live_mut()?;
        let resumed = live.session.clock.resume(now);
        if resumed {
            tracing::info!("Workout resumed");
        }
        Ok(resumed)
    }

    // ------------------------------------------------------------------
    // Finalize / cancel
    // ------------------------------------------------------------------

    /// Finish the workout, save it, and show the summary
    ///
    /// Returns `Ok(None)` without doing anything when no user is signed in.
    /// A failed save returns [`Error::Persistence`] and keeps the session
    /// live so `complete` can be called again.
    pub fn complete(
        &mut self,
        store: &mut impl WorkoutLogStore,
        feedback: &mut impl Feedback,
        now: DateTime<Utc>,
    ) -> Result<Option<PersistedLog>> {
        let Some(user_id) = self.user_id.clone() else {
            tracing::warn!("Refusing to finish workout: no signed-in user");
            return Ok(None);
        };
        let live = self.live.as_ref().ok_or(Error::NoActiveSession)?;

        let log = finalize(&live.session, &user_id, now);

        if let Err(e) = store.save_workout_log(&log) {
            tracing::warn!("Saving workout {} failed, keeping session: {}", log.id, e);
            return Err(Error::Persistence(e.to_string()));
        }

        tracing::info!(
            "Workout {} saved: {} sets, volume {:.1}",
            log.id,
            log.set_count(),
            log.total_volume
        );
        self.live = None;
        feedback.present(&log);
        Ok(Some(log))
    }

    /// Throw the live workout away without saving anything
    pub fn cancel(&mut self) -> bool {
        match self.live.take() {
            Some(live) => {
                tracing::info!("Workout {} discarded", live.session.id);
                true
            }
            None => false,
        }
    }
}
