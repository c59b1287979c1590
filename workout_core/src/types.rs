//! Core domain types for the workout session engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises and the catalog they live in
//! - Routine templates (blocks of prescribed exercises and sets)
//! - The live session being trained
//! - The immutable log a finished session turns into

use crate::clock::DurationClock;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// ============================================================================
// Exercise Types
// ============================================================================

/// How demanding an exercise is to perform well
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// Muscle groups worked by an exercise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MuscleGroups {
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
}

/// An exercise definition (e.g., "Barbell Bench Press")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub muscle_groups: MuscleGroups,
    pub equipment: Vec<String>,
    pub difficulty: Difficulty,
}

// ============================================================================
// Routine Template Types
// ============================================================================

/// Kind of set within an exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SetType {
    #[default]
    Normal,
    Warmup,
    Drop,
    Failure,
}

/// A single set as written in a routine template
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct PrescribedSet {
    #[serde(default)]
    pub set_type: SetType,
    pub reps: Option<u32>,
    pub weight: Option<f64>,
    pub duration: Option<u32>,
    pub distance: Option<f64>,
}

/// An exercise prescription inside a routine block
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PrescribedExercise {
    pub exercise_id: String,
    pub sets: Vec<PrescribedSet>,
    /// Rest between sets, in seconds
    pub rest_time: Option<u32>,
    pub notes: Option<String>,
}

/// A group of exercises trained together in one session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RoutineBlock {
    pub name: String,
    pub exercises: Vec<PrescribedExercise>,
}

/// A reusable workout template
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Routine {
    pub id: String,
    pub name: String,
    pub blocks: Vec<RoutineBlock>,
}

// ============================================================================
// Live Session Types
// ============================================================================

/// One set being tracked in a live session
///
/// `set_number` is always the set's position in its exercise plus one.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct SessionSet {
    pub set_number: u32,
    pub set_type: SetType,
    pub target_reps: Option<u32>,
    pub target_weight: Option<f64>,
    pub target_duration: Option<u32>,
    pub target_distance: Option<f64>,
    pub completed: bool,
    pub completed_reps: Option<u32>,
    pub completed_weight: Option<f64>,
    pub completed_duration: Option<u32>,
    pub completed_distance: Option<f64>,
    pub rpe: Option<u8>,
}

impl SessionSet {
    /// An empty, not-yet-completed set at the given position
    pub fn new(set_number: u32, set_type: SetType) -> Self {
        Self {
            set_number,
            set_type,
            ..Self::default()
        }
    }

    /// Build a set from its template, with an already-resolved target weight
    pub fn from_prescription(
        set_number: u32,
        prescribed: &PrescribedSet,
        target_weight: Option<f64>,
    ) -> Self {
        Self {
            set_number,
            set_type: prescribed.set_type,
            target_reps: prescribed.reps,
            target_weight,
            target_duration: prescribed.duration,
            target_distance: prescribed.distance,
            ..Self::default()
        }
    }
}

/// One exercise being trained in a live session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionExercise {
    pub exercise_id: String,
    pub name: String,
    pub order_index: usize,
    pub sets: Vec<SessionSet>,
    /// Rest between sets, in seconds
    pub rest_time: Option<u32>,
    pub notes: Option<String>,
}

/// The live, in-memory workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Session {
    /// Stable identifier, reused as the id of the finished log
    pub id: Uuid,
    pub routine_id: Option<String>,
    pub name: String,
    pub exercises: Vec<SessionExercise>,
    pub current_exercise_index: usize,
    pub current_set_index: usize,
    pub clock: DurationClock,
}

impl Session {
    /// Start an empty session at `now`
    pub fn new(name: impl Into<String>, routine_id: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            routine_id,
            name: name.into(),
            exercises: Vec::new(),
            current_exercise_index: 0,
            current_set_index: 0,
            clock: DurationClock::start(now),
        }
    }

    pub fn current_exercise(&self) -> Option<&SessionExercise> {
        self.exercises.get(self.current_exercise_index)
    }

    pub fn set(&self, ex_idx: usize, set_idx: usize) -> Option<&SessionSet> {
        self.exercises.get(ex_idx)?.sets.get(set_idx)
    }

    pub fn set_mut(&mut self, ex_idx: usize, set_idx: usize) -> Option<&mut SessionSet> {
        self.exercises.get_mut(ex_idx)?.sets.get_mut(set_idx)
    }

    /// Count of sets marked completed across all exercises
    pub fn completed_sets(&self) -> usize {
        self.exercises
            .iter()
            .flat_map(|e| e.sets.iter())
            .filter(|s| s.completed)
            .count()
    }

    pub fn total_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }
}

// ============================================================================
// Persisted Log Types
// ============================================================================

/// A completed set as stored in a finished log, with actual-or-target values resolved
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoggedSet {
    pub set_number: u32,
    pub set_type: SetType,
    pub reps: u32,
    pub weight: f64,
    pub duration: u32,
    pub distance: f64,
    pub rpe: Option<u8>,
}

/// One exercise inside a finished log
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoggedExercise {
    pub exercise_id: String,
    pub name: String,
    pub sets: Vec<LoggedSet>,
}

/// Immutable record of a finished workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PersistedLog {
    pub id: Uuid,
    pub user_id: String,
    pub routine_id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub exercises: Vec<LoggedExercise>,
    pub duration_seconds: u64,
    pub total_volume: f64,
    pub completed: bool,
}

impl PersistedLog {
    pub fn set_count(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }
}

// ============================================================================
// Catalog Type
// ============================================================================

/// The complete catalog of exercises and routine templates
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub exercises: HashMap<String, Exercise>,
    pub routines: HashMap<String, Routine>,
}
