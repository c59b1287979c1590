#![forbid(unsafe_code)]

//! Core domain model and business logic for the Lift workout tracker.
//!
//! This crate provides:
//! - Domain types (exercises, routines, live sessions, finished logs)
//! - Session building with weight carryover
//! - Set tracking, rest countdown and the pause-aware workout clock
//! - Finalization into immutable logs
//! - Persistence (JSONL log store, session snapshots, CSV export)

pub mod types;
pub mod error;
pub mod catalog;
pub mod collaborators;
pub mod config;
pub mod logging;
pub mod clock;
pub mod schedule;
pub mod rest_timer;
pub mod builder;
pub mod tracker;
pub mod finalizer;
pub mod controller;
pub mod store;
pub mod snapshot;
pub mod export;
pub mod history;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use collaborators::{ExerciseCatalog, Feedback, WorkoutHistory, WorkoutLogStore};
pub use config::Config;
pub use clock::DurationClock;
pub use rest_timer::{RestTick, RestTimer, RestTimerState};
pub use tracker::{Direction, MetricsPatch};
pub use controller::{WorkoutController, WorkoutPhase};
pub use store::JsonlLogStore;
pub use history::load_recent_logs;
