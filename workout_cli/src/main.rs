use chrono::Utc;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use workout_core::snapshot::clear_snapshot;
use workout_core::*;

#[derive(Parser)]
#[command(name = "lift")]
#[command(about = "Workout session tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override the signed-in user id
    #[arg(long, global = true)]
    user: Option<String>,

    /// Show debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a workout, from a routine or freeform
    Start {
        /// Routine id (see `lift routines`); omit for a freeform workout
        #[arg(long)]
        routine: Option<String>,

        /// Auto-complete (for testing) - mark every set done and finish
        #[arg(long)]
        auto_complete: bool,

        /// Dry run - show the built session without starting it
        #[arg(long)]
        dry_run: bool,
    },

    /// Continue an unfinished workout
    Resume {
        /// Auto-complete (for testing) - mark every set done and finish
        #[arg(long)]
        auto_complete: bool,
    },

    /// List built-in routines (default)
    Routines,

    /// Suggest substitutes for an exercise
    Similar {
        exercise_id: String,

        /// Maximum number of suggestions
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show recent workouts
    History {
        /// How many days back to look
        #[arg(long, default_value_t = 30)]
        days: i64,
    },

    /// Export all workouts to CSV
    Export {
        /// Output file
        #[arg(long)]
        out: PathBuf,
    },
}

/// Everything a command needs beyond its own arguments
struct AppContext {
    config: Config,
    user_id: Option<String>,
    store: JsonlLogStore,
    snapshot_path: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        workout_core::logging::init_with_level("debug");
    } else {
        workout_core::logging::init();
    }

    let mut config = Config::load()?;
    if let Some(dir) = cli.data_dir {
        config.data.data_dir = dir;
    }
    let user_id = cli
        .user
        .unwrap_or_else(|| config.user.id.clone())
        .trim()
        .to_string();

    tracing::debug!(
        "Data dir {:?}, user {:?}",
        config.data.data_dir,
        user_id
    );

    let ctx = AppContext {
        user_id: (!user_id.is_empty()).then_some(user_id),
        store: JsonlLogStore::new(config.data.log_path()),
        snapshot_path: config.data.snapshot_path(),
        config,
    };

    match cli.command {
        Some(Commands::Start {
            routine,
            auto_complete,
            dry_run,
        }) => cmd_start(ctx, routine, auto_complete, dry_run),
        Some(Commands::Resume { auto_complete }) => cmd_resume(ctx, auto_complete),
        Some(Commands::Similar { exercise_id, limit }) => cmd_similar(&ctx, &exercise_id, limit),
        Some(Commands::History { days }) => cmd_history(&ctx, days),
        Some(Commands::Export { out }) => cmd_export(&ctx, &out),
        Some(Commands::Routines) | None => cmd_routines(),
    }
}

fn checked_catalog() -> Result<&'static Catalog> {
    let catalog = get_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }
    Ok(catalog)
}

fn cmd_start(
    mut ctx: AppContext,
    routine: Option<String>,
    auto_complete: bool,
    dry_run: bool,
) -> Result<()> {
    let catalog = checked_catalog()?;

    // An unreadable snapshot counts as no snapshot and gets replaced
    if !dry_run && Session::load_snapshot(&ctx.snapshot_path)?.is_some() {
        return Err(Error::Other(
            "An unfinished workout exists. Run `lift resume` to continue it.".into(),
        ));
    }

    let logs = match &ctx.user_id {
        Some(user) => ctx.store.get_workout_logs(user)?,
        None => Vec::new(),
    };

    let now = Utc::now();
    let session = match routine {
        Some(id) => {
            let routine = catalog
                .routines
                .get(&id)
                .ok_or_else(|| Error::Other(format!("Unknown routine: {}", id)))?;
            builder::build_from_routine(routine, catalog, &logs, now)
        }
        None => builder::build_freeform(now),
    };

    if dry_run {
        display_session(&session, None);
        println!("\n[Dry run - workout not started]");
        return Ok(());
    }

    let mut controller = WorkoutController::new(ctx.user_id.clone())
        .with_weight_increment(ctx.config.training.weight_increment);
    controller.begin(session);
    run_workout(&mut ctx, controller, catalog, auto_complete)
}

fn cmd_resume(mut ctx: AppContext, auto_complete: bool) -> Result<()> {
    let catalog = checked_catalog()?;

    let Some(session) = Session::load_snapshot(&ctx.snapshot_path)? else {
        println!("No unfinished workout to resume.");
        return Ok(());
    };

    println!("Resuming '{}'", session.name);
    let mut controller = WorkoutController::new(ctx.user_id.clone())
        .with_weight_increment(ctx.config.training.weight_increment);
    controller.begin(session);
    // Suspended workouts are stored paused
    controller.resume(Utc::now())?;

    // History may have grown since the snapshot was taken
    if let Some(user) = &ctx.user_id {
        let logs = ctx.store.get_workout_logs(user)?;
        controller.refresh_weights(&logs)?;
    }

    run_workout(&mut ctx, controller, catalog, auto_complete)
}

fn cmd_routines() -> Result<()> {
    let catalog = checked_catalog()?;

    println!("Routines:");
    for routine in catalog.routines_sorted() {
        let exercises = routine.blocks.first().map_or(0, |b| b.exercises.len());
        println!("  {:<18} {} ({} exercises)", routine.id, routine.name, exercises);
    }
    println!();
    println!("Start one with: lift start --routine <id>");
    Ok(())
}

fn cmd_similar(ctx: &AppContext, exercise_id: &str, limit: Option<usize>) -> Result<()> {
    let catalog = checked_catalog()?;

    let Some(exercise) = catalog.get_exercise_by_id(exercise_id) else {
        println!("Unknown exercise: {}", exercise_id);
        return Ok(());
    };

    let limit = limit.unwrap_or(ctx.config.training.similar_limit);
    println!("Alternatives to {}:", exercise.name);
    print_similar(catalog, exercise_id, limit);
    Ok(())
}

fn cmd_history(ctx: &AppContext, days: i64) -> Result<()> {
    let Some(user) = &ctx.user_id else {
        println!("No user configured - nothing to show.");
        return Ok(());
    };

    let logs = load_recent_logs(&ctx.store, user, days, Utc::now())?;
    if logs.is_empty() {
        println!("No workouts in the last {} days.", days);
        return Ok(());
    }

    for log in &logs {
        println!(
            "{}  {:<20} {:>3} sets  {:>8.1} volume  {}",
            log.date,
            log.name,
            log.set_count(),
            log.total_volume,
            format_duration(log.duration_seconds)
        );
    }
    Ok(())
}

fn cmd_export(ctx: &AppContext, out: &Path) -> Result<()> {
    let Some(user) = &ctx.user_id else {
        println!("No user configured - nothing to export.");
        return Ok(());
    };

    let logs = ctx.store.get_workout_logs(user)?;
    let count = workout_core::export::export_logs_csv(&logs, out)?;

    println!("✓ Exported {} sets from {} workouts", count, logs.len());
    println!("  CSV: {}", out.display());
    Ok(())
}

// ============================================================================
// Interactive workout loop
// ============================================================================

/// Summary printed once a workout is saved
struct TerminalFeedback;

impl Feedback for TerminalFeedback {
    fn present(&mut self, log: &PersistedLog) {
        println!("\n╭─────────────────────────────────────────╮");
        println!("│  WORKOUT COMPLETE");
        println!("╰─────────────────────────────────────────╯");
        println!("  {}", log.name);
        println!("  Duration: {}", format_duration(log.duration_seconds));
        println!("  Sets:     {}", log.set_count());
        println!("  Volume:   {:.1}", log.total_volume);
        for exercise in log.exercises.iter().filter(|e| !e.sets.is_empty()) {
            println!("  → {}: {} sets", exercise.name, exercise.sets.len());
        }
        println!("\n✓ Workout saved!");
    }
}

#[derive(Debug, PartialEq)]
enum Action {
    Status,
    ToggleCurrent,
    Toggle(usize),
    Reps(u32),
    Weight(f64),
    Rpe(u8),
    StepReps(i32),
    StepWeight(i32),
    AddSet,
    AddExercise(String),
    Substitute(String),
    Similar,
    Next,
    Previous,
    Pause,
    Resume,
    EditRest(u32),
    SkipRest,
    Finish,
    Cancel,
    Help,
}

fn parse_action(line: &str) -> Option<Action> {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or("").to_lowercase();
    let arg = parts.next();

    let action = match (command.as_str(), arg) {
        ("", _) | ("s", _) | ("status", _) => Action::Status,
        ("d", None) | ("done", None) => Action::ToggleCurrent,
        ("t", Some(n)) => Action::Toggle(n.parse().ok().filter(|n: &usize| *n > 0)?),
        ("r", Some(n)) => Action::Reps(n.parse().ok()?),
        ("w", Some(x)) => Action::Weight(x.parse().ok().filter(|x: &f64| x.is_finite())?),
        ("rpe", Some(n)) => Action::Rpe(n.parse().ok()?),
        ("+r", None) => Action::StepReps(1),
        ("-r", None) => Action::StepReps(-1),
        ("+w", None) => Action::StepWeight(1),
        ("-w", None) => Action::StepWeight(-1),
        ("a", None) | ("add", None) => Action::AddSet,
        ("x", Some(id)) => Action::AddExercise(id.to_string()),
        ("sub", Some(id)) => Action::Substitute(id.to_string()),
        ("sim", None) => Action::Similar,
        ("n", None) | ("next", None) => Action::Next,
        ("p", None) | ("prev", None) => Action::Previous,
        ("pause", None) => Action::Pause,
        ("resume", None) => Action::Resume,
        ("rest", Some(n)) => Action::EditRest(n.parse().ok()?),
        ("skip", None) => Action::SkipRest,
        ("f", None) | ("finish", None) => Action::Finish,
        ("q", None) | ("quit", None) | ("cancel", None) => Action::Cancel,
        ("h", None) | ("help", None) | ("?", None) => Action::Help,
        _ => return None,
    };
    Some(action)
}

/// How the interactive loop ended
enum LoopExit {
    Saved,
    Discarded,
    Suspended,
}

fn run_workout(
    ctx: &mut AppContext,
    mut controller: WorkoutController,
    catalog: &Catalog,
    auto_complete: bool,
) -> Result<()> {
    if auto_complete {
        return auto_complete_workout(ctx, &mut controller);
    }

    if let Some(session) = controller.session() {
        display_session(session, None);
    }
    print_help();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    let exit = loop {
        let now = Utc::now();
        if controller.poll_rest(now) == RestTick::Finished {
            println!("⏰ Rest over - next set!");
        }
        print_prompt(&controller, now)?;

        let Some(line) = lines.next() else {
            break LoopExit::Suspended;
        };
        let line = line?;

        let Some(action) = parse_action(&line) else {
            println!("Unknown command: '{}' (h for help)", line.trim());
            continue;
        };

        match apply_action(ctx, &mut controller, catalog, action)? {
            Some(exit) => break exit,
            None => {
                if let Some(session) = controller.session() {
                    session.save_snapshot(&ctx.snapshot_path)?;
                }
            }
        }
    };

    match exit {
        LoopExit::Saved => clear_snapshot(&ctx.snapshot_path)?,
        LoopExit::Discarded => {
            clear_snapshot(&ctx.snapshot_path)?;
            println!("Workout discarded.");
        }
        LoopExit::Suspended => {
            suspend(ctx, &mut controller)?;
            println!("\nWorkout kept for later. Run `lift resume` to continue.");
        }
    }
    Ok(())
}

fn apply_action(
    ctx: &mut AppContext,
    controller: &mut WorkoutController,
    catalog: &Catalog,
    action: Action,
) -> Result<Option<LoopExit>> {
    let now = Utc::now();
    let (ex_idx, set_idx) = match controller.session() {
        Some(s) => (s.current_exercise_index, s.current_set_index),
        None => return Err(Error::NoActiveSession),
    };

    match action {
        Action::Status => {
            if let Some(session) = controller.session() {
                display_session(session, Some(controller.elapsed(now).unwrap_or(0)));
            }
        }
        Action::ToggleCurrent => match controller.toggle_set(ex_idx, set_idx, now)? {
            Some(true) => {
                println!("✓ Set {} done", set_idx + 1);
                controller.focus_set(set_idx + 1)?;
            }
            Some(false) => println!("Set {} marked not done", set_idx + 1),
            None => println!("No set to complete - add an exercise with `x <id>`"),
        },
        Action::Toggle(n) => match controller.toggle_set(ex_idx, n - 1, now)? {
            Some(done) => println!("Set {} {}", n, if done { "done" } else { "not done" }),
            None => println!("No set {}", n),
        },
        Action::Reps(reps) => {
            let patch = MetricsPatch { reps: Some(reps), ..Default::default() };
            report_update(controller.update_set(ex_idx, set_idx, &patch)?);
        }
        Action::Weight(weight) => {
            let patch = MetricsPatch { weight: Some(weight), ..Default::default() };
            report_update(controller.update_set(ex_idx, set_idx, &patch)?);
        }
        Action::Rpe(rpe) => {
            let patch = MetricsPatch { rpe: Some(rpe), ..Default::default() };
            report_update(controller.update_set(ex_idx, set_idx, &patch)?);
        }
        Action::StepReps(delta) => {
            if let Some(reps) = controller.step_reps(ex_idx, set_idx, delta)? {
                println!("Reps: {}", reps);
            }
        }
        Action::StepWeight(steps) => {
            if let Some(weight) = controller.step_weight(ex_idx, set_idx, steps)? {
                println!("Weight: {}", weight);
            }
        }
        Action::AddSet => match controller.add_set(ex_idx)? {
            Some(n) => println!("Added set {}", n),
            None => println!("No exercise selected"),
        },
        Action::AddExercise(id) => match catalog.get_exercise_by_id(&id) {
            Some(exercise) => {
                let rest = Some(ctx.config.training.default_rest_seconds);
                let idx = controller.add_exercise(exercise, rest)?;
                println!("Added {} as exercise {}", exercise.name, idx + 1);
            }
            None => println!("Unknown exercise: {}", id),
        },
        Action::Substitute(id) => match catalog.get_exercise_by_id(&id) {
            Some(exercise) => {
                if controller.substitute_exercise(ex_idx, exercise)? {
                    println!("Switched to {}", exercise.name);
                }
            }
            None => println!("Unknown exercise: {}", id),
        },
        Action::Similar => {
            let current = controller
                .session()
                .and_then(|s| s.current_exercise())
                .map(|e| e.exercise_id.clone());
            match current {
                Some(id) => print_similar(catalog, &id, ctx.config.training.similar_limit),
                None => println!("No exercise selected"),
            }
        }
        Action::Next | Action::Previous => {
            let direction = if action == Action::Next {
                Direction::Next
            } else {
                Direction::Previous
            };
            if controller.navigate(direction, now)? {
                if let Some(exercise) = controller.session().and_then(|s| s.current_exercise()) {
                    println!("→ {}", exercise.name);
                }
            } else {
                println!("No more exercises that way");
            }
        }
        Action::Pause => {
            if controller.pause(now)? {
                println!("⏸ Paused");
            }
        }
        Action::Resume => {
            if controller.resume(now)? {
                println!("▶ Resumed");
            }
        }
        Action::EditRest(seconds) => {
            if !controller.edit_rest(seconds)? {
                println!("No rest running");
            }
        }
        Action::SkipRest => {
            if controller.skip_rest()? {
                println!("Rest skipped");
            }
        }
        Action::Finish => return finish(ctx, controller),
        Action::Cancel => {
            controller.cancel();
            return Ok(Some(LoopExit::Discarded));
        }
        Action::Help => print_help(),
    }

    Ok(None)
}

fn finish(ctx: &mut AppContext, controller: &mut WorkoutController) -> Result<Option<LoopExit>> {
    match controller.complete(&mut ctx.store, &mut TerminalFeedback, Utc::now()) {
        Ok(Some(_)) => Ok(Some(LoopExit::Saved)),
        Ok(None) => {
            println!("No signed-in user - set [user] id in config or pass --user to save.");
            Ok(None)
        }
        Err(Error::Persistence(msg)) => {
            eprintln!("Could not save workout: {}", msg);
            println!("Your sets are kept. Try `f` again.");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn auto_complete_workout(ctx: &mut AppContext, controller: &mut WorkoutController) -> Result<()> {
    let now = Utc::now();
    let pending: Vec<(usize, usize)> = controller
        .session()
        .map(|s| {
            s.exercises
                .iter()
                .enumerate()
                .flat_map(|(ex_idx, e)| {
                    e.sets
                        .iter()
                        .enumerate()
                        .filter(|(_, set)| !set.completed)
                        .map(move |(set_idx, _)| (ex_idx, set_idx))
                })
                .collect()
        })
        .unwrap_or_default();

    for (ex_idx, set_idx) in pending {
        controller.toggle_set(ex_idx, set_idx, now)?;
    }
    controller.skip_rest()?;

    match finish(ctx, controller)? {
        Some(_) => clear_snapshot(&ctx.snapshot_path),
        None => suspend(ctx, controller),
    }
}

/// Snapshot a workout the user is stepping away from
///
/// The clock is paused first so time away is not counted.
fn suspend(ctx: &AppContext, controller: &mut WorkoutController) -> Result<()> {
    if controller.session().is_none() {
        return Ok(());
    }
    controller.pause(Utc::now())?;
    if let Some(session) = controller.session() {
        session.save_snapshot(&ctx.snapshot_path)?;
    }
    Ok(())
}

// ============================================================================
// Display helpers
// ============================================================================

fn report_update(updated: bool) {
    if updated {
        println!("Updated");
    } else {
        println!("No set selected");
    }
}

fn format_duration(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn format_value<T: std::fmt::Display>(actual: Option<T>, target: Option<T>, unit: &str) -> Option<String> {
    match (actual, target) {
        (Some(a), _) => Some(format!("{}{}", a, unit)),
        (None, Some(t)) => Some(format!("({}{})", t, unit)),
        (None, None) => None,
    }
}

fn display_session(session: &Session, elapsed: Option<u64>) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", session.name.to_uppercase());
    println!("╰─────────────────────────────────────────╯");
    if let Some(elapsed) = elapsed {
        println!(
            "  Elapsed: {}   Sets: {}/{}",
            format_duration(elapsed),
            session.completed_sets(),
            session.total_sets()
        );
    }

    if session.exercises.is_empty() {
        println!("  (no exercises yet - add one with `x <exercise-id>`)");
        return;
    }

    for (i, exercise) in session.exercises.iter().enumerate() {
        let current = i == session.current_exercise_index;
        let done = exercise.sets.iter().filter(|s| s.completed).count();
        println!(
            "{} {}. {} [{}/{}]",
            if current { "▶" } else { " " },
            i + 1,
            exercise.name,
            done,
            exercise.sets.len()
        );
        if !current {
            continue;
        }
        if let Some(notes) = &exercise.notes {
            println!("      {}", notes);
        }
        for (j, set) in exercise.sets.iter().enumerate() {
            let details: Vec<String> = [
                format_value(set.completed_reps, set.target_reps, " reps"),
                format_value(set.completed_weight, set.target_weight, "kg"),
                format_value(set.completed_duration, set.target_duration, "s"),
                format_value(set.completed_distance, set.target_distance, "m"),
                set.rpe.map(|r| format!("RPE {}", r)),
            ]
            .into_iter()
            .flatten()
            .collect();
            println!(
                "    {} [{}] Set {} {:?}  {}",
                if j == session.current_set_index { ">" } else { " " },
                if set.completed { "x" } else { " " },
                set.set_number,
                set.set_type,
                details.join("  ")
            );
        }
    }
}

fn print_similar(catalog: &Catalog, exercise_id: &str, limit: usize) {
    let similar = catalog.find_similar_exercises(exercise_id, limit);
    if similar.is_empty() {
        println!("  (no similar exercises)");
    }
    for exercise in similar {
        println!(
            "  {:<24} {} [{:?}; {}]",
            exercise.id,
            exercise.name,
            exercise.difficulty,
            exercise.muscle_groups.primary.join(", ")
        );
    }
}

fn print_prompt(controller: &WorkoutController, now: chrono::DateTime<Utc>) -> Result<()> {
    let elapsed = format_duration(controller.elapsed(now).unwrap_or(0));
    let paused = if controller.phase() == WorkoutPhase::Paused { " ⏸" } else { "" };
    match controller.rest_state().remaining_seconds {
        Some(rest) => print!("[{}{} | rest {}s] > ", elapsed, paused, rest),
        None => print!("[{}{}] > ", elapsed, paused),
    }
    io::stdout().flush()?;
    Ok(())
}

fn print_help() {
    println!("─────────────────────────────────────────");
    println!("  d          toggle current set     t N     toggle set N");
    println!("  r N / w X  record reps / weight   rpe N   record effort (1-10)");
    println!("  +r -r +w -w  step reps / weight   a       add a set");
    println!("  n / p      next / previous        x ID    add exercise");
    println!("  sim        similar exercises      sub ID  swap exercise");
    println!("  rest N     change rest            skip    end rest now");
    println!("  pause / resume                    s       status");
    println!("  f          finish and save        q       discard workout");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_commands() {
        assert_eq!(parse_action("d"), Some(Action::ToggleCurrent));
        assert_eq!(parse_action(""), Some(Action::Status));
        assert_eq!(parse_action("  N "), Some(Action::Next));
        assert_eq!(parse_action("f"), Some(Action::Finish));
        assert_eq!(parse_action("q"), Some(Action::Cancel));
    }

    #[test]
    fn test_parse_commands_with_arguments() {
        assert_eq!(parse_action("t 3"), Some(Action::Toggle(3)));
        assert_eq!(parse_action("r 12"), Some(Action::Reps(12)));
        assert_eq!(parse_action("w 62.5"), Some(Action::Weight(62.5)));
        assert_eq!(parse_action("rpe 8"), Some(Action::Rpe(8)));
        assert_eq!(parse_action("rest 45"), Some(Action::EditRest(45)));
        assert_eq!(parse_action("x plank"), Some(Action::AddExercise("plank".into())));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(parse_action("t 0"), None);
        assert_eq!(parse_action("t"), None);
        assert_eq!(parse_action("r lots"), None);
        assert_eq!(parse_action("w NaN"), None);
        assert_eq!(parse_action("jump"), None);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "00:00");
        assert_eq!(format_duration(3725), "62:05");
    }
}
