use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use fitoras_core::calendar::{self, parse_date_key};
use fitoras_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fitoras")]
#[command(about = "Workout split planner and completion tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and cache the exercise catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },

    /// Create and edit workout splits
    Split {
        #[command(subcommand)]
        command: SplitCommand,
    },

    /// Manage split tags
    Tag {
        #[command(subcommand)]
        command: TagCommand,
    },

    /// Show the active split's plan and progress for a date
    Day {
        /// Date as YYYY-MM-DD (default: today, UTC)
        #[arg(long)]
        date: Option<String>,
    },

    /// Mark an exercise done, or undo it
    Toggle {
        exercise_id: String,

        /// Date as YYYY-MM-DD (default: today, UTC)
        #[arg(long)]
        date: Option<String>,
    },

    /// Month view of completed days
    Month {
        /// Any date in the month (default: today, UTC)
        #[arg(long)]
        date: Option<String>,
    },

    /// Streak and workout totals
    Stats,

    /// Write or inspect the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

#[derive(Subcommand)]
enum CatalogCommand {
    /// Fetch the catalog unless it is already cached
    Sync {
        /// Drop the cache and fetch again
        #[arg(long)]
        refresh: bool,
    },

    /// Filter the cached catalog
    Search {
        /// Free-text term matched against name, muscles and attributes
        #[arg(default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        force: String,
        #[arg(long, default_value = "")]
        mechanic: String,
        #[arg(long, default_value = "")]
        equipment: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value = "")]
        primary_muscle: String,
        #[arg(long, default_value = "")]
        secondary_muscle: String,
        /// Maximum rows to print
        #[arg(long, default_value_t = 25)]
        limit: usize,
    },

    /// Show one exercise
    Show { id: String },

    /// List values usable with the search filters
    Options,
}

#[derive(Subcommand)]
enum SplitCommand {
    /// Create a split with seven empty days
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },

    /// List splits, active first
    List,

    /// Show a split's week (default: the active split)
    Show { split: Option<String> },

    /// Delete a split
    Remove { split: String },

    /// Make a split the active one
    Activate { split: String },

    /// Rename a split
    Rename { split: String, name: String },

    /// Attach a tag to a split
    Tag { split: String, tag: String },

    /// Detach the tag from a split
    Untag { split: String },

    /// Add, remove or adjust planned exercises
    Exercise {
        #[command(subcommand)]
        command: ExerciseCommand,
    },

    /// Manage day groups
    Group {
        #[command(subcommand)]
        command: GroupCommand,
    },
}

#[derive(clap::Args)]
struct Target {
    /// Split id, id prefix or name
    #[arg(long)]
    split: String,

    /// Weekday (e.g. monday, tue)
    #[arg(long)]
    day: Weekday,

    /// Day group id; omit for the day's main list
    #[arg(long)]
    group: Option<String>,
}

#[derive(Subcommand)]
enum ExerciseCommand {
    /// Add a catalog exercise with 3 sets of 10
    Add {
        #[command(flatten)]
        target: Target,
        exercise_id: String,
    },

    /// Remove a planned exercise
    Remove {
        #[command(flatten)]
        target: Target,
        exercise_id: String,
    },

    /// Change sets or reps
    Set {
        #[command(flatten)]
        target: Target,
        exercise_id: String,
        /// "sets" or "reps"
        field: VolumeField,
        value: u32,
    },

    /// Move an exercise within its list
    Move {
        #[command(flatten)]
        target: Target,
        from: usize,
        to: usize,
    },
}

#[derive(Subcommand)]
enum GroupCommand {
    /// Add a group to one day
    Add {
        #[arg(long)]
        split: String,
        #[arg(long)]
        day: Weekday,
        name: String,
        #[arg(long, default_value = "#888888")]
        color: String,
    },

    /// Rename or recolour a group
    Update {
        #[arg(long)]
        split: String,
        #[arg(long)]
        day: Weekday,
        group: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },

    /// Delete a group and its exercises
    Remove {
        #[arg(long)]
        split: String,
        #[arg(long)]
        day: Weekday,
        group: String,
    },
}

#[derive(Subcommand)]
enum TagCommand {
    /// Create a tag
    Add {
        name: String,
        #[arg(long, default_value = "#888888")]
        color: String,
    },

    /// List tags
    List,

    /// Delete a tag and detach it from every split
    Remove { tag: String },
}

#[tokio::main]
async fn main() {
    fitoras_core::logging::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Runs before loading so a broken file can be replaced
    if let Commands::Config {
        command: ConfigCommand::Init { force },
    } = cli.command
    {
        return cmd_config_init(cli.data_dir, force);
    }

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);
    let mut app = App::open_dir(&data_dir, &config)?;

    match cli.command {
        Commands::Catalog { command } => cmd_catalog(&mut app, &config, command).await,
        Commands::Split { command } => cmd_split(&mut app, command),
        Commands::Tag { command } => cmd_tag(&mut app, command),
        Commands::Day { date } => cmd_day(&app, parse_date(date.as_deref())?),
        Commands::Toggle { exercise_id, date } => {
            let date = parse_date(date.as_deref())?;
            let done = app.toggle_exercise(date, &exercise_id);
            let state = if done { "done" } else { "not done" };
            println!("{} marked {} on {}", exercise_id, state, calendar::date_key(date));
            Ok(())
        }
        Commands::Month { date } => cmd_month(&app, parse_date(date.as_deref())?),
        Commands::Stats => {
            let stats = app.stats(today());
            println!("Splits:          {}", stats.total_splits);
            println!("Current streak:  {} days", stats.current_streak);
            println!("This week:       {} workouts", stats.workouts_this_week);
            println!("Total workouts:  {}", stats.total_workouts);
            Ok(())
        }
        Commands::Config { .. } => {
            println!("Config file:  {}", Config::default_config_path().display());
            println!("Data dir:     {}", data_dir.display());
            println!("Catalog URL:  {}", config.catalog.url);
            println!("Timeout:      {}s", config.catalog.timeout_secs);
            println!("Cache key:    {}", config.catalog.cache_key);
            Ok(())
        }
    }
}

fn cmd_config_init(data_dir: Option<PathBuf>, force: bool) -> Result<()> {
    let path = Config::default_config_path();
    if path.exists() && !force {
        return Err(Error::Config(format!(
            "{} already exists; pass --force to overwrite",
            path.display()
        )));
    }

    let mut config = Config::default();
    if let Some(data_dir) = data_dir {
        config.data.data_dir = data_dir;
    }
    config.save()?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn parse_date(date: Option<&str>) -> Result<NaiveDate> {
    date.map(parse_date_key).unwrap_or_else(|| Ok(today()))
}

// ============================================================================
// Catalog
// ============================================================================

async fn cmd_catalog(app: &mut App, config: &Config, command: CatalogCommand) -> Result<()> {
    match command {
        CatalogCommand::Sync { refresh } => {
            if refresh {
                app.catalog.clear_cache()?;
            }
            let client = CatalogClient::new(&config.catalog)?;
            app.catalog.load(&client).await?;
            println!("Catalog ready: {} exercises", app.catalog.exercises().len());
        }
        CatalogCommand::Search {
            name,
            force,
            mechanic,
            equipment,
            category,
            primary_muscle,
            secondary_muscle,
            limit,
        } => {
            require_catalog(app)?;
            let criteria = FilterCriteria {
                name,
                force,
                mechanic,
                equipment,
                category,
                primary_muscle,
                secondary_muscle,
            };
            let matches = apply_filters(app.catalog.exercises(), &criteria);
            for exercise in matches.iter().take(limit) {
                println!(
                    "{:<40} {} [{}]",
                    exercise.id,
                    exercise.name,
                    exercise.primary_muscles.join(", ")
                );
            }
            println!("{} matching exercises", matches.len());
        }
        CatalogCommand::Show { id } => {
            require_catalog(app)?;
            let exercise = app
                .catalog
                .get(&id)
                .ok_or_else(|| Error::Other(format!("no exercise '{}' in catalog", id)))?;
            print_exercise(exercise);
        }
        CatalogCommand::Options => {
            require_catalog(app)?;
            let options = FilterOptions::from_exercises(app.catalog.exercises());
            println!("force:            {}", options.forces.join(", "));
            println!("level:            {}", options.levels.join(", "));
            println!("mechanic:         {}", options.mechanics.join(", "));
            println!("equipment:        {}", options.equipment.join(", "));
            println!("category:         {}", options.categories.join(", "));
            println!("primary muscle:   {}", options.primary_muscles.join(", "));
            println!("secondary muscle: {}", options.secondary_muscles.join(", "));
        }
    }
    Ok(())
}

fn require_catalog(app: &App) -> Result<()> {
    match app.catalog.state() {
        CatalogState::Ready => Ok(()),
        _ => Err(Error::Catalog(
            "catalog not cached yet; run `fitoras catalog sync`".into(),
        )),
    }
}

fn print_exercise(exercise: &Exercise) {
    println!("{} ({})", exercise.name, exercise.id);
    let fields = [
        ("Category", &exercise.category),
        ("Level", &exercise.level),
        ("Force", &exercise.force),
        ("Mechanic", &exercise.mechanic),
        ("Equipment", &exercise.equipment),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("  {:<10} {}", label, value);
        }
    }
    println!("  {:<10} {}", "Primary", exercise.primary_muscles.join(", "));
    println!("  {:<10} {}", "Secondary", exercise.secondary_muscles.join(", "));
    match &exercise.instructions {
        Instructions::Text(text) => println!("\n  {}", text),
        Instructions::Steps(steps) => {
            println!();
            for (i, step) in steps.iter().enumerate() {
                println!("  {}. {}", i + 1, step);
            }
        }
    }
}

// ============================================================================
// Splits
// ============================================================================

/// Resolve a split by id, unique id prefix, or exact name
fn resolve_split(app: &App, reference: &str) -> Result<String> {
    let splits = app.splits.splits();
    if let Some(split) = splits.iter().find(|s| s.id == reference) {
        return Ok(split.id.clone());
    }

    let by_prefix: Vec<&Split> = splits.iter().filter(|s| s.id.starts_with(reference)).collect();
    if by_prefix.len() == 1 {
        return Ok(by_prefix[0].id.clone());
    }

    let by_name: Vec<&Split> = splits.iter().filter(|s| s.name == reference).collect();
    match by_name.len() {
        1 => Ok(by_name[0].id.clone()),
        0 => Err(Error::Other(format!("no split matches '{}'", reference))),
        _ => Err(Error::Other(format!("'{}' matches several splits; use the id", reference))),
    }
}

fn cmd_split(app: &mut App, command: SplitCommand) -> Result<()> {
    match command {
        SplitCommand::Add { name, description } => {
            let split = app.splits.add_split(SplitDraft { name, description })?;
            println!("Created split {} ({})", split.name, split.id);
        }
        SplitCommand::List => {
            if app.splits.splits().is_empty() {
                println!("No splits yet. Create one with `fitoras split add <name>`.");
            }
            for (i, split) in app.splits.splits().iter().enumerate() {
                let marker = if i == 0 { "*" } else { " " };
                let tag = split
                    .category
                    .as_ref()
                    .map(|t| format!(" #{}", t.name))
                    .unwrap_or_default();
                println!(
                    "{} {}  {}{}  ({} exercises)",
                    marker,
                    split.id,
                    split.name,
                    tag,
                    split.exercise_count()
                );
            }
        }
        SplitCommand::Show { split } => {
            let split = match split {
                Some(reference) => {
                    let id = resolve_split(app, &reference)?;
                    app.splits.get(&id).cloned()
                }
                None => app.active_split().cloned(),
            };
            match split {
                Some(split) => print_split(&split),
                None => println!("No splits yet."),
            }
        }
        SplitCommand::Remove { split } => {
            let id = resolve_split(app, &split)?;
            app.splits.remove_split(&id);
            println!("Removed split {}", id);
        }
        SplitCommand::Activate { split } => {
            let id = resolve_split(app, &split)?;
            app.splits.activate(&id);
            println!("Active split is now {}", id);
        }
        SplitCommand::Rename { split, name } => {
            let id = resolve_split(app, &split)?;
            app.splits.update_split(
                &id,
                SplitPatch {
                    name: Some(name),
                    ..SplitPatch::default()
                },
            )?;
            println!("Renamed split {}", id);
        }
        SplitCommand::Tag { split, tag } => {
            let id = resolve_split(app, &split)?;
            let tag = resolve_tag(app, &tag)?;
            app.splits.update_split(
                &id,
                SplitPatch {
                    category: Some(Some(tag.clone())),
                    ..SplitPatch::default()
                },
            )?;
            println!("Tagged split {} with {}", id, tag.name);
        }
        SplitCommand::Untag { split } => {
            let id = resolve_split(app, &split)?;
            app.splits.update_split(
                &id,
                SplitPatch {
                    category: Some(None),
                    ..SplitPatch::default()
                },
            )?;
            println!("Removed tag from split {}", id);
        }
        SplitCommand::Exercise { command } => cmd_exercise(app, command)?,
        SplitCommand::Group { command } => cmd_group(app, command)?,
    }
    Ok(())
}

/// Apply an edit and report whether the split actually changed.
///
/// Stale day, group or exercise references make the editor return the
/// split untouched.
fn edit_split<F>(app: &mut App, id: &str, f: F) -> Result<bool>
where
    F: FnOnce(&Split) -> Result<Split>,
{
    let before = app.splits.get(id).cloned();
    let after = app.splits.edit(id, f)?;
    Ok(after.is_some() && after != before)
}

fn report(changed: bool, message: String) {
    if changed {
        println!("{}", message);
    } else {
        println!("Nothing changed");
    }
}

fn cmd_exercise(app: &mut App, command: ExerciseCommand) -> Result<()> {
    match command {
        ExerciseCommand::Add { target, exercise_id } => {
            require_catalog(app)?;
            let id = resolve_split(app, &target.split)?;
            let exercise = app
                .catalog
                .get(&exercise_id)
                .cloned()
                .ok_or_else(|| Error::Other(format!("no exercise '{}' in catalog", exercise_id)))?;
            app.splits.edit(&id, |s| {
                editor::add_exercise(s, target.day, target.group.as_deref(), &exercise)
            })?;
            println!("Added {} to {}", exercise.name, target.day);
        }
        ExerciseCommand::Remove { target, exercise_id } => {
            let id = resolve_split(app, &target.split)?;
            let changed = edit_split(app, &id, |s| {
                editor::remove_exercise(s, target.day, target.group.as_deref(), &exercise_id)
            })?;
            report(changed, format!("Removed {} from {}", exercise_id, target.day));
        }
        ExerciseCommand::Set {
            target,
            exercise_id,
            field,
            value,
        } => {
            let id = resolve_split(app, &target.split)?;
            let changed = edit_split(app, &id, |s| {
                editor::change_sets_reps(
                    s,
                    target.day,
                    target.group.as_deref(),
                    &exercise_id,
                    field,
                    value,
                )
            })?;
            report(changed, format!("Updated {} on {}", exercise_id, target.day));
        }
        ExerciseCommand::Move { target, from, to } => {
            let id = resolve_split(app, &target.split)?;
            let changed = edit_split(app, &id, |s| {
                editor::reorder_exercises(s, target.day, target.group.as_deref(), from, to)
            })?;
            report(changed, format!("Reordered {}", target.day));
        }
    }
    Ok(())
}

fn cmd_group(app: &mut App, command: GroupCommand) -> Result<()> {
    match command {
        GroupCommand::Add {
            split,
            day,
            name,
            color,
        } => {
            let id = resolve_split(app, &split)?;
            let updated = app
                .splits
                .edit(&id, |s| editor::add_day_group(s, day, &name, &color))?;
            if let Some(group) = updated
                .as_ref()
                .and_then(|s| s.day(day))
                .and_then(|d| d.groups.last())
            {
                println!("Created group {} ({}) on {}", group.name, group.id, day);
            }
        }
        GroupCommand::Update {
            split,
            day,
            group,
            name,
            color,
        } => {
            let id = resolve_split(app, &split)?;
            let patch = LabelPatch { name, color };
            let changed = edit_split(app, &id, |s| editor::update_day_group(s, day, &group, &patch))?;
            report(changed, format!("Updated group {}", group));
        }
        GroupCommand::Remove { split, day, group } => {
            let id = resolve_split(app, &split)?;
            let changed = edit_split(app, &id, |s| editor::delete_day_group(s, day, &group))?;
            report(changed, format!("Removed group {} from {}", group, day));
        }
    }
    Ok(())
}

fn print_split(split: &Split) {
    println!("{} ({})", split.name, split.id);
    if let Some(description) = &split.description {
        println!("  {}", description);
    }
    if let Some(tag) = &split.category {
        println!("  tag: {} {}", tag.name, tag.color);
    }
    for day in &split.days {
        println!("\n{}", day.day);
        if day.exercises.is_empty() && day.groups.is_empty() {
            println!("  rest");
        }
        for exercise in &day.exercises {
            print_planned(exercise, "  ");
        }
        for group in &day.groups {
            println!("  [{}] {} ({})", group.color, group.name, group.id);
            for exercise in &group.exercises {
                print_planned(exercise, "    ");
            }
        }
    }
}

fn print_planned(exercise: &SplitExercise, indent: &str) {
    println!(
        "{}{} ({}) {}x{}",
        indent,
        exercise.exercise.name,
        exercise.id(),
        exercise.sets.unwrap_or(0),
        exercise.reps.unwrap_or(0)
    );
}

// ============================================================================
// Tags
// ============================================================================

fn resolve_tag(app: &App, reference: &str) -> Result<SplitTag> {
    app.categories
        .tags()
        .iter()
        .find(|t| t.id == reference || t.name == reference)
        .cloned()
        .ok_or_else(|| Error::Other(format!("no tag matches '{}'", reference)))
}

fn cmd_tag(app: &mut App, command: TagCommand) -> Result<()> {
    match command {
        TagCommand::Add { name, color } => {
            let tag = app.categories.add_category(SplitTagDraft { name, color })?;
            println!("Created tag {} ({})", tag.name, tag.id);
        }
        TagCommand::List => {
            for tag in app.categories.tags() {
                println!("{}  {}  {}", tag.id, tag.name, tag.color);
            }
        }
        TagCommand::Remove { tag } => {
            let tag = resolve_tag(app, &tag)?;
            app.remove_category(&tag.id);
            println!("Removed tag {}", tag.name);
        }
    }
    Ok(())
}

// ============================================================================
// Calendar
// ============================================================================

fn cmd_day(app: &App, date: NaiveDate) -> Result<()> {
    let summary = app.day_summary(date);
    println!("{} {}: {:.0}% complete", summary.weekday, summary.date, summary.percentage);
    if summary.exercises.is_empty() {
        println!("  Nothing scheduled.");
    }
    for exercise in &summary.exercises {
        let check = if exercise.completed { "x" } else { " " };
        println!(
            "  [{}] {} ({}) {}x{}",
            check,
            exercise.name,
            exercise.id,
            exercise.sets.unwrap_or(0),
            exercise.reps.unwrap_or(0)
        );
    }
    Ok(())
}

fn cmd_month(app: &App, date: NaiveDate) -> Result<()> {
    println!("{}", date.format("%B %Y"));
    println!(" Mo  Tu  We  Th  Fr  Sa  Su");

    let cells = calendar::month_grid(date);
    for row in cells.chunks(7) {
        let line: Vec<String> = row
            .iter()
            .map(|cell| match cell {
                None => "    ".to_string(),
                Some(day) => {
                    let summary = app.day_summary(*day);
                    let mark = if summary.fully_completed {
                        '*'
                    } else if summary.percentage > 0.0 {
                        '+'
                    } else {
                        ' '
                    };
                    format!("{:>3}{}", day.day(), mark)
                }
            })
            .collect();
        println!("{}", line.join("").trim_end());
    }
    println!("\n* all done   + partly done");
    Ok(())
}
