//! # Dungeon Planner Entry Point
//!
//! Generates a dungeon graph, plans it, and prints the resulting level plan.

use clap::{Parser, ValueEnum};
use dungeon_planner::{
    generation::utils, ExternalArea, GenerationConfig, Generator, GridDungeonGenerator, GridIndex, LevelPlan,
    LevelPlanner, NavigationGrid, PlanEntrance, PlannerConfig, PlannerResult, SubLevelEntrance,
    Terrain, WorldPosition,
};
use log::{error, info, warn};
use std::path::PathBuf;

/// How the finished plan is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human readable listing
    Summary,
    /// The full plan as JSON
    Json,
}

/// Command line arguments for the dungeon planner.
#[derive(Parser, Debug)]
#[command(name = "dungeon-planner")]
#[command(about = "Plans dungeon levels from generated room graphs")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation and content draws
    #[arg(short, long)]
    seed: Option<u64>,

    /// Planner configuration file (JSON); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Generate small test-sized dungeons
    #[arg(long)]
    small: bool,

    /// Grow long winding layouts instead of compact ones
    #[arg(long)]
    winding: bool,

    /// Link a demo overworld staircase to the spawn room
    #[arg(long)]
    sub_level: bool,

    /// Print the default planner configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> PlannerResult<()> {
    let args = Args::parse();

    // Initialize logging
    initialize_logging(&args.log_level)?;

    info!("Starting dungeon planner v{}", dungeon_planner::VERSION);

    if args.dump_config {
        println!("{}", PlannerConfig::new().to_json()?);
        return Ok(());
    }

    let result = run(&args);
    if let Err(err) = &result {
        error!("Planning failed: {}", err);
    }
    result
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) -> PlannerResult<()> {
    #[cfg(feature = "dev-tools")]
    {
        use tracing::Level;

        let level = match log_level.to_lowercase().as_str() {
            "error" => Level::ERROR,
            "warn" => Level::WARN,
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            _ => Level::INFO,
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .init();
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::new()
            .parse_filters(log_level)
            .format_target(false)
            .init();
    }

    Ok(())
}

/// Generates, plans and prints one dungeon.
fn run(args: &Args) -> PlannerResult<()> {
    let seed = args.seed.unwrap_or(12345);

    let planner_config = match &args.config {
        Some(path) => {
            info!("Loading planner configuration from {}", path.display());
            PlannerConfig::load(path)?
        }
        None => PlannerConfig::new(),
    };

    let generation_config = if args.small {
        GenerationConfig::for_testing(seed)
    } else {
        GenerationConfig::new(seed)
    };
    let generator = if args.winding {
        GridDungeonGenerator::winding()
    } else {
        GridDungeonGenerator::new()
    };
    let mut rng = utils::create_rng(&generation_config);

    info!(
        "Generating dungeon with {} (seed {})",
        generator.generator_type(),
        seed
    );
    let dungeon = generator.generate(&generation_config, &mut rng)?;

    let sub_levels = if args.sub_level {
        vec![demo_sub_level()?]
    } else {
        Vec::new()
    };

    let mut pools = planner_config.build_pools()?;
    let outcome = LevelPlanner::new(&planner_config).create_initial_plan(
        &dungeon,
        &mut pools,
        &sub_levels,
        &mut rng,
    )?;

    for issue in &outcome.issues {
        warn!("{}", issue);
    }
    outcome.plan.validate()?;

    match args.format {
        OutputFormat::Summary => print_summary(&outcome.plan),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome.plan)?),
    }

    Ok(())
}

/// A small overworld room with a staircase leading into the dungeon.
fn demo_sub_level() -> PlannerResult<SubLevelEntrance> {
    let mut grid = NavigationGrid::filled(8, 8, Terrain::Land)?;
    // Moat along the bottom row
    for x in 0..8 {
        grid.set_terrain(GridIndex::new(x, 0), Terrain::Fluid)?;
    }

    Ok(SubLevelEntrance::new(
        "dungeon_stairs",
        WorldPosition::new(0.5, 2.5),
        ExternalArea::new("overworld", WorldPosition::new(0.0, 0.0), grid),
    ))
}

fn describe_entrance(plan: &LevelPlan, entrance: &PlanEntrance) -> String {
    match entrance {
        PlanEntrance::Area { area, prefab } => {
            let room = plan
                .area(*area)
                .map(|a| a.room_index.to_string())
                .unwrap_or_else(|| "?".to_string());
            format!("area {} {} [{}]", area.0, room, prefab.name)
        }
        PlanEntrance::SubLevel { entrance, area } => format!("{} in {}", entrance, area),
    }
}

fn print_summary(plan: &LevelPlan) {
    println!(
        "Level plan: {} areas, {} connections",
        plan.areas().len(),
        plan.connections().len()
    );
    if let Some(mobs) = plan.mob_generator() {
        println!("Mob generator: {}", mobs);
    }

    println!();
    println!("Areas:");
    for (index, area) in plan.areas().iter().enumerate() {
        let marker = if index == plan.spawn_area().0 { " (spawn)" } else { "" };
        println!(
            "  {:>3} {:<10} {:<14} free walls {:?}{}",
            index,
            area.room_index.to_string(),
            area.blueprint_group.name,
            area.remaining_wall_entry_directions(),
            marker
        );
    }

    println!();
    println!("Connections:");
    for connection in plan.connections() {
        let terrain = connection
            .forced_terrain
            .map(|t| format!(" on {:?}", t))
            .unwrap_or_default();
        println!(
            "  {} -{:?}-> {}{}",
            describe_entrance(plan, &connection.first),
            connection.direction,
            describe_entrance(plan, &connection.second),
            terrain
        );
    }
}
