use std::process::ExitCode;

use anstream::eprintln;
use anstream::println;
use clap::Parser;
use clap::Subcommand;
use flexi_logger::Logger;
use flexi_logger::LoggerHandle;
use indoc::indoc;
use owo_colors::OwoColorize;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use thiserror::Error;

use astar::AStarSearch;
use astar::Goal;
use astar::SearchNode;
use astar::goal::GoalState;
use astar::observer::LogObserver;
use astar::observer::Verbosity;
use astar::problems::city::CityMap;
use astar::problems::city::CityMapError;
use astar::problems::grid_2d::Grid2DParseError;
use astar::problems::grid_2d::Grid2DProblem;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

const BUILTIN_GRID: &str = indoc! {"
    S....#....
    .###.#.##.
    ...#...#..
    ##.#####.#
    ...#.....#
    .#.#.###..
    .#...#.#.#
    .#####.#..
    ......3#.G
"};

/// Command line arguments
#[derive(Parser, Debug)]
#[clap(long_version = astar::build::CLAP_LONG_VERSION)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Log filter, like `info` or `astar=trace`. `RUST_LOG` takes precedence.
    ///
    /// Defaults to `info`, raised for `astar` as needed by `--verbosity`.
    #[arg(long)]
    pub log_level: Option<String>,

    /// How much of the search to report.
    #[arg(short, long, env = "ASTAR_VERBOSITY", value_enum, default_value_t)]
    pub verbosity: Verbosity,

    /// Maximum number of expansions, unbounded by default.
    #[arg(short, long, env = "ASTAR_MAX_STEPS")]
    pub max_steps: Option<usize>,

    /// Print memory usage of the search.
    #[arg(long)]
    pub stats: bool,

    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    color: colorchoice_clap::Color,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Crosses a grid from `S` to `G`.
    Grid {
        /// Use a random grid from this seed instead of the built-in one.
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 64usize)]
        width: usize,
        #[arg(long, default_value_t = 64usize)]
        height: usize,
        /// Probability of each random cell being a wall.
        #[arg(long, default_value_t = 0.25f64, value_parser = parse_probability)]
        walls: f64,
    },
    /// Drives between cities of south-west Germany.
    Cities {
        #[arg(long, default_value = "Saarbrücken")]
        from: String,
        #[arg(long, default_value = "Würzburg")]
        to: String,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to set up logging: {0}")]
    Logger(#[from] flexi_logger::FlexiLoggerError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Bad grid: {0}")]
    Grid(#[from] Grid2DParseError),
    #[error(transparent)]
    City(#[from] CityMapError),
}

fn parse_probability(s: &str) -> Result<f64, String> {
    let p: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(format!("{p} is not a probability (0 to 1)"))
    }
}

/// The log filter to use unless `RUST_LOG` is set.
///
/// `LogObserver` reports popped nodes at `debug` and set dumps at `trace`,
/// so those levels are let through for the requested verbosity.
fn log_spec(args: &Args) -> String {
    if let Some(spec) = &args.log_level {
        return spec.clone();
    }
    match args.verbosity {
        Verbosity::Quiet => "info".to_string(),
        Verbosity::Current => "info, astar=debug".to_string(),
        Verbosity::Full => "info, astar=trace".to_string(),
    }
}

fn init_logging(args: &Args) -> Result<LoggerHandle, CliError> {
    let handle = Logger::try_with_env_or_str(log_spec(args))?
        .log_to_stderr()
        .start()?;
    Ok(handle)
}

/// Runs one search and prints its outcome. Returns whether a goal was found.
fn solve<N, G>(args: &Args, start: N, goal: G) -> Result<bool, CliError>
where
    N: SearchNode + std::fmt::Display,
    G: Goal<N>,
{
    let mut search = AStarSearch::new(start, goal).with_max_steps(args.max_steps);
    let result = search.run_with(LogObserver::new(args.verbosity));

    let found = match result {
        Ok(terminal) => {
            let path = search.path(terminal);
            println!(
                "{} {} ({} states, {} expanded)",
                "Found".green().bold(),
                path.cost().bold(),
                path.len(),
                search.expanded(),
            );
            let route: Vec<String> = path.states().map(|s| s.to_string()).collect();
            println!("{}", route.join(" -> "));
            true
        }
        Err(e) => {
            eprintln!("{} {e}", "No path:".red().bold());
            false
        }
    };

    if args.stats {
        search.write_memory_stats(std::io::stdout().lock())?;
    }
    Ok(found)
}

fn run(args: &Args) -> Result<bool, CliError> {
    match &args.command {
        Command::Grid {
            seed,
            width,
            height,
            walls,
        } => {
            let problem = match seed {
                Some(seed) => {
                    let mut rng = ChaCha8Rng::seed_from_u64(*seed);
                    Grid2DProblem::random(&mut rng, *width, *height, *walls)
                }
                None => Grid2DProblem::try_from(BUILTIN_GRID)?,
            };
            println!("{problem}");
            solve(args, problem.start_node(), problem.goal_state())
        }
        Command::Cities { from, to } => {
            let map = CityMap::southwest_germany();
            let goal = GoalState::new(map.city(to)?);
            solve(args, map.city(from)?, goal)
        }
    }
}

fn main() -> Result<ExitCode, CliError> {
    let args = Args::parse();
    args.color.write_global();
    let _logger = init_logging(&args)?;
    log::debug!("{args:?}");

    if run(&args)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use flexi_logger::LogSpecification;

    fn astar_level(args: &Args) -> Option<log::LevelFilter> {
        let spec = LogSpecification::parse(log_spec(args)).unwrap();
        spec.module_filters()
            .iter()
            .find(|f| f.module_name.as_deref() == Some("astar"))
            .map(|f| f.level_filter)
    }

    #[test]
    fn verbosity_raises_the_log_level() {
        let quiet = Args::parse_from(["astar", "cities"]);
        assert_eq!(log_spec(&quiet), "info");
        assert_eq!(astar_level(&quiet), None);

        let current = Args::parse_from(["astar", "-v", "current", "cities"]);
        assert_eq!(astar_level(&current), Some(log::LevelFilter::Debug));

        let full = Args::parse_from(["astar", "-v", "full", "cities"]);
        assert_eq!(astar_level(&full), Some(log::LevelFilter::Trace));
    }

    #[test]
    fn explicit_log_level_wins() {
        let args = Args::parse_from(["astar", "-v", "full", "--log-level", "warn", "cities"]);
        assert_eq!(log_spec(&args), "warn");
    }

    #[test]
    fn wall_density_must_be_a_probability() {
        assert_eq!(parse_probability("0.3"), Ok(0.3));
        assert_eq!(parse_probability("1"), Ok(1.0));
        assert!(parse_probability("NaN").is_err());
        assert!(parse_probability("inf").is_err());
        assert!(parse_probability("-0.1").is_err());
        assert!(parse_probability("walls").is_err());

        assert!(Args::try_parse_from(["astar", "grid", "--seed", "1", "--walls", "NaN"]).is_err());
    }
}
