//! TSP / Knapsack Solver - Command Line Interface
//!
//! Reads request bodies as JSON (a single object or an array of objects) and
//! prints the solutions as JSON. Requests inside one invocation share a result
//! cache, so repeated requests are answered from it.

use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tsp_knapsack_solver::benchmark::{generate_knapsack_input, generate_tsp_instance, Benchmark, BenchmarkConfig};
use tsp_knapsack_solver::cache::{MemoryCache, NoCache, ResultCache};
use tsp_knapsack_solver::config::SolverConfig;
use tsp_knapsack_solver::error::SolveError;
use tsp_knapsack_solver::instance::{KnapsackInput, TspInput};
use tsp_knapsack_solver::service::CachedSolver;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "tsp-knapsack-solver")]
#[command(version = "1.0")]
#[command(about = "Exact and approximate TSP and 0/1 Knapsack solvers")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Do not consult or populate the result cache
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve Traveling Salesman requests
    Tsp {
        /// Request file; reads stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Write the response here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Largest city count solved exactly
        #[arg(long)]
        threshold: Option<usize>,
    },

    /// Solve 0/1 Knapsack requests
    Knapsack {
        /// Request file; reads stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Write the response here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare the exact and approximate TSP solvers on random instances
    Benchmark {
        /// Instance sizes, comma separated
        #[arg(long, value_delimiter = ',', default_values_t = vec![5, 8, 10, 12])]
        sizes: Vec<usize>,

        /// Instances per size
        #[arg(short, long, default_value = "3")]
        runs: usize,

        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Scale each directed edge independently
        #[arg(long)]
        asymmetric: bool,

        /// Export per-run results to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Export per-algorithm statistics to this CSV file
        #[arg(long)]
        stats_csv: Option<PathBuf>,
    },

    /// Print a random request body
    Generate {
        #[arg(value_enum)]
        problem: Problem,

        /// Number of cities or items
        #[arg(short = 'n', long, default_value = "8")]
        size: usize,

        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Knapsack capacity
        #[arg(long, default_value = "50")]
        capacity: f64,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Problem {
    Tsp,
    Knapsack,
}

/// A request file holds one body or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

#[derive(Serialize)]
#[serde(untagged)]
enum Response<S> {
    One(S),
    Many(Vec<S>),
}

/// CLI failure with its exit code.
enum Failure {
    Usage(String),
    Solve(SolveError),
}

impl Failure {
    fn report(self) -> ExitCode {
        match self {
            Failure::Usage(msg) => {
                eprintln!("Error: {}", msg);
                ExitCode::from(64)
            }
            Failure::Solve(e) if e.is_validation() => {
                eprintln!("Error: {}", e.public_message());
                ExitCode::from(2)
            }
            Failure::Solve(e) => {
                log::error!("Error in solving: {}", e);
                eprintln!("Error: {}", e.public_message());
                ExitCode::from(1)
            }
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match SolverConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => return Failure::Usage(e).report(),
        },
        None => SolverConfig::default(),
    };
    if cli.no_cache {
        config.cache_enabled = false;
    }

    // One cache for the whole process, handed to each solver by reference.
    let memory = MemoryCache::new();
    let cache: &dyn ResultCache = if config.cache_enabled { &memory } else { &NoCache };

    let outcome = match cli.command {
        Commands::Tsp { input, output, threshold } => {
            if let Some(t) = threshold {
                config.exact_threshold = t;
            }
            let solver = CachedSolver::new(cache, config);
            run_requests(input.as_deref(), output.as_deref(), |req: &TspInput| solver.solve_tsp(req))
        }

        Commands::Knapsack { input, output } => {
            let solver = CachedSolver::new(cache, config);
            run_requests(input.as_deref(), output.as_deref(), |req: &KnapsackInput| {
                solver.solve_knapsack(req)
            })
        }

        Commands::Benchmark { sizes, runs, seed, asymmetric, csv, stats_csv } => {
            let bench_config = BenchmarkConfig {
                sizes,
                num_runs: runs,
                seed,
                exact_threshold: config.exact_threshold,
                asymmetric,
                progress: true,
                ..Default::default()
            };
            run_benchmark(bench_config, csv.as_deref(), stats_csv.as_deref())
        }

        Commands::Generate { problem, size, seed, capacity } => generate(problem, size, seed, capacity),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => failure.report(),
    }
}

fn read_body(input: Option<&Path>) -> Result<String, Failure> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| Failure::Usage(format!("Cannot open {:?}: {}", path, e))),
        None => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .map_err(|e| Failure::Usage(format!("Cannot read stdin: {}", e)))?;
            Ok(body)
        }
    }
}

fn write_json<T: Serialize>(output: Option<&Path>, value: &T) -> Result<(), Failure> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| Failure::Usage(format!("Cannot encode response: {}", e)))?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .map_err(|e| Failure::Usage(format!("Cannot write {:?}: {}", path, e)))?;
            log::info!("Solution saved to {:?}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_requests<R, S, F>(input: Option<&Path>, output: Option<&Path>, solve: F) -> Result<(), Failure>
where
    R: DeserializeOwned,
    S: Serialize,
    F: Fn(&R) -> Result<S, SolveError>,
{
    let body = read_body(input)?;
    let requests: OneOrMany<R> = serde_json::from_str(&body)
        .map_err(|e| Failure::Usage(format!("Invalid request body: {}", e)))?;

    let response = match requests {
        OneOrMany::One(req) => Response::One(solve(&req).map_err(Failure::Solve)?),
        OneOrMany::Many(reqs) => Response::Many(
            reqs.iter()
                .map(|req| solve(req).map_err(Failure::Solve))
                .collect::<Result<Vec<_>, _>>()?,
        ),
    };
    write_json(output, &response)
}

fn run_benchmark(
    config: BenchmarkConfig,
    csv: Option<&Path>,
    stats_csv: Option<&Path>,
) -> Result<(), Failure> {
    let mut bench = Benchmark::new(config);
    let instances = bench.generate_instances().map_err(Failure::Solve)?;
    bench.run_tsp(&instances).map_err(Failure::Solve)?;

    println!("{}", bench.generate_report());

    if let Some(path) = csv {
        bench
            .export_to_csv(path)
            .map_err(|e| Failure::Usage(format!("Cannot write {:?}: {}", path, e)))?;
        println!("Results saved to {:?}", path);
    }
    if let Some(path) = stats_csv {
        bench
            .export_statistics_csv(path)
            .map_err(|e| Failure::Usage(format!("Cannot write {:?}: {}", path, e)))?;
        println!("Statistics saved to {:?}", path);
    }
    Ok(())
}

fn generate(problem: Problem, size: usize, seed: u64, capacity: f64) -> Result<(), Failure> {
    match problem {
        Problem::Tsp => {
            let instance = generate_tsp_instance(size, seed, false).map_err(Failure::Solve)?;
            write_json(None, &instance.to_input())
        }
        Problem::Knapsack => write_json(None, &generate_knapsack_input(size, capacity, seed)),
    }
}
