//! Benchmarking and experimentation module.
//!
//! Generates random instances, runs the exact and approximate TSP solvers on
//! them side by side, and reports how far the heuristic lands from the optimum.

use crate::error::Result;
use crate::exact::HeldKarpSolver;
use crate::heuristics::NearestNeighborHeuristic;
use crate::instance::{DistanceMatrix, Item, KnapsackInput, TspInstance};
use crate::tsp::{TourSolver, DEFAULT_EXACT_THRESHOLD};

use indicatif::{ProgressBar, ProgressStyle};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Random TSP instance on points in a 100×100 square.
///
/// Distances are Euclidean. With `asymmetric`, each directed edge is scaled
/// by an independent factor in `[1, 1.5)`.
pub fn generate_tsp_instance(n: usize, seed: u64, asymmetric: bool) -> Result<TspInstance> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let points: Vec<(f64, f64)> = (0..n)
        .map(|_| (rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)))
        .collect();

    let mut matrix = DistanceMatrix::new(n);
    for i in 0..n {
        for j in 0..n {
            if i != j {
                let dx = points[i].0 - points[j].0;
                let dy = points[i].1 - points[j].1;
                let factor = if asymmetric { rng.gen_range(1.0..1.5) } else { 1.0 };
                matrix.set(i, j, (dx * dx + dy * dy).sqrt() * factor);
            }
        }
    }

    let cities = (0..n).map(|i| format!("C{}", i)).collect();
    Ok(TspInstance::from_matrix(cities, matrix)?)
}

/// Random knapsack request with integer weights in `1..=20` and values in `1..=100`.
pub fn generate_knapsack_input(n: usize, max_weight: f64, seed: u64) -> KnapsackInput {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let items = (0..n)
        .map(|i| {
            Item::new(
                format!("Item{}", i + 1),
                rng.gen_range(1u32..=20) as f64,
                rng.gen_range(1u32..=100) as f64,
            )
        })
        .collect();
    KnapsackInput::new(max_weight, items)
}

/// Result of running a single algorithm on an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmResult {
    /// Algorithm name
    pub algorithm: String,
    /// Instance name
    pub instance: String,
    /// Number of cities
    pub dimension: usize,
    /// Tour length
    pub cost: f64,
    /// Computation time in seconds
    pub time: f64,
    /// Gap to the exact optimum in percent (if known)
    pub gap_to_best: Option<f64>,
}

/// Aggregated statistics for an algorithm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmStatistics {
    pub algorithm: String,
    pub num_instances: usize,
    pub avg_cost: f64,
    pub best_cost: f64,
    pub worst_cost: f64,
    pub std_cost: f64,
    pub avg_time: f64,
    pub total_time: f64,
    pub avg_gap: Option<f64>,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Instance sizes to generate
    pub sizes: Vec<usize>,
    /// Instances generated per size
    pub num_runs: usize,
    /// Seed of the first instance; later ones count up from it
    pub seed: u64,
    /// Largest size the exact solver is run on
    pub exact_threshold: usize,
    pub asymmetric: bool,
    /// Run instances in parallel
    pub parallel: bool,
    /// Show a progress bar
    pub progress: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            sizes: vec![5, 8, 10, 12],
            num_runs: 3,
            seed: 42,
            exact_threshold: DEFAULT_EXACT_THRESHOLD,
            asymmetric: false,
            parallel: true,
            progress: false,
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<AlgorithmResult>,
    best_known: HashMap<String, f64>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
            best_known: HashMap::new(),
        }
    }

    /// Generate the configured instance set.
    pub fn generate_instances(&self) -> Result<Vec<(String, TspInstance)>> {
        let mut instances = Vec::new();
        let mut seed = self.config.seed;
        for &n in &self.config.sizes {
            for _ in 0..self.config.num_runs {
                let instance = generate_tsp_instance(n, seed, self.config.asymmetric)?;
                instances.push((format!("tsp-n{}-s{}", n, seed), instance));
                seed += 1;
            }
        }
        Ok(instances)
    }

    /// Run both solvers on one instance.
    fn run_instance(&self, name: &str, instance: &TspInstance) -> Result<Vec<AlgorithmResult>> {
        let mut solvers: Vec<Box<dyn TourSolver + Send + Sync>> =
            vec![Box::new(NearestNeighborHeuristic::new())];
        if instance.dimension() <= self.config.exact_threshold {
            solvers.push(Box::new(HeldKarpSolver::new()));
        }

        let mut results = Vec::with_capacity(solvers.len());
        for solver in &solvers {
            let solution = solver.solve(instance)?;
            results.push(AlgorithmResult {
                algorithm: solution.algorithm.clone(),
                instance: name.to_string(),
                dimension: instance.dimension(),
                cost: solution.total_distance,
                time: solution.computation_time,
                gap_to_best: None,
            });
        }
        Ok(results)
    }

    /// Run the benchmark over `instances`, recording every result.
    pub fn run_tsp(&mut self, instances: &[(String, TspInstance)]) -> Result<()> {
        let pb = if self.config.progress {
            let pb = ProgressBar::new(instances.len() as u64);
            if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}") {
                pb.set_style(style);
            }
            pb
        } else {
            ProgressBar::hidden()
        };

        let this = &*self;
        let run = |(name, instance): &(String, TspInstance)| {
            let out = this.run_instance(name, instance);
            pb.inc(1);
            out
        };
        let batches: Vec<Result<Vec<AlgorithmResult>>> = if self.config.parallel {
            instances.par_iter().map(run).collect()
        } else {
            instances.iter().map(run).collect()
        };
        pb.finish_and_clear();

        for batch in batches {
            let batch = batch?;
            for result in &batch {
                if result.algorithm == "HeldKarp" {
                    self.best_known.insert(result.instance.clone(), result.cost);
                }
            }
            for result in batch {
                self.record_result(result);
            }
        }

        log::info!("Benchmarked {} instances", instances.len());
        Ok(())
    }

    fn record_result(&mut self, mut result: AlgorithmResult) {
        if let Some(&best) = self.best_known.get(&result.instance) {
            if best > 0.0 {
                result.gap_to_best = Some((result.cost - best) / best * 100.0);
            }
        }
        self.results.push(result);
    }

    /// Compute statistics for each algorithm
    pub fn compute_statistics(&self) -> Vec<AlgorithmStatistics> {
        let mut stats_map: HashMap<&str, Vec<&AlgorithmResult>> = HashMap::new();
        for result in &self.results {
            stats_map.entry(result.algorithm.as_str()).or_default().push(result);
        }

        let mut statistics: Vec<AlgorithmStatistics> = stats_map
            .into_iter()
            .map(|(algo, results)| {
                let costs: Vec<f64> = results.iter().map(|r| r.cost).collect();
                let times: Vec<f64> = results.iter().map(|r| r.time).collect();
                let gaps: Vec<f64> = results.iter().filter_map(|r| r.gap_to_best).collect();

                AlgorithmStatistics {
                    algorithm: algo.to_string(),
                    num_instances: results.len(),
                    avg_cost: Statistics::mean(costs.iter()),
                    best_cost: Statistics::min(costs.iter()),
                    worst_cost: Statistics::max(costs.iter()),
                    std_cost: Statistics::population_std_dev(costs.iter()),
                    avg_time: Statistics::mean(times.iter()),
                    total_time: times.iter().sum(),
                    avg_gap: if gaps.is_empty() {
                        None
                    } else {
                        Some(Statistics::mean(gaps.iter()))
                    },
                }
            })
            .collect();

        statistics.sort_by(|a, b| a.algorithm.cmp(&b.algorithm));
        statistics
    }

    /// Write one CSV row per run.
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        write_csv(File::create(path)?, &self.results)
    }

    /// Write one CSV row per algorithm, the same figures as the report.
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        write_csv(File::create(path)?, &self.compute_statistics())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("          TSP Benchmark Report\n");
        report.push_str(&format!("   {}\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")));
        report.push_str("========================================\n\n");

        report.push_str(&format!(
            "{:<20} {:>10} {:>12} {:>12} {:>10} {:>12}\n",
            "Algorithm", "Instances", "Avg Cost", "Std Cost", "Avg Gap%", "Avg Time"
        ));
        report.push_str("-".repeat(80).as_str());
        report.push('\n');

        for stat in self.compute_statistics() {
            let gap_str = stat
                .avg_gap
                .map(|g| format!("{:.2}%", g))
                .unwrap_or_else(|| "-".to_string());
            report.push_str(&format!(
                "{:<20} {:>10} {:>12.2} {:>12.2} {:>10} {:>12.6}\n",
                stat.algorithm, stat.num_instances, stat.avg_cost, stat.std_cost, gap_str, stat.avg_time
            ));
        }

        report.push_str("-".repeat(80).as_str());
        report.push('\n');
        report
    }

    pub fn results(&self) -> &[AlgorithmResult] {
        &self.results
    }

    /// Exact optimum per instance name
    pub fn best_known(&self) -> &HashMap<String, f64> {
        &self.best_known
    }
}

fn write_csv<W: Write, T: Serialize>(out: W, rows: &[T]) -> std::io::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()
}
