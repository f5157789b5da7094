//! Benchmarking and experimentation module for the ACO solver.
//!
//! Runs the colony over a range of seeds, collects per-run results and
//! aggregate statistics, and exports them as CSV or a text report.

use std::fs::File;
use std::path::Path;

use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::error::AcoResult;
use crate::heuristics::aco::{ACOConfig, AntColonyOptimization};
use crate::instance::TspInstance;

/// Result of a single seeded run on an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Instance name
    pub instance: String,
    /// Instance dimension
    pub dimension: usize,
    /// Seed of the run
    pub seed: u64,
    /// Ants per iteration
    pub num_ants: usize,
    /// Iterations performed
    pub iterations: usize,
    /// Best tour length found
    pub best_length: f64,
    /// Computation time in seconds
    pub time: f64,
}

/// Aggregated statistics over all runs of one instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceSummary {
    pub instance: String,
    pub dimension: usize,
    pub runs: usize,
    pub best_length: f64,
    pub worst_length: f64,
    pub avg_length: f64,
    /// Sample standard deviation (0 for a single run)
    pub std_length: f64,
    pub avg_time: f64,
    pub total_time: f64,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Number of seeded runs per instance (seeds `0..num_runs`)
    pub num_runs: usize,
    /// Iterations per run
    pub iterations: usize,
    /// Colony parameters; `seed` is replaced per run
    pub aco: ACOConfig,
    /// Run seeds in parallel
    pub parallel: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_runs: 5,
            iterations: 100,
            aco: ACOConfig::default(),
            parallel: true,
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<RunRecord>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
        }
    }

    /// Run every seed on an instance, ticking `progress` once per finished run.
    pub fn run_instance(&mut self, instance: &TspInstance, progress: Option<&ProgressBar>) -> AcoResult<()> {
        log::info!("Running benchmark on instance: {}", instance.name);

        let seeds: Vec<u64> = (0..self.config.num_runs as u64).collect();
        let run = |seed: u64| {
            let record = run_seed(instance, &self.config, seed);
            if let Some(pb) = progress {
                pb.inc(1);
            }
            record
        };

        let records: Vec<RunRecord> = if self.config.parallel {
            seeds.into_par_iter().map(run).collect::<AcoResult<_>>()?
        } else {
            seeds.into_iter().map(run).collect::<AcoResult<_>>()?
        };

        self.results.extend(records);
        Ok(())
    }

    /// Run benchmark on multiple instances
    pub fn run_on_instances(&mut self, instances: &[TspInstance], progress: Option<&ProgressBar>) -> AcoResult<()> {
        for instance in instances {
            self.run_instance(instance, progress)?;
        }
        Ok(())
    }

    /// Compute statistics for each instance, in first-seen order
    pub fn compute_statistics(&self) -> Vec<InstanceSummary> {
        let mut names: Vec<&str> = Vec::new();
        for result in &self.results {
            if !names.contains(&result.instance.as_str()) {
                names.push(&result.instance);
            }
        }

        names
            .into_iter()
            .map(|name| {
                let runs: Vec<&RunRecord> = self.results.iter().filter(|r| r.instance == name).collect();
                let lengths: Vec<f64> = runs.iter().map(|r| r.best_length).collect();
                let times: Vec<f64> = runs.iter().map(|r| r.time).collect();

                let best_length = lengths.iter().cloned().fold(f64::INFINITY, f64::min);
                let worst_length = lengths.iter().cloned().fold(0.0, f64::max);
                let std_length = if lengths.len() > 1 { lengths.iter().std_dev() } else { 0.0 };

                InstanceSummary {
                    instance: name.to_string(),
                    dimension: runs[0].dimension,
                    runs: runs.len(),
                    best_length,
                    worst_length,
                    avg_length: lengths.iter().mean(),
                    std_length,
                    avg_time: times.iter().mean(),
                    total_time: times.iter().sum(),
                }
            })
            .collect()
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> AcoResult<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> AcoResult<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for stat in self.compute_statistics() {
            writer.serialize(stat)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("        ACO TSP Benchmark Report\n");
        report.push_str("========================================\n");
        report.push_str(&format!("Generated: {}\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")));
        report.push_str(&format!(
            "Ants: {}, iterations: {}, alpha: {}, beta: {}, rho: {}, q: {}\n\n",
            self.config.aco.num_ants,
            self.config.iterations,
            self.config.aco.alpha,
            self.config.aco.beta,
            self.config.aco.evaporation_rate,
            self.config.aco.q
        ));

        report.push_str("-".repeat(86).as_str());
        report.push('\n');
        report.push_str(&format!(
            "{:<20} {:>6} {:>6} {:>12} {:>12} {:>12} {:>10}\n",
            "Instance", "n", "Runs", "Best", "Average", "Std", "Avg Time"
        ));
        report.push_str("-".repeat(86).as_str());
        report.push('\n');

        for stat in self.compute_statistics() {
            report.push_str(&format!(
                "{:<20} {:>6} {:>6} {:>12.2} {:>12.2} {:>12.2} {:>10.4}\n",
                stat.instance,
                stat.dimension,
                stat.runs,
                stat.best_length,
                stat.avg_length,
                stat.std_length,
                stat.avg_time
            ));
        }

        report.push_str("-".repeat(86).as_str());
        report.push('\n');

        report
    }

    /// Get all results
    pub fn results(&self) -> &[RunRecord] {
        &self.results
    }
}

fn run_seed(instance: &TspInstance, config: &BenchmarkConfig, seed: u64) -> AcoResult<RunRecord> {
    let aco_config = ACOConfig { seed, ..config.aco.clone() };
    let mut aco = AntColonyOptimization::new(instance.clone(), aco_config)?;
    let result = aco.run(config.iterations)?;

    Ok(RunRecord {
        instance: instance.name.clone(),
        dimension: instance.dimension,
        seed,
        num_ants: config.aco.num_ants,
        iterations: result.iterations(),
        best_length: result.best_length,
        time: result.computation_time,
    })
}

/// Helper function to load `.tsp` and `.csv` instances from a directory.
/// Files that fail to parse are skipped with a warning.
pub fn load_instances_from_dir<P: AsRef<Path>>(dir: P) -> AcoResult<Vec<TspInstance>> {
    let mut instances = Vec::new();

    for entry in std::fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        let supported = path
            .extension()
            .map(|e| e == "tsp" || e == "csv")
            .unwrap_or(false);
        if !supported {
            continue;
        }
        match TspInstance::from_file(&path) {
            Ok(instance) => instances.push(instance),
            Err(e) => log::warn!("skipping {:?}: {}", path, e),
        }
    }

    // Sort by dimension
    instances.sort_by_key(|i| i.dimension);

    Ok(instances)
}
