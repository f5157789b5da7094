//! ACO TSP Solver - Command Line Interface
//!
//! Solves Euclidean TSP instances with Ant Colony Optimization.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use aco_tsp_solver::benchmark::{load_instances_from_dir, Benchmark, BenchmarkConfig};
use aco_tsp_solver::error::AcoResult;
use aco_tsp_solver::heuristics::aco::{ACOConfig, AntColonyOptimization};
use aco_tsp_solver::instance::TspInstance;
use aco_tsp_solver::visualization::{export_convergence_data, render_report, Visualizer};

use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aco-tsp-solver")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "Ant Colony Optimization solver for the Traveling Salesman Problem")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Colony parameters shared by `solve` and `benchmark`
#[derive(clap::Args, Debug, Clone)]
struct ColonyArgs {
    /// Number of ants per iteration
    #[arg(short = 'a', long, default_value = "20")]
    ants: usize,

    /// Number of iterations
    #[arg(short = 'n', long, default_value = "100")]
    iterations: usize,

    /// Pheromone importance
    #[arg(long, default_value = "1.0")]
    alpha: f64,

    /// Distance (visibility) importance
    #[arg(long, default_value = "2.5")]
    beta: f64,

    /// Evaporation rate in [0, 1]
    #[arg(long, default_value = "0.1")]
    rho: f64,

    /// Pheromone deposit factor
    #[arg(short, long, default_value = "100.0")]
    q: f64,
}

impl ColonyArgs {
    fn to_config(&self, start_index: usize, seed: u64) -> ACOConfig {
        ACOConfig {
            num_ants: self.ants,
            alpha: self.alpha,
            beta: self.beta,
            evaporation_rate: self.rho,
            q: self.q,
            start_index,
            seed,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Solve one instance
    Solve {
        /// Path to the instance file (TSPLIB or name,x,y CSV)
        #[arg(short, long)]
        instance: PathBuf,

        /// Start city, by name or 0-based index
        #[arg(long, default_value = "0")]
        start: String,

        #[command(flatten)]
        colony: ColonyArgs,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Output run result as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write an SVG plot of the best tour next to the instance
        #[arg(long)]
        visualize: bool,

        /// Write per-iteration best lengths as CSV
        #[arg(long)]
        convergence: Option<PathBuf>,

        /// Print every ant's tour of every iteration
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run seeded benchmarks on a directory of instances
    Benchmark {
        /// Directory containing .tsp / .csv instance files
        #[arg(short, long)]
        dir: PathBuf,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Number of runs per instance
        #[arg(short, long, default_value = "5")]
        runs: usize,

        #[command(flatten)]
        colony: ColonyArgs,

        /// Run seeds one after another instead of in parallel
        #[arg(long)]
        sequential: bool,

        /// Maximum instance size
        #[arg(long)]
        max_size: Option<usize>,
    },

    /// Analyze an instance
    Analyze {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Solve { instance, start, colony, seed, output, visualize, convergence, verbose } => {
            solve_instance(&instance, &start, &colony, seed, output, visualize, convergence, verbose)
        }

        Commands::Benchmark { dir, output, runs, colony, sequential, max_size } => {
            run_benchmark(&dir, &output, runs, &colony, !sequential, max_size)
        }

        Commands::Analyze { instance } => analyze_instance(&instance),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn solve_instance(
    path: &PathBuf,
    start: &str,
    colony: &ColonyArgs,
    seed: u64,
    output: Option<PathBuf>,
    visualize: bool,
    convergence: Option<PathBuf>,
    verbose: bool,
) -> AcoResult<()> {
    println!("Loading instance from {:?}...", path);
    let instance = TspInstance::from_file(path)?;
    let start_index = instance.resolve_start(start)?;

    if verbose {
        println!("{}", instance.statistics());
    }

    println!(
        "Solving with {} ants x {} iterations from {}...",
        colony.ants,
        colony.iterations,
        instance.city_name(start_index)
    );

    let config = colony.to_config(start_index, seed);
    let mut aco = AntColonyOptimization::new(instance.clone(), config)?;
    let result = aco.run(colony.iterations)?;

    println!();
    print!("{}", render_report(&instance, &result, verbose));

    if let Some(out_path) = output {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(&out_path, json)?;
        println!("\nResult saved to {:?}", out_path);
    }

    if let Some(csv_path) = convergence {
        std::fs::write(&csv_path, export_convergence_data(&instance, &result))?;
        println!("Convergence data saved to {:?}", csv_path);
    }

    if visualize {
        let viz = Visualizer::new();
        let svg = viz.generate_svg(&instance, &result.best_tour, result.best_length);
        let svg_path = path.with_extension("svg");
        viz.save_svg(&svg, &svg_path)?;
        println!("Visualization saved to {:?}", svg_path);
    }

    Ok(())
}

fn run_benchmark(
    dir: &PathBuf,
    output: &PathBuf,
    runs: usize,
    colony: &ColonyArgs,
    parallel: bool,
    max_size: Option<usize>,
) -> AcoResult<()> {
    println!("Loading instances from {:?}...", dir);

    let mut instances = load_instances_from_dir(dir)?;

    if let Some(max) = max_size {
        instances.retain(|i| i.dimension <= max);
    }

    println!("Found {} instances", instances.len());

    if instances.is_empty() {
        eprintln!("No instances found!");
        return Ok(());
    }

    std::fs::create_dir_all(output)?;

    let config = BenchmarkConfig {
        num_runs: runs,
        iterations: colony.iterations,
        aco: colony.to_config(0, 0),
        parallel,
    };

    let pb = ProgressBar::new((instances.len() * runs) as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} runs [{elapsed_precise}] {msg}") {
        pb.set_style(style);
    }

    let mut benchmark = Benchmark::new(config);
    for instance in &instances {
        pb.set_message(instance.name.clone());
        benchmark.run_instance(instance, Some(&pb))?;
    }
    pb.finish_with_message("done");

    let results_path = output.join("results.csv");
    benchmark.export_to_csv(&results_path)?;
    println!("\nResults exported to {:?}", results_path);

    let stats_path = output.join("statistics.csv");
    benchmark.export_statistics_csv(&stats_path)?;
    println!("Statistics exported to {:?}", stats_path);

    let report = benchmark.generate_report();
    println!("\n{}", report);

    let report_path = output.join("report.txt");
    std::fs::write(&report_path, &report)?;
    println!("Report saved to {:?}", report_path);

    Ok(())
}

fn analyze_instance(path: &PathBuf) -> AcoResult<()> {
    let instance = TspInstance::from_file(path)?;

    println!("========== Instance Analysis ==========\n");
    println!("{}", instance.statistics());

    println!("Cities:");
    for (idx, city) in instance.cities.iter().enumerate() {
        println!("  {:>4}  {:<20} ({:.2}, {:.2})", idx, city.name, city.x, city.y);
    }

    Ok(())
}
