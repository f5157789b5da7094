//! ACO TSP Solver Library
//!
//! Near-optimal closed tours over named 2D points with Ant Colony Optimization.
//!
//! # Features
//!
//! - Euclidean distance model and tour evaluation
//! - Ant System engine with roulette-wheel city selection, evaporation and
//!   per-ant pheromone deposit
//! - Seeded, injectable random source for reproducible runs
//! - TSPLIB and CSV instance loading, start-city resolution
//! - Text and SVG rendering of results, multi-seed benchmarking
//!
//! # Example
//!
//! ```
//! use aco_tsp_solver::heuristics::aco::{ACOConfig, AntColonyOptimization};
//! use aco_tsp_solver::instance::{City, TspInstance};
//!
//! let instance = TspInstance::new(
//!     "triangle",
//!     vec![City::new("A", 0.0, 0.0), City::new("B", 3.0, 0.0), City::new("C", 0.0, 4.0)],
//! );
//! let config = ACOConfig { num_ants: 5, ..Default::default() };
//! let mut aco = AntColonyOptimization::new(instance, config).unwrap();
//! let result = aco.run(10).unwrap();
//!
//! assert!((result.best_length - 12.0).abs() < 1e-9);
//! ```

pub mod benchmark;
pub mod error;
pub mod heuristics;
pub mod instance;
pub mod solution;
pub mod visualization;

pub use error::{AcoError, AcoResult};
pub use heuristics::aco::{ACOConfig, AntColonyOptimization};
pub use instance::{City, TspInstance};
pub use solution::{IterationRecord, RunResult, Tour};
