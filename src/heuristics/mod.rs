//! Heuristics module for the TSP.
//!
//! This module exports the ant colony engine and its building blocks.

pub mod aco;
pub mod pheromone;
pub mod selection;

pub use aco::*;
pub use pheromone::*;
pub use selection::*;
