//! Tour and run-result representation.
//!
//! A [`Tour`] is a closed visiting order: a permutation of every city index
//! followed by the start index again. Tours are produced by the colony and
//! never modified afterwards.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::instance::TspInstance;

/// Closed tour of length N+1 whose last element repeats the first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tour {
    cities: Vec<usize>,
}

impl Tour {
    pub fn new(cities: Vec<usize>) -> Self {
        Tour { cities }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.cities
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// First (and last) city of the tour
    pub fn start(&self) -> Option<usize> {
        self.cities.first().copied()
    }

    /// Directed edges traversed by the tour, in order
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cities.windows(2).map(|w| (w[0], w[1]))
    }

    /// Check that the tour visits each of the `n` cities once and returns to its start
    pub fn is_valid(&self, n: usize) -> bool {
        if self.cities.len() != n + 1 || n == 0 {
            return false;
        }
        if self.cities[0] != self.cities[n] {
            return false;
        }
        let unique: HashSet<usize> = self.cities[..n].iter().copied().collect();
        unique.len() == n && unique.iter().all(|&c| c < n)
    }

    /// City names along the tour
    pub fn names<'a>(&self, instance: &'a TspInstance) -> Vec<&'a str> {
        self.cities.iter().map(|&c| instance.city_name(c)).collect()
    }
}

impl From<Vec<usize>> for Tour {
    fn from(cities: Vec<usize>) -> Self {
        Tour::new(cities)
    }
}

/// All tours built during one iteration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationRecord {
    /// 1-based iteration number
    pub iteration: usize,
    /// One tour per ant, in construction order
    pub tours: Vec<Tour>,
}

/// Outcome of a colony run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Shortest tour found (first found wins ties)
    pub best_tour: Tour,
    /// Length of `best_tour`
    pub best_length: f64,
    /// Every iteration's tours, oldest first
    pub history: Vec<IterationRecord>,
    /// Wall-clock time of the run in seconds
    pub computation_time: f64,
}

impl RunResult {
    pub fn iterations(&self) -> usize {
        self.history.len()
    }

    /// Best tour of each iteration with its length
    pub fn iteration_bests(&self, instance: &TspInstance) -> Vec<(usize, f64)> {
        self.history
            .iter()
            .map(|record| {
                let best = record
                    .tours
                    .iter()
                    .map(|t| instance.tour_length(t.as_slice()))
                    .fold(f64::INFINITY, f64::min);
                (record.iteration, best)
            })
            .collect()
    }
}

impl std::fmt::Display for RunResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Run result")?;
        writeln!(f, "  Best length: {:.2}", self.best_length)?;
        writeln!(f, "  Iterations: {}", self.iterations())?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        writeln!(f, "  Tour: {:?}", self.best_tour.as_slice())
    }
}
