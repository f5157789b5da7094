//! Ant Colony Optimization for the TSP.
//!
//! This module implements the classic Ant System: every ant of an iteration
//! builds a closed tour from a fixed start city by roulette-wheel sampling on
//! `tau^alpha * (1/d)^beta`, then the whole pheromone matrix evaporates and
//! every ant deposits `q / L` along its tour.

use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{AcoError, AcoResult};
use crate::heuristics::pheromone::PheromoneMatrix;
use crate::heuristics::selection::{select_next_city, UniformSource};
use crate::instance::{City, TspInstance};
use crate::solution::{IterationRecord, RunResult, Tour};

/// ACO configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ACOConfig {
    /// Number of ants per iteration
    pub num_ants: usize,
    /// Pheromone importance (alpha)
    pub alpha: f64,
    /// Heuristic importance (beta)
    pub beta: f64,
    /// Evaporation rate (rho), in [0, 1]
    pub evaporation_rate: f64,
    /// Pheromone deposit factor
    pub q: f64,
    /// City every ant starts from and returns to
    pub start_index: usize,
    /// Random seed
    pub seed: u64,
}

impl Default for ACOConfig {
    fn default() -> Self {
        ACOConfig {
            num_ants: 20,
            alpha: 1.0,
            beta: 2.5,
            evaporation_rate: 0.1,
            q: 100.0,
            start_index: 0,
            seed: 42,
        }
    }
}

impl ACOConfig {
    /// Check the parameters against an instance of `n` cities.
    pub fn validate(&self, n: usize) -> AcoResult<()> {
        if n < 2 {
            return Err(AcoError::config(format!("at least 2 cities are required, got {}", n)));
        }
        if self.start_index >= n {
            return Err(AcoError::config(format!(
                "start_index {} out of range for {} cities",
                self.start_index, n
            )));
        }
        if self.num_ants < 1 {
            return Err(AcoError::config("num_ants must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.evaporation_rate) {
            return Err(AcoError::config(format!(
                "evaporation_rate must be in [0, 1], got {}",
                self.evaporation_rate
            )));
        }
        if !(self.alpha >= 0.0 && self.alpha.is_finite()) {
            return Err(AcoError::config(format!("alpha must be finite and >= 0, got {}", self.alpha)));
        }
        if !(self.beta >= 0.0 && self.beta.is_finite()) {
            return Err(AcoError::config(format!("beta must be finite and >= 0, got {}", self.beta)));
        }
        if !(self.q > 0.0 && self.q.is_finite()) {
            return Err(AcoError::config(format!("q must be finite and > 0, got {}", self.q)));
        }
        Ok(())
    }
}

/// Lifecycle of a colony
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    Idle,
    Running { iteration: usize, of: usize },
    Done,
}

/// Ant Colony Optimization solver
pub struct AntColonyOptimization<R = ChaCha8Rng> {
    config: ACOConfig,
    instance: TspInstance,
    pheromone: PheromoneMatrix,
    rng: R,
    state: RunState,
}

impl AntColonyOptimization<ChaCha8Rng> {
    /// Create a colony seeded from `config.seed`.
    pub fn new(instance: TspInstance, config: ACOConfig) -> AcoResult<Self> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::with_rng(instance, config, rng)
    }

    /// Create a colony directly from an ordered list of cities.
    pub fn from_cities(cities: Vec<City>, config: ACOConfig) -> AcoResult<Self> {
        Self::new(TspInstance::new("cities", cities), config)
    }
}

impl<R: UniformSource> AntColonyOptimization<R> {
    /// Create a colony drawing from the given random source.
    pub fn with_rng(instance: TspInstance, config: ACOConfig, rng: R) -> AcoResult<Self> {
        config.validate(instance.dimension)?;
        let pheromone = PheromoneMatrix::new(instance.dimension);

        Ok(AntColonyOptimization {
            config,
            instance,
            pheromone,
            rng,
            state: RunState::Idle,
        })
    }

    pub fn config(&self) -> &ACOConfig {
        &self.config
    }

    pub fn instance(&self) -> &TspInstance {
        &self.instance
    }

    pub fn distances(&self) -> &[Vec<f64>] {
        &self.instance.distance_matrix
    }

    pub fn pheromone(&self) -> &PheromoneMatrix {
        &self.pheromone
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Length of a closed tour on this colony's instance
    ///
    /// # Panics
    ///
    /// Panics if the tour holds an index outside the instance.
    pub fn evaluate_tour_length(&self, tour: &Tour) -> f64 {
        self.instance.tour_length(tour.as_slice())
    }

    /// Construct a tour for one ant
    pub fn construct_tour(&mut self) -> AcoResult<Tour> {
        let n = self.instance.dimension;
        let start = self.config.start_index;

        let mut visited = vec![false; n];
        let mut cities = Vec::with_capacity(n + 1);
        visited[start] = true;
        cities.push(start);

        let mut current = start;
        for _ in 1..n {
            let draw = self.rng.next_uniform();
            let next = select_next_city(
                current,
                &visited,
                &self.pheromone,
                &self.instance.distance_matrix,
                self.config.alpha,
                self.config.beta,
                draw,
            )?;
            visited[next] = true;
            cities.push(next);
            current = next;
        }

        cities.push(start);
        Ok(Tour::new(cities))
    }

    /// Run exactly `iterations` iterations of the colony.
    ///
    /// Pheromone carries over between successive calls on the same colony.
    pub fn run(&mut self, iterations: usize) -> AcoResult<RunResult> {
        if iterations < 1 {
            return Err(AcoError::config("iterations must be at least 1"));
        }

        let start = Instant::now();
        log::info!(
            "ACO on {} ({} cities): {} ants x {} iterations",
            self.instance.name,
            self.instance.dimension,
            self.config.num_ants,
            iterations
        );

        let mut best: Option<(Tour, f64)> = None;
        let mut history = Vec::with_capacity(iterations);

        for iteration in 1..=iterations {
            self.state = RunState::Running { iteration, of: iterations };

            let mut tours = Vec::with_capacity(self.config.num_ants);
            let mut lengths = Vec::with_capacity(self.config.num_ants);

            // Each ant constructs a tour against the same pheromone snapshot
            for ant in 0..self.config.num_ants {
                let tour = self.construct_tour()?;
                let length = self.evaluate_tour_length(&tour);
                log::trace!("iteration {} ant {}: length {:.4}", iteration, ant, length);

                let improves = match &best {
                    None => true,
                    Some((_, best_length)) => length < *best_length,
                };
                if improves {
                    best = Some((tour.clone(), length));
                }

                tours.push(tour);
                lengths.push(length);
            }

            self.pheromone.evaporate_and_deposit(
                &tours,
                &lengths,
                self.config.evaporation_rate,
                self.config.q,
            );

            if log::log_enabled!(log::Level::Debug) {
                let iteration_best = lengths.iter().copied().fold(f64::INFINITY, f64::min);
                let global_best = best.as_ref().map_or(f64::INFINITY, |(_, l)| *l);
                log::debug!(
                    "iteration {}/{}: iteration best {:.4}, global best {:.4}",
                    iteration, iterations, iteration_best, global_best
                );
            }

            history.push(IterationRecord { iteration, tours });
        }

        self.state = RunState::Done;

        // num_ants >= 1 guarantees at least one tour was built
        let (best_tour, best_length) = best.ok_or_else(|| AcoError::config("no tour was constructed"))?;
        log::info!("ACO finished: best length {:.4}", best_length);

        Ok(RunResult {
            best_tour,
            best_length,
            history,
            computation_time: start.elapsed().as_secs_f64(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Vec<City> {
        vec![
            City::new("A", 0.0, 0.0),
            City::new("B", 3.0, 0.0),
            City::new("C", 0.0, 4.0),
        ]
    }

    fn create_test_instance() -> TspInstance {
        let coords = [
            (0.0, 0.0), (2.0, 1.0), (4.0, 0.5), (5.0, 3.0),
            (3.0, 5.0), (1.0, 4.0), (-1.0, 2.5), (2.5, 2.5),
        ];
        let cities = coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| City::new(format!("c{}", i), x, y))
            .collect();
        TspInstance::new("octagon", cities)
    }

    struct Scripted(Vec<f64>, usize);

    impl UniformSource for Scripted {
        fn next_uniform(&mut self) -> f64 {
            let d = self.0[self.1 % self.0.len()];
            self.1 += 1;
            d
        }
    }

    #[test]
    fn test_default_config() {
        let config = ACOConfig::default();
        assert_eq!(config.num_ants, 20);
        assert!(config.validate(5).is_ok());
    }

    #[test]
    fn test_rejects_bad_configuration() {
        let cases = vec![
            (1, ACOConfig::default()),
            (3, ACOConfig { start_index: 3, ..Default::default() }),
            (3, ACOConfig { num_ants: 0, ..Default::default() }),
            (3, ACOConfig { evaporation_rate: 1.5, ..Default::default() }),
            (3, ACOConfig { evaporation_rate: -0.1, ..Default::default() }),
            (3, ACOConfig { alpha: -1.0, ..Default::default() }),
            (3, ACOConfig { beta: f64::NAN, ..Default::default() }),
            (3, ACOConfig { q: 0.0, ..Default::default() }),
        ];
        for (n, config) in cases {
            assert!(
                matches!(config.validate(n), Err(AcoError::Configuration(_))),
                "accepted {:?} for n = {}",
                config,
                n
            );
        }
    }

    #[test]
    fn test_new_rejects_single_city() {
        let result = AntColonyOptimization::from_cities(vec![City::new("solo", 1.0, 1.0)], ACOConfig::default());
        assert!(matches!(result, Err(AcoError::Configuration(_))));
    }

    #[test]
    fn test_zero_iterations_leaves_pheromone_untouched() {
        let mut aco = AntColonyOptimization::from_cities(triangle(), ACOConfig::default()).unwrap();
        let before = aco.pheromone().clone();

        assert!(matches!(aco.run(0), Err(AcoError::Configuration(_))));
        assert_eq!(aco.pheromone(), &before);
        assert_eq!(aco.state(), RunState::Idle);
    }

    #[test]
    fn test_triangle_scenario() {
        let config = ACOConfig {
            num_ants: 1,
            alpha: 1.0,
            beta: 2.0,
            evaporation_rate: 0.5,
            q: 100.0,
            start_index: 0,
            ..Default::default()
        };
        for seed in 0..10 {
            let mut aco = AntColonyOptimization::from_cities(triangle(), ACOConfig { seed, ..config.clone() }).unwrap();
            let result = aco.run(1).unwrap();
            assert!((result.best_length - 12.0).abs() < 1e-10);
            assert!(result.best_tour.is_valid(3));
            assert_eq!(result.history.len(), 1);
        }
    }

    #[test]
    fn test_two_city_scenario() {
        let cities = vec![City::new("a", 0.0, 0.0), City::new("b", 5.0, 0.0)];
        let config = ACOConfig { num_ants: 1, alpha: 3.0, beta: 0.5, ..Default::default() };
        let mut aco = AntColonyOptimization::from_cities(cities, config).unwrap();
        let result = aco.run(1).unwrap();

        assert_eq!(result.best_tour.as_slice(), &[0, 1, 0]);
        assert!((result.best_length - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_scripted_draws_pick_expected_order() {
        let config = ACOConfig { num_ants: 1, alpha: 1.0, beta: 2.0, ..Default::default() };

        let instance = TspInstance::new("triangle", triangle());
        let mut low = AntColonyOptimization::with_rng(instance.clone(), config.clone(), Scripted(vec![0.0], 0)).unwrap();
        assert_eq!(low.construct_tour().unwrap().as_slice(), &[0, 1, 2, 0]);

        let mut high = AntColonyOptimization::with_rng(instance, config, Scripted(vec![0.999], 0)).unwrap();
        assert_eq!(high.construct_tour().unwrap().as_slice(), &[0, 2, 1, 0]);
    }

    #[test]
    fn test_tours_start_at_configured_city() {
        let config = ACOConfig { num_ants: 4, start_index: 5, ..Default::default() };
        let mut aco = AntColonyOptimization::new(create_test_instance(), config).unwrap();
        let result = aco.run(3).unwrap();

        for record in &result.history {
            for tour in &record.tours {
                assert!(tour.is_valid(8));
                assert_eq!(tour.start(), Some(5));
            }
        }
    }

    #[test]
    fn test_history_and_best() {
        let config = ACOConfig { num_ants: 5, ..Default::default() };
        let mut aco = AntColonyOptimization::new(create_test_instance(), config).unwrap();
        let result = aco.run(10).unwrap();

        assert_eq!(result.iterations(), 10);
        assert_eq!(aco.state(), RunState::Done);
        for (k, record) in result.history.iter().enumerate() {
            assert_eq!(record.iteration, k + 1);
            assert_eq!(record.tours.len(), 5);
            for tour in &record.tours {
                assert!(result.best_length <= aco.evaluate_tour_length(tour));
            }
        }
        assert_eq!(result.best_length, aco.evaluate_tour_length(&result.best_tour));
    }

    #[test]
    fn test_best_is_first_found_among_ties() {
        // Both orders of the triangle have length 12: the first ant's tour must win
        let config = ACOConfig { num_ants: 2, ..Default::default() };
        let instance = TspInstance::new("triangle", triangle());
        let mut aco = AntColonyOptimization::with_rng(instance, config, Scripted(vec![0.999, 0.5, 0.0, 0.5], 0)).unwrap();
        let result = aco.run(1).unwrap();

        assert_eq!(result.history[0].tours[0].as_slice(), &[0, 2, 1, 0]);
        assert_eq!(result.history[0].tours[1].as_slice(), &[0, 1, 2, 0]);
        assert_eq!(result.best_tour.as_slice(), &[0, 2, 1, 0]);
    }

    #[test]
    fn test_deterministic_with_seed() {
        let config = ACOConfig { num_ants: 6, seed: 1234, ..Default::default() };
        let mut a = AntColonyOptimization::new(create_test_instance(), config.clone()).unwrap();
        let mut b = AntColonyOptimization::new(create_test_instance(), config).unwrap();

        let ra = a.run(15).unwrap();
        let rb = b.run(15).unwrap();

        assert_eq!(ra.best_tour, rb.best_tour);
        assert_eq!(ra.best_length, rb.best_length);
        for (x, y) in ra.history.iter().zip(&rb.history) {
            assert_eq!(x.tours, y.tours);
        }
        assert_eq!(a.pheromone(), b.pheromone());
    }

    #[test]
    fn test_pheromone_reinforces_used_edges() {
        let config = ACOConfig { num_ants: 1, evaporation_rate: 0.5, q: 100.0, ..Default::default() };
        let instance = TspInstance::new("triangle", triangle());
        let mut aco = AntColonyOptimization::with_rng(instance, config, Scripted(vec![0.0], 0)).unwrap();
        aco.run(1).unwrap();

        let init = 1.0 / 9.0;
        let expected = 0.5 * init + 100.0 / 12.0;
        assert!((aco.pheromone().get(0, 1) - expected).abs() < 1e-12);
        assert!((aco.pheromone().get(1, 2) - expected).abs() < 1e-12);
        assert!((aco.pheromone().get(2, 0) - expected).abs() < 1e-12);
        assert!((aco.pheromone().get(0, 2) - 0.5 * init).abs() < 1e-12);
    }

    #[test]
    fn test_full_evaporation_clears_unused_edges() {
        let config = ACOConfig { num_ants: 1, evaporation_rate: 1.0, q: 100.0, ..Default::default() };
        let instance = TspInstance::new("triangle", triangle());
        let mut aco = AntColonyOptimization::with_rng(instance, config, Scripted(vec![0.0], 0)).unwrap();
        let result = aco.run(3).unwrap();

        assert!(result.best_tour.is_valid(3));
        assert!((aco.pheromone().get(0, 1) - 100.0 / 12.0).abs() < 1e-12);
        assert_eq!(aco.pheromone().get(0, 2), 0.0);
        assert_eq!(aco.pheromone().get(1, 1), 0.0);
    }

    #[test]
    fn test_zero_weight_dead_end_samples_on_visibility() {
        // Unit square. Iteration 1 walks 0 -> 2 -> 1 -> 3 -> 0; with rho = 1 every
        // other edge drops to zero. Zero draws in iteration 2 then lead 0 -> 1 -> 2,
        // where the only remaining edge 2 -> 3 carries no pheromone.
        let cities = vec![
            City::new("a", 0.0, 0.0),
            City::new("b", 1.0, 0.0),
            City::new("c", 1.0, 1.0),
            City::new("d", 0.0, 1.0),
        ];
        let config = ACOConfig { num_ants: 1, alpha: 1.0, beta: 2.0, evaporation_rate: 1.0, ..Default::default() };
        let draws = Scripted(vec![0.5, 0.0, 0.0, 0.0, 0.0, 0.0], 0);
        let mut aco = AntColonyOptimization::with_rng(TspInstance::new("square", cities), config, draws).unwrap();

        let result = aco.run(2).unwrap();
        assert_eq!(result.history[0].tours[0].as_slice(), &[0, 2, 1, 3, 0]);
        assert_eq!(result.history[1].tours[0].as_slice(), &[0, 1, 2, 3, 0]);
        assert!((result.best_length - 4.0).abs() < 1e-12);
        assert_eq!(aco.state(), RunState::Done);
    }

    #[test]
    fn test_full_evaporation_with_many_ants() {
        for seed in 0..50 {
            let config = ACOConfig { num_ants: 10, evaporation_rate: 1.0, seed, ..Default::default() };
            let mut aco = AntColonyOptimization::new(create_test_instance(), config).unwrap();
            let result = aco.run(20).unwrap_or_else(|e| panic!("seed {}: {}", seed, e));
            assert_eq!(result.iterations(), 20);
            assert!(result.best_tour.is_valid(8));
        }
    }

    #[test]
    fn test_fully_coincident_cities_keep_pheromone_finite() {
        let cities = vec![City::new("a", 1.0, 1.0), City::new("b", 1.0, 1.0)];
        let mut aco = AntColonyOptimization::from_cities(cities, ACOConfig { num_ants: 1, ..Default::default() }).unwrap();
        let result = aco.run(3).unwrap();

        assert_eq!(result.best_length, 0.0);
        for row in aco.pheromone().rows() {
            assert!(row.iter().all(|cell| cell.is_finite()));
        }

        let cities = (0..4).map(|i| City::new(format!("p{}", i), 2.0, -3.0)).collect();
        let mut aco = AntColonyOptimization::from_cities(cities, ACOConfig { num_ants: 3, ..Default::default() }).unwrap();
        let result = aco.run(5).unwrap();
        assert!(result.best_tour.is_valid(4));
    }

    #[test]
    fn test_coincident_cities() {
        let cities = vec![
            City::new("a", 0.0, 0.0),
            City::new("b", 0.0, 0.0),
            City::new("c", 1.0, 1.0),
        ];
        let mut aco = AntColonyOptimization::from_cities(cities, ACOConfig { num_ants: 3, ..Default::default() }).unwrap();
        let result = aco.run(4).unwrap();
        assert!(result.best_tour.is_valid(3));
        assert!((result.best_length - 2.0 * 2f64.sqrt()).abs() < 1e-10);
    }

    #[test]
    fn test_run_continues_from_current_pheromone() {
        let config = ACOConfig { num_ants: 2, ..Default::default() };
        let mut aco = AntColonyOptimization::new(create_test_instance(), config).unwrap();
        aco.run(2).unwrap();
        let after_first = aco.pheromone().clone();
        aco.run(1).unwrap();
        assert_ne!(aco.pheromone(), &after_first);
    }
}
