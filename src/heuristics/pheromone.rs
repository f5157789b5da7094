//! Pheromone matrix and the evaporation/deposit update.

use serde::Serialize;

use crate::heuristics::selection::MIN_DISTANCE;
use crate::solution::Tour;

/// N×N pheromone intensities indexed by directed edge `(from, to)`.
///
/// Every entry, diagonal included, starts at `1 / N²`. Only the colony that
/// owns the matrix can rewrite it, once per iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PheromoneMatrix {
    cells: Vec<Vec<f64>>,
}

impl PheromoneMatrix {
    pub fn new(n: usize) -> Self {
        let initial = if n == 0 { 0.0 } else { 1.0 / (n * n) as f64 };
        PheromoneMatrix {
            cells: vec![vec![initial; n]; n],
        }
    }

    pub fn dimension(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.cells[from][to]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.cells
    }

    /// Apply one iteration's update to every cell:
    /// `tau(i,j) = (1 - rho) * tau(i,j) + sum_T q / L(T)` over tours `T` that
    /// traverse `i -> j`.
    ///
    /// `lengths[k]` is the length of `tours[k]`, computed once per tour. Like
    /// visibility, the length is floored at [`MIN_DISTANCE`], so a tour over
    /// coincident points deposits a large but finite amount.
    /// Deposits are accumulated separately and each cell is written once, so
    /// no cell reads an already-updated neighbour.
    pub(crate) fn evaporate_and_deposit(&mut self, tours: &[Tour], lengths: &[f64], rho: f64, q: f64) {
        debug_assert_eq!(tours.len(), lengths.len());
        let n = self.cells.len();
        let mut deposit = vec![vec![0.0; n]; n];

        for (tour, &length) in tours.iter().zip(lengths) {
            let amount = q / length.max(MIN_DISTANCE);
            for (from, to) in tour.edges() {
                deposit[from][to] += amount;
            }
        }

        let keep = 1.0 - rho;
        for (row, deposit_row) in self.cells.iter_mut().zip(&deposit) {
            for (cell, &d) in row.iter_mut().zip(deposit_row) {
                *cell = keep * *cell + d;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_value() {
        let matrix = PheromoneMatrix::new(4);
        assert_eq!(matrix.dimension(), 4);
        for i in 0..4 {
            for j in 0..4 {
                assert!((matrix.get(i, j) - 1.0 / 16.0).abs() < 1e-15);
            }
        }
    }

    #[test]
    fn test_evaporation_only_on_untouched_edges() {
        let mut matrix = PheromoneMatrix::new(3);
        let tours = vec![Tour::new(vec![0, 1, 2, 0])];
        matrix.evaporate_and_deposit(&tours, &[12.0], 0.5, 100.0);

        let init = 1.0 / 9.0;
        let deposited = 0.5 * init + 100.0 / 12.0;
        assert!((matrix.get(0, 1) - deposited).abs() < 1e-12);
        assert!((matrix.get(1, 2) - deposited).abs() < 1e-12);
        assert!((matrix.get(2, 0) - deposited).abs() < 1e-12);
        // reverse direction and diagonal only evaporate
        assert!((matrix.get(1, 0) - 0.5 * init).abs() < 1e-12);
        assert!((matrix.get(0, 0) - 0.5 * init).abs() < 1e-12);
    }

    #[test]
    fn test_deposits_accumulate_across_tours() {
        let mut matrix = PheromoneMatrix::new(2);
        let tours = vec![Tour::new(vec![0, 1, 0]), Tour::new(vec![0, 1, 0])];
        matrix.evaporate_and_deposit(&tours, &[10.0, 20.0], 1.0, 100.0);

        assert!((matrix.get(0, 1) - 15.0).abs() < 1e-12);
        assert!((matrix.get(1, 0) - 15.0).abs() < 1e-12);
        assert_eq!(matrix.get(0, 0), 0.0);
    }

    /// Direct transcription of the per-cell rule: for every (i, j), scan every
    /// tour for `i` immediately followed by `j` and recompute its length.
    fn naive_update(
        before: &[Vec<f64>],
        tours: &[Tour],
        length: impl Fn(&Tour) -> f64,
        rho: f64,
        q: f64,
    ) -> Vec<Vec<f64>> {
        let n = before.len();
        let mut after = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                let mut deposit = 0.0;
                for tour in tours {
                    let cities = tour.as_slice();
                    for k in 0..cities.len() - 1 {
                        if cities[k] == i && cities[k + 1] == j {
                            deposit += q / length(tour);
                        }
                    }
                }
                after[i][j] = (1.0 - rho) * before[i][j] + deposit;
            }
        }
        after
    }

    #[test]
    fn test_zero_length_tour_deposits_finite_amount() {
        let mut matrix = PheromoneMatrix::new(2);
        let tours = vec![Tour::new(vec![0, 1, 0])];
        matrix.evaporate_and_deposit(&tours, &[0.0], 0.1, 100.0);

        let expected = 0.9 * 0.25 + 100.0 / MIN_DISTANCE;
        assert!(matrix.get(0, 1).is_finite());
        assert!((matrix.get(0, 1) - expected).abs() <= 1e-9 * expected);
        assert!((matrix.get(0, 0) - 0.225).abs() < 1e-15);
    }

    #[test]
    fn test_matches_naive_per_cell_rule() {
        use crate::instance::{City, TspInstance};

        let instance = TspInstance::new(
            "square",
            vec![
                City::new("a", 0.0, 0.0),
                City::new("b", 1.0, 0.0),
                City::new("c", 1.0, 1.0),
                City::new("d", 0.0, 1.0),
            ],
        );
        let tours = vec![
            Tour::new(vec![2, 0, 1, 3, 2]),
            Tour::new(vec![2, 3, 0, 1, 2]),
            Tour::new(vec![2, 1, 0, 3, 2]),
        ];
        let lengths: Vec<f64> = tours.iter().map(|t| instance.tour_length(t.as_slice())).collect();

        let mut matrix = PheromoneMatrix::new(4);
        let expected = naive_update(
            matrix.rows(),
            &tours,
            |t| instance.tour_length(t.as_slice()),
            0.3,
            7.0,
        );
        matrix.evaporate_and_deposit(&tours, &lengths, 0.3, 7.0);

        for i in 0..4 {
            for j in 0..4 {
                assert!(
                    (matrix.get(i, j) - expected[i][j]).abs() < 1e-12,
                    "cell ({}, {}) differs",
                    i,
                    j
                );
            }
        }
    }
}
