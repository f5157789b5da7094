//! Roulette-wheel selection of the next city.

use rand::RngCore;

use crate::error::{AcoError, AcoResult};
use crate::heuristics::pheromone::PheromoneMatrix;

/// Floor applied to distances when computing visibility, so coincident
/// points get a very large but finite attractiveness.
pub const MIN_DISTANCE: f64 = 1e-10;

/// Stream of uniform draws in `[0, 1)`.
///
/// Every random decision of the colony goes through this trait, so a seeded
/// generator (or a scripted source in tests) makes runs reproducible.
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

impl<R: RngCore> UniformSource for R {
    fn next_uniform(&mut self) -> f64 {
        rand::Rng::gen::<f64>(self)
    }
}

/// Selection weight `tau^alpha * (1/d)^beta` of the edge `current -> to`
#[inline]
pub fn edge_weight(
    pheromone: &PheromoneMatrix,
    distances: &[Vec<f64>],
    current: usize,
    to: usize,
    alpha: f64,
    beta: f64,
) -> f64 {
    pheromone.get(current, to).powf(alpha) * visibility(distances, current, to, beta)
}

/// Draw the next city among the unvisited ones.
///
/// `draw` is a uniform sample in `[0, 1)`, scaled by the weight total. The
/// first candidate whose cumulative weight reaches the scaled draw wins.
///
/// When every candidate weighs exactly zero (pheromone fully evaporated or
/// underflowed), the same draw is spent on visibility alone, `(1/d)^beta`,
/// and if that underflows too, uniformly over the candidates. No candidates,
/// a non-finite total or a draw past every cumulative weight is reported as
/// [`AcoError::DegenerateSample`].
pub fn select_next_city(
    current: usize,
    visited: &[bool],
    pheromone: &PheromoneMatrix,
    distances: &[Vec<f64>],
    alpha: f64,
    beta: f64,
    draw: f64,
) -> AcoResult<usize> {
    let candidates: Vec<usize> = visited
        .iter()
        .enumerate()
        .filter(|&(_, &seen)| !seen)
        .map(|(j, _)| j)
        .collect();

    let degenerate = |total: f64| AcoError::DegenerateSample {
        current,
        draw: draw * total,
        total,
    };

    if candidates.is_empty() {
        return Err(degenerate(0.0));
    }

    let weighted: Vec<(usize, f64)> = candidates
        .iter()
        .map(|&j| (j, edge_weight(pheromone, distances, current, j, alpha, beta)))
        .collect();
    let total = weight_total(&weighted);
    if total > 0.0 || !total.is_finite() {
        return spin(&weighted, total, draw).ok_or_else(|| degenerate(total));
    }

    log::trace!("all pheromone weights from city {} are zero, sampling on visibility", current);
    let weighted: Vec<(usize, f64)> = candidates
        .iter()
        .map(|&j| (j, visibility(distances, current, j, beta)))
        .collect();
    let total = weight_total(&weighted);
    if total > 0.0 || !total.is_finite() {
        return spin(&weighted, total, draw).ok_or_else(|| degenerate(total));
    }

    let k = ((draw * candidates.len() as f64) as usize).min(candidates.len() - 1);
    Ok(candidates[k])
}

#[inline]
fn visibility(distances: &[Vec<f64>], current: usize, to: usize, beta: f64) -> f64 {
    (1.0 / distances[current][to].max(MIN_DISTANCE)).powf(beta)
}

fn weight_total(weighted: &[(usize, f64)]) -> f64 {
    weighted.iter().map(|&(_, w)| w).sum()
}

/// Roulette spin over a positive, finite total.
fn spin(weighted: &[(usize, f64)], total: f64, draw: f64) -> Option<usize> {
    if !(total > 0.0 && total.is_finite()) {
        return None;
    }
    let target = draw * total;
    let mut cumulative = 0.0;
    for &(j, weight) in weighted {
        cumulative += weight;
        if target <= cumulative {
            return Some(j);
        }
    }
    None
}
