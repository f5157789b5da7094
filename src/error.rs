//! Error types for the ACO TSP solver.

use thiserror::Error;

/// Result alias used across the crate.
pub type AcoResult<T> = Result<T, AcoError>;

/// Everything that can go wrong while loading an instance or running the colony.
#[derive(Debug, Error)]
pub enum AcoError {
    /// Invalid instance size, start index, ant count, rate or iteration count.
    /// Raised before any state is touched.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The roulette draw fell past the cumulative weight of every candidate.
    /// Only reachable with a zero, negative or non-finite weight total.
    #[error("degenerate roulette sample at city {current}: draw {draw} exceeds cumulative weight {total}")]
    DegenerateSample {
        current: usize,
        draw: f64,
        total: f64,
    },

    /// Malformed line in an instance file (1-based line number).
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A start point that matches neither a city name nor a valid index.
    #[error("unknown city: {0}")]
    UnknownCity(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AcoError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        AcoError::Configuration(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AcoError::config("num_ants must be at least 1");
        assert_eq!(err.to_string(), "configuration error: num_ants must be at least 1");

        let err = AcoError::DegenerateSample { current: 3, draw: 0.5, total: 0.0 };
        assert!(err.to_string().contains("city 3"));
    }
}
