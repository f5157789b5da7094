//! Module for parsing and representing TSP instances.
//!
//! This module holds the named cities of a run, the Euclidean distance matrix
//! derived from them, and the tour evaluator. Instances can be built in memory
//! or loaded from TSPLIB (`NODE_COORD_SECTION`) and `name,x,y` CSV files.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::{AcoError, AcoResult};

/// Represents a named point of the instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    /// Identifier shown to the user (not required to be unique)
    pub name: String,
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl City {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        City { name: name.into(), x, y }
    }

    /// Euclidean distance to another city
    #[inline]
    pub fn distance_to(&self, other: &City) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Represents a complete TSP instance
#[derive(Debug, Clone, Serialize)]
pub struct TspInstance {
    /// Name of the instance
    pub name: String,
    /// Cities, indexed 0..dimension
    pub cities: Vec<City>,
    /// Number of cities
    pub dimension: usize,
    /// Precomputed symmetric distance matrix with a zero diagonal
    #[serde(skip)]
    pub distance_matrix: Vec<Vec<f64>>,
}

impl TspInstance {
    /// Build an instance from an ordered list of cities.
    ///
    /// Duplicate names and coincident points are accepted; both are logged.
    pub fn new(name: impl Into<String>, cities: Vec<City>) -> Self {
        let name = name.into();
        let distance_matrix = Self::compute_distance_matrix(&cities);

        let mut seen = HashSet::new();
        for city in &cities {
            if !seen.insert(city.name.as_str()) {
                log::warn!("instance {}: duplicate city name {:?}", name, city.name);
            }
        }
        for i in 0..cities.len() {
            for j in i + 1..cities.len() {
                if distance_matrix[i][j] == 0.0 {
                    log::warn!(
                        "instance {}: cities {} and {} share coordinates ({}, {})",
                        name, i, j, cities[i].x, cities[i].y
                    );
                }
            }
        }

        TspInstance {
            name,
            dimension: cities.len(),
            cities,
            distance_matrix,
        }
    }

    /// Load an instance from a file.
    ///
    /// A first line starting with `name,` selects the CSV reader; anything
    /// else is read as TSPLIB.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AcoResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let fallback_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let is_csv = content
            .lines()
            .find(|l| !l.trim().is_empty())
            .map(|l| l.trim().to_ascii_lowercase().starts_with("name,"))
            .unwrap_or(false);

        if is_csv {
            Self::from_csv_str(&fallback_name, &content)
        } else {
            Self::from_tsplib_str(&fallback_name, &content)
        }
    }

    /// Parse `name,x,y` CSV content (header required).
    pub fn from_csv_str(name: &str, content: &str) -> AcoResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut cities = Vec::new();
        for record in reader.deserialize() {
            let city: City = record?;
            cities.push(city);
        }

        Ok(Self::new(name, cities))
    }

    /// Parse TSPLIB content. Only `NAME` and `NODE_COORD_SECTION` matter;
    /// other headers are skipped.
    pub fn from_tsplib_str(fallback_name: &str, content: &str) -> AcoResult<Self> {
        let mut name = fallback_name.to_string();
        let mut cities = Vec::new();
        let mut in_coords = false;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();

            if line.is_empty() {
                continue;
            }
            if line == "EOF" {
                break;
            }
            if line.starts_with("NODE_COORD_SECTION") {
                in_coords = true;
                continue;
            }
            if line.ends_with("_SECTION") {
                in_coords = false;
                continue;
            }

            if !in_coords {
                if let Some((key, value)) = line.split_once(':') {
                    if key.trim() == "NAME" {
                        name = value.trim().to_string();
                    }
                }
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 {
                return Err(AcoError::Parse {
                    line: line_no,
                    message: format!("expected `id x y`, got {:?}", line),
                });
            }
            let x: f64 = parts[1].parse().map_err(|_| AcoError::Parse {
                line: line_no,
                message: format!("invalid x coordinate {:?}", parts[1]),
            })?;
            let y: f64 = parts[2].parse().map_err(|_| AcoError::Parse {
                line: line_no,
                message: format!("invalid y coordinate {:?}", parts[2]),
            })?;
            cities.push(City::new(parts[0], x, y));
        }

        Ok(Self::new(name, cities))
    }

    /// Compute Euclidean distance matrix
    fn compute_distance_matrix(cities: &[City]) -> Vec<Vec<f64>> {
        let n = cities.len();
        let mut matrix = vec![vec![0.0; n]; n];

        for i in 0..n {
            for j in i + 1..n {
                let d = cities[i].distance_to(&cities[j]);
                matrix[i][j] = d;
                matrix[j][i] = d;
            }
        }

        matrix
    }

    /// Get the distance between two cities
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distance_matrix[i][j]
    }

    /// Total length of a closed tour.
    ///
    /// The tour already repeats its start city at the end, so this is the sum
    /// over consecutive pairs only; no extra closing edge is added.
    ///
    /// # Panics
    ///
    /// Panics if the tour holds an index `>= self.dimension`.
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        tour.windows(2).map(|w| self.distance(w[0], w[1])).sum()
    }

    /// Resolve a user-supplied start point: exact name first, then a 0-based index.
    pub fn resolve_start(&self, query: &str) -> AcoResult<usize> {
        let query = query.trim();
        if let Some(idx) = self.cities.iter().position(|c| c.name == query) {
            return Ok(idx);
        }
        match query.parse::<usize>() {
            Ok(idx) if idx < self.dimension => Ok(idx),
            _ => Err(AcoError::UnknownCity(query.to_string())),
        }
    }

    /// Get the name of a city by index
    pub fn city_name(&self, idx: usize) -> &str {
        &self.cities[idx].name
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let mut distances: Vec<f64> = Vec::new();
        for i in 0..self.dimension {
            for j in i + 1..self.dimension {
                distances.push(self.distance(i, j));
            }
        }

        let avg_distance = if distances.is_empty() {
            0.0
        } else {
            distances.iter().sum::<f64>() / distances.len() as f64
        };
        let min_distance = distances.iter().copied().map(OrderedFloat).min().map_or(0.0, |d| d.0);
        let max_distance = distances.iter().copied().map(OrderedFloat).max().map_or(0.0, |d| d.0);

        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for city in &self.cities {
            min_x = min_x.min(city.x);
            max_x = max_x.max(city.x);
            min_y = min_y.min(city.y);
            max_y = max_y.max(city.y);
        }

        InstanceStatistics {
            name: self.name.clone(),
            dimension: self.dimension,
            min_distance,
            avg_distance,
            max_distance,
            bounds: (min_x, max_x, min_y, max_y),
        }
    }
}

/// Statistics about a TSP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub dimension: usize,
    pub min_distance: f64,
    pub avg_distance: f64,
    pub max_distance: f64,
    /// (min_x, max_x, min_y, max_y)
    pub bounds: (f64, f64, f64, f64),
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Cities: {}", self.dimension)?;
        writeln!(f, "  Min distance: {:.2}", self.min_distance)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)?;
        let (min_x, max_x, min_y, max_y) = self.bounds;
        writeln!(f, "  Bounds: x [{:.2}, {:.2}], y [{:.2}, {:.2}]", min_x, max_x, min_y, max_y)
    }
}
