//! Problem instances for the TSP and 0/1 Knapsack solvers.
//!
//! Both problems come in two forms: a serde request body (`TspInput`,
//! `KnapsackInput`) exactly as callers send it, and a validated instance
//! (`TspInstance`, `KnapsackInstance`) that solvers consume. The validated
//! forms can only be built through their checking constructors.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque city label
pub type City = String;

/// TSP request body: an ordered city sequence and a nested distance mapping.
///
/// The first city is the fixed start of every tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TspInput {
    pub cities: Vec<City>,
    /// `distances[origin][destination]`, not necessarily symmetric
    pub distances: BTreeMap<City, BTreeMap<City, f64>>,
}

impl TspInput {
    pub fn new(cities: Vec<City>, distances: BTreeMap<City, BTreeMap<City, f64>>) -> Self {
        TspInput { cities, distances }
    }

    /// Check that every ordered pair of distinct cities has a distance.
    ///
    /// Cities are checked in sequence order and the first gap is reported.
    pub fn validate_distances(&self) -> Result<(), ValidationError> {
        if self.cities.is_empty() {
            return Err(ValidationError::NoCities);
        }

        for city in &self.cities {
            let row = self
                .distances
                .get(city)
                .ok_or_else(|| ValidationError::MissingCity(city.clone()))?;

            for other in &self.cities {
                if city != other && !row.contains_key(other) {
                    return Err(ValidationError::MissingDistance {
                        from: city.clone(),
                        to: other.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// A dense n×n distance matrix stored in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Creates a distance matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        DistanceMatrix {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Distance from `from` to `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Bounds-checked variant of [`DistanceMatrix::get`].
    #[inline]
    pub fn try_get(&self, from: usize, to: usize) -> Option<f64> {
        if from < self.size && to < self.size {
            Some(self.data[from * self.size + to])
        } else {
            None
        }
    }

    pub fn set(&mut self, from: usize, to: usize, distance: f64) {
        self.data[from * self.size + to] = distance;
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if the matrix is symmetric within the given tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }
}

/// A validated TSP instance with distances resolved to city indices.
#[derive(Debug, Clone, PartialEq)]
pub struct TspInstance {
    cities: Vec<City>,
    matrix: DistanceMatrix,
}

impl TspInstance {
    /// Validate a request body and resolve its distances into a dense matrix.
    ///
    /// A missing self-distance is taken as zero.
    pub fn new(input: &TspInput) -> Result<Self, ValidationError> {
        input.validate_distances()?;

        let n = input.cities.len();
        let mut matrix = DistanceMatrix::new(n);
        for (i, from) in input.cities.iter().enumerate() {
            let row = input
                .distances
                .get(from)
                .ok_or_else(|| ValidationError::MissingCity(from.clone()))?;
            for (j, to) in input.cities.iter().enumerate() {
                if let Some(&d) = row.get(to) {
                    matrix.set(i, j, d);
                }
            }
        }

        Ok(TspInstance {
            cities: input.cities.clone(),
            matrix,
        })
    }

    /// Build an instance from an already index-aligned matrix.
    pub fn from_matrix(cities: Vec<City>, matrix: DistanceMatrix) -> Result<Self, ValidationError> {
        if cities.is_empty() {
            return Err(ValidationError::NoCities);
        }
        if matrix.size() < cities.len() {
            return Err(ValidationError::MissingCity(cities[matrix.size()].clone()));
        }
        Ok(TspInstance { cities, matrix })
    }

    /// Number of cities
    pub fn dimension(&self) -> usize {
        self.cities.len()
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn matrix(&self) -> &DistanceMatrix {
        &self.matrix
    }

    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.matrix.get(i, j)
    }

    /// Sum of consecutive edge weights along a closed index route.
    pub fn tour_length(&self, route: &[usize]) -> f64 {
        route.windows(2).map(|w| self.distance(w[0], w[1])).sum()
    }

    /// Map an index route to city labels.
    pub fn route_names(&self, route: &[usize]) -> Vec<City> {
        route.iter().map(|&i| self.cities[i].clone()).collect()
    }

    /// Back to the nested request form, e.g. for cache keys or export.
    pub fn to_input(&self) -> TspInput {
        let mut distances = BTreeMap::new();
        for (i, from) in self.cities.iter().enumerate() {
            let row: BTreeMap<City, f64> = self
                .cities
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(j, to)| (to.clone(), self.distance(i, j)))
                .collect();
            distances.insert(from.clone(), row);
        }
        TspInput::new(self.cities.clone(), distances)
    }
}

/// A knapsack item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub weight: f64,
    pub value: f64,
}

impl Item {
    pub fn new(name: impl Into<String>, weight: f64, value: f64) -> Self {
        Item { name: name.into(), weight, value }
    }

    /// Weight truncated to whole units, the granularity of the DP grid.
    #[inline]
    pub fn grid_weight(&self) -> usize {
        self.weight as usize
    }
}

/// Knapsack request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnapsackInput {
    pub max_weight: f64,
    pub items: Vec<Item>,
}

impl KnapsackInput {
    pub fn new(max_weight: f64, items: Vec<Item>) -> Self {
        KnapsackInput { max_weight, items }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_weight.is_nan() || self.max_weight == f64::INFINITY {
            return Err(ValidationError::NonFiniteCapacity);
        }
        if self.max_weight < 0.0 {
            return Err(ValidationError::NegativeCapacity);
        }
        if let Some(item) = self
            .items
            .iter()
            .find(|item| !item.weight.is_finite() || item.weight < 0.0)
        {
            return Err(ValidationError::InvalidItemWeight(item.name.clone()));
        }
        Ok(())
    }
}

/// A validated knapsack instance
#[derive(Debug, Clone, PartialEq)]
pub struct KnapsackInstance {
    max_weight: f64,
    capacity: usize,
    items: Vec<Item>,
}

impl KnapsackInstance {
    pub fn new(input: &KnapsackInput) -> Result<Self, ValidationError> {
        input.validate()?;
        Ok(KnapsackInstance {
            max_weight: input.max_weight,
            capacity: input.max_weight as usize,
            items: input.items.clone(),
        })
    }

    /// Capacity as requested
    pub fn max_weight(&self) -> f64 {
        self.max_weight
    }

    /// Capacity floored to the DP grid size
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn num_items(&self) -> usize {
        self.items.len()
    }
}
