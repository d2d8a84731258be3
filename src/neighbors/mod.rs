//! Nearest-neighbor distance computations.
//!
//! Provides the k-th nearest neighbor distance profile used to choose the
//! DBSCAN `eps` radius: sort each point's distance to its k-th nearest other
//! point ascending and look for the elbow where the curve turns steep.
//!
//! Picking `eps` is a two-phase protocol. Phase 1 ([`NeighborProfile::compute`])
//! produces data only; phase 2 is the caller handing their chosen radius to
//! [`crate::cluster::Dbscan`]. [`NeighborProfile::suggest_eps`] offers a
//! maximum-curvature heuristic as a convenience default, never a mandate.

use crate::error::{AgruparError, Result};
use crate::primitives::{Matrix, Vector};
use serde::{Deserialize, Serialize};

/// Euclidean distance between two coordinate slices.
///
/// Canonical distance path for the crate; the clustering engine and the
/// neighbor profile both delegate here.
///
/// ```text
/// d(a, b) = sqrt(Σ(a_i - b_i)²)
/// ```
#[must_use]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x - y).powi(2))
        .sum::<f32>()
        .sqrt()
}

/// Computes each point's distance to its k-th nearest *other* point.
///
/// Naive O(N²) pairwise scan with partial selection; duplicate coordinates
/// are valid and simply yield zero distances.
///
/// # Arguments
///
/// * `x` - Point set, one row per point
/// * `k` - Which neighbor to measure (1 = nearest other point)
///
/// # Errors
///
/// * `InvalidHyperparameter` if `k == 0`
/// * `InsufficientPoints` if the point set has fewer than `k + 1` points
pub fn kth_neighbor_distances(x: &Matrix<f32>, k: usize) -> Result<Vector<f32>> {
    if k == 0 {
        return Err(AgruparError::invalid_hyperparameter("k", k, ">= 1"));
    }

    let n_samples = x.n_rows();
    if n_samples < k + 1 {
        return Err(AgruparError::InsufficientPoints {
            needed: k + 1,
            available: n_samples,
        });
    }

    let mut result = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let mut dists: Vec<f32> = (0..n_samples)
            .filter(|&j| j != i)
            .map(|j| euclidean_distance(x.row_slice(i), x.row_slice(j)))
            .collect();
        // Partial selection: only the k smallest need ordering.
        dists.select_nth_unstable_by(k - 1, f32::total_cmp);
        result.push(dists[k - 1]);
    }

    Ok(Vector::from_vec(result))
}

/// Sorted k-th nearest neighbor distance profile (the "k-NN distance plot").
///
/// Holds one distance per point, sorted ascending. A presentation layer plots
/// sorted index against distance; the elbow where the curve transitions from
/// flat to steep is the conventional `eps` choice.
///
/// # Examples
///
/// ```
/// use agrupar::prelude::*;
///
/// let data = Matrix::from_vec(5, 2, vec![
///     0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 10.0, 10.0,
/// ]).unwrap();
///
/// let profile = NeighborProfile::compute(&data, 2).unwrap();
/// assert_eq!(profile.len(), 5);
/// // Sorted ascending by construction.
/// let d = profile.distances();
/// assert!(d.windows(2).all(|w| w[0] <= w[1]));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborProfile {
    /// Which neighbor was measured.
    k: usize,
    /// One distance per point, sorted ascending.
    distances: Vec<f32>,
}

impl NeighborProfile {
    /// Computes the profile for a point set.
    ///
    /// By convention `k` is chosen as `min_samples` (often dimensionality + 1),
    /// but any `k >= 1` is accepted.
    ///
    /// # Errors
    ///
    /// Same failure conditions as [`kth_neighbor_distances`].
    pub fn compute(x: &Matrix<f32>, k: usize) -> Result<Self> {
        let mut distances = kth_neighbor_distances(x, k)?.into_vec();
        distances.sort_unstable_by(f32::total_cmp);
        Ok(Self { k, distances })
    }

    /// Which neighbor this profile measures.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// The sorted distances, ascending.
    #[must_use]
    pub fn distances(&self) -> &[f32] {
        &self.distances
    }

    /// Number of points in the profile.
    #[must_use]
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    /// Returns true if the profile is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Suggests an `eps` at the elbow of the sorted curve.
    ///
    /// Heuristic: the distance at the interior index with the largest
    /// discrete second difference (maximum curvature). This is a convenience
    /// default only; a caller inspecting the plot can always pass their own
    /// radius to the clustering engine instead.
    ///
    /// Returns `None` when the profile has fewer than 3 points, where no
    /// curvature is defined.
    #[must_use]
    pub fn suggest_eps(&self) -> Option<f32> {
        if self.distances.len() < 3 {
            return None;
        }

        let d = &self.distances;
        let mut best_idx = 1;
        let mut best_curvature = f32::NEG_INFINITY;
        for i in 1..d.len() - 1 {
            let curvature = d[i + 1] - 2.0 * d[i] + d[i - 1];
            if curvature > best_curvature {
                best_curvature = curvature;
                best_idx = i;
            }
        }

        Some(d[best_idx])
    }
}
