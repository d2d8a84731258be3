//! DBSCAN (Density-Based Spatial Clustering of Applications with Noise).
//!
//! Density-based clustering algorithm that can find arbitrarily-shaped
//! clusters and identify outliers as noise points.

use crate::error::{AgruparError, Result};
use crate::neighbors::euclidean_distance;
use crate::primitives::Matrix;
use crate::traits::UnsupervisedEstimator;
use serde::{Deserialize, Serialize};

/// Identifier of a discovered cluster; positive, assigned in discovery order
/// starting at 1. The conventional id 0 stands for noise and is never held by
/// a [`PointLabel::Core`] or [`PointLabel::Border`].
pub type ClusterId = usize;

/// Classification of a single point after clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointLabel {
    /// Not reachable from any core point.
    Noise,
    /// Has at least `min_samples` points (itself included) within `eps`.
    Core(ClusterId),
    /// Within `eps` of a core point but not dense enough itself.
    Border(ClusterId),
}

impl PointLabel {
    /// Cluster id of the point; 0 for noise by convention.
    #[must_use]
    pub fn cluster_id(&self) -> usize {
        match self {
            PointLabel::Noise => 0,
            PointLabel::Core(c) | PointLabel::Border(c) => *c,
        }
    }

    /// Returns true for noise points.
    #[must_use]
    pub fn is_noise(&self) -> bool {
        matches!(self, PointLabel::Noise)
    }

    /// Returns true for core points.
    #[must_use]
    pub fn is_core(&self) -> bool {
        matches!(self, PointLabel::Core(_))
    }

    /// Returns true for border points.
    #[must_use]
    pub fn is_border(&self) -> bool {
        matches!(self, PointLabel::Border(_))
    }
}

/// Per-point labels produced by one clustering run.
///
/// Immutable after creation; every point holds exactly one label, cluster ids
/// run 1..=`n_clusters` in discovery order, and noise maps to id 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    labels: Vec<PointLabel>,
    n_clusters: usize,
}

impl ClusterAssignment {
    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if the assignment covers no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// All per-point labels, in input order.
    #[must_use]
    pub fn labels(&self) -> &[PointLabel] {
        &self.labels
    }

    /// Label of point `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds.
    #[must_use]
    pub fn label(&self, i: usize) -> PointLabel {
        self.labels[i]
    }

    /// Cluster id of point `i`; 0 for noise.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds.
    #[must_use]
    pub fn cluster_id(&self, i: usize) -> usize {
        self.labels[i].cluster_id()
    }

    /// Cluster ids for all points, in input order (0 = noise).
    ///
    /// This is the flat representation a presentation layer uses to color a
    /// scatter plot.
    #[must_use]
    pub fn cluster_ids(&self) -> Vec<usize> {
        self.labels.iter().map(PointLabel::cluster_id).collect()
    }

    /// Number of discovered clusters.
    #[must_use]
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Number of noise points.
    #[must_use]
    pub fn n_noise(&self) -> usize {
        self.labels.iter().filter(|l| l.is_noise()).count()
    }

    /// Point indices belonging to cluster `c` (core and border).
    #[must_use]
    pub fn members(&self, c: ClusterId) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, l)| l.cluster_id() == c && !l.is_noise())
            .map(|(i, _)| i)
            .collect()
    }

    /// Sizes of clusters 1..=`n_clusters`, indexed by `id - 1`.
    #[must_use]
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.n_clusters];
        for label in &self.labels {
            let c = label.cluster_id();
            if c > 0 {
                sizes[c - 1] += 1;
            }
        }
        sizes
    }
}

// Internal scan states; terminal states are NOISE and a cluster index >= 0.
const UNVISITED: i64 = -2;
const NOISE: i64 = -1;

/// Mutable traversal state owned by a single fit() invocation, so the engine
/// stays re-entrant across independent calls.
struct ScanState {
    labels: Vec<i64>,
    core: Vec<bool>,
}

impl ScanState {
    fn new(n_samples: usize) -> Self {
        Self {
            labels: vec![UNVISITED; n_samples],
            core: vec![false; n_samples],
        }
    }

    fn into_assignment(self, n_clusters: usize) -> ClusterAssignment {
        let labels = self
            .labels
            .iter()
            .zip(self.core.iter())
            .map(|(&label, &core)| match label {
                NOISE => PointLabel::Noise,
                c => {
                    // Internal ids are 0-based; public ids start at 1.
                    let id = usize::try_from(c).expect("cluster ids are non-negative") + 1;
                    if core {
                        PointLabel::Core(id)
                    } else {
                        PointLabel::Border(id)
                    }
                }
            })
            .collect();
        ClusterAssignment { labels, n_clusters }
    }
}

/// DBSCAN (Density-Based Spatial Clustering of Applications with Noise).
///
/// # Algorithm
///
/// 1. Visit points in ascending index order (deterministic traversal).
/// 2. For each unvisited point, find all neighbors within `eps` (inclusive,
///    the point itself counts).
/// 3. If the neighborhood has fewer than `min_samples` points, provisionally
///    mark the point as noise.
/// 4. Otherwise the point is a core point: open a new cluster and expand it
///    through the density-connectivity closure, absorbing unvisited points
///    and relabeling provisional noise as border points.
///
/// Results are deterministic for a fixed input order; cluster id *numbers*
/// are an artifact of traversal order, not a semantic guarantee.
///
/// The conventional `min_samples` default for D-dimensional data is `D + 1`,
/// and the matching `eps` is read off the elbow of a
/// [`crate::neighbors::NeighborProfile`]; both stay caller-supplied.
///
/// # Examples
///
/// ```
/// use agrupar::prelude::*;
///
/// let data = Matrix::from_vec(7, 2, vec![
///     1.0, 1.0,   // cluster 1
///     1.2, 1.1,   // cluster 1
///     1.1, 1.2,   // cluster 1
///     5.0, 5.0,   // cluster 2
///     5.1, 5.2,   // cluster 2
///     5.2, 5.1,   // cluster 2
///     10.0, 10.0, // noise
/// ]).expect("valid matrix dimensions and data length");
///
/// let mut dbscan = Dbscan::new(0.5, 2);
/// dbscan.fit(&data).expect("fit succeeds with valid data");
///
/// let assignment = dbscan.assignment();
/// assert_eq!(assignment.n_clusters(), 2);
/// assert!(assignment.label(6).is_noise());
/// ```
///
/// # Performance
///
/// - Time complexity: O(n²) for distance computations
/// - Space complexity: O(n)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dbscan {
    /// Maximum distance between two samples to be neighbors.
    eps: f32,
    /// Minimum neighborhood population (point included) to form a core point.
    min_samples: usize,
    /// Assignment after fitting.
    assignment: Option<ClusterAssignment>,
}

impl Dbscan {
    /// Creates a new DBSCAN with specified parameters.
    ///
    /// # Arguments
    ///
    /// * `eps` - Maximum distance between neighbors
    /// * `min_samples` - Minimum points to form a dense region
    #[must_use]
    pub fn new(eps: f32, min_samples: usize) -> Self {
        Self {
            eps,
            min_samples,
            assignment: None,
        }
    }

    /// Returns the eps parameter.
    #[must_use]
    pub fn eps(&self) -> f32 {
        self.eps
    }

    /// Returns the `min_samples` parameter.
    #[must_use]
    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Returns true if the model has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.assignment.is_some()
    }

    /// Returns the fitted cluster assignment.
    ///
    /// # Panics
    ///
    /// Panics if the model has not been fitted.
    #[must_use]
    pub fn assignment(&self) -> &ClusterAssignment {
        self.assignment
            .as_ref()
            .expect("Model not fitted. Call fit() first.")
    }

    fn validate(&self, x: &Matrix<f32>) -> Result<()> {
        if !self.eps.is_finite() || self.eps <= 0.0 {
            return Err(AgruparError::invalid_hyperparameter(
                "eps",
                self.eps,
                "> 0 and finite",
            ));
        }
        if self.min_samples < 1 {
            return Err(AgruparError::invalid_hyperparameter(
                "min_samples",
                self.min_samples,
                ">= 1",
            ));
        }
        if x.n_rows() == 0 {
            return Err(AgruparError::empty_input("point set"));
        }
        Ok(())
    }

    /// Finds all neighbors within eps distance of point i (i itself included).
    fn region_query(&self, x: &Matrix<f32>, i: usize) -> Vec<usize> {
        let n_samples = x.n_rows();
        let mut neighbors = Vec::new();

        for j in 0..n_samples {
            let dist = euclidean_distance(x.row_slice(i), x.row_slice(j));
            if dist <= self.eps {
                neighbors.push(j);
            }
        }

        neighbors
    }

    /// Expands a cluster from a core point through the density-connectivity
    /// closure.
    fn expand_cluster(
        &self,
        x: &Matrix<f32>,
        state: &mut ScanState,
        point: usize,
        neighbors: &mut Vec<usize>,
        cluster: i64,
    ) {
        state.labels[point] = cluster;
        state.core[point] = true;

        let mut i = 0;
        while i < neighbors.len() {
            let neighbor = neighbors[i];

            if state.labels[neighbor] == UNVISITED {
                state.labels[neighbor] = cluster;

                // Only core points extend the frontier; a border point never
                // pulls a third point into the cluster.
                let neighbor_neighbors = self.region_query(x, neighbor);
                if neighbor_neighbors.len() >= self.min_samples {
                    state.core[neighbor] = true;
                    for &nn in &neighbor_neighbors {
                        if !neighbors.contains(&nn) {
                            neighbors.push(nn);
                        }
                    }
                }
            } else if state.labels[neighbor] == NOISE {
                // Provisional noise reachable from a core point: border.
                state.labels[neighbor] = cluster;
            }

            i += 1;
        }
    }
}

impl UnsupervisedEstimator for Dbscan {
    type Labels = ClusterAssignment;

    fn fit(&mut self, x: &Matrix<f32>) -> Result<()> {
        self.validate(x)?;

        let n_samples = x.n_rows();
        let mut state = ScanState::new(n_samples);
        let mut next_cluster: i64 = 0;

        for i in 0..n_samples {
            // Skip if already processed.
            if state.labels[i] != UNVISITED {
                continue;
            }

            let mut neighbors = self.region_query(x, i);

            // Not a core point: provisional noise, may become border later.
            if neighbors.len() < self.min_samples {
                state.labels[i] = NOISE;
                continue;
            }

            self.expand_cluster(x, &mut state, i, &mut neighbors, next_cluster);
            next_cluster += 1;
        }

        let n_clusters = usize::try_from(next_cluster).expect("cluster count is non-negative");
        self.assignment = Some(state.into_assignment(n_clusters));
        Ok(())
    }

    /// For DBSCAN, predict returns the fitted assignment (assigning new
    /// points would require a different strategy).
    fn predict(&self, _x: &Matrix<f32>) -> Self::Labels {
        self.assignment().clone()
    }
}
