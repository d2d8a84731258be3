//! Density-based clustering.
//!
//! [`Dbscan`] classifies points as core, border, or noise and groups the
//! density-connected ones into clusters, given a radius `eps` and a minimum
//! neighborhood population `min_samples`.

mod dbscan;

pub use dbscan::{ClusterAssignment, ClusterId, Dbscan, PointLabel};

#[cfg(test)]
mod tests_dbscan_contract;
