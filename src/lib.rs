//! Agrupar: density-based clustering with parameter selection and
//! categorical association testing, in pure Rust.
//!
//! The crate covers the analytical loop of a density-clustering study:
//! standardize the numeric features, inspect the k-NN distance profile to
//! pick a radius, run DBSCAN, then test the resulting cluster labels for
//! association with held-out categorical variables.
//!
//! # Quick Start
//!
//! ```
//! use agrupar::prelude::*;
//! use agrupar::stats::test_association;
//!
//! // Two dense groups and one outlier
//! let data = Matrix::from_vec(8, 2, vec![
//!     0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0,
//!     10.0, 10.0, 10.0, 11.0, 11.0, 10.0,
//!     20.0, 20.0,
//! ]).unwrap();
//!
//! // Phase 1: neighbor-distance profile for k = min_samples
//! let profile = NeighborProfile::compute(&data, 3).unwrap();
//! assert_eq!(profile.len(), 8);
//!
//! // Phase 2: cluster with the chosen radius
//! let mut dbscan = Dbscan::new(1.5, 3);
//! dbscan.fit(&data).unwrap();
//! let assignment = dbscan.assignment();
//! assert_eq!(assignment.n_clusters(), 2);
//! assert_eq!(assignment.n_noise(), 1);
//!
//! // Phase 3: associate cluster labels with a categorical variable
//! let sex: Vec<String> = ["F", "F", "M", "M", "M", "F", "M", "F"]
//!     .iter().map(ToString::to_string).collect();
//! let result = test_association(
//!     assignment,
//!     "sex",
//!     &sex,
//!     &AssociationOptions::default(),
//! ).unwrap();
//! assert!(result.pvalue >= 0.0 && result.pvalue <= 1.0);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Core Vector and Matrix types
//! - [`preprocessing`]: Data transformers (StandardScaler)
//! - [`neighbors`]: k-NN distance profiles and the eps elbow heuristic
//! - [`cluster`]: DBSCAN clustering with core/border/noise labels
//! - [`stats`]: Contingency tables and independence tests
//! - [`error`]: Error types
//! - [`traits`]: Estimator and transformer traits

pub mod cluster;
pub mod error;
pub mod neighbors;
pub mod prelude;
pub mod preprocessing;
pub mod primitives;
pub mod stats;
pub mod traits;
