//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use agrupar::prelude::*;
//! ```

pub use crate::cluster::{ClusterAssignment, Dbscan, PointLabel};
pub use crate::neighbors::NeighborProfile;
pub use crate::primitives::{Matrix, Vector};
pub use crate::stats::{AssociationOptions, AssociationResult, TestKind};
pub use crate::traits::{Transformer, UnsupervisedEstimator};
