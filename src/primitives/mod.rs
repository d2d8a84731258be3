//! Core compute primitives (Vector, Matrix).
//!
//! These types provide the foundation for the clustering and association
//! testing algorithms.

mod matrix;
mod vector;

pub use matrix::Matrix;
pub use vector::Vector;
