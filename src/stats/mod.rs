//! Statistical association testing between cluster labels and categorical
//! variables.
//!
//! After clustering, each categorical variable is cross-tabulated against the
//! cluster labels (noise excluded) and tested for independence. The test is
//! chosen by expected cell counts: chi-square when every expected count
//! reaches the threshold (default 5), Fisher's exact test otherwise.
//!
//! # Example
//!
//! ```
//! use agrupar::prelude::*;
//! use agrupar::stats::{test_association, AssociationOptions, TestKind};
//!
//! let data = Matrix::from_vec(8, 2, vec![
//!     0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0,
//!     10.0, 10.0, 10.0, 11.0, 11.0, 10.0, 20.0, 20.0,
//! ]).unwrap();
//! let mut dbscan = Dbscan::new(1.5, 3);
//! dbscan.fit(&data).unwrap();
//!
//! let sex: Vec<String> = ["F", "F", "M", "M", "M", "F", "M", "F"]
//!     .iter().map(ToString::to_string).collect();
//! let result = test_association(
//!     dbscan.assignment(),
//!     "sex",
//!     &sex,
//!     &AssociationOptions::default(),
//! ).unwrap();
//!
//! assert!(result.pvalue >= 0.0 && result.pvalue <= 1.0);
//! assert_eq!(result.test, TestKind::FisherExact); // tiny expected counts
//! ```

pub mod contingency;
pub mod hypothesis;

pub use contingency::{
    select_test, test_association, AssociationOptions, AssociationResult, ContingencyTable,
    TestKind,
};
pub use hypothesis::{chi2_independence, fisher_exact, ChiSquareResult, FisherExactResult};

#[cfg(test)]
mod tests_association_contract;
