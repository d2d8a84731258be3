//! Contingency tables and the cluster-vs-categorical association driver.

use crate::cluster::{ClusterAssignment, ClusterId};
use crate::error::{AgruparError, Result};
use crate::stats::hypothesis::{chi2_independence, fisher_exact};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Cross-tabulation of cluster membership against a categorical variable.
///
/// Rows are clusters (noise excluded), columns are category levels collected
/// from the full column in sorted order, so the table layout is deterministic.
///
/// # Examples
///
/// ```
/// use agrupar::stats::ContingencyTable;
///
/// let table = ContingencyTable::from_counts(
///     2,
///     2,
///     vec![10, 20, 20, 10],
///     vec!["no".to_string(), "yes".to_string()],
/// ).unwrap();
/// assert_eq!(table.grand_total(), 60);
/// assert_eq!(table.min_expected(), 15.0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContingencyTable {
    /// Row-major cell counts.
    counts: Vec<u64>,
    n_rows: usize,
    n_cols: usize,
    /// Cluster id of each row.
    cluster_ids: Vec<ClusterId>,
    /// Category level of each column.
    levels: Vec<String>,
}

impl ContingencyTable {
    /// Builds a table from raw counts.
    ///
    /// Row labels default to cluster ids 1..=`n_rows`.
    ///
    /// # Errors
    ///
    /// * `DimensionMismatch` if counts/levels lengths don't match the shape
    /// * `DegenerateTable` if the table has fewer than 2 rows or columns, or
    ///   any row/column total is zero
    pub fn from_counts(
        n_rows: usize,
        n_cols: usize,
        counts: Vec<u64>,
        levels: Vec<String>,
    ) -> Result<Self> {
        if counts.len() != n_rows * n_cols {
            return Err(AgruparError::DimensionMismatch {
                expected: format!("{} counts", n_rows * n_cols),
                actual: format!("{} counts", counts.len()),
            });
        }
        if levels.len() != n_cols {
            return Err(AgruparError::DimensionMismatch {
                expected: format!("{n_cols} level names"),
                actual: format!("{} level names", levels.len()),
            });
        }

        let table = Self {
            counts,
            n_rows,
            n_cols,
            cluster_ids: (1..=n_rows).collect(),
            levels,
        };
        table.check_degenerate()?;
        Ok(table)
    }

    /// Cross-tabulates a cluster assignment against a categorical column.
    ///
    /// Noise points are excluded from the counts. Category levels are taken
    /// from the *full* column (noise included) so a level seen only among
    /// noise shows up as a zero column and is reported as degenerate rather
    /// than silently dropped.
    ///
    /// # Errors
    ///
    /// * `DimensionMismatch` if the column length differs from the assignment
    /// * `DegenerateTable` if fewer than 2 clusters or 2 levels remain, or a
    ///   level has zero total count across retained clusters
    pub fn from_labels(assignment: &ClusterAssignment, categories: &[String]) -> Result<Self> {
        if categories.len() != assignment.len() {
            return Err(AgruparError::DimensionMismatch {
                expected: format!("{} category values", assignment.len()),
                actual: format!("{} category values", categories.len()),
            });
        }

        let n_rows = assignment.n_clusters();
        let levels: Vec<String> = categories
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let n_cols = levels.len();

        let mut counts = vec![0u64; n_rows * n_cols];
        for (i, category) in categories.iter().enumerate() {
            let cluster = assignment.cluster_id(i);
            if cluster == 0 {
                continue; // noise
            }
            let col = levels
                .iter()
                .position(|l| l == category)
                .expect("level collected from this column");
            counts[(cluster - 1) * n_cols + col] += 1;
        }

        let table = Self {
            counts,
            n_rows,
            n_cols,
            cluster_ids: (1..=n_rows).collect(),
            levels,
        };
        table.check_degenerate()?;
        Ok(table)
    }

    fn check_degenerate(&self) -> Result<()> {
        if self.n_rows < 2 {
            return Err(AgruparError::DegenerateTable {
                reason: format!("only {} cluster(s) after removing noise", self.n_rows),
            });
        }
        if self.n_cols < 2 {
            return Err(AgruparError::DegenerateTable {
                reason: format!("only {} category level(s)", self.n_cols),
            });
        }
        if let Some(r) = self.row_totals().iter().position(|&t| t == 0) {
            return Err(AgruparError::DegenerateTable {
                reason: format!("cluster {} has zero total count", self.cluster_ids[r]),
            });
        }
        if let Some(c) = self.col_totals().iter().position(|&t| t == 0) {
            return Err(AgruparError::DegenerateTable {
                reason: format!(
                    "category level '{}' has zero total count across clusters",
                    self.levels[c]
                ),
            });
        }
        Ok(())
    }

    /// Number of rows (clusters).
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns (category levels).
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Count in cell (row, col).
    ///
    /// # Panics
    ///
    /// Panics if indices are out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> u64 {
        self.counts[row * self.n_cols + col]
    }

    /// Cluster id of each row.
    #[must_use]
    pub fn cluster_ids(&self) -> &[ClusterId] {
        &self.cluster_ids
    }

    /// Category level of each column.
    #[must_use]
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// Row totals.
    #[must_use]
    pub fn row_totals(&self) -> Vec<u64> {
        (0..self.n_rows)
            .map(|r| (0..self.n_cols).map(|c| self.get(r, c)).sum())
            .collect()
    }

    /// Column totals.
    #[must_use]
    pub fn col_totals(&self) -> Vec<u64> {
        (0..self.n_cols)
            .map(|c| (0..self.n_rows).map(|r| self.get(r, c)).sum())
            .collect()
    }

    /// Grand total of all cells.
    #[must_use]
    pub fn grand_total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Expected cell counts under the independence null, row-major:
    /// row total × column total / grand total.
    #[must_use]
    pub fn expected(&self) -> Vec<f64> {
        let rows = self.row_totals();
        let cols = self.col_totals();
        let total = self.grand_total() as f64;
        let mut expected = Vec::with_capacity(self.n_rows * self.n_cols);
        for &r in &rows {
            for &c in &cols {
                expected.push(r as f64 * c as f64 / total);
            }
        }
        expected
    }

    /// Smallest expected cell count; drives the test selection rule.
    #[must_use]
    pub fn min_expected(&self) -> f64 {
        self.expected().into_iter().fold(f64::INFINITY, f64::min)
    }
}

/// Which independence test to run on a contingency table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestKind {
    /// Chi-square test of independence, (rows−1)(cols−1) degrees of freedom.
    ChiSquare,
    /// Fisher's exact test, generalized to r×c tables.
    FisherExact,
}

/// Pure decision function from table shape to test variant.
///
/// Chi-square iff every expected cell count under the independence null is at
/// least `expected_threshold` (conventionally 5); Fisher's exact test
/// otherwise. This mirrors the common small-sample correction rule.
#[must_use]
pub fn select_test(table: &ContingencyTable, expected_threshold: f64) -> TestKind {
    if table.min_expected() >= expected_threshold {
        TestKind::ChiSquare
    } else {
        TestKind::FisherExact
    }
}

/// Caller-supplied knobs for association testing; nothing here is hardcoded
/// at the call sites.
///
/// # Examples
///
/// ```
/// use agrupar::stats::AssociationOptions;
///
/// let opts = AssociationOptions::default()
///     .with_expected_threshold(10.0)
///     .with_alpha(0.05);
/// assert_eq!(opts.expected_threshold, 10.0);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AssociationOptions {
    /// Minimum expected cell count for the chi-square test to apply.
    pub expected_threshold: f64,
    /// Reporting threshold: results with p below this are flagged as worth
    /// investigating. A reporting convenience, not an error-rate control; no
    /// multiple-comparison correction is applied.
    pub alpha: f32,
}

impl Default for AssociationOptions {
    fn default() -> Self {
        Self {
            expected_threshold: 5.0,
            alpha: 0.2,
        }
    }
}

impl AssociationOptions {
    /// Sets the expected-cell-count threshold for test selection.
    #[must_use]
    pub fn with_expected_threshold(mut self, threshold: f64) -> Self {
        self.expected_threshold = threshold;
        self
    }

    /// Sets the "worth investigating" p-value threshold.
    #[must_use]
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }
}

/// Outcome of one cluster-vs-variable independence test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationResult {
    /// Name of the categorical variable.
    pub variable: String,
    /// The noise-excluded contingency table the test ran on.
    pub table: ContingencyTable,
    /// Which test was selected.
    pub test: TestKind,
    /// Test statistic (chi-square only; Fisher has none).
    pub statistic: Option<f32>,
    /// Degrees of freedom (chi-square only).
    pub df: Option<usize>,
    /// p-value in [0, 1].
    pub pvalue: f32,
    /// True when `pvalue` fell below the caller's alpha.
    pub flagged: bool,
}

/// Tests one categorical variable for association with cluster membership.
///
/// Excludes noise points, builds the contingency table, selects the test via
/// [`select_test`], and runs it.
///
/// # Errors
///
/// * `DimensionMismatch` if `categories` is not aligned with the assignment
/// * `DegenerateTable` if no independence test is computable (see
///   [`ContingencyTable::from_labels`]); the caller should treat this as
///   "no association testable" and move on
pub fn test_association(
    assignment: &ClusterAssignment,
    variable: &str,
    categories: &[String],
    options: &AssociationOptions,
) -> Result<AssociationResult> {
    let table = ContingencyTable::from_labels(assignment, categories)?;
    let test = select_test(&table, options.expected_threshold);

    let (statistic, df, pvalue) = match test {
        TestKind::ChiSquare => {
            let r = chi2_independence(&table)?;
            (Some(r.statistic), Some(r.df), r.pvalue)
        }
        TestKind::FisherExact => {
            let r = fisher_exact(&table)?;
            (None, None, r.pvalue)
        }
    };

    Ok(AssociationResult {
        variable: variable.to_string(),
        table,
        test,
        statistic,
        df,
        pvalue,
        flagged: pvalue < options.alpha,
    })
}
