//! Independence tests for contingency tables.
//!
//! Implements the two tests the association driver dispatches between:
//!
//! - **chi-square test of independence** for tables where every expected cell
//!   count is large enough
//! - **Fisher's exact test**, generalized to r×c tables, for sparse tables
//!
//! # Example
//!
//! ```
//! use agrupar::stats::{chi2_independence, ContingencyTable};
//!
//! let table = ContingencyTable::from_counts(
//!     2,
//!     2,
//!     vec![10, 20, 20, 10],
//!     vec!["no".to_string(), "yes".to_string()],
//! ).unwrap();
//!
//! let result = chi2_independence(&table).unwrap();
//! assert_eq!(result.df, 1);
//! assert!(result.pvalue < 0.05);
//! ```

use crate::error::Result;
use crate::stats::contingency::ContingencyTable;
use serde::{Deserialize, Serialize};

/// Result of a chi-square test of independence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChiSquareResult {
    /// Chi-square statistic
    pub statistic: f32,

    /// p-value
    pub pvalue: f32,

    /// Degrees of freedom
    pub df: usize,
}

/// Result of Fisher's exact test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FisherExactResult {
    /// p-value (two-sided)
    pub pvalue: f32,
}

/// Chi-square test of independence on an r×c contingency table.
///
/// H₀: cluster membership and the categorical variable are independent
/// H₁: they are associated
///
/// Statistic: χ² = Σ (O − E)² / E with df = (rows−1)(cols−1).
///
/// # Errors
///
/// Currently infallible for a constructed [`ContingencyTable`] (construction
/// already rejects degenerate shapes); returns `Result` for interface
/// symmetry with [`fisher_exact`].
pub fn chi2_independence(table: &ContingencyTable) -> Result<ChiSquareResult> {
    let expected = table.expected();
    let mut chi2_stat = 0.0f64;
    for r in 0..table.n_rows() {
        for c in 0..table.n_cols() {
            let obs = table.get(r, c) as f64;
            let exp = expected[r * table.n_cols() + c];
            chi2_stat += (obs - exp).powi(2) / exp;
        }
    }

    let df = (table.n_rows() - 1) * (table.n_cols() - 1);
    let pvalue = chi_square_pvalue(chi2_stat, df);

    Ok(ChiSquareResult {
        statistic: chi2_stat as f32,
        pvalue: pvalue as f32,
        df,
    })
}

/// Fisher's exact test, generalized to r×c tables.
///
/// Enumerates every table with the observed row and column margins and sums
/// the hypergeometric probabilities of tables no more probable than the
/// observed one (the conventional two-sided definition).
///
/// Enumeration is exponential in table size in the worst case; in this crate
/// the test is only selected for sparse tables (some expected count below the
/// caller's threshold), which keeps the margins small at clinical dataset
/// scale.
///
/// # Errors
///
/// Currently infallible for a constructed [`ContingencyTable`]; returns
/// `Result` for interface symmetry with [`chi2_independence`].
pub fn fisher_exact(table: &ContingencyTable) -> Result<FisherExactResult> {
    let row_totals = table.row_totals();
    let col_totals = table.col_totals();
    let total = table.grand_total();

    // ln(n!) for every n up to the grand total.
    let ln_fact: Vec<f64> = (0..=total).map(|n| ln_gamma(n as f64 + 1.0)).collect();

    // ln P(table) = Σln(r_i!) + Σln(c_j!) − ln(n!) − Σln(n_ij!)
    let margin_part: f64 = row_totals.iter().map(|&r| ln_fact[r as usize]).sum::<f64>()
        + col_totals.iter().map(|&c| ln_fact[c as usize]).sum::<f64>()
        - ln_fact[total as usize];

    let mut obs_cells = 0.0f64;
    for r in 0..table.n_rows() {
        for c in 0..table.n_cols() {
            obs_cells += ln_fact[table.get(r, c) as usize];
        }
    }
    let obs_logp = margin_part - obs_cells;

    let mut enumerator = FisherEnumerator {
        n_rows: table.n_rows(),
        n_cols: table.n_cols(),
        row_totals,
        col_rem: col_totals,
        ln_fact,
        margin_part,
        // Slack absorbs round-off so the observed table always counts itself.
        cutoff: obs_logp + 1e-7,
        psum: 0.0,
    };
    enumerator.visit_row(0, 0.0);

    Ok(FisherExactResult {
        pvalue: enumerator.psum.clamp(0.0, 1.0) as f32,
    })
}

/// Depth-first walk over all tables with the observed margins.
struct FisherEnumerator {
    n_rows: usize,
    n_cols: usize,
    row_totals: Vec<u64>,
    /// Remaining column margin as rows are filled in.
    col_rem: Vec<u64>,
    ln_fact: Vec<f64>,
    margin_part: f64,
    cutoff: f64,
    psum: f64,
}

impl FisherEnumerator {
    fn visit_row(&mut self, row: usize, ln_cells: f64) {
        if row == self.n_rows - 1 {
            // Last row is forced by the column remainders.
            let forced: f64 = self
                .col_rem
                .iter()
                .map(|&v| self.ln_fact[v as usize])
                .sum();
            let logp = self.margin_part - ln_cells - forced;
            if logp <= self.cutoff {
                self.psum += logp.exp();
            }
            return;
        }
        self.visit_cell(row, 0, self.row_totals[row], ln_cells);
    }

    fn visit_cell(&mut self, row: usize, col: usize, remaining: u64, ln_cells: f64) {
        if col == self.n_cols - 1 {
            // Last cell of the row is forced by the row remainder.
            if remaining > self.col_rem[col] {
                return;
            }
            self.col_rem[col] -= remaining;
            self.visit_row(row + 1, ln_cells + self.ln_fact[remaining as usize]);
            self.col_rem[col] += remaining;
            return;
        }

        let max_v = remaining.min(self.col_rem[col]);
        for v in 0..=max_v {
            self.col_rem[col] -= v;
            self.visit_cell(row, col + 1, remaining - v, ln_cells + self.ln_fact[v as usize]);
            self.col_rem[col] += v;
        }
    }
}

// ============================================================================
// Special functions (f64 internally; log-factorials of triple-digit counts
// overflow f32's useful precision)
// ============================================================================

/// Natural log of the gamma function (Lanczos approximation, g = 7).
fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 9] = [
        0.999_999_999_999_809_93,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_13,
        -176.615_029_162_140_59,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_571_6e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if x < 0.5 {
        // Reflection formula for the left half-plane.
        let pi = std::f64::consts::PI;
        pi.ln() - (pi * x).sin().ln() - ln_gamma(1.0 - x)
    } else {
        let x = x - 1.0;
        let t = x + 7.5;
        let mut a = COEFFS[0];
        for (i, &c) in COEFFS.iter().enumerate().skip(1) {
            a += c / (x + i as f64);
        }
        0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + a.ln()
    }
}

/// Regularized lower incomplete gamma function P(a, x).
///
/// Series expansion for x < a + 1, continued fraction otherwise.
fn regularized_lower_gamma(a: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x < a + 1.0 {
        lower_gamma_series(a, x)
    } else {
        1.0 - upper_gamma_continued_fraction(a, x)
    }
}

fn lower_gamma_series(a: f64, x: f64) -> f64 {
    let mut ap = a;
    let mut sum = 1.0 / a;
    let mut del = sum;
    for _ in 0..200 {
        ap += 1.0;
        del *= x / ap;
        sum += del;
        if del.abs() < sum.abs() * 1e-12 {
            break;
        }
    }
    (sum * (-x + a * x.ln() - ln_gamma(a)).exp()).clamp(0.0, 1.0)
}

fn upper_gamma_continued_fraction(a: f64, x: f64) -> f64 {
    const TINY: f64 = 1e-300;
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / TINY;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..200 {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < TINY {
            d = TINY;
        }
        c = b + an / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;
        if (del - 1.0).abs() < 1e-12 {
            break;
        }
    }
    ((-x + a * x.ln() - ln_gamma(a)).exp() * h).clamp(0.0, 1.0)
}

/// p-value for a chi-square statistic: P(χ² > x) = 1 − P(df/2, x/2).
fn chi_square_pvalue(chi2: f64, df: usize) -> f64 {
    (1.0 - regularized_lower_gamma(df as f64 / 2.0, chi2 / 2.0)).clamp(0.0, 1.0)
}
