// =========================================================================
// FALSIFY-AT: association testing contract (agrupar stats)
//
// References:
//   - Cochran (1954) expected-count rule for chi-square applicability
//   - Fisher (1935) exact treatment of contingency tables
// =========================================================================

use super::*;
use crate::cluster::Dbscan;
use crate::error::AgruparError;
use crate::neighbors::NeighborProfile;
use crate::primitives::Matrix;
use crate::traits::UnsupervisedEstimator;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn table(n_rows: usize, n_cols: usize, counts: Vec<u64>) -> ContingencyTable {
    let levels = (0..n_cols).map(|c| format!("level{c}")).collect();
    ContingencyTable::from_counts(n_rows, n_cols, counts, levels).expect("valid table")
}

/// FALSIFY-AT-001: Expected counts >= 5 everywhere selects chi-square
#[test]
fn falsify_at_001_chi_square_selected_for_large_counts() {
    let t = table(2, 2, vec![10, 20, 20, 10]);
    assert!(t.min_expected() >= 5.0);
    assert_eq!(
        select_test(&t, 5.0),
        TestKind::ChiSquare,
        "FALSIFIED AT-001: large table not routed to chi-square"
    );

    let r = chi2_independence(&t).expect("computable");
    assert!(
        (0.0..=1.0).contains(&r.pvalue),
        "FALSIFIED AT-001: p = {} outside [0,1]",
        r.pvalue
    );
}

/// FALSIFY-AT-002: Any expected count < 5 selects Fisher's exact test
#[test]
fn falsify_at_002_fisher_selected_for_small_counts() {
    let t = table(2, 2, vec![3, 1, 1, 3]);
    assert!(t.min_expected() < 5.0);
    assert_eq!(
        select_test(&t, 5.0),
        TestKind::FisherExact,
        "FALSIFIED AT-002: sparse table not routed to Fisher"
    );

    let r = fisher_exact(&t).expect("computable");
    assert!(
        (0.0..=1.0).contains(&r.pvalue),
        "FALSIFIED AT-002: p = {} outside [0,1]",
        r.pvalue
    );
}

/// FALSIFY-AT-003: Fewer than 2 clusters after noise removal is degenerate
#[test]
fn falsify_at_003_single_cluster_degenerate() {
    // One dense blob plus an outlier: exactly one cluster.
    let data = Matrix::from_vec(
        5,
        2,
        vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 50.0, 50.0],
    )
    .expect("valid matrix");
    let mut dbscan = Dbscan::new(1.5, 3);
    dbscan.fit(&data).expect("fit succeeds");
    assert_eq!(dbscan.assignment().n_clusters(), 1);

    let col = strings(&["a", "b", "a", "b", "a"]);
    let err = test_association(
        dbscan.assignment(),
        "var",
        &col,
        &AssociationOptions::default(),
    )
    .unwrap_err();
    assert!(
        matches!(err, AgruparError::DegenerateTable { .. }),
        "FALSIFIED AT-003: single-cluster table not degenerate"
    );
}

/// FALSIFY-AT-004: The driver's selected test matches the pure decision fn
#[test]
fn falsify_at_004_driver_respects_selection() {
    // Two clusters of 20 each, category balanced enough for chi-square.
    let mut coords = Vec::new();
    for i in 0..20 {
        coords.extend_from_slice(&[(i % 5) as f32 * 0.1, (i / 5) as f32 * 0.1]);
    }
    for i in 0..20 {
        coords.extend_from_slice(&[10.0 + (i % 5) as f32 * 0.1, (i / 5) as f32 * 0.1]);
    }
    let data = Matrix::from_vec(40, 2, coords).expect("valid matrix");
    let mut dbscan = Dbscan::new(0.5, 3);
    dbscan.fit(&data).expect("fit succeeds");
    assert_eq!(dbscan.assignment().n_clusters(), 2);

    let col: Vec<String> = (0..40)
        .map(|i| if i % 2 == 0 { "yes" } else { "no" }.to_string())
        .collect();
    let result = test_association(
        dbscan.assignment(),
        "outcome",
        &col,
        &AssociationOptions::default(),
    )
    .expect("computable");

    let expected_kind = select_test(&result.table, 5.0);
    assert_eq!(
        result.test, expected_kind,
        "FALSIFIED AT-004: driver ran a different test than selected"
    );
    assert_eq!(result.test, TestKind::ChiSquare);
    assert!(result.statistic.is_some());
    assert_eq!(result.df, Some(1));
}

/// FALSIFY-AT-005: Full pipeline profile -> dbscan -> association holds together
#[test]
fn falsify_at_005_pipeline() {
    let data = Matrix::from_vec(
        8,
        2,
        vec![
            0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 10.0, 10.0, 10.0, 11.0, 11.0, 10.0, 20.0, 20.0,
        ],
    )
    .expect("valid matrix");

    // Phase 1: neighbor profile for k = min_samples = D + 1 = 3.
    let profile = NeighborProfile::compute(&data, 3).expect("enough points");
    assert_eq!(profile.len(), 8);

    // Phase 2: the caller picks eps (here from the plot; the heuristic is
    // advisory only).
    let _suggestion = profile.suggest_eps();
    let eps = 1.5;

    let mut dbscan = Dbscan::new(eps, 3);
    dbscan.fit(&data).expect("fit succeeds");
    let assignment = dbscan.assignment();
    assert_eq!(assignment.n_clusters(), 2);
    assert_eq!(assignment.n_noise(), 1);

    let severity = strings(&["low", "low", "high", "high", "high", "low", "high", "low"]);
    let result = test_association(assignment, "severity", &severity, &AssociationOptions::default())
        .expect("computable");

    assert_eq!(
        result.test,
        TestKind::FisherExact,
        "FALSIFIED AT-005: 7 retained points cannot satisfy the count rule"
    );
    assert!((0.0..=1.0).contains(&result.pvalue));
}

mod association_proptest_falsify {
    use super::*;
    use proptest::prelude::*;

    /// FALSIFY-AT-006-prop: Both tests keep p in [0,1] on random 2x2 tables
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(30))]

        #[test]
        fn falsify_at_006_prop_pvalue_bounded(
            a in 1..=12u64,
            b in 1..=12u64,
            c in 1..=12u64,
            d in 1..=12u64,
        ) {
            let t = table(2, 2, vec![a, b, c, d]);

            let chi = chi2_independence(&t).expect("computable");
            prop_assert!(
                (0.0..=1.0).contains(&chi.pvalue),
                "FALSIFIED AT-006-prop: chi-square p = {}", chi.pvalue
            );

            let fisher = fisher_exact(&t).expect("computable");
            prop_assert!(
                (0.0..=1.0).contains(&fisher.pvalue),
                "FALSIFIED AT-006-prop: fisher p = {}", fisher.pvalue
            );
        }
    }

    /// FALSIFY-AT-007-prop: Chi-square and Fisher agree on strong effects
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(10))]

        #[test]
        fn falsify_at_007_prop_tests_agree_on_extremes(diag in 8..=12u64) {
            // Heavily diagonal table: both tests should find significance.
            let t = table(2, 2, vec![diag, 1, 1, diag]);
            let chi = chi2_independence(&t).expect("computable");
            let fisher = fisher_exact(&t).expect("computable");

            prop_assert!(
                chi.pvalue < 0.05 && fisher.pvalue < 0.05,
                "FALSIFIED AT-007-prop: chi p = {}, fisher p = {}",
                chi.pvalue, fisher.pvalue
            );
        }
    }
}
