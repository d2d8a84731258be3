// =========================================================================
// FALSIFY-DB: DBSCAN clustering contract (agrupar cluster)
//
// References:
//   - Ester et al. (1996) "A Density-Based Algorithm for Discovering Clusters"
// =========================================================================

use super::*;
use crate::neighbors::euclidean_distance;
use crate::primitives::Matrix;
use crate::traits::UnsupervisedEstimator;

fn reference_scenario() -> Matrix<f32> {
    // Square at origin, triangle at (10,10), one far outlier.
    Matrix::from_vec(
        8,
        2,
        vec![
            0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 10.0, 10.0, 10.0, 11.0, 11.0, 10.0, 20.0, 20.0,
        ],
    )
    .expect("valid matrix")
}

fn fit(data: &Matrix<f32>, eps: f32, min_samples: usize) -> ClusterAssignment {
    let mut dbscan = Dbscan::new(eps, min_samples);
    dbscan.fit(data).expect("fit succeeds");
    dbscan.assignment().clone()
}

/// FALSIFY-DB-001: Two fits with identical inputs yield identical assignments
#[test]
fn falsify_db_001_idempotent() {
    let data = reference_scenario();
    let a = fit(&data, 1.5, 3);
    let b = fit(&data, 1.5, 3);
    assert_eq!(a, b, "FALSIFIED DB-001: repeated fit differs");
}

/// FALSIFY-DB-002: Every point gets exactly one label; sizes partition N
#[test]
fn falsify_db_002_completeness() {
    let data = reference_scenario();
    let a = fit(&data, 1.5, 3);

    assert_eq!(a.len(), 8, "FALSIFIED DB-002: label count != N");
    let clustered: usize = a.cluster_sizes().iter().sum();
    assert_eq!(
        a.n_noise() + clustered,
        8,
        "FALSIFIED DB-002: noise {} + clustered {} != 8",
        a.n_noise(),
        clustered
    );
}

/// FALSIFY-DB-003: Growing eps never increases the noise count
#[test]
fn falsify_db_003_noise_monotone_in_eps() {
    let data = reference_scenario();
    let mut prev_noise = usize::MAX;
    for eps in [0.5, 1.2, 1.5, 5.0, 15.0] {
        let a = fit(&data, eps, 3);
        assert!(
            a.n_noise() <= prev_noise,
            "FALSIFIED DB-003: noise grew from {} to {} at eps={}",
            prev_noise,
            a.n_noise(),
            eps
        );
        prev_noise = a.n_noise();
    }
}

/// FALSIFY-DB-004: Clusters only merge as eps grows past the gap
#[test]
fn falsify_db_004_clusters_merge_with_large_eps() {
    let data = reference_scenario();
    let small = fit(&data, 1.5, 3);
    assert_eq!(small.n_clusters(), 2);

    // eps = 15 bridges both groups and the outlier (max gap ~14.2).
    let large = fit(&data, 15.0, 3);
    assert_eq!(
        large.n_clusters(),
        1,
        "FALSIFIED DB-004: expected a single merged cluster"
    );
    assert_eq!(large.n_noise(), 0);
}

/// FALSIFY-DB-005: Direct reachability from a core point implies same cluster
#[test]
fn falsify_db_005_core_point_symmetry() {
    let data = reference_scenario();
    let eps = 1.5;
    let a = fit(&data, eps, 3);

    for p in 0..data.n_rows() {
        if !a.label(p).is_core() {
            continue;
        }
        for q in 0..data.n_rows() {
            let dist = euclidean_distance(data.row_slice(p), data.row_slice(q));
            if dist <= eps {
                assert_eq!(
                    a.cluster_id(q),
                    a.cluster_id(p),
                    "FALSIFIED DB-005: point {q} within eps of core {p} but in another cluster"
                );
            }
        }
    }
}

/// FALSIFY-DB-006: Every cluster holds at least min_samples points
#[test]
fn falsify_db_006_min_cluster_size() {
    let data = reference_scenario();
    let min_samples = 3;
    let a = fit(&data, 1.5, min_samples);

    for (idx, &size) in a.cluster_sizes().iter().enumerate() {
        assert!(
            size >= min_samples,
            "FALSIFIED DB-006: cluster {} has {} < {} points",
            idx + 1,
            size,
            min_samples
        );
    }
}

/// FALSIFY-DB-007: Reference scenario yields clusters {4, 3} and one noise point
#[test]
fn falsify_db_007_reference_scenario() {
    let data = reference_scenario();
    let a = fit(&data, 1.5, 3);

    assert_eq!(a.n_clusters(), 2, "FALSIFIED DB-007: cluster count");
    assert_eq!(a.members(1).len(), 4, "FALSIFIED DB-007: origin square");
    assert_eq!(a.members(2).len(), 3, "FALSIFIED DB-007: triangle");
    assert!(
        a.label(7).is_noise(),
        "FALSIFIED DB-007: (20,20) should be noise"
    );
}

/// FALSIFY-DB-008: Zero eps and zero min_samples are rejected
#[test]
fn falsify_db_008_parameter_validation() {
    let data = reference_scenario();

    let mut zero_eps = Dbscan::new(0.0, 3);
    assert!(
        matches!(
            zero_eps.fit(&data).unwrap_err(),
            crate::error::AgruparError::InvalidHyperparameter { .. }
        ),
        "FALSIFIED DB-008: eps = 0 accepted"
    );

    let mut zero_min = Dbscan::new(1.0, 0);
    assert!(
        matches!(
            zero_min.fit(&data).unwrap_err(),
            crate::error::AgruparError::InvalidHyperparameter { .. }
        ),
        "FALSIFIED DB-008: min_samples = 0 accepted"
    );
}

mod dbscan_proptest_falsify {
    use super::*;
    use proptest::prelude::*;

    /// FALSIFY-DB-002-prop: Completeness holds for random point sets
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        #[test]
        fn falsify_db_002_prop_completeness(
            n in 3..=20usize,
            seed in 0..500u32,
        ) {
            let data: Vec<f32> = (0..n * 2)
                .map(|i| ((i as f32 + seed as f32) * 0.37).sin() * 10.0)
                .collect();
            let matrix = Matrix::from_vec(n, 2, data).expect("valid");
            let a = fit(&matrix, 1.0, 2);

            prop_assert_eq!(a.len(), n);
            let clustered: usize = a.cluster_sizes().iter().sum();
            prop_assert_eq!(
                a.n_noise() + clustered,
                n,
                "FALSIFIED DB-002-prop: partition broken"
            );
        }
    }

    /// FALSIFY-DB-009-prop: Labels are internally consistent for random data
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        #[test]
        fn falsify_db_009_prop_label_consistency(
            n in 3..=15usize,
            seed in 0..500u32,
        ) {
            let data: Vec<f32> = (0..n * 2)
                .map(|i| ((i as f32 + seed as f32) * 0.37).sin() * 10.0)
                .collect();
            let matrix = Matrix::from_vec(n, 2, data).expect("valid");
            let a = fit(&matrix, 1.0, 2);

            for (i, label) in a.labels().iter().enumerate() {
                let id = label.cluster_id();
                if label.is_noise() {
                    prop_assert_eq!(id, 0, "FALSIFIED DB-009-prop: noise with id at {}", i);
                } else {
                    prop_assert!(
                        id >= 1 && id <= a.n_clusters(),
                        "FALSIFIED DB-009-prop: label[{}] id {} outside 1..={}",
                        i, id, a.n_clusters()
                    );
                }
            }
        }
    }
}
