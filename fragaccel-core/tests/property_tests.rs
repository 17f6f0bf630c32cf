use fragaccel_core::distance::{cosine_distance, euclidean_distance};
use fragaccel_core::mindex::kendall_tau;
use fragaccel_core::Vector;
use proptest::prelude::*;

fn arb_vector(dim: usize) -> impl Strategy<Value = Vector> {
    proptest::collection::vec(0u32..20, dim).prop_map(Vector::new)
}

fn arb_permutation(a: usize) -> impl Strategy<Value = Vec<u32>> {
    Just((0..a as u32).collect::<Vec<u32>>()).prop_shuffle()
}

proptest! {
    #[test]
    fn test_cosine_symmetric(a in arb_vector(8), b in arb_vector(8)) {
        prop_assert_eq!(cosine_distance(&a, &b), cosine_distance(&b, &a));
    }

    #[test]
    fn test_cosine_range(a in arb_vector(8), b in arb_vector(8)) {
        let d = cosine_distance(&a, &b);
        prop_assert!((0.0..=2.0).contains(&d));
    }

    #[test]
    fn test_euclidean_symmetric(a in arb_vector(8), b in arb_vector(8)) {
        prop_assert_eq!(euclidean_distance(&a, &b), euclidean_distance(&b, &a));
    }

    #[test]
    fn test_euclidean_nonnegative(a in arb_vector(8), b in arb_vector(8)) {
        prop_assert!(euclidean_distance(&a, &b) >= 0.0);
    }

    #[test]
    fn test_self_distance_is_zero_for_nonzero_vectors(a in arb_vector(8)) {
        if !a.is_zero() {
            prop_assert!(cosine_distance(&a, &a) < 1e-9);
        }
        prop_assert!(euclidean_distance(&a, &a) < 1e-9);
    }

    #[test]
    fn test_kendall_tau_symmetric(a in arb_permutation(6), b in arb_permutation(6)) {
        prop_assert_eq!(kendall_tau(&a, &b), kendall_tau(&b, &a));
    }

    #[test]
    fn test_kendall_tau_zero_iff_equal(a in arb_permutation(6)) {
        prop_assert_eq!(kendall_tau(&a, &a), 0);
    }

    #[test]
    fn test_kendall_tau_bounded(a in arb_permutation(6), b in arb_permutation(6)) {
        let n = a.len() as u64;
        prop_assert!(kendall_tau(&a, &b) <= n * (n - 1) / 2);
    }
}
