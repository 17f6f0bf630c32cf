/// Number of discordant pairs between two permutations of `[0, a)`.
///
/// `b` is reindexed through the inverse of `a` so that `a` becomes the
/// identity, then inversions in the renamed `b` are counted by merge sort
/// in `O(a log a)`. Ranges `[0, a(a-1)/2]`; 0 iff the permutations are
/// equal, maximal iff one is the exact reverse of the other.
pub fn kendall_tau(a: &[u32], b: &[u32]) -> u64 {
    debug_assert_eq!(a.len(), b.len());
    let n = a.len();
    if n < 2 {
        return 0;
    }

    let mut inverse_a = vec![0u32; n];
    for (rank, &value) in a.iter().enumerate() {
        inverse_a[value as usize] = rank as u32;
    }

    let renamed: Vec<u32> = b.iter().map(|&value| inverse_a[value as usize]).collect();
    count_inversions(&renamed)
}

fn count_inversions(values: &[u32]) -> u64 {
    let mut buf = values.to_vec();
    let mut scratch = vec![0u32; buf.len()];
    merge_count(&mut buf, &mut scratch, 0, buf.len())
}

fn merge_count(buf: &mut [u32], scratch: &mut [u32], lo: usize, hi: usize) -> u64 {
    if hi - lo < 2 {
        return 0;
    }
    let mid = lo + (hi - lo) / 2;
    let mut inversions = merge_count(buf, scratch, lo, mid) + merge_count(buf, scratch, mid, hi);

    let (mut i, mut j, mut k) = (lo, mid, lo);
    while i < mid && j < hi {
        if buf[i] <= buf[j] {
            scratch[k] = buf[i];
            i += 1;
        } else {
            scratch[k] = buf[j];
            j += 1;
            inversions += (mid - i) as u64;
        }
        k += 1;
    }
    while i < mid {
        scratch[k] = buf[i];
        i += 1;
        k += 1;
    }
    while j < hi {
        scratch[k] = buf[j];
        j += 1;
        k += 1;
    }
    buf[lo..hi].copy_from_slice(&scratch[lo..hi]);
    inversions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_permutations_are_zero() {
        assert_eq!(kendall_tau(&[0, 1, 2, 3], &[0, 1, 2, 3]), 0);
    }

    #[test]
    fn test_reversed_permutation_is_maximal() {
        assert_eq!(kendall_tau(&[0, 1, 2, 3], &[3, 2, 1, 0]), 6);
    }

    #[test]
    fn test_single_transposition() {
        assert_eq!(kendall_tau(&[0, 1, 2, 3], &[1, 0, 2, 3]), 1);
    }

    #[test]
    fn test_symmetric() {
        let a = [2, 0, 3, 1];
        let b = [1, 3, 0, 2];
        assert_eq!(kendall_tau(&a, &b), kendall_tau(&b, &a));
    }

    #[test]
    fn test_zero_iff_equal() {
        let a = [0, 2, 1, 3];
        assert_eq!(kendall_tau(&a, &a), 0);
        let b = [0, 1, 2, 3];
        assert!(kendall_tau(&a, &b) > 0);
    }

    #[test]
    fn test_bounds_for_length_five() {
        let a = [0, 1, 2, 3, 4];
        let reversed = [4, 3, 2, 1, 0];
        let max = (5 * 4) / 2;
        assert_eq!(kendall_tau(&a, &reversed), max as u64);
    }

    #[test]
    fn test_length_under_two_is_zero() {
        assert_eq!(kendall_tau(&[0], &[0]), 0);
        assert_eq!(kendall_tau(&[], &[]), 0);
    }
}
