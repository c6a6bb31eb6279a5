//! Permutation helpers shared by the sequencing problems.

use rand::seq::SliceRandom;
use rand::Rng;

/// A uniformly random permutation of `0..n`.
pub fn random_permutation<R: Rng>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..n).collect();
    perm.shuffle(rng);
    perm
}

/// A copy of `seq` with two distinct positions swapped.
///
/// Sequences shorter than two are returned unchanged.
pub fn swap_neighbor<T: Clone, R: Rng>(seq: &[T], rng: &mut R) -> Vec<T> {
    let mut new = seq.to_vec();
    if new.len() >= 2 {
        let (i, j) = distinct_pair(new.len(), rng);
        new.swap(i, j);
    }
    new
}

/// Two distinct indices in `0..n`. Requires `n >= 2`.
pub fn distinct_pair<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let i = rng.random_range(0..n);
    let mut j = rng.random_range(0..n - 1);
    if j >= i {
        j += 1;
    }
    (i, j)
}

/// Whether `seq` contains each of `0..n` exactly once.
pub fn is_permutation(seq: &[usize], n: usize) -> bool {
    check_permutation(seq, n).is_ok()
}

/// Like [`is_permutation`], with the reason for a failure.
pub fn check_permutation(seq: &[usize], n: usize) -> Result<(), String> {
    if seq.len() != n {
        return Err(format!("expected {n} entries, found {}", seq.len()));
    }
    let mut seen = vec![false; n];
    for &v in seq {
        if v >= n {
            return Err(format!("entry {v} is out of range 0..{n}"));
        }
        if seen[v] {
            return Err(format!("entry {v} appears twice"));
        }
        seen[v] = true;
    }
    Ok(())
}

/// All permutations of `0..n` (Heap's algorithm). Test oracle only.
#[cfg(test)]
pub(crate) fn all_permutations(n: usize) -> Vec<Vec<usize>> {
    let mut perm: Vec<usize> = (0..n).collect();
    let mut out = vec![perm.clone()];
    let mut c = vec![0usize; n];
    let mut i = 0;
    while i < n {
        if c[i] < i {
            if i % 2 == 0 {
                perm.swap(0, i);
            } else {
                perm.swap(c[i], i);
            }
            out.push(perm.clone());
            c[i] += 1;
            i = 0;
        } else {
            c[i] = 0;
            i += 1;
        }
    }
    out
}
