//! Genetic operators for priority permutations.
//!
//! Order crossover (OX) and swap mutation over component-index genomes,
//! plus binary tournament selection. Offspring must be repaired into
//! topological validity afterwards (see [`super::genome::repair`]).
//!
//! # Reference
//! Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"

use rand::seq::index;
use rand::Rng;

use super::genome::Genome;

/// Order crossover (OX).
///
/// Picks two cut points, copies `p1[a..b]` verbatim into the child, and
/// fills the remaining positions with `p2`'s order skipping indices
/// already present.
pub fn ox_crossover<R: Rng>(p1: &[usize], p2: &[usize], rng: &mut R) -> Genome {
    let n = p1.len();
    debug_assert_eq!(n, p2.len());
    if n < 2 {
        return p1.to_vec();
    }

    let cuts = index::sample(rng, n, 2);
    let (mut a, mut b) = (cuts.index(0), cuts.index(1));
    if a > b {
        std::mem::swap(&mut a, &mut b);
    }

    let mut in_slice = vec![false; n];
    for &g in &p1[a..b] {
        in_slice[g] = true;
    }
    let mut rest = p2.iter().copied().filter(|&g| !in_slice[g]);

    let mut child = Vec::with_capacity(n);
    child.extend(rest.by_ref().take(a));
    child.extend_from_slice(&p1[a..b]);
    child.extend(rest);
    debug_assert_eq!(child.len(), n);
    child
}

/// Swaps two random positions in place.
pub fn swap_mutation<R: Rng>(genome: &mut Genome, rng: &mut R) {
    if genome.len() < 2 {
        return;
    }
    let picks = index::sample(rng, genome.len(), 2);
    genome.swap(picks.index(0), picks.index(1));
}

/// Binary tournament with replacement over fitness scores.
///
/// Returns the index of the winner; lower score wins, ties go to the
/// lower population index so selection stays stable.
pub fn tournament<R: Rng>(scores: &[f64], rng: &mut R) -> usize {
    debug_assert!(!scores.is_empty());
    let i = rng.random_range(0..scores.len());
    let j = rng.random_range(0..scores.len());
    let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
    if scores[hi] < scores[lo] {
        hi
    } else {
        lo
    }
}
