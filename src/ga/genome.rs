//! Permutation genome construction and repair.
//!
//! A genome is a permutation of component indices. Initial genomes come
//! either from the prerequisite engine's level-biased shuffle or from a
//! uniform shuffle repaired into topological validity. Repair also runs
//! after every crossover and mutation so the decoder always receives
//! prerequisite-consistent priorities.

use rand::seq::SliceRandom;
use rand::Rng;

/// A priority permutation of component indices.
pub type Genome = Vec<usize>;

/// Uniform random permutation of `0..n`.
pub fn random_genome<R: Rng>(n: usize, rng: &mut R) -> Genome {
    let mut genome: Genome = (0..n).collect();
    genome.shuffle(rng);
    genome
}

/// Whether every component appears after all of its prerequisites.
pub fn is_topologically_valid(genome: &[usize], prerequisites: &[Vec<usize>]) -> bool {
    let mut placed = vec![false; prerequisites.len()];
    for &ci in genome {
        if prerequisites[ci].iter().any(|&pi| !placed[pi]) {
            return false;
        }
        placed[ci] = true;
    }
    true
}

/// Repairs a permutation into topological validity.
///
/// Walks left to right; whenever a component precedes one of its
/// prerequisites, it is swapped with the earliest later occurrence of a
/// missing prerequisite, repeating at the same position until the
/// occupant is valid. Terminates because each swap moves a prerequisite
/// strictly earlier and the graph is acyclic.
pub fn repair(genome: &mut Genome, prerequisites: &[Vec<usize>]) {
    let n = genome.len();
    let mut placed = vec![false; prerequisites.len()];
    for i in 0..n {
        loop {
            let ci = genome[i];
            let missing = genome[i + 1..]
                .iter()
                .position(|&cj| prerequisites[ci].contains(&cj) && !placed[cj]);
            match missing {
                Some(offset) => genome.swap(i, i + 1 + offset),
                None => {
                    placed[ci] = true;
                    break;
                }
            }
        }
    }
}
