//! Breeding - turning selected parents into the next population.
//!
//! With one parent every slot is a mutated clone of it. With two parents
//! the [`BreedingStrategy`] decides: `Split` gives slots below
//! `floor(size / 2)` to the first parent and the rest to the second,
//! `Crossover` breeds every slot from both.

use crate::genome::{Genome, MutationPolicy};
use evodrive_core::error::{RaceError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreedingStrategy {
    /// Half the population from each parent, cloned then mutated.
    #[default]
    Split,
    /// Every slot is uniform crossover of both parents plus light mutation.
    Crossover,
}

/// Build `size` offspring genomes from `parents`.
///
/// Fails with [`RaceError::NoSelection`] when `parents` is empty and with
/// [`RaceError::ShapeMismatch`] when two parents disagree on shape.
/// Parents beyond the first two are ignored.
pub fn breed_population<R: Rng + ?Sized>(
    parents: &[Genome],
    size: usize,
    strategy: BreedingStrategy,
    mutation: MutationPolicy,
    rng: &mut R,
) -> Result<Vec<Genome>> {
    match parents {
        [] => Err(RaceError::NoSelection),
        [only] => Ok((0..size).map(|_| only.mutated(mutation, rng)).collect()),
        [first, second, ..] => {
            if first.shape() != second.shape() {
                return Err(RaceError::shape_mismatch("parent genomes", first.shape(), second.shape()));
            }
            match strategy {
                BreedingStrategy::Split => {
                    let boundary = size / 2;
                    Ok((0..size)
                        .map(|slot| {
                            let parent = if slot < boundary { first } else { second };
                            parent.mutated(mutation, rng)
                        })
                        .collect())
                }
                BreedingStrategy::Crossover => (0..size)
                    .map(|_| first.breed(second, mutation.magnitude(), rng))
                    .collect(),
            }
        }
    }
}
