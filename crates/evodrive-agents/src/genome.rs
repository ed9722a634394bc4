//! Genome - the weight matrices of a neural driver.
//!
//! A genome is a two-layer perceptron without bias terms:
//! `hidden[input][hidden]` followed by `output[hidden][output]`, both
//! squashed by a sigmoid. Shapes are fixed at creation; evolution only
//! ever touches the entries. Genomes are inherited by cloning and
//! recombined by uniform crossover.

use crate::serialize::WeightsRecord;
use evodrive_core::error::{RaceError, Result};
use rand::Rng;
use rand_distr::{Distribution, Normal, StandardNormal};
use serde::{Deserialize, Serialize};

/// Per-weight mutation probability applied after crossover in [`Genome::breed`].
pub const BREED_MUTATION_PROBABILITY: f64 = 0.05;

/// How mutation perturbs weights.
///
/// Deltas are Gaussian with standard deviation `magnitude`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MutationPolicy {
    /// Every weight is perturbed.
    Always { magnitude: f64 },
    /// Each weight is perturbed independently with `probability`.
    PerWeight { probability: f64, magnitude: f64 },
}

impl MutationPolicy {
    pub fn magnitude(&self) -> f64 {
        match self {
            MutationPolicy::Always { magnitude } => *magnitude,
            MutationPolicy::PerWeight { magnitude, .. } => *magnitude,
        }
    }

    fn probability(&self) -> f64 {
        match self {
            MutationPolicy::Always { .. } => 1.0,
            MutationPolicy::PerWeight { probability, .. } => *probability,
        }
    }
}

impl Default for MutationPolicy {
    fn default() -> Self {
        MutationPolicy::PerWeight {
            probability: 0.1,
            magnitude: 0.1,
        }
    }
}

/// Dimensions of a genome: `(input, hidden, output)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenomeShape {
    pub input: usize,
    pub hidden: usize,
    pub output: usize,
}

impl std::fmt::Display for GenomeShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.input, self.hidden, self.output)
    }
}

/// Weights of a neural controller.
///
/// Deserializing goes through [`Genome::from_weights`], so a ragged or
/// unchained matrix pair is rejected instead of panicking in `forward`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WeightsRecord")]
pub struct Genome {
    hidden: Vec<Vec<f64>>,
    output: Vec<Vec<f64>>,
}

impl Genome {
    /// Fresh genome with every weight drawn from a standard normal.
    pub fn random<R: Rng + ?Sized>(
        input_size: usize,
        hidden_size: usize,
        output_size: usize,
        rng: &mut R,
    ) -> Self {
        let mut matrix = |rows: usize, cols: usize| -> Vec<Vec<f64>> {
            (0..rows)
                .map(|_| (0..cols).map(|_| StandardNormal.sample(rng)).collect())
                .collect()
        };
        let hidden = matrix(input_size, hidden_size);
        let output = matrix(hidden_size, output_size);
        Self { hidden, output }
    }

    /// Build from explicit matrices, checking they are rectangular and
    /// that the layers chain (`hidden` columns == `output` rows).
    pub fn from_weights(hidden: Vec<Vec<f64>>, output: Vec<Vec<f64>>) -> Result<Self> {
        let hidden_cols = hidden.first().map(|row| row.len()).unwrap_or(0);
        if let Some(row) = hidden.iter().find(|row| row.len() != hidden_cols) {
            return Err(RaceError::shape_mismatch("hidden layer row", hidden_cols, row.len()));
        }
        if output.len() != hidden_cols {
            return Err(RaceError::shape_mismatch("output layer rows", hidden_cols, output.len()));
        }
        let output_cols = output.first().map(|row| row.len()).unwrap_or(0);
        if let Some(row) = output.iter().find(|row| row.len() != output_cols) {
            return Err(RaceError::shape_mismatch("output layer row", output_cols, row.len()));
        }
        Ok(Self { hidden, output })
    }

    pub fn shape(&self) -> GenomeShape {
        GenomeShape {
            input: self.hidden.len(),
            hidden: self.output.len(),
            output: self.output.first().map(|row| row.len()).unwrap_or(0),
        }
    }

    pub fn hidden_weights(&self) -> &[Vec<f64>] {
        &self.hidden
    }

    pub fn output_weights(&self) -> &[Vec<f64>] {
        &self.output
    }

    /// Total number of weights.
    pub fn weight_count(&self) -> usize {
        let shape = self.shape();
        shape.input * shape.hidden + shape.hidden * shape.output
    }

    /// Evaluate the network. Deterministic in weights and inputs.
    pub fn forward(&self, inputs: &[f64]) -> Result<Vec<f64>> {
        let shape = self.shape();
        if inputs.len() != shape.input {
            return Err(RaceError::shape_mismatch("genome input", shape.input, inputs.len()));
        }
        let hidden = layer(inputs, &self.hidden, shape.hidden);
        Ok(layer(&hidden, &self.output, shape.output))
    }

    /// Perturb weights in place according to `policy`.
    pub fn mutate<R: Rng + ?Sized>(&mut self, policy: MutationPolicy, rng: &mut R) {
        let probability = policy.probability().clamp(0.0, 1.0);
        let magnitude = policy.magnitude().abs();
        if magnitude == 0.0 || probability == 0.0 {
            return;
        }
        let Ok(delta) = Normal::new(0.0, magnitude) else {
            return;
        };
        for weight in self.hidden.iter_mut().chain(self.output.iter_mut()).flatten() {
            if probability >= 1.0 || rng.gen::<f64>() < probability {
                *weight += delta.sample(rng);
            }
        }
    }

    /// Copy of this genome with mutation applied; `self` is untouched.
    pub fn mutated<R: Rng + ?Sized>(&self, policy: MutationPolicy, rng: &mut R) -> Self {
        let mut child = self.clone();
        child.mutate(policy, rng);
        child
    }

    /// Uniform crossover: each weight comes from `self` or `other` with
    /// probability 0.5. No mutation.
    pub fn crossover<R: Rng + ?Sized>(&self, other: &Genome, rng: &mut R) -> Result<Self> {
        let (mine, theirs) = (self.shape(), other.shape());
        if mine != theirs {
            return Err(RaceError::shape_mismatch("crossover", mine, theirs));
        }
        let mut pick = |a: &[Vec<f64>], b: &[Vec<f64>]| -> Vec<Vec<f64>> {
            a.iter()
                .zip(b)
                .map(|(ra, rb)| {
                    ra.iter()
                        .zip(rb)
                        .map(|(&wa, &wb)| if rng.gen_bool(0.5) { wa } else { wb })
                        .collect()
                })
                .collect()
        };
        let hidden = pick(&self.hidden, &other.hidden);
        let output = pick(&self.output, &other.output);
        Ok(Self { hidden, output })
    }

    /// Crossover followed by a light per-weight mutation of `magnitude`.
    pub fn breed<R: Rng + ?Sized>(&self, other: &Genome, magnitude: f64, rng: &mut R) -> Result<Self> {
        let mut child = self.crossover(other, rng)?;
        child.mutate(
            MutationPolicy::PerWeight {
                probability: BREED_MUTATION_PROBABILITY,
                magnitude,
            },
            rng,
        );
        Ok(child)
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// `sigmoid(inputs · weights)` where `weights` is `[inputs.len()][width]`.
fn layer(inputs: &[f64], weights: &[Vec<f64>], width: usize) -> Vec<f64> {
    (0..width)
        .map(|j| {
            let sum: f64 = inputs.iter().zip(weights).map(|(x, row)| x * row[j]).sum();
            sigmoid(sum)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn genome(seed: u64) -> Genome {
        let mut rng = StdRng::seed_from_u64(seed);
        Genome::random(6, 6, 4, &mut rng)
    }

    fn all_weights(g: &Genome) -> Vec<f64> {
        g.hidden_weights()
            .iter()
            .chain(g.output_weights())
            .flatten()
            .copied()
            .collect()
    }

    #[test]
    fn random_genome_has_requested_shape() {
        let g = genome(1);
        assert_eq!(g.shape(), GenomeShape { input: 6, hidden: 6, output: 4 });
        assert_eq!(g.weight_count(), 6 * 6 + 6 * 4);
    }

    #[test]
    fn forward_outputs_are_sigmoid_range() {
        let g = genome(2);
        let out = g.forward(&[1.0, 0.5, 0.0, 1.0, 0.25, 0.3]).unwrap();
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|v| *v > 0.0 && *v < 1.0));
    }

    #[test]
    fn forward_rejects_wrong_input_length() {
        let g = genome(3);
        let err = g.forward(&[1.0, 1.0]).unwrap_err();
        assert!(matches!(err, RaceError::ShapeMismatch { .. }));
    }

    #[test]
    fn zero_weights_give_half() {
        let g = Genome::from_weights(vec![vec![0.0; 2]; 3], vec![vec![0.0; 4]; 2]).unwrap();
        let out = g.forward(&[1.0, 2.0, 3.0]).unwrap();
        assert!(out.iter().all(|v| (*v - 0.5).abs() < 1e-12));
    }

    #[test]
    fn clone_is_faithful() {
        let g = genome(4);
        let c = g.clone();
        let x = [0.1, 0.9, 0.3, 0.7, 1.0, 0.0];
        assert_eq!(g.forward(&x).unwrap(), c.forward(&x).unwrap());
    }

    #[test]
    fn mutating_a_clone_leaves_original_alone() {
        let g = genome(5);
        let before = all_weights(&g);
        let mut rng = StdRng::seed_from_u64(99);
        let mut c = g.clone();
        c.mutate(MutationPolicy::Always { magnitude: 0.5 }, &mut rng);
        assert_eq!(all_weights(&g), before);
        assert_ne!(all_weights(&c), before);
    }

    #[test]
    fn always_policy_touches_every_weight() {
        let g = genome(6);
        let mut rng = StdRng::seed_from_u64(7);
        let m = g.mutated(MutationPolicy::Always { magnitude: 1.0 }, &mut rng);
        let changed = all_weights(&g)
            .iter()
            .zip(all_weights(&m))
            .filter(|(a, b)| *a != b)
            .count();
        assert_eq!(changed, g.weight_count());
    }

    #[test]
    fn zero_probability_changes_nothing() {
        let g = genome(8);
        let mut rng = StdRng::seed_from_u64(8);
        let m = g.mutated(MutationPolicy::PerWeight { probability: 0.0, magnitude: 1.0 }, &mut rng);
        assert_eq!(g, m);
    }

    #[test]
    fn crossover_takes_each_weight_from_a_parent() {
        let a = genome(10);
        let b = genome(11);
        let mut rng = StdRng::seed_from_u64(12);
        let child = a.crossover(&b, &mut rng).unwrap();
        assert_eq!(child.shape(), a.shape());
        for ((c, x), y) in all_weights(&child).iter().zip(all_weights(&a)).zip(all_weights(&b)) {
            assert!(*c == x || *c == y);
        }
    }

    #[test]
    fn breed_rejects_mismatched_shapes() {
        let a = genome(13);
        let mut rng = StdRng::seed_from_u64(14);
        let b = Genome::random(3, 6, 4, &mut rng);
        let err = a.breed(&b, 0.1, &mut rng).unwrap_err();
        assert!(matches!(err, RaceError::ShapeMismatch { .. }));
    }

    #[test]
    fn from_weights_rejects_broken_chain() {
        let err = Genome::from_weights(vec![vec![0.0; 3]; 2], vec![vec![0.0; 4]; 2]).unwrap_err();
        assert!(matches!(err, RaceError::ShapeMismatch { .. }));
    }
}
