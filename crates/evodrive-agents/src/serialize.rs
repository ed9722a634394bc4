//! Genome serialization for persisted evolution state.
//!
//! Stored genomes use the shape `{"weights": {"hidden": [[..]], "output": [[..]]}}`.
//! Loading re-checks the matrix shapes so a hand-edited or truncated file
//! cannot produce a genome that later fails mid-race.

use crate::genome::Genome;
use evodrive_core::error::{RaceError, Result};
use serde::{Deserialize, Serialize};

/// Raw weight matrices of a stored genome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightsRecord {
    pub hidden: Vec<Vec<f64>>,
    pub output: Vec<Vec<f64>>,
}

/// A stored genome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeRecord {
    pub weights: WeightsRecord,
}

impl GenomeRecord {
    pub fn from_genome(genome: &Genome) -> Self {
        Self {
            weights: WeightsRecord {
                hidden: genome.hidden_weights().to_vec(),
                output: genome.output_weights().to_vec(),
            },
        }
    }

    /// Rebuild the genome, validating its shape.
    pub fn to_genome(&self) -> Result<Genome> {
        Genome::from_weights(self.weights.hidden.clone(), self.weights.output.clone())
    }
}

impl TryFrom<WeightsRecord> for Genome {
    type Error = RaceError;

    fn try_from(weights: WeightsRecord) -> Result<Self> {
        Genome::from_weights(weights.hidden, weights.output)
    }
}

impl From<&Genome> for GenomeRecord {
    fn from(genome: &Genome) -> Self {
        Self::from_genome(genome)
    }
}

/// Rebuild every record, failing on the first malformed one.
pub fn genomes_from_records(records: &[GenomeRecord]) -> Result<Vec<Genome>> {
    records.iter().map(GenomeRecord::to_genome).collect()
}
