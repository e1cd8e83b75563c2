// count.rs - Phenotype = number of sites carrying a given state

use super::traits::PhenotypeGenerator;
use crate::error::{EffectsError, Result};
use ndarray::ArrayView2;

/// Number of sites of `genotype` whose active state is `k`
pub fn count_kth_state(genotype: ArrayView2<'_, u8>, k: usize) -> Result<f64> {
    if k >= genotype.ncols() {
        return Err(EffectsError::StateOutOfRange {
            state: k,
            num_states: genotype.ncols(),
        });
    }
    Ok(genotype.column(k).iter().map(|&v| f64::from(v)).sum())
}

/// Counting generator. Its phenotypes are purely additive, so the
/// decomposition reproduces them exactly with zero second-order effects
#[derive(Debug, Clone)]
pub struct CountGenerator {
    pub k: usize,
}

impl CountGenerator {
    pub fn new(k: usize) -> Self {
        Self { k }
    }
}

impl PhenotypeGenerator for CountGenerator {
    fn phenotype(&self, genotype: ArrayView2<'_, u8>, _index: usize) -> Result<f64> {
        count_kth_state(genotype, self.k)
    }

    fn name(&self) -> &'static str {
        "count"
    }

    fn description(&self) -> &'static str {
        "Number of sites in state k (additive, no epistasis)"
    }

    fn validate_dimensions(&self, _num_sites: usize, num_states: usize) -> Result<()> {
        if self.k >= num_states {
            return Err(EffectsError::StateOutOfRange {
                state: self.k,
                num_states,
            });
        }
        Ok(())
    }
}
