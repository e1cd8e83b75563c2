// traits.rs - Core trait for phenotype sources

use crate::data::GenotypeSet;
use crate::error::{EffectsError, Result};
use ndarray::{Array1, ArrayView2, Axis};
use rayon::prelude::*;
use std::fmt::Debug;

/// Source of a real-valued phenotype for each genotype.
/// This allows pluggable synthetic data for the decomposition
pub trait PhenotypeGenerator: Send + Sync + Debug {
    /// Phenotype of one genotype; `index` is its position in the genotype set
    fn phenotype(&self, genotype: ArrayView2<'_, u8>, index: usize) -> Result<f64>;

    /// Get a human-readable name for this generator
    fn name(&self) -> &'static str;

    /// Get a description of this generator
    fn description(&self) -> &'static str;

    /// Check the generator can serve genotypes of these dimensions
    fn validate_dimensions(&self, _num_sites: usize, _num_states: usize) -> Result<()> {
        // Default implementation accepts any dimensions
        Ok(())
    }

    /// Phenotypes for a whole set, aligned by index
    fn generate(&self, genotypes: &GenotypeSet) -> Result<Array1<f64>> {
        self.validate_dimensions(genotypes.num_sites(), genotypes.num_states())?;
        let view = genotypes.view();
        let values = (0..genotypes.num_genotypes())
            .into_par_iter()
            .map(|idx| self.phenotype(view.index_axis(Axis(0), idx), idx))
            .collect::<std::result::Result<Vec<f64>, EffectsError>>()?;
        Ok(Array1::from(values))
    }
}
