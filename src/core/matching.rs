// matching.rs - Select genotypes carrying given states at given sites

use crate::data::{one_hot, GenotypeSet};
use crate::error::{EffectsError, Result};
use ndarray::{Array2, ArrayView2};

/// k (site, one-hot state) pairs that a genotype must carry all at once
#[derive(Debug, Clone, PartialEq)]
pub struct MatchConstraint {
    sites: Vec<usize>,
    states: Array2<u8>,
}

impl MatchConstraint {
    /// `states` holds one one-hot row per entry of `sites`, in the same order
    pub fn new(sites: Vec<usize>, states: Array2<u8>) -> Result<Self> {
        if sites.is_empty() {
            return Err(EffectsError::InvalidConfig(
                "a match constraint needs at least one site".to_string(),
            ));
        }
        if states.nrows() != sites.len() {
            return Err(EffectsError::shape_mismatch(
                &[sites.len(), states.ncols()],
                &[states.nrows(), states.ncols()],
            ));
        }
        Ok(Self { sites, states })
    }

    /// Build the one-hot rows from integer state indices
    pub fn from_state_indices(sites: &[usize], states: &[usize], num_states: usize) -> Result<Self> {
        if states.len() != sites.len() {
            return Err(EffectsError::shape_mismatch(&[sites.len()], &[states.len()]));
        }
        let mut rows = Array2::<u8>::zeros((states.len(), num_states));
        for (mut row, &state) in rows.outer_iter_mut().zip(states) {
            row.assign(&one_hot(state, num_states)?);
        }
        Self::new(sites.to_vec(), rows)
    }

    pub fn sites(&self) -> &[usize] {
        &self.sites
    }

    pub fn states(&self) -> ArrayView2<'_, u8> {
        self.states.view()
    }

    /// Number of (site, state) pairs
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Check the constraint fits genotypes of the given dimensions
    pub fn validate(&self, num_sites: usize, num_states: usize) -> Result<()> {
        if let Some(&site) = self.sites.iter().find(|&&site| site >= num_sites) {
            return Err(EffectsError::SiteOutOfRange { site, num_sites });
        }
        if self.states.ncols() != num_states {
            return Err(EffectsError::shape_mismatch(
                &[self.len(), num_states],
                &[self.len(), self.states.ncols()],
            ));
        }
        Ok(())
    }

    /// Whether `genotype` (num_sites x num_states) carries every state of the constraint
    pub fn matches(&self, genotype: ArrayView2<'_, u8>) -> Result<bool> {
        self.validate(genotype.nrows(), genotype.ncols())?;
        Ok(self.matches_unchecked(genotype))
    }

    fn matches_unchecked(&self, genotype: ArrayView2<'_, u8>) -> bool {
        self.sites
            .iter()
            .zip(self.states.outer_iter())
            .all(|(&site, state)| genotype.row(site) == state)
    }

    /// Ascending indices of the genotypes satisfying the constraint
    pub fn matching_indices(&self, genotypes: &GenotypeSet) -> Result<Vec<usize>> {
        self.validate(genotypes.num_sites(), genotypes.num_states())?;
        Ok(genotypes
            .iter()
            .enumerate()
            .filter(|(_, genotype)| self.matches_unchecked(genotype.view()))
            .map(|(idx, _)| idx)
            .collect())
    }
}

/// Indices of all genotypes with `states[j]` at `sites[j]` for every j.
///
/// Site indices are range-checked before any genotype is scanned.
pub fn get_indices_with_particular_states(
    genotypes: &GenotypeSet,
    sites: &[usize],
    states: ArrayView2<'_, u8>,
) -> Result<Vec<usize>> {
    MatchConstraint::new(sites.to_vec(), states.to_owned())?.matching_indices(genotypes)
}
