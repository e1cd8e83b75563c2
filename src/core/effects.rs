// effects.rs - Reference-free zeroth, first and second order effects

//! Effects are deviations from marginal means over the genotype set:
//!
//! - order 0: mean phenotype
//! - order 1: mean phenotype of genotypes with `state` at `site`, minus order 0
//! - order 2: mean phenotype of genotypes with `state1` at `site1` and `state2`
//!   at `site2`, minus order 0 and both order 1 terms
//!
//! Second-order tensors are only filled for `site1 < site2`; every other cell
//! stays at 0.0. A (site, state) combination with no matching genotype yields
//! NaN, which is left to propagate to the caller.

use crate::core::evaluate;
use crate::core::matching::MatchConstraint;
use crate::data::GenotypeSet;
use crate::error::{EffectsError, Result};
use ndarray::{Array1, Array2, Array4, ArrayView1, ArrayView2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// All unordered site pairs with the smaller site first
pub fn site_pairs(num_sites: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..num_sites).flat_map(move |site1| (site1 + 1..num_sites).map(move |site2| (site1, site2)))
}

fn check_aligned(genotypes: &GenotypeSet, phenotypes: ArrayView1<'_, f64>) -> Result<()> {
    if phenotypes.len() != genotypes.num_genotypes() {
        return Err(EffectsError::LengthMismatch {
            expected: genotypes.num_genotypes(),
            found: phenotypes.len(),
        });
    }
    Ok(())
}

/// Plain mean over the selected phenotypes; NaN when nothing was selected
fn mean_at(phenotypes: ArrayView1<'_, f64>, indices: &[usize]) -> f64 {
    indices.iter().map(|&idx| phenotypes[idx]).sum::<f64>() / indices.len() as f64
}

/// Mean of the phenotypes
pub fn zeroth_order_effects(genotypes: &GenotypeSet, phenotypes: ArrayView1<'_, f64>) -> Result<f64> {
    check_aligned(genotypes, phenotypes)?;
    Ok(phenotypes.sum() / phenotypes.len() as f64)
}

/// Number of (site, state) and (site1, state1, site2, state2) cells a full
/// decomposition evaluates
pub fn num_cells(num_sites: usize, num_states: usize) -> usize {
    num_sites * num_states + num_sites * num_sites.saturating_sub(1) / 2 * num_states * num_states
}

/// Mean phenotype for every (site, state), shape (num_sites, num_states)
pub fn single_site_averages(
    genotypes: &GenotypeSet,
    phenotypes: ArrayView1<'_, f64>,
) -> Result<Array2<f64>> {
    single_site_averages_with(genotypes, phenotypes, &|| {})
}

fn single_site_averages_with(
    genotypes: &GenotypeSet,
    phenotypes: ArrayView1<'_, f64>,
    on_cell: &(dyn Fn() + Sync),
) -> Result<Array2<f64>> {
    check_aligned(genotypes, phenotypes)?;
    let (_, num_sites, num_states) = genotypes.shape();

    let cells: Vec<(usize, usize)> = (0..num_sites)
        .flat_map(|site| (0..num_states).map(move |state| (site, state)))
        .collect();

    let results = cells
        .into_par_iter()
        .map(|(site, state)| {
            let constraint = MatchConstraint::from_state_indices(&[site], &[state], num_states)?;
            let indices = constraint.matching_indices(genotypes)?;
            on_cell();
            Ok::<_, EffectsError>((site, state, mean_at(phenotypes, &indices)))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut averages = Array2::<f64>::zeros((num_sites, num_states));
    for (site, state, average) in results {
        averages[[site, state]] = average;
    }
    Ok(averages)
}

/// First-order effects, shape (num_sites, num_states)
pub fn first_order_effects(
    genotypes: &GenotypeSet,
    phenotypes: ArrayView1<'_, f64>,
) -> Result<Array2<f64>> {
    let e0 = zeroth_order_effects(genotypes, phenotypes)?;
    Ok(single_site_averages(genotypes, phenotypes)? - e0)
}

/// Mean phenotype for every (site1, state1, site2, state2) with site1 < site2
pub fn double_site_averages(
    genotypes: &GenotypeSet,
    phenotypes: ArrayView1<'_, f64>,
) -> Result<Array4<f64>> {
    double_site_averages_with(genotypes, phenotypes, &|| {})
}

fn double_site_averages_with(
    genotypes: &GenotypeSet,
    phenotypes: ArrayView1<'_, f64>,
    on_cell: &(dyn Fn() + Sync),
) -> Result<Array4<f64>> {
    check_aligned(genotypes, phenotypes)?;
    let (_, num_sites, num_states) = genotypes.shape();

    let cells: Vec<(usize, usize, usize, usize)> = site_pairs(num_sites)
        .flat_map(|(site1, site2)| {
            (0..num_states).flat_map(move |state1| {
                (0..num_states).map(move |state2| (site1, state1, site2, state2))
            })
        })
        .collect();

    let results = cells
        .into_par_iter()
        .map(|(site1, state1, site2, state2)| {
            let constraint = MatchConstraint::from_state_indices(
                &[site1, site2],
                &[state1, state2],
                num_states,
            )?;
            let indices = constraint.matching_indices(genotypes)?;
            on_cell();
            Ok::<_, EffectsError>(((site1, state1, site2, state2), mean_at(phenotypes, &indices)))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut averages = Array4::<f64>::zeros((num_sites, num_states, num_sites, num_states));
    for (cell, average) in results {
        averages[cell] = average;
    }
    Ok(averages)
}

/// Subtract the lower-order terms from pairwise averages (upper triangle only)
fn second_order_from_averages(e0: f64, e1: ArrayView2<'_, f64>, averages: &Array4<f64>) -> Array4<f64> {
    let (num_sites, num_states) = e1.dim();
    let mut effects = Array4::<f64>::zeros(averages.raw_dim());
    for (site1, site2) in site_pairs(num_sites) {
        for state1 in 0..num_states {
            for state2 in 0..num_states {
                let cell = (site1, state1, site2, state2);
                effects[cell] = averages[cell] - (e0 + e1[[site1, state1]] + e1[[site2, state2]]);
            }
        }
    }
    effects
}

/// Second-order effects, shape (num_sites, num_states, num_sites, num_states)
pub fn second_order_effects(
    genotypes: &GenotypeSet,
    phenotypes: ArrayView1<'_, f64>,
) -> Result<Array4<f64>> {
    let e0 = zeroth_order_effects(genotypes, phenotypes)?;
    let e1 = first_order_effects(genotypes, phenotypes)?;
    let averages = double_site_averages(genotypes, phenotypes)?;
    Ok(second_order_from_averages(e0, e1.view(), &averages))
}

/// Effects of orders 0 to 2 computed from one dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    pub e0: f64,
    pub e1: Array2<f64>,
    pub e2: Array4<f64>,
}

impl Decomposition {
    pub fn num_sites(&self) -> usize {
        self.e1.nrows()
    }

    pub fn num_states(&self) -> usize {
        self.e1.ncols()
    }

    /// e0 + first-order + second-order contribution for one genotype
    pub fn predict(&self, genotype: ArrayView2<'_, u8>) -> Result<f64> {
        Ok(self.e0
            + evaluate::get_first_order_effect(self.e1.view(), genotype)?
            + evaluate::get_second_order_effect(self.e2.view(), genotype)?)
    }

    /// Predicted phenotype of every genotype in the set
    pub fn predict_all(&self, genotypes: &GenotypeSet) -> Result<Array1<f64>> {
        evaluate::calculate_phenotypes(self.e0, self.e1.view(), self.e2.view(), genotypes)
    }

    /// Number of cells in e1 and e2 that are NaN (unobserved combinations)
    pub fn undefined_cells(&self) -> usize {
        self.e1.iter().chain(self.e2.iter()).filter(|v| v.is_nan()).count()
    }
}

/// Compute all three orders, sharing e0 and e1 between them
pub fn decompose(genotypes: &GenotypeSet, phenotypes: ArrayView1<'_, f64>) -> Result<Decomposition> {
    decompose_with_progress(genotypes, phenotypes, &|| {})
}

/// [`decompose`], calling `on_cell` once per finished cell (from worker threads)
pub fn decompose_with_progress(
    genotypes: &GenotypeSet,
    phenotypes: ArrayView1<'_, f64>,
    on_cell: &(dyn Fn() + Sync),
) -> Result<Decomposition> {
    let e0 = zeroth_order_effects(genotypes, phenotypes)?;
    let e1 = single_site_averages_with(genotypes, phenotypes, on_cell)? - e0;
    let averages = double_site_averages_with(genotypes, phenotypes, on_cell)?;
    let e2 = second_order_from_averages(e0, e1.view(), &averages);
    Ok(Decomposition { e0, e1, e2 })
}
