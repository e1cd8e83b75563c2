// evaluate.rs - Recompose phenotypes from decomposed effects

use crate::core::effects::site_pairs;
use crate::data::{decode_genotype, GenotypeSet};
use crate::error::{EffectsError, Result};
use ndarray::{Array1, ArrayView1, ArrayView2, ArrayView4, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Sum of e1[site, state] over the active state at every site
pub fn get_first_order_effect(e1: ArrayView2<'_, f64>, genotype: ArrayView2<'_, u8>) -> Result<f64> {
    if e1.dim() != genotype.dim() {
        let (sites, states) = genotype.dim();
        return Err(EffectsError::shape_mismatch(&[sites, states], &[e1.nrows(), e1.ncols()]));
    }
    let states = decode_genotype(genotype)?;
    Ok(states
        .iter()
        .enumerate()
        .map(|(site, &state)| e1[[site, state]])
        .sum())
}

/// Sum of e2[site1, state1, site2, state2] over every site pair, smaller site first.
///
/// Cells with site1 >= site2 are never read.
pub fn get_second_order_effect(e2: ArrayView4<'_, f64>, genotype: ArrayView2<'_, u8>) -> Result<f64> {
    let (num_sites, num_states) = genotype.dim();
    let expected = (num_sites, num_states, num_sites, num_states);
    if e2.dim() != expected {
        let (a, b, c, d) = e2.dim();
        return Err(EffectsError::shape_mismatch(
            &[num_sites, num_states, num_sites, num_states],
            &[a, b, c, d],
        ));
    }
    let states = decode_genotype(genotype)?;
    Ok(site_pairs(num_sites)
        .map(|(site1, site2)| e2[[site1, states[site1], site2, states[site2]]])
        .sum())
}

/// e0 + first-order + second-order effect for every genotype in the set
pub fn calculate_phenotypes(
    e0: f64,
    e1: ArrayView2<'_, f64>,
    e2: ArrayView4<'_, f64>,
    genotypes: &GenotypeSet,
) -> Result<Array1<f64>> {
    let view = genotypes.view();
    let values = (0..genotypes.num_genotypes())
        .into_par_iter()
        .map(|idx| {
            let genotype = view.index_axis(Axis(0), idx);
            Ok::<_, EffectsError>(
                e0 + get_first_order_effect(e1, genotype)? + get_second_order_effect(e2, genotype)?,
            )
        })
        .collect::<Result<Vec<f64>>>()?;
    Ok(Array1::from(values))
}

/// Pearson correlation; NaN when either side has zero variance
pub fn pearson_correlation(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.sum() / n;
    let mean_b = b.sum() / n;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&x, &y) in a.iter().zip(b.iter()) {
        cov += (x - mean_a) * (y - mean_b);
        var_a += (x - mean_a).powi(2);
        var_b += (y - mean_b).powi(2);
    }
    cov / (var_a.sqrt() * var_b.sqrt())
}

/// How closely recomposed phenotypes reproduce the observed ones
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconstructionReport {
    pub num_genotypes: usize,
    pub max_abs_error: f64,
    pub rmse: f64,
    pub pearson_r: f64,
}

impl ReconstructionReport {
    pub fn compare(observed: ArrayView1<'_, f64>, predicted: ArrayView1<'_, f64>) -> Result<Self> {
        if observed.len() != predicted.len() {
            return Err(EffectsError::LengthMismatch {
                expected: observed.len(),
                found: predicted.len(),
            });
        }
        let residuals = &observed - &predicted;
        // f64::max drops NaN, so an undefined residual is carried explicitly
        let max_abs_error = residuals.iter().fold(0.0_f64, |acc, r| {
            if acc.is_nan() || r.is_nan() {
                f64::NAN
            } else {
                acc.max(r.abs())
            }
        });
        let rmse = (residuals.mapv(|r| r * r).sum() / observed.len() as f64).sqrt();

        Ok(Self {
            num_genotypes: observed.len(),
            max_abs_error,
            rmse,
            pearson_r: pearson_correlation(observed, predicted),
        })
    }

    /// Every genotype reproduced within `tolerance`; false if any residual is NaN
    pub fn within(&self, tolerance: f64) -> bool {
        self.max_abs_error <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::make_comprehensive_genotypes;
    use ndarray::{array, Array2, Array4};

    #[test]
    fn test_first_order_effect_lookup() {
        let e1: Array2<f64> = array![[1.0, 2.0, 3.0], [10.0, 20.0, 30.0]];
        let genotype: Array2<u8> = array![[0, 0, 1], [1, 0, 0]];
        let effect = get_first_order_effect(e1.view(), genotype.view()).unwrap();
        assert_eq!(effect, 13.0);
    }

    #[test]
    fn test_second_order_effect_reads_upper_triangle_only() {
        let mut e2 = Array4::<f64>::zeros((3, 2, 3, 2));
        e2[[0, 1, 1, 0]] = 1.0;
        e2[[0, 1, 2, 1]] = 2.0;
        e2[[1, 0, 2, 1]] = 4.0;
        // lower triangle and diagonal hold junk that must be ignored
        e2[[1, 0, 0, 1]] = 100.0;
        e2[[2, 1, 2, 1]] = 100.0;

        let genotype: Array2<u8> = array![[0, 1], [1, 0], [0, 1]];
        let effect = get_second_order_effect(e2.view(), genotype.view()).unwrap();
        assert_eq!(effect, 7.0);
    }

    #[test]
    fn test_invalid_one_hot_is_an_error() {
        let e1 = Array2::<f64>::zeros((2, 3));
        let genotype: Array2<u8> = array![[0, 1, 0], [0, 0, 0]];
        assert!(matches!(
            get_first_order_effect(e1.view(), genotype.view()),
            Err(EffectsError::InvalidOneHot { site: 1 })
        ));

        let e2 = Array4::<f64>::zeros((2, 3, 2, 3));
        let genotype: Array2<u8> = array![[1, 1, 0], [0, 0, 1]];
        assert!(matches!(
            get_second_order_effect(e2.view(), genotype.view()),
            Err(EffectsError::InvalidOneHot { site: 0 })
        ));
    }

    #[test]
    fn test_shape_mismatch() {
        let e1 = Array2::<f64>::zeros((2, 3));
        let genotype: Array2<u8> = array![[0, 1], [1, 0]];
        assert!(matches!(
            get_first_order_effect(e1.view(), genotype.view()),
            Err(EffectsError::ShapeMismatch { .. })
        ));
        let e2 = Array4::<f64>::zeros((2, 3, 2, 3));
        assert!(get_second_order_effect(e2.view(), genotype.view()).is_err());
    }

    #[test]
    fn test_calculate_phenotypes_order() {
        let genotypes = make_comprehensive_genotypes(2, 2).unwrap();
        let e1: Array2<f64> = array![[0.0, 1.0], [0.0, 10.0]];
        let mut e2 = Array4::<f64>::zeros((2, 2, 2, 2));
        e2[[0, 1, 1, 1]] = 100.0;
        let phenotypes = calculate_phenotypes(0.5, e1.view(), e2.view(), &genotypes).unwrap();
        assert_eq!(phenotypes, array![0.5, 10.5, 1.5, 111.5]);
    }

    #[test]
    fn test_pearson_correlation() {
        let a = array![1.0, 2.0, 3.0, 4.0];
        let b = array![2.0, 4.0, 6.0, 8.0];
        let c = array![4.0, 3.0, 2.0, 1.0];
        assert!((pearson_correlation(a.view(), b.view()) - 1.0).abs() < 1e-12);
        assert!((pearson_correlation(a.view(), c.view()) + 1.0).abs() < 1e-12);
        let flat = array![1.0, 1.0, 1.0, 1.0];
        assert!(pearson_correlation(a.view(), flat.view()).is_nan());
    }

    #[test]
    fn test_reconstruction_report() {
        let observed = array![1.0, 2.0, 3.0];
        let predicted = array![1.0, 2.5, 3.0];
        let report = ReconstructionReport::compare(observed.view(), predicted.view()).unwrap();
        assert_eq!(report.num_genotypes, 3);
        assert!((report.max_abs_error - 0.5).abs() < 1e-12);
        assert!(report.within(0.5));
        assert!(!report.within(0.1));
        assert!(report.pearson_r > 0.9);

        let short = array![1.0];
        assert!(ReconstructionReport::compare(observed.view(), short.view()).is_err());
    }

    #[test]
    fn test_nan_predictions_are_not_reproduced() {
        let observed = array![1.0, 2.0, 3.0];
        let undefined = array![f64::NAN, f64::NAN, f64::NAN];
        let report = ReconstructionReport::compare(observed.view(), undefined.view()).unwrap();
        assert!(report.max_abs_error.is_nan());
        assert!(!report.within(1e-5));
        assert!(!report.within(f64::INFINITY));

        // one undefined genotype among exact ones is enough
        let partial = array![1.0, f64::NAN, 3.0];
        let report = ReconstructionReport::compare(observed.view(), partial.view()).unwrap();
        assert!(report.max_abs_error.is_nan());
        assert!(!report.within(1e-5));
    }
}
