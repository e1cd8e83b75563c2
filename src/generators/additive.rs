// additive.rs - Phenotypes built from known zeroth, first and second order effects

use super::traits::PhenotypeGenerator;
use crate::core::effects::site_pairs;
use crate::core::evaluate::{get_first_order_effect, get_second_order_effect};
use crate::error::{EffectsError, Result};
use ndarray::{Array2, Array4, ArrayView2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

/// Standard-normal first-order effects, shape (num_sites, num_states)
pub fn random_first_order_effects<R: Rng + ?Sized>(
    num_sites: usize,
    num_states: usize,
    rng: &mut R,
) -> Array2<f64> {
    Array2::from_shape_simple_fn((num_sites, num_states), || rng.sample(StandardNormal))
}

/// Standard-normal second-order effects in the site1 < site2 cells, zero elsewhere
pub fn random_second_order_effects<R: Rng + ?Sized>(
    num_sites: usize,
    num_states: usize,
    rng: &mut R,
) -> Array4<f64> {
    let mut e2 = Array4::<f64>::zeros((num_sites, num_states, num_sites, num_states));
    for (site1, site2) in site_pairs(num_sites) {
        for state1 in 0..num_states {
            for state2 in 0..num_states {
                e2[[site1, state1, site2, state2]] = rng.sample(StandardNormal);
            }
        }
    }
    e2
}

/// Generative model with no interactions above second order.
///
/// The effects need not sum to zero; decomposing its phenotypes gives
/// different (centred) effects that still recompose the same phenotypes.
#[derive(Debug, Clone)]
pub struct AdditiveGenerator {
    pub e0: f64,
    pub e1: Array2<f64>,
    pub e2: Array4<f64>,
}

impl AdditiveGenerator {
    pub fn new(e0: f64, e1: Array2<f64>, e2: Array4<f64>) -> Result<Self> {
        let (num_sites, num_states) = e1.dim();
        if e2.dim() != (num_sites, num_states, num_sites, num_states) {
            let (a, b, c, d) = e2.dim();
            return Err(EffectsError::shape_mismatch(
                &[num_sites, num_states, num_sites, num_states],
                &[a, b, c, d],
            ));
        }
        Ok(Self { e0, e1, e2 })
    }

    /// Random e0, e1 and e2 drawn from a seeded ChaCha stream
    pub fn random(num_sites: usize, num_states: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let e0 = rng.sample(StandardNormal);
        let e1 = random_first_order_effects(num_sites, num_states, &mut rng);
        let e2 = random_second_order_effects(num_sites, num_states, &mut rng);
        Self { e0, e1, e2 }
    }
}

impl PhenotypeGenerator for AdditiveGenerator {
    fn phenotype(&self, genotype: ArrayView2<'_, u8>, _index: usize) -> Result<f64> {
        Ok(self.e0
            + get_first_order_effect(self.e1.view(), genotype)?
            + get_second_order_effect(self.e2.view(), genotype)?)
    }

    fn name(&self) -> &'static str {
        "additive"
    }

    fn description(&self) -> &'static str {
        "Sum of random zeroth, first and second order effects (exactly recoverable)"
    }

    fn validate_dimensions(&self, num_sites: usize, num_states: usize) -> Result<()> {
        if self.e1.dim() != (num_sites, num_states) {
            return Err(EffectsError::shape_mismatch(
                &[self.e1.nrows(), self.e1.ncols()],
                &[num_sites, num_states],
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::make_comprehensive_genotypes;

    #[test]
    fn test_random_effects_shapes() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let e1 = random_first_order_effects(4, 3, &mut rng);
        let e2 = random_second_order_effects(4, 3, &mut rng);
        assert_eq!(e1.dim(), (4, 3));
        assert_eq!(e2.dim(), (4, 3, 4, 3));
        assert!(e1.iter().all(|v| *v != 0.0));
        // only the 6 site pairs x 9 state pairs are drawn
        assert_eq!(e2.iter().filter(|v| **v != 0.0).count(), 54);
        assert_eq!(e2[[2, 0, 1, 0]], 0.0);
    }

    #[test]
    fn test_additive_generator_phenotypes() {
        let genotypes = make_comprehensive_genotypes(2, 2).unwrap();
        let e1 = ndarray::array![[0.0, 1.0], [0.0, 10.0]];
        let mut e2 = Array4::<f64>::zeros((2, 2, 2, 2));
        e2[[0, 1, 1, 1]] = 100.0;
        let generator = AdditiveGenerator::new(0.5, e1, e2).unwrap();
        let phenotypes = generator.generate(&genotypes).unwrap();
        assert_eq!(phenotypes.to_vec(), vec![0.5, 10.5, 1.5, 111.5]);
    }

    #[test]
    fn test_additive_generator_dimension_checks() {
        let generator = AdditiveGenerator::random(3, 2, 9);
        let genotypes = make_comprehensive_genotypes(3, 3).unwrap();
        assert!(generator.generate(&genotypes).is_err());

        let bad = AdditiveGenerator::new(0.0, Array2::zeros((2, 2)), Array4::zeros((2, 2, 3, 2)));
        assert!(bad.is_err());
    }

    #[test]
    fn test_random_is_seeded() {
        let a = AdditiveGenerator::random(3, 3, 5);
        let b = AdditiveGenerator::random(3, 3, 5);
        assert_eq!(a.e0, b.e0);
        assert_eq!(a.e1, b.e1);
        assert_eq!(a.e2, b.e2);
    }
}
