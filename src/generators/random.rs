// random.rs - Independent normally distributed phenotypes

use super::traits::PhenotypeGenerator;
use crate::error::{EffectsError, Result};
use ndarray::ArrayView2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

/// Draws each phenotype from N(mean, std_dev^2), ignoring the genotype.
///
/// Every genotype index gets its own ChaCha stream, so results do not depend
/// on how the work is split across threads.
#[derive(Debug, Clone)]
pub struct RandomGenerator {
    pub seed: u64,
    pub mean: f64,
    pub std_dev: f64,
}

impl RandomGenerator {
    pub fn new(seed: u64, mean: f64, std_dev: f64) -> Result<Self> {
        if !mean.is_finite() || !std_dev.is_finite() || std_dev < 0.0 {
            return Err(EffectsError::InvalidConfig(format!(
                "invalid normal distribution (mean={}, sd={})",
                mean, std_dev
            )));
        }
        Ok(Self { seed, mean, std_dev })
    }

    /// Standard normal phenotypes
    pub fn standard(seed: u64) -> Self {
        Self {
            seed,
            mean: 0.0,
            std_dev: 1.0,
        }
    }

    fn draw(&self, index: usize) -> f64 {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(index as u64);
        let z: f64 = StandardNormal.sample(&mut rng);
        self.mean + self.std_dev * z
    }
}

/// One standard-normal phenotype for genotype `index` under `seed`
pub fn random_phenotype(seed: u64, index: usize) -> f64 {
    RandomGenerator::standard(seed).draw(index)
}

impl PhenotypeGenerator for RandomGenerator {
    fn phenotype(&self, _genotype: ArrayView2<'_, u8>, index: usize) -> Result<f64> {
        Ok(self.draw(index))
    }

    fn name(&self) -> &'static str {
        "random"
    }

    fn description(&self) -> &'static str {
        "Independent normal draw per genotype (no genotype-phenotype structure)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::make_comprehensive_genotypes;

    #[test]
    fn test_random_generator_is_deterministic() {
        let genotypes = make_comprehensive_genotypes(3, 3).unwrap();
        let a = RandomGenerator::standard(42).generate(&genotypes).unwrap();
        let b = RandomGenerator::standard(42).generate(&genotypes).unwrap();
        let c = RandomGenerator::standard(43).generate(&genotypes).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a[4], random_phenotype(42, 4));
    }

    #[test]
    fn test_random_generator_distribution() {
        let genotypes = make_comprehensive_genotypes(4, 5).unwrap();
        let generator = RandomGenerator::new(1, 10.0, 2.0).unwrap();
        let phenotypes = generator.generate(&genotypes).unwrap();
        let mean = phenotypes.mean().unwrap();
        let sd = phenotypes.std(1.0);
        assert!((mean - 10.0).abs() < 0.3);
        assert!((sd - 2.0).abs() < 0.3);
    }

    #[test]
    fn test_invalid_std_dev() {
        assert!(RandomGenerator::new(0, 0.0, -1.0).is_err());
        assert!(RandomGenerator::new(0, 0.0, f64::NAN).is_err());
    }
}
