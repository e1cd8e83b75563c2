// mod.rs - Phenotype generators module root

pub mod additive;
pub mod count;
pub mod factory;
pub mod random;
pub mod traits;

// Re-export main types for convenience
pub use additive::{random_first_order_effects, random_second_order_effects, AdditiveGenerator};
pub use count::{count_kth_state, CountGenerator};
pub use factory::PhenotypeGeneratorFactory;
pub use random::{random_phenotype, RandomGenerator};
pub use traits::PhenotypeGenerator;
