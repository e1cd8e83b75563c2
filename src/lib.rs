// lib.rs - reffree library root

//! # reffree - Reference-free decomposition of genotype-phenotype maps
//!
//! Genotypes are one-hot tensors of shape `(num_sites, num_states)`. Given a
//! phenotype for each genotype of a set, the library estimates effects relative
//! to the population mean rather than to a reference sequence:
//!
//! - **Order 0**: the mean phenotype `e0`
//! - **Order 1**: `e1[site, state]`, the mean phenotype of genotypes carrying
//!   `state` at `site`, minus `e0`
//! - **Order 2**: `e2[site1, state1, site2, state2]` for `site1 < site2`, the pair
//!   average minus both single-site averages plus `e0`
//!
//! Summing the effects that apply to a genotype recomposes its phenotype; the
//! residual is the interaction left above second order.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use reffree::prelude::*;
//!
//! // Every genotype over 3 states at 4 sites, phenotype = number of sites in state 1
//! let genotypes = make_comprehensive_genotypes(3, 4)?;
//! let phenotypes = CountGenerator::new(1).generate(&genotypes)?;
//!
//! let decomposition = decompose(&genotypes, phenotypes.view())?;
//! let predicted = decomposition.predict_all(&genotypes)?;
//! let report = ReconstructionReport::compare(phenotypes.view(), predicted.view())?;
//! assert!(report.within(1e-5));
//! # Ok::<(), reffree::EffectsError>(())
//! ```

// Re-export all main modules
pub mod cli;
pub mod core;
pub mod data;
pub mod error;
pub mod generators;
pub mod output;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::cli::{validate_args, Args, PhenotypeSource, ValidationResult};
    pub use crate::core::{
        calculate_phenotypes, decompose, first_order_effects, get_first_order_effect,
        get_indices_with_particular_states, get_second_order_effect, second_order_effects,
        zeroth_order_effects,
    };
    pub use crate::core::{Decomposition, DecompositionEngine, MatchConstraint, ReconstructionReport};
    pub use crate::data::{make_comprehensive_genotypes, GenotypeSet, PhenotypeTable};
    pub use crate::error::EffectsError;
    pub use crate::generators::{
        AdditiveGenerator, CountGenerator, PhenotypeGenerator, PhenotypeGeneratorFactory,
        RandomGenerator,
    };
    pub use crate::output::{write_effects, OutputFormat};
}

// Re-export main types at the root level for convenience
pub use crate::core::{Decomposition, DecompositionEngine, MatchConstraint, ReconstructionReport};
pub use data::{GenotypeSet, PhenotypeTable};
pub use error::EffectsError;
pub use generators::{PhenotypeGenerator, PhenotypeGeneratorFactory};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Project name printed by `--hello`
pub const PROJECT_NAME: &str = "reffree";

/// Get library information
pub fn get_info() -> String {
    format!(
        "{} v{} - Reference-free epistasis decomposition of genotype-phenotype maps",
        PROJECT_NAME, VERSION
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_mentions_version() {
        assert!(get_info().starts_with("reffree v"));
        assert!(get_info().contains(VERSION));
    }
}
