// mod.rs - Data structures module

pub mod genotypes;
pub mod table;

// Re-export main types for convenience
pub use genotypes::{
    decode_genotype, decode_state, genotype_label, make_comprehensive_genotypes, one_hot,
    parse_genotype_label, GenotypeSet,
};
pub use table::PhenotypeTable;
