// mod.rs - Core logic module

pub mod effects;
pub mod engine;
pub mod evaluate;
pub mod matching;

// Re-export main types for convenience
pub use effects::{
    decompose, double_site_averages, first_order_effects, second_order_effects,
    single_site_averages, site_pairs, zeroth_order_effects, Decomposition,
};
pub use engine::DecompositionEngine;
pub use evaluate::{
    calculate_phenotypes, get_first_order_effect, get_second_order_effect, pearson_correlation,
    ReconstructionReport,
};
pub use matching::{get_indices_with_particular_states, MatchConstraint};
