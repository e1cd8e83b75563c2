// error.rs - Library error type

use thiserror::Error;

/// Errors raised by the enumerator, matcher, decomposer and evaluator
#[derive(Error, Debug)]
pub enum EffectsError {
    /// A constraint or lookup names a site the genotypes do not have
    #[error("site index {site} is out of range for genotypes with {num_sites} sites")]
    SiteOutOfRange { site: usize, num_sites: usize },

    /// An integer-coded state is outside the alphabet
    #[error("state index {state} is out of range for an alphabet of {num_states} states")]
    StateOutOfRange { state: usize, num_states: usize },

    /// A genotype row is not exactly one 1 with zeros elsewhere
    #[error("genotype row at site {site} is not a valid one-hot vector")]
    InvalidOneHot { site: usize },

    /// Tensor shapes that must agree do not
    #[error("shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: String, found: String },

    /// Phenotype vector not aligned with the genotype set
    #[error("length mismatch: expected {expected} phenotypes, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("num_states and num_sites must both be at least 1 (got {num_states} states, {num_sites} sites)")]
    InvalidDimensions { num_states: usize, num_sites: usize },

    #[error("{num_states}^{num_sites} genotypes do not fit in memory")]
    TooManyGenotypes { num_states: usize, num_sites: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, EffectsError>;

impl EffectsError {
    pub(crate) fn shape_mismatch(expected: &[usize], found: &[usize]) -> Self {
        EffectsError::ShapeMismatch {
            expected: format!("{:?}", expected),
            found: format!("{:?}", found),
        }
    }
}

impl From<serde_json::Error> for EffectsError {
    fn from(e: serde_json::Error) -> Self {
        EffectsError::Serialization(e.to_string())
    }
}

impl From<csv::Error> for EffectsError {
    fn from(e: csv::Error) -> Self {
        EffectsError::Serialization(e.to_string())
    }
}
