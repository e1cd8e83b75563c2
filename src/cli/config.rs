// config.rs - Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    // Input
    pub num_states: Option<usize>,
    pub num_sites: Option<usize>,
    pub generator: Option<String>,
    pub generator_config: Option<String>,
    pub phenotypes: Option<String>,

    // Output
    pub output: Option<String>,
    pub format: Option<String>,
    pub predictions: Option<String>,
    pub save_effects: Option<String>,
    pub effects_note: Option<String>,

    // Run settings
    pub threads: Option<usize>,
    pub tolerance: Option<f64>,
    pub no_progress: Option<bool>,
    pub dry_run: Option<bool>,
}

impl Config {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        println!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(path, content)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        println!("📄 Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Generate a sample configuration file with comments
    pub fn generate_sample() -> String {
        r#"# reffree.toml - Configuration file for reffree
# Command line arguments will override these settings

# =============================================================================
# INPUT
# =============================================================================

# Comprehensive genotype set: states per site and number of sites
num_states = 3
num_sites = 4

# Phenotype generator: count, random, additive
generator = "count"

# Generator parameters (count: k; random: seed, mean, sd; additive: seed)
generator_config = "k=1"

# Or decompose a measured phenotype table instead (genotype and phenotype columns)
# phenotypes = "/path/to/phenotypes.tsv"

# =============================================================================
# OUTPUT
# =============================================================================

# Output effects file
output = "effects.tsv"

# Output format: tsv, csv, json
format = "tsv"

# Observed vs recomposed phenotypes per genotype
# predictions = "predictions.tsv"

# Saved decomposition for later inspection (.lz4 extension)
# save_effects = "effects.lz4"
# effects_note = "My analysis run"

# =============================================================================
# RUN SETTINGS
# =============================================================================

# Number of threads (omit for auto-detection)
threads = 8

# Maximum absolute residual accepted by the reconstruction check
tolerance = 1e-5

# Hide the progress bar
no_progress = false

# Validate inputs without computation (dry run)
dry_run = false
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_parses() {
        let config: Config = toml::from_str(&Config::generate_sample()).unwrap();
        assert_eq!(config.num_states, Some(3));
        assert_eq!(config.num_sites, Some(4));
        assert_eq!(config.generator.as_deref(), Some("count"));
        assert_eq!(config.tolerance, Some(1e-5));
        assert!(config.phenotypes.is_none());
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reffree.toml");
        let config = Config {
            num_states: Some(2),
            num_sites: Some(5),
            generator: Some("random".to_string()),
            generator_config: Some("seed=7".to_string()),
            ..Config::new()
        };
        config.to_file(&path).unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "num_states = \"three\"").unwrap();
        assert!(Config::from_file(&path).is_err());
        assert!(Config::from_file(dir.path().join("missing.toml")).is_err());
    }
}
