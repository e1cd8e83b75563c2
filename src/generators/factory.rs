// factory.rs - Factory for creating phenotype generators

use super::*;
use crate::error::{EffectsError, Result};
use std::collections::HashMap;
use std::str::FromStr;

pub struct PhenotypeGeneratorFactory;

impl PhenotypeGeneratorFactory {
    /// Create a generator by name and `key=value,...` configuration string
    pub fn create(
        generator_type: &str,
        config: &str,
        num_sites: usize,
        num_states: usize,
    ) -> Result<Box<dyn PhenotypeGenerator>> {
        let params = Self::parse_config(config);
        let generator: Box<dyn PhenotypeGenerator> = match generator_type {
            "count" => {
                Self::check_keys(generator_type, &params, &["k"])?;
                Box::new(CountGenerator::new(Self::param(&params, "k", 0)?))
            }
            "random" => {
                Self::check_keys(generator_type, &params, &["seed", "mean", "sd"])?;
                Box::new(RandomGenerator::new(
                    Self::param(&params, "seed", 0)?,
                    Self::param(&params, "mean", 0.0)?,
                    Self::param(&params, "sd", 1.0)?,
                )?)
            }
            "additive" => {
                Self::check_keys(generator_type, &params, &["seed"])?;
                Box::new(AdditiveGenerator::random(
                    num_sites,
                    num_states,
                    Self::param(&params, "seed", 0)?,
                ))
            }
            _ => {
                return Err(EffectsError::InvalidConfig(format!(
                    "Unknown phenotype generator: {}",
                    generator_type
                )))
            }
        };
        generator.validate_dimensions(num_sites, num_states)?;
        Ok(generator)
    }

    /// List all available generators
    pub fn list_available() -> Vec<(&'static str, &'static str)> {
        vec![
            ("count", "Number of sites in state k (config: k=0)"),
            ("random", "Independent normal phenotypes (config: seed=0,mean=0,sd=1)"),
            ("additive", "Random order 0-2 effects summed per genotype (config: seed=0)"),
        ]
    }

    pub fn has_generator(name: &str) -> bool {
        Self::list_available().iter().any(|(n, _)| *n == name)
    }

    /// Parse configuration string into HashMap
    pub fn parse_config(config_str: &str) -> HashMap<String, String> {
        let mut config = HashMap::new();

        if config_str.is_empty() {
            return config;
        }

        for pair in config_str.split(',') {
            let parts: Vec<&str> = pair.split('=').collect();
            if parts.len() == 2 {
                config.insert(parts[0].trim().to_string(), parts[1].trim().to_string());
            }
        }

        config
    }

    fn check_keys(generator_type: &str, params: &HashMap<String, String>, allowed: &[&str]) -> Result<()> {
        if let Some(key) = params.keys().find(|k| !allowed.contains(&k.as_str())) {
            return Err(EffectsError::InvalidConfig(format!(
                "Unknown parameter '{}' for generator '{}' (allowed: {})",
                key,
                generator_type,
                allowed.join(", ")
            )));
        }
        Ok(())
    }

    fn param<T: FromStr>(params: &HashMap<String, String>, key: &str, default: T) -> Result<T> {
        match params.get(key) {
            Some(raw) => raw.parse::<T>().map_err(|_| {
                EffectsError::InvalidConfig(format!("Invalid value '{}' for parameter '{}'", raw, key))
            }),
            None => Ok(default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config = PhenotypeGeneratorFactory::parse_config("k=2, seed = 42");
        assert_eq!(config.get("k"), Some(&"2".to_string()));
        assert_eq!(config.get("seed"), Some(&"42".to_string()));
        assert!(PhenotypeGeneratorFactory::parse_config("").is_empty());
    }

    #[test]
    fn test_list_available() {
        let generators = PhenotypeGeneratorFactory::list_available();
        assert_eq!(generators.len(), 3);
        assert!(PhenotypeGeneratorFactory::has_generator("additive"));
        assert!(!PhenotypeGeneratorFactory::has_generator("nonexistent"));
    }

    #[test]
    fn test_create() {
        let count = PhenotypeGeneratorFactory::create("count", "k=2", 3, 3).unwrap();
        assert_eq!(count.name(), "count");

        let random = PhenotypeGeneratorFactory::create("random", "seed=7,sd=0.5", 3, 3).unwrap();
        assert_eq!(random.name(), "random");

        let additive = PhenotypeGeneratorFactory::create("additive", "", 4, 3).unwrap();
        assert_eq!(additive.name(), "additive");
    }

    #[test]
    fn test_create_errors() {
        assert!(PhenotypeGeneratorFactory::create("unknown", "", 3, 3).is_err());
        assert!(PhenotypeGeneratorFactory::create("count", "k=3", 3, 3).is_err());
        assert!(PhenotypeGeneratorFactory::create("count", "k=abc", 3, 3).is_err());
        assert!(PhenotypeGeneratorFactory::create("count", "seed=1", 3, 3).is_err());
        assert!(PhenotypeGeneratorFactory::create("random", "sd=-1", 3, 3).is_err());
    }
}
