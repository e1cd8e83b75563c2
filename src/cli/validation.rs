// validation.rs - Input validation utilities

use crate::cli::args::{Args, DEFAULT_FORMAT, DEFAULT_GENERATOR, DEFAULT_TOLERANCE};
use crate::generators::{PhenotypeGenerator, PhenotypeGeneratorFactory};
use crate::output::OutputFormat;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Where the phenotypes of a run come from
#[derive(Debug)]
pub enum PhenotypeSource {
    /// Measured phenotypes loaded from a table
    Table {
        path: PathBuf,
        num_states: Option<usize>,
    },
    /// Synthetic phenotypes over the comprehensive genotype set
    Generated {
        num_states: usize,
        num_sites: usize,
        generator: Box<dyn PhenotypeGenerator>,
    },
}

impl PhenotypeSource {
    /// Short label stored with saved effects
    pub fn label(&self) -> String {
        match self {
            PhenotypeSource::Table { path, .. } => format!("table:{}", path.display()),
            PhenotypeSource::Generated { generator, .. } => format!("generator:{}", generator.name()),
        }
    }
}

pub struct ValidationResult {
    pub output_format: OutputFormat,
    pub tolerance: f64,
    pub source: PhenotypeSource,
}

/// Validate all command line arguments
pub fn validate_args(args: &Args) -> Result<ValidationResult, String> {
    let output_format = OutputFormat::from_str(args.format.as_deref().unwrap_or(DEFAULT_FORMAT))?;

    if args.predictions.is_some() && output_format == OutputFormat::Json {
        return Err("--predictions is written as a table: use --format tsv or csv".to_string());
    }

    let tolerance = args.tolerance.unwrap_or(DEFAULT_TOLERANCE);
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(format!("Tolerance must be a non-negative number, got {}", tolerance));
    }

    if args.threads == Some(0) {
        return Err("--threads must be at least 1".to_string());
    }

    if let Some(num_states) = args.num_states {
        if num_states == 0 {
            return Err("--num-states must be at least 1".to_string());
        }
    }

    let source = if let Some(path) = &args.phenotypes {
        if args.num_sites.is_some() {
            return Err("--num-sites is not compatible with --phenotypes (sites are read from the table)".to_string());
        }
        if args.generator.is_some() || args.generator_config.is_some() {
            return Err("--generator is not compatible with --phenotypes".to_string());
        }
        if !Path::new(path).exists() {
            return Err(format!("Phenotype table not found: {}", path));
        }
        PhenotypeSource::Table {
            path: PathBuf::from(path),
            num_states: args.num_states,
        }
    } else {
        let (num_states, num_sites) = match (args.num_states, args.num_sites) {
            (Some(states), Some(sites)) => (states, sites),
            _ => {
                return Err(
                    "Either --phenotypes or both --num-states and --num-sites are required".to_string(),
                )
            }
        };
        if num_sites == 0 {
            return Err("--num-sites must be at least 1".to_string());
        }
        let too_many = u32::try_from(num_sites)
            .ok()
            .and_then(|n| num_states.checked_pow(n))
            .is_none();
        if too_many {
            return Err(format!(
                "{}^{} genotypes cannot be enumerated on this platform",
                num_states, num_sites
            ));
        }

        let generator_type = args.generator.as_deref().unwrap_or(DEFAULT_GENERATOR);
        if !PhenotypeGeneratorFactory::has_generator(generator_type) {
            let names: Vec<&str> = PhenotypeGeneratorFactory::list_available()
                .iter()
                .map(|(name, _)| *name)
                .collect();
            return Err(format!(
                "Invalid generator '{}'. Available: {}",
                generator_type,
                names.join(", ")
            ));
        }
        let generator = PhenotypeGeneratorFactory::create(
            generator_type,
            args.generator_config.as_deref().unwrap_or(""),
            num_sites,
            num_states,
        )
        .map_err(|e| format!("Invalid generator configuration: {}", e))?;

        PhenotypeSource::Generated {
            num_states,
            num_sites,
            generator,
        }
    };

    Ok(ValidationResult {
        output_format,
        tolerance,
        source,
    })
}
