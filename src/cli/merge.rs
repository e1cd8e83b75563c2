// merge.rs - Merge configuration file with CLI arguments

use crate::cli::{Args, Config};

impl Args {
    /// Merge with configuration from file
    /// CLI arguments take precedence over config file values
    pub fn merge_with_config(mut self, config: Config) -> Self {
        // Input
        if self.num_states.is_none() {
            self.num_states = config.num_states;
        }
        if self.num_sites.is_none() {
            self.num_sites = config.num_sites;
        }
        if self.generator.is_none() {
            self.generator = config.generator;
        }
        if self.generator_config.is_none() {
            self.generator_config = config.generator_config;
        }
        if self.phenotypes.is_none() {
            self.phenotypes = config.phenotypes;
        }

        // Output
        if self.output.is_none() {
            self.output = config.output;
        }
        if self.format.is_none() {
            self.format = config.format;
        }
        if self.predictions.is_none() {
            self.predictions = config.predictions;
        }
        if self.save_effects.is_none() {
            self.save_effects = config.save_effects;
        }
        if self.effects_note.is_none() {
            self.effects_note = config.effects_note;
        }

        // Run settings
        if self.threads.is_none() {
            self.threads = config.threads;
        }
        if self.tolerance.is_none() {
            self.tolerance = config.tolerance;
        }

        // Flags (config only sets them, never clears a CLI switch)
        if !self.no_progress && config.no_progress.unwrap_or(false) {
            self.no_progress = true;
        }
        if !self.dry_run && config.dry_run.unwrap_or(false) {
            self.dry_run = true;
        }

        self
    }

    /// Load configuration and merge with CLI args
    pub fn with_config_file(self, config_path: &str) -> Result<Self, String> {
        let config = Config::from_file(config_path)?;
        Ok(self.merge_with_config(config))
    }
}
