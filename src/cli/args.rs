// args.rs - Command line arguments definition

use argh::FromArgs;

pub const DEFAULT_GENERATOR: &str = "count";
pub const DEFAULT_FORMAT: &str = "tsv";
pub const DEFAULT_TOLERANCE: f64 = 1e-5;

#[derive(FromArgs)]
/// reffree - Reference-free decomposition of genotype-phenotype maps
pub struct Args {
    /// print the project name and exit
    #[argh(switch)]
    pub hello: bool,

    /// print a short description of the method and exit
    #[argh(switch)]
    pub describe: bool,

    /// number of states per site (alphabet size)
    #[argh(option)]
    pub num_states: Option<usize>,

    /// number of sites per genotype
    #[argh(option)]
    pub num_sites: Option<usize>,

    /// phenotype generator for the comprehensive genotype set: count, random, additive (default: count)
    #[argh(option)]
    pub generator: Option<String>,

    /// generator parameters as key=value pairs, e.g. "k=1" or "seed=42"
    #[argh(option)]
    pub generator_config: Option<String>,

    /// phenotype table (.tsv or .csv) with genotype and phenotype columns
    #[argh(option)]
    pub phenotypes: Option<String>,

    /// output effects file
    #[argh(option)]
    pub output: Option<String>,

    /// output format: tsv, csv, json (default: tsv)
    #[argh(option)]
    pub format: Option<String>,

    /// write observed vs recomposed phenotypes per genotype to this file
    #[argh(option)]
    pub predictions: Option<String>,

    /// save the decomposition to an LZ4 effects file (.lz4 extension)
    #[argh(option)]
    pub save_effects: Option<String>,

    /// user note to store with the saved effects
    #[argh(option)]
    pub effects_note: Option<String>,

    /// number of threads (default: auto-detect)
    #[argh(option)]
    pub threads: Option<usize>,

    /// maximum absolute residual accepted by the reconstruction check (default: 1e-5)
    #[argh(option)]
    pub tolerance: Option<f64>,

    /// hide the progress bar
    #[argh(switch)]
    pub no_progress: bool,

    /// validate inputs without computation (dry run)
    #[argh(switch)]
    pub dry_run: bool,

    /// list available phenotype generators and exit
    #[argh(switch)]
    pub list_generators: bool,

    /// inspect a saved effects file instead of running a decomposition
    #[argh(option)]
    pub inspect: Option<String>,

    /// path to TOML configuration file
    #[argh(option)]
    pub config: Option<String>,

    /// generate sample configuration file and exit
    #[argh(switch)]
    pub generate_config: bool,
}
