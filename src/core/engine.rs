// engine.rs - Decomposition driver with progress reporting

use crate::core::effects::{decompose_with_progress, num_cells, Decomposition};
use crate::core::evaluate::ReconstructionReport;
use crate::data::GenotypeSet;
use crate::error::Result;
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::ArrayView1;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Runs decompositions and reconstruction checks, reporting progress on stdout.
///
/// The effect functions themselves never print; this is the layer the CLI uses.
#[derive(Debug, Clone)]
pub struct DecompositionEngine {
    show_progress: bool,
}

impl Default for DecompositionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DecompositionEngine {
    pub fn new() -> Self {
        Self {
            show_progress: true,
        }
    }

    /// Engine without a progress bar (timing lines are still printed)
    pub fn quiet() -> Self {
        Self {
            show_progress: false,
        }
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {per_sec} ETA: {eta}")
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    }

    /// Compute e0, e1 and e2 for an aligned genotype/phenotype dataset
    pub fn run(&self, genotypes: &GenotypeSet, phenotypes: ArrayView1<'_, f64>) -> Result<Decomposition> {
        let (num_genotypes, num_sites, num_states) = genotypes.shape();
        let total_cells = num_cells(num_sites, num_states);
        println!(
            "🔄 Decomposing {} genotypes ({} sites × {} states = {} effect cells)...",
            num_genotypes, num_sites, num_states, total_cells
        );

        let start = Instant::now();
        let pb = self.progress_bar(total_cells);

        // Update every 1%
        let update_interval = std::cmp::max(1, total_cells / 100);
        let progress_counter = AtomicUsize::new(0);
        let on_cell = || {
            let count = progress_counter.fetch_add(1, Ordering::Relaxed) + 1;
            if count % update_interval == 0 {
                pb.set_position(count as u64);
            }
        };

        let decomposition = decompose_with_progress(genotypes, phenotypes, &on_cell)?;
        pb.finish_with_message("✅ Decomposition completed!");

        let undefined = decomposition.undefined_cells();
        if undefined > 0 {
            println!(
                "⚠️  Warning: {} effect cells are NaN (state combinations absent from the genotype set)",
                undefined
            );
        }

        println!(
            "✅ Effects computed in {:.2}s (e0 = {:.6})",
            start.elapsed().as_secs_f64(),
            decomposition.e0
        );
        Ok(decomposition)
    }

    /// Recompose every genotype and compare against the observed phenotypes
    pub fn check_reconstruction(
        &self,
        decomposition: &Decomposition,
        genotypes: &GenotypeSet,
        phenotypes: ArrayView1<'_, f64>,
        tolerance: f64,
    ) -> Result<ReconstructionReport> {
        let start = Instant::now();
        let predicted = decomposition.predict_all(genotypes)?;
        let report = ReconstructionReport::compare(phenotypes, predicted.view())?;

        println!("🔍 Reconstruction check ({} genotypes):", report.num_genotypes);
        println!("  • Max absolute error: {:.3e}", report.max_abs_error);
        println!("  • RMSE: {:.3e}", report.rmse);
        println!("  • Pearson r: {:.6}", report.pearson_r);
        if report.within(tolerance) {
            println!(
                "  🟢 Phenotypes reproduced within {:e} ({:.2}s)",
                tolerance,
                start.elapsed().as_secs_f64()
            );
        } else if report.max_abs_error.is_nan() {
            println!("  🟡 Some phenotypes could not be recomposed (NaN effects or phenotypes)");
        } else {
            println!(
                "  🟡 Residuals exceed {:e}: the data carries interactions beyond second order",
                tolerance
            );
        }
        Ok(report)
    }
}
