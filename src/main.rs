// main.rs - CLI entry point

use std::path::Path;
use std::time::Instant;

use ndarray::Array1;
use reffree::cli::Config;
use reffree::output::{
    inspect_store, save_decomposition, write_effects, write_predictions, StoreMetadata,
};
use reffree::prelude::*;

fn main() {
    if let Err(e) = run_main() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), String> {
    let mut args: Args = argh::from_env();
    let command_line = std::env::args().collect::<Vec<String>>().join(" ");

    // Handle generate config first
    if args.generate_config {
        let sample_config = Config::generate_sample();
        println!("{}", sample_config);
        println!("\n💡 Save this content to a .toml file and use --config /path/to/config.toml");
        return Ok(());
    }

    // Load configuration file if specified
    if let Some(config_path) = args.config.clone() {
        args = args.with_config_file(&config_path)?;
    }

    if args.hello {
        println!("This project's name is {}", reffree::PROJECT_NAME);
        return Ok(());
    }

    if args.describe {
        println!(
            "This project's description is reference-free analysis of genotype-phenotype maps: \
             phenotypes are decomposed into mean, single-site and pairwise effects relative to \
             the population mean"
        );
        return Ok(());
    }

    if args.list_generators {
        println!("Available phenotype generators:");
        for (name, description) in PhenotypeGeneratorFactory::list_available() {
            println!("  - {}: {}", name, description);
        }
        return Ok(());
    }

    // Handle inspector mode
    if let Some(effects_path) = &args.inspect {
        return inspect_store(effects_path);
    }

    // Validate all arguments
    let validation_result = validate_args(&args)?;

    println!("🚀 {}", reffree::get_info());

    // Configure thread pool
    if let Some(n) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .map_err(|e| format!("Failed to configure thread pool: {}", e))?;
        println!("🧵 Threads: {}", n);
    } else {
        let num_threads = rayon::current_num_threads();
        println!("🧵 Threads: {} (auto-detected)", num_threads);
    }

    let total_start = Instant::now();
    let source_label = validation_result.source.label();
    let (genotypes, phenotypes) = load_dataset(&validation_result.source)?;

    let (num_genotypes, num_sites, num_states) = genotypes.shape();
    println!(
        "📊 Dataset: {} genotypes × {} sites × {} states",
        num_genotypes, num_sites, num_states
    );

    if args.dry_run {
        println!("✅ Dry run completed successfully");
        return Ok(());
    }

    let engine = if args.no_progress {
        DecompositionEngine::quiet()
    } else {
        DecompositionEngine::new()
    };
    let decomposition = engine
        .run(&genotypes, phenotypes.view())
        .map_err(|e| format!("Decomposition failed: {}", e))?;
    engine
        .check_reconstruction(&decomposition, &genotypes, phenotypes.view(), validation_result.tolerance)
        .map_err(|e| format!("Reconstruction check failed: {}", e))?;

    if let Some(output) = &args.output {
        write_effects(output, validation_result.output_format, &decomposition, &command_line)?;
    } else {
        println!("💡 No --output given: effects were not written");
    }

    if let Some(predictions_path) = &args.predictions {
        let predicted = decomposition
            .predict_all(&genotypes)
            .map_err(|e| format!("Failed to recompose phenotypes: {}", e))?;
        write_predictions(
            predictions_path,
            validation_result.output_format,
            &genotypes,
            phenotypes.view(),
            predicted.view(),
            &command_line,
        )?;
    }

    if let Some(effects_path) = &args.save_effects {
        let metadata = StoreMetadata::new(&decomposition, num_genotypes, &source_label)
            .with_note(args.effects_note.clone());
        save_decomposition(effects_path, &decomposition, metadata)?;
    }

    println!(
        "\n🎉 Completed in {:.2}s",
        total_start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Genotypes and aligned phenotypes for the run
fn load_dataset(source: &PhenotypeSource) -> Result<(GenotypeSet, Array1<f64>), String> {
    let start = Instant::now();
    match source {
        PhenotypeSource::Table { path, num_states } => {
            println!("📂 Loading phenotype table from {}...", path.display());
            let table = PhenotypeTable::from_file(Path::new(path), *num_states)
                .map_err(|e| format!("Failed to load phenotype table: {}", e))?;
            if !table.is_comprehensive() {
                let (rows, sites, states) = table.genotypes.shape();
                println!(
                    "⚠️  Warning: table has {} genotypes, not the full set of {}^{} unique genotypes; \
                     effects of unobserved state combinations will be NaN",
                    rows, states, sites
                );
            }
            println!("✅ Table loaded in {:.2}s", start.elapsed().as_secs_f64());
            Ok((table.genotypes, table.phenotypes))
        }
        PhenotypeSource::Generated {
            num_states,
            num_sites,
            generator,
        } => {
            println!("🧬 Enumerating {}^{} genotypes...", num_states, num_sites);
            let genotypes = make_comprehensive_genotypes(*num_states, *num_sites)
                .map_err(|e| format!("Failed to enumerate genotypes: {}", e))?;
            println!("🎲 Phenotypes: {} ({})", generator.name(), generator.description());
            let phenotypes = generator
                .generate(&genotypes)
                .map_err(|e| format!("Failed to generate phenotypes: {}", e))?;
            println!("✅ Dataset ready in {:.2}s", start.elapsed().as_secs_f64());
            Ok((genotypes, phenotypes))
        }
    }
}
