// mod.rs - Output formatters module

pub mod store;

use crate::core::{site_pairs, Decomposition};
use crate::data::{decode_genotype, genotype_label, GenotypeSet};
use ndarray::ArrayView1;
use serde::Serialize;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

pub use store::{inspect_store, load_decomposition, save_decomposition, StoreMetadata, StoredDecomposition};

/// Effect table format
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Tsv,
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tsv" => Ok(OutputFormat::Tsv),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unsupported output format: {}. Use: tsv, csv, json", s)),
        }
    }
}

impl OutputFormat {
    fn delimiter(&self) -> u8 {
        match self {
            OutputFormat::Csv => b',',
            _ => b'\t',
        }
    }
}

/// Ensure parent directory exists before creating file
fn ensure_parent_dir(file_path: &str) -> Result<(), String> {
    if let Some(parent) = Path::new(file_path).parent() {
        create_dir_all(parent)
            .map_err(|e| format!("Failed to create parent directory '{}': {}", parent.display(), e))?;
    }
    Ok(())
}

fn create_writer(file_path: &str) -> Result<BufWriter<File>, String> {
    ensure_parent_dir(file_path)?;
    let file = File::create(file_path)
        .map_err(|e| format!("Failed to create output file '{}': {}", file_path, e))?;
    Ok(BufWriter::new(file))
}

fn write_header_comments<W: Write>(writer: &mut W, command_line: &str) -> Result<(), String> {
    writeln!(writer, "# Command: {}", command_line).map_err(|e| format!("Write error: {}", e))?;
    writeln!(writer, "# Generated: {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))
        .map_err(|e| format!("Write error: {}", e))?;
    writeln!(writer, "# reffree v{}", env!("CARGO_PKG_VERSION")).map_err(|e| format!("Write error: {}", e))?;
    Ok(())
}

/// Write effects as a long table: order, site1, state1, site2, state2, effect.
/// Unused columns hold `NA`; only site1 < site2 rows are written for order 2.
pub fn write_effects_table(
    file_path: &str,
    format: OutputFormat,
    decomposition: &Decomposition,
    command_line: &str,
) -> Result<(), String> {
    let mut writer = create_writer(file_path)?;
    write_header_comments(&mut writer, command_line)?;

    let mut table = csv::WriterBuilder::new()
        .delimiter(format.delimiter())
        .from_writer(writer);
    let csv_err = |e: csv::Error| format!("Write error: {}", e);

    table
        .write_record(["order", "site1", "state1", "site2", "state2", "effect"])
        .map_err(csv_err)?;
    table
        .write_record(["0", "NA", "NA", "NA", "NA", decomposition.e0.to_string().as_str()])
        .map_err(csv_err)?;

    for ((site, state), value) in decomposition.e1.indexed_iter() {
        table
            .write_record([
                "1".to_string(),
                site.to_string(),
                state.to_string(),
                "NA".to_string(),
                "NA".to_string(),
                value.to_string(),
            ])
            .map_err(csv_err)?;
    }

    let num_states = decomposition.num_states();
    for (site1, site2) in site_pairs(decomposition.num_sites()) {
        for state1 in 0..num_states {
            for state2 in 0..num_states {
                let value = decomposition.e2[[site1, state1, site2, state2]];
                table
                    .write_record([
                        "2".to_string(),
                        site1.to_string(),
                        state1.to_string(),
                        site2.to_string(),
                        state2.to_string(),
                        value.to_string(),
                    ])
                    .map_err(csv_err)?;
            }
        }
    }

    table.flush().map_err(|e| format!("Flush error: {}", e))?;
    println!("✅ Effects table written to: {}", file_path);
    Ok(())
}

#[derive(Serialize)]
struct EffectsDocument<'a> {
    command: &'a str,
    generated: String,
    version: &'static str,
    num_sites: usize,
    num_states: usize,
    #[serde(flatten)]
    decomposition: &'a Decomposition,
}

/// Write effects as a JSON document (e0, e1, e2 plus run details)
pub fn write_effects_json(
    file_path: &str,
    decomposition: &Decomposition,
    command_line: &str,
) -> Result<(), String> {
    let writer = create_writer(file_path)?;
    let document = EffectsDocument {
        command: command_line,
        generated: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        version: env!("CARGO_PKG_VERSION"),
        num_sites: decomposition.num_sites(),
        num_states: decomposition.num_states(),
        decomposition,
    };
    serde_json::to_writer_pretty(writer, &document)
        .map_err(|e| format!("Failed to serialize effects: {}", e))?;
    println!("✅ Effects written to: {} (JSON format)", file_path);
    Ok(())
}

/// Write effects in the specified format
pub fn write_effects(
    file_path: &str,
    format: OutputFormat,
    decomposition: &Decomposition,
    command_line: &str,
) -> Result<(), String> {
    match format {
        OutputFormat::Json => write_effects_json(file_path, decomposition, command_line),
        _ => write_effects_table(file_path, format, decomposition, command_line),
    }
}

/// Write observed vs recomposed phenotype per genotype
pub fn write_predictions(
    file_path: &str,
    format: OutputFormat,
    genotypes: &GenotypeSet,
    observed: ArrayView1<'_, f64>,
    predicted: ArrayView1<'_, f64>,
    command_line: &str,
) -> Result<(), String> {
    if format == OutputFormat::Json {
        return Err("Predictions can only be written as tsv or csv".to_string());
    }
    let mut writer = create_writer(file_path)?;
    write_header_comments(&mut writer, command_line)?;

    let mut table = csv::WriterBuilder::new()
        .delimiter(format.delimiter())
        .from_writer(writer);
    let csv_err = |e: csv::Error| format!("Write error: {}", e);

    table
        .write_record(["genotype", "observed", "predicted", "residual"])
        .map_err(csv_err)?;
    for ((genotype, obs), pred) in genotypes.iter().zip(observed.iter()).zip(predicted.iter()) {
        let states = decode_genotype(genotype).map_err(|e| e.to_string())?;
        table
            .write_record([
                genotype_label(&states),
                obs.to_string(),
                pred.to_string(),
                (obs - pred).to_string(),
            ])
            .map_err(csv_err)?;
    }

    table.flush().map_err(|e| format!("Flush error: {}", e))?;
    println!("✅ Predictions written to: {}", file_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::decompose;
    use crate::data::make_comprehensive_genotypes;
    use crate::generators::{CountGenerator, PhenotypeGenerator};

    fn count_decomposition() -> (GenotypeSet, ndarray::Array1<f64>, Decomposition) {
        let genotypes = make_comprehensive_genotypes(2, 3).unwrap();
        let phenotypes = CountGenerator::new(1).generate(&genotypes).unwrap();
        let decomposition = decompose(&genotypes, phenotypes.view()).unwrap();
        (genotypes, phenotypes, decomposition)
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("TSV".parse::<OutputFormat>().unwrap(), OutputFormat::Tsv);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("phylip".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_write_effects_tsv() {
        let (_, _, decomposition) = count_decomposition();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/effects.tsv");
        let path = path.to_str().unwrap();

        write_effects(path, OutputFormat::Tsv, &decomposition, "reffree --test").unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "# Command: reffree --test");
        assert_eq!(lines[3], "order\tsite1\tstate1\tsite2\tstate2\teffect");
        assert_eq!(lines[4], "0\tNA\tNA\tNA\tNA\t1.5");
        // 1 header + 1 e0 + 3*2 e1 + 3 pairs * 4 e2
        assert_eq!(lines.len() - 3, 1 + 1 + 6 + 12);
        assert_eq!(lines[5], "1\t0\t0\tNA\tNA\t-0.5");
    }

    #[test]
    fn test_write_effects_json() {
        let (_, _, decomposition) = count_decomposition();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("effects.json");
        let path = path.to_str().unwrap();

        write_effects(path, OutputFormat::Json, &decomposition, "reffree").unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["num_sites"], 3);
        assert_eq!(value["num_states"], 2);
        assert_eq!(value["e0"], 1.5);
        assert!(value.get("e2").is_some());
    }

    #[test]
    fn test_write_predictions_csv() {
        let (genotypes, phenotypes, decomposition) = count_decomposition();
        let predicted = decomposition.predict_all(&genotypes).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.csv");
        let path = path.to_str().unwrap();

        write_predictions(
            path,
            OutputFormat::Csv,
            &genotypes,
            phenotypes.view(),
            predicted.view(),
            "reffree",
        )
        .unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[3], "genotype,observed,predicted,residual");
        assert!(lines[4].starts_with("0-0-0,0,"));
        assert_eq!(lines.len(), 3 + 1 + 8);

        assert!(write_predictions(
            path,
            OutputFormat::Json,
            &genotypes,
            phenotypes.view(),
            predicted.view(),
            "reffree",
        )
        .is_err());
    }
}
