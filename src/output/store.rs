// store.rs - LZ4-compressed decomposition store with run metadata

use crate::core::Decomposition;
use ndarray::{Array2, Array4};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

pub const STORE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreMetadata {
    pub version: String,
    pub created: String,
    pub num_sites: usize,
    pub num_states: usize,
    pub num_genotypes: usize,
    pub phenotype_source: String,
    pub user_note: Option<String>,
    pub format_version: u32,
}

impl StoreMetadata {
    pub fn new(decomposition: &Decomposition, num_genotypes: usize, phenotype_source: &str) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            created: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            num_sites: decomposition.num_sites(),
            num_states: decomposition.num_states(),
            num_genotypes,
            phenotype_source: phenotype_source.to_string(),
            user_note: None,
            format_version: STORE_FORMAT_VERSION,
        }
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.user_note = note;
        self
    }
}

/// Effects flattened in row-major order. NaN cells are stored as null
/// since JSON has no NaN literal.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EffectsPayload {
    e0: Option<f64>,
    e1: Vec<Option<f64>>,
    e2: Vec<Option<f64>>,
}

fn to_nullable(value: f64) -> Option<f64> {
    if value.is_nan() {
        None
    } else {
        Some(value)
    }
}

fn from_nullable(value: Option<f64>) -> f64 {
    value.unwrap_or(f64::NAN)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreFile {
    metadata: StoreMetadata,
    effects: EffectsPayload,
}

/// A decomposition loaded back from disk
#[derive(Debug, Clone)]
pub struct StoredDecomposition {
    pub metadata: StoreMetadata,
    pub decomposition: Decomposition,
}

fn read_store(path: &str) -> Result<StoreFile, String> {
    let compressed = std::fs::read(path)
        .map_err(|e| format!("Failed to read effects file '{}': {}", path, e))?;
    let decompressed = lz4_flex::decompress_size_prepended(&compressed)
        .map_err(|e| format!("Failed to decompress effects file: {}", e))?;
    let store: StoreFile = serde_json::from_slice(&decompressed)
        .map_err(|e| format!("Failed to deserialize effects file: {}", e))?;

    if store.metadata.format_version > STORE_FORMAT_VERSION {
        return Err(format!(
            "Effects file format v{} is newer than supported v{}",
            store.metadata.format_version, STORE_FORMAT_VERSION
        ));
    }
    Ok(store)
}

/// Save a decomposition as LZ4-compressed JSON
pub fn save_decomposition(
    path: &str,
    decomposition: &Decomposition,
    metadata: StoreMetadata,
) -> Result<(), String> {
    println!("💾 Saving effects to {}...", path);
    let start = Instant::now();

    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create parent directory '{}': {}", parent.display(), e))?;
    }

    let store = StoreFile {
        effects: EffectsPayload {
            e0: to_nullable(decomposition.e0),
            e1: decomposition.e1.iter().copied().map(to_nullable).collect(),
            e2: decomposition.e2.iter().copied().map(to_nullable).collect(),
        },
        metadata,
    };
    let data = serde_json::to_vec(&store).map_err(|e| format!("Failed to serialize effects: {}", e))?;
    let compressed = lz4_flex::compress_prepend_size(&data);
    std::fs::write(path, &compressed).map_err(|e| format!("Failed to write effects file: {}", e))?;

    println!(
        "✅ Effects saved in {:.2}s ({} KB)",
        start.elapsed().as_secs_f64(),
        compressed.len() / 1024
    );
    if let Some(note) = &store.metadata.user_note {
        println!("📝 User note: {}", note);
    }
    Ok(())
}

/// Load a decomposition saved by [`save_decomposition`]
pub fn load_decomposition(path: &str) -> Result<StoredDecomposition, String> {
    let store = read_store(path)?;
    let sites = store.metadata.num_sites;
    let states = store.metadata.num_states;

    let e1 = Array2::from_shape_vec(
        (sites, states),
        store.effects.e1.into_iter().map(from_nullable).collect(),
    )
    .map_err(|e| format!("Corrupt first-order effects: {}", e))?;
    let e2 = Array4::from_shape_vec(
        (sites, states, sites, states),
        store.effects.e2.into_iter().map(from_nullable).collect(),
    )
    .map_err(|e| format!("Corrupt second-order effects: {}", e))?;

    Ok(StoredDecomposition {
        metadata: store.metadata,
        decomposition: Decomposition {
            e0: from_nullable(store.effects.e0),
            e1,
            e2,
        },
    })
}

fn max_abs<'a>(values: impl Iterator<Item = &'a f64>) -> f64 {
    values.filter(|v| !v.is_nan()).fold(0.0_f64, |acc, v| acc.max(v.abs()))
}

/// Print a summary of a saved effects file
pub fn inspect_store(path: &str) -> Result<(), String> {
    let stored = load_decomposition(path)?;
    let metadata = &stored.metadata;
    let decomposition = &stored.decomposition;
    let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

    println!("🔍 Effects file: {}", path);
    println!("📏 File size: {} KB", file_size / 1024);
    println!("🏷️  Format: v{} (written by reffree v{})", metadata.format_version, metadata.version);
    println!("📅 Created: {}", metadata.created);
    println!("🧬 Sites: {}, states: {}", metadata.num_sites, metadata.num_states);
    println!("📊 Genotypes decomposed: {}", metadata.num_genotypes);
    println!("🧪 Phenotype source: {}", metadata.phenotype_source);
    if let Some(note) = &metadata.user_note {
        println!("📝 User note: {}", note);
    }

    println!("📈 Effects:");
    println!("  • e0: {:.6}", decomposition.e0);
    println!("  • max |e1|: {:.6}", max_abs(decomposition.e1.iter()));
    println!("  • max |e2|: {:.6}", max_abs(decomposition.e2.iter()));
    let undefined = decomposition.undefined_cells();
    if undefined > 0 {
        println!("  ⚠️  {} undefined (NaN) cells", undefined);
    }
    Ok(())
}
