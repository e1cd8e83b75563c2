// table.rs - Phenotype table loader (TSV/CSV)

use crate::data::genotypes::{genotype_label, parse_genotype_label, GenotypeSet};
use crate::error::{EffectsError, Result};
use ndarray::Array1;
use std::path::Path;

/// Genotypes and their measured phenotypes, aligned by row
#[derive(Debug, Clone)]
pub struct PhenotypeTable {
    pub genotypes: GenotypeSet,
    pub phenotypes: Array1<f64>,
}

impl PhenotypeTable {
    /// Load a table with `genotype` and `phenotype` columns.
    ///
    /// Genotypes are dash-separated state indices (`0-2-1`). The delimiter is
    /// `,` for `.csv` files and tab otherwise; lines starting with `#` are
    /// skipped. When `num_states` is `None` the alphabet size is the largest
    /// state index seen plus one.
    pub fn from_file(path: &Path, num_states: Option<usize>) -> Result<Self> {
        let delimiter = match path.extension().and_then(|s| s.to_str()) {
            Some("csv") => b',',
            _ => b'\t',
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| {
                    EffectsError::InvalidConfig(format!(
                        "phenotype table '{}' has no '{}' column",
                        path.display(),
                        name
                    ))
                })
        };
        let genotype_col = column("genotype")?;
        let phenotype_col = column("phenotype")?;

        let mut rows = Vec::new();
        let mut values = Vec::new();
        for (line_num, record) in reader.records().enumerate() {
            let record = record?;
            let field = |col: usize| {
                record.get(col).ok_or_else(|| {
                    EffectsError::InvalidConfig(format!("row {} is missing a column", line_num + 2))
                })
            };
            rows.push(parse_genotype_label(field(genotype_col)?)?);
            let raw = field(phenotype_col)?;
            let value = raw.parse::<f64>().map_err(|_| {
                EffectsError::InvalidConfig(format!(
                    "row {}: failed to parse phenotype '{}'",
                    line_num + 2,
                    raw
                ))
            })?;
            values.push(value);
        }

        let num_states = match num_states {
            Some(n) => n,
            None => rows.iter().flatten().max().map(|m| m + 1).unwrap_or(0),
        };
        let genotypes = GenotypeSet::from_state_indices(&rows, num_states)?;

        Ok(Self {
            genotypes,
            phenotypes: Array1::from(values),
        })
    }

    /// Write the table back out in the format [`PhenotypeTable::from_file`] reads
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let delimiter = match path.extension().and_then(|s| s.to_str()) {
            Some("csv") => b',',
            _ => b'\t',
        };
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_path(path)?;
        writer.write_record(["genotype", "phenotype"])?;
        for (states, value) in self
            .genotypes
            .state_indices()?
            .iter()
            .zip(self.phenotypes.iter())
        {
            writer.write_record([genotype_label(states), value.to_string()])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Whether every genotype over the table's alphabet appears exactly once
    pub fn is_comprehensive(&self) -> bool {
        let (num_genotypes, num_sites, num_states) = self.genotypes.shape();
        let expected = u32::try_from(num_sites)
            .ok()
            .and_then(|n| num_states.checked_pow(n));
        if expected != Some(num_genotypes) {
            return false;
        }
        match self.genotypes.state_indices() {
            Ok(states) => {
                let unique: std::collections::HashSet<_> = states.into_iter().collect();
                unique.len() == num_genotypes
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::genotypes::make_comprehensive_genotypes;
    use std::io::Write;

    #[test]
    fn test_load_tsv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phenotypes.tsv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "# measured fitness").unwrap();
        writeln!(file, "genotype\tphenotype").unwrap();
        writeln!(file, "0-0\t1.5").unwrap();
        writeln!(file, "0-1\t2.0").unwrap();
        writeln!(file, "1-0\t-0.5").unwrap();
        writeln!(file, "1-1\t3.25").unwrap();
        drop(file);

        let table = PhenotypeTable::from_file(&path, None).unwrap();
        assert_eq!(table.genotypes.shape(), (4, 2, 2));
        assert_eq!(table.phenotypes.to_vec(), vec![1.5, 2.0, -0.5, 3.25]);
        assert!(table.is_comprehensive());
    }

    #[test]
    fn test_load_csv_with_explicit_states() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phenotypes.csv");
        std::fs::write(&path, "Phenotype,Genotype\n0.1,0-1\n0.2,1-1\n").unwrap();

        let table = PhenotypeTable::from_file(&path, Some(3)).unwrap();
        assert_eq!(table.genotypes.shape(), (2, 2, 3));
        assert!(!table.is_comprehensive());
    }

    #[test]
    fn test_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.tsv");
        std::fs::write(&path, "genotype\tfitness\n0-1\t1.0\n").unwrap();
        assert!(matches!(
            PhenotypeTable::from_file(&path, None),
            Err(EffectsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_bad_phenotype_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.tsv");
        std::fs::write(&path, "genotype\tphenotype\n0-1\tabc\n").unwrap();
        assert!(PhenotypeTable::from_file(&path, None).is_err());
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.tsv");
        let genotypes = make_comprehensive_genotypes(3, 2).unwrap();
        let phenotypes = Array1::from_iter((0..9).map(|i| i as f64 * 0.5));
        let table = PhenotypeTable {
            genotypes,
            phenotypes,
        };
        table.to_file(&path).unwrap();

        let loaded = PhenotypeTable::from_file(&path, Some(3)).unwrap();
        assert_eq!(loaded.genotypes, table.genotypes);
        assert_eq!(loaded.phenotypes, table.phenotypes);
    }
}
