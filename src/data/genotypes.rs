// genotypes.rs - One-hot genotype sets and the comprehensive enumerator

use crate::error::{EffectsError, Result};
use ndarray::{Array1, Array3, ArrayView1, ArrayView2, ArrayView3, Axis};
use serde::{Deserialize, Serialize};

/// Ordered collection of one-hot genotypes, shape (num_genotypes, num_sites, num_states)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenotypeSet {
    data: Array3<u8>,
}

impl GenotypeSet {
    /// Enumerate every genotype over `num_states` states at `num_sites` sites.
    ///
    /// Genotypes come out in product (odometer) order: the first site varies
    /// slowest and the last site fastest, and state `i` is row `i` of the
    /// identity matrix.
    ///
    /// The tensor holds `num_states^num_sites * num_sites * num_states` bytes,
    /// so practical sizes stop somewhere in the low millions of genotypes
    /// (e.g. 20 states at 4 sites is 160k genotypes, 20 at 5 is 3.2M).
    pub fn comprehensive(num_states: usize, num_sites: usize) -> Result<Self> {
        if num_states == 0 || num_sites == 0 {
            return Err(EffectsError::InvalidDimensions {
                num_states,
                num_sites,
            });
        }

        let too_many = EffectsError::TooManyGenotypes {
            num_states,
            num_sites,
        };
        let num_genotypes = u32::try_from(num_sites)
            .ok()
            .and_then(|n| num_states.checked_pow(n))
            .ok_or(too_many)?;
        num_genotypes
            .checked_mul(num_sites)
            .and_then(|n| n.checked_mul(num_states))
            .filter(|&n| n <= isize::MAX as usize)
            .ok_or(EffectsError::TooManyGenotypes {
                num_states,
                num_sites,
            })?;

        let mut data = Array3::<u8>::zeros((num_genotypes, num_sites, num_states));
        for (idx, mut genotype) in data.outer_iter_mut().enumerate() {
            let mut rest = idx;
            for site in (0..num_sites).rev() {
                genotype[[site, rest % num_states]] = 1;
                rest /= num_states;
            }
        }

        Ok(Self { data })
    }

    /// Build a set from integer-coded genotypes (one state index per site)
    pub fn from_state_indices(rows: &[Vec<usize>], num_states: usize) -> Result<Self> {
        let num_sites = rows.first().map(|r| r.len()).unwrap_or(0);
        if num_states == 0 || num_sites == 0 {
            return Err(EffectsError::InvalidDimensions {
                num_states,
                num_sites,
            });
        }

        let mut data = Array3::<u8>::zeros((rows.len(), num_sites, num_states));
        for (row, mut genotype) in rows.iter().zip(data.outer_iter_mut()) {
            if row.len() != num_sites {
                return Err(EffectsError::shape_mismatch(&[num_sites], &[row.len()]));
            }
            for (site, &state) in row.iter().enumerate() {
                if state >= num_states {
                    return Err(EffectsError::StateOutOfRange { state, num_states });
                }
                genotype[[site, state]] = 1;
            }
        }

        Ok(Self { data })
    }

    pub fn num_genotypes(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn num_sites(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn num_states(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    /// (num_genotypes, num_sites, num_states)
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    /// Genotype at `index`, or `None` past the end
    pub fn get(&self, index: usize) -> Option<ArrayView2<'_, u8>> {
        (index < self.num_genotypes()).then(|| self.data.index_axis(Axis(0), index))
    }

    pub fn iter(&self) -> ndarray::iter::AxisIter<'_, u8, ndarray::Ix2> {
        self.data.outer_iter()
    }

    /// Decode every genotype back to state indices
    pub fn state_indices(&self) -> Result<Vec<Vec<usize>>> {
        self.iter().map(decode_genotype).collect()
    }

    pub fn into_inner(self) -> Array3<u8> {
        self.data
    }
}

impl From<Array3<u8>> for GenotypeSet {
    fn from(data: Array3<u8>) -> Self {
        Self { data }
    }
}

/// Enumerate the comprehensive genotype set (see [`GenotypeSet::comprehensive`])
pub fn make_comprehensive_genotypes(num_states: usize, num_sites: usize) -> Result<GenotypeSet> {
    GenotypeSet::comprehensive(num_states, num_sites)
}

/// One-hot row for `state`
pub fn one_hot(state: usize, num_states: usize) -> Result<Array1<u8>> {
    if state >= num_states {
        return Err(EffectsError::StateOutOfRange { state, num_states });
    }
    let mut row = Array1::<u8>::zeros(num_states);
    row[state] = 1;
    Ok(row)
}

/// Active state of a one-hot row; `site` is only used for error reporting
pub fn decode_state(row: ArrayView1<'_, u8>, site: usize) -> Result<usize> {
    let mut active = None;
    for (state, &value) in row.iter().enumerate() {
        match value {
            0 => {}
            1 if active.is_none() => active = Some(state),
            _ => return Err(EffectsError::InvalidOneHot { site }),
        }
    }
    active.ok_or(EffectsError::InvalidOneHot { site })
}

/// Active state at every site of a genotype
pub fn decode_genotype(genotype: ArrayView2<'_, u8>) -> Result<Vec<usize>> {
    genotype
        .outer_iter()
        .enumerate()
        .map(|(site, row)| decode_state(row, site))
        .collect()
}

/// Text label used in phenotype and prediction tables, e.g. `0-2-1`
pub fn genotype_label(states: &[usize]) -> String {
    states
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join("-")
}

/// Inverse of [`genotype_label`]
pub fn parse_genotype_label(label: &str) -> Result<Vec<usize>> {
    label
        .trim()
        .split('-')
        .map(|part| {
            part.trim().parse::<usize>().map_err(|_| {
                EffectsError::InvalidConfig(format!("invalid genotype label '{}'", label))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use std::collections::HashSet;

    #[test]
    fn test_comprehensive_shape() {
        for num_sites in 1..=5 {
            for num_states in 1..=3 {
                let genotypes = make_comprehensive_genotypes(num_states, num_sites).unwrap();
                assert_eq!(
                    genotypes.shape(),
                    (num_states.pow(num_sites as u32), num_sites, num_states)
                );
            }
        }
    }

    #[test]
    fn test_comprehensive_unique_and_one_hot() {
        let genotypes = make_comprehensive_genotypes(3, 4).unwrap();
        let mut seen = HashSet::new();
        for genotype in genotypes.iter() {
            for row in genotype.outer_iter() {
                assert_eq!(row.iter().map(|&v| v as usize).sum::<usize>(), 1);
            }
            assert!(seen.insert(decode_genotype(genotype).unwrap()));
        }
        assert_eq!(seen.len(), 81);
    }

    #[test]
    fn test_comprehensive_order() {
        let genotypes = make_comprehensive_genotypes(2, 2).unwrap();
        let states = genotypes.state_indices().unwrap();
        assert_eq!(states, vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]]);

        let genotypes = make_comprehensive_genotypes(3, 2).unwrap();
        assert_eq!(genotypes.get(5).unwrap(), array![[0u8, 1, 0], [0, 0, 1]]);
    }

    #[test]
    fn test_single_state_degenerates() {
        let genotypes = make_comprehensive_genotypes(1, 4).unwrap();
        assert_eq!(genotypes.shape(), (1, 4, 1));
        assert!(genotypes.view().iter().all(|&v| v == 1));
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(
            make_comprehensive_genotypes(0, 3),
            Err(EffectsError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            make_comprehensive_genotypes(3, 0),
            Err(EffectsError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            make_comprehensive_genotypes(20, 100),
            Err(EffectsError::TooManyGenotypes { .. })
        ));
    }

    #[test]
    fn test_decode_state() {
        assert_eq!(decode_state(array![0u8, 0, 1].view(), 0).unwrap(), 2);
        assert!(matches!(
            decode_state(array![0u8, 0, 0].view(), 3),
            Err(EffectsError::InvalidOneHot { site: 3 })
        ));
        assert!(decode_state(array![1u8, 1, 0].view(), 0).is_err());
        assert!(decode_state(array![0u8, 2, 0].view(), 0).is_err());
    }

    #[test]
    fn test_decode_genotype_reports_site() {
        let genotype: Array2<u8> = array![[0, 1, 0], [1, 0, 0], [0, 1, 0], [0, 0, 0]];
        match decode_genotype(genotype.view()) {
            Err(EffectsError::InvalidOneHot { site }) => assert_eq!(site, 3),
            other => panic!("Expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_state_indices() {
        let rows = vec![vec![0, 2], vec![1, 1]];
        let genotypes = GenotypeSet::from_state_indices(&rows, 3).unwrap();
        assert_eq!(genotypes.shape(), (2, 2, 3));
        assert_eq!(genotypes.state_indices().unwrap(), rows);

        assert!(matches!(
            GenotypeSet::from_state_indices(&[vec![0, 3]], 3),
            Err(EffectsError::StateOutOfRange { state: 3, .. })
        ));
        assert!(GenotypeSet::from_state_indices(&[vec![0, 1], vec![0]], 3).is_err());
        assert!(GenotypeSet::from_state_indices(&[], 3).is_err());
    }

    #[test]
    fn test_genotype_label_roundtrip() {
        assert_eq!(genotype_label(&[0, 12, 3]), "0-12-3");
        assert_eq!(parse_genotype_label("0-12-3").unwrap(), vec![0, 12, 3]);
        assert!(parse_genotype_label("0-x").is_err());
    }

    #[test]
    fn test_one_hot() {
        assert_eq!(one_hot(1, 3).unwrap(), array![0u8, 1, 0]);
        assert!(one_hot(3, 3).is_err());
    }

    #[test]
    fn test_from_array() {
        let data = ndarray::Array3::<u8>::from_shape_vec(
            (2, 2, 2),
            vec![1, 0, 0, 1, 0, 1, 1, 0],
        )
        .unwrap();
        let set = GenotypeSet::from(data.clone());
        assert_eq!(set.shape(), (2, 2, 2));
        assert_eq!(set.state_indices().unwrap(), vec![vec![0, 1], vec![1, 0]]);
        assert_eq!(set.into_inner(), data);
    }
}
