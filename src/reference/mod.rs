//! C1 — reference store: contig sequences and gene feature records, read-only
//! once loaded. Mirrors the teacher's habit of keeping reference data behind
//! a cheaply-`Arc`-shared, immutable store (see `reference_reader::GenomesAndContigs`
//! in the teacher's own `reference` module) rather than re-reading files per job.

use std::collections::HashMap;

use crate::errors::{CatalogError, Result};

/// A single contig/chromosome's forward-strand sequence, uppercase ASCII.
pub type ContigSequence = Vec<u8>;

/// An optional handle to an externally supplied 3D structure associated with
/// a feature. The structure's own text/chain parsing is a collaborator
/// (out of scope); this crate only needs the per-chain sequences and a place
/// to write back renumbered residues.
#[derive(Debug, Clone)]
pub struct StructureHandle {
    pub path: String,
    /// Chain name -> amino-acid sequence, one letter per residue.
    pub chains: HashMap<String, Vec<u8>>,
}

/// A reference gene feature. Immutable after load.
#[derive(Debug, Clone)]
pub struct Feature {
    pub name: String,
    pub contig: String,
    /// 1-based, inclusive, always `start <= end` regardless of strand.
    pub start: u32,
    pub end: u32,
    pub is_sense: bool,
    pub is_coding: bool,
    pub structure: Option<StructureHandle>,
}

impl Feature {
    pub fn new(
        name: impl Into<String>,
        contig: impl Into<String>,
        start: u32,
        end: u32,
        is_sense: bool,
        is_coding: bool,
    ) -> Result<Self> {
        if start < 1 || end < start {
            return Err(CatalogError::Reference(format!(
                "feature has impossible coordinates: start={start} end={end}"
            )));
        }
        Ok(Feature {
            name: name.into(),
            contig: contig.into(),
            start,
            end,
            is_sense,
            is_coding,
            structure: None,
        })
    }

    pub fn len(&self) -> usize {
        (self.end - self.start + 1) as usize
    }
}

/// Holds the reference sequence by contig and the set of feature records.
/// Shared freely across worker threads once loaded — nothing here is
/// mutated past `ReferenceStore::load`.
#[derive(Debug, Default)]
pub struct ReferenceStore {
    contigs: HashMap<String, ContigSequence>,
    features: HashMap<String, Feature>,
}

impl ReferenceStore {
    pub fn new() -> Self {
        ReferenceStore::default()
    }

    pub fn insert_contig(&mut self, header: impl Into<String>, sequence: ContigSequence) {
        self.contigs.insert(header.into(), sequence);
    }

    pub fn insert_feature(&mut self, feature: Feature) -> Result<()> {
        if self.features.contains_key(&feature.name) {
            return Err(CatalogError::Reference(format!(
                "duplicate feature name: {}",
                feature.name
            )));
        }
        self.features.insert(feature.name.clone(), feature);
        Ok(())
    }

    pub fn feature(&self, name: &str) -> Result<&Feature> {
        self.features
            .get(name)
            .ok_or_else(|| CatalogError::Reference(format!("unknown feature: {name}")))
    }

    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.features.values()
    }

    pub fn contig(&self, name: &str) -> Result<&[u8]> {
        self.contigs
            .get(name)
            .map(|v| v.as_slice())
            .ok_or_else(|| CatalogError::Reference(format!("unknown contig: {name}")))
    }

    /// 1-based, inclusive subsequence extraction, forward-strand orientation
    /// regardless of the feature's sense.
    pub fn subsequence(&self, contig: &str, start: u32, end: u32) -> Result<Vec<u8>> {
        let seq = self.contig(contig)?;
        if start < 1 || (end as usize) > seq.len() || end < start {
            return Err(CatalogError::Reference(format!(
                "subsequence [{start},{end}] out of bounds for contig {contig} (len {})",
                seq.len()
            )));
        }
        Ok(seq[(start - 1) as usize..end as usize].to_vec())
    }

    /// The forward-strand reference subsequence spanned by `feature`.
    pub fn feature_sequence(&self, feature: &Feature) -> Result<Vec<u8>> {
        self.subsequence(&feature.contig, feature.start, feature.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subsequence_is_one_based_inclusive() {
        let mut store = ReferenceStore::new();
        store.insert_contig("chr1", b"ATGAAATAA".to_vec());
        assert_eq!(store.subsequence("chr1", 1, 9).unwrap(), b"ATGAAATAA");
        assert_eq!(store.subsequence("chr1", 4, 4).unwrap(), b"A");
    }

    #[test]
    fn feature_rejects_impossible_coordinates() {
        assert!(Feature::new("g", "chr1", 5, 2, true, true).is_err());
        assert!(Feature::new("g", "chr1", 0, 2, true, true).is_err());
    }
}
