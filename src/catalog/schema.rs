//! The published catalog document shape (spec.md §6). Plain serde types —
//! assembly lives in `catalog::assemble`, this module only defines the wire
//! format so the JSON produced matches the schema field-for-field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Parameters {
    pub min_coverage: u32,
    pub min_quality: f64,
    pub min_hom_frequency: f64,
    pub min_het_frequency: f64,
    pub max_het_frequency: f64,
    pub threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantAnnotationDocument {
    pub reference: String,
    /// Two-decimal string, e.g. `"0.33"`, matching the published schema's
    /// frequency pattern.
    pub frequency: String,
    #[serde(rename = "isPrimary")]
    pub is_primary: bool,
    pub occurrence: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantGroupDocument {
    pub variants: String,
    pub samples: Vec<String>,
    pub substitutions: u32,
    pub insertions: u32,
    pub deletions: u32,
    /// Two-decimal string.
    pub frequency: String,
    #[serde(rename = "percentVariablePositions")]
    pub percent_variable_positions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProteoformDocument {
    #[serde(flatten)]
    pub common: VariantGroupDocument,
    #[serde(rename = "firstNovelTermination")]
    pub first_novel_termination: String,
    #[serde(rename = "truncationPercentage")]
    pub truncation_percentage: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureDocument {
    pub name: String,
    #[serde(rename = "nucleotideSequence")]
    pub nucleotide_sequence: String,
    #[serde(rename = "translatedNucleotideSequence")]
    pub translated_nucleotide_sequence: Option<String>,
    #[serde(rename = "proteinSequences")]
    pub protein_sequences: BTreeMap<String, String>,
    pub structure: Option<String>,
    pub chromosome: String,
    pub start: u32,
    pub end: u32,
    #[serde(rename = "isSense")]
    pub is_sense: bool,
    #[serde(rename = "isCodingSequence")]
    pub is_coding_sequence: bool,
    pub alleles: BTreeMap<String, VariantGroupDocument>,
    pub proteoforms: BTreeMap<String, ProteoformDocument>,
    #[serde(rename = "aminoacidVariants")]
    pub aminoacid_variants: BTreeMap<String, BTreeMap<String, VariantAnnotationDocument>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SampleDocument {
    pub name: String,
    /// `"AL!<feature>"` / `"PF!<feature>"` -> assigned id.
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogDocument {
    pub parameters: Parameters,
    pub features: Vec<FeatureDocument>,
    pub samples: Vec<SampleDocument>,
    pub software: String,
    pub date: String,
    #[serde(rename = "nucleotideVariants")]
    pub nucleotide_variants: BTreeMap<String, BTreeMap<u32, BTreeMap<String, VariantAnnotationDocument>>>,
    #[serde(rename = "excludedPositions")]
    pub excluded_positions: BTreeMap<String, Vec<u32>>,
}
