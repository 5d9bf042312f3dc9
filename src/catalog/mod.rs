//! C9 — catalog assembler. Turns the per-feature aggregation state into the
//! published, serde-serializable document (spec.md §6).

pub mod schema;

use std::collections::{BTreeMap, HashSet};

use crate::aggregate::FeatureAggregator;
use crate::reference::Feature;
use crate::sample::Sample;
use crate::stats;
use schema::{
    CatalogDocument, FeatureDocument, Parameters, ProteoformDocument, SampleDocument,
    VariantAnnotationDocument, VariantGroupDocument,
};

fn two_decimals(value: f64) -> String {
    format!("{value:.2}")
}

/// Everything `assemble_feature` needs for one feature; gathered up front
/// so the assembler itself stays a pure function of its inputs.
pub struct FeatureAssemblyInput<'a> {
    pub feature: &'a Feature,
    pub aggregator: &'a FeatureAggregator,
    pub reference_sequence: &'a [u8],
    pub translated_reference: Option<&'a str>,
    pub protein_sequences: BTreeMap<String, String>,
    pub structure_text: Option<String>,
}

pub fn assemble_feature(input: FeatureAssemblyInput<'_>, total_samples: usize) -> FeatureDocument {
    let feature = input.feature;
    let feature_len = feature.len() as u32;
    let protein_len = input
        .translated_reference
        .map(|p| p.trim_end_matches('*').len() as u32)
        .unwrap_or(0);

    let mut alleles = BTreeMap::new();
    for entry in input.aggregator.alleles.sorted_entries() {
        let counts = stats::count_nucleotide_variant_types(&entry.payload);
        let positions: HashSet<u32> = entry.payload.iter().map(|o| o.position).collect();
        alleles.insert(
            entry.id.clone(),
            VariantGroupDocument {
                variants: entry.descriptor.clone(),
                samples: sorted_samples(&entry.samples()),
                substitutions: counts.substitutions,
                insertions: counts.insertions,
                deletions: counts.deletions,
                frequency: two_decimals(stats::frequency(entry.sample_count(), total_samples)),
                percent_variable_positions: two_decimals(stats::percent_variable_positions(
                    &positions,
                    feature_len,
                )),
            },
        );
    }

    let mut proteoforms = BTreeMap::new();
    for entry in input.aggregator.proteoforms.sorted_entries() {
        let counts = stats::count_aminoacid_variant_types(&entry.payload.variants);
        let truncation_bound = entry
            .payload
            .first_novel_termination
            .map(|p| p.p)
            .unwrap_or(protein_len);
        let positions: HashSet<u32> = entry
            .payload
            .variants
            .iter()
            .map(|o| o.position.p)
            .collect();
        let common = VariantGroupDocument {
            variants: entry.descriptor.clone(),
            samples: sorted_samples(&entry.samples()),
            substitutions: counts.substitutions,
            insertions: counts.insertions,
            deletions: counts.deletions,
            frequency: two_decimals(stats::frequency(entry.sample_count(), total_samples)),
            percent_variable_positions: two_decimals(stats::percent_variable_positions(
                &positions,
                truncation_bound,
            )),
        };
        let first_novel_termination = entry
            .payload
            .first_novel_termination
            .map(|p| p.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let truncation_percentage = stats::truncation_percentage(
            entry.payload.first_novel_termination,
            protein_len,
        )
        .map(two_decimals);

        proteoforms.insert(
            entry.id.clone(),
            ProteoformDocument {
                common,
                first_novel_termination,
                truncation_percentage,
            },
        );
    }

    let aminoacid_variants = input
        .aggregator
        .aminoacid_variants
        .positions()
        .into_iter()
        .map(|pos| {
            let site_docs = input
                .aggregator
                .aminoacid_variants
                .with_site(&pos, |site| {
                    site.alternates_sorted()
                        .into_iter()
                        .map(|(alt, annotation)| {
                            (
                                alt,
                                VariantAnnotationDocument {
                                    reference: site.reference_content.clone(),
                                    frequency: two_decimals(stats::frequency(
                                        annotation.occurrence.len(),
                                        total_samples,
                                    )),
                                    is_primary: annotation.is_primary,
                                    occurrence: sorted_samples(&annotation.occurrence),
                                },
                            )
                        })
                        .collect::<BTreeMap<_, _>>()
                })
                .unwrap_or_default();
            (pos.to_string(), site_docs)
        })
        .collect();

    FeatureDocument {
        name: feature.name.clone(),
        nucleotide_sequence: String::from_utf8_lossy(input.reference_sequence).into_owned(),
        translated_nucleotide_sequence: input.translated_reference.map(|s| s.to_string()),
        protein_sequences: input.protein_sequences,
        structure: input.structure_text,
        chromosome: feature.contig.clone(),
        start: feature.start,
        end: feature.end,
        is_sense: feature.is_sense,
        is_coding_sequence: feature.is_coding,
        alleles,
        proteoforms,
        aminoacid_variants,
    }
}

fn sorted_samples(samples: &HashSet<String>) -> Vec<String> {
    let mut out: Vec<String> = samples.iter().cloned().collect();
    out.sort();
    out
}

/// Assembles the top-level document from already-built feature documents,
/// the nucleotide-variant site tables keyed by feature, and the sample
/// assignment map.
pub fn assemble_catalog(
    parameters: Parameters,
    features: Vec<FeatureDocument>,
    feature_nucleotide_sites: &[(String, &crate::aggregate::VariantSiteTable<u32>)],
    total_samples_by_feature: usize,
    samples: &[&Sample],
    software: impl Into<String>,
    date: impl Into<String>,
    excluded_positions: BTreeMap<String, Vec<u32>>,
) -> CatalogDocument {
    let mut nucleotide_variants = BTreeMap::new();
    for (feature_name, table) in feature_nucleotide_sites {
        let mut per_position = BTreeMap::new();
        for pos in table.positions() {
            let site_docs = table
                .with_site(&pos, |site| {
                    site.alternates_sorted()
                        .into_iter()
                        .map(|(alt, annotation)| {
                            (
                                alt,
                                VariantAnnotationDocument {
                                    reference: site.reference_content.clone(),
                                    frequency: two_decimals(stats::frequency(
                                        annotation.occurrence.len(),
                                        total_samples_by_feature,
                                    )),
                                    is_primary: annotation.is_primary,
                                    occurrence: sorted_samples(&annotation.occurrence),
                                },
                            )
                        })
                        .collect::<BTreeMap<_, _>>()
                })
                .unwrap_or_default();
            per_position.insert(pos, site_docs);
        }
        nucleotide_variants.insert(feature_name.clone(), per_position);
    }

    let sample_documents = samples
        .iter()
        .map(|sample| {
            let mut annotations = BTreeMap::new();
            for (feature, assignment) in sample.assignments_snapshot() {
                if let Some(allele_id) = assignment.allele_id {
                    annotations.insert(format!("AL!{feature}"), allele_id);
                }
                if let Some(proteoform_id) = assignment.proteoform_id {
                    annotations.insert(format!("PF!{feature}"), proteoform_id);
                }
            }
            SampleDocument {
                name: sample.name.clone(),
                annotations,
            }
        })
        .collect();

    CatalogDocument {
        parameters,
        features,
        samples: sample_documents,
        software: software.into(),
        date: date.into(),
        nucleotide_variants,
        excluded_positions,
    }
}
