//! C8 — per-allele/proteoform statistics: variant-type counts, sample
//! frequency, and the percentage of a feature's length that is variable.

use std::collections::HashSet;

use crate::aggregate::{AaPosition, AminoAcidVariantObservation, NucleotideVariantObservation};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VariantTypeCounts {
    pub substitutions: u32,
    pub insertions: u32,
    pub deletions: u32,
}

/// Classifies each nucleotide observation by comparing the length of its
/// reference content against its alternate content — the same rule
/// `reconstruct::apply_variants` uses to splice the sequence, so the counts
/// agree with what was actually reconstructed.
pub fn count_nucleotide_variant_types(
    observations: &[NucleotideVariantObservation],
) -> VariantTypeCounts {
    let mut counts = VariantTypeCounts::default();
    for obs in observations {
        let ref_len = obs.reference_content.len();
        let alt_len = obs.alt.len();
        if alt_len == ref_len {
            counts.substitutions += 1;
        } else if alt_len > ref_len {
            counts.insertions += 1;
        } else {
            counts.deletions += 1;
        }
    }
    counts
}

/// Classifies amino-acid observations. Substitutions and deletions are
/// atomic (`i == 0`). Insertions are recorded one residue at a time
/// (`i = 1, 2, 3, ...`); a maximal consecutive run of `i` values at the
/// same reference position `p` is one insertion event, not one per
/// residue.
pub fn count_aminoacid_variant_types(
    observations: &[AminoAcidVariantObservation],
) -> VariantTypeCounts {
    let mut counts = VariantTypeCounts::default();
    let mut insertion_positions_by_p: std::collections::BTreeMap<u32, Vec<u32>> =
        std::collections::BTreeMap::new();

    for obs in observations {
        if obs.alt == "-" {
            counts.deletions += 1;
        } else if obs.reference_content == "-" {
            insertion_positions_by_p
                .entry(obs.position.p)
                .or_default()
                .push(obs.position.i);
        } else {
            counts.substitutions += 1;
        }
    }

    for (_, mut indices) in insertion_positions_by_p {
        indices.sort_unstable();
        let mut prev: Option<u32> = None;
        for i in indices {
            match prev {
                Some(p) if i == p + 1 => {}
                _ => counts.insertions += 1,
            }
            prev = Some(i);
        }
    }

    counts
}

/// Fraction of samples carrying a given allele/proteoform, rounded to two
/// decimal places as the published catalog expects.
pub fn frequency(carrying_samples: usize, total_samples: usize) -> f64 {
    if total_samples == 0 {
        return 0.0;
    }
    let raw = carrying_samples as f64 / total_samples as f64;
    (raw * 100.0).round() / 100.0
}

/// Percentage of a feature's length spanned by variable positions. Uses
/// genuine floating-point division — unlike the integer division the
/// source implementation used, which silently truncated this figure to
/// whole percentages.
pub fn percent_variable_positions(variant_positions: &HashSet<u32>, feature_length: u32) -> f64 {
    if feature_length == 0 {
        return 0.0;
    }
    let in_range = variant_positions
        .iter()
        .filter(|&&p| p >= 1 && p <= feature_length)
        .count();
    100.0 * in_range as f64 / feature_length as f64
}

/// Percentage truncation of a proteoform whose first novel termination
/// falls at reference residue `P`, given the reference protein's length
/// `protein_length` (stop codon excluded).
pub fn truncation_percentage(first_novel_termination: Option<AaPosition>, protein_length: u32) -> Option<f64> {
    if protein_length == 0 {
        return None;
    }
    first_novel_termination.map(|pos| 100.0 * (1.0 - pos.p as f64 / protein_length as f64))
}
