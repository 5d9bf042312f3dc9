//! C5 — per-sample feature reconstructor. Turns a sample's accepted
//! variant calls on one feature into a nucleotide sequence and, for coding
//! features, the amino-acid variants induced by translating and aligning
//! that sequence against the feature's translated reference.

use std::collections::HashMap;

use crate::aggregate::{AaPosition, AminoAcidVariantObservation, NucleotideVariantObservation};
use crate::errors::Result;
use crate::reference::Feature;
use crate::sequence::{align, translate, GapMode, ScoringMatrix};
use crate::variants::VariantRecord;

/// 20 standard amino acids plus the wildcard (`X`) and termination (`*`)
/// symbols the protein alignment must be able to score, per spec.md §4.1.
pub const PROTEIN_ALPHABET: &[u8] = b"ACDEFGHIKLMNPQRSTVWYX*";

fn protein_scoring_matrix() -> ScoringMatrix {
    ScoringMatrix::uniform(PROTEIN_ALPHABET, 1, -1)
}

/// The outcome of reconstructing one (sample, feature) pair.
pub struct ReconstructedFeature {
    /// Forward-strand nucleotide sequence, gap characters retained so
    /// downstream callers can see exactly what was deleted.
    pub nucleotide_sequence: Vec<u8>,
    pub nucleotide_variants: Vec<NucleotideVariantObservation>,
    /// `Some` only for coding features.
    pub protein: Option<ProteinReconstruction>,
}

pub struct ProteinReconstruction {
    pub translated_sequence: String,
    pub aminoacid_variants: Vec<AminoAcidVariantObservation>,
    pub first_novel_termination: Option<AaPosition>,
}

/// Applies `variants` (already filtered, restricted to `[feature.start,
/// feature.end]` on `feature.contig`) to `reference_sequence` (the forward
/// strand reference subsequence for `feature`), then — for coding features
/// — translates and aligns the result against `translated_reference`.
pub fn reconstruct_feature(
    feature: &Feature,
    reference_sequence: &[u8],
    variants: &[VariantRecord],
    translated_reference: Option<&str>,
) -> Result<ReconstructedFeature> {
    let (nucleotide_sequence, nucleotide_variants) =
        apply_variants(feature.start, reference_sequence, variants);

    let protein = if feature.is_coding {
        let translated_reference = translated_reference.ok_or_else(|| {
            crate::errors::CatalogError::Internal(
                "coding feature missing precomputed translated reference".to_string(),
            )
        })?;
        Some(translate_and_align(
            &nucleotide_sequence,
            feature.is_sense,
            translated_reference,
        )?)
    } else {
        None
    };

    Ok(ReconstructedFeature {
        nucleotide_sequence,
        nucleotide_variants,
        protein,
    })
}

fn apply_variants(
    feature_start: u32,
    reference_sequence: &[u8],
    variants: &[VariantRecord],
) -> (Vec<u8>, Vec<NucleotideVariantObservation>) {
    let by_position: HashMap<u32, &VariantRecord> =
        variants.iter().map(|v| (v.position, v)).collect();

    let mut out = Vec::with_capacity(reference_sequence.len());
    let mut observations = Vec::new();

    let mut pos = feature_start;
    let end = feature_start + reference_sequence.len() as u32;
    while pos < end {
        if let Some(variant) = by_position.get(&pos) {
            let ref_len = variant.reference_content.len() as u32;
            let alt = variant.alternate_content.clone();

            if alt.len() as u32 >= ref_len {
                // substitution (alt.len == ref_len) or insertion (alt.len >
                // ref_len): the anchor + any inserted bases are emitted
                // verbatim, per the "anchor content preserved" convention.
                out.extend_from_slice(alt.as_bytes());
            } else {
                // deletion: pad/truncate to the reference span with gap
                // characters so position bookkeeping in the reconstructed
                // sequence stays aligned.
                let mut padded = alt.clone();
                while (padded.len() as u32) < ref_len {
                    padded.push('-');
                }
                out.extend_from_slice(padded.as_bytes());
            }

            observations.push(NucleotideVariantObservation {
                position: pos,
                alt,
                reference_content: variant.reference_content.clone(),
                is_primary: variant.is_primary,
            });
            pos += ref_len.max(1);
        } else {
            out.push(reference_sequence[(pos - feature_start) as usize]);
            pos += 1;
        }
    }

    observations.sort_by_key(|o| o.position);
    (out, observations)
}

fn translate_and_align(
    nucleotide_sequence: &[u8],
    is_sense: bool,
    translated_reference: &str,
) -> Result<ProteinReconstruction> {
    let ungapped: Vec<u8> = nucleotide_sequence
        .iter()
        .copied()
        .filter(|&b| b != b'-')
        .collect();
    let translated_sequence = translate(&ungapped, true, true, is_sense)?;

    let matrix = protein_scoring_matrix();
    let (_score, gapped_query, gapped_ref) = align(
        translated_sequence.as_bytes(),
        translated_reference.as_bytes(),
        &matrix,
        4,
        3,
        GapMode::Forbid,
        GapMode::Penalize,
    )?;

    let mut aminoacid_variants = Vec::new();
    let mut first_novel_termination = None;
    let mut ref_pos: u32 = 0;
    let mut consecutive_insertions: u32 = 0;

    for (&q, &r) in gapped_query.iter().zip(gapped_ref.iter()) {
        if r != b'-' {
            ref_pos += 1;
        }

        if q == r {
            consecutive_insertions = 0;
            continue;
        }

        if q == b'-' {
            // deletion: reference has a residue the sample lacks.
            aminoacid_variants.push(AminoAcidVariantObservation {
                position: AaPosition { p: ref_pos, i: 0 },
                alt: "-".to_string(),
                reference_content: (r as char).to_string(),
            });
            consecutive_insertions = 0;
        } else if r == b'-' {
            // insertion: sample has a residue absent from the reference.
            consecutive_insertions += 1;
            let position = AaPosition {
                p: ref_pos,
                i: consecutive_insertions,
            };
            if q == b'*' && first_novel_termination.is_none() {
                first_novel_termination = Some(position);
            }
            aminoacid_variants.push(AminoAcidVariantObservation {
                position,
                alt: (q as char).to_string(),
                reference_content: "-".to_string(),
            });
        } else {
            // substitution.
            let position = AaPosition { p: ref_pos, i: 0 };
            if q == b'*' && first_novel_termination.is_none() {
                first_novel_termination = Some(position);
            }
            aminoacid_variants.push(AminoAcidVariantObservation {
                position,
                alt: (q as char).to_string(),
                reference_content: (r as char).to_string(),
            });
            consecutive_insertions = 0;
        }
    }

    Ok(ProteinReconstruction {
        translated_sequence,
        aminoacid_variants,
        first_novel_termination,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(pos: u32, reference: &str, alt: &str) -> VariantRecord {
        VariantRecord {
            contig: "chr1".into(),
            position: pos,
            reference_content: reference.into(),
            alternate_content: alt.into(),
            depth: 50,
            allele_frequency: 1.0,
            quality: 40.0,
            is_primary: true,
        }
    }

    #[test]
    fn no_variants_reconstructs_reference() {
        let (seq, obs) = apply_variants(1, b"ATGAAATAA", &[]);
        assert_eq!(seq, b"ATGAAATAA");
        assert!(obs.is_empty());
    }

    #[test]
    fn substitution_is_applied_in_place() {
        let (seq, obs) = apply_variants(1, b"ATGAAATAA", &[variant(4, "A", "G")]);
        assert_eq!(seq, b"ATGGAATAA");
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].descriptor(), "G!4");
    }

    #[test]
    fn insertion_appends_after_anchor() {
        let (seq, obs) = apply_variants(1, b"ATGAAATAA", &[variant(6, "A", "AT")]);
        assert_eq!(seq, b"ATGAAATTAA");
        assert_eq!(obs[0].descriptor(), "AT!6");
    }

    #[test]
    fn deletion_replaces_with_gap() {
        let (seq, obs) = apply_variants(1, b"ATGAAATAA", &[variant(4, "A", "-")]);
        assert_eq!(seq, b"ATG-AATAA");
        assert_eq!(obs[0].descriptor(), "-!4");
    }

    #[test]
    fn novel_stop_codon_is_flagged() {
        // SNP at 4 (A->T) turns codon 2 (AAA) into TAA -> stop at residue 2.
        let (seq, _) = apply_variants(1, b"ATGAAATAA", &[variant(4, "A", "T")]);
        assert_eq!(seq, b"ATGTAATAA");
        let reconstruction = translate_and_align(&seq, true, "MK*").unwrap();
        assert_eq!(
            reconstruction.first_novel_termination,
            Some(AaPosition { p: 2, i: 0 })
        );
    }
}
