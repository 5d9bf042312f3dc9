//! C7 — structure reconciliation. Maps each chain of an externally supplied
//! structure onto a feature's translated reference sequence by alignment,
//! so residue numbers in the structure can be related back to the catalog's
//! amino-acid positions.

use crate::errors::{CatalogError, Result};
use crate::reconstruct::PROTEIN_ALPHABET;
use crate::sequence::{align, GapMode, ScoringMatrix};

fn structure_scoring_matrix() -> ScoringMatrix {
    ScoringMatrix::uniform(PROTEIN_ALPHABET, 2, -1)
}

/// One chain's residues, aligned against the translated reference and
/// renumbered.
pub struct ReconciledChain {
    pub chain_name: String,
    /// Uppercase where the chain supplied a residue, lowercase where it was
    /// padded in from the reference because the chain had a gap there.
    pub padded_sequence: String,
    /// 1-based residue numbers assigned to the uppercase (chain-supplied)
    /// positions only; `None` at padded (lowercase) positions.
    pub residue_numbers: Vec<Option<u32>>,
    /// Lengths of maximal divergent (lowercase) runs longer than one
    /// residue — gaps in structural coverage worth flagging.
    pub divergent_segments: Vec<usize>,
}

/// Reconciles every chain of `chains` (name, sequence) against
/// `translated_reference`.
pub fn reconcile_structure(
    translated_reference: &str,
    chains: &[(String, Vec<u8>)],
) -> Result<Vec<ReconciledChain>> {
    chains
        .iter()
        .map(|(name, seq)| reconcile_chain(name, seq, translated_reference))
        .collect()
}

fn reconcile_chain(
    chain_name: &str,
    chain_sequence: &[u8],
    translated_reference: &str,
) -> Result<ReconciledChain> {
    let matrix = structure_scoring_matrix();
    let (_score, gapped_chain, gapped_ref) = align(
        chain_sequence,
        translated_reference.as_bytes(),
        &matrix,
        5,
        4,
        GapMode::Free,
        GapMode::Free,
    )?;

    let mut padded_sequence = String::with_capacity(gapped_chain.len());
    let mut residue_numbers = Vec::with_capacity(gapped_chain.len());
    let mut next_number = 1u32;

    for (&chain_residue, &ref_residue) in gapped_chain.iter().zip(gapped_ref.iter()) {
        if chain_residue != b'-' {
            padded_sequence.push(chain_residue.to_ascii_uppercase() as char);
            residue_numbers.push(Some(next_number));
            next_number += 1;
        } else if ref_residue != b'-' {
            padded_sequence.push(ref_residue.to_ascii_lowercase() as char);
            residue_numbers.push(None);
        } else {
            return Err(CatalogError::Bio(format!(
                "chain {chain_name} and reference both gapped at the same column, which should not happen in a pairwise alignment"
            )));
        }
    }

    let divergent_segments = divergent_run_lengths(&padded_sequence);
    if divergent_segments.iter().filter(|&&len| len > 1).count() > 2 {
        log::warn!(
            "chain {chain_name} has more than two divergent segments against the reference structure"
        );
    }

    Ok(ReconciledChain {
        chain_name: chain_name.to_string(),
        padded_sequence,
        residue_numbers,
        divergent_segments,
    })
}

/// Lengths of maximal runs of lowercase characters in `padded` — the
/// stretches where the chain had no residue of its own.
fn divergent_run_lengths(padded: &str) -> Vec<usize> {
    let mut runs = Vec::new();
    let mut current = 0usize;
    for c in padded.chars() {
        if c.is_lowercase() {
            current += 1;
        } else if current > 0 {
            runs.push(current);
            current = 0;
        }
    }
    if current > 0 {
        runs.push(current);
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_chain_gets_sequential_numbering() {
        let result = reconcile_chain("A", b"MKVL", "MKVL").unwrap();
        assert_eq!(result.padded_sequence, "MKVL");
        assert_eq!(
            result.residue_numbers,
            vec![Some(1), Some(2), Some(3), Some(4)]
        );
        assert!(result.divergent_segments.is_empty());
    }

    #[test]
    fn missing_chain_residues_are_padded_from_reference() {
        let result = reconcile_chain("A", b"MKL", "MKVL").unwrap();
        assert!(result.padded_sequence.to_uppercase() == "MKVL");
        assert!(result.padded_sequence.contains('v'));
        assert_eq!(result.divergent_segments, vec![1]);
    }

    #[test]
    fn flags_long_divergent_segments() {
        let result = reconcile_chain("A", b"MK", "MKVVVVL").unwrap();
        assert!(result.divergent_segments.iter().any(|&len| len > 1));
    }
}
