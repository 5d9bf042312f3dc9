//! C6 — aggregation core. Owns, per feature, the allele/proteoform
//! interners and the nucleotide-/amino-acid-variant-site tables, and
//! implements the two submission operations the driver calls from worker
//! threads.

pub mod fingerprint;
pub mod interner;
pub mod sites;

use std::sync::Arc;

use crate::errors::Result;

pub use interner::{Entry, Interner};
pub use sites::{AaPosition, VariantSite, VariantSiteTable};

pub type AlleleId = String;
pub type ProteoformId = String;

/// One nucleotide variant contributed by a reconstructed sample sequence.
#[derive(Debug, Clone)]
pub struct NucleotideVariantObservation {
    pub position: u32,
    pub alt: String,
    pub reference_content: String,
    pub is_primary: bool,
}

impl NucleotideVariantObservation {
    pub fn descriptor(&self) -> String {
        format!("{}!{}", self.alt, self.position)
    }
}

/// One amino-acid variant contributed by a translated, aligned sample
/// sequence.
#[derive(Debug, Clone)]
pub struct AminoAcidVariantObservation {
    pub position: AaPosition,
    pub alt: String,
    pub reference_content: String,
}

impl AminoAcidVariantObservation {
    pub fn descriptor(&self) -> String {
        format!("{}!{}", self.alt, self.position)
    }
}

/// Per-feature aggregation state: the four concurrent indices described in
/// spec.md §4.5.
#[derive(Default)]
pub struct FeatureAggregator {
    pub alleles: Interner<Vec<NucleotideVariantObservation>>,
    pub proteoforms: Interner<ProteoformPayload>,
    pub nucleotide_variants: VariantSiteTable<u32>,
    pub aminoacid_variants: VariantSiteTable<AaPosition>,
}

#[derive(Debug, Clone, Default)]
pub struct ProteoformPayload {
    pub variants: Vec<AminoAcidVariantObservation>,
    pub first_novel_termination: Option<AaPosition>,
}

impl FeatureAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalizes `observations`, interns the resulting allele (creating
    /// it and wiring its variant sites exactly once), and records
    /// `sample_id` as carrying it.
    pub fn submit_allele(
        &self,
        sample_id: &str,
        observations: Vec<NucleotideVariantObservation>,
    ) -> Result<AlleleId> {
        let descriptors: Vec<String> = observations.iter().map(|o| o.descriptor()).collect();
        let id = fingerprint::fingerprint_id("AL", &descriptors);

        let (entry, created) = self.alleles.submit(
            &id,
            sample_id,
            || fingerprint::canonical_token(&descriptors),
            move || observations,
        );
        if created {
            self.wire_nucleotide_sites(&entry);
        }
        Ok(id)
    }

    pub fn submit_proteoform(
        &self,
        sample_id: &str,
        variants: Vec<AminoAcidVariantObservation>,
        first_novel_termination: Option<AaPosition>,
    ) -> Result<ProteoformId> {
        let descriptors: Vec<String> = variants.iter().map(|o| o.descriptor()).collect();
        let id = fingerprint::fingerprint_id("PF", &descriptors);

        let payload = ProteoformPayload {
            variants,
            first_novel_termination,
        };
        let (entry, created) = self.proteoforms.submit(
            &id,
            sample_id,
            || fingerprint::canonical_token(&descriptors),
            move || payload,
        );
        if created {
            self.wire_aminoacid_sites(&entry);
        }
        Ok(id)
    }

    fn wire_nucleotide_sites(&self, entry: &Arc<Entry<Vec<NucleotideVariantObservation>>>) {
        for obs in &entry.payload {
            self.nucleotide_variants.upsert(
                obs.position,
                &obs.reference_content,
                &obs.alt,
                obs.is_primary,
                &entry.id,
            );
        }
    }

    fn wire_aminoacid_sites(&self, entry: &Arc<Entry<ProteoformPayload>>) {
        for obs in &entry.payload.variants {
            self.aminoacid_variants.upsert(
                obs.position,
                &obs.reference_content,
                &obs.alt,
                true,
                &entry.id,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(pos: u32, alt: &str) -> NucleotideVariantObservation {
        NucleotideVariantObservation {
            position: pos,
            alt: alt.to_string(),
            reference_content: "A".to_string(),
            is_primary: true,
        }
    }

    #[test]
    fn reference_sample_gets_reserved_id() {
        let agg = FeatureAggregator::new();
        let id = agg.submit_allele("sampleA", vec![]).unwrap();
        assert_eq!(id, "AL_REFERENCE");
    }

    #[test]
    fn same_variant_set_from_two_samples_is_one_allele() {
        let agg = FeatureAggregator::new();
        let id_a = agg.submit_allele("a", vec![obs(4, "G")]).unwrap();
        let id_b = agg.submit_allele("b", vec![obs(4, "G")]).unwrap();
        assert_eq!(id_a, id_b);
        let entry = agg.alleles.get(&id_a).unwrap();
        assert_eq!(entry.sample_count(), 2);
        assert_eq!(agg.nucleotide_variants.len(), 1);
        let occ = agg
            .nucleotide_variants
            .with_site(&4, |s| s.occurrence_of("G"))
            .unwrap();
        assert_eq!(occ, std::collections::HashSet::from([id_a]));
    }

    #[test]
    fn submission_order_does_not_matter() {
        let first = FeatureAggregator::new();
        first.submit_allele("a", vec![obs(4, "G"), obs(7, "T")]).unwrap();
        let id_first = first
            .submit_allele("b", vec![obs(7, "T"), obs(4, "G")])
            .unwrap();

        let second = FeatureAggregator::new();
        second
            .submit_allele("b", vec![obs(7, "T"), obs(4, "G")])
            .unwrap();
        let id_second = second
            .submit_allele("a", vec![obs(4, "G"), obs(7, "T")])
            .unwrap();

        assert_eq!(id_first, id_second);
    }
}
