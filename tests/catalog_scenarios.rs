extern crate catalog_genome;

use catalog_genome::aggregate::{AaPosition, FeatureAggregator};
use catalog_genome::reconstruct::reconstruct_feature;
use catalog_genome::reference::{Feature, ReferenceStore};
use catalog_genome::sequence::translate;
use catalog_genome::stats;
use catalog_genome::structure::reconcile_structure;
use catalog_genome::variants::VariantRecord;

fn gene_feature() -> Feature {
    Feature::new("g", "chr1", 1, 9, true, true).unwrap()
}

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

fn reference_store() -> ReferenceStore {
    let mut store = ReferenceStore::new();
    store.insert_contig("chr1", b"ATGAAATAA".to_vec());
    store.insert_feature(gene_feature()).unwrap();
    store
}

/// S1 — empty input: a sample with zero variants collapses to the
/// reserved reference ids, and the reference translates to `MK*`.
#[test]
fn s1_empty_input_yields_reference_ids() {
    let store = reference_store();
    let feature = store.feature("g").unwrap();
    let reference_sequence = store.feature_sequence(feature).unwrap();
    let translated_reference = translate(&reference_sequence, true, true, feature.is_sense).unwrap();
    assert_eq!(translated_reference, "MK*");

    let reconstructed =
        reconstruct_feature(feature, &reference_sequence, &[], Some(&translated_reference)).unwrap();

    let aggregator = FeatureAggregator::new();
    let allele_id = aggregator
        .submit_allele("sampleA", reconstructed.nucleotide_variants)
        .unwrap();
    assert_eq!(allele_id, "AL_REFERENCE");

    let protein = reconstructed.protein.unwrap();
    let proteoform_id = aggregator
        .submit_proteoform(
            "sampleA",
            protein.aminoacid_variants,
            protein.first_novel_termination,
        )
        .unwrap();
    assert_eq!(proteoform_id, "PF_REFERENCE");
}

/// S2 — the same SNP from two samples collapses to one allele, and
/// submission order does not change the resulting id.
#[test]
fn s2_single_snp_two_samples_share_one_allele() {
    let store = reference_store();
    let feature = store.feature("g").unwrap();
    let reference_sequence = store.feature_sequence(feature).unwrap();

    let run_pair = |first: &str, second: &str| {
        let aggregator = FeatureAggregator::new();
        for sample in [first, second] {
            let reconstructed = reconstruct_feature(
                feature,
                &reference_sequence,
                &[variant(4, "A", "G")],
                None,
            )
            .unwrap();
            aggregator
                .submit_allele(sample, reconstructed.nucleotide_variants)
                .unwrap();
        }
        aggregator
    };

    let ab = run_pair("a", "b");
    let ba = run_pair("b", "a");

    assert_eq!(ab.alleles.len(), 1);
    let entry = ab.alleles.sorted_entries().into_iter().next().unwrap();
    assert_ne!(entry.id, "AL_REFERENCE");
    assert_eq!(entry.sample_count(), 2);

    let occurrence = ab
        .nucleotide_variants
        .with_site(&4, |site| site.occurrence_of("G"))
        .unwrap();
    assert_eq!(occurrence, std::collections::HashSet::from([entry.id.clone()]));

    let entry_reordered = ba.alleles.sorted_entries().into_iter().next().unwrap();
    assert_eq!(entry.id, entry_reordered.id);
}

/// S3 — an insertion produces a single amino-acid insertion event (not one
/// per residue) at `P+1`.
#[test]
fn s3_insertion_produces_single_aminoacid_event() {
    let store = reference_store();
    let feature = store.feature("g").unwrap();
    let reference_sequence = store.feature_sequence(feature).unwrap();
    let translated_reference = translate(&reference_sequence, true, true, feature.is_sense).unwrap();

    let reconstructed = reconstruct_feature(
        feature,
        &reference_sequence,
        &[variant(6, "A", "AT")],
        Some(&translated_reference),
    )
    .unwrap();
    assert_eq!(reconstructed.nucleotide_variants[0].descriptor(), "AT!6");

    let protein = reconstructed.protein.unwrap();
    let counts = stats::count_aminoacid_variant_types(&protein.aminoacid_variants);
    assert_eq!(counts.insertions, 1);
    assert!(protein
        .aminoacid_variants
        .iter()
        .any(|v| v.position == AaPosition { p: 2, i: 1 }));
}

/// S4 — a SNP that introduces a premature stop at residue 2 of a 3-residue
/// protein truncates 33.33% of it.
#[test]
fn s4_novel_stop_codon_truncation_percentage() {
    let store = reference_store();
    let feature = store.feature("g").unwrap();
    let reference_sequence = store.feature_sequence(feature).unwrap();
    let translated_reference = translate(&reference_sequence, true, true, feature.is_sense).unwrap();

    let reconstructed = reconstruct_feature(
        feature,
        &reference_sequence,
        &[variant(4, "A", "T")],
        Some(&translated_reference),
    )
    .unwrap();
    let protein = reconstructed.protein.unwrap();

    assert_eq!(
        protein.first_novel_termination,
        Some(AaPosition { p: 2, i: 0 })
    );
    let protein_length = translated_reference.trim_end_matches('*').len() as u32;
    let pct = stats::truncation_percentage(protein.first_novel_termination, protein_length).unwrap();
    assert!((pct - 33.33333333333333).abs() < 1e-9);
    assert_eq!(format!("{pct:.2}"), "33.33");
}

/// S5 — a chain missing its leading residue is padded with a lowercase
/// reference residue and numbered starting after it.
#[test]
fn s5_structure_reconciliation_pads_missing_leading_residue() {
    let reconciled = reconcile_structure("MAAAAK", &[("A".to_string(), b"AAAAK".to_vec())]).unwrap();
    let chain = &reconciled[0];
    assert_eq!(chain.padded_sequence.to_uppercase(), "MAAAAK");
    assert!(chain.padded_sequence.starts_with('m'));
    assert_eq!(
        chain.residue_numbers,
        vec![None, Some(1), Some(2), Some(3), Some(4), Some(5)]
    );
}

/// S6 — two threads submitting the same descriptor set in opposite orders
/// collapse to one allele record with both sample ids present.
#[test]
fn s6_concurrent_submission_is_order_invariant() {
    use std::sync::Arc;
    use std::thread;

    let aggregator = Arc::new(FeatureAggregator::new());
    let store = reference_store();
    let feature = store.feature("g").unwrap().clone();
    let reference_sequence = store.feature_sequence(&feature).unwrap();

    let variants_forward = vec![variant(4, "A", "G"), variant(7, "T", "C")];
    let variants_reversed = vec![variant(7, "T", "C"), variant(4, "A", "G")];

    let handles: Vec<_> = [("sample1", variants_forward), ("sample2", variants_reversed)]
        .into_iter()
        .map(|(name, vars)| {
            let aggregator = aggregator.clone();
            let feature = feature.clone();
            let reference_sequence = reference_sequence.clone();
            thread::spawn(move || {
                let reconstructed =
                    reconstruct_feature(&feature, &reference_sequence, &vars, None).unwrap();
                aggregator
                    .submit_allele(name, reconstructed.nucleotide_variants)
                    .unwrap()
            })
        })
        .collect();

    let ids: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(ids[0], ids[1]);
    assert_eq!(aggregator.alleles.len(), 1);
    let entry = aggregator.alleles.get(&ids[0]).unwrap();
    assert_eq!(entry.sample_count(), 2);
    assert_eq!(aggregator.nucleotide_variants.len(), 2);
}
