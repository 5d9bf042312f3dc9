//! Driver: wires C1–C9 together into one end-to-end catalog build. Mirrors
//! the teacher's top-level `processing::lorikeet_engine` in shape — a
//! struct holding the run's inputs, one `run` method — but scopes its own
//! rayon pool (`ThreadPoolBuilder::build`) rather than a process-global one
//! (`build_global`), so a build can run more than once per process, which
//! matters for tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crossbeam::channel;

use crate::aggregate::FeatureAggregator;
use crate::catalog::schema::{CatalogDocument, Parameters};
use crate::catalog::{self, FeatureAssemblyInput};
use crate::config::BuildConfig;
use crate::errors::{CatalogError, Result};
use crate::filter::Filter;
use crate::reconstruct::reconstruct_feature;
use crate::reference::ReferenceStore;
use crate::sample::{Sample, REFERENCE_SAMPLE};
use crate::sequence::translate;
use crate::structure::reconcile_structure;
use crate::variants::VariantRecord;

/// Per-sample, per-feature variant records already produced by the C3
/// reader collaborator, restricted to one sample's full record set.
pub type SampleRecords = HashMap<String, Vec<VariantRecord>>;

pub struct Engine<'a> {
    pub reference: &'a ReferenceStore,
    pub config: &'a BuildConfig,
}

impl<'a> Engine<'a> {
    pub fn new(reference: &'a ReferenceStore, config: &'a BuildConfig) -> Self {
        Engine { reference, config }
    }

    /// `records_by_sample` maps sample name -> that sample's full variant
    /// record stream (already materialized by the C3 reader). `now` is the
    /// date string for the catalog's `date` field, injected by the caller
    /// so the engine itself stays deterministic.
    pub fn run(&self, records_by_sample: SampleRecords, now: &str) -> Result<CatalogDocument> {
        let filter = Arc::new(Filter::new(self.config.filter_config()));

        let samples: Vec<Arc<Sample>> = self
            .config
            .samples
            .iter()
            .map(|(name, input)| Arc::new(Sample::new(name.clone(), input.source_path.clone())))
            .chain(std::iter::once(Arc::new(Sample::new(
                REFERENCE_SAMPLE,
                "",
            ))))
            .collect();

        let features: Vec<_> = self.reference.features().collect();
        let translated_references: HashMap<String, String> = features
            .iter()
            .filter(|f| f.is_coding)
            .map(|f| -> Result<(String, String)> {
                let seq = self.reference.feature_sequence(f)?;
                Ok((f.name.clone(), translate(&seq, true, true, f.is_sense)?))
            })
            .collect::<Result<_>>()?;

        let aggregators: HashMap<String, FeatureAggregator> = features
            .iter()
            .map(|f| (f.name.clone(), FeatureAggregator::new()))
            .collect();

        // Reference itself is submitted as a sample so the catalog reports
        // AL_REFERENCE/PF_REFERENCE occurrences the same way a real
        // variant-free sample would.
        let mut jobs: Vec<(Arc<Sample>, String)> = Vec::new();
        for sample in &samples {
            for feature in &features {
                jobs.push((sample.clone(), feature.name.clone()));
            }
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()
            .map_err(|e| CatalogError::Internal(format!("failed to build thread pool: {e}")))?;

        let (error_tx, error_rx) = channel::unbounded::<CatalogError>();

        pool.install(|| {
            use rayon::prelude::*;
            jobs.par_iter().for_each(|(sample, feature_name)| {
                let feature = self.reference.feature(feature_name).expect("feature exists");
                let outcome = self.run_job(
                    sample,
                    feature,
                    records_by_sample.get(&sample.name),
                    &filter,
                    &translated_references,
                    &aggregators[feature_name],
                );
                if let Err(e) = outcome {
                    let _ = error_tx.send(e);
                }
            });
        });
        drop(error_tx);
        if let Ok(err) = error_rx.try_recv() {
            return Err(err);
        }

        self.assemble(&features, &aggregators, &translated_references, &samples, now)
    }

    fn run_job(
        &self,
        sample: &Sample,
        feature: &crate::reference::Feature,
        sample_records: Option<&Vec<VariantRecord>>,
        filter: &Filter,
        translated_references: &HashMap<String, String>,
        aggregator: &FeatureAggregator,
    ) -> Result<()> {
        let accepted: Vec<VariantRecord> = if sample.is_reference() {
            Vec::new()
        } else {
            sample_records
                .into_iter()
                .flat_map(|records| records.iter())
                .filter(|r| {
                    r.contig == feature.contig
                        && r.position >= feature.start
                        && r.position <= feature.end
                        && filter.accept(r, Some(&feature.name))
                })
                .cloned()
                .collect()
        };

        let reference_sequence = self.reference.feature_sequence(feature)?;
        let reconstructed = reconstruct_feature(
            feature,
            &reference_sequence,
            &accepted,
            translated_references.get(&feature.name).map(|s| s.as_str()),
        )?;

        let allele_id = aggregator.submit_allele(&sample.name, reconstructed.nucleotide_variants)?;
        sample.set_allele(&feature.name, allele_id);

        if let Some(protein) = reconstructed.protein {
            let proteoform_id = aggregator.submit_proteoform(
                &sample.name,
                protein.aminoacid_variants,
                protein.first_novel_termination,
            )?;
            sample.set_proteoform(&feature.name, proteoform_id);
        }

        Ok(())
    }

    fn assemble(
        &self,
        features: &[&crate::reference::Feature],
        aggregators: &HashMap<String, FeatureAggregator>,
        translated_references: &HashMap<String, String>,
        samples: &[Arc<Sample>],
        now: &str,
    ) -> Result<CatalogDocument> {
        let total_samples = samples.len();

        let mut feature_documents = Vec::with_capacity(features.len());
        let mut nucleotide_sites = Vec::with_capacity(features.len());
        for feature in features {
            let aggregator = &aggregators[&feature.name];
            let reference_sequence = self.reference.feature_sequence(feature)?;
            let protein_sequences = self.reconcile_feature_structure(
                feature,
                translated_references.get(&feature.name),
            )?;

            let input = FeatureAssemblyInput {
                feature,
                aggregator,
                reference_sequence: &reference_sequence,
                translated_reference: translated_references.get(&feature.name).map(|s| s.as_str()),
                protein_sequences,
                structure_text: None,
            };
            feature_documents.push(catalog::assemble_feature(input, total_samples));
            nucleotide_sites.push((feature.name.clone(), &aggregator.nucleotide_variants));
        }

        let parameters = Parameters {
            min_coverage: self.config.min_coverage,
            min_quality: self.config.min_quality,
            min_hom_frequency: self.config.min_hom_frequency,
            min_het_frequency: self.config.min_het_frequency,
            max_het_frequency: self.config.max_het_frequency,
            threads: self.config.threads,
        };

        let sample_refs: Vec<&Sample> = samples.iter().map(|s| s.as_ref()).collect();
        let excluded_positions: BTreeMap<String, Vec<u32>> = self
            .config
            .excluded_positions
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(catalog::assemble_catalog(
            parameters,
            feature_documents,
            &nucleotide_sites,
            total_samples,
            &sample_refs,
            "catalog-genome",
            now,
            excluded_positions,
        ))
    }

    fn reconcile_feature_structure(
        &self,
        feature: &crate::reference::Feature,
        translated_reference: Option<&String>,
    ) -> Result<BTreeMap<String, String>> {
        let (Some(structure), Some(translated_reference)) =
            (feature.structure.as_ref(), translated_reference)
        else {
            return Ok(BTreeMap::new());
        };

        let chains: Vec<(String, Vec<u8>)> = structure
            .chains
            .iter()
            .map(|(name, seq)| (name.clone(), seq.clone()))
            .collect();
        let reconciled = reconcile_structure(translated_reference, &chains)?;
        Ok(reconciled
            .into_iter()
            .map(|chain| (chain.chain_name, chain.padded_sequence))
            .collect())
    }
}
