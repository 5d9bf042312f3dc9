//! BUILD configuration document (spec.md §6): the one input document the
//! driver needs to run an end-to-end catalog build. Deserialized with
//! `serde_yaml`, matching the teacher's config layer style of a single
//! flat struct with `#[serde(default)]` only where a genuine default
//! exists.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{CatalogError, Result};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SampleInput {
    pub source_path: String,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeatureInput {
    #[serde(default)]
    pub structure_path: Option<String>,
    pub is_coding_sequence: bool,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
    /// `MATCH_<attr>` entries used to locate this feature in the
    /// annotation file; stored with the `MATCH_` prefix stripped.
    #[serde(default)]
    pub match_attributes: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildConfig {
    pub module: String,
    pub min_coverage: u32,
    pub min_quality: f64,
    pub min_hom_frequency: f64,
    pub min_het_frequency: f64,
    pub max_het_frequency: f64,
    #[serde(default = "default_threads")]
    pub threads: usize,
    #[serde(default)]
    pub genome_analysis: bool,
    #[serde(default)]
    pub excluded_positions: HashMap<String, Vec<u32>>,
    pub reference_sequence_path: String,
    pub reference_annotation_path: String,
    pub output_path: String,
    pub samples: HashMap<String, SampleInput>,
    pub features: HashMap<String, FeatureInput>,
}

fn default_threads() -> usize {
    1
}

impl BuildConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: BuildConfig = serde_yaml::from_str(text)
            .map_err(|e| CatalogError::Configuration(format!("invalid BUILD document: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.module != "BUILD" {
            return Err(CatalogError::Configuration(format!(
                "expected module=BUILD, got {}",
                self.module
            )));
        }
        if !(0.0..=1.0).contains(&self.min_hom_frequency)
            || !(0.0..=1.0).contains(&self.min_het_frequency)
            || !(0.0..=1.0).contains(&self.max_het_frequency)
        {
            return Err(CatalogError::Configuration(
                "frequency thresholds must lie in [0,1]".to_string(),
            ));
        }
        if self.threads == 0 {
            return Err(CatalogError::Configuration(
                "threads must be at least 1".to_string(),
            ));
        }
        if self.samples.is_empty() {
            return Err(CatalogError::Configuration(
                "at least one sample is required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn filter_config(&self) -> crate::filter::FilterConfig {
        let excluded_positions = self
            .excluded_positions
            .iter()
            .map(|(k, v)| (k.clone(), v.iter().copied().collect()))
            .collect();
        crate::filter::FilterConfig {
            min_coverage: self.min_coverage,
            min_quality: self.min_quality,
            min_hom_frequency: self.min_hom_frequency,
            min_het_frequency: self.min_het_frequency,
            max_het_frequency: self.max_het_frequency,
            excluded_positions,
        }
    }
}
