//! C4 — filter: accept/reject decision over per-site genotype/coverage/
//! quality records, using simple configured thresholds. No hidden state;
//! a `Filter` is just its configuration.

use std::collections::{HashMap, HashSet};

use crate::variants::VariantRecord;

#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub min_coverage: u32,
    pub min_quality: f64,
    pub min_hom_frequency: f64,
    pub min_het_frequency: f64,
    pub max_het_frequency: f64,
    /// contig-or-feature-name -> excluded 1-based positions.
    pub excluded_positions: HashMap<String, HashSet<u32>>,
}

#[derive(Debug, Clone)]
pub struct Filter {
    config: FilterConfig,
}

impl Filter {
    pub fn new(config: FilterConfig) -> Self {
        Filter { config }
    }

    /// `feature_name`, if given, is also checked against
    /// `excluded_positions` in addition to the record's contig.
    pub fn accept(&self, record: &VariantRecord, feature_name: Option<&str>) -> bool {
        if record.depth < self.config.min_coverage {
            return false;
        }
        if record.quality < self.config.min_quality {
            return false;
        }
        if self.is_excluded(&record.contig, record.position)
            || feature_name.map_or(false, |f| self.is_excluded(f, record.position))
        {
            return false;
        }

        let homozygous = record.allele_frequency >= self.config.min_hom_frequency;
        let heterozygous = record.allele_frequency >= self.config.min_het_frequency
            && record.allele_frequency <= self.config.max_het_frequency;
        homozygous || heterozygous
    }

    fn is_excluded(&self, key: &str, position: u32) -> bool {
        self.config
            .excluded_positions
            .get(key)
            .map_or(false, |set| set.contains(&position))
    }
}
