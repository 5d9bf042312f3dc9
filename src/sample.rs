//! Sample records. Immutable apart from the per-feature allele/proteoform
//! assignment map, which workers fill in as they finish (sample, feature)
//! jobs — hence the `parking_lot::Mutex`, matching the teacher's habit of
//! wrapping exactly the field that many threads touch rather than the
//! whole struct.

use std::collections::HashMap;

use parking_lot::Mutex;

/// Reserved sample name denoting the reference itself.
pub const REFERENCE_SAMPLE: &str = "REFERENCE";

#[derive(Debug, Clone, Default)]
pub struct FeatureAssignment {
    pub allele_id: Option<String>,
    pub proteoform_id: Option<String>,
}

#[derive(Debug)]
pub struct Sample {
    pub name: String,
    /// Opaque handle to wherever this sample's variant calls come from —
    /// a path, accession, or similar; the core never interprets it.
    pub source: String,
    assignments: Mutex<HashMap<String, FeatureAssignment>>,
}

impl Sample {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Sample {
            name: name.into(),
            source: source.into(),
            assignments: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_reference(&self) -> bool {
        self.name == REFERENCE_SAMPLE
    }

    pub fn set_allele(&self, feature: &str, allele_id: String) {
        let mut guard = self.assignments.lock();
        guard.entry(feature.to_string()).or_default().allele_id = Some(allele_id);
    }

    pub fn set_proteoform(&self, feature: &str, proteoform_id: String) {
        let mut guard = self.assignments.lock();
        guard.entry(feature.to_string()).or_default().proteoform_id = Some(proteoform_id);
    }

    pub fn assignment(&self, feature: &str) -> Option<FeatureAssignment> {
        self.assignments.lock().get(feature).cloned()
    }

    pub fn assignments_snapshot(&self) -> HashMap<String, FeatureAssignment> {
        self.assignments.lock().clone()
    }
}
