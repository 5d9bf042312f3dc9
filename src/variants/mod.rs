//! C3 — variant-call reader. The on-disk format is a collaborator out of
//! scope for this crate; what matters here is the typed record it produces
//! and the `is_primary` contract the spec hands us as already computed.

use crate::errors::Result;

/// One genotype/coverage/quality observation for a sample at a contig
/// position.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantRecord {
    pub contig: String,
    /// 1-based position on the contig.
    pub position: u32,
    pub reference_content: String,
    pub alternate_content: String,
    pub depth: u32,
    pub allele_frequency: f64,
    pub quality: f64,
    /// True iff this alternate has the highest frequency among all
    /// alternates reported at this (contig, position) within the sample.
    pub is_primary: bool,
}

/// An opaque per-sample stream of variant-call records. The real
/// implementation reads a VCF or similar; for the core, any iterator
/// suffices, so tests back it with an in-memory `Vec`.
pub trait VariantRecordSource {
    fn next_record(&mut self) -> Result<Option<VariantRecord>>;

    fn collect_all(&mut self) -> Result<Vec<VariantRecord>> {
        let mut out = Vec::new();
        while let Some(rec) = self.next_record()? {
            out.push(rec);
        }
        Ok(out)
    }
}

/// Simplest possible source, backing tests and any caller that has already
/// materialized records in memory.
pub struct InMemoryVariantSource {
    records: std::vec::IntoIter<VariantRecord>,
}

impl InMemoryVariantSource {
    pub fn new(records: Vec<VariantRecord>) -> Self {
        InMemoryVariantSource {
            records: records.into_iter(),
        }
    }
}

impl VariantRecordSource for InMemoryVariantSource {
    fn next_record(&mut self) -> Result<Option<VariantRecord>> {
        Ok(self.records.next())
    }
}
