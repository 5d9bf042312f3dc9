use std::collections::{BTreeMap, HashSet};

use parking_lot::RwLock;

/// An amino-acid-variant site position: `P+I`, the reference residue index
/// and the insertion offset after it (`I=0` for substitutions/deletions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AaPosition {
    pub p: u32,
    pub i: u32,
}

impl std::fmt::Display for AaPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}+{}", self.p, self.i)
    }
}

/// Per-alternate annotation at a variant site: whether it was ever the
/// primary alternate at its originating record, and the set of
/// allele/proteoform ids whose descriptor list references it.
#[derive(Debug, Clone, Default)]
pub struct VariantAnnotation {
    pub is_primary: bool,
    pub occurrence: HashSet<String>,
}

/// One site: the reference content at that position, plus per-alternate
/// annotations. Alternates are kept in a `BTreeMap` purely for
/// deterministic iteration in tests/serialization; the occurrence sets are
/// the data the invariant in spec.md §3 is about.
#[derive(Debug)]
pub struct VariantSite {
    pub reference_content: String,
    alternates: RwLock<BTreeMap<String, VariantAnnotation>>,
}

impl VariantSite {
    pub fn new(reference_content: impl Into<String>) -> Self {
        VariantSite {
            reference_content: reference_content.into(),
            alternates: RwLock::new(BTreeMap::new()),
        }
    }

    /// Registers `id` as carrying `alt` at this site, creating the
    /// alternate's annotation record lazily on first reference.
    pub fn add_occurrence(&self, alt: &str, is_primary: bool, id: &str) {
        let mut guard = self.alternates.write();
        let annotation = guard.entry(alt.to_string()).or_default();
        annotation.is_primary |= is_primary;
        annotation.occurrence.insert(id.to_string());
    }

    /// Removes `id`'s occurrence of `alt`; the invariant is that an
    /// alternate with no remaining occurrence is pruned entirely.
    pub fn remove_occurrence(&self, alt: &str, id: &str) {
        let mut guard = self.alternates.write();
        let mut drop_alt = false;
        if let Some(annotation) = guard.get_mut(alt) {
            annotation.occurrence.remove(id);
            drop_alt = annotation.occurrence.is_empty();
        }
        if drop_alt {
            guard.remove(alt);
        }
    }

    pub fn occurrence_of(&self, alt: &str) -> HashSet<String> {
        self.alternates
            .read()
            .get(alt)
            .map(|a| a.occurrence.clone())
            .unwrap_or_default()
    }

    pub fn alternates_sorted(&self) -> Vec<(String, VariantAnnotation)> {
        self.alternates
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// A feature's nucleotide- or amino-acid-variant-site table. `BTreeMap`
/// guarantees the numerically-ascending iteration order spec.md §5 requires
/// for statistics — no separate sort needed.
pub struct VariantSiteTable<K: Ord> {
    sites: RwLock<BTreeMap<K, VariantSite>>,
}

impl<K: Ord + Clone> Default for VariantSiteTable<K> {
    fn default() -> Self {
        VariantSiteTable {
            sites: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<K: Ord + Clone> VariantSiteTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts the site at `key` (creating it with `reference_content` if
    /// absent) and records `id`'s occurrence of `alt`.
    pub fn upsert(&self, key: K, reference_content: &str, alt: &str, is_primary: bool, id: &str) {
        {
            let guard = self.sites.read();
            if let Some(site) = guard.get(&key) {
                site.add_occurrence(alt, is_primary, id);
                return;
            }
        }
        let mut guard = self.sites.write();
        let site = guard
            .entry(key)
            .or_insert_with(|| VariantSite::new(reference_content));
        site.add_occurrence(alt, is_primary, id);
    }

    pub fn with_site<R>(&self, key: &K, f: impl FnOnce(&VariantSite) -> R) -> Option<R> {
        self.sites.read().get(key).map(f)
    }

    /// Ascending-by-key snapshot of positions currently present.
    pub fn positions(&self) -> Vec<K> {
        self.sites.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sites.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_is_idempotent_per_key() {
        let table: VariantSiteTable<u32> = VariantSiteTable::new();
        table.upsert(4, "A", "G", true, "AL1");
        table.upsert(4, "A", "G", false, "AL2");
        assert_eq!(table.len(), 1);
        let occ = table.with_site(&4, |s| s.occurrence_of("G")).unwrap();
        assert_eq!(occ.len(), 2);
    }

    #[test]
    fn removing_last_occurrence_prunes_alternate() {
        let table: VariantSiteTable<u32> = VariantSiteTable::new();
        table.upsert(4, "A", "G", true, "AL1");
        table.with_site(&4, |s| s.remove_occurrence("G", "AL1"));
        let occ = table.with_site(&4, |s| s.occurrence_of("G")).unwrap();
        assert!(occ.is_empty());
    }

    #[test]
    fn positions_are_ascending() {
        let table: VariantSiteTable<u32> = VariantSiteTable::new();
        table.upsert(7, "A", "G", true, "AL1");
        table.upsert(2, "C", "T", true, "AL1");
        table.upsert(4, "A", "G", true, "AL1");
        assert_eq!(table.positions(), vec![2, 4, 7]);
    }
}
