use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

/// A created-exactly-once, id-keyed record. `payload` is fixed at creation
/// time (the canonical descriptor list); `samples` grows monotonically as
/// more samples are found to share the same fingerprint.
pub struct Entry<T> {
    pub id: String,
    pub descriptor: String,
    pub payload: T,
    samples: Mutex<HashSet<String>>,
}

impl<T> Entry<T> {
    pub fn samples(&self) -> HashSet<String> {
        self.samples.lock().clone()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.lock().len()
    }
}

/// Concurrent id -> record map implementing the "at-most-once creation"
/// discipline: the thread that wins the race to create a fingerprint's
/// record is the only one that runs `make_payload` and wires variant
/// sites; every other submitter — whether it arrived before or after the
/// winner — only ever observes a fully-constructed record or adds itself
/// to its sample set.
pub struct Interner<T> {
    records: RwLock<HashMap<String, Arc<Entry<T>>>>,
}

impl<T> Default for Interner<T> {
    fn default() -> Self {
        Interner {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> Interner<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submits an observation of `id` (already fingerprinted) by
    /// `sample_id`. Returns the record and whether this call created it.
    /// `make_payload` only runs if this call wins the creation race.
    pub fn submit(
        &self,
        id: &str,
        sample_id: &str,
        descriptor: impl FnOnce() -> String,
        make_payload: impl FnOnce() -> T,
    ) -> (Arc<Entry<T>>, bool) {
        if let Some(entry) = self.records.read().get(id) {
            entry.samples.lock().insert(sample_id.to_string());
            return (entry.clone(), false);
        }

        let mut guard = self.records.write();
        if let Some(entry) = guard.get(id) {
            entry.samples.lock().insert(sample_id.to_string());
            return (entry.clone(), false);
        }

        let entry = Arc::new(Entry {
            id: id.to_string(),
            descriptor: descriptor(),
            payload: make_payload(),
            samples: Mutex::new(HashSet::from([sample_id.to_string()])),
        });
        guard.insert(id.to_string(), entry.clone());
        (entry, true)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Entry<T>>> {
        self.records.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries sorted by id, for deterministic catalog assembly regardless
    /// of submission order.
    pub fn sorted_entries(&self) -> Vec<Arc<Entry<T>>> {
        let guard = self.records.read();
        let mut entries: Vec<Arc<Entry<T>>> = guard.values().cloned().collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn concurrent_submission_creates_exactly_once() {
        let interner: Interner<()> = Interner::new();
        let created_count = Arc::new(AtomicUsize::new(0));
        let interner = Arc::new(interner);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let interner = interner.clone();
                let created_count = created_count.clone();
                thread::spawn(move || {
                    let (_entry, created) = interner.submit(
                        "AL00000000001",
                        &format!("sample{i}"),
                        || "G!4;T!7".to_string(),
                        || (),
                    );
                    if created {
                        created_count.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(created_count.load(Ordering::SeqCst), 1);
        let entry = interner.get("AL00000000001").unwrap();
        assert_eq!(entry.sample_count(), 8);
    }
}
