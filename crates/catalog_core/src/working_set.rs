use std::cmp::Ordering;
use std::collections::HashMap;

use crate::{ListOrdering, Record, RecordId, Tier};

/// Deduplicated, tier-ordered records known for one list context.
///
/// Invariants: no two records share an id, and every premium record precedes
/// every regular record. Both hold after each [`WorkingSet::merge`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkingSet {
    records: Vec<Record>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from an arbitrary batch, collapsing duplicates.
    pub fn from_records(records: impl IntoIterator<Item = Record>, ordering: ListOrdering) -> Self {
        Self::new().merge(records, ordering)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// The first `len` records, clamped to the set size.
    pub fn prefix(&self, len: usize) -> &[Record] {
        &self.records[..len.min(self.records.len())]
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn premium_count(&self) -> usize {
        self.records
            .iter()
            .take_while(|r| r.tier() == Tier::Premium)
            .count()
    }

    /// Merges `incoming` into a new set; `self` is left untouched.
    ///
    /// A record whose id is already present replaces the stored one only when
    /// its score is strictly higher. The result is re-partitioned into tiers and
    /// ordered by `ordering` inside each tier; equal keys keep arrival order.
    pub fn merge(&self, incoming: impl IntoIterator<Item = Record>, ordering: ListOrdering) -> Self {
        let mut records = self.records.clone();
        let mut index: HashMap<RecordId, usize> = records
            .iter()
            .enumerate()
            .map(|(pos, record)| (record.id().clone(), pos))
            .collect();

        for record in incoming {
            match index.get(record.id()) {
                Some(&pos) => {
                    if record.score() > records[pos].score() {
                        records[pos] = record;
                    }
                }
                None => {
                    index.insert(record.id().clone(), records.len());
                    records.push(record);
                }
            }
        }

        records.sort_by(|a, b| compare(a, b, ordering));
        Self { records }
    }

    /// Same records, re-sorted by `ordering`.
    pub fn reordered(&self, ordering: ListOrdering) -> Self {
        let mut records = self.records.clone();
        records.sort_by(|a, b| compare(a, b, ordering));
        Self { records }
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

/// Merge/dedup entry point over plain batches.
pub fn merge(existing: &WorkingSet, incoming: &[Record], ordering: ListOrdering) -> WorkingSet {
    existing.merge(incoming.iter().cloned(), ordering)
}

fn compare(a: &Record, b: &Record, ordering: ListOrdering) -> Ordering {
    let by_tier = a.tier().cmp(&b.tier());
    let within = match ordering {
        ListOrdering::CreatedDesc => b.created_at().cmp(&a.created_at()),
        ListOrdering::ScoreDesc => b
            .score()
            .cmp(&a.score())
            .then_with(|| b.created_at().cmp(&a.created_at())),
    };
    by_tier.then(within)
}
