//! Group-by-Key Merger
//!
//! Records of one query id are contiguous in every input stream. The merger
//! tracks only the open group: its key, the best record folded so far and the
//! (query, subject) pairs already admitted.

use crate::records::{AlignmentRecord, FunctionalAnnotation, HitMetrics};
use std::collections::HashSet;

/// A record that can compete for best hit of its group
pub trait Ranked {
    /// `None` for records without alignment metrics (lncRNA placeholders)
    fn metrics(&self) -> Option<&HitMetrics>;
}

impl Ranked for AlignmentRecord {
    fn metrics(&self) -> Option<&HitMetrics> {
        Some(&self.metrics)
    }
}

impl Ranked for FunctionalAnnotation {
    fn metrics(&self) -> Option<&HitMetrics> {
        self.metrics.as_ref()
    }
}

/// Candidate beats current on a strictly lower e-value, or on an equal
/// e-value with a strictly higher percent identity.
pub fn is_better(current: &HitMetrics, candidate: &HitMetrics) -> bool {
    let (current_evalue, candidate_evalue) = (current.evalue.value(), candidate.evalue.value());
    candidate_evalue < current_evalue
        || (candidate_evalue == current_evalue && candidate.pident.value() > current.pident.value())
}

/// Fold step: keep `current` unless `candidate` is better.
///
/// A record with metrics always beats one without.
pub fn pick_best<T: Ranked>(current: Option<T>, candidate: T) -> T {
    match current {
        None => candidate,
        Some(current) => {
            let replace = match (current.metrics(), candidate.metrics()) {
                (Some(cur), Some(cand)) => is_better(cur, cand),
                (None, Some(_)) => true,
                _ => false,
            };
            if replace {
                candidate
            } else {
                current
            }
        },
    }
}

/// A closed group
#[derive(Debug, Clone, PartialEq)]
pub struct Group<T> {
    pub key: String,
    pub best: T,
    /// Records offered to the group
    pub records: usize,
}

#[derive(Debug)]
struct OpenGroup<T> {
    key: String,
    best: Option<T>,
    pairs: HashSet<String>,
    records: usize,
}

impl<T> OpenGroup<T> {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            best: None,
            pairs: HashSet::new(),
            records: 0,
        }
    }

    fn close(self) -> Option<Group<T>> {
        let records = self.records;
        let key = self.key;
        self.best.map(|best| Group { key, best, records })
    }
}

/// Streaming fold of consecutive records sharing a key
#[derive(Debug)]
pub struct GroupMerger<T> {
    open: Option<OpenGroup<T>>,
}

impl<T> Default for GroupMerger<T> {
    fn default() -> Self {
        Self { open: None }
    }
}

impl<T: Ranked> GroupMerger<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to the group of `key`.
    ///
    /// When `key` differs from the open group's key, that group is closed
    /// and returned (unless nothing was offered to it).
    pub fn begin(&mut self, key: &str) -> Option<Group<T>> {
        if self.open.as_ref().is_some_and(|g| g.key == key) {
            return None;
        }
        self.open
            .replace(OpenGroup::new(key))
            .and_then(OpenGroup::close)
    }

    pub fn current_key(&self) -> Option<&str> {
        self.open.as_ref().map(|g| g.key.as_str())
    }

    /// Register a (query, subject) pair in the open group; false if already seen
    pub fn admit_pair(&mut self, pair_key: &str) -> bool {
        match self.open {
            Some(ref mut group) => {
                if group.pairs.contains(pair_key) {
                    false
                } else {
                    group.pairs.insert(pair_key.to_string());
                    true
                }
            },
            None => true,
        }
    }

    /// Fold a record into the open group
    pub fn offer(&mut self, record: T) {
        if let Some(ref mut group) = self.open {
            group.best = Some(pick_best(group.best.take(), record));
            group.records += 1;
        }
    }

    /// Close the last group
    pub fn finish(&mut self) -> Option<Group<T>> {
        self.open.take().and_then(OpenGroup::close)
    }
}
