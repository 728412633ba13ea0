//! Parallel bucketing of content events by day
//!
//! Uses rayon for a fold/reduce over the event list. Invalid timestamps are
//! collected as skipped events rather than aborting the pass.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::daykey::{normalize, DayKey, DisplayZone};
use crate::error::CalendarError;
use crate::ContentRecord;

/// Count of events per day. Days without events have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BucketMap {
    counts: BTreeMap<DayKey, u32>,
}

impl BucketMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: DayKey) {
        let count = self.counts.entry(key).or_insert(0);
        *count = count.saturating_add(1);
    }

    /// Count for `key`, zero when absent.
    pub fn get(&self, key: &DayKey) -> u32 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Days in ascending order with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (&DayKey, u32)> + '_ {
        self.counts.iter().map(|(key, count)| (key, *count))
    }

    pub fn total(&self) -> u64 {
        self.counts.values().map(|c| *c as u64).sum()
    }

    fn merge_counts(&mut self, other: HashMap<DayKey, u32>) {
        for (key, count) in other {
            let entry = self.counts.entry(key).or_insert(0);
            *entry = entry.saturating_add(count);
        }
    }
}

impl FromIterator<DayKey> for BucketMap {
    fn from_iter<I: IntoIterator<Item = DayKey>>(iter: I) -> Self {
        let mut map = BucketMap::new();
        for key in iter {
            map.increment(key);
        }
        map
    }
}

/// An event that could not be placed on a day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEvent {
    /// Position of the event in the input.
    pub index: usize,
    pub error: CalendarError,
}

/// Outcome of a bucketing pass.
#[derive(Debug, Clone, Default)]
pub struct BucketReport {
    pub buckets: BucketMap,
    pub accepted: usize,
    pub skipped: Vec<SkippedEvent>,
}

/// Bucket raw timestamps by their day key in `zone`.
pub fn bucket_timestamps<S>(timestamps: &[S], zone: &DisplayZone) -> BucketReport
where
    S: AsRef<str> + Sync,
{
    bucket_by(timestamps, zone, |ts| Some(ts.as_ref()))
}

/// Bucket content records by their creation timestamp.
///
/// A record without a timestamp is skipped like an unparseable one.
pub fn bucket_records(records: &[ContentRecord], zone: &DisplayZone) -> BucketReport {
    bucket_by(records, zone, record_timestamp)
}

fn record_timestamp(record: &ContentRecord) -> Option<&str> {
    record.created_at.as_deref()
}

fn bucket_by<T, F>(items: &[T], zone: &DisplayZone, timestamp_of: F) -> BucketReport
where
    T: Sync,
    F: Fn(&T) -> Option<&str> + Sync,
{
    if items.is_empty() {
        return BucketReport::default();
    }

    // Days are bounded by the window the caller cares about; 400 covers a year plus padding
    let estimated_days = (items.len() / 4).clamp(16, 400);

    let acc = items
        .par_iter()
        .enumerate()
        .fold(
            || BucketAccumulator::with_capacity(estimated_days),
            |mut acc, (index, item)| {
                match timestamp_of(item) {
                    Some(raw) => match normalize(raw, zone) {
                        Ok(key) => acc.add(key),
                        Err(error) => acc.skip(index, error),
                    },
                    None => acc.skip(index, CalendarError::MissingTimestamp),
                }
                acc
            },
        )
        .reduce(
            || BucketAccumulator::with_capacity(estimated_days),
            BucketAccumulator::merge,
        );

    acc.into_report()
}

#[derive(Default)]
struct BucketAccumulator {
    counts: HashMap<DayKey, u32>,
    accepted: usize,
    skipped: Vec<SkippedEvent>,
}

impl BucketAccumulator {
    fn with_capacity(days: usize) -> Self {
        Self {
            counts: HashMap::with_capacity(days),
            ..Default::default()
        }
    }

    fn add(&mut self, key: DayKey) {
        let count = self.counts.entry(key).or_insert(0);
        *count = count.saturating_add(1);
        self.accepted += 1;
    }

    fn skip(&mut self, index: usize, error: CalendarError) {
        self.skipped.push(SkippedEvent { index, error });
    }

    fn merge(mut self, other: BucketAccumulator) -> BucketAccumulator {
        for (key, count) in other.counts {
            let entry = self.counts.entry(key).or_insert(0);
            *entry = entry.saturating_add(count);
        }
        self.accepted += other.accepted;
        self.skipped.extend(other.skipped);
        self
    }

    fn into_report(mut self) -> BucketReport {
        // Reduction order is scheduler dependent
        self.skipped.sort_by_key(|s| s.index);

        let mut buckets = BucketMap::new();
        buckets.merge_counts(self.counts);

        BucketReport {
            buckets,
            accepted: self.accepted,
            skipped: self.skipped,
        }
    }
}
