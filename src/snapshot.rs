//! In-memory cache of extracted records, one slice per channel.
//!
//! Readers take an `Arc<Snapshot>` and never see a half-applied write: a
//! write builds the next snapshot off to the side and swaps the pointer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::listing::Record;

/// Records of one channel from its last successful fetch.
#[derive(Debug, Clone)]
pub struct ChannelRecords {
    pub channel: String,
    pub fetched_at: DateTime<Utc>,
    pub records: Vec<Record>,
}

/// Immutable view of the cache at one point in time.
///
/// Channels are kept in first-write order; re-writing a channel keeps its
/// position. Iteration order (channel order, then record order inside the
/// channel) is the snapshot order that stable sorting preserves.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    channels: Vec<ChannelRecords>,
}

impl Snapshot {
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.channels.iter().flat_map(|c| c.records.iter())
    }

    pub fn channels(&self) -> &[ChannelRecords] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.iter().map(|c| c.records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub fn get(&self, channel: &str, id: i64) -> Option<&Record> {
        self.channels
            .iter()
            .find(|c| c.channel == channel)?
            .records
            .iter()
            .find(|r| r.id == id)
    }

    /// Most recent fetch across all channels.
    pub fn cache_updated(&self) -> Option<DateTime<Utc>> {
        self.channels.iter().map(|c| c.fetched_at).max()
    }

    /// Minutes since the most recent fetch, `None` before the first fetch.
    pub fn cache_age_minutes(&self, now: DateTime<Utc>) -> Option<f64> {
        self.cache_updated()
            .map(|at| (now - at).num_milliseconds().max(0) as f64 / 60_000.0)
    }

    /// `true` when nothing was fetched yet or the most recent fetch is
    /// older than `max_age`.
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.cache_updated().is_none_or(|at| now - at > max_age)
    }

    /// Replace one channel's slice wholesale.
    fn replace_channel(&mut self, channel: &str, records: Vec<Record>, fetched_at: DateTime<Utc>) {
        let records = dedup_by_id(channel, records);
        match self.channels.iter_mut().find(|c| c.channel == channel) {
            Some(slot) => {
                slot.records = records;
                slot.fetched_at = fetched_at;
            }
            None => self.channels.push(ChannelRecords {
                channel: channel.to_string(),
                fetched_at,
                records,
            }),
        }
    }
}

/// Keep one record per id: first position, last value. Records from other
/// channels are re-keyed onto `channel`.
pub(crate) fn dedup_by_id(channel: &str, records: Vec<Record>) -> Vec<Record> {
    let mut index: HashMap<i64, usize> = HashMap::with_capacity(records.len());
    let mut out: Vec<Record> = Vec::with_capacity(records.len());
    for mut record in records {
        if record.channel != channel {
            record.channel = channel.to_string();
        }
        match index.get(&record.id) {
            Some(&pos) => {
                debug!("Duplicate record @{channel}/{} replaced", record.id);
                out[pos] = record;
            }
            None => {
                index.insert(record.id, out.len());
                out.push(record);
            }
        }
    }
    out
}

/// Shared handle to the current snapshot.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: RwLock<Arc<Snapshot>>,
    /// Serializes writers so two refreshes cannot both start from the same
    /// base and drop each other's channels.
    write_lock: Mutex<()>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot. The read lock is held only for the pointer clone.
    pub fn read(&self) -> Arc<Snapshot> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replace `channel`'s records and stamp its fetch time with now.
    #[cfg(test)]
    pub fn write(&self, channel: &str, records: Vec<Record>) {
        self.write_many_at(vec![(channel.to_string(), records)], Utc::now());
    }

    /// Apply several channel replacements as one post-state.
    pub fn write_many(&self, batches: Vec<(String, Vec<Record>)>) {
        self.write_many_at(batches, Utc::now());
    }

    #[cfg(test)]
    pub fn write_at(&self, channel: &str, records: Vec<Record>, fetched_at: DateTime<Utc>) {
        self.write_many_at(vec![(channel.to_string(), records)], fetched_at);
    }

    pub fn write_many_at(&self, batches: Vec<(String, Vec<Record>)>, fetched_at: DateTime<Utc>) {
        if batches.is_empty() {
            return;
        }
        let _writer = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());

        let mut next = Snapshot::clone(&self.read());
        for (channel, records) in batches {
            info!("Snapshot: @{channel} ← {} records", records.len());
            next.replace_channel(&channel, records, fetched_at);
        }

        let next = Arc::new(next);
        match self.current.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}
