use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelStats {
    pub channel: String,
    pub records: usize,
    pub fetched_at: DateTime<Utc>,
}

/// Aggregate counts over the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub with_price: usize,
    pub with_location: usize,
    /// Minutes since the most recent fetch of any channel.
    pub cache_age_minutes: Option<f64>,
    pub cache_updated: Option<DateTime<Utc>>,
    pub channels: Vec<ChannelStats>,
}

pub fn stats(snapshot: &Snapshot, now: DateTime<Utc>) -> Stats {
    Stats {
        total: snapshot.len(),
        with_price: snapshot.records().filter(|r| r.price.is_some()).count(),
        with_location: snapshot.records().filter(|r| !r.location.is_empty()).count(),
        cache_age_minutes: snapshot.cache_age_minutes(now),
        cache_updated: snapshot.cache_updated(),
        channels: snapshot
            .channels()
            .iter()
            .map(|c| ChannelStats {
                channel: c.channel.clone(),
                records: c.records.len(),
                fetched_at: c.fetched_at,
            })
            .collect(),
    }
}
