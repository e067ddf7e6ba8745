//! Multi-channel refresh: fetch → extract → write, one pipeline per channel.
//!
//! Channel pipelines run concurrently. A failing channel is reported in the
//! result and never blocks or poisons the others; every channel that
//! succeeded is written to the snapshot in a single swap.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::listing::{RawMessage, Record, build_record};
use crate::snapshot::{SnapshotStore, dedup_by_id};

pub const MIN_DAYS: u32 = 1;
pub const MAX_DAYS: u32 = 90;

/// Anything that can hand over the recent messages of a channel.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Messages of `channel` posted at or after `since`, newest first.
    async fn fetch(&self, channel: &str, since: DateTime<Utc>) -> Result<Vec<RawMessage>>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefreshError {
    #[error("no channels given")]
    NoChannels,

    #[error("days must be between {MIN_DAYS} and {MAX_DAYS}, got {0}")]
    InvalidDays(i64),
}

/// Accept a lookback window in whole days if it lies in `MIN_DAYS..=MAX_DAYS`.
pub fn check_days(days: i64) -> Result<u32, RefreshError> {
    u32::try_from(days)
        .ok()
        .filter(|d| (MIN_DAYS..=MAX_DAYS).contains(d))
        .ok_or(RefreshError::InvalidDays(days))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ChannelStatus {
    Ok { records: usize },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelOutcome {
    pub channel: String,
    #[serde(flatten)]
    pub status: ChannelStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub channels: Vec<ChannelOutcome>,
    pub total_records: usize,
    pub cache_updated: Option<DateTime<Utc>>,
}

impl RefreshReport {
    pub fn failed(&self) -> impl Iterator<Item = &ChannelOutcome> {
        self.channels
            .iter()
            .filter(|c| matches!(c.status, ChannelStatus::Failed { .. }))
    }
}

/// Trim, strip a leading `@`, drop blanks and duplicates.
pub fn parse_channels<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in raw {
        let name = name.trim().trim_start_matches('@');
        if !name.is_empty() && !out.iter().any(|c| c == name) {
            out.push(name.to_string());
        }
    }
    out
}

/// Fetch `channels` for the last `days` days and replace their slices of
/// the snapshot.
pub async fn refresh(
    source: &dyn MessageSource,
    store: &SnapshotStore,
    channels: &[String],
    days: u32,
) -> Result<RefreshReport, RefreshError> {
    let channels = parse_channels(channels.iter().map(String::as_str));
    if channels.is_empty() {
        return Err(RefreshError::NoChannels);
    }
    let days = check_days(i64::from(days))?;

    let since = Utc::now() - Duration::days(i64::from(days));
    info!("Refreshing {} channels (last {days} days)", channels.len());

    let results = join_all(
        channels
            .iter()
            .map(|channel| fetch_channel(source, channel, since)),
    )
    .await;

    let mut outcomes = Vec::with_capacity(results.len());
    let mut batches: Vec<(String, Vec<Record>)> = Vec::new();
    for (channel, result) in channels.into_iter().zip(results) {
        match result {
            Ok(records) => {
                outcomes.push(ChannelOutcome {
                    channel: channel.clone(),
                    status: ChannelStatus::Ok {
                        records: records.len(),
                    },
                });
                batches.push((channel, records));
            }
            Err(e) => {
                warn!("Fetch failed for @{channel}: {e:#}");
                outcomes.push(ChannelOutcome {
                    channel,
                    status: ChannelStatus::Failed {
                        error: format!("{e:#}"),
                    },
                });
            }
        }
    }

    let total_records = batches.iter().map(|(_, r)| r.len()).sum();
    store.write_many(batches);

    let report = RefreshReport {
        channels: outcomes,
        total_records,
        cache_updated: store.read().cache_updated(),
    };
    info!(
        "Refresh complete: {} records written, {} channels failed",
        report.total_records,
        report.failed().count()
    );
    Ok(report)
}

/// One channel's pipeline: fetch, then extract every message. The result
/// holds one record per message id, so its length is what gets cached.
async fn fetch_channel(
    source: &dyn MessageSource,
    channel: &str,
    since: DateTime<Utc>,
) -> Result<Vec<Record>> {
    let messages = source.fetch(channel, since).await?;
    let records = messages
        .into_iter()
        .filter(|m| !m.text.trim().is_empty())
        .map(|mut m| {
            m.channel = channel.to_string();
            build_record(m)
        })
        .collect();
    Ok(dedup_by_id(channel, records))
}

/// Shared source handle, as stored in long-lived state.
pub type SharedSource = Arc<dyn MessageSource>;
