use crate::api;
use crate::listing::RawMessage;
use crate::refresh::{MessageSource, parse_channels};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

use super::shared::{app_state, load_dump_messages, load_replay_cfg, load_serve_cfg};

/// Offline message source backed by a dump file.
///
/// The lookback window is measured against the newest message in the dump
/// rather than the wall clock, so an old dump still answers.
pub(super) struct DumpSource {
    messages: Vec<RawMessage>,
    newest: DateTime<Utc>,
}

impl DumpSource {
    pub(super) fn new(messages: Vec<RawMessage>) -> Self {
        let newest = messages.iter().map(|m| m.date).max().unwrap_or_else(Utc::now);
        Self { messages, newest }
    }

    /// Channels present in the dump, in first-seen order.
    pub(super) fn channels(&self) -> Vec<String> {
        parse_channels(self.messages.iter().map(|m| m.channel.as_str()))
    }
}

#[async_trait]
impl MessageSource for DumpSource {
    async fn fetch(&self, channel: &str, since: DateTime<Utc>) -> Result<Vec<RawMessage>> {
        let shift = Utc::now() - self.newest;
        let since = since - shift;

        let mut out: Vec<RawMessage> = self
            .messages
            .iter()
            .filter(|m| m.channel == channel && m.date >= since)
            .cloned()
            .collect();
        if out.is_empty() && !self.messages.iter().any(|m| m.channel == channel) {
            return Err(anyhow!("channel @{channel} is not in the dump"));
        }
        out.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(out)
    }
}

pub(super) async fn run() -> Result<()> {
    let replay = load_replay_cfg()?;
    let cfg = load_serve_cfg()?;

    let messages = load_dump_messages(&replay.input_path)?;
    if messages.is_empty() {
        return Err(anyhow!("Replay input is empty: {}", replay.input_path));
    }

    let source = DumpSource::new(messages);
    let channels = source.channels();
    info!(
        "Replay: {} messages from {} channels in {}",
        source.messages.len(),
        channels.len(),
        replay.input_path
    );

    let state = app_state(&cfg, Arc::new(source), channels);
    api::serve(cfg.addr, state).await
}
