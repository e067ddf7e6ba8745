use anyhow::{Context, Result, anyhow};
use chrono::Duration;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use crate::api::AppState;
use crate::listing::RawMessage;
use crate::refresh::{MAX_DAYS, MIN_DAYS, SharedSource};
use crate::snapshot::SnapshotStore;

#[derive(Clone)]
pub(super) struct ServeCfg {
    pub addr: SocketAddr,
    pub days: u32,
    pub cache_max_age: Duration,
}

#[derive(Clone)]
pub(super) struct ReplayCfg {
    pub input_path: String,
}

pub(super) fn must_env(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| anyhow!("Missing env var {key}"))
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

/// | Variable                | Default   |
/// |-------------------------|-----------|
/// | `HTTP_HOST`             | `0.0.0.0` |
/// | `HTTP_PORT`             | `8000`    |
/// | `FETCH_DAYS`            | `30`      |
/// | `CACHE_MAX_AGE_MINUTES` | `30`      |
pub(super) fn load_serve_cfg() -> Result<ServeCfg> {
    let host: IpAddr = std::env::var("HTTP_HOST")
        .unwrap_or_else(|_| "0.0.0.0".into())
        .parse()
        .context("HTTP_HOST must be an IP address")?;
    let port = parse_env::<u16>("HTTP_PORT").unwrap_or(8000);

    Ok(ServeCfg {
        addr: SocketAddr::new(host, port),
        days: load_fetch_days()?,
        cache_max_age: Duration::minutes(
            parse_env::<i64>("CACHE_MAX_AGE_MINUTES")
                .filter(|v| *v > 0)
                .unwrap_or(30),
        ),
    })
}

pub(super) fn load_fetch_days() -> Result<u32> {
    let days = parse_env::<u32>("FETCH_DAYS").unwrap_or(30);
    if !(MIN_DAYS..=MAX_DAYS).contains(&days) {
        return Err(anyhow!("FETCH_DAYS must be between {MIN_DAYS} and {MAX_DAYS}"));
    }
    Ok(days)
}

pub(super) fn load_replay_cfg() -> Result<ReplayCfg> {
    Ok(ReplayCfg {
        input_path: must_env("REPLAY_INPUT_PATH")?,
    })
}

pub(super) fn app_state(cfg: &ServeCfg, source: SharedSource, channels: Vec<String>) -> AppState {
    AppState::new(
        Arc::new(SnapshotStore::new()),
        source,
        channels,
        cfg.days,
        cfg.cache_max_age,
    )
}

/// Read a JSONL dump of [`RawMessage`]s, one per line. Blank lines are
/// skipped.
pub(super) fn load_dump_messages(path: &str) -> Result<Vec<RawMessage>> {
    let file = File::open(path).with_context(|| format!("failed to open replay file {path}"))?;
    read_messages(BufReader::new(file))
}

fn read_messages(reader: impl BufRead) -> Result<Vec<RawMessage>> {
    let mut messages = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let msg: RawMessage = serde_json::from_str(&line)
            .with_context(|| format!("invalid JSON at line {}", idx + 1))?;
        messages.push(msg);
    }
    Ok(messages)
}
