use crate::listing::RawMessage;
use crate::refresh::MessageSource;
use crate::telegram::{self, TelegramSource};
use anyhow::{Context, Result, anyhow};
use chrono::{Duration, Utc};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

use super::shared::load_fetch_days;

pub(super) async fn run() -> Result<()> {
    let tg = telegram::load_tg_cfg()?;
    if tg.channels.is_empty() {
        return Err(anyhow!("TG_CHANNELS is empty"));
    }
    let days = load_fetch_days()?;
    let output_path = std::env::var("DUMP_OUTPUT_PATH").unwrap_or_else(|_| "./dump.jsonl".into());
    let since = Utc::now() - Duration::days(i64::from(days));

    let client = telegram::start(&tg).await?;
    let source = TelegramSource::new(client, tg.fetch_timeout);

    info!(
        "Dumping messages from {} channels since {} ({days} days)",
        tg.channels.len(),
        since.to_rfc3339()
    );

    let mut messages: Vec<RawMessage> = Vec::new();
    for channel in &tg.channels {
        match source.fetch(channel, since).await {
            Ok(batch) => messages.extend(batch),
            Err(e) => warn!("Skipping @{channel}: {e:#}"),
        }
    }

    messages.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.channel.cmp(&b.channel)));

    if let Some(parent) = Path::new(&output_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create parent directory for output dump file {output_path}")
            })?;
        }
    }

    let file = File::create(&output_path)
        .with_context(|| format!("failed to create output dump file {output_path}"))?;
    let mut writer = BufWriter::new(file);

    for msg in &messages {
        let line = serde_json::to_string(msg)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    info!(
        "Dump complete: {} messages written to {}",
        messages.len(),
        output_path
    );

    Ok(())
}
