use crate::telegram::{self, TelegramSource};
use crate::{api, refresh};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use super::shared::{app_state, load_serve_cfg};

pub(super) async fn run() -> Result<()> {
    let tg = telegram::load_tg_cfg()?;
    let cfg = load_serve_cfg()?;

    let client = telegram::start(&tg).await?;
    let source = Arc::new(TelegramSource::new(client, tg.fetch_timeout));
    let state = app_state(&cfg, source, tg.channels.clone());

    if tg.channels.is_empty() {
        info!("No default channels configured; waiting for fetch requests");
    } else {
        info!("Initial fetch of {} default channels", tg.channels.len());
        match refresh::refresh(state.source.as_ref(), &state.store, &tg.channels, cfg.days).await {
            Ok(report) => info!(
                "Initial fetch: {} records cached",
                report.total_records
            ),
            Err(e) => warn!("Initial fetch skipped: {e}"),
        }
    }

    api::serve(cfg.addr, state).await
}
