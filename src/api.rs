//! HTTP API over the snapshot and the refresh pipeline.
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Query as QueryString, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::listing::Record;
use crate::query::{self, Query, QueryError, QueryParams, Stats};
use crate::refresh::{self, RefreshError, RefreshReport, SharedSource};
use crate::snapshot::SnapshotStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SnapshotStore>,
    pub source: SharedSource,
    /// Channels refreshed when a request names none.
    pub channels: Arc<Vec<String>>,
    pub days: u32,
    pub cache_max_age: Duration,
    /// Held while an automatic refresh runs; stores when the last attempt
    /// finished, successful or not.
    refreshing: Arc<Mutex<Option<Instant>>>,
}

impl AppState {
    pub fn new(
        store: Arc<SnapshotStore>,
        source: SharedSource,
        channels: Vec<String>,
        days: u32,
        cache_max_age: Duration,
    ) -> Self {
        Self {
            store,
            source,
            channels: Arc::new(channels),
            days,
            cache_max_age,
            refreshing: Arc::new(Mutex::new(None)),
        }
    }

    /// `true` when the cache is empty or older than `cache_max_age`.
    fn needs_refresh(&self) -> bool {
        let snapshot = self.store.read();
        snapshot.is_empty() || snapshot.is_stale(Utc::now(), self.cache_max_age)
    }

    /// Refresh the default channels unless an attempt finished while we
    /// waited for the lock. Callers queued behind an attempt share its
    /// outcome, including a failure. Failures are logged, never returned.
    async fn refresh_defaults(&self, force: bool) {
        if self.channels.is_empty() {
            return;
        }
        let waiting_since = Instant::now();
        let mut last_attempt = self.refreshing.lock().await;
        if last_attempt.is_some_and(|at| at >= waiting_since) {
            debug!("Auto-refresh: attempt finished while waiting, skipping");
            return;
        }
        if !force && !self.needs_refresh() {
            return;
        }
        match refresh::refresh(self.source.as_ref(), &self.store, &self.channels, self.days).await {
            Ok(report) => {
                for failed in report.failed() {
                    warn!("Auto-refresh: @{} failed", failed.channel);
                }
            }
            Err(e) => warn!("Auto-refresh rejected: {e}"),
        }
        *last_attempt = Some(Instant::now());
    }
}

// ───────────────────────────── Errors ────────────────────────────────────

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Refresh(#[from] RefreshError),

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Query(_) | Self::Refresh(_) | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// ───────────────────────────── Router ────────────────────────────────────

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/messages", get(messages_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/fetch-messages", post(fetch_messages_handler))
        .route("/api/channels", get(channels_handler))
        .route("/api/health", get(health_handler))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {addr}"))?;
    info!("HTTP API listening on http://{addr}");
    axum::serve(listener, router(state))
        .await
        .context("HTTP server failed")
}

// ───────────────────────────── Handlers ──────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct MessagesParams {
    #[serde(flatten)]
    pub query: QueryParams,
    pub refresh: Option<String>,
}

fn truthy(raw: Option<&str>) -> bool {
    raw.is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
}

/// GET /api/messages: filtered, sorted listings.
async fn messages_handler(
    State(state): State<AppState>,
    QueryString(params): QueryString<MessagesParams>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let query = Query::from_params(&params.query)?;

    let force = truthy(params.refresh.as_deref());
    if force || state.needs_refresh() {
        state.refresh_defaults(force).await;
    }

    Ok(Json(query::run(&state.store.read(), &query)))
}

/// GET /api/stats
async fn stats_handler(State(state): State<AppState>) -> Json<Stats> {
    Json(query::stats(&state.store.read(), Utc::now()))
}

const DEFAULT_FETCH_DAYS: u32 = 30;

/// Body of `POST /api/fetch-messages`. `days` stays untyped here so a
/// negative or non-integer value is answered with the same 400 body as any
/// other validation error.
#[derive(Debug, Default, Deserialize)]
pub struct FetchRequest {
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub days: Option<Value>,
}

impl FetchRequest {
    fn days(&self) -> Result<u32, ApiError> {
        match &self.days {
            None | Some(Value::Null) => Ok(DEFAULT_FETCH_DAYS),
            Some(raw) => {
                let days = raw.as_i64().ok_or_else(|| {
                    ApiError::InvalidBody(format!("days must be a whole number, got {raw}"))
                })?;
                Ok(refresh::check_days(days)?)
            }
        }
    }
}

/// POST /api/fetch-messages: refresh the named channels.
async fn fetch_messages_handler(
    State(state): State<AppState>,
    Json(req): Json<FetchRequest>,
) -> Result<Json<RefreshReport>, ApiError> {
    let days = req.days()?;
    let report =
        refresh::refresh(state.source.as_ref(), &state.store, &req.channels, days).await?;
    Ok(Json(report))
}

#[derive(Debug, Serialize)]
pub struct ChannelInfo {
    pub channel: String,
    pub default: bool,
    pub records: usize,
    pub fetched_at: Option<DateTime<Utc>>,
}

/// GET /api/channels: default channels plus every channel in the cache.
async fn channels_handler(State(state): State<AppState>) -> Json<Vec<ChannelInfo>> {
    let snapshot = state.store.read();
    let mut out: Vec<ChannelInfo> = state
        .channels
        .iter()
        .map(|name| {
            let cached = snapshot.channels().iter().find(|c| &c.channel == name);
            ChannelInfo {
                channel: name.clone(),
                default: true,
                records: cached.map_or(0, |c| c.records.len()),
                fetched_at: cached.map(|c| c.fetched_at),
            }
        })
        .collect();

    for cached in snapshot.channels() {
        if !state.channels.contains(&cached.channel) {
            out.push(ChannelInfo {
                channel: cached.channel.clone(),
                default: false,
                records: cached.records.len(),
                fetched_at: Some(cached.fetched_at),
            });
        }
    }
    Json(out)
}

async fn health_handler() -> &'static str {
    "OK"
}
