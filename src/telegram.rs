use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use grammers_client::{Client, SignInError};
use grammers_mtsender::SenderPool;
use grammers_session::storages::SqliteSession;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{self, AsyncBufReadExt};
use tracing::{debug, info};

use crate::listing::{RawMessage, message_link};
use crate::refresh::{MessageSource, parse_channels};

#[derive(Clone)]
pub struct TgCfg {
    pub api_id: i32,
    pub api_hash: String,
    pub phone: String,
    pub two_fa_password: Option<String>,
    pub session_path: String,
    /// Channels refreshed when a request names none. May be empty.
    pub channels: Vec<String>,
    pub fetch_timeout: Duration,
}

/// | Variable             | Default                      |
/// |----------------------|------------------------------|
/// | `TG_API_ID`          | required                     |
/// | `TG_API_HASH`        | required                     |
/// | `TG_PHONE`           | required                     |
/// | `TG_2FA_PASSWORD`    | prompt on stdin              |
/// | `TG_SESSION_PATH`    | `./telegram.session.sqlite`  |
/// | `TG_CHANNELS`        | empty                        |
/// | `FETCH_TIMEOUT_SECS` | `120`                        |
pub fn load_tg_cfg() -> Result<TgCfg> {
    let channels = std::env::var("TG_CHANNELS")
        .map(|s| parse_channels(s.split(',')))
        .unwrap_or_default();

    let fetch_timeout_secs = std::env::var("FETCH_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(120);

    Ok(TgCfg {
        api_id: must_env("TG_API_ID")?
            .parse()
            .context("TG_API_ID must be i32")?,
        api_hash: must_env("TG_API_HASH")?,
        phone: must_env("TG_PHONE")?,
        two_fa_password: std::env::var("TG_2FA_PASSWORD").ok(),
        session_path: std::env::var("TG_SESSION_PATH")
            .unwrap_or_else(|_| "./telegram.session.sqlite".into()),
        channels,
        fetch_timeout: Duration::from_secs(fetch_timeout_secs),
    })
}

pub fn connect(cfg: &TgCfg) -> Result<(Client, SenderPool)> {
    let session = Arc::new(SqliteSession::open(&cfg.session_path)?);
    let pool = SenderPool::new(Arc::clone(&session), cfg.api_id);
    let client = Client::new(&pool);
    Ok((client, pool))
}

/// Connect, start the network runner in the background and make sure the
/// session is signed in.
pub async fn start(cfg: &TgCfg) -> Result<Client> {
    let (client, pool) = connect(cfg)?;

    let runner = pool.runner;
    tokio::spawn(async move {
        runner.run().await;
    });

    ensure_user_login(&client, cfg).await?;
    Ok(client)
}

pub async fn ensure_user_login(client: &Client, cfg: &TgCfg) -> Result<()> {
    if client.is_authorized().await? {
        return Ok(());
    }

    info!("Not authorized. Requesting login code...");
    let token = client
        .request_login_code(&cfg.phone, &cfg.api_hash)
        .await
        .context("request_login_code failed")?;

    let code = read_line("Enter the login code you received: ").await?;

    match client.sign_in(&token, &code).await {
        Ok(user) => {
            info!(
                "Signed in as {:?}",
                user.first_name().unwrap_or("<unknown>")
            );
            Ok(())
        }
        Err(SignInError::PasswordRequired(password_token)) => {
            let pw = if let Some(pw) = &cfg.two_fa_password {
                pw.clone()
            } else {
                let hint = password_token.hint().unwrap_or("");
                read_line(&format!(
                    "2FA password required (hint: {hint}). Enter password: "
                ))
                .await?
            };

            client
                .check_password(password_token, pw.as_bytes())
                .await
                .context("check_password failed")?;

            info!("Signed in with 2FA.");
            Ok(())
        }
        Err(e) => Err(anyhow!("sign_in failed: {e}")),
    }
}

/// Channel history read through a signed-in user session.
pub struct TelegramSource {
    client: Client,
    timeout: Duration,
}

impl TelegramSource {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    async fn scan(&self, channel: &str, since: DateTime<Utc>) -> Result<Vec<RawMessage>> {
        let peer = self
            .client
            .resolve_username(channel)
            .await
            .with_context(|| format!("resolve_username failed for @{channel}"))?
            .ok_or_else(|| anyhow!("username @{channel} was not resolved"))?;

        debug!("Scanning @{channel} (id={})", peer.id().bare_id());

        let mut albums = AlbumGrouper::default();
        let mut iter = self.client.iter_messages(peer);
        while let Some(msg) = iter.next().await.context("iter_messages failed")? {
            if msg.date() < since {
                break;
            }
            albums.push(
                RawMessage {
                    id: msg.id() as i64,
                    channel: channel.to_string(),
                    date: msg.date(),
                    text: msg.text().trim().to_string(),
                    photo_ids: msg.photo().map(|p| p.id()).into_iter().collect(),
                    views: msg.view_count().and_then(|v| u64::try_from(v).ok()),
                    link: message_link(channel, msg.id() as i64),
                },
                msg.grouped_id(),
            );
        }

        Ok(albums.finish())
    }
}

#[async_trait]
impl MessageSource for TelegramSource {
    async fn fetch(&self, channel: &str, since: DateTime<Utc>) -> Result<Vec<RawMessage>> {
        let messages = tokio::time::timeout(self.timeout, self.scan(channel, since))
            .await
            .map_err(|_| anyhow!("fetch of @{channel} timed out after {:?}", self.timeout))??;
        info!("Fetched {} messages from @{channel}", messages.len());
        Ok(messages)
    }
}

/// Folds album parts (messages sharing a group id) into one message.
///
/// The text-bearing part gives the id, date and link; photos of every part
/// are collected. Messages that end up without text are dropped.
#[derive(Default)]
pub(crate) struct AlbumGrouper {
    out: Vec<RawMessage>,
    groups: HashMap<i64, usize>,
}

impl AlbumGrouper {
    pub(crate) fn push(&mut self, msg: RawMessage, grouped_id: Option<i64>) {
        let Some(group) = grouped_id else {
            self.out.push(msg);
            return;
        };
        match self.groups.get(&group) {
            Some(&idx) => {
                let head = &mut self.out[idx];
                head.photo_ids.extend(msg.photo_ids);
                if head.text.is_empty() && !msg.text.is_empty() {
                    head.id = msg.id;
                    head.date = msg.date;
                    head.text = msg.text;
                    head.link = msg.link;
                }
                head.views = head.views.max(msg.views);
            }
            None => {
                self.groups.insert(group, self.out.len());
                self.out.push(msg);
            }
        }
    }

    pub(crate) fn finish(self) -> Vec<RawMessage> {
        self.out.into_iter().filter(|m| !m.text.is_empty()).collect()
    }
}

fn must_env(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| anyhow!("Missing env var {key}"))
}

async fn read_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    std::io::stdout().flush().ok();
    let mut line = String::new();
    let mut stdin = io::BufReader::new(io::stdin());
    stdin.read_line(&mut line).await?;
    Ok(line.trim().to_string())
}
