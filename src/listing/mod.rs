//! Price and location extraction for rental listings posted in Telegram
//! channels around Vietnam.
//!
//! Listings are written in a mix of **Vietnamese, English, Russian and
//! Ukrainian**, often in the same message, so every table here carries
//! variants for each script.
pub mod gazetteer;
pub mod listing_tests;
pub mod location;
pub mod normalize;
pub mod price;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use location::extract_locations;
pub use normalize::normalize;
pub use price::extract_price;

// ───────────────────────────── Price ─────────────────────────────────────

/// Bare amounts below this are read as dollars, everything else as dong.
/// Fixed heuristic, applied only through [`Currency::infer`].
pub const USD_VND_THRESHOLD: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Vnd,
}

impl Currency {
    /// Currency of a bare amount with no explicit marker.
    pub fn infer(amount: u64) -> Self {
        if amount < USD_VND_THRESHOLD {
            Self::Usd
        } else {
            Self::Vnd
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    pub amount: u64,
    pub currency: Currency,
}

impl Price {
    pub fn usd(amount: u64) -> Self {
        Self {
            amount,
            currency: Currency::Usd,
        }
    }

    pub fn vnd(amount: u64) -> Self {
        Self {
            amount,
            currency: Currency::Vnd,
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.currency {
            Currency::Usd => write!(f, "${}", group_thousands(self.amount)),
            Currency::Vnd => write!(f, "{} ₫", group_thousands(self.amount)),
        }
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ───────────────────────────── Records ───────────────────────────────────

/// One message as handed over by a message source, before extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMessage {
    pub id: i64,
    pub channel: String,
    pub date: DateTime<Utc>,
    pub text: String,
    #[serde(default)]
    pub photo_ids: Vec<i64>,
    #[serde(default)]
    pub views: Option<u64>,
    #[serde(default)]
    pub link: String,
}

/// Structured listing. `(channel, id)` is the identity inside a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub channel: String,
    pub date: DateTime<Utc>,
    pub raw_text: String,
    pub price: Option<Price>,
    /// Canonical gazetteer tags in order of first occurrence.
    pub location: Vec<String>,
    pub photo_ids: Vec<i64>,
    pub views: Option<u64>,
    pub link: String,
}

/// Public link of a channel post.
pub fn message_link(channel: &str, id: i64) -> String {
    format!("https://t.me/{}/{id}", channel.trim_start_matches('@'))
}

/// Compose a [`Record`] from source metadata plus extractor output.
/// Pure: the same message always produces the same record.
pub fn build_record(msg: RawMessage) -> Record {
    let normalized = normalize(&msg.text);
    let price = extract_price(&normalized);
    let location = extract_locations(&normalized);

    debug!(
        "Extracted @{}/{}: price={:?}, location={:?}",
        msg.channel, msg.id, price, location
    );

    let link = if msg.link.is_empty() {
        message_link(&msg.channel, msg.id)
    } else {
        msg.link
    };

    Record {
        id: msg.id,
        channel: msg.channel,
        date: msg.date,
        raw_text: msg.text,
        price,
        location,
        photo_ids: msg.photo_ids,
        views: msg.views,
        link,
    }
}
