//! Structured queries over the snapshot: price range, location whitelist,
//! full-text area blacklist and sort order.
pub mod filter;
pub mod sort;
pub mod stats;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::listing::{Record, normalize};
use crate::snapshot::Snapshot;

pub use filter::filter;
pub use sort::sort;
pub use stats::{Stats, stats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Date,
    Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortKey {
    pub const DATE_DESC: Self = Self {
        field: SortField::Date,
        order: SortOrder::Desc,
    };
}

impl Default for SortKey {
    fn default() -> Self {
        Self::DATE_DESC
    }
}

impl FromStr for SortKey {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, order) = match s.trim().to_lowercase().as_str() {
            "date_desc" => (SortField::Date, SortOrder::Desc),
            "date_asc" => (SortField::Date, SortOrder::Asc),
            "price_desc" => (SortField::Price, SortOrder::Desc),
            "price_asc" => (SortField::Price, SortOrder::Asc),
            _ => return Err(QueryError::InvalidSort(s.to_string())),
        };
        Ok(Self { field, order })
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = match self.field {
            SortField::Date => "date",
            SortField::Price => "price",
        };
        let order = match self.order {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        };
        write!(f, "{field}_{order}")
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("{field} must be a non-negative whole number, got {value:?}")]
    InvalidPrice { field: &'static str, value: String },

    #[error("min_price ({min}) is greater than max_price ({max})")]
    InvertedRange { min: u64, max: u64 },

    #[error("sort_by must be one of date_desc, date_asc, price_desc, price_asc, got {0:?}")]
    InvalidSort(String),
}

/// Query parameters as they arrive from the outside, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryParams {
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    /// Comma-separated include terms.
    pub location: Option<String>,
    /// Comma-separated exclude terms.
    pub exclude_areas: Option<String>,
    pub sort_by: Option<String>,
}

/// Validated, request-scoped query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    /// Matched against location tags (any term).
    pub include_terms: Vec<String>,
    /// Matched against the raw text (any term drops the record).
    pub exclude_terms: Vec<String>,
    pub sort: SortKey,
}

impl Query {
    pub fn from_params(params: &QueryParams) -> Result<Self, QueryError> {
        let min_price = parse_price_bound("min_price", params.min_price.as_deref())?;
        let max_price = parse_price_bound("max_price", params.max_price.as_deref())?;
        if let (Some(min), Some(max)) = (min_price, max_price) {
            if min > max {
                return Err(QueryError::InvertedRange { min, max });
            }
        }

        let sort = match params.sort_by.as_deref().map(str::trim) {
            None | Some("") => SortKey::default(),
            Some(raw) => raw.parse()?,
        };

        Ok(Self {
            min_price,
            max_price,
            include_terms: parse_terms(params.location.as_deref()),
            exclude_terms: parse_terms(params.exclude_areas.as_deref()),
            sort,
        })
    }
}

fn parse_price_bound(field: &'static str, raw: Option<&str>) -> Result<Option<u64>, QueryError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(QueryError::InvalidPrice {
            field,
            value: raw.to_string(),
        });
    }
    raw.parse::<u64>()
        .map(Some)
        .map_err(|_| QueryError::InvalidPrice {
            field,
            value: raw.to_string(),
        })
}

/// Split a comma-joined term list into normalized, de-duplicated terms.
pub fn parse_terms(raw: Option<&str>) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for term in raw.unwrap_or_default().split(',').map(normalize) {
        if !term.is_empty() && !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

/// Filter then sort, returning owned records in response order.
pub fn run(snapshot: &Snapshot, query: &Query) -> Vec<Record> {
    let mut hits = filter(snapshot, query);
    sort(&mut hits, query.sort);
    hits.into_iter().cloned().collect()
}
