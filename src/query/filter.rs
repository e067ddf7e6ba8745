use tracing::debug;

use crate::listing::{Record, normalize};
use crate::query::Query;
use crate::snapshot::Snapshot;

/// Records of `snapshot` that satisfy every clause of `query`, in
/// snapshot order.
pub fn filter<'a>(snapshot: &'a Snapshot, query: &Query) -> Vec<&'a Record> {
    let hits: Vec<&Record> = snapshot.records().filter(|r| matches(r, query)).collect();
    debug!("Filter: {} of {} records match {query:?}", hits.len(), snapshot.len());
    hits
}

/// All clauses ANDed.
pub fn matches(record: &Record, query: &Query) -> bool {
    within_price_bounds(record, query) && whitelisted(record, query) && !blacklisted(record, query)
}

/// A record without a price fails every bound.
fn within_price_bounds(record: &Record, query: &Query) -> bool {
    let amount = record.price.map(|p| p.amount);
    if let Some(min) = query.min_price {
        if amount.is_none_or(|a| a < min) {
            return false;
        }
    }
    if let Some(max) = query.max_price {
        if amount.is_none_or(|a| a > max) {
            return false;
        }
    }
    true
}

/// Any include term found inside any location tag.
fn whitelisted(record: &Record, query: &Query) -> bool {
    if query.include_terms.is_empty() {
        return true;
    }
    record.location.iter().any(|tag| {
        let tag = tag.to_lowercase();
        query.include_terms.iter().any(|term| tag.contains(term.as_str()))
    })
}

/// Any exclude term found anywhere in the raw text, tagged or not.
fn blacklisted(record: &Record, query: &Query) -> bool {
    if query.exclude_terms.is_empty() {
        return false;
    }
    let text = normalize(&record.raw_text);
    query
        .exclude_terms
        .iter()
        .any(|term| text.contains(term.as_str()))
}
