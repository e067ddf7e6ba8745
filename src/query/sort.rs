use std::cmp::Ordering;

use crate::listing::Record;
use crate::query::{SortField, SortKey, SortOrder};

/// Stable in-place sort. For price sorts, records without a price always
/// come last; the direction only reorders records that have one.
pub fn sort(records: &mut [&Record], key: SortKey) {
    records.sort_by(|a, b| compare(a, b, key));
}

fn compare(a: &Record, b: &Record, key: SortKey) -> Ordering {
    match key.field {
        SortField::Date => directed(a.date.cmp(&b.date), key.order),
        SortField::Price => match (a.price, b.price) {
            (Some(pa), Some(pb)) => directed(pa.amount.cmp(&pb.amount), key.order),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

fn directed(ord: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ord,
        SortOrder::Desc => ord.reverse(),
    }
}
