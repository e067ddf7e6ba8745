//! Single best price + currency from normalized listing text.
//!
//! Pattern classes are tried in a fixed order and the first class that
//! matches wins; there is no scoring across classes.

use once_cell::sync::Lazy;
use regex::{Captures, Match, Regex};
use tracing::debug;

use crate::listing::gazetteer::NUMBERED_DISTRICT_PREFIXES;
use crate::listing::{Currency, Price};

/// A number as it is written in listings: either digit groups of three
/// separated by `.`, `,` or a space (with an optional short decimal tail),
/// or plain digits with an optional decimal part.
const NUM: &str = r"([0-9]{1,3}(?:[., ][0-9]{3})+(?:[.,][0-9]{1,2})?|[0-9]+(?:[.,][0-9]+)?)";

/// Words that turn a "label + number" into a room count or a size rather
/// than a price ("for rent 2 bedrooms", "giá 3 phòng").
const UNIT_WORDS: &[&str] = &[
    "br", "bed", "bedroom", "bedrooms", "room", "rooms", "phòng", "pn", "wc", "m2", "m²", "sqm",
    "km", "min", "phút", "người", "people", "floor", "tầng", "комн", "спал", "кімн", "кв", "эт",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceClass {
    /// `15 triệu`, `12tr`, `20 млн`, `8 million vnd`
    VndMillion,
    /// `500 nghìn`, `300 тыс`, `500k`
    VndThousand,
    /// `15.000.000 vnd`, `7.000.000đ`
    VndExplicit,
    /// `$500`, `600 usd`, `700$`
    Usd,
    /// `price: 500`, `giá 15.000.000`, `ціна 400`
    Labeled,
    /// `700/month`, `12 000 000 в месяц`
    PerMonth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CurrencyRule {
    Fixed(Currency),
    /// No explicit marker: decided by [`Currency::infer`].
    Magnitude,
}

/// Tagged result of running one pattern class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternOutcome {
    Matched(Price),
    /// Pattern fired but the number could not be read.
    Malformed,
    Unmatched,
}

struct PricePattern {
    class: PriceClass,
    regex: Regex,
    multiplier: u64,
    currency: CurrencyRule,
    /// Bare-number classes: the number must end on a word boundary and
    /// must not be followed by a unit word.
    bare: bool,
}

impl PricePattern {
    fn new(
        class: PriceClass,
        src: &str,
        multiplier: u64,
        currency: CurrencyRule,
        bare: bool,
    ) -> Self {
        Self {
            class,
            regex: Regex::new(&src.replace("{NUM}", NUM)).unwrap(),
            multiplier,
            currency,
            bare,
        }
    }

    fn apply(&self, text: &str) -> PatternOutcome {
        let mut at = 0;
        while let Some(caps) = self.regex.captures_at(text, at) {
            let Some(whole) = caps.get(0) else {
                break;
            };
            // Skipped matches are retried one character further, so a price
            // glued to a district number ("quận 7 600$") is still found.
            at = whole.start() + text[whole.start()..].chars().next().map_or(1, char::len_utf8);
            let Some(token) = number_group(&caps) else {
                continue;
            };

            if follows_district_prefix(&text[..token.start()]) {
                debug!("{:?}: skipping {:?}, district number", self.class, whole.as_str());
                continue;
            }
            if self.bare && continues_word(&text[token.end()..]) {
                debug!("{:?}: skipping {:?}, number runs into a word", self.class, whole.as_str());
                continue;
            }
            if self.bare && followed_by_unit(&text[whole.end()..]) {
                debug!("{:?}: skipping {:?}, followed by a unit", self.class, whole.as_str());
                continue;
            }

            let token = token.as_str();
            let Some(amount) = parse_number(token).and_then(|n| scale(n, self.multiplier)) else {
                debug!("{:?}: malformed number {token:?}", self.class);
                return PatternOutcome::Malformed;
            };
            let currency = match self.currency {
                CurrencyRule::Fixed(c) => c,
                CurrencyRule::Magnitude => Currency::infer(amount),
            };
            return PatternOutcome::Matched(Price { amount, currency });
        }
        PatternOutcome::Unmatched
    }
}

/// Ordered pattern table. **Order matters**: explicit Vietnamese forms,
/// then explicit USD, then label / per-month forms that fall back to the
/// magnitude heuristic.
static PRICE_PATTERNS: Lazy<Vec<PricePattern>> = Lazy::new(|| {
    use CurrencyRule::{Fixed, Magnitude};
    use PriceClass::*;

    vec![
        PricePattern::new(
            VndMillion,
            r"\b{NUM} ?(?:triệu|trieu|million|mil|млн|tr)\b(?: ?(?:vnd|vnđ|₫|đồng|dong|đ))?",
            1_000_000,
            Fixed(Currency::Vnd),
            false,
        ),
        PricePattern::new(
            VndThousand,
            r"\b{NUM} ?(?:(?:nghìn|ngàn|thousand|k)\b|тыс\w*)",
            1_000,
            Fixed(Currency::Vnd),
            false,
        ),
        PricePattern::new(
            VndExplicit,
            r"\b{NUM} ?(?:(?:vnd|vnđ|đồng|dong|донг\w*|đ)\b|₫)",
            1,
            Fixed(Currency::Vnd),
            false,
        ),
        PricePattern::new(
            Usd,
            r"\$ ?{NUM}|\b{NUM} ?(?:(?:usd|dollars?|долл\w*)\b|\$)",
            1,
            Fixed(Currency::Usd),
            false,
        ),
        PricePattern::new(
            Labeled,
            r"\b(?:ціна|цена|price|giá|rent|аренда|оренда|thuê)\b ?[:=\-]? ?{NUM}",
            1,
            Magnitude,
            true,
        ),
        PricePattern::new(
            PerMonth,
            r"\b{NUM} ?(?:/ ?(?:month|mo|tháng|мес\w*|міс\w*)\b|(?:per month|a month|в месяц|на месяц)\b)",
            1,
            Magnitude,
            true,
        ),
    ]
});

/// Run each pattern class in priority order and return the first price
/// found. Misses and malformed numbers never fail: the result is `None`.
pub fn extract_price(normalized: &str) -> Option<Price> {
    for pattern in PRICE_PATTERNS.iter() {
        match pattern.apply(normalized) {
            PatternOutcome::Matched(price) => {
                debug!("Price {price} from {:?}", pattern.class);
                return Some(price);
            }
            PatternOutcome::Malformed | PatternOutcome::Unmatched => continue,
        }
    }
    None
}

/// Outcome of every class for `normalized`, in table order.
#[cfg(test)]
pub fn classify(normalized: &str) -> Vec<(PriceClass, PatternOutcome)> {
    PRICE_PATTERNS
        .iter()
        .map(|p| (p.class, p.apply(normalized)))
        .collect()
}

fn number_group<'t>(caps: &Captures<'t>) -> Option<Match<'t>> {
    caps.iter().skip(1).flatten().next()
}

/// `true` when `before` ends with a numbered-district prefix, i.e. the
/// number that follows is a district ("quận 7"), not a price.
fn follows_district_prefix(before: &str) -> bool {
    let before = before.trim_end_matches(' ');
    NUMBERED_DISTRICT_PREFIXES.iter().any(|prefix| {
        before
            .strip_suffix(prefix)
            .is_some_and(|rest| rest.chars().next_back().is_none_or(|c| !c.is_alphanumeric()))
    })
}

fn continues_word(rest: &str) -> bool {
    rest.chars().next().is_some_and(char::is_alphanumeric)
}

fn followed_by_unit(rest: &str) -> bool {
    let rest = rest.trim_start();
    let word: String = rest.chars().take_while(|c| c.is_alphanumeric() || *c == '²').collect();
    !word.is_empty() && UNIT_WORDS.iter().any(|u| word.starts_with(u))
}

/// Read a number token, resolving `.` / `,` / space as either digit-group
/// separators or a decimal mark.
///
/// * every group after the first has three digits → grouping (`1.500.000`)
/// * otherwise the last group, written after `.` or `,`, may be a decimal
///   tail as long as the groups before it are well formed (`1,500.50`, `12,5`)
/// * anything else is rejected
pub fn parse_number(token: &str) -> Option<f64> {
    let parts: Vec<&str> = token.split(['.', ',', ' ']).collect();
    if parts.iter().any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }

    let (head, tail) = parts.split_first()?;
    if tail.is_empty() {
        return head.parse::<u64>().ok().map(|n| n as f64);
    }

    let grouped = |groups: &[&str]| head.len() <= 3 && groups.iter().all(|g| g.len() == 3);
    if grouped(tail) {
        return parts.concat().parse::<u64>().ok().map(|n| n as f64);
    }

    let (frac, middle) = tail.split_last()?;
    let decimal_sep = token.as_bytes()[token.len() - frac.len() - 1];
    let well_formed = if middle.is_empty() {
        true
    } else {
        grouped(middle)
    };
    if decimal_sep == b' ' || !well_formed || frac.len() > 2 && !middle.is_empty() {
        return None;
    }

    let int_part: String = std::iter::once(*head).chain(middle.iter().copied()).collect();
    format!("{int_part}.{frac}").parse::<f64>().ok()
}

fn scale(value: f64, multiplier: u64) -> Option<u64> {
    let scaled = (value * multiplier as f64).round();
    (scaled.is_finite() && scaled >= 0.0 && scaled < u64::MAX as f64).then_some(scaled as u64)
}
