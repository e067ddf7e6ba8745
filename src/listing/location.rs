//! Gazetteer matching over normalized listing text, plus free-text place
//! names read after field labels and address words.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::listing::gazetteer::{GAZETTEER, NUMBERED_DISTRICT_PREFIXES};

/// A gazetteer alias prepared for matching.
struct Alias {
    text: &'static str,
    /// Length in chars; longest match wins.
    len: usize,
    stem: bool,
    tag: &'static str,
}

static ALIASES: Lazy<Vec<Alias>> = Lazy::new(|| {
    GAZETTEER
        .iter()
        .flat_map(|place| {
            place.aliases.iter().map(move |raw| {
                let (text, stem) = match raw.strip_suffix('*') {
                    Some(stem) => (stem, true),
                    None => (*raw, false),
                };
                Alias {
                    text,
                    len: text.chars().count(),
                    stem,
                    tag: place.tag,
                }
            })
        })
        .collect()
});

static NUMBERED_DISTRICT: Lazy<Regex> = Lazy::new(|| {
    let prefixes = NUMBERED_DISTRICT_PREFIXES
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{prefixes}) ?([0-9]{{1,2}})\b")).unwrap()
});

/// Field labels whose value is a place name: `Area: Hoa Xuan`,
/// `Khu vực: ...`, `Район: ...`.
static AREA_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:area|khu vực|khu vuc|район|location|địa điểm|dia diem|vị trí|локация|расположение)\b ?[:\-] ?")
        .unwrap()
});

/// Address words followed by a street or ward name: `đường Lê Lợi`,
/// `phường An Hải Bắc`, `улица Ленина`, `ул. Ленина`.
static ADDRESS_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:(?:đường|duong|phường|phuong|улиц\p{L}*|вулиц\p{L}*)\b|ул\.) ?").unwrap()
});

/// Words that end a free-text place name ("Hoa Xuan *near* the beach").
const NAME_STOP_WORDS: &[&str] = &[
    "gần", "gan", "cách", "và", "có", "giá", "lớn", "chính", "nhỏ", "đi", "view", "near", "and",
    "with", "for", "close", "price", "rent", "и", "у", "возле", "рядом", "біля", "цена", "ціна",
    "недалеко",
];

/// Longest free-text name, in words.
const NAME_MAX_WORDS: usize = 4;

/// A match in the text (byte offsets).
#[derive(Debug, Clone)]
struct Candidate {
    start: usize,
    end: usize,
    len: usize,
    tag: String,
    /// Gazetteer alias or numbered district, as opposed to a free-text name
    /// read after a label or address word.
    known: bool,
}

impl Candidate {
    fn overlaps(&self, other: &Candidate) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Return the canonical location tags found in `normalized`, in order of
/// first occurrence, without case-insensitive duplicates.
///
/// Overlapping matches are resolved longest-first; ties go to the earlier
/// position, then to gazetteer order. Free-text names (labeled areas and
/// addresses) only fill the gaps: any overlapping gazetteer or district
/// match wins over them.
pub fn extract_locations(normalized: &str) -> Vec<String> {
    let mut candidates = gazetteer_candidates(normalized);
    candidates.extend(numbered_district_candidates(normalized));
    candidates.extend(free_text_candidates(normalized, &AREA_LABEL));
    candidates.extend(free_text_candidates(normalized, &ADDRESS_PREFIX));

    // Stable sort keeps gazetteer order for equal (known, len, start).
    candidates.sort_by(|a, b| {
        b.known
            .cmp(&a.known)
            .then(b.len.cmp(&a.len))
            .then(a.start.cmp(&b.start))
    });

    let mut accepted: Vec<Candidate> = Vec::new();
    for cand in candidates {
        if accepted.iter().any(|a| a.overlaps(&cand)) {
            continue;
        }
        accepted.push(cand);
    }
    accepted.sort_by_key(|c| c.start);

    let mut tags: Vec<String> = Vec::new();
    for cand in accepted {
        let lower = cand.tag.to_lowercase();
        if tags.iter().any(|t| t.to_lowercase() == lower) {
            continue;
        }
        tags.push(cand.tag);
    }

    if !tags.is_empty() {
        debug!("Locations: {tags:?}");
    }
    tags
}

fn gazetteer_candidates(text: &str) -> Vec<Candidate> {
    let mut out = Vec::new();
    for alias in ALIASES.iter() {
        for (start, m) in text.match_indices(alias.text) {
            let end = start + m.len();
            if !boundary_before(text, start) {
                continue;
            }
            if !alias.stem && !boundary_after(text, end) {
                continue;
            }
            out.push(Candidate {
                start,
                end,
                len: alias.len,
                tag: alias.tag.to_string(),
                known: true,
            });
        }
    }
    out
}

fn numbered_district_candidates(text: &str) -> Vec<Candidate> {
    NUMBERED_DISTRICT
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let number: u8 = caps.get(1)?.as_str().parse().ok()?;
            (number > 0).then(|| Candidate {
                start: whole.start(),
                end: whole.end(),
                len: whole.as_str().chars().count(),
                tag: format!("District {number}"),
                known: true,
            })
        })
        .collect()
}

fn free_text_candidates(text: &str, prefix: &Regex) -> Vec<Candidate> {
    prefix
        .find_iter(text)
        .filter_map(|m| {
            let (len, name) = take_place_name(&text[m.end()..])?;
            Some(Candidate {
                start: m.end(),
                end: m.end() + len,
                len: name.chars().count(),
                tag: title_case(&name),
                known: false,
            })
        })
        .collect()
}

/// Read up to [`NAME_MAX_WORDS`] letter-only words separated by single
/// spaces from the start of `rest`. Stops at anything else (digits,
/// punctuation, a line break) or at a stop word. Returns the byte length
/// consumed and the name.
fn take_place_name(rest: &str) -> Option<(usize, String)> {
    let mut words: Vec<&str> = Vec::new();
    let mut end = 0;
    let mut pos = 0;

    while words.len() < NAME_MAX_WORDS {
        let word_len: usize = rest[pos..]
            .chars()
            .take_while(|c| is_name_char(*c))
            .map(char::len_utf8)
            .sum();
        if word_len == 0 {
            break;
        }
        let word = &rest[pos..pos + word_len];
        if NAME_STOP_WORDS.contains(&word) {
            break;
        }
        // a word glued to a digit ("2pn") is not part of a name
        if rest[pos + word_len..].chars().next().is_some_and(|c| c.is_alphanumeric()) {
            break;
        }
        words.push(word);
        end = pos + word_len;
        if !rest[end..].starts_with(' ') {
            break;
        }
        pos = end + 1;
    }

    let name = words.join(" ");
    (name.chars().count() >= 2).then_some((end, name))
}

fn is_name_char(c: char) -> bool {
    c.is_alphabetic() || c == '\'' || ('\u{0300}'..='\u{036f}').contains(&c)
}

/// `hoa xuan` → `Hoa Xuan`.
fn title_case(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// A match must not continue a word on its left.
fn boundary_before(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .next_back()
        .is_none_or(|c| !is_word_char(c))
}

/// Full-word aliases must also end on a word boundary.
fn boundary_after(text: &str, end: usize) -> bool {
    text[end..].chars().next().is_none_or(|c| !is_word_char(c))
}

fn is_word_char(c: char) -> bool {
    // Combining marks belong to the letter before them (decomposed
    // Vietnamese tone marks).
    c.is_alphanumeric() || ('\u{0300}'..='\u{036f}').contains(&c)
}
