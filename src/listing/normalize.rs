//! Canonical matching form of listing text.
//!
//! The normalized string is only used for matching; the raw text is kept
//! verbatim on the record for display and blacklist checks.

use unicode_normalization::UnicodeNormalization;

/// Compose to NFC, lowercase, collapse whitespace runs and map the
/// typographic variants that show up around numbers onto their ASCII forms.
///
/// A whitespace run that contains a line break collapses to a single `\n`,
/// any other run to a single space. Line breaks are kept because labeled
/// fields ("Area: ...") end at the end of their line.
///
/// `.` and `,` are left alone: whether they are thousands separators or a
/// decimal mark is decided by the price parser.
///
/// Idempotent: every character this produces is a fixed point of the same
/// mapping.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending: Option<char> = None;

    for ch in text.nfc().flat_map(char::to_lowercase) {
        let ch = canonical_char(ch);
        if ch.is_whitespace() {
            if !out.is_empty() {
                pending = match (pending, is_line_break(ch)) {
                    (Some('\n'), _) | (_, true) => Some('\n'),
                    _ => Some(' '),
                };
            }
            continue;
        }
        if let Some(sep) = pending.take() {
            out.push(sep);
        }
        out.push(ch);
    }

    out
}

fn is_line_break(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{0085}' | '\u{2028}' | '\u{2029}')
}

/// Per-character canonicalization applied after lowercasing.
fn canonical_char(ch: char) -> char {
    match ch {
        // no-break / narrow no-break / thin spaces are used as digit group
        // separators in RU and VN listings
        '\u{00a0}' | '\u{202f}' | '\u{2009}' | '\u{2007}' => ' ',
        // fullwidth digits and separators (VN keyboards, copy-paste)
        '０'..='９' => char::from(b'0' + (ch as u32 - '０' as u32) as u8),
        '，' => ',',
        '．' => '.',
        '＄' => '$',
        // dashes
        '\u{2010}'..='\u{2015}' | '\u{2212}' => '-',
        // apostrophes / quotes
        '\u{2018}' | '\u{2019}' | '\u{02bc}' => '\'',
        _ => ch,
    }
}
