//! Pure text and value normalization used while building records.
//!
//! Numbers fail soft (unparsable input becomes `0.0`) while dates fail hard
//! (`None`), so the validator can tell a bad date apart from a zero amount.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

static SPECIAL_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z0-9_\s\-.,áéíóúÁÉÍÓÚñÑ]").expect("static regex")
});

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

static LEADING_FLOAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?(?:\d+(?:\.\d*)?|\.\d+)").expect("static regex"));

/// Formats tried after RFC 3339, in order. Slash dates are month-first;
/// day-first is only reached when month-first cannot be a real date.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// 去除重音符號 (NFD 分解後丟掉組合字元)，並修剪空白
pub fn strip_accents(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Drops anything outside word characters, whitespace, `-`, `.`, `,` and the
/// Spanish accented letters, then collapses whitespace runs.
pub fn strip_special_characters(text: &str) -> String {
    let kept = SPECIAL_CHARS.replace_all(text, "");
    WHITESPACE_RUN.replace_all(&kept, " ").trim().to_string()
}

/// Interprets `text` as a calendar date and returns it as `YYYY-MM-DD` (UTC).
pub fn parse_date(text: &str) -> Option<String> {
    parse_naive_date(text).map(|date| date.format(CANONICAL_DATE_FORMAT).to_string())
}

pub fn parse_naive_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    // 沒有時區的日期時間一律視為 UTC
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Keeps digits, `.` and `-`, then reads the longest leading float.
/// Anything unreadable is `0.0`.
pub fn parse_number(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    LEADING_FLOAT
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}
