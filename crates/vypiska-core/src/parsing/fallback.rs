use std::sync::LazyLock;

use regex::Regex;

use super::formats::{is_header_marker, parse_keyword_amount};
use crate::model::Transaction;

static DATE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{2}\.\d{2}\.\d{4}\s+\d{2}:\d{2}(?::\d{2})?").expect("valid date-time regex")
});

/// Split the concatenated text of a document at every date-time stamp.
///
/// Each segment runs from one stamp up to the next. Text before the first
/// stamp is discarded.
pub fn split_segments(text: &str) -> Vec<&str> {
    let starts: Vec<usize> = DATE_TIME_RE.find_iter(text).map(|m| m.start()).collect();
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            text[start..end].trim()
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// Token-scan a whole document whose rows never broke into lines cleanly.
///
/// Segments carrying a header, footer or summary marker are skipped, the same
/// as whole lines are.
pub fn scan_document(text: &str) -> Vec<Transaction> {
    split_segments(text)
        .into_iter()
        .filter(|segment| !is_header_marker(segment))
        .filter_map(parse_keyword_amount)
        .collect()
}
