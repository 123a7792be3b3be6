use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

/// Longest leading decimal number; trailing garbage is ignored.
static NUMERIC_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?(?:\d+(?:\.\d*)?|\.\d+)").expect("valid numeric prefix regex")
});

/// Parse a locale-formatted amount into a Decimal.
///
/// Handles formats like:
/// - "150.00" -> 150.00
/// - "1 234,56" -> 1234.56 (space thousands groups, decimal comma)
/// - "1\u{a0}234,56" -> 1234.56 (non-breaking space groups)
/// - "-75,50" -> -75.50
///
/// Only the leading number counts, so `"12.3.4"` reads as 12.3. Empty or
/// unparseable input yields zero, never an error.
pub fn parse_amount(s: &str) -> Decimal {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Decimal::ZERO;
    }
    let normalized = compact.replacen(',', ".", 1);
    let Some(prefix) = NUMERIC_PREFIX_RE.find(&normalized) else {
        return Decimal::ZERO;
    };
    let number = prefix.as_str().trim_end_matches('.');
    let unsigned = number.strip_prefix('+').unwrap_or(number);
    Decimal::from_str(unsigned).unwrap_or(Decimal::ZERO)
}
