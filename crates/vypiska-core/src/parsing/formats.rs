//! Statement row formats.
//!
//! Each [`LineFormat`] turns one normalized line into at most one
//! [`Transaction`]. Formats are tried in [`CHAIN`] order and the first one
//! that accepts the line wins, so stricter shapes come before looser ones.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use super::amount::parse_amount;
use crate::model::{join_description, Transaction, CURRENCY};

const DATE: &str = r"\d{2}\.\d{2}\.\d{4}";

/// Amount with optional sign, space-separated thousands and a decimal part.
const NUM: &str = r"[-+]?\d+(?: \d{3})*(?:[.,]\d+)?";

fn compile(template: &str) -> Regex {
    let pattern = template
        .replace("<DATE>", DATE)
        .replace("<NUM>", NUM)
        .replace("<CCY>", CURRENCY);
    Regex::new(&pattern).expect("valid statement regex")
}

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| compile("<DATE>"));

static HEADER_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)итого|остаток на|выписка|период|дата и время|дата создания операции|дата отражения|владелец сч[её]та",
    )
    .expect("valid header marker regex")
});

/// `<date> <time> [<date> <time>] <id> <operation> <income> <expense> <balance> <CCY> <details>`
static THREE_COLUMN_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"^(?P<date><DATE>)\s+\d{2}:\d{2}(?:\s+<DATE>\s+\d{2}:\d{2})?\s+\d+\s+",
        r"(?P<operation>.+?)\s+",
        r"(?P<income><NUM>)\s+(?P<expense><NUM>)\s+(?P<balance><NUM>)\s+<CCY>",
        r"(?P<details>.*)$"
    ))
});

/// `<date> <time:ss> <date> <operation> <secondary> <CCY> <amount> <CCY> <details>`
static DUAL_CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"^(?P<date><DATE>)\s+\d{2}:\d{2}:\d{2}\s+<DATE>\s+",
        r"(?P<operation>.+?)\s+",
        r"(?P<secondary><NUM>)\s+<CCY>\s+(?P<amount><NUM>)\s+<CCY>",
        r"(?P<details>.*)$"
    ))
});

/// `<number> <number> <CCY>` anywhere in the line.
static AMOUNT_PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?:^|\s)(?P<first><NUM>)\s+(?P<second><NUM>)\s+<CCY>"));

/// Leading dates, times and numeric ids ahead of the description text.
static LEADING_STAMPS_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^(?:(?:<DATE>|\d{2}:\d{2}(?::\d{2})?|\d+)(?:\s+|$))+"));

/// Date-time stamps, dates and times consumed before scanning for amounts.
static STAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"<DATE>(?:\s+\d{2}:\d{2}(?::\d{2})?)?|\b\d{2}:\d{2}(?::\d{2})?\b")
});

static AMOUNT_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?\d+(?:[.,]\d{1,2})?$").expect("valid amount token regex"));

/// Description markers for money coming in. Checked before expense markers,
/// since "входящий перевод" is income.
const INCOME_KEYWORDS: &[&str] = &[
    "зачислен",
    "поступлен",
    "пополнен",
    "входящ",
    "возврат",
    "зарплат",
    "начислен",
    "кэшбэк",
    "cashback",
];

/// Description markers for purchases, transfers out and withdrawals.
const EXPENSE_KEYWORDS: &[&str] = &[
    "оплат",
    "покупк",
    "списан",
    "перевод",
    "снятие",
    "выдач",
    "комисси",
    "платеж",
    "платёж",
    "погашен",
];

/// One statement layout heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFormat {
    /// Fixed income / expense / balance columns followed by the currency code.
    ThreeColumn,
    /// Two currency-tagged amounts; the second one is the signed transaction.
    DualCurrency,
    /// Last `<number> <number> <CCY>` pair in an otherwise irregular row.
    LooseFloat,
    /// Description keywords plus the first plausible amount in the line.
    KeywordAmount,
}

/// Priority order of the line formats.
pub const CHAIN: [LineFormat; 4] = [
    LineFormat::ThreeColumn,
    LineFormat::DualCurrency,
    LineFormat::LooseFloat,
    LineFormat::KeywordAmount,
];

impl LineFormat {
    pub fn name(&self) -> &'static str {
        match self {
            LineFormat::ThreeColumn => "three-column",
            LineFormat::DualCurrency => "dual-currency",
            LineFormat::LooseFloat => "loose-float",
            LineFormat::KeywordAmount => "keyword-amount",
        }
    }

    /// Try this format on a normalized line.
    pub fn parse(&self, line: &str) -> Option<Transaction> {
        match self {
            LineFormat::ThreeColumn => parse_three_column(line),
            LineFormat::DualCurrency => parse_dual_currency(line),
            LineFormat::LooseFloat => parse_loose_float(line),
            LineFormat::KeywordAmount => parse_keyword_amount(line),
        }
    }
}

/// Collapse whitespace runs (including non-breaking spaces) to single spaces.
pub fn normalize_line(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn has_date(line: &str) -> bool {
    DATE_RE.is_match(line)
}

/// Totals, balance headers, statement banners and similar non-transaction rows.
pub fn is_header_marker(line: &str) -> bool {
    HEADER_MARKER_RE.is_match(line)
}

/// Run the pre-filter and the format chain on one normalized line.
pub fn parse_line(line: &str) -> Option<(LineFormat, Transaction)> {
    if !has_date(line) || is_header_marker(line) {
        return None;
    }
    CHAIN
        .iter()
        .find_map(|format| format.parse(line).map(|tx| (*format, tx)))
}

/// Income when only the first column is set, expense when only the second is.
fn strict_pair(income: Decimal, expense: Decimal) -> Option<Decimal> {
    if income > Decimal::ZERO && expense.is_zero() {
        Some(income)
    } else if expense > Decimal::ZERO && income.is_zero() {
        Some(-expense)
    } else {
        None
    }
}

/// Lossy pair reading for malformed rows.
///
/// When both numbers are set and differ, the smaller one is read as the
/// income column and the larger as the expense column, which always ends up
/// as an expense of the larger value. This is an approximation: a row holding
/// an amount next to a running balance is read as an expense of the balance.
fn loose_pair(first: Decimal, second: Decimal) -> Option<Decimal> {
    let (income, expense) = if !first.is_zero() && !second.is_zero() && first != second {
        (first.min(second), first.max(second))
    } else {
        (first, second)
    };
    if income > Decimal::ZERO && expense.is_zero() {
        Some(income)
    } else if expense > Decimal::ZERO {
        Some(-expense)
    } else {
        None
    }
}

/// Rows with a fixed-column shape belong to the strict formats even when
/// those reject them.
fn has_fixed_column_shape(line: &str) -> bool {
    THREE_COLUMN_RE.is_match(line) || DUAL_CURRENCY_RE.is_match(line)
}

fn first_date(line: &str) -> Option<&str> {
    DATE_RE.find(line).map(|m| m.as_str())
}

fn parse_three_column(line: &str) -> Option<Transaction> {
    let caps = THREE_COLUMN_RE.captures(line)?;
    let income = parse_amount(&caps["income"]);
    let expense = parse_amount(&caps["expense"]);
    let amount = strict_pair(income, expense)?;
    let description = join_description(
        caps.name("operation").map(|m| m.as_str()),
        caps.name("details").map(|m| m.as_str()),
    );
    Transaction::new(&caps["date"], &description, amount)
}

fn parse_dual_currency(line: &str) -> Option<Transaction> {
    let caps = DUAL_CURRENCY_RE.captures(line)?;
    let amount = parse_amount(&caps["amount"]);
    if amount.abs() < noise_floor() {
        return None;
    }
    let description = join_description(
        caps.name("operation").map(|m| m.as_str()),
        caps.name("details").map(|m| m.as_str()),
    );
    Transaction::new(&caps["date"], &description, amount)
}

/// One hundredth of the 0.01 minor unit; anything smaller is rounding noise.
fn noise_floor() -> Decimal {
    Decimal::new(1, 4)
}

fn parse_loose_float(line: &str) -> Option<Transaction> {
    if has_fixed_column_shape(line) {
        return None;
    }
    let date = first_date(line)?;
    let caps = AMOUNT_PAIR_RE.captures_iter(line).last()?;
    let whole = caps.get(0)?;
    let amount = loose_pair(parse_amount(&caps["first"]), parse_amount(&caps["second"]))?;

    let prefix = &line[..whole.start()];
    let operation = LEADING_STAMPS_RE.replace(prefix, "");
    let description = join_description(Some(operation.as_ref()), Some(&line[whole.end()..]));
    Transaction::new(date, &description, amount)
}

/// Scan a line (or a fallback text segment) for a keyword-classified amount.
///
/// Lines with a `<number> <number> <CCY>` pair belong to the column formats
/// and are declined even when those rejected them.
pub(crate) fn parse_keyword_amount(line: &str) -> Option<Transaction> {
    if has_fixed_column_shape(line) || AMOUNT_PAIR_RE.is_match(line) {
        return None;
    }
    let date = first_date(line)?;

    let lower = line.to_lowercase();
    let income = if INCOME_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        true
    } else if EXPENSE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        false
    } else {
        return None;
    };

    let remainder = STAMP_RE.replace_all(line, " ");
    let tokens = merge_thousands_groups(&remainder);
    let picked = pick_amount(&tokens)?;
    let value = parse_amount(&tokens[picked]).abs();
    let amount = if income { value } else { -value };

    let words: Vec<&str> = tokens
        .iter()
        .enumerate()
        .filter(|(i, t)| *i != picked && t.as_str() != CURRENCY)
        .map(|(_, t)| t.as_str())
        .skip_while(|t| t.chars().all(|c| c.is_ascii_digit()))
        .collect();
    Transaction::new(date, &words.join(" "), amount)
}

/// Split into whitespace tokens, re-joining `1 234 567,89` style groups.
fn merge_thousands_groups(text: &str) -> Vec<String> {
    let raw: Vec<&str> = text.split_whitespace().collect();
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        let head = raw[i];
        let mut merged = head.to_string();
        let mut j = i + 1;
        if is_group_head(head) {
            while j < raw.len() && is_group_tail(raw[j]) {
                merged.push(' ');
                merged.push_str(raw[j]);
                j += 1;
                if raw[j - 1].len() > 3 {
                    break;
                }
            }
        }
        out.push(merged);
        i = j;
    }

    out
}

fn is_group_head(token: &str) -> bool {
    let digits = token.trim_start_matches(['-', '+']);
    (1..=3).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

fn is_group_tail(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() >= 3
        && bytes[..3].iter().all(u8::is_ascii_digit)
        && (bytes.len() == 3
            || (matches!(bytes[3], b'.' | b',')
                && bytes.len() > 4
                && bytes[4..].iter().all(u8::is_ascii_digit)))
}

/// Index of the amount token: the first one with a fractional part, otherwise
/// the first plain integer. Ids (8 or 9 bare digits) and out-of-range values
/// never qualify.
fn pick_amount(tokens: &[String]) -> Option<usize> {
    let max = Decimal::new(1_000_000, 0);
    let qualifying: Vec<(usize, bool)> = tokens
        .iter()
        .enumerate()
        .filter_map(|(i, token)| {
            let compact: String = token.chars().filter(|c| !c.is_whitespace()).collect();
            if !AMOUNT_TOKEN_RE.is_match(&compact) {
                return None;
            }
            let has_fraction = compact.contains(['.', ',']);
            let digits = compact.chars().filter(|c| c.is_ascii_digit()).count();
            if !has_fraction && (digits == 8 || digits == 9) {
                return None;
            }
            let value = parse_amount(&compact).abs();
            if value.is_zero() || value > max {
                return None;
            }
            Some((i, has_fraction))
        })
        .collect();

    qualifying
        .iter()
        .find(|(_, has_fraction)| *has_fraction)
        .or_else(|| qualifying.first())
        .map(|(i, _)| *i)
}
