use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency code recognized on statements.
pub const CURRENCY: &str = "BYN";

/// Maximum length of a transaction description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// Largest absolute amount a transaction may carry. Anything above is a
/// misread id or balance, never a real statement row.
pub const MAX_ABS_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Description used when a row carries no text at all.
pub const DEFAULT_DESCRIPTION: &str = "Операция";

/// Date format used on statements and in the ledger.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    /// Label used in exported tables.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Доход",
            TransactionKind::Expense => "Расход",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "income"),
            TransactionKind::Expense => write!(f, "expense"),
        }
    }
}

/// A single statement transaction.
///
/// The sign of `amount` decides the kind: positive is income, negative is
/// expense. Zero amounts are never constructed. Only the description can
/// change after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    date: String,
    description: String,
    amount: Decimal,
    #[serde(rename = "type")]
    kind: TransactionKind,
}

impl Transaction {
    /// Build a transaction, or `None` if `amount` is zero or above
    /// [`MAX_ABS_AMOUNT`].
    ///
    /// The description is trimmed, capped at [`MAX_DESCRIPTION_CHARS`] and
    /// replaced by [`DEFAULT_DESCRIPTION`] when empty.
    pub fn new(date: impl Into<String>, description: &str, amount: Decimal) -> Option<Self> {
        if amount.is_zero() || amount.abs() > MAX_ABS_AMOUNT {
            return None;
        }
        let kind = if amount.is_sign_positive() {
            TransactionKind::Income
        } else {
            TransactionKind::Expense
        };
        let description = match truncate_chars(description.trim(), MAX_DESCRIPTION_CHARS) {
            d if d.is_empty() => DEFAULT_DESCRIPTION.to_string(),
            d => d,
        };
        Some(Transaction {
            date: date.into(),
            description,
            amount,
            kind,
        })
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// Calendar date parsed from the `DD.MM.YYYY` string.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }

    /// Append a wrapped continuation line to the description.
    pub fn append_description(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let joined = format!("{} {}", self.description, text);
        self.description = truncate_chars(joined.trim(), MAX_DESCRIPTION_CHARS);
    }
}

/// Build a description from an optional operation type and free-text remainder.
pub fn join_description(operation: Option<&str>, details: Option<&str>) -> String {
    [operation, details]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Round to cents, halves away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Amount with exactly two decimals, e.g. `1.005` as `1.01`.
pub fn format_money(amount: Decimal) -> String {
    format!("{:.2}", round_money(amount))
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
