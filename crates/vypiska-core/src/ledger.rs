use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::model::{round_money, Transaction, TransactionKind};

/// Default number of description characters that take part in the dedup key.
pub const DEFAULT_DEDUP_PREFIX_CHARS: usize = 30;

/// Income and expense sums over a ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

/// The deduplicated, chronologically ordered transactions of one batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Ledger {
    transactions: Vec<Transaction>,
    totals: Totals,
}

impl Ledger {
    /// Deduplicate, sort and total a batch of transactions.
    pub fn build(transactions: Vec<Transaction>, dedup_prefix_chars: usize) -> Self {
        let mut transactions = dedup(transactions, dedup_prefix_chars);
        sort_chronologically(&mut transactions);
        let totals = aggregate(&transactions);
        Ledger {
            transactions,
            totals,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Dates of the first and last transaction.
    pub fn period(&self) -> Option<(&str, &str)> {
        let first = self.transactions.first()?;
        let last = self.transactions.last()?;
        Some((first.date(), last.date()))
    }
}

/// Remove later transactions that repeat an earlier one.
///
/// Two transactions are duplicates when they share the date, the amount
/// rounded to cents and the first `prefix_chars` characters of the
/// description. First-seen order is kept.
pub fn dedup(transactions: Vec<Transaction>, prefix_chars: usize) -> Vec<Transaction> {
    let mut seen: HashSet<(String, Decimal, String)> = HashSet::new();
    transactions
        .into_iter()
        .filter(|tx| {
            let key = (
                tx.date().to_string(),
                round_money(tx.amount()).normalize(),
                tx.description().chars().take(prefix_chars).collect::<String>(),
            );
            seen.insert(key)
        })
        .collect()
}

/// Stable sort by calendar date. Unparseable dates go last.
pub fn sort_chronologically(transactions: &mut [Transaction]) {
    transactions.sort_by_key(|tx| {
        let date = tx.calendar_date();
        (date.is_none(), date)
    });
}

/// Sum absolute amounts per kind; balance is income minus expense.
///
/// Sums saturate at `Decimal::MAX` instead of overflowing.
pub fn aggregate(transactions: &[Transaction]) -> Totals {
    let mut totals = Totals::default();
    for tx in transactions {
        let sum = match tx.kind() {
            TransactionKind::Income => &mut totals.income,
            TransactionKind::Expense => &mut totals.expense,
        };
        *sum = saturating_add(*sum, tx.amount().abs());
    }
    totals.balance = totals.income - totals.expense;
    totals
}

fn saturating_add(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or(Decimal::MAX)
}
