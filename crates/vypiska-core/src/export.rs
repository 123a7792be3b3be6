use std::io::Write;

use crate::error::VypiskaError;
use crate::ledger::Ledger;
use crate::model::{format_money, CURRENCY};

pub const COLUMNS: [&str; 5] = ["Дата", "Описание", "Сумма", "Валюта", "Тип"];

/// A rectangular-ish table handed to spreadsheet writers.
///
/// The leading rows are a title, a totals line and a blank spacer; they are
/// shorter than the data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTable {
    pub filename: String,
    pub header_rows: Vec<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

/// Build the export table for a ledger.
pub fn build_table(ledger: &Ledger) -> ExportTable {
    let totals = ledger.totals();
    let (title, filename) = match ledger.period() {
        Some((first, last)) => (
            format!("{first} - {last}"),
            format!("statement_{first}_{last}.csv"),
        ),
        None => (String::new(), "statement.csv".to_string()),
    };

    let header_rows = vec![
        vec!["Выписка".to_string(), title],
        vec![
            format!("Доходы: {} {CURRENCY}", format_money(totals.income)),
            format!("Расходы: {} {CURRENCY}", format_money(totals.expense)),
            format!("Баланс: {} {CURRENCY}", format_money(totals.balance)),
        ],
        vec![],
        COLUMNS.iter().map(|c| c.to_string()).collect(),
    ];

    let rows = ledger
        .transactions()
        .iter()
        .map(|tx| {
            vec![
                tx.date().to_string(),
                tx.description().to_string(),
                format_money(tx.amount().abs()),
                CURRENCY.to_string(),
                tx.kind().label().to_string(),
            ]
        })
        .collect();

    ExportTable {
        filename,
        header_rows,
        rows,
    }
}

/// Serialize an export table as CSV.
pub fn write_csv<W: Write>(table: &ExportTable, writer: W) -> Result<(), VypiskaError> {
    let mut csv = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    for row in table.header_rows.iter().chain(table.rows.iter()) {
        if row.is_empty() {
            csv.write_record([""])?;
        } else {
            csv.write_record(row)?;
        }
    }
    csv.into_inner()
        .map_err(|e| VypiskaError::Export(e.to_string()))?;
    Ok(())
}
