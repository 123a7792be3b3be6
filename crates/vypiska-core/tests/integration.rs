//! Integration tests for the process_batch() end-to-end pipeline.
//!
//! Uses a MockRenderer that returns pre-built fragments keyed by the
//! document bytes, so these tests run without poppler-utils.

use std::collections::HashMap;

use rust_decimal_macros::dec;
use vypiska_core::error::VypiskaError;
use vypiska_core::extraction::{DocumentRenderer, PageFragments, PositionedFragment};
use vypiska_core::model::TransactionKind;
use vypiska_core::{process_batch, PipelineOptions, SourceDocument};

struct MockRenderer {
    documents: HashMap<String, Vec<PageFragments>>,
}

impl MockRenderer {
    fn new() -> Self {
        MockRenderer {
            documents: HashMap::new(),
        }
    }

    fn with(mut self, key: &str, pages: Vec<PageFragments>) -> Self {
        self.documents.insert(key.to_string(), pages);
        self
    }
}

impl DocumentRenderer for MockRenderer {
    fn extract_pages(&self, document: &[u8]) -> Result<Vec<PageFragments>, VypiskaError> {
        let key = String::from_utf8_lossy(document).to_string();
        self.documents
            .get(&key)
            .cloned()
            .ok_or_else(|| VypiskaError::Extraction(format!("not a PDF: {key}")))
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

fn page(number: usize, fragments: &[(&str, f64, f64)]) -> PageFragments {
    PageFragments {
        page_number: number,
        fragments: fragments
            .iter()
            .map(|(text, x, y)| PositionedFragment::new(*text, *x, *y))
            .collect(),
    }
}

/// One page with each string on its own row, top to bottom.
fn rows(number: usize, lines: &[&str]) -> PageFragments {
    PageFragments {
        page_number: number,
        fragments: lines
            .iter()
            .enumerate()
            .map(|(i, text)| PositionedFragment::new(*text, 0.0, 800.0 - 12.0 * i as f64))
            .collect(),
    }
}

fn doc(key: &str) -> SourceDocument {
    SourceDocument::new(format!("{key}.pdf"), key.as_bytes().to_vec())
}

// ---------------------------------------------------------------------------
// Scenario A: scattered fragments rebuild into one income row
// ---------------------------------------------------------------------------
#[test]
fn fragments_reconstruct_into_income_row() {
    let renderer = MockRenderer::new().with(
        "a",
        vec![page(
            1,
            &[
                ("BYN", 110.0, 100.0),
                ("150.00", 50.0, 100.0),
                ("15.03.2024 10:00 123456 Перевод", 0.0, 100.0),
                ("500.00", 90.0, 100.0),
                ("0.00", 70.0, 100.0),
            ],
        )],
    );

    let outcome = process_batch(&[doc("a")], &renderer, &PipelineOptions::default());

    let txs = outcome.ledger.transactions();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].date(), "15.03.2024");
    assert_eq!(txs[0].amount(), dec!(150.00));
    assert_eq!(txs[0].kind(), TransactionKind::Income);
}

// ---------------------------------------------------------------------------
// Scenario B: second column set means expense
// ---------------------------------------------------------------------------
#[test]
fn second_column_is_expense() {
    let renderer = MockRenderer::new().with(
        "b",
        vec![page(
            1,
            &[
                ("15.03.2024 10:00 123456 Перевод", 0.0, 100.0),
                ("0.00", 50.0, 100.0),
                ("75.50", 70.0, 100.0),
                ("500.00", 90.0, 100.0),
                ("BYN", 110.0, 100.0),
            ],
        )],
    );

    let outcome = process_batch(&[doc("b")], &renderer, &PipelineOptions::default());

    let txs = outcome.ledger.transactions();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].amount(), dec!(-75.50));
    assert_eq!(txs[0].kind(), TransactionKind::Expense);
}

// ---------------------------------------------------------------------------
// Scenario C: the same transaction in two documents is kept once
// ---------------------------------------------------------------------------
#[test]
fn duplicate_across_documents_is_removed() {
    let row = "01.01.2024 09:00 777 Перевод на карту 100.00 0.00 900.00 BYN";
    let renderer = MockRenderer::new()
        .with("jan", vec![rows(1, &[row])])
        .with("jan-copy", vec![rows(1, &["Выписка по счету", row])]);

    let outcome = process_batch(
        &[doc("jan"), doc("jan-copy")],
        &renderer,
        &PipelineOptions::default(),
    );

    assert_eq!(outcome.documents.len(), 2);
    assert_eq!(outcome.documents[1].stats.transactions, 1);
    let txs = outcome.ledger.transactions();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].date(), "01.01.2024");
    assert_eq!(txs[0].amount(), dec!(100.00));
    assert!(txs[0].description().starts_with("Перевод"));
}

// ---------------------------------------------------------------------------
// Scenario D: wrapped description lines
// ---------------------------------------------------------------------------
#[test]
fn continuation_lines_extend_previous_transaction() {
    let renderer = MockRenderer::new().with(
        "d",
        vec![rows(
            1,
            &[
                "Клиент банка",
                "15.03.2024 10:00 123456 Перевод 150.00 0.00 500.00 BYN",
                "доп. информация",
            ],
        )],
    );

    let outcome = process_batch(&[doc("d")], &renderer, &PipelineOptions::default());

    let txs = outcome.ledger.transactions();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].description(), "Перевод доп. информация");
    assert_eq!(outcome.documents[0].stats.continuations, 1);
}

#[test]
fn continuation_does_not_cross_documents() {
    let renderer = MockRenderer::new()
        .with(
            "first",
            vec![rows(1, &["15.03.2024 10:00 1 Перевод 150.00 0.00 500.00 BYN"])],
        )
        .with(
            "second",
            vec![rows(
                1,
                &[
                    "хвост чужой строки",
                    "16.03.2024 10:00 2 Оплата 0.00 10.00 490.00 BYN",
                ],
            )],
        );

    let outcome = process_batch(
        &[doc("first"), doc("second")],
        &renderer,
        &PipelineOptions::default(),
    );

    let txs = outcome.ledger.transactions();
    assert_eq!(txs.len(), 2);
    assert_eq!(txs[0].description(), "Перевод");
    assert_eq!(txs[1].description(), "Оплата");
}

// ---------------------------------------------------------------------------
// Scenario E: id-only lines never become transactions
// ---------------------------------------------------------------------------
#[test]
fn id_only_line_is_rejected() {
    let renderer = MockRenderer::new().with(
        "e",
        vec![rows(
            1,
            &[
                "20.03.2024 123456789",
                "20.03.2024 12:00 Оплата 123456789",
            ],
        )],
    );

    let outcome = process_batch(&[doc("e")], &renderer, &PipelineOptions::default());

    assert!(outcome.ledger.is_empty());
    assert!(outcome.documents[0].stats.used_fallback);
}

// ---------------------------------------------------------------------------
// Decode failures are per document
// ---------------------------------------------------------------------------
#[test]
fn decode_failure_does_not_abort_batch() {
    let renderer = MockRenderer::new().with(
        "good",
        vec![rows(1, &["15.03.2024 10:00 1 Перевод 150.00 0.00 500.00 BYN"])],
    );

    let outcome = process_batch(
        &[doc("broken"), doc("good")],
        &renderer,
        &PipelineOptions::default(),
    );

    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].name, "broken.pdf");
    assert!(outcome.failures[0].reason.contains("not a PDF"));
    assert_eq!(outcome.ledger.len(), 1);
}

// ---------------------------------------------------------------------------
// Mixed formats across pages, sorted by calendar date, with totals
// ---------------------------------------------------------------------------
#[test]
fn mixed_formats_sorted_and_totalled() {
    let renderer = MockRenderer::new().with(
        "mixed",
        vec![
            rows(
                1,
                &[
                    "Выписка за период 01.01.2024 - 31.01.2024",
                    "Дата и время Описание Приход Расход Остаток",
                    "20.01.2024 10:00 11 Зачисление зарплаты 1 000,00 0,00 1 200,00 BYN",
                    "05.01.2024 12:00:00 06.01.2024 Покупка Евроопт 19,90 BYN -20,00 BYN",
                ],
            ),
            rows(
                2,
                &[
                    "31.12.2023 Оплата связи 0,00 30,00 BYN",
                    "Остаток на 31.01.2024 1 150,00 BYN",
                    "Итого: 1 000,00 50,00",
                ],
            ),
        ],
    );

    let outcome = process_batch(&[doc("mixed")], &renderer, &PipelineOptions::default());

    let dates: Vec<&str> = outcome
        .ledger
        .transactions()
        .iter()
        .map(|t| t.date())
        .collect();
    assert_eq!(dates, vec!["31.12.2023", "05.01.2024", "20.01.2024"]);

    let totals = outcome.ledger.totals();
    assert_eq!(totals.income, dec!(1000.00));
    assert_eq!(totals.expense, dec!(50.00));
    assert_eq!(totals.balance, dec!(950.00));
    assert_eq!(outcome.ledger.period(), Some(("31.12.2023", "20.01.2024")));
}

// ---------------------------------------------------------------------------
// Whole-document fallback when rows never break into lines
// ---------------------------------------------------------------------------
#[test]
fn whole_document_fallback_recovers_glued_rows() {
    let renderer = MockRenderer::new().with(
        "glued",
        vec![page(
            1,
            &[
                ("Выписка 01.03.2024 10:00 Оплата кафе 5,00 BYN", 0.0, 100.0),
                ("02.03.2024 11:00 Пополнение 70,00 BYN", 300.0, 100.0),
            ],
        )],
    );

    let outcome = process_batch(&[doc("glued")], &renderer, &PipelineOptions::default());

    assert!(outcome.documents[0].stats.used_fallback);
    assert_eq!(outcome.ledger.len(), 2);
    assert_eq!(outcome.ledger.totals().balance, dec!(65.00));
}

#[test]
fn empty_batch_yields_empty_ledger() {
    let renderer = MockRenderer::new();
    let outcome = process_batch(&[], &renderer, &PipelineOptions::default());
    assert!(outcome.ledger.is_empty());
    assert!(outcome.failures.is_empty());
    assert!(matches!(
        outcome.ensure_transactions(),
        Err(VypiskaError::NoTransactions)
    ));
}

#[test]
fn non_empty_batch_passes_transaction_check() {
    let renderer = MockRenderer::new().with(
        "one",
        vec![rows(1, &["15.03.2024 10:00 1 Перевод 150.00 0.00 500.00 BYN"])],
    );
    let outcome = process_batch(&[doc("one")], &renderer, &PipelineOptions::default());
    assert!(outcome.ensure_transactions().is_ok());
}

// ---------------------------------------------------------------------------
// Absurd amounts are dropped instead of overflowing the totals
// ---------------------------------------------------------------------------
#[test]
fn oversized_amounts_do_not_break_totals() {
    let lines: Vec<String> = (1..=9)
        .map(|i| format!("15.03.2024 10:00 1 Зачисление{i} 9999999999999999999999999999 0 0 BYN"))
        .chain(std::iter::once(
            "16.03.2024 10:00 2 Зачисление 50.00 0.00 50.00 BYN".to_string(),
        ))
        .collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let renderer = MockRenderer::new().with("huge", vec![rows(1, &refs)]);

    let outcome = process_batch(&[doc("huge")], &renderer, &PipelineOptions::default());

    assert_eq!(outcome.ledger.len(), 1);
    assert_eq!(outcome.ledger.totals().income, dec!(50.00));
}
