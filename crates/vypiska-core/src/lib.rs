pub mod error;
pub mod export;
pub mod extraction;
pub mod ledger;
pub mod model;
pub mod parsing;

use serde::Serialize;
use tracing::{info, warn};

use error::VypiskaError;
use extraction::lines::DEFAULT_Y_GRANULARITY;
use extraction::DocumentRenderer;
use ledger::{Ledger, DEFAULT_DEDUP_PREFIX_CHARS};
use parsing::{DocumentStats, StatementParser};

/// Tunables for a batch run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    /// Grid size for grouping fragment baselines into lines.
    pub y_granularity: f64,
    /// Description characters taken into the dedup key.
    pub dedup_prefix_chars: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            y_granularity: DEFAULT_Y_GRANULARITY,
            dedup_prefix_chars: DEFAULT_DEDUP_PREFIX_CHARS,
        }
    }
}

/// One input document of a batch.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        SourceDocument {
            name: name.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub name: String,
    #[serde(flatten)]
    pub stats: DocumentStats,
}

/// A document that could not be decoded. Its contribution to the batch is empty.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentFailure {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub ledger: Ledger,
    pub documents: Vec<DocumentReport>,
    pub failures: Vec<DocumentFailure>,
}

impl BatchOutcome {
    /// Fail with [`VypiskaError::NoTransactions`] when the whole batch produced
    /// nothing.
    pub fn ensure_transactions(&self) -> Result<(), VypiskaError> {
        if self.ledger.is_empty() {
            Err(VypiskaError::NoTransactions)
        } else {
            Ok(())
        }
    }
}

/// Main API entry point: turn a batch of statement documents into a ledger.
///
/// Documents are processed one after another. A document that fails to
/// decode is logged and recorded in `failures`; the rest of the batch still
/// runs. Transactions from all documents are then deduplicated, sorted by
/// date and totalled.
pub fn process_batch(
    documents: &[SourceDocument],
    renderer: &dyn DocumentRenderer,
    options: &PipelineOptions,
) -> BatchOutcome {
    let mut parser = StatementParser::new();
    let mut reports = Vec::new();
    let mut failures = Vec::new();

    for document in documents {
        let pages = match renderer.extract_pages(&document.bytes) {
            Ok(pages) => pages,
            Err(e) => {
                warn!(
                    document = %document.name,
                    backend = renderer.backend_name(),
                    error = %e,
                    "failed to decode document"
                );
                failures.push(DocumentFailure {
                    name: document.name.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let stats = parser.parse_document(&pages, options.y_granularity);
        info!(
            document = %document.name,
            pages = stats.pages,
            transactions = stats.transactions,
            fallback = stats.used_fallback,
            "parsed document"
        );
        reports.push(DocumentReport {
            name: document.name.clone(),
            stats,
        });
    }

    let ledger = Ledger::build(parser.into_transactions(), options.dedup_prefix_chars);

    BatchOutcome {
        ledger,
        documents: reports,
        failures,
    }
}
