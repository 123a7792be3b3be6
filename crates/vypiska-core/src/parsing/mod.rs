pub mod amount;
pub mod fallback;
pub mod formats;

use serde::Serialize;
use tracing::{debug, trace};

use crate::extraction::lines::reconstruct_lines;
use crate::extraction::PageFragments;
use crate::model::Transaction;
use formats::{has_date, is_header_marker, normalize_line, parse_line, LineFormat};

/// Lines this short never extend a description.
const MIN_CONTINUATION_CHARS: usize = 4;

/// What happened to a single text line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Parsed(LineFormat),
    Continuation,
    Rejected,
    Empty,
}

/// Per-document parsing statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    pub pages: usize,
    pub lines: usize,
    pub transactions: usize,
    pub continuations: usize,
    pub rejected: usize,
    pub used_fallback: bool,
}

/// Accumulates transactions across the documents of one batch.
///
/// Continuation lines only ever extend a transaction from the document being
/// parsed; [`StatementParser::begin_document`] forgets the previous one.
#[derive(Debug, Default)]
pub struct StatementParser {
    transactions: Vec<Transaction>,
    last: Option<usize>,
}

impl StatementParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new document: the next continuation line has nothing to extend
    /// until a transaction is parsed.
    pub fn begin_document(&mut self) {
        self.last = None;
    }

    /// Feed one raw text line through the format chain or the continuation merger.
    pub fn feed_line(&mut self, raw: &str) -> LineOutcome {
        let line = normalize_line(raw);
        if line.is_empty() {
            return LineOutcome::Empty;
        }

        if !has_date(&line) {
            return self.continue_description(&line);
        }

        match parse_line(&line) {
            Some((format, tx)) => {
                trace!(format = format.name(), line = %line, "parsed transaction");
                self.transactions.push(tx);
                self.last = Some(self.transactions.len() - 1);
                LineOutcome::Parsed(format)
            }
            None => {
                debug!(line = %line, "no format matched");
                LineOutcome::Rejected
            }
        }
    }

    fn continue_description(&mut self, line: &str) -> LineOutcome {
        if is_header_marker(line) || line.chars().count() < MIN_CONTINUATION_CHARS {
            return LineOutcome::Rejected;
        }
        match self.last.and_then(|i| self.transactions.get_mut(i)) {
            Some(tx) => {
                tx.append_description(line);
                LineOutcome::Continuation
            }
            None => LineOutcome::Rejected,
        }
    }

    /// Parse every page of one document.
    ///
    /// If no line produced a transaction, the concatenated document text is
    /// re-scanned with [`fallback::scan_document`].
    pub fn parse_document(&mut self, pages: &[PageFragments], y_granularity: f64) -> DocumentStats {
        self.begin_document();
        let before = self.transactions.len();
        let mut stats = DocumentStats {
            pages: pages.len(),
            ..Default::default()
        };
        let mut full_text: Vec<String> = Vec::new();

        for page in pages {
            for line in reconstruct_lines(&page.fragments, y_granularity) {
                stats.lines += 1;
                match self.feed_line(&line.content) {
                    LineOutcome::Parsed(_) => {}
                    LineOutcome::Continuation => stats.continuations += 1,
                    LineOutcome::Rejected => stats.rejected += 1,
                    LineOutcome::Empty => {}
                }
                full_text.push(line.content);
            }
        }

        if self.transactions.len() == before {
            let text = normalize_line(&full_text.join(" "));
            let found = fallback::scan_document(&text);
            debug!(
                found = found.len(),
                "no line-based format matched, used whole-document scan"
            );
            stats.used_fallback = true;
            self.transactions.extend(found);
            self.last = None;
        }

        stats.transactions = self.transactions.len() - before;
        stats
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn into_transactions(self) -> Vec<Transaction> {
        self.transactions
    }
}
