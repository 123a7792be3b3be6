use std::path::PathBuf;

use vypiska_core::error::VypiskaError;
use vypiska_core::export;
use vypiska_core::extraction::pdftotext::PdftotextRenderer;
use vypiska_core::{PipelineOptions, SourceDocument};

use crate::output;

pub fn run(
    input_files: Vec<PathBuf>,
    output_format: &str,
    export_file: Option<PathBuf>,
    y_granularity: f64,
    dedup_prefix_chars: usize,
) -> Result<(), VypiskaError> {
    if !PdftotextRenderer::is_available() {
        return Err(VypiskaError::PdftotextNotFound);
    }

    let mut documents = Vec::with_capacity(input_files.len());
    for path in &input_files {
        let bytes = std::fs::read(path)?;
        documents.push(SourceDocument::new(path.display().to_string(), bytes));
    }

    let options = PipelineOptions {
        y_granularity,
        dedup_prefix_chars,
    };
    let renderer = PdftotextRenderer::new();
    let outcome = vypiska_core::process_batch(&documents, &renderer, &options);

    for failure in &outcome.failures {
        eprintln!("  warning: {} skipped: {}", failure.name, failure.reason);
    }

    outcome.ensure_transactions()?;

    match output_format {
        "json" => output::json::print(&outcome)?,
        _ => output::table::print(&outcome),
    }

    if let Some(path) = export_file {
        let table = export::build_table(&outcome.ledger);
        let file = std::fs::File::create(&path)?;
        export::write_csv(&table, file)?;
        eprintln!(
            "Exported {} transaction(s) to {} (suggested name: {})",
            outcome.ledger.len(),
            path.display(),
            table.filename
        );
    }

    Ok(())
}
