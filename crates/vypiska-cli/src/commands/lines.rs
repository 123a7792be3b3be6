use std::path::PathBuf;

use vypiska_core::error::VypiskaError;
use vypiska_core::extraction::lines::reconstruct_lines;
use vypiska_core::extraction::pdftotext::PdftotextRenderer;
use vypiska_core::extraction::DocumentRenderer;

pub fn run(input_file: PathBuf, y_granularity: f64) -> Result<(), VypiskaError> {
    if !PdftotextRenderer::is_available() {
        return Err(VypiskaError::PdftotextNotFound);
    }

    let bytes = std::fs::read(&input_file)?;
    let renderer = PdftotextRenderer::new();
    let pages = renderer.extract_pages(&bytes)?;

    for page in &pages {
        println!("--- Page {} ---", page.page_number);
        for line in reconstruct_lines(&page.fragments, y_granularity) {
            println!("{:>8.1}  {}", line.y, line.content);
        }
        println!();
    }

    Ok(())
}
