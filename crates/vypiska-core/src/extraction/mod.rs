pub mod lines;
pub mod pdftotext;

use crate::error::VypiskaError;

/// One atomic run of text on a page, positioned in page coordinates.
///
/// The coordinate origin is the bottom-left corner of the page, so larger
/// `y` values are closer to the top.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedFragment {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

impl PositionedFragment {
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Self {
        PositionedFragment {
            text: text.into(),
            x,
            y,
        }
    }
}

/// Fragments extracted from a single page of a document.
#[derive(Debug, Clone)]
pub struct PageFragments {
    pub page_number: usize,
    pub fragments: Vec<PositionedFragment>,
}

/// Trait for document rendering backends.
pub trait DocumentRenderer: Send + Sync {
    /// Render document bytes into positioned fragments, one `PageFragments` per page.
    fn extract_pages(&self, document: &[u8]) -> Result<Vec<PageFragments>, VypiskaError>;

    /// Name of this rendering backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
