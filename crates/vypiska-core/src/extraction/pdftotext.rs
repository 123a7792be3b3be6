use crate::error::VypiskaError;
use crate::extraction::{DocumentRenderer, PageFragments, PositionedFragment};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::io::Write;
use std::process::Command;

/// Document rendering backend using pdftotext (from poppler-utils).
///
/// Uses `pdftotext -bbox` to get one bounding box per word, which is turned
/// into a [`PositionedFragment`] with a bottom-left coordinate origin.
pub struct PdftotextRenderer;

impl PdftotextRenderer {
    pub fn new() -> Self {
        PdftotextRenderer
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PdftotextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentRenderer for PdftotextRenderer {
    fn extract_pages(&self, document: &[u8]) -> Result<Vec<PageFragments>, VypiskaError> {
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| VypiskaError::Extraction(e.to_string()))?;
        tmpfile
            .write_all(document)
            .map_err(|e| VypiskaError::Extraction(e.to_string()))?;

        let output = Command::new("pdftotext")
            .arg("-bbox")
            .arg(tmpfile.path())
            .arg("-")
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    VypiskaError::PdftotextNotFound
                } else {
                    VypiskaError::Extraction(format!("pdftotext -bbox failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(VypiskaError::PdftotextFailed { code, stderr });
        }

        let xml = String::from_utf8_lossy(&output.stdout);
        parse_bbox_xml(&xml)
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// Parse `pdftotext -bbox` XHTML into per-page fragments.
///
/// pdftotext reports `yMin`/`yMax` from the top of the page; the fragment `y`
/// is `page height - yMax` so that it grows upwards.
fn parse_bbox_xml(xml: &str) -> Result<Vec<PageFragments>, VypiskaError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut pages = Vec::new();
    let mut current: Option<(PageFragments, f64)> = None;
    let mut word: Option<(f64, f64, String)> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            VypiskaError::BboxXml(format!(
                "at position {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"page" => {
                    let height = attr_f64(&e, "height")?.unwrap_or(0.0);
                    let page_number = pages.len() + 1;
                    current = Some((
                        PageFragments {
                            page_number,
                            fragments: Vec::new(),
                        },
                        height,
                    ));
                }
                b"word" => {
                    let x = attr_f64(&e, "xMin")?;
                    let y_max = attr_f64(&e, "yMax")?;
                    if let (Some(x), Some(y_max)) = (x, y_max) {
                        word = Some((x, y_max, String::new()));
                    }
                }
                _ => {}
            },
            Event::Text(t) => {
                if let Some((_, _, text)) = word.as_mut() {
                    let decoded = t
                        .unescape()
                        .map_err(|e| VypiskaError::BboxXml(e.to_string()))?;
                    text.push_str(&decoded);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"word" => {
                    if let (Some((x, y_max, text)), Some((page, height))) =
                        (word.take(), current.as_mut())
                    {
                        let text = text.trim();
                        if !text.is_empty() {
                            page.fragments
                                .push(PositionedFragment::new(text, x, *height - y_max));
                        }
                    }
                }
                b"page" => {
                    if let Some((page, _)) = current.take() {
                        pages.push(page);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(pages)
}

fn attr_f64(tag: &BytesStart<'_>, name: &str) -> Result<Option<f64>, VypiskaError> {
    let attr = tag
        .try_get_attribute(name)
        .map_err(|e| VypiskaError::BboxXml(e.to_string()))?;
    Ok(attr.and_then(|a| {
        let raw = a.unescape_value().ok()?;
        raw.trim().parse().ok()
    }))
}
