use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::page_range::PageSet;
use crate::pdf::PdfDocument;

/// Text-flow tuning handed through to the extraction backend.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    pub char_margin: f32,
    pub line_margin: f32,
    pub word_margin: f32,
    /// `None` disables box-flow ordering
    pub boxes_flow: Option<f32>,
    pub detect_vertical: bool,
    pub all_texts: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            char_margin: 2.0,
            line_margin: 0.5,
            word_margin: 0.1,
            boxes_flow: Some(0.5),
            detect_vertical: false,
            all_texts: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub password: Option<String>,
    /// Pages left out of the extraction entirely
    pub skip: PageSet,
    pub max_pages: Option<u32>,
    /// Degrees added to every page's rotation
    pub rotation: i64,
    /// `None` reads the content streams directly, without layout analysis
    pub layout: Option<LayoutOptions>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            password: None,
            skip: PageSet::new(),
            max_pages: None,
            rotation: 0,
            layout: Some(LayoutOptions::default()),
        }
    }
}

pub trait TextExtractor {
    fn extract(&self, path: &Path, options: &ExtractOptions) -> Result<String>;
}

/// Extraction through `pdf-extract`, or `lopdf` alone when layout is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path, options: &ExtractOptions) -> Result<String> {
        let mut doc = PdfDocument::open(path)?;
        doc.unlock(options.password.as_deref())?;

        // Skipped pages are dropped from the document before any text is read
        doc.remove_pages(&options.skip)?;
        // zero means no limit
        if let Some(max) = options.max_pages.filter(|&max| max > 0) {
            doc.truncate(max);
        }
        if doc.page_count() == 0 {
            return Err(Error::EmptyContent("every page was skipped"));
        }
        doc.rotate_pages(options.rotation)?;

        debug!(
            "Extracting text from {} page(s) of {}",
            doc.page_count(),
            path.display()
        );

        match &options.layout {
            Some(layout) => {
                if *layout != LayoutOptions::default() {
                    warn!("pdf-extract uses its own layout heuristics; layout tuning options are ignored");
                }
                let bytes = doc.to_bytes()?;
                pdf_extract::extract_text_from_mem(&bytes)
                    .map_err(|e| Error::Extraction(e.to_string()))
            }
            None => doc.raw_text(),
        }
    }
}

static TRAILING_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]*\n[ \t]*").expect("valid regex"));
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("valid regex"));
static SPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("valid regex"));

/// Prepare extracted text for speech.
///
/// Single line breaks inside a paragraph become spaces and runs of blank lines
/// collapse to a single line break.
pub fn normalize_whitespace(text: &str) -> String {
    let text = text
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\x0C', "\n\n");
    let text = TRAILING_SPACE.replace_all(&text, "\n");

    PARAGRAPH_BREAK
        .split(&text)
        .map(|paragraph| {
            let joined = paragraph.replace('\n', " ");
            SPACE_RUN.replace_all(joined.trim(), " ").into_owned()
        })
        .filter(|paragraph| !paragraph.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
