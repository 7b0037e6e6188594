//! Text extraction: one text string per PDF page, with an OCR fallback.
//!
//! ## Two tiers
//!
//! Native extraction runs first. A page counts as having text when its
//! trimmed text is longer than `native_min_chars` (50 by default); shorter
//! pages are recorded as empty. If fewer than `min_text_coverage` (30 %) of
//! the pages produced text, the document is treated as scanned: every native
//! result is discarded and the whole page sequence is re-derived by
//! rasterising each page at `ocr_dpi` and running OCR, keeping a page when
//! its OCR text is longer than `ocr_min_chars` (20).
//!
//! The thresholds tell "mostly text with a blank page" apart from "scanned
//! document" without per-file configuration.
//!
//! ## Failure policy
//!
//! A failing page becomes an empty string and the batch goes on. A document
//! that cannot be opened yields [`ExtractionMethod::Failed`] with zero pages;
//! downstream stages turn that into a single empty chapter instead of an
//! error.
//!
//! pdfium is blocking and keeps thread-local state, so the whole extraction
//! runs inside `tokio::task::spawn_blocking`.

use crate::config::GenerationConfig;
use crate::error::ExtractionError;
use crate::pipeline::ocr::{OcrEngine, TesseractOcr};
use image::DynamicImage;
use pdfium_render::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

/// Read access to a paginated document.
///
/// Page indices are 0-based.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Native (embedded) text of one page.
    fn page_text(&self, index: usize) -> Result<String, ExtractionError>;

    /// Rasterise one page at the given resolution for OCR.
    fn render_page(&self, index: usize, dpi: u32) -> Result<DynamicImage, ExtractionError>;
}

/// How the page texts were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Embedded text layer.
    Native,
    /// Rasterisation + OCR.
    Ocr,
    /// The document could not be opened; zero pages.
    Failed,
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExtractionMethod::Native => "native",
            ExtractionMethod::Ocr => "ocr",
            ExtractionMethod::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Page texts in page order plus how they were produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageExtraction {
    /// One entry per page; empty strings for pages without usable text.
    pub pages: Vec<String>,
    pub method: ExtractionMethod,
}

impl PageExtraction {
    /// The explicit "could not open" result.
    pub fn failed() -> Self {
        Self {
            pages: Vec::new(),
            method: ExtractionMethod::Failed,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages_with_text(&self) -> usize {
        self.pages.iter().filter(|p| !p.is_empty()).count()
    }

    pub fn is_failed(&self) -> bool {
        self.method == ExtractionMethod::Failed
    }
}

/// The subset of [`GenerationConfig`] the extractor needs.
///
/// Owned and `Send` so it can move into `spawn_blocking`.
#[derive(Debug, Clone)]
pub struct ExtractionSettings {
    pub native_min_chars: usize,
    pub ocr_min_chars: usize,
    pub min_text_coverage: f32,
    pub ocr_dpi: u32,
    pub max_rendered_pixels: u32,
    pub ocr_language: String,
    pub password: Option<String>,
}

impl From<&GenerationConfig> for ExtractionSettings {
    fn from(c: &GenerationConfig) -> Self {
        Self {
            native_min_chars: c.native_min_chars,
            ocr_min_chars: c.ocr_min_chars,
            min_text_coverage: c.min_text_coverage,
            ocr_dpi: c.ocr_dpi,
            max_rendered_pixels: c.max_rendered_pixels,
            ocr_language: c.ocr_language.clone(),
            password: c.password.clone(),
        }
    }
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self::from(&GenerationConfig::default())
    }
}

/// Extract page texts from `source`, switching to `ocr` for scanned documents.
///
/// Always returns exactly `source.page_count()` entries.
pub fn extract_pages(
    source: &dyn PageSource,
    ocr: &dyn OcrEngine,
    settings: &ExtractionSettings,
) -> PageExtraction {
    let total = source.page_count();
    info!("Extracting text from {} pages", total);

    if total == 0 {
        return PageExtraction {
            pages: Vec::new(),
            method: ExtractionMethod::Native,
        };
    }

    let mut pages = Vec::with_capacity(total);
    let mut pages_with_text = 0usize;

    for idx in 0..total {
        match source.page_text(idx) {
            Ok(text) if char_len(&text) > settings.native_min_chars => {
                pages_with_text += 1;
                pages.push(text);
            }
            Ok(_) => {
                debug!("Page {}: no usable text layer", idx + 1);
                pages.push(String::new());
            }
            Err(e) => {
                warn!("{}", e);
                pages.push(String::new());
            }
        }
    }

    info!("Native text on {}/{} pages", pages_with_text, total);

    let coverage = pages_with_text as f32 / total as f32;
    if pages_with_text == 0 || coverage < settings.min_text_coverage {
        info!(
            "Text coverage {:.0}% is below {:.0}%, switching to OCR",
            coverage * 100.0,
            settings.min_text_coverage * 100.0
        );
        if !ocr.is_available() {
            warn!(
                "OCR engine unavailable; {} pages recorded without text. \
                 Install tesseract-ocr or set TESSERACT_CMD",
                total
            );
            return PageExtraction {
                pages: vec![String::new(); total],
                method: ExtractionMethod::Ocr,
            };
        }
        return PageExtraction {
            pages: ocr_pages(source, ocr, settings),
            method: ExtractionMethod::Ocr,
        };
    }

    PageExtraction {
        pages,
        method: ExtractionMethod::Native,
    }
}

/// Re-derive every page through rasterisation + OCR, in page order.
fn ocr_pages(
    source: &dyn PageSource,
    ocr: &dyn OcrEngine,
    settings: &ExtractionSettings,
) -> Vec<String> {
    let total = source.page_count();
    let mut pages = Vec::with_capacity(total);
    let mut total_chars = 0usize;

    for idx in 0..total {
        let text = source
            .render_page(idx, settings.ocr_dpi)
            .and_then(|image| ocr.recognize(&image, idx + 1));

        match text {
            Ok(text) if char_len(&text) > settings.ocr_min_chars => {
                debug!("OCR page {}/{}: {} chars", idx + 1, total, text.len());
                total_chars += text.len();
                pages.push(text);
            }
            Ok(_) => {
                debug!("OCR page {}/{}: no text found", idx + 1, total);
                pages.push(String::new());
            }
            Err(e) => {
                warn!("{}", e);
                pages.push(String::new());
            }
        }
    }

    info!("OCR complete: {} chars from {} pages", total_chars, total);
    pages
}

fn char_len(text: &str) -> usize {
    text.trim().chars().count()
}

// ── pdfium-backed source ─────────────────────────────────────────────────

/// [`PageSource`] over a document opened with pdfium.
pub struct PdfiumSource<'a> {
    document: PdfDocument<'a>,
    max_rendered_pixels: u32,
}

impl<'a> PdfiumSource<'a> {
    pub fn new(document: PdfDocument<'a>, max_rendered_pixels: u32) -> Self {
        Self {
            document,
            max_rendered_pixels,
        }
    }

    fn page(&self, index: usize) -> Result<PdfPage<'_>, String> {
        self.document
            .pages()
            .get(index as u16)
            .map_err(|e| format!("{:?}", e))
    }
}

impl PageSource for PdfiumSource<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_text(&self, index: usize) -> Result<String, ExtractionError> {
        let page = self.page(index).map_err(|detail| ExtractionError::PageText {
            page: index + 1,
            detail,
        })?;
        let text = page.text().map_err(|e| ExtractionError::PageText {
            page: index + 1,
            detail: format!("{:?}", e),
        })?;
        Ok(text.all())
    }

    fn render_page(&self, index: usize, dpi: u32) -> Result<DynamicImage, ExtractionError> {
        let page = self.page(index).map_err(|detail| ExtractionError::Render {
            page: index + 1,
            detail,
        })?;

        // PDF user space is 72 units per inch.
        let render_config = PdfRenderConfig::new()
            .scale_page_by_factor(dpi as f32 / 72.0)
            .set_maximum_width(self.max_rendered_pixels as i32)
            .set_maximum_height(self.max_rendered_pixels as i32);

        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| ExtractionError::Render {
                    page: index + 1,
                    detail: format!("{:?}", e),
                })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            index + 1,
            image.width(),
            image.height()
        );
        Ok(image)
    }
}

/// Bind to a pdfium library.
///
/// Lookup order: `PDFIUM_LIB_PATH`, the current directory, then the system
/// library path.
pub fn bind_pdfium() -> Result<Pdfium, ExtractionError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(path) if !path.is_empty() => Pdfium::bind_to_library(&path),
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| ExtractionError::Open {
        detail: format!(
            "failed to bind to pdfium: {:?}. Set PDFIUM_LIB_PATH=/path/to/libpdfium",
            e
        ),
    })?;

    Ok(Pdfium::new(bindings))
}

/// Extract page texts from a PDF on disk.
///
/// Never fails: an unreadable document yields [`PageExtraction::failed`].
pub async fn extract_document(pdf_path: &Path, config: &GenerationConfig) -> PageExtraction {
    let path = pdf_path.to_path_buf();
    let settings = ExtractionSettings::from(config);

    match tokio::task::spawn_blocking(move || extract_document_blocking(&path, &settings)).await {
        Ok(extraction) => extraction,
        Err(e) => {
            warn!("Extraction task panicked: {}", e);
            PageExtraction::failed()
        }
    }
}

/// Blocking implementation of [`extract_document`].
fn extract_document_blocking(pdf_path: &Path, settings: &ExtractionSettings) -> PageExtraction {
    let pdfium = match bind_pdfium() {
        Ok(p) => p,
        Err(e) => {
            warn!("{}", e);
            return PageExtraction::failed();
        }
    };

    let document = match pdfium.load_pdf_from_file(pdf_path, settings.password.as_deref()) {
        Ok(doc) => doc,
        Err(e) => {
            let err = ExtractionError::Open {
                detail: format!("{}: {:?}", pdf_path.display(), e),
            };
            warn!("{}", err);
            return PageExtraction::failed();
        }
    };

    let source = PdfiumSource::new(document, settings.max_rendered_pixels);
    let ocr = TesseractOcr::new(&settings.ocr_language);
    extract_pages(&source, &ocr, settings)
}
