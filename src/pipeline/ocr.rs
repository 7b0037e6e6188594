//! OCR engine seam plus the tesseract CLI implementation.
//!
//! The page image is written to a temporary PNG and handed to
//! `tesseract <png> stdout -l <lang> --psm 1`; recognised text is read from
//! stdout. Shelling out keeps the build free of leptonica/tesseract headers,
//! and a missing binary simply turns into per-page [`ExtractionError::Ocr`]s.

use crate::error::ExtractionError;
use image::DynamicImage;
use std::process::Command;
use tracing::{debug, warn};

/// Turns a rasterised page into text.
pub trait OcrEngine {
    /// `page` is 1-based and only used for diagnostics.
    fn recognize(&self, image: &DynamicImage, page: usize) -> Result<String, ExtractionError>;

    /// `false` when the engine cannot run at all; the extractor then skips
    /// rasterisation instead of failing every page.
    fn is_available(&self) -> bool {
        true
    }
}

/// [`OcrEngine`] backed by the `tesseract` command-line tool.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    language: String,
    binary: String,
}

impl TesseractOcr {
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
            binary: std::env::var("TESSERACT_CMD").unwrap_or_else(|_| "tesseract".to_string()),
        }
    }
}

impl OcrEngine for TesseractOcr {
    /// `true` when the tesseract binary can be executed.
    fn is_available(&self) -> bool {
        let ok = Command::new(&self.binary)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false);
        if !ok {
            debug!("{} not found; install tesseract-ocr for OCR support", self.binary);
        }
        ok
    }

    fn recognize(&self, image: &DynamicImage, page: usize) -> Result<String, ExtractionError> {
        let ocr_err = |detail: String| ExtractionError::Ocr { page, detail };

        let dir = tempfile::tempdir().map_err(|e| ocr_err(format!("temp dir: {e}")))?;
        let png = dir.path().join(format!("page-{page:04}.png"));
        image
            .save_with_format(&png, image::ImageFormat::Png)
            .map_err(|e| ocr_err(format!("writing {}: {e}", png.display())))?;

        let output = Command::new(&self.binary)
            .arg(&png)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg("1")
            .output()
            .map_err(|e| ocr_err(format!("failed to run {}: {e}", self.binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if output.stdout.is_empty() {
                return Err(ocr_err(format!(
                    "{} exited with {}: {}",
                    self.binary,
                    output.status,
                    stderr.trim()
                )));
            }
            warn!("tesseract warning on page {}: {}", page, stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
