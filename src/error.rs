//! Error types for the edgequake-pdf2slides library.
//!
//! Three error types reflect three distinct failure scopes:
//!
//! * [`SlidesError`] — **Fatal**: the run cannot produce a deck at all
//!   (input unreadable, provider not configured, output not writable).
//!   Returned as `Err(SlidesError)` from the top-level `generate*` functions.
//!
//! * [`ExtractionError`] — **Non-fatal, per page**: native text or OCR failed
//!   for one page. The page is recorded as empty text and the batch goes on.
//!
//! * [`GenerationError`] — **Non-fatal, per backend call**: the text backend
//!   failed, timed out or replied with nothing usable. The content generator
//!   absorbs it by switching to direct extraction.
//!
//! Only [`SlidesError`] ever reaches a caller; the other two are logged and
//! recorded in the run statistics.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-pdf2slides library.
#[derive(Debug, Error)]
pub enum SlidesError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is empty or otherwise unusable.
    #[error("Invalid input '{input}': expected a PDF path, an HTTP/HTTPS URL, or a topic")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// Uploaded bytes could not be written to the staging directory.
    #[error("Failed to stage upload '{name}': {source}")]
    StagingFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output deck file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The deck could not be serialised to JSON.
    #[error("Failed to serialise deck: {0}")]
    Serialisation(#[from] serde_json::Error),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal text-extraction failure.
///
/// Page numbers are 1-indexed in messages.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ExtractionError {
    /// The document could not be opened at all.
    #[error("Could not open PDF: {detail}")]
    Open { detail: String },

    /// Native text extraction failed for one page.
    #[error("Page {page}: text extraction failed: {detail}")]
    PageText { page: usize, detail: String },

    /// The page could not be rasterised for OCR.
    #[error("Page {page}: rasterisation failed: {detail}")]
    Render { page: usize, detail: String },

    /// The OCR engine failed on one page.
    #[error("Page {page}: OCR failed: {detail}")]
    Ocr { page: usize, detail: String },
}

/// A non-fatal failure of one text-backend call.
///
/// Any variant triggers the direct-extraction fallback.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum GenerationError {
    /// The backend returned an error after all attempts.
    #[error("Text backend failed after {attempts} attempt(s): {detail}")]
    Backend { attempts: u32, detail: String },

    /// The backend call exceeded the configured timeout.
    #[error("Text backend timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The backend answered with an empty (or whitespace-only) reply.
    #[error("Text backend returned an empty reply")]
    EmptyReply,
}
