//! # edgequake-pdf2slides
//!
//! Turn a PDF (or a bare topic) into a structured slide deck with an LLM.
//!
//! ## Why this crate?
//!
//! Asking a model to "make slides from this book" fails in predictable ways:
//! the book does not fit in one prompt, the reply is not quite in the format
//! asked for, and scanned documents have no text at all. This crate breaks
//! the job into small deterministic stages around a single model call per
//! chapter, and every stage has a fallback, so a run always produces a deck
//! that respects the slide cap.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     resolve local file, download URL, or stage upload
//!  ├─ 2. Extract   native text via pdfium; OCR (tesseract) for scans
//!  ├─ 3. Segment   "Chapter 3: …" / "Section IV …" headings → chapters
//!  ├─ 4. Budget    split the slide cap across chapters (+ dividers)
//!  ├─ 5. Generate  one model call per chapter → parsed slides,
//!  │               direct sentence extraction when the model fails
//!  └─ 6. Assemble  ordered, gap-free numbering, never above the cap
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2slides::{generate_from_pdf, write_deck, GenerationConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     let config = GenerationConfig::builder().max_slides(12).build()?;
//!     let deck = generate_from_pdf("lecture.pdf", &config).await?;
//!     eprintln!(
//!         "{} slides from {} chapters ({} fell back)",
//!         deck.stats.total_slides(),
//!         deck.stats.chapters_detected,
//!         deck.stats.fallback_chapters
//!     );
//!     write_deck(&deck, "lecture.slides.json").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2slides` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-pdf2slides = { version = "0.1", default-features = false }
//! ```
//!
//! ## Runtime requirements
//!
//! * a pdfium shared library (`PDFIUM_LIB_PATH`, the working directory, or
//!   the system library path)
//! * the `tesseract` binary with the configured language data, only for
//!   scanned PDFs

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    available_color_schemes, available_templates, ColorScheme, DeckStyle, GenerationConfig,
    GenerationConfigBuilder, Template,
};
pub use error::{ExtractionError, GenerationError, SlidesError};
pub use generate::{
    generate_from_pdf, generate_from_pdf_bytes, generate_from_pdf_sync, generate_from_topic,
    inspect, write_deck,
};
pub use output::{
    ChapterSummary, DeckSource, DocumentOutline, GenerationStats, Slide, SlideDeck,
};
pub use pipeline::content::GenerationStrategy;
pub use pipeline::extract::ExtractionMethod;
pub use pipeline::llm::{ProviderBackend, TextBackend};
pub use progress::{GenerationProgressCallback, NoopProgressCallback, ProgressCallback};
pub use prompts::Prompt;
