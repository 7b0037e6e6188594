//! Pipeline stages for PDF-to-slide generation.
//!
//! Each submodule implements one transformation step, so each can be tested
//! on its own and the model-facing parts can be swapped for scripted ones.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ segment ──▶ budget ──▶ content ──▶ orchestrate
//! (path/URL) (pdfium+OCR) (chapters)  (quota)   (per chapter) (cap, numbering)
//! ```
//!
//! 1. [`input`]   — canonicalise a path, URL or upload to a local file
//! 2. [`extract`] — per-page text via pdfium, [`ocr`] for scanned documents;
//!    runs in `spawn_blocking` because pdfium is not async-safe
//! 3. [`segment`] — heading detection and grouping of pages into chapters
//! 4. [`budget`]  — slides per chapter and whether dividers fit
//! 5. [`content`] — drive the [`llm`] backend, clean the reply
//!    ([`postprocess`]), parse it ([`parse`]) and fall back to
//!    [`fallback`] when the model cannot deliver
//! 6. [`orchestrate`] — assemble the ordered list under the slide cap

pub mod budget;
pub mod content;
pub mod extract;
pub mod fallback;
pub mod input;
pub mod llm;
pub mod ocr;
pub mod orchestrate;
pub mod parse;
pub mod postprocess;
pub mod segment;
