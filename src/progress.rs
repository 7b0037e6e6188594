//! Progress-callback trait for chapter-level generation events.
//!
//! Inject an [`Arc<dyn GenerationProgressCallback>`] via
//! [`crate::config::GenerationConfigBuilder::progress_callback`] to receive
//! events as the pipeline extracts text and works through each chapter.
//!
//! Callbacks keep the library ignorant of how the host reports progress: a
//! terminal bar, a WebSocket, or a job record in a database all plug in the
//! same way.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf2slides::{GenerationConfig, GenerationProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct SlideCounter {
//!     added: AtomicUsize,
//! }
//!
//! impl GenerationProgressCallback for SlideCounter {
//!     fn on_chapter_complete(&self, chapter: usize, total: usize, slides_added: usize) {
//!         self.added.fetch_add(slides_added, Ordering::SeqCst);
//!         eprintln!("chapter {chapter}/{total}: +{slides_added} slides");
//!     }
//! }
//!
//! let counter = Arc::new(SlideCounter { added: AtomicUsize::new(0) });
//! let config = GenerationConfig::builder()
//!     .progress_callback(counter as Arc<dyn GenerationProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::pipeline::content::GenerationStrategy;
use crate::pipeline::extract::ExtractionMethod;
use std::sync::Arc;

/// Called by the pipeline as it moves through a run.
///
/// All methods have no-op defaults so implementors override only what they
/// need. Chapter numbers are 1-indexed.
pub trait GenerationProgressCallback: Send + Sync {
    /// Text extraction finished.
    ///
    /// # Arguments
    /// * `total_pages`     — pages in the document (0 if it could not be opened)
    /// * `pages_with_text` — pages that produced non-empty text
    /// * `method`          — native, OCR, or failed
    fn on_extraction_complete(
        &self,
        total_pages: usize,
        pages_with_text: usize,
        method: ExtractionMethod,
    ) {
        let _ = (total_pages, pages_with_text, method);
    }

    /// Called once chapters are known and the slide budget is fixed.
    ///
    /// # Arguments
    /// * `total_chapters` — chapters detected (1 for topic runs)
    /// * `max_slides`     — the run's slide cap
    fn on_generation_start(&self, total_chapters: usize, max_slides: usize) {
        let _ = (total_chapters, max_slides);
    }

    /// Called just before a chapter's divider and content are produced.
    fn on_chapter_start(&self, chapter: usize, total_chapters: usize, title: &str) {
        let _ = (chapter, total_chapters, title);
    }

    /// Called when the content generator had to leave the model path.
    fn on_fallback(&self, chapter: usize, strategy: GenerationStrategy) {
        let _ = (chapter, strategy);
    }

    /// Called after a chapter's slides (divider included) were appended.
    fn on_chapter_complete(&self, chapter: usize, total_chapters: usize, slides_added: usize) {
        let _ = (chapter, total_chapters, slides_added);
    }

    /// Called once with the final slide count.
    fn on_generation_complete(&self, total_slides: usize) {
        let _ = total_slides;
    }
}

/// A no-op implementation, the default when no callback is configured.
pub struct NoopProgressCallback;

impl GenerationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::GenerationConfig`].
pub type ProgressCallback = Arc<dyn GenerationProgressCallback>;
