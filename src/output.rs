//! Output types: slides, the assembled deck, and run statistics.
//!
//! Everything here is `Serialize + Deserialize`: the deck JSON is the only
//! contract with the external renderer, and the CLI prints it verbatim.

use crate::config::DeckStyle;
use crate::pipeline::extract::ExtractionMethod;
use serde::{Deserialize, Serialize};

/// Static second line on every chapter-divider slide.
pub const DIVIDER_LABEL: &str = "Key topics in this chapter";

/// One slide record.
///
/// `slide_number` is 1-based and unique within a run. `content` holds at most
/// five bullet/paragraph strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub slide_number: usize,
    pub title: String,
    pub content: Vec<String>,
    pub visual_note: String,
    pub needs_image: bool,
    pub image_query: String,
    /// 1-based chapter this slide belongs to (PDF runs only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_chapter_divider: Option<bool>,
}

impl Slide {
    /// Build the divider slide that opens chapter `chapter_number`.
    pub fn divider(slide_number: usize, chapter_number: usize, chapter_title: &str) -> Self {
        Self {
            slide_number,
            title: format!("Chapter {chapter_number}"),
            content: vec![chapter_title.to_string(), DIVIDER_LABEL.to_string()],
            visual_note: format!("Chapter {chapter_number}"),
            needs_image: true,
            image_query: chapter_title.to_string(),
            chapter: Some(chapter_number),
            is_chapter_divider: Some(true),
        }
    }

    pub fn is_divider(&self) -> bool {
        self.is_chapter_divider.unwrap_or(false)
    }
}

/// What the deck was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckSource {
    Topic,
    Pdf,
}

/// The result of a full generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideDeck {
    /// Deck title: the topic, or the PDF file stem.
    pub title: String,
    pub source: DeckSource,
    /// Renderer styling selection resolved from the configured ids.
    pub style: DeckStyle,
    /// Ordered slides; never longer than the configured cap.
    pub slides: Vec<Slide>,
    pub stats: GenerationStats,
}

impl SlideDeck {
    /// Content slides only (dividers filtered out).
    pub fn content_slides(&self) -> impl Iterator<Item = &Slide> {
        self.slides.iter().filter(|s| !s.is_divider())
    }
}

/// Statistics for a generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Pages in the source PDF (0 for topic runs or unreadable PDFs).
    pub total_pages: usize,
    /// How page text was obtained; `None` for topic runs.
    pub extraction: Option<ExtractionMethod>,
    pub chapters_detected: usize,
    /// Chapters that received content generation before the cap was hit.
    pub chapters_processed: usize,
    /// Per-chapter slide count chosen by the budget allocator.
    pub slides_per_chapter: usize,
    pub divider_slides: usize,
    pub content_slides: usize,
    /// Generator calls that fell back to direct extraction.
    pub fallback_chapters: usize,
    /// Placeholder slides synthesised to reach requested counts.
    pub backfilled_slides: usize,
    pub extraction_duration_ms: u64,
    pub generation_duration_ms: u64,
    pub total_duration_ms: u64,
}

impl GenerationStats {
    pub fn total_slides(&self) -> usize {
        self.divider_slides + self.content_slides
    }

    /// Average slides per detected chapter, rounded to one decimal place.
    pub fn avg_slides_per_chapter(&self) -> f64 {
        if self.chapters_detected == 0 {
            return 0.0;
        }
        let avg = self.total_slides() as f64 / self.chapters_detected as f64;
        (avg * 10.0).round() / 10.0
    }
}

/// Per-chapter entry of a [`DocumentOutline`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterSummary {
    pub title: String,
    /// 0-based page index where the chapter starts.
    pub start_page: usize,
    /// Character count of the chapter's content.
    pub chars: usize,
}

/// What extraction and segmentation found in a PDF, without any model call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentOutline {
    pub page_count: usize,
    pub extraction: ExtractionMethod,
    /// Pages whose extracted text was non-empty.
    pub pages_with_text: usize,
    pub chapters: Vec<ChapterSummary>,
}
