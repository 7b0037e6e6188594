//! Deck assembly under the slide cap.
//!
//! The orchestrator owns the final slide list and is the only place that
//! enforces the cap. It does so by checking before every append, never by
//! removing slides afterwards, so once a slide is in the list its number is
//! final and the numbering stays gap-free from 1.
//!
//! ## PDF runs
//!
//! Chapters are processed in order. A chapter is skipped entirely once the
//! list is full. Otherwise it gets a divider (when the budget asks for
//! dividers), then `min(slides_per_chapter, remaining)` content slides
//! numbered after everything already in the list. A divider that fills the
//! last free slot stays even though its chapter gets no content.

use crate::output::Slide;
use crate::pipeline::budget::{allocate, SlideBudget};
use crate::pipeline::content::{GenerationStrategy, SlideGenerator};
use crate::pipeline::segment::Chapter;
use crate::progress::GenerationProgressCallback;
use tracing::{debug, info};

/// The assembled slides plus the counters that feed the run statistics.
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub slides: Vec<Slide>,
    /// `None` for topic runs.
    pub budget: Option<SlideBudget>,
    pub chapters_processed: usize,
    pub divider_slides: usize,
    pub content_slides: usize,
    /// Generator calls that ended in direct extraction.
    pub fallback_chapters: usize,
    /// Placeholder slides that made it into the list.
    pub backfilled_slides: usize,
}

impl Assembly {
    fn push_content(&mut self, slide: Slide, placeholder: bool) {
        self.slides.push(slide);
        self.content_slides += 1;
        if placeholder {
            self.backfilled_slides += 1;
        }
    }
}

/// Build the slide list for a PDF run.
pub async fn assemble_pdf_deck(
    chapters: &[Chapter],
    generator: &SlideGenerator,
    cap: usize,
    progress: &dyn GenerationProgressCallback,
) -> Assembly {
    let total = chapters.len();
    let budget = allocate(total, cap);
    info!(
        "{} chapters, {} slides each, dividers {}",
        total,
        budget.slides_per_chapter,
        if budget.include_dividers { "on" } else { "off" }
    );
    progress.on_generation_start(total, cap);

    let mut out = Assembly {
        budget: Some(budget),
        ..Default::default()
    };

    for (idx, chapter) in chapters.iter().enumerate() {
        let number = idx + 1;
        if out.slides.len() >= cap {
            info!("Slide cap {} reached; skipping chapters {}..={}", cap, number, total);
            break;
        }

        progress.on_chapter_start(number, total, &chapter.title);
        let before = out.slides.len();

        if budget.include_dividers {
            out.slides
                .push(Slide::divider(out.slides.len() + 1, number, &chapter.title));
            out.divider_slides += 1;
        }

        let remaining = cap.saturating_sub(out.slides.len());
        if remaining == 0 {
            debug!("Chapter {}: no room left after divider", number);
            progress.on_chapter_complete(number, total, out.slides.len() - before);
            continue;
        }

        let request = budget.slides_per_chapter.min(remaining);
        let outcome = generator
            .generate_for_chapter(number, &chapter.title, &chapter.content, request, out.slides.len())
            .await;
        out.chapters_processed += 1;

        if outcome.strategy != GenerationStrategy::Model {
            progress.on_fallback(number, outcome.strategy);
        }
        if outcome.strategy == GenerationStrategy::DirectExtraction {
            out.fallback_chapters += 1;
        }

        // Placeholders always sit at the tail of a generator batch.
        let first_placeholder = outcome.slides.len() - outcome.backfilled;
        for (i, slide) in outcome.slides.into_iter().enumerate() {
            if out.slides.len() >= cap {
                break;
            }
            out.push_content(slide, i >= first_placeholder);
        }

        progress.on_chapter_complete(number, total, out.slides.len() - before);
    }

    progress.on_generation_complete(out.slides.len());
    out
}

/// Build the slide list for a topic run: one generator call, no dividers.
pub async fn assemble_topic_deck(
    topic: &str,
    requested: usize,
    generator: &SlideGenerator,
    cap: usize,
    progress: &dyn GenerationProgressCallback,
) -> Assembly {
    let count = requested.min(cap);
    progress.on_generation_start(1, cap);

    let mut out = Assembly::default();
    if count == 0 {
        progress.on_generation_complete(0);
        return out;
    }

    progress.on_chapter_start(1, 1, topic);
    let outcome = generator.generate_for_topic(topic, count).await;
    if outcome.strategy != GenerationStrategy::Model {
        progress.on_fallback(1, outcome.strategy);
    }
    if outcome.strategy == GenerationStrategy::DirectExtraction {
        out.fallback_chapters = 1;
    }
    out.chapters_processed = 1;

    let first_placeholder = outcome.slides.len() - outcome.backfilled;
    for (i, slide) in outcome.slides.into_iter().enumerate().take(count) {
        out.push_content(slide, i >= first_placeholder);
    }

    progress.on_chapter_complete(1, 1, out.slides.len());
    progress.on_generation_complete(out.slides.len());
    out
}
