//! Offline integration tests: the whole pipeline from page text to deck,
//! driven by scripted text backends instead of a live model.
//!
//! Run with:
//!   cargo test --test pipeline

use async_trait::async_trait;
use edgequake_pdf2slides::pipeline::content::SlideGenerator;
use edgequake_pdf2slides::pipeline::orchestrate::assemble_pdf_deck;
use edgequake_pdf2slides::pipeline::segment::{segment_chapters, WHOLE_DOCUMENT_TITLE};
use edgequake_pdf2slides::{
    generate_from_pdf_bytes, generate_from_topic, DeckSource, ExtractionMethod, GenerationConfig,
    GenerationError, NoopProgressCallback, Prompt, Slide, TextBackend,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ── Scripted backends ────────────────────────────────────────────────────────

/// Answers with as many well-formed slides as the prompt asks for.
/// Both prompt flavours put the count in the second word.
#[derive(Default)]
struct Obliging {
    calls: AtomicUsize,
}

#[async_trait]
impl TextBackend for Obliging {
    async fn complete(&self, prompt: &Prompt, _max_tokens: usize) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let n: usize = prompt
            .user
            .split_whitespace()
            .nth(1)
            .and_then(|w| w.parse().ok())
            .unwrap_or(1);
        Ok((1..=n)
            .map(|i| {
                format!(
                    "Slide {i}\nTitle: Idea {i}\n- The first bullet carries enough words\n- The second bullet carries enough words\n\n"
                )
            })
            .collect())
    }
}

/// Always fails, as an unreachable provider would.
struct Down;

#[async_trait]
impl TextBackend for Down {
    async fn complete(&self, _prompt: &Prompt, _max_tokens: usize) -> Result<String, GenerationError> {
        Err(GenerationError::Backend {
            attempts: 1,
            detail: "connection refused".into(),
        })
    }
}

/// Route library logs to the test harness so fallback warnings show up
/// with `--nocapture`. `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

fn config_with(backend: Arc<dyn TextBackend>, max_slides: usize) -> GenerationConfig {
    GenerationConfig::builder()
        .backend(backend)
        .max_slides(max_slides)
        .build()
        .expect("valid config")
}

fn assert_gap_free(slides: &[Slide]) {
    let numbers: Vec<usize> = slides.iter().map(|s| s.slide_number).collect();
    let expected: Vec<usize> = (1..=slides.len()).collect();
    assert_eq!(numbers, expected, "slide numbers must run 1..=n without gaps");
}

fn book_pages() -> Vec<String> {
    let body = "Rivers carry sediment downstream and shape the valleys they cross. ".repeat(4);
    vec![
        format!("Chapter 1: Sources\n{body}"),
        format!("Chapter 2: Channels\n{body}"),
        format!("Chapter 3: Deltas\n{body}"),
    ]
}

// ── Topic decks ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn topic_deck_is_clamped_to_cap() {
    let config = config_with(Arc::new(Obliging::default()), 10);
    let deck = generate_from_topic("Photosynthesis", 15, &config)
        .await
        .expect("topic generation should succeed");

    assert_eq!(deck.slides.len(), 10);
    assert_eq!(deck.source, DeckSource::Topic);
    assert_eq!(deck.title, "Photosynthesis");
    assert_gap_free(&deck.slides);
    assert!(deck.slides.iter().all(|s| !s.is_divider()));
    assert!(deck.slides.iter().all(|s| s.image_query == s.title));
    assert_eq!(deck.stats.fallback_chapters, 0);
    assert!(deck.stats.extraction.is_none());
}

#[tokio::test]
async fn topic_deck_survives_backend_failure() {
    init_tracing();
    let config = config_with(Arc::new(Down), 10);
    let deck = generate_from_topic("Plate tectonics", 4, &config)
        .await
        .expect("a failing model must not fail the run");

    assert_eq!(deck.slides.len(), 4);
    assert_gap_free(&deck.slides);
    assert_eq!(deck.stats.fallback_chapters, 1);
    assert!(deck.slides.iter().all(|s| s.content.len() >= 1));
}

#[tokio::test]
async fn topic_runs_are_deterministic() {
    let config = config_with(Arc::new(Obliging::default()), 10);
    let first = generate_from_topic("Volcanoes", 5, &config).await.unwrap();
    let second = generate_from_topic("Volcanoes", 5, &config).await.unwrap();
    assert_eq!(
        serde_json::to_string(&first.slides).unwrap(),
        serde_json::to_string(&second.slides).unwrap()
    );
}

#[test]
fn topic_deck_from_blocking_code() {
    let config = config_with(Arc::new(Obliging::default()), 3);
    let deck = tokio_test::assert_ok!(tokio_test::block_on(generate_from_topic(
        "Glaciers", 3, &config
    )));
    assert_eq!(deck.slides.len(), 3);
    assert_gap_free(&deck.slides);
}

// ── PDF decks ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn three_chapter_book_fits_the_cap_with_dividers() {
    let pages = book_pages();
    let chapters = segment_chapters(&pages);
    assert_eq!(chapters.len(), 3);
    // The first heading lands in the empty seed chapter, so it keeps its title.
    assert_eq!(chapters[0].title, WHOLE_DOCUMENT_TITLE);
    assert_eq!(chapters[1].title, "Chapter 2: Channels");
    assert_eq!(chapters[2].start_page, 2);

    let backend = Arc::new(Obliging::default());
    let config = config_with(backend.clone(), 10);
    let generator = SlideGenerator::new(backend.clone(), &config);
    let out = assemble_pdf_deck(&chapters, &generator, config.max_slides, &NoopProgressCallback).await;

    assert!(out.slides.len() <= 10);
    assert_eq!(out.slides.len(), 9);
    assert_gap_free(&out.slides);
    assert_eq!(out.divider_slides, 3);
    for idx in [0, 3, 6] {
        assert!(out.slides[idx].is_divider(), "slide {} should be a divider", idx + 1);
    }
    assert_eq!(out.slides[7].chapter, Some(3));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn failing_model_still_fills_every_chapter() {
    init_tracing();
    let pages = book_pages();
    let chapters = segment_chapters(&pages);
    let config = config_with(Arc::new(Down), 10);
    let generator = SlideGenerator::new(Arc::new(Down), &config);

    let out = assemble_pdf_deck(&chapters, &generator, 10, &NoopProgressCallback).await;
    assert_eq!(out.slides.len(), 9);
    assert_gap_free(&out.slides);
    assert_eq!(out.fallback_chapters, 3);
    assert!(out
        .slides
        .iter()
        .filter(|s| !s.is_divider())
        .all(|s| !s.content.is_empty()));
}

#[tokio::test]
async fn unreadable_upload_degrades_to_an_empty_extraction() {
    init_tracing();
    let config = config_with(Arc::new(Obliging::default()), 6);
    let deck = generate_from_pdf_bytes(b"definitely not a pdf", "lecture notes.pdf", &config)
        .await
        .expect("an unreadable document is not a resource error");

    assert_eq!(deck.source, DeckSource::Pdf);
    assert_eq!(deck.title, "lecture_notes");
    assert_eq!(deck.stats.total_pages, 0);
    assert_eq!(deck.stats.extraction, Some(ExtractionMethod::Failed));
    assert_eq!(deck.stats.chapters_detected, 1);
    assert!(deck.slides.len() <= 6);
    assert_gap_free(&deck.slides);
}
