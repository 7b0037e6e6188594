//! Top-level entry points: topic decks, PDF decks, inspection and output.
//!
//! ## Which entry point?
//!
//! | Source | Function |
//! |--------|----------|
//! | free-text topic | [`generate_from_topic`] |
//! | local path or HTTP(S) URL | [`generate_from_pdf`] / [`generate_from_pdf_sync`] |
//! | uploaded bytes | [`generate_from_pdf_bytes`] |
//! | "what would this PDF become?" | [`inspect`] (no model needed) |
//!
//! Only resource problems are errors here: an unreadable input, an
//! unconfigurable provider, an invalid config, an unwritable output. Anything
//! that goes wrong *inside* a run (unreadable pages, a failing model, a reply
//! that does not parse) degrades into fewer or plainer slides instead.

use crate::config::GenerationConfig;
use crate::error::SlidesError;
use crate::output::{
    ChapterSummary, DeckSource, DocumentOutline, GenerationStats, SlideDeck,
};
use crate::pipeline::content::SlideGenerator;
use crate::pipeline::extract::{extract_document, PageExtraction};
use crate::pipeline::input::{self, ResolvedInput};
use crate::pipeline::llm::{ProviderBackend, TextBackend};
use crate::pipeline::orchestrate::{assemble_pdf_deck, assemble_topic_deck, Assembly};
use crate::pipeline::segment::{segment_chapters, Chapter};
use crate::progress::{GenerationProgressCallback, NoopProgressCallback};
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Model used when a provider is chosen without naming one.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Generate a deck about a free-text topic.
///
/// `num_slides` is clamped to `config.max_slides`. No dividers are added.
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdf2slides::{generate_from_topic, GenerationConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let deck = generate_from_topic("Plate tectonics", 6, &GenerationConfig::default()).await?;
/// for slide in &deck.slides {
///     println!("{}. {}", slide.slide_number, slide.title);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn generate_from_topic(
    topic: &str,
    num_slides: usize,
    config: &GenerationConfig,
) -> Result<SlideDeck, SlidesError> {
    let total_start = Instant::now();
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(SlidesError::InvalidInput {
            input: topic.to_string(),
        });
    }
    info!("Generating topic deck: '{}' ({} slides requested)", topic, num_slides);

    let backend = resolve_backend(config)?;
    let generator = SlideGenerator::new(backend, config);

    let noop = NoopProgressCallback;
    let progress: &dyn GenerationProgressCallback =
        config.progress_callback.as_deref().unwrap_or(&noop);

    let generation_start = Instant::now();
    let assembly =
        assemble_topic_deck(topic, num_slides, &generator, config.max_slides, progress).await;

    let mut stats = stats_from_assembly(&assembly, 1);
    stats.generation_duration_ms = generation_start.elapsed().as_millis() as u64;
    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Topic deck complete: {} slides in {}ms",
        stats.total_slides(),
        stats.total_duration_ms
    );

    Ok(SlideDeck {
        title: topic.to_string(),
        source: DeckSource::Topic,
        style: config.style.clone(),
        slides: assembly.slides,
        stats,
    })
}

/// Generate a deck from a PDF file path or HTTP(S) URL.
///
/// Downloads are removed once the deck is built.
pub async fn generate_from_pdf(
    input_str: impl AsRef<str>,
    config: &GenerationConfig,
) -> Result<SlideDeck, SlidesError> {
    let input_str = input_str.as_ref();
    info!("Starting PDF deck: {}", input_str);
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    generate_from_resolved(&resolved, config).await
}

/// Generate a deck from uploaded PDF bytes.
///
/// The bytes are staged under a sanitised `file_name` in a temporary
/// directory that is removed on return, on success and on error alike.
pub async fn generate_from_pdf_bytes(
    bytes: &[u8],
    file_name: &str,
    config: &GenerationConfig,
) -> Result<SlideDeck, SlidesError> {
    let staged = input::stage_bytes(bytes, file_name)?;
    generate_from_resolved(&staged, config).await
}

/// Synchronous wrapper around [`generate_from_pdf`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_from_pdf_sync(
    input_str: impl AsRef<str>,
    config: &GenerationConfig,
) -> Result<SlideDeck, SlidesError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| SlidesError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate_from_pdf(input_str, config))
}

/// Extract and segment a PDF without calling any model.
pub async fn inspect(
    input_str: impl AsRef<str>,
    config: &GenerationConfig,
) -> Result<DocumentOutline, SlidesError> {
    let resolved = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    let extraction = extract_document(resolved.path(), config).await;
    let chapters = segment_chapters(&extraction.pages);

    Ok(DocumentOutline {
        page_count: extraction.page_count(),
        extraction: extraction.method,
        pages_with_text: extraction.pages_with_text(),
        chapters: chapters
            .iter()
            .map(|c| ChapterSummary {
                title: c.title.clone(),
                start_page: c.start_page,
                chars: c.char_count(),
            })
            .collect(),
    })
}

/// Write a deck as pretty-printed JSON.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn write_deck(deck: &SlideDeck, output_path: impl AsRef<Path>) -> Result<(), SlidesError> {
    let path = output_path.as_ref();
    let write_err = |source: std::io::Error| SlidesError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_string_pretty(deck)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

    debug!("Wrote {} slides to {}", deck.slides.len(), path.display());
    Ok(())
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn generate_from_resolved(
    resolved: &ResolvedInput,
    config: &GenerationConfig,
) -> Result<SlideDeck, SlidesError> {
    let total_start = Instant::now();

    // Fail on provider configuration before spending time on OCR.
    let backend = resolve_backend(config)?;
    let generator = SlideGenerator::new(backend, config);

    let noop = NoopProgressCallback;
    let progress: &dyn GenerationProgressCallback =
        config.progress_callback.as_deref().unwrap_or(&noop);

    // ── Step 1: Extract page text ────────────────────────────────────────
    let extraction_start = Instant::now();
    let extraction: PageExtraction = extract_document(resolved.path(), config).await;
    let extraction_duration_ms = extraction_start.elapsed().as_millis() as u64;
    info!(
        "Extracted {}/{} pages ({}) in {}ms",
        extraction.pages_with_text(),
        extraction.page_count(),
        extraction.method,
        extraction_duration_ms
    );
    progress.on_extraction_complete(
        extraction.page_count(),
        extraction.pages_with_text(),
        extraction.method,
    );

    // ── Step 2: Segment into chapters ────────────────────────────────────
    let chapters: Vec<Chapter> = segment_chapters(&extraction.pages);
    info!(
        "Detected {} chapters (requested {} slides per chapter, cap {})",
        chapters.len(),
        config.slides_per_chapter,
        config.max_slides
    );

    // ── Step 3: Generate under the cap ───────────────────────────────────
    let generation_start = Instant::now();
    let assembly = assemble_pdf_deck(&chapters, &generator, config.max_slides, progress).await;

    let mut stats = stats_from_assembly(&assembly, chapters.len());
    stats.total_pages = extraction.page_count();
    stats.extraction = Some(extraction.method);
    stats.extraction_duration_ms = extraction_duration_ms;
    stats.generation_duration_ms = generation_start.elapsed().as_millis() as u64;
    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Deck complete: {} slides ({} dividers) from {} chapters, {}ms total",
        stats.total_slides(),
        stats.divider_slides,
        stats.chapters_detected,
        stats.total_duration_ms
    );

    Ok(SlideDeck {
        title: resolved.title(),
        source: DeckSource::Pdf,
        style: config.style.clone(),
        slides: assembly.slides,
        stats,
    })
}

fn stats_from_assembly(assembly: &Assembly, chapters_detected: usize) -> GenerationStats {
    GenerationStats {
        chapters_detected,
        chapters_processed: assembly.chapters_processed,
        slides_per_chapter: assembly
            .budget
            .map(|b| b.slides_per_chapter)
            .unwrap_or(assembly.content_slides),
        divider_slides: assembly.divider_slides,
        content_slides: assembly.content_slides,
        fallback_chapters: assembly.fallback_chapters,
        backfilled_slides: assembly.backfilled_slides,
        ..Default::default()
    }
}

/// Resolve the text backend, from most-specific to least-specific.
///
/// 1. **Injected backend** (`config.backend`) — used as-is; tests and hosts
///    with their own model plumbing go here.
/// 2. **Pre-built provider** (`config.provider`) — wrapped in a
///    [`ProviderBackend`].
/// 3. Otherwise a provider is resolved by [`resolve_provider`].
pub fn resolve_backend(config: &GenerationConfig) -> Result<Arc<dyn TextBackend>, SlidesError> {
    if let Some(ref backend) = config.backend {
        return Ok(Arc::clone(backend));
    }
    let provider = resolve_provider(config)?;
    Ok(Arc::new(ProviderBackend::new(provider, config)))
}

/// Resolve the LLM provider.
///
/// 1. **Pre-built provider** (`config.provider`).
/// 2. **Named provider + model** (`config.provider_name`); the factory reads
///    the matching API key from the environment.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`),
///    checked before auto-detection so the model choice is honoured even when
///    several API keys are present.
/// 4. **OpenAI** when `OPENAI_API_KEY` is set.
/// 5. **Full auto-detection** (`ProviderFactory::from_env`).
fn resolve_provider(config: &GenerationConfig) -> Result<Arc<dyn LLMProvider>, SlidesError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);

    if let Some(ref name) = config.provider_name {
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(env_model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !env_model.is_empty() {
            return create_provider(&prov, &env_model);
        }
    }

    if std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.is_empty()) {
        return create_provider("openai", model);
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| SlidesError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, SlidesError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        SlidesError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}
