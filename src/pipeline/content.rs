//! Slide content generation for one topic or one chapter.
//!
//! ## Strategy chain
//!
//! 1. **Model** — one backend call with the structured prompt, reply cleaned
//!    by [`crate::pipeline::postprocess`] and parsed by
//!    [`crate::pipeline::parse`].
//! 2. **Model + backfill** — the reply parsed into fewer slides than asked
//!    for; placeholders make up the difference.
//! 3. **Direct extraction** — the backend failed (error, timeout, empty
//!    reply). Sentences are dealt from the source text, then backfilled.
//!
//! Every path returns exactly the requested number of slides; which path was
//! taken travels back in [`GenerationOutcome::strategy`] instead of being
//! buried in a log line.

use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::output::Slide;
use crate::pipeline::fallback::{backfill, direct_extraction, BackfillReason};
use crate::pipeline::llm::TextBackend;
use crate::pipeline::parse::{parse_slides, truncate_with_ellipsis};
use crate::pipeline::postprocess::clean_response;
use crate::prompts::{chapter_prompt, topic_prompt, Prompt};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Title length limit for topic decks.
pub const TOPIC_TITLE_LIMIT: usize = 70;

/// Title length limit for chapter slides (before the `Topic c.n:` prefix).
pub const CHAPTER_TITLE_LIMIT: usize = 50;

/// What a batch of slides is about. Drives titles, notes and numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlideScope {
    Topic { topic: String },
    Chapter { number: usize, title: String },
}

impl SlideScope {
    pub fn title_limit(&self) -> usize {
        match self {
            SlideScope::Topic { .. } => TOPIC_TITLE_LIMIT,
            SlideScope::Chapter { .. } => CHAPTER_TITLE_LIMIT,
        }
    }

    /// The topic, or the chapter title.
    pub fn subject(&self) -> &str {
        match self {
            SlideScope::Topic { topic } => topic,
            SlideScope::Chapter { title, .. } => title,
        }
    }

    /// Title of the `index`-th (1-based) slide in this batch.
    pub fn slide_title(&self, index: usize, raw: Option<&str>) -> String {
        match (self, raw) {
            (SlideScope::Topic { .. }, Some(raw)) => raw.to_string(),
            (SlideScope::Topic { .. }, None) => format!("Topic {index}"),
            (SlideScope::Chapter { number, .. }, Some(raw)) => {
                format!("Topic {number}.{index}: {raw}")
            }
            (SlideScope::Chapter { number, .. }, None) => format!("Topic {number}.{index}"),
        }
    }

    /// Build a content slide in this scope.
    pub fn slide(&self, slide_number: usize, title: String, content: Vec<String>) -> Slide {
        let chapter = match self {
            SlideScope::Topic { .. } => None,
            SlideScope::Chapter { number, .. } => Some(*number),
        };
        Slide {
            slide_number,
            title,
            content,
            visual_note: self.subject().to_string(),
            needs_image: false,
            image_query: self.subject().to_string(),
            chapter,
            is_chapter_divider: None,
        }
    }

    /// Build a slide from a parsed model reply. Topic slides search images
    /// by their own title; chapter slides stay on the chapter title.
    pub fn parsed_slide(&self, slide_number: usize, title: String, content: Vec<String>) -> Slide {
        let mut slide = self.slide(slide_number, title, content);
        if let SlideScope::Topic { .. } = self {
            slide.image_query = slide.title.clone();
        }
        slide
    }
}

/// Which path of the strategy chain produced the slides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStrategy {
    Model,
    ModelWithBackfill,
    DirectExtraction,
}

/// Slides for one generator call plus how they were made.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// Exactly the requested number of slides, numbered from `offset + 1`.
    pub slides: Vec<Slide>,
    pub strategy: GenerationStrategy,
    /// Placeholder slides among `slides`.
    pub backfilled: usize,
    /// Set when the backend failed.
    pub error: Option<GenerationError>,
}

/// Drives a [`TextBackend`] to produce slides.
pub struct SlideGenerator {
    backend: Arc<dyn TextBackend>,
    max_tokens: usize,
    max_content_chars: usize,
    custom_prompt: Option<String>,
    chapter_temperature: f32,
    topic_temperature: f32,
}

impl SlideGenerator {
    pub fn new(backend: Arc<dyn TextBackend>, config: &GenerationConfig) -> Self {
        Self {
            backend,
            max_tokens: config.max_tokens,
            max_content_chars: config.max_content_chars,
            custom_prompt: config.custom_prompt.clone(),
            chapter_temperature: config.temperature,
            topic_temperature: config.topic_temperature,
        }
    }

    /// Generate `count` slides about a free-text topic, numbered from 1.
    pub async fn generate_for_topic(&self, topic: &str, count: usize) -> GenerationOutcome {
        info!("Generating {} slides for topic '{}'", count, topic);
        let mut prompt = topic_prompt(topic, count, self.custom_prompt.as_deref());
        prompt.temperature = Some(self.topic_temperature);
        let scope = SlideScope::Topic {
            topic: topic.to_string(),
        };
        self.run(&scope, &prompt, topic, count, 0).await
    }

    /// Generate `count` slides for one chapter, numbered from `offset + 1`.
    pub async fn generate_for_chapter(
        &self,
        number: usize,
        title: &str,
        content: &str,
        count: usize,
        offset: usize,
    ) -> GenerationOutcome {
        let total_chars = content.chars().count();
        let content = if total_chars > self.max_content_chars {
            debug!("Truncating chapter {}: {} → {} chars", number, total_chars, self.max_content_chars);
            truncate_chars(content, self.max_content_chars)
        } else {
            content.to_string()
        };

        let mut prompt = chapter_prompt(title, &content, count, self.custom_prompt.as_deref());
        prompt.temperature = Some(self.chapter_temperature);
        let scope = SlideScope::Chapter {
            number,
            title: title.to_string(),
        };
        self.run(&scope, &prompt, &content, count, offset).await
    }

    async fn run(
        &self,
        scope: &SlideScope,
        prompt: &Prompt,
        source_text: &str,
        count: usize,
        offset: usize,
    ) -> GenerationOutcome {
        let reply = match self.backend.complete(prompt, self.max_tokens).await {
            Ok(raw) => {
                let cleaned = clean_response(&raw);
                if cleaned.is_empty() {
                    Err(GenerationError::EmptyReply)
                } else {
                    Ok(cleaned)
                }
            }
            Err(e) => Err(e),
        };

        match reply {
            Ok(text) => {
                debug!("Reply preview: {}", truncate_with_ellipsis(&text, 400));
                let mut slides: Vec<Slide> = parse_slides(&text, count, scope.title_limit())
                    .into_iter()
                    .enumerate()
                    .map(|(i, draft)| {
                        let title = scope.slide_title(i + 1, draft.title.as_deref());
                        scope.parsed_slide(offset + i + 1, title, draft.bullets)
                    })
                    .collect();

                let parsed = slides.len();
                let backfilled =
                    backfill(&mut slides, count, offset, scope, BackfillReason::ShortReply);
                let strategy = if backfilled == 0 {
                    GenerationStrategy::Model
                } else {
                    info!("Parsed {}/{} slides, backfilled {}", parsed, count, backfilled);
                    GenerationStrategy::ModelWithBackfill
                };

                GenerationOutcome {
                    slides,
                    strategy,
                    backfilled,
                    error: None,
                }
            }
            Err(e) => {
                warn!("{} ({}); falling back to direct extraction", e, scope.subject());
                let mut slides = direct_extraction(source_text, scope, count, offset);
                let backfilled =
                    backfill(&mut slides, count, offset, scope, BackfillReason::BackendFailure);
                GenerationOutcome {
                    slides,
                    strategy: GenerationStrategy::DirectExtraction,
                    backfilled,
                    error: Some(e),
                }
            }
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
