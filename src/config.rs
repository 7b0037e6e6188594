//! Configuration types for slide-deck generation.
//!
//! Every knob of a run lives in [`GenerationConfig`], built via its
//! [`GenerationConfigBuilder`]. One struct makes it easy to share a config
//! across requests, log it, and diff two runs that produced different decks.
//!
//! The extraction thresholds default to the values the pipeline was tuned
//! with (50 chars native, 20 chars OCR, 30 % coverage). They are exposed so a
//! caller can tighten them for a particular corpus, not because they usually
//! need changing.

use crate::error::SlidesError;
use crate::pipeline::llm::TextBackend;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Configuration for one generation run.
///
/// # Example
/// ```rust
/// use edgequake_pdf2slides::GenerationConfig;
///
/// let config = GenerationConfig::builder()
///     .max_slides(8)
///     .model("gpt-4.1-mini")
///     .custom_prompt("Aim at first-year students")
///     .build()
///     .unwrap();
/// assert_eq!(config.max_slides, 8);
/// ```
#[derive(Clone)]
pub struct GenerationConfig {
    /// Hard cap on slides per run, dividers included. Default: 10.
    ///
    /// The budget allocator assumes every divider costs exactly one slide of
    /// this cap.
    pub max_slides: usize,

    /// Slides per chapter requested by the caller. Default: 10.
    ///
    /// Logged for reference; the budget allocator derives the effective
    /// per-chapter count from `max_slides` and the chapter count.
    pub slides_per_chapter: usize,

    /// Chapter content longer than this many characters is cut before it is
    /// embedded in the prompt. Default: 4000.
    pub max_content_chars: usize,

    /// A page's native text is kept only if its trimmed length exceeds this. Default: 50.
    pub native_min_chars: usize,

    /// A page's OCR text is kept only if its trimmed length exceeds this. Default: 20.
    pub ocr_min_chars: usize,

    /// OCR replaces native extraction when fewer than this fraction of pages
    /// yielded text. Default: 0.3.
    pub min_text_coverage: f32,

    /// Rasterisation DPI for the OCR path. Range: 72–600. Default: 300.
    pub ocr_dpi: u32,

    /// Longest edge of a rasterised page in pixels. Default: 4000.
    ///
    /// 300 DPI on a US-letter page is 2550 × 3300 px; the cap only bites on
    /// oversized pages (posters, plans) that would otherwise exhaust memory.
    pub max_rendered_pixels: u32,

    /// Tesseract language model. Default: "eng".
    pub ocr_language: String,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// LLM model identifier, e.g. "gpt-4.1-nano". If None, uses provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Pre-constructed text backend. Takes precedence over every provider
    /// setting; tests inject scripted backends here.
    pub backend: Option<Arc<dyn TextBackend>>,

    /// Sampling temperature for chapter slides. Default: 0.6.
    pub temperature: f32,

    /// Sampling temperature for topic decks. Default: 0.7.
    pub topic_temperature: f32,

    /// Maximum tokens the model may generate per call. Default: 2000.
    pub max_tokens: usize,

    /// Per-call timeout in seconds. Expiry counts as a backend failure. Default: 120.
    pub api_timeout_secs: u64,

    /// Extra attempts after a failed backend call. Default: 0.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Additional instructions appended to every generation prompt.
    pub custom_prompt: Option<String>,

    /// Renderer styling selection. Default: executive / ocean.
    pub style: DeckStyle,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Receives chapter-level progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_slides: 10,
            slides_per_chapter: 10,
            max_content_chars: 4000,
            native_min_chars: 50,
            ocr_min_chars: 20,
            min_text_coverage: 0.3,
            ocr_dpi: 300,
            max_rendered_pixels: 4000,
            ocr_language: "eng".to_string(),
            password: None,
            model: None,
            provider_name: None,
            provider: None,
            backend: None,
            temperature: 0.6,
            topic_temperature: 0.7,
            max_tokens: 2000,
            api_timeout_secs: 120,
            max_retries: 0,
            retry_backoff_ms: 500,
            custom_prompt: None,
            style: DeckStyle::default(),
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("max_slides", &self.max_slides)
            .field("slides_per_chapter", &self.slides_per_chapter)
            .field("max_content_chars", &self.max_content_chars)
            .field("native_min_chars", &self.native_min_chars)
            .field("ocr_min_chars", &self.ocr_min_chars)
            .field("min_text_coverage", &self.min_text_coverage)
            .field("ocr_dpi", &self.ocr_dpi)
            .field("ocr_language", &self.ocr_language)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("backend", &self.backend.as_ref().map(|_| "<dyn TextBackend>"))
            .field("temperature", &self.temperature)
            .field("topic_temperature", &self.topic_temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("style", &self.style)
            .finish()
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn max_slides(mut self, n: usize) -> Self {
        self.config.max_slides = n;
        self
    }

    pub fn slides_per_chapter(mut self, n: usize) -> Self {
        self.config.slides_per_chapter = n.max(1);
        self
    }

    pub fn max_content_chars(mut self, n: usize) -> Self {
        self.config.max_content_chars = n;
        self
    }

    pub fn native_min_chars(mut self, n: usize) -> Self {
        self.config.native_min_chars = n;
        self
    }

    pub fn ocr_min_chars(mut self, n: usize) -> Self {
        self.config.ocr_min_chars = n;
        self
    }

    pub fn min_text_coverage(mut self, ratio: f32) -> Self {
        self.config.min_text_coverage = ratio.clamp(0.0, 1.0);
        self
    }

    pub fn ocr_dpi(mut self, dpi: u32) -> Self {
        self.config.ocr_dpi = dpi.clamp(72, 600);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn backend(mut self, backend: Arc<dyn TextBackend>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn topic_temperature(mut self, t: f32) -> Self {
        self.config.topic_temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn custom_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.custom_prompt = Some(prompt.into());
        self
    }

    pub fn style(mut self, style: DeckStyle) -> Self {
        self.config.style = style;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, SlidesError> {
        let c = &self.config;
        if c.max_slides == 0 {
            return Err(SlidesError::InvalidConfig(
                "max_slides must be ≥ 1".into(),
            ));
        }
        if c.max_content_chars == 0 {
            return Err(SlidesError::InvalidConfig(
                "max_content_chars must be ≥ 1".into(),
            ));
        }
        if c.ocr_language.trim().is_empty() {
            return Err(SlidesError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(SlidesError::InvalidConfig(
                "API timeout must be ≥ 1s".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Deck styling ─────────────────────────────────────────────────────────

/// Layout family the renderer should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    Professional,
    #[default]
    Modern,
    Creative,
    Minimal,
}

impl Template {
    /// Map a front-end template id to a renderer template. Unknown ids fall
    /// back to [`Template::Modern`].
    pub fn from_id(id: &str) -> Self {
        match id.trim().to_lowercase().as_str() {
            "executive" | "academic" | "detailed-brief" => Template::Professional,
            "modern-minimal" | "tech-startup" => Template::Modern,
            "vibrant-creative" => Template::Creative,
            "elegant-dark" => Template::Minimal,
            _ => Template::Modern,
        }
    }
}

/// Colour palette the renderer should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    #[default]
    Blue,
    Green,
    Orange,
    Purple,
    Dark,
}

impl ColorScheme {
    /// Map a front-end colour id to a palette. Unknown ids fall back to
    /// [`ColorScheme::Blue`].
    pub fn from_id(id: &str) -> Self {
        match id.trim().to_lowercase().as_str() {
            "ocean" | "teal" => ColorScheme::Blue,
            "forest" => ColorScheme::Green,
            "sunset" | "amber" | "crimson" => ColorScheme::Orange,
            "royal" | "rose" | "violet" => ColorScheme::Purple,
            "slate" => ColorScheme::Dark,
            _ => ColorScheme::Blue,
        }
    }
}

/// Styling selection handed to the renderer alongside the slides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckStyle {
    /// Front-end template id as requested.
    pub template_id: String,
    /// Front-end colour id as requested.
    pub color_scheme_id: String,
    pub template: Template,
    pub color_scheme: ColorScheme,
}

impl DeckStyle {
    pub fn from_ids(template_id: &str, color_scheme_id: &str) -> Self {
        Self {
            template_id: template_id.to_string(),
            color_scheme_id: color_scheme_id.to_string(),
            template: Template::from_id(template_id),
            color_scheme: ColorScheme::from_id(color_scheme_id),
        }
    }
}

impl Default for DeckStyle {
    fn default() -> Self {
        Self::from_ids("executive", "ocean")
    }
}

/// Template ids accepted by [`Template::from_id`].
pub fn available_templates() -> &'static [&'static str] {
    &[
        "executive",
        "modern-minimal",
        "vibrant-creative",
        "academic",
        "tech-startup",
        "elegant-dark",
        "detailed-brief",
    ]
}

/// Colour ids accepted by [`ColorScheme::from_id`].
pub fn available_color_schemes() -> &'static [&'static str] {
    &[
        "ocean", "forest", "sunset", "royal", "rose", "amber", "teal", "crimson", "slate",
        "violet",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_values() {
        let c = GenerationConfig::default();
        assert_eq!(c.max_slides, 10);
        assert_eq!(c.max_content_chars, 4000);
        assert_eq!(c.native_min_chars, 50);
        assert_eq!(c.ocr_min_chars, 20);
        assert_eq!(c.ocr_dpi, 300);
        assert_eq!(c.ocr_language, "eng");
        assert_eq!(c.max_retries, 0);
        assert_eq!(c.temperature, 0.6);
        assert_eq!(c.topic_temperature, 0.7);
    }

    #[test]
    fn builder_rejects_zero_cap() {
        let err = GenerationConfig::builder().max_slides(0).build();
        assert!(matches!(err, Err(SlidesError::InvalidConfig(_))));
    }

    #[test]
    fn builder_clamps_dpi_and_coverage() {
        let c = GenerationConfig::builder()
            .ocr_dpi(5000)
            .min_text_coverage(3.0)
            .build()
            .expect("valid config");
        assert_eq!(c.ocr_dpi, 600);
        assert_eq!(c.min_text_coverage, 1.0);
    }

    #[test]
    fn template_mapping() {
        assert_eq!(Template::from_id("academic"), Template::Professional);
        assert_eq!(Template::from_id("tech-startup"), Template::Modern);
        assert_eq!(Template::from_id("elegant-dark"), Template::Minimal);
        assert_eq!(Template::from_id("nonsense"), Template::Modern);
    }

    #[test]
    fn color_mapping() {
        assert_eq!(ColorScheme::from_id("rose"), ColorScheme::Purple);
        assert_eq!(ColorScheme::from_id("Crimson"), ColorScheme::Orange);
        assert_eq!(ColorScheme::from_id("slate"), ColorScheme::Dark);
        assert_eq!(ColorScheme::from_id(""), ColorScheme::Blue);
    }

    #[test]
    fn every_advertised_id_maps() {
        for id in available_templates() {
            let _ = Template::from_id(id);
        }
        assert_eq!(available_color_schemes().len(), 10);
    }
}
