//! CLI binary for edgequake-pdf2slides.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `GenerationConfig` and prints the deck as JSON.

use anyhow::{bail, Context, Result};
use clap::Parser;
use edgequake_pdf2slides::{
    available_color_schemes, available_templates, generate_from_pdf, generate_from_topic, inspect,
    write_deck, DeckStyle, ExtractionMethod, GenerationConfig, GenerationProgressCallback,
    GenerationStrategy, ProgressCallback, SlideDeck,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: a spinner while text is extracted, then a bar that
/// advances once per chapter with a log line for each.
struct CliProgressCallback {
    bar: ProgressBar,
    fallbacks: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Extracting");
        bar.set_message("Reading PDF text…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            fallbacks: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} chapters  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Generating");
    }
}

impl GenerationProgressCallback for CliProgressCallback {
    fn on_extraction_complete(&self, total_pages: usize, pages_with_text: usize, method: ExtractionMethod) {
        let marker = match method {
            ExtractionMethod::Native => green("✓"),
            ExtractionMethod::Ocr => cyan("◆"),
            ExtractionMethod::Failed => yellow("⚠"),
        };
        self.bar.println(format!(
            "{} {}/{} pages with text  {}",
            marker,
            pages_with_text,
            total_pages,
            dim(&format!("({method})"))
        ));
    }

    fn on_generation_start(&self, total_chapters: usize, max_slides: usize) {
        self.activate_bar(total_chapters);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "{total_chapters} chapter(s), up to {max_slides} slides…"
            ))
        ));
    }

    fn on_chapter_start(&self, _chapter: usize, _total: usize, title: &str) {
        self.bar.set_message(title.to_string());
    }

    fn on_fallback(&self, chapter: usize, strategy: GenerationStrategy) {
        if strategy == GenerationStrategy::DirectExtraction {
            self.fallbacks.fetch_add(1, Ordering::SeqCst);
        }
        self.bar.println(format!(
            "  {} Chapter {:>3}  {}",
            yellow("⚠"),
            chapter,
            dim(&format!("{strategy:?}"))
        ));
    }

    fn on_chapter_complete(&self, chapter: usize, total: usize, slides_added: usize) {
        self.bar.println(format!(
            "  {} Chapter {:>3}/{:<3}  {}",
            green("✓"),
            chapter,
            total,
            dim(&format!("+{slides_added} slides")),
        ));
        self.bar.inc(1);
    }

    fn on_generation_complete(&self, total_slides: usize) {
        self.bar.finish_and_clear();
        let fallbacks = self.fallbacks.load(Ordering::SeqCst);
        if fallbacks == 0 {
            eprintln!("{} {} slides generated", green("✔"), bold(&total_slides.to_string()));
        } else {
            eprintln!(
                "{} {} slides generated  ({} chapter(s) without model output)",
                yellow("⚠"),
                bold(&total_slides.to_string()),
                fallbacks
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Deck from a PDF, JSON on stdout
  pdf2slides textbook.pdf

  # Write the deck to a file, 15 slides max
  pdf2slides textbook.pdf --max-slides 15 -o deck.json

  # Deck from a topic
  pdf2slides --topic "The water cycle" -n 6

  # From a URL, with styling for the renderer
  pdf2slides https://example.org/notes.pdf --template academic --color-scheme forest

  # Chapters and extraction method only (no API key needed)
  pdf2slides --inspect-only scan.pdf

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to libpdfium (else ./ and the system library path)
  TESSERACT_CMD           tesseract binary used for scanned PDFs (default: tesseract)
"#;

/// Generate slide decks from PDF files, URLs or topics using LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2slides",
    version,
    about = "Generate slide decks from PDF files, URLs or topics using LLMs",
    long_about = "Extracts text from a PDF (OCR for scanned documents), splits it into chapters, \
and asks an LLM for a fixed number of slides per chapter under a total slide cap. \
The deck is printed as JSON for an external renderer.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: Option<String>,

    /// Generate from a free-text topic instead of a PDF.
    #[arg(long, conflicts_with = "input")]
    topic: Option<String>,

    /// Slides requested for a topic deck (clamped to --max-slides).
    #[arg(short = 'n', long, env = "PDF2SLIDES_NUM_SLIDES", default_value_t = 10)]
    num_slides: usize,

    /// Write the deck JSON to this file instead of stdout.
    #[arg(short, long, env = "PDF2SLIDES_OUTPUT")]
    output: Option<PathBuf>,

    /// Hard cap on slides per deck, dividers included.
    #[arg(long, env = "PDF2SLIDES_MAX_SLIDES", default_value_t = 10,
          value_parser = clap::value_parser!(u32).range(1..=200))]
    max_slides: u32,

    /// Requested slides per chapter (informational; the cap decides).
    #[arg(long, env = "PDF2SLIDES_SLIDES_PER_CHAPTER", default_value_t = 10)]
    slides_per_chapter: usize,

    /// Template id passed to the renderer.
    #[arg(long, env = "PDF2SLIDES_TEMPLATE", default_value = "executive")]
    template: String,

    /// Colour scheme id passed to the renderer.
    #[arg(long, env = "PDF2SLIDES_COLOR_SCHEME", default_value = "ocean")]
    color_scheme: String,

    /// Extra instructions appended to every prompt.
    #[arg(long, env = "PDF2SLIDES_CUSTOM_PROMPT")]
    custom_prompt: Option<String>,

    /// LLM model ID (e.g. gpt-4.1-nano, gpt-4.1-mini, claude-sonnet-4-20250514).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "EDGEQUAKE_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set.\n\
          Supported: openai, anthropic, gemini, azure, ollama, or any OpenAI-compatible URL."
    )]
    provider: Option<String>,

    /// Tesseract language for scanned PDFs.
    #[arg(long, env = "PDF2SLIDES_OCR_LANG", default_value = "eng")]
    ocr_lang: String,

    /// Rasterisation DPI for OCR (72–600).
    #[arg(long, env = "PDF2SLIDES_OCR_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    ocr_dpi: u32,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2SLIDES_PASSWORD")]
    password: Option<String>,

    /// Max LLM output tokens per call.
    #[arg(long, env = "PDF2SLIDES_MAX_TOKENS", default_value_t = 2000)]
    max_tokens: usize,

    /// LLM temperature for chapter slides (0.0–2.0).
    #[arg(long, env = "PDF2SLIDES_TEMPERATURE", default_value_t = 0.6)]
    temperature: f32,

    /// LLM temperature for topic decks (0.0–2.0).
    #[arg(long, env = "PDF2SLIDES_TOPIC_TEMPERATURE", default_value_t = 0.7)]
    topic_temperature: f32,

    /// Retries per LLM call before falling back to direct extraction.
    #[arg(long, env = "PDF2SLIDES_MAX_RETRIES", default_value_t = 0)]
    max_retries: u32,

    /// Per-call LLM timeout in seconds.
    #[arg(long, env = "PDF2SLIDES_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDF2SLIDES_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Print chapters and extraction method only, no generation.
    #[arg(long)]
    inspect_only: bool,

    /// List template and colour scheme ids, then exit.
    #[arg(long)]
    list_styles: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2SLIDES_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2SLIDES_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2SLIDES_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs; --verbose always wins.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if cli.list_styles {
        println!("Templates:      {}", available_templates().join(", "));
        println!("Colour schemes: {}", available_color_schemes().join(", "));
        return Ok(());
    }

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn GenerationProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let Some(ref input) = cli.input else {
            bail!("--inspect-only needs a PDF path or URL");
        };
        let outline = inspect(input, &config).await.context("Failed to inspect PDF")?;
        println!(
            "{}",
            serde_json::to_string_pretty(&outline).context("Failed to serialise outline")?
        );
        return Ok(());
    }

    // ── Generate ─────────────────────────────────────────────────────────
    let deck = match (&cli.topic, &cli.input) {
        (Some(topic), _) => generate_from_topic(topic, cli.num_slides, &config)
            .await
            .context("Topic generation failed")?,
        (None, Some(input)) => generate_from_pdf(input, &config)
            .await
            .context("PDF generation failed")?,
        (None, None) => bail!("Provide a PDF path/URL or --topic"),
    };

    if let Some(ref output_path) = cli.output {
        write_deck(&deck, output_path)
            .await
            .context("Failed to write deck")?;
    } else {
        let json = serde_json::to_string_pretty(&deck).context("Failed to serialise deck")?;
        println!("{json}");
    }

    if !cli.quiet {
        print_summary(&deck, cli.output.as_ref());
    }

    Ok(())
}

/// One or two stderr lines describing the finished deck.
fn print_summary(deck: &SlideDeck, output: Option<&PathBuf>) {
    let s = &deck.stats;
    let target = output
        .map(|p| format!("  →  {}", bold(&p.display().to_string())))
        .unwrap_or_default();
    eprintln!(
        "{}  {} slides ({} dividers)  {}ms{}",
        if s.fallback_chapters == 0 { green("✔") } else { yellow("⚠") },
        s.total_slides(),
        s.divider_slides,
        s.total_duration_ms,
        target
    );
    if s.chapters_detected > 1 {
        eprintln!(
            "   {} chapters, {} processed, {} slides/chapter avg",
            dim(&s.chapters_detected.to_string()),
            dim(&s.chapters_processed.to_string()),
            dim(&format!("{:.1}", s.avg_slides_per_chapter())),
        );
    }
}

/// Map CLI args to `GenerationConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<GenerationConfig> {
    let mut builder = GenerationConfig::builder()
        .max_slides(cli.max_slides as usize)
        .slides_per_chapter(cli.slides_per_chapter)
        .ocr_language(cli.ocr_lang.clone())
        .ocr_dpi(cli.ocr_dpi)
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .topic_temperature(cli.topic_temperature)
        .max_retries(cli.max_retries)
        .api_timeout_secs(cli.api_timeout)
        .download_timeout_secs(cli.download_timeout)
        .style(DeckStyle::from_ids(&cli.template, &cli.color_scheme));

    if let Some(ref prompt) = cli.custom_prompt {
        builder = builder.custom_prompt(prompt.clone());
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
