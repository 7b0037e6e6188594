//! Parse a model reply into slide drafts.
//!
//! The reply is expected to follow the layout the prompts ask for, but models
//! drift: numbered lists instead of `Slide N` markers, missing titles, prose
//! lines between bullets. The parser is tolerant in what it accepts and
//! strict in what it keeps. A draft needs at least [`MIN_BULLETS`] bullets
//! of more than [`MIN_BULLET_CHARS`] characters; anything less is discarded
//! and left for the backfill stage.

use once_cell::sync::Lazy;
use regex::Regex;

/// Bullets kept per slide.
pub const MAX_BULLETS: usize = 5;

/// Drafts with fewer bullets are dropped.
pub const MIN_BULLETS: usize = 2;

/// A bullet is kept only when longer than this.
pub const MIN_BULLET_CHARS: usize = 15;

/// Longer bullets are cut and suffixed with `...`.
pub const MAX_BULLET_CHARS: usize = 140;

static SLIDE_MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Slide\s+\d+").unwrap());

static NUMBERED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\d+\.").unwrap());

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Title:\s*(.+?)(?:\n|$)").unwrap());

/// One parsed slide before numbering and scope formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideDraft {
    /// `None` when the segment had no `Title:` line.
    pub title: Option<String>,
    pub bullets: Vec<String>,
}

/// Parse up to `expected` drafts from `raw`.
///
/// Titles longer than `title_limit` characters are shortened to
/// `title_limit - 3` characters plus `...`.
pub fn parse_slides(raw: &str, expected: usize, title_limit: usize) -> Vec<SlideDraft> {
    let segments: Vec<&str> = if SLIDE_MARKER_RE.is_match(raw) {
        SLIDE_MARKER_RE.split(raw).collect()
    } else {
        NUMBERED_RE.split(raw).collect()
    };

    let mut drafts = Vec::new();
    for segment in segments {
        if drafts.len() >= expected {
            break;
        }
        let trimmed = segment.trim();
        if trimmed.is_empty() || trimmed.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }

        let bullets = parse_bullets(segment);
        if bullets.len() < MIN_BULLETS {
            continue;
        }

        let title = TITLE_RE
            .captures(segment)
            .map(|caps| truncate_with_ellipsis(caps[1].trim(), title_limit));

        drafts.push(SlideDraft { title, bullets });
    }
    drafts
}

fn parse_bullets(segment: &str) -> Vec<String> {
    let mut bullets = Vec::new();
    for line in segment.lines() {
        let line = line.trim();
        if line.is_empty() || line.to_lowercase().contains("title:") {
            continue;
        }
        if !line.starts_with(is_bullet_marker) {
            continue;
        }
        let text = truncate_with_ellipsis(
            line.trim_start_matches(is_bullet_marker).trim(),
            MAX_BULLET_CHARS,
        );
        if text.chars().count() > MIN_BULLET_CHARS {
            bullets.push(text);
        }
    }
    bullets.truncate(MAX_BULLETS);
    bullets
}

fn is_bullet_marker(c: char) -> bool {
    matches!(c, '-' | '•' | '*')
}

/// Cut `text` to `limit` characters, replacing the tail with `...`.
///
/// Counts characters, not bytes, so multi-byte text is never split inside a
/// code point.
pub fn truncate_with_ellipsis(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut out: String = text.chars().take(limit.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_SLIDES: &str = "\
Slide 1
Title: Cell Structure
- Cells are the basic unit of every living organism
- The membrane controls what enters and leaves
- The nucleus stores the genetic material

Slide 2
Title: Energy
- Mitochondria convert nutrients into usable energy
- ATP is the energy currency of the cell
- Respiration consumes oxygen and releases carbon dioxide

Slide 3
Title: Division
- Mitosis produces two identical daughter cells
- Meiosis halves the chromosome count for gametes
- Errors in division can lead to disease
";

    #[test]
    fn three_well_formed_blocks() {
        let drafts = parse_slides(THREE_SLIDES, 3, 50);
        assert_eq!(drafts.len(), 3);
        let titles: Vec<_> = drafts.iter().map(|d| d.title.as_deref()).collect();
        assert_eq!(titles, vec![Some("Cell Structure"), Some("Energy"), Some("Division")]);
        assert!(drafts.iter().all(|d| d.bullets.len() == 3));
    }

    #[test]
    fn stops_at_expected_count() {
        assert_eq!(parse_slides(THREE_SLIDES, 2, 50).len(), 2);
    }

    #[test]
    fn block_with_one_bullet_is_discarded() {
        let raw = "\
Slide 1
Title: Too thin
- Only one bullet survives the length filter
- short

Slide 2
Title: Fine
- First bullet with enough characters
- Second bullet with enough characters
";
        let drafts = parse_slides(raw, 5, 50);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title.as_deref(), Some("Fine"));
    }

    #[test]
    fn numbered_list_fallback() {
        let raw = "\
1. Title: Photosynthesis
• Plants convert light into chemical energy
• Chlorophyll absorbs mostly red and blue light
2. Title: Respiration
* Glucose is broken down to release energy
* Oxygen is the final electron acceptor
";
        let drafts = parse_slides(raw, 5, 70);
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[1].title.as_deref(), Some("Respiration"));
        assert_eq!(drafts[0].bullets[0], "Plants convert light into chemical energy");
    }

    #[test]
    fn missing_title_is_none() {
        let raw = "Slide 1\n- Bullet number one is long enough\n- Bullet number two is long enough\n";
        let drafts = parse_slides(raw, 1, 70);
        assert_eq!(drafts[0].title, None);
    }

    #[test]
    fn long_title_and_bullets_are_cut() {
        let long_title = "T".repeat(80);
        let long_bullet = "b".repeat(200);
        let raw = format!("Slide 1\nTitle: {long_title}\n- {long_bullet}\n- another bullet long enough\n");
        let drafts = parse_slides(&raw, 1, 50);
        let title = drafts[0].title.as_deref().unwrap();
        assert_eq!(title.chars().count(), 50);
        assert!(title.ends_with("..."));
        assert_eq!(drafts[0].bullets[0].chars().count(), 140);
    }

    #[test]
    fn at_most_five_bullets() {
        let bullets: String = (1..=8)
            .map(|i| format!("- bullet number {i} with plenty of text\n"))
            .collect();
        let raw = format!("Slide 1\nTitle: Many\n{bullets}");
        assert_eq!(parse_slides(&raw, 1, 70)[0].bullets.len(), MAX_BULLETS);
    }

    #[test]
    fn stacked_markers_are_all_stripped() {
        let raw = "Slide 1\n-•* stacked markers are removed here\n- a second bullet that is long\n";
        assert_eq!(
            parse_slides(raw, 1, 70)[0].bullets[0],
            "stacked markers are removed here"
        );
    }

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate_with_ellipsis("ééééé", 4), "é...");
        assert_eq!(truncate_with_ellipsis("short", 10), "short");
    }

    #[test]
    fn prose_only_reply_yields_nothing() {
        assert!(parse_slides("I cannot help with that request.", 3, 70).is_empty());
    }
}
