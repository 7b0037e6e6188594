//! Chapter segmentation: group page texts into chapters by heading detection.
//!
//! A page opens a new chapter when it contains a `Chapter <n>` / `Section <n>`
//! heading (arabic or roman numeral) *and* the chapter being accumulated
//! already holds more than [`MIN_CHAPTER_CHARS`] characters. The size guard
//! keeps a table of contents, where every heading sits on one page, from
//! producing a string of empty chapters.
//!
//! Chapters partition the page sequence in order. When nothing is detected
//! the whole document becomes one chapter titled [`WHOLE_DOCUMENT_TITLE`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Title of the seed accumulator and of the synthetic whole-document chapter.
pub const WHOLE_DOCUMENT_TITLE: &str = "Complete Document";

/// A chapter heading only splits once the open chapter is longer than this.
pub const MIN_CHAPTER_CHARS: usize = 100;

static HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:chapter|section)\s+(?:\d+|[IVX]+)[:\s]+(.+?)(?:\n|$)").unwrap()
});

/// A contiguous run of pages treated as one topical unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    /// Page texts joined with `"\n"`.
    pub content: String,
    /// 0-based index of the first page.
    pub start_page: usize,
}

impl Chapter {
    fn seed() -> Self {
        Self {
            title: WHOLE_DOCUMENT_TITLE.to_string(),
            content: String::new(),
            start_page: 0,
        }
    }

    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// Detect a chapter heading in one page's text, returning it trimmed.
pub fn find_heading(page: &str) -> Option<&str> {
    HEADING_RE.find(page).map(|m| m.as_str().trim())
}

/// Split page texts into chapters. Never returns an empty list.
pub fn segment_chapters(pages: &[String]) -> Vec<Chapter> {
    let mut chapters = Vec::new();
    let mut current = Chapter::seed();

    for (idx, page) in pages.iter().enumerate() {
        match find_heading(page) {
            Some(heading) if current.char_count() > MIN_CHAPTER_CHARS => {
                debug!("Page {}: new chapter '{}'", idx + 1, heading);
                let next = Chapter {
                    title: heading.to_string(),
                    content: page.clone(),
                    start_page: idx,
                };
                chapters.push(std::mem::replace(&mut current, next));
            }
            _ => {
                current.content.push('\n');
                current.content.push_str(page);
            }
        }
    }

    if !current.content.trim().is_empty() {
        chapters.push(current);
    }

    if chapters.is_empty() {
        chapters.push(Chapter {
            title: WHOLE_DOCUMENT_TITLE.to_string(),
            content: pages.join("\n"),
            start_page: 0,
        });
    }

    debug!("Segmented {} pages into {} chapters", pages.len(), chapters.len());
    chapters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filler(n: usize) -> String {
        "The quick brown fox jumps over the lazy dog. ".repeat(n)
    }

    #[test]
    fn no_headings_yield_one_whole_document_chapter() {
        let pages = vec![filler(3), filler(2)];
        let chapters = segment_chapters(&pages);
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].title, WHOLE_DOCUMENT_TITLE);
        assert_eq!(chapters[0].start_page, 0);
    }

    #[test]
    fn empty_document_yields_synthetic_chapter() {
        let chapters = segment_chapters(&[]);
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].title, WHOLE_DOCUMENT_TITLE);
        assert!(chapters[0].content.is_empty());
    }

    #[test]
    fn headings_split_once_accumulator_is_large_enough() {
        let pages = vec![
            format!("Preface\n{}", filler(4)),
            format!("Chapter 1: Cells\n{}", filler(4)),
            format!("CHAPTER II Energy\n{}", filler(4)),
            format!("Section 3: Growth\n{}", filler(4)),
        ];
        let chapters = segment_chapters(&pages);
        let titles: Vec<_> = chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                WHOLE_DOCUMENT_TITLE,
                "Chapter 1: Cells",
                "CHAPTER II Energy",
                "Section 3: Growth"
            ]
        );
        let starts: Vec<_> = chapters.iter().map(|c| c.start_page).collect();
        assert_eq!(starts, vec![0, 1, 2, 3]);
    }

    #[test]
    fn heading_on_small_accumulator_is_merged() {
        let pages = vec![
            "Chapter 1: Intro\nshort".to_string(),
            format!("Chapter 2: Body\n{}", filler(4)),
        ];
        let chapters = segment_chapters(&pages);
        // The first page is too short to close, so both pages stay together.
        assert_eq!(chapters.len(), 1);
        assert!(chapters[0].content.contains("Chapter 2: Body"));
    }

    #[test]
    fn chapters_partition_pages_without_gaps() {
        let pages: Vec<String> = (0..6)
            .map(|i| {
                if i % 2 == 0 {
                    format!("Chapter {}: Part {}\n{}", i / 2 + 1, i, filler(3))
                } else {
                    filler(3)
                }
            })
            .collect();
        let chapters = segment_chapters(&pages);

        let mut expected_start = chapters[0].start_page;
        assert_eq!(expected_start, 0);
        for pair in chapters.windows(2) {
            assert!(pair[1].start_page > pair[0].start_page);
            expected_start = pair[1].start_page;
        }
        assert!(expected_start < pages.len());
        assert_eq!(chapters.len(), 3);
        assert_eq!(joined_contents(&chapters), seeded_join(&pages));
    }

    /// Chapter contents joined in order.
    fn joined_contents(chapters: &[Chapter]) -> String {
        chapters
            .iter()
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Page texts joined in order. The seed chapter opens with the `"\n"`
    /// separator for its first page, hence the leading newline.
    fn seeded_join(pages: &[String]) -> String {
        format!("\n{}", pages.join("\n"))
    }

    #[test]
    fn concatenation_survives_blank_pages_and_merged_headings() {
        let pages = vec![
            "Contents\nChapter 1: Intro\nChapter 2: Method".to_string(),
            String::new(),
            format!("Chapter 1: Intro\n{}", filler(3)),
            String::new(),
            format!("Section IV: Method\n{}", filler(2)),
            filler(1),
        ];
        let chapters = segment_chapters(&pages);
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[1].title, "Section IV: Method");
        assert_eq!(chapters[1].start_page, 4);
        assert_eq!(joined_contents(&chapters), seeded_join(&pages));
    }

    #[test]
    fn find_heading_trims_line_break() {
        assert_eq!(
            find_heading("intro\nchapter 4: Results\nmore"),
            Some("chapter 4: Results")
        );
        assert_eq!(find_heading("no heading here"), None);
    }
}
