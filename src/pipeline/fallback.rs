//! Deterministic slide synthesis for when the model cannot be used.
//!
//! * [`direct_extraction`] — the non-generative path taken when the backend
//!   fails: split the source text into sentences, drop short ones and
//!   duplicates, and deal the rest into evenly sized chunks, one per slide.
//! * [`backfill`] — placeholder slides that bring a short list up to the
//!   exact requested count, numbered to continue the sequence.
//!
//! Neither depends on anything but its inputs, so the same text always
//! produces the same slides.

use crate::output::Slide;
use crate::pipeline::content::SlideScope;
use crate::pipeline::parse::{truncate_with_ellipsis, MAX_BULLETS, MAX_BULLET_CHARS};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Sentences of this many characters or fewer are ignored.
pub const MIN_SENTENCE_CHARS: usize = 30;

/// Direct-extraction titles use at most this many words of the first sentence...
const TITLE_WORDS: usize = 8;
/// ...and at most this many characters.
const TITLE_CHARS: usize = 60;

/// Smallest number of sentences dealt to one slide.
const MIN_CHUNK: usize = 3;

static SENTENCE_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

/// Why placeholder slides are being added. Selects the filler wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackfillReason {
    /// The model answered but produced fewer usable slides than requested.
    ShortReply,
    /// The backend failed and direct extraction ran out of sentences.
    BackendFailure,
}

/// Split `text` into trimmed sentences longer than [`MIN_SENTENCE_CHARS`],
/// de-duplicated case-insensitively in first-seen order.
pub fn unique_sentences(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    SENTENCE_END_RE
        .split(text)
        .map(str::trim)
        .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
        .filter(|s| seen.insert(s.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Build up to `count` slides straight from `source` without a model.
///
/// Slides are numbered from `offset + 1`. The result may be shorter than
/// `count` when the text holds too few sentences; call [`backfill`] after.
pub fn direct_extraction(
    source: &str,
    scope: &SlideScope,
    count: usize,
    offset: usize,
) -> Vec<Slide> {
    let sentences = unique_sentences(source);
    if count == 0 || sentences.is_empty() {
        return Vec::new();
    }

    let chunk = (sentences.len() / count).max(MIN_CHUNK);

    sentences
        .chunks(chunk)
        .take(count)
        .enumerate()
        .map(|(i, chunk)| {
            let content = chunk
                .iter()
                .take(MAX_BULLETS)
                .map(|s| truncate_with_ellipsis(s, MAX_BULLET_CHARS))
                .collect();
            let title = scope.slide_title(i + 1, Some(&chunk_title(&chunk[0])));
            scope.slide(offset + i + 1, title, content)
        })
        .collect()
}

fn chunk_title(first_sentence: &str) -> String {
    let words: Vec<&str> = first_sentence.split_whitespace().take(TITLE_WORDS).collect();
    truncate_with_ellipsis(&words.join(" "), TITLE_CHARS)
}

/// Append placeholder slides until `slides` holds `target` entries.
///
/// Returns how many were added. Placeholder `i` (1-based position in the
/// list) is numbered `offset + i`.
pub fn backfill(
    slides: &mut Vec<Slide>,
    target: usize,
    offset: usize,
    scope: &SlideScope,
    reason: BackfillReason,
) -> usize {
    let before = slides.len();
    while slides.len() < target {
        let index = slides.len() + 1;
        let title = scope.slide_title(index, None);
        slides.push(scope.slide(offset + index, title, filler_lines(scope, reason)));
    }
    slides.len() - before
}

fn filler_lines(scope: &SlideScope, reason: BackfillReason) -> Vec<String> {
    let subject = scope.subject();
    let lines: [String; 3] = match (scope, reason) {
        (SlideScope::Chapter { .. }, BackfillReason::ShortReply) => [
            format!("Additional information from {subject}"),
            "Key concepts".into(),
            "Important points".into(),
        ],
        (SlideScope::Chapter { .. }, BackfillReason::BackendFailure) => [
            format!("Information from {subject}"),
            "Key concepts and details".into(),
            "Important points".into(),
        ],
        (SlideScope::Topic { .. }, BackfillReason::ShortReply) => [
            format!("Key information about {subject}"),
            "Important details and concepts".into(),
            "Relevant examples".into(),
        ],
        (SlideScope::Topic { .. }, BackfillReason::BackendFailure) => [
            format!("Information about {subject}"),
            "Key concepts".into(),
            "Important details".into(),
        ],
    };
    lines.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(n: usize) -> SlideScope {
        SlideScope::Chapter {
            number: n,
            title: "Chapter 2: Cells".into(),
        }
    }

    const TEXT: &str = "Cells are the smallest unit of life on this planet. \
        The membrane regulates every exchange with the environment! \
        cells are the smallest unit of life on this planet. \
        Short one. \
        Mitochondria produce most of the chemical energy needed? \
        Ribosomes assemble proteins from amino acid chains. \
        The nucleus holds chromosomes made of tightly coiled DNA. \
        Vesicles move material between cellular compartments.";

    #[test]
    fn sentences_are_filtered_and_deduplicated() {
        let s = unique_sentences(TEXT);
        assert_eq!(s.len(), 6);
        assert_eq!(s[0], "Cells are the smallest unit of life on this planet");
        assert!(!s.iter().any(|x| x == "Short one"));
    }

    #[test]
    fn direct_extraction_chunks_and_numbers() {
        let slides = direct_extraction(TEXT, &chapter(2), 2, 4);
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].slide_number, 5);
        assert_eq!(slides[1].slide_number, 6);
        assert_eq!(slides[0].content.len(), 3);
        assert_eq!(
            slides[0].title,
            "Topic 2.1: Cells are the smallest unit of life on"
        );
        assert_eq!(slides[0].chapter, Some(2));
        assert!(!slides[0].needs_image);
    }

    #[test]
    fn direct_extraction_is_deterministic() {
        let a = direct_extraction(TEXT, &chapter(1), 3, 0);
        let b = direct_extraction(TEXT, &chapter(1), 3, 0);
        assert_eq!(a, b);
    }

    #[test]
    fn direct_extraction_runs_out_of_sentences() {
        // Six sentences with a minimum chunk of three cover only two slides.
        let slides = direct_extraction(TEXT, &chapter(1), 5, 0);
        assert_eq!(slides.len(), 2);
    }

    #[test]
    fn empty_source_yields_nothing() {
        assert!(direct_extraction("", &chapter(1), 3, 0).is_empty());
    }

    #[test]
    fn backfill_reaches_target_and_continues_numbering() {
        let mut slides = direct_extraction(TEXT, &chapter(3), 5, 10);
        let added = backfill(&mut slides, 5, 10, &chapter(3), BackfillReason::BackendFailure);
        assert_eq!(added, 3);
        assert_eq!(slides.len(), 5);
        let numbers: Vec<_> = slides.iter().map(|s| s.slide_number).collect();
        assert_eq!(numbers, vec![11, 12, 13, 14, 15]);
        assert_eq!(slides[4].title, "Topic 3.5");
        assert_eq!(slides[4].content[0], "Information from Chapter 2: Cells");
    }

    #[test]
    fn topic_backfill_wording() {
        let scope = SlideScope::Topic {
            topic: "Volcanoes".into(),
        };
        let mut slides = Vec::new();
        backfill(&mut slides, 2, 0, &scope, BackfillReason::ShortReply);
        assert_eq!(slides[1].title, "Topic 2");
        assert_eq!(slides[1].content[0], "Key information about Volcanoes");
        assert_eq!(slides[1].chapter, None);
    }

    #[test]
    fn backfill_never_shrinks() {
        let mut slides = direct_extraction(TEXT, &chapter(1), 2, 0);
        assert_eq!(backfill(&mut slides, 1, 0, &chapter(1), BackfillReason::ShortReply), 0);
        assert_eq!(slides.len(), 2);
    }
}
