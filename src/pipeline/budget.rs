//! Slide budget: how many content slides each chapter gets under the cap.
//!
//! A single chapter takes the whole cap and no divider. With several
//! chapters every divider costs one slide, and what is left is split evenly
//! (floor division) with a floor of one slide per chapter. Past the point
//! where the chapter count reaches the cap the floor over-commits; the
//! orchestrator's per-append check is what actually holds the cap.

use serde::Serialize;

/// Per-chapter slide allocation for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlideBudget {
    pub slides_per_chapter: usize,
    pub include_dividers: bool,
}

/// Allocate `cap` slides across `chapter_count` chapters.
pub fn allocate(chapter_count: usize, cap: usize) -> SlideBudget {
    if chapter_count <= 1 {
        return SlideBudget {
            slides_per_chapter: cap,
            include_dividers: false,
        };
    }

    let available = cap.saturating_sub(chapter_count);
    SlideBudget {
        slides_per_chapter: (available / chapter_count).max(1),
        include_dividers: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_chapter_gets_whole_cap_without_divider() {
        assert_eq!(
            allocate(1, 10),
            SlideBudget {
                slides_per_chapter: 10,
                include_dividers: false
            }
        );
    }

    #[test]
    fn zero_chapters_behave_like_one() {
        assert_eq!(allocate(0, 7).slides_per_chapter, 7);
        assert!(!allocate(0, 7).include_dividers);
    }

    #[test]
    fn three_chapters_share_what_dividers_leave() {
        assert_eq!(
            allocate(3, 10),
            SlideBudget {
                slides_per_chapter: 2,
                include_dividers: true
            }
        );
    }

    #[test]
    fn many_chapters_floor_at_one() {
        assert_eq!(
            allocate(12, 10),
            SlideBudget {
                slides_per_chapter: 1,
                include_dividers: true
            }
        );
        assert_eq!(allocate(5, 10).slides_per_chapter, 1);
    }

    #[test]
    fn two_chapters_large_cap() {
        assert_eq!(allocate(2, 30).slides_per_chapter, 14);
    }
}
