//! Prompts for the slide-writing model.
//!
//! Every prompt lives here so a wording change touches exactly one place and
//! unit tests can assert on the format instructions without a model.
//!
//! Both prompts spell out the same layout, because [`crate::pipeline::parse`]
//! relies on it:
//!
//! ```text
//! Slide 1
//! Title: <title>
//! - <bullet>
//! - <bullet>
//! ```

/// System message for topic runs.
pub const TOPIC_SYSTEM_PROMPT: &str =
    "You are an expert educator. Create well-structured slides.";

/// System message for chapter runs.
pub const CHAPTER_SYSTEM_PROMPT: &str =
    "You extract key information from texts into clear slides.";

/// A system + user message pair sent to the text backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    /// Sampling temperature for this call; `None` uses the backend default.
    pub temperature: Option<f32>,
}

/// Build the prompt for a free-text topic.
pub fn topic_prompt(topic: &str, num_slides: usize, custom: Option<&str>) -> Prompt {
    let mut user = format!(
        r#"Create {num_slides} educational slides about {topic}.

Format EXACTLY like this:

Slide 1
Title: Introduction to {topic}
- First key point about the topic
- Second important detail
- Third relevant fact

Slide 2
Title: Main Concept 1
- Explanation of concept
- Example or detail
- Additional information

Create {num_slides} slides with clear titles and 3-4 bullet points each."#
    );

    if let Some(extra) = custom.filter(|s| !s.trim().is_empty()) {
        user.push_str(&format!("\n\nADDITIONAL INSTRUCTIONS:\n{extra}"));
    }
    user.push_str(&format!("\n\nCreate {num_slides} slides now:"));

    Prompt {
        system: TOPIC_SYSTEM_PROMPT.to_string(),
        user,
        temperature: None,
    }
}

/// Build the prompt for one chapter. `content` is embedded verbatim; the
/// caller is responsible for truncating it.
pub fn chapter_prompt(
    chapter_title: &str,
    content: &str,
    num_slides: usize,
    custom: Option<&str>,
) -> Prompt {
    let mut user = format!(
        r#"Extract {num_slides} key topics from this chapter: "{chapter_title}"

CONTENT:
{content}

Create {num_slides} slides. Extract REAL information from the text.

Format:

Slide 1
Title: First Key Topic
- First point from content
- Second point from content
- Third point from content

Slide 2
Title: Second Key Topic
- Main concept
- Supporting detail
- Additional fact

Each slide needs a Title line and 2-4 lines starting with "-", "•" or "*".

Create {num_slides} slides:"#
    );

    if let Some(extra) = custom.filter(|s| !s.trim().is_empty()) {
        user.push_str(&format!("\n\nINSTRUCTIONS: {extra}"));
    }

    Prompt {
        system: CHAPTER_SYSTEM_PROMPT.to_string(),
        user,
        temperature: None,
    }
}
