//! Post-processing: deterministic cleanup of a model reply before parsing.
//!
//! ## Why clean before parsing?
//!
//! The slide parser keys on line starts (`Slide 3`, `Title:`, `- `). Model
//! replies routinely break that in small ways that have nothing to do with
//! content:
//!
//! - the whole reply wrapped in a ```` ```text ```` fence
//! - Windows `\r\n` line endings, which leave a `\r` on every title
//! - a chat-template echo (system prompt, user prompt, then an `assistant`
//!   role line) in front of the actual answer, from local models that
//!   decode the full sequence
//! - zero-width spaces or a BOM in front of a bullet marker
//!
//! Each rule is a pure `&str → String` pass and is tested on its own.
//!
//! ## Rule order
//!
//! Line endings are normalised before the role-line search so `(?m)^...$`
//! anchors see clean lines; invisible characters go before the final trim so
//! a leading BOM does not survive it.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to a raw model reply.
///
/// Rules (applied in order):
/// 1. Strip an outer code fence
/// 2. Normalise line endings (CRLF → LF)
/// 3. Drop everything up to and including a bare `assistant` role line
/// 4. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 5. Trim trailing whitespace per line and around the whole reply
pub fn clean_response(input: &str) -> String {
    let s = strip_outer_fence(input);
    let s = normalise_line_endings(&s);
    let s = strip_template_echo(&s);
    let s = remove_invisible_chars(&s);
    trim_whitespace(&s)
}

// ── Rule 1: Strip outer code fence ───────────────────────────────────────

static RE_OUTER_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z]*\r?\n(.*)\r?\n```\s*$").unwrap());

fn strip_outer_fence(input: &str) -> String {
    match RE_OUTER_FENCE.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Strip chat-template echo ─────────────────────────────────────
//
// Only a line that is nothing but the role name (optionally wrapped in the
// usual template tokens) counts. "assistant" inside a sentence is content.

static RE_ASSISTANT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)^[ \t]*(?:<\|im_start\|>|<\|assistant\|>)?[ \t]*assistant[ \t]*:?[ \t]*$")
        .unwrap()
});

fn strip_template_echo(input: &str) -> String {
    match RE_ASSISTANT_LINE.find(input) {
        Some(m) => input[m.end()..].to_string(),
        None => input.to_string(),
    }
}

// ── Rule 4: Remove invisible Unicode characters ──────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 5: Trim whitespace ──────────────────────────────────────────────

fn trim_whitespace(input: &str) -> String {
    input
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
