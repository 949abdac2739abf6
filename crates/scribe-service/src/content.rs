//! Text helpers applied to generated content before it is stored.
//!
//! Everything here is pure: slug derivation, tag stripping, word and
//! read-time estimates, excerpt/meta extraction and tweet splitting.
//! Truncation always counts characters so multi-byte text is never split.

use regex::Regex;
use std::sync::LazyLock;

/// Average reading speed used for read-time estimates
pub const WORDS_PER_MINUTE: usize = 225;

pub const MAX_SLUG_CHARS: usize = 100;
pub const MAX_EXCERPT_CHARS: usize = 300;
pub const MAX_META_DESCRIPTION_CHARS: usize = 160;
pub const MAX_META_TITLE_CHARS: usize = 60;

const ELLIPSIS: &str = "...";

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static SLUG_STRIP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9\s-]").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});
static TWEET_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?i:tweet)\s*\d+\s*[:.)-]|\d+[.)]|[-*•])\s*").unwrap()
});
static CODE_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*\n(.*?)\n?\s*```\s*$").unwrap());

/// URL-safe slug: lowercase ascii alphanumerics joined by hyphens
pub fn generate_slug(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = SLUG_STRIP_RE.replace_all(&lowered, "");
    let hyphenated = WHITESPACE_RE.replace_all(&stripped, "-");
    let slug: String = hyphenated.chars().take(MAX_SLUG_CHARS).collect();

    if slug.trim_matches('-').is_empty() {
        "article".to_string()
    } else {
        slug
    }
}

/// Suffix a taken slug with the creation timestamp in milliseconds
pub fn unique_slug(base: &str, taken: bool, now_millis: i64) -> String {
    if taken {
        format!("{base}-{now_millis}")
    } else {
        base.to_string()
    }
}

pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").into_owned()
}

/// Remove a markdown code fence the model sometimes wraps around HTML
pub fn strip_code_fence(text: &str) -> String {
    match CODE_FENCE_RE.captures(text) {
        Some(caps) => caps[1].to_string(),
        None => text.to_string(),
    }
}

pub fn count_words(html: &str) -> usize {
    strip_tags(html).split_whitespace().count()
}

pub fn read_time_minutes(word_count: usize) -> usize {
    word_count.div_ceil(WORDS_PER_MINUTE)
}

/// Keep `text` when it fits in `max` characters, else cut to `max - 3` and append `...`
pub fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let keep = max.saturating_sub(ELLIPSIS.len());
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

pub fn meta_title(title: &str) -> String {
    truncate_with_ellipsis(title, MAX_META_TITLE_CHARS)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentMeta {
    pub excerpt: String,
    pub meta_description: String,
}

/// Excerpt from the first paragraph of the text, meta description from the excerpt.
/// A blank first paragraph falls back to the start of the whole text.
pub fn extract_meta(html: &str) -> ContentMeta {
    let text = strip_tags(html);
    let first_paragraph = match text.split("\n\n").next().map(str::trim) {
        Some(paragraph) if !paragraph.is_empty() => paragraph.to_string(),
        _ => text.trim().chars().take(MAX_EXCERPT_CHARS).collect(),
    };

    let excerpt = truncate_with_ellipsis(&first_paragraph, MAX_EXCERPT_CHARS);
    let meta_description = truncate_with_ellipsis(&excerpt, MAX_META_DESCRIPTION_CHARS);

    ContentMeta {
        excerpt,
        meta_description,
    }
}

/// Article identifiers are UUIDs; anything else is looked up as a slug
pub fn is_uuid(identifier: &str) -> bool {
    UUID_RE.is_match(identifier)
}

/// Split raw completion output into individual tweets
pub fn parse_tweets(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .map(|line| TWEET_PREFIX_RE.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_slug_basic() {
        assert_eq!(generate_slug("Hello World"), "hello-world");
    }

    #[test]
    fn test_generate_slug_drops_punctuation() {
        assert_eq!(
            generate_slug("Rust 2024: What's New?"),
            "rust-2024-whats-new"
        );
    }

    #[test]
    fn test_generate_slug_collapses_whitespace() {
        assert_eq!(generate_slug("a   b\t\nc"), "a-b-c");
    }

    #[test]
    fn test_generate_slug_keeps_hyphens() {
        assert_eq!(generate_slug("Self-hosted CI"), "self-hosted-ci");
    }

    #[test]
    fn test_generate_slug_caps_length() {
        let title = "word ".repeat(60);
        assert_eq!(generate_slug(&title).chars().count(), MAX_SLUG_CHARS);
    }

    #[test]
    fn test_generate_slug_falls_back_when_nothing_survives() {
        assert_eq!(generate_slug("!!! ???"), "article");
        assert_eq!(generate_slug("日本語"), "article");
    }

    #[test]
    fn test_unique_slug_suffixes_taken_slug() {
        assert_eq!(unique_slug("hello", false, 1_700_000_000_000), "hello");
        assert_eq!(
            unique_slug("hello", true, 1_700_000_000_000),
            "hello-1700000000000"
        );
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(
            strip_tags("<h1>Title</h1><p>Some <strong>bold</strong> text</p>"),
            "TitleSome bold text"
        );
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(
            strip_code_fence("```html\n<h1>Hi</h1>\n<p>there</p>\n```"),
            "<h1>Hi</h1>\n<p>there</p>"
        );
        assert_eq!(strip_code_fence("<p>plain</p>"), "<p>plain</p>");
    }

    #[test]
    fn test_count_words_ignores_markup() {
        assert_eq!(
            count_words("<h1>Three word title</h1>\n<p>and two</p>"),
            5
        );
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   <br/>  "), 0);
    }

    #[test]
    fn test_read_time_rounds_up() {
        assert_eq!(read_time_minutes(0), 0);
        assert_eq!(read_time_minutes(1), 1);
        assert_eq!(read_time_minutes(225), 1);
        assert_eq!(read_time_minutes(226), 2);
        assert_eq!(read_time_minutes(2000), 9);
    }

    #[test]
    fn test_meta_title_short_title_unchanged() {
        assert_eq!(meta_title("Short title"), "Short title");
        let exactly_sixty = "x".repeat(60);
        assert_eq!(meta_title(&exactly_sixty), exactly_sixty);
    }

    #[test]
    fn test_meta_title_truncates_long_title() {
        let title = "y".repeat(61);
        let meta = meta_title(&title);
        assert_eq!(meta.chars().count(), 60);
        assert_eq!(meta, format!("{}...", "y".repeat(57)));
    }

    #[test]
    fn test_truncate_respects_multibyte_characters() {
        let title = "é".repeat(70);
        let meta = meta_title(&title);
        assert_eq!(meta, format!("{}...", "é".repeat(57)));
    }

    #[test]
    fn test_extract_meta_uses_first_paragraph() {
        let html = "<h1>Intro</h1>\n\n<p>Second paragraph</p>";
        let meta = extract_meta(html);
        assert_eq!(meta.excerpt, "Intro");
        assert_eq!(meta.meta_description, "Intro");
    }

    #[test]
    fn test_extract_meta_blank_first_paragraph_uses_text_start() {
        let meta = extract_meta("\n\n<p>Real start</p>\n\nMore");
        assert_eq!(meta.excerpt, "Real start\n\nMore");

        let long = format!("  \n\n{}", "y".repeat(350));
        let meta = extract_meta(&long);
        assert_eq!(meta.excerpt, "y".repeat(300));
    }

    #[test]
    fn test_extract_meta_truncates_excerpt_and_description() {
        let paragraph = "z".repeat(400);
        let meta = extract_meta(&format!("<p>{paragraph}</p>"));

        assert_eq!(meta.excerpt.chars().count(), 300);
        assert!(meta.excerpt.ends_with("..."));
        assert_eq!(meta.meta_description.chars().count(), 160);
        assert_eq!(meta.meta_description, format!("{}...", "z".repeat(157)));
    }

    #[test]
    fn test_extract_meta_empty_content() {
        let meta = extract_meta("");
        assert_eq!(meta.excerpt, "");
        assert_eq!(meta.meta_description, "");
    }

    #[test]
    fn test_is_uuid() {
        assert!(is_uuid("123e4567-e89b-12d3-a456-426614174000"));
        assert!(is_uuid("123E4567-E89B-12D3-A456-426614174000"));
        assert!(!is_uuid("hello-world"));
        assert!(!is_uuid("123e4567-e89b-12d3-a456-42661417400"));
        assert!(!is_uuid("123e4567-e89b-12d3-a456-426614174000-extra"));
    }

    #[test]
    fn test_parse_tweets_strips_numbering_and_blank_lines() {
        let raw = "1. We're hiring a Rust engineer! #jobs\n\n2) Join our team today. Apply now!\n- Remote friendly #rust\n";
        assert_eq!(
            parse_tweets(raw),
            vec![
                "We're hiring a Rust engineer! #jobs",
                "Join our team today. Apply now!",
                "Remote friendly #rust",
            ]
        );
    }

    #[test]
    fn test_parse_tweets_strips_tweet_labels() {
        let raw = "Tweet 1: Big news!\nTWEET 2 - Apply now!";
        assert_eq!(parse_tweets(raw), vec!["Big news!", "Apply now!"]);
    }

    #[test]
    fn test_parse_tweets_keeps_numbers_inside_text() {
        assert_eq!(
            parse_tweets("2024 is the year of Rust"),
            vec!["2024 is the year of Rust"]
        );
    }
}
