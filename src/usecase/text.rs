use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>").unwrap());
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Removes markup from free text: script/style blocks with their contents,
/// all remaining tags, then collapses runs of whitespace.
pub fn strip_markup(input: &str) -> String {
    let without_blocks = SCRIPT_STYLE.replace_all(input, "");
    let without_tags = TAG.replace_all(&without_blocks, "");
    WHITESPACE.replace_all(&without_tags, " ").trim().to_string()
}

/// Keeps the first `max_words` whitespace-separated words, appending an
/// ellipsis when anything was cut off.
pub fn trim_words(input: &str, max_words: usize) -> String {
    let words: Vec<&str> = input.split_whitespace().collect();
    if words.len() <= max_words {
        return words.join(" ");
    }
    let mut trimmed = words[..max_words].join(" ");
    trimmed.push('…');
    trimmed
}

/// Decodes the HTML entities the content store emits in titles back into
/// plain text. Coverage is deliberately the store's known emission set (the
/// named entities and smart-quote/dash references below), not general
/// numeric references such as `&#x27;`. `&amp;` goes last so double-escaped
/// input stays escaped once.
pub fn decode_entities(input: &str) -> String {
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#034;", "\"")
        .replace("&#039;", "'")
        .replace("&#8216;", "\u{2018}")
        .replace("&#8217;", "\u{2019}")
        .replace("&#8211;", "\u{2013}")
        .replace("&#8212;", "\u{2014}")
        .replace("&hellip;", "…")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Reduces a requested category slug to a safe lookup token: lowercased,
/// restricted to `[a-z0-9_-]`.
pub fn sanitize_slug(input: &str) -> String {
    input
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '_')
        .collect()
}
