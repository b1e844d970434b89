//! Ingredient name normalization.
//!
//! Turns a single free-text ingredient name into the lowercase key used
//! for deduplication, and provides the two presentation helpers derived
//! from names: [`title_case`] for display and [`slug`] for URL-safe ids.
//!
//! # Algorithm
//!
//! 1. Lowercase, collapse runs of whitespace to single spaces, trim.
//! 2. Apply [`MODIFIER_REWRITES`] in table order. A pattern only matches
//!    at the start of a word, so `"dry "` rewrites `"london dry gin"` but
//!    leaves `"sundry "` alone.
//! 3. Collapse whitespace again.
//! 4. Repeat 2–3 until nothing changes, which makes the function
//!    idempotent even when a rewrite exposes another pattern
//!    (`"freshly squeezed lime juice"` → `"lime juice"`).
//!
//! The table is a fixed lexicon of variants observed in the IBA data, not
//! a morphological analyzer: unknown modifiers pass through unchanged.
//!
//! # Example
//!
//! ```rust
//! use cocktail_graph_core::normalize::{normalize, title_case};
//!
//! assert_eq!(normalize("  Fresh   Lime Juice "), "lime juice");
//! assert_eq!(title_case(&normalize("Sweet Red Vermouth")), "Sweet Vermouth");
//! ```

/// Ordered `(pattern, replacement)` pairs stripping descriptive modifiers.
///
/// Longer patterns precede any shorter pattern they contain.
pub const MODIFIER_REWRITES: &[(&str, &str)] = &[
    ("fresh ", ""),
    ("freshly ", ""),
    ("squeezed ", ""),
    ("simple ", ""),
    ("sweet red ", "sweet "),
    ("dry ", ""),
];

/// Normalize a raw ingredient name into its lowercase dedup key.
///
/// Total over valid UTF-8. Returns `""` only when the input is empty
/// after trimming (or consists solely of modifiers).
pub fn normalize(raw: &str) -> String {
    let mut current = collapse_whitespace(&raw.to_lowercase());
    loop {
        let mut next = current.clone();
        for (pattern, replacement) in MODIFIER_REWRITES {
            next = replace_at_word_starts(&next, pattern, replacement);
        }
        let next = collapse_whitespace(&next);
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Uppercase the first character of every space-separated word.
///
/// Applied to the output of [`normalize`] wherever a human-facing name is
/// needed.
pub fn title_case(normalized: &str) -> String {
    normalized
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Derive a URL-safe slug from a display name.
///
/// Lowercases, drops parenthesized content, collapses every run of
/// characters outside `[a-z0-9]` into a single hyphen, and trims hyphens
/// from both ends.
pub fn slug(name: &str) -> String {
    let lower = name.to_lowercase();

    let mut without_parens = String::with_capacity(lower.len());
    let mut rest = lower.as_str();
    while let Some(open) = rest.find('(') {
        match rest[open..].find(')') {
            Some(close) => {
                without_parens.push_str(&rest[..open]);
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    without_parens.push_str(rest);

    let mut out = String::with_capacity(without_parens.len());
    let mut pending_hyphen = false;
    for c in without_parens.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    out
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replace `pattern` wherever it begins a word (start of string or after
/// a space).
fn replace_at_word_starts(s: &str, pattern: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < s.len() {
        let at_word_start = i == 0 || s[..i].ends_with(' ');
        if at_word_start && s[i..].starts_with(pattern) {
            out.push_str(replacement);
            i += pattern.len();
            continue;
        }
        // Advance one char, respecting UTF-8 boundaries.
        let ch = s[i..].chars().next().map(char::len_utf8).unwrap_or(1);
        out.push_str(&s[i..i + ch]);
        i += ch;
    }
    out
}
