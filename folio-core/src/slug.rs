//! Heading text to anchor id conversion

/// Convert heading text into a URL-safe anchor id.
///
/// Lowercases, drops everything except ASCII word characters, whitespace and
/// hyphens, then collapses runs of whitespace/hyphens into a single `-` and
/// strips hyphens from both ends. The result may be empty.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_dash = false;

    for ch in lowered.trim().chars() {
        if is_word_char(ch) {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else if is_separator(ch) {
            pending_dash = true;
        }
        // Anything else is removed without breaking a separator run
    }

    slug
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn is_separator(ch: char) -> bool {
    // U+FEFF counts as whitespace for anchor purposes even though Rust does not
    ch.is_whitespace() || ch == '-' || ch == '\u{feff}'
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "Hello World",
        "  Leading and trailing  ",
        "A & B!",
        "--already-slugged--",
        "Multiple   Spaces",
        "mixed - - dashes and\tTabs",
        "snake_case_name",
        "Émigré café",
        "100% Rust (2024)",
        "!!!",
        "what's new in v1.2?",
        "a\u{feff}b",
        "- - -",
    ];

    #[test]
    fn test_basic_slugs() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Bar Baz"), "bar-baz");
        assert_eq!(slugify("A & B!"), "a-b");
        assert_eq!(slugify("Multiple   Spaces"), "multiple-spaces");
    }

    #[test]
    fn test_strips_edges() {
        assert_eq!(slugify("  Leading and trailing  "), "leading-and-trailing");
        assert_eq!(slugify("--already-slugged--"), "already-slugged");
        assert_eq!(slugify("- - -"), "");
    }

    #[test]
    fn test_keeps_underscores_and_digits() {
        assert_eq!(slugify("snake_case_name"), "snake_case_name");
        assert_eq!(slugify("100% Rust (2024)"), "100-rust-2024");
    }

    #[test]
    fn test_removed_chars_do_not_split_words() {
        assert_eq!(slugify("what's new in v1.2?"), "whats-new-in-v12");
        assert_eq!(slugify("Émigré café"), "migr-caf");
    }

    #[test]
    fn test_only_special_chars_is_empty() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_byte_order_mark_is_separator() {
        assert_eq!(slugify("a\u{feff}b"), "a-b");
    }

    #[test]
    fn test_idempotent() {
        for sample in SAMPLES {
            let once = slugify(sample);
            assert_eq!(slugify(&once), once, "input: {:?}", sample);
        }
    }

    #[test]
    fn test_output_alphabet() {
        for sample in SAMPLES {
            let slug = slugify(sample);
            assert!(
                slug.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'),
                "bad char in {:?}",
                slug
            );
            assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            assert!(!slug.contains("--"));
        }
    }
}
