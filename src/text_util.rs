/// Maximum number of characters of prompt content considered when ranking.
pub const CONTENT_SNIPPET_MAX_CHARS: usize = 2048;

/// Characters treated as word separators by [`normalize`].
const SEPARATORS: &[char] = &['_', '-', '/', '.', ',', '\n', '\r', '\t'];

/// Canonicalize a string for matching.
///
/// Lower-cases, turns separator punctuation (`_ - / . ,` and line/tab
/// breaks) into spaces, collapses whitespace runs to a single space and
/// trims both ends.
pub fn normalize(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    let lowered = value.to_lowercase().replace(SEPARATORS, " ");
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Return at most the first `max_chars` characters of `text`.
pub fn snippet_for_search(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Strip trailing line breaks so printed prompts end cleanly.
pub fn trim_trailing_newlines(text: &str) -> &str {
    text.trim_end_matches(['\r', '\n'])
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn normalize_basic() {
        assert_eq!(normalize("Product-Brief"), "product brief");
    }

    #[test]
    fn normalize_replaces_every_separator() {
        assert_eq!(
            normalize("a_b-c/d.e,f\ng\rh\ti"),
            "a b c d e f g h i"
        );
    }

    #[test]
    fn normalize_collapses_and_trims() {
        assert_eq!(normalize("  --Release__Notes--  "), "release notes");
    }

    #[test]
    fn normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t\n "), "");
    }

    #[test]
    fn normalize_keeps_other_punctuation() {
        assert_eq!(normalize("What's up?"), "what's up?");
    }

    #[test]
    fn snippet_counts_chars_not_bytes() {
        assert_eq!(snippet_for_search("héllo", 2), "hé");
        assert_eq!(snippet_for_search("abc", 10), "abc");
        assert_eq!(snippet_for_search("abc", 0), "");
    }

    #[test]
    fn trim_trailing_newlines_only_touches_the_end() {
        assert_eq!(trim_trailing_newlines("\nbody\r\n\n"), "\nbody");
        assert_eq!(trim_trailing_newlines("body  "), "body  ");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(s in "[a-zA-Zà-ÿ0-9 _./,:!?\\t\\n-]{0,40}") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once.clone());
        }

        #[test]
        fn normalize_output_has_no_separators(s in "[a-zA-Z_./, \\t\\n-]{0,40}") {
            let out = normalize(&s);
            prop_assert!(!out.contains(SEPARATORS));
            prop_assert!(!out.contains("  "));
            prop_assert_eq!(out.trim(), out.as_str());
        }
    }
}
