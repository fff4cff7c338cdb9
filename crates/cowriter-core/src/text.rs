/// Reports whether `text` ends a grammatical sentence.
///
/// Purely a suffix check on the whitespace-trimmed string: `.`, `!` or `?`.
/// Empty and whitespace-only input never count as a sentence. No locale
/// awareness, no handling of abbreviations or nested punctuation.
pub fn is_sentence(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.ends_with('.') || trimmed.ends_with('!') || trimmed.ends_with('?')
}

/// Uppercases the first character, leaving the rest untouched.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Cleans up raw completion text before it reaches the editor.
///
/// Leading newline runs are stripped, interior newline runs collapse to a
/// single newline and surrounding whitespace is trimmed. Returns `None` when
/// nothing printable remains, which callers report as "no suggestion".
pub fn normalize_suggestion(raw: &str) -> Option<String> {
    let stripped = raw.trim_start_matches('\n');

    let mut collapsed = String::with_capacity(stripped.len());
    let mut in_newline_run = false;
    for ch in stripped.chars() {
        if ch == '\n' {
            if !in_newline_run {
                collapsed.push('\n');
                in_newline_run = true;
            }
        } else {
            in_newline_run = false;
            collapsed.push(ch);
        }
    }

    let trimmed = collapsed.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentence_requires_terminal_punctuation() {
        assert!(is_sentence("Hello."));
        assert!(is_sentence("Really?"));
        assert!(is_sentence("Wow!"));
        assert!(!is_sentence("Hello"));
        assert!(!is_sentence("Hello,"));
    }

    #[test]
    fn sentence_check_ignores_surrounding_whitespace() {
        assert!(is_sentence("  Done.  "));
        assert!(is_sentence("Done.\n"));
    }

    #[test]
    fn empty_is_not_a_sentence() {
        assert!(!is_sentence(""));
        assert!(!is_sentence("   "));
    }

    #[test]
    fn capitalize_uppercases_first_character_only() {
        assert_eq!(capitalize("this"), "This");
        assert_eq!(capitalize("this is fine"), "This is fine");
        assert_eq!(capitalize("Already"), "Already");
        assert_eq!(capitalize("123abc"), "123abc");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn normalize_strips_leading_newlines() {
        assert_eq!(
            normalize_suggestion("\n\nTest suggestion comes here").as_deref(),
            Some("Test suggestion comes here")
        );
        assert_eq!(
            normalize_suggestion("\nThis is a sample suggestion here").as_deref(),
            Some("This is a sample suggestion here")
        );
    }

    #[test]
    fn normalize_collapses_interior_newline_runs() {
        assert_eq!(normalize_suggestion("a\n\n\nb").as_deref(), Some("a\nb"));
        assert_eq!(normalize_suggestion("a\nb\n\nc").as_deref(), Some("a\nb\nc"));
    }

    #[test]
    fn normalize_trims_surrounding_whitespace() {
        assert_eq!(
            normalize_suggestion(" this starts with a space").as_deref(),
            Some("this starts with a space")
        );
    }

    #[test]
    fn normalize_maps_blank_input_to_none() {
        assert_eq!(normalize_suggestion(""), None);
        assert_eq!(normalize_suggestion("   "), None);
        assert_eq!(normalize_suggestion("\n\n"), None);
    }
}
