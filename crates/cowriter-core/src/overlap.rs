/// Drops the prefix of `suggestion` that duplicates the tail of `prompt`.
///
/// Completion providers tend to echo the trailing characters of the prompt
/// before adding new text; this is the guard that keeps the echo from being
/// shown twice. Candidate overlaps are compared case-insensitively and the
/// largest matching length wins; the returned slice keeps the suggestion's
/// original casing. An empty prompt leaves the suggestion untouched and an
/// empty suggestion stays empty. A suggestion that is entirely an echo trims
/// to the empty string, which callers treat as "no suggestion".
///
/// Not idempotent in general: the trimmed remainder may itself overlap the
/// prompt tail again.
pub fn exclude_prompt_from_suggestion<'a>(prompt: &str, suggestion: &'a str) -> &'a str {
    if prompt.is_empty() || suggestion.is_empty() {
        return suggestion;
    }

    let prompt_chars: Vec<char> = prompt.chars().collect();
    let suggestion_chars: Vec<(usize, char)> = suggestion.char_indices().collect();
    let longest = prompt_chars.len().min(suggestion_chars.len());

    // Largest overlap wins, so scan candidates longest-first.
    let mut overlap = 0;
    for len in (1..=longest).rev() {
        let prompt_tail = &prompt_chars[prompt_chars.len() - len..];
        let matches = suggestion_chars[..len]
            .iter()
            .zip(prompt_tail.iter())
            .all(|(&(_, s), &p)| eq_ignore_case(s, p));

        if matches {
            overlap = len;
            break;
        }
    }

    if overlap == 0 {
        return suggestion;
    }

    match suggestion_chars.get(overlap) {
        Some(&(byte_offset, _)) => &suggestion[byte_offset..],
        None => "",
    }
}

fn eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_echoed_prompt_tail() {
        assert_eq!(
            exclude_prompt_from_suggestion("Hello wor", "world is great"),
            "ld is great"
        );
    }

    #[test]
    fn no_overlap_returns_suggestion_unchanged() {
        assert_eq!(exclude_prompt_from_suggestion("abc", "xyz"), "xyz");
    }

    #[test]
    fn empty_prompt_returns_suggestion_unchanged() {
        assert_eq!(exclude_prompt_from_suggestion("", "anything"), "anything");
    }

    #[test]
    fn empty_suggestion_stays_empty() {
        assert_eq!(exclude_prompt_from_suggestion("whatever", ""), "");
    }

    #[test]
    fn comparison_ignores_case_but_keeps_original_casing() {
        assert_eq!(exclude_prompt_from_suggestion("Hello WOR", "world"), "ld");
        assert_eq!(exclude_prompt_from_suggestion("hello wor", "WORLD"), "LD");
    }

    #[test]
    fn fully_echoed_suggestion_trims_to_empty() {
        assert_eq!(exclude_prompt_from_suggestion("Let's go", "let's go"), "");
    }

    #[test]
    fn largest_matching_overlap_wins() {
        // Both len 1 ("a") and len 3 ("aba") match; the longer one is taken.
        assert_eq!(exclude_prompt_from_suggestion("aba", "ababc"), "bc");
    }

    #[test]
    fn not_idempotent_when_remainder_overlaps_again() {
        let once = exclude_prompt_from_suggestion("aa", "aaa");
        assert_eq!(once, "a");

        let twice = exclude_prompt_from_suggestion("aa", once);
        assert_eq!(twice, "");
    }

    #[test]
    fn handles_multibyte_characters() {
        assert_eq!(
            exclude_prompt_from_suggestion("naïve caf", "café au lait"),
            "é au lait"
        );
    }
}
