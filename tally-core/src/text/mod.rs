//! Phrase normalization shared by every matching stage.
//!
//! Canonical names, aliases and transcripts are all compared in the same
//! normalized form, so a caller can pass `"SHRIMP SKEWER"`, `" shrimp  skewer."`
//! or `"Shrimp-Skewer"` and get identical behaviour.

pub mod similarity;

pub use similarity::similarity;

/// Lowercase, replace punctuation with spaces, collapse whitespace, trim.
///
/// Alphanumerics, `'` and `&` survive (`"mac & cheese"`, `"chef's special"`).
pub fn normalize_phrase(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for c in raw.chars().flat_map(char::to_lowercase) {
        let keep = c.is_alphanumeric() || c == '\'' || c == '&';
        if keep {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }
    out
}

/// Whitespace tokens of an already-normalized phrase.
pub fn tokens(normalized: &str) -> Vec<&str> {
    normalized.split_whitespace().collect()
}

/// Whole-word search for a (possibly multi-word) phrase in a token list.
pub fn contains_phrase(tokens: &[&str], phrase: &str) -> bool {
    let needle: Vec<&str> = phrase.split_whitespace().collect();
    if needle.is_empty() || needle.len() > tokens.len() {
        return false;
    }
    tokens.windows(needle.len()).any(|w| w == needle.as_slice())
}

/// `tokens` with the first whole-word occurrence of `phrase` removed.
/// Returned unchanged when the phrase does not occur.
pub fn without_phrase<'a>(tokens: &[&'a str], phrase: &str) -> Vec<&'a str> {
    let needle: Vec<&str> = phrase.split_whitespace().collect();
    if needle.is_empty() || needle.len() > tokens.len() {
        return tokens.to_vec();
    }
    match tokens.windows(needle.len()).position(|w| w == needle.as_slice()) {
        Some(start) => tokens[..start]
            .iter()
            .chain(&tokens[start + needle.len()..])
            .copied()
            .collect(),
        None => tokens.to_vec(),
    }
}

/// Consonant skeleton of a phrase: per word, keep the first letter, drop
/// later vowels and collapse repeated letters.
///
/// `"rebs"` and `"ribs"` both become `"rbs"`. Recognizers confuse vowels far
/// more often than consonants, so the skeleton is a second opinion for the
/// fuzzy tier.
pub fn skeleton(normalized: &str) -> String {
    let mut out = String::with_capacity(normalized.len());
    for (i, word) in normalized.split_whitespace().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let mut last: Option<char> = None;
        for (j, c) in word.chars().enumerate() {
            if j > 0 && matches!(c, 'a' | 'e' | 'i' | 'o' | 'u') {
                continue;
            }
            if last == Some(c) {
                continue;
            }
            out.push(c);
            last = Some(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(normalize_phrase("  Add 5, Shrimp-Skewer!  "), "add 5 shrimp skewer");
        assert_eq!(normalize_phrase("Mac & Cheese"), "mac & cheese");
        assert_eq!(normalize_phrase("chef's   special"), "chef's special");
    }

    #[test]
    fn normalize_of_blank_is_empty() {
        assert_eq!(normalize_phrase(""), "");
        assert_eq!(normalize_phrase(" ... "), "");
    }

    #[test]
    fn contains_phrase_requires_whole_words() {
        let toks = tokens("please take away two ribs");
        assert!(contains_phrase(&toks, "take away"));
        assert!(contains_phrase(&toks, "ribs"));
        assert!(!contains_phrase(&toks, "rib"));
        assert!(!contains_phrase(&toks, "away take"));
        assert!(!contains_phrase(&toks, ""));
    }

    #[test]
    fn without_phrase_removes_first_whole_word_hit() {
        let toks = tokens("set mac and cheese at 4");
        assert_eq!(without_phrase(&toks, "mac and cheese"), ["set", "at", "4"]);
        assert_eq!(without_phrase(&toks, "cheese at"), ["set", "mac", "and", "4"]);
        assert_eq!(without_phrase(&toks, "mac cheese"), toks);
        assert_eq!(without_phrase(&tokens("ice rice"), "ice"), ["rice"]);
    }

    #[test]
    fn skeleton_drops_inner_vowels() {
        assert_eq!(skeleton("rebs"), "rbs");
        assert_eq!(skeleton("ribs"), "rbs");
        assert_eq!(skeleton("crabs"), "crbs");
        assert_eq!(skeleton("beef"), "bf");
        assert_eq!(skeleton("eggs roll"), "egs rl");
    }
}
