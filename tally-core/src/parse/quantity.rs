//! Numeric value extraction.
//!
//! Precedence:
//! 1. `X plus Y` where both sides are numbers → `X + Y`
//! 2. the first ASCII digit run anywhere in the text
//! 3. the first whitespace token found in [`NUMBER_WORDS`]
//!
//! Compound phrases ("one hundred and twenty three") are not combined; the
//! first recognised magnitude wins.

use crate::text::{normalize_phrase, tokens};

pub const NUMBER_WORDS: &[(&str, u32)] = &[
    ("zero", 0),
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
    ("thirteen", 13),
    ("fourteen", 14),
    ("fifteen", 15),
    ("sixteen", 16),
    ("seventeen", 17),
    ("eighteen", 18),
    ("nineteen", 19),
    ("twenty", 20),
    ("thirty", 30),
    ("forty", 40),
    ("fifty", 50),
    ("sixty", 60),
    ("seventy", 70),
    ("eighty", 80),
    ("ninety", 90),
    ("hundred", 100),
];

/// Value of a single number word.
pub fn number_word(token: &str) -> Option<u32> {
    NUMBER_WORDS
        .iter()
        .find(|(word, _)| *word == token)
        .map(|(_, value)| *value)
}

/// Value of a token that is entirely digits or a number word.
pub fn number_token(token: &str) -> Option<u32> {
    if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
        return token.parse().ok();
    }
    number_word(token)
}

/// Extract a value from a raw transcript.
pub fn extract_number(transcript: &str) -> Option<u32> {
    let normalized = normalize_phrase(transcript);
    let toks = tokens(&normalized);

    if let Some(sum) = additive_pair(&toks) {
        return Some(sum);
    }
    if let Some(n) = first_digit_run(transcript) {
        return Some(n);
    }
    toks.iter().find_map(|t| number_word(t))
}

fn additive_pair(toks: &[&str]) -> Option<u32> {
    toks.windows(3).find_map(|w| {
        if w[1] != "plus" {
            return None;
        }
        let lhs = number_token(w[0])?;
        let rhs = number_token(w[2])?;
        Some(lhs.saturating_add(rhs))
    })
}

/// First digit run that fits in a `u32`; overflowing runs are skipped.
fn first_digit_run(text: &str) -> Option<u32> {
    let mut start: Option<usize> = None;
    for (i, c) in text.char_indices().chain(std::iter::once((text.len(), ' '))) {
        match (c.is_ascii_digit(), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                if let Ok(n) = text[s..i].parse::<u32>() {
                    return Some(n);
                }
                start = None;
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_are_found_anywhere() {
        assert_eq!(extract_number("add 5 shrimp"), Some(5));
        assert_eq!(extract_number("ribs12"), Some(12));
        assert_eq!(extract_number("set 007 wings"), Some(7));
    }

    #[test]
    fn digits_take_priority_over_words() {
        assert_eq!(extract_number("three ribs at 4"), Some(4));
    }

    #[test]
    fn number_words_are_recognised() {
        assert_eq!(extract_number("ribs at twelve"), Some(12));
        assert_eq!(extract_number("Ninety wings"), Some(90));
        assert_eq!(extract_number("a hundred"), Some(100));
        assert_eq!(extract_number("zero"), Some(0));
    }

    #[test]
    fn simple_addition_is_combined() {
        assert_eq!(extract_number("five plus three"), Some(8));
        assert_eq!(extract_number("ribs 10 plus 2"), Some(12));
        assert_eq!(extract_number("twenty plus 4 wings"), Some(24));
    }

    #[test]
    fn plus_without_two_numbers_falls_back() {
        assert_eq!(extract_number("rebs plus five"), Some(5));
    }

    #[test]
    fn compound_phrases_keep_first_magnitude() {
        assert_eq!(extract_number("one hundred and twenty"), Some(1));
    }

    #[test]
    fn nothing_numeric_is_none() {
        assert_eq!(extract_number("chicken"), None);
        assert_eq!(extract_number(""), None);
        // "tension" contains "ten" but is not the word
        assert_eq!(extract_number("tension"), None);
    }

    #[test]
    fn overflowing_digit_runs_are_skipped() {
        assert_eq!(extract_number("99999999999999999999 then 3"), Some(3));
    }
}
