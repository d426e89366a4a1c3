//! Bigram-overlap (Dice coefficient) similarity.
//!
//! ## Algorithm
//!
//! 1. Lowercase and trim both inputs.
//! 2. Equal strings score `1.0`.
//! 3. A string shorter than two characters has no bigrams → `0.0`.
//! 4. Otherwise `2·|A ∩ B| / (|A| + |B|)` over the *sets* of adjacent
//!    character pairs.
//!
//! Symmetric, bounded to `[0, 1]`, total for any input.

use std::collections::HashSet;

/// Dice similarity of two strings in `[0.0, 1.0]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    if a == b {
        return 1.0;
    }

    let a_bigrams = bigrams(&a);
    let b_bigrams = bigrams(&b);
    if a_bigrams.is_empty() || b_bigrams.is_empty() {
        return 0.0;
    }

    let shared = a_bigrams.intersection(&b_bigrams).count();
    (2 * shared) as f64 / (a_bigrams.len() + b_bigrams.len()) as f64
}

fn bigrams(s: &str) -> HashSet<(char, char)> {
    let chars: Vec<char> = s.chars().collect();
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}
