//! Candidate assembly across transcript variants.
//!
//! ## Per-variant tiers
//!
//! ```text
//! variant ─► alias lookup ──hit──► Alias
//!              │ miss
//!              ▼
//!            canonical name among variant words ──hit──► Exact (longest name wins)
//!              │ miss
//!              ▼
//!            best window score ≥ fuzzy_floor ──► Fuzzy (+ runner-ups)
//! ```
//!
//! Each variant yields at most one *best* candidate. In the fuzzy tier, other
//! items that also clear the floor and sit within `ambiguity_margin` of the
//! best are kept as runner-ups so a near tie reaches the caller as ambiguity.
//! A fuzzy hit that only the consonant skeleton supports is flagged
//! `skeleton_only`; it may rank but never auto-commits.

use tracing::trace;

use super::alias::{resolve_alias_where, AliasTable};
use super::{CanonicalItem, CanonicalSet};
use crate::ipc::ItemChoice;
use crate::parse::content_tokens;
use crate::text::{contains_phrase, similarity, skeleton, tokens};

/// How a candidate was found. Declaration order is ranking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchTier {
    Alias,
    Exact,
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Canonical spelling.
    pub item: String,
    pub tier: MatchTier,
    /// `1.0` for alias/exact hits, the window score for fuzzy hits.
    pub score: f64,
    /// Index of the variant that produced it (0 = primary).
    pub variant: usize,
    /// Fuzzy hit whose plain similarity stayed below the floor.
    pub skeleton_only: bool,
}

/// Best candidate of one variant plus fuzzy runner-ups.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantMatch {
    pub best: Candidate,
    pub runners_up: Vec<Candidate>,
}

/// Thresholds for the fuzzy tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyThresholds {
    pub floor: f64,
    pub ambiguity_margin: f64,
}

// ---------------------------------------------------------------------------
// Single variant
// ---------------------------------------------------------------------------

/// Match one normalized variant against the canonical set.
pub fn match_variant(
    variant: &str,
    variant_index: usize,
    canon: &CanonicalSet,
    aliases: &AliasTable,
    thresholds: FuzzyThresholds,
) -> Option<VariantMatch> {
    if variant.is_empty() {
        return None;
    }

    let certain = |item: &CanonicalItem, tier| VariantMatch {
        best: Candidate {
            item: item.name.clone(),
            tier,
            score: 1.0,
            variant: variant_index,
            skeleton_only: false,
        },
        runners_up: Vec::new(),
    };

    if let Some(item) = alias_match(variant, canon, aliases) {
        return Some(certain(item, MatchTier::Alias));
    }
    if let Some(item) = exact_match(variant, canon) {
        return Some(certain(item, MatchTier::Exact));
    }
    fuzzy_match(variant, variant_index, canon, thresholds)
}

/// Alias hit whose target is a member of the canonical set.
pub fn alias_match<'c>(
    variant: &str,
    canon: &'c CanonicalSet,
    aliases: &AliasTable,
) -> Option<&'c CanonicalItem> {
    resolve_alias_where(variant, aliases, |key| canon.contains(key)).and_then(|key| canon.get(key))
}

/// Canonical names present in the variant as whole words; the longest (most
/// specific) wins. "rice" does not contain ICE.
pub fn exact_match<'c>(variant: &str, canon: &'c CanonicalSet) -> Option<&'c CanonicalItem> {
    let words = tokens(variant);
    let mut best: Option<&CanonicalItem> = None;
    for item in canon.items() {
        if !contains_phrase(&words, &item.normalized) {
            continue;
        }
        let longer = best.map_or(true, |b| item.normalized.len() > b.normalized.len());
        if longer {
            best = Some(item);
        }
    }
    best
}

fn fuzzy_match(
    variant: &str,
    variant_index: usize,
    canon: &CanonicalSet,
    thresholds: FuzzyThresholds,
) -> Option<VariantMatch> {
    let content = content_tokens(variant);
    if content.is_empty() {
        return None;
    }

    let mut scored: Vec<(usize, WindowScore)> = canon
        .items()
        .iter()
        .enumerate()
        .map(|(i, item)| (i, best_window_score(&content, item)))
        .filter(|(_, s)| s.score >= thresholds.floor)
        .collect();
    // Stable: equal scores keep canonical list order.
    scored.sort_by(|a, b| b.1.score.total_cmp(&a.1.score));

    let (&(best_idx, best), rest) = scored.split_first()?;
    let candidate = |idx: usize, s: WindowScore| Candidate {
        item: canon.items()[idx].name.clone(),
        tier: MatchTier::Fuzzy,
        score: s.score,
        variant: variant_index,
        skeleton_only: s.direct < thresholds.floor,
    };

    let runners_up = rest
        .iter()
        .filter(|(_, s)| best.score - s.score <= thresholds.ambiguity_margin)
        .map(|&(idx, s)| candidate(idx, s))
        .collect();

    trace!(variant_index, best_score = best.score, direct = best.direct, "fuzzy match");
    Some(VariantMatch {
        best: candidate(best_idx, best),
        runners_up,
    })
}

/// Best scores of one canonical item over every window of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindowScore {
    /// Best of plain and skeleton similarity.
    pub score: f64,
    /// Best plain similarity alone.
    pub direct: f64,
}

/// Highest fuzzy score of `item` against any window of the content tokens.
///
/// Windows span 1..=(item word count + 1) tokens; the whole content phrase is
/// always tried too.
pub fn best_window_score(content: &[String], item: &CanonicalItem) -> WindowScore {
    let max_width = (item.word_count + 1).min(content.len());
    let mut best = fuzzy_score(&content.join(" "), item);
    for width in 1..=max_width {
        for window in content.windows(width) {
            let s = fuzzy_score(&window.join(" "), item);
            best.score = best.score.max(s.score);
            best.direct = best.direct.max(s.direct);
        }
    }
    best
}

/// `max(dice(phrase, name), dice(skeleton(phrase), skeleton(name)))`, with
/// the plain Dice score kept alongside.
///
/// Skeletons shorter than two characters carry too little signal and are
/// ignored.
pub fn fuzzy_score(phrase: &str, item: &CanonicalItem) -> WindowScore {
    let direct = similarity(phrase, &item.normalized);
    let phrase_skeleton = skeleton(phrase);
    if phrase_skeleton.chars().count() < 2 || item.skeleton.chars().count() < 2 {
        return WindowScore {
            score: direct,
            direct,
        };
    }
    WindowScore {
        score: direct.max(similarity(&phrase_skeleton, &item.skeleton)),
        direct,
    }
}

// ---------------------------------------------------------------------------
// Across variants
// ---------------------------------------------------------------------------

/// Deduplicated candidates ranked by tier, then first-seen order.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    /// (first-seen sequence, candidate), kept sorted by (tier, sequence).
    entries: Vec<(usize, Candidate)>,
    next_seq: usize,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a candidate. A repeat of a known item keeps its first-seen
    /// position but is promoted to the stronger tier.
    pub fn push(&mut self, candidate: Candidate) {
        match self
            .entries
            .iter()
            .position(|(_, c)| c.item == candidate.item)
        {
            Some(i) => {
                let existing = &mut self.entries[i].1;
                if candidate.tier < existing.tier {
                    existing.tier = candidate.tier;
                }
                existing.score = existing.score.max(candidate.score);
                existing.skeleton_only &= candidate.skeleton_only;
            }
            None => {
                self.entries.push((self.next_seq, candidate));
                self.next_seq += 1;
            }
        }
        self.entries.sort_by_key(|(seq, c)| (c.tier, *seq));
    }

    pub fn push_match(&mut self, m: VariantMatch) {
        self.push(m.best);
        for runner in m.runners_up {
            self.push(runner);
        }
    }

    pub fn ranked(&self) -> impl Iterator<Item = &Candidate> {
        self.entries.iter().map(|(_, c)| c)
    }

    pub fn best(&self) -> Option<&Candidate> {
        self.ranked().next()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exactly three choices: ranked items padded with `UNMAPPED`.
    pub fn top_choices(&self) -> [ItemChoice; 3] {
        let mut ranked = self.ranked().map(|c| ItemChoice::Item(c.item.clone()));
        std::array::from_fn(|_| ranked.next().unwrap_or(ItemChoice::Unmapped))
    }
}

/// Run [`match_variant`] over every normalized variant (primary first).
pub fn build_candidates<S: AsRef<str>>(
    variants: &[S],
    canon: &CanonicalSet,
    aliases: &AliasTable,
    thresholds: FuzzyThresholds,
) -> CandidateSet {
    let mut set = CandidateSet::new();
    for (index, variant) in variants.iter().enumerate() {
        if let Some(m) = match_variant(variant.as_ref(), index, canon, aliases, thresholds) {
            set.push_match(m);
        }
    }
    set
}
