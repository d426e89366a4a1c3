//! Item matching: the validated canonical set, alias lookup and candidate
//! assembly across transcript variants.

pub mod alias;
pub mod candidates;

pub use alias::{resolve_alias, AliasEntry, AliasTable};
pub use candidates::{build_candidates, Candidate, CandidateSet, MatchTier};

use crate::error::{Result, TallyError};
use crate::text::{normalize_phrase, skeleton};

/// One canonical item with its precomputed comparison forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalItem {
    /// Caller spelling (trimmed). This is what decisions report.
    pub name: String,
    pub normalized: String,
    pub skeleton: String,
    pub word_count: usize,
}

/// The authoritative item list for one request.
///
/// Blank entries are dropped and case-insensitive duplicates keep their first
/// spelling. Construction fails when nothing usable remains.
#[derive(Debug, Clone)]
pub struct CanonicalSet {
    items: Vec<CanonicalItem>,
}

impl CanonicalSet {
    pub fn new<S: AsRef<str>>(raw: &[S]) -> Result<Self> {
        let mut items: Vec<CanonicalItem> = Vec::with_capacity(raw.len());
        for name in raw {
            let name = name.as_ref().trim();
            let normalized = normalize_phrase(name);
            if normalized.is_empty() || items.iter().any(|i| i.normalized == normalized) {
                continue;
            }
            items.push(CanonicalItem {
                name: name.to_string(),
                skeleton: skeleton(&normalized),
                word_count: normalized.split_whitespace().count(),
                normalized,
            });
        }
        if items.is_empty() {
            return Err(TallyError::EmptyCanonicalSet);
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[CanonicalItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by any spelling that normalizes to its name.
    pub fn get(&self, name: &str) -> Option<&CanonicalItem> {
        let key = normalize_phrase(name);
        self.items.iter().find(|i| i.normalized == key)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_duplicate_items_are_dropped() {
        let set = CanonicalSet::new(&["RIBS", "  ", "ribs", " Crabs "]).expect("non-empty set");
        let names: Vec<&str> = set.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["RIBS", "Crabs"]);
    }

    #[test]
    fn empty_set_is_rejected() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            CanonicalSet::new(&empty),
            Err(TallyError::EmptyCanonicalSet)
        ));
        assert!(matches!(
            CanonicalSet::new(&["", "..."]),
            Err(TallyError::EmptyCanonicalSet)
        ));
    }

    #[test]
    fn lookup_is_normalized() {
        let set = CanonicalSet::new(&["SHRIMP SKEWER"]).expect("non-empty set");
        let item = set.get(" shrimp-skewer ").expect("normalized lookup");
        assert_eq!(item.name, "SHRIMP SKEWER");
        assert_eq!(item.word_count, 2);
        assert!(!set.contains("shrimp"));
    }
}
