//! `ResolutionEngine` — turns one utterance into one decision.
//!
//! ## Resolution order
//!
//! ```text
//! primary transcript ─► alias match ──hit──────────────┐
//!        │ miss                                         │
//!        ▼                                              ▼
//! primary + alternatives ─► candidate builder ─► candidate set
//!                                                       │
//!                 0 ─► UNMAPPED (terminal)               │
//!                >1 ─► NEEDS_CONFIRMATION                │
//!                 1 ─► operation + value on primary ─► AUTO_COMMIT
//!                          (no explicit verb / no value ─► NEEDS_CONFIRMATION)
//! ```
//!
//! ## Threading
//!
//! The engine holds only its configuration. `resolve` takes `&self`, does no
//! I/O and never blocks, so one engine can be shared across threads freely.

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, warn};

use crate::{
    error::{Result, TallyError},
    ipc::{DecisionState, ItemChoice, Operation, ResolutionDecision, ResolutionRequest},
    matching::{
        candidates::{alias_match, build_candidates, Candidate, FuzzyThresholds},
        CandidateSet, CanonicalSet, MatchTier,
    },
    parse::{extract_number, operation::classify_tokens},
    text::{normalize_phrase, tokens, without_phrase},
};

/// Configuration for `ResolutionEngine`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ResolverConfig {
    /// Minimum fuzzy score for a variant to contribute a candidate.
    /// Default: 0.60.
    pub fuzzy_floor: f64,
    /// Fuzzy runner-ups within this distance of the best score are surfaced
    /// as ambiguity. Default: 0.25.
    pub ambiguity_margin: f64,
    /// Maximum number of recognizer alternatives accepted per request.
    /// Default: 3.
    pub max_alternatives: usize,
    /// Master switch for alias learning; ANDed with the per-request flag.
    /// Default: true.
    pub allow_alias_auto_save: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fuzzy_floor: 0.60,
            ambiguity_margin: 0.25,
            max_alternatives: 3,
            allow_alias_auto_save: true,
        }
    }
}

impl ResolverConfig {
    /// Clamp every field into its valid range.
    pub fn normalize(&mut self) {
        let defaults = Self::default();
        self.fuzzy_floor = clamp_unit(self.fuzzy_floor, defaults.fuzzy_floor);
        self.ambiguity_margin = clamp_unit(self.ambiguity_margin, defaults.ambiguity_margin);
        self.max_alternatives = self.max_alternatives.min(8);
    }

    fn thresholds(&self) -> FuzzyThresholds {
        FuzzyThresholds {
            floor: self.fuzzy_floor,
            ambiguity_margin: self.ambiguity_margin,
        }
    }
}

fn clamp_unit(v: f64, fallback: f64) -> f64 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        fallback
    }
}

/// Stateless intent resolver.
#[derive(Debug, Clone, Default)]
pub struct ResolutionEngine {
    config: ResolverConfig,
}

impl ResolutionEngine {
    pub fn new(mut config: ResolverConfig) -> Self {
        config.normalize();
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve one utterance.
    ///
    /// # Errors
    /// - `TallyError::EmptyCanonicalSet` if no usable canonical item was given.
    /// - `TallyError::InvalidRequest` if more alternatives than
    ///   `max_alternatives` were supplied.
    ///
    /// Unmappable or ambiguous utterances are *not* errors; they come back as
    /// `UNMAPPED` / `NEEDS_CONFIRMATION` decisions.
    pub fn resolve(&self, request: &ResolutionRequest) -> Result<ResolutionDecision> {
        let canon = CanonicalSet::new(&request.canonical_items)?;
        if request.alternatives.len() > self.config.max_alternatives {
            return Err(TallyError::InvalidRequest(format!(
                "{} alternatives supplied, at most {} accepted",
                request.alternatives.len(),
                self.config.max_alternatives
            )));
        }

        let span = debug_span!(
            "resolve",
            transcript_len = request.transcript.len(),
            alternatives = request.alternatives.len(),
            has_context = request.recent_context.is_some(),
        );
        let _enter = span.enter();

        let primary = normalize_phrase(&request.transcript);
        let candidates = self.collect_candidates(&primary, request, &canon);

        let Some(best) = candidates.best() else {
            debug!("no candidate from any variant");
            return Ok(ResolutionDecision::unmapped());
        };
        let canonical_item = ItemChoice::Item(best.item.clone());

        // The item's own words ("mac and cheese", "7 up") are not command
        // language.
        let primary_tokens = tokens(&primary);
        let command = without_phrase(&primary_tokens, &normalize_phrase(&best.item));
        let op = classify_tokens(&command);
        let value = match op.operation {
            Operation::Erase => Some(0),
            _ => extract_number(&command.join(" ")),
        };

        let decision_state = if candidates.len() > 1 {
            debug!(candidates = candidates.len(), "ambiguous item");
            DecisionState::NeedsConfirmation
        } else if best.skeleton_only {
            debug!(item = %best.item, "item heard only through its consonant skeleton");
            DecisionState::NeedsConfirmation
        } else if !op.explicit {
            debug!("no explicit operation verb");
            DecisionState::NeedsConfirmation
        } else if value.is_none() {
            debug!("no value in transcript");
            DecisionState::NeedsConfirmation
        } else {
            DecisionState::AutoCommit
        };

        let alias_to_save =
            self.alias_recommendation(request, &canon, &best.item, &primary, decision_state);

        let mut decision = ResolutionDecision {
            canonical_item,
            operation: Some(op.operation),
            value,
            decision_state,
            top_choices: candidates.top_choices(),
            alias_to_save,
        };
        if decision.enforce_alias_postcondition() {
            warn!("dropped alias recommendation outside AUTO_COMMIT");
        }

        debug!(
            item = %decision.canonical_item,
            state = ?decision.decision_state,
            operation = ?decision.operation,
            value = ?decision.value,
            "resolved"
        );
        Ok(decision)
    }

    fn collect_candidates(
        &self,
        primary: &str,
        request: &ResolutionRequest,
        canon: &CanonicalSet,
    ) -> CandidateSet {
        let mut set = CandidateSet::new();

        // An alias hit on the primary is authoritative; alternatives are
        // not consulted.
        if let Some(item) = alias_match(primary, canon, &request.alias_table) {
            debug!(item = %item.name, "alias hit on primary");
            set.push(Candidate {
                item: item.name.clone(),
                tier: MatchTier::Alias,
                score: 1.0,
                variant: 0,
                skeleton_only: false,
            });
            return set;
        }

        let variants: Vec<String> = std::iter::once(primary.to_string())
            .chain(request.alternatives.iter().map(|a| normalize_phrase(a)))
            .collect();
        build_candidates(
            &variants,
            canon,
            &request.alias_table,
            self.config.thresholds(),
        )
    }

    fn alias_recommendation(
        &self,
        request: &ResolutionRequest,
        canon: &CanonicalSet,
        item: &str,
        primary: &str,
        state: DecisionState,
    ) -> Option<String> {
        if state != DecisionState::AutoCommit
            || !self.config.allow_alias_auto_save
            || !request.allow_alias_auto_save
            || primary.is_empty()
        {
            return None;
        }
        if canon.contains(primary) {
            return None;
        }
        if request.alias_table.contains_alias(item, primary) {
            return None;
        }
        Some(primary.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::AliasTable;

    fn engine() -> ResolutionEngine {
        ResolutionEngine::new(ResolverConfig::default())
    }

    #[test]
    fn empty_canonical_set_fails_fast() {
        let req = ResolutionRequest::new("add 5 ribs", Vec::<String>::new());
        assert!(matches!(
            engine().resolve(&req),
            Err(TallyError::EmptyCanonicalSet)
        ));
    }

    #[test]
    fn too_many_alternatives_is_invalid() {
        let req = ResolutionRequest::new("add 5 ribs", ["RIBS"])
            .with_alternatives(["a", "b", "c", "d"]);
        assert!(matches!(
            engine().resolve(&req),
            Err(TallyError::InvalidRequest(_))
        ));
    }

    #[test]
    fn alias_hit_skips_alternatives() {
        let req = ResolutionRequest::new("add 2 baby backs", ["RIBS", "CRABS"])
            .with_alternatives(["add 2 crabs"])
            .with_alias_table(AliasTable::new().with("RIBS", ["baby backs"]));
        let d = engine().resolve(&req).expect("resolve");
        assert_eq!(d.canonical_item, ItemChoice::Item("RIBS".into()));
        assert_eq!(d.decision_state, DecisionState::AutoCommit);
        assert_eq!(d.top_choices[1], ItemChoice::Unmapped);
    }

    #[test]
    fn alternatives_can_introduce_ambiguity() {
        let req = ResolutionRequest::new("add 2 ribs", ["RIBS", "CRABS"])
            .with_alternatives(["add 2 crabs"]);
        let d = engine().resolve(&req).expect("resolve");
        assert_eq!(d.decision_state, DecisionState::NeedsConfirmation);
        assert_eq!(d.canonical_item, ItemChoice::Item("RIBS".into()));
        assert_eq!(d.top_choices[1], ItemChoice::Item("CRABS".into()));
        assert!(d.alias_to_save.is_none());
    }

    #[test]
    fn alternatives_can_rescue_unmatched_primary() {
        let req = ResolutionRequest::new("add two bananas", ["BRISKET"])
            .with_alternatives(["", "add two brisket"]);
        let d = engine().resolve(&req).expect("resolve");
        assert_eq!(d.canonical_item, ItemChoice::Item("BRISKET".into()));
        assert_eq!(d.decision_state, DecisionState::AutoCommit);
        assert_eq!(d.value, Some(2));
    }

    #[test]
    fn missing_value_needs_confirmation() {
        let req = ResolutionRequest::new("add ribs", ["RIBS"]);
        let d = engine().resolve(&req).expect("resolve");
        assert_eq!(d.operation, Some(Operation::Add));
        assert_eq!(d.value, None);
        assert_eq!(d.decision_state, DecisionState::NeedsConfirmation);
    }

    #[test]
    fn alias_learning_respects_both_switches() {
        let req = ResolutionRequest::new("add 3 rebs", ["RIBS"]).with_alternatives(["add 3 ribs"]);

        let d = engine().resolve(&req.clone().with_auto_save(false)).expect("resolve");
        assert_eq!(d.decision_state, DecisionState::AutoCommit);
        assert!(d.alias_to_save.is_none());

        let d = engine().resolve(&req.clone().with_auto_save(true)).expect("resolve");
        assert_eq!(d.alias_to_save.as_deref(), Some("add 3 rebs"));

        let locked = ResolutionEngine::new(ResolverConfig {
            allow_alias_auto_save: false,
            ..ResolverConfig::default()
        });
        let d = locked.resolve(&req.with_auto_save(true)).expect("resolve");
        assert!(d.alias_to_save.is_none());
    }

    #[test]
    fn transcript_equal_to_item_is_not_learned() {
        // "at 5" belongs to the item name, so no verb or value is left over.
        let req = ResolutionRequest::new("Ribs at 5.", ["RIBS AT 5"]).with_auto_save(true);
        let d = engine().resolve(&req).expect("resolve");
        assert_eq!(d.decision_state, DecisionState::NeedsConfirmation);
        assert_eq!(d.value, None);
        assert!(d.alias_to_save.is_none());
    }

    #[test]
    fn skeleton_only_item_needs_confirmation() {
        for (heard, items) in [
            ("add 2 rabies", vec!["RIBS"]),
            ("add 2 robes", vec!["RIBS"]),
            ("add 2 rabies", vec!["RIBS", "BEEF"]),
        ] {
            let req = ResolutionRequest::new(heard, items).with_auto_save(true);
            let d = engine().resolve(&req).expect("resolve");
            assert_eq!(d.canonical_item, ItemChoice::Item("RIBS".into()), "{heard}");
            assert_eq!(d.decision_state, DecisionState::NeedsConfirmation, "{heard}");
            assert!(d.alias_to_save.is_none());
        }
    }

    #[test]
    fn close_plain_fuzzy_match_still_auto_commits() {
        let req = ResolutionRequest::new("add 2 rib", ["RIBS", "BEEF"]);
        let d = engine().resolve(&req).expect("resolve");
        assert_eq!(d.canonical_item, ItemChoice::Item("RIBS".into()));
        assert_eq!(d.decision_state, DecisionState::AutoCommit);
    }

    #[test]
    fn item_inside_a_longer_word_is_not_exact() {
        let d = engine()
            .resolve(&ResolutionRequest::new("add 4 teak", ["TEA", "STEAK"]))
            .expect("resolve");
        assert_eq!(d.canonical_item, ItemChoice::Item("STEAK".into()));
        assert_eq!(d.top_choices[1], ItemChoice::Item("TEA".into()));
        assert_eq!(d.decision_state, DecisionState::NeedsConfirmation);
    }

    #[test]
    fn item_words_are_not_read_as_verbs() {
        let req = ResolutionRequest::new("set mac and cheese at 4", ["MAC AND CHEESE"]);
        let d = engine().resolve(&req).expect("resolve");
        assert_eq!(d.operation, Some(Operation::Set));
        assert_eq!(d.value, Some(4));
        assert_eq!(d.decision_state, DecisionState::AutoCommit);

        let req = ResolutionRequest::new("add 3 7 up", ["7 UP"]);
        let d = engine().resolve(&req).expect("resolve");
        assert_eq!(d.operation, Some(Operation::Add));
        assert_eq!(d.value, Some(3));
    }

    #[test]
    fn config_normalize_clamps() {
        let mut cfg = ResolverConfig {
            fuzzy_floor: 4.0,
            ambiguity_margin: f64::NAN,
            max_alternatives: 100,
            allow_alias_auto_save: true,
        };
        cfg.normalize();
        assert_eq!(cfg.fuzzy_floor, 1.0);
        assert_eq!(cfg.ambiguity_margin, 0.25);
        assert_eq!(cfg.max_alternatives, 8);
    }
}
