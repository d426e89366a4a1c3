use proptest::prelude::*;

use tally_core::parse::quantity::{extract_number, number_word};
use tally_core::text::{normalize_phrase, similarity};
use tally_core::{
    AliasTable, DecisionState, ItemChoice, ResolutionEngine, ResolutionRequest, ResolverConfig,
};

const WORDS: &[&str] = &[
    "add", "plus", "and", "minus", "take", "away", "remove", "erase", "zero", "set", "at", "is",
    "ribs", "rebs", "crabs", "crab", "chicken", "kitchen", "wings", "wing", "beef", "shrimp",
    "skewer", "banana", "brisket", "one", "five", "twelve", "seventeen", "ninety", "hundred",
    "3", "12", "40", "the", "uh",
];

const ITEMS: &[&str] = &[
    "RIBS",
    "CRABS",
    "CHICKEN",
    "CHICKEN WINGS",
    "BEEF",
    "SHRIMP SKEWER",
    "BRISKET",
];

fn arb_phrase() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS.to_vec()), 0..6).prop_map(|w| w.join(" "))
}

fn arb_transcript() -> impl Strategy<Value = String> {
    prop_oneof![arb_phrase(), "\\PC{0,24}"]
}

fn arb_items() -> impl Strategy<Value = Vec<String>> {
    prop::sample::subsequence(ITEMS.to_vec(), 1..=ITEMS.len())
        .prop_map(|items| items.into_iter().map(String::from).collect())
}

fn arb_aliases() -> impl Strategy<Value = AliasTable> {
    prop::collection::vec(
        (
            prop::sample::select(ITEMS.to_vec()),
            prop::sample::select(WORDS.to_vec()),
        ),
        0..3,
    )
    .prop_map(|pairs| pairs.into_iter().map(|(item, alias)| (item, [alias])).collect())
}

fn arb_request() -> impl Strategy<Value = ResolutionRequest> {
    (
        arb_transcript(),
        prop::collection::vec(arb_phrase(), 0..=3),
        arb_items(),
        arb_aliases(),
        any::<bool>(),
    )
        .prop_map(|(transcript, alternatives, items, aliases, auto_save)| {
            ResolutionRequest::new(transcript, items)
                .with_alternatives(alternatives)
                .with_alias_table(aliases)
                .with_auto_save(auto_save)
        })
}

fn is_allowed(choice: &ItemChoice, items: &[String]) -> bool {
    match choice {
        ItemChoice::Unmapped => true,
        ItemChoice::Item(name) => items.iter().any(|i| i == name),
    }
}

/// Every number literally present: ASCII digit runs and number words.
fn literal_numbers(text: &str) -> Vec<u32> {
    let digits = text
        .split(|c: char| !c.is_ascii_digit())
        .filter_map(|run| run.parse::<u32>().ok());
    let normalized = normalize_phrase(text);
    let words: Vec<u32> = normalized
        .split_whitespace()
        .filter_map(number_word)
        .collect();
    digits.chain(words).collect()
}

proptest! {
    #[test]
    fn alias_only_recommended_on_auto_commit(req in arb_request()) {
        let engine = ResolutionEngine::new(ResolverConfig::default());
        let d = engine.resolve(&req).expect("valid request");
        if d.decision_state != DecisionState::AutoCommit {
            prop_assert!(d.alias_to_save.is_none());
        }
        if d.canonical_item.is_unmapped() {
            prop_assert!(d.alias_to_save.is_none());
        }
    }

    #[test]
    fn outputs_stay_inside_canonical_set(req in arb_request()) {
        let engine = ResolutionEngine::new(ResolverConfig::default());
        let d = engine.resolve(&req).expect("valid request");
        prop_assert!(is_allowed(&d.canonical_item, &req.canonical_items));
        prop_assert_eq!(d.top_choices.len(), 3);
        for choice in &d.top_choices {
            prop_assert!(is_allowed(choice, &req.canonical_items));
        }
        if d.decision_state == DecisionState::Unmapped {
            prop_assert!(d.canonical_item.is_unmapped());
        } else {
            prop_assert_eq!(&d.top_choices[0], &d.canonical_item);
        }
    }

    #[test]
    fn similarity_is_reflexive_symmetric_bounded(a in "\\PC{1,16}", b in "\\PC{0,16}") {
        prop_assert_eq!(similarity(&a, &a), 1.0);
        let ab = similarity(&a, &b);
        prop_assert_eq!(ab, similarity(&b, &a));
        prop_assert!((0.0..=1.0).contains(&ab));
    }

    #[test]
    fn extracted_numbers_are_never_invented(t in arb_transcript()) {
        if let Some(n) = extract_number(&t) {
            let literals = literal_numbers(&t);
            let present = literals.contains(&n);
            let summed = literals
                .iter()
                .any(|a| literals.iter().any(|b| a.saturating_add(*b) == n));
            prop_assert!(present || summed, "{} not derivable from {:?}", n, t);
        }
    }
}
