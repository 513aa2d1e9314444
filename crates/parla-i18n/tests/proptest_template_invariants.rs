//! Property-based invariant tests for template resolution and the store.
//!
//! 1. Keys absent from the active catalog never error and render empty.
//! 2. Plural blocks pick `one` exactly for the numeric value one.
//! 3. A placeholder without a value always fails, naming the placeholder.
//! 4. Nested-key resolution is transitive along any chain.
//! 5. Merging the same entries twice equals merging them once.
//! 6. Activating an unknown language changes nothing.

use std::collections::BTreeMap;

use parla_i18n::template::select_plurals;
use parla_i18n::{LanguageId, Params, Translator};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn key_strategy() -> impl Strategy<Value = String> {
    "[A-Z][A-Z_]{0,11}"
}

fn plain_text() -> impl Strategy<Value = String> {
    "[a-zA-Z äöü.!]{0,16}"
}

fn entries_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    proptest::collection::btree_map(key_strategy(), plain_text(), 0..12)
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Lookup misses
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn absent_key_is_a_silent_miss(
        entries in entries_strategy(),
        probe in "[a-z]{1,8}",
    ) {
        let t = Translator::new();
        t.add_translations("xx", entries);
        t.use_language("xx");
        // Catalog keys are upper-case, probes lower-case.
        prop_assert_eq!(t.translate(&probe, None).unwrap(), None);
        prop_assert_eq!(t.translate_or_empty(&probe, Some(&Params::new())).unwrap(), "");
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Plural selection
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn plural_one_only_for_numeric_one(
        one in "[a-z]{1,8}",
        other in "[a-z]{1,8}",
        n in -1000i64..1000,
    ) {
        let template = format!("{{count, plural, one{{{one}}} other{{{other}}}}}");
        let params = Params::new().with("count", n);
        let expected = if n == 1 { &one } else { &other };
        prop_assert_eq!(&select_plurals(&template, Some(&params)), expected);
        prop_assert_eq!(&select_plurals(&template, None), &other);
    }

    #[test]
    fn plural_float_one_selects_one(other in "[a-z]{1,8}", x in -10.0f64..10.0) {
        let template = format!("{{n, plural, one{{single}} other{{{other}}}}}");
        let params = Params::new().with("n", x);
        let got = select_plurals(&template, Some(&params));
        if x == 1.0 {
            prop_assert_eq!(got, "single");
        } else {
            prop_assert_eq!(got, other);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Missing parameters
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn missing_placeholder_value_fails(
        name in "[a-z][a-z0-9_]{0,8}",
        prefix in "[a-zA-Z ]{0,10}",
        supply_empty_bag in any::<bool>(),
    ) {
        let t = Translator::new();
        t.add_translations("xx", [("K", format!("{prefix}{{{name}}}"))]);
        t.use_language("xx");
        let bag = Params::new().with("unrelated_param_", 1);
        let params = if supply_empty_bag { Some(&bag) } else { None };
        let err = t.translate("K", params).unwrap_err();
        prop_assert_eq!(err.missing_parameter(), Some(name.as_str()));
        prop_assert_eq!(err.key_chain(), vec!["K"]);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Transitive nesting
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn nesting_chain_resolves_to_leaf(depth in 1usize..10, leaf in plain_text()) {
        let t = Translator::new();
        let mut entries: Vec<(String, String)> = (0..depth)
            .map(|i| (format!("K{i}"), format!("{{translate, K{}}}", i + 1)))
            .collect();
        entries.push((format!("K{depth}"), leaf.clone()));
        t.add_translations("xx", entries);
        t.use_language("xx");
        prop_assert_eq!(t.translate_or_empty("K0", None).unwrap(), leaf);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5–6. Store invariants
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn merge_is_idempotent(entries in entries_strategy()) {
        let once = Translator::new();
        once.add_translations("xx", entries.clone());
        let twice = Translator::new();
        twice.add_translations("xx", entries.clone());
        twice.add_translations("xx", entries);

        let id = LanguageId::from("xx");
        prop_assert_eq!(once.catalog(&id), twice.catalog(&id));
    }

    #[test]
    fn unknown_language_is_ignored(
        loaded in "[a-m]{2}",
        unknown in "[n-z]{2}",
        activate_first in any::<bool>(),
    ) {
        let t = Translator::new();
        t.add_translations(loaded.as_str(), [("K", "v")]);
        if activate_first {
            t.use_language(loaded.as_str());
        }
        let before = t.active_language_id();
        prop_assert!(!t.use_language(unknown.as_str()));
        prop_assert_eq!(t.active_language_id(), before);
    }
}
