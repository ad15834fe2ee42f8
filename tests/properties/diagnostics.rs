//! Property tests for diagnostic ordering.

use std::rc::Rc;

use proptest::prelude::*;

use kiln::domain::entities::{sort_and_deduplicate, Diagnostic, DiagnosticCategory, SourceFile};

fn category() -> impl Strategy<Value = DiagnosticCategory> {
    prop_oneof![
        Just(DiagnosticCategory::Error),
        Just(DiagnosticCategory::Warning),
        Just(DiagnosticCategory::Message),
        Just(DiagnosticCategory::Suggestion),
    ]
}

fn diagnostic() -> impl Strategy<Value = Diagnostic> {
    (
        proptest::option::of(0usize..3),
        0usize..20,
        0usize..5,
        prop_oneof![Just(1002u32), Just(2307), Just(6053)],
        "[a-c]{0,3}",
        category(),
    )
        .prop_map(|(file, start, length, code, text, category)| {
            let diagnostic = Diagnostic::new(category, code, text);
            match file {
                Some(index) => {
                    let name = format!("/p/f{index}.ts");
                    let source = Rc::new(SourceFile::new(&name, &name, "x".repeat(32)));
                    diagnostic.with_location(&source, start, length)
                }
                None => diagnostic,
            }
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: sorting twice changes nothing.
    #[test]
    fn property_sort_is_idempotent(diagnostics in proptest::collection::vec(diagnostic(), 0..16)) {
        let once = sort_and_deduplicate(diagnostics);
        let twice = sort_and_deduplicate(once.clone());
        prop_assert_eq!(once, twice);
    }

    /// PROPERTY: output is strictly increasing, so no duplicates survive.
    #[test]
    fn property_sorted_output_has_no_duplicates(diagnostics in proptest::collection::vec(diagnostic(), 0..16)) {
        let sorted = sort_and_deduplicate(diagnostics);
        for pair in sorted.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }

    /// PROPERTY: global diagnostics come before any located one.
    #[test]
    fn property_global_diagnostics_first(diagnostics in proptest::collection::vec(diagnostic(), 0..16)) {
        let sorted = sort_and_deduplicate(diagnostics);
        let first_located = sorted.iter().position(|d| d.file().is_some()).unwrap_or(sorted.len());
        prop_assert!(sorted[first_located..].iter().all(|d| d.file().is_some()));
    }

    /// PROPERTY: input order does not matter.
    #[test]
    fn property_order_independent(diagnostics in proptest::collection::vec(diagnostic(), 0..16)) {
        let mut reversed = diagnostics.clone();
        reversed.reverse();
        prop_assert_eq!(sort_and_deduplicate(diagnostics), sort_and_deduplicate(reversed));
    }
}
