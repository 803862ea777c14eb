//! Property-based tests for code extraction.
//!
//! Raw scans come from hardware and operators, so the extractor has to hold
//! its invariants for any input, not just well-formed labels.

use pickverify_scan::extract;
use proptest::prelude::*;

/// Strategy for raw buffers dense in the characters the rules act on.
fn raw_scan() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just('\0'),
            Just(';'),
            Just('\u{3}'),
            Just('#'),
            Just(' '),
            prop::char::range('0', '9'),
            prop::char::range('A', 'Z'),
        ],
        0..40,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// Strategy for labels that contain nothing the extractor rewrites.
fn clean_label() -> impl Strategy<Value = String> {
    prop::string::string_regex("[0-9A-Z:;-]{1,30}").expect("Failed to create label regex strategy")
}

proptest! {
    /// Property: extraction never panics, whatever the input.
    #[test]
    fn prop_extract_is_total(raw in any::<String>()) {
        let _ = extract(&raw);
    }

    /// Property: extracted codes never carry rewritten characters.
    #[test]
    fn prop_extracted_code_has_no_control_or_separator(raw in raw_scan()) {
        if let Some(code) = extract(&raw) {
            prop_assert!(!code.as_str().contains('\0'));
            prop_assert!(!code.as_str().contains('\x03'));
            prop_assert!(!code.as_str().contains('#'));
        }
    }

    /// Property: a clean label is its own code.
    #[test]
    fn prop_clean_label_maps_to_itself(label in clean_label()) {
        let code = extract(&label).expect("non-blank label must yield a code");
        prop_assert_eq!(code.as_str(), label.as_str());
    }

    /// Property: extracting an already extracted code changes nothing.
    #[test]
    fn prop_extract_is_idempotent(raw in raw_scan()) {
        if let Some(code) = extract(&raw)
            && !code.as_str().trim().is_empty()
        {
            let again = extract(code.as_str()).expect("non-blank code must re-extract");
            prop_assert_eq!(again, code);
        }
    }

    /// Property: a prefixed label always yields the label.
    #[test]
    fn prop_single_separator_selects_suffix(prefix in clean_label(), label in clean_label()) {
        let raw = format!("{prefix}\u{3}{label}");
        let code = extract(&raw).expect("prefixed label must yield a code");
        prop_assert_eq!(code.as_str(), label.as_str());
    }
}
