//! Phase ordering and the string forms of the expander.

use std::borrow::Cow;

use buildexpr::{Expander, ExpanderOptions, PropertyDictionary, StringMetadataTable};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::helpers::fixtures::{build_properties, files, files_named};

// =============================================================================
// FAST PATH
// =============================================================================

#[rstest]
#[case("")]
#[case("plain text")]
#[case("50% off, email me at home")]
#[case("costs $5 (each)")]
fn test_text_without_references_is_untouched(#[case] text: &str) {
    let properties = build_properties();
    let items = files();
    let table = StringMetadataTable::new();
    let expander = Expander::new(&properties)
        .with_items(&items)
        .with_metadata(&table);

    let result = expander
        .expand_into_string_leave_escaped(text, ExpanderOptions::EXPAND_ALL)
        .unwrap();
    assert!(
        matches!(result, Cow::Borrowed(s) if std::ptr::eq(s, text)),
        "expected the input slice back, got {result:?}"
    );
}

// =============================================================================
// PHASE ORDER
// =============================================================================

#[test]
fn test_property_value_is_not_rescanned_for_metadata() {
    let properties = PropertyDictionary::new().with("P", "%(Kind)");
    let table = StringMetadataTable::new().with("Kind", "resolved");
    let expander = Expander::new(&properties).with_metadata(&table);

    let result = expander
        .expand_into_string_leave_escaped("%(Kind)-$(P)", ExpanderOptions::EXPAND_ALL)
        .unwrap();
    assert_eq!(result, "resolved-%(Kind)");
}

#[test]
fn test_property_value_feeds_the_item_phase() {
    let properties = PropertyDictionary::new().with("Sep", "|");
    let items = files();
    let expander = Expander::new(&properties).with_items(&items);

    let result = expander
        .expand_into_string_leave_escaped(
            "@(Files, '$(Sep)')",
            ExpanderOptions::EXPAND_PROPERTIES_AND_ITEMS,
        )
        .unwrap();
    assert_eq!(result, "a.txt|b.txt");
}

#[test]
fn test_property_values_are_not_expanded_again() {
    let properties = build_properties();
    let result = Expander::new(&properties)
        .expand_into_string_leave_escaped("$(OutDir)", ExpanderOptions::EXPAND_PROPERTIES)
        .unwrap();
    assert_eq!(result, "bin/$(Configuration)/");
}

// =============================================================================
// ESCAPING ROUND TRIP
// =============================================================================

#[test]
fn test_escaped_semicolon_survives_every_phase() {
    let properties = build_properties();
    let items = files_named(&["c%3Bd"]);
    let table = StringMetadataTable::new().with("Note", "x%3By");
    let expander = Expander::new(&properties)
        .with_items(&items)
        .with_metadata(&table);

    let escaped = expander
        .expand_into_strings_leave_escaped(
            "$(Escaped);@(Files);%(Note)",
            ExpanderOptions::EXPAND_ALL,
        )
        .unwrap();
    assert_eq!(escaped, vec!["one%3Btwo", "c%3Bd", "x%3By"]);

    let unescaped = expander
        .expand_into_string_and_unescape("$(Escaped)|@(Files)|%(Note)", ExpanderOptions::EXPAND_ALL)
        .unwrap();
    assert_eq!(unescaped, "one;two|c;d|x;y");
}

#[test]
fn test_strings_form_splits_on_unescaped_semicolons() {
    let properties = build_properties();
    let result = Expander::new(&properties)
        .expand_into_strings_leave_escaped("$(List);;$(Platform)", ExpanderOptions::EXPAND_PROPERTIES)
        .unwrap();
    assert_eq!(result, vec!["a", "b", "c", "x64"]);
}
