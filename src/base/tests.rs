//! Tests for the base module

use super::escaping::{
    contains_escaped_wildcards, escape, split_semicolon_separated, unescape,
};
use super::names::{is_valid_name, scan_name};
use super::*;
use std::borrow::Cow;
use std::path::Path;

// ============================================================================
// Escaping
// ============================================================================

#[test]
fn test_escape_special_characters() {
    assert_eq!(escape("a;b"), "a%3Bb");
    assert_eq!(escape("$(X)"), "%24%28X%29");
    assert_eq!(escape("50%"), "50%25");
    assert_eq!(escape("*.cs?'@"), "%2A.cs%3F%27%40");
}

#[test]
fn test_escape_borrows_plain_strings() {
    assert!(matches!(escape("plain/text.txt"), Cow::Borrowed(_)));
    assert!(matches!(unescape("plain"), Cow::Borrowed(_)));
}

#[test]
fn test_unescape_round_trip() {
    let raw = "a;b%c$(d)@(e)'f'*?";
    assert_eq!(unescape(&escape(raw)), raw);
}

#[test]
fn test_unescape_leaves_malformed_sequences() {
    assert_eq!(unescape("100%"), "100%");
    assert_eq!(unescape("%zz%3b"), "%zz;");
    assert_eq!(unescape("%4"), "%4");
}

#[test]
fn test_contains_escaped_wildcards() {
    assert!(contains_escaped_wildcards("src/%2A.cs"));
    assert!(contains_escaped_wildcards("a%3fb"));
    assert!(!contains_escaped_wildcards("src/*.cs"));
}

#[test]
fn test_split_semicolon_separated_trims_and_drops_empty() {
    assert_eq!(
        split_semicolon_separated(" a ; ;b;c%3Bd; "),
        vec!["a", "b", "c%3Bd"]
    );
}

#[test]
fn test_split_semicolon_separated_respects_item_vectors() {
    assert_eq!(
        split_semicolon_separated("x;@(A->'%(F);', ';');y"),
        vec!["x", "@(A->'%(F);', ';')", "y"]
    );
}

// ============================================================================
// Names
// ============================================================================

#[test]
fn test_scan_name_stops_before_arrow() {
    assert_eq!(scan_name("Files->Count()", 0), 5);
    assert_eq!(scan_name("My-Files->X", 0), 8);
    assert_eq!(scan_name("9abc", 0), 0);
    assert_eq!(scan_name("  _a1", 2), 5);
}

#[test]
fn test_is_valid_name() {
    assert!(is_valid_name("Compile"));
    assert!(is_valid_name("_private-1"));
    assert!(!is_valid_name(""));
    assert!(!is_valid_name("1st"));
    assert!(!is_valid_name("a.b"));
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn test_options_composites() {
    let all = ExpanderOptions::EXPAND_ALL;
    assert!(all.contains(ExpanderOptions::EXPAND_METADATA));
    assert!(all.contains(ExpanderOptions::EXPAND_PROPERTIES_AND_ITEMS));
    assert!(!all.contains(ExpanderOptions::TRUNCATE));

    let options = ExpanderOptions::EXPAND_CUSTOM_METADATA | ExpanderOptions::TRUNCATE;
    assert!(options.intersects(ExpanderOptions::EXPAND_METADATA));
    assert!(!options.contains(ExpanderOptions::EXPAND_METADATA));
    assert_eq!(
        options.without(ExpanderOptions::TRUNCATE),
        ExpanderOptions::EXPAND_CUSTOM_METADATA
    );
}

// ============================================================================
// Values
// ============================================================================

#[test]
fn test_value_escaped_string_forms() {
    assert_eq!(Value::Null.to_escaped_string(), "");
    assert_eq!(Value::string("a%3Bb").to_escaped_string(), "a%3Bb");
    assert_eq!(Value::Bool(true).to_escaped_string(), "True");
    assert_eq!(Value::Int(-3).to_escaped_string(), "-3");
    assert_eq!(Value::Float(3.0).to_escaped_string(), "3");
    assert_eq!(Value::Float(2.5).to_escaped_string(), "2.5");
    assert_eq!(Value::Char(';').to_escaped_string(), "%3B");
}

#[test]
fn test_value_sequence_escapes_elements() {
    let seq = Value::Seq(vec![Value::string("a;b"), Value::string("c")]);
    assert_eq!(seq.to_escaped_string(), "a%3Bb;c");

    let map = Value::Map(vec![(Value::string("k"), Value::string("v"))]);
    assert_eq!(map.to_escaped_string(), "k=v");
}

#[test]
fn test_value_type_names() {
    assert_eq!(Value::string("").type_name(), "System.String");
    assert_eq!(Value::Seq(vec![]).type_name(), "System.Object[]");
}

#[test]
fn test_version_parse_and_order() {
    let v: Version = "1.2.3".parse().unwrap();
    assert_eq!(v, Version::new(1, 2).with_build(3));
    assert_eq!(v.to_string(), "1.2.3");
    assert!("1.0".parse::<Version>().unwrap() < "1.0.0".parse().unwrap());
    assert!("2.0".parse::<Version>().unwrap() > "1.99.99.99".parse().unwrap());
    assert!("1".parse::<Version>().is_err());
    assert!("1.2.3.4.5".parse::<Version>().is_err());
    assert!("1.x".parse::<Version>().is_err());
}

#[test]
fn test_version_to_string_fields() {
    let v: Version = "4.5.6".parse().unwrap();
    assert_eq!(v.to_string_fields(2).as_deref(), Some("4.5"));
    assert_eq!(v.to_string_fields(3).as_deref(), Some("4.5.6"));
    assert_eq!(v.to_string_fields(4), None);
}

// ============================================================================
// Locations and errors
// ============================================================================

#[test]
fn test_element_location_display_and_directory() {
    let loc = ElementLocation::new("/proj/app.proj", 3, 7);
    assert_eq!(loc.to_string(), "/proj/app.proj (3,7)");
    assert_eq!(loc.directory(), Some(Path::new("/proj")));
    assert_eq!(ElementLocation::in_memory().to_string(), "<memory>");
    assert_eq!(ElementLocation::in_file("app.proj").directory(), None);
}

#[test]
fn test_error_codes_and_location() {
    let err = ExpandError::invalid_function("$(X.Foo())", "boom");
    assert_eq!(err.code(), ErrorCode::InvalidFunction);
    assert_eq!(err.partially_evaluated(), Some("$(X.Foo())"));

    let located = err.with_location(&ElementLocation::new("a.proj", 1, 2));
    assert_eq!(located.code(), ErrorCode::InvalidFunction);
    assert!(located.to_string().starts_with("a.proj (1,2): "));
    assert!(located.format().starts_with("E0201"));
}

#[test]
fn test_text_range_helper() {
    let range = text_range(2, 5);
    assert_eq!(u32::from(range.start()), 2);
    assert_eq!(u32::from(range.len()), 3);
}
