//! Metadata references, batching tables and truncation.

use std::cell::RefCell;

use buildexpr::model::{ITEM_REFERENCING_SELF, ItemMetadataTable, std_file_system};
use buildexpr::{
    CHARACTER_LIMIT_PER_EXPANSION, Expander, ExpanderOptions, ExpansionContext, LoggingSink,
    NoProperties, ProjectItem, StringMetadataTable,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::helpers::fixtures::files;

#[derive(Default)]
struct RecordingSink {
    messages: RefCell<Vec<(String, Vec<String>)>>,
}

impl LoggingSink for RecordingSink {
    fn log_low_importance(&self, message_key: &str, args: &[&str]) {
        self.messages.borrow_mut().push((
            message_key.to_string(),
            args.iter().map(|a| a.to_string()).collect(),
        ));
    }
}

// =============================================================================
// BATCHING OVER ONE ITEM
// =============================================================================

#[cfg(unix)]
#[rstest]
#[case("%(Filename)%(Extension)", "main.cs")]
#[case("%(Identity)", "src/main.cs")]
#[case("%(RelativeDir)", "src/")]
#[case("%(FullPath)", "/repo/src/main.cs")]
#[case("%(Culture)", "en-US")]
#[case("%(Compile.Culture)", "en-US")]
#[case("%(None.Culture)", "")]
#[case("%(Undeclared)", "")]
#[case("%( Culture )", "en-US")]
fn test_item_metadata_table(#[case] expr: &str, #[case] expected: &str) {
    let item = ProjectItem::new("Compile", "src/main.cs")
        .in_directory("/repo")
        .with_metadata("Culture", "en-US");
    let table = ItemMetadataTable::new(&item, std_file_system());
    let result = Expander::new(&NoProperties)
        .with_metadata(&table)
        .expand_into_string_leave_escaped(expr, ExpanderOptions::EXPAND_METADATA)
        .unwrap();
    assert_eq!(result, expected);
}

// =============================================================================
// ITEM VECTORS IN THE METADATA PHASE
// =============================================================================

#[test]
fn test_transform_bodies_wait_for_the_item_phase() {
    let items = files();
    let table = StringMetadataTable::new().with("Filename", "outer");
    let expander = Expander::new(&NoProperties)
        .with_items(&items)
        .with_metadata(&table);

    let result = expander
        .expand_into_string_leave_escaped(
            "%(Filename)=@(Files->'%(Filename)')",
            ExpanderOptions::EXPAND_ALL,
        )
        .unwrap();
    assert_eq!(result, "outer=a;b");
}

#[test]
fn test_separator_metadata_is_expanded_immediately() {
    let items = files();
    let table = StringMetadataTable::new().with("Sep", " | ");
    let expander = Expander::new(&NoProperties)
        .with_items(&items)
        .with_metadata(&table);

    let result = expander
        .expand_into_string_leave_escaped("@(Files, '%(Sep)')", ExpanderOptions::EXPAND_ALL)
        .unwrap();
    assert_eq!(result, "a.txt | b.txt");
}

// =============================================================================
// TRUNCATION
// =============================================================================

#[rstest]
#[case(1024, false)]
#[case(1025, true)]
#[case(5000, true)]
fn test_truncation_limit(#[case] length: usize, #[case] truncated: bool) {
    let table = StringMetadataTable::new().with("Long", "y".repeat(length));
    let result = Expander::new(&NoProperties)
        .with_metadata(&table)
        .expand_into_string_leave_escaped(
            "%(Long)",
            ExpanderOptions::EXPAND_METADATA | ExpanderOptions::TRUNCATE,
        )
        .unwrap();
    assert_eq!(result.ends_with("..."), truncated);
    assert_eq!(result.len(), length.min(CHARACTER_LIMIT_PER_EXPANSION));
}

// =============================================================================
// SELF REFERENCES
// =============================================================================

#[rstest]
#[case("%(Kind)", true)]
#[case("%(Compile.Kind)", true)]
#[case("%(compile.Kind)", false)]
#[case("%(Other.Kind)", false)]
fn test_self_reference_while_batching(#[case] expr: &str, #[case] logged: bool) {
    let sink = RecordingSink::default();
    let table = StringMetadataTable::new().with("Kind", "k");
    let expander = Expander::new(&NoProperties).with_metadata(&table).with_context(
        ExpansionContext::default()
            .batching("Compile")
            .with_logging(&sink),
    );
    expander
        .expand_into_string_leave_escaped(
            expr,
            ExpanderOptions::EXPAND_METADATA
                | ExpanderOptions::LOG_ON_ITEM_METADATA_SELF_REFERENCE,
        )
        .unwrap();

    let messages = sink.messages.borrow();
    assert_eq!(!messages.is_empty(), logged);
    if logged {
        assert_eq!(messages[0].0, ITEM_REFERENCING_SELF);
        assert_eq!(messages[0].1, vec!["Compile".to_string(), "Kind".to_string()]);
    }
}

#[test]
fn test_self_reference_needs_a_current_item_type() {
    let sink = RecordingSink::default();
    let table = StringMetadataTable::new().with("Kind", "k");
    let expander = Expander::new(&NoProperties)
        .with_metadata(&table)
        .with_context(ExpansionContext::default().with_logging(&sink));
    expander
        .expand_into_string_leave_escaped(
            "%(Kind)",
            ExpanderOptions::EXPAND_METADATA
                | ExpanderOptions::LOG_ON_ITEM_METADATA_SELF_REFERENCE,
        )
        .unwrap();
    assert!(sink.messages.borrow().is_empty());
}
