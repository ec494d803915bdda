//! Turning expressions into items.

use buildexpr::scanner::item_vector_captures;
use buildexpr::{
    ErrorCode, Expander, ExpanderOptions, Item, NoProperties, ProjectItem, ProjectItemFactory,
    SpecFactory,
};
use pretty_assertions::assert_eq;

use crate::helpers::fixtures::{build_properties, files};

// =============================================================================
// MATERIALIZATION
// =============================================================================

#[test]
fn test_unchanged_items_are_reused() {
    let items = files();
    let expander = Expander::new(&NoProperties).with_items(&items);
    let out: Vec<ProjectItem> = expander
        .expand_into_items("@(Files)", &ProjectItemFactory::new("Out"))
        .unwrap();

    assert_eq!(out.len(), 2);
    assert_eq!(out[0].item_type(), "Out");
    assert_eq!(out[0].evaluated_include_escaped(), "a.txt");
    assert_eq!(out[0].custom_metadata_escaped("Kind"), Some("text"));
    assert_eq!(out[1].evaluated_include_escaped(), "b.txt");
}

#[test]
fn test_transformed_items_inherit_metadata() {
    let items = files();
    let expander = Expander::new(&NoProperties).with_items(&items);
    let out: Vec<ProjectItem> = expander
        .expand_into_items("@(Files->'%(Filename).obj')", &ProjectItemFactory::new("Obj"))
        .unwrap();

    let specs: Vec<&str> = out.iter().map(Item::evaluated_include_escaped).collect();
    assert_eq!(specs, vec!["a.obj", "b.obj"]);
    assert_eq!(out[0].custom_metadata_escaped("Kind"), Some("text"));
    assert_eq!(out[0].item_type(), "Obj");
}

#[test]
fn test_separator_makes_one_bare_item() {
    let items = files();
    let expander = Expander::new(&NoProperties).with_items(&items);
    let out: Vec<ProjectItem> = expander
        .expand_into_items("@(Files, '|')", &ProjectItemFactory::new("Joined"))
        .unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].evaluated_include_escaped(), "a.txt|b.txt");
    assert_eq!(out[0].custom_metadata_escaped("Kind"), None);
}

#[test]
fn test_literals_and_vectors_mix_across_semicolons() {
    let properties = build_properties();
    let items = files();
    let expander = Expander::new(&properties).with_items(&items);
    let out: Vec<String> = expander
        .expand_into_items("$(Configuration).dll; @(Files) ;@(Missing);tail", &SpecFactory)
        .unwrap();
    assert_eq!(out, vec!["Debug.dll", "a.txt", "b.txt", "tail"]);
}

#[test]
fn test_concatenated_vector_cannot_be_itemized() {
    let items = files();
    let expander = Expander::new(&NoProperties).with_items(&items);
    let err = expander
        .expand_into_items::<String, _>("prefix@(Files)", &SpecFactory)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ItemVectorConcatenation);
}

// =============================================================================
// SINGLE VECTOR FORM
// =============================================================================

#[test]
fn test_single_vector_without_a_vector_is_none() {
    let items = files();
    let expander = Expander::new(&NoProperties).with_items(&items);
    let out: Option<Vec<String>> = expander
        .expand_single_item_vector_expression_into_items(
            "plain",
            &SpecFactory,
            ExpanderOptions::EXPAND_ITEMS,
            false,
        )
        .unwrap();
    assert_eq!(out, None);

    let disabled: Option<Vec<String>> = expander
        .expand_single_item_vector_expression_into_items(
            "@(Files)",
            &SpecFactory,
            ExpanderOptions::EXPAND_PROPERTIES,
            false,
        )
        .unwrap();
    assert_eq!(disabled, None);
}

#[test]
fn test_break_on_not_empty_trusts_nothing() {
    let items = files();
    let expander = Expander::new(&NoProperties).with_items(&items);
    let options = ExpanderOptions::EXPAND_ITEMS | ExpanderOptions::BREAK_ON_NOT_EMPTY;

    let non_empty: Option<Vec<String>> = expander
        .expand_single_item_vector_expression_into_items("@(Files)", &SpecFactory, options, false)
        .unwrap();
    assert_eq!(non_empty, None);

    let empty: Option<Vec<String>> = expander
        .expand_single_item_vector_expression_into_items("@(Missing)", &SpecFactory, options, false)
        .unwrap();
    assert_eq!(empty, Some(Vec::new()));

    let filtered_out: Option<Vec<String>> = expander
        .expand_single_item_vector_expression_into_items(
            "@(Files->WithMetadataValue('Kind', 'none'))",
            &SpecFactory,
            options,
            false,
        )
        .unwrap();
    assert_eq!(filtered_out, Some(Vec::new()));
}

// =============================================================================
// CAPTURES AND PAIRS
// =============================================================================

#[test]
fn test_null_entries_keep_positions() {
    let items = files();
    let expander = Expander::new(&NoProperties).with_items(&items);
    let expr = "@(Files->'%(Kind)')";
    let capture = item_vector_captures(expr, 0, expr.len()).next().unwrap();

    let with_nulls = expander
        .expand_expression_capture(&capture, ExpanderOptions::EXPAND_ITEMS, true)
        .unwrap()
        .unwrap();
    assert_eq!(with_nulls.len(), 2);
    assert_eq!(with_nulls[0].spec(), "text");
    assert!(with_nulls[1].is_empty());
    assert_eq!(
        with_nulls[1].source.map(Item::evaluated_include_escaped),
        Some("b.txt")
    );

    let without_nulls = expander
        .expand_expression_capture(&capture, ExpanderOptions::EXPAND_ITEMS, false)
        .unwrap()
        .unwrap();
    assert_eq!(without_nulls.len(), 1);
}

#[test]
fn test_item_list_pairs() {
    let items = files();
    let expander = Expander::new(&NoProperties).with_items(&items);
    let pairs = expander
        .expand_into_item_list_leave_escaped(
            "@(Files->'%(Filename)');literal;@(Files, '+')",
            ExpanderOptions::EXPAND_ITEMS,
        )
        .unwrap();

    let specs: Vec<&str> = pairs.iter().map(|pair| pair.spec()).collect();
    assert_eq!(specs, vec!["a", "b", "literal", "a.txt+b.txt"]);
    assert!(pairs[0].source.is_some());
    assert!(pairs[2].source.is_none());
    assert!(pairs[3].source.is_none());
}
