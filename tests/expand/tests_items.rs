//! Item vectors and the transform pipeline, rendered as strings.

use buildexpr::{
    ErrorCode, Expander, ExpanderOptions, ExpansionContext, ItemDictionary, NoProperties,
    ProjectItem,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::helpers::fixtures::{compile_items, files, files_named};
use crate::helpers::memory_fs::MemoryFileSystem;

// =============================================================================
// HELPERS
// =============================================================================

fn expand_with(items: &ItemDictionary<ProjectItem>, expr: &str) -> String {
    Expander::new(&NoProperties)
        .with_items(items)
        .expand_into_string_leave_escaped(expr, ExpanderOptions::EXPAND_ITEMS)
        .unwrap()
        .into_owned()
}

fn transform_error(items: &ItemDictionary<ProjectItem>, expr: &str) -> ErrorCode {
    match Expander::new(&NoProperties)
        .with_items(items)
        .expand_into_string_leave_escaped(expr, ExpanderOptions::EXPAND_ITEMS)
    {
        Ok(value) => panic!("expected {expr} to fail, got {value:?}"),
        Err(err) => err.code(),
    }
}

// =============================================================================
// SEPARATORS
// =============================================================================

#[rstest]
#[case("@(Files)", "a.txt;b.txt")]
#[case("@(Files,' ')", "a.txt b.txt")]
#[case("@(Files,'')", "a.txtb.txt")]
#[case("@(Files->'')", ";")]
#[case("@( Files )", "a.txt;b.txt")]
#[case("@(files)", "a.txt;b.txt")]
#[case("[@(Files, ', ')]", "[a.txt, b.txt]")]
#[case("@(Files);@(Missing)", "a.txt;b.txt;")]
fn test_separator_semantics(#[case] expr: &str, #[case] expected: &str) {
    assert_eq!(expand_with(&files(), expr), expected);
}

#[rstest]
#[case("@(Files")]
#[case("@(1Files)")]
#[case("@(Files->)")]
#[case("@(Files,)")]
fn test_ill_formed_vectors_stay_literal(#[case] expr: &str) {
    assert_eq!(expand_with(&files(), expr), expr);
}

// =============================================================================
// QUOTED TRANSFORMS
// =============================================================================

#[rstest]
#[case("@(Files->'%(Filename)')", "a;b")]
#[case("@(Files->'%(Extension)')", ".txt;.txt")]
#[case("@(Files->'(%(Filename))')", "(a);(b)")]
#[case("@(Files->'%(Filename).bak', ' ')", "a.bak b.bak")]
#[case("@(Files->'%(Kind)')", "text;")]
#[case("@(Files->'%(Files.Kind)')", "text;")]
#[case("@(Files->'%(Other.Kind)')", ";")]
#[case("@(Files->'static')", "static;static")]
#[case("@(Files->'%(Filename)'->'%(Filename)%(Extension)')", "a;b")]
fn test_quoted_transforms(#[case] expr: &str, #[case] expected: &str) {
    assert_eq!(expand_with(&files(), expr), expected);
}

// =============================================================================
// BUILT-IN FUNCTIONS
// =============================================================================

#[rstest]
#[case("@(Missing->Count())", "0")]
#[case("@(Missing)", "")]
#[case("@(Missing->AnyHaveMetadataValue('X', 'Y'))", "false")]
#[case("@(Files->Count())", "2")]
#[case("@(Files->AnyHaveMetadataValue('Kind', 'TEXT'))", "true")]
#[case("@(Files->AnyHaveMetadataValue('Kind', 'binary'))", "false")]
fn test_functions_defined_on_empty_input(#[case] expr: &str, #[case] expected: &str) {
    assert_eq!(expand_with(&files(), expr), expected);
}

#[test]
fn test_distinct_runs_before_reverse() {
    let items = files_named(&["a", "a", "b"]);
    assert_eq!(expand_with(&items, "@(Files->Distinct()->Reverse())"), "b;a");
    assert_eq!(expand_with(&items, "@(Files->Reverse()->Distinct())"), "b;a");
}

#[rstest]
#[case("@(Files->Distinct())", "A;b")]
#[case("@(Files->DistinctWithCase())", "A;a;b")]
#[case("@(Files->Reverse())", "b;a;A")]
fn test_distinct_and_reverse(#[case] expr: &str, #[case] expected: &str) {
    let items = files_named(&["A", "a", "b"]);
    assert_eq!(expand_with(&items, expr), expected);
}

#[rstest]
#[case("@(Compile->HasMetadata('Culture'))", "src/main.cs;src/util.cs")]
#[case("@(Compile->WithMetadataValue('Culture', 'EN-us'))", "src/main.cs")]
#[case("@(Compile->WithoutMetadataValue('Culture', 'en-US'))", "src/util.cs;src/gen.cs")]
#[case("@(Compile->Metadata('Link'))", "Program.cs")]
#[case("@(Compile->Metadata('Missing'))", "")]
#[case("@(Compile->HasMetadata('Link')->Metadata('Culture'))", "en-US")]
#[case("@(Compile->ClearMetadata()->HasMetadata('Culture'))", "")]
fn test_metadata_filters(#[case] expr: &str, #[case] expected: &str) {
    assert_eq!(expand_with(&compile_items(), expr), expected);
}

#[test]
fn test_metadata_lists_become_separate_entries() {
    let items: ItemDictionary<ProjectItem> =
        [ProjectItem::new("Ref", "lib").with_metadata("Aliases", "global;extern")]
            .into_iter()
            .collect();
    assert_eq!(expand_with(&items, "@(Ref->Metadata('Aliases')->Count())"), "2");
    assert_eq!(
        expand_with(&items, "@(Ref->Metadata('Aliases'), '|')"),
        "global|extern"
    );
}

#[rstest]
#[case("@(Files->Count('x'))")]
#[case("@(Files->Metadata())")]
#[case("@(Files->WithMetadataValue('Kind'))")]
#[case("@(Files->Distinct('x'))")]
fn test_wrong_arity_is_an_invalid_transform(#[case] expr: &str) {
    assert_eq!(transform_error(&files(), expr), ErrorCode::InvalidTransform);
}

// =============================================================================
// MODIFIERS AND STRING FUNCTIONS
// =============================================================================

#[rstest]
#[case("@(Files->Filename())", "a;b")]
#[case("@(Files->Extension())", ".txt;.txt")]
#[case("@(Files->ToUpper())", "A.TXT;B.TXT")]
#[case("@(Files->Replace('.txt', '.md'))", "a.md;b.md")]
#[case("@(Files->Substring(0, 1)->'%(Identity)!')", "a!;b!")]
#[case("@(Files->StartsWith('a'))", "True;False")]
fn test_modifiers_and_string_functions(#[case] expr: &str, #[case] expected: &str) {
    assert_eq!(expand_with(&files(), expr), expected);
}

#[test]
fn test_unknown_function_fails() {
    assert_eq!(
        transform_error(&files(), "@(Files->NoSuchFunction())"),
        ErrorCode::UnknownFunction
    );
}

#[test]
fn test_string_function_errors_name_the_item_vector() {
    let expr = "@(Files->Substring(9))";
    let err = Expander::new(&NoProperties)
        .with_items(&files())
        .expand_into_string_leave_escaped(expr, ExpanderOptions::EXPAND_ITEMS)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidFunction);
    assert_eq!(err.partially_evaluated(), Some(expr));
}

// =============================================================================
// PATH FUNCTIONS
// =============================================================================

#[cfg(unix)]
#[test]
fn test_exists_checks_the_file_system() {
    let fs = MemoryFileSystem::new("/proj").with_file("/proj/a.txt");
    let items = files();
    let result = Expander::new(&NoProperties)
        .with_items(&items)
        .with_context(ExpansionContext::default().with_file_system(&fs))
        .expand_into_string_leave_escaped("@(Files->Exists())", ExpanderOptions::EXPAND_ITEMS)
        .unwrap();
    assert_eq!(result, "a.txt");
}

#[cfg(unix)]
#[test]
fn test_exists_unescapes_before_probing() {
    let fs = MemoryFileSystem::new("/proj").with_file("/proj/a;b.txt");
    let items = files_named(&["a%3Bb.txt", "c.txt"]);
    let result = Expander::new(&NoProperties)
        .with_items(&items)
        .with_context(ExpansionContext::default().with_file_system(&fs))
        .expand_into_string_leave_escaped("@(Files->Exists())", ExpanderOptions::EXPAND_ITEMS)
        .unwrap();
    assert_eq!(result, "a%3Bb.txt");
}

#[cfg(unix)]
#[test]
fn test_exists_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("present.txt"), "x").unwrap();
    let items: ItemDictionary<ProjectItem> = [
        ProjectItem::new("Files", "present.txt").in_directory(dir.path()),
        ProjectItem::new("Files", "absent.txt").in_directory(dir.path()),
    ]
    .into_iter()
    .collect();
    assert_eq!(expand_with(&items, "@(Files->Exists())"), "present.txt");
}

#[cfg(unix)]
#[rstest]
#[case("@(Files->Combine('obj'))", "src/a.cs/obj;lib/b.cs/obj")]
#[case("@(Files->DirectoryName())", "/proj/src;/proj/lib")]
#[case("@(Files->GetPathsOfAllDirectoriesAbove())", "/;/proj;/proj/lib;/proj/src")]
fn test_path_functions(#[case] expr: &str, #[case] expected: &str) {
    let fs = MemoryFileSystem::new("/proj");
    let items = files_named(&["src/a.cs", "lib/b.cs"]);
    let result = Expander::new(&NoProperties)
        .with_items(&items)
        .with_context(ExpansionContext::default().with_file_system(&fs))
        .expand_into_string_leave_escaped(expr, ExpanderOptions::EXPAND_ITEMS)
        .unwrap();
    assert_eq!(result, expected);
}

#[cfg(unix)]
#[test]
fn test_directories_above_sort_by_uppercase() {
    let fs = MemoryFileSystem::new("/proj");
    let items = files_named(&["a_b/x.cs", "aab/y.cs", "AAB/z.cs"]);
    let result = Expander::new(&NoProperties)
        .with_items(&items)
        .with_context(ExpansionContext::default().with_file_system(&fs))
        .expand_into_string_leave_escaped(
            "@(Files->GetPathsOfAllDirectoriesAbove())",
            ExpanderOptions::EXPAND_ITEMS,
        )
        .unwrap();
    assert_eq!(result, "/;/proj;/proj/aab;/proj/a_b");
}

// =============================================================================
// WILDCARDS
// =============================================================================

#[cfg(unix)]
#[test]
fn test_wildcards_are_itemized_when_enabled() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["one.cs", "two.cs", "notes.md"] {
        std::fs::write(dir.path().join(name), "").unwrap();
    }
    let items: ItemDictionary<ProjectItem> =
        [ProjectItem::new("Compile", "*.cs").in_directory(dir.path())]
            .into_iter()
            .collect();

    let literal = expand_with(&items, "@(Compile)");
    assert_eq!(literal, "*.cs");

    let itemized = Expander::new(&NoProperties)
        .with_items(&items)
        .with_context(ExpansionContext::default().itemize_wildcards(true))
        .expand_into_string_leave_escaped("@(Compile->'%(Filename)')", ExpanderOptions::EXPAND_ITEMS)
        .unwrap();
    assert_eq!(itemized, "one;two");
}

// =============================================================================
// TRUNCATION AND EARLY BREAK
// =============================================================================

#[test]
fn test_item_lists_are_truncated() {
    let includes: Vec<String> = (0..400).map(|i| format!("file{i:04}.txt")).collect();
    let includes: Vec<&str> = includes.iter().map(String::as_str).collect();
    let items = files_named(&includes);
    let result = Expander::new(&NoProperties)
        .with_items(&items)
        .expand_into_string_leave_escaped(
            "@(Files)",
            ExpanderOptions::EXPAND_ITEMS | ExpanderOptions::TRUNCATE,
        )
        .unwrap();
    assert_eq!(result.len(), buildexpr::CHARACTER_LIMIT_PER_EXPANSION);
    assert!(result.ends_with("..."));
}

#[test]
fn test_break_on_not_empty_drops_the_tail() {
    let items = files();
    let result = Expander::new(&NoProperties)
        .with_items(&items)
        .expand_into_string_leave_escaped(
            "@(Missing)x@(Files)y@(Files)",
            ExpanderOptions::EXPAND_ITEMS | ExpanderOptions::BREAK_ON_NOT_EMPTY,
        )
        .unwrap();
    assert_eq!(result, "xa.txt;b.txt");
}
