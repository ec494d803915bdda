//! Tests for the model module

use super::modifiers::{self, ModifierInput};
use super::paths;
use super::*;
use chrono::NaiveDate;
use std::path::Path;

fn fs() -> &'static StdFileSystem {
    std_file_system()
}

// ============================================================================
// Paths
// ============================================================================

#[test]
fn test_path_components() {
    assert_eq!(paths::file_name("a/b/c.txt"), "c.txt");
    assert_eq!(paths::file_name("a\\b\\c.txt"), "c.txt");
    assert_eq!(paths::extension("a/b.tar.gz"), ".gz");
    assert_eq!(paths::extension("a/b."), "");
    assert_eq!(paths::extension("a.dir/b"), "");
    assert_eq!(paths::file_name_without_extension("a/b.tar.gz"), "b.tar");
    assert_eq!(paths::directory_with_separator("a/b/c.txt"), "a/b/");
    assert_eq!(paths::directory_with_separator("c.txt"), "");
}

#[cfg(unix)]
#[test]
fn test_path_normalization_unix() {
    assert_eq!(paths::normalize("/a/./b/../c//d"), "/a/c/d");
    assert_eq!(paths::normalize("a/../../b"), "../b");
    assert_eq!(paths::normalize("/../a/"), "/a/");
    assert_eq!(paths::combine("/base", "rel\\x"), "/base/rel\\x");
    assert_eq!(paths::combine("/base/", "/abs"), "/abs");
    assert_eq!(paths::full_path("x/../y.txt", "/proj"), "/proj/y.txt");
    assert_eq!(paths::adjust_separators(r"bin\Debug/x".to_string()), "bin/Debug/x");
}

#[cfg(unix)]
#[test]
fn test_directory_name_unix() {
    assert_eq!(paths::directory_name("/a/b/c").as_deref(), Some("/a/b"));
    assert_eq!(paths::directory_name("/a").as_deref(), Some("/"));
    assert_eq!(paths::directory_name("/"), None);
    assert_eq!(paths::directory_name("c.txt").as_deref(), Some(""));
    assert_eq!(paths::ancestors("/x/y/z.txt"), vec!["/x/y", "/x", "/"]);
}

#[cfg(unix)]
#[test]
fn test_make_relative_unix() {
    assert_eq!(paths::make_relative("/a/b", "/a/b/c/d.txt", "/"), "c/d.txt");
    assert_eq!(paths::make_relative("/a/b/", "/a/c/", "/"), "../c/");
    assert_eq!(paths::make_relative("/a/b", "/a/b", "/"), ".");
    assert_eq!(paths::make_relative("/a", "/z/y", "/"), "/z/y");
    assert_eq!(paths::make_relative("/a", "rel/path", "/"), "rel/path");
}

#[test]
fn test_change_extension_and_trailing_slash() {
    assert_eq!(paths::change_extension("a/b.txt", Some(".cs")), "a/b.cs");
    assert_eq!(paths::change_extension("a/b", Some("cs")), "a/b.cs");
    assert_eq!(paths::change_extension("a.d/b.txt", None), "a.d/b");
    assert_eq!(paths::ensure_trailing_slash(""), "");
    assert!(paths::ensure_trailing_slash("dir").len() == 4);
}

// ============================================================================
// Modifiers
// ============================================================================

fn evaluate(modifier: &str, spec: &str) -> String {
    modifiers::evaluate(
        modifier,
        ModifierInput {
            current_directory: Some(Path::new("/proj")),
            item_spec: spec,
            defining_project: Some(Path::new("/proj/build/app.proj")),
        },
        fs(),
    )
    .unwrap()
}

#[test]
fn test_modifier_recognition() {
    assert!(modifiers::is_item_spec_modifier("fullpath"));
    assert!(modifiers::is_item_spec_modifier("DefiningProjectExtension"));
    assert!(!modifiers::is_item_spec_modifier("Culture"));
    assert_eq!(modifiers::canonical("FILENAME"), Some(modifiers::FILENAME));
    assert!(modifiers::is_time_modifier("modifiedtime"));
}

#[test]
fn test_spec_modifiers() {
    assert_eq!(evaluate("Filename", "src/main.cs"), "main");
    assert_eq!(evaluate("Extension", "src/main.cs"), ".cs");
    assert_eq!(evaluate("Identity", "src/main.cs"), "src/main.cs");
    assert_eq!(evaluate("Filename", "src/"), "");
    assert_eq!(evaluate("RecursiveDir", "src/main.cs"), "");
    assert_eq!(evaluate("DefiningProjectName", "x"), "app");
    assert_eq!(evaluate("DefiningProjectExtension", "x"), ".proj");
}

#[cfg(unix)]
#[test]
fn test_path_modifiers_unix() {
    assert_eq!(evaluate("FullPath", "src/../main.cs"), "/proj/main.cs");
    assert_eq!(evaluate("RootDir", "src/main.cs"), "/");
    assert_eq!(evaluate("Directory", "src/main.cs"), "proj/src/");
    assert_eq!(evaluate("RelativeDir", "src\\main.cs"), "src/");
    assert_eq!(evaluate("DefiningProjectDirectory", "x"), "/proj/build/");
    assert_eq!(evaluate("DefiningProjectFullPath", "x"), "/proj/build/app.proj");
}

#[test]
fn test_full_path_keeps_escaping() {
    let full = evaluate("FullPath", "a%3Bb.txt");
    assert!(full.ends_with("a%3Bb.txt"));
}

#[test]
fn test_time_modifiers() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("f.txt"), "x").unwrap();

    let input = ModifierInput {
        current_directory: Some(dir.path()),
        item_spec: "f.txt",
        defining_project: None,
    };
    let modified = modifiers::evaluate("ModifiedTime", input, fs()).unwrap();
    assert_eq!(modified.len(), "yyyy-MM-dd HH:mm:ss.fffffff".len());

    let missing = ModifierInput {
        item_spec: "missing.txt",
        ..input
    };
    assert_eq!(modifiers::evaluate("ModifiedTime", missing, fs()).unwrap(), "");
    assert_eq!(
        modifiers::evaluate("DefiningProjectName", missing, fs()).unwrap(),
        ""
    );
}

#[test]
fn test_format_file_time() {
    let time = NaiveDate::from_ymd_opt(2024, 3, 9)
        .unwrap()
        .and_hms_nano_opt(7, 5, 1, 123_456_789)
        .unwrap();
    assert_eq!(modifiers::format_file_time(&time), "2024-03-09 07:05:01.1234567");
}

// ============================================================================
// Items and metadata tables
// ============================================================================

#[test]
fn test_project_item_metadata_is_case_insensitive() {
    let item = ProjectItem::new("Compile", "a.cs").with_metadata("Culture", "en-US");
    assert_eq!(item.custom_metadata_escaped("culture"), Some("en-US"));
    assert_eq!(item.custom_metadata_escaped("CULTURE"), Some("en-US"));
    assert_eq!(item.custom_metadata_escaped("Other"), None);
    assert_eq!(metadata_value_escaped(&item, "Filename", fs()).unwrap(), "a");
    assert_eq!(metadata_value_escaped(&item, "Missing", fs()).unwrap(), "");
}

#[cfg(unix)]
#[test]
fn test_recursive_dir_from_wildcard_include() {
    let item = ProjectItem::new("Compile", "src/a/b/x.cs")
        .with_include_before_wildcard("src/**/*.cs");
    assert_eq!(
        metadata_value_escaped(&item, "RecursiveDir", fs()).unwrap(),
        "a/b/"
    );
}

#[test]
fn test_item_factory_inherits_metadata() {
    let source = ProjectItem::new("Src", "a.txt").with_metadata("M", "1");
    let factory = ProjectItemFactory::new("Dest");

    let derived = factory.derive("b.txt", &source);
    assert_eq!(derived.item_type(), "Dest");
    assert_eq!(derived.evaluated_include_escaped(), "b.txt");
    assert_eq!(derived.custom_metadata_escaped("M"), Some("1"));

    let reused = factory.reuse(&source);
    assert_eq!(reused.evaluated_include_escaped(), "a.txt");
    assert_eq!(reused.metadata_count(), 1);

    let bare = factory.bare("c.txt");
    assert_eq!(bare.metadata_count(), 0);
}

#[test]
fn test_item_dictionary_lookup() {
    let items: ItemDictionary<ProjectItem> = [
        ProjectItem::new("Compile", "a.cs"),
        ProjectItem::new("compile", "b.cs"),
        ProjectItem::new("None", "c.txt"),
    ]
    .into_iter()
    .collect();

    assert_eq!(items.items("COMPILE").len(), 2);
    assert_eq!(items.items("Missing").len(), 0);
    assert_eq!(items.len(), 3);
}

#[test]
fn test_item_metadata_table_qualification() {
    let item = ProjectItem::new("Compile", "a.cs").with_metadata("Culture", "fr");
    let table = ItemMetadataTable::new(&item, fs());
    assert_eq!(table.escaped_value(None, "Culture").unwrap(), "fr");
    assert_eq!(table.escaped_value(Some("compile"), "Culture").unwrap(), "fr");
    assert_eq!(table.escaped_value(Some("Other"), "Culture").unwrap(), "");
    assert_eq!(MetadataTable::item_type(&table), Some("Compile"));
}

#[test]
fn test_string_metadata_table() {
    let table = StringMetadataTable::new()
        .with("Compile.Culture", "de")
        .with("Culture", "en");
    assert_eq!(table.escaped_value(Some("COMPILE"), "culture").unwrap(), "de");
    assert_eq!(table.escaped_value(None, "Culture").unwrap(), "en");
    assert_eq!(table.escaped_value(Some("None"), "Culture").unwrap(), "");
    assert_eq!(MetadataTable::item_type(&table), None);
}

#[test]
fn test_property_dictionary() {
    let properties: PropertyDictionary = [("Configuration", "Debug")].into_iter().collect();
    assert_eq!(
        properties.escaped_value("configuration").as_deref(),
        Some("Debug")
    );
    assert_eq!(properties.escaped_value("Platform"), None);
    assert!(properties.contains("CONFIGURATION"));
}

// ============================================================================
// File system
// ============================================================================

#[test]
fn test_expand_wildcards() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("src/nested")).unwrap();
    std::fs::write(dir.path().join("src/a.cs"), "").unwrap();
    std::fs::write(dir.path().join("src/nested/b.cs"), "").unwrap();
    std::fs::write(dir.path().join("src/c.txt"), "").unwrap();

    let top = fs().expand_wildcards(dir.path(), "src/*.cs").unwrap();
    assert_eq!(top, vec!["src/a.cs"]);

    let all = fs().expand_wildcards(dir.path(), "src/**/*.cs").unwrap();
    assert_eq!(all.len(), 2);

    let none = fs().expand_wildcards(dir.path(), "missing/*.cs").unwrap();
    assert!(none.is_empty());
}

#[test]
fn test_wildcard_pattern_split() {
    let pattern = WildcardPattern::split("src/**/*.cs");
    assert_eq!(pattern.fixed, "src/");
    assert_eq!(pattern.wildcard, "**/*.cs");
    assert_eq!(WildcardPattern::split("*.cs").fixed, "");
}
