//! Common item and property fixtures for tests.

use buildexpr::{ItemDictionary, ProjectItem, PropertyDictionary};

/// `Files = [a.txt, b.txt]`, `a.txt` carrying `Kind=text`.
pub fn files() -> ItemDictionary<ProjectItem> {
    [
        ProjectItem::new("Files", "a.txt").with_metadata("Kind", "text"),
        ProjectItem::new("Files", "b.txt"),
    ]
    .into_iter()
    .collect()
}

/// Items of type `Files` with the given includes and no metadata.
pub fn files_named(includes: &[&str]) -> ItemDictionary<ProjectItem> {
    includes
        .iter()
        .map(|include| ProjectItem::new("Files", *include))
        .collect()
}

/// `Compile` items with `Culture` and `Link` metadata, for filter tests.
pub fn compile_items() -> ItemDictionary<ProjectItem> {
    [
        ProjectItem::new("Compile", "src/main.cs")
            .with_metadata("Culture", "en-US")
            .with_metadata("Link", "Program.cs"),
        ProjectItem::new("Compile", "src/util.cs").with_metadata("Culture", "fr-FR"),
        ProjectItem::new("Compile", "src/gen.cs"),
    ]
    .into_iter()
    .collect()
}

pub fn build_properties() -> PropertyDictionary {
    PropertyDictionary::new()
        .with("Configuration", "Debug")
        .with("Platform", "x64")
        .with("OutDir", "bin/$(Configuration)/")
        .with("Count", "3")
        .with("List", "a;b;c")
        .with("Escaped", "one%3Btwo")
}
