//! Names referenced across the expressions of one element.

use buildexpr::scanner::{
    ReferencedNames, ShredderOptions, contains_metadata, contains_metadata_outside_transform,
    item_vector_captures,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

const ELEMENT: [&str; 4] = [
    "@(Compile->'%(Filename).obj')",
    "%(Compile.Culture)\\%(Filename)",
    "@(compile, '%(Sep)');@(Resource)",
    "$(OutDir)%(Link)",
];

#[test]
fn test_collects_across_expressions_in_first_seen_order() {
    let names = ReferencedNames::collect(ELEMENT, ShredderOptions::ALL);

    let item_types: Vec<&str> = names.item_types().collect();
    assert_eq!(item_types, vec!["Compile", "Resource"]);

    let keys: Vec<String> = names.metadata().map(|m| m.key()).collect();
    assert_eq!(keys, vec!["Compile.Culture", "Filename", "Sep", "Link"]);
}

#[test]
fn test_transform_metadata_is_opt_in() {
    let without = ReferencedNames::collect(["@(Compile->'%(Extension)')"], ShredderOptions::ALL);
    assert!(!without.contains_metadata("Extension"));

    let with = ReferencedNames::collect(
        ["@(Compile->'%(Extension)')"],
        ShredderOptions::ALL | ShredderOptions::METADATA_IN_TRANSFORMS,
    );
    assert!(with.contains_metadata("extension"));
    assert!(with.contains_item_type("COMPILE"));
}

#[rstest]
#[case("%(A)", true, true)]
#[case("@(I->'%(A)')", false, true)]
#[case("@(I, '%(A)')", true, true)]
#[case("@(I)", false, false)]
#[case("%(", false, false)]
fn test_metadata_presence(
    #[case] expr: &str,
    #[case] outside_transform: bool,
    #[case] anywhere: bool,
) {
    assert_eq!(contains_metadata_outside_transform(expr), outside_transform);
    assert_eq!(contains_metadata(expr), anywhere);
}

#[test]
fn test_captures_report_their_spans() {
    let expr = "x @(A) y @(B->Count()) z";
    let spans: Vec<(usize, usize, &str)> = item_vector_captures(expr, 0, expr.len())
        .map(|c| (c.start(), c.end(), c.item_type))
        .collect();
    assert_eq!(spans, vec![(2, 6, "A"), (9, 22, "B")]);
    assert_eq!(&expr[9..22], "@(B->Count())");
}
