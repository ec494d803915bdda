//! Property references and property functions through the expander.

use buildexpr::{
    ElementLocation, ErrorCode, Expander, ExpanderOptions, ExpansionContext, FunctionPolicy,
    PropertyDictionary, PropertyUsage, PropertyUsageTracker, RegistryLookup, Value,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::helpers::fixtures::build_properties;

// =============================================================================
// HELPERS
// =============================================================================

fn expand(expr: &str) -> String {
    let properties = build_properties();
    Expander::new(&properties)
        .expand_into_string_leave_escaped(expr, ExpanderOptions::EXPAND_PROPERTIES)
        .unwrap()
        .into_owned()
}

fn expand_typed(expr: &str) -> Value {
    let properties = build_properties();
    Expander::new(&properties)
        .expand_property_value(expr, ExpanderOptions::EXPAND_PROPERTIES)
        .unwrap()
}

fn error_code(expr: &str) -> ErrorCode {
    let properties = build_properties();
    match Expander::new(&properties)
        .expand_into_string_leave_escaped(expr, ExpanderOptions::EXPAND_PROPERTIES)
    {
        Ok(value) => panic!("expected {expr} to fail, got {value:?}"),
        Err(err) => err.code(),
    }
}

// =============================================================================
// PLAIN REFERENCES
// =============================================================================

#[rstest]
#[case("$(Configuration)", "Debug")]
#[case("$(configuration)", "Debug")]
#[case("$( Configuration )", "Debug")]
#[case("$(Configuration)|$(Platform)", "Debug|x64")]
#[case("$(Undefined)", "")]
#[case("[$(Undefined)]", "[]")]
#[case("$()", "")]
#[case("$(Solutions.VSVersion)", "")]
#[case("$(Solutions.VSVersion8.0)", "")]
fn test_plain_references(#[case] expr: &str, #[case] expected: &str) {
    assert_eq!(expand(expr), expected);
}

#[cfg(unix)]
#[rstest]
#[case(r"x/$(Dir)\c", "x/a/b/c")]
#[case(r"$(Dir)\$(Dir)", "a/b/a/b")]
#[case(r"$(Dir)", r"a\b")]
#[case(r"plain\text", r"plain\text")]
fn test_joined_values_use_forward_slashes(#[case] expr: &str, #[case] expected: &str) {
    let properties = PropertyDictionary::new().with("Dir", r"a\b");
    let result = Expander::new(&properties)
        .expand_into_string_leave_escaped(expr, ExpanderOptions::EXPAND_PROPERTIES)
        .unwrap();
    assert_eq!(result, expected);
}

#[rstest]
#[case("$(1Configuration)")]
#[case("$(Configuration Platform)")]
#[case("x$(Config=uration)y")]
fn test_invalid_names_are_invalid_expressions(#[case] expr: &str) {
    assert_eq!(error_code(expr), ErrorCode::InvalidExpression);
}

#[test]
fn test_invalid_name_can_be_left_unexpanded() {
    let result = Expander::new(&build_properties())
        .expand_into_string_leave_escaped(
            "$(Bad Name)-$(Platform)",
            ExpanderOptions::EXPAND_PROPERTIES
                | ExpanderOptions::LEAVE_PROPERTIES_UNEXPANDED_ON_ERROR,
        )
        .unwrap();
    assert_eq!(result, "$(Bad Name)-x64");
}

#[test]
fn test_unbalanced_reference_is_literal_text() {
    assert_eq!(expand("$(Configuration)-$(Platform"), "Debug-$(Platform");
}

// =============================================================================
// TYPED VALUES
// =============================================================================

#[test]
fn test_lone_function_result_keeps_its_type() {
    assert_eq!(expand_typed("$([MSBuild]::Add($(Count), 2))"), Value::Int(5));
    assert_eq!(
        expand_typed("$(List.Split(';'))"),
        Value::Seq(vec![
            Value::string("a"),
            Value::string("b"),
            Value::string("c"),
        ])
    );
}

#[test]
fn test_surrounding_text_makes_a_string() {
    assert_eq!(
        expand_typed("n=$([MSBuild]::Add($(Count), 2))"),
        Value::string("n=5")
    );
    assert_eq!(
        expand_typed("$(List.Split(';'))!"),
        Value::string("a;b;c!")
    );
}

// =============================================================================
// PROPERTY FUNCTIONS
// =============================================================================

#[rstest]
#[case("$(Configuration.ToUpper())", "DEBUG")]
#[case("$(Configuration.Length)", "5")]
#[case("$(Configuration.Substring(1, 2))", "eb")]
#[case("$(Configuration.Replace('bug', 'bugger'))", "Debugger")]
#[case("$(Configuration.ToLower().StartsWith('deb'))", "True")]
#[case("$(Configuration[0])", "D")]
#[case("$([MSBuild]::Multiply(3, 4))", "12")]
#[case("$([MSBuild]::Subtract($(Count), 1))", "2")]
#[case("$([MSBuild]::VersionGreaterThan('10.1', '9.9'))", "True")]
#[case("$([MSBuild]::ValueOrDefault('', 'fallback'))", "fallback")]
#[case("$([System.String]::IsNullOrEmpty($(Undefined)))", "True")]
#[case("$([System.String]::Concat('a', $(Platform)))", "ax64")]
#[case("$([System.Math]::Max(2, 7))", "7")]
fn test_property_functions(#[case] expr: &str, #[case] expected: &str) {
    assert_eq!(expand(expr), expected);
}

#[test]
fn test_function_string_results_are_escaped() {
    assert_eq!(
        expand("$([System.String]::Concat('a', ';', 'b'))"),
        "a%3Bb"
    );
    assert_eq!(expand("$([MSBuild]::Escape('a;b'))"), "a%3Bb");
    assert_eq!(expand("$([MSBuild]::Unescape('a%3bb'))"), "a;b");
}

#[rstest]
#[case("$([System.Environment]::GetEnvironmentVariables())", ErrorCode::DisallowedFunction)]
#[case("$([Not.A.Type]::Method())", ErrorCode::DisallowedFunction)]
#[case("$(Configuration.NoSuchMember())", ErrorCode::UnknownFunction)]
#[case("$(Configuration.GetType())", ErrorCode::DisallowedFunction)]
#[case("$([MSBuild]::Divide(1, 0))", ErrorCode::InvalidFunction)]
fn test_function_failures(#[case] expr: &str, #[case] code: ErrorCode) {
    assert_eq!(error_code(expr), code);
}

#[test]
fn test_unrestricted_policy_lifts_the_allowlist() {
    let properties = PropertyDictionary::new();
    let expander = Expander::new(&properties)
        .with_context(ExpansionContext::default().with_policy(FunctionPolicy::unrestricted()));
    let value = expander
        .expand_property_value(
            "$([System.Environment]::GetEnvironmentVariables())",
            ExpanderOptions::EXPAND_PROPERTIES,
        )
        .unwrap();
    assert!(matches!(value, Value::Map(_)));
}

#[test]
fn test_leave_unexpanded_on_error_keeps_the_reference() {
    let properties = build_properties();
    let result = Expander::new(&properties)
        .expand_into_string_leave_escaped(
            "x$([MSBuild]::Divide(1, 0))y$(Platform)",
            ExpanderOptions::EXPAND_PROPERTIES
                | ExpanderOptions::LEAVE_PROPERTIES_UNEXPANDED_ON_ERROR,
        )
        .unwrap();
    assert_eq!(result, "x$([MSBuild]::Divide(1, 0))yx64");
}

#[test]
fn test_errors_carry_the_element_location() {
    let properties = build_properties();
    let location = ElementLocation::new("/work/app.proj", 12, 5);
    let expander = Expander::new(&properties)
        .with_context(ExpansionContext::new(location.clone()));
    let err = expander
        .expand_into_string_leave_escaped("$([MSBuild]::Divide(1, 0))", ExpanderOptions::EXPAND_PROPERTIES)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidFunction);
    assert!(err.format().contains("app.proj"), "{}", err.format());
}

#[rstest]
#[case("$(Platform[10])")]
#[case("$( Platform.Substring(1).Substring(9) )")]
fn test_errors_name_the_whole_reference(#[case] expr: &str) {
    let err = Expander::new(&build_properties())
        .expand_into_string_leave_escaped(expr, ExpanderOptions::EXPAND_PROPERTIES)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidFunction);
    assert_eq!(err.partially_evaluated(), Some(expr));
}

// =============================================================================
// RESERVED AND REGISTRY PROPERTIES
// =============================================================================

#[cfg(unix)]
#[rstest]
#[case("$(MSBuildThisFile)", "app.proj")]
#[case("$(MSBuildThisFileName)", "app")]
#[case("$(MSBuildThisFileExtension)", ".proj")]
#[case("$(MSBuildThisFileFullPath)", "/work/src/app.proj")]
#[case("$(MSBuildThisFileDirectory)", "/work/src/")]
#[case("$(MSBuildThisFileDirectoryNoRoot)", "work/src/")]
fn test_this_file_properties(#[case] expr: &str, #[case] expected: &str) {
    let properties = PropertyDictionary::new();
    let expander = Expander::new(&properties).with_context(ExpansionContext::new(
        ElementLocation::in_file("/work/src/app.proj"),
    ));
    let result = expander
        .expand_into_string_leave_escaped(expr, ExpanderOptions::EXPAND_PROPERTIES)
        .unwrap();
    assert_eq!(result, expected);
}

#[test]
fn test_real_property_shadows_this_file_property() {
    let properties = PropertyDictionary::new().with("MSBuildThisFile", "override");
    let expander = Expander::new(&properties).with_context(ExpansionContext::new(
        ElementLocation::in_file("/work/src/app.proj"),
    ));
    let result = expander
        .expand_into_string_leave_escaped("$(MSBuildThisFile)", ExpanderOptions::EXPAND_PROPERTIES)
        .unwrap();
    assert_eq!(result, "override");
}

struct StaticRegistry;

impl RegistryLookup for StaticRegistry {
    fn value(&self, key_path: &str, value_name: &str) -> Option<String> {
        (key_path == r"HKEY_CURRENT_USER\Software\Vendor" && value_name == "Root")
            .then(|| "C:\\Vendor".to_string())
    }
}

#[test]
fn test_registry_references_go_through_the_hook() {
    let properties = PropertyDictionary::new();
    let expr = r"$(Registry:HKEY_CURRENT_USER\Software\Vendor@Root)";

    let without_hook = Expander::new(&properties)
        .expand_into_string_leave_escaped(expr, ExpanderOptions::EXPAND_PROPERTIES)
        .unwrap();
    assert_eq!(without_hook, "");

    let registry = StaticRegistry;
    let with_hook = Expander::new(&properties)
        .with_context(ExpansionContext::default().with_registry(&registry))
        .expand_into_string_leave_escaped(expr, ExpanderOptions::EXPAND_PROPERTIES)
        .unwrap();
    assert_eq!(with_hook, "C:\\Vendor");
}

// =============================================================================
// USAGE TRACKING
// =============================================================================

#[test]
fn test_usage_tracker_records_every_lookup() {
    let properties = build_properties();
    let tracker = PropertyUsageTracker::new();
    let expander = Expander::new(&properties).with_context(
        ExpansionContext::new(ElementLocation::in_file("/work/app.proj"))
            .with_usage_tracker(&tracker),
    );
    expander
        .expand_into_string_leave_escaped(
            "$(Platform)$(Missing)$(MSBuildThisFile)$(missing)",
            ExpanderOptions::EXPAND_PROPERTIES,
        )
        .unwrap();

    let kinds: Vec<PropertyUsage> = tracker.records().into_iter().map(|(_, u)| u).collect();
    assert_eq!(
        kinds,
        vec![
            PropertyUsage::Found,
            PropertyUsage::NotFound,
            PropertyUsage::Reserved,
            PropertyUsage::NotFound,
        ]
    );
    assert_eq!(tracker.uninitialized().len(), 1);
    assert_eq!(tracker.uninitialized()[0].as_str(), "Missing");
}
