mod common;

use common::translate;
use efx_core::{SymbolKind, TranslationError};
use rstest::rstest;

#[rstest]
#[case("BT-00-Text == 1")]
#[case("BT-00-Number + 'a'")]
#[case("BT-00-Text and BT-00-Number > 1")]
#[case("BT-00-StartDate * 2")]
#[case("BT-00-StartDate + BT-00-EndDate")]
#[case("sum(BT-00-Text) > 1")]
#[case("BT-00-Text in (1, 2)")]
#[case("BT-00-Text in ('a', 1)")]
#[case("if BT-00-Number then 1 else 2")]
#[case("if BT-00-Number > 1 then 1 else 'a'")]
#[case("-BT-00-Text == 'a'")]
#[case("BT-00-Number is empty")]
#[case("ND-Root == 'x'")]
#[case("for context:$n in ND-SubNode return $n")]
#[case("BT-00-Text is unique in ND-Root::BT-00-Number")]
fn rejects_mismatched_types(#[case] expression: &str) {
    let err = translate("ND-Root", expression).unwrap_err();
    assert!(matches!(err, TranslationError::TypeMismatch { .. }), "{expression}: {err:?}");
}

#[rstest]
fn mismatch_reports_the_offending_fragment() {
    let err = translate("ND-Root", "BT-00-Number > 1 and BT-00-Text == 1").unwrap_err();
    let TranslationError::TypeMismatch { fragment: Some(fragment), .. } = err else {
        panic!("expected a type mismatch with a fragment, got {err:?}");
    };
    assert!(fragment.ends_with("BT-00-Text == 1"), "{fragment}");
    assert!(!fragment.contains("BT-00-Number"), "{fragment}");
}

#[rstest]
#[case("BT-99-Missing == 'x'", SymbolKind::Field, "BT-99-Missing")]
#[case("ND-Missing is present", SymbolKind::Node, "ND-Missing")]
#[case("$y == 'a'", SymbolKind::Variable, "y")]
#[case("BT-00-Text in #no-such-list", SymbolKind::Codelist, "no-such-list")]
fn reports_unresolved_symbols(#[case] expression: &str, #[case] kind: SymbolKind, #[case] symbol: &str) {
    assert_eq!(translate("ND-Root", expression).unwrap_err(), TranslationError::unresolved(kind, symbol));
}

#[rstest]
fn unknown_context_is_unresolved() {
    let err = translate("BT-99-Missing", "'a' == 'a'").unwrap_err();
    assert_eq!(err, TranslationError::unresolved(SymbolKind::Field, "BT-99-Missing"));
}

#[rstest]
fn iterator_variables_do_not_leak() {
    let err = translate("ND-Root", "(for text:$x in BT-00-Text return $x) == $x").unwrap_err();
    assert_eq!(err, TranslationError::unresolved(SymbolKind::Variable, "x"));
}

#[rstest]
#[case("BT-00-Text ==")]
#[case("BT-00-Text is maybe present")]
#[case("2021-02-30Z == BT-00-StartDate")]
#[case("(1, 2")]
fn reports_syntax_errors(#[case] expression: &str) {
    assert!(matches!(translate("ND-Root", expression), Err(TranslationError::Syntax(_))));
}

#[rstest]
fn binary_fields_cannot_be_values() {
    let err = translate("ND-Root", "BT-00-Binary == 'x'").unwrap_err();
    assert!(matches!(err, TranslationError::UnsupportedFieldType { ref field_type, .. } if field_type == "binary"));
}

#[rstest]
fn like_patterns_must_compile() {
    assert!(matches!(translate("ND-Root", "BT-00-Text like '[a-'"), Err(TranslationError::InvalidPattern { .. })));
}

#[rstest]
#[case("substring(BT-00-Text) == 'a'")]
#[case("concat('a') == 'a'")]
#[case("not(TRUE, FALSE)")]
fn checks_function_arity(#[case] expression: &str) {
    assert!(matches!(translate("ND-Root", expression), Err(TranslationError::ArgumentCount { .. })));
}
