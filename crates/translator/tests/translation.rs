mod common;

use common::translate;
use rstest::rstest;

#[rstest]
#[case("ND-Root", "BT-00-Text is not present and BT-00-Integer is not present", "not(PathNode/TextField) and not(PathNode/IntegerField)")]
#[case("BT-00-Text", "count(ND-Root::BT-00-Code) == 1", "count(../../PathNode/CodeField) = 1")]
#[case("ND-Root", "BT-00-Indicator[BT-00-Code == 'a']", "PathNode/IndicatorField[../CodeField/normalize-space(text()) = 'a']")]
#[case("BT-00-Text", "2 * -P3M * -3", "(-3 * (2 * xs:yearMonthDuration('-P3M')))")]
fn end_to_end(#[case] context: &str, #[case] expression: &str, #[case] expected: &str) {
    assert_eq!(translate(context, expression).unwrap(), expected);
}

#[rstest]
#[case("ND-Root", "BT-00-Text", "PathNode/TextField")]
#[case("ND-Root", "BT-00-Text == 'x'", "PathNode/TextField/normalize-space(text()) = 'x'")]
#[case("BT-00-Text", "BT-00-Number > 5", "../NumberField/number() > 5")]
#[case("ND-Root", "BT-00-StartDate < 2020-01-01Z", "PathNode/StartDateField/xs:date(text()) < xs:date('2020-01-01Z')")]
#[case("ND-Root", "BT-00-StartTime > 12:00:00Z", "PathNode/StartTimeField/xs:time(text()) > xs:time('12:00:00Z')")]
#[case("ND-Root", "BT-00-Indicator == TRUE", "PathNode/IndicatorField/xs:boolean(normalize-space(text())) = true()")]
#[case("ND-Root", "-BT-00-Number < 0", "-PathNode/NumberField/number() < 0")]
#[case("ND-Root", "BT-00-Text is empty", "PathNode/TextField/normalize-space(text()) = ''")]
#[case("ND-Root", "BT-00-Text is not empty", "PathNode/TextField/normalize-space(text()) != ''")]
fn values_and_comparisons(#[case] context: &str, #[case] expression: &str, #[case] expected: &str) {
    assert_eq!(translate(context, expression).unwrap(), expected);
}

#[rstest]
#[case("BT-00-Text/@Attribute == 'x'", "PathNode/TextField/normalize-space(@Attribute) = 'x'")]
#[case("BT-00-CodeAttribute == 'eu'", "PathNode/CodeField/normalize-space(@listName) = 'eu'")]
#[case("BT-00-Attribute is present", "PathNode/TextField/@Attribute")]
fn attributes_from_root(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(translate("ND-Root", expression).unwrap(), expected);
}

#[rstest]
fn attribute_of_the_context_element() {
    assert_eq!(translate("BT-00-Text", "BT-00-Attribute == 'x'").unwrap(), "normalize-space(@Attribute) = 'x'");
}

#[rstest]
#[case("BT-00-Code in #accessibility", "PathNode/CodeField/normalize-space(text()) = ('inclus', 'n-inclus', 'n-inclu-just')")]
#[case("BT-00-Text not in ('a', 'b')", "not(PathNode/TextField/normalize-space(text()) = ('a', 'b'))")]
#[case("BT-00-Text in ()", "PathNode/TextField/normalize-space(text()) = ()")]
#[case("BT-00-Number in (1, 2.5)", "PathNode/NumberField/number() = (1, 2.5)")]
#[case("BT-00-Text like '[A-Z]+'", "fn:matches(normalize-space(PathNode/TextField/normalize-space(text())), '[A-Z]+')")]
#[case("BT-00-Text not like '[0-9]'", "not(fn:matches(normalize-space(PathNode/TextField/normalize-space(text())), '[0-9]'))")]
#[case(
    "BT-00-Text is unique in ND-Root::BT-00-Text",
    "count(for $x in PathNode/TextField, $y in PathNode/TextField[. = $x] return $y) = 1"
)]
fn conditions(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(translate("ND-Root", expression).unwrap(), expected);
}

#[rstest]
#[case(
    "BT-00-StartDate + P3M > BT-00-EndDate",
    "(PathNode/StartDateField/xs:date(text()) + xs:yearMonthDuration('P3M')) > PathNode/EndDateField/xs:date(text())"
)]
#[case(
    "BT-00-EndDate - BT-00-StartDate > P2W",
    "boolean(for $T in (current-date()) return ($T + (PathNode/EndDateField/xs:date(text()) - PathNode/StartDateField/xs:date(text())) > $T + xs:dayTimeDuration('P14D')))"
)]
#[case("-P1D == P1D * -1", "boolean(for $T in (current-date()) return ($T + xs:dayTimeDuration('-P1D') = $T + (-1 * xs:dayTimeDuration('P1D'))))")]
fn durations(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(translate("ND-Root", expression).unwrap(), expected);
}

#[rstest]
fn measures_are_read_as_durations() {
    let xpath = translate("ND-Root", "BT-00-Measure > P1D").unwrap();
    assert!(xpath.starts_with("boolean(for $T in (current-date()) return ($T + (for $F in PathNode/MeasureField return"));
    assert!(xpath.ends_with("> $T + xs:dayTimeDuration('P1D')))"));
}

#[rstest]
#[case("for text:$x in BT-00-Text return concat($x, '!')", "(for $x in PathNode/TextField return concat($x, '!'))")]
#[case("every text:$x in BT-00-Text satisfies $x != ''", "(every $x in PathNode/TextField satisfies $x != '')")]
#[case(
    "some number:$n in BT-00-Number, text:$t in BT-00-Text satisfies $n > 1 and $t == 'a'",
    "(some $n in PathNode/NumberField, $t in PathNode/TextField satisfies $n > 1 and $t = 'a')"
)]
#[case("if BT-00-Number > 1 then 'a' else 'b'", "(if PathNode/NumberField/number() > 1 then 'a' else 'b')")]
#[case(
    "for context:$n in ND-SubNode return count($n::BT-01-SubNode-Text)",
    "(for $n in SubNode return count($n/SubTextField))"
)]
fn iterations(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(translate("ND-Root", expression).unwrap(), expected);
}

#[rstest]
#[case("ND-Root", "ND-SubNode[BT-01-SubNode-Text == 'x'] is present", "SubNode[SubTextField/normalize-space(text()) = 'x']")]
#[case("BT-00-Text", "preceding-sibling::BT-00-Code is present", "preceding-sibling::CodeField")]
#[case("BT-00-Text", "ND-Root::BT-00-Number > 0", "../../PathNode/NumberField/number() > 0")]
#[case("ND-Root", "ND-SubNode::BT-01-SubNode-Text is present", "SubNode/SubTextField")]
#[case("BT-01-SubNode-Text", "ND-Root::BT-00-Text is present", "../../PathNode/TextField")]
#[case("BT-00-Text", "notice('abc')/BT-00-Number > 1", "fn:doc(concat($urlPrefix, 'abc'))/*/PathNode/NumberField/number() > 1")]
fn references(#[case] context: &str, #[case] expression: &str, #[case] expected: &str) {
    assert_eq!(translate(context, expression).unwrap(), expected);
}

#[rstest]
#[case("string-length(BT-00-Text) > 3", "string-length(PathNode/TextField/normalize-space(text())) > 3")]
#[case("sum(BT-00-Number) > 10", "sum(PathNode/NumberField) > 10")]
#[case("count(distinct-values(BT-00-Text)) == 1", "count(distinct-values(PathNode/TextField)) = 1")]
#[case("string-join(BT-00-Text, ', ') == 'a'", "string-join(PathNode/TextField, ', ') = 'a'")]
#[case("BT-00-StartDate == date('2020-01-01')", "PathNode/StartDateField/xs:date(text()) = xs:date('2020-01-01')")]
#[case("not(BT-00-Text == 'a')", "not(PathNode/TextField/normalize-space(text()) = 'a')")]
#[case(
    "upper-case(substring(BT-00-Text, 1, 2)) == 'AB'",
    "upper-case(substring(PathNode/TextField/normalize-space(text()), 1, 2)) = 'AB'"
)]
fn functions(#[case] expression: &str, #[case] expected: &str) {
    assert_eq!(translate("ND-Root", expression).unwrap(), expected);
}

#[rstest]
fn url_prefix_variable_is_configurable() {
    let generator = efx_translator::XPathScriptGenerator::new().with_url_prefix_variable("noticeBase");
    let xpath =
        efx_translator::translate_expression(&common::symbols(), &generator, "ND-Root", "notice('x')/BT-00-Text")
            .unwrap();
    assert_eq!(xpath, "fn:doc(concat($noticeBase, 'x'))/*/PathNode/TextField");
}
