//! Path algebra over location paths.
//!
//! Paths are decomposed into steps by a small pest grammar; the algorithms below
//! only compare and rearrange steps, they never interpret node tests.

use crate::error::{Result, TranslationError};
use core::fmt;
use itertools::Itertools;
use pest::Parser;
use pest::iterators::Pair;
use smallvec::SmallVec;

#[derive(pest_derive::Parser)]
#[grammar = "path.pest"]
struct PathParser;

const PARENT: &str = "..";
const SELF: &str = ".";
const DESCENDANT_OR_SELF: &str = "descendant-or-self::node()";

/// One location step: node test (with its axis, if any) plus predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    text: String,
    predicates: SmallVec<[String; 2]>,
}

impl Step {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), predicates: SmallVec::new() }
    }

    #[must_use]
    pub fn with_predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicates.push(predicate.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn predicates(&self) -> &[String] {
        &self.predicates
    }

    pub fn is_attribute(&self) -> bool {
        self.text.starts_with('@') || self.text.starts_with("attribute::")
    }

    /// Attribute name without the `@` or `attribute::` marker.
    pub fn attribute_name(&self) -> Option<&str> {
        self.text.strip_prefix('@').or_else(|| self.text.strip_prefix("attribute::"))
    }

    pub fn is_parent(&self) -> bool {
        self.text == PARENT
    }

    pub fn is_self(&self) -> bool {
        self.text == SELF
    }

    pub fn is_variable(&self) -> bool {
        self.text.starts_with('$')
    }

    pub fn is_function(&self) -> bool {
        self.text.ends_with(')') && !self.text.contains("::")
    }

    pub fn is_descendant(&self) -> bool {
        self.text == DESCENDANT_OR_SELF
    }

    /// A step that names an element or attribute, i.e. one a `..` can cancel.
    fn is_concrete(&self) -> bool {
        !(self.is_parent() || self.is_self() || self.is_descendant() || self.is_variable() || self.is_function())
    }

    /// Two steps match when their texts are equal and their predicates do not
    /// contradict: either side without predicates matches anything, otherwise the
    /// predicate sets must be equal regardless of order.
    pub fn matches(&self, other: &Step) -> bool {
        if self.text != other.text {
            return false;
        }
        if self.predicates.is_empty() || other.predicates.is_empty() {
            return true;
        }
        self.predicates.len() == other.predicates.len()
            && self.predicates.iter().sorted().eq(other.predicates.iter().sorted())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)?;
        for predicate in &self.predicates {
            write!(f, "[{predicate}]")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocationPath {
    absolute: bool,
    steps: Vec<Step>,
}

impl LocationPath {
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let mut pairs = PathParser::parse(Rule::path, trimmed).map_err(|err| TranslationError::MalformedPath {
            path: trimmed.to_string(),
            message: err.variant.message().into_owned(),
        })?;
        let mut path = LocationPath::default();
        let Some(root) = pairs.next() else {
            return Ok(path);
        };
        for pair in root.into_inner() {
            match pair.as_rule() {
                Rule::absolute_path => {
                    path.absolute = true;
                    for inner in pair.into_inner() {
                        match inner.as_rule() {
                            Rule::descendant => path.steps.push(Step::new(DESCENDANT_OR_SELF)),
                            Rule::relative_path => collect_steps(inner, &mut path.steps),
                            _ => {}
                        }
                    }
                }
                Rule::relative_path => collect_steps(pair, &mut path.steps),
                _ => {}
            }
        }
        Ok(path)
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Render a sub-sequence of steps as a relative path.
    fn render_steps<'a>(steps: impl IntoIterator<Item = &'a Step>) -> String {
        steps.into_iter().map(ToString::to_string).join("/")
    }
}

impl fmt::Display for LocationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = Self::render_steps(&self.steps);
        match (self.absolute, rendered.is_empty()) {
            (true, _) => write!(f, "/{rendered}"),
            (false, true) => f.write_str(SELF),
            (false, false) => f.write_str(&rendered),
        }
    }
}

fn collect_steps(relative: Pair<'_, Rule>, steps: &mut Vec<Step>) {
    for pair in relative.into_inner() {
        match pair.as_rule() {
            Rule::step => steps.push(build_step(pair)),
            Rule::separator => {
                if pair.into_inner().next().is_some_and(|inner| inner.as_rule() == Rule::descendant) {
                    steps.push(Step::new(DESCENDANT_OR_SELF));
                }
            }
            _ => {}
        }
    }
}

fn build_step(pair: Pair<'_, Rule>) -> Step {
    let mut step = Step::new(String::new());
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::step_text => step.text = inner.as_str().trim().to_string(),
            Rule::predicate => {
                let text = inner.into_inner().next().map(|p| p.as_str().trim().to_string()).unwrap_or_default();
                step.predicates.push(text);
            }
            _ => {}
        }
    }
    step
}

/// Shortest relative path leading from `context` to `target`.
///
/// An empty context leaves the target untouched. Attribute steps left over on
/// the context side are not stepped out of.
pub fn contextualize(context: &str, target: &str) -> Result<String> {
    if context.trim().is_empty() {
        return Ok(target.to_string());
    }
    if context.trim() == target.trim() {
        return Ok(SELF.to_string());
    }

    let context = LocationPath::parse(context)?;
    let target = LocationPath::parse(target)?;

    let common = context.steps.iter().zip(&target.steps).take_while(|(c, t)| c.matches(t)).count();

    let mut parts: Vec<String> = context.steps[common..]
        .iter()
        .filter(|step| !step.is_attribute())
        .map(|_| PARENT.to_string())
        .collect();
    let remainder = LocationPath::render_steps(&target.steps[common..]);
    let remainder = remainder.trim_matches('/');
    if !remainder.is_empty() {
        parts.push(remainder.to_string());
    }

    if parts.is_empty() { Ok(SELF.to_string()) } else { Ok(parts.join("/")) }
}

/// Append `second` to `first`, letting each leading `..` of `second` cancel a
/// trailing element step of `first`.
pub fn join(first: &str, second: &str) -> Result<String> {
    let first_trimmed = first.trim();
    let second_trimmed = second.trim();
    if first_trimmed.is_empty() || first_trimmed == SELF {
        return Ok(second_trimmed.to_string());
    }
    if second_trimmed.is_empty() || second_trimmed == SELF {
        return Ok(first_trimmed.to_string());
    }

    let mut head = LocationPath::parse(first_trimmed)?;
    let tail = LocationPath::parse(second_trimmed)?;
    if tail.absolute {
        return Ok(tail.to_string());
    }

    let mut rest = tail.steps.iter().skip_while(|step| step.is_self()).peekable();
    while rest.peek().is_some_and(|step| step.is_parent())
        && head.steps.last().is_some_and(Step::is_concrete)
    {
        head.steps.pop();
        rest.next();
    }
    head.steps.retain(|step| !step.is_self());
    head.steps.extend(rest.cloned());
    Ok(head.to_string())
}

/// Split a path ending in an attribute step into element path and attribute name.
pub fn split_attribute(path: &str) -> Result<Option<(String, String)>> {
    let mut parsed = LocationPath::parse(path)?;
    let Some(name) = parsed.steps.last().filter(|step| step.predicates.is_empty()).and_then(Step::attribute_name)
    else {
        return Ok(None);
    };
    let name = name.to_string();
    parsed.steps.pop();
    Ok(Some((parsed.to_string(), name)))
}

/// Prefix a relative path with an axis, e.g. `preceding-sibling::Field`.
///
/// Leading `..` steps are meaningless once an axis is applied and are dropped.
pub fn add_axis(axis: &str, path: &str) -> Result<String> {
    let parsed = LocationPath::parse(path)?;
    let remaining = LocationPath::render_steps(parsed.steps.iter().skip_while(|step| step.is_parent() || step.is_self()));
    if remaining.is_empty() { Ok(format!("{axis}::node()")) } else { Ok(format!("{axis}::{remaining}")) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/a/b", "/a/b/c", "c")]
    #[case("/a/b/c", "/a/b", "..")]
    #[case("/a/b/c", "/a/b/d", "../d")]
    #[case("/a/b/c/@d", "/a/b/c/@d", ".")]
    #[case("/a/b", "/a/c/@attribute", "../c/@attribute")]
    #[case("/a/b/@x", "/a/b/c", "c")]
    #[case("/a/b/@x", "/a/d", "../d")]
    #[case("/*/PathNode/TextField", "/*", "../..")]
    #[case("/a/b", "/x/y", "../../x/y")]
    #[case("/*/a", "//b", "../../descendant-or-self::node()/b")]
    #[case("//a/b", "//a/c", "../c")]
    #[case("/*/a", "/*//b[c]", "../descendant-or-self::node()/b[c]")]
    fn contextualize_cases(#[case] context: &str, #[case] target: &str, #[case] expected: &str) {
        assert_eq!(contextualize(context, target).unwrap(), expected);
    }

    #[rstest]
    #[case("/a/b/c")]
    #[case("/*/PathNode/TextField/@Attribute")]
    #[case("/a/b[c = 'x']/d")]
    fn contextualize_identity(#[case] path: &str) {
        assert_eq!(contextualize(path, path).unwrap(), ".");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn empty_context_keeps_target(#[case] context: &str) {
        assert_eq!(contextualize(context, "/a/b[x]/c").unwrap(), "/a/b[x]/c");
    }

    #[rstest]
    #[case("/a/b[x]/c", "/a/b/d", "../d")]
    #[case("/a/b/c", "/a/b[x]/d", "../d")]
    #[case("/a/b[x][y]/c", "/a/b[y][x]/d", "../d")]
    #[case("/a/b[x]/c", "/a/b[y]/d", "../../b[y]/d")]
    fn predicate_aware_prefix(#[case] context: &str, #[case] target: &str, #[case] expected: &str) {
        assert_eq!(contextualize(context, target).unwrap(), expected);
    }

    #[rstest]
    fn predicates_survive_in_remainder() {
        assert_eq!(
            contextualize("/a", "/a/b[@listName='x']/c[d/e = 'f']").unwrap(),
            "b[@listName='x']/c[d/e = 'f']"
        );
    }

    #[rstest]
    #[case("../..", "PathNode/CodeField", "../../PathNode/CodeField")]
    #[case("PathNode", "../CodeField", "CodeField")]
    #[case("a/b", "../../c", "c")]
    #[case("$x", "../c", "$x/../c")]
    #[case(".", "PathNode/TextField", "PathNode/TextField")]
    #[case("PathNode/TextField", ".", "PathNode/TextField")]
    #[case("/*/a", "../b", "/*/b")]
    #[case("a/fn:name()", "../b", "a/fn:name()/../b")]
    #[case("//a", "../b", "/descendant-or-self::node()/b")]
    #[case("a//b", "../../c", "a/descendant-or-self::node()/../c")]
    #[case("..", "//b", "/descendant-or-self::node()/b")]
    fn join_cases(#[case] first: &str, #[case] second: &str, #[case] expected: &str) {
        assert_eq!(join(first, second).unwrap(), expected);
    }

    #[rstest]
    #[case("preceding-sibling", "../SubNode", "preceding-sibling::SubNode")]
    #[case("ancestor", "../..", "ancestor::node()")]
    #[case("following", "a/b[c]", "following::a/b[c]")]
    fn add_axis_cases(#[case] axis: &str, #[case] path: &str, #[case] expected: &str) {
        assert_eq!(add_axis(axis, path).unwrap(), expected);
    }

    #[rstest]
    #[case("PathNode/TextField/@Attribute", Some(("PathNode/TextField", "Attribute")))]
    #[case("@listName", Some((".", "listName")))]
    #[case("/*/a/attribute::b", Some(("/*/a", "b")))]
    #[case("PathNode/TextField", None)]
    #[case("//a/@b", Some(("/descendant-or-self::node()/a", "b")))]
    fn split_attribute_cases(#[case] path: &str, #[case] expected: Option<(&str, &str)>) {
        let expected = expected.map(|(element, name)| (element.to_string(), name.to_string()));
        assert_eq!(split_attribute(path).unwrap(), expected);
    }

    #[rstest]
    fn parse_keeps_function_and_attribute_steps() {
        let path = LocationPath::parse("fn:doc(concat($urlPrefix, 'a/b'))/*/x/@y").unwrap();
        assert!(!path.is_absolute());
        let texts: Vec<_> = path.steps().iter().map(Step::text).collect();
        assert_eq!(texts, ["fn:doc(concat($urlPrefix, 'a/b'))", "*", "x", "@y"]);
        assert!(path.steps()[3].is_attribute());
        assert!(path.steps()[0].is_function());
    }

    #[rstest]
    fn leading_descendant_is_a_step() {
        let path = LocationPath::parse("//a//b").unwrap();
        assert!(path.is_absolute());
        let texts: Vec<_> = path.steps().iter().map(Step::text).collect();
        assert_eq!(texts, [DESCENDANT_OR_SELF, "a", DESCENDANT_OR_SELF, "b"]);
        assert_eq!(path.to_string(), "/descendant-or-self::node()/a/descendant-or-self::node()/b");
    }

    #[rstest]
    fn unbalanced_predicate_is_malformed() {
        let err = LocationPath::parse("/a/b[c").unwrap_err();
        assert!(matches!(err, TranslationError::MalformedPath { .. }));
    }
}
