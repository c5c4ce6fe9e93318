//! pest front end: parses EFX source and builds the owned [`SyntaxNode`] tree.

use crate::syntax::{
    ArithmeticOperator, ComparisonOperator, Function, LogicalOperator, Production, Quantifier, SyntaxNode,
};
use chrono::{NaiveDate, NaiveTime};
use efx_core::{EfxType, Result, TranslationError};
use pest::Parser;
use pest::iterators::{Pair, Pairs};

#[derive(pest_derive::Parser)]
#[grammar = "efx.pest"]
pub(crate) struct EfxParser;

/// The field or node an expression, block or template line is evaluated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextAnchor {
    Field(String),
    Node(String),
}

impl ContextAnchor {
    pub fn id(&self) -> &str {
        match self {
            ContextAnchor::Field(id) | ContextAnchor::Node(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub ty: EfxType,
    pub name: String,
}

/// `{ND-Root, text:$name} ${ ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionBlock {
    pub context: ContextAnchor,
    pub parameters: Vec<Parameter>,
    pub body: SyntaxNode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Text(String),
    /// Source of an `${...}` placeholder.
    Expression(String),
    /// Explicit `#{asset-type|label-type|asset-id}`.
    Label(String),
    /// `#{Reference}`
    ValueLabel(SyntaxNode),
    /// `#value`
    ContextValueLabel,
    /// `$value`
    ContextValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSyntax {
    pub indentation: usize,
    pub context: ContextAnchor,
    pub parts: Vec<TemplatePart>,
}

pub fn parse_expression(source: &str) -> Result<SyntaxNode> {
    let root = parse_rule(Rule::single_expression, source)?;
    let builder = Builder { source };
    let body = significant(root.into_inner())
        .next()
        .ok_or_else(|| TranslationError::Syntax("empty expression".into()))?;
    builder.build(body)
}

pub fn parse_expression_block(source: &str) -> Result<ExpressionBlock> {
    let root = parse_rule(Rule::expression_block, source)?;
    let builder = Builder { source };
    let mut inner = significant(root.into_inner());
    let header = inner.next().ok_or_else(|| TranslationError::Syntax("missing block header".into()))?;
    let body = inner.next().ok_or_else(|| TranslationError::Syntax("missing block body".into()))?;

    let mut header_parts = header.into_inner();
    let context = header_parts
        .next()
        .ok_or_else(|| TranslationError::Syntax("missing block context".into()))
        .and_then(context_anchor)?;
    let parameters = header_parts.map(parameter).collect::<Result<Vec<_>>>()?;
    Ok(ExpressionBlock { context, parameters, body: builder.build(body)? })
}

/// Parse a bare context identifier such as `ND-Root` or `BT-00-Text`.
pub fn parse_context(source: &str) -> Result<ContextAnchor> {
    let root = parse_rule(Rule::context_only, source.trim())?;
    significant(root.into_inner())
        .next()
        .ok_or_else(|| TranslationError::Syntax("missing context".into()))
        .and_then(context_anchor)
}

pub fn parse_template_line(source: &str) -> Result<TemplateSyntax> {
    let root = parse_rule(Rule::template_line, source)?;
    let builder = Builder { source };
    let mut indentation = 0;
    let mut context = None;
    let mut parts = Vec::new();
    for pair in root.into_inner() {
        match pair.as_rule() {
            Rule::indentation => indentation = pair.as_str().chars().count(),
            Rule::template_context => {
                if let Some(anchor) = pair.into_inner().next() {
                    context = Some(context_anchor(anchor)?);
                }
            }
            Rule::template_body => {
                for part in pair.into_inner() {
                    parts.push(builder.template_part(part)?);
                }
            }
            _ => {}
        }
    }
    let context = context.ok_or_else(|| TranslationError::Syntax("template line without context".into()))?;
    Ok(TemplateSyntax { indentation, context, parts })
}

fn parse_rule(rule: Rule, source: &str) -> Result<Pair<'_, Rule>> {
    EfxParser::parse(rule, source)
        .map_err(|err| TranslationError::Syntax(err.to_string()))?
        .next()
        .ok_or_else(|| TranslationError::Syntax("no input".into()))
}

fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_or
            | Rule::kw_and
            | Rule::kw_not
            | Rule::kw_is
            | Rule::kw_in
            | Rule::kw_present
            | Rule::kw_empty
            | Rule::kw_like
            | Rule::kw_unique
            | Rule::kw_if
            | Rule::kw_then
            | Rule::kw_else
            | Rule::kw_for
            | Rule::kw_return
            | Rule::kw_some
            | Rule::kw_every
            | Rule::kw_satisfies
            | Rule::kw_div
            | Rule::kw_mod
            | Rule::kw_notice
            | Rule::kw_context
            | Rule::negated
            | Rule::EOI
    )
}

/// Inner pairs without keyword and negation tokens.
fn significant<'s>(pairs: Pairs<'s, Rule>) -> impl Iterator<Item = Pair<'s, Rule>> {
    pairs.filter(|pair| !is_keyword(pair.as_rule()))
}

fn has_negation(pair: &Pair<'_, Rule>) -> bool {
    pair.clone().into_inner().any(|inner| inner.as_rule() == Rule::negated)
}

fn variable_name(pair: &Pair<'_, Rule>) -> String {
    pair.as_str().trim().trim_start_matches('$').to_string()
}

fn type_name(pair: &Pair<'_, Rule>) -> Result<EfxType> {
    EfxType::from_cast_name(pair.as_str().trim())
        .ok_or_else(|| TranslationError::Syntax(format!("unknown type `{}`", pair.as_str())))
}

/// Text between the quotes of a string literal.
pub(crate) fn unquote(literal: &str) -> &str {
    let trimmed = literal.trim();
    trimmed.get(1..trimmed.len().saturating_sub(1)).unwrap_or_default()
}

fn context_anchor(pair: Pair<'_, Rule>) -> Result<ContextAnchor> {
    let id = pair.as_str().trim().to_string();
    match pair.as_rule() {
        Rule::field_context => Ok(ContextAnchor::Field(id)),
        Rule::node_context => Ok(ContextAnchor::Node(id)),
        _ => Err(TranslationError::Syntax(format!("`{id}` cannot be used as an expression context"))),
    }
}

fn parameter(pair: Pair<'_, Rule>) -> Result<Parameter> {
    let mut inner = pair.into_inner();
    let (Some(ty), Some(variable)) = (inner.next(), inner.next()) else {
        return Err(TranslationError::Syntax("incomplete parameter declaration".into()));
    };
    Ok(Parameter { ty: type_name(&ty)?, name: variable_name(&variable) })
}

struct Builder<'s> {
    source: &'s str,
}

impl<'s> Builder<'s> {
    fn node(&self, production: Production, span: core::ops::Range<usize>, children: Vec<SyntaxNode>) -> SyntaxNode {
        let text = self.source.get(span.clone()).unwrap_or_default().to_string();
        SyntaxNode { production, span, text, children }
    }

    fn leaf(&self, production: Production, pair: &Pair<'s, Rule>) -> SyntaxNode {
        let span = pair.as_span();
        self.node(production, span.start()..span.end(), Vec::new())
    }

    fn wrap(&self, production: Production, pair: Pair<'s, Rule>) -> Result<SyntaxNode> {
        let span = pair.as_span();
        let children = self.build_all(pair.into_inner())?;
        Ok(self.node(production, span.start()..span.end(), children))
    }

    fn build_all(&self, pairs: Pairs<'s, Rule>) -> Result<Vec<SyntaxNode>> {
        significant(pairs).map(|pair| self.build(pair)).collect()
    }

    fn single(&self, pair: Pair<'s, Rule>) -> Result<SyntaxNode> {
        let rule = pair.as_rule();
        let inner = significant(pair.into_inner())
            .next()
            .ok_or_else(|| TranslationError::malformed(format!("{rule:?} has no content")))?;
        self.build(inner)
    }

    fn build(&self, pair: Pair<'s, Rule>) -> Result<SyntaxNode> {
        match pair.as_rule() {
            Rule::expression => self.single(pair),
            Rule::or_expression => self.fold_logical(pair, LogicalOperator::Or),
            Rule::and_expression => self.fold_logical(pair, LogicalOperator::And),
            Rule::value_condition => self.value_condition(pair),
            Rule::presence => {
                let negated = has_negation(&pair);
                self.wrap(Production::Presence { negated }, pair)
            }
            Rule::unique_in => {
                let negated = has_negation(&pair);
                self.wrap(Production::UniqueIn { negated }, pair)
            }
            Rule::additive | Rule::multiplicative => self.fold_arithmetic(pair),
            Rule::negation => self.wrap(Production::Negation, pair),
            Rule::parenthesized => self.wrap(Production::Parenthesized, pair),
            Rule::list => self.wrap(Production::List, pair),
            Rule::codelist => {
                let name = pair.clone().into_inner().next().map(|p| p.as_str().to_string()).unwrap_or_default();
                Ok(self.leaf(Production::Codelist(name), &pair))
            }
            Rule::conditional => self.wrap(Production::Conditional, pair),
            Rule::iteration => self.wrap(Production::Iteration, pair),
            Rule::quantified => self.quantified(pair),
            Rule::iterator_list => self.wrap(Production::IteratorList, pair),
            Rule::iterator => self.iterator(pair),
            Rule::context_iterator => self.context_iterator(pair),
            Rule::sequence_function_call | Rule::scalar_function_call => self.function_call(pair),
            Rule::late_bound_value => self.wrap(Production::LateBoundValue, pair),
            Rule::type_cast => {
                let ty = pair.clone().into_inner().next().map_or_else(
                    || Err(TranslationError::Syntax("empty type cast".into())),
                    |name| type_name(&name),
                )?;
                Ok(self.leaf(Production::TypeCast(ty), &pair))
            }
            Rule::reference_sequence | Rule::path_operand | Rule::path_root => {
                self.wrap(Production::ReferenceSequence, pair)
            }
            Rule::notice_reference => self.notice_reference(pair),
            Rule::context_override => self.wrap(Production::ContextOverride, pair),
            Rule::axis_reference => self.axis_reference(pair),
            Rule::attribute_reference => self.attribute_reference(pair),
            Rule::predicated_reference => self.predicated_reference(pair),
            Rule::predicate => self.wrap(Production::Predicate, pair),
            Rule::field_context => Ok(self.leaf(Production::FieldContext(pair.as_str().to_string()), &pair)),
            Rule::node_context => Ok(self.leaf(Production::NodeContext(pair.as_str().to_string()), &pair)),
            Rule::variable_context => Ok(self.leaf(Production::VariableContext(variable_name(&pair)), &pair)),
            Rule::field_reference => Ok(self.leaf(Production::FieldReference(pair.as_str().to_string()), &pair)),
            Rule::node_reference => Ok(self.leaf(Production::NodeReference(pair.as_str().to_string()), &pair)),
            Rule::variable => Ok(self.leaf(Production::Variable(variable_name(&pair)), &pair)),
            Rule::string_literal => Ok(self.leaf(Production::StringLiteral, &pair)),
            Rule::numeric_literal => Ok(self.leaf(Production::NumericLiteral, &pair)),
            Rule::boolean_literal => {
                let value = matches!(pair.as_str().to_ascii_lowercase().as_str(), "true" | "always");
                Ok(self.leaf(Production::BooleanLiteral(value), &pair))
            }
            Rule::date_literal => {
                let text = pair.as_str();
                if text.get(..10).and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()).is_none() {
                    return Err(TranslationError::Syntax(format!("invalid date literal `{text}`")));
                }
                Ok(self.leaf(Production::DateLiteral, &pair))
            }
            Rule::time_literal => {
                let text = pair.as_str();
                if text.get(..8).and_then(|time| NaiveTime::parse_from_str(time, "%H:%M:%S").ok()).is_none() {
                    return Err(TranslationError::Syntax(format!("invalid time literal `{text}`")));
                }
                Ok(self.leaf(Production::TimeLiteral, &pair))
            }
            Rule::duration_literal => Ok(self.leaf(Production::DurationLiteral, &pair)),
            rule => Err(TranslationError::malformed(format!("no syntax node for {rule:?}"))),
        }
    }

    fn fold_logical(&self, pair: Pair<'s, Rule>, operator: LogicalOperator) -> Result<SyntaxNode> {
        let mut operands = significant(pair.into_inner());
        let first = operands.next().ok_or_else(|| TranslationError::malformed("empty logical chain"))?;
        let mut left = self.build(first)?;
        for operand in operands {
            let right = self.build(operand)?;
            let span = left.span.start..right.span.end;
            left = self.node(Production::Logical(operator), span, vec![left, right]);
        }
        Ok(left)
    }

    fn fold_arithmetic(&self, pair: Pair<'s, Rule>) -> Result<SyntaxNode> {
        let mut inner = pair.into_inner();
        let first = inner.next().ok_or_else(|| TranslationError::malformed("empty arithmetic chain"))?;
        let mut left = self.build(first)?;
        while let Some(operator) = inner.next() {
            let token = operator.as_str().trim();
            let operator = ArithmeticOperator::from_token(token)
                .ok_or_else(|| TranslationError::Syntax(format!("unknown operator `{token}`")))?;
            let operand = inner.next().ok_or_else(|| TranslationError::malformed("dangling operator"))?;
            let right = self.build(operand)?;
            let span = left.span.start..right.span.end;
            left = self.node(Production::Arithmetic(operator), span, vec![left, right]);
        }
        Ok(left)
    }

    fn value_condition(&self, pair: Pair<'s, Rule>) -> Result<SyntaxNode> {
        let span = pair.as_span();
        let range = span.start()..span.end();
        let mut inner = pair.into_inner();
        let left = inner.next().ok_or_else(|| TranslationError::malformed("empty condition"))?;
        let left = self.build(left)?;
        let Some(suffix) = inner.next() else {
            return Ok(left);
        };

        let negated = has_negation(&suffix);
        let rule = suffix.as_rule();
        let mut operands = significant(suffix.into_inner());
        let production = match rule {
            Rule::emptiness_suffix => return Ok(self.node(Production::Emptiness { negated }, range, vec![left])),
            Rule::like_suffix => Production::Like { negated },
            Rule::in_suffix => Production::InList { negated },
            Rule::comparison_suffix => {
                let operator = operands.next().ok_or_else(|| TranslationError::malformed("missing operator"))?;
                let token = operator.as_str().trim();
                Production::Comparison(
                    ComparisonOperator::from_token(token)
                        .ok_or_else(|| TranslationError::Syntax(format!("unknown comparison `{token}`")))?,
                )
            }
            rule => return Err(TranslationError::malformed(format!("unexpected condition suffix {rule:?}"))),
        };
        let right = operands.next().ok_or_else(|| TranslationError::malformed("missing right operand"))?;
        let right = self.build(right)?;
        Ok(self.node(production, range, vec![left, right]))
    }

    fn quantified(&self, pair: Pair<'s, Rule>) -> Result<SyntaxNode> {
        let span = pair.as_span();
        let mut inner = significant(pair.into_inner());
        let quantifier = match inner.next().map(|q| q.as_str().trim().to_string()).as_deref() {
            Some("some") => Quantifier::Some,
            Some("every") => Quantifier::Every,
            other => return Err(TranslationError::Syntax(format!("unknown quantifier {other:?}"))),
        };
        let children = inner.map(|p| self.build(p)).collect::<Result<Vec<_>>>()?;
        Ok(self.node(Production::Quantified(quantifier), span.start()..span.end(), children))
    }

    fn iterator(&self, pair: Pair<'s, Rule>) -> Result<SyntaxNode> {
        let span = pair.as_span();
        let mut inner = significant(pair.into_inner());
        let declaration = inner.next().ok_or_else(|| TranslationError::malformed("iterator without variable"))?;
        let mut declaration = declaration.into_inner();
        let (Some(ty), Some(variable)) = (declaration.next(), declaration.next()) else {
            return Err(TranslationError::Syntax("incomplete iterator declaration".into()));
        };
        let production = Production::Iterator { ty: type_name(&ty)?, variable: variable_name(&variable) };
        let children = inner.map(|p| self.build(p)).collect::<Result<Vec<_>>>()?;
        Ok(self.node(production, span.start()..span.end(), children))
    }

    fn context_iterator(&self, pair: Pair<'s, Rule>) -> Result<SyntaxNode> {
        let span = pair.as_span();
        let mut inner = significant(pair.into_inner());
        let variable = inner.next().ok_or_else(|| TranslationError::malformed("iterator without variable"))?;
        let production = Production::ContextIterator { variable: variable_name(&variable) };
        let children = inner.map(|p| self.build(p)).collect::<Result<Vec<_>>>()?;
        Ok(self.node(production, span.start()..span.end(), children))
    }

    fn function_call(&self, pair: Pair<'s, Rule>) -> Result<SyntaxNode> {
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        let name = inner.next().map(|n| n.as_str().trim().to_string()).unwrap_or_default();
        let function =
            Function::from_name(&name).ok_or_else(|| TranslationError::Syntax(format!("unknown function `{name}`")))?;
        let children = self.build_all(inner)?;
        Ok(self.node(Production::FunctionCall(function), span.start()..span.end(), children))
    }

    fn notice_reference(&self, pair: Pair<'s, Rule>) -> Result<SyntaxNode> {
        let span = pair.as_span();
        let mut inner = significant(pair.into_inner());
        let id = inner.next().map(|literal| unquote(literal.as_str()).to_string()).unwrap_or_default();
        let children = inner.map(|p| self.build(p)).collect::<Result<Vec<_>>>()?;
        Ok(self.node(Production::NoticeReference(id), span.start()..span.end(), children))
    }

    fn axis_reference(&self, pair: Pair<'s, Rule>) -> Result<SyntaxNode> {
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        let axis = inner.next().map(|a| a.as_str().trim().to_string()).unwrap_or_default();
        let children = self.build_all(inner)?;
        Ok(self.node(Production::AxisReference(axis), span.start()..span.end(), children))
    }

    fn attribute_reference(&self, pair: Pair<'s, Rule>) -> Result<SyntaxNode> {
        let span = pair.as_span();
        let mut children = Vec::new();
        let mut name = String::new();
        for inner in pair.into_inner() {
            if inner.as_rule() == Rule::attribute_name {
                name = inner.as_str().to_string();
            } else {
                children.push(self.build(inner)?);
            }
        }
        Ok(self.node(Production::AttributeReference(name), span.start()..span.end(), children))
    }

    /// `Ref[a][b]` becomes `PredicatedReference(PredicatedReference(Ref, [a]), [b])`.
    fn predicated_reference(&self, pair: Pair<'s, Rule>) -> Result<SyntaxNode> {
        let mut inner = pair.into_inner();
        let base = inner.next().ok_or_else(|| TranslationError::malformed("predicate without reference"))?;
        let mut reference = self.build(base)?;
        for predicate in inner {
            let predicate = self.build(predicate)?;
            let span = reference.span.start..predicate.span.end;
            reference = self.node(Production::PredicatedReference, span, vec![reference, predicate]);
        }
        Ok(reference)
    }

    fn template_part(&self, pair: Pair<'s, Rule>) -> Result<TemplatePart> {
        match pair.as_rule() {
            Rule::text_chunk => Ok(TemplatePart::Text(pair.as_str().to_string())),
            Rule::expression_placeholder => {
                let body = pair.into_inner().next().map(|p| p.as_str().trim().to_string()).unwrap_or_default();
                Ok(TemplatePart::Expression(body))
            }
            Rule::label_placeholder => {
                let content = pair.into_inner().next().ok_or_else(|| TranslationError::Syntax("empty label".into()))?;
                if content.as_rule() == Rule::explicit_label {
                    Ok(TemplatePart::Label(content.as_str().to_string()))
                } else {
                    Ok(TemplatePart::ValueLabel(self.build(content)?))
                }
            }
            Rule::value_label_shorthand => Ok(TemplatePart::ContextValueLabel),
            Rule::value_shorthand => Ok(TemplatePart::ContextValue),
            rule => Err(TranslationError::malformed(format!("unexpected template part {rule:?}"))),
        }
    }
}
