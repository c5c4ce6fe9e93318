//! Second pass: type-check the annotated tree and render it through a
//! [`ScriptGenerator`].
//!
//! Children leave their translations on the [`CallStack`]; a parent pops them
//! on exit, checks their kinds and pushes its own translation. References are
//! resolved against the [`ContextStack`], which predicates, context overrides
//! and notice references push onto while their subtree is walked.

use crate::call_stack::{CallStack, Identifier, IdentifierKind};
use crate::context::{ContextKind, ContextStack};
use crate::generator::ScriptGenerator;
use crate::parser::{ContextAnchor, unquote};
use crate::preprocessor::field_type;
use crate::syntax::{ArithmeticOperator, Function, Listener, Production, ReferenceTarget, SyntaxNode, walk};
use efx_core::{
    EfxType, Expression, ExpressionKind, Result, SymbolResolver, TranslationError, add_axis, join, split_attribute,
};
use tracing::trace;

pub(crate) struct Translator<'a> {
    symbols: &'a dyn SymbolResolver,
    generator: &'a dyn ScriptGenerator,
    contexts: ContextStack,
    stack: CallStack,
}

impl<'a> Translator<'a> {
    pub(crate) fn new(symbols: &'a dyn SymbolResolver, generator: &'a dyn ScriptGenerator) -> Self {
        Self { symbols, generator, contexts: ContextStack::new(), stack: CallStack::new() }
    }

    /// Push the context the translation starts from.
    pub(crate) fn push_context(&mut self, anchor: &ContextAnchor) -> Result<()> {
        match anchor {
            ContextAnchor::Field(id) => self.contexts.push_field(self.symbols, id)?,
            ContextAnchor::Node(id) => self.contexts.push_node(self.symbols, id)?,
        };
        Ok(())
    }

    pub(crate) fn declare_parameter(&mut self, name: &str, value: Expression) {
        self.stack.declare(Identifier::parameter(name, value));
    }

    /// Walk `tree` and return its translation. Afterwards exactly one value
    /// must be left on the call stack and only the starting context on the
    /// context stack.
    pub(crate) fn translate(mut self, tree: &SyntaxNode) -> Result<Expression> {
        walk(&mut self, tree)?;
        if self.stack.len() != 1 {
            return Err(TranslationError::malformed(format!(
                "expected one translated value, found {}",
                self.stack.len()
            )));
        }
        let result = self.stack.pop_any()?;
        self.contexts.pop()?;
        if !self.contexts.is_empty() {
            return Err(TranslationError::malformed(format!("{} context(s) left unpopped", self.contexts.len())));
        }
        Ok(result)
    }

    fn relative_path_of(&self, anchor: ReferenceTarget<'_>) -> Result<String> {
        let context = self.contexts.absolute_path();
        match anchor {
            ReferenceTarget::Field(id) => self.symbols.relative_path_of_field(id, context),
            ReferenceTarget::Node(id) => self.symbols.relative_path_of_node(id, context),
            ReferenceTarget::Attribute(_) | ReferenceTarget::Variable(_) => {
                Err(TranslationError::malformed("only fields and nodes have paths"))
            }
        }
    }

    fn push_reference_context(&mut self, reference: Option<ReferenceTarget<'_>>) -> Result<()> {
        match reference {
            Some(ReferenceTarget::Field(id)) => self.contexts.push_field(self.symbols, id).map(|_| ()),
            Some(ReferenceTarget::Node(id)) => self.contexts.push_node(self.symbols, id).map(|_| ()),
            Some(ReferenceTarget::Variable(name)) => {
                let identifier = self.stack.resolve(name)?;
                let IdentifierKind::ContextVariable { symbol, is_node } = &identifier.kind else {
                    return Err(TranslationError::type_mismatch("context variable", identifier.reference.kind()));
                };
                let (symbol, is_node) = (symbol.clone(), *is_node);
                if is_node {
                    self.contexts.push_node(self.symbols, &symbol)?;
                } else {
                    self.contexts.push_field(self.symbols, &symbol)?;
                }
                self.contexts.bind_variable(name)
            }
            _ => Err(TranslationError::malformed("a context must be a field, node or context variable")),
        }
    }

    fn enter_node(&mut self, node: &SyntaxNode, parent: Option<&SyntaxNode>) -> Result<()> {
        match &node.production {
            Production::Iteration | Production::Quantified(_) => self.stack.push_frame(),
            Production::ContextOverride => {
                let anchor = node.child(0).map(|anchor| match &anchor.production {
                    Production::VariableContext(name) => Some(ReferenceTarget::Variable(name)),
                    _ => anchor.reference_target(),
                });
                self.push_reference_context(anchor.flatten())?;
            }
            Production::NoticeReference(_) => self.contexts.push_absolute(),
            Production::Predicate => {
                let qualified = parent.and_then(|p| p.child(0)).and_then(SyntaxNode::simple_reference);
                self.push_reference_context(qualified.and_then(SyntaxNode::reference_target))?;
            }
            _ => {}
        }
        Ok(())
    }

    fn exit_node(&mut self, node: &SyntaxNode) -> Result<()> {
        let generator = self.generator;
        match &node.production {
            Production::Logical(operator) => {
                let right = self.stack.pop(ExpressionKind::BOOLEAN)?;
                let left = self.stack.pop(ExpressionKind::BOOLEAN)?;
                self.stack.push(generator.logical(*operator, &left, &right));
            }
            Production::Comparison(operator) => {
                let (left, right) = self.pop_operands()?;
                if left.kind() != right.kind() {
                    return Err(TranslationError::type_mismatch(left.kind(), right.kind()));
                }
                if left.kind().is_sequence() || left.kind().is_path() {
                    return Err(TranslationError::type_mismatch("comparable value", left.kind()));
                }
                self.stack.push(generator.comparison(*operator, &left, &right));
            }
            Production::Presence { negated } => {
                let path = self.stack.pop_sequence()?;
                self.stack.push(generator.presence(&path, *negated));
            }
            Production::Emptiness { negated } => {
                let operand = self.stack.pop_any()?;
                if !operand.kind().is_sequence() && operand.kind() != ExpressionKind::STRING {
                    return Err(TranslationError::type_mismatch("text or sequence", operand.kind()));
                }
                self.stack.push(generator.emptiness(&operand, *negated));
            }
            Production::InList { negated } => {
                let haystack = self.stack.pop_sequence()?;
                let needle = self.stack.pop_any()?;
                if needle.kind().is_sequence() || needle.kind().is_path() {
                    return Err(TranslationError::type_mismatch("single value", needle.kind()));
                }
                let haystack = if haystack.is_empty_sequence() {
                    haystack.with_kind(needle.kind().as_sequence())
                } else if haystack.kind().as_scalar() != needle.kind() {
                    return Err(TranslationError::type_mismatch(needle.kind().as_sequence(), haystack.kind()));
                } else {
                    haystack
                };
                self.stack.push(generator.in_list(&needle, &haystack, *negated));
            }
            Production::Like { negated } => {
                let pattern = self.stack.pop(ExpressionKind::STRING)?;
                let value = self.stack.pop(ExpressionKind::STRING)?;
                let source = node.child(1).map_or("", |literal| literal.text.as_str());
                validate_pattern(source)?;
                self.stack.push(generator.like(&value, &pattern, *negated));
            }
            Production::UniqueIn { negated } => {
                let haystack = self.stack.pop_sequence()?;
                let needle = self.stack.pop_sequence()?;
                if !haystack.is_empty_sequence() && haystack.ty() != needle.ty() {
                    return Err(TranslationError::type_mismatch(needle.kind(), haystack.kind()));
                }
                self.stack.push(generator.unique_in(&needle, &haystack, *negated));
            }
            Production::Arithmetic(operator) => {
                let (left, right) = self.pop_operands()?;
                let result = arithmetic_result(*operator, left.kind(), right.kind())
                    .ok_or_else(|| TranslationError::type_mismatch(left.kind(), right.kind()))?;
                self.stack.push(generator.arithmetic(*operator, &left, &right, result));
            }
            Production::Negation => {
                let operand = self.stack.pop_any()?;
                if !matches!(operand.kind(), ExpressionKind::NUMERIC | ExpressionKind::DURATION) {
                    return Err(TranslationError::type_mismatch(ExpressionKind::NUMERIC, operand.kind()));
                }
                self.stack.push(generator.negation(&operand));
            }
            Production::Parenthesized => {
                let operand = self.stack.pop_any()?;
                self.stack.push(generator.parenthesized(&operand));
            }
            Production::Conditional => {
                let otherwise = self.stack.pop_any()?;
                let then = self.stack.pop_any()?;
                let condition = self.stack.pop(ExpressionKind::BOOLEAN)?;
                let (then, otherwise) = unify(then, otherwise)?;
                self.stack.push(generator.conditional(&condition, &then, &otherwise));
            }
            Production::List => {
                let items = self.stack.pop_many(node.children.len())?;
                let Some(first) = items.first() else {
                    self.stack.push(Expression::empty_sequence());
                    return Ok(());
                };
                let kind = first.kind();
                if kind.is_sequence() || kind.is_path() {
                    return Err(TranslationError::type_mismatch("single value", kind));
                }
                if let Some(odd) = items.iter().find(|item| item.kind() != kind) {
                    return Err(TranslationError::type_mismatch(kind, odd.kind()));
                }
                self.stack.push(generator.list(&items, kind.as_sequence()));
            }
            Production::Codelist(name) => {
                let codes = self.symbols.expand_codelist(name)?;
                self.stack.push(generator.codelist(&codes));
            }
            Production::Iteration => {
                let body = self.stack.pop_any()?;
                let iterators = self.stack.pop(ExpressionKind::PATH)?;
                self.stack.pop_frame()?;
                self.stack.push(generator.iteration(&iterators, &body));
            }
            Production::Quantified(quantifier) => {
                let body = self.stack.pop(ExpressionKind::BOOLEAN)?;
                let iterators = self.stack.pop(ExpressionKind::PATH)?;
                self.stack.pop_frame()?;
                self.stack.push(generator.quantified(*quantifier, &iterators, &body));
            }
            Production::IteratorList => {
                let iterators = self.stack.pop_many(node.children.len())?;
                self.stack.push(generator.iterator_list(&iterators));
            }
            Production::Iterator { ty, variable } => {
                let source = self.stack.pop(ty.sequence())?;
                let reference = generator.variable_reference(variable, ty.scalar());
                self.stack.declare(Identifier::variable(variable, reference.clone()));
                self.stack.push(generator.iterator(&reference, &source));
            }
            Production::ContextIterator { variable } => {
                let source = self.stack.pop(ExpressionKind::PATH)?;
                let (symbol, is_node) = match node.child(0).and_then(SyntaxNode::reference_target) {
                    Some(ReferenceTarget::Field(id)) => (id, false),
                    Some(ReferenceTarget::Node(id)) => (id, true),
                    _ => return Err(TranslationError::malformed("context iterator without anchor")),
                };
                let reference = generator.variable_reference(variable, ExpressionKind::PATH);
                self.stack.declare(Identifier::context_variable(variable, symbol, is_node, reference.clone()));
                self.stack.push(generator.iterator(&reference, &source));
            }
            Production::FunctionCall(function) => self.function_call(*function, node.children.len())?,
            Production::LateBoundValue => self.late_bound_value(node)?,
            Production::ReferenceSequence => {
                let reference = self.stack.pop_sequence()?;
                self.stack.push(reference);
            }
            Production::NoticeReference(notice_id) => {
                let inner = self.stack.pop_any()?;
                if self.contexts.pop()?.kind != ContextKind::Absolute {
                    return Err(TranslationError::malformed("notice reference closed a non-absolute context"));
                }
                self.stack.push(generator.external_reference(notice_id, &inner));
            }
            Production::ContextOverride => {
                let inner = self.stack.pop_any()?;
                self.stack.pop(ExpressionKind::PATH)?;
                let context = self.contexts.pop()?;
                let base = match &context.variable {
                    Some(variable) => generator.variable_reference(variable, ExpressionKind::PATH).into_script(),
                    None => context.relative_path,
                };
                let kind = inner.kind();
                self.stack.push(Expression::new(join(&base, inner.script())?, kind));
            }
            Production::AxisReference(axis) => {
                let inner = self.stack.pop_any()?;
                let kind = inner.kind();
                self.stack.push(Expression::new(add_axis(axis, inner.script())?, kind));
            }
            Production::AttributeReference(name) => {
                let element = self.stack.pop_any()?;
                self.stack.push(generator.attribute_reference(element.script(), name));
            }
            Production::Predicate => {
                let predicate = self.stack.pop(ExpressionKind::BOOLEAN)?;
                self.contexts.pop()?;
                let path = self.stack.pop_sequence()?;
                self.stack.push(generator.path_with_predicate(&path, &predicate));
            }
            Production::FieldContext(id) => {
                let path = self.relative_path_of(ReferenceTarget::Field(id))?;
                self.stack.push(Expression::path(path));
            }
            Production::NodeContext(id) => {
                let path = self.relative_path_of(ReferenceTarget::Node(id))?;
                self.stack.push(Expression::path(path));
            }
            Production::VariableContext(name) => {
                let identifier = self.stack.resolve(name)?;
                if !matches!(identifier.kind, IdentifierKind::ContextVariable { .. }) {
                    return Err(TranslationError::type_mismatch("context variable", identifier.reference.kind()));
                }
                let reference = identifier.reference.clone();
                self.stack.push(reference);
            }
            Production::FieldReference(id) => {
                let path = self.relative_path_of(ReferenceTarget::Field(id))?;
                let ty = if self.symbols.is_attribute_field(id)? {
                    EfxType::String
                } else {
                    EfxType::from_data_type(&self.symbols.type_of_field(id)?).unwrap_or(EfxType::Path)
                };
                trace!(field = %id, %path, "field reference");
                self.stack.push(Expression::sequence(path, ty));
            }
            Production::NodeReference(id) => {
                let path = self.relative_path_of(ReferenceTarget::Node(id))?;
                self.stack.push(Expression::new(path, ExpressionKind::PATH_SEQUENCE));
            }
            Production::Variable(name) => {
                let reference = self.stack.resolve(name)?.reference.clone();
                self.stack.push(reference);
            }
            Production::StringLiteral => self.stack.push(generator.string_literal(&node.text)),
            Production::NumericLiteral => self.stack.push(generator.numeric_literal(&node.text)),
            Production::BooleanLiteral(value) => self.stack.push(generator.boolean_literal(*value)),
            Production::DateLiteral => self.stack.push(generator.date_literal(&node.text)),
            Production::TimeLiteral => self.stack.push(generator.time_literal(&node.text)),
            Production::DurationLiteral => self.stack.push(generator.duration_literal(&node.text)),
            Production::PredicatedReference | Production::TypeCast(_) => {}
        }
        Ok(())
    }

    /// Right operand is on top.
    fn pop_operands(&mut self) -> Result<(Expression, Expression)> {
        let right = self.stack.pop_any()?;
        let left = self.stack.pop_any()?;
        Ok((left, right))
    }

    fn late_bound_value(&mut self, node: &SyntaxNode) -> Result<()> {
        let ty = node.type_cast().ok_or_else(|| {
            TranslationError::malformed(format!("`{}` reached translation without a type annotation", node.text))
        })?;
        let generator = self.generator;
        let value = match node.reference_target() {
            Some(ReferenceTarget::Variable(_)) => {
                let value = self.stack.pop_any()?;
                if value.kind() != ty.scalar() {
                    return Err(TranslationError::type_mismatch(ty.scalar(), value.kind()));
                }
                value
            }
            Some(ReferenceTarget::Attribute(_)) => {
                let path = self.stack.pop_any()?;
                self.attribute_value(&path, ty)?
            }
            Some(ReferenceTarget::Field(id)) => {
                let path = self.stack.pop_any()?;
                if self.symbols.is_attribute_field(id)? {
                    self.attribute_field_value(id, &path, ty)?
                } else {
                    field_type(self.symbols, id, "use as a value")?;
                    generator.field_value(path.script(), ty)
                }
            }
            Some(ReferenceTarget::Node(id)) => {
                return Err(TranslationError::type_mismatch(ty, format!("node {id}")));
            }
            None => return Err(TranslationError::malformed(format!("`{}` has no reference target", node.text))),
        };
        self.stack.push(value);
        Ok(())
    }

    fn attribute_value(&self, path: &Expression, ty: EfxType) -> Result<Expression> {
        Ok(match split_attribute(path.script())? {
            Some((element, attribute)) => self.generator.attribute_value(&element, &attribute, ty),
            None => self.generator.field_value(path.script(), ty),
        })
    }

    /// The resolver names the attribute; the path may or may not end in it.
    fn attribute_field_value(&self, field: &str, path: &Expression, ty: EfxType) -> Result<Expression> {
        let attribute = self.symbols.attribute_name_of_field(field)?;
        let element = match split_attribute(path.script())? {
            Some((element, name)) if name == attribute => element,
            _ => path.script().to_string(),
        };
        Ok(self.generator.attribute_value(&element, &attribute, ty))
    }

    fn function_call(&mut self, function: Function, arity: usize) -> Result<()> {
        use ExpressionKind as K;

        let mut arguments = self.stack.pop_many(arity)?;
        let result = match function {
            Function::Not => {
                check_arguments(&mut arguments, &[K::BOOLEAN])?;
                K::BOOLEAN
            }
            Function::Contains | Function::StartsWith | Function::EndsWith => {
                check_arguments(&mut arguments, &[K::STRING, K::STRING])?;
                K::BOOLEAN
            }
            Function::Count => {
                check_any_sequence(&arguments)?;
                K::NUMERIC
            }
            Function::Sum | Function::Min | Function::Max => {
                check_arguments(&mut arguments, &[EfxType::Numeric.sequence()])?;
                K::NUMERIC
            }
            Function::Number | Function::StringLength => {
                check_arguments(&mut arguments, &[K::STRING])?;
                K::NUMERIC
            }
            Function::String => {
                check_arguments(&mut arguments, &[K::NUMERIC])?;
                K::STRING
            }
            Function::Substring => {
                if arguments.len() == 3 {
                    check_arguments(&mut arguments, &[K::STRING, K::NUMERIC, K::NUMERIC])?;
                } else {
                    check_arguments(&mut arguments, &[K::STRING, K::NUMERIC])?;
                }
                K::STRING
            }
            Function::Concat => {
                if arguments.len() < 2 {
                    return Err(TranslationError::ArgumentCount { expected: 2, actual: arguments.len() });
                }
                let expected = vec![K::STRING; arguments.len()];
                check_arguments(&mut arguments, &expected)?;
                K::STRING
            }
            Function::FormatNumber => {
                check_arguments(&mut arguments, &[K::NUMERIC, K::STRING])?;
                K::STRING
            }
            Function::UpperCase | Function::LowerCase => {
                check_arguments(&mut arguments, &[K::STRING])?;
                K::STRING
            }
            Function::StringJoin => {
                check_arguments(&mut arguments, &[EfxType::String.sequence(), K::STRING])?;
                K::STRING
            }
            Function::DistinctValues => {
                check_any_sequence(&arguments)?;
                arguments[0].kind()
            }
            Function::Date => {
                check_arguments(&mut arguments, &[K::STRING])?;
                K::DATE
            }
            Function::Time => {
                check_arguments(&mut arguments, &[K::STRING])?;
                K::TIME
            }
            Function::DayTimeDuration | Function::YearMonthDuration => {
                check_arguments(&mut arguments, &[K::STRING])?;
                K::DURATION
            }
        };
        self.stack.push(self.generator.function(function, &arguments, result));
        Ok(())
    }
}

impl Listener for Translator<'_> {
    fn enter(&mut self, node: &SyntaxNode, parent: Option<&SyntaxNode>) -> Result<()> {
        self.enter_node(node, parent).map_err(|err| err.in_fragment(&node.text))
    }

    fn exit(&mut self, node: &SyntaxNode, _parent: Option<&SyntaxNode>) -> Result<()> {
        self.exit_node(node).map_err(|err| err.in_fragment(&node.text))
    }
}

/// Result kind of `left operator right`, or `None` when EFX does not define it.
fn arithmetic_result(
    operator: ArithmeticOperator,
    left: ExpressionKind,
    right: ExpressionKind,
) -> Option<ExpressionKind> {
    use ArithmeticOperator::{Add, Multiply, Subtract};
    use EfxType::{Date, Duration, Numeric};

    if left.is_sequence() || right.is_sequence() {
        return None;
    }
    let ty = match (left.ty, operator, right.ty) {
        (Numeric, _, Numeric) => Numeric,
        (Numeric, Multiply, Duration) | (Duration, Multiply, Numeric) => Duration,
        (Date, Add | Subtract, Duration) | (Duration, Add, Date) => Date,
        (Duration, Add | Subtract, Duration) | (Date, Subtract, Date) => Duration,
        _ => return None,
    };
    Some(ty.scalar())
}

/// Both branches of a conditional must agree; an empty sequence adopts the
/// other branch's sequence kind.
fn unify(then: Expression, otherwise: Expression) -> Result<(Expression, Expression)> {
    if then.kind() == otherwise.kind() {
        return Ok((then, otherwise));
    }
    if otherwise.is_empty_sequence() && then.kind().is_sequence() {
        let kind = then.kind();
        return Ok((then, otherwise.with_kind(kind)));
    }
    if then.is_empty_sequence() && otherwise.kind().is_sequence() {
        let kind = otherwise.kind();
        return Ok((then.with_kind(kind), otherwise));
    }
    Err(TranslationError::type_mismatch(then.kind(), otherwise.kind()))
}

fn check_arguments(arguments: &mut [Expression], expected: &[ExpressionKind]) -> Result<()> {
    if arguments.len() != expected.len() {
        return Err(TranslationError::ArgumentCount { expected: expected.len(), actual: arguments.len() });
    }
    for (argument, kind) in arguments.iter_mut().zip(expected) {
        if argument.is_empty_sequence() && kind.is_sequence() {
            *argument = argument.clone().with_kind(*kind);
        } else if !argument.kind().is_assignable_to(*kind) {
            return Err(TranslationError::type_mismatch(kind, argument.kind()));
        }
    }
    Ok(())
}

fn check_any_sequence(arguments: &[Expression]) -> Result<()> {
    match arguments {
        [argument] if argument.kind().is_sequence() => Ok(()),
        [argument] => Err(TranslationError::type_mismatch("sequence", argument.kind())),
        _ => Err(TranslationError::ArgumentCount { expected: 1, actual: arguments.len() }),
    }
}

/// `like` patterns are regular expressions; reject ones that do not compile.
fn validate_pattern(literal: &str) -> Result<()> {
    let pattern = unquote(literal);
    fancy_regex::Regex::new(pattern)
        .map(|_| ())
        .map_err(|err| TranslationError::InvalidPattern { pattern: pattern.to_string(), message: err.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::XPathScriptGenerator;
    use crate::parser::parse_expression;
    use efx_core::SymbolCatalog;
    use rstest::{fixture, rstest};

    #[fixture]
    fn symbols() -> SymbolCatalog {
        SymbolCatalog::new("test")
            .with_node("ND-Root", "/*")
            .with_field("BT-00-Text", "/*/PathNode/TextField", "text")
            .with_field("BT-00-Number", "/*/PathNode/NumberField", "number")
    }

    fn run(symbols: &SymbolCatalog, source: &str) -> Result<Expression> {
        let generator = XPathScriptGenerator::new();
        let mut translator = Translator::new(symbols, &generator);
        translator.push_context(&ContextAnchor::Node("ND-Root".into()))?;
        translator.translate(&parse_expression(source)?)
    }

    #[rstest]
    #[case(ArithmeticOperator::Add, ExpressionKind::DATE, ExpressionKind::DURATION, Some(ExpressionKind::DATE))]
    #[case(ArithmeticOperator::Add, ExpressionKind::DURATION, ExpressionKind::DATE, Some(ExpressionKind::DATE))]
    #[case(ArithmeticOperator::Subtract, ExpressionKind::DATE, ExpressionKind::DATE, Some(ExpressionKind::DURATION))]
    #[case(ArithmeticOperator::Multiply, ExpressionKind::NUMERIC, ExpressionKind::DURATION, Some(ExpressionKind::DURATION))]
    #[case(ArithmeticOperator::Divide, ExpressionKind::DURATION, ExpressionKind::NUMERIC, None)]
    #[case(ArithmeticOperator::Add, ExpressionKind::STRING, ExpressionKind::STRING, None)]
    #[case(ArithmeticOperator::Subtract, ExpressionKind::DURATION, ExpressionKind::DATE, None)]
    fn arithmetic_table(
        #[case] operator: ArithmeticOperator,
        #[case] left: ExpressionKind,
        #[case] right: ExpressionKind,
        #[case] expected: Option<ExpressionKind>,
    ) {
        assert_eq!(arithmetic_result(operator, left, right), expected);
    }

    #[rstest]
    fn leaves_exactly_one_value(symbols: SymbolCatalog) {
        let result = run(&symbols, "(number)BT-00-Number + 1 > 2").unwrap();
        assert_eq!(result.kind(), ExpressionKind::BOOLEAN);
        assert_eq!(result.script(), "PathNode/NumberField/number() + 1 > 2");
    }

    /// Reports `BT-00-Listed` as an attribute field whose path stops at the element.
    struct ElementPathResolver(SymbolCatalog);

    impl SymbolResolver for ElementPathResolver {
        fn absolute_path_of_field(&self, field_id: &str) -> Result<String> {
            self.0.absolute_path_of_field(field_id)
        }

        fn absolute_path_of_node(&self, node_id: &str) -> Result<String> {
            self.0.absolute_path_of_node(node_id)
        }

        fn type_of_field(&self, field_id: &str) -> Result<String> {
            self.0.type_of_field(field_id)
        }

        fn is_attribute_field(&self, field_id: &str) -> Result<bool> {
            Ok(field_id == "BT-00-Listed" || self.0.is_attribute_field(field_id)?)
        }

        fn attribute_name_of_field(&self, field_id: &str) -> Result<String> {
            if field_id == "BT-00-Listed" { Ok("listName".into()) } else { self.0.attribute_name_of_field(field_id) }
        }

        fn root_codelist_of_field(&self, field_id: &str) -> Result<String> {
            self.0.root_codelist_of_field(field_id)
        }

        fn expand_codelist(&self, codelist_id: &str) -> Result<Vec<String>> {
            self.0.expand_codelist(codelist_id)
        }
    }

    #[rstest]
    fn attribute_name_comes_from_the_resolver(symbols: SymbolCatalog) {
        let symbols = ElementPathResolver(symbols.with_field("BT-00-Listed", "/*/PathNode/CodeField", "text"));
        let generator = XPathScriptGenerator::new();
        let mut translator = Translator::new(&symbols, &generator);
        translator.push_context(&ContextAnchor::Node("ND-Root".into())).unwrap();
        let result = translator.translate(&parse_expression("(text)BT-00-Listed == 'eu'").unwrap()).unwrap();
        assert_eq!(result.script(), "PathNode/CodeField/normalize-space(@listName) = 'eu'");
    }

    #[rstest]
    fn missing_annotation_is_a_malformed_state(symbols: SymbolCatalog) {
        let err = run(&symbols, "BT-00-Text == 'a'").unwrap_err();
        assert!(matches!(err, TranslationError::MalformedContextState(_)));
    }

    #[rstest]
    fn mismatch_names_the_fragment(symbols: SymbolCatalog) {
        let err = run(&symbols, "(text)BT-00-Text == 1").unwrap_err();
        let TranslationError::TypeMismatch { fragment, .. } = err else {
            panic!("expected a type mismatch, got {err:?}");
        };
        assert_eq!(fragment.as_deref(), Some("(text)BT-00-Text == 1"));
    }

    #[rstest]
    fn broken_pattern_is_rejected() {
        assert!(matches!(validate_pattern("'[a-'"), Err(TranslationError::InvalidPattern { .. })));
    }
}
