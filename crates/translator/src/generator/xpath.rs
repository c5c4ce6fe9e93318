use super::ScriptGenerator;
use crate::syntax::{ArithmeticOperator, ComparisonOperator, Function, LogicalOperator, Quantifier};
use efx_core::{EfxType, Expression, ExpressionKind};
use itertools::Itertools;

const DEFAULT_URL_PREFIX_VARIABLE: &str = "urlPrefix";

/// Renders XPath 2.0.
#[derive(Debug, Clone)]
pub struct XPathScriptGenerator {
    url_prefix_variable: String,
}

impl Default for XPathScriptGenerator {
    fn default() -> Self {
        Self { url_prefix_variable: DEFAULT_URL_PREFIX_VARIABLE.to_string() }
    }
}

impl XPathScriptGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variable holding the URL other notices are fetched from.
    #[must_use]
    pub fn with_url_prefix_variable(mut self, name: impl Into<String>) -> Self {
        self.url_prefix_variable = name.into();
        self
    }

    pub fn url_prefix_variable(&self) -> &str {
        &self.url_prefix_variable
    }
}

/// `path/` unless the path is the context item itself.
fn step_prefix(path: &str) -> String {
    match path.trim() {
        "" | "." => String::new(),
        path => format!("{path}/"),
    }
}

fn comparison_operator(operator: ComparisonOperator) -> &'static str {
    match operator {
        ComparisonOperator::Equal => "=",
        ComparisonOperator::NotEqual => "!=",
        ComparisonOperator::Less => "<",
        ComparisonOperator::LessOrEqual => "<=",
        ComparisonOperator::Greater => ">",
        ComparisonOperator::GreaterOrEqual => ">=",
    }
}

fn arithmetic_operator(operator: ArithmeticOperator) -> &'static str {
    match operator {
        ArithmeticOperator::Add => "+",
        ArithmeticOperator::Subtract => "-",
        ArithmeticOperator::Multiply => "*",
        ArithmeticOperator::Divide => "div",
        ArithmeticOperator::Modulo => "mod",
    }
}

fn negate_if(negated: bool, script: String) -> String {
    if negated { format!("not({script})") } else { script }
}

/// Measures are stored as a number plus a `unitCode` attribute.
fn measure_value(path: &str) -> String {
    format!(
        "(for $F in {path} return (if ($F/@unitCode='WEEK') then xs:dayTimeDuration(concat('P', $F/number() * 7, 'D')) \
         else if ($F/@unitCode='DAY') then xs:dayTimeDuration(concat('P', $F/number(), 'D')) \
         else if ($F/@unitCode='YEAR') then xs:yearMonthDuration(concat('P', $F/number(), 'Y')) \
         else if ($F/@unitCode='MONTH') then xs:yearMonthDuration(concat('P', $F/number(), 'M')) \
         else ()))"
    )
}

impl ScriptGenerator for XPathScriptGenerator {
    fn string_literal(&self, text: &str) -> Expression {
        Expression::scalar(text, EfxType::String)
    }

    fn numeric_literal(&self, text: &str) -> Expression {
        Expression::scalar(text, EfxType::Numeric)
    }

    fn boolean_literal(&self, value: bool) -> Expression {
        Expression::scalar(if value { "true()" } else { "false()" }, EfxType::Boolean)
    }

    fn date_literal(&self, text: &str) -> Expression {
        Expression::scalar(format!("xs:date('{text}')"), EfxType::Date)
    }

    fn time_literal(&self, text: &str) -> Expression {
        Expression::scalar(format!("xs:time('{text}')"), EfxType::Time)
    }

    fn duration_literal(&self, text: &str) -> Expression {
        let (sign, body) = text.strip_prefix('-').map_or(("", text), |rest| ("-", rest));
        let script = if let Some(weeks) = body.strip_prefix('P').and_then(|b| b.strip_suffix('W')) {
            match weeks.parse::<u64>().ok().and_then(|w| w.checked_mul(7)) {
                Some(days) => format!("xs:dayTimeDuration('{sign}P{days}D')"),
                None => format!("xs:dayTimeDuration('{text}')"),
            }
        } else if body.ends_with('D') {
            format!("xs:dayTimeDuration('{text}')")
        } else {
            format!("xs:yearMonthDuration('{text}')")
        };
        Expression::scalar(script, EfxType::Duration)
    }

    fn field_value(&self, path: &str, ty: EfxType) -> Expression {
        let prefix = step_prefix(path);
        let script = match ty {
            EfxType::String => format!("{prefix}normalize-space(text())"),
            EfxType::Numeric => format!("{prefix}number()"),
            EfxType::Date => format!("{prefix}xs:date(text())"),
            EfxType::Time => format!("{prefix}xs:time(text())"),
            EfxType::Boolean => format!("{prefix}xs:boolean(normalize-space(text()))"),
            EfxType::Duration => measure_value(path),
            EfxType::Path => path.to_string(),
        };
        Expression::new(script, ty.scalar())
    }

    fn attribute_value(&self, element_path: &str, attribute: &str, ty: EfxType) -> Expression {
        let prefix = step_prefix(element_path);
        let script = match ty {
            EfxType::String => format!("{prefix}normalize-space(@{attribute})"),
            EfxType::Numeric => format!("{prefix}number(@{attribute})"),
            EfxType::Date => format!("{prefix}xs:date(@{attribute})"),
            EfxType::Time => format!("{prefix}xs:time(@{attribute})"),
            EfxType::Boolean => format!("{prefix}xs:boolean(normalize-space(@{attribute}))"),
            EfxType::Duration => format!("{prefix}xs:dayTimeDuration(@{attribute})"),
            EfxType::Path => format!("{prefix}@{attribute}"),
        };
        Expression::new(script, ty.scalar())
    }

    fn attribute_reference(&self, element_path: &str, attribute: &str) -> Expression {
        Expression::sequence(format!("{}@{attribute}", step_prefix(element_path)), EfxType::String)
    }

    fn path_with_predicate(&self, path: &Expression, predicate: &Expression) -> Expression {
        Expression::new(format!("{path}[{predicate}]"), path.kind())
    }

    fn external_reference(&self, notice_id: &str, path: &Expression) -> Expression {
        let relative = path.script().trim_start_matches('/');
        Expression::new(
            format!("fn:doc(concat(${}, '{notice_id}'))/{relative}", self.url_prefix_variable),
            path.kind(),
        )
    }

    fn variable_reference(&self, name: &str, kind: ExpressionKind) -> Expression {
        Expression::new(format!("${name}"), kind)
    }

    fn logical(&self, operator: LogicalOperator, left: &Expression, right: &Expression) -> Expression {
        let keyword = match operator {
            LogicalOperator::And => "and",
            LogicalOperator::Or => "or",
        };
        Expression::new(format!("{left} {keyword} {right}"), ExpressionKind::BOOLEAN)
    }

    fn comparison(&self, operator: ComparisonOperator, left: &Expression, right: &Expression) -> Expression {
        let operator = comparison_operator(operator);
        let script = if left.ty() == EfxType::Duration {
            format!("boolean(for $T in (current-date()) return ($T + {left} {operator} $T + {right}))")
        } else {
            format!("{left} {operator} {right}")
        };
        Expression::new(script, ExpressionKind::BOOLEAN)
    }

    fn arithmetic(
        &self,
        operator: ArithmeticOperator,
        left: &Expression,
        right: &Expression,
        result: ExpressionKind,
    ) -> Expression {
        let symbol = arithmetic_operator(operator);
        let script = match (left.ty(), right.ty()) {
            (EfxType::Numeric, EfxType::Numeric) => format!("{left} {symbol} {right}"),
            (EfxType::Duration, EfxType::Numeric) => format!("({right} {symbol} {left})"),
            _ => format!("({left} {symbol} {right})"),
        };
        Expression::new(script, result)
    }

    fn negation(&self, operand: &Expression) -> Expression {
        let script = match operand.ty() {
            EfxType::Duration => format!("({operand} * -1)"),
            _ => format!("-{operand}"),
        };
        Expression::new(script, operand.kind())
    }

    fn presence(&self, path: &Expression, negated: bool) -> Expression {
        Expression::new(negate_if(negated, path.script().to_string()), ExpressionKind::BOOLEAN)
    }

    fn emptiness(&self, operand: &Expression, negated: bool) -> Expression {
        let script = match (operand.kind().is_sequence(), negated) {
            (true, false) => format!("empty({operand})"),
            (true, true) => format!("exists({operand})"),
            (false, false) => format!("{operand} = ''"),
            (false, true) => format!("{operand} != ''"),
        };
        Expression::new(script, ExpressionKind::BOOLEAN)
    }

    fn in_list(&self, needle: &Expression, haystack: &Expression, negated: bool) -> Expression {
        Expression::new(negate_if(negated, format!("{needle} = {haystack}")), ExpressionKind::BOOLEAN)
    }

    fn like(&self, value: &Expression, pattern: &Expression, negated: bool) -> Expression {
        Expression::new(
            negate_if(negated, format!("fn:matches(normalize-space({value}), {pattern})")),
            ExpressionKind::BOOLEAN,
        )
    }

    fn unique_in(&self, needle: &Expression, haystack: &Expression, negated: bool) -> Expression {
        Expression::new(
            negate_if(negated, format!("count(for $x in {needle}, $y in {haystack}[. = $x] return $y) = 1")),
            ExpressionKind::BOOLEAN,
        )
    }

    fn parenthesized(&self, operand: &Expression) -> Expression {
        Expression::new(format!("({operand})"), operand.kind())
    }

    fn conditional(&self, condition: &Expression, then: &Expression, otherwise: &Expression) -> Expression {
        Expression::new(format!("(if {condition} then {then} else {otherwise})"), then.kind())
    }

    fn iterator(&self, variable: &Expression, source: &Expression) -> Expression {
        Expression::path(format!("{variable} in {source}"))
    }

    fn iterator_list(&self, iterators: &[Expression]) -> Expression {
        Expression::path(iterators.iter().join(", "))
    }

    fn quantified(&self, quantifier: Quantifier, iterators: &Expression, body: &Expression) -> Expression {
        let keyword = match quantifier {
            Quantifier::Some => "some",
            Quantifier::Every => "every",
        };
        Expression::new(format!("({keyword} {iterators} satisfies {body})"), ExpressionKind::BOOLEAN)
    }

    fn iteration(&self, iterators: &Expression, body: &Expression) -> Expression {
        Expression::new(format!("(for {iterators} return {body})"), body.kind().as_sequence())
    }

    fn list(&self, items: &[Expression], kind: ExpressionKind) -> Expression {
        if items.is_empty() {
            return Expression::empty_sequence();
        }
        Expression::new(format!("({})", items.iter().join(", ")), kind)
    }

    fn codelist(&self, codes: &[String]) -> Expression {
        if codes.is_empty() {
            return Expression::empty_sequence().with_kind(EfxType::String.sequence());
        }
        let items = codes.iter().map(|code| format!("'{}'", code.replace('\'', "''"))).join(", ");
        Expression::sequence(format!("({items})"), EfxType::String)
    }

    fn function(&self, function: Function, arguments: &[Expression], result: ExpressionKind) -> Expression {
        let name = match function {
            Function::Date => "xs:date",
            Function::Time => "xs:time",
            Function::DayTimeDuration => "xs:dayTimeDuration",
            Function::YearMonthDuration => "xs:yearMonthDuration",
            other => other.name(),
        };
        Expression::new(format!("{name}({})", arguments.iter().join(", ")), result)
    }
}
