//! Target-language rendering.
//!
//! The translator decides types; a [`ScriptGenerator`] only turns already
//! type-checked operands into text of the target language.

mod xpath;

pub use xpath::XPathScriptGenerator;

use crate::syntax::{ArithmeticOperator, ComparisonOperator, Function, LogicalOperator, Quantifier};
use efx_core::{EfxType, Expression, ExpressionKind};

pub trait ScriptGenerator {
    fn string_literal(&self, text: &str) -> Expression;
    fn numeric_literal(&self, text: &str) -> Expression;
    fn boolean_literal(&self, value: bool) -> Expression;
    fn date_literal(&self, text: &str) -> Expression;
    fn time_literal(&self, text: &str) -> Expression;
    fn duration_literal(&self, text: &str) -> Expression;

    /// Value of the field located at `path`, read as `ty`.
    fn field_value(&self, path: &str, ty: EfxType) -> Expression;
    fn attribute_value(&self, element_path: &str, attribute: &str, ty: EfxType) -> Expression;
    fn attribute_reference(&self, element_path: &str, attribute: &str) -> Expression;
    fn path_with_predicate(&self, path: &Expression, predicate: &Expression) -> Expression;
    /// A path into another notice, identified by `notice_id`.
    fn external_reference(&self, notice_id: &str, path: &Expression) -> Expression;
    fn variable_reference(&self, name: &str, kind: ExpressionKind) -> Expression;

    fn logical(&self, operator: LogicalOperator, left: &Expression, right: &Expression) -> Expression;
    fn comparison(&self, operator: ComparisonOperator, left: &Expression, right: &Expression) -> Expression;
    fn arithmetic(
        &self,
        operator: ArithmeticOperator,
        left: &Expression,
        right: &Expression,
        result: ExpressionKind,
    ) -> Expression;
    fn negation(&self, operand: &Expression) -> Expression;
    fn presence(&self, path: &Expression, negated: bool) -> Expression;
    fn emptiness(&self, operand: &Expression, negated: bool) -> Expression;
    fn in_list(&self, needle: &Expression, haystack: &Expression, negated: bool) -> Expression;
    fn like(&self, value: &Expression, pattern: &Expression, negated: bool) -> Expression;
    fn unique_in(&self, needle: &Expression, haystack: &Expression, negated: bool) -> Expression;

    fn parenthesized(&self, operand: &Expression) -> Expression;
    fn conditional(&self, condition: &Expression, then: &Expression, otherwise: &Expression) -> Expression;
    fn iterator(&self, variable: &Expression, source: &Expression) -> Expression;
    fn iterator_list(&self, iterators: &[Expression]) -> Expression;
    fn quantified(&self, quantifier: Quantifier, iterators: &Expression, body: &Expression) -> Expression;
    fn iteration(&self, iterators: &Expression, body: &Expression) -> Expression;
    fn list(&self, items: &[Expression], kind: ExpressionKind) -> Expression;
    fn codelist(&self, codes: &[String]) -> Expression;
    fn function(&self, function: Function, arguments: &[Expression], result: ExpressionKind) -> Expression;
}
