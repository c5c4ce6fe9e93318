//! Value stack shared by parent and child productions, overlaid with lexical
//! scopes for variables and parameters.

use efx_core::{Expression, ExpressionKind, Result, SymbolKind, TranslationError};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierKind {
    /// Bound by an iterator over values.
    Variable,
    /// Declared in a block header; its reference is the caller's pre-translated value.
    Parameter,
    /// Bound by a context iterator to a field or node.
    ContextVariable { symbol: String, is_node: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub kind: IdentifierKind,
    /// What a use of the identifier translates to.
    pub reference: Expression,
}

impl Identifier {
    pub fn variable(name: &str, reference: Expression) -> Self {
        Self {
            name: name.to_string(),
            kind: IdentifierKind::Variable,
            reference,
        }
    }

    pub fn parameter(name: &str, value: Expression) -> Self {
        Self {
            name: name.to_string(),
            kind: IdentifierKind::Parameter,
            reference: value,
        }
    }

    pub fn context_variable(name: &str, symbol: &str, is_node: bool, reference: Expression) -> Self {
        Self {
            name: name.to_string(),
            kind: IdentifierKind::ContextVariable { symbol: symbol.to_string(), is_node },
            reference,
        }
    }
}

#[derive(Debug)]
pub struct CallStack {
    values: Vec<Expression>,
    scopes: Vec<HashMap<String, Identifier>>,
}

impl Default for CallStack {
    fn default() -> Self {
        Self { values: Vec::new(), scopes: vec![HashMap::new()] }
    }
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, expression: Expression) {
        self.values.push(expression);
    }

    /// Pop the top value, which must be assignable to `expected`. The empty
    /// sequence satisfies any sequence kind and is retagged accordingly.
    pub fn pop(&mut self, expected: ExpressionKind) -> Result<Expression> {
        let top = self.values.last().ok_or_else(|| TranslationError::malformed("call stack underflow"))?;
        let kind = top.kind();
        if top.is_empty_sequence() && expected.is_sequence() {
            return self.pop_any().map(|empty| empty.with_kind(expected));
        }
        if !kind.is_assignable_to(expected) {
            return Err(TranslationError::type_mismatch(expected, kind));
        }
        self.pop_any()
    }

    pub fn pop_any(&mut self) -> Result<Expression> {
        self.values.pop().ok_or_else(|| TranslationError::malformed("call stack underflow"))
    }

    /// Pop a value that must be a sequence (of any element type).
    pub fn pop_sequence(&mut self) -> Result<Expression> {
        let top = self.values.last().ok_or_else(|| TranslationError::malformed("call stack underflow"))?;
        if !top.kind().is_sequence() {
            return Err(TranslationError::type_mismatch("sequence", top.kind()));
        }
        self.pop_any()
    }

    /// Pop `count` values, returned in the order they were pushed.
    pub fn pop_many(&mut self, count: usize) -> Result<Vec<Expression>> {
        if count > self.values.len() {
            return Err(TranslationError::malformed(format!(
                "call stack holds {} value(s), {count} requested",
                self.values.len()
            )));
        }
        Ok(self.values.split_off(self.values.len() - count))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn push_frame(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_frame(&mut self) -> Result<()> {
        if self.scopes.len() <= 1 {
            return Err(TranslationError::malformed("cannot pop the outermost scope"));
        }
        self.scopes.pop();
        Ok(())
    }

    /// Declare in the innermost scope, shadowing outer declarations of the same name.
    pub fn declare(&mut self, identifier: Identifier) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(identifier.name.clone(), identifier);
        }
    }

    pub fn resolve(&self, name: &str) -> Result<&Identifier> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .ok_or_else(|| TranslationError::unresolved(SymbolKind::Variable, name))
    }
}
