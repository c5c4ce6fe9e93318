use efx_core::{Result, SymbolResolver, TranslationError};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    Field,
    Node,
    /// Reset point for references into another notice; its absolute path is empty.
    Absolute,
}

/// The anchor references are currently resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub kind: ContextKind,
    pub symbol: String,
    pub absolute_path: String,
    /// Path from the context below this one, computed once when pushed.
    pub relative_path: String,
    /// Variable bound to this anchor by a context iterator.
    pub variable: Option<String>,
}

#[derive(Debug, Default)]
pub struct ContextStack {
    contexts: Vec<Context>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_field(&mut self, symbols: &dyn SymbolResolver, field_id: &str) -> Result<&Context> {
        let absolute_path = symbols.absolute_path_of_field(field_id)?;
        self.push(symbols, ContextKind::Field, field_id, absolute_path)
    }

    pub fn push_node(&mut self, symbols: &dyn SymbolResolver, node_id: &str) -> Result<&Context> {
        let absolute_path = symbols.absolute_path_of_node(node_id)?;
        self.push(symbols, ContextKind::Node, node_id, absolute_path)
    }

    /// Push a context nothing can be relative to, so references inside it
    /// resolve to absolute paths.
    pub fn push_absolute(&mut self) {
        trace!(depth = self.contexts.len(), "push absolute context");
        self.contexts.push(Context {
            kind: ContextKind::Absolute,
            symbol: String::new(),
            absolute_path: String::new(),
            relative_path: String::new(),
            variable: None,
        });
    }

    fn push(
        &mut self,
        symbols: &dyn SymbolResolver,
        kind: ContextKind,
        symbol: &str,
        absolute_path: String,
    ) -> Result<&Context> {
        let relative_path = match self.contexts.last() {
            Some(top) => symbols.relative_path(&absolute_path, &top.absolute_path)?,
            None => absolute_path.clone(),
        };
        trace!(depth = self.contexts.len(), symbol, %relative_path, "push context");
        self.contexts.push(Context { kind, symbol: symbol.to_string(), absolute_path, relative_path, variable: None });
        self.top()
    }

    /// Bind a variable name to the context on top of the stack.
    pub fn bind_variable(&mut self, variable: &str) -> Result<()> {
        let top = self
            .contexts
            .last_mut()
            .ok_or_else(|| TranslationError::malformed("cannot bind a variable to an empty context stack"))?;
        top.variable = Some(variable.to_string());
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Context> {
        let context = self.contexts.pop().ok_or_else(|| TranslationError::malformed("context stack underflow"))?;
        trace!(depth = self.contexts.len(), symbol = %context.symbol, "pop context");
        Ok(context)
    }

    pub fn top(&self) -> Result<&Context> {
        self.contexts.last().ok_or_else(|| TranslationError::malformed("context stack is empty"))
    }

    /// Absolute path references are resolved against; empty when nothing is pushed.
    pub fn absolute_path(&self) -> &str {
        self.contexts.last().map_or("", |context| context.absolute_path.as_str())
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use efx_core::SymbolCatalog;
    use rstest::{fixture, rstest};

    #[fixture]
    fn symbols() -> SymbolCatalog {
        SymbolCatalog::new("test")
            .with_node("ND-Root", "/*")
            .with_field("BT-00-Text", "/*/PathNode/TextField", "text")
            .with_field("BT-00-Code", "/*/PathNode/CodeField", "code")
    }

    #[rstest]
    fn relative_paths_are_fixed_at_push(symbols: SymbolCatalog) {
        let mut stack = ContextStack::new();
        assert_eq!(stack.push_node(&symbols, "ND-Root").unwrap().relative_path, "/*");
        assert_eq!(stack.push_field(&symbols, "BT-00-Text").unwrap().relative_path, "PathNode/TextField");
        assert_eq!(stack.push_field(&symbols, "BT-00-Code").unwrap().relative_path, "../CodeField");

        let popped = stack.pop().unwrap();
        assert_eq!(popped.symbol, "BT-00-Code");
        assert_eq!(stack.top().unwrap().relative_path, "PathNode/TextField");
    }

    #[rstest]
    fn absolute_context_resets_relativity(symbols: SymbolCatalog) {
        let mut stack = ContextStack::new();
        stack.push_field(&symbols, "BT-00-Text").unwrap();
        stack.push_absolute();
        assert_eq!(stack.absolute_path(), "");
        assert_eq!(stack.push_field(&symbols, "BT-00-Code").unwrap().relative_path, "/*/PathNode/CodeField");
    }

    #[rstest]
    fn underflow_is_malformed() {
        let mut stack = ContextStack::new();
        assert!(matches!(stack.pop(), Err(TranslationError::MalformedContextState(_))));
        assert!(stack.bind_variable("x").is_err());
    }
}
