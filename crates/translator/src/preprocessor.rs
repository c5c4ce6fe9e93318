//! First pass: annotate late-bound references with an explicit type cast.
//!
//! A reference in value position (`BT-00-Number + 1`, `$x == 'a'`) can only
//! be typed once its declaration is known. This pass walks the tree with its
//! own scope tracking and rewrites the source so that every such reference
//! carries a cast, e.g. `(number)BT-00-Number + 1`. The translator then never
//! has to guess.

use crate::call_stack::{CallStack, Identifier, IdentifierKind};
use crate::parser::{self, Parameter};
use crate::syntax::{Listener, Production, ReferenceTarget, SyntaxNode, walk};
use efx_core::{EfxType, Expression, Result, SymbolResolver, TranslationError};
use tracing::debug;

/// Annotate a single expression.
pub fn preprocess_expression(symbols: &dyn SymbolResolver, source: &str) -> Result<String> {
    let tree = parser::parse_expression(source)?;
    annotate(symbols, source, &tree, &[])
}

/// Annotate the body of a parameterized expression block; parameters are in scope.
pub fn preprocess_block(symbols: &dyn SymbolResolver, source: &str) -> Result<String> {
    let block = parser::parse_expression_block(source)?;
    annotate(symbols, source, &block.body, &block.parameters)
}

fn annotate(
    symbols: &dyn SymbolResolver,
    source: &str,
    tree: &SyntaxNode,
    parameters: &[Parameter],
) -> Result<String> {
    let mut preprocessor = Preprocessor { symbols, scopes: CallStack::new(), insertions: Vec::new() };
    for parameter in parameters {
        preprocessor.scopes.declare(Identifier::variable(
            &parameter.name,
            Expression::scalar(format!("${}", parameter.name), parameter.ty),
        ));
    }
    walk(&mut preprocessor, tree)?;

    if preprocessor.insertions.is_empty() {
        return Ok(source.to_string());
    }
    let mut annotated = source.to_string();
    preprocessor.insertions.sort_by(|a, b| b.0.cmp(&a.0));
    for (offset, cast) in preprocessor.insertions {
        annotated.insert_str(offset, &cast);
    }
    Ok(annotated)
}

/// Declared EFX type of a field, failing for data-model types EFX cannot use as values.
pub(crate) fn field_type(symbols: &dyn SymbolResolver, field_id: &str, construct: &'static str) -> Result<EfxType> {
    let data_type = symbols.type_of_field(field_id)?;
    EfxType::from_data_type(&data_type).ok_or_else(|| TranslationError::UnsupportedFieldType {
        field: field_id.to_string(),
        field_type: data_type,
        construct,
    })
}

struct Preprocessor<'a> {
    symbols: &'a dyn SymbolResolver,
    /// Only the scopes are used; values are never pushed.
    scopes: CallStack,
    insertions: Vec<(usize, String)>,
}

impl Preprocessor<'_> {
    fn late_bound_type(&self, node: &SyntaxNode) -> Result<EfxType> {
        match node.reference_target() {
            Some(ReferenceTarget::Attribute(_)) => Ok(EfxType::String),
            Some(ReferenceTarget::Field(id)) => {
                if self.symbols.is_attribute_field(id)? {
                    Ok(EfxType::String)
                } else {
                    field_type(self.symbols, id, "use as a value")
                }
            }
            Some(ReferenceTarget::Variable(name)) => {
                let identifier = self.scopes.resolve(name)?;
                match identifier.kind {
                    IdentifierKind::ContextVariable { .. } => {
                        Err(TranslationError::type_mismatch("value", "context variable").in_fragment(&node.text))
                    }
                    _ => Ok(identifier.reference.ty()),
                }
            }
            Some(ReferenceTarget::Node(id)) => {
                Err(TranslationError::type_mismatch("value", format!("node {id}")).in_fragment(&node.text))
            }
            None => Err(TranslationError::malformed(format!("`{}` has no reference target", node.text))),
        }
    }
}

impl Listener for Preprocessor<'_> {
    fn enter(&mut self, node: &SyntaxNode, _parent: Option<&SyntaxNode>) -> Result<()> {
        if matches!(node.production, Production::Iteration | Production::Quantified(_)) {
            self.scopes.push_frame();
        }
        Ok(())
    }

    fn exit(&mut self, node: &SyntaxNode, _parent: Option<&SyntaxNode>) -> Result<()> {
        match &node.production {
            Production::Iteration | Production::Quantified(_) => self.scopes.pop_frame(),
            Production::Iterator { ty, variable } => {
                self.scopes.declare(Identifier::variable(variable, Expression::scalar(format!("${variable}"), *ty)));
                Ok(())
            }
            Production::ContextIterator { variable } => {
                let (symbol, is_node) = match node.child(0).and_then(SyntaxNode::reference_target) {
                    Some(ReferenceTarget::Node(id)) => (id.to_string(), true),
                    Some(ReferenceTarget::Field(id)) => (id.to_string(), false),
                    _ => return Err(TranslationError::malformed("context iterator without anchor")),
                };
                self.scopes.declare(Identifier::context_variable(
                    variable,
                    &symbol,
                    is_node,
                    Expression::path(format!("${variable}")),
                ));
                Ok(())
            }
            Production::LateBoundValue if node.type_cast().is_none() => {
                let ty = self.late_bound_type(node)?;
                let cast = ty
                    .cast_name()
                    .ok_or_else(|| TranslationError::type_mismatch("value", ty).in_fragment(&node.text))?;
                debug!(reference = %node.text, cast, "annotating late-bound reference");
                self.insertions.push((node.span.start, format!("({cast})")));
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
