//! EFX to XPath translation.
//!
//! An expression is translated in two passes over the same grammar. The
//! preprocessor annotates every late-bound reference with an explicit cast,
//! then the translator type-checks the annotated tree and renders it through a
//! [`ScriptGenerator`]. Symbols are resolved through an
//! [`efx_core::SymbolResolver`].
//!
//! ```no_run
//! use efx_core::SymbolCatalog;
//! use efx_translator::{XPathScriptGenerator, translate_expression};
//!
//! let symbols = SymbolCatalog::from_file(std::path::Path::new("symbols.json"))?;
//! let xpath = translate_expression(&symbols, &XPathScriptGenerator::new(), "ND-Root", "BT-00-Text is present")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod call_stack;
mod context;
pub mod generator;
mod parser;
mod preprocessor;
pub mod syntax;
pub mod template;
mod translator;

pub use generator::{ScriptGenerator, XPathScriptGenerator};
pub use parser::ContextAnchor;
pub use preprocessor::{preprocess_block, preprocess_expression};
pub use template::{MarkupGenerator, TranslatedTemplateLine, XsltMarkupGenerator, translate_template_line};

use efx_core::{Expression, Result, SymbolResolver, TranslationError};
use tracing::debug;
use translator::Translator;

/// Translate `expression` evaluated in the context of the field or node `context`.
pub fn translate_expression(
    symbols: &dyn SymbolResolver,
    generator: &dyn ScriptGenerator,
    context: &str,
    expression: &str,
) -> Result<String> {
    let anchor = parser::parse_context(context)?;
    let translated = translate_in_context(symbols, generator, &anchor, expression)?;
    Ok(translated.into_script())
}

/// Translate a parameterized block such as `{ND-Root, text:$name} ${ BT-00-Text == $name }`.
///
/// Each argument is an EFX expression, translated on its own in the block's
/// context and checked against the declared parameter type; its translation
/// replaces every use of the parameter.
pub fn translate_expression_block(
    symbols: &dyn SymbolResolver,
    generator: &dyn ScriptGenerator,
    block: &str,
    arguments: &[&str],
) -> Result<String> {
    let declaration = parser::parse_expression_block(block)?;
    if declaration.parameters.len() != arguments.len() {
        return Err(TranslationError::ArgumentCount {
            expected: declaration.parameters.len(),
            actual: arguments.len(),
        });
    }

    let mut values = Vec::with_capacity(arguments.len());
    for (parameter, argument) in declaration.parameters.iter().zip(arguments) {
        let value = translate_in_context(symbols, generator, &declaration.context, argument)?;
        if !value.kind().is_assignable_to(parameter.ty.scalar()) {
            return Err(TranslationError::type_mismatch(parameter.ty.scalar(), value.kind()).in_fragment(argument));
        }
        values.push(value);
    }

    let annotated = preprocess_block(symbols, block)?;
    let block = parser::parse_expression_block(&annotated)?;
    let mut translator = Translator::new(symbols, generator);
    translator.push_context(&block.context)?;
    for (parameter, value) in block.parameters.iter().zip(values) {
        translator.declare_parameter(&parameter.name, value);
    }
    let translated = translator.translate(&block.body)?;
    debug!(block = %annotated, script = %translated, "translated expression block");
    Ok(translated.into_script())
}

pub(crate) fn translate_in_context(
    symbols: &dyn SymbolResolver,
    generator: &dyn ScriptGenerator,
    context: &ContextAnchor,
    expression: &str,
) -> Result<Expression> {
    let annotated = preprocess_expression(symbols, expression)?;
    let tree = parser::parse_expression(&annotated)?;
    let mut translator = Translator::new(symbols, generator);
    translator.push_context(context)?;
    let translated = translator.translate(&tree)?;
    debug!(context = context.id(), expression = %annotated, script = %translated, "translated expression");
    Ok(translated)
}
