//! Template lines: `{Context} text ${expression} #{label}`.
//!
//! Embedded expressions are translated like standalone expressions in the
//! line's context; the surrounding markup comes from a [`MarkupGenerator`].

use crate::generator::ScriptGenerator;
use crate::parser::{self, ContextAnchor, TemplatePart};
use crate::preprocessor::field_type;
use crate::syntax::{Function, ReferenceTarget};
use crate::translate_in_context;
use efx_core::{EfxType, Expression, ExpressionKind, Result, SymbolResolver, TranslationError};
use quick_xml::escape::{escape, partial_escape};
use tracing::debug;

/// Renders the non-expression parts of a template line.
pub trait MarkupGenerator {
    fn text(&self, text: &str) -> String;
    fn value(&self, expression: &Expression) -> String;
    /// Output of the label whose key `key` evaluates to.
    fn label(&self, key: &Expression) -> String;
}

/// XSLT 2.0 markup; labels are looked up through an `efx:label` function.
#[derive(Debug, Clone, Default)]
pub struct XsltMarkupGenerator;

impl XsltMarkupGenerator {
    pub fn new() -> Self {
        Self
    }
}

fn value_of(select: &str) -> String {
    format!("<xsl:value-of select=\"{}\"/>", escape(select))
}

impl MarkupGenerator for XsltMarkupGenerator {
    fn text(&self, text: &str) -> String {
        partial_escape(text).into_owned()
    }

    fn value(&self, expression: &Expression) -> String {
        value_of(expression.script())
    }

    fn label(&self, key: &Expression) -> String {
        value_of(&format!("efx:label({})", key.script()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedTemplateLine {
    /// Leading whitespace width; nesting is decided by the caller.
    pub indentation: usize,
    pub context: ContextAnchor,
    pub markup: String,
}

pub fn translate_template_line(
    symbols: &dyn SymbolResolver,
    generator: &dyn ScriptGenerator,
    markup: &dyn MarkupGenerator,
    line: &str,
) -> Result<TranslatedTemplateLine> {
    let syntax = parser::parse_template_line(line)?;
    let context = syntax.context;
    let mut rendered = String::new();
    for part in syntax.parts {
        let piece = match part {
            TemplatePart::Text(text) => markup.text(&text),
            TemplatePart::Expression(source) => {
                let value = translate_in_context(symbols, generator, &context, &source)?;
                markup.value(&value)
            }
            TemplatePart::Label(key) => markup.label(&generator.string_literal(&format!("'{key}'"))),
            TemplatePart::ValueLabel(reference) => {
                let Some(ReferenceTarget::Field(field)) = reference.reference_target() else {
                    return Err(TranslationError::UnsupportedFieldType {
                        field: reference.text.clone(),
                        field_type: "node".into(),
                        construct: "value labels",
                    });
                };
                let path = translate_in_context(symbols, generator, &context, &reference.text)?;
                markup.label(&value_label_key(symbols, generator, field, path.script())?)
            }
            TemplatePart::ContextValueLabel => {
                let field = context_field(&context, "#value")?;
                markup.label(&value_label_key(symbols, generator, field, ".")?)
            }
            TemplatePart::ContextValue => {
                let field = context_field(&context, "$value")?;
                let ty = field_type(symbols, field, "$value")?;
                markup.value(&generator.field_value(".", ty))
            }
        };
        rendered.push_str(&piece);
    }
    debug!(context = context.id(), markup = %rendered, "translated template line");
    Ok(TranslatedTemplateLine { indentation: syntax.indentation, context, markup: rendered })
}

fn context_field<'c>(context: &'c ContextAnchor, construct: &'static str) -> Result<&'c str> {
    match context {
        ContextAnchor::Field(id) => Ok(id),
        ContextAnchor::Node(id) => {
            Err(TranslationError::UnsupportedFieldType { field: id.clone(), field_type: "node".into(), construct })
        }
    }
}

/// Label key for the value of a code or indicator field found at `path`.
fn value_label_key(
    symbols: &dyn SymbolResolver,
    generator: &dyn ScriptGenerator,
    field: &str,
    path: &str,
) -> Result<Expression> {
    let data_type = symbols.type_of_field(field)?;
    let value = generator.field_value(path, EfxType::String);
    let (prefix, suffix) = match data_type.as_str() {
        "code" | "internal-code" => {
            let codelist = symbols.root_codelist_of_field(field)?;
            (format!("'code|name|{codelist}.'"), None)
        }
        "indicator" => ("'indicator|when-'".to_string(), Some(format!("'|{field}'"))),
        _ => {
            return Err(TranslationError::UnsupportedFieldType {
                field: field.to_string(),
                field_type: data_type,
                construct: "value labels",
            });
        }
    };
    let mut arguments = vec![generator.string_literal(&prefix), value];
    arguments.extend(suffix.map(|suffix| generator.string_literal(&suffix)));
    Ok(generator.function(Function::Concat, &arguments, ExpressionKind::STRING))
}
