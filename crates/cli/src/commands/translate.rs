use crate::OutputFormat;
use crate::util::{CliResult, colorize_script, colorize_source, load_symbols, load_versioned_symbols, script_generator};
use anyhow::Context;
use clap::Args;
use efx_translator::translate_expression;
use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Clone)]
pub struct TranslateArgs {
    /// Symbol catalog (JSON).
    #[arg(long = "symbols", value_name = "FILE", required_unless_present = "sdk_root", conflicts_with = "sdk_root")]
    pub symbols: Option<PathBuf>,
    /// Directory holding one `<version>/symbols.json` per SDK version.
    #[arg(long = "sdk-root", value_name = "DIR", requires = "sdk_versions")]
    pub sdk_root: Option<PathBuf>,
    /// SDK version to translate for; repeat it to compare versions.
    #[arg(long = "sdk-version", value_name = "VERSION")]
    pub sdk_versions: Vec<String>,
    /// Field or node the expressions are evaluated against.
    #[arg(long = "context", value_name = "ID")]
    pub context: String,
    #[arg(value_name = "EXPRESSION", required = true)]
    pub expressions: Vec<String>,
    /// Variable holding the URL other notices are fetched from.
    #[arg(long = "url-prefix", value_name = "NAME")]
    pub url_prefix: Option<String>,
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct TranslationSummary {
    version: String,
    context: String,
    expression: String,
    xpath: String,
}

pub fn run(args: &TranslateArgs) -> CliResult<String> {
    let catalogs = match (&args.symbols, &args.sdk_root) {
        (Some(path), _) => vec![Arc::new(load_symbols(path)?)],
        (None, Some(root)) => load_versioned_symbols(root, &args.sdk_versions)?,
        (None, None) => anyhow::bail!("either --symbols or --sdk-root is required"),
    };
    let generator = script_generator(args.url_prefix.as_deref());

    let mut summaries = Vec::with_capacity(catalogs.len() * args.expressions.len());
    for symbols in &catalogs {
        for expression in &args.expressions {
            let xpath = translate_expression(&**symbols, &generator, &args.context, expression)
                .with_context(|| format!("cannot translate `{expression}` for version {}", symbols.version))?;
            summaries.push(TranslationSummary {
                version: symbols.version.clone(),
                context: args.context.clone(),
                expression: expression.clone(),
                xpath,
            });
        }
    }

    match args.format {
        OutputFormat::Text => Ok(render_translation_text(&summaries)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&summaries)?),
    }
}

pub(crate) fn render_translation_text(summaries: &[TranslationSummary]) -> String {
    if let [single] = summaries {
        return colorize_script(&single.xpath);
    }
    let mut output = String::new();
    for summary in summaries {
        let _ = writeln!(&mut output, "{}", colorize_source(&format!("{}  [{}]", summary.expression, summary.version)));
        let _ = writeln!(&mut output, "    {}", colorize_script(&summary.xpath));
    }
    output.trim_end().to_owned()
}
