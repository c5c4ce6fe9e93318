use crate::OutputFormat;
use crate::util::{CliResult, load_symbols, script_generator};
use anyhow::Context;
use clap::Args;
use efx_translator::{XsltMarkupGenerator, translate_template_line};
use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct TemplateArgs {
    #[arg(long = "symbols", value_name = "FILE")]
    pub symbols: PathBuf,
    /// Template lines such as `{ND-Root} Text: ${BT-00-Text}`.
    #[arg(value_name = "LINE")]
    pub lines: Vec<String>,
    /// Read template lines from a file; blank lines and `//` comments are skipped.
    #[arg(long = "file", value_name = "FILE", conflicts_with = "lines")]
    pub file: Option<PathBuf>,
    #[arg(long = "url-prefix", value_name = "NAME")]
    pub url_prefix: Option<String>,
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct TemplateLineSummary {
    line: usize,
    indentation: usize,
    context: String,
    markup: String,
}

pub fn run(args: &TemplateArgs) -> CliResult<String> {
    let symbols = load_symbols(&args.symbols)?;
    let generator = script_generator(args.url_prefix.as_deref());
    let markup = XsltMarkupGenerator::new();

    let source = match &args.file {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("cannot read template {}", path.display()))?
        }
        None => args.lines.join("\n"),
    };

    let mut summaries = Vec::new();
    for (index, line) in source.lines().enumerate() {
        if is_skipped(line) {
            continue;
        }
        let translated = translate_template_line(&symbols, &generator, &markup, line)
            .with_context(|| format!("line {}: cannot translate `{}`", index + 1, line.trim()))?;
        summaries.push(TemplateLineSummary {
            line: index + 1,
            indentation: translated.indentation,
            context: translated.context.id().to_owned(),
            markup: translated.markup,
        });
    }

    match args.format {
        OutputFormat::Text => Ok(render_template_text(&summaries)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&summaries)?),
    }
}

fn is_skipped(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with("//")
}

pub(crate) fn render_template_text(summaries: &[TemplateLineSummary]) -> String {
    let mut output = String::new();
    for summary in summaries {
        let _ = writeln!(&mut output, "{}{}", " ".repeat(summary.indentation), summary.markup.trim());
    }
    output.trim_end().to_owned()
}
