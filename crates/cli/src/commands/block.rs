use crate::OutputFormat;
use crate::util::{CliResult, colorize_script, load_symbols, script_generator};
use anyhow::Context;
use clap::Args;
use efx_translator::translate_expression_block;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct BlockArgs {
    #[arg(long = "symbols", value_name = "FILE")]
    pub symbols: PathBuf,
    /// `{Context, type:$parameter, ...} ${ expression }`
    #[arg(value_name = "BLOCK")]
    pub block: String,
    /// Argument for the next declared parameter, as EFX source.
    #[arg(long = "arg", value_name = "EXPRESSION")]
    pub arguments: Vec<String>,
    #[arg(long = "url-prefix", value_name = "NAME")]
    pub url_prefix: Option<String>,
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Serialize, Debug)]
struct BlockSummary<'a> {
    block: &'a str,
    arguments: &'a [String],
    xpath: String,
}

pub fn run(args: &BlockArgs) -> CliResult<String> {
    let symbols = load_symbols(&args.symbols)?;
    let generator = script_generator(args.url_prefix.as_deref());
    let arguments: Vec<&str> = args.arguments.iter().map(String::as_str).collect();

    let xpath = translate_expression_block(&symbols, &generator, &args.block, &arguments)
        .with_context(|| format!("cannot translate block `{}`", args.block))?;

    match args.format {
        OutputFormat::Text => Ok(colorize_script(&xpath)),
        OutputFormat::Json => {
            let summary = BlockSummary { block: &args.block, arguments: &args.arguments, xpath };
            Ok(serde_json::to_string_pretty(&summary)?)
        }
    }
}
