use crate::OutputFormat;
use crate::util::{CliResult, colorize_script};
use clap::Args;
use efx_core::contextualize;
use serde::Serialize;

#[derive(Args, Debug, Clone)]
pub struct ContextualizeArgs {
    /// Absolute path of the context.
    #[arg(value_name = "CONTEXT")]
    pub context: String,
    /// Absolute path to reach from the context.
    #[arg(value_name = "TARGET")]
    pub target: String,
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Serialize, Debug)]
struct ContextualizeSummary<'a> {
    context: &'a str,
    target: &'a str,
    relative: String,
}

pub fn run(args: &ContextualizeArgs) -> CliResult<String> {
    let relative = contextualize(&args.context, &args.target)?;
    match args.format {
        OutputFormat::Text => Ok(colorize_script(&relative)),
        OutputFormat::Json => {
            let summary = ContextualizeSummary { context: &args.context, target: &args.target, relative };
            Ok(serde_json::to_string_pretty(&summary)?)
        }
    }
}
