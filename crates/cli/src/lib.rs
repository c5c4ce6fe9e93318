mod commands;
mod util;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

pub use util::CliResult;

#[derive(Parser, Debug)]
#[command(name = "efx", version, about = "Translate EFX expressions and templates to XPath")]
pub struct Cli {
    /// Log translation steps to stderr.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate one or more expressions evaluated in the same context.
    Translate(commands::translate::TranslateArgs),
    /// Translate a parameterized expression block.
    Block(commands::block::BlockArgs),
    /// Translate template lines.
    Template(commands::template::TemplateArgs),
    /// Print the path leading from one absolute path to another.
    Contextualize(commands::contextualize::ContextualizeArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let output = execute(&cli.command)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

/// Run a parsed command and return what it would print.
pub fn execute(command: &Commands) -> CliResult<String> {
    match command {
        Commands::Translate(args) => commands::translate::run(args),
        Commands::Block(args) => commands::block::run(args),
        Commands::Template(args) => commands::template::run(args),
        Commands::Contextualize(args) => commands::contextualize::run(args),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}
