use anyhow::Context;
use efx_core::{CatalogCache, SymbolCatalog};
use efx_translator::XPathScriptGenerator;
use owo_colors::{OwoColorize, Stream};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Catalog file name inside each version directory of an SDK root.
pub const SYMBOLS_FILE: &str = "symbols.json";

pub type CliResult<T> = anyhow::Result<T>;

pub fn load_symbols(path: &Path) -> CliResult<SymbolCatalog> {
    let catalog = SymbolCatalog::from_file(path)
        .with_context(|| format!("cannot load symbol catalog {}", path.display()))?;
    debug!(version = %catalog.version, "symbol catalog ready");
    Ok(catalog)
}

/// One catalog per requested version, read from `<root>/<version>/symbols.json`.
/// A version requested twice is read once.
pub fn load_versioned_symbols(root: &Path, versions: &[String]) -> CliResult<Vec<Arc<SymbolCatalog>>> {
    let mut cache = CatalogCache::default();
    versions
        .iter()
        .map(|version| {
            cache.get_or_load(version, || {
                let catalog = load_symbols(&root.join(version).join(SYMBOLS_FILE))?;
                if catalog.version != *version {
                    warn!(requested = %version, declared = %catalog.version, "catalog declares another version");
                }
                Ok(catalog)
            })
        })
        .collect()
}

pub fn script_generator(url_prefix: Option<&str>) -> XPathScriptGenerator {
    match url_prefix {
        Some(name) => XPathScriptGenerator::new().with_url_prefix_variable(name),
        None => XPathScriptGenerator::new(),
    }
}

pub fn colorize_script(script: &str) -> String {
    script.if_supports_color(Stream::Stdout, |text| text.fg_rgb::<136, 192, 74>().to_string()).to_string()
}

pub fn colorize_source(source: &str) -> String {
    source.if_supports_color(Stream::Stdout, |text| text.dimmed().to_string()).to_string()
}
