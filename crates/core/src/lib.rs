//! Building blocks shared by the EFX translator: the typed expression model,
//! location-path algebra, the symbol resolver interface with its JSON-backed
//! catalog, and the error taxonomy.

pub mod catalog;
pub mod error;
pub mod expression;
pub mod path;
pub mod symbols;
pub mod types;

pub use catalog::{CatalogCache, CatalogError, SymbolCatalog};
pub use error::{Result, SymbolKind, TranslationError};
pub use expression::Expression;
pub use path::{LocationPath, Step, add_axis, contextualize, join, split_attribute};
pub use symbols::SymbolResolver;
pub use types::{Cardinality, EfxType, ExpressionKind};
