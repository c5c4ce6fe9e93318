//! In-memory symbol catalog backed by a JSON description of the data model,
//! and a small per-version cache of catalogs.

use crate::error::{Result, SymbolKind, TranslationError};
use crate::path::{LocationPath, Step};
use crate::symbols::SymbolResolver;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read symbol catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid symbol catalog: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEntry {
    pub xpath: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codelist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEntry {
    pub xpath: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodelistEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub codes: Vec<String>,
}

/// Field, node and codelist metadata for one SDK version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolCatalog {
    pub version: String,
    #[serde(default)]
    pub fields: HashMap<String, FieldEntry>,
    #[serde(default)]
    pub nodes: HashMap<String, NodeEntry>,
    #[serde(default)]
    pub codelists: HashMap<String, CodelistEntry>,
}

impl SymbolCatalog {
    pub fn new(version: impl Into<String>) -> Self {
        Self { version: version.into(), ..Self::default() }
    }

    pub fn from_json(json: &str) -> core::result::Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> core::result::Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        debug!(
            path = %path.display(),
            version = %catalog.version,
            fields = catalog.fields.len(),
            nodes = catalog.nodes.len(),
            "loaded symbol catalog"
        );
        Ok(catalog)
    }

    #[must_use]
    pub fn with_node(mut self, id: &str, xpath: &str) -> Self {
        self.nodes.insert(id.to_string(), NodeEntry { xpath: xpath.to_string() });
        self
    }

    #[must_use]
    pub fn with_field(mut self, id: &str, xpath: &str, data_type: &str) -> Self {
        self.fields.insert(
            id.to_string(),
            FieldEntry { xpath: xpath.to_string(), data_type: data_type.to_string(), codelist: None, attribute: None },
        );
        self
    }

    #[must_use]
    pub fn with_code_field(mut self, id: &str, xpath: &str, codelist: &str) -> Self {
        self.fields.insert(
            id.to_string(),
            FieldEntry {
                xpath: xpath.to_string(),
                data_type: "code".to_string(),
                codelist: Some(codelist.to_string()),
                attribute: None,
            },
        );
        self
    }

    #[must_use]
    pub fn with_codelist(mut self, id: &str, parent: Option<&str>, codes: &[&str]) -> Self {
        self.codelists.insert(
            id.to_string(),
            CodelistEntry {
                parent: parent.map(str::to_string),
                codes: codes.iter().map(|code| (*code).to_string()).collect(),
            },
        );
        self
    }

    fn field(&self, field_id: &str) -> Result<&FieldEntry> {
        self.fields.get(field_id).ok_or_else(|| TranslationError::unresolved(SymbolKind::Field, field_id))
    }

    fn codelist(&self, codelist_id: &str) -> Result<&CodelistEntry> {
        self.codelists.get(codelist_id).ok_or_else(|| TranslationError::unresolved(SymbolKind::Codelist, codelist_id))
    }

    fn trailing_attribute(xpath: &str) -> Result<Option<String>> {
        let path = LocationPath::parse(xpath)?;
        Ok(path.steps().last().and_then(Step::attribute_name).map(str::to_string))
    }
}

impl SymbolResolver for SymbolCatalog {
    fn absolute_path_of_field(&self, field_id: &str) -> Result<String> {
        let field = self.field(field_id)?;
        match &field.attribute {
            Some(attribute) if Self::trailing_attribute(&field.xpath)?.is_none() => {
                Ok(format!("{}/@{attribute}", field.xpath.trim_end_matches('/')))
            }
            _ => Ok(field.xpath.clone()),
        }
    }

    fn absolute_path_of_node(&self, node_id: &str) -> Result<String> {
        self.nodes
            .get(node_id)
            .map(|node| node.xpath.clone())
            .ok_or_else(|| TranslationError::unresolved(SymbolKind::Node, node_id))
    }

    fn type_of_field(&self, field_id: &str) -> Result<String> {
        Ok(self.field(field_id)?.data_type.clone())
    }

    fn is_attribute_field(&self, field_id: &str) -> Result<bool> {
        let field = self.field(field_id)?;
        Ok(field.attribute.is_some() || Self::trailing_attribute(&field.xpath)?.is_some())
    }

    fn attribute_name_of_field(&self, field_id: &str) -> Result<String> {
        let field = self.field(field_id)?;
        if let Some(attribute) = &field.attribute {
            return Ok(attribute.clone());
        }
        Self::trailing_attribute(&field.xpath)?.ok_or_else(|| TranslationError::UnsupportedFieldType {
            field: field_id.to_string(),
            field_type: field.data_type.clone(),
            construct: "attribute access",
        })
    }

    fn root_codelist_of_field(&self, field_id: &str) -> Result<String> {
        let field = self.field(field_id)?;
        let Some(mut current) = field.codelist.clone() else {
            return Err(TranslationError::UnsupportedFieldType {
                field: field_id.to_string(),
                field_type: field.data_type.clone(),
                construct: "codelist lookup",
            });
        };
        let mut seen = HashSet::new();
        while let Some(parent) = self.codelist(&current)?.parent.clone() {
            if !seen.insert(current.clone()) {
                return Err(TranslationError::malformed(format!("codelist `{current}` has a cyclic parent chain")));
            }
            current = parent;
        }
        Ok(current)
    }

    fn expand_codelist(&self, codelist_id: &str) -> Result<Vec<String>> {
        Ok(self.codelist(codelist_id)?.codes.clone())
    }
}

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(4) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

/// Catalogs keyed by SDK version, least recently used evicted first.
///
/// Owned by the caller and handed to translations by reference; there is no
/// process-wide instance.
pub struct CatalogCache {
    entries: LruCache<String, Arc<SymbolCatalog>>,
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl CatalogCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self { entries: LruCache::new(capacity) }
    }

    /// Return the catalog for `version`, invoking `load` only on a miss.
    pub fn get_or_load<E>(
        &mut self,
        version: &str,
        load: impl FnOnce() -> core::result::Result<SymbolCatalog, E>,
    ) -> core::result::Result<Arc<SymbolCatalog>, E> {
        if let Some(catalog) = self.entries.get(version) {
            return Ok(Arc::clone(catalog));
        }
        debug!(version, "symbol catalog cache miss");
        let catalog = Arc::new(load()?);
        self.entries.put(version.to_string(), Arc::clone(&catalog));
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    const CATALOG: &str = r#"{
        "version": "1.0",
        "fields": {
            "BT-00-Code": { "xpath": "/*/PathNode/CodeField", "type": "code", "codelist": "accessibility" },
            "BT-00-Attribute": { "xpath": "/*/PathNode/TextField/@Attribute", "type": "text" },
            "BT-00-CodeAttribute": { "xpath": "/*/PathNode/CodeField", "type": "code", "attribute": "listName" }
        },
        "nodes": { "ND-Root": { "xpath": "/*" } },
        "codelists": {
            "accessibility": { "parent": "base", "codes": ["n-inc", "n-avail"] },
            "base": { "codes": ["n-inc", "n-avail", "inc"] }
        }
    }"#;

    #[fixture]
    fn catalog() -> SymbolCatalog {
        SymbolCatalog::from_json(CATALOG).unwrap()
    }

    #[rstest]
    fn root_codelist_follows_parent_chain(catalog: SymbolCatalog) {
        assert_eq!(catalog.root_codelist_of_field("BT-00-Code").unwrap(), "base");
    }

    #[rstest]
    #[case("BT-00-Attribute", "Attribute", "/*/PathNode/TextField/@Attribute")]
    #[case("BT-00-CodeAttribute", "listName", "/*/PathNode/CodeField/@listName")]
    fn attribute_fields(catalog: SymbolCatalog, #[case] id: &str, #[case] name: &str, #[case] path: &str) {
        assert!(catalog.is_attribute_field(id).unwrap());
        assert_eq!(catalog.attribute_name_of_field(id).unwrap(), name);
        assert_eq!(catalog.absolute_path_of_field(id).unwrap(), path);
    }

    #[rstest]
    fn relative_paths_use_contextualization(catalog: SymbolCatalog) {
        assert_eq!(catalog.relative_path_of_field("BT-00-Code", "/*").unwrap(), "PathNode/CodeField");
        assert_eq!(catalog.relative_path_of_node("ND-Root", "/*/PathNode/CodeField").unwrap(), "../..");
    }

    #[rstest]
    fn unknown_symbols_are_unresolved(catalog: SymbolCatalog) {
        assert_eq!(
            catalog.type_of_field("BT-99-Nope").unwrap_err(),
            TranslationError::unresolved(SymbolKind::Field, "BT-99-Nope")
        );
        assert!(matches!(
            catalog.expand_codelist("nope"),
            Err(TranslationError::UnresolvedSymbol { kind: SymbolKind::Codelist, .. })
        ));
    }

    #[rstest]
    fn cache_loads_each_version_once() {
        let mut cache = CatalogCache::new(NonZeroUsize::MIN.saturating_add(1));
        let mut loads = 0;
        for version in ["1.0", "1.0", "1.1", "1.0"] {
            let catalog = cache
                .get_or_load(version, || {
                    loads += 1;
                    Ok::<_, CatalogError>(SymbolCatalog::new(version))
                })
                .unwrap();
            assert_eq!(catalog.version, version);
        }
        assert_eq!(loads, 2);
        assert_eq!(cache.len(), 2);
    }

    #[rstest]
    fn cache_evicts_least_recently_used() {
        let mut cache = CatalogCache::new(NonZeroUsize::MIN);
        let mut loads = 0;
        for version in ["1.0", "1.1", "1.0"] {
            cache
                .get_or_load(version, || {
                    loads += 1;
                    Ok::<_, CatalogError>(SymbolCatalog::new(version))
                })
                .unwrap();
        }
        assert_eq!(loads, 3);
    }
}
