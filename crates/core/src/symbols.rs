use crate::error::Result;
use crate::path;

/// Read-only access to field, node and codelist metadata.
///
/// The translator never mutates a resolver; implementations may cache
/// internally but must answer the same question the same way for the whole
/// lifetime of a translation.
pub trait SymbolResolver {
    fn absolute_path_of_field(&self, field_id: &str) -> Result<String>;

    fn absolute_path_of_node(&self, node_id: &str) -> Result<String>;

    fn relative_path_of_field(&self, field_id: &str, context_path: &str) -> Result<String> {
        self.relative_path(&self.absolute_path_of_field(field_id)?, context_path)
    }

    fn relative_path_of_node(&self, node_id: &str, context_path: &str) -> Result<String> {
        self.relative_path(&self.absolute_path_of_node(node_id)?, context_path)
    }

    /// Declared data-model type of a field (`text`, `code`, `date`, ...).
    fn type_of_field(&self, field_id: &str) -> Result<String>;

    fn is_attribute_field(&self, field_id: &str) -> Result<bool>;

    fn attribute_name_of_field(&self, field_id: &str) -> Result<String>;

    /// Codelist at the top of the field codelist's `parent` chain.
    fn root_codelist_of_field(&self, field_id: &str) -> Result<String>;

    fn expand_codelist(&self, codelist_id: &str) -> Result<Vec<String>>;

    fn relative_path(&self, absolute_path: &str, context_path: &str) -> Result<String> {
        path::contextualize(context_path, absolute_path)
    }
}
