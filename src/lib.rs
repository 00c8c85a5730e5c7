// formschema library entry point
//
// Schema resolution, default form state and property ordering for
// JSON Schema driven forms.

pub mod config;
pub mod form;
pub mod internal;
pub mod schema;

use serde_json::Value;

pub use crate::config::EngineConfig;
pub use crate::internal::error::{Error, OrderSpecificationError, ResolutionError, Result};
pub use crate::schema::{DefinitionsTable, SchemaNode};

use crate::form::PropertyOrderer;
use crate::schema::{DefaultStateComputer, SchemaResolver};

/// Expands `$ref` and `allOf` on `schema` against `definitions`.
pub fn retrieve_schema(schema: &SchemaNode, definitions: &DefinitionsTable) -> Result<SchemaNode> {
    SchemaResolver::new(definitions).resolve(schema)
}

/// Computes the default form state of `schema`, deeply merged with `form_data`.
///
/// `Ok(None)` means neither data nor a default exists.
pub fn get_default_form_state(
    schema: &SchemaNode,
    form_data: Option<&Value>,
    definitions: &DefinitionsTable,
) -> Result<Option<Value>> {
    DefaultStateComputer::new(definitions).compute(schema, form_data)
}

/// Orders `properties` by `order_hint`, expanding a `*` wildcard in place.
pub fn order_properties(properties: &[String], order_hint: Option<&[String]>) -> Result<Vec<String>> {
    Ok(PropertyOrderer::new().order(properties, order_hint)?)
}
