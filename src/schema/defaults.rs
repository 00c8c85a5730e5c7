// Default form state computation for formschema
//
// This module derives the value a form should hold before any further edits:
// schema `default`s merged deeply with whatever data the caller already has.
// Caller data always wins over a schema default at the same path.

use indexmap::IndexMap;
use log::{trace, warn};
use serde_json::{Map, Value};

use crate::config::EngineConfig;
use crate::internal::error::{Error, ResolutionError, Result};
use crate::schema::resolver::SchemaResolver;
use crate::schema::types::{Items, SchemaKind, SchemaNode};
use crate::schema::DefinitionsTable;

/// Computes default form state for a schema
#[derive(Debug, Clone)]
pub struct DefaultStateComputer<'d> {
    resolver: SchemaResolver<'d>,
}

impl<'d> DefaultStateComputer<'d> {
    /// Creates a computer with default configuration
    pub fn new(definitions: &'d DefinitionsTable) -> Self {
        Self::with_config(definitions, EngineConfig::default())
    }

    /// Creates a computer with custom configuration
    pub fn with_config(definitions: &'d DefinitionsTable, config: EngineConfig) -> Self {
        Self {
            resolver: SchemaResolver::with_config(definitions, config),
        }
    }

    /// Computes the default state of `schema`, merged with `form_data`.
    ///
    /// Returns `None` when neither data nor a default exists. Object schemas
    /// always yield an object, possibly empty.
    pub fn compute(&self, schema: &SchemaNode, form_data: Option<&Value>) -> Result<Option<Value>> {
        let mut expanding = Vec::new();
        self.compute_node(schema, form_data, None, &mut expanding, 0)
    }

    /// `inherited` is the slice of an enclosing object's or array's default
    /// that lines up with this node.
    fn compute_node(
        &self,
        schema: &SchemaNode,
        form_data: Option<&Value>,
        inherited: Option<&Value>,
        expanding: &mut Vec<String>,
        depth: usize,
    ) -> Result<Option<Value>> {
        let max_depth = self.resolver.config().max_depth;
        if depth > max_depth {
            return Err(ResolutionError::DepthExceeded { limit: max_depth }.into());
        }

        let form_data = form_data.filter(|data| !data.is_null());

        // A recursive schema only unfolds as far as the data reaches
        if let Some(reference) = &schema.reference {
            if form_data.is_none() && expanding.contains(reference) {
                match (inherited, &schema.default) {
                    (None, None) => {
                        trace!("Stopping at recursive reference {}", reference);
                        return Ok(None);
                    }
                    (_, Some(own)) => {
                        trace!("Using the local default of recursive reference {}", reference);
                        return Ok(layer_defaults(inherited, Some(own)));
                    }
                    (Some(_), None) => {}
                }
            }
            expanding.push(reference.clone());
        }

        let resolved = self.resolver.resolve(schema)?;
        let defaults = layer_defaults(inherited, resolved.default.as_ref());

        let state = match resolved.kind() {
            SchemaKind::Object(properties) => match form_data {
                Some(other) if !other.is_object() => {
                    warn!("Keeping non-object data {} for an object schema", other);
                    Some(other.clone())
                }
                _ => Some(Value::Object(self.compute_properties(
                    properties,
                    form_data.and_then(Value::as_object),
                    defaults.as_ref().and_then(Value::as_object),
                    expanding,
                    depth,
                )?)),
            },
            SchemaKind::Array(items) => match (form_data, defaults) {
                (Some(Value::Array(data)), _) => Some(Value::Array(self.compute_elements(
                    &resolved, items, data, expanding, depth,
                )?)),
                (Some(other), _) => {
                    warn!("Keeping non-array data {} for an array schema", other);
                    Some(other.clone())
                }
                (None, Some(Value::Array(defaults))) => Some(Value::Array(self.compute_elements(
                    &resolved, items, &defaults, expanding, depth,
                )?)),
                (None, Some(other)) => {
                    warn!("Keeping non-array default {} for an array schema", other);
                    Some(other)
                }
                (None, None) => None,
            },
            SchemaKind::Primitive(_) => form_data.cloned().or(defaults),
            SchemaKind::Reference(_) | SchemaKind::Combinator(_) => {
                return Err(Error::SchemaError(format!(
                    "Schema still carries $ref or allOf after resolution: {}",
                    resolved.to_value()
                )));
            }
        };

        if schema.reference.is_some() {
            expanding.pop();
        }

        Ok(state)
    }

    /// Computes the declared properties of an object, then carries over any
    /// data the schema does not declare.
    fn compute_properties(
        &self,
        properties: &IndexMap<String, SchemaNode>,
        data: Option<&Map<String, Value>>,
        defaults: Option<&Map<String, Value>>,
        expanding: &mut Vec<String>,
        depth: usize,
    ) -> Result<Map<String, Value>> {
        let mut state = Map::new();
        for (key, property) in properties {
            trace!("Computing default state for property '{}'", key);
            let child = self.compute_node(
                property,
                data.and_then(|d| d.get(key)),
                defaults.and_then(|d| d.get(key)),
                expanding,
                depth + 1,
            )?;
            if let Some(value) = child {
                state.insert(key.clone(), value);
            }
        }

        if let Some(data) = data {
            for (key, value) in data {
                if !properties.contains_key(key) {
                    state.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(state)
    }

    /// Computes each element against its item schema. The output has exactly
    /// as many elements as the input.
    fn compute_elements(
        &self,
        schema: &SchemaNode,
        items: Option<&Items>,
        elements: &[Value],
        expanding: &mut Vec<String>,
        depth: usize,
    ) -> Result<Vec<Value>> {
        let additional = schema.additional_items.as_deref();

        elements
            .iter()
            .enumerate()
            .map(|(index, element)| -> Result<Value> {
                match items.and_then(|items| items.schema_for(index, additional)) {
                    Some(item_schema) => Ok(self
                        .compute_node(item_schema, Some(element), None, expanding, depth + 1)?
                        .unwrap_or_else(|| element.clone())),
                    None => Ok(element.clone()),
                }
            })
            .collect()
    }
}

/// Combines an enclosing default with the node's own.
///
/// Two objects merge deeply with the node's own entries winning; otherwise the
/// node's own default replaces the inherited one.
fn layer_defaults(inherited: Option<&Value>, own: Option<&Value>) -> Option<Value> {
    match (inherited, own) {
        (Some(Value::Object(inherited)), Some(Value::Object(own))) => {
            Some(Value::Object(merge_objects(inherited, own)))
        }
        (_, Some(own)) => Some(own.clone()),
        (inherited, None) => inherited.cloned(),
    }
}

fn merge_objects(base: &Map<String, Value>, overlay: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, value) in overlay {
        let combined = match (merged.get(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                Value::Object(merge_objects(existing, incoming))
            }
            _ => value.clone(),
        };
        merged.insert(key.clone(), combined);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parser::SchemaParser;
    use serde_json::json;

    fn compute(doc: Value, form_data: Option<Value>) -> Result<Option<Value>> {
        let (schema, definitions) = SchemaParser::new().parse_document(&doc)?;
        DefaultStateComputer::new(&definitions).compute(&schema, form_data.as_ref())
    }

    #[test]
    fn test_object_defaults_merge_with_data() {
        let doc = json!({
            "type": "object",
            "properties": {
                "x": {"type": "number", "default": 5},
                "y": {"type": "string"}
            }
        });
        assert_eq!(
            compute(doc, Some(json!({"y": "hi"}))).unwrap(),
            Some(json!({"x": 5, "y": "hi"}))
        );
    }

    #[test]
    fn test_absent_keys_are_omitted() {
        let doc = json!({
            "type": "object",
            "properties": {
                "a": {"type": "string"},
                "b": {"type": "boolean", "default": false},
                "nested": {"type": "object", "properties": {"c": {"type": "integer"}}}
            }
        });
        assert_eq!(
            compute(doc, None).unwrap(),
            Some(json!({"b": false, "nested": {}}))
        );
    }

    #[test]
    fn test_data_wins_over_defaults_deeply() {
        let doc = json!({
            "type": "object",
            "properties": {
                "profile": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "default": "anonymous"},
                        "age": {"type": "integer", "default": 18}
                    }
                }
            }
        });
        assert_eq!(
            compute(doc, Some(json!({"profile": {"name": "Ada"}}))).unwrap(),
            Some(json!({"profile": {"name": "Ada", "age": 18}}))
        );
    }

    #[test]
    fn test_null_data_falls_back_to_default() {
        let doc = json!({"type": "string", "default": "fallback"});
        assert_eq!(compute(doc.clone(), Some(Value::Null)).unwrap(), Some(json!("fallback")));
        assert_eq!(compute(doc, Some(json!(""))).unwrap(), Some(json!("")));
    }

    #[test]
    fn test_primitive_without_default_is_absent() {
        assert_eq!(compute(json!({"type": "number"}), None).unwrap(), None);
        assert_eq!(compute(json!({}), None).unwrap(), None);
    }

    #[test]
    fn test_object_default_feeds_properties() {
        let doc = json!({
            "type": "object",
            "default": {"a": "from parent", "b": "from parent"},
            "properties": {
                "a": {"type": "string"},
                "b": {"type": "string", "default": "from child"},
                "c": {"type": "string", "default": "only child"}
            }
        });
        assert_eq!(
            compute(doc, Some(json!({"c": "from data"}))).unwrap(),
            Some(json!({"a": "from parent", "b": "from child", "c": "from data"}))
        );
    }

    #[test]
    fn test_undeclared_data_is_preserved() {
        let doc = json!({"type": "object", "properties": {"a": {"type": "string", "default": "x"}}});
        assert_eq!(
            compute(doc, Some(json!({"extra": [1, 2]}))).unwrap(),
            Some(json!({"a": "x", "extra": [1, 2]}))
        );
    }

    #[test]
    fn test_array_elements_follow_items() {
        let doc = json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "label": {"type": "string"},
                    "done": {"type": "boolean", "default": false}
                }
            }
        });
        assert_eq!(
            compute(doc, Some(json!([{"label": "one"}, {"label": "two", "done": true}]))).unwrap(),
            Some(json!([
                {"label": "one", "done": false},
                {"label": "two", "done": true}
            ]))
        );
    }

    #[test]
    fn test_tuple_items_do_not_invent_length() {
        let doc = json!({
            "type": "array",
            "items": [
                {"type": "string", "default": "first"},
                {"type": "number", "default": 2}
            ],
            "additionalItems": {"type": "boolean", "default": true}
        });
        assert_eq!(compute(doc.clone(), None).unwrap(), None);
        assert_eq!(compute(doc.clone(), Some(json!([null]))).unwrap(), Some(json!(["first"])));
        assert_eq!(
            compute(doc, Some(json!(["a", null, null]))).unwrap(),
            Some(json!(["a", 2, true]))
        );
    }

    #[test]
    fn test_array_default_is_used_without_data() {
        let doc = json!({
            "type": "array",
            "default": [{}],
            "items": {"type": "object", "properties": {"n": {"type": "integer", "default": 1}}}
        });
        assert_eq!(compute(doc, None).unwrap(), Some(json!([{"n": 1}])));
    }

    #[test]
    fn test_references_are_resolved_before_recursing() {
        let doc = json!({
            "definitions": {
                "address": {
                    "type": "object",
                    "properties": {"country": {"type": "string", "default": "NZ"}}
                }
            },
            "type": "object",
            "properties": {
                "billing": {"$ref": "#/definitions/address"},
                "shipping": {"$ref": "#/definitions/address"}
            }
        });
        assert_eq!(
            compute(doc, Some(json!({"shipping": {"country": "AU"}}))).unwrap(),
            Some(json!({"billing": {"country": "NZ"}, "shipping": {"country": "AU"}}))
        );
    }

    #[test]
    fn test_recursive_schema_follows_data() {
        let doc = json!({
            "definitions": {
                "node": {
                    "type": "object",
                    "properties": {
                        "value": {"type": "integer", "default": 0},
                        "next": {"$ref": "#/definitions/node"}
                    }
                }
            },
            "$ref": "#/definitions/node"
        });
        assert_eq!(compute(doc.clone(), None).unwrap(), Some(json!({"value": 0})));
        assert_eq!(
            compute(doc, Some(json!({"next": {"next": {}}}))).unwrap(),
            Some(json!({"value": 0, "next": {"value": 0, "next": {"value": 0}}}))
        );
    }

    #[test]
    fn test_recursive_reference_uses_its_local_default() {
        let doc = json!({
            "definitions": {
                "node": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "child": {"$ref": "#/definitions/node", "default": {"name": "kid"}}
                    }
                }
            },
            "$ref": "#/definitions/node"
        });
        assert_eq!(compute(doc.clone(), None).unwrap(), Some(json!({"child": {"name": "kid"}})));
        assert_eq!(
            compute(doc, Some(json!({"name": "root", "child": {"name": "Bo"}}))).unwrap(),
            Some(json!({"name": "root", "child": {"name": "Bo", "child": {"name": "kid"}}}))
        );
    }

    #[test]
    fn test_mismatched_data_is_kept() {
        let array = json!({"type": "array", "default": [1], "items": {"type": "integer"}});
        assert_eq!(compute(array.clone(), Some(json!("x"))).unwrap(), Some(json!("x")));

        let object = json!({"type": "object", "properties": {"p": array}});
        assert_eq!(
            compute(object.clone(), Some(json!({"p": "x"}))).unwrap(),
            Some(json!({"p": "x"}))
        );
        assert_eq!(compute(object.clone(), None).unwrap(), Some(json!({"p": [1]})));
        assert_eq!(compute(object, Some(json!(7))).unwrap(), Some(json!(7)));
    }

    #[test]
    fn test_non_array_default_is_kept() {
        let doc = json!({"type": "array", "default": "none yet", "items": {"type": "string"}});
        assert_eq!(compute(doc, None).unwrap(), Some(json!("none yet")));
    }

    #[test]
    fn test_resolution_errors_propagate() {
        let doc = json!({
            "type": "object",
            "properties": {"broken": {"$ref": "#/definitions/missing"}}
        });
        assert!(matches!(
            compute(doc, None),
            Err(Error::Resolution(ResolutionError::UnknownReference { .. }))
        ));
    }
}
