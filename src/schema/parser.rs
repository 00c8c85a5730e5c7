// JSON Schema parser for formschema
//
// This module converts JSON Schema documents (serde_json values) into typed
// SchemaNode trees and definitions tables.

use indexmap::IndexMap;
use serde_json::Value;

use crate::internal::error::{Error, Result};
use crate::schema::types::{DefinitionsTable, Items, SchemaNode, SchemaType, TypeDeclaration};

/// Keys a root document may use to carry its definitions table
const DEFINITIONS_KEYS: [&str; 2] = ["definitions", "$defs"];

/// Parser for JSON Schema documents
#[derive(Debug, Default)]
pub struct SchemaParser;

impl SchemaParser {
    /// Creates a new schema parser
    pub fn new() -> Self {
        Self
    }

    /// Parses a root document into its schema node and the definitions it carries.
    ///
    /// The definitions are read from `definitions` and `$defs`; when both
    /// declare a name, the `definitions` entry wins.
    pub fn parse_document(&self, json: &Value) -> Result<(SchemaNode, DefinitionsTable)> {
        let schema = self.parse_node(json)?;

        let mut definitions = DefinitionsTable::new();
        if let Value::Object(obj) = json {
            for key in DEFINITIONS_KEYS.iter().rev() {
                if let Some(table) = obj.get(*key) {
                    for (name, definition) in self.parse_definitions(table)?.iter() {
                        definitions.insert(name.clone(), definition.clone());
                    }
                }
            }
        }

        Ok((schema, definitions))
    }

    /// Parses a definitions table (a JSON object of named schemas)
    pub fn parse_definitions(&self, json: &Value) -> Result<DefinitionsTable> {
        let obj = match json {
            Value::Object(obj) => obj,
            _ => return Err(Error::SchemaError("Definitions must be a JSON object".to_string())),
        };

        obj.iter()
            .map(|(name, definition)| -> Result<(String, SchemaNode)> {
                let node = self.parse_node(definition).map_err(|e| {
                    Error::SchemaError(format!("Invalid definition '{}': {}", name, e))
                })?;
                Ok((name.clone(), node))
            })
            .collect()
    }

    /// Parses a single schema node.
    ///
    /// Boolean schemas (`true` / `false`) become empty nodes: the engine fills
    /// defaults, it does not validate.
    pub fn parse_node(&self, json: &Value) -> Result<SchemaNode> {
        let obj = match json {
            Value::Object(obj) => obj,
            Value::Bool(_) => return Ok(SchemaNode::new()),
            _ => {
                return Err(Error::SchemaError(format!(
                    "Schema must be a JSON object or boolean, got {}",
                    json
                )))
            }
        };

        let mut node = SchemaNode::new();

        for (key, value) in obj {
            match key.as_str() {
                "$ref" => node.reference = Some(self.expect_string(key, value)?),
                "type" => node.schema_type = Some(self.parse_type(value)?),
                "title" => node.title = Some(self.expect_string(key, value)?),
                "description" => node.description = Some(self.expect_string(key, value)?),
                "properties" => node.properties = self.parse_properties(value)?,
                "required" => match value {
                    // Draft 3 style `required: true` on a property is kept verbatim
                    Value::Bool(_) => {
                        node.extra.insert(key.clone(), value.clone());
                    }
                    _ => {
                        for name in self.parse_string_list(key, value)? {
                            node.add_required(&name);
                        }
                    }
                },
                "items" => node.items = Some(self.parse_items(value)?),
                "additionalItems" => match value {
                    Value::Object(_) => node.additional_items = Some(Box::new(self.parse_node(value)?)),
                    _ => {
                        node.extra.insert(key.clone(), value.clone());
                    }
                },
                "default" => node.default = Some(value.clone()),
                "allOf" => node.all_of = self.parse_node_list(key, value)?,
                "oneOf" => node.one_of = self.parse_node_list(key, value)?,
                "anyOf" => node.any_of = self.parse_node_list(key, value)?,
                _ => {
                    node.extra.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(node)
    }

    /// Parses the `type` keyword
    fn parse_type(&self, value: &Value) -> Result<TypeDeclaration> {
        match value {
            Value::String(type_name) => Ok(TypeDeclaration::Single(type_name.parse()?)),
            Value::Array(types) => {
                let mut union_types = Vec::new();
                for t in types {
                    let schema_type = match t {
                        Value::String(type_name) => type_name.parse::<SchemaType>()?,
                        _ => {
                            return Err(Error::SchemaError(format!(
                                "Invalid type definition: {}",
                                t
                            )))
                        }
                    };
                    if !union_types.contains(&schema_type) {
                        union_types.push(schema_type);
                    }
                }
                if union_types.is_empty() {
                    return Err(Error::SchemaError("Type list must not be empty".to_string()));
                }
                Ok(TypeDeclaration::Union(union_types))
            }
            _ => Err(Error::SchemaError(format!("Invalid type definition: {}", value))),
        }
    }

    /// Parses the `properties` keyword, keeping declaration order
    fn parse_properties(&self, value: &Value) -> Result<IndexMap<String, SchemaNode>> {
        let props = match value {
            Value::Object(obj) => obj,
            _ => return Err(Error::SchemaError("Properties must be an object".to_string())),
        };

        let mut properties = IndexMap::with_capacity(props.len());
        for (name, prop) in props {
            let node = self.parse_node(prop).map_err(|e| {
                Error::SchemaError(format!("Invalid property '{}': {}", name, e))
            })?;
            properties.insert(name.clone(), node);
        }

        Ok(properties)
    }

    /// Parses the `items` keyword (single schema or tuple)
    fn parse_items(&self, value: &Value) -> Result<Items> {
        match value {
            Value::Array(_) => Ok(Items::Tuple(self.parse_node_list("items", value)?)),
            _ => Ok(Items::Single(Box::new(self.parse_node(value)?))),
        }
    }

    fn parse_node_list(&self, key: &str, value: &Value) -> Result<Vec<SchemaNode>> {
        match value {
            Value::Array(nodes) => nodes.iter().map(|node| self.parse_node(node)).collect(),
            _ => Err(Error::SchemaError(format!("Field '{}' must be an array of schemas", key))),
        }
    }

    fn parse_string_list(&self, key: &str, value: &Value) -> Result<Vec<String>> {
        let array = match value {
            Value::Array(array) => array,
            _ => return Err(Error::SchemaError(format!("Field '{}' must be an array of strings", key))),
        };

        array
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                _ => Err(Error::SchemaError(format!("Field '{}' must be an array of strings", key))),
            })
            .collect()
    }

    /// Helper to get a string keyword
    fn expect_string(&self, key: &str, value: &Value) -> Result<String> {
        match value {
            Value::String(s) => Ok(s.clone()),
            _ => Err(Error::SchemaError(format!("Field '{}' must be a string", key))),
        }
    }
}
