// Schema type system for formschema
//
// This module defines the typed representation of JSON Schema nodes used by
// the resolver, the default state computer and the form layer.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::internal::error::{Error, Result};
use crate::schema::parser::SchemaParser;
use crate::schema::utils::push_unique;

/// Represents the JSON types a schema node can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

impl SchemaType {
    /// Returns the JSON Schema keyword for this type
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Object => "object",
            SchemaType::Array => "array",
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
            SchemaType::Null => "null",
        }
    }
}

impl FromStr for SchemaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "object" => Ok(SchemaType::Object),
            "array" => Ok(SchemaType::Array),
            "string" => Ok(SchemaType::String),
            "number" => Ok(SchemaType::Number),
            "integer" => Ok(SchemaType::Integer),
            "boolean" => Ok(SchemaType::Boolean),
            "null" => Ok(SchemaType::Null),
            _ => Err(Error::SchemaError(format!("Unknown type: {}", s))),
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `type` keyword: a single type or a list of alternatives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDeclaration {
    Single(SchemaType),
    Union(Vec<SchemaType>),
}

impl TypeDeclaration {
    /// The type that drives default computation.
    ///
    /// For a union this is the first non-null member, so `["string", "null"]`
    /// behaves like a string field.
    pub fn primary(&self) -> SchemaType {
        match self {
            TypeDeclaration::Single(t) => *t,
            TypeDeclaration::Union(types) => types
                .iter()
                .copied()
                .find(|t| *t != SchemaType::Null)
                .unwrap_or(SchemaType::Null),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            TypeDeclaration::Single(t) => Value::String(t.as_str().to_string()),
            TypeDeclaration::Union(types) => Value::Array(
                types.iter().map(|t| Value::String(t.as_str().to_string())).collect(),
            ),
        }
    }
}

/// The `items` keyword of an array node
#[derive(Debug, Clone, PartialEq)]
pub enum Items {
    /// Every element follows the same schema
    Single(Box<SchemaNode>),
    /// Elements follow the schema at the same position
    Tuple(Vec<SchemaNode>),
}

impl Items {
    /// Schema for the element at `index`, falling back to `additional` past
    /// the end of a tuple.
    pub fn schema_for<'a>(&'a self, index: usize, additional: Option<&'a SchemaNode>) -> Option<&'a SchemaNode> {
        match self {
            Items::Single(schema) => Some(schema),
            Items::Tuple(schemas) => schemas.get(index).or(additional),
        }
    }
}

/// Structural view of a schema node, used for exhaustive dispatch
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaKind<'a> {
    /// The node points into the definitions table
    Reference(&'a str),
    /// The node carries `allOf` members still waiting to be flattened
    Combinator(&'a [SchemaNode]),
    /// The node describes an object with the given properties
    Object(&'a IndexMap<String, SchemaNode>),
    /// The node describes an array
    Array(Option<&'a Items>),
    /// The node describes a scalar, or declares no usable shape at all
    Primitive(Option<SchemaType>),
}

/// A JSON Schema node
///
/// Only the keywords the engine interprets are modeled as fields. Every other
/// keyword is kept verbatim in `extra` so the node serializes back to an
/// equivalent document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaNode {
    /// `$ref`
    pub reference: Option<String>,
    /// `type`
    pub schema_type: Option<TypeDeclaration>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// `properties`, in declaration order
    pub properties: IndexMap<String, SchemaNode>,
    /// `required`, in declaration order without duplicates
    pub required: Vec<String>,
    pub items: Option<Items>,
    /// `additionalItems`, applied past the end of a tuple `items`
    pub additional_items: Option<Box<SchemaNode>>,
    /// `default`; `Some(Value::Null)` is an explicit null default
    pub default: Option<Value>,
    pub all_of: Vec<SchemaNode>,
    pub one_of: Vec<SchemaNode>,
    pub any_of: Vec<SchemaNode>,
    /// Keywords the engine does not interpret
    pub extra: Map<String, Value>,
}

impl SchemaNode {
    /// Creates an empty node that accepts anything
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a node declaring a single type
    pub fn with_type(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(TypeDeclaration::Single(schema_type)),
            ..Self::default()
        }
    }

    /// Creates a node that only carries a `$ref`
    pub fn reference(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            ..Self::default()
        }
    }

    /// Parses a node from a JSON value
    pub fn from_value(value: &Value) -> Result<Self> {
        SchemaParser::new().parse_node(value)
    }

    /// The effective type: the declared one, or `object` when only
    /// `properties` is present, or `array` when only `items` is present.
    pub fn effective_type(&self) -> Option<SchemaType> {
        match &self.schema_type {
            Some(declared) => Some(declared.primary()),
            None if !self.properties.is_empty() => Some(SchemaType::Object),
            None if self.items.is_some() => Some(SchemaType::Array),
            None => None,
        }
    }

    /// Structural view used to dispatch on the node's shape
    pub fn kind(&self) -> SchemaKind<'_> {
        if let Some(reference) = &self.reference {
            return SchemaKind::Reference(reference);
        }
        if !self.all_of.is_empty() {
            return SchemaKind::Combinator(&self.all_of);
        }
        match self.effective_type() {
            Some(SchemaType::Object) => SchemaKind::Object(&self.properties),
            Some(SchemaType::Array) => SchemaKind::Array(self.items.as_ref()),
            other => SchemaKind::Primitive(other),
        }
    }

    /// Returns true if `name` is listed in `required`
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Declared property names in schema order
    pub fn property_names(&self) -> Vec<String> {
        self.properties.keys().cloned().collect()
    }

    /// Adds a name to `required` unless it is already listed
    pub fn add_required(&mut self, name: &str) {
        push_unique(&mut self.required, name);
    }

    /// Converts the node back to a JSON value
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();

        if let Some(reference) = &self.reference {
            obj.insert("$ref".to_string(), Value::String(reference.clone()));
        }
        if let Some(schema_type) = &self.schema_type {
            obj.insert("type".to_string(), schema_type.to_value());
        }
        if let Some(title) = &self.title {
            obj.insert("title".to_string(), Value::String(title.clone()));
        }
        if let Some(description) = &self.description {
            obj.insert("description".to_string(), Value::String(description.clone()));
        }
        if !self.properties.is_empty() {
            let props = self
                .properties
                .iter()
                .map(|(name, node)| (name.clone(), node.to_value()))
                .collect();
            obj.insert("properties".to_string(), Value::Object(props));
        }
        if !self.required.is_empty() {
            let required = self.required.iter().cloned().map(Value::String).collect();
            obj.insert("required".to_string(), Value::Array(required));
        }
        match &self.items {
            Some(Items::Single(node)) => {
                obj.insert("items".to_string(), node.to_value());
            }
            Some(Items::Tuple(nodes)) => {
                obj.insert("items".to_string(), nodes_to_value(nodes));
            }
            None => {}
        }
        if let Some(additional) = &self.additional_items {
            obj.insert("additionalItems".to_string(), additional.to_value());
        }
        if let Some(default) = &self.default {
            obj.insert("default".to_string(), default.clone());
        }
        if !self.all_of.is_empty() {
            obj.insert("allOf".to_string(), nodes_to_value(&self.all_of));
        }
        if !self.one_of.is_empty() {
            obj.insert("oneOf".to_string(), nodes_to_value(&self.one_of));
        }
        if !self.any_of.is_empty() {
            obj.insert("anyOf".to_string(), nodes_to_value(&self.any_of));
        }
        for (key, value) in &self.extra {
            obj.insert(key.clone(), value.clone());
        }

        Value::Object(obj)
    }
}

fn nodes_to_value(nodes: &[SchemaNode]) -> Value {
    Value::Array(nodes.iter().map(SchemaNode::to_value).collect())
}

impl Serialize for SchemaNode {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SchemaNode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        SchemaNode::from_value(&value).map_err(serde::de::Error::custom)
    }
}

/// Named schema definitions that `$ref` pointers resolve against
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefinitionsTable {
    definitions: IndexMap<String, SchemaNode>,
}

impl DefinitionsTable {
    /// Creates an empty definitions table
    pub fn new() -> Self {
        Self {
            definitions: IndexMap::new(),
        }
    }

    /// Registers a definition, replacing any previous one with the same name
    pub fn insert(&mut self, name: impl Into<String>, schema: SchemaNode) {
        self.definitions.insert(name.into(), schema);
    }

    /// Gets a definition by name
    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Iterates definitions in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SchemaNode)> {
        self.definitions.iter()
    }
}

impl FromIterator<(String, SchemaNode)> for DefinitionsTable {
    fn from_iter<I: IntoIterator<Item = (String, SchemaNode)>>(iter: I) -> Self {
        Self {
            definitions: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_dispatch() {
        let reference = SchemaNode::reference("#/definitions/A");
        assert_eq!(reference.kind(), SchemaKind::Reference("#/definitions/A"));

        let implicit_object = SchemaNode::from_value(&json!({
            "properties": {"a": {"type": "string"}}
        }))
        .unwrap();
        assert!(matches!(implicit_object.kind(), SchemaKind::Object(props) if props.len() == 1));

        let nullable = SchemaNode::from_value(&json!({"type": ["null", "integer"]})).unwrap();
        assert_eq!(nullable.kind(), SchemaKind::Primitive(Some(SchemaType::Integer)));

        assert_eq!(SchemaNode::new().kind(), SchemaKind::Primitive(None));
    }

    #[test]
    fn test_is_required() {
        let node = SchemaNode::from_value(&json!({
            "type": "object",
            "required": ["name"],
            "properties": {"name": {"type": "string"}, "age": {"type": "integer"}}
        }))
        .unwrap();
        assert!(node.is_required("name"));
        assert!(!node.is_required("age"));
        assert_eq!(node.property_names(), vec!["name", "age"]);
    }

    #[test]
    fn test_serialization_keeps_unknown_keywords() {
        let doc = json!({
            "type": "string",
            "title": "Name",
            "default": null,
            "minLength": 3,
            "enum": ["a", "b"]
        });
        let node: SchemaNode = serde_json::from_value(doc.clone()).unwrap();
        assert_eq!(node.default, Some(Value::Null));
        assert_eq!(serde_json::to_value(&node).unwrap(), doc);
    }

    #[test]
    fn test_tuple_items_fall_back_to_additional() {
        let node = SchemaNode::from_value(&json!({
            "type": "array",
            "items": [{"type": "string"}, {"type": "number"}],
            "additionalItems": {"type": "boolean"}
        }))
        .unwrap();
        let items = node.items.as_ref().unwrap();
        let additional = node.additional_items.as_deref();
        assert_eq!(
            items.schema_for(1, additional).and_then(SchemaNode::effective_type),
            Some(SchemaType::Number)
        );
        assert_eq!(
            items.schema_for(5, additional).and_then(SchemaNode::effective_type),
            Some(SchemaType::Boolean)
        );
        assert!(items.schema_for(5, None).is_none());
    }
}
