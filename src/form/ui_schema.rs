// UI schema access
//
// The ui schema travels next to the data schema and carries presentation
// hints: `ui:order` for the object it sits on, and one nested ui schema per
// property name.

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::internal::error::{Error, OrderSpecificationError, Result};

/// Key holding the property order hint
pub const UI_ORDER: &str = "ui:order";

/// Presentation hints for one field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UiSchema {
    entries: Map<String, Value>,
}

impl UiSchema {
    /// Creates an empty ui schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ui schema from JSON; `null` is treated as empty
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            Value::Null => Ok(Self::new()),
            other => Err(Error::SchemaError(format!("UI schema must be a JSON object, got {}", other))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `ui:order` hint, if one is given as a list of names.
    ///
    /// A hint that is not a list is ignored, matching a missing hint. Entries
    /// that are not strings can never name a property and are rejected.
    pub fn order(&self) -> std::result::Result<Option<Vec<String>>, OrderSpecificationError> {
        let names = match self.entries.get(UI_ORDER) {
            Some(Value::Array(names)) => names,
            Some(other) => {
                warn!("Ignoring {} that is not a list: {}", UI_ORDER, other);
                return Ok(None);
            }
            None => return Ok(None),
        };

        let mut hint = Vec::with_capacity(names.len());
        let mut invalid = Vec::new();
        for name in names {
            match name {
                Value::String(name) => hint.push(name.clone()),
                other => invalid.push(other.to_string()),
            }
        }

        if invalid.is_empty() {
            Ok(Some(hint))
        } else {
            Err(OrderSpecificationError::Extraneous(invalid))
        }
    }

    /// The ui schema of the named property; empty when none is given
    pub fn child(&self, name: &str) -> UiSchema {
        match self.entries.get(name) {
            Some(Value::Object(entries)) => UiSchema {
                entries: entries.clone(),
            },
            _ => UiSchema::new(),
        }
    }
}
