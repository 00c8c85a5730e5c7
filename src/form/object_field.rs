// Object field state and layout
//
// An ObjectField owns the committed state of one object-typed schema node.
// It works out which child fields to lay out and in what order, hands each
// child its slice of schema, ui schema and data, and folds child edits back
// into its own state before telling its parent.

use std::fmt;

use log::debug;
use serde_json::{Map, Value};

use crate::config::EngineConfig;
use crate::form::order::PropertyOrderer;
use crate::form::ui_schema::UiSchema;
use crate::internal::error::{OrderSpecificationError, Result};
use crate::schema::{DefaultStateComputer, DefinitionsTable, SchemaNode, SchemaResolver};

/// Shared context handed down the field tree
#[derive(Debug, Clone)]
pub struct Registry<'d> {
    pub definitions: &'d DefinitionsTable,
    pub config: EngineConfig,
}

impl<'d> Registry<'d> {
    pub fn new(definitions: &'d DefinitionsTable) -> Self {
        Self::with_config(definitions, EngineConfig::default())
    }

    pub fn with_config(definitions: &'d DefinitionsTable, config: EngineConfig) -> Self {
        Self { definitions, config }
    }
}

/// Inputs of a field, as supplied by its parent
#[derive(Debug, Clone)]
pub struct FieldProps<'d> {
    /// Property name in the parent; `None` for the root field
    pub name: Option<String>,
    pub schema: SchemaNode,
    pub ui_schema: UiSchema,
    pub form_data: Option<Value>,
    /// Whether the parent lists this field as required
    pub required: bool,
    pub registry: Registry<'d>,
}

impl<'d> FieldProps<'d> {
    /// Props for a root field
    pub fn root(schema: SchemaNode, registry: Registry<'d>) -> Self {
        Self {
            name: None,
            schema,
            ui_schema: UiSchema::new(),
            form_data: None,
            required: false,
            registry,
        }
    }

    pub fn with_ui_schema(mut self, ui_schema: UiSchema) -> Self {
        self.ui_schema = ui_schema;
        self
    }

    pub fn with_form_data(mut self, form_data: Value) -> Self {
        self.form_data = Some(form_data);
        self
    }
}

/// One child field to lay out inside an object field
#[derive(Debug, Clone, PartialEq)]
pub struct ChildField {
    pub name: String,
    pub required: bool,
    /// The property's schema as declared; the child resolves it itself
    pub schema: SchemaNode,
    pub ui_schema: UiSchema,
    pub form_data: Option<Value>,
}

impl ChildField {
    /// Props for rendering this child as a field of its own
    pub fn props<'d>(&self, registry: &Registry<'d>) -> FieldProps<'d> {
        FieldProps {
            name: Some(self.name.clone()),
            schema: self.schema.clone(),
            ui_schema: self.ui_schema.clone(),
            form_data: self.form_data.clone(),
            required: self.required,
            registry: registry.clone(),
        }
    }
}

/// Notice shown in place of an object field whose order hint is invalid
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigErrorNotice {
    /// Field name, or `root`
    pub field: String,
    pub error: OrderSpecificationError,
    /// The resolved schema, serialized as JSON
    pub schema_json: String,
}

impl fmt::Display for ConfigErrorNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {} object field configuration: {}.", self.field, self.error)
    }
}

/// What an object field renders
#[derive(Debug, Clone, PartialEq)]
pub enum FieldLayout {
    Fields {
        /// Schema title, falling back to the field name
        title: Option<String>,
        description: Option<String>,
        children: Vec<ChildField>,
    },
    ConfigError(ConfigErrorNotice),
}

/// State holder for an object-typed schema node
#[derive(Debug, Clone)]
pub struct ObjectField<'d> {
    props: FieldProps<'d>,
    schema: SchemaNode,
    state: Map<String, Value>,
}

impl<'d> ObjectField<'d> {
    /// Creates the field and computes its initial state from the props
    pub fn new(props: FieldProps<'d>) -> Result<Self> {
        let (schema, state) = Self::state_from_props(&props)?;
        Ok(Self { props, schema, state })
    }

    /// Replaces the props and recomputes state from them
    pub fn receive_props(&mut self, props: FieldProps<'d>) -> Result<()> {
        let (schema, state) = Self::state_from_props(&props)?;
        self.props = props;
        self.schema = schema;
        self.state = state;
        Ok(())
    }

    fn state_from_props(props: &FieldProps<'d>) -> Result<(SchemaNode, Map<String, Value>)> {
        let registry = &props.registry;
        let schema = SchemaResolver::with_config(registry.definitions, registry.config.clone())
            .resolve(&props.schema)?;
        let computer = DefaultStateComputer::with_config(registry.definitions, registry.config.clone());
        let state = match computer.compute(&props.schema, props.form_data.as_ref())? {
            Some(Value::Object(state)) => state,
            _ => Map::new(),
        };
        Ok((schema, state))
    }

    pub fn props(&self) -> &FieldProps<'d> {
        &self.props
    }

    /// The resolved schema of this field
    pub fn schema(&self) -> &SchemaNode {
        &self.schema
    }

    /// The committed state
    pub fn state(&self) -> &Map<String, Value> {
        &self.state
    }

    /// Returns true if the property is listed in the schema's `required`
    pub fn is_required(&self, name: &str) -> bool {
        self.schema.is_required(name)
    }

    /// Commits a child's new value, then hands the full state to `notify`.
    ///
    /// `None` clears the property. `notify` always observes the state after
    /// the commit.
    pub fn on_change<F>(&mut self, name: &str, value: Option<Value>, notify: F)
    where
        F: FnOnce(&Value),
    {
        match value {
            Some(value) => {
                self.state.insert(name.to_string(), value);
            }
            None => {
                self.state.remove(name);
            }
        }
        notify(&Value::Object(self.state.clone()))
    }

    /// Lays out the child fields, or a notice if the order hint is invalid
    pub fn layout(&self) -> FieldLayout {
        let properties = self.schema.property_names();
        let orderer = PropertyOrderer::with_config(&self.props.registry.config);

        let ordered = match self
            .props
            .ui_schema
            .order()
            .and_then(|hint| orderer.order(&properties, hint.as_deref()))
        {
            Ok(ordered) => ordered,
            Err(error) => {
                let field = self.props.name.clone().unwrap_or_else(|| "root".to_string());
                debug!("Order hint for field '{}' rejected: {}", field, error);
                return FieldLayout::ConfigError(ConfigErrorNotice {
                    field,
                    error,
                    schema_json: self.schema.to_value().to_string(),
                });
            }
        };

        let children = ordered
            .into_iter()
            .filter_map(|name| {
                let schema = self.schema.properties.get(&name)?.clone();
                Some(ChildField {
                    required: self.is_required(&name),
                    ui_schema: self.props.ui_schema.child(&name),
                    form_data: self.state.get(&name).cloned(),
                    schema,
                    name,
                })
            })
            .collect();

        FieldLayout::Fields {
            title: self.schema.title.clone().or_else(|| self.props.name.clone()),
            description: self.schema.description.clone(),
            children,
        }
    }
}
