// Form module for formschema
//
// This module holds the pieces the field-rendering layer builds on:
//
// 1. Property ordering driven by `ui:order` hints
// 2. UI schema access
// 3. Object field state, layout and bottom-up change propagation

pub use self::object_field::{ChildField, ConfigErrorNotice, FieldLayout, FieldProps, ObjectField, Registry};
pub use self::order::PropertyOrderer;
pub use self::ui_schema::UiSchema;

pub mod object_field;
pub mod order;
pub mod ui_schema;
