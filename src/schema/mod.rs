// Schema module for formschema
//
// This module provides the schema side of the form engine. It includes:
//
// 1. Typed JSON Schema nodes and the definitions table
// 2. A parser from serde_json documents
// 3. Reference and `allOf` resolution
// 4. Default form state computation

// Re-export public types and functions
pub use self::types::{DefinitionsTable, Items, SchemaKind, SchemaNode, SchemaType, TypeDeclaration};
pub use self::defaults::DefaultStateComputer;
pub use self::parser::SchemaParser;
pub use self::resolver::SchemaResolver;

// Sub-modules
pub mod types;
pub mod defaults;
pub mod parser;
pub mod resolver;

// Internal module for shared utilities
pub(crate) mod utils;
