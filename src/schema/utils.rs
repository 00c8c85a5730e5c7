// Utility functions for the schema module
//
// This module provides shared utility functions used by other schema submodules.

use crate::internal::error::ResolutionError;

/// Pointer prefixes that address the definitions table
const DEFINITION_PREFIXES: [&str; 2] = ["#/definitions/", "#/$defs/"];

/// Extracts the definition name a `$ref` points to
///
/// Only pointers into the definitions table are supported. JSON pointer
/// escapes (`~1` for `/`, `~0` for `~`) are decoded, so
/// `#/definitions/a~1b` names the definition `a/b`.
pub fn definition_name(reference: &str) -> Result<String, ResolutionError> {
    let raw = DEFINITION_PREFIXES
        .iter()
        .find_map(|prefix| reference.strip_prefix(*prefix))
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ResolutionError::UnsupportedReference {
            reference: reference.to_string(),
        })?;

    Ok(raw.replace("~1", "/").replace("~0", "~"))
}

/// Appends `name` unless it is already present
pub fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|existing| existing == name) {
        list.push(name.to_string());
    }
}
