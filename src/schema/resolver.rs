// Schema resolution for formschema
//
// This module expands `$ref` pointers and `allOf` combinators so that a node
// can be interpreted structurally. Resolution is shallow: the returned node
// itself carries no `$ref` or `allOf`, and nested subschemas are resolved
// when a caller descends into them.

use log::{debug, trace};

use crate::config::EngineConfig;
use crate::internal::error::{ResolutionError, Result};
use crate::schema::types::{SchemaKind, SchemaNode};
use crate::schema::utils::{definition_name, push_unique};
use crate::schema::DefinitionsTable;

/// Resolves schema nodes against a definitions table
#[derive(Debug, Clone)]
pub struct SchemaResolver<'d> {
    definitions: &'d DefinitionsTable,
    config: EngineConfig,
}

/// A reference currently being expanded
#[derive(Debug)]
struct Expansion {
    name: String,
    reference: String,
}

impl<'d> SchemaResolver<'d> {
    /// Creates a resolver with default configuration
    pub fn new(definitions: &'d DefinitionsTable) -> Self {
        Self::with_config(definitions, EngineConfig::default())
    }

    /// Creates a resolver with custom configuration
    pub fn with_config(definitions: &'d DefinitionsTable, config: EngineConfig) -> Self {
        Self { definitions, config }
    }

    pub fn definitions(&self) -> &'d DefinitionsTable {
        self.definitions
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns an equivalent node without a top-level `$ref` or `allOf`.
    ///
    /// `oneOf` / `anyOf` are returned as declared; no branch is selected.
    pub fn resolve(&self, schema: &SchemaNode) -> Result<SchemaNode> {
        let mut expanding = Vec::new();
        let resolved = self.resolve_node(schema, &mut expanding, 0)?;
        Ok(resolved)
    }

    fn resolve_node(
        &self,
        node: &SchemaNode,
        expanding: &mut Vec<Expansion>,
        depth: usize,
    ) -> std::result::Result<SchemaNode, ResolutionError> {
        if depth > self.config.max_depth {
            return Err(ResolutionError::DepthExceeded {
                limit: self.config.max_depth,
            });
        }

        match node.kind() {
            SchemaKind::Reference(reference) => {
                let name = definition_name(reference)?;

                if expanding.iter().any(|e| e.name == name) {
                    let mut chain: Vec<String> = expanding.iter().map(|e| e.reference.clone()).collect();
                    chain.push(reference.to_string());
                    return Err(ResolutionError::CyclicReference { chain });
                }

                let target = self
                    .definitions
                    .get(&name)
                    .ok_or_else(|| ResolutionError::UnknownReference {
                        reference: reference.to_string(),
                    })?;
                debug!("Expanding {} into definition '{}'", reference, name);

                let mut local = node.clone();
                local.reference = None;
                let merged = overlay(target.clone(), local);

                expanding.push(Expansion {
                    name,
                    reference: reference.to_string(),
                });
                let resolved = self.resolve_node(&merged, expanding, depth + 1);
                expanding.pop();
                resolved
            }
            SchemaKind::Combinator(members) => {
                trace!("Flattening allOf with {} member(s)", members.len());
                let mut flattened = node.clone();
                flattened.all_of.clear();

                for member in members {
                    let member = self.resolve_node(member, expanding, depth + 1)?;
                    absorb(&mut flattened, member);
                }

                Ok(flattened)
            }
            SchemaKind::Object(_) | SchemaKind::Array(_) | SchemaKind::Primitive(_) => Ok(node.clone()),
        }
    }
}

/// Lays the keywords of `local` over `base`; local keywords win.
fn overlay(mut base: SchemaNode, local: SchemaNode) -> SchemaNode {
    if local.schema_type.is_some() {
        base.schema_type = local.schema_type;
    }
    if local.title.is_some() {
        base.title = local.title;
    }
    if local.description.is_some() {
        base.description = local.description;
    }
    for (name, property) in local.properties {
        base.properties.insert(name, property);
    }
    for name in &local.required {
        push_unique(&mut base.required, name);
    }
    if local.items.is_some() {
        base.items = local.items;
    }
    if local.additional_items.is_some() {
        base.additional_items = local.additional_items;
    }
    if local.default.is_some() {
        base.default = local.default;
    }
    base.all_of.extend(local.all_of);
    if !local.one_of.is_empty() {
        base.one_of = local.one_of;
    }
    if !local.any_of.is_empty() {
        base.any_of = local.any_of;
    }
    base.extra.extend(local.extra);
    base
}

/// Unions a resolved `allOf` member into the node; existing keys are kept.
fn absorb(node: &mut SchemaNode, member: SchemaNode) {
    for (name, property) in member.properties {
        node.properties.entry(name).or_insert(property);
    }
    for name in &member.required {
        push_unique(&mut node.required, name);
    }
    if node.schema_type.is_none() {
        node.schema_type = member.schema_type;
    }
}
