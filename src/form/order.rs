// Property ordering for object fields
//
// Turns the declared property names of an object schema plus an optional
// `ui:order` hint into the sequence the fields are laid out in.

use std::collections::HashSet;

use log::debug;

use crate::config::EngineConfig;
use crate::internal::error::OrderSpecificationError;
use crate::schema::utils::push_unique;

/// Orders object properties according to an order hint
#[derive(Debug, Clone)]
pub struct PropertyOrderer {
    wildcard: String,
}

impl Default for PropertyOrderer {
    fn default() -> Self {
        Self::with_config(&EngineConfig::default())
    }
}

impl PropertyOrderer {
    /// Creates an orderer using the `*` wildcard
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an orderer using the configured wildcard
    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            wildcard: config.wildcard.clone(),
        }
    }

    pub fn wildcard(&self) -> &str {
        &self.wildcard
    }

    /// Orders `properties` (in schema declaration order) by `hint`.
    ///
    /// Without a hint the declaration order is kept. With a hint, the
    /// wildcard (at most one) expands in place to every property the hint
    /// does not name, in declaration order.
    pub fn order(
        &self,
        properties: &[String],
        hint: Option<&[String]>,
    ) -> Result<Vec<String>, OrderSpecificationError> {
        let hint = match hint {
            Some(hint) => hint,
            None => return Ok(properties.to_vec()),
        };

        let declared: HashSet<&str> = properties.iter().map(String::as_str).collect();

        let mut extraneous = Vec::new();
        for name in hint {
            if *name != self.wildcard && !declared.contains(name.as_str()) {
                push_unique(&mut extraneous, name);
            }
        }
        if !extraneous.is_empty() {
            return Err(OrderSpecificationError::Extraneous(extraneous));
        }

        let mut listed = HashSet::with_capacity(hint.len());
        let mut wildcard_index = None;
        for (index, name) in hint.iter().enumerate() {
            if *name == self.wildcard {
                if wildcard_index.is_some() {
                    return Err(OrderSpecificationError::MultipleWildcards);
                }
                wildcard_index = Some(index);
            } else if !listed.insert(name.as_str()) {
                return Err(OrderSpecificationError::Duplicate(name.clone()));
            }
        }

        let rest: Vec<String> = properties
            .iter()
            .filter(|name| !listed.contains(name.as_str()))
            .cloned()
            .collect();

        let index = match wildcard_index {
            Some(index) => index,
            None if rest.is_empty() => return Ok(hint.to_vec()),
            None => return Err(OrderSpecificationError::Missing(rest)),
        };

        debug!("Expanding wildcard at position {} to {} property(ies)", index, rest.len());
        let mut ordered = Vec::with_capacity(properties.len());
        ordered.extend_from_slice(&hint[..index]);
        ordered.extend(rest);
        ordered.extend_from_slice(&hint[index + 1..]);
        Ok(ordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn order(properties: &[&str], hint: &[&str]) -> Result<Vec<String>, OrderSpecificationError> {
        PropertyOrderer::new().order(&names(properties), Some(names(hint).as_slice()))
    }

    fn order_error(properties: &[&str], hint: &[&str]) -> OrderSpecificationError {
        order(properties, hint).unwrap_err()
    }

    #[test]
    fn test_no_hint_keeps_declaration_order() {
        let properties = names(&["b", "a"]);
        assert_eq!(PropertyOrderer::new().order(&properties, None).unwrap(), properties);
    }

    #[test]
    fn test_wildcard_expansion() {
        assert_eq!(order(&["a", "b", "c"], &["b", "*"]).unwrap(), names(&["b", "a", "c"]));
        assert_eq!(order(&["a", "b", "c"], &["*", "a"]).unwrap(), names(&["b", "c", "a"]));
        assert_eq!(
            order(&["a", "b", "c", "d"], &["d", "*", "a"]).unwrap(),
            names(&["d", "b", "c", "a"])
        );
        assert_eq!(order(&["a", "b"], &["b", "a", "*"]).unwrap(), names(&["b", "a"]));
    }

    #[test]
    fn test_complete_hint_without_wildcard() {
        assert_eq!(order(&["a", "b", "c"], &["c", "a", "b"]).unwrap(), names(&["c", "a", "b"]));
    }

    #[test]
    fn test_duplicate_entry() {
        assert_eq!(order_error(&["a", "b"], &["a", "a"]), OrderSpecificationError::Duplicate("a".to_string()));
    }

    #[test]
    fn test_extraneous_entries() {
        assert_eq!(
            order_error(&["a"], &["a", "x", "y"]),
            OrderSpecificationError::Extraneous(names(&["x", "y"]))
        );

        let err = order_error(&["a"], &["x", "a", "x"]);
        assert_eq!(err, OrderSpecificationError::Extraneous(names(&["x"])));
        assert_eq!(err.to_string(), "order list contains extraneous property 'x'");
    }

    #[test]
    fn test_missing_entries() {
        let err = order_error(&["a", "b", "c"], &["b"]);
        assert_eq!(err, OrderSpecificationError::Missing(names(&["a", "c"])));
        assert_eq!(err.to_string(), "order list does not contain properties 'a', 'c'");
    }

    #[test]
    fn test_multiple_wildcards() {
        assert_eq!(order_error(&["a", "b"], &["*", "a", "*"]), OrderSpecificationError::MultipleWildcards);
    }

    #[test]
    fn test_custom_wildcard() {
        let config = EngineConfig {
            wildcard: "...".to_string(),
            ..EngineConfig::default()
        };
        let orderer = PropertyOrderer::with_config(&config);
        assert_eq!(orderer.wildcard(), "...");
        assert_eq!(
            orderer.order(&names(&["a", "b"]), Some(names(&["b", "..."]).as_slice())).unwrap(),
            names(&["b", "a"])
        );
        assert!(orderer.order(&names(&["a"]), Some(names(&["*"]).as_slice())).is_err());
    }

    #[test]
    fn test_valid_hints_yield_permutations() {
        let properties = names(&["p0", "p1", "p2", "p3", "p4"]);
        let orderer = PropertyOrderer::new();

        for rotation in 0..properties.len() {
            let mut listed = properties.clone();
            listed.rotate_left(rotation);
            for keep in 0..=listed.len() {
                for wildcard_at in 0..=keep {
                    let mut hint: Vec<String> = listed[..keep].to_vec();
                    hint.insert(wildcard_at, "*".to_string());

                    let ordered = orderer.order(&properties, Some(hint.as_slice())).unwrap();
                    assert_eq!(ordered.len(), properties.len());
                    let unique: HashSet<&String> = ordered.iter().collect();
                    assert_eq!(unique.len(), properties.len());
                    assert!(properties.iter().all(|p| ordered.contains(p)));
                }
            }
        }
    }
}
