// Engine configuration for formschema
//
// Tunables shared by the resolver, the default state computer and the
// property orderer. Loadable from JSON so tools can ship a config file.

use serde::{Deserialize, Serialize};

use crate::internal::error::{Error, Result};

/// Wildcard marker used in `ui:order` lists when nothing else is configured.
pub const DEFAULT_WILDCARD: &str = "*";

/// Default nesting limit for schema resolution and default computation.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Configuration for the form engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Maximum nesting depth (reference chains, `allOf` members and
    /// object/array descent) before resolution gives up
    pub max_depth: usize,

    /// Marker standing for "every property not listed" in an order hint
    pub wildcard: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            wildcard: DEFAULT_WILDCARD.to_string(),
        }
    }
}

impl EngineConfig {
    /// Checks that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::ConfigError("maxDepth must be greater than zero".to_string()));
        }
        if self.wildcard.is_empty() {
            return Err(Error::ConfigError("wildcard marker must not be empty".to_string()));
        }
        Ok(())
    }

    /// Parses and validates a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = EngineConfig::from_json_str(r#"{"wildcard": "..."}"#).unwrap();
        assert_eq!(config.wildcard, "...");
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"maxDepth": 0}"#),
            Err(Error::ConfigError(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"wildcard": ""}"#),
            Err(Error::ConfigError(_))
        ));
        assert!(matches!(EngineConfig::from_json_str("not json"), Err(Error::Json(_))));
    }
}
