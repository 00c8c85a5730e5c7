use thiserror::Error;

/// Unified error type for the formschema library.
#[derive(Error, Debug)]
pub enum Error {
    /// A `$ref` could not be expanded.
    #[error("Resolution Error: {0}")]
    Resolution(#[from] ResolutionError),

    /// An ordering hint does not match the declared property set.
    #[error("Order Specification Error: {0}")]
    OrderSpecification(#[from] OrderSpecificationError),

    /// Error related to a malformed schema document.
    #[error("Schema Error: {0}")]
    SchemaError(String),

    /// Error related to engine configuration.
    #[error("Config Error: {0}")]
    ConfigError(String),

    /// Error raised while (de)serializing JSON documents.
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures raised while expanding `$ref` and `allOf`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The reference names a definition that is not in the table.
    #[error("Could not find a definition for {reference}")]
    UnknownReference { reference: String },

    /// The reference does not point into the definitions table.
    #[error("Unsupported reference {reference}: only '#/definitions/<name>' and '#/$defs/<name>' are resolvable")]
    UnsupportedReference { reference: String },

    /// The reference chain revisits a definition that is still being expanded.
    #[error("Cyclic reference: {}", .chain.join(" -> "))]
    CyclicReference { chain: Vec<String> },

    /// Schema nesting went past the configured limit.
    #[error("Maximum schema nesting depth ({limit}) exceeded")]
    DepthExceeded { limit: usize },
}

impl ResolutionError {
    /// The reference the failure is about, when there is a single one.
    pub fn reference(&self) -> Option<&str> {
        match self {
            ResolutionError::UnknownReference { reference }
            | ResolutionError::UnsupportedReference { reference } => Some(reference),
            ResolutionError::CyclicReference { chain } => chain.last().map(String::as_str),
            ResolutionError::DepthExceeded { .. } => None,
        }
    }
}

/// Failures raised when an ordering hint is inconsistent with the properties it orders.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderSpecificationError {
    /// The hint names properties the schema does not declare.
    #[error("order list contains extraneous {}", describe_properties(.0))]
    Extraneous(Vec<String>),

    /// Declared properties are neither listed nor covered by a wildcard.
    #[error("order list does not contain {}", describe_properties(.0))]
    Missing(Vec<String>),

    /// The hint lists the same property twice.
    #[error("order list contains property '{0}' more than once")]
    Duplicate(String),

    /// The hint carries more than one wildcard marker.
    #[error("order list contains more than one wildcard item")]
    MultipleWildcards,
}

fn describe_properties(names: &[String]) -> String {
    match names {
        [single] => format!("property '{}'", single),
        _ => format!("properties '{}'", names.join("', '")),
    }
}

/// A specialized `Result` type for formschema operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_error_messages() {
        let err = OrderSpecificationError::Extraneous(vec!["zip".to_string()]);
        assert_eq!(err.to_string(), "order list contains extraneous property 'zip'");

        let err = OrderSpecificationError::Missing(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(err.to_string(), "order list does not contain properties 'a', 'b'");
    }

    #[test]
    fn test_cycle_message_and_reference() {
        let err = ResolutionError::CyclicReference {
            chain: vec!["#/definitions/A".to_string(), "#/definitions/B".to_string(), "#/definitions/A".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Cyclic reference: #/definitions/A -> #/definitions/B -> #/definitions/A"
        );
        assert_eq!(err.reference(), Some("#/definitions/A"));

        let wrapped: Error = err.into();
        assert!(matches!(wrapped, Error::Resolution(ResolutionError::CyclicReference { .. })));
    }
}
