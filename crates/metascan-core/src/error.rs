//! Import error taxonomy.

use thiserror::Error;

/// Result type for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;

/// Errors raised during metadata import.
///
/// Every error is terminal for the reader instance that raised it. Callers
/// are expected to treat the source as unrecoverable and move on to the
/// next configured source, if any.
#[derive(Debug, Error)]
pub enum ImportError {
    /// A required initialization parameter was not supplied.
    #[error("Initialization error: parameter [{0}] missing")]
    ParameterMissing(String),

    /// An initialization parameter carried an unusable value.
    #[error("Initialization error: invalid value for parameter [{0}]")]
    ParameterInvalid(String),

    /// An initialization parameter was blank after trimming.
    #[error("Initialization error: parameter [{0}] empty")]
    ParameterEmpty(String),

    /// The reader was used before a successful `init`.
    #[error("{0} has not been configured")]
    NotConfigured(String),

    /// A source file or directory is missing, or of the wrong kind.
    #[error("Initialization error: {0}")]
    Source(String),

    /// A rule template with an unterminated or misplaced expression
    /// delimiter.
    #[error("Invalid rule \"{0}\"")]
    InvalidRule(String),

    /// An embedded rule expression that does not match the expression
    /// grammar.
    #[error("Invalid expression \"{0}\"")]
    InvalidExpression(String),

    /// A declaration that cannot be scanned: a bad level number or a
    /// malformed picture string.
    #[error("malformed declaration: {0}")]
    MalformedDeclaration(String),

    /// A condition-name entry with no preceding field to attach to.
    #[error("condition-name entry \"{0}\" has no preceding field")]
    OrphanConditionName(String),

    /// Type mode requested where it is not available.
    #[error("type mode is only valid for COPYBOOK scope")]
    TypeModeInvalid,

    /// Type metadata requested from a reader that does not collect it.
    #[error("type metadata is not supported by this reader")]
    TypeMetaDataUnsupported,

    /// An I/O failure while reading a source, wrapped with context.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_errors_name_the_parameter() {
        let err = ImportError::ParameterMissing("scope".into());
        assert_eq!(
            err.to_string(),
            "Initialization error: parameter [scope] missing"
        );

        let err = ImportError::ParameterInvalid("case".into());
        assert_eq!(
            err.to_string(),
            "Initialization error: invalid value for parameter [case]"
        );

        let err = ImportError::ParameterEmpty("namespacePrefix".into());
        assert_eq!(
            err.to_string(),
            "Initialization error: parameter [namespacePrefix] empty"
        );
    }

    #[test]
    fn rule_errors_cite_the_offending_text() {
        let err = ImportError::InvalidRule("%type%([!1+".into());
        assert_eq!(err.to_string(), "Invalid rule \"%type%([!1+\"");

        let err = ImportError::InvalidExpression("1+1-1/1".into());
        assert_eq!(err.to_string(), "Invalid expression \"1+1-1/1\"");
    }
}
