//! Core error types for nestql.
//!
//! Compilation is pure and deterministic, so every error here is an
//! unrecoverable compile-time failure surfaced immediately to the caller.
//! Runtime SQL failures (for example a to-one correlation matching more
//! than one row) are never detected or translated by this crate; they
//! propagate unchanged from whatever executes the statement.

use thiserror::Error;

/// The primary error type for nestql.
///
/// Resolution errors (`UnknownEntity`, `UnknownAssociation`) are raised at
/// the inclusion-tree node where they occur; schema-shape errors
/// (`UnsupportedAssociationKind`, `MissingJoinTable`) are raised when the
/// offending metadata is loaded or first used.
#[derive(Error, Debug)]
pub enum NestqlError {
    // ── Resolution errors ────────────────────────────────────────────

    /// The named entity is not registered with the schema provider.
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    /// The requested association name is not declared on the entity.
    #[error("Unknown association '{name}' on entity '{entity}'")]
    UnknownAssociation {
        /// The entity the association was looked up on.
        entity: String,
        /// The association name that failed to resolve.
        name: String,
    },

    /// Association metadata exists but its relational kind cannot be
    /// classified into one of the supported kinds.
    #[error("Unsupported association kind '{kind}' for '{entity}.{name}'")]
    UnsupportedAssociationKind {
        /// The entity declaring the association.
        entity: String,
        /// The association name.
        name: String,
        /// The kind string that failed to classify.
        kind: String,
    },

    /// A many-to-many association is missing its join-table metadata.
    #[error("Association '{entity}.{name}' requires a join table")]
    MissingJoinTable {
        /// The entity declaring the association.
        entity: String,
        /// The association name.
        name: String,
    },

    // ── Guards ───────────────────────────────────────────────────────

    /// The inclusion tree is deeper than the opt-in depth limit.
    #[error("Inclusion tree exceeds maximum depth of {0}")]
    DepthLimitExceeded(usize),

    // ── Schema loading ───────────────────────────────────────────────

    /// The schema definition is structurally invalid.
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// A schema file could not be parsed or deserialized.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An I/O error occurred while reading a schema file.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl NestqlError {
    /// Convenience constructor for [`NestqlError::UnknownAssociation`].
    pub fn unknown_association(entity: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownAssociation {
            entity: entity.into(),
            name: name.into(),
        }
    }

    /// Convenience constructor for [`NestqlError::UnsupportedAssociationKind`].
    pub fn unsupported_kind(
        entity: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self::UnsupportedAssociationKind {
            entity: entity.into(),
            name: name.into(),
            kind: kind.into(),
        }
    }
}

/// A convenience type alias for `Result<T, NestqlError>`.
pub type NestqlResult<T> = Result<T, NestqlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_entity_display() {
        let err = NestqlError::UnknownEntity("Ghost".into());
        assert_eq!(err.to_string(), "Unknown entity: Ghost");
    }

    #[test]
    fn test_unknown_association_display() {
        let err = NestqlError::unknown_association("Post", "ghost");
        assert_eq!(
            err.to_string(),
            "Unknown association 'ghost' on entity 'Post'"
        );
    }

    #[test]
    fn test_unsupported_kind_display() {
        let err = NestqlError::unsupported_kind("Post", "tags", "habtm_v2");
        assert_eq!(
            err.to_string(),
            "Unsupported association kind 'habtm_v2' for 'Post.tags'"
        );
    }

    #[test]
    fn test_missing_join_table_display() {
        let err = NestqlError::MissingJoinTable {
            entity: "Post".into(),
            name: "tags".into(),
        };
        assert_eq!(
            err.to_string(),
            "Association 'Post.tags' requires a join table"
        );
    }

    #[test]
    fn test_depth_limit_display() {
        let err = NestqlError::DepthLimitExceeded(8);
        assert_eq!(err.to_string(), "Inclusion tree exceeds maximum depth of 8");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "schema missing");
        let err: NestqlError = io_err.into();
        assert!(err.to_string().contains("schema missing"));
    }
}
