use std::path::PathBuf;
use thiserror::Error;
use typeindex_model::IntrospectionError;

/// Recoverable problem met while scanning one root. The root is left out of
/// the relationship that could not be established; other roots are
/// unaffected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanDiagnostic {
    #[error("cannot walk supertypes of {at} while indexing {root}: {source}")]
    AncestorUnresolved {
        root: String,
        at: String,
        source: IntrospectionError,
    },

    #[error("cannot read annotations of {target} while indexing {root}: {source}")]
    AnnotationIntrospection {
        root: String,
        target: String,
        source: IntrospectionError,
    },
}

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("can't write index file {path:?}: {source}")]
    Emission {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for ProcessorError {
    fn from(err: toml::de::Error) -> Self {
        ProcessorError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProcessorError>;
