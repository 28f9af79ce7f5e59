use thiserror::Error;

/// Failure to answer a structural question about a type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntrospectionError {
    #[error("type {name} referenced by {referenced_by} cannot be resolved")]
    Unresolved { name: String, referenced_by: String },

    #[error("introspection of {0} is restricted")]
    Restricted(String),
}

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Manifest parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("type {0} is declared more than once")]
    DuplicateType(String),

    #[error("type {name} references unknown {role} {target}")]
    UnknownType {
        name: String,
        role: &'static str,
        target: String,
    },

    #[error("{relation} cycle through {name}")]
    Cycle { relation: &'static str, name: String },
}
