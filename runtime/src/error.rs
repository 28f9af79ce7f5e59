use std::io;
use thiserror::Error;
use typeindex_model::IndexKind;

#[derive(Error, Debug)]
pub enum IndexError {
    /// The build-time scan never produced this artifact.
    #[error("{kind} was not built: {artifact} not found")]
    NotBuilt { kind: IndexKind, artifact: String },

    #[error("{kind} at {artifact} is malformed: {reason}")]
    Malformed {
        kind: IndexKind,
        artifact: String,
        reason: String,
    },

    #[error("IO error reading {artifact}: {source}")]
    Io {
        artifact: String,
        #[source]
        source: io::Error,
    },

    /// Filtering by an annotation that is not visible at runtime.
    #[error("cannot filter by {annotation}: it is not retained at runtime")]
    InvalidFilter { annotation: String },
}

pub type Result<T> = std::result::Result<T, IndexError>;
