use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

/// Qualified name to the set of qualified names related to it. Both levels
/// iterate in lexicographic order.
pub type IndexTable = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    Subclass,
    Annotation,
}

impl IndexKind {
    pub const ALL: [IndexKind; 2] = [IndexKind::Subclass, IndexKind::Annotation];

    /// Fixed file name of the persisted artifact for this kind.
    pub fn artifact_name(self) -> &'static str {
        match self {
            IndexKind::Subclass => "SubclassIndex.json",
            IndexKind::Annotation => "AnnotationIndex.json",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Subclass => f.write_str("subclass index"),
            IndexKind::Annotation => f.write_str("annotation index"),
        }
    }
}

/// On-disk shape of one persisted index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexArtifact {
    pub kind: IndexKind,
    pub entries: IndexTable,
}

impl IndexArtifact {
    pub fn new(kind: IndexKind, entries: IndexTable) -> Self {
        Self { kind, entries }
    }

    /// Pretty JSON terminated by a newline. Output depends only on the
    /// entries, never on insertion order.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }
}
