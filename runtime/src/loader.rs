use crate::error::IndexError;
use crate::error::Result;
use once_cell::sync::OnceCell;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use typeindex_model::IndexArtifact;
use typeindex_model::IndexKind;
use typeindex_model::IndexTable;

/// Where the persisted artifacts live.
pub trait IndexSource: Send + Sync {
    /// Raw artifact text, or `None` when the artifact does not exist.
    fn read(&self, kind: IndexKind) -> Result<Option<String>>;

    /// Human-readable location of the artifact, used in errors.
    fn locate(&self, kind: IndexKind) -> String;
}

/// Reads the files emitted by the scanner from a directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl IndexSource for DirectorySource {
    fn read(&self, kind: IndexKind) -> Result<Option<String>> {
        let path = self.dir.join(kind.artifact_name());
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(IndexError::Io {
                artifact: path.display().to_string(),
                source,
            }),
        }
    }

    fn locate(&self, kind: IndexKind) -> String {
        self.dir.join(kind.artifact_name()).display().to_string()
    }
}

/// Artifact text compiled into the binary.
///
/// Usually built with [`embedded_index!`](crate::embedded_index) from the
/// directory a build script emitted into.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSource {
    subclass: Option<&'static str>,
    annotation: Option<&'static str>,
}

impl EmbeddedSource {
    pub const fn new(subclass: &'static str, annotation: &'static str) -> Self {
        Self {
            subclass: Some(subclass),
            annotation: Some(annotation),
        }
    }

    /// A source where only some artifacts were built.
    pub const fn partial(subclass: Option<&'static str>, annotation: Option<&'static str>) -> Self {
        Self {
            subclass,
            annotation,
        }
    }
}

impl IndexSource for EmbeddedSource {
    fn read(&self, kind: IndexKind) -> Result<Option<String>> {
        let text = match kind {
            IndexKind::Subclass => self.subclass,
            IndexKind::Annotation => self.annotation,
        };
        Ok(text.map(str::to_string))
    }

    fn locate(&self, kind: IndexKind) -> String {
        format!("embedded {}", kind.artifact_name())
    }
}

/// Embeds both artifacts from a directory known at compile time.
///
/// ```rust,ignore
/// static SOURCE: typeindex_runtime::EmbeddedSource =
///     typeindex_runtime::embedded_index!(concat!(env!("OUT_DIR"), "/typeindex"));
/// ```
#[macro_export]
macro_rules! embedded_index {
    ($dir:expr) => {
        $crate::EmbeddedSource::new(
            include_str!(concat!($dir, "/SubclassIndex.json")),
            include_str!(concat!($dir, "/AnnotationIndex.json")),
        )
    };
}

/// Both index tables as loaded at runtime. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedIndex {
    pub subclasses: IndexTable,
    pub annotations: IndexTable,
}

impl LoadedIndex {
    pub fn table(&self, kind: IndexKind) -> &IndexTable {
        match kind {
            IndexKind::Subclass => &self.subclasses,
            IndexKind::Annotation => &self.annotations,
        }
    }
}

/// Loads both artifacts on first use and keeps them for the life of the
/// loader. A failed load is retried on the next call.
pub struct IndexLoader {
    source: Box<dyn IndexSource>,
    cache: OnceCell<Arc<LoadedIndex>>,
}

impl IndexLoader {
    pub fn new(source: impl IndexSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            cache: OnceCell::new(),
        }
    }

    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(DirectorySource::new(dir))
    }

    /// The loaded index, reading the artifacts if this is the first call.
    pub fn get(&self) -> Result<Arc<LoadedIndex>> {
        self.cache
            .get_or_try_init(|| self.load().map(Arc::new))
            .map(Arc::clone)
    }

    /// Names recorded under `qualified_name` in the `kind` table, exactly as
    /// persisted. Nothing is resolved or re-checked.
    pub fn names_of(&self, kind: IndexKind, qualified_name: &str) -> Result<BTreeSet<String>> {
        let index = self.get()?;
        Ok(index
            .table(kind)
            .get(qualified_name)
            .cloned()
            .unwrap_or_default())
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some()
    }

    fn load(&self) -> Result<LoadedIndex> {
        let subclasses = self.load_table(IndexKind::Subclass)?;
        let annotations = self.load_table(IndexKind::Annotation)?;
        debug!(
            "loaded {} subclass keys and {} annotation keys",
            subclasses.len(),
            annotations.len()
        );
        Ok(LoadedIndex {
            subclasses,
            annotations,
        })
    }

    fn load_table(&self, kind: IndexKind) -> Result<IndexTable> {
        let artifact = self.source.locate(kind);
        let Some(content) = self.source.read(kind)? else {
            return Err(IndexError::NotBuilt { kind, artifact });
        };
        let parsed = IndexArtifact::from_json(&content).map_err(|err| IndexError::Malformed {
            kind,
            artifact: artifact.clone(),
            reason: err.to_string(),
        })?;
        if parsed.kind != kind {
            return Err(IndexError::Malformed {
                kind,
                artifact,
                reason: format!("artifact holds the {} instead", parsed.kind),
            });
        }
        Ok(parsed.entries)
    }
}

impl fmt::Debug for IndexLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexLoader")
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}
