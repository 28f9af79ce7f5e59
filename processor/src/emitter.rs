use crate::builder::IndexTables;
use crate::error::ProcessorError;
use crate::error::Result;
use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use tracing::info;
use typeindex_model::IndexArtifact;
use typeindex_model::IndexKind;
use typeindex_model::IndexTable;

/// Writes the persisted artifacts, one file per index kind.
#[derive(Debug, Clone)]
pub struct IndexEmitter {
    output_dir: PathBuf,
}

impl IndexEmitter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn artifact_path(&self, kind: IndexKind) -> PathBuf {
        self.output_dir.join(kind.artifact_name())
    }

    /// Exact bytes that [`IndexEmitter::emit`] writes for `kind`.
    pub fn render(kind: IndexKind, table: &IndexTable) -> Result<String> {
        Ok(IndexArtifact::new(kind, table.clone()).to_json()?)
    }

    /// Writes both artifacts and returns their paths.
    pub fn emit(&self, tables: &IndexTables) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir).map_err(|source| ProcessorError::Emission {
            path: self.output_dir.clone(),
            source,
        })?;

        let mut written = Vec::with_capacity(IndexKind::ALL.len());
        for kind in IndexKind::ALL {
            let table = match kind {
                IndexKind::Subclass => &tables.subclasses,
                IndexKind::Annotation => &tables.annotations,
            };
            let rendered = Self::render(kind, table)?;
            let path = self.artifact_path(kind);
            write_atomic(&path, rendered.as_bytes())?;
            info!("wrote {kind} with {} entries to {path:?}", table.len());
            written.push(path);
        }
        Ok(written)
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    let written = write_then_rename(&tmp_path, path, data);
    if written.is_err() {
        // No partial artifact may outlive a failed write.
        let _ = fs::remove_file(&tmp_path);
    }
    written.map_err(|source| ProcessorError::Emission {
        path: path.to_path_buf(),
        source,
    })
}

fn write_then_rename(tmp_path: &Path, path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);
    fs::rename(tmp_path, path)
}
