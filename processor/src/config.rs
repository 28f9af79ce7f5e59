use crate::error::ProcessorError;
use crate::error::Result;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// Qualified names of the author-facing marker annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerNames {
    /// Placed on a type to index everything that extends it
    #[serde(default = "default_index_subclasses")]
    pub index_subclasses: String,

    /// Placed on an annotation to index everything it is applied to
    #[serde(default = "default_index_annotated")]
    pub index_annotated: String,

    /// Placed on an annotation to propagate it to subclasses
    #[serde(default = "default_inherited")]
    pub inherited: String,
}

fn default_index_subclasses() -> String {
    "typeindex.IndexSubclasses".to_string()
}

fn default_index_annotated() -> String {
    "typeindex.IndexAnnotated".to_string()
}

fn default_inherited() -> String {
    "typeindex.Inherited".to_string()
}

impl Default for MarkerNames {
    fn default() -> Self {
        Self {
            index_subclasses: default_index_subclasses(),
            index_annotated: default_index_annotated(),
            inherited: default_inherited(),
        }
    }
}

/// Build parameters of the scanner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Whitespace-separated annotation names indexed without a marker
    #[serde(default)]
    pub annotation_targets: String,

    /// Whitespace-separated superclass/interface names indexed without a marker
    #[serde(default)]
    pub superclass_targets: String,

    /// Directory receiving the persisted artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub markers: MarkerNames,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("typeindex")
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            annotation_targets: String::new(),
            superclass_targets: String::new(),
            output_dir: default_output_dir(),
            markers: MarkerNames::default(),
        }
    }
}

impl ProcessorConfig {
    pub const ANNOTATION_TARGETS_OPTION: &'static str = "typeindex.annotation-targets";
    pub const SUPERCLASS_TARGETS_OPTION: &'static str = "typeindex.superclass-targets";
    pub const OUTPUT_DIR_OPTION: &'static str = "typeindex.output-dir";

    /// Builds a config from processor options passed by the build tool.
    /// Missing keys keep their defaults.
    pub fn from_options(options: &HashMap<String, String>) -> Self {
        let mut config = Self::default();
        if let Some(targets) = options.get(Self::ANNOTATION_TARGETS_OPTION) {
            config.annotation_targets = targets.clone();
        }
        if let Some(targets) = options.get(Self::SUPERCLASS_TARGETS_OPTION) {
            config.superclass_targets = targets.clone();
        }
        if let Some(dir) = options.get(Self::OUTPUT_DIR_OPTION) {
            config.output_dir = PathBuf::from(dir);
        }
        config
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn annotation_target_names(&self) -> BTreeSet<String> {
        split_names(&self.annotation_targets)
    }

    pub fn superclass_target_names(&self) -> BTreeSet<String> {
        split_names(&self.superclass_targets)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(ProcessorError::Config(
                "Output directory must not be empty".to_string(),
            ));
        }

        let markers = [
            &self.markers.index_subclasses,
            &self.markers.index_annotated,
            &self.markers.inherited,
        ];
        if markers.iter().any(|name| name.trim().is_empty()) {
            return Err(ProcessorError::Config(
                "Marker annotation names must not be empty".to_string(),
            ));
        }
        let distinct: BTreeSet<&String> = markers.into_iter().collect();
        if distinct.len() != 3 {
            return Err(ProcessorError::Config(
                "Marker annotation names must be distinct".to_string(),
            ));
        }

        Ok(())
    }
}

fn split_names(list: &str) -> BTreeSet<String> {
    list.split_whitespace().map(ToString::to_string).collect()
}
