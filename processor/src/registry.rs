use crate::config::MarkerNames;
use crate::config::ProcessorConfig;
use std::collections::BTreeSet;
use typeindex_model::IntrospectionError;
use typeindex_model::TypeDescriptor;

/// A source of indexing targets.
pub trait TargetSource<T: TypeDescriptor> {
    /// Whether subtypes of `ty` are indexed.
    fn indexes_subclasses(&self, ty: &T, name: &str) -> Result<bool, IntrospectionError>;

    /// Whether types carrying `annotation` are indexed.
    fn indexes_annotation(&self, annotation: &T, name: &str) -> Result<bool, IntrospectionError>;
}

/// Names supplied by the build configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplicitTargets {
    pub annotations: BTreeSet<String>,
    pub classes: BTreeSet<String>,
}

impl ExplicitTargets {
    pub fn from_config(config: &ProcessorConfig) -> Self {
        Self {
            annotations: config.annotation_target_names(),
            classes: config.superclass_target_names(),
        }
    }

    pub fn add_annotation(&mut self, name: impl Into<String>) {
        self.annotations.insert(name.into());
    }

    pub fn add_class(&mut self, name: impl Into<String>) {
        self.classes.insert(name.into());
    }
}

impl<T: TypeDescriptor> TargetSource<T> for ExplicitTargets {
    fn indexes_subclasses(&self, _ty: &T, name: &str) -> Result<bool, IntrospectionError> {
        Ok(self.classes.contains(name))
    }

    fn indexes_annotation(&self, _annotation: &T, name: &str) -> Result<bool, IntrospectionError> {
        Ok(self.annotations.contains(name))
    }
}

/// Targets that describe themselves through marker annotations in source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerTargets {
    markers: MarkerNames,
}

impl MarkerTargets {
    pub fn new(markers: MarkerNames) -> Self {
        Self { markers }
    }

    pub fn markers(&self) -> &MarkerNames {
        &self.markers
    }
}

impl<T: TypeDescriptor> TargetSource<T> for MarkerTargets {
    fn indexes_subclasses(&self, ty: &T, _name: &str) -> Result<bool, IntrospectionError> {
        carries(ty, &self.markers.index_subclasses)
    }

    fn indexes_annotation(&self, annotation: &T, _name: &str) -> Result<bool, IntrospectionError> {
        carries(annotation, &self.markers.index_annotated)
    }
}

/// Whether `ty` is directly annotated with the annotation named `marker`.
pub(crate) fn carries<T: TypeDescriptor>(ty: &T, marker: &str) -> Result<bool, IntrospectionError> {
    Ok(ty
        .annotations()?
        .iter()
        .any(|annotation| annotation.qualified_name().as_deref() == Some(marker)))
}

/// Union of the explicit and marker-driven target sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetRegistry {
    explicit: ExplicitTargets,
    markers: MarkerTargets,
}

impl TargetRegistry {
    pub fn new(explicit: ExplicitTargets, markers: MarkerTargets) -> Self {
        Self { explicit, markers }
    }

    pub fn from_config(config: &ProcessorConfig) -> Self {
        Self::new(
            ExplicitTargets::from_config(config),
            MarkerTargets::new(config.markers.clone()),
        )
    }

    pub fn explicit(&self) -> &ExplicitTargets {
        &self.explicit
    }

    pub fn explicit_mut(&mut self) -> &mut ExplicitTargets {
        &mut self.explicit
    }

    pub fn markers(&self) -> &MarkerNames {
        self.markers.markers()
    }
}

impl<T: TypeDescriptor> TargetSource<T> for TargetRegistry {
    // Explicit names are checked first so registered external types never
    // need to be introspected.
    fn indexes_subclasses(&self, ty: &T, name: &str) -> Result<bool, IntrospectionError> {
        if self.explicit.indexes_subclasses(ty, name)? {
            return Ok(true);
        }
        self.markers.indexes_subclasses(ty, name)
    }

    fn indexes_annotation(&self, annotation: &T, name: &str) -> Result<bool, IntrospectionError> {
        if self.explicit.indexes_annotation(annotation, name)? {
            return Ok(true);
        }
        self.markers.indexes_annotation(annotation, name)
    }
}
