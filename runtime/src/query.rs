use crate::error::Result;
use crate::loader::IndexLoader;
use crate::result_set::ResultSet;
use std::collections::BTreeSet;
use tracing::debug;
use typeindex_model::IndexKind;
use typeindex_model::TypeDescriptor;
use typeindex_model::TypeResolver;

/// Runtime lookups over the loaded index.
///
/// The first query loads both artifacts through the loader; later queries
/// reuse them.
#[derive(Debug)]
pub struct QueryFacade<R> {
    loader: IndexLoader,
    resolver: R,
}

impl<R: TypeResolver> QueryFacade<R> {
    pub fn new(loader: IndexLoader, resolver: R) -> Self {
        Self { loader, resolver }
    }

    pub fn loader(&self) -> &IndexLoader {
        &self.loader
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Indexed subtypes of `root`.
    ///
    /// Names that no longer resolve are dropped, and so are resolved types
    /// that are no longer subtypes of `root`, which guards against stale
    /// artifacts.
    pub fn subclasses_of(&self, root: &R::Type) -> Result<ResultSet<R::Type>> {
        let Some(name) = root.qualified_name() else {
            return Ok(ResultSet::empty());
        };
        let types = self
            .resolve_entries(IndexKind::Subclass, &name)?
            .into_iter()
            .filter(|ty| {
                let keep = ty.is_subtype_of(root);
                if !keep {
                    debug!("dropping stale subclass entry {ty:?} of {name}");
                }
                keep
            })
            .collect();
        Ok(ResultSet::bounded(types, root.clone()))
    }

    /// Indexed types carrying `annotation`. Entries are trusted as recorded
    /// at build time and are not checked against the live type.
    pub fn annotated_with(&self, annotation: &R::Type) -> Result<ResultSet<R::Type>> {
        let Some(name) = annotation.qualified_name() else {
            return Ok(ResultSet::empty());
        };
        Ok(ResultSet::new(self.resolve_entries(IndexKind::Annotation, &name)?))
    }

    pub fn subclass_names_of(&self, qualified_name: &str) -> Result<BTreeSet<String>> {
        self.loader.names_of(IndexKind::Subclass, qualified_name)
    }

    pub fn annotated_names_of(&self, qualified_name: &str) -> Result<BTreeSet<String>> {
        self.loader.names_of(IndexKind::Annotation, qualified_name)
    }

    fn resolve_entries(&self, kind: IndexKind, qualified_name: &str) -> Result<BTreeSet<R::Type>> {
        let names = self.loader.names_of(kind, qualified_name)?;
        Ok(names
            .iter()
            .filter_map(|name| {
                let resolved = self.resolver.resolve(name);
                if resolved.is_none() {
                    debug!("skipping unresolvable {kind} entry {name}");
                }
                resolved
            })
            .collect())
    }
}
