use crate::error::ScanDiagnostic;
use crate::registry::TargetRegistry;
use crate::registry::TargetSource;
use crate::walker::HierarchyWalker;
use crate::walker::WalkEvent;
use std::marker::PhantomData;
use tracing::debug;
use tracing::warn;
use typeindex_model::IndexTable;
use typeindex_model::TypeDescriptor;

/// The two accumulated mappings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexTables {
    /// Indexed supertype to every type extending it
    pub subclasses: IndexTable,
    /// Indexed annotation to every type carrying it
    pub annotations: IndexTable,
}

impl IndexTables {
    pub fn is_empty(&self) -> bool {
        self.subclasses.is_empty() && self.annotations.is_empty()
    }
}

/// Statistics about one scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub types_visited: usize,
    pub types_skipped: usize,
    pub relationships_recorded: usize,
    pub diagnostics: usize,
}

#[derive(Debug, Default)]
struct Accumulator {
    tables: IndexTables,
    diagnostics: Vec<ScanDiagnostic>,
    stats: ScanStats,
}

impl Accumulator {
    fn record_subclass(&mut self, supertype: String, subtype: &str) {
        if put(&mut self.tables.subclasses, supertype, subtype) {
            self.stats.relationships_recorded += 1;
        }
    }

    fn record_annotation(&mut self, annotation: String, annotated: &str) {
        if put(&mut self.tables.annotations, annotation, annotated) {
            self.stats.relationships_recorded += 1;
        }
    }

    /// Records `diagnostic` unless an identical one is already pending. A
    /// failing ancestor reached along several paths of the same root is
    /// reported once.
    fn report(&mut self, diagnostic: ScanDiagnostic) {
        if self.diagnostics.contains(&diagnostic) {
            return;
        }
        warn!("{diagnostic}");
        self.stats.diagnostics += 1;
        self.diagnostics.push(diagnostic);
    }
}

fn put(table: &mut IndexTable, key: String, value: &str) -> bool {
    table.entry(key).or_default().insert(value.to_string())
}

/// Accumulates the subclass and annotation indexes across compilation
/// rounds.
pub struct IndexBuilder<T> {
    registry: TargetRegistry,
    walker: HierarchyWalker,
    acc: Accumulator,
    _types: PhantomData<fn(&T)>,
}

impl<T: TypeDescriptor> IndexBuilder<T> {
    pub fn new(registry: TargetRegistry) -> Self {
        let walker = HierarchyWalker::new(registry.markers().inherited.clone());
        Self {
            registry,
            walker,
            acc: Accumulator::default(),
            _types: PhantomData,
        }
    }

    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    pub fn tables(&self) -> &IndexTables {
        &self.acc.tables
    }

    pub fn into_tables(self) -> IndexTables {
        self.acc.tables
    }

    /// Scans the root types of one round and returns what this round added.
    pub fn scan_round(&mut self, roots: &[T]) -> ScanStats {
        let before = self.acc.stats.clone();
        for root in roots {
            self.scan_root(root);
        }
        let after = &self.acc.stats;
        ScanStats {
            types_visited: after.types_visited - before.types_visited,
            types_skipped: after.types_skipped - before.types_skipped,
            relationships_recorded: after.relationships_recorded - before.relationships_recorded,
            diagnostics: after.diagnostics - before.diagnostics,
        }
    }

    /// Scans `root` and every type declared inside it.
    pub fn scan_root(&mut self, root: &T) {
        self.scan_type(root);
        for nested in root.nested_types() {
            self.scan_root(&nested);
        }
    }

    /// Diagnostics reported since the last call.
    pub fn take_diagnostics(&mut self) -> Vec<ScanDiagnostic> {
        std::mem::take(&mut self.acc.diagnostics)
    }

    fn scan_type(&mut self, ty: &T) {
        self.acc.stats.types_visited += 1;
        let Some(name) = ty.qualified_name() else {
            debug!("skipping {ty:?}: no stable qualified name");
            self.acc.stats.types_skipped += 1;
            return;
        };

        self.index_own_annotations(ty, &name);
        self.index_supertypes(ty, &name);
    }

    fn index_own_annotations(&mut self, ty: &T, name: &str) {
        let annotations = match ty.annotations() {
            Ok(annotations) => annotations,
            Err(source) => {
                self.acc.report(ScanDiagnostic::AnnotationIntrospection {
                    root: name.to_string(),
                    target: name.to_string(),
                    source,
                });
                return;
            }
        };
        for annotation in &annotations {
            let Some(annotation_name) = annotation.qualified_name() else {
                continue;
            };
            match self.registry.indexes_annotation(annotation, &annotation_name) {
                Ok(true) => self.acc.record_annotation(annotation_name, name),
                Ok(false) => {}
                Err(source) => self.acc.report(ScanDiagnostic::AnnotationIntrospection {
                    root: name.to_string(),
                    target: annotation_name,
                    source,
                }),
            }
        }
    }

    fn index_supertypes(&mut self, root: &T, name: &str) {
        let registry = &self.registry;
        let walker = &self.walker;
        let acc = &mut self.acc;
        walker.walk(root, &mut |event| match event {
            WalkEvent::Ancestor { ancestor, .. } => {
                record_ancestor(registry, walker, acc, ancestor, name);
            }
            WalkEvent::Unresolved { at, error, .. } => {
                acc.report(ScanDiagnostic::AncestorUnresolved {
                    root: name.to_string(),
                    at: at.display_name(),
                    source: error,
                });
            }
        });
    }
}

fn record_ancestor<T: TypeDescriptor>(
    registry: &TargetRegistry,
    walker: &HierarchyWalker,
    acc: &mut Accumulator,
    ancestor: &T,
    root_name: &str,
) {
    let Some(ancestor_name) = ancestor.qualified_name() else {
        return;
    };

    match registry.indexes_subclasses(ancestor, &ancestor_name) {
        Ok(true) => acc.record_subclass(ancestor_name.clone(), root_name),
        Ok(false) => {}
        Err(source) => acc.report(ScanDiagnostic::AnnotationIntrospection {
            root: root_name.to_string(),
            target: ancestor_name.clone(),
            source,
        }),
    }

    let annotations = match ancestor.annotations() {
        Ok(annotations) => annotations,
        Err(source) => {
            acc.report(ScanDiagnostic::AnnotationIntrospection {
                root: root_name.to_string(),
                target: ancestor_name,
                source,
            });
            return;
        }
    };
    for annotation in &annotations {
        let Some(annotation_name) = annotation.qualified_name() else {
            continue;
        };
        let indexed = walker.is_inheritable(annotation).and_then(|inheritable| {
            if inheritable {
                registry.indexes_annotation(annotation, &annotation_name)
            } else {
                Ok(false)
            }
        });
        match indexed {
            Ok(true) => acc.record_annotation(annotation_name, root_name),
            Ok(false) => {}
            Err(source) => acc.report(ScanDiagnostic::AnnotationIntrospection {
                root: root_name.to_string(),
                target: annotation_name,
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ExplicitTargets;
    use crate::registry::MarkerTargets;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;
    use typeindex_model::TypeDecl;
    use typeindex_model::TypeGraph;
    use typeindex_model::TypeRef;

    fn markers() -> Vec<TypeDecl> {
        vec![
            TypeDecl::annotation("typeindex.IndexSubclasses"),
            TypeDecl::annotation("typeindex.IndexAnnotated"),
            TypeDecl::annotation("typeindex.Inherited"),
        ]
    }

    fn scan(graph: &TypeGraph, registry: TargetRegistry) -> IndexBuilder<TypeRef> {
        let mut builder = IndexBuilder::new(registry);
        for round in graph.rounds() {
            builder.scan_round(&round);
        }
        builder
    }

    fn names(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn indexes_transitive_subclasses() {
        let mut types = markers();
        types.extend([
            TypeDecl::class("pkg.A").annotated("typeindex.IndexSubclasses"),
            TypeDecl::class("pkg.B").extends("pkg.A"),
            TypeDecl::class("pkg.C").extends("pkg.B"),
        ]);
        let graph = TypeGraph::from_types(types).unwrap();
        let builder = scan(&graph, TargetRegistry::default());
        assert_eq!(
            builder.tables().subclasses.get("pkg.A"),
            Some(&names(&["pkg.B", "pkg.C"]))
        );
        // The root itself is not its own subclass.
        assert!(!builder.tables().subclasses.contains_key("pkg.B"));
    }

    #[test]
    fn only_inheritable_annotations_propagate() {
        let mut types = markers();
        types.extend([
            TypeDecl::annotation("pkg.X")
                .annotated("typeindex.IndexAnnotated")
                .annotated("typeindex.Inherited"),
            TypeDecl::annotation("pkg.Y").annotated("typeindex.IndexAnnotated"),
            TypeDecl::class("pkg.A").annotated("pkg.X").annotated("pkg.Y"),
            TypeDecl::class("pkg.B").extends("pkg.A"),
        ]);
        let graph = TypeGraph::from_types(types).unwrap();
        let tables = scan(&graph, TargetRegistry::default()).into_tables();
        assert_eq!(tables.annotations.get("pkg.X"), Some(&names(&["pkg.A", "pkg.B"])));
        assert_eq!(tables.annotations.get("pkg.Y"), Some(&names(&["pkg.A"])));
    }

    #[test]
    fn explicit_targets_index_unmarked_types() {
        let mut types = markers();
        types.extend([
            TypeDecl::class("java.lang.Exception"),
            TypeDecl::annotation("pkg.Given"),
            TypeDecl::class("pkg.MyException")
                .extends("java.lang.Exception")
                .annotated("pkg.Given"),
        ]);
        let graph = TypeGraph::from_types(types).unwrap();
        let mut explicit = ExplicitTargets::default();
        explicit.add_class("java.lang.Exception");
        explicit.add_annotation("pkg.Given");
        let registry = TargetRegistry::new(explicit, MarkerTargets::default());
        let tables = scan(&graph, registry).into_tables();
        assert_eq!(
            tables.subclasses.get("java.lang.Exception"),
            Some(&names(&["pkg.MyException"]))
        );
        assert_eq!(tables.annotations.get("pkg.Given"), Some(&names(&["pkg.MyException"])));
    }

    #[test]
    fn nested_types_are_indexed_under_dotted_names() {
        let mut types = markers();
        types.extend([
            TypeDecl::interface("pkg.Service").annotated("typeindex.IndexSubclasses"),
            TypeDecl::class("pkg.Outer"),
            TypeDecl::class("InnerService")
                .member_of("pkg.Outer")
                .extends("pkg.Service"),
            TypeDecl::class("Local").local_in("pkg.Outer").extends("pkg.Service"),
            TypeDecl::class("anon")
                .anonymous_in("pkg.Outer", 1)
                .extends("pkg.Service"),
        ]);
        let graph = TypeGraph::from_types(types).unwrap();
        let mut builder = scan(&graph, TargetRegistry::default());
        assert_eq!(
            builder.tables().subclasses.get("pkg.Service"),
            Some(&names(&["pkg.Outer.InnerService"]))
        );
        assert!(builder.take_diagnostics().is_empty());
    }

    #[test]
    fn unresolved_ancestor_is_isolated_to_its_root() {
        let mut types = markers();
        types.extend([
            TypeDecl::class("pkg.A").annotated("typeindex.IndexSubclasses"),
            TypeDecl::class("pkg.Broken").extends("pkg.Missing").extends("pkg.A"),
            TypeDecl::class("pkg.Fine").extends("pkg.A"),
        ]);
        let graph = TypeGraph::from_types(types).unwrap();
        let mut builder = IndexBuilder::new(TargetRegistry::default());
        let stats = builder.scan_round(&graph.top_level());
        assert_eq!(stats.diagnostics, 1);
        assert_eq!(
            builder.tables().subclasses.get("pkg.A"),
            Some(&names(&["pkg.Fine"]))
        );
        let diagnostics = builder.take_diagnostics();
        assert!(matches!(
            &diagnostics[0],
            ScanDiagnostic::AncestorUnresolved { root, .. } if root == "pkg.Broken"
        ));
    }

    #[test]
    fn diamond_over_an_unresolved_ancestor_reports_once() {
        let mut types = markers();
        types.extend([
            TypeDecl::interface("pkg.L").extends("pkg.Missing"),
            TypeDecl::interface("pkg.M").extends("pkg.L"),
            TypeDecl::interface("pkg.N").extends("pkg.L"),
            TypeDecl::class("pkg.R").extends("pkg.M").extends("pkg.N"),
        ]);
        let graph = TypeGraph::from_types(types).unwrap();
        let root = graph.get("pkg.R").unwrap();
        let mut builder = IndexBuilder::new(TargetRegistry::default());
        let stats = builder.scan_round(std::slice::from_ref(&root));
        assert_eq!(stats.diagnostics, 1);
        let diagnostics = builder.take_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            &diagnostics[0],
            ScanDiagnostic::AncestorUnresolved { root, at, .. } if root == "pkg.R" && at == "pkg.L"
        ));

        // Each root still gets its own report.
        let stats = builder.scan_round(&graph.top_level());
        assert_eq!(stats.diagnostics, 4);
    }

    #[test]
    fn restricted_root_keeps_its_subclass_entry() {
        let mut types = markers();
        types.extend([
            TypeDecl::class("pkg.Base").annotated("typeindex.IndexSubclasses"),
            TypeDecl::class("pkg.Hidden").extends("pkg.Base").restricted(),
        ]);
        let graph = TypeGraph::from_types(types).unwrap();
        let hidden = graph.get("pkg.Hidden").unwrap();
        let mut builder = IndexBuilder::new(TargetRegistry::default());
        let stats = builder.scan_round(std::slice::from_ref(&hidden));
        assert_eq!(stats.diagnostics, 1);
        assert!(matches!(
            &builder.take_diagnostics()[0],
            ScanDiagnostic::AnnotationIntrospection { root, target, .. }
                if root == "pkg.Hidden" && target == "pkg.Hidden"
        ));
        assert_eq!(
            builder.tables().subclasses.get("pkg.Base"),
            Some(&names(&["pkg.Hidden"]))
        );
        assert!(builder.tables().annotations.is_empty());
    }

    #[test]
    fn restricted_ancestor_drops_only_its_own_facts() {
        let mut types = markers();
        types.extend([
            TypeDecl::annotation("pkg.X")
                .annotated("typeindex.IndexAnnotated")
                .annotated("typeindex.Inherited"),
            TypeDecl::class("pkg.Base").annotated("typeindex.IndexSubclasses"),
            TypeDecl::class("pkg.Mid")
                .extends("pkg.Base")
                .annotated("pkg.X")
                .annotated("typeindex.IndexSubclasses")
                .restricted(),
            TypeDecl::class("pkg.Leaf").extends("pkg.Mid"),
        ]);
        let graph = TypeGraph::from_types(types).unwrap();
        let leaf = graph.get("pkg.Leaf").unwrap();
        let mut builder = IndexBuilder::new(TargetRegistry::default());
        let stats = builder.scan_round(std::slice::from_ref(&leaf));

        // The marker check and the annotation walk fail the same way on Mid.
        assert_eq!(stats.diagnostics, 1);
        assert!(matches!(
            &builder.take_diagnostics()[0],
            ScanDiagnostic::AnnotationIntrospection { root, target, .. }
                if root == "pkg.Leaf" && target == "pkg.Mid"
        ));
        assert_eq!(
            builder.tables().subclasses.get("pkg.Base"),
            Some(&names(&["pkg.Leaf"]))
        );
        assert!(!builder.tables().subclasses.contains_key("pkg.Mid"));
        assert!(!builder.tables().annotations.contains_key("pkg.X"));
    }

    #[test]
    fn rescanning_a_root_does_not_duplicate() {
        let mut types = markers();
        types.extend([
            TypeDecl::annotation("pkg.Component").annotated("typeindex.IndexAnnotated"),
            TypeDecl::class("pkg.FirstComponent").annotated("pkg.Component"),
        ]);
        let graph = TypeGraph::from_types(types).unwrap();
        let first = graph.get("pkg.FirstComponent").unwrap();
        let mut builder = IndexBuilder::new(TargetRegistry::default());
        let stats = builder.scan_round(std::slice::from_ref(&first));
        assert_eq!(stats.relationships_recorded, 1);
        let stats = builder.scan_round(std::slice::from_ref(&first));
        assert_eq!(stats.relationships_recorded, 0);
        assert_eq!(
            builder.tables().annotations.get("pkg.Component"),
            Some(&names(&["pkg.FirstComponent"]))
        );
    }

    #[test]
    fn unrelated_types_leave_no_entries() {
        let mut types = markers();
        types.push(TypeDecl::class("pkg.Lonely"));
        let graph = TypeGraph::from_types(types).unwrap();
        let builder = scan(&graph, TargetRegistry::default());
        assert!(builder.tables().is_empty());
    }
}
