use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::thread;
use tempfile::TempDir;
use typeindex_model::IndexKind;
use typeindex_model::Modifiers;
use typeindex_model::TypeDecl;
use typeindex_model::TypeGraph;
use typeindex_model::TypeManifest;
use typeindex_model::TypeRef;
use typeindex_processor::Processor;
use typeindex_processor::ProcessorConfig;
use typeindex_runtime::DirectorySource;
use typeindex_runtime::IndexError;
use typeindex_runtime::IndexLoader;
use typeindex_runtime::IndexSource;
use typeindex_runtime::QueryFacade;

const TYPES: &str = include_str!("../../testdata/types.json");

fn index_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../testdata/index")
}

fn fixture() -> (TypeGraph, QueryFacade<TypeGraph>) {
    let graph = TypeGraph::from_json(TYPES).unwrap();
    let facade = QueryFacade::new(IndexLoader::from_dir(index_dir()), graph.clone());
    (graph, facade)
}

fn get(graph: &TypeGraph, name: &str) -> TypeRef {
    graph.lookup(name).unwrap()
}

fn names(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(ToString::to_string).collect()
}

fn scan(rounds: Vec<Vec<TypeRef>>, out: &Path) {
    let mut processor = Processor::new(ProcessorConfig {
        output_dir: out.to_path_buf(),
        ..Default::default()
    })
    .unwrap();
    let reports = processor.process_all(rounds).unwrap();
    assert!(reports.iter().all(|report| report.diagnostics.is_empty()));
}

fn markers() -> Vec<TypeDecl> {
    vec![
        TypeDecl::annotation("typeindex.IndexSubclasses"),
        TypeDecl::annotation("typeindex.IndexAnnotated"),
    ]
}

#[test]
fn service_subclasses_round_trip_through_the_index() {
    let dir = TempDir::new().unwrap();
    let mut types = markers();
    types.extend([
        TypeDecl::interface("pkg.Service").annotated("typeindex.IndexSubclasses"),
        TypeDecl::class("pkg.SecondService").extends("pkg.Service"),
    ]);
    let graph = TypeGraph::from_types(types).unwrap();
    scan(graph.rounds(), dir.path());

    let facade = QueryFacade::new(IndexLoader::from_dir(dir.path()), graph.clone());
    let service = get(&graph, "pkg.Service");
    let subclasses = facade.subclasses_of(&service).unwrap();
    assert_eq!(
        subclasses.into_set(),
        BTreeSet::from([get(&graph, "pkg.SecondService")])
    );
    assert_eq!(
        facade.subclass_names_of("pkg.Service").unwrap(),
        names(&["pkg.SecondService"])
    );
}

#[test]
fn rescanning_adds_new_components_without_duplicates() {
    let first_dir = TempDir::new().unwrap();
    let mut types = markers();
    types.extend([
        TypeDecl::annotation("pkg.Component").annotated("typeindex.IndexAnnotated"),
        TypeDecl::class("pkg.FirstComponent").annotated("pkg.Component"),
    ]);
    let graph = TypeGraph::from_types(types.clone()).unwrap();
    scan(graph.rounds(), first_dir.path());

    let facade = QueryFacade::new(IndexLoader::from_dir(first_dir.path()), graph.clone());
    let component = get(&graph, "pkg.Component");
    assert_eq!(
        facade.annotated_with(&component).unwrap().qualified_names(),
        vec!["pkg.FirstComponent"]
    );

    let second_dir = TempDir::new().unwrap();
    types.push(TypeDecl::class("pkg.SecondComponent").annotated("pkg.Component"));
    let graph = TypeGraph::from_types(types).unwrap();
    let rounds = vec![graph.top_level(), vec![get(&graph, "pkg.FirstComponent")]];
    scan(rounds, second_dir.path());

    let facade = QueryFacade::new(IndexLoader::from_dir(second_dir.path()), graph.clone());
    let component = get(&graph, "pkg.Component");
    assert_eq!(
        facade.annotated_with(&component).unwrap().qualified_names(),
        vec!["pkg.FirstComponent", "pkg.SecondComponent"]
    );
    assert_eq!(facade.annotated_names_of("pkg.Component").unwrap().len(), 2);
}

#[test]
fn subclass_queries_cover_markers_options_and_nesting() {
    let (graph, facade) = fixture();

    let services = facade.subclasses_of(&get(&graph, "pkg.Service")).unwrap();
    assert_eq!(
        services.qualified_names(),
        vec!["pkg.InnerClasses.InnerService", "pkg.SecondService"]
    );
    assert_eq!(
        services.with_modifiers(Modifiers::STATIC).simple_names(),
        vec!["InnerService"]
    );
    let members: Vec<String> = services.members().into_iter().map(|m| m.name).collect();
    assert_eq!(members, vec!["start", "name"]);

    let klasses = facade
        .subclasses_of(&get(&graph, "pkg.GivenAbstractKlass"))
        .unwrap();
    assert_eq!(klasses.qualified_names(), vec!["pkg.GivenKlass", "pkg.InnerClasses"]);
    assert_eq!(klasses.sealed().qualified_names(), vec!["pkg.InnerClasses"]);
    assert_eq!(klasses.sealed().bound(), None);
    assert_eq!(klasses.abstract_types(), klasses.sealed());

    let exceptions = facade
        .subclasses_of(&get(&graph, "java.lang.Exception"))
        .unwrap();
    assert_eq!(exceptions.qualified_names(), vec!["pkg.InnerClasses.MyException"]);
    assert!(exceptions.with_public_default_constructor().is_empty());
}

#[test]
fn annotated_components_filter_by_enclosure_and_structure() {
    let (graph, facade) = fixture();
    let inner_classes = get(&graph, "pkg.InnerClasses");
    let components = facade
        .annotated_with(&get(&graph, "pkg.Component"))
        .unwrap();

    assert_eq!(
        components.top_level().qualified_names(),
        vec!["pkg.FirstComponent", "pkg.SecondComponent"]
    );
    assert_eq!(
        components.enclosed_in(&inner_classes).qualified_names(),
        vec![
            "pkg.InnerClasses.InnerComponent",
            "pkg.InnerClasses.InnerComponent.InnerInnerComponent",
        ]
    );
    assert_eq!(
        components.enclosed_directly_in(&inner_classes).qualified_names(),
        vec!["pkg.InnerClasses.InnerComponent"]
    );
    assert_eq!(
        components.top_level_or_static_nested().simple_names(),
        vec!["FirstComponent", "InnerComponent", "SecondComponent"]
    );
    assert_eq!(
        components.with_public_default_constructor().qualified_names(),
        vec!["pkg.FirstComponent"]
    );
    assert_eq!(
        components
            .annotated_with(&get(&graph, "pkg.MeaninglessAnnotation"))
            .unwrap()
            .qualified_names(),
        vec!["pkg.SecondComponent"]
    );
    assert_eq!(
        components.companion_objects(),
        vec![get(&graph, "pkg.InnerClasses.InnerComponent.Companion")]
    );
    assert_eq!(
        components.sealed().nested().qualified_names(),
        vec![
            "pkg.InnerClasses.InnerComponent.Companion",
            "pkg.InnerClasses.InnerComponent.InnerInnerComponent",
        ]
    );
}

#[test]
fn binary_retained_annotation_is_an_invalid_filter() {
    let (graph, facade) = fixture();
    let components = facade
        .annotated_with(&get(&graph, "pkg.Component"))
        .unwrap();
    let err = components
        .annotated_with(&get(&graph, "pkg.GivenAnnotation"))
        .unwrap_err();
    assert!(matches!(err, IndexError::InvalidFilter { .. }));
    assert!(err.to_string().contains("pkg.GivenAnnotation"));

    // The index itself still answers for build-time-only annotations.
    let given = facade
        .annotated_with(&get(&graph, "pkg.GivenAnnotation"))
        .unwrap();
    assert_eq!(given.qualified_names(), vec!["pkg.FirstComponent", "pkg.GivenKlass"]);
}

#[test]
fn objects_project_singletons() {
    let (graph, facade) = fixture();
    let annotated = facade
        .annotated_with(&get(&graph, "pkg.AnotherGivenAnnotation"))
        .unwrap();
    assert_eq!(annotated.objects(), vec![get(&graph, "pkg.AnotherGivenKlass")]);
    assert_eq!(
        facade.annotated_names_of("pkg.InheritedAnnotation").unwrap(),
        names(&[
            "pkg.InnerClasses.InnerService",
            "pkg.SecondService",
            "pkg.Service",
        ])
    );
}

#[test]
fn stale_entries_are_dropped_by_the_subtype_check() {
    let mut manifest = TypeManifest::from_json(TYPES).unwrap();
    for decl in &mut manifest.types {
        if decl.id == "pkg.SecondService" {
            decl.supertypes.clear();
        }
    }
    manifest.types.retain(|decl| decl.id != "pkg.InnerClasses$MyException");
    let graph = TypeGraph::from_manifest(manifest).unwrap();
    let facade = QueryFacade::new(IndexLoader::from_dir(index_dir()), graph.clone());

    let services = facade.subclasses_of(&get(&graph, "pkg.Service")).unwrap();
    assert_eq!(services.qualified_names(), vec!["pkg.InnerClasses.InnerService"]);
    let exceptions = facade
        .subclasses_of(&get(&graph, "java.lang.Exception"))
        .unwrap();
    assert!(exceptions.is_empty());
    assert_eq!(
        facade.subclass_names_of("pkg.Service").unwrap().len(),
        2,
        "raw names are not re-checked"
    );
}

#[test]
fn missing_artifacts_are_not_built() {
    let dir = TempDir::new().unwrap();
    let graph = TypeGraph::from_json(TYPES).unwrap();
    let facade = QueryFacade::new(IndexLoader::from_dir(dir.path()), graph.clone());
    let err = facade
        .subclasses_of(&get(&graph, "pkg.Service"))
        .unwrap_err();
    assert!(matches!(err, IndexError::NotBuilt { .. }));
}

/// Directory source that counts artifact reads.
struct CountingSource {
    inner: DirectorySource,
    reads: Arc<AtomicUsize>,
}

impl IndexSource for CountingSource {
    fn read(&self, kind: IndexKind) -> typeindex_runtime::Result<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read(kind)
    }

    fn locate(&self, kind: IndexKind) -> String {
        self.inner.locate(kind)
    }
}

#[test]
fn concurrent_first_queries_share_one_load() {
    let graph = TypeGraph::from_json(TYPES).unwrap();
    let reads = Arc::new(AtomicUsize::new(0));
    let loader = IndexLoader::new(CountingSource {
        inner: DirectorySource::new(index_dir()),
        reads: Arc::clone(&reads),
    });
    let facade = QueryFacade::new(loader, graph.clone());
    let service = get(&graph, "pkg.Service");
    assert!(!facade.loader().is_loaded());

    let results = thread::scope(|scope| {
        let mut handles = Vec::new();
        for _ in 0..8 {
            handles.push(scope.spawn(|| facade.subclasses_of(&service).unwrap()));
        }
        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.join().unwrap());
        }
        results
    });

    assert_eq!(reads.load(Ordering::SeqCst), 2, "one read per artifact");
    for result in &results {
        assert_eq!(
            result.qualified_names(),
            vec!["pkg.InnerClasses.InnerService", "pkg.SecondService"]
        );
    }
}
