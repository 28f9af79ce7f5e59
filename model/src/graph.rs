//! In-memory host backed by a [`TypeManifest`].
//!
//! The graph is validated once at construction: unknown enclosing types,
//! duplicate names and inheritance or enclosure cycles are rejected, so
//! hierarchy walks over [`TypeRef`] always terminate.

use crate::descriptor::Member;
use crate::descriptor::NestingKind;
use crate::descriptor::Retention;
use crate::descriptor::TypeDescriptor;
use crate::descriptor::TypeResolver;
use crate::error::IntrospectionError;
use crate::error::ManifestError;
use crate::manifest::TypeDecl;
use crate::manifest::TypeKind;
use crate::manifest::TypeManifest;
use crate::modifiers::Modifiers;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering as AtomicOrdering;
use tracing::debug;

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
struct GraphInner {
    graph_id: u64,
    decls: Vec<TypeDecl>,
    qualified: Vec<Option<String>>,
    children: Vec<Vec<usize>>,
    by_id: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    rounds: Vec<Vec<usize>>,
}

impl GraphInner {
    fn find(&self, name: &str) -> Option<usize> {
        self.by_id
            .get(name)
            .or_else(|| self.by_name.get(name))
            .copied()
    }
}

#[derive(Debug, Clone)]
pub struct TypeGraph {
    inner: Arc<GraphInner>,
}

impl TypeGraph {
    pub fn from_manifest(manifest: TypeManifest) -> Result<Self, ManifestError> {
        let TypeManifest { types, rounds } = manifest;
        let types: Vec<TypeDecl> = types.into_iter().map(TypeDecl::normalized).collect();

        let mut by_id = HashMap::with_capacity(types.len());
        for (index, decl) in types.iter().enumerate() {
            if by_id.insert(decl.id.clone(), index).is_some() {
                return Err(ManifestError::DuplicateType(decl.id.clone()));
            }
        }

        let mut parents = vec![None; types.len()];
        let mut children = vec![Vec::new(); types.len()];
        for (index, decl) in types.iter().enumerate() {
            match (&decl.enclosing, decl.nesting) {
                (Some(enclosing), _) => {
                    let parent = *by_id.get(enclosing).ok_or_else(|| ManifestError::UnknownType {
                        name: decl.id.clone(),
                        role: "enclosing type",
                        target: enclosing.clone(),
                    })?;
                    parents[index] = Some(parent);
                    children[parent].push(index);
                }
                (None, NestingKind::TopLevel) => {}
                (None, _) => {
                    return Err(ManifestError::UnknownType {
                        name: decl.id.clone(),
                        role: "enclosing type",
                        target: String::new(),
                    });
                }
            }
            if let Some(companion) = &decl.companion
                && !by_id.contains_key(companion)
            {
                return Err(ManifestError::UnknownType {
                    name: decl.id.clone(),
                    role: "companion",
                    target: companion.clone(),
                });
            }
        }

        check_enclosure_acyclic(&types, &parents)?;
        check_inheritance_acyclic(&types, &by_id)?;

        let qualified: Vec<Option<String>> = (0..types.len())
            .map(|index| qualified_name_of(&types, &parents, index))
            .collect();

        let mut by_name = HashMap::new();
        for (index, name) in qualified.iter().enumerate() {
            let Some(name) = name else { continue };
            if by_name.insert(name.clone(), index).is_some() {
                return Err(ManifestError::DuplicateType(name.clone()));
            }
        }

        let rounds = if rounds.is_empty() {
            let top_level = types
                .iter()
                .enumerate()
                .filter(|(_, decl)| decl.nesting == NestingKind::TopLevel)
                .map(|(index, _)| index)
                .collect();
            vec![top_level]
        } else {
            rounds
                .into_iter()
                .map(|round| {
                    round
                        .into_iter()
                        .map(|id| {
                            by_id.get(&id).copied().ok_or_else(|| ManifestError::UnknownType {
                                name: id.clone(),
                                role: "round root",
                                target: id,
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        debug!(
            "loaded type graph with {} types in {} rounds",
            types.len(),
            rounds.len()
        );

        Ok(Self {
            inner: Arc::new(GraphInner {
                graph_id: NEXT_GRAPH_ID.fetch_add(1, AtomicOrdering::Relaxed),
                decls: types,
                qualified,
                children,
                by_id,
                by_name,
                rounds,
            }),
        })
    }

    pub fn from_types(types: Vec<TypeDecl>) -> Result<Self, ManifestError> {
        Self::from_manifest(TypeManifest::new(types))
    }

    pub fn from_json(content: &str) -> Result<Self, ManifestError> {
        Self::from_manifest(TypeManifest::from_json(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        Self::from_manifest(TypeManifest::load(path)?)
    }

    /// Looks a type up by binary id or qualified name.
    pub fn get(&self, name: &str) -> Option<TypeRef> {
        self.inner.find(name).map(|index| self.type_ref(index))
    }

    /// Looks a type up by qualified name only.
    pub fn lookup(&self, qualified_name: &str) -> Option<TypeRef> {
        self.inner
            .by_name
            .get(qualified_name)
            .map(|index| self.type_ref(*index))
    }

    pub fn types(&self) -> impl Iterator<Item = TypeRef> + '_ {
        (0..self.inner.decls.len()).map(|index| self.type_ref(index))
    }

    pub fn top_level(&self) -> Vec<TypeRef> {
        self.types()
            .filter(|ty| ty.nesting() == NestingKind::TopLevel)
            .collect()
    }

    /// Root types per compilation round.
    pub fn rounds(&self) -> Vec<Vec<TypeRef>> {
        self.inner
            .rounds
            .iter()
            .map(|round| round.iter().map(|index| self.type_ref(*index)).collect())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.decls.is_empty()
    }

    fn type_ref(&self, index: usize) -> TypeRef {
        TypeRef {
            graph: Arc::clone(&self.inner),
            index,
        }
    }
}

impl TypeResolver for TypeGraph {
    type Type = TypeRef;

    fn resolve(&self, qualified_name: &str) -> Option<TypeRef> {
        self.lookup(qualified_name)
    }
}

fn qualified_name_of(
    types: &[TypeDecl],
    parents: &[Option<usize>],
    index: usize,
) -> Option<String> {
    let decl = &types[index];
    match decl.nesting {
        NestingKind::TopLevel => Some(decl.id.clone()),
        NestingKind::Member => {
            let parent = parents[index]?;
            let enclosing = qualified_name_of(types, parents, parent)?;
            let simple = decl.derived_simple_name()?;
            Some(format!("{enclosing}.{simple}"))
        }
        NestingKind::Local | NestingKind::Anonymous => None,
    }
}

fn check_enclosure_acyclic(
    types: &[TypeDecl],
    parents: &[Option<usize>],
) -> Result<(), ManifestError> {
    for start in 0..types.len() {
        let mut current = parents[start];
        let mut steps = 0;
        while let Some(parent) = current {
            steps += 1;
            if parent == start || steps > types.len() {
                return Err(ManifestError::Cycle {
                    relation: "enclosure",
                    name: types[start].id.clone(),
                });
            }
            current = parents[parent];
        }
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

fn check_inheritance_acyclic(
    types: &[TypeDecl],
    by_id: &HashMap<String, usize>,
) -> Result<(), ManifestError> {
    fn visit(
        index: usize,
        types: &[TypeDecl],
        by_id: &HashMap<String, usize>,
        marks: &mut [Mark],
    ) -> Result<(), ManifestError> {
        match marks[index] {
            Mark::Done => return Ok(()),
            Mark::InProgress => {
                return Err(ManifestError::Cycle {
                    relation: "inheritance",
                    name: types[index].id.clone(),
                });
            }
            Mark::Unvisited => {}
        }
        marks[index] = Mark::InProgress;
        for supertype in &types[index].supertypes {
            // Unknown supertypes surface later as introspection errors.
            if let Some(next) = by_id.get(supertype) {
                visit(*next, types, by_id, marks)?;
            }
        }
        marks[index] = Mark::Done;
        Ok(())
    }

    let mut marks = vec![Mark::Unvisited; types.len()];
    for index in 0..types.len() {
        visit(index, types, by_id, &mut marks)?;
    }
    Ok(())
}

/// Handle to one declared type of a [`TypeGraph`].
#[derive(Clone)]
pub struct TypeRef {
    graph: Arc<GraphInner>,
    index: usize,
}

impl TypeRef {
    /// Host-unique binary name.
    pub fn id(&self) -> &str {
        &self.decl().id
    }

    pub fn kind(&self) -> TypeKind {
        self.decl().kind
    }

    fn decl(&self) -> &TypeDecl {
        &self.graph.decls[self.index]
    }

    fn sibling(&self, index: usize) -> TypeRef {
        TypeRef {
            graph: Arc::clone(&self.graph),
            index,
        }
    }

    fn resolve_all(&self, names: &[String]) -> Result<Vec<TypeRef>, IntrospectionError> {
        names
            .iter()
            .map(|name| {
                self.graph
                    .find(name)
                    .map(|index| self.sibling(index))
                    .ok_or_else(|| IntrospectionError::Unresolved {
                        name: name.clone(),
                        referenced_by: self.id().to_string(),
                    })
            })
            .collect()
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.graph.graph_id == other.graph.graph_id && self.index == other.index
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.graph.graph_id.hash(state);
        self.index.hash(state);
    }
}

impl PartialOrd for TypeRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id()
            .cmp(other.id())
            .then_with(|| self.graph.graph_id.cmp(&other.graph.graph_id))
            .then_with(|| self.index.cmp(&other.index))
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeRef").field(&self.id()).finish()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.graph.qualified[self.index] {
            Some(name) => f.write_str(name),
            None => f.write_str(self.id()),
        }
    }
}

impl TypeDescriptor for TypeRef {
    fn qualified_name(&self) -> Option<String> {
        self.graph.qualified[self.index].clone()
    }

    fn simple_name(&self) -> Option<String> {
        self.decl().derived_simple_name()
    }

    fn nesting(&self) -> NestingKind {
        self.decl().nesting
    }

    fn enclosing(&self) -> Option<Self> {
        let enclosing = self.decl().enclosing.as_deref()?;
        self.graph.by_id.get(enclosing).map(|index| self.sibling(*index))
    }

    fn nested_types(&self) -> Vec<Self> {
        self.graph.children[self.index]
            .iter()
            .map(|index| self.sibling(*index))
            .collect()
    }

    fn direct_supertypes(&self) -> Result<Vec<Self>, IntrospectionError> {
        self.resolve_all(&self.decl().supertypes)
    }

    fn annotations(&self) -> Result<Vec<Self>, IntrospectionError> {
        if self.decl().restricted {
            return Err(IntrospectionError::Restricted(self.id().to_string()));
        }
        self.resolve_all(&self.decl().annotations)
    }

    fn retention(&self) -> Option<Retention> {
        self.decl().retention
    }

    fn modifiers(&self) -> Modifiers {
        self.decl().modifiers
    }

    fn is_abstract(&self) -> bool {
        self.decl().modifiers.contains(Modifiers::ABSTRACT)
    }

    fn is_sealed(&self) -> bool {
        self.decl().sealed
    }

    fn public_no_arg_constructor(&self) -> Result<bool, IntrospectionError> {
        let decl = self.decl();
        if decl.restricted {
            return Err(IntrospectionError::Restricted(decl.id.clone()));
        }
        Ok(decl.constructors.iter().any(|constructor| {
            constructor.parameters.is_empty() && constructor.modifiers.contains(Modifiers::PUBLIC)
        }))
    }

    fn members(&self) -> Vec<Member> {
        self.decl().members.clone()
    }

    fn is_object(&self) -> bool {
        self.decl().kind == TypeKind::Object
    }

    fn companion(&self) -> Option<Self> {
        let companion = self.decl().companion.as_deref()?;
        self.graph.by_id.get(companion).map(|index| self.sibling(*index))
    }
}
