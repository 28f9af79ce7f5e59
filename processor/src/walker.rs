use crate::registry::carries;
use typeindex_model::IntrospectionError;
use typeindex_model::TypeDescriptor;

/// Reported to the caller for every step of a walk.
#[derive(Debug)]
pub enum WalkEvent<'a, T> {
    /// `ancestor` is a transitive supertype of `root`.
    Ancestor { root: &'a T, ancestor: &'a T },
    /// The supertypes of `at` could not be listed; the walk does not go past
    /// it but continues with sibling branches.
    Unresolved {
        root: &'a T,
        at: &'a T,
        error: IntrospectionError,
    },
}

/// Depth-first walk over declared supertypes.
///
/// There is no visited set: the host type system forbids inheritance cycles,
/// so recursion is bounded by the depth of the hierarchy. A host that cannot
/// guarantee this has to reject cycles before handing types over.
#[derive(Debug, Clone)]
pub struct HierarchyWalker {
    inherited_marker: String,
}

impl HierarchyWalker {
    pub fn new(inherited_marker: impl Into<String>) -> Self {
        Self {
            inherited_marker: inherited_marker.into(),
        }
    }

    pub fn direct_supertypes<T: TypeDescriptor>(&self, ty: &T) -> Result<Vec<T>, IntrospectionError> {
        ty.direct_supertypes()
    }

    /// Whether `annotation` propagates to subclasses of the types it is
    /// applied to.
    pub fn is_inheritable<T: TypeDescriptor>(&self, annotation: &T) -> Result<bool, IntrospectionError> {
        carries(annotation, &self.inherited_marker)
    }

    pub fn walk<T, F>(&self, root: &T, visit: &mut F)
    where
        T: TypeDescriptor,
        F: FnMut(WalkEvent<'_, T>),
    {
        self.descend(root, root, visit);
    }

    fn descend<T, F>(&self, root: &T, ty: &T, visit: &mut F)
    where
        T: TypeDescriptor,
        F: FnMut(WalkEvent<'_, T>),
    {
        let supertypes = match self.direct_supertypes(ty) {
            Ok(supertypes) => supertypes,
            Err(error) => {
                visit(WalkEvent::Unresolved { root, at: ty, error });
                return;
            }
        };
        for supertype in &supertypes {
            visit(WalkEvent::Ancestor {
                root,
                ancestor: supertype,
            });
            self.descend(root, supertype, visit);
        }
    }
}
