use crate::error::IndexError;
use crate::error::Result;
use std::collections::BTreeSet;
use std::collections::btree_set;
use typeindex_model::Member;
use typeindex_model::Modifiers;
use typeindex_model::Retention;
use typeindex_model::TypeDescriptor;

/// Ordered set of type handles returned by a query.
///
/// Every filter returns a new set and leaves `self` untouched. A set produced
/// by [`QueryFacade::subclasses_of`](crate::QueryFacade::subclasses_of)
/// remembers the queried root as its [`bound`](ResultSet::bound); filters that
/// can yield types outside that hierarchy (`sealed`, `abstract_types`,
/// `nested`) drop it.
#[derive(Debug, Clone)]
pub struct ResultSet<T> {
    types: BTreeSet<T>,
    bound: Option<T>,
}

impl<T: TypeDescriptor> ResultSet<T> {
    pub fn new(types: impl IntoIterator<Item = T>) -> Self {
        Self {
            types: types.into_iter().collect(),
            bound: None,
        }
    }

    pub(crate) fn bounded(types: BTreeSet<T>, bound: T) -> Self {
        Self {
            types,
            bound: Some(bound),
        }
    }

    pub fn empty() -> Self {
        Self {
            types: BTreeSet::new(),
            bound: None,
        }
    }

    /// Root type every member is known to extend, if any.
    pub fn bound(&self) -> Option<&T> {
        self.bound.as_ref()
    }

    pub fn filter(&self, predicate: impl Fn(&T) -> bool) -> Self {
        Self {
            types: self.types.iter().filter(|ty| predicate(ty)).cloned().collect(),
            bound: self.bound.clone(),
        }
    }

    fn loosened(types: BTreeSet<T>) -> Self {
        Self { types, bound: None }
    }

    pub fn top_level(&self) -> Self {
        self.filter(|ty| ty.enclosing().is_none())
    }

    pub fn top_level_or_static_nested(&self) -> Self {
        self.filter(|ty| ty.enclosing().is_none() || ty.is_static())
    }

    /// Types whose chain of enclosing scopes contains `scope`.
    pub fn enclosed_in(&self, scope: &T) -> Self {
        self.filter(|ty| {
            let mut current = ty.enclosing();
            while let Some(enclosing) = current {
                if &enclosing == scope {
                    return true;
                }
                current = enclosing.enclosing();
            }
            false
        })
    }

    pub fn enclosed_directly_in(&self, scope: &T) -> Self {
        self.filter(|ty| ty.enclosing().as_ref() == Some(scope))
    }

    /// Types carrying `annotation` directly. Fails when `annotation` is not
    /// visible at runtime, since the question cannot be answered then.
    pub fn annotated_with(&self, annotation: &T) -> Result<Self> {
        if annotation.retention() != Some(Retention::Runtime) {
            return Err(IndexError::InvalidFilter {
                annotation: annotation.display_name(),
            });
        }
        Ok(self.filter(|ty| ty.has_annotation(annotation)))
    }

    /// Types declaring any of the modifiers in `mask`.
    pub fn with_modifiers(&self, mask: Modifiers) -> Self {
        self.filter(|ty| ty.modifiers().any_of(mask))
    }

    /// Types declaring none of the modifiers in `mask`.
    pub fn without_modifiers(&self, mask: Modifiers) -> Self {
        self.filter(|ty| ty.modifiers().none_of(mask))
    }

    /// Types with a public zero-argument constructor. Types that cannot be
    /// introspected do not qualify.
    pub fn with_public_default_constructor(&self) -> Self {
        self.filter(|ty| ty.public_no_arg_constructor().unwrap_or(false))
    }

    pub fn sealed(&self) -> Self {
        Self::loosened(self.types.iter().filter(|ty| ty.is_sealed()).cloned().collect())
    }

    pub fn abstract_types(&self) -> Self {
        Self::loosened(self.types.iter().filter(|ty| ty.is_abstract()).cloned().collect())
    }

    /// Replaces every type with the types declared directly inside it.
    /// Local and anonymous types are left out.
    pub fn nested(&self) -> Self {
        Self::loosened(
            self.types
                .iter()
                .flat_map(TypeDescriptor::nested_types)
                .filter(|ty| ty.qualified_name().is_some())
                .collect(),
        )
    }

    pub fn members(&self) -> Vec<Member> {
        self.types.iter().flat_map(TypeDescriptor::members).collect()
    }

    /// The singleton types of the set.
    pub fn objects(&self) -> Vec<T> {
        self.types.iter().filter(|ty| ty.is_object()).cloned().collect()
    }

    /// Companion singletons declared by types of the set.
    pub fn companion_objects(&self) -> Vec<T> {
        self.types.iter().filter_map(TypeDescriptor::companion).collect()
    }

    pub fn qualified_names(&self) -> Vec<String> {
        self.types.iter().filter_map(TypeDescriptor::qualified_name).collect()
    }

    pub fn simple_names(&self) -> Vec<String> {
        self.types.iter().filter_map(TypeDescriptor::simple_name).collect()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn contains(&self, ty: &T) -> bool {
        self.types.contains(ty)
    }

    pub fn iter(&self) -> btree_set::Iter<'_, T> {
        self.types.iter()
    }

    pub fn into_set(self) -> BTreeSet<T> {
        self.types
    }
}

/// Equal when both hold the same types; the bound is not compared.
impl<T: Ord> PartialEq for ResultSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.types == other.types
    }
}

impl<T: Ord> Eq for ResultSet<T> {}

impl<T: TypeDescriptor> FromIterator<T> for ResultSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<T> IntoIterator for ResultSet<T> {
    type Item = T;
    type IntoIter = btree_set::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.types.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ResultSet<T> {
    type Item = &'a T;
    type IntoIter = btree_set::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.types.iter()
    }
}
