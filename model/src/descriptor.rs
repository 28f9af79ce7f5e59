use crate::error::IntrospectionError;
use crate::modifiers::Modifiers;
use serde::Deserialize;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// How a type is nested in its declaring scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestingKind {
    #[default]
    TopLevel,
    Member,
    Local,
    Anonymous,
}

impl NestingKind {
    /// Local and anonymous types have no name that survives outside their
    /// declaring block.
    pub fn has_stable_name(self) -> bool {
        matches!(self, NestingKind::TopLevel | NestingKind::Member)
    }
}

/// Retention of an annotation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Retention {
    Source,
    Binary,
    Runtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    #[default]
    Function,
    Property,
    Constructor,
}

/// A callable member declared by a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    #[serde(default)]
    pub kind: MemberKind,
}

/// Capability interface over a declared type.
///
/// Implemented once per host: the scanner and the runtime filters only ever
/// talk to types through this trait.
pub trait TypeDescriptor: Clone + Eq + Ord + Hash + Debug {
    /// Fully qualified name, or `None` for types without a stable identity
    /// (anonymous types, local types and anything nested inside them).
    fn qualified_name(&self) -> Option<String>;

    fn simple_name(&self) -> Option<String>;

    fn nesting(&self) -> NestingKind;

    /// Immediately enclosing type.
    fn enclosing(&self) -> Option<Self>;

    /// Types declared directly inside this one, including local and
    /// anonymous ones.
    fn nested_types(&self) -> Vec<Self>;

    /// Declared superclass and interfaces. Primitive, array and type
    /// variable bounds never appear here.
    fn direct_supertypes(&self) -> Result<Vec<Self>, IntrospectionError>;

    /// Annotation types applied directly to this type.
    fn annotations(&self) -> Result<Vec<Self>, IntrospectionError>;

    /// Retention policy, only meaningful for annotation types.
    fn retention(&self) -> Option<Retention>;

    fn modifiers(&self) -> Modifiers;

    fn is_abstract(&self) -> bool;

    fn is_sealed(&self) -> bool;

    fn is_static(&self) -> bool {
        self.modifiers().contains(Modifiers::STATIC)
    }

    /// Whether a zero-argument constructor with public visibility exists.
    fn public_no_arg_constructor(&self) -> Result<bool, IntrospectionError>;

    fn members(&self) -> Vec<Member>;

    /// Whether this type declares a singleton instance.
    fn is_object(&self) -> bool;

    /// The companion singleton declared inside this type, if any.
    fn companion(&self) -> Option<Self>;

    /// Name used in messages: the qualified name, or the debug form for
    /// types that have none.
    fn display_name(&self) -> String {
        self.qualified_name().unwrap_or_else(|| format!("{self:?}"))
    }

    /// Transitive subtype check. A type is not its own subtype here.
    fn is_subtype_of(&self, other: &Self) -> bool {
        let Ok(supertypes) = self.direct_supertypes() else {
            return false;
        };
        supertypes
            .iter()
            .any(|supertype| supertype == other || supertype.is_subtype_of(other))
    }

    fn has_annotation(&self, annotation: &Self) -> bool {
        self.annotations()
            .map(|annotations| annotations.contains(annotation))
            .unwrap_or(false)
    }
}

/// Turns persisted names back into live type handles.
pub trait TypeResolver {
    type Type: TypeDescriptor;

    fn resolve(&self, qualified_name: &str) -> Option<Self::Type>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_top_level_and_member_types_are_stable() {
        assert!(NestingKind::TopLevel.has_stable_name());
        assert!(NestingKind::Member.has_stable_name());
        assert!(!NestingKind::Local.has_stable_name());
        assert!(!NestingKind::Anonymous.has_stable_name());
    }
}
