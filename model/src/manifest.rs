use crate::descriptor::Member;
use crate::descriptor::MemberKind;
use crate::descriptor::NestingKind;
use crate::descriptor::Retention;
use crate::error::ManifestError;
use crate::modifiers::Modifiers;
use serde::Deserialize;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Annotation,
    Enum,
    Object,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConstructorDecl {
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub modifiers: Modifiers,
}

/// One declared type as reported by the host compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Host-unique binary name (`pkg.Outer$Inner`, `pkg.Outer$1`).
    pub id: String,

    /// Defaults to the last segment of `id`. Anonymous types have none.
    #[serde(default)]
    pub simple_name: Option<String>,

    #[serde(default)]
    pub nesting: NestingKind,

    /// Binary name of the immediately enclosing type.
    #[serde(default)]
    pub enclosing: Option<String>,

    #[serde(default)]
    pub kind: TypeKind,

    /// Direct supertypes, by binary or qualified name.
    #[serde(default)]
    pub supertypes: Vec<String>,

    /// Annotation types applied directly to this type.
    #[serde(default)]
    pub annotations: Vec<String>,

    /// Declared modifiers. Flags implied by `kind` and `sealed` are added
    /// by [`TypeDecl::normalized`].
    #[serde(default)]
    pub modifiers: Modifiers,

    #[serde(default)]
    pub sealed: bool,

    /// Annotation types without a declared retention keep it at runtime.
    #[serde(default)]
    pub retention: Option<Retention>,

    #[serde(default)]
    pub constructors: Vec<ConstructorDecl>,

    #[serde(default)]
    pub members: Vec<Member>,

    /// Binary name of the companion singleton.
    #[serde(default)]
    pub companion: Option<String>,

    /// Annotations and constructors cannot be introspected.
    #[serde(default)]
    pub restricted: bool,
}

impl TypeDecl {
    fn new(id: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            id: id.into(),
            simple_name: None,
            nesting: NestingKind::TopLevel,
            enclosing: None,
            kind,
            supertypes: Vec::new(),
            annotations: Vec::new(),
            modifiers: Modifiers::PUBLIC,
            sealed: false,
            retention: None,
            constructors: Vec::new(),
            members: Vec::new(),
            companion: None,
            restricted: false,
        }
    }

    pub fn class(id: impl Into<String>) -> Self {
        Self::new(id, TypeKind::Class)
    }

    pub fn interface(id: impl Into<String>) -> Self {
        Self::new(id, TypeKind::Interface).normalized()
    }

    pub fn annotation(id: impl Into<String>) -> Self {
        Self::new(id, TypeKind::Annotation).normalized()
    }

    pub fn object(id: impl Into<String>) -> Self {
        Self::new(id, TypeKind::Object).normalized()
    }

    /// Adds the modifiers implied by the declaration's kind and sealing,
    /// and gives annotation types runtime retention unless one is declared.
    /// Idempotent; every declaration passes through here before it enters a
    /// [`crate::TypeGraph`].
    pub fn normalized(mut self) -> Self {
        match self.kind {
            TypeKind::Interface => self.modifiers |= Modifiers::INTERFACE | Modifiers::ABSTRACT,
            TypeKind::Annotation => {
                self.modifiers |= Modifiers::INTERFACE | Modifiers::ABSTRACT;
                self.retention = self.retention.or(Some(Retention::Runtime));
            }
            TypeKind::Object => self.modifiers |= Modifiers::FINAL,
            TypeKind::Class | TypeKind::Enum => {}
        }
        if self.sealed {
            self.modifiers |= Modifiers::ABSTRACT;
        }
        self
    }

    /// Turns this declaration into a member of `enclosing`, renaming it to
    /// `enclosing$simple`.
    pub fn member_of(mut self, enclosing: &str) -> Self {
        let simple = self.id.clone();
        self.id = format!("{enclosing}${simple}");
        self.simple_name = Some(simple);
        self.nesting = NestingKind::Member;
        self.enclosing = Some(enclosing.to_string());
        self
    }

    pub fn local_in(mut self, enclosing: &str) -> Self {
        let simple = self.id.clone();
        self.id = format!("{enclosing}$1{simple}");
        self.simple_name = Some(simple);
        self.nesting = NestingKind::Local;
        self.enclosing = Some(enclosing.to_string());
        self
    }

    pub fn anonymous_in(mut self, enclosing: &str, ordinal: usize) -> Self {
        self.id = format!("{enclosing}${ordinal}");
        self.simple_name = None;
        self.nesting = NestingKind::Anonymous;
        self.enclosing = Some(enclosing.to_string());
        self
    }

    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.supertypes.push(supertype.into());
        self
    }

    pub fn annotated(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    pub fn without_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers.remove(modifiers);
        self
    }

    pub fn sealed(mut self) -> Self {
        self.sealed = true;
        self.normalized()
    }

    pub fn retention(mut self, retention: Retention) -> Self {
        self.retention = Some(retention);
        self
    }

    pub fn constructor(mut self, parameters: &[&str], modifiers: Modifiers) -> Self {
        self.constructors.push(ConstructorDecl {
            parameters: parameters.iter().map(ToString::to_string).collect(),
            modifiers,
        });
        self
    }

    pub fn member(mut self, name: impl Into<String>, kind: MemberKind) -> Self {
        self.members.push(Member {
            name: name.into(),
            kind,
        });
        self
    }

    pub fn companion(mut self, id: impl Into<String>) -> Self {
        self.companion = Some(id.into());
        self
    }

    pub fn restricted(mut self) -> Self {
        self.restricted = true;
        self
    }

    pub(crate) fn derived_simple_name(&self) -> Option<String> {
        if let Some(name) = &self.simple_name {
            return Some(name.clone());
        }
        if self.nesting == NestingKind::Anonymous {
            return None;
        }
        let tail = self.id.rsplit(['.', '$']).next().unwrap_or(&self.id);
        Some(tail.to_string())
    }
}

/// The type graph of one build, as handed over by the host pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeManifest {
    #[serde(default)]
    pub types: Vec<TypeDecl>,

    /// Root type ids supplied to each compilation round, in order. When
    /// empty, every top-level type is scanned in a single round.
    #[serde(default)]
    pub rounds: Vec<Vec<String>>,
}

impl TypeManifest {
    pub fn new(types: Vec<TypeDecl>) -> Self {
        Self {
            types,
            rounds: Vec::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(content)?)
    }
}
