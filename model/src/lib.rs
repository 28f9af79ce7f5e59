//! # typeindex model
//!
//! The type-descriptor capability shared by the build-time scanner and the
//! runtime query layer, plus a manifest-backed reference host.
//!
//! ```rust
//! use typeindex_model::{TypeDecl, TypeDescriptor, TypeGraph};
//!
//! let graph = TypeGraph::from_types(vec![
//!     TypeDecl::class("pkg.Service"),
//!     TypeDecl::class("pkg.SecondService").extends("pkg.Service"),
//! ])?;
//! let second = graph.lookup("pkg.SecondService").unwrap();
//! assert!(second.is_subtype_of(&graph.lookup("pkg.Service").unwrap()));
//! # Ok::<(), typeindex_model::ManifestError>(())
//! ```

mod artifact;
mod descriptor;
mod error;
mod graph;
mod manifest;
mod modifiers;

pub use artifact::{IndexArtifact, IndexKind, IndexTable};
pub use descriptor::{Member, MemberKind, NestingKind, Retention, TypeDescriptor, TypeResolver};
pub use error::{IntrospectionError, ManifestError};
pub use graph::{TypeGraph, TypeRef};
pub use manifest::{ConstructorDecl, TypeDecl, TypeKind, TypeManifest};
pub use modifiers::Modifiers;
