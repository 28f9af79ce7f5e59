//! Runtime side of typeindex: loads the artifacts written at build time and
//! answers "which types extend X" and "which types carry annotation A"
//! without scanning anything.
//!
//! ```rust
//! use typeindex_model::{TypeDecl, TypeGraph};
//! use typeindex_runtime::{EmbeddedSource, IndexLoader, QueryFacade};
//!
//! let graph = TypeGraph::from_types(vec![
//!     TypeDecl::interface("pkg.Service"),
//!     TypeDecl::class("pkg.SecondService").extends("pkg.Service"),
//! ])?;
//! let source = EmbeddedSource::new(
//!     r#"{"kind": "subclass", "entries": {"pkg.Service": ["pkg.SecondService"]}}"#,
//!     r#"{"kind": "annotation", "entries": {}}"#,
//! );
//! let facade = QueryFacade::new(IndexLoader::new(source), graph.clone());
//!
//! let service = graph.lookup("pkg.Service").unwrap();
//! let subclasses = facade.subclasses_of(&service)?;
//! assert_eq!(subclasses.qualified_names(), vec!["pkg.SecondService"]);
//! # Ok::<(), anyhow::Error>(())
//! ```

mod error;
mod loader;
mod query;
mod result_set;

pub use error::{IndexError, Result};
pub use loader::{DirectorySource, EmbeddedSource, IndexLoader, IndexSource, LoadedIndex};
pub use query::QueryFacade;
pub use result_set::ResultSet;
