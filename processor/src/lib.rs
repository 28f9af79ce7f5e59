/*!
# typeindex processor

Build-time scanner producing the subclass and annotation indexes.

The host pipeline hands over the root types of each compilation round. Every
root, and every type nested inside it, is checked against the target
registry (explicit build options plus marker annotations) and its supertype
chain is walked. On the final round both tables are written as
`SubclassIndex.json` and `AnnotationIndex.json`.

## Example

```rust,no_run
use typeindex_model::TypeGraph;
use typeindex_processor::{Processor, ProcessorConfig};
use std::path::{Path, PathBuf};

fn main() -> anyhow::Result<()> {
    let graph = TypeGraph::load(Path::new("types.json"))?;
    let config = ProcessorConfig {
        superclass_targets: "java.lang.Exception".to_string(),
        output_dir: PathBuf::from("build/typeindex"),
        ..Default::default()
    };

    let mut processor = Processor::new(config)?;
    for report in processor.process_all(graph.rounds())? {
        for diagnostic in report.diagnostics {
            eprintln!("warning: {diagnostic}");
        }
    }
    Ok(())
}
```
*/

mod builder;
mod config;
mod emitter;
mod error;
mod processor;
mod registry;
mod walker;

pub use builder::{IndexBuilder, IndexTables, ScanStats};
pub use config::{MarkerNames, ProcessorConfig};
pub use emitter::IndexEmitter;
pub use error::{ProcessorError, Result, ScanDiagnostic};
pub use processor::{Processor, Round, RoundReport};
pub use registry::{ExplicitTargets, MarkerTargets, TargetRegistry, TargetSource};
pub use walker::{HierarchyWalker, WalkEvent};
