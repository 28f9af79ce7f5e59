use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use owo_colors::OwoColorize;
use std::path::Path;
use std::path::PathBuf;
use typeindex_model::IndexKind;
use typeindex_model::TypeGraph;
use typeindex_runtime::IndexLoader;
use typeindex_runtime::QueryFacade;

#[derive(Debug, Parser)]
pub struct QueryArgs {
    /// Fully qualified name of the root type or annotation
    #[arg(value_name = "FQN")]
    pub name: String,

    /// Directory holding the index artifacts
    #[arg(long, value_name = "DIR")]
    pub index: PathBuf,

    /// Resolve entries against this type manifest and drop stale ones
    #[arg(long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Print the result as a JSON array
    #[arg(long)]
    pub json: bool,
}

pub fn run_query(kind: IndexKind, args: QueryArgs) -> Result<()> {
    let names = match &args.manifest {
        Some(manifest) => resolved_names(kind, &args, manifest)?,
        None => raw_names(kind, &args)?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&names)?);
        return Ok(());
    }
    if names.is_empty() {
        eprintln!("{} no {kind} entries for {}", "note:".dimmed(), args.name);
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

fn raw_names(kind: IndexKind, args: &QueryArgs) -> Result<Vec<String>> {
    let names = IndexLoader::from_dir(&args.index)
        .names_of(kind, &args.name)
        .with_context(|| format!("Failed to read index at {}", args.index.display()))?;
    Ok(names.into_iter().collect())
}

fn resolved_names(kind: IndexKind, args: &QueryArgs, manifest: &Path) -> Result<Vec<String>> {
    let graph = TypeGraph::load(manifest)
        .with_context(|| format!("Failed to load manifest {}", manifest.display()))?;
    let root = graph
        .lookup(&args.name)
        .with_context(|| format!("{} is not declared in {}", args.name, manifest.display()))?;
    let facade = QueryFacade::new(IndexLoader::from_dir(&args.index), graph);
    let result = match kind {
        IndexKind::Subclass => facade.subclasses_of(&root),
        IndexKind::Annotation => facade.annotated_with(&root),
    }
    .with_context(|| format!("Failed to read index at {}", args.index.display()))?;
    Ok(result.qualified_names())
}
