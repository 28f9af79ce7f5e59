use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use clap::Parser;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use tracing::debug;
use typeindex_model::TypeGraph;
use typeindex_model::TypeRef;
use typeindex_processor::Processor;
use typeindex_processor::ProcessorConfig;

#[derive(Debug, Parser)]
pub struct ScanArgs {
    /// Type manifest describing the compiled types
    #[arg(long, value_name = "PATH")]
    pub manifest: PathBuf,

    /// Directory receiving the artifacts (overrides the config file)
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// TOML file with processor options
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Whitespace-separated annotations to index without a marker
    #[arg(long, value_name = "NAMES")]
    pub annotation_targets: Option<String>,

    /// Whitespace-separated supertypes to index without a marker
    #[arg(long, value_name = "NAMES")]
    pub superclass_targets: Option<String>,

    /// Fail when the scan reports any diagnostic
    #[arg(long)]
    pub strict: bool,
}

impl ScanArgs {
    fn processor_config(&self) -> Result<ProcessorConfig> {
        let mut config = match &self.config {
            Some(path) => ProcessorConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ProcessorConfig::default(),
        };
        if let Some(targets) = &self.annotation_targets {
            config.annotation_targets = targets.clone();
        }
        if let Some(targets) = &self.superclass_targets {
            config.superclass_targets = targets.clone();
        }
        if let Some(out) = &self.out {
            config.output_dir = out.clone();
        }
        Ok(config)
    }
}

pub fn run_scan(args: ScanArgs) -> Result<()> {
    let config = args.processor_config()?;
    debug!("scanning with {config:?}");

    let graph = TypeGraph::load(&args.manifest)
        .with_context(|| format!("Failed to load manifest {}", args.manifest.display()))?;
    let mut processor: Processor<TypeRef> =
        Processor::new(config).context("Invalid processor configuration")?;
    let reports = processor
        .process_all(graph.rounds())
        .context("Failed to write index artifacts")?;

    let mut visited = 0;
    let mut diagnostics = 0;
    for report in &reports {
        visited += report.stats.types_visited;
        for diagnostic in &report.diagnostics {
            diagnostics += 1;
            eprintln!("{} {diagnostic}", "warning:".yellow().bold());
        }
    }

    let tables = processor.tables();
    println!(
        "{} Scanned {} types in {} rounds",
        "✓".green(),
        visited,
        reports.len()
    );
    println!(
        "  {} subclass keys, {} annotation keys",
        tables.subclasses.len(),
        tables.annotations.len()
    );
    for path in reports.iter().flat_map(|report| &report.written) {
        println!("  {} {}", "wrote".dimmed(), path.display());
    }

    if args.strict && diagnostics > 0 {
        bail!("{diagnostics} scan diagnostic(s) reported");
    }
    Ok(())
}
