use crate::builder::IndexBuilder;
use crate::builder::IndexTables;
use crate::builder::ScanStats;
use crate::config::ProcessorConfig;
use crate::emitter::IndexEmitter;
use crate::error::Result;
use crate::error::ScanDiagnostic;
use crate::registry::TargetRegistry;
use std::path::PathBuf;
use tracing::info;
use typeindex_model::TypeDescriptor;

/// One invocation of the scanner by the host pipeline.
#[derive(Debug, Clone)]
pub struct Round<T> {
    /// Types newly declared in this round
    pub roots: Vec<T>,
    /// Set on the last round; artifacts are only written then
    pub processing_over: bool,
}

impl<T> Round<T> {
    pub fn new(roots: Vec<T>) -> Self {
        Self {
            roots,
            processing_over: false,
        }
    }

    pub fn last(roots: Vec<T>) -> Self {
        Self {
            roots,
            processing_over: true,
        }
    }
}

/// Outcome of one round
#[derive(Debug, Default)]
pub struct RoundReport {
    pub stats: ScanStats,
    pub diagnostics: Vec<ScanDiagnostic>,
    /// Artifacts written; empty unless this was the final round
    pub written: Vec<PathBuf>,
}

/// Drives the index builder across rounds and emits on the final one.
pub struct Processor<T> {
    builder: IndexBuilder<T>,
    emitter: IndexEmitter,
    rounds: usize,
}

impl<T: TypeDescriptor> Processor<T> {
    pub fn new(config: ProcessorConfig) -> Result<Self> {
        config.validate()?;
        let registry = TargetRegistry::from_config(&config);
        Ok(Self::with_registry(registry, IndexEmitter::new(config.output_dir)))
    }

    pub fn with_registry(registry: TargetRegistry, emitter: IndexEmitter) -> Self {
        Self {
            builder: IndexBuilder::new(registry),
            emitter,
            rounds: 0,
        }
    }

    pub fn process_round(&mut self, round: &Round<T>) -> Result<RoundReport> {
        self.rounds += 1;
        let stats = self.builder.scan_round(&round.roots);
        let diagnostics = self.builder.take_diagnostics();
        info!(
            "round {}: visited {} types, {} new relationships, {} diagnostics",
            self.rounds, stats.types_visited, stats.relationships_recorded, stats.diagnostics
        );

        let written = if round.processing_over {
            self.emitter.emit(self.builder.tables())?
        } else {
            Vec::new()
        };

        Ok(RoundReport {
            stats,
            diagnostics,
            written,
        })
    }

    /// Runs every round in order, treating the last one as final. An empty
    /// final round is appended when `rounds` is empty.
    pub fn process_all(&mut self, rounds: Vec<Vec<T>>) -> Result<Vec<RoundReport>> {
        let mut rounds = rounds;
        if rounds.is_empty() {
            rounds.push(Vec::new());
        }
        let last = rounds.len() - 1;
        rounds
            .into_iter()
            .enumerate()
            .map(|(index, roots)| {
                let round = Round {
                    roots,
                    processing_over: index == last,
                };
                self.process_round(&round)
            })
            .collect()
    }

    pub fn tables(&self) -> &IndexTables {
        self.builder.tables()
    }
}
