use clap::ValueEnum;

/// Shared output mode across all commands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Raw,
}

/// Global flags available before or after subcommands.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
    /// Canonical store path overriding `store.path`.
    pub store: Option<String>,
    /// Maximum files in flight overriding `batch.concurrency`.
    pub concurrency: Option<usize>,
}

impl GlobalFlags {
    /// Whether progress bars may be drawn on stderr.
    #[must_use]
    pub fn shows_progress(&self) -> bool {
        !self.quiet && self.format != OutputFormat::Json
    }
}
