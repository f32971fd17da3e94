use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `xcsync` binary.
#[derive(Debug, Parser)]
#[command(
    name = "xcsync",
    version,
    about = "Sync legacy soak databases into the canonical store"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only, no progress)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Canonical store path (overrides store.path)
    #[arg(long, global = true)]
    pub store: Option<String>,

    /// Maximum files processed at once (overrides batch.concurrency)
    #[arg(short = 'j', long, global = true)]
    pub concurrency: Option<usize>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            store: self.store.clone(),
            concurrency: self.concurrency,
        }
    }
}
