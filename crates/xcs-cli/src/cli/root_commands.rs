use clap::{Args, Subcommand, ValueEnum};
use xcs_core::enums::{FileStatus, RecordKind};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Start tracking legacy files (status `new`).
    Register(RegisterArgs),
    /// Reconcile tracked statuses against current modification times.
    Check(PathsArgs),
    /// Import pending (or the given) legacy files into the canonical store.
    Transfer(TransferArgs),
    /// Compare legacy files against the canonical store and write reports.
    Validate(ValidateArgs),
    /// Check, then transfer everything pending.
    Sync(SyncArgs),
    /// List tracked files.
    Status(StatusArgs),
    /// Derive proposals for every tracked file.
    Proposals,
}

#[derive(Clone, Debug, Args)]
pub struct RegisterArgs {
    /// Legacy file paths.
    #[arg(required = true)]
    pub paths: Vec<String>,
}

/// Legacy file paths from arguments, a list file, or stdin.
#[derive(Clone, Debug, Default, Args)]
pub struct PathsArgs {
    /// Legacy file paths; `-` reads one path per line from stdin.
    pub paths: Vec<String>,

    /// File listing one legacy path per line.
    #[arg(long, value_name = "FILE")]
    pub paths_file: Option<String>,
}

impl PathsArgs {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.paths_file.is_none()
    }
}

#[derive(Clone, Debug, Args)]
pub struct TransferArgs {
    /// Transfer these tracked files instead of every pending one.
    #[command(flatten)]
    pub input: PathsArgs,
}

#[derive(Clone, Debug, Args)]
pub struct ValidateArgs {
    /// Files to validate; defaults to every tracked file.
    #[command(flatten)]
    pub input: PathsArgs,

    /// Record kinds to compare (repeatable); defaults to all.
    #[arg(short, long = "kind", value_enum)]
    pub kinds: Vec<KindArg>,
}

#[derive(Clone, Debug, Args)]
pub struct SyncArgs {
    #[command(flatten)]
    pub input: PathsArgs,

    /// Validate every file transferred in this run.
    #[arg(long)]
    pub validate: bool,
}

#[derive(Clone, Debug, Args)]
pub struct StatusArgs {
    /// Only files in this status.
    #[arg(short, long, value_enum)]
    pub status: Option<StatusArg>,

    /// Print counts per status instead of files.
    #[arg(long)]
    pub summary: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum StatusArg {
    New,
    Changed,
    Unchanged,
}

impl From<StatusArg> for FileStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::New => Self::New,
            StatusArg::Changed => Self::Changed,
            StatusArg::Unchanged => Self::Unchanged,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum KindArg {
    Crystal,
    Lab,
    Refinement,
    Dimple,
    DataProcessing,
}

impl From<KindArg> for RecordKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Crystal => Self::Crystal,
            KindArg::Lab => Self::Lab,
            KindArg::Refinement => Self::Refinement,
            KindArg::Dimple => Self::Dimple,
            KindArg::DataProcessing => Self::DataProcessing,
        }
    }
}
