use serde::Serialize;
use xcs_core::enums::FileStatus;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::StatusArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct StatusCount {
    status: FileStatus,
    files: i64,
}

/// Handle `xcsync status`.
pub async fn handle(args: &StatusArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    if args.summary {
        let counts = ctx
            .service
            .count_files_by_status()
            .await?
            .into_iter()
            .map(|(status, files)| StatusCount { status, files })
            .collect::<Vec<_>>();
        return output(&counts, flags.format);
    }

    let files = ctx
        .service
        .list_tracked_files(args.status.map(FileStatus::from))
        .await?;
    output(&files, flags.format)
}
