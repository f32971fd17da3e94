use crate::cli::GlobalFlags;
use crate::cli::root_commands::PathsArgs;
use crate::commands::shared::{ensure_reconcile_succeeded, paths_or_tracked};
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

/// Handle `xcsync check`: reconcile statuses of the given (or all tracked)
/// legacy files.
pub async fn handle(args: &PathsArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let paths = paths_or_tracked(args, ctx).await?;
    let spinner = Progress::spinner(flags, &format!("checking {} files", paths.len()));
    let report = ctx.tracker().reconcile(&paths).await;
    spinner.finish_clear();
    let report = report?;
    output(&report, flags.format)?;
    ensure_reconcile_succeeded(&report)
}
