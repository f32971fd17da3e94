use crate::cli::GlobalFlags;
use crate::cli::root_commands::TransferArgs;
use crate::commands::shared::{ensure_transfers_succeeded, read_paths};
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

/// Handle `xcsync transfer`: every pending file, or the given tracked files.
pub async fn handle(args: &TransferArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let engine = ctx.transfer_engine()?;
    let paths = if args.input.is_empty() {
        ctx.tracker()
            .pending()
            .await?
            .into_iter()
            .map(|file| file.path)
            .collect()
    } else {
        read_paths(&args.input)?
    };

    let progress = Progress::bar(flags, paths.len(), "transferring");
    let mut results = engine
        .transfer_many(paths, ctx.concurrency(), |result| progress.tick(result.path()))
        .await;
    progress.finish_clear();

    results.sort_by(|a, b| a.path().cmp(b.path()));
    output(&results, flags.format)?;
    ensure_transfers_succeeded(&results)
}
