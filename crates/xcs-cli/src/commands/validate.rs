use xcs_core::enums::RecordKind;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ValidateArgs;
use crate::commands::shared::paths_or_tracked;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

/// Requested kinds in import order, or all of them.
pub fn selected_kinds(args: &ValidateArgs) -> Vec<RecordKind> {
    if args.kinds.is_empty() {
        return RecordKind::IMPORT_ORDER.to_vec();
    }
    let requested: Vec<RecordKind> = args.kinds.iter().copied().map(RecordKind::from).collect();
    RecordKind::IMPORT_ORDER
        .into_iter()
        .filter(|kind| requested.contains(kind))
        .collect()
}

/// Handle `xcsync validate`. Diffs and errors are written as reports; the
/// command itself only fails if it cannot start.
pub async fn handle(args: &ValidateArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let validator = ctx.validator()?;
    let paths = paths_or_tracked(&args.input, ctx).await?;
    let kinds = selected_kinds(args);

    let progress = Progress::bar(flags, paths.len() * kinds.len(), "validating");
    let mut outcomes = validator
        .validate_all_with(paths, &kinds, ctx.concurrency(), |outcome| {
            progress.tick(&outcome.path);
        })
        .await;
    progress.finish_clear();

    outcomes.sort_by(|a, b| a.path.cmp(&b.path).then(a.kind.cmp(&b.kind)));
    output(&outcomes, flags.format)
}
