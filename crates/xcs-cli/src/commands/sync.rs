use serde::Serialize;
use xcs_core::enums::RecordKind;
use xcs_db::tracker::ReconcileReport;
use xcs_db::transfer::TransferResult;
use xcs_db::validate::ValidationOutcome;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SyncArgs;
use crate::commands::shared::{
    ensure_reconcile_succeeded, ensure_transfers_succeeded, paths_or_tracked,
};
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

#[derive(Debug, Serialize)]
struct SyncSummary {
    check: ReconcileReport,
    transfers: Vec<TransferResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    validations: Vec<ValidationOutcome>,
}

/// Handle `xcsync sync`: reconcile, transfer everything pending, and
/// optionally validate what was transferred.
pub async fn handle(args: &SyncArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let paths = paths_or_tracked(&args.input, ctx).await?;

    let spinner = Progress::spinner(flags, &format!("checking {} files", paths.len()));
    let check = ctx.tracker().reconcile(&paths).await;
    spinner.finish_clear();
    let check = check?;

    let engine = ctx.transfer_engine()?;
    let pending = ctx.tracker().pending().await?;
    let progress = Progress::bar(flags, pending.len(), "transferring");
    let mut transfers = engine
        .transfer_many(
            pending.into_iter().map(|file| file.path).collect(),
            ctx.concurrency(),
            |result| progress.tick(result.path()),
        )
        .await;
    progress.finish_clear();
    transfers.sort_by(|a, b| a.path().cmp(b.path()));

    let mut validations = Vec::new();
    if args.validate {
        let transferred: Vec<String> = transfers
            .iter()
            .filter(|result| !result.is_failed())
            .map(|result| result.path().to_string())
            .collect();
        let progress = Progress::bar(
            flags,
            transferred.len() * RecordKind::IMPORT_ORDER.len(),
            "validating",
        );
        validations = ctx
            .validator()?
            .validate_all_with(
                transferred,
                &RecordKind::IMPORT_ORDER,
                ctx.concurrency(),
                |outcome| progress.tick(&outcome.path),
            )
            .await;
        progress.finish_clear();
        validations.sort_by(|a, b| a.path.cmp(&b.path).then(a.kind.cmp(&b.kind)));
    }

    let summary = SyncSummary {
        check,
        transfers,
        validations,
    };
    output(&summary, flags.format)?;
    ensure_transfers_succeeded(&summary.transfers)?;
    ensure_reconcile_succeeded(&summary.check)
}
