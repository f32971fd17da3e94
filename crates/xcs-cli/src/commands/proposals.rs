use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `xcsync proposals`: (re)derive the proposal of every tracked file.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let proposals = ctx.proposals().extract_all().await?;
    output(&proposals, flags.format)
}
