use anyhow::Context;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::RegisterArgs;
use crate::commands::shared::parse_path_list;
use crate::context::AppContext;
use crate::output::output;

/// Handle `xcsync register`.
pub async fn handle(args: &RegisterArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let tracker = ctx.tracker();
    let mut registered = Vec::new();
    for path in parse_path_list(args.paths.iter().map(String::as_str)) {
        let file = tracker
            .register(&path)
            .await
            .with_context(|| format!("failed to register {path}"))?;
        registered.push(file);
    }
    output(&registered, flags.format)
}
