use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Register(args) => commands::register::handle(&args, ctx, flags).await,
        Commands::Check(args) => commands::check::handle(&args, ctx, flags).await,
        Commands::Transfer(args) => commands::transfer::handle(&args, ctx, flags).await,
        Commands::Validate(args) => commands::validate::handle(&args, ctx, flags).await,
        Commands::Sync(args) => commands::sync::handle(&args, ctx, flags).await,
        Commands::Status(args) => commands::status::handle(&args, ctx, flags).await,
        Commands::Proposals => commands::proposals::handle(ctx, flags).await,
    }
}
