use stego_engine::ProjectContext;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;

/// Dispatch a parsed command to the corresponding handler module.
pub fn dispatch(command: Commands, ctx: &ProjectContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Validate(args) => commands::validate::handle(&args, ctx, flags),
        Commands::Build(args) => commands::build::handle(&args, ctx, flags),
        Commands::CheckStage(args) => commands::check_stage::handle(&args, ctx, flags),
        Commands::Export(args) => commands::export::handle(&args, ctx, flags),
        Commands::Comments(args) => commands::comments::handle(&args, ctx, flags),
        Commands::Schema => commands::schema::handle(flags),
    }
}
