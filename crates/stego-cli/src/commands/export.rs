use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;
use stego_engine::{ExportFormat, ProjectContext, exporter_for};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ExportArgs;
use crate::commands::build::compile;
use crate::commands::shared::resolve_input;
use crate::output::output;

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub format: String,
    pub compiled: PathBuf,
    pub output: PathBuf,
}

/// Handle `stego export`.
pub fn handle(args: &ExportArgs, ctx: &ProjectContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let format = ExportFormat::from(args.to);
    let compiled = ctx.output_path();
    compile(ctx, &compiled, flags)?;

    let target = match &args.output {
        Some(path) => resolve_input(path, ctx, flags)?,
        None => compiled.with_extension(format.extension()),
    };
    let exporter = exporter_for(format, &ctx.config.export);
    exporter
        .export(&compiled, &target)
        .with_context(|| format!("failed to export {format} to {}", target.display()))?;

    output(
        &ExportResponse {
            format: exporter.format().to_string(),
            compiled,
            output: target,
        },
        flags.format,
    )
}
