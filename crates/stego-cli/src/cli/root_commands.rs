use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use stego_engine::ExportFormat;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Validate the project or a single manuscript file.
    Validate(ValidateArgs),
    /// Compile the manuscript into one markdown file.
    Build(BuildArgs),
    /// Check readiness for an editorial stage.
    CheckStage(CheckStageArgs),
    /// Build, then export to another format.
    Export(ExportArgs),
    /// List the review comments of one manuscript file.
    Comments(CommentsArgs),
    /// Print the JSON Schema of stego-project.toml.
    Schema,
}

#[derive(Clone, Debug, Args)]
pub struct ValidateArgs {
    /// Validate only this manuscript file.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct BuildArgs {
    /// Output path (defaults to <output_dir>/<slug>.md).
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct CheckStageArgs {
    /// Stage name, one of the project's allowed statuses.
    #[arg(long)]
    pub stage: String,
}

#[derive(Clone, Debug, Args)]
pub struct ExportArgs {
    /// Target format.
    #[arg(long, value_enum)]
    pub to: ExportTarget,

    /// Output path (defaults to <output_dir>/<slug>.<ext>).
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct CommentsArgs {
    /// Manuscript file to read.
    pub file: PathBuf,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportTarget {
    Md,
    Docx,
    Pdf,
    Epub,
}

impl From<ExportTarget> for ExportFormat {
    fn from(target: ExportTarget) -> Self {
        match target {
            ExportTarget::Md => Self::Markdown,
            ExportTarget::Docx => Self::Docx,
            ExportTarget::Pdf => Self::Pdf,
            ExportTarget::Epub => Self::Epub,
        }
    }
}
