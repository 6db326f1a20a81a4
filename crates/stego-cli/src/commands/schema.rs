use stego_config::ProjectConfig;

use crate::cli::{GlobalFlags, OutputFormat};

/// Handle `stego schema`: print the JSON Schema of `stego-project.toml`.
pub fn handle(flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = ProjectConfig::json_schema();
    let rendered = match flags.format {
        OutputFormat::Raw => serde_json::to_string(&schema)?,
        OutputFormat::Json | OutputFormat::Table => serde_json::to_string_pretty(&schema)?,
    };
    println!("{rendered}");
    Ok(())
}
