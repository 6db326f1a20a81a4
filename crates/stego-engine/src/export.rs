//! Exporters turning the compiled markdown into distributable formats.

use std::fmt;
use std::fs;
use std::path::Path;
use std::process::Command;

use stego_config::ExportConfig;
use stego_core::CoreError;

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Markdown,
    Docx,
    Pdf,
    Epub,
}

impl ExportFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Docx => "docx",
            Self::Pdf => "pdf",
            Self::Epub => "epub",
        }
    }

    /// File extension of the exported artifact.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Converts a compiled manuscript file into another artifact.
pub trait Exporter {
    fn format(&self) -> ExportFormat;

    fn export(&self, input: &Path, output: &Path) -> Result<(), EngineError>;
}

/// Copies the compiled markdown as is.
#[derive(Debug, Default)]
pub struct MarkdownExporter;

impl Exporter for MarkdownExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Markdown
    }

    fn export(&self, input: &Path, output: &Path) -> Result<(), EngineError> {
        if input == output {
            return Ok(());
        }
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
        }
        fs::copy(input, output).map_err(|e| CoreError::io(input, e))?;
        Ok(())
    }
}

/// Runs the configured `pandoc` executable.
#[derive(Debug)]
pub struct PandocExporter {
    program: String,
    format: ExportFormat,
}

impl PandocExporter {
    #[must_use]
    pub fn new(program: impl Into<String>, format: ExportFormat) -> Self {
        Self {
            program: program.into(),
            format,
        }
    }
}

impl Exporter for PandocExporter {
    fn format(&self) -> ExportFormat {
        self.format
    }

    fn export(&self, input: &Path, output: &Path) -> Result<(), EngineError> {
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
        }
        tracing::debug!(program = %self.program, format = %self.format, "running pandoc");

        let mut command = Command::new(&self.program);
        command.arg("--from=markdown");
        // pandoc picks the pdf engine from the output extension.
        if self.format != ExportFormat::Pdf {
            command.arg(format!("--to={}", self.format.as_str()));
        }
        let result = command
            .arg("--output")
            .arg(output)
            .arg(input)
            .output()
            .map_err(|e| EngineError::Export(format!("failed to run '{}': {e}", self.program)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(EngineError::Export(format!(
                "'{}' exited with {}: {}",
                self.program,
                result.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// Pick the exporter for `format`.
#[must_use]
pub fn exporter_for(format: ExportFormat, config: &ExportConfig) -> Box<dyn Exporter> {
    match format {
        ExportFormat::Markdown => Box::new(MarkdownExporter),
        other => Box::new(PandocExporter::new(config.pandoc.clone(), other)),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn markdown_exporter_copies_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("novel.md");
        fs::write(&input, "# Novel\n").unwrap();
        let output = dir.path().join("exports").join("novel.md");

        let exporter = exporter_for(ExportFormat::Markdown, &ExportConfig::default());
        exporter.export(&input, &output).unwrap();
        assert_eq!(fs::read_to_string(output).unwrap(), "# Novel\n");
    }

    #[test]
    fn missing_pandoc_is_an_export_error() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("novel.md");
        fs::write(&input, "# Novel\n").unwrap();

        let exporter = PandocExporter::new("stego-no-such-pandoc", ExportFormat::Docx);
        let error = exporter
            .export(&input, &dir.path().join("novel.docx"))
            .unwrap_err();
        assert!(matches!(error, EngineError::Export(_)));
        assert_eq!(exporter.format(), ExportFormat::Docx);
    }
}
