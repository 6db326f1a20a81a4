//! # stego-engine
//!
//! Project-level operations over a manuscript tree:
//!
//! - [`inspector`]: parse and validate every manuscript file, then check the
//!   cross-document rules (ordering, duplicates, catalog references).
//! - [`assembler`]: compile the sorted documents into one markdown file with
//!   grouping headings, page breaks, and a table of contents.
//! - [`stage`]: gate a manuscript against an editorial stage.
//! - [`export`]: turn the compiled markdown into other formats.
//!
//! Every entry point takes an explicit [`ProjectContext`]; nothing here reads
//! process-wide state.

pub mod assembler;
pub mod context;
pub mod error;
pub mod export;
pub mod inspector;
pub mod stage;

pub use assembler::{
    GroupState, PAGE_BREAK_MARKER, TOC_MARKER, assemble_manuscript, build_manuscript,
    compute_group_states, write_compiled,
};
pub use context::{MANUSCRIPT_DIR, ProjectContext, SPINE_DIR};
pub use error::EngineError;
pub use export::{ExportFormat, Exporter, MarkdownExporter, PandocExporter, exporter_for};
pub use inspector::{InspectionReport, Totals, inspect_file, inspect_project};
pub use stage::check_stage;
