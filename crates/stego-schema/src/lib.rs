//! # stego-schema
//!
//! Resolves a project's declarations into usable schemas and validates
//! documents against them.
//!
//! - [`catalog`]: entity categories and their identifier patterns.
//! - [`references`]: header reference fields and inline identifier leaks.
//! - [`grouping`]: multi-level grouping for compiled output.
//! - [`fields`]: required metadata keys and allowed statuses.
//!
//! Resolution never fails outright. Each resolver returns its schema together
//! with an [`IssueLog`](stego_core::IssueLog); a declaration set with errors
//! degrades to an empty schema so unrelated checks still run.

pub mod catalog;
pub mod fields;
pub mod grouping;
mod patterns;
pub mod references;

pub use catalog::{Catalog, CategorySchema};
pub use fields::FieldPolicy;
pub use grouping::{GroupingLevel, GroupingSchema, PageBreakMode};
pub use references::{extract_references, scan_inline_identifiers};
