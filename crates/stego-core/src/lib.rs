//! # stego-core
//!
//! Core types shared across all Stego crates.
//!
//! This crate provides the foundational types the parser, schema, and engine
//! crates exchange:
//! - Issue accumulation (`Issue`, `Severity`, `IssueCategory`, `IssueLog`)
//! - Header maps and typed header values
//! - Documents, their typed metadata, and review comment threads
//! - Cross-cutting error types

pub mod document;
pub mod errors;
pub mod header;
pub mod issue;

pub use document::{
    CommentMessage, CommentMeta, CommentStatus, CommentThread, Document, DocumentMeta,
};
pub use errors::CoreError;
pub use header::{HeaderMap, HeaderValue};
pub use issue::{Issue, IssueCategory, IssueLog, Severity};

/// Prefix reserved for review comment identifiers (`CMT-0001`).
pub const COMMENT_ID_PREFIX: &str = "CMT";
