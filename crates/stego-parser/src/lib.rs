//! # stego-parser
//!
//! Line-oriented parsers for manuscript files.
//!
//! - [`header`]: the `---` delimited header block at the top of a file.
//! - [`comments`]: the trailing review comment appendix.
//!
//! Both parsers classify each line into a tagged variant first and then run a
//! small state machine over the classified lines. Neither aborts on a bad
//! line: every fault becomes an [`Issue`](stego_core::Issue) and parsing
//! continues, so one run reports every defect in the file.

pub mod comments;
pub mod error;
pub mod header;
mod lines;

pub use comments::{
    COMMENTS_END, COMMENTS_START, ParsedAppendix, attach_appendix, parse_comment_appendix,
    render_appendix,
};
pub use error::HeaderError;
pub use header::{HEADER_DELIMITER, ParsedHeader, format_header_block, parse_header_block};
