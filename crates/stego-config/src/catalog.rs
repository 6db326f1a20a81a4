//! Raw entity-category declarations.
//!
//! Declarations are loaded as plain strings; the schema resolver in
//! `stego-schema` decides which of them are usable.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One `[[categories]]` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct CategoryDecl {
    /// Header field name, e.g. `characters`.
    #[serde(default)]
    pub key: String,

    /// Identifier prefix, e.g. `CHAR` for `CHAR-MIRA`.
    #[serde(default)]
    pub prefix: String,

    /// Notes file under `spine/`, e.g. `characters.md`.
    #[serde(default)]
    pub notes_file: String,
}
