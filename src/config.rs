use serde::{Deserialize, Serialize};

/// Tokenizer settings for a [`Parser`](crate::Parser), camelCase in serde form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParserConfig {
    /// Strip leading and trailing whitespace from character runs, dropping
    /// runs that are only whitespace.
    pub trim_text: bool,
    /// Upper bound on input buffered while waiting for a token to close.
    pub max_pending_bytes: Option<usize>,
}
