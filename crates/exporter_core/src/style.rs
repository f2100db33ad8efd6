use serde::{Deserialize, Serialize};

const DEFAULT_LINE_PREFIX: &str = "> ";
const DEFAULT_PRE_QUERY: &str = "\n**Prompt:**\n";
const DEFAULT_PRE_ANSWER: &str = "\n**Answer:**\n";

/// Strings the renderer wraps around prompt and answer content.
///
/// `line_prefix` is written at the start of every rendered content line.
/// The preambles are written verbatim before each prompt and answer and are
/// never prefixed themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylePolicy {
    pub line_prefix: String,
    pub pre_query: String,
    pub pre_answer: String,
}

impl StylePolicy {
    pub fn new(
        line_prefix: impl Into<String>,
        pre_query: impl Into<String>,
        pre_answer: impl Into<String>,
    ) -> Self {
        Self {
            line_prefix: line_prefix.into(),
            pre_query: pre_query.into(),
            pre_answer: pre_answer.into(),
        }
    }

    /// Default preambles without the quote prefix.
    pub fn plain() -> Self {
        Self {
            line_prefix: String::new(),
            ..Self::default()
        }
    }
}

impl Default for StylePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_LINE_PREFIX, DEFAULT_PRE_QUERY, DEFAULT_PRE_ANSWER)
    }
}
