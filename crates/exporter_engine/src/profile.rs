use serde::{Deserialize, Serialize};

/// Structural signatures of the chat application whose exports are read.
///
/// The defaults describe pages saved from Gemini. Every field can be
/// overridden from the configuration file to follow markup changes without
/// touching the extraction code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceProfile {
    /// CSS selector matching one prompt root per exchange.
    pub prompt_selector: String,
    /// CSS selector matching one answer root per exchange.
    pub answer_selector: String,
    pub code_block_tag: String,
    /// Class prefix of the element naming a code block's language.
    pub language_class_prefix: String,
    pub table_wrapper_tag: String,
    pub video_tags: Vec<String>,
    /// Containers carrying one of these classes are dropped with their subtree.
    pub blacklisted_classes: Vec<String>,
}

impl SourceProfile {
    pub fn gemini() -> Self {
        Self {
            prompt_selector: "div.query-text.gds-body-l".to_string(),
            answer_selector: "div.markdown.markdown-main-panel.enable-updated-hr-color"
                .to_string(),
            code_block_tag: "code-block".to_string(),
            language_class_prefix: "code-block-decoration".to_string(),
            table_wrapper_tag: "table-block".to_string(),
            video_tags: vec!["youtube-block".to_string()],
            blacklisted_classes: vec!["table-footer".to_string()],
        }
    }

    pub(crate) fn is_video_tag(&self, name: &str) -> bool {
        self.video_tags.iter().any(|tag| tag == name)
    }

    pub(crate) fn is_blacklisted_class(&self, class: &str) -> bool {
        self.blacklisted_classes.iter().any(|c| c == class)
    }
}

impl Default for SourceProfile {
    fn default() -> Self {
        Self::gemini()
    }
}
