use exporter_core::{Diagnostics, Token, TokenKind};
use exporter_logging::exporter_debug;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::profile::SourceProfile;
use crate::visit::TokenVisitor;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error(
        "document has {prompts} prompts and {answers} answers; \
         expected one answer per prompt, with at most the last one pending"
    )]
    StructureMismatch { prompts: usize, answers: usize },
    #[error("invalid selector {selector:?}: {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Turns a raw HTML document into a transcript token stream.
pub trait Extractor: Send + Sync {
    fn extract(&self, html: &str, diagnostics: &mut Diagnostics)
        -> Result<Vec<Token>, ExtractError>;
}

/// Extractor for chat exports whose prompts and answers are located through
/// a [`SourceProfile`].
///
/// Prompt `i` is paired with answer `i`. The final prompt may lack an answer
/// (the export was saved while the reply was pending); any other imbalance
/// means the page is not a transcript and extraction fails before emitting
/// anything.
#[derive(Debug, Clone, Default)]
pub struct TranscriptExtractor {
    profile: SourceProfile,
    base_url: Option<Url>,
}

impl TranscriptExtractor {
    pub fn new(profile: SourceProfile) -> Self {
        Self {
            profile,
            base_url: None,
        }
    }

    /// Resolve relative link targets and image sources against `base_url`.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn profile(&self) -> &SourceProfile {
        &self.profile
    }
}

impl Extractor for TranscriptExtractor {
    fn extract(
        &self,
        html: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<Token>, ExtractError> {
        let prompt_sel = parse_selector(&self.profile.prompt_selector)?;
        let answer_sel = parse_selector(&self.profile.answer_selector)?;

        let document = Html::parse_document(html);
        let prompts: Vec<ElementRef> = document.select(&prompt_sel).collect();
        let answers: Vec<ElementRef> = document.select(&answer_sel).collect();
        check_counts(prompts.len(), answers.len())?;
        exporter_debug!(
            "extracting {} prompts and {} answers",
            prompts.len(),
            answers.len()
        );

        let mut visitor = TokenVisitor::new(&self.profile, self.base_url.as_ref(), diagnostics);
        for (i, prompt) in prompts.iter().enumerate() {
            visitor.emit(Token::marker(TokenKind::StartQuery));
            visitor.visit_children(*prompt);
            let Some(answer) = answers.get(i) else {
                exporter_debug!("prompt {} has no answer yet", i + 1);
                break;
            };
            visitor.emit(Token::marker(TokenKind::StartAnswer));
            visitor.visit_children(*answer);
        }

        Ok(visitor.into_tokens())
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|err| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        message: err.to_string(),
    })
}

fn check_counts(prompts: usize, answers: usize) -> Result<(), ExtractError> {
    if answers == prompts || answers + 1 == prompts {
        Ok(())
    } else {
        Err(ExtractError::StructureMismatch { prompts, answers })
    }
}

#[cfg(test)]
mod tests {
    use super::check_counts;

    #[test]
    fn counts_allow_one_pending_answer() {
        assert!(check_counts(0, 0).is_ok());
        assert!(check_counts(3, 3).is_ok());
        assert!(check_counts(3, 2).is_ok());
    }

    #[test]
    fn counts_reject_missing_or_extra_answers() {
        assert!(check_counts(3, 1).is_err());
        assert!(check_counts(2, 3).is_err());
        assert!(check_counts(0, 1).is_err());
    }
}
