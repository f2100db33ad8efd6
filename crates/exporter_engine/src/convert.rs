use exporter_core::{Diagnostics, MarkdownBuilder, StylePolicy, Token, TokenBuilder, Warning};
use exporter_logging::exporter_info;

use crate::config::ExporterConfig;
use crate::extract::{ExtractError, Extractor, TranscriptExtractor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutput {
    pub markdown: String,
    pub tokens: Vec<Token>,
    /// Extraction warnings first, then rendering warnings, each in order.
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

pub trait Converter: Send + Sync {
    fn to_markdown(&self, html: &str) -> Result<ConversionOutput, ConvertError>;
}

/// Runs extraction and rendering for one complete document per call.
pub struct TranscriptConverter {
    extractor: Box<dyn Extractor>,
    style: StylePolicy,
    indent_unit: String,
}

impl TranscriptConverter {
    pub fn new(extractor: impl Extractor + 'static, style: StylePolicy) -> Self {
        Self {
            extractor: Box::new(extractor),
            style,
            indent_unit: exporter_core::DEFAULT_INDENT_UNIT.to_string(),
        }
    }

    pub fn from_config(config: &ExporterConfig) -> Self {
        let extractor = TranscriptExtractor::new(config.profile.clone());
        Self::new(extractor, config.style.clone()).with_indent_unit(config.indent_unit.clone())
    }

    pub fn with_indent_unit(mut self, indent_unit: impl Into<String>) -> Self {
        self.indent_unit = indent_unit.into();
        self
    }
}

impl Default for TranscriptConverter {
    fn default() -> Self {
        Self::new(TranscriptExtractor::default(), StylePolicy::default())
    }
}

impl Converter for TranscriptConverter {
    fn to_markdown(&self, html: &str) -> Result<ConversionOutput, ConvertError> {
        let mut diagnostics = Diagnostics::new();
        let tokens = self.extractor.extract(html, &mut diagnostics)?;

        let mut builder =
            MarkdownBuilder::new(self.style.clone()).with_indent_unit(self.indent_unit.as_str());
        builder.push_all(&tokens);
        let markdown = builder.build();
        diagnostics.extend(builder.take_diagnostics());

        exporter_info!(
            "converted {} tokens into {} bytes of markdown ({} warnings)",
            tokens.len(),
            markdown.len(),
            diagnostics.len()
        );

        Ok(ConversionOutput {
            markdown,
            tokens,
            warnings: diagnostics.into_warnings(),
        })
    }
}
