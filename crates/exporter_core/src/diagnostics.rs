use exporter_logging::exporter_warn;

use crate::token::TokenKind;

/// A recoverable anomaly. The offending fragment was dropped and processing
/// continued.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Warning {
    #[error("image element without a source attribute")]
    ImageWithoutSource,
    #[error("anchor {text:?} without an href attribute, link dropped")]
    AnchorWithoutHref { text: String },
    #[error("table element contains no rows")]
    TableWithoutRows,
    #[error("table header row contains no columns")]
    TableWithoutColumns,
    #[error("table row {row} has {found} columns, header has {expected}")]
    TableInconsistentColumns {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("link {text:?} with an empty target")]
    EmptyLink { text: String },
    #[error("ordered list start {value:?} is not a non-negative integer, counting from 1")]
    InvalidListStart { value: String },
    #[error("list item outside of a list context")]
    ListItemOutsideList,
    #[error("{kind} without an open list")]
    ListEndOutsideList { kind: TokenKind },
    #[error("token {kind} with unexpected payload {payload:?}")]
    PayloadMismatch {
        kind: TokenKind,
        payload: Option<String>,
    },
}

/// Ordered collector of warnings raised during one extraction or rendering.
///
/// Each warning is logged when recorded, so callers that never inspect the
/// collector still see them in the log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, warning: Warning) {
        exporter_warn!("{warning}");
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn clear(&mut self) {
        self.warnings.clear();
    }

    /// Appends already-logged warnings from another collector.
    pub fn extend(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}
