use std::mem;

use exporter_logging::exporter_trace;

use crate::diagnostics::{Diagnostics, Warning};
use crate::style::StylePolicy;
use crate::token::{Payload, Token, TokenKind};

/// One indentation level of nested lists.
pub const DEFAULT_INDENT_UNIT: &str = "\t";

const IMAGE_DEFAULT_ALT: &str = "Image";

/// Consumer of a token stream, one token at a time.
pub trait TokenBuilder {
    type Output;

    /// Consumes one token. Anomalies are recorded as warnings, never raised.
    fn push(&mut self, kind: TokenKind, payload: Option<&Payload>);

    /// Snapshot of everything pushed so far. Does not mutate the builder.
    fn build(&self) -> Self::Output;

    /// Returns the builder to its freshly constructed state.
    fn reset(&mut self);

    fn push_token(&mut self, token: &Token) {
        self.push(token.kind, token.payload.as_ref());
    }

    fn push_all<'a, I>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = &'a Token>,
        Self: Sized,
    {
        for token in tokens {
            self.push_token(token);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListFrame {
    Unordered,
    Ordered { next_index: u32 },
}

/// Renders a token stream as Markdown.
///
/// Nested lists are tracked on a stack of frames; its depth is the current
/// indentation level. Every content line starts with the style's line prefix
/// followed by one indent unit per list level below the outermost one.
#[derive(Debug, Clone)]
pub struct MarkdownBuilder {
    style: StylePolicy,
    indent_unit: String,
    output: String,
    list_stack: Vec<ListFrame>,
    diagnostics: Diagnostics,
}

impl MarkdownBuilder {
    pub fn new(style: StylePolicy) -> Self {
        Self {
            style,
            indent_unit: DEFAULT_INDENT_UNIT.to_string(),
            output: String::new(),
            list_stack: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn with_indent_unit(mut self, indent_unit: impl Into<String>) -> Self {
        self.indent_unit = indent_unit.into();
        self
    }

    pub fn style(&self) -> &StylePolicy {
        &self.style
    }

    /// Number of currently open lists.
    pub fn depth(&self) -> usize {
        self.list_stack.len()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Diagnostics {
        mem::take(&mut self.diagnostics)
    }

    fn push_table(&mut self, rows: &[Vec<String>]) {
        let Some(header) = rows.first() else {
            self.diagnostics.warn(Warning::TableWithoutRows);
            return;
        };
        let columns = header.len();
        if columns == 0 {
            self.diagnostics.warn(Warning::TableWithoutColumns);
            return;
        }
        if let Some((row, cells)) = rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != columns)
        {
            self.diagnostics.warn(Warning::TableInconsistentColumns {
                row,
                expected: columns,
                found: cells.len(),
            });
            return;
        }

        self.append("\n");
        self.append(&table_line(header));
        self.append(&table_line(&vec!["---".to_string(); columns]));
        for cells in &rows[1..] {
            self.append(&table_line(cells));
        }
        self.append("\n");
    }

    fn push_list_item(&mut self) {
        let marker = match self.list_stack.last_mut() {
            Some(ListFrame::Ordered { next_index }) => {
                let marker = format!("{next_index}. ");
                *next_index = next_index.saturating_add(1);
                marker
            }
            Some(ListFrame::Unordered) => "* ".to_string(),
            None => {
                self.diagnostics.warn(Warning::ListItemOutsideList);
                return;
            }
        };
        self.finish_line();
        self.append(&marker);
    }

    fn pop_list(&mut self, kind: TokenKind) {
        self.finish_line();
        if self.list_stack.pop().is_none() {
            self.diagnostics.warn(Warning::ListEndOutsideList { kind });
        }
    }

    /// Terminates the current line if the buffer stops mid-line.
    fn finish_line(&mut self) {
        if !self.output.is_empty() && !self.output.ends_with('\n') {
            self.output.push('\n');
        }
    }

    fn append(&mut self, text: &str) {
        self.append_with(text, true);
    }

    fn append_out_of_text(&mut self, text: &str) {
        self.append_with(text, false);
    }

    /// Appends `text`, starting each new line with the prefix (when
    /// `prefixed`) and the list indentation. A fragment that continues an
    /// unfinished line gets neither, so tokens sharing one logical line do
    /// not duplicate the prefix.
    fn append_with(&mut self, text: &str, prefixed: bool) {
        if text.is_empty() {
            return;
        }

        let indent = self
            .indent_unit
            .repeat(self.list_stack.len().saturating_sub(1));
        let lines: Vec<&str> = text.split('\n').collect();
        let last = lines.len() - 1;

        for (i, line) in lines.iter().enumerate() {
            let continues_line =
                i == 0 && !self.output.is_empty() && !self.output.ends_with('\n');
            if continues_line {
                self.output.push_str(line);
            } else if i < last || !line.is_empty() {
                if prefixed {
                    self.output.push_str(&self.style.line_prefix);
                }
                self.output.push_str(&indent);
                self.output.push_str(line);
            }
            if i < last {
                self.output.push('\n');
            }
        }
    }
}

impl Default for MarkdownBuilder {
    fn default() -> Self {
        Self::new(StylePolicy::default())
    }
}

impl TokenBuilder for MarkdownBuilder {
    type Output = String;

    fn push(&mut self, kind: TokenKind, payload: Option<&Payload>) {
        exporter_trace!("push {kind}");
        match (kind, payload) {
            (TokenKind::Text, Some(Payload::Text { text })) => self.append(text),
            (TokenKind::StartQuery, None) => {
                let preamble = self.style.pre_query.clone();
                self.append_out_of_text(&preamble);
            }
            (TokenKind::StartAnswer, None) => {
                let preamble = self.style.pre_answer.clone();
                self.append_out_of_text(&preamble);
            }
            (TokenKind::StartParagraph, None) => {}
            (TokenKind::EndParagraph | TokenKind::Break, None) => self.append("\n"),
            (TokenKind::HLine, None) => self.append("\n\n---\n\n"),
            (TokenKind::StartBold | TokenKind::EndBold, None) => self.append("**"),
            (TokenKind::StartItalic | TokenKind::EndItalic, None) => self.append("*"),
            (TokenKind::Heading, Some(Payload::Heading { level, text })) => {
                let hashes = "#".repeat(usize::from((*level).clamp(1, 6)));
                self.finish_line();
                self.append(&format!("{hashes} {text}\n\n"));
            }
            (TokenKind::Table, Some(Payload::Table { rows })) => self.push_table(rows),
            (TokenKind::Href, Some(Payload::Link { text, link })) => {
                if link.is_empty() {
                    self.diagnostics
                        .warn(Warning::EmptyLink { text: text.clone() });
                } else {
                    self.append(&format!("[{text}]({link})"));
                }
            }
            (TokenKind::Image, Some(Payload::Image { alt, src })) => {
                let alt = if alt.is_empty() {
                    IMAGE_DEFAULT_ALT
                } else {
                    alt.as_str()
                };
                self.append(&format!("![{alt}]({src})"));
            }
            (TokenKind::CodeBlock, Some(Payload::CodeBlock { code, language })) => {
                self.append(&format!("\n```{language}\n{code}\n```\n"));
            }
            (TokenKind::StartOrderedList, Some(Payload::OrderedList { start_index })) => {
                self.list_stack.push(ListFrame::Ordered {
                    next_index: *start_index,
                });
            }
            (TokenKind::StartUnorderedList, None) => self.list_stack.push(ListFrame::Unordered),
            (TokenKind::EndOrderedList | TokenKind::EndUnorderedList, None) => {
                self.pop_list(kind)
            }
            (TokenKind::ListItem, None) => self.push_list_item(),
            (kind, payload) => self.diagnostics.warn(Warning::PayloadMismatch {
                kind,
                payload: payload.map(|p| format!("{p:?}")),
            }),
        }
    }

    fn build(&self) -> String {
        format!("{}\n", self.output.trim())
    }

    fn reset(&mut self) {
        self.output.clear();
        self.list_stack.clear();
        self.diagnostics.clear();
    }
}

fn table_line(cells: &[String]) -> String {
    format!("| {} |\n", cells.join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> MarkdownBuilder {
        MarkdownBuilder::new(StylePolicy::new("", "", ""))
    }

    #[test]
    fn continuation_fragment_gets_no_prefix() {
        let mut builder = MarkdownBuilder::new(StylePolicy::new("> ", "", ""));
        builder.append("one");
        builder.append(" two\nthree");
        assert_eq!(builder.output, "> one two\n> three");
    }

    #[test]
    fn trailing_empty_fragment_is_not_prefixed() {
        let mut builder = MarkdownBuilder::new(StylePolicy::new("> ", "", ""));
        builder.append("line\n");
        assert_eq!(builder.output, "> line\n");
    }

    #[test]
    fn blank_lines_inside_text_keep_prefix() {
        let mut builder = MarkdownBuilder::new(StylePolicy::new("> ", "", ""));
        builder.append("a\n\nb");
        assert_eq!(builder.output, "> a\n> \n> b");
    }

    #[test]
    fn out_of_text_skips_prefix() {
        let mut builder = MarkdownBuilder::new(StylePolicy::new("> ", "", ""));
        builder.append_out_of_text("\nLabel\n");
        assert_eq!(builder.output, "\nLabel\n");
    }

    #[test]
    fn indentation_follows_depth_below_one() {
        let mut builder = plain();
        builder.list_stack.push(ListFrame::Unordered);
        builder.append("a\n");
        builder.list_stack.push(ListFrame::Unordered);
        builder.append("b\n");
        builder.list_stack.push(ListFrame::Ordered { next_index: 1 });
        builder.append("c\n");
        assert_eq!(builder.output, "a\n\tb\n\t\tc\n");
    }

    #[test]
    fn finish_line_is_noop_on_fresh_line() {
        let mut builder = plain();
        builder.finish_line();
        assert!(builder.output.is_empty());
        builder.append("x\n");
        builder.finish_line();
        assert_eq!(builder.output, "x\n");
    }

    #[test]
    fn table_line_is_pipe_delimited() {
        assert_eq!(
            table_line(&["a".to_string(), "b".to_string()]),
            "| a | b |\n"
        );
    }
}
