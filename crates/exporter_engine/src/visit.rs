use ego_tree::{NodeId, NodeRef};
use exporter_core::{Diagnostics, Token, TokenKind, Warning};
use exporter_logging::exporter_trace;
use scraper::node::{Element, Node};
use scraper::ElementRef;
use url::Url;

use crate::profile::SourceProfile;

const IMAGE_DEFAULT_ALT: &str = "Image";
const DEFAULT_LIST_START: u32 = 1;

/// What an element means to the token stream, decided once from its tag
/// name and classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    LineBreak,
    Bold,
    Italic,
    Container,
    HiddenContainer,
    Paragraph,
    HorizontalRule,
    Heading(u8),
    Image,
    Anchor,
    TableWrapper,
    Table,
    CodeBlock,
    OrderedList,
    UnorderedList,
    ListItem,
    Video,
    PassThrough,
}

fn classify(element: &Element, profile: &SourceProfile) -> ElementKind {
    let name = element.name();
    if name == profile.code_block_tag {
        return ElementKind::CodeBlock;
    }
    if name == profile.table_wrapper_tag {
        return ElementKind::TableWrapper;
    }
    if profile.is_video_tag(name) {
        return ElementKind::Video;
    }

    match name {
        "br" => ElementKind::LineBreak,
        "b" | "strong" => ElementKind::Bold,
        "i" | "em" => ElementKind::Italic,
        "div" => {
            if element.classes().any(|c| profile.is_blacklisted_class(c)) {
                ElementKind::HiddenContainer
            } else {
                ElementKind::Container
            }
        }
        "p" => ElementKind::Paragraph,
        "hr" => ElementKind::HorizontalRule,
        "img" => ElementKind::Image,
        "a" => ElementKind::Anchor,
        "table" => ElementKind::Table,
        "ol" => ElementKind::OrderedList,
        "ul" => ElementKind::UnorderedList,
        "li" => ElementKind::ListItem,
        _ => heading_level(name).map_or(ElementKind::PassThrough, ElementKind::Heading),
    }
}

fn heading_level(name: &str) -> Option<u8> {
    name.strip_prefix('h')
        .and_then(|digits| digits.parse::<u8>().ok())
        .filter(|level| (1..=6).contains(level))
}

/// Depth-first walk emitting tokens for one extraction call.
pub(crate) struct TokenVisitor<'p, 'd> {
    profile: &'p SourceProfile,
    base_url: Option<&'p Url>,
    diagnostics: &'d mut Diagnostics,
    tokens: Vec<Token>,
}

impl<'p, 'd> TokenVisitor<'p, 'd> {
    pub(crate) fn new(
        profile: &'p SourceProfile,
        base_url: Option<&'p Url>,
        diagnostics: &'d mut Diagnostics,
    ) -> Self {
        Self {
            profile,
            base_url,
            diagnostics,
            tokens: Vec::new(),
        }
    }

    pub(crate) fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    pub(crate) fn emit(&mut self, token: Token) {
        self.tokens.push(token);
    }

    fn emit_marker(&mut self, kind: TokenKind) {
        self.emit(Token::marker(kind));
    }

    pub(crate) fn visit_children(&mut self, element: ElementRef) {
        for child in element.children() {
            self.visit_node(child);
        }
    }

    fn visit_node(&mut self, node: NodeRef<'_, Node>) {
        match node.value() {
            Node::Text(text) => self.visit_text(text),
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(node) {
                    self.visit_element(element);
                }
            }
            // Comments, doctypes and processing instructions carry no content.
            _ => {}
        }
    }

    fn visit_text(&mut self, text: &str) {
        if !text.trim().is_empty() {
            self.emit(Token::text(text));
        }
    }

    fn visit_element(&mut self, element: ElementRef) {
        match classify(element.value(), self.profile) {
            ElementKind::LineBreak => self.emit_marker(TokenKind::Break),
            ElementKind::Bold => {
                self.emit_marker(TokenKind::StartBold);
                self.visit_children(element);
                self.emit_marker(TokenKind::EndBold);
            }
            ElementKind::Italic => {
                self.emit_marker(TokenKind::StartItalic);
                self.visit_children(element);
                self.emit_marker(TokenKind::EndItalic);
            }
            ElementKind::Container | ElementKind::TableWrapper | ElementKind::PassThrough => {
                self.visit_children(element);
            }
            ElementKind::HiddenContainer => {
                exporter_trace!("skipping blacklisted container");
            }
            ElementKind::Paragraph => {
                if has_content(element) {
                    self.emit_marker(TokenKind::StartParagraph);
                    self.visit_children(element);
                    self.emit_marker(TokenKind::EndParagraph);
                }
            }
            ElementKind::HorizontalRule => self.emit_marker(TokenKind::HLine),
            ElementKind::Heading(level) => {
                self.emit(Token::heading(level, flattened_text(element)));
            }
            ElementKind::Image => self.visit_image(element),
            ElementKind::Anchor => self.visit_anchor(element),
            ElementKind::Table => self.visit_table(element),
            ElementKind::CodeBlock => self.visit_code_block(element),
            ElementKind::OrderedList => {
                let start = list_start(element).unwrap_or_else(|warning| {
                    self.diagnostics.warn(warning);
                    DEFAULT_LIST_START
                });
                self.emit(Token::ordered_list(start));
                self.visit_children(element);
                self.emit_marker(TokenKind::EndOrderedList);
            }
            ElementKind::UnorderedList => {
                self.emit_marker(TokenKind::StartUnorderedList);
                self.visit_children(element);
                self.emit_marker(TokenKind::EndUnorderedList);
            }
            ElementKind::ListItem => {
                self.emit_marker(TokenKind::ListItem);
                self.visit_children(element);
            }
            ElementKind::Video => {
                self.visit_children(element);
                self.emit_marker(TokenKind::Break);
            }
        }
    }

    fn visit_image(&mut self, element: ElementRef) {
        let Some(src) = non_empty_attr(element, "src") else {
            self.diagnostics.warn(Warning::ImageWithoutSource);
            return;
        };
        let alt = non_empty_attr(element, "alt").unwrap_or(IMAGE_DEFAULT_ALT);
        let src = self.resolve(src);
        self.emit(Token::image(alt, src));
    }

    fn visit_anchor(&mut self, element: ElementRef) {
        let text = flattened_text(element);
        match non_empty_attr(element, "href") {
            Some(href) => {
                let link = self.resolve(href);
                let text = if text.is_empty() { link.clone() } else { text };
                self.emit(Token::href(text, link));
            }
            None => {
                self.diagnostics.warn(Warning::AnchorWithoutHref { text });
                self.visit_children(element);
            }
        }
    }

    fn visit_table(&mut self, table: ElementRef) {
        match table_rows(table) {
            Ok(rows) => self.emit(Token::table(rows)),
            Err(warning) => self.diagnostics.warn(warning),
        }
    }

    fn visit_code_block(&mut self, block: ElementRef) {
        let mut language: Option<String> = None;
        let mut code: Option<String> = None;
        for element in block.descendants().filter_map(ElementRef::wrap) {
            if language.is_none() && self.is_language_marker(element.value()) {
                language = Some(language_label(element));
            }
            if code.is_none() && element.value().name() == "code" {
                code = Some(element.text().collect());
            }
            if language.is_some() && code.is_some() {
                break;
            }
        }

        let code = code
            .map(|text| text.trim_end_matches('\n').to_string())
            .unwrap_or_default();
        self.emit(Token::code_block(code, language.unwrap_or_default()));
    }

    fn is_language_marker(&self, element: &Element) -> bool {
        let prefix = self.profile.language_class_prefix.as_str();
        !prefix.is_empty() && element.classes().any(|c| c.starts_with(prefix))
    }

    /// Absolute references and fragments are kept verbatim.
    fn resolve(&self, reference: &str) -> String {
        let Some(base) = self.base_url else {
            return reference.to_string();
        };
        if reference.starts_with('#') || Url::parse(reference).is_ok() {
            return reference.to_string();
        }
        base.join(reference)
            .map(String::from)
            .unwrap_or_else(|_| reference.to_string())
    }
}

fn non_empty_attr<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn has_content(element: ElementRef) -> bool {
    element.children().any(|child| match child.value() {
        Node::Element(_) => true,
        Node::Text(text) => !text.trim().is_empty(),
        _ => false,
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn flattened_text(element: ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// First non-blank text inside the marker; the marker also hosts button
/// labels that must not leak into the fence info string.
fn language_label(marker: ElementRef) -> String {
    marker
        .text()
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

/// Counters are unsigned, so negative starts are reported and replaced by 1.
fn list_start(element: ElementRef) -> Result<u32, Warning> {
    let Some(value) = element.value().attr("start") else {
        return Ok(DEFAULT_LIST_START);
    };
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| Warning::InvalidListStart {
            value: value.to_string(),
        })
}

fn table_rows(table: ElementRef) -> Result<Vec<Vec<String>>, Warning> {
    let rows: Vec<Vec<String>> = table
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| {
            element.value().name() == "tr" && owning_table(*element) == Some(table.id())
        })
        .map(|row| {
            row.children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| matches!(cell.value().name(), "th" | "td"))
                .map(cell_text)
                .collect()
        })
        .collect();

    let Some(header) = rows.first() else {
        return Err(Warning::TableWithoutRows);
    };
    let columns = header.len();
    if columns == 0 {
        return Err(Warning::TableWithoutColumns);
    }
    if let Some((row, cells)) = rows
        .iter()
        .enumerate()
        .find(|(_, cells)| cells.len() != columns)
    {
        return Err(Warning::TableInconsistentColumns {
            row,
            expected: columns,
            found: cells.len(),
        });
    }
    Ok(rows)
}

/// Nearest enclosing `table`; rows of tables nested in cells belong to the
/// inner table only.
fn owning_table(row: ElementRef) -> Option<NodeId> {
    row.ancestors()
        .find(|node| matches!(node.value(), Node::Element(e) if e.name() == "table"))
        .map(|node| node.id())
}

fn cell_text(cell: ElementRef) -> String {
    flattened_text(cell).replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn first<'a>(doc: &'a Html, selector: &str) -> ElementRef<'a> {
        let selector = Selector::parse(selector).unwrap();
        doc.select(&selector).next().unwrap()
    }

    #[test]
    fn classify_recognises_profile_tags() {
        let profile = SourceProfile::default();
        let doc = Html::parse_fragment(
            "<code-block></code-block><table-block></table-block><youtube-block></youtube-block>",
        );
        assert_eq!(
            classify(first(&doc, "code-block").value(), &profile),
            ElementKind::CodeBlock
        );
        assert_eq!(
            classify(first(&doc, "table-block").value(), &profile),
            ElementKind::TableWrapper
        );
        assert_eq!(
            classify(first(&doc, "youtube-block").value(), &profile),
            ElementKind::Video
        );
    }

    #[test]
    fn classify_hides_blacklisted_divs_only() {
        let profile = SourceProfile::default();
        let doc = Html::parse_fragment(
            r#"<div class="x table-footer">a</div><div class="plain">b</div><span class="table-footer">c</span>"#,
        );
        assert_eq!(
            classify(first(&doc, "div.table-footer").value(), &profile),
            ElementKind::HiddenContainer
        );
        assert_eq!(
            classify(first(&doc, "div.plain").value(), &profile),
            ElementKind::Container
        );
        assert_eq!(
            classify(first(&doc, "span").value(), &profile),
            ElementKind::PassThrough
        );
    }

    #[test]
    fn heading_levels_are_bounded() {
        assert_eq!(heading_level("h1"), Some(1));
        assert_eq!(heading_level("h6"), Some(6));
        assert_eq!(heading_level("h7"), None);
        assert_eq!(heading_level("header"), None);
        assert_eq!(heading_level("hr"), None);
    }

    #[test]
    fn list_start_rejects_non_counting_values() {
        let doc = Html::parse_fragment(
            r#"<ol id="a" start="4"></ol><ol id="b" start="x"></ol><ol id="c" start="-2"></ol><ol id="d"></ol>"#,
        );
        assert_eq!(list_start(first(&doc, "#a")), Ok(4));
        assert_eq!(
            list_start(first(&doc, "#b")),
            Err(Warning::InvalidListStart {
                value: "x".to_string()
            })
        );
        assert_eq!(
            list_start(first(&doc, "#c")),
            Err(Warning::InvalidListStart {
                value: "-2".to_string()
            })
        );
        assert_eq!(list_start(first(&doc, "#d")), Ok(1));
    }

    #[test]
    fn cell_text_collapses_whitespace_and_escapes_pipes() {
        let doc = Html::parse_fragment("<table><tr><td>  a |\n b  </td></tr></table>");
        assert_eq!(cell_text(first(&doc, "td")), "a \\| b");
    }
}
