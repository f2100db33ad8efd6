use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed vocabulary of events flowing from extraction to rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Text,
    StartParagraph,
    EndParagraph,
    Break,
    StartBold,
    EndBold,
    StartItalic,
    EndItalic,
    Heading,
    #[serde(rename = "HLINE")]
    HLine,
    Table,
    Href,
    Image,
    CodeBlock,
    StartUnorderedList,
    EndUnorderedList,
    StartOrderedList,
    EndOrderedList,
    ListItem,
    StartQuery,
    StartAnswer,
}

impl TokenKind {
    /// Payload shape a token of this kind must carry, `None` for pure markers.
    pub fn expected_payload(self) -> Option<PayloadShape> {
        match self {
            TokenKind::Text => Some(PayloadShape::Text),
            TokenKind::Heading => Some(PayloadShape::Heading),
            TokenKind::Image => Some(PayloadShape::Image),
            TokenKind::Href => Some(PayloadShape::Link),
            TokenKind::CodeBlock => Some(PayloadShape::CodeBlock),
            TokenKind::Table => Some(PayloadShape::Table),
            TokenKind::StartOrderedList => Some(PayloadShape::OrderedList),
            TokenKind::StartParagraph
            | TokenKind::EndParagraph
            | TokenKind::Break
            | TokenKind::StartBold
            | TokenKind::EndBold
            | TokenKind::StartItalic
            | TokenKind::EndItalic
            | TokenKind::HLine
            | TokenKind::StartUnorderedList
            | TokenKind::EndUnorderedList
            | TokenKind::EndOrderedList
            | TokenKind::ListItem
            | TokenKind::StartQuery
            | TokenKind::StartAnswer => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Text => "TEXT",
            TokenKind::StartParagraph => "START_PARAGRAPH",
            TokenKind::EndParagraph => "END_PARAGRAPH",
            TokenKind::Break => "BREAK",
            TokenKind::StartBold => "START_BOLD",
            TokenKind::EndBold => "END_BOLD",
            TokenKind::StartItalic => "START_ITALIC",
            TokenKind::EndItalic => "END_ITALIC",
            TokenKind::Heading => "HEADING",
            TokenKind::HLine => "HLINE",
            TokenKind::Table => "TABLE",
            TokenKind::Href => "HREF",
            TokenKind::Image => "IMAGE",
            TokenKind::CodeBlock => "CODE_BLOCK",
            TokenKind::StartUnorderedList => "START_UNORDERED_LIST",
            TokenKind::EndUnorderedList => "END_UNORDERED_LIST",
            TokenKind::StartOrderedList => "START_ORDERED_LIST",
            TokenKind::EndOrderedList => "END_ORDERED_LIST",
            TokenKind::ListItem => "LIST_ITEM",
            TokenKind::StartQuery => "START_QUERY",
            TokenKind::StartAnswer => "START_ANSWER",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    Text,
    Heading,
    Image,
    Link,
    CodeBlock,
    Table,
    OrderedList,
}

/// Kind-specific data carried by a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Payload {
    Text { text: String },
    Heading { level: u8, text: String },
    Image { alt: String, src: String },
    Link { text: String, link: String },
    CodeBlock { code: String, language: String },
    /// Row-major grid, first row is the header.
    Table { rows: Vec<Vec<String>> },
    OrderedList { start_index: u32 },
}

impl Payload {
    pub fn shape(&self) -> PayloadShape {
        match self {
            Payload::Text { .. } => PayloadShape::Text,
            Payload::Heading { .. } => PayloadShape::Heading,
            Payload::Image { .. } => PayloadShape::Image,
            Payload::Link { .. } => PayloadShape::Link,
            Payload::CodeBlock { .. } => PayloadShape::CodeBlock,
            Payload::Table { .. } => PayloadShape::Table,
            Payload::OrderedList { .. } => PayloadShape::OrderedList,
        }
    }
}

/// One event of the intermediate representation.
///
/// A stream of tokens is flat: nesting is expressed by matched start/end
/// kinds, never by containment. List items are the exception and have no
/// end token; an item runs until the next item or the end of its list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

impl Token {
    /// Token without payload. Use the typed constructors for data kinds.
    pub fn marker(kind: TokenKind) -> Self {
        Self {
            kind,
            payload: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::with_payload(TokenKind::Text, Payload::Text { text: text.into() })
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::with_payload(
            TokenKind::Heading,
            Payload::Heading {
                level,
                text: text.into(),
            },
        )
    }

    pub fn image(alt: impl Into<String>, src: impl Into<String>) -> Self {
        Self::with_payload(
            TokenKind::Image,
            Payload::Image {
                alt: alt.into(),
                src: src.into(),
            },
        )
    }

    pub fn href(text: impl Into<String>, link: impl Into<String>) -> Self {
        Self::with_payload(
            TokenKind::Href,
            Payload::Link {
                text: text.into(),
                link: link.into(),
            },
        )
    }

    pub fn code_block(code: impl Into<String>, language: impl Into<String>) -> Self {
        Self::with_payload(
            TokenKind::CodeBlock,
            Payload::CodeBlock {
                code: code.into(),
                language: language.into(),
            },
        )
    }

    pub fn table(rows: Vec<Vec<String>>) -> Self {
        Self::with_payload(TokenKind::Table, Payload::Table { rows })
    }

    pub fn ordered_list(start_index: u32) -> Self {
        Self::with_payload(
            TokenKind::StartOrderedList,
            Payload::OrderedList { start_index },
        )
    }

    fn with_payload(kind: TokenKind, payload: Payload) -> Self {
        Self {
            kind,
            payload: Some(payload),
        }
    }

    /// True when the payload matches the shape required by the kind.
    pub fn is_well_formed(&self) -> bool {
        self.kind.expected_payload() == self.payload.as_ref().map(Payload::shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_produce_well_formed_tokens() {
        let tokens = [
            Token::text("hi"),
            Token::heading(2, "Title"),
            Token::image("alt", "a.png"),
            Token::href("x", "https://x"),
            Token::code_block("x=1", "python"),
            Token::table(vec![vec!["a".into()]]),
            Token::ordered_list(3),
            Token::marker(TokenKind::ListItem),
        ];
        assert!(tokens.iter().all(Token::is_well_formed));
    }

    #[test]
    fn marker_for_data_kind_is_not_well_formed() {
        assert!(!Token::marker(TokenKind::Text).is_well_formed());
        let mismatched = Token {
            kind: TokenKind::Break,
            payload: Some(Payload::Text { text: "x".into() }),
        };
        assert!(!mismatched.is_well_formed());
    }

    #[test]
    fn equality_is_by_value() {
        assert_eq!(Token::href("a", "b"), Token::href("a", "b"));
        assert_ne!(Token::href("a", "b"), Token::href("a", "c"));
    }

    #[test]
    fn display_uses_wire_names() {
        assert_eq!(TokenKind::HLine.to_string(), "HLINE");
        assert_eq!(TokenKind::StartOrderedList.to_string(), "START_ORDERED_LIST");
    }

    #[test]
    fn wire_format_round_trips() {
        let tokens = vec![
            Token::marker(TokenKind::HLine),
            Token::href("docs", "https://example.com"),
            Token::marker(TokenKind::StartQuery),
        ];

        let json = serde_json::to_value(&tokens).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "kind": "HLINE" },
                {
                    "kind": "HREF",
                    "payload": { "shape": "link", "text": "docs", "link": "https://example.com" }
                },
                { "kind": "START_QUERY" }
            ])
        );

        let back: Vec<Token> = serde_json::from_value(json).unwrap();
        assert_eq!(back, tokens);
    }
}
