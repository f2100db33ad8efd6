//! Exporter core: token model, style policy and the Markdown render builder.
mod builder;
mod diagnostics;
mod style;
mod token;

pub use builder::{MarkdownBuilder, TokenBuilder, DEFAULT_INDENT_UNIT};
pub use diagnostics::{Diagnostics, Warning};
pub use style::StylePolicy;
pub use token::{Payload, PayloadShape, Token, TokenKind};
