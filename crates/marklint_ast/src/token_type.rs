//! Token type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Token types produced by the parsers.
///
/// Names serialize in snake_case (`fence`, `code_inline`, ...), the form
/// rules use when they filter the token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum TokenType {
    // Block elements
    /// ATX or setext heading.
    Heading,
    /// Paragraph containing inline content.
    Paragraph,
    /// Block quote.
    BlockQuote,
    /// Ordered or unordered list.
    List,
    /// Item in a list.
    ListItem,
    /// Fenced code block (leaf; content is never tokenized).
    Fence,
    /// Indented code block.
    CodeBlock,
    /// Raw HTML block or inline HTML.
    Html,
    /// Thematic break.
    HorizontalRule,
    /// YAML or TOML front matter.
    FrontMatter,
    /// Table (GFM).
    Table,
    /// Table row (GFM).
    TableRow,
    /// Table cell (GFM).
    TableCell,
    /// Link reference definition.
    Definition,
    /// Footnote definition (GFM).
    FootnoteDefinition,
    /// Display math block.
    Math,

    // Inline elements
    /// Plain text.
    Text,
    /// Inline code span.
    CodeInline,
    /// Emphasis.
    Emphasis,
    /// Strong emphasis.
    Strong,
    /// Strikethrough (GFM).
    Strikethrough,
    /// Inline link.
    Link,
    /// Inline image.
    Image,
    /// Hard line break.
    LineBreak,
    /// Link reference.
    LinkReference,
    /// Image reference.
    ImageReference,
    /// Footnote reference (GFM).
    FootnoteReference,
    /// Inline math.
    InlineMath,

    /// Construct without a dedicated token type.
    Other,
}

impl TokenType {
    /// Returns true if this token type is a block element.
    #[inline]
    pub const fn is_block(&self) -> bool {
        matches!(
            self,
            TokenType::Heading
                | TokenType::Paragraph
                | TokenType::BlockQuote
                | TokenType::List
                | TokenType::ListItem
                | TokenType::Fence
                | TokenType::CodeBlock
                | TokenType::Html
                | TokenType::HorizontalRule
                | TokenType::FrontMatter
                | TokenType::Table
                | TokenType::TableRow
                | TokenType::TableCell
                | TokenType::Definition
                | TokenType::FootnoteDefinition
                | TokenType::Math
        )
    }

    /// Returns true if lines covered by this token hold code rather than prose.
    #[inline]
    pub const fn is_code(&self) -> bool {
        matches!(self, TokenType::Fence | TokenType::CodeBlock)
    }

    /// Returns the snake_case name of this token type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TokenType::Heading => "heading",
            TokenType::Paragraph => "paragraph",
            TokenType::BlockQuote => "block_quote",
            TokenType::List => "list",
            TokenType::ListItem => "list_item",
            TokenType::Fence => "fence",
            TokenType::CodeBlock => "code_block",
            TokenType::Html => "html",
            TokenType::HorizontalRule => "horizontal_rule",
            TokenType::FrontMatter => "front_matter",
            TokenType::Table => "table",
            TokenType::TableRow => "table_row",
            TokenType::TableCell => "table_cell",
            TokenType::Definition => "definition",
            TokenType::FootnoteDefinition => "footnote_definition",
            TokenType::Math => "math",
            TokenType::Text => "text",
            TokenType::CodeInline => "code_inline",
            TokenType::Emphasis => "emphasis",
            TokenType::Strong => "strong",
            TokenType::Strikethrough => "strikethrough",
            TokenType::Link => "link",
            TokenType::Image => "image",
            TokenType::LineBreak => "line_break",
            TokenType::LinkReference => "link_reference",
            TokenType::ImageReference => "image_reference",
            TokenType::FootnoteReference => "footnote_reference",
            TokenType::InlineMath => "inline_math",
            TokenType::Other => "other",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
