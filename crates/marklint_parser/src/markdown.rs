//! Markdown parser using markdown-rs (wooorm/markdown-rs).
//!
//! This parser converts the mdast produced by the `markdown` crate into a
//! token stream. Every token carries the 1-based line span of the node it
//! was converted from.

use markdown::mdast::Node;
use markdown::{Constructs, ParseOptions, to_mdast};
use marklint_ast::{Span, Token, TokenArena, TokenType};

use crate::error::check_source;
use crate::{ParseError, Parser, ParserKind, TokenStream};

/// Markdown parser implementation.
///
/// Uses `markdown-rs` for parsing, with:
/// - CommonMark
/// - GFM (GitHub Flavored Markdown)
/// - Front matter (YAML and TOML)
pub struct MarkdownParser;

impl MarkdownParser {
    /// Creates a new Markdown parser with default options.
    pub fn new() -> Self {
        Self
    }

    /// Gets default parse options (GFM with front matter).
    fn default_options() -> ParseOptions {
        ParseOptions {
            constructs: Constructs {
                frontmatter: true,
                ..Constructs::gfm()
            },
            ..ParseOptions::gfm()
        }
    }

    /// Converts an mdast node to a token.
    fn convert_node<'a>(&self, arena: &'a TokenArena, node: &Node, source: &str) -> Token<'a> {
        let (span, line_number, end_line) = Self::node_position(node);
        let token_type = Self::token_type(node, source, span);

        let children: &'a [Token<'a>] = match node.children() {
            Some(children) if !children.is_empty() => {
                self.convert_children(arena, children, source)
            }
            _ => &[],
        };

        let content = match node {
            Node::Code(code) => code.value.as_str(),
            Node::InlineCode(code) => code.value.as_str(),
            Node::Text(text) => text.value.as_str(),
            Node::Html(html) => html.value.as_str(),
            Node::Yaml(yaml) => yaml.value.as_str(),
            Node::Toml(toml) => toml.value.as_str(),
            Node::Math(math) => math.value.as_str(),
            Node::InlineMath(math) => math.value.as_str(),
            _ => span.slice(source).unwrap_or(""),
        };

        let token = Token::container(
            token_type,
            line_number,
            end_line,
            span,
            arena.alloc_str(content),
            children,
        );

        match node {
            Node::Code(code) => token.with_info(arena.alloc_str(&Self::info_string(
                code.lang.as_deref(),
                code.meta.as_deref(),
            ))),
            _ => token,
        }
    }

    /// Converts a list of mdast children to a token slice.
    fn convert_children<'a>(
        &self,
        arena: &'a TokenArena,
        children: &[Node],
        source: &str,
    ) -> &'a [Token<'a>] {
        arena.alloc_slice_fill_iter(
            children
                .iter()
                .map(|child| self.convert_node(arena, child, source)),
        )
    }

    fn token_type(node: &Node, source: &str, span: Span) -> TokenType {
        match node {
            Node::Heading(_) => TokenType::Heading,
            Node::Paragraph(_) => TokenType::Paragraph,
            Node::Blockquote(_) => TokenType::BlockQuote,
            Node::List(_) => TokenType::List,
            Node::ListItem(_) => TokenType::ListItem,
            Node::Code(_) => {
                if Self::is_fenced(source, span) {
                    TokenType::Fence
                } else {
                    TokenType::CodeBlock
                }
            }
            Node::Html(_) => TokenType::Html,
            Node::ThematicBreak(_) => TokenType::HorizontalRule,
            Node::Yaml(_) | Node::Toml(_) => TokenType::FrontMatter,
            Node::Table(_) => TokenType::Table,
            Node::TableRow(_) => TokenType::TableRow,
            Node::TableCell(_) => TokenType::TableCell,
            Node::Definition(_) => TokenType::Definition,
            Node::FootnoteDefinition(_) => TokenType::FootnoteDefinition,
            Node::Math(_) => TokenType::Math,
            Node::Text(_) => TokenType::Text,
            Node::InlineCode(_) => TokenType::CodeInline,
            Node::Emphasis(_) => TokenType::Emphasis,
            Node::Strong(_) => TokenType::Strong,
            Node::Delete(_) => TokenType::Strikethrough,
            Node::Link(_) => TokenType::Link,
            Node::Image(_) => TokenType::Image,
            Node::Break(_) => TokenType::LineBreak,
            Node::LinkReference(_) => TokenType::LinkReference,
            Node::ImageReference(_) => TokenType::ImageReference,
            Node::FootnoteReference(_) => TokenType::FootnoteReference,
            Node::InlineMath(_) => TokenType::InlineMath,
            _ => TokenType::Other,
        }
    }

    /// mdast does not distinguish fenced from indented code; the opening
    /// delimiter in the source does.
    fn is_fenced(source: &str, span: Span) -> bool {
        span.slice(source)
            .map(|text| {
                let text = text.trim_start_matches([' ', '\t']);
                text.starts_with("```") || text.starts_with("~~~")
            })
            .unwrap_or(false)
    }

    fn info_string(lang: Option<&str>, meta: Option<&str>) -> String {
        match (lang, meta) {
            (Some(lang), Some(meta)) => format!("{} {}", lang, meta),
            (Some(lang), None) => lang.to_string(),
            (None, _) => String::new(),
        }
    }

    /// Gets the byte span and 1-based line range of an mdast node.
    fn node_position(node: &Node) -> (Span, u32, u32) {
        match node.position() {
            Some(pos) => (
                Span::new(pos.start.offset as u32, pos.end.offset as u32),
                pos.start.line as u32,
                pos.end.line as u32,
            ),
            None => (Span::new(0, 0), 1, 1),
        }
    }
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for MarkdownParser {
    fn kind(&self) -> ParserKind {
        ParserKind::Markdown
    }

    fn extensions(&self) -> &[&str] {
        &["md", "markdown", "mdown", "mkdn", "mkd"]
    }

    fn parse<'a>(
        &self,
        arena: &'a TokenArena,
        source: &str,
    ) -> Result<TokenStream<'a>, ParseError> {
        check_source(source)?;

        let options = Self::default_options();
        let mdast =
            to_mdast(source, &options).map_err(|e| ParseError::invalid_source(e.to_string()))?;

        let tokens: &'a [Token<'a>] = match mdast.children() {
            Some(children) => self.convert_children(arena, children, source),
            None => &[],
        };

        Ok(TokenStream::new(ParserKind::Markdown, tokens))
    }
}
