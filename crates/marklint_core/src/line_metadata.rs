//! Line metadata index.
//!
//! Every physical line of a document gets one [`LineRecord`], blank lines
//! included, in ascending order. Each record knows the innermost block
//! token covering it and whether the line is prose, code or front matter.

use marklint_ast::{Token, TokenIter, TokenType};
use serde::Serialize;

use crate::rule::RuleParams;

/// Classification of a line by the block that contains it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Ordinary markdown content (or a line outside any block).
    Text,
    /// Inside a fenced or indented code block, delimiters included.
    Code,
    /// Inside the front matter block.
    FrontMatter,
}

/// Metadata for one physical line.
#[derive(Debug, Clone, Copy)]
pub struct LineRecord<'a> {
    /// 1-based line number.
    pub line_number: usize,
    /// Line text without its terminator.
    pub text: &'a str,
    /// What kind of block the line belongs to.
    pub kind: LineKind,
    /// Innermost block token covering the line, if any.
    pub token: Option<&'a Token<'a>>,
}

impl LineRecord<'_> {
    /// Returns true for lines inside code blocks.
    pub fn is_code(&self) -> bool {
        self.kind == LineKind::Code
    }
}

/// Line-complete metadata for a document.
#[derive(Debug, Clone, Default)]
pub struct LineMetadata<'a> {
    records: Vec<LineRecord<'a>>,
}

impl<'a> LineMetadata<'a> {
    /// Builds the index from the document's lines and its token stream.
    pub fn build(texts: &[&'a str], tokens: &'a [Token<'a>]) -> Self {
        let mut records: Vec<LineRecord<'a>> = texts
            .iter()
            .copied()
            .enumerate()
            .map(|(idx, text)| LineRecord {
                line_number: idx + 1,
                text,
                kind: LineKind::Text,
                token: None,
            })
            .collect();

        // Pre-order visits containers before their children, so the last
        // assignment to a line is its innermost block.
        for token in TokenIter::new(tokens).filter(|t| t.token_type.is_block()) {
            let kind = if token.token_type.is_code() {
                LineKind::Code
            } else if token.token_type == TokenType::FrontMatter {
                LineKind::FrontMatter
            } else {
                LineKind::Text
            };
            let first = (token.line_number as usize).max(1);
            let last = (token.end_line as usize).min(records.len());
            for record in records.iter_mut().take(last).skip(first - 1) {
                record.token = Some(token);
                record.kind = kind;
            }
        }

        Self { records }
    }

    /// Returns the number of lines.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the document has no lines.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the record of a 1-based line number.
    pub fn get(&self, line_number: usize) -> Option<&LineRecord<'a>> {
        line_number
            .checked_sub(1)
            .and_then(|idx| self.records.get(idx))
    }

    /// Iterates over the records in line order.
    pub fn iter(&self) -> std::slice::Iter<'_, LineRecord<'a>> {
        self.records.iter()
    }
}

impl<'m, 'a> IntoIterator for &'m LineMetadata<'a> {
    type Item = &'m LineRecord<'a>;
    type IntoIter = std::slice::Iter<'m, LineRecord<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Returns the line metadata of the document a rule is linting.
///
/// Computed once per context and shared by every rule that asks for it.
pub fn get_line_metadata<'a>(params: &RuleParams<'a>) -> &'a LineMetadata<'a> {
    params.context.line_metadata()
}

/// Calls `visit` with every record and its 0-based index, in line order.
pub fn for_each_line<'a, F>(metadata: &LineMetadata<'a>, mut visit: F)
where
    F: FnMut(&LineRecord<'a>, usize),
{
    for (index, record) in metadata.iter().enumerate() {
        visit(record, index);
    }
}
