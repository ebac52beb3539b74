//! Physical line splitting.
//!
//! `\r\n`, a lone `\r` and `\n` all end a line. Parsers and the rule engine
//! share this splitter so that line numbers agree everywhere.

/// One physical line of a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalLine<'s> {
    /// Byte offset of the first character of the line.
    pub start: usize,
    /// Line content without its terminator.
    pub text: &'s str,
}

impl PhysicalLine<'_> {
    /// Byte offset just past the line content.
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

/// Iterator over the physical lines of a source text.
///
/// A terminator at the very end opens one more, empty line. An empty
/// source has no lines.
#[derive(Debug, Clone)]
pub struct PhysicalLines<'s> {
    source: &'s str,
    offset: usize,
    done: bool,
}

impl<'s> Iterator for PhysicalLines<'s> {
    type Item = PhysicalLine<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let rest = &self.source[self.offset..];
        let start = self.offset;
        match rest.find(['\r', '\n']) {
            Some(pos) => {
                let terminator = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
                self.offset += pos + terminator;
                Some(PhysicalLine {
                    start,
                    text: &rest[..pos],
                })
            }
            None => {
                self.done = true;
                Some(PhysicalLine { start, text: rest })
            }
        }
    }
}

/// Splits `source` into physical lines.
pub fn physical_lines(source: &str) -> PhysicalLines<'_> {
    PhysicalLines {
        source,
        offset: 0,
        done: source.is_empty(),
    }
}
