//! Property tests over arbitrary line-oriented documents.

use marklint_ast::TokenArena;
use marklint_core::rules::EveryNLines;
use marklint_core::{LintContext, Linter, LinterConfig, RuleSet};
use marklint_parser::{MarkdownParser, Parser};
use proptest::prelude::*;

/// Lines joined by an arbitrary mix of `\n`, `\r\n` and `\r`, paired with
/// the number of lines.
fn document() -> impl Strategy<Value = (String, usize)> {
    let line = ("[a-z #`*>-]{0,12}", prop::sample::select(vec!["\n", "\r\n", "\r"]));
    prop::collection::vec(line, 0..30).prop_map(|lines| {
        let mut text = String::new();
        for (index, (content, terminator)) in lines.iter().enumerate() {
            if index > 0 {
                // `\r` then `\n` would read as a single terminator.
                if text.ends_with('\r') && *terminator == "\n" {
                    text.push_str("\r\n");
                } else {
                    text.push_str(terminator);
                }
            }
            text.push_str(content);
        }
        let line_count = if text.is_empty() { 0 } else { lines.len() };
        (text, line_count)
    })
}

proptest! {
    #[test]
    fn test_every_n_lines_reports_multiples((text, line_count) in document(), n in 1u64..6) {
        let rules = RuleSet::new().with_rule(EveryNLines::rule().unwrap()).unwrap();
        let config = LinterConfig::from_json(
            &format!(r#"{{ "options": {{ "every-n-lines": {{ "n": {} }} }} }}"#, n),
        )
        .unwrap();
        let linter = Linter::new(rules, config).unwrap();

        let result = linter.lint_str("doc.md", &text).unwrap();
        let reported: Vec<usize> = result.violations.iter().map(|v| v.line_number).collect();

        let expected: Vec<usize> = (1..=line_count).filter(|l| l % n as usize == 0).collect();
        prop_assert_eq!(reported, expected);
        prop_assert!(result.failures.is_empty());
    }

    #[test]
    fn test_line_metadata_covers_every_line((text, line_count) in document()) {
        let arena = TokenArena::new();
        let stream = MarkdownParser::new().parse(&arena, &text).unwrap();
        let context = LintContext::new("doc.md", &text, stream);

        let metadata = context.line_metadata();
        prop_assert_eq!(context.line_count(), line_count);
        prop_assert_eq!(metadata.len(), line_count);
        for (index, record) in metadata.iter().enumerate() {
            prop_assert_eq!(record.line_number, index + 1);
            prop_assert_eq!(Some(record.text), context.line_text(index + 1));
        }
    }
}
