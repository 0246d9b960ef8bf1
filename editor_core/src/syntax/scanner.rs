//! Line scanner.
//!
//! Classifies one line at a time given the scan state left by the previous
//! line. Scanning never fails and depends on nothing but its inputs.

use super::lex::{LexSpan, ScanResult, ScanState, TokenKind};
use super::quote::{matches_at, QuoteKind, QuoteRule, Syntax, ESCAPE_CHAR};

/// How a quote ended on the scanned line.
enum QuoteEnd {
    /// Closed; the column just past the end marker.
    Closed(usize),
    /// Reached end of line. `continues` is true if the quote carries on to
    /// the next line.
    Open { continues: bool },
}

/// Scans `text` starting in `state_in`.
pub fn scan_line(text: &str, state_in: ScanState, syntax: &Syntax) -> ScanResult {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut spans = Vec::new();
    let mut i = 0;

    if let ScanState::Quote(index) = state_in {
        if let Some(rule) = syntax.quote(index) {
            match find_quote_end(&chars, 0, rule) {
                QuoteEnd::Closed(end) => {
                    push_span(&mut spans, 0, end, rule.token());
                    i = end;
                }
                QuoteEnd::Open { continues } => {
                    push_span(&mut spans, 0, len, rule.token());
                    return ScanResult {
                        spans,
                        state_out: open_state(index, continues),
                    };
                }
            }
        }
    }

    while i < len {
        if let Some((index, rule)) = syntax.match_start(&chars, i) {
            let body = i + rule.start().len();
            match find_quote_end(&chars, body, rule) {
                QuoteEnd::Closed(end) => {
                    push_span(&mut spans, i, end, rule.token());
                    i = end;
                    continue;
                }
                QuoteEnd::Open { continues } => {
                    push_span(&mut spans, i, len, rule.token());
                    return ScanResult {
                        spans,
                        state_out: open_state(index, continues),
                    };
                }
            }
        }

        let ch = chars[i];
        if ch.is_ascii_digit() {
            let end = scan_while(&chars, i, |c| c.is_alphanumeric() || c == '_' || c == '.');
            push_span(&mut spans, i, end, TokenKind::Number);
            i = end;
        } else if ch.is_alphabetic() || ch == '_' {
            let end = scan_while(&chars, i, is_word_char);
            let word: String = chars[i..end].iter().collect();
            let kind = if syntax.is_keyword(&word) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            };
            push_span(&mut spans, i, end, kind);
            i = end;
        } else {
            i += 1;
        }
    }

    ScanResult {
        spans,
        state_out: ScanState::Normal,
    }
}

/// Word characters for identifiers and whole-word matching.
pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn open_state(index: usize, continues: bool) -> ScanState {
    if continues {
        ScanState::Quote(index)
    } else {
        ScanState::Normal
    }
}

fn find_quote_end(chars: &[char], from: usize, rule: &QuoteRule) -> QuoteEnd {
    let len = chars.len();
    let mut j = from;

    match rule.kind() {
        QuoteKind::MultiLine => {
            while j < len {
                if matches_at(chars, j, rule.end()) {
                    return QuoteEnd::Closed(j + rule.end().len());
                }
                j += 1;
            }
            QuoteEnd::Open { continues: true }
        }
        QuoteKind::SingleLineEscaped => {
            while j < len {
                if chars[j] == ESCAPE_CHAR {
                    if j + 1 == len {
                        return QuoteEnd::Open { continues: true };
                    }
                    j += 2;
                    continue;
                }
                if matches_at(chars, j, rule.end()) {
                    return QuoteEnd::Closed(j + rule.end().len());
                }
                j += 1;
            }
            QuoteEnd::Open { continues: false }
        }
    }
}

fn scan_while(chars: &[char], from: usize, pred: impl Fn(char) -> bool) -> usize {
    let mut end = from;
    while end < chars.len() && pred(chars[end]) {
        end += 1;
    }
    end
}

fn push_span(spans: &mut Vec<LexSpan>, start: usize, end: usize, kind: TokenKind) {
    if end > start {
        spans.push(LexSpan::new(start, end - start, kind));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::quote::QuoteRule;

    fn cpp_syntax() -> Syntax {
        Syntax::new()
            .with_quote(QuoteRule::new(TokenKind::Comment, "/*", "*/", QuoteKind::MultiLine))
            .unwrap()
            .with_quote(QuoteRule::new(TokenKind::Comment, "//", "", QuoteKind::SingleLineEscaped))
            .unwrap()
            .with_quote(QuoteRule::new(TokenKind::String, "\"", "\"", QuoteKind::SingleLineEscaped))
            .unwrap()
            .with_quote(QuoteRule::new(
                TokenKind::Preprocessor,
                "#",
                "",
                QuoteKind::SingleLineEscaped,
            ))
            .unwrap()
            .with_keywords(&["int", "return"])
    }

    fn kinds(result: &ScanResult) -> Vec<(usize, usize, TokenKind)> {
        result.spans.iter().map(|s| (s.offset, s.len, s.kind)).collect()
    }

    #[test]
    fn test_words_and_numbers() {
        let result = scan_line("int a = 42;", ScanState::Normal, &cpp_syntax());
        assert_eq!(
            kinds(&result),
            vec![
                (0, 3, TokenKind::Keyword),
                (4, 1, TokenKind::Identifier),
                (8, 2, TokenKind::Number),
            ]
        );
        assert_eq!(result.state_out, ScanState::Normal);
    }

    #[test]
    fn test_line_comment() {
        let result = scan_line("int i;  // {", ScanState::Normal, &cpp_syntax());
        assert_eq!(result.spans.last().unwrap().kind, TokenKind::Comment);
        assert_eq!(result.spans.last().unwrap().offset, 8);
        assert_eq!(result.spans.last().unwrap().end(), 12);
        assert_eq!(result.state_out, ScanState::Normal);
    }

    #[test]
    fn test_line_comment_continues_with_escape() {
        let syntax = cpp_syntax();
        let first = scan_line("// note \\", ScanState::Normal, &syntax);
        assert_eq!(first.state_out, ScanState::Quote(1));

        let second = scan_line("still comment", first.state_out, &syntax);
        assert_eq!(kinds(&second), vec![(0, 13, TokenKind::Comment)]);
        assert_eq!(second.state_out, ScanState::Normal);
    }

    #[test]
    fn test_block_comment_spanning_lines() {
        let syntax = cpp_syntax();
        let first = scan_line("a /* open", ScanState::Normal, &syntax);
        assert_eq!(first.state_out, ScanState::Quote(0));

        let middle = scan_line("{ ( inside", first.state_out, &syntax);
        assert_eq!(kinds(&middle), vec![(0, 10, TokenKind::Comment)]);
        assert_eq!(middle.state_out, ScanState::Quote(0));

        let last = scan_line("end */ b", middle.state_out, &syntax);
        assert_eq!(
            kinds(&last),
            vec![(0, 6, TokenKind::Comment), (7, 1, TokenKind::Identifier)]
        );
        assert_eq!(last.state_out, ScanState::Normal);
    }

    #[test]
    fn test_block_comment_closed_on_same_line() {
        let result = scan_line("/* x */ y", ScanState::Normal, &cpp_syntax());
        assert_eq!(
            kinds(&result),
            vec![(0, 7, TokenKind::Comment), (8, 1, TokenKind::Identifier)]
        );
    }

    #[test]
    fn test_string_with_escaped_quote() {
        let result = scan_line(r#"s = "a\"{" + b"#, ScanState::Normal, &cpp_syntax());
        assert_eq!(
            kinds(&result),
            vec![
                (0, 1, TokenKind::Identifier),
                (4, 6, TokenKind::String),
                (13, 1, TokenKind::Identifier),
            ]
        );
    }

    #[test]
    fn test_unterminated_string_ends_at_eol() {
        let result = scan_line("\"abc", ScanState::Normal, &cpp_syntax());
        assert_eq!(kinds(&result), vec![(0, 4, TokenKind::String)]);
        assert_eq!(result.state_out, ScanState::Normal);
    }

    #[test]
    fn test_macro_continuation() {
        let syntax = cpp_syntax();
        let first = scan_line("#define MAX_SIZE \\", ScanState::Normal, &syntax);
        assert_eq!(first.state_out, ScanState::Quote(3));
        let second = scan_line("    256", first.state_out, &syntax);
        assert_eq!(kinds(&second), vec![(0, 7, TokenKind::Preprocessor)]);
        assert_eq!(second.state_out, ScanState::Normal);
    }

    #[test]
    fn test_empty_line_keeps_multi_line_state() {
        let syntax = cpp_syntax();
        let result = scan_line("", ScanState::Quote(0), &syntax);
        assert!(result.spans.is_empty());
        assert_eq!(result.state_out, ScanState::Quote(0));

        let result = scan_line("", ScanState::Quote(1), &syntax);
        assert_eq!(result.state_out, ScanState::Normal);
    }

    #[test]
    fn test_scan_is_deterministic() {
        let syntax = cpp_syntax();
        let a = scan_line("x /* y", ScanState::Normal, &syntax);
        let b = scan_line("x /* y", ScanState::Normal, &syntax);
        assert_eq!(a, b);
    }
}
