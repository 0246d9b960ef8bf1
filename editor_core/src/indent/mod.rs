//! Indentation engine.
//!
//! Computing an indent never mutates the buffer. Each language plugs in an
//! [`IndentFn`] through its [`crate::LanguageProfile`]; the helpers here do
//! the structural scanning they share, always skipping characters the lexer
//! marked as inside comments, strings or preprocessor lines.

mod cpp;

pub use cpp::indent_c_family;

use crate::buffer::TextBuffer;
use crate::error::BufferError;
use crate::line::{byte_offset, Line};
use crate::options::TextOptions;
use crate::point::Point;
use crate::syntax::{is_word_char, ESCAPE_CHAR};

/// Computes the indent string for a line.
pub type IndentFn = fn(&TextBuffer, usize, &TextOptions) -> String;

/// Computes the indentation `line` should have, using the buffer's language
/// profile.
pub fn compute_indent(
    buffer: &TextBuffer,
    line: usize,
    options: &TextOptions,
) -> Result<String, BufferError> {
    if buffer.line(line).is_none() {
        return Err(BufferError::InvalidLine {
            line,
            line_count: buffer.line_count(),
        });
    }
    debug_assert!(
        buffer.is_lexically_consistent(),
        "indent computed on a buffer with stale lex state"
    );
    let indent_fn = buffer.profile().indent_fn();
    Ok(indent_fn(buffer, line, options))
}

/// Keeps the indentation of the nearest non-blank line above.
pub fn indent_keep(buffer: &TextBuffer, ln: usize, _options: &TextOptions) -> String {
    (1..ln)
        .rev()
        .filter_map(|l| buffer.line(l))
        .find(|line| !line.is_blank())
        .map(|line| line.indent_str().to_string())
        .unwrap_or_default()
}

/// Colon-block indentation: a significant line ending with `:` opens a block.
pub fn indent_python(buffer: &TextBuffer, ln: usize, options: &TextOptions) -> String {
    if let Some(line) = buffer.line(ln).filter(|line| starts_in_quote(line)) {
        return line.indent_str().to_string();
    }
    let Some(prev) = prev_significant(buffer, ln) else {
        return String::new();
    };
    let Some(prev_line) = buffer.line(prev) else {
        return String::new();
    };
    let mut width = line_width(prev_line, options);
    if prev_line.last_code_char().is_some_and(|(_, ch)| ch == ':') {
        width += options.shift_width;
    }
    options.make_indent(width)
}

/// Whether the line begins inside a quote left open by the line above: a
/// block comment, a multi-line string or an escaped continuation. Its
/// leading whitespace is content.
pub(crate) fn starts_in_quote(line: &Line) -> bool {
    !line.state_in().is_normal()
}

/// Returns true if `ln` is a preprocessor line or the continuation of one.
pub fn is_line_macro(buffer: &TextBuffer, ln: usize) -> bool {
    let mut ln = ln;
    loop {
        let Some(line) = buffer.line(ln) else {
            return false;
        };
        if let Some(col) = line.first_non_blank() {
            if line.text().trim_start().starts_with('#') && !line.is_comment(col) {
                return true;
            }
        }
        let continued = ln > 1
            && buffer
                .line(ln - 1)
                .is_some_and(|prev| prev.text().ends_with(ESCAPE_CHAR));
        if !continued {
            return false;
        }
        ln -= 1;
    }
}

/// Nearest line above `ln` that is not blank, comment-only, a macro or the
/// continuation of a quote. A multi-line string is anchored on the line that
/// opened it.
pub(crate) fn prev_significant(buffer: &TextBuffer, ln: usize) -> Option<usize> {
    (1..ln).rev().find(|&l| {
        buffer.line(l).is_some_and(|line| {
            !line.is_blank() && !line.is_comment_only() && !starts_in_quote(line)
        }) && !is_line_macro(buffer, l)
    })
}

/// Scans backward from `from` (exclusive) for an opener without a matching
/// closer. Quoted characters are skipped. Hitting one of `stops` outside any
/// nested pair ends the scan with `None`.
pub(crate) fn unmatched_open(
    buffer: &TextBuffer,
    from: Point,
    opens: &str,
    closes: &str,
    stops: &str,
) -> Option<Point> {
    let mut depth = 0usize;
    for ln in (1..=from.line).rev() {
        let line = buffer.line(ln)?;
        let limit = if ln == from.line { from.col } else { usize::MAX };
        for (col, ch) in line.code_chars().rev() {
            if col >= limit {
                continue;
            }
            if closes.contains(ch) {
                depth += 1;
            } else if opens.contains(ch) {
                if depth == 0 {
                    return Some(Point::new(ln, col));
                }
                depth -= 1;
            } else if depth == 0 && stops.contains(ch) {
                return None;
            }
        }
    }
    None
}

/// Line where the statement containing `(ln, col)` starts: follows closing
/// parens and brackets in front of `col` back to the lines that opened them.
pub(crate) fn statement_start(buffer: &TextBuffer, ln: usize, col: usize) -> usize {
    let (mut ln, mut col) = (ln, col);
    loop {
        let Some(line) = buffer.line(ln) else {
            return ln;
        };
        let mut balance = 0i32;
        let mut closer = None;
        for (c, ch) in line.code_chars() {
            if c >= col {
                break;
            }
            match ch {
                '(' | '[' => balance += 1,
                ')' | ']' => {
                    balance -= 1;
                    if balance < 0 {
                        closer = Some(c);
                        break;
                    }
                }
                _ => {}
            }
        }
        match closer.and_then(|c| unmatched_open(buffer, Point::new(ln, c), "([", ")]", "")) {
            Some(open) if open.line < ln => {
                ln = open.line;
                col = open.col;
            }
            _ => return ln,
        }
    }
}

/// Display width of a line's leading whitespace.
pub(crate) fn line_width(line: &Line, options: &TextOptions) -> usize {
    options.indent_width(line.indent_str())
}

/// Display column of character `col`, tabs expanded.
pub(crate) fn visual_col(line: &Line, col: usize, options: &TextOptions) -> usize {
    let text = line.text();
    options.indent_width(&text[..byte_offset(text, col)])
}

/// Leading identifier of `text`.
pub(crate) fn first_word(text: &str) -> &str {
    let end = text.find(|c: char| !is_word_char(c)).unwrap_or(text.len());
    &text[..end]
}
