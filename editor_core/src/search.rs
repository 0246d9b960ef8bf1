//! Search and replace functionality.
//!
//! Matching is line-local: a match never spans a line break. Literal
//! patterns are escaped and run through the same regex machinery as regex
//! patterns, so both honour case sensitivity and whole-word matching the
//! same way.

use crate::buffer::{EditResult, TextBuffer};
use crate::error::FindError;
use crate::line::{byte_offset, Line};
use crate::point::{Point, Range};
use crate::syntax::is_word_char;
use regex::{Regex, RegexBuilder};

/// Search options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Treat the pattern as a regular expression.
    pub use_regex: bool,
    pub case_sensitive: bool,
    /// Both ends of a match must be at a non-word character or line edge.
    pub match_whole_word: bool,
    /// Search backward. Not supported together with `use_regex`.
    pub reverse: bool,
}

impl FindOptions {
    fn forward(&self) -> Self {
        Self {
            reverse: false,
            ..*self
        }
    }
}

/// A compiled search pattern.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
    use_regex: bool,
    whole_word: bool,
}

impl Matcher {
    /// Compiles `pattern`. A malformed regex is reported as
    /// [`FindError::Pattern`], never as "no match".
    pub fn new(pattern: &str, options: &FindOptions) -> Result<Self, FindError> {
        if pattern.is_empty() {
            return Err(FindError::EmptyPattern);
        }
        if options.use_regex && options.reverse {
            return Err(FindError::ReverseRegex);
        }
        let source = if options.use_regex {
            pattern.to_string()
        } else {
            regex::escape(pattern)
        };
        let regex = RegexBuilder::new(&source)
            .case_insensitive(!options.case_sensitive)
            .build()
            .map_err(|err| FindError::Pattern(err.to_string()))?;
        Ok(Self {
            regex,
            use_regex: options.use_regex,
            whole_word: options.match_whole_word,
        })
    }

    /// First match inside `range`, or the last one when `reverse`.
    pub fn find_in(&self, buffer: &TextBuffer, range: Range, reverse: bool) -> Option<Range> {
        let hit = |ln: usize, (start, end): (usize, usize)| {
            Range::new(Point::new(ln, start), Point::new(ln, end))
        };
        if reverse {
            for ln in (range.begin.line..=range.end.line).rev() {
                let (line, from, to) = line_bounds(buffer, range, ln)?;
                if let Some(&m) = self.line_matches(line, from, to, true).last() {
                    return Some(hit(ln, m));
                }
            }
        } else {
            for ln in range.begin.line..=range.end.line {
                let (line, from, to) = line_bounds(buffer, range, ln)?;
                if let Some(&m) = self.line_matches(line, from, to, false).first() {
                    return Some(hit(ln, m));
                }
            }
        }
        None
    }

    /// Every match inside `range`, in ascending order.
    pub fn find_all_in(&self, buffer: &TextBuffer, range: Range) -> Vec<Range> {
        let mut found = Vec::new();
        for ln in range.begin.line..=range.end.line {
            let Some((line, from, to)) = line_bounds(buffer, range, ln) else {
                break;
            };
            found.extend(
                self.line_matches(line, from, to, false)
                    .into_iter()
                    .map(|(start, end)| Range::new(Point::new(ln, start), Point::new(ln, end))),
            );
        }
        found
    }

    /// The text that replaces the match at `range`. Regex replacements
    /// expand `$1` / `${name}` capture references.
    pub fn replacement(&self, buffer: &TextBuffer, range: Range, replacement: &str) -> String {
        if !self.use_regex {
            return replacement.to_string();
        }
        let Some(line) = buffer.line(range.begin.line) else {
            return replacement.to_string();
        };
        let text = line.text();
        let start = byte_offset(text, range.begin.col);
        match self.regex.captures_at(text, start) {
            Some(caps) => {
                let mut out = String::new();
                caps.expand(replacement, &mut out);
                out
            }
            None => replacement.to_string(),
        }
    }

    /// Matches on one line between character columns `from` and `to`, as
    /// character column pairs. `overlapping` also reports matches starting
    /// inside an earlier one.
    ///
    /// A match running past `to` is retried against the line cut at `to`, so
    /// `a+` over the first two columns of `aaa` still finds `aa`. Anchors and
    /// `\b` then see the cut as the line end. Whole-word checks always look
    /// at the full line.
    fn line_matches(&self, line: &Line, from: usize, to: usize, overlapping: bool) -> Vec<(usize, usize)> {
        let text = line.text();
        let limit = byte_offset(text, to);
        let mut pos = byte_offset(text, from);
        let mut found = Vec::new();

        while pos <= limit {
            let m = match self.regex.find_at(text, pos) {
                Some(m) if m.end() > limit => match self.regex.find_at(&text[..limit], pos) {
                    Some(m) => m,
                    None => break,
                },
                Some(m) => m,
                None => break,
            };
            let next = next_boundary(text, m.start());
            if m.start() == m.end() || !self.word_bounded(text, m.start(), m.end()) {
                pos = next;
                continue;
            }
            found.push((char_col(text, m.start()), char_col(text, m.end())));
            pos = if overlapping { next } else { m.end() };
        }
        found
    }

    fn word_bounded(&self, text: &str, start: usize, end: usize) -> bool {
        if !self.whole_word {
            return true;
        }
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    }
}

/// Outcome of a single replace step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceStep {
    /// The selection was not a match; this is the next match to select.
    Selected(Range),
    /// The selection was replaced; `next` is the following match, if any.
    Replaced { edit: EditResult, next: Option<Range> },
    NotFound,
}

/// Finds the first (or, with `reverse`, last) match inside `range`.
pub fn find_in_range(
    buffer: &TextBuffer,
    pattern: &str,
    range: Range,
    options: &FindOptions,
) -> Result<Option<Range>, FindError> {
    buffer.check_range(range)?;
    let matcher = Matcher::new(pattern, options)?;
    Ok(matcher.find_in(buffer, range, options.reverse))
}

/// Finds every match inside `range`. Never wraps; `reverse` is ignored.
pub fn find_all(
    buffer: &TextBuffer,
    pattern: &str,
    range: Range,
    options: &FindOptions,
) -> Result<Vec<Range>, FindError> {
    buffer.check_range(range)?;
    let matcher = Matcher::new(pattern, &options.forward())?;
    Ok(matcher.find_all_in(buffer, range))
}

/// Finds the next match from `start`: forward over `[start, end)`, or
/// backward over `[begin, start)`. With `wrap`, the complementary range is
/// searched once if the first one has no match.
pub fn find_next(
    buffer: &TextBuffer,
    pattern: &str,
    start: Point,
    options: &FindOptions,
    wrap: bool,
) -> Result<Option<Range>, FindError> {
    buffer.check_point(start)?;
    let matcher = Matcher::new(pattern, options)?;
    let whole = buffer.range();
    let before = Range {
        begin: whole.begin,
        end: start,
    };
    let after = Range {
        begin: start,
        end: whole.end,
    };
    let (first, second) = if options.reverse {
        (before, after)
    } else {
        (after, before)
    };

    if let Some(found) = matcher.find_in(buffer, first, options.reverse) {
        return Ok(Some(found));
    }
    if wrap && !second.is_empty() {
        log::debug!("Search for {:?} wrapped around at {}", pattern, start);
        return Ok(matcher.find_in(buffer, second, options.reverse));
    }
    Ok(None)
}

/// Replaces every match inside `range`. After each replacement the search
/// resumes right after the inserted text, so a replacement that itself
/// matches is never visited again. Returns the applied edits in order.
pub fn replace_all(
    buffer: &mut TextBuffer,
    pattern: &str,
    replacement: &str,
    range: Range,
    options: &FindOptions,
) -> Result<Vec<EditResult>, FindError> {
    buffer.check_range(range)?;
    let matcher = Matcher::new(pattern, &options.forward())?;
    let mut source = range;
    let mut edits = Vec::new();

    while let Some(found) = matcher.find_in(buffer, source, false) {
        let text = matcher.replacement(buffer, found, replacement);
        let edit = buffer.replace_text(found, &text)?;
        source = rebase(source, found, edit.caret);
        edits.push(edit);
    }

    log::debug!("Replaced {} match(es) of {:?}", edits.len(), pattern);
    Ok(edits)
}

/// Replaces `selection` if it is exactly the next match, then finds the
/// following one. Otherwise selects the next match without replacing.
pub fn replace_next(
    buffer: &mut TextBuffer,
    pattern: &str,
    replacement: &str,
    selection: Range,
    options: &FindOptions,
    wrap: bool,
) -> Result<ReplaceStep, FindError> {
    buffer.check_range(selection)?;
    let matcher = Matcher::new(pattern, options)?;

    let is_match = !selection.is_empty()
        && matcher.find_in(buffer, selection, false) == Some(selection);
    if !is_match {
        let next = find_next(buffer, pattern, selection.begin, options, wrap)?;
        return Ok(next.map_or(ReplaceStep::NotFound, ReplaceStep::Selected));
    }

    let text = matcher.replacement(buffer, selection, replacement);
    let edit = buffer.replace_text(selection, &text)?;
    let from = if options.reverse {
        edit.new_range.begin
    } else {
        edit.caret
    };
    let next = find_next(buffer, pattern, from, options, wrap)?;
    Ok(ReplaceStep::Replaced { edit, next })
}

/// Moves the end of `source` along with an edit that replaced `replaced`
/// and left the caret at `caret`; the new source starts at the caret.
fn rebase(source: Range, replaced: Range, caret: Point) -> Range {
    let end = if source.end.line == replaced.end.line {
        Point::new(caret.line, caret.col + (source.end.col - replaced.end.col))
    } else {
        Point::new(caret.line + source.end.line - replaced.end.line, source.end.col)
    };
    Range { begin: caret, end }
}

/// The line `ln` of `range` with the searched column bounds.
fn line_bounds(buffer: &TextBuffer, range: Range, ln: usize) -> Option<(&Line, usize, usize)> {
    let line = buffer.line(ln)?;
    let from = if ln == range.begin.line { range.begin.col } else { 0 };
    let to = if ln == range.end.line {
        range.end.col
    } else {
        line.len()
    };
    Some((line, from, to))
}

fn next_boundary(text: &str, byte: usize) -> usize {
    byte + text[byte..].chars().next().map_or(1, char::len_utf8)
}

fn char_col(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}
