//! A single buffer line and its lexical annotation.

use crate::syntax::{LexSpan, ScanResult, ScanState, TokenKind};

/// Stable line identifier.
pub type LineId = usize;

/// Id of synthetic lines (e.g. find-result headers). Never matched by id
/// lookups.
pub const NO_ID: LineId = usize::MAX;

/// A line of text with its lex spans and scan states.
///
/// Lines are created and mutated only by [`crate::TextBuffer`]; consumers get
/// read-only views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    id: LineId,
    text: String,
    spans: Vec<LexSpan>,
    state_in: ScanState,
    state_out: ScanState,
}

impl Line {
    pub(crate) fn new(id: LineId, text: String) -> Self {
        Self {
            id,
            text,
            spans: Vec::new(),
            state_in: ScanState::Normal,
            state_out: ScanState::Normal,
        }
    }

    pub fn id(&self) -> LineId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn spans(&self) -> &[LexSpan] {
        &self.spans
    }

    pub fn state_in(&self) -> ScanState {
        self.state_in
    }

    pub fn state_out(&self) -> ScanState {
        self.state_out
    }

    /// Token kind at `col`, `None` for plain text.
    pub fn token_at(&self, col: usize) -> Option<TokenKind> {
        let index = self.spans.partition_point(|s| s.end() <= col);
        self.spans
            .get(index)
            .filter(|s| s.contains(col))
            .map(|s| s.kind)
    }

    /// Returns true if `col` is inside a comment, string or other quote.
    pub fn is_quoted(&self, col: usize) -> bool {
        self.token_at(col).is_some_and(TokenKind::is_quoted)
    }

    /// Returns true if `col` is inside a comment.
    pub fn is_comment(&self, col: usize) -> bool {
        self.token_at(col).is_some_and(TokenKind::is_comment)
    }

    /// Leading whitespace.
    pub fn indent_str(&self) -> &str {
        let end = self
            .text
            .find(|c: char| c != ' ' && c != '\t')
            .unwrap_or(self.text.len());
        &self.text[..end]
    }

    /// True if the line holds only spaces and tabs.
    pub fn is_blank(&self) -> bool {
        self.text.chars().all(|c| c == ' ' || c == '\t')
    }

    /// Column of the first non-blank character.
    pub fn first_non_blank(&self) -> Option<usize> {
        self.text.chars().position(|c| c != ' ' && c != '\t')
    }

    /// True if every non-blank character is inside a comment.
    pub fn is_comment_only(&self) -> bool {
        !self.is_blank()
            && self
                .text
                .chars()
                .enumerate()
                .all(|(col, c)| c == ' ' || c == '\t' || self.is_comment(col))
    }

    /// Last character outside quotes and whitespace, with its column.
    pub fn last_code_char(&self) -> Option<(usize, char)> {
        let chars: Vec<char> = self.text.chars().collect();
        (0..chars.len())
            .rev()
            .find(|&col| !chars[col].is_whitespace() && !self.is_quoted(col))
            .map(|col| (col, chars[col]))
    }

    /// The line's code (not quoted) characters with their columns.
    pub fn code_chars(&self) -> impl DoubleEndedIterator<Item = (usize, char)> + '_ {
        let chars: Vec<char> = self.text.chars().collect();
        chars
            .into_iter()
            .enumerate()
            .filter(move |&(col, _)| !self.is_quoted(col))
    }

    /// Code text with quoted characters blanked out, trimmed.
    pub fn code_text(&self) -> String {
        let blanked: String = self
            .text
            .chars()
            .enumerate()
            .map(|(col, c)| if self.is_quoted(col) { ' ' } else { c })
            .collect();
        blanked.trim().to_string()
    }

    pub(crate) fn set_id(&mut self, id: LineId) {
        self.id = id;
    }

    pub(crate) fn set_lex(&mut self, state_in: ScanState, result: ScanResult) {
        self.state_in = state_in;
        self.spans = result.spans;
        self.state_out = result.state_out;
    }

    pub(crate) fn set_state_out(&mut self, state: ScanState) {
        self.state_out = state;
    }

    /// Replaces the spans without rescanning.
    pub(crate) fn set_spans(&mut self, mut spans: Vec<LexSpan>) {
        spans.sort_by_key(|s| s.offset);
        spans.retain(|s| s.len > 0);
        let mut end = 0;
        spans.retain(|s| {
            let keep = s.offset >= end;
            if keep {
                end = s.end();
            }
            keep
        });
        self.spans = spans;
    }
}

/// Byte offset of character column `col` in `text` (clamped to the end).
pub(crate) fn byte_offset(text: &str, col: usize) -> usize {
    text.char_indices()
        .nth(col)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}
