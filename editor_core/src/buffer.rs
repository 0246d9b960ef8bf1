//! Line-oriented text buffer.
//!
//! The buffer owns its lines exclusively. Every edit re-lexes the touched
//! lines before returning, continuing downward only while the outgoing scan
//! state keeps changing, so the lexical annotation is always consistent when
//! control returns to the caller.

use crate::error::{BufferError, FindError};
use crate::line::{byte_offset, Line, LineId, NO_ID};
use crate::options::TextOptions;
use crate::point::{Point, Range};
use crate::search::{self, FindOptions};
use crate::syntax::{scan_line, LanguageProfile, LexSpan, ScanState};
use crossbeam_channel::{Receiver, Sender};
use ropey::Rope;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;

/// Text encodings accepted by [`TextBuffer::from_bytes`]. Detecting the
/// encoding is the caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl Encoding {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Utf16Le => "UTF-16LE",
            Self::Utf16Be => "UTF-16BE",
        }
    }
}

/// What an edit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Delete,
    Replace,
}

/// Change notification sent to subscribers after every edit that changed
/// the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferChange {
    pub kind: ChangeKind,
    /// Replaced text, in coordinates before the edit.
    pub old_range: Range,
    /// New text, in coordinates after the edit.
    pub new_range: Range,
}

/// Result of an edit operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditResult {
    /// Caret position after the edit (end of the inserted text).
    pub caret: Point,
    /// Whether the buffer content changed.
    pub changed: bool,
    /// Range of the inserted text.
    pub new_range: Range,
    /// Text that was removed.
    pub removed: String,
    /// Text that was inserted, line breaks normalised to `\n`.
    pub inserted: String,
}

/// A text buffer of lexed lines. Never empty: an empty buffer is one empty
/// line.
#[derive(Debug)]
pub struct TextBuffer {
    lines: Vec<Line>,
    profile: Arc<LanguageProfile>,
    next_id: LineId,
    /// Id to line index map, rebuilt on demand after structural edits.
    id_index: RefCell<Option<HashMap<LineId, usize>>>,
    subscribers: Vec<Sender<BufferChange>>,
    /// First and last line (1-based) scanned by the latest re-lex.
    last_relex: (usize, usize),
}

impl TextBuffer {
    /// Creates a buffer holding one empty line.
    pub fn new(profile: Arc<LanguageProfile>) -> Self {
        Self::from_str("", profile)
    }

    /// Creates a buffer from a string. `\n`, `\r\n` and `\r` all break lines.
    pub fn from_str(text: &str, profile: Arc<LanguageProfile>) -> Self {
        Self::from_lines(split_lines(text), profile)
    }

    /// Loads a buffer from a UTF-8 stream.
    pub fn from_reader<R: io::Read>(reader: R, profile: Arc<LanguageProfile>) -> io::Result<Self> {
        let rope = Rope::from_reader(reader)?;
        Ok(Self::from_lines(rope_lines(&rope), profile))
    }

    /// Creates a buffer from raw bytes in a declared encoding.
    pub fn from_bytes(
        bytes: &[u8],
        encoding: Encoding,
        profile: Arc<LanguageProfile>,
    ) -> Result<Self, BufferError> {
        let text = decode(bytes, encoding)?;
        Ok(Self::from_str(&text, profile))
    }

    fn from_lines(texts: Vec<String>, profile: Arc<LanguageProfile>) -> Self {
        let lines: Vec<Line> = texts
            .into_iter()
            .enumerate()
            .map(|(id, text)| Line::new(id, text))
            .collect();
        let next_id = lines.len();
        let mut buffer = Self {
            lines,
            profile,
            next_id,
            id_index: RefCell::new(None),
            subscribers: Vec::new(),
            last_relex: (0, 0),
        };
        let last = buffer.lines.len() - 1;
        buffer.relex_from(0, last);
        buffer
    }

    /// The language profile lexing and indenting this buffer.
    pub fn profile(&self) -> &Arc<LanguageProfile> {
        &self.profile
    }

    /// Switches file type and re-lexes everything.
    pub fn set_profile(&mut self, profile: Arc<LanguageProfile>) {
        self.profile = profile;
        let last = self.lines.len() - 1;
        self.relex_from(0, last);
    }

    /// Returns the number of lines (at least 1).
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns a line by 1-based number.
    pub fn line(&self, line: usize) -> Option<&Line> {
        line.checked_sub(1).and_then(|index| self.lines.get(index))
    }

    /// Returns the length of a line in characters.
    pub fn line_len(&self, line: usize) -> Option<usize> {
        self.line(line).map(Line::len)
    }

    /// Returns the id of a line.
    pub fn line_id(&self, line: usize) -> Option<LineId> {
        self.line(line).map(Line::id)
    }

    /// Returns the leading whitespace of a line.
    pub fn get_indent(&self, line: usize) -> Option<&str> {
        self.line(line).map(Line::indent_str)
    }

    /// Iterates over all lines.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }

    /// Maps a line id back to its current line number.
    pub fn line_nr_from_id(&self, id: LineId) -> Option<usize> {
        if id == NO_ID {
            return None;
        }
        let mut index = self.id_index.borrow_mut();
        let map = index.get_or_insert_with(|| {
            let mut map = HashMap::with_capacity(self.lines.len());
            for (i, line) in self.lines.iter().enumerate() {
                if line.id() != NO_ID {
                    map.entry(line.id()).or_insert(i);
                }
            }
            map
        });
        map.get(&id).map(|i| i + 1)
    }

    /// First point of the buffer.
    pub fn point_begin(&self) -> Point {
        Point::new(1, 0)
    }

    /// Last point of the buffer.
    pub fn point_end(&self) -> Point {
        let last = self.lines.len();
        Point::new(last, self.lines[last - 1].len())
    }

    /// The whole buffer as a range. Computed on each call.
    pub fn range(&self) -> Range {
        Range {
            begin: self.point_begin(),
            end: self.point_end(),
        }
    }

    /// Returns the whole content, lines joined with `\n`.
    pub fn text(&self) -> String {
        let texts: Vec<&str> = self.lines.iter().map(Line::text).collect();
        texts.join("\n")
    }

    /// Returns the text inside `range`.
    pub fn get_text(&self, range: Range) -> Result<String, BufferError> {
        self.check_range(range)?;
        let first = &self.lines[range.begin.line - 1];
        if range.is_single_line() {
            let text = first.text();
            return Ok(text[byte_offset(text, range.begin.col)..byte_offset(text, range.end.col)]
                .to_string());
        }

        let mut out = String::new();
        out.push_str(&first.text()[byte_offset(first.text(), range.begin.col)..]);
        for line in &self.lines[range.begin.line..range.end.line - 1] {
            out.push('\n');
            out.push_str(line.text());
        }
        let last = &self.lines[range.end.line - 1];
        out.push('\n');
        out.push_str(&last.text()[..byte_offset(last.text(), range.end.col)]);
        Ok(out)
    }

    /// Checks that `point` addresses an existing position.
    pub fn check_point(&self, point: Point) -> Result<(), BufferError> {
        let line = self.line(point.line).ok_or(BufferError::InvalidLine {
            line: point.line,
            line_count: self.lines.len(),
        })?;
        let len = line.len();
        if point.col > len {
            return Err(BufferError::InvalidColumn {
                line: point.line,
                col: point.col,
                len,
            });
        }
        Ok(())
    }

    /// Checks that both ends of `range` are valid and ordered.
    pub fn check_range(&self, range: Range) -> Result<(), BufferError> {
        self.check_point(range.begin)?;
        self.check_point(range.end)?;
        if range.begin > range.end {
            return Err(BufferError::InvalidRange {
                begin: range.begin,
                end: range.end,
            });
        }
        Ok(())
    }

    /// Inserts `text` at `point`.
    pub fn insert_text(&mut self, point: Point, text: &str) -> Result<EditResult, BufferError> {
        self.splice(Range::empty(point), text, ChangeKind::Insert)
    }

    /// Deletes the text inside `range`.
    pub fn delete_text(&mut self, range: Range) -> Result<EditResult, BufferError> {
        self.splice(range, "", ChangeKind::Delete)
    }

    /// Replaces the text inside `range` with `text`.
    pub fn replace_text(&mut self, range: Range, text: &str) -> Result<EditResult, BufferError> {
        self.splice(range, text, ChangeKind::Replace)
    }

    /// Appends `text` as new line(s) after the last line. Earlier lines keep
    /// their lex spans. Returns the id of the first appended line.
    pub fn append_line(&mut self, text: &str) -> LineId {
        let first_id = self.next_id;
        for piece in split_lines(text) {
            let id = self.alloc_id();
            self.push_line(Line::new(id, piece));
        }
        first_id
    }

    /// Appends a line with an explicit id and lex spans. Used for synthetic
    /// listings; the id may be [`NO_ID`] or borrowed from another buffer.
    pub(crate) fn append_annotated_line(&mut self, text: &str, id: LineId, spans: Vec<LexSpan>) -> usize {
        self.push_line(Line::new(id, strip_line_break(text.to_string())));
        let index = self.lines.len() - 1;
        // The scan states stay; the explicit spans replace the lexed ones.
        self.lines[index].set_spans(spans);
        index + 1
    }

    /// Overrides the id and spans of an existing line.
    pub(crate) fn annotate_line(&mut self, line: usize, id: LineId, spans: Vec<LexSpan>) {
        if let Some(target) = line.checked_sub(1).and_then(|i| self.lines.get_mut(i)) {
            target.set_id(id);
            target.set_spans(spans);
            *self.id_index.borrow_mut() = None;
        }
    }

    /// Returns a receiver of change notifications.
    pub fn subscribe(&mut self) -> Receiver<BufferChange> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Returns true if every line's incoming scan state equals the outgoing
    /// state of the line above it.
    pub fn is_lexically_consistent(&self) -> bool {
        self.lines[0].state_in() == ScanState::Normal
            && self
                .lines
                .windows(2)
                .all(|pair| pair[0].state_out() == pair[1].state_in())
    }

    /// Computes the indentation `line` should have.
    pub fn compute_indent(&self, line: usize, options: &TextOptions) -> Result<String, BufferError> {
        crate::indent::compute_indent(self, line, options)
    }

    /// Finds the first (or, reversed, last) match inside `range`.
    pub fn find_string(
        &self,
        pattern: &str,
        range: Range,
        options: &FindOptions,
    ) -> Result<Option<Range>, FindError> {
        search::find_in_range(self, pattern, range, options)
    }

    /// Finds every match inside `range`, in ascending order.
    pub fn find_string_all(
        &self,
        pattern: &str,
        range: Range,
        options: &FindOptions,
    ) -> Result<Vec<Range>, FindError> {
        search::find_all(self, pattern, range, options)
    }

    #[cfg(test)]
    pub(crate) fn last_relex(&self) -> (usize, usize) {
        self.last_relex
    }

    fn alloc_id(&mut self) -> LineId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn push_line(&mut self, mut line: Line) {
        let state_in = self.lines.last().map_or(ScanState::Normal, Line::state_out);
        let result = scan_line(line.text(), state_in, self.profile.syntax());
        line.set_lex(state_in, result);

        let old_end = self.point_end();
        let id = line.id();
        self.lines.push(line);
        let index = self.lines.len() - 1;
        if let Some(map) = self.id_index.borrow_mut().as_mut() {
            if id != NO_ID {
                map.entry(id).or_insert(index);
            }
        }
        self.last_relex = (index + 1, index + 1);
        self.notify(BufferChange {
            kind: ChangeKind::Insert,
            old_range: Range::empty(old_end),
            new_range: Range {
                begin: old_end,
                end: self.point_end(),
            },
        });
    }

    fn splice(&mut self, range: Range, text: &str, kind: ChangeKind) -> Result<EditResult, BufferError> {
        if let Err(err) = self.check_range(range) {
            log::debug!("Rejected {:?} at {}: {}", kind, range, err);
            return Err(err);
        }

        let pieces = split_lines(text);
        let inserted = pieces.join("\n");
        let removed = self.get_text(range)?;
        let caret = range.begin.advanced_by(&inserted);
        let new_range = Range {
            begin: range.begin,
            end: caret,
        };
        if removed == inserted {
            return Ok(EditResult {
                caret,
                changed: false,
                new_range,
                removed,
                inserted,
            });
        }

        let first = range.begin.line - 1;
        let last = range.end.line - 1;
        let prefix = {
            let t = self.lines[first].text();
            t[..byte_offset(t, range.begin.col)].to_string()
        };
        let suffix = {
            let t = self.lines[last].text();
            t[byte_offset(t, range.end.col)..].to_string()
        };
        let old_tail_out = self.lines[last].state_out();
        let first_id = self.lines[first].id();

        // A line break inserted at column 0 pushes the existing line down
        // intact; it keeps its id.
        let keep_id_below = range.is_empty()
            && range.begin.col == 0
            && pieces.len() > 1
            && pieces.last().is_some_and(|p| p.is_empty());

        let count = pieces.len();
        let mut new_lines = Vec::with_capacity(count);
        for (i, piece) in pieces.into_iter().enumerate() {
            let mut content = String::new();
            if i == 0 {
                content.push_str(&prefix);
            }
            content.push_str(&piece);
            if i == count - 1 {
                content.push_str(&suffix);
            }
            let keeps_old_id = if keep_id_below { i == count - 1 } else { i == 0 };
            let id = if keeps_old_id { first_id } else { self.alloc_id() };
            new_lines.push(Line::new(id, content));
        }
        if let Some(tail) = new_lines.last_mut() {
            tail.set_state_out(old_tail_out);
        }

        self.lines.splice(first..=last, new_lines);
        if count != 1 || last != first {
            *self.id_index.borrow_mut() = None;
        }

        let structural_end = first + count - 1;
        self.relex_from(first, structural_end);
        log::debug!(
            "{:?} {} -> {}, re-lexed lines {}..={}",
            kind,
            range,
            new_range,
            self.last_relex.0,
            self.last_relex.1
        );

        self.notify(BufferChange {
            kind,
            old_range: range,
            new_range,
        });

        Ok(EditResult {
            caret,
            changed: true,
            new_range,
            removed,
            inserted,
        })
    }

    /// Re-lexes from line index `start`, at least through `structural_end`,
    /// then onward while the outgoing state differs from the cached one.
    fn relex_from(&mut self, start: usize, structural_end: usize) {
        let profile = Arc::clone(&self.profile);
        let syntax = profile.syntax();
        let mut state = match start {
            0 => ScanState::Normal,
            _ => self.lines[start - 1].state_out(),
        };

        let mut i = start;
        while i < self.lines.len() {
            let line = &mut self.lines[i];
            let cached_out = line.state_out();
            let result = scan_line(line.text(), state, syntax);
            let out = result.state_out;
            line.set_lex(state, result);
            i += 1;
            if i > structural_end && out == cached_out {
                break;
            }
            state = out;
        }
        self.last_relex = (start + 1, i);
        log::trace!("Re-lexed {} line(s) from line {}", i - start, start + 1);
    }

    fn notify(&mut self, change: BufferChange) {
        self.subscribers.retain(|tx| tx.send(change.clone()).is_ok());
    }
}

/// Splits text into lines on `\n`, `\r\n` and `\r`. Always returns at least
/// one (possibly empty) line.
pub(crate) fn split_lines(text: &str) -> Vec<String> {
    rope_lines(&Rope::from_str(text))
}

fn rope_lines(rope: &Rope) -> Vec<String> {
    rope.lines()
        .map(|slice| strip_line_break(slice.to_string()))
        .collect()
}

fn strip_line_break(mut text: String) -> String {
    if text.ends_with("\r\n") {
        text.truncate(text.len() - 2);
    } else if text.ends_with(&['\n', '\r'][..]) {
        text.pop();
    }
    text
}

fn decode(bytes: &[u8], encoding: Encoding) -> Result<String, BufferError> {
    let err = BufferError::Decode {
        encoding: encoding.name(),
    };
    match encoding {
        Encoding::Utf8 => std::str::from_utf8(bytes).map(str::to_string).map_err(|_| err),
        Encoding::Utf16Le | Encoding::Utf16Be => {
            if bytes.len() % 2 != 0 {
                return Err(err);
            }
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| match encoding {
                    Encoding::Utf16Le => u16::from_le_bytes([pair[0], pair[1]]),
                    _ => u16::from_be_bytes([pair[0], pair[1]]),
                })
                .collect();
            String::from_utf16(&units).map_err(|_| err)
        }
    }
}
