//! Document: a buffer with its text options and undo history.

use crate::buffer::{BufferChange, EditResult, TextBuffer};
use crate::error::{BufferError, FindError, OptionsError};
use crate::history::{EditOperation, History};
use crate::options::TextOptions;
use crate::point::{Point, Range};
use crate::search::{self, FindOptions, ReplaceStep};
use crate::syntax::LanguageProfile;
use crossbeam_channel::Receiver;
use std::sync::Arc;

/// An editable document.
///
/// Every edit made through the document is recorded for undo. Edits that
/// belong together (a replace-all, a re-indent of many lines, a newline
/// with its auto-indent) form one undo group.
#[derive(Debug)]
pub struct Document {
    buffer: TextBuffer,
    history: History,
    options: TextOptions,
    /// Whether the buffer has unsaved changes.
    modified: bool,
}

impl Document {
    /// Creates an empty document.
    pub fn new(profile: Arc<LanguageProfile>) -> Self {
        Self::with_buffer(TextBuffer::new(profile))
    }

    /// Creates a document holding `text`.
    pub fn from_str(text: &str, profile: Arc<LanguageProfile>) -> Self {
        Self::with_buffer(TextBuffer::from_str(text, profile))
    }

    /// Wraps an existing buffer; options start from the buffer's profile.
    pub fn with_buffer(buffer: TextBuffer) -> Self {
        let options = buffer.profile().options().clone();
        Self {
            buffer,
            history: History::default(),
            options,
            modified: false,
        }
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn options(&self) -> &TextOptions {
        &self.options
    }

    /// Replaces the text options after validating them.
    pub fn set_options(&mut self, options: TextOptions) -> Result<(), OptionsError> {
        options.validate()?;
        self.options = options;
        Ok(())
    }

    /// Switches the file type. History stays valid: the text is unchanged.
    pub fn set_profile(&mut self, profile: Arc<LanguageProfile>) {
        self.buffer.set_profile(profile);
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Marks the current content as saved.
    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    /// Subscribes to buffer change notifications.
    pub fn subscribe(&mut self) -> Receiver<BufferChange> {
        self.buffer.subscribe()
    }

    // ==================== Editing ====================

    pub fn insert_text(&mut self, point: Point, text: &str) -> Result<EditResult, BufferError> {
        self.grouped(point, |doc| {
            let edit = doc.buffer.insert_text(point, text)?;
            Ok(doc.recorded(edit))
        })
    }

    pub fn delete_text(&mut self, range: Range) -> Result<EditResult, BufferError> {
        self.grouped(range.end, |doc| {
            let edit = doc.buffer.delete_text(range)?;
            Ok(doc.recorded(edit))
        })
    }

    pub fn replace_text(&mut self, range: Range, text: &str) -> Result<EditResult, BufferError> {
        self.grouped(range.end, |doc| {
            let edit = doc.buffer.replace_text(range, text)?;
            Ok(doc.recorded(edit))
        })
    }

    /// Breaks the line at `point` and indents the new line. Returns the
    /// caret, placed after the new indent.
    pub fn insert_newline(&mut self, point: Point) -> Result<Point, BufferError> {
        self.grouped(point, |doc| {
            let edit = doc.buffer.insert_text(point, "\n")?;
            doc.recorded(edit);
            let ln = point.line + 1;
            let edit = doc.apply_indent(ln)?;
            Ok(edit.caret)
        })
    }

    // ==================== Indentation ====================

    /// Computes the indentation `line` should have.
    pub fn compute_indent(&self, line: usize) -> Result<String, BufferError> {
        self.buffer.compute_indent(line, &self.options)
    }

    /// Replaces the leading whitespace of `line` with its computed indent.
    pub fn reindent_line(&mut self, line: usize) -> Result<EditResult, BufferError> {
        self.grouped(Point::new(line, 0), |doc| doc.apply_indent(line))
    }

    /// Re-indents `first..=last` top-down as one undo group, leaving blank
    /// lines alone. Returns the number of lines changed.
    pub fn reindent_lines(&mut self, first: usize, last: usize) -> Result<usize, BufferError> {
        self.grouped(Point::new(first, 0), |doc| {
            let mut changed = 0;
            for line in first..=last {
                let blank = doc
                    .buffer
                    .line(line)
                    .ok_or(BufferError::InvalidLine {
                        line,
                        line_count: doc.buffer.line_count(),
                    })?
                    .is_blank();
                if !blank && doc.apply_indent(line)?.changed {
                    changed += 1;
                }
            }
            log::debug!("Re-indented lines {}..={}: {} changed", first, last, changed);
            Ok(changed)
        })
    }

    fn apply_indent(&mut self, line: usize) -> Result<EditResult, BufferError> {
        let indent = self.compute_indent(line)?;
        let current = self
            .buffer
            .get_indent(line)
            .map_or(0, |s| s.chars().count());
        let range = Range::new(Point::new(line, 0), Point::new(line, current));
        let edit = self.buffer.replace_text(range, &indent)?;
        Ok(self.recorded(edit))
    }

    // ==================== Find / Replace ====================

    pub fn find_next(
        &self,
        pattern: &str,
        start: Point,
        options: &FindOptions,
        wrap: bool,
    ) -> Result<Option<Range>, FindError> {
        search::find_next(&self.buffer, pattern, start, options, wrap)
    }

    pub fn find_all(&self, pattern: &str, options: &FindOptions) -> Result<Vec<Range>, FindError> {
        self.buffer.find_string_all(pattern, self.buffer.range(), options)
    }

    /// Replaces every match in `range` as one undo group. Returns the number
    /// of replacements.
    pub fn replace_all(
        &mut self,
        pattern: &str,
        replacement: &str,
        range: Range,
        options: &FindOptions,
    ) -> Result<usize, FindError> {
        self.grouped(range.begin, |doc| {
            let edits = search::replace_all(&mut doc.buffer, pattern, replacement, range, options)?;
            let count = edits.len();
            for edit in edits {
                doc.recorded(edit);
            }
            Ok(count)
        })
    }

    /// Single replace step; see [`search::replace_next`].
    pub fn replace_next(
        &mut self,
        pattern: &str,
        replacement: &str,
        selection: Range,
        options: &FindOptions,
        wrap: bool,
    ) -> Result<ReplaceStep, FindError> {
        self.grouped(selection.begin, |doc| {
            let step =
                search::replace_next(&mut doc.buffer, pattern, replacement, selection, options, wrap)?;
            if let ReplaceStep::Replaced { edit, .. } = &step {
                doc.recorded(edit.clone());
            }
            Ok(step)
        })
    }

    // ==================== Undo/Redo ====================

    /// Undoes the last edit group. Returns the caret to restore, or `None`
    /// when there is nothing to undo.
    pub fn undo(&mut self) -> Result<Option<Point>, BufferError> {
        let Some((ops, caret)) = self.history.undo() else {
            return Ok(None);
        };
        for op in &ops {
            self.apply_operation(op)?;
        }
        self.modified = true;
        log::debug!("Undo: {} operation(s)", ops.len());
        Ok(Some(caret))
    }

    /// Redoes the last undone edit group.
    pub fn redo(&mut self) -> Result<Option<Point>, BufferError> {
        let Some((ops, caret)) = self.history.redo() else {
            return Ok(None);
        };
        for op in &ops {
            self.apply_operation(op)?;
        }
        self.modified = true;
        log::debug!("Redo: {} operation(s)", ops.len());
        Ok(Some(caret))
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Access to the history, e.g. to tune coalescing.
    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    fn apply_operation(&mut self, op: &EditOperation) -> Result<(), BufferError> {
        match op {
            EditOperation::Insert { point, text } => {
                self.buffer.insert_text(*point, text)?;
            }
            EditOperation::Delete { point, text } => {
                let range = Range::new(*point, point.advanced_by(text));
                self.buffer.delete_text(range)?;
            }
        }
        Ok(())
    }

    /// Runs `f` inside one undo group. Groups without changes are dropped.
    fn grouped<T, E>(
        &mut self,
        caret: Point,
        f: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E> {
        self.history.begin_edit(caret);
        let result = f(self);
        self.history.commit_edit();
        result
    }

    /// Records an applied edit in the open undo group.
    fn recorded(&mut self, edit: EditResult) -> EditResult {
        if edit.changed {
            let point = edit.new_range.begin;
            if !edit.removed.is_empty() {
                self.history.record(EditOperation::Delete {
                    point,
                    text: edit.removed.clone(),
                });
            }
            if !edit.inserted.is_empty() {
                self.history.record(EditOperation::Insert {
                    point,
                    text: edit.inserted.clone(),
                });
            }
            self.modified = true;
        }
        self.history.set_caret_after(edit.caret);
        edit
    }
}
