//! Undo/Redo history system.

use crate::point::Point;
use std::time::{Duration, Instant};

/// Default time window for coalescing edits (in milliseconds).
const COALESCE_WINDOW_MS: u64 = 300;

/// Represents a single edit operation that can be undone/redone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOperation {
    /// Insert text at a point.
    Insert { point: Point, text: String },
    /// Delete the text starting at a point.
    Delete { point: Point, text: String },
}

impl EditOperation {
    /// Returns the inverse operation (for undo).
    pub fn inverse(&self) -> EditOperation {
        match self {
            EditOperation::Insert { point, text } => EditOperation::Delete {
                point: *point,
                text: text.clone(),
            },
            EditOperation::Delete { point, text } => EditOperation::Insert {
                point: *point,
                text: text.clone(),
            },
        }
    }

    fn is_single_char(&self) -> bool {
        let text = match self {
            EditOperation::Insert { text, .. } | EditOperation::Delete { text, .. } => text,
        };
        text.chars().count() == 1
    }
}

/// A group of edit operations that should be undone/redone together.
#[derive(Debug, Clone)]
pub struct EditGroup {
    /// The operations in this group (in order of execution).
    pub operations: Vec<EditOperation>,
    /// Caret before the edit.
    pub caret_before: Point,
    /// Caret after the edit.
    pub caret_after: Point,
    /// Timestamp of the last edit in this group.
    pub last_edit_time: Option<Instant>,
}

impl EditGroup {
    pub fn new(caret_before: Point) -> Self {
        Self {
            operations: Vec::new(),
            caret_before,
            caret_after: caret_before,
            last_edit_time: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn push(&mut self, op: EditOperation) {
        self.operations.push(op);
        self.last_edit_time = Some(Instant::now());
    }

    /// Returns true if this group can be coalesced with a new edit: the
    /// last edit is recent and both are single-character inserts typed one
    /// after another, or backspaces.
    pub fn can_coalesce(&self, new_op: &EditOperation, coalesce_window: Duration) -> bool {
        match self.last_edit_time {
            Some(last_time) if last_time.elapsed() <= coalesce_window => {}
            _ => return false,
        }

        let Some(last_op) = self.operations.last() else {
            return true;
        };
        if !last_op.is_single_char() || !new_op.is_single_char() {
            return false;
        }
        match (last_op, new_op) {
            (
                EditOperation::Insert { point: p1, text: t1 },
                EditOperation::Insert { point: p2, .. },
            ) => *p2 == p1.advanced_by(t1) && !t1.ends_with('\n'),
            (EditOperation::Delete { point: p1, .. }, EditOperation::Delete { point: p2, text: t2 }) => {
                p1.col > 0 && *p2 == Point::new(p1.line, p1.col - 1) && t2 != "\n"
            }
            _ => false,
        }
    }

    /// Merges operations from another group into this one.
    pub fn merge(&mut self, other: EditGroup) {
        self.operations.extend(other.operations);
        self.caret_after = other.caret_after;
        self.last_edit_time = other.last_edit_time;
    }
}

/// Manages undo/redo history.
#[derive(Debug)]
pub struct History {
    /// Stack of operations that can be undone.
    undo_stack: Vec<EditGroup>,
    /// Stack of operations that can be redone.
    redo_stack: Vec<EditGroup>,
    /// Maximum number of undo levels.
    max_size: usize,
    /// Current edit group being built.
    current_group: Option<EditGroup>,
    /// Time window for coalescing edits.
    coalesce_window: Duration,
    coalesce_enabled: bool,
}

impl Default for History {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl History {
    /// Creates a new history with the given maximum size.
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size,
            current_group: None,
            coalesce_window: Duration::from_millis(COALESCE_WINDOW_MS),
            coalesce_enabled: true,
        }
    }

    pub fn set_coalesce_window(&mut self, window: Duration) {
        self.coalesce_window = window;
    }

    pub fn set_coalesce_enabled(&mut self, enabled: bool) {
        self.coalesce_enabled = enabled;
    }

    /// Starts a new edit group, committing any open one.
    pub fn begin_edit(&mut self, caret: Point) {
        if self.current_group.is_some() {
            self.commit_edit();
        }
        self.current_group = Some(EditGroup::new(caret));
    }

    /// Records an operation in the current group.
    pub fn record(&mut self, op: EditOperation) {
        if let Some(group) = &mut self.current_group {
            group.push(op);
        }
    }

    /// Commits the current edit group, folding it into the previous group
    /// when the two coalesce.
    pub fn commit_edit(&mut self) {
        let Some(group) = self.current_group.take() else {
            return;
        };
        if group.is_empty() {
            return;
        }
        if self.coalesce_enabled && group.operations.len() == 1 {
            if let Some(last_group) = self.undo_stack.last_mut() {
                if last_group.can_coalesce(&group.operations[0], self.coalesce_window) {
                    last_group.merge(group);
                    self.redo_stack.clear();
                    return;
                }
            }
        }
        self.push_undo(group);
    }

    /// Sets the caret after the current edit.
    pub fn set_caret_after(&mut self, caret: Point) {
        if let Some(group) = &mut self.current_group {
            group.caret_after = caret;
        }
    }

    fn push_undo(&mut self, group: EditGroup) {
        self.undo_stack.push(group);
        self.redo_stack.clear();
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Pops the last edit group for undo.
    /// Returns the inverse operations, in application order, and the caret
    /// to restore.
    pub fn undo(&mut self) -> Option<(Vec<EditOperation>, Point)> {
        self.commit_edit();

        self.undo_stack.pop().map(|group| {
            let caret = group.caret_before;
            let ops: Vec<EditOperation> = group
                .operations
                .iter()
                .rev()
                .map(EditOperation::inverse)
                .collect();
            self.redo_stack.push(group);
            (ops, caret)
        })
    }

    /// Pops the last undone edit group for redo.
    pub fn redo(&mut self) -> Option<(Vec<EditOperation>, Point)> {
        self.redo_stack.pop().map(|group| {
            let caret = group.caret_after;
            let ops = group.operations.clone();
            self.undo_stack.push(group);
            (ops, caret)
        })
    }

    /// Clears all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_group = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(line: usize, col: usize, text: &str) -> EditOperation {
        EditOperation::Insert {
            point: Point::new(line, col),
            text: text.to_string(),
        }
    }

    fn type_char(history: &mut History, col: usize, text: &str) {
        history.begin_edit(Point::new(1, col));
        history.record(insert(1, col, text));
        history.set_caret_after(Point::new(1, col).advanced_by(text));
        history.commit_edit();
    }

    #[test]
    fn test_undo_redo() {
        let mut history = History::new(100);

        history.begin_edit(Point::new(1, 0));
        history.record(insert(1, 0, "hello"));
        history.set_caret_after(Point::new(1, 5));
        history.commit_edit();

        assert!(history.can_undo());
        assert!(!history.can_redo());

        let (ops, caret) = history.undo().unwrap();
        assert_eq!(caret, Point::new(1, 0));
        assert_eq!(
            ops,
            vec![EditOperation::Delete {
                point: Point::new(1, 0),
                text: "hello".to_string()
            }]
        );

        assert!(!history.can_undo());
        assert!(history.can_redo());

        let (ops, caret) = history.redo().unwrap();
        assert_eq!(caret, Point::new(1, 5));
        assert_eq!(ops, vec![insert(1, 0, "hello")]);
    }

    #[test]
    fn test_undo_reverses_group_order() {
        let mut history = History::new(100);
        history.begin_edit(Point::new(1, 0));
        history.record(insert(1, 0, "a"));
        history.record(EditOperation::Delete {
            point: Point::new(1, 3),
            text: "xy".to_string(),
        });
        history.commit_edit();

        let (ops, _) = history.undo().unwrap();
        assert_eq!(
            ops,
            vec![
                insert(1, 3, "xy"),
                EditOperation::Delete {
                    point: Point::new(1, 0),
                    text: "a".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_redo_cleared_on_new_edit() {
        let mut history = History::new(100);
        type_char(&mut history, 0, "a");

        history.undo();
        assert!(history.can_redo());

        history.set_coalesce_enabled(false);
        type_char(&mut history, 0, "b");
        assert!(!history.can_redo());
    }

    #[test]
    fn test_coalescing_consecutive_inserts() {
        let mut history = History::new(100);
        history.set_coalesce_window(Duration::from_millis(1000));

        type_char(&mut history, 0, "a");
        type_char(&mut history, 1, "b");
        type_char(&mut history, 2, "c");

        assert_eq!(history.undo_stack.len(), 1);
        assert_eq!(history.undo_stack[0].operations.len(), 3);
        assert_eq!(history.undo_stack[0].caret_after, Point::new(1, 3));

        let (ops, caret) = history.undo().unwrap();
        assert_eq!(ops.len(), 3);
        assert_eq!(caret, Point::new(1, 0));
    }

    #[test]
    fn test_coalescing_breaks_on_newline() {
        let mut history = History::new(100);
        history.set_coalesce_window(Duration::from_millis(1000));

        type_char(&mut history, 0, "a");
        type_char(&mut history, 1, "\n");
        history.begin_edit(Point::new(2, 0));
        history.record(insert(2, 0, "b"));
        history.commit_edit();

        // ["a", "\n"] and ["b"]
        assert_eq!(history.undo_stack.len(), 2);
        assert_eq!(history.undo_stack[0].operations.len(), 2);
        assert_eq!(history.undo_stack[1].operations.len(), 1);
    }

    #[test]
    fn test_coalescing_backspaces() {
        let mut history = History::new(100);
        history.set_coalesce_window(Duration::from_millis(1000));
        for col in [3, 2, 1] {
            history.begin_edit(Point::new(1, col + 1));
            history.record(EditOperation::Delete {
                point: Point::new(1, col),
                text: "x".to_string(),
            });
            history.commit_edit();
        }
        assert_eq!(history.undo_stack.len(), 1);
    }

    #[test]
    fn test_coalescing_disabled() {
        let mut history = History::new(100);
        history.set_coalesce_enabled(false);

        type_char(&mut history, 0, "a");
        type_char(&mut history, 1, "b");

        assert_eq!(history.undo_stack.len(), 2);
    }

    #[test]
    fn test_max_size() {
        let mut history = History::new(2);
        history.set_coalesce_enabled(false);
        for col in 0..4 {
            type_char(&mut history, col, "x");
        }
        assert_eq!(history.undo_stack.len(), 2);
    }
}
