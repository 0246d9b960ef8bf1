//! Buffer coordinates.

use std::fmt;

/// A position between characters.
///
/// `line` is 1-based, `col` is a 0-based character index within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub line: usize,
    pub col: usize,
}

impl Point {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    /// Returns the point reached after inserting `text` (already normalised
    /// to `\n` line breaks) at this point.
    pub fn advanced_by(self, text: &str) -> Point {
        let mut pieces = text.split('\n');
        let first = pieces.next().unwrap_or("");
        let mut point = Point::new(self.line, self.col + first.chars().count());
        for piece in pieces {
            point = Point::new(point.line + 1, piece.chars().count());
        }
        point
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// An ordered pair of points, `begin <= end`. Empty when both are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub begin: Point,
    pub end: Point,
}

impl Range {
    /// Creates a range, swapping the points if they are out of order.
    pub fn new(a: Point, b: Point) -> Self {
        if a <= b {
            Self { begin: a, end: b }
        } else {
            Self { begin: b, end: a }
        }
    }

    /// An empty range at `point`.
    pub fn empty(point: Point) -> Self {
        Self {
            begin: point,
            end: point,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Returns true if the range lies on a single line.
    pub fn is_single_line(&self) -> bool {
        self.begin.line == self.end.line
    }

    pub fn contains(&self, point: Point) -> bool {
        self.begin <= point && point <= self.end
    }

    /// Number of lines touched by the range.
    pub fn line_count(&self) -> usize {
        self.end.line - self.begin.line + 1
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.begin, self.end)
    }
}
