//! Lexical span types.

/// Classification of a span of line text. Text not covered by any span is
/// plain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Comment,
    String,
    Char,
    Preprocessor,
    Number,
    Identifier,
    Keyword,
    /// Matched text in a find-results listing.
    Match,
}

impl TokenKind {
    /// Whether brackets and keywords inside this kind are not code.
    pub fn is_quoted(self) -> bool {
        matches!(
            self,
            Self::Comment | Self::String | Self::Char | Self::Preprocessor
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(self, Self::Comment)
    }
}

/// A classified sub-range of a line, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexSpan {
    pub offset: usize,
    pub len: usize,
    pub kind: TokenKind,
}

impl LexSpan {
    pub fn new(offset: usize, len: usize, kind: TokenKind) -> Self {
        Self { offset, len, kind }
    }

    /// Column just past the span.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    pub fn contains(&self, col: usize) -> bool {
        col >= self.offset && col < self.end()
    }
}

/// Scan state carried from one line to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ScanState {
    #[default]
    Normal,
    /// Inside the quote rule with this index in the syntax's rule table.
    Quote(usize),
}

impl ScanState {
    pub fn is_normal(self) -> bool {
        matches!(self, Self::Normal)
    }
}

/// Output of scanning one line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanResult {
    pub spans: Vec<LexSpan>,
    pub state_out: ScanState,
}
