//! Editor Core - Source text engine.
//!
//! Line buffer with per-line lexical spans, incremental quote/comment-aware
//! lexing, C-family indentation and find/replace. No windowing or rendering
//! dependencies.

pub mod buffer;
pub mod document;
pub mod error;
pub mod find_result;
pub mod history;
pub mod indent;
pub mod line;
pub mod options;
pub mod point;
pub mod search;
pub mod syntax;

pub use buffer::{BufferChange, ChangeKind, EditResult, Encoding, TextBuffer};
pub use document::Document;
pub use error::{BufferError, FindError, OptionsError, QuoteRuleError};
pub use find_result::FindResultWriter;
pub use history::{EditOperation, History};
pub use indent::{compute_indent, IndentFn};
pub use line::{Line, LineId, NO_ID};
pub use options::TextOptions;
pub use point::{Point, Range};
pub use search::{FindOptions, Matcher, ReplaceStep};
pub use syntax::{Language, LanguageProfile, LexSpan, QuoteKind, QuoteRule, Syntax, TokenKind};
