//! Lexical classification.
//!
//! Quote-rule driven, line-local scanning. Each line is scanned with the
//! state left by the line above it, so multi-line comments and escaped line
//! continuations carry across lines.

mod language;
mod lex;
mod quote;
mod scanner;

pub use language::{Language, LanguageProfile};
pub use lex::{LexSpan, ScanResult, ScanState, TokenKind};
pub use quote::{QuoteKind, QuoteRule, Syntax, ESCAPE_CHAR};
pub use scanner::{is_word_char, scan_line};
