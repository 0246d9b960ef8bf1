//! Language detection and per-language profiles.
//!
//! Detects file types from extensions and provides the quote rules,
//! keywords and indent function used for each of them.

use super::lex::TokenKind;
use super::quote::{QuoteKind, QuoteRule, Syntax};
use crate::error::QuoteRuleError;
use crate::indent::{self, IndentFn};
use crate::options::TextOptions;
use std::path::Path;
use std::sync::Arc;

/// Supported file types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    C,
    Cpp,
    Java,
    JavaScript,
    TypeScript,
    Rust,
    Go,
    Python,
    Json,
    #[default]
    PlainText,
}

impl Language {
    /// Returns all available languages (for UI selection).
    pub fn all() -> &'static [Language] {
        &[
            Language::C,
            Language::Cpp,
            Language::Java,
            Language::JavaScript,
            Language::TypeScript,
            Language::Rust,
            Language::Go,
            Language::Python,
            Language::Json,
            Language::PlainText,
        ]
    }

    /// Detects language from a file path based on extension.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::PlainText)
    }

    /// Detects language from a file extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "c" | "h" => Self::C,
            "cpp" | "cc" | "cxx" | "c++" | "hpp" | "hh" | "hxx" | "h++" => Self::Cpp,
            "java" => Self::Java,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "ts" | "tsx" | "mts" | "cts" => Self::TypeScript,
            "rs" => Self::Rust,
            "go" => Self::Go,
            "py" | "pyw" | "pyi" => Self::Python,
            "json" | "jsonc" => Self::Json,
            _ => Self::PlainText,
        }
    }

    /// Returns the display name of the language.
    pub fn name(&self) -> &'static str {
        match self {
            Self::C => "C",
            Self::Cpp => "C++",
            Self::Java => "Java",
            Self::JavaScript => "JavaScript",
            Self::TypeScript => "TypeScript",
            Self::Rust => "Rust",
            Self::Go => "Go",
            Self::Python => "Python",
            Self::Json => "JSON",
            Self::PlainText => "Plain Text",
        }
    }
}

const C_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "int", "long", "return", "short", "signed",
    "sizeof", "static", "struct", "switch", "typedef", "union", "unsigned", "void", "volatile",
    "while",
];

const CPP_KEYWORDS: &[&str] = &[
    "bool", "catch", "class", "const_cast", "delete", "explicit", "false", "friend", "inline",
    "mutable", "namespace", "new", "nullptr", "operator", "private", "protected", "public",
    "template", "this", "throw", "true", "try", "typename", "using", "virtual",
];

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "boolean", "break", "case", "catch", "class", "continue", "default", "do",
    "else", "extends", "final", "finally", "for", "if", "implements", "import", "interface",
    "new", "package", "private", "protected", "public", "return", "static", "switch", "this",
    "throw", "try", "void", "while",
];

const JS_KEYWORDS: &[&str] = &[
    "async", "await", "break", "case", "catch", "class", "const", "continue", "default",
    "else", "export", "for", "function", "if", "import", "let", "new", "return", "switch",
    "this", "throw", "try", "var", "while",
];

const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "fn", "for", "if", "impl",
    "in", "let", "loop", "match", "mod", "mut", "pub", "return", "self", "static", "struct",
    "trait", "type", "use", "where", "while",
];

const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "for", "func",
    "go", "if", "import", "interface", "map", "package", "range", "return", "select", "struct",
    "switch", "type", "var",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "and", "as", "class", "def", "elif", "else", "except", "for", "from", "if", "import",
    "in", "is", "lambda", "not", "or", "pass", "return", "try", "while", "with", "yield",
];

/// Everything the core needs to know about a file type, selected once per
/// document.
#[derive(Debug, Clone)]
pub struct LanguageProfile {
    language: Language,
    syntax: Syntax,
    indent: IndentFn,
    options: TextOptions,
}

impl LanguageProfile {
    /// Creates a profile from its parts.
    pub fn new(language: Language, syntax: Syntax, indent: IndentFn, options: TextOptions) -> Self {
        Self {
            language,
            syntax,
            indent,
            options,
        }
    }

    /// Builds the built-in profile for `language`.
    pub fn for_language(language: Language) -> Result<Self, QuoteRuleError> {
        let options = TextOptions::default();
        let profile = match language {
            Language::C => Self::new(
                language,
                c_family_syntax(true, true)?.with_keywords(C_KEYWORDS),
                indent::indent_c_family,
                options,
            ),
            Language::Cpp => Self::new(
                language,
                c_family_syntax(true, true)?
                    .with_keywords(C_KEYWORDS)
                    .with_keywords(CPP_KEYWORDS),
                indent::indent_c_family,
                options,
            ),
            Language::Java => Self::new(
                language,
                c_family_syntax(true, false)?.with_keywords(JAVA_KEYWORDS),
                indent::indent_c_family,
                options,
            ),
            // Single quotes delimit strings, not chars.
            Language::JavaScript | Language::TypeScript => Self::new(
                language,
                c_family_syntax(false, false)?
                    .with_quote(QuoteRule::new(
                        TokenKind::String,
                        "'",
                        "'",
                        QuoteKind::SingleLineEscaped,
                    ))?
                    .with_quote(QuoteRule::new(TokenKind::String, "`", "`", QuoteKind::MultiLine))?
                    .with_keywords(JS_KEYWORDS),
                indent::indent_c_family,
                options,
            ),
            // Single quotes are lifetimes as often as char literals.
            Language::Rust => Self::new(
                language,
                c_family_syntax(false, false)?.with_keywords(RUST_KEYWORDS),
                indent::indent_c_family,
                options,
            ),
            Language::Go => Self::new(
                language,
                c_family_syntax(true, false)?
                    .with_quote(QuoteRule::new(TokenKind::String, "`", "`", QuoteKind::MultiLine))?
                    .with_keywords(GO_KEYWORDS),
                indent::indent_c_family,
                options,
            ),
            Language::Python => Self::new(language, python_syntax()?, indent::indent_python, options),
            Language::Json => Self::new(
                language,
                Syntax::new().with_quote(QuoteRule::new(
                    TokenKind::String,
                    "\"",
                    "\"",
                    QuoteKind::SingleLineEscaped,
                ))?,
                indent::indent_c_family,
                TextOptions {
                    shift_width: 2,
                    ..options
                },
            ),
            Language::PlainText => Self::plain_text(),
        };
        Ok(profile)
    }

    /// Profile without quote rules; indentation follows the previous line.
    pub fn plain_text() -> Self {
        Self::new(
            Language::PlainText,
            Syntax::new(),
            indent::indent_keep,
            TextOptions::default(),
        )
    }

    /// Detects the language of `path` and builds its profile, shared.
    pub fn for_path(path: &Path) -> Result<Arc<Self>, QuoteRuleError> {
        Self::for_language(Language::from_path(path)).map(Arc::new)
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn syntax(&self) -> &Syntax {
        &self.syntax
    }

    pub fn indent_fn(&self) -> IndentFn {
        self.indent
    }

    /// Default text options for this file type.
    pub fn options(&self) -> &TextOptions {
        &self.options
    }
}

impl Default for LanguageProfile {
    fn default() -> Self {
        Self::plain_text()
    }
}

fn c_family_syntax(char_quotes: bool, preprocessor: bool) -> Result<Syntax, QuoteRuleError> {
    let mut syntax = Syntax::new()
        .with_quote(QuoteRule::new(TokenKind::Comment, "/*", "*/", QuoteKind::MultiLine))?
        .with_quote(QuoteRule::new(
            TokenKind::Comment,
            "//",
            "",
            QuoteKind::SingleLineEscaped,
        ))?
        .with_quote(QuoteRule::new(
            TokenKind::String,
            "\"",
            "\"",
            QuoteKind::SingleLineEscaped,
        ))?;
    if char_quotes {
        syntax.add_quote(QuoteRule::new(
            TokenKind::Char,
            "'",
            "'",
            QuoteKind::SingleLineEscaped,
        ))?;
    }
    if preprocessor {
        syntax.add_quote(QuoteRule::new(
            TokenKind::Preprocessor,
            "#",
            "",
            QuoteKind::SingleLineEscaped,
        ))?;
    }
    Ok(syntax)
}

fn python_syntax() -> Result<Syntax, QuoteRuleError> {
    Ok(Syntax::new()
        .with_quote(QuoteRule::new(TokenKind::Comment, "#", "", QuoteKind::SingleLineEscaped))?
        .with_quote(QuoteRule::new(TokenKind::String, "\"\"\"", "\"\"\"", QuoteKind::MultiLine))?
        .with_quote(QuoteRule::new(TokenKind::String, "'''", "'''", QuoteKind::MultiLine))?
        .with_quote(QuoteRule::new(
            TokenKind::String,
            "\"",
            "\"",
            QuoteKind::SingleLineEscaped,
        ))?
        .with_quote(QuoteRule::new(TokenKind::String, "'", "'", QuoteKind::SingleLineEscaped))?
        .with_keywords(PYTHON_KEYWORDS))
}
