//! Quote rules: the comment and string definitions of a language.

use super::lex::TokenKind;
use crate::error::QuoteRuleError;
use std::collections::HashSet;

/// Character that escapes the next character inside single-line quotes and
/// continues a single-line quote onto the next line when it ends the line.
pub const ESCAPE_CHAR: char = '\\';

/// How a quote is terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteKind {
    /// Ends at the end marker or at end of line, unless the line ends with
    /// the escape character. An empty end marker means "end of line".
    SingleLineEscaped,
    /// Ends only at the end marker, possibly many lines later.
    MultiLine,
}

/// A quote rule: `start` .. `end` classified as `token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRule {
    token: TokenKind,
    start: Vec<char>,
    end: Vec<char>,
    kind: QuoteKind,
}

impl QuoteRule {
    pub fn new(token: TokenKind, start: &str, end: &str, kind: QuoteKind) -> Self {
        Self {
            token,
            start: start.chars().collect(),
            end: end.chars().collect(),
            kind,
        }
    }

    pub fn token(&self) -> TokenKind {
        self.token
    }

    pub fn kind(&self) -> QuoteKind {
        self.kind
    }

    pub fn start(&self) -> &[char] {
        &self.start
    }

    pub fn end(&self) -> &[char] {
        &self.end
    }

    pub fn is_multi_line(&self) -> bool {
        self.kind == QuoteKind::MultiLine
    }
}

/// The lexical rules of a language: quote rules plus keywords.
#[derive(Debug, Clone, Default)]
pub struct Syntax {
    quotes: Vec<QuoteRule>,
    keywords: HashSet<String>,
}

impl Syntax {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a quote rule.
    ///
    /// Rules with an empty start marker, multi-line rules without an end
    /// marker and rules repeating an existing start marker are rejected.
    pub fn add_quote(&mut self, rule: QuoteRule) -> Result<usize, QuoteRuleError> {
        if rule.start.is_empty() {
            return Err(QuoteRuleError::EmptyStartMarker);
        }
        if rule.is_multi_line() && rule.end.is_empty() {
            return Err(QuoteRuleError::EmptyEndMarker(rule.start.iter().collect()));
        }
        if self.quotes.iter().any(|q| q.start == rule.start) {
            let marker: String = rule.start.iter().collect();
            log::warn!("Rejected quote rule: duplicate start marker {:?}", marker);
            return Err(QuoteRuleError::DuplicateStartMarker(marker));
        }
        self.quotes.push(rule);
        Ok(self.quotes.len() - 1)
    }

    /// Builder form of [`Syntax::add_quote`].
    pub fn with_quote(mut self, rule: QuoteRule) -> Result<Self, QuoteRuleError> {
        self.add_quote(rule)?;
        Ok(self)
    }

    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords.extend(keywords.iter().map(|k| k.to_string()));
        self
    }

    pub fn quotes(&self) -> &[QuoteRule] {
        &self.quotes
    }

    pub fn quote(&self, index: usize) -> Option<&QuoteRule> {
        self.quotes.get(index)
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.contains(word)
    }

    /// Returns the rule whose start marker matches at `at`, preferring the
    /// longest marker.
    pub fn match_start(&self, chars: &[char], at: usize) -> Option<(usize, &QuoteRule)> {
        let mut best: Option<(usize, &QuoteRule)> = None;
        for (index, rule) in self.quotes.iter().enumerate() {
            if !matches_at(chars, at, &rule.start) {
                continue;
            }
            match best {
                Some((_, b)) if b.start.len() >= rule.start.len() => {}
                _ => best = Some((index, rule)),
            }
        }
        best
    }
}

/// Returns true if `marker` occurs in `chars` at `at`.
pub(crate) fn matches_at(chars: &[char], at: usize, marker: &[char]) -> bool {
    !marker.is_empty() && chars.len() >= at + marker.len() && chars[at..at + marker.len()] == *marker
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_start() {
        let mut syntax = Syntax::new();
        let rule = QuoteRule::new(TokenKind::Comment, "", "*/", QuoteKind::MultiLine);
        assert_eq!(syntax.add_quote(rule), Err(QuoteRuleError::EmptyStartMarker));
    }

    #[test]
    fn test_rejects_multi_line_without_end() {
        let mut syntax = Syntax::new();
        let rule = QuoteRule::new(TokenKind::Comment, "/*", "", QuoteKind::MultiLine);
        assert_eq!(
            syntax.add_quote(rule),
            Err(QuoteRuleError::EmptyEndMarker("/*".to_string()))
        );
    }

    #[test]
    fn test_rejects_duplicate_start() {
        let mut syntax = Syntax::new();
        syntax
            .add_quote(QuoteRule::new(TokenKind::String, "\"", "\"", QuoteKind::SingleLineEscaped))
            .unwrap();
        let dup = QuoteRule::new(TokenKind::String, "\"", "\"", QuoteKind::MultiLine);
        assert_eq!(
            syntax.add_quote(dup),
            Err(QuoteRuleError::DuplicateStartMarker("\"".to_string()))
        );
        assert_eq!(syntax.quotes().len(), 1);
    }

    #[test]
    fn test_longest_start_marker_wins() {
        let syntax = Syntax::new()
            .with_quote(QuoteRule::new(TokenKind::String, "\"", "\"", QuoteKind::SingleLineEscaped))
            .unwrap()
            .with_quote(QuoteRule::new(TokenKind::String, "\"\"\"", "\"\"\"", QuoteKind::MultiLine))
            .unwrap();

        let chars: Vec<char> = "x = \"\"\"doc".chars().collect();
        let (index, rule) = syntax.match_start(&chars, 4).unwrap();
        assert_eq!(index, 1);
        assert!(rule.is_multi_line());

        let chars: Vec<char> = "\"a\"".chars().collect();
        assert_eq!(syntax.match_start(&chars, 0).unwrap().0, 0);
        assert!(syntax.match_start(&chars, 1).is_none());
    }
}
