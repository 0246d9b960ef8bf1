//! Find-all results listing.
//!
//! Renders the matches of a source buffer into a results buffer, one line
//! per match. Each match line reuses the id of the source line it shows, so
//! a consumer can map back with [`TextBuffer::line_nr_from_id`] after edits
//! have shifted the source's line numbers.
//!
//! ```text
//! -- src/main.c
//!  3 int count = 0;
//! 12     count += step;
//! >> 2
//! ```

use crate::buffer::TextBuffer;
use crate::error::{BufferError, FindError};
use crate::line::NO_ID;
use crate::point::{Point, Range};
use crate::search::FindOptions;
use crate::syntax::{LanguageProfile, LexSpan, TokenKind};
use std::sync::Arc;

/// Writes find-all listings into its own results buffer.
#[derive(Debug)]
pub struct FindResultWriter {
    buffer: TextBuffer,
}

impl Default for FindResultWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl FindResultWriter {
    /// Creates a writer with an empty results buffer.
    pub fn new() -> Self {
        let mut buffer = TextBuffer::new(Arc::new(LanguageProfile::plain_text()));
        buffer.annotate_line(1, NO_ID, Vec::new());
        Self { buffer }
    }

    /// The results buffer.
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> TextBuffer {
        self.buffer
    }

    /// Removes every listing.
    pub fn clear(&mut self) -> Result<(), BufferError> {
        let range = self.buffer.range();
        if !range.is_empty() {
            self.buffer.delete_text(range)?;
        }
        self.buffer.annotate_line(1, NO_ID, Vec::new());
        Ok(())
    }

    /// Searches all of `source` and appends the listing. Returns the number
    /// of matches; nothing is written when there are none.
    pub fn find_all(
        &mut self,
        name: &str,
        source: &TextBuffer,
        pattern: &str,
        options: &FindOptions,
    ) -> Result<usize, FindError> {
        let matches = source.find_string_all(pattern, source.range(), options)?;
        self.write(name, source, &matches)?;
        Ok(matches.len())
    }

    /// Appends a listing of `matches` (single-line ranges in `source`). The
    /// first listing of an empty writer starts on line 1.
    pub fn write(&mut self, name: &str, source: &TextBuffer, matches: &[Range]) -> Result<(), BufferError> {
        if matches.is_empty() {
            return Ok(());
        }

        let header = format!("-- {}", name.replace(['\r', '\n'], " "));
        if self.buffer.range().is_empty() {
            self.buffer.insert_text(Point::new(1, 0), &header)?;
            self.buffer.annotate_line(1, NO_ID, Vec::new());
        } else {
            self.buffer.append_annotated_line(&header, NO_ID, Vec::new());
        }

        let width = matches
            .iter()
            .map(|m| m.begin.line.to_string().len())
            .max()
            .unwrap_or(1);

        for m in matches {
            let Some(line) = source.line(m.begin.line) else {
                continue;
            };
            let text = format!("{:>width$} {}", m.begin.line, line.text(), width = width);
            let match_len = if m.is_single_line() {
                m.end.col - m.begin.col
            } else {
                line.len() - m.begin.col
            };
            let spans = vec![
                LexSpan::new(0, width, TokenKind::Number),
                LexSpan::new(width + 1 + m.begin.col, match_len, TokenKind::Match),
            ];
            self.buffer.append_annotated_line(&text, line.id(), spans);
        }

        self.buffer
            .append_annotated_line(&format!(">> {}", matches.len()), NO_ID, Vec::new());
        log::debug!("Listed {} match(es) in {}", matches.len(), name);
        Ok(())
    }

    /// Current line number in `source` of the match shown on `listing_line`.
    pub fn source_line(&self, listing_line: usize, source: &TextBuffer) -> Option<usize> {
        let id = self.buffer.line_id(listing_line)?;
        source.line_nr_from_id(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn source(text: &str) -> TextBuffer {
        TextBuffer::from_str(text, Arc::new(LanguageProfile::plain_text()))
    }

    fn listing(writer: &FindResultWriter) -> Vec<String> {
        writer.buffer().lines().map(|l| l.text().to_string()).collect()
    }

    #[test]
    fn test_listing_format() {
        let mut text = String::new();
        for i in 1..=12 {
            text.push_str(if i == 3 || i == 12 { "foo here\n" } else { "other\n" });
        }
        let source = source(&text);
        let mut writer = FindResultWriter::new();
        let count = writer
            .find_all("a.txt", &source, "foo", &FindOptions::default())
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            listing(&writer),
            vec!["-- a.txt", " 3 foo here", "12 foo here", ">> 2"]
        );
        let results = writer.buffer();
        assert_eq!(results.line_id(1), Some(NO_ID));
        assert_eq!(results.line_id(4), Some(NO_ID));
        assert_eq!(results.line_id(2), source.line_id(3));

        let row = results.line(2).unwrap();
        assert_eq!(row.token_at(1), Some(TokenKind::Number));
        assert_eq!(row.token_at(3), Some(TokenKind::Match));
        assert_eq!(row.token_at(5), Some(TokenKind::Match));
        assert_eq!(row.token_at(6), None);
    }

    #[test]
    fn test_one_row_per_match() {
        let source = source("foo bar foo");
        let mut writer = FindResultWriter::new();
        writer
            .find_all("x", &source, "foo", &FindOptions::default())
            .unwrap();
        assert_eq!(listing(&writer), vec!["-- x", "1 foo bar foo", "1 foo bar foo", ">> 2"]);
        assert_eq!(writer.buffer().line(3).unwrap().token_at(10), Some(TokenKind::Match));
    }

    #[test]
    fn test_no_match_writes_nothing() {
        let source = source("abc");
        let mut writer = FindResultWriter::new();
        let count = writer
            .find_all("x", &source, "zzz", &FindOptions::default())
            .unwrap();
        assert_eq!(count, 0);
        assert_eq!(writer.buffer().line_count(), 1);
    }

    #[test]
    fn test_maps_back_after_source_edits() {
        let mut source = source("a\nneedle\nb");
        let mut writer = FindResultWriter::new();
        writer
            .find_all("x", &source, "needle", &FindOptions::default())
            .unwrap();
        assert_eq!(writer.source_line(2, &source), Some(2));

        source.insert_text(Point::new(1, 0), "new\nlines\n").unwrap();
        assert_eq!(writer.source_line(2, &source), Some(4));
        assert_eq!(writer.source_line(1, &source), None);
    }

    #[test]
    fn test_clear() {
        let source = source("foo");
        let mut writer = FindResultWriter::new();
        writer
            .find_all("x", &source, "foo", &FindOptions::default())
            .unwrap();
        writer.clear().unwrap();
        assert_eq!(writer.buffer().line_count(), 1);
        assert_eq!(writer.buffer().line_id(1), Some(NO_ID));

        writer
            .find_all("y", &source, "foo", &FindOptions::default())
            .unwrap();
        assert_eq!(listing(&writer), vec!["-- y", "1 foo", ">> 1"]);
    }

    #[test]
    fn test_listings_accumulate() {
        let source = source("foo
bar");
        let mut writer = FindResultWriter::new();
        let options = FindOptions::default();
        writer.find_all("a", &source, "foo", &options).unwrap();
        writer.find_all("b", &source, "bar", &options).unwrap();
        assert_eq!(
            listing(&writer),
            vec!["-- a", "1 foo", ">> 1", "-- b", "2 bar", ">> 1"]
        );
        assert_eq!(writer.source_line(5, &source), Some(2));
    }
}
