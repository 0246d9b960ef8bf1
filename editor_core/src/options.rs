//! Text options consumed by the indentation engine.

use crate::error::OptionsError;
use serde::{Deserialize, Serialize};

/// Per-document text options.
///
/// Passed explicitly into every indentation call; nothing in the core reads
/// options from global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOptions {
    /// Display width of a tab character.
    pub tab_stop: usize,
    /// Number of columns added per nesting level.
    pub shift_width: usize,
    /// Render indentation with spaces only.
    pub expand_tab: bool,
    /// Indent `case`/`default` labels one shift deeper than their `switch`.
    pub indent_case: bool,
    /// Indent `public:`/`protected:`/`private:` one shift deeper than their
    /// class (members then get two shifts).
    pub indent_access_specifier: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            tab_stop: 4,
            shift_width: 4,
            expand_tab: true,
            indent_case: true,
            indent_access_specifier: true,
        }
    }
}

impl TextOptions {
    /// Checks that the options can be used for indentation.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.tab_stop == 0 {
            return Err(OptionsError::ZeroTabStop);
        }
        if self.shift_width == 0 {
            return Err(OptionsError::ZeroShiftWidth);
        }
        Ok(())
    }

    /// Renders an indentation of `width` display columns.
    pub fn make_indent(&self, width: usize) -> String {
        if self.expand_tab || self.tab_stop == 0 {
            return " ".repeat(width);
        }
        let mut indent = "\t".repeat(width / self.tab_stop);
        indent.push_str(&" ".repeat(width % self.tab_stop));
        indent
    }

    /// Returns the display width of a run of leading whitespace.
    pub fn indent_width(&self, indent: &str) -> usize {
        let tab_stop = self.tab_stop.max(1);
        indent.chars().fold(0, |width, ch| match ch {
            '\t' => width + tab_stop - width % tab_stop,
            _ => width + 1,
        })
    }
}
