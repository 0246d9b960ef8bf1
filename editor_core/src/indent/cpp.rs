//! C-family indentation.
//!
//! The indent of a line is decided by the nearest significant line above it
//! (the anchor) and by a few shapes of the line itself: a leading `}`, a
//! `case` label or an access specifier.

use super::{
    first_word, is_line_macro, line_width, prev_significant, starts_in_quote, statement_start,
    unmatched_open, visual_col,
};
use crate::buffer::TextBuffer;
use crate::line::Line;
use crate::options::TextOptions;
use crate::point::Point;

const HEADER_KEYWORDS: &[&str] = &["if", "else", "for", "while", "do"];
const ACCESS_SPECIFIERS: &[&str] = &["public", "protected", "private"];

/// Indent function for C, C++ and the other brace languages.
pub fn indent_c_family(buffer: &TextBuffer, ln: usize, options: &TextOptions) -> String {
    let Some(line) = buffer.line(ln) else {
        return String::new();
    };
    // Macro continuations, comment bodies and string contents are never
    // re-flowed.
    if is_line_macro(buffer, ln) || starts_in_quote(line) {
        return line.indent_str().to_string();
    }
    options.make_indent(target_width(buffer, ln, line, options))
}

fn target_width(buffer: &TextBuffer, ln: usize, line: &Line, options: &TextOptions) -> usize {
    let shift = options.shift_width;
    let first = line.code_chars().find(|(_, ch)| !ch.is_whitespace());

    if let Some((col, '}')) = first {
        if let Some(open) = unmatched_open(buffer, Point::new(ln, col), "{", "}", "") {
            return statement_width(buffer, open, options);
        }
    }
    if is_case_label(line) {
        if let Some(open) = unmatched_open(buffer, Point::new(ln, 0), "{", "}", "") {
            let extra = if options.indent_case { shift } else { 0 };
            return statement_width(buffer, open, options) + extra;
        }
    }
    if is_access_specifier(line) {
        if let Some(open) = unmatched_open(buffer, Point::new(ln, 0), "{", "}", "") {
            let extra = if options.indent_access_specifier { shift } else { 0 };
            return statement_width(buffer, open, options) + extra;
        }
    }

    let Some(prev) = prev_significant(buffer, ln) else {
        return 0;
    };
    let Some(prev_line) = buffer.line(prev) else {
        return 0;
    };
    let last = prev_line.last_code_char();

    if let Some((col, '{')) = last {
        return statement_width(buffer, Point::new(prev, col), options) + shift;
    }

    // Continuation inside an open parameter list or subscript.
    if let Some(open) = unmatched_open(buffer, Point::new(ln, 0), "([", ")]", "{}") {
        if let Some(open_line) = buffer.line(open.line) {
            return match next_token_col(open_line, open.col) {
                Some(col) => visual_col(open_line, col, options),
                None => statement_width(buffer, open, options) + shift,
            };
        }
    }

    if is_braceless_header(buffer, prev) {
        let header = statement_width(buffer, Point::new(prev, prev_line.len()), options);
        return match first {
            Some((_, '{')) => header,
            _ => header + shift,
        };
    }

    if let Some((col, '}')) = last {
        if let Some(open) = unmatched_open(buffer, Point::new(prev, col), "{", "}", "") {
            let start = statement_start(buffer, open.line, open.col);
            return revert_braceless(buffer, start, options);
        }
    }

    if let Some((_, ':')) = last {
        if is_access_specifier(prev_line) || is_case_label(prev_line) {
            return line_width(prev_line, options) + shift;
        }
    }

    let start = statement_start(buffer, prev, prev_line.len());
    revert_braceless(buffer, start, options)
}

/// Indent width of the statement holding `point`.
fn statement_width(buffer: &TextBuffer, point: Point, options: &TextOptions) -> usize {
    let start = statement_start(buffer, point.line, point.col);
    buffer
        .line(start)
        .map_or(0, |line| line_width(line, options))
}

/// A single statement under brace-less headers ends their bodies: walk back
/// over such headers and return the outermost one's indent.
fn revert_braceless(buffer: &TextBuffer, start: usize, options: &TextOptions) -> usize {
    let mut start = start;
    while let Some(prev) = prev_significant(buffer, start) {
        if !is_braceless_header(buffer, prev) {
            break;
        }
        let len = buffer.line(prev).map_or(0, Line::len);
        start = statement_start(buffer, prev, len);
    }
    buffer
        .line(start)
        .map_or(0, |line| line_width(line, options))
}

/// `if`/`else`/`for`/`while`/`do` statement whose body is on the next line.
fn is_braceless_header(buffer: &TextBuffer, ln: usize) -> bool {
    let Some(line) = buffer.line(ln) else {
        return false;
    };
    match line.last_code_char() {
        None | Some((_, ';' | '{' | '}')) => return false,
        _ => {}
    }
    let start = statement_start(buffer, ln, line.len());
    let Some(start_line) = buffer.line(start) else {
        return false;
    };
    let code = start_line.code_text();
    let word = first_word(code.trim_start_matches('}').trim_start());
    HEADER_KEYWORDS.contains(&word)
}

fn is_case_label(line: &Line) -> bool {
    let code = line.code_text();
    match first_word(&code) {
        "case" => true,
        "default" => code["default".len()..].trim_start().starts_with(':'),
        _ => false,
    }
}

fn is_access_specifier(line: &Line) -> bool {
    let code = line.code_text();
    ACCESS_SPECIFIERS.iter().any(|keyword| {
        code.strip_prefix(keyword).is_some_and(|rest| {
            let rest = rest.trim_start();
            rest.starts_with(':') && !rest.starts_with("::")
        })
    })
}

/// First non-blank, non-comment column after `col`.
fn next_token_col(line: &Line, col: usize) -> Option<usize> {
    line.text()
        .chars()
        .enumerate()
        .skip(col + 1)
        .find(|&(c, ch)| !ch.is_whitespace() && !line.is_comment(c))
        .map(|(c, _)| c)
}

#[cfg(test)]
mod tests {
    use crate::buffer::TextBuffer;
    use crate::options::TextOptions;
    use crate::syntax::{Language, LanguageProfile};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn cpp() -> Arc<LanguageProfile> {
        Arc::new(LanguageProfile::for_language(Language::Cpp).unwrap())
    }

    /// Labels and access specifiers at the indent of their block.
    fn flat_options() -> TextOptions {
        TextOptions {
            tab_stop: 4,
            shift_width: 4,
            expand_tab: true,
            indent_case: false,
            indent_access_specifier: false,
        }
    }

    /// Appends `lines` after the initial empty line, so text line N is
    /// buffer line N + 1.
    fn appended(lines: &[&str]) -> TextBuffer {
        let mut buffer = TextBuffer::new(cpp());
        for line in lines {
            buffer.append_line(line);
        }
        buffer
    }

    fn assert_lines(buffer: &TextBuffer, options: &TextOptions, lines: &[usize]) {
        for &ln in lines {
            let expected = buffer.get_indent(ln).unwrap().to_string();
            let actual = buffer.compute_indent(ln, options).unwrap();
            assert_eq!(actual, expected, "line {}", ln);
        }
    }

    #[test]
    fn test_simple_brace_block() {
        let buffer = appended(&["int a, b, c;", "{", "    int sum = a + b + c;", "}"]);
        assert_lines(&buffer, &flat_options(), &[3, 4, 5]);
    }

    #[test]
    fn test_simple_brace_block_empty_body() {
        let buffer = appended(&["int a, b, c;", "{", "}"]);
        assert_lines(&buffer, &flat_options(), &[3, 4]);
    }

    #[test]
    fn test_empty_body_hypothetical_line() {
        let buffer = appended(&["void None() {", "}"]);
        assert_lines(&buffer, &flat_options(), &[3]);

        let open = TextBuffer::from_str("void None() {\nx;", cpp());
        assert_eq!(open.compute_indent(2, &flat_options()).unwrap(), "    ");
    }

    #[test]
    fn test_function_def_new_line_brace() {
        let buffer = appended(&["void None()", "{", "}"]);
        assert_lines(&buffer, &flat_options(), &[3, 4]);
    }

    #[test]
    fn test_function_def_one_line_params() {
        let buffer = appended(&["void add(int a, int b, int c) {", "    return a + b + c;", "}"]);
        assert_lines(&buffer, &flat_options(), &[3, 4]);
    }

    #[test]
    fn test_function_def_multi_line_params() {
        let buffer = appended(&[
            "void add(int a,",
            "         int b,",
            "         int c) {",
            "    return a + b + c;",
            "}",
        ]);
        assert_lines(&buffer, &flat_options(), &[3, 4, 5, 6]);
    }

    #[test]
    fn test_function_def_multi_line_params_with_tab() {
        let buffer = appended(&[
            "\t void add(int a,",
            "              int b,",
            "              int c) {",
            "         return a + b + c;",
            "     }",
        ]);
        assert_lines(&buffer, &flat_options(), &[3, 4, 5, 6]);
    }

    #[test]
    fn test_function_def_one_line_params_new_line_brace() {
        let buffer = appended(&[
            "void add(int a, int b, int c)",
            "{",
            "    return a + b + c;",
            "}",
        ]);
        assert_lines(&buffer, &flat_options(), &[3, 4, 5]);
    }

    #[test]
    fn test_function_def_multi_line_params_new_line_brace() {
        let buffer = appended(&[
            "void add(int a,",
            "         int b,",
            "         int c)",
            "{",
            "    return a + b + c;",
            "}",
        ]);
        assert_lines(&buffer, &flat_options(), &[3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_open_paren_at_line_end() {
        let buffer = appended(&["    call(", "        a,"]);
        assert_lines(&buffer, &flat_options(), &[3]);
    }

    #[test]
    fn test_if_no_brace() {
        let buffer = appended(&["if (a > b)", "    return b;"]);
        assert_lines(&buffer, &flat_options(), &[3]);
    }

    #[test]
    fn test_if_one_line_conditions() {
        let buffer = appended(&["if (a > b) {", "    return b;", "}"]);
        assert_lines(&buffer, &flat_options(), &[3, 4]);
    }

    #[test]
    fn test_if_no_brace_one_line() {
        let buffer = appended(&["if (a > b) return b;", "else return a;", "int i;"]);
        assert_lines(&buffer, &flat_options(), &[3, 4]);
    }

    #[test]
    fn test_if_else_no_brace() {
        let buffer = appended(&[
            "if (a > b)",
            "    return b;",
            "else",
            "    return a;",
            "int i;",
        ]);
        assert_lines(&buffer, &flat_options(), &[3, 4, 5, 6]);
    }

    #[test]
    fn test_multi_line_condition() {
        let buffer = appended(&["if (a &&", "    b)", "    run();", "done();"]);
        assert_lines(&buffer, &flat_options(), &[3, 4, 5]);
    }

    #[test]
    fn test_brace_on_own_line_after_header() {
        let buffer = appended(&["while (x)", "{", "    x--;", "}"]);
        assert_lines(&buffer, &flat_options(), &[3, 4, 5]);
    }

    #[test]
    fn test_for_no_brace() {
        let buffer = appended(&["for (int i = 0; i < count; ++i)", "    sum += i;"]);
        assert_lines(&buffer, &flat_options(), &[3]);
    }

    #[test]
    fn test_class() {
        let buffer = appended(&["    class A {", "        int count_;", "    };"]);
        assert_lines(&buffer, &flat_options(), &[3, 4]);
    }

    #[test]
    fn test_class_single_accessors() {
        for specifier in ["public:", "protected:", "private:"] {
            let buffer = appended(&["    class A {", &format!("    {}", specifier)]);
            assert_lines(&buffer, &flat_options(), &[3]);
        }
    }

    #[test]
    fn test_class_empty_accessors() {
        for keyword in ["class", "struct"] {
            let buffer = appended(&[
                &format!("    {} A {{", keyword),
                "    public:",
                "    protected:",
                "    private:",
                "    };",
            ]);
            assert_lines(&buffer, &flat_options(), &[3, 4, 5, 6]);
        }
    }

    #[test]
    fn test_class_accessors() {
        for keyword in ["class", "struct"] {
            let buffer = appended(&[
                &format!("    {} A {{", keyword),
                "    public:",
                "        ~A();",
                "    protected:",
                "        A();",
                "    private:",
                "        int count_;",
                "    };",
            ]);
            assert_lines(&buffer, &flat_options(), &[3, 4, 5, 6, 7, 8, 9]);
        }
    }

    #[test]
    fn test_class_accessors_indented() {
        let buffer = appended(&[
            "class A {",
            "    public:",
            "        A();",
            "        int size() const;",
            "    private:",
            "        int count_;",
            "};",
        ]);
        assert_lines(&buffer, &TextOptions::default(), &[3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_scope_operator_is_not_access_specifier() {
        let buffer = appended(&["void f() {", "    public::g();"]);
        assert_lines(&buffer, &TextOptions::default(), &[3]);
    }

    #[test]
    fn test_switch_case() {
        let buffer = appended(&[
            "    switch (file_format) {",
            "    case FF_WIN:",
            "        return L\"\\r\\n\";",
            "    case FF_UNIX:",
            "        return L\"\\n\";",
            "    case FF_MAC:",
            "        return L\"\\r\";",
            "    default:",
            "        return L\"\";",
            "    }",
        ]);
        assert_lines(&buffer, &flat_options(), &[3, 4, 5, 6, 7, 8, 9, 10, 11]);
    }

    #[test]
    fn test_switch_case_indented() {
        let buffer = appended(&[
            "switch (c) {",
            "    case 'a':",
            "        x = 1;",
            "        break;",
            "    default:",
            "        x = 0;",
            "}",
        ]);
        assert_lines(&buffer, &TextOptions::default(), &[3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_commented_block_start() {
        let buffer = appended(&["        int i;  // {", "        int j;"]);
        assert_lines(&buffer, &flat_options(), &[3]);
    }

    #[test]
    fn test_brace_in_string_is_not_block_start() {
        let buffer = appended(&["    s = \"{\";", "    t = '{';", "    u = 0;"]);
        assert_lines(&buffer, &flat_options(), &[3, 4]);
    }

    #[test]
    fn test_macro_lines_keep_their_indent() {
        let buffer = appended(&[
            "        int i;",
            "#define MAX_SIZE \\",
            "  256",
            "        int j;",
        ]);
        assert_lines(&buffer, &flat_options(), &[3, 4, 5]);
    }

    #[test]
    fn test_comment_body_keeps_its_indent() {
        let buffer = appended(&["int f() {", "    /* one", "       two { */", "    return 0;"]);
        assert_lines(&buffer, &flat_options(), &[3, 4, 5]);
    }

    #[test]
    fn test_raw_string_body_keeps_its_indent() {
        let go = Arc::new(LanguageProfile::for_language(Language::Go).unwrap());
        let buffer = TextBuffer::from_str(
            "func f() {\n    s := `line1\n  keep\n`\n    return s\n}",
            go,
        );
        assert_lines(&buffer, &TextOptions::default(), &[2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_template_literal_keeps_its_indent() {
        let js = Arc::new(LanguageProfile::for_language(Language::JavaScript).unwrap());
        let buffer = TextBuffer::from_str(
            "function f() {\n    const s = `a {\n        b\n}`;\n    return s;\n}",
            js,
        );
        let options = TextOptions::default();
        assert_lines(&buffer, &options, &[2, 3, 4, 5, 6]);
        assert_eq!(buffer.compute_indent(4, &options).unwrap(), "");
    }

    #[test]
    fn test_escaped_string_continuation_keeps_its_indent() {
        let buffer = appended(&["int f() {", "    s = \"one \\", "two\";", "    return 0;"]);
        assert_lines(&buffer, &flat_options(), &[3, 4, 5]);
    }

    #[test]
    fn test_tabs_when_not_expanding() {
        let buffer = TextBuffer::from_str("if (x) {\n\tif (y) {\nz;", cpp());
        let options = TextOptions {
            expand_tab: false,
            ..TextOptions::default()
        };
        assert_eq!(buffer.compute_indent(3, &options).unwrap(), "\t\t");
    }

    #[test]
    fn test_brace_block_scenario() {
        let buffer = TextBuffer::from_str("int a;\n{\n    int b;\n}", cpp());
        let options = TextOptions::default();
        let block = buffer.get_indent(2).unwrap().to_string();
        assert_eq!(buffer.compute_indent(3, &options).unwrap(), format!("{}    ", block));
        assert_eq!(buffer.compute_indent(4, &options).unwrap(), block);
    }

    #[test]
    fn test_braceless_if_scenario() {
        let buffer = TextBuffer::from_str("if (a > b)\n    return b;\nc = a;", cpp());
        let options = TextOptions::default();
        assert_eq!(buffer.compute_indent(2, &options).unwrap(), "    ");
        assert_eq!(buffer.compute_indent(3, &options).unwrap(), "");
    }

    #[test]
    fn test_commented_brace_scenario() {
        let buffer = TextBuffer::from_str("int i;  // {\nint j;", cpp());
        assert_eq!(
            buffer.compute_indent(2, &TextOptions::default()).unwrap(),
            buffer.get_indent(1).unwrap()
        );
    }

    #[test]
    fn test_well_indented_file_is_a_fixed_point() {
        let source = "\
#include <stdio.h>

/* A block
   comment { */
int add(int a,
        int b) {
    if (a > b)
        return a;
    for (int i = 0; i < b; ++i) {
        a += i;  // {
    }
    switch (a) {
        case 1:
            break;
        default:
            return 0;
    }
    return a;
}

class Counter {
    public:
        Counter();
    private:
        int count_;
};";
        let buffer = TextBuffer::from_str(source, cpp());
        let options = TextOptions::default();
        let lines: Vec<usize> = (1..=buffer.line_count()).collect();
        assert_lines(&buffer, &options, &lines);
    }
}
