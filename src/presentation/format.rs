//! Diagnostic formatting
//!
//! Plain output is one line per diagnostic and never colored. Pretty output
//! adds colors, a code excerpt with squiggles under the reported span, and
//! related information.

use chrono::{DateTime, Local, Utc};
use crossterm::style::Stylize;
use unicode_width::UnicodeWidthChar;

use super::theme::{self, colors};
use crate::domain::entities::{Diagnostic, DiagnosticCategory, SourceFile};
use crate::domain::value_objects::path::convert_to_relative_path;
use crate::domain::value_objects::FileNameCasing;

/// Code prefix printed before diagnostic numbers.
pub const CODE_PREFIX: &str = "KL";

const ELLIPSIS: &str = "...";
const HALF_INDENT: &str = "  ";
const INDENT: &str = "    ";

/// What a formatter needs from its host.
#[derive(Debug, Clone)]
pub struct FormatHost {
    pub current_directory: String,
    pub new_line: &'static str,
    pub casing: FileNameCasing,
}

impl FormatHost {
    pub fn new(current_directory: impl Into<String>, new_line: &'static str, casing: FileNameCasing) -> Self {
        Self {
            current_directory: current_directory.into(),
            new_line,
            casing,
        }
    }

    /// `file_name` relative to the current directory.
    pub fn relative_file_name(&self, file_name: &str) -> String {
        convert_to_relative_path(file_name, &self.current_directory, |f| {
            self.casing.canonicalize(f)
        })
    }
}

/// `<file>(<line>,<col>): <category> KL<code>: <message><newline>`
pub fn format_diagnostic(diagnostic: &Diagnostic, host: &FormatHost) -> String {
    let mut output = String::new();
    if let (Some(file), Some(start)) = (diagnostic.file(), diagnostic.start()) {
        let (line, character) = file.line_and_character(start);
        output.push_str(&format!(
            "{}({},{}): ",
            host.relative_file_name(file.file_name()),
            line + 1,
            character + 1
        ));
    }
    output.push_str(&format!(
        "{} {}{}: {}{}",
        diagnostic.category().name(),
        CODE_PREFIX,
        diagnostic.code(),
        diagnostic.message_text().flatten(host.new_line),
        host.new_line
    ));
    output
}

/// Colored rendering of `diagnostics` with code excerpts.
pub fn format_diagnostics_with_color_and_context(diagnostics: &[Diagnostic], host: &FormatHost) -> String {
    let new_line = host.new_line;
    let mut output = String::new();
    for diagnostic in diagnostics {
        let located = diagnostic.file().zip(diagnostic.start());
        if let Some((file, start)) = located {
            output.push_str(&format_location(file, start, host));
            output.push_str(" - ");
        }
        let category_color = theme::category_color(diagnostic.category());
        output.push_str(&diagnostic.category().name().with(category_color).to_string());
        output.push_str(&theme::dim(&format!(" {}{}: ", CODE_PREFIX, diagnostic.code())).to_string());
        output.push_str(&diagnostic.message_text().flatten(new_line));

        if let Some((file, start)) = located {
            output.push_str(new_line);
            let length = diagnostic.length().unwrap_or(0);
            output.push_str(&format_code_span(file, start, length, "", diagnostic.category(), host));
        }

        if !diagnostic.related_information().is_empty() {
            output.push_str(new_line);
            for related in diagnostic.related_information() {
                if let (Some(file), Some(start)) = (&related.file, related.start) {
                    output.push_str(new_line);
                    output.push_str(HALF_INDENT);
                    output.push_str(&format_location(file, start, host));
                    output.push_str(&format_code_span(
                        file,
                        start,
                        related.length.unwrap_or(0),
                        INDENT,
                        DiagnosticCategory::Message,
                        host,
                    ));
                }
                output.push_str(new_line);
                output.push_str(INDENT);
                output.push_str(&related.message_text.flatten(new_line));
            }
        }
        output.push_str(new_line);
    }
    output
}

fn format_location(file: &SourceFile, start: usize, host: &FormatHost) -> String {
    let (line, character) = file.line_and_character(start);
    format!(
        "{}:{}:{}",
        host.relative_file_name(file.file_name()).with(colors::FILE),
        (line + 1).to_string().with(colors::POSITION),
        (character + 1).to_string().with(colors::POSITION)
    )
}

/// Excerpt of the lines covered by `start..start + length`.
///
/// Spans over more than four lines keep their first two and last two lines
/// and elide the middle with `...`.
fn format_code_span(
    file: &SourceFile,
    start: usize,
    length: usize,
    indent: &str,
    category: DiagnosticCategory,
    host: &FormatHost,
) -> String {
    let new_line = host.new_line;
    let (first_line, first_char) = file.line_and_character(start);
    let (last_line, last_char) = file.line_and_character(start + length);
    let elide = last_line - first_line >= 4;

    let mut gutter_width = (last_line + 1).to_string().len();
    if elide {
        gutter_width = gutter_width.max(ELLIPSIS.len());
    }
    let squiggle_color = match category {
        DiagnosticCategory::Message => colors::FILE,
        other => theme::category_color(other),
    };

    let mut context = String::new();
    let mut line = first_line;
    while line <= last_line {
        context.push_str(new_line);
        if elide && first_line + 1 < line && line < last_line - 1 {
            context.push_str(indent);
            context.push_str(&theme::gutter(&format!("{:>gutter_width$}", ELLIPSIS)).to_string());
            context.push(' ');
            context.push_str(new_line);
            line = last_line - 1;
        }

        let content = file.line_text(line).trim_end().replacen('\t', " ", 1);
        context.push_str(indent);
        context.push_str(&theme::gutter(&format!("{:>gutter_width$}", line + 1)).to_string());
        context.push(' ');
        context.push_str(&content);
        context.push_str(new_line);
        context.push_str(indent);
        context.push_str(&theme::gutter(&format!("{:>gutter_width$}", "")).to_string());
        context.push(' ');

        let squiggle = if line == first_line {
            let end = if line == last_line { Some(last_char) } else { None };
            let lead = blank_out(chars_between(&content, 0, Some(first_char)));
            let marks = tildes(chars_between(&content, first_char, end));
            format!("{lead}{marks}")
        } else if line == last_line {
            tildes(chars_between(&content, 0, Some(last_char)))
        } else {
            tildes(&content)
        };
        context.push_str(&squiggle.with(squiggle_color).to_string());
        line += 1;
    }
    context
}

/// Substring of `text` between char offsets `from` and `to` (end of text when `None`).
fn chars_between(text: &str, from: usize, to: Option<usize>) -> &str {
    let byte_at = |n: usize| text.char_indices().nth(n).map_or(text.len(), |(i, _)| i);
    let start = byte_at(from);
    let end = to.map_or(text.len(), byte_at).max(start);
    &text[start..end]
}

fn blank_out(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_whitespace() { c.to_string() } else { " ".repeat(c.width().unwrap_or(1)) })
        .collect()
}

fn tildes(text: &str) -> String {
    text.chars().map(|c| "~".repeat(c.width().unwrap_or(1).max(1))).collect()
}

/// Wall-clock time as `h:mm:ss AM`.
///
/// An injected clock is rendered in UTC so output is reproducible; without
/// one the local time is used.
pub fn locale_time_string(now: Option<DateTime<Utc>>) -> String {
    const FORMAT: &str = "%-I:%M:%S %p";
    match now {
        Some(now) => now.format(FORMAT).to_string(),
        None => Local::now().format(FORMAT).to_string(),
    }
}
