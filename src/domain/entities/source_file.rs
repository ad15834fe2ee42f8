//! Source File Entity
//!
//! The text of one input file plus what the lightweight scanner found in it:
//! outgoing references (imports and triple-slash directives) and syntax
//! errors. Positions are byte offsets into `text`.

use std::cell::OnceCell;

use crate::domain::services::scanner::{self, ScanResult, SyntaxError};

/// Half-open byte range `pos..end` in a file's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextRange {
    pub pos: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(pos: usize, end: usize) -> Self {
        Self { pos, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How one file refers to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// `import ... from "x"`, `import "x"`, `export ... from "x"`
    Import,
    /// `/// <reference path="x" />`
    ReferenceFile,
    /// `/// <reference types="x" />`
    TypeReferenceDirective,
    /// `/// <reference lib="x" />`
    LibReferenceDirective,
}

/// An outgoing reference found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
    pub kind: ReferenceKind,
    /// Location of the reference text (string literal for imports, attribute value for directives)
    pub range: TextRange,
    /// Referenced specifier without quotes
    pub specifier: String,
}

/// A source file in the compiled set.
#[derive(Debug)]
pub struct SourceFile {
    file_name: String,
    path: String,
    text: String,
    version: Option<String>,
    redirect_target: Option<String>,
    scan: ScanResult,
    line_starts: OnceCell<Vec<usize>>,
}

impl SourceFile {
    /// Create a source file and scan its text.
    ///
    /// `file_name` is the display name; `path` is the canonical identity used
    /// as the provenance key.
    pub fn new(file_name: impl Into<String>, path: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let scan = scanner::scan(&text);
        Self {
            file_name: file_name.into(),
            path: path.into(),
            text,
            version: None,
            redirect_target: None,
            scan,
            line_starts: OnceCell::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Mark this file as redirected (symlink or package redirect) to `target`.
    pub fn with_redirect_target(mut self, target: impl Into<String>) -> Self {
        self.redirect_target = Some(target.into());
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn redirect_target(&self) -> Option<&str> {
        self.redirect_target.as_deref()
    }

    pub fn is_declaration_file(&self) -> bool {
        self.file_name.ends_with(".d.ts")
    }

    pub fn references(&self) -> &[FileReference] {
        &self.scan.references
    }

    /// The `index`-th reference of `kind`, counting only references of that kind.
    pub fn reference(&self, kind: ReferenceKind, index: usize) -> Option<&FileReference> {
        self.scan.references.iter().filter(|r| r.kind == kind).nth(index)
    }

    pub fn syntax_errors(&self) -> &[SyntaxError] {
        &self.scan.errors
    }

    /// Text covered by `range`, clamped to the file and to char boundaries.
    pub fn slice(&self, range: TextRange) -> &str {
        let end = range.end.min(self.text.len());
        let pos = range.pos.min(end);
        self.text.get(pos..end).unwrap_or("")
    }

    /// Zero-based (line, character) of a byte offset.
    pub fn line_and_character(&self, pos: usize) -> (usize, usize) {
        let starts = self.line_starts();
        let pos = pos.min(self.text.len());
        let line = match starts.binary_search(&pos) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let start = starts[line];
        let character = self.text.get(start..pos).map_or(pos - start, |s| s.chars().count());
        (line, character)
    }

    /// Byte offsets at which each line starts.
    pub fn line_starts(&self) -> &[usize] {
        self.line_starts.get_or_init(|| {
            let mut starts = vec![0];
            let bytes = self.text.as_bytes();
            let mut i = 0;
            while i < bytes.len() {
                match bytes[i] {
                    b'\r' => {
                        if bytes.get(i + 1) == Some(&b'\n') {
                            i += 1;
                        }
                        starts.push(i + 1);
                    }
                    b'\n' => starts.push(i + 1),
                    _ => {}
                }
                i += 1;
            }
            starts
        })
    }

    /// Text of a zero-based line without its terminator.
    pub fn line_text(&self, line: usize) -> &str {
        let starts = self.line_starts();
        let Some(&start) = starts.get(line) else {
            return "";
        };
        let end = starts.get(line + 1).copied().unwrap_or(self.text.len());
        self.text[start..end].trim_end_matches(&['\r', '\n'][..])
    }

    pub fn line_count(&self) -> usize {
        self.line_starts().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_and_character_tracks_newlines() {
        let file = SourceFile::new("a.ts", "a.ts", "ab\ncd\r\nef");
        assert_eq!(file.line_and_character(0), (0, 0));
        assert_eq!(file.line_and_character(4), (1, 1));
        assert_eq!(file.line_and_character(7), (2, 0));
        assert_eq!(file.line_count(), 3);
    }

    #[test]
    fn line_text_strips_terminators() {
        let file = SourceFile::new("a.ts", "a.ts", "first\r\nsecond\n");
        assert_eq!(file.line_text(0), "first");
        assert_eq!(file.line_text(1), "second");
        assert_eq!(file.line_text(2), "");
        assert_eq!(file.line_text(9), "");
    }

    #[test]
    fn character_counts_chars_not_bytes() {
        let file = SourceFile::new("a.ts", "a.ts", "é = 1");
        assert_eq!(file.line_and_character(3), (0, 2));
    }

    #[test]
    fn reference_indexes_within_kind() {
        let file = SourceFile::new(
            "a.ts",
            "a.ts",
            "/// <reference path=\"b.ts\" />\nimport x from \"./x\";\nimport \"./y\";\n",
        );
        let second_import = file.reference(ReferenceKind::Import, 1).unwrap();
        assert_eq!(second_import.specifier, "./y");
        assert_eq!(file.slice(second_import.range), "\"./y\"");
        let reference = file.reference(ReferenceKind::ReferenceFile, 0).unwrap();
        assert_eq!(file.slice(reference.range), "b.ts");
    }

    #[test]
    fn declaration_files_are_detected_by_name() {
        assert!(SourceFile::new("lib.d.ts", "lib.d.ts", "").is_declaration_file());
        assert!(!SourceFile::new("a.ts", "a.ts", "").is_declaration_file());
    }
}
