//! Lightweight source scanner
//!
//! Finds the outgoing references of a file (module specifiers and
//! triple-slash reference directives) and the syntax errors a single pass over
//! the text can detect: unterminated literals and comments, unbalanced
//! brackets. It deliberately does not build a syntax tree.

use std::rc::Rc;

use crate::domain::entities::{Diagnostic, FileReference, ReferenceKind, SourceFile, TextRange};
use crate::domain::value_objects::messages;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    UnterminatedString,
    UnterminatedTemplate,
    UnterminatedComment,
    /// A closing token was required here
    Expected(char),
    /// A closing token appeared without an opener
    Unexpected(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub pos: usize,
    pub length: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub references: Vec<FileReference>,
    pub errors: Vec<SyntaxError>,
}

/// Scan `text` for references and syntax errors.
pub fn scan(text: &str) -> ScanResult {
    Scanner::new(text).run()
}

/// Convert the syntax errors recorded on `file` into diagnostics.
pub fn syntactic_diagnostics(file: &Rc<SourceFile>) -> Vec<Diagnostic> {
    file.syntax_errors()
        .iter()
        .map(|error| {
            let (message, arg) = match error.kind {
                SyntaxErrorKind::UnterminatedString => (&messages::UNTERMINATED_STRING_LITERAL, None),
                SyntaxErrorKind::UnterminatedTemplate => {
                    (&messages::UNTERMINATED_TEMPLATE_LITERAL, None)
                }
                SyntaxErrorKind::UnterminatedComment => (&messages::TOKEN_EXPECTED, Some("*/".to_string())),
                SyntaxErrorKind::Expected(c) => (&messages::TOKEN_EXPECTED, Some(c.to_string())),
                SyntaxErrorKind::Unexpected(c) => (&messages::UNEXPECTED_TOKEN, Some(c.to_string())),
            };
            let args: Vec<&str> = arg.as_deref().into_iter().collect();
            Diagnostic::located(file, error.pos, error.length, message, &args)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    None,
    Import,
    Export,
    From,
    Require,
    Ident,
    OpenParen,
    Other,
}

struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    brackets: Vec<(u8, usize)>,
    prev: Token,
    prev2: Token,
    in_module_clause: bool,
    result: ScanResult,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            brackets: Vec::new(),
            prev: Token::None,
            prev2: Token::None,
            in_module_clause: false,
            result: ScanResult::default(),
        }
    }

    fn run(mut self) -> ScanResult {
        while self.pos < self.bytes.len() {
            let c = self.bytes[self.pos];
            match c {
                b' ' | b'\t' | b'\r' | b'\n' => self.pos += 1,
                b'/' if self.peek(1) == Some(b'/') => self.line_comment(),
                b'/' if self.peek(1) == Some(b'*') => self.block_comment(),
                b'\'' | b'"' => self.string(c),
                b'`' => self.template(),
                b'(' | b'[' | b'{' => {
                    self.brackets.push((c, self.pos));
                    self.pos += 1;
                    self.push(if c == b'(' { Token::OpenParen } else { Token::Other });
                }
                b')' | b']' | b'}' => self.close(c),
                b';' => {
                    self.in_module_clause = false;
                    self.pos += 1;
                    self.push(Token::Other);
                }
                b'0'..=b'9' => {
                    while self.pos < self.bytes.len()
                        && (self.bytes[self.pos].is_ascii_alphanumeric() || self.bytes[self.pos] == b'.')
                    {
                        self.pos += 1;
                    }
                    self.push(Token::Other);
                }
                c if is_ident_byte(c) => self.identifier(),
                _ => {
                    self.pos += 1;
                    self.push(Token::Other);
                }
            }
        }

        if let Some(&(open, _)) = self.brackets.last() {
            self.result.errors.push(SyntaxError {
                kind: SyntaxErrorKind::Expected(closer(open) as char),
                pos: self.bytes.len(),
                length: 0,
            });
        }
        self.result
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn push(&mut self, token: Token) {
        self.prev2 = self.prev;
        self.prev = token;
    }

    fn identifier(&mut self) {
        let start = self.pos;
        while self.pos < self.bytes.len() && (is_ident_byte(self.bytes[self.pos]) || self.bytes[self.pos].is_ascii_digit()) {
            self.pos += 1;
        }
        let token = match &self.text[start..self.pos] {
            "import" => Token::Import,
            "export" => Token::Export,
            "from" => Token::From,
            "require" => Token::Require,
            _ => Token::Ident,
        };
        if matches!(token, Token::Import | Token::Export) {
            self.in_module_clause = true;
        }
        self.push(token);
    }

    fn close(&mut self, c: u8) {
        let pos = self.pos;
        self.pos += 1;
        self.push(Token::Other);
        match self.brackets.last() {
            Some(&(open, _)) if closer(open) == c => {
                self.brackets.pop();
            }
            Some(&(open, _)) => {
                self.result.errors.push(SyntaxError {
                    kind: SyntaxErrorKind::Expected(closer(open) as char),
                    pos,
                    length: 1,
                });
                self.brackets.pop();
            }
            None => self.result.errors.push(SyntaxError {
                kind: SyntaxErrorKind::Unexpected(c as char),
                pos,
                length: 1,
            }),
        }
    }

    fn line_comment(&mut self) {
        let text = self.text;
        let start = self.pos;
        let end = text[start..]
            .find(&['\n', '\r'][..])
            .map_or(self.bytes.len(), |i| start + i);
        let comment = &text[start..end];
        if let Some(body) = comment.strip_prefix("///") {
            self.directive(start + 3, body);
        }
        self.pos = end;
    }

    fn directive(&mut self, body_start: usize, body: &str) {
        let trimmed = body.trim_start();
        if !trimmed.starts_with("<reference") {
            return;
        }
        const ATTRIBUTES: [(&str, ReferenceKind); 3] = [
            ("path", ReferenceKind::ReferenceFile),
            ("types", ReferenceKind::TypeReferenceDirective),
            ("lib", ReferenceKind::LibReferenceDirective),
        ];
        for (name, kind) in ATTRIBUTES {
            if let Some(range) = attribute_value(body, name) {
                let range = TextRange::new(body_start + range.pos, body_start + range.end);
                self.result.references.push(FileReference {
                    kind,
                    range,
                    specifier: self.text[range.pos..range.end].to_string(),
                });
                return;
            }
        }
    }

    fn block_comment(&mut self) {
        let start = self.pos;
        match self.text[start + 2..].find("*/") {
            Some(i) => self.pos = start + 2 + i + 2,
            None => {
                self.result.errors.push(SyntaxError {
                    kind: SyntaxErrorKind::UnterminatedComment,
                    pos: self.bytes.len(),
                    length: 0,
                });
                self.pos = self.bytes.len();
            }
        }
    }

    fn string(&mut self, quote: u8) {
        let start = self.pos;
        let mut i = start + 1;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'\\' => i += 2,
                b'\n' | b'\r' => break,
                c if c == quote => {
                    self.pos = i + 1;
                    self.string_literal(TextRange::new(start, i + 1));
                    return;
                }
                _ => i += 1,
            }
        }
        let end = i.min(self.bytes.len());
        self.result.errors.push(SyntaxError {
            kind: SyntaxErrorKind::UnterminatedString,
            pos: start,
            length: end - start,
        });
        self.pos = end;
        self.push(Token::Other);
    }

    fn string_literal(&mut self, range: TextRange) {
        let is_module_specifier = match (self.prev2, self.prev) {
            (_, Token::From) => self.in_module_clause,
            (_, Token::Import) => true,
            (Token::Require | Token::Import, Token::OpenParen) => true,
            _ => false,
        };
        if is_module_specifier {
            self.result.references.push(FileReference {
                kind: ReferenceKind::Import,
                range,
                specifier: self.text[range.pos + 1..range.end - 1].to_string(),
            });
        }
        self.push(Token::Other);
    }

    fn template(&mut self) {
        let start = self.pos;
        let mut i = start + 1;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'\\' => i += 2,
                b'`' => {
                    self.pos = i + 1;
                    self.push(Token::Other);
                    return;
                }
                _ => i += 1,
            }
        }
        self.result.errors.push(SyntaxError {
            kind: SyntaxErrorKind::UnterminatedTemplate,
            pos: start,
            length: self.bytes.len() - start,
        });
        self.pos = self.bytes.len();
    }
}

fn is_ident_byte(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'$' || c >= 0x80
}

fn closer(open: u8) -> u8 {
    match open {
        b'(' => b')',
        b'[' => b']',
        _ => b'}',
    }
}

/// Range of the quoted value of `name="..."` inside a directive body.
fn attribute_value(body: &str, name: &str) -> Option<TextRange> {
    let mut search = 0;
    while let Some(found) = body[search..].find(name) {
        let name_start = search + found;
        search = name_start + name.len();
        let preceded_by_space = body[..name_start].ends_with(char::is_whitespace);
        if !preceded_by_space {
            continue;
        }
        let rest = body[search..].trim_start();
        let Some(after_eq) = rest.strip_prefix('=') else {
            continue;
        };
        let value = after_eq.trim_start();
        let quote = value.chars().next().filter(|q| *q == '"' || *q == '\'')?;
        let value_start = body.len() - value.len() + 1;
        let value_len = body[value_start..].find(quote)?;
        return Some(TextRange::new(value_start, value_start + value_len));
    }
    None
}
