//! Diagnostic Entity
//!
//! A structured compiler message with severity, code and an optional location.
//! Diagnostics are immutable once produced. Two diagnostics are the same
//! diagnostic when file, start, length, code, message text, related
//! information and category all compare equal; that identity drives
//! [`sort_and_deduplicate`].

use std::cmp::Ordering;
use std::rc::Rc;

use crate::domain::entities::SourceFile;
use crate::domain::value_objects::DiagnosticMessage;

/// Severity of a diagnostic.
///
/// Declaration order matches the compiler's numeric category values, so the
/// derived ordering is stable for scripting consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

impl DiagnosticCategory {
    /// Lowercase display name (`error`, `warning`, ...)
    pub fn name(self) -> &'static str {
        match self {
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Suggestion => "suggestion",
            DiagnosticCategory::Message => "message",
        }
    }
}

/// One link of a nested message chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageChain {
    pub text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
    pub next: Vec<MessageChain>,
}

impl MessageChain {
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            text: message.format(args),
            category: message.category,
            code: message.code,
            next: Vec::new(),
        }
    }

    pub fn with_next(mut self, next: MessageChain) -> Self {
        self.next.push(next);
        self
    }
}

/// Message text: either a plain string or a chain of nested messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageText {
    Text(String),
    Chain(MessageChain),
}

impl MessageText {
    /// Flatten into a single string.
    ///
    /// Each nested message starts on a new line indented two spaces per depth.
    pub fn flatten(&self, new_line: &str) -> String {
        match self {
            MessageText::Text(text) => text.clone(),
            MessageText::Chain(chain) => {
                let mut out = String::new();
                flatten_chain(chain, new_line, 0, &mut out);
                out
            }
        }
    }
}

fn flatten_chain(chain: &MessageChain, new_line: &str, indent: usize, out: &mut String) {
    if indent > 0 {
        out.push_str(new_line);
        for _ in 0..indent {
            out.push_str("  ");
        }
    }
    out.push_str(&chain.text);
    for next in &chain.next {
        flatten_chain(next, new_line, indent + 1, out);
    }
}

impl From<String> for MessageText {
    fn from(text: String) -> Self {
        MessageText::Text(text)
    }
}

impl From<&str> for MessageText {
    fn from(text: &str) -> Self {
        MessageText::Text(text.to_string())
    }
}

impl From<MessageChain> for MessageText {
    fn from(chain: MessageChain) -> Self {
        MessageText::Chain(chain)
    }
}

/// Secondary location attached to a diagnostic.
#[derive(Debug, Clone)]
pub struct RelatedInformation {
    pub file: Option<Rc<SourceFile>>,
    pub start: Option<usize>,
    pub length: Option<usize>,
    pub category: DiagnosticCategory,
    pub code: u32,
    pub message_text: MessageText,
}

impl RelatedInformation {
    fn location_key(&self) -> (Option<&str>, Option<usize>, Option<usize>) {
        (
            self.file.as_deref().map(SourceFile::file_name),
            self.start,
            self.length,
        )
    }
}

/// A compiler diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    category: DiagnosticCategory,
    code: u32,
    message_text: MessageText,
    file: Option<Rc<SourceFile>>,
    start: Option<usize>,
    length: Option<usize>,
    related_information: Vec<RelatedInformation>,
}

impl Diagnostic {
    /// Create a diagnostic without a location.
    pub fn new(category: DiagnosticCategory, code: u32, message_text: impl Into<MessageText>) -> Self {
        Self {
            category,
            code,
            message_text: message_text.into(),
            file: None,
            start: None,
            length: None,
            related_information: Vec::new(),
        }
    }

    /// Create a global diagnostic from a catalog message.
    pub fn from_message(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self::new(message.category, message.code, message.format(args))
    }

    /// Create a diagnostic located in `file` at `start..start + length`.
    pub fn located(
        file: &Rc<SourceFile>,
        start: usize,
        length: usize,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        Self::from_message(message, args).with_location(file, start, length)
    }

    /// Create a diagnostic from a message chain; category and code come from the head.
    pub fn from_chain(chain: MessageChain) -> Self {
        Self::new(chain.category, chain.code, chain)
    }

    pub fn with_location(mut self, file: &Rc<SourceFile>, start: usize, length: usize) -> Self {
        self.file = Some(Rc::clone(file));
        self.start = Some(start);
        self.length = Some(length);
        self
    }

    pub fn with_related(mut self, related: RelatedInformation) -> Self {
        self.related_information.push(related);
        self
    }

    pub fn category(&self) -> DiagnosticCategory {
        self.category
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn message_text(&self) -> &MessageText {
        &self.message_text
    }

    pub fn file(&self) -> Option<&Rc<SourceFile>> {
        self.file.as_ref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file.as_deref().map(SourceFile::file_name)
    }

    pub fn start(&self) -> Option<usize> {
        self.start
    }

    pub fn length(&self) -> Option<usize> {
        self.length
    }

    pub fn related_information(&self) -> &[RelatedInformation] {
        &self.related_information
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl PartialEq for Diagnostic {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Diagnostic {}

impl PartialOrd for Diagnostic {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Diagnostic {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_skip_related(self, other)
            .then_with(|| compare_related(&self.related_information, &other.related_information))
            .then_with(|| self.category.cmp(&other.category))
    }
}

fn compare_skip_related(a: &Diagnostic, b: &Diagnostic) -> Ordering {
    // `None` sorts before any file name / position.
    a.file_name()
        .cmp(&b.file_name())
        .then_with(|| a.start.cmp(&b.start))
        .then_with(|| a.length.cmp(&b.length))
        .then_with(|| a.code.cmp(&b.code))
        .then_with(|| compare_message_text(&a.message_text, &b.message_text))
}

fn compare_related(a: &[RelatedInformation], b: &[RelatedInformation]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| {
        a.iter()
            .zip(b)
            .map(|(x, y)| {
                x.location_key()
                    .cmp(&y.location_key())
                    .then_with(|| x.code.cmp(&y.code))
                    .then_with(|| compare_message_text(&x.message_text, &y.message_text))
                    .then_with(|| x.category.cmp(&y.category))
            })
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    })
}

fn compare_message_text(a: &MessageText, b: &MessageText) -> Ordering {
    match (a, b) {
        (MessageText::Text(x), MessageText::Text(y)) => x.cmp(y),
        (MessageText::Text(_), MessageText::Chain(_)) => Ordering::Less,
        (MessageText::Chain(_), MessageText::Text(_)) => Ordering::Greater,
        (MessageText::Chain(x), MessageText::Chain(y)) => compare_chain(x, y),
    }
}

fn compare_chain(a: &MessageChain, b: &MessageChain) -> Ordering {
    a.text
        .cmp(&b.text)
        .then_with(|| {
            a.next
                .iter()
                .zip(&b.next)
                .map(|(x, y)| compare_chain(x, y))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.next.len().cmp(&b.next.len()))
}

/// Sort diagnostics into display order and drop duplicates.
pub fn sort_and_deduplicate(mut diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    diagnostics.sort();
    diagnostics.dedup();
    diagnostics
}

/// Number of diagnostics whose category is [`DiagnosticCategory::Error`].
pub fn error_count_for_summary(diagnostics: &[Diagnostic]) -> usize {
    diagnostics.iter().filter(|d| d.is_error()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::messages;

    fn file(name: &str, text: &str) -> Rc<SourceFile> {
        Rc::new(SourceFile::new(name, name, text))
    }

    #[test]
    fn flatten_plain_text_is_unchanged() {
        let text = MessageText::from("plain");
        assert_eq!(text.flatten("\n"), "plain");
    }

    #[test]
    fn flatten_chain_indents_each_level() {
        let chain = MessageChain::new(&messages::CANNOT_FIND_MODULE, &["a"]).with_next(
            MessageChain::new(&messages::FILE_NOT_FOUND, &["b"])
                .with_next(MessageChain::new(&messages::FILE_NOT_FOUND, &["c"])),
        );
        let flat = MessageText::from(chain).flatten("\n");
        assert_eq!(
            flat,
            "Cannot find module 'a'.\n  File 'b' not found.\n    File 'c' not found."
        );
    }

    #[test]
    fn global_diagnostics_sort_before_located_ones() {
        let f = file("/p/a.ts", "let x = 1;");
        let located = Diagnostic::located(&f, 0, 3, &messages::UNTERMINATED_STRING_LITERAL, &[]);
        let global = Diagnostic::from_message(&messages::FILE_NOT_FOUND, &["x"]);
        let sorted = sort_and_deduplicate(vec![located.clone(), global.clone()]);
        assert_eq!(sorted, vec![global, located]);
    }

    #[test]
    fn sort_orders_by_file_then_start() {
        let a = file("/p/a.ts", "aaaaaaaa");
        let b = file("/p/b.ts", "bbbbbbbb");
        let d1 = Diagnostic::located(&b, 0, 1, &messages::UNTERMINATED_STRING_LITERAL, &[]);
        let d2 = Diagnostic::located(&a, 5, 1, &messages::UNTERMINATED_STRING_LITERAL, &[]);
        let d3 = Diagnostic::located(&a, 1, 1, &messages::UNTERMINATED_STRING_LITERAL, &[]);
        let sorted = sort_and_deduplicate(vec![d1.clone(), d2.clone(), d3.clone()]);
        assert_eq!(sorted, vec![d3, d2, d1]);
    }

    #[test]
    fn duplicates_collapse_to_one() {
        let f = file("/p/a.ts", "import x from './x';");
        let d = Diagnostic::located(&f, 14, 5, &messages::CANNOT_FIND_MODULE, &["./x"]);
        let sorted = sort_and_deduplicate(vec![d.clone(), d.clone()]);
        assert_eq!(sorted.len(), 1);
    }

    #[test]
    fn category_participates_in_identity() {
        let warning = Diagnostic::new(DiagnosticCategory::Warning, 1, "same");
        let error = Diagnostic::new(DiagnosticCategory::Error, 1, "same");
        let sorted = sort_and_deduplicate(vec![error, warning]);
        assert_eq!(sorted.len(), 2);
        assert_eq!(sorted[0].category(), DiagnosticCategory::Warning);
    }

    #[test]
    fn related_information_participates_in_identity() {
        let f = file("/p/a.ts", "abc");
        let related = RelatedInformation {
            file: Some(Rc::clone(&f)),
            start: Some(1),
            length: Some(1),
            category: DiagnosticCategory::Message,
            code: 1,
            message_text: "see here".into(),
        };
        let plain = Diagnostic::new(DiagnosticCategory::Error, 1, "m");
        let with_related = plain.clone().with_related(related);
        assert_ne!(plain, with_related);
        assert_eq!(sort_and_deduplicate(vec![with_related, plain]).len(), 2);
    }

    #[test]
    fn text_messages_sort_before_chains() {
        let text = Diagnostic::new(DiagnosticCategory::Error, 2307, "z");
        let chain = Diagnostic::from_chain(MessageChain::new(&messages::CANNOT_FIND_MODULE, &["a"]));
        let sorted = sort_and_deduplicate(vec![chain.clone(), text.clone()]);
        assert_eq!(sorted, vec![text, chain]);
    }

    #[test]
    fn error_count_only_counts_errors() {
        let diagnostics = vec![
            Diagnostic::new(DiagnosticCategory::Error, 1, "a"),
            Diagnostic::new(DiagnosticCategory::Warning, 2, "b"),
            Diagnostic::new(DiagnosticCategory::Error, 3, "c"),
            Diagnostic::new(DiagnosticCategory::Message, 4, "d"),
        ];
        assert_eq!(error_count_for_summary(&diagnostics), 2);
    }
}
