//! File inclusion provenance
//!
//! Why each file is part of the compiled set. A file may be included for
//! several reasons; the reasons are kept in the order the build-graph
//! resolver recorded them.

use std::collections::HashMap;
use std::fmt;

use crate::domain::entities::{ReferenceKind, TextRange};

/// Inclusion kind, listed in explanation priority order.
///
/// This is the single priority table for provenance: root files come first and
/// automatic type-directive files last. [`FileIncludeKind::primary`] picks the
/// grouping kind for a file from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileIncludeKind {
    RootFile,
    SourceFromProjectReference,
    OutputFromProjectReference,
    Import,
    ReferenceFile,
    TypeReferenceDirective,
    LibFile,
    LibReferenceDirective,
    AutomaticTypeDirectiveFile,
}

impl FileIncludeKind {
    /// All kinds in priority order.
    pub const PRIORITY: [FileIncludeKind; 9] = [
        FileIncludeKind::RootFile,
        FileIncludeKind::SourceFromProjectReference,
        FileIncludeKind::OutputFromProjectReference,
        FileIncludeKind::Import,
        FileIncludeKind::ReferenceFile,
        FileIncludeKind::TypeReferenceDirective,
        FileIncludeKind::LibFile,
        FileIncludeKind::LibReferenceDirective,
        FileIncludeKind::AutomaticTypeDirectiveFile,
    ];

    /// Position in [`Self::PRIORITY`]; lower wins.
    pub fn priority(self) -> usize {
        Self::PRIORITY
            .iter()
            .position(|k| *k == self)
            .unwrap_or(Self::PRIORITY.len())
    }

    /// The grouping kind of a file: the highest-priority kind among its reasons.
    ///
    /// A file without reasons groups with automatic type-directive files.
    pub fn primary<'a>(reasons: impl IntoIterator<Item = &'a FileIncludeReason>) -> FileIncludeKind {
        reasons
            .into_iter()
            .map(FileIncludeReason::kind)
            .min_by_key(|k| k.priority())
            .unwrap_or(FileIncludeKind::AutomaticTypeDirectiveFile)
    }

    /// Kinds whose reason points at a reference inside another source file.
    pub fn is_referenced_file(self) -> bool {
        matches!(
            self,
            FileIncludeKind::Import
                | FileIncludeKind::ReferenceFile
                | FileIncludeKind::TypeReferenceDirective
                | FileIncludeKind::LibReferenceDirective
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            FileIncludeKind::RootFile => "RootFile",
            FileIncludeKind::SourceFromProjectReference => "SourceFromProjectReference",
            FileIncludeKind::OutputFromProjectReference => "OutputFromProjectReference",
            FileIncludeKind::Import => "Import",
            FileIncludeKind::ReferenceFile => "ReferenceFile",
            FileIncludeKind::TypeReferenceDirective => "TypeReferenceDirective",
            FileIncludeKind::LibFile => "LibFile",
            FileIncludeKind::LibReferenceDirective => "LibReferenceDirective",
            FileIncludeKind::AutomaticTypeDirectiveFile => "AutomaticTypeDirectiveFile",
        }
    }
}

impl From<ReferenceKind> for FileIncludeKind {
    fn from(kind: ReferenceKind) -> Self {
        match kind {
            ReferenceKind::Import => FileIncludeKind::Import,
            ReferenceKind::ReferenceFile => FileIncludeKind::ReferenceFile,
            ReferenceKind::TypeReferenceDirective => FileIncludeKind::TypeReferenceDirective,
            ReferenceKind::LibReferenceDirective => FileIncludeKind::LibReferenceDirective,
        }
    }
}

impl fmt::Display for FileIncludeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of the package a file was resolved from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageId {
    pub name: String,
    pub sub_module_name: Option<String>,
    pub version: String,
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sub_module_name {
            Some(sub) => write!(f, "{}/{}@{}", self.name, sub, self.version),
            None => write!(f, "{}@{}", self.name, self.version),
        }
    }
}

/// Whether a project-reference file is the reference's source or its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectReferenceKind {
    Source,
    Output,
}

/// One reason a file is part of the compiled set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileIncludeReason {
    /// Listed in (or matched by) the root file set
    RootFile { index: usize },
    /// Pulled in from a referenced project
    ProjectReferenceFile {
        kind: ProjectReferenceKind,
        /// Path of the referenced project's config file
        config: String,
        index: usize,
    },
    /// Referenced from another source file
    ReferencedFile {
        kind: ReferenceKind,
        /// Path of the referencing file
        file: String,
        /// Ordinal of the reference among references of the same kind in `file`
        index: usize,
        /// Location of the reference text in `file`
        range: TextRange,
        package_id: Option<PackageId>,
    },
    /// A default library file
    LibFile { index: Option<usize> },
    /// Included by the automatic type directive `type_reference`
    AutomaticTypeDirectiveFile {
        type_reference: String,
        package_id: Option<PackageId>,
    },
}

impl FileIncludeReason {
    pub fn kind(&self) -> FileIncludeKind {
        match self {
            FileIncludeReason::RootFile { .. } => FileIncludeKind::RootFile,
            FileIncludeReason::ProjectReferenceFile {
                kind: ProjectReferenceKind::Source,
                ..
            } => FileIncludeKind::SourceFromProjectReference,
            FileIncludeReason::ProjectReferenceFile {
                kind: ProjectReferenceKind::Output,
                ..
            } => FileIncludeKind::OutputFromProjectReference,
            FileIncludeReason::ReferencedFile { kind, .. } => (*kind).into(),
            FileIncludeReason::LibFile { .. } => FileIncludeKind::LibFile,
            FileIncludeReason::AutomaticTypeDirectiveFile { .. } => {
                FileIncludeKind::AutomaticTypeDirectiveFile
            }
        }
    }

    pub fn package_id(&self) -> Option<&PackageId> {
        match self {
            FileIncludeReason::ReferencedFile { package_id, .. }
            | FileIncludeReason::AutomaticTypeDirectiveFile { package_id, .. } => {
                package_id.as_ref()
            }
            _ => None,
        }
    }
}

/// Provenance multimap: file path to its ordered inclusion reasons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileIncludeReasons {
    reasons: HashMap<String, Vec<FileIncludeReason>>,
}

impl FileIncludeReasons {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reason for `path`; identical reasons are kept once.
    pub fn add(&mut self, path: impl Into<String>, reason: FileIncludeReason) {
        let entry = self.reasons.entry(path.into()).or_default();
        if !entry.contains(&reason) {
            entry.push(reason);
        }
    }

    pub fn get(&self, path: &str) -> &[FileIncludeReason] {
        self.reasons.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, path: &str) -> bool {
        self.reasons.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.reasons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }
}
