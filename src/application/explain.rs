//! File inclusion explainer
//!
//! Lists the compiled files grouped by why they are included, with the
//! evidence for each reason.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::domain::entities::{FileIncludeKind, FileIncludeReason, SourceFile};
use crate::domain::ports::Program;
use crate::domain::value_objects::path::convert_to_relative_path;

/// Explain or list the program's files, depending on its options.
pub fn list_files(program: &dyn Program, write: &dyn Fn(&str)) {
    let options = program.compiler_options();
    if options.explain_files {
        explain_files(program, write);
    } else if options.list_files || options.list_files_only {
        for file in program.source_files() {
            write(file.file_name());
        }
    }
}

/// Write every file under the header of its primary inclusion kind.
pub fn explain_files(program: &dyn Program, write: &dyn Fn(&str)) {
    let reasons = program.file_include_reasons();
    let mut groups: BTreeMap<usize, Vec<&Rc<SourceFile>>> = BTreeMap::new();
    for file in program.source_files() {
        let kind = FileIncludeKind::primary(reasons.get(file.path()));
        groups.entry(kind.priority()).or_default().push(file);
    }

    for kind in FileIncludeKind::PRIORITY {
        let Some(files) = groups.get(&kind.priority()) else {
            continue;
        };
        write(&format!("{}s::", kind.name()));
        for file in files {
            let mut line = to_file_name(program, file.file_name());
            if let Some(target) = file.redirect_target() {
                line.push_str(" -> ");
                line.push_str(&to_file_name(program, target));
            }
            write(&line);

            for reason in reasons.get(file.path()) {
                let reason_kind = reason.kind();
                if reason_kind != kind
                    || reason_kind.is_referenced_file()
                    || (reason_kind == FileIncludeKind::AutomaticTypeDirectiveFile
                        && reason.package_id().is_some())
                {
                    write(&explain_file_include_reason(program, reason));
                }
            }
        }
        write("");
    }
}

fn to_file_name(program: &dyn Program, file_name: &str) -> String {
    convert_to_relative_path(file_name, &program.current_directory(), |f| {
        program.canonical_file_name(f)
    })
}

fn explain_file_include_reason(program: &dyn Program, reason: &FileIncludeReason) -> String {
    let kind = reason.kind();
    match reason {
        FileIncludeReason::ReferencedFile {
            file,
            index,
            range,
            package_id,
            ..
        } => {
            let referencing = program.source_file_by_path(file);
            let text = referencing.as_ref().map_or("", |f| f.slice(*range));
            let name = referencing.as_ref().map_or(file.as_str(), |f| f.file_name());
            let package = package_id
                .as_ref()
                .map(|id| format!(" {id}: "))
                .unwrap_or_default();
            format!(
                "  {kind}:: {package}{text} from {} {index}",
                to_file_name(program, name)
            )
        }
        FileIncludeReason::ProjectReferenceFile { config, .. } => {
            format!("  {kind}:: from {}", to_file_name(program, config))
        }
        FileIncludeReason::AutomaticTypeDirectiveFile {
            package_id: Some(id),
            ..
        } => format!("  {kind}:: Package:: {id}"),
        _ => format!("  {kind}"),
    }
}
