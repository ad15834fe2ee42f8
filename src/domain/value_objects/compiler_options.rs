//! Compiler options
//!
//! The `[compiler]` table of `kiln.toml`. Every flag defaults to off so an
//! empty table means a plain build into the source directories.

use serde::{Deserialize, Serialize};

use super::NewLineKind;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Colored, context-rendered output. `None` means decide from the terminal.
    pub pretty: Option<bool>,
    pub preserve_watch_output: bool,
    pub diagnostics: bool,
    pub extended_diagnostics: bool,

    pub list_files: bool,
    pub list_files_only: bool,
    pub explain_files: bool,
    pub list_emitted_files: bool,

    pub new_line: Option<NewLineKind>,
    pub out_dir: Option<String>,
    pub root_dir: Option<String>,

    pub no_emit: bool,
    pub no_emit_on_error: bool,
    pub declaration: bool,
    pub emit_declaration_only: bool,
    pub emit_bom: bool,
    pub charset: Option<String>,

    /// Automatic type directives; `None` includes every package under the type roots
    pub types: Option<Vec<String>>,
    pub type_roots: Option<Vec<String>>,
    pub lib: Vec<String>,
}

impl CompilerOptions {
    pub fn is_pretty(&self) -> bool {
        self.pretty.unwrap_or(false)
    }

    /// Whether watch status lines must never clear the screen.
    pub fn keeps_watch_output(&self) -> bool {
        self.preserve_watch_output || self.extended_diagnostics || self.diagnostics
    }

    /// Layer `overrides` on top of these options.
    ///
    /// Flags set in `overrides` win, `Some` values replace, non-empty lists
    /// replace. Nothing in `overrides` can switch a flag back off.
    pub fn extend(&mut self, overrides: &CompilerOptions) {
        macro_rules! flags {
            ($($field:ident),*) => { $( self.$field |= overrides.$field; )* };
        }
        macro_rules! values {
            ($($field:ident),*) => {
                $( if overrides.$field.is_some() { self.$field = overrides.$field.clone(); } )*
            };
        }
        flags!(
            preserve_watch_output,
            diagnostics,
            extended_diagnostics,
            list_files,
            list_files_only,
            explain_files,
            list_emitted_files,
            no_emit,
            no_emit_on_error,
            declaration,
            emit_declaration_only,
            emit_bom
        );
        values!(pretty, new_line, out_dir, root_dir, charset, types, type_roots);
        if !overrides.lib.is_empty() {
            self.lib = overrides.lib.clone();
        }
    }
}
