//! Diagnostic reporter
//!
//! Writes one diagnostic at a time to the system output, plain or pretty.

use std::rc::Rc;

use crate::domain::entities::Diagnostic;
use crate::domain::ports::{Output, System};
use crate::domain::value_objects::FileNameCasing;
use crate::presentation::{format_diagnostic, format_diagnostics_with_color_and_context, FormatHost};

/// Sink for diagnostics.
pub trait ReportDiagnostic {
    fn report(&self, diagnostic: &Diagnostic);
}

impl<F: Fn(&Diagnostic)> ReportDiagnostic for F {
    fn report(&self, diagnostic: &Diagnostic) {
        self(diagnostic)
    }
}

/// Reporter bound to a system's output, directory and casing policy.
pub struct DiagnosticReporter {
    output: Rc<dyn Output>,
    host: FormatHost,
    pretty: bool,
}

impl DiagnosticReporter {
    pub fn new(system: &System, pretty: bool) -> Self {
        Self {
            output: Rc::clone(&system.output),
            host: FormatHost::new(
                system.current_directory(),
                system.new_line_str(),
                FileNameCasing::new(system.use_case_sensitive_file_names),
            ),
            pretty,
        }
    }

    pub fn is_pretty(&self) -> bool {
        self.pretty
    }
}

impl ReportDiagnostic for DiagnosticReporter {
    fn report(&self, diagnostic: &Diagnostic) {
        if self.pretty {
            let text = format_diagnostics_with_color_and_context(std::slice::from_ref(diagnostic), &self.host);
            self.output.write(&format!("{}{}", text, self.host.new_line));
        } else {
            self.output.write(&format_diagnostic(diagnostic, &self.host));
        }
    }
}
