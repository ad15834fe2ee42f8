//! Watch status reporter
//!
//! Prints the status lines of a watch session ("Starting compilation...",
//! "Found N errors...") with a timestamp, clearing the screen when a new
//! compilation starts.

use std::rc::Rc;

use crate::domain::entities::Diagnostic;
use crate::domain::ports::{Clock, Output, Screen, System};
use crate::domain::value_objects::{messages, CompilerOptions};
use crate::presentation::{locale_time_string, theme};

/// Sink for watch status changes. Returns whether the screen was cleared.
pub trait ReportWatchStatus {
    fn report(&self, diagnostic: &Diagnostic, new_line: &str, options: &CompilerOptions) -> bool;
}

impl<F: Fn(&Diagnostic, &str, &CompilerOptions) -> bool> ReportWatchStatus for F {
    fn report(&self, diagnostic: &Diagnostic, new_line: &str, options: &CompilerOptions) -> bool {
        self(diagnostic, new_line, options)
    }
}

pub struct WatchStatusReporter {
    output: Rc<dyn Output>,
    screen: Option<Rc<dyn Screen>>,
    clock: Option<Rc<dyn Clock>>,
    system_new_line: &'static str,
    pretty: bool,
    screen_starting_codes: Vec<u32>,
}

impl WatchStatusReporter {
    pub fn new(system: &System, pretty: bool) -> Self {
        Self {
            output: Rc::clone(&system.output),
            screen: system.screen.clone(),
            clock: system.clock.clone(),
            system_new_line: system.new_line_str(),
            pretty,
            screen_starting_codes: messages::DEFAULT_SCREEN_STARTING_CODES.to_vec(),
        }
    }

    /// Replace the message codes that start a new screen of output.
    pub fn with_screen_starting_codes(mut self, codes: impl Into<Vec<u32>>) -> Self {
        self.screen_starting_codes = codes.into();
        self
    }

    fn is_screen_starting(&self, diagnostic: &Diagnostic) -> bool {
        self.screen_starting_codes.contains(&diagnostic.code())
    }

    fn clear_screen_if_not_watching_for_file_changes(
        &self,
        diagnostic: &Diagnostic,
        options: &CompilerOptions,
    ) -> bool {
        match &self.screen {
            Some(screen) if !options.keeps_watch_output() && self.is_screen_starting(diagnostic) => {
                screen.clear_screen();
                true
            }
            _ => false,
        }
    }

    fn time(&self) -> String {
        locale_time_string(self.clock.as_ref().map(|clock| clock.now()))
    }
}

impl ReportWatchStatus for WatchStatusReporter {
    fn report(&self, diagnostic: &Diagnostic, new_line: &str, options: &CompilerOptions) -> bool {
        let cleared = self.clear_screen_if_not_watching_for_file_changes(diagnostic, options);
        let message = diagnostic.message_text().flatten(self.system_new_line);

        let output = if self.pretty {
            format!("[{}] {}{}{}", theme::dim(&self.time()), message, new_line, new_line)
        } else {
            let mut output = String::new();
            if !cleared {
                output.push_str(new_line);
            }
            output.push_str(&format!("{} - {}{}", self.time(), message, new_line));
            if self.is_screen_starting(diagnostic) {
                output.push_str(new_line);
            }
            output
        };
        self.output.write(&output);
        cleared
    }
}
