//! Presentation Layer
//!
//! Turns diagnostics into text. Reporters in `application` decide when to
//! print; this layer only decides how it looks.
//!
//! - `format` - Plain and pretty diagnostic rendering, locale time
//! - `theme` - Colors used by pretty rendering

pub mod format;
pub mod theme;

pub use format::{
    format_diagnostic, format_diagnostics_with_color_and_context, locale_time_string, FormatHost,
};
