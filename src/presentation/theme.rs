//! Design tokens for pretty diagnostics.

use crossterm::style::{Color, StyledContent, Stylize};

use crate::domain::entities::DiagnosticCategory;

pub mod colors {
    use super::Color;

    pub const ERROR: Color = Color::Red;
    pub const WARNING: Color = Color::Yellow;
    pub const MESSAGE: Color = Color::Blue;
    /// File names in locations and related-information spans
    pub const FILE: Color = Color::Cyan;
    /// Line and column numbers
    pub const POSITION: Color = Color::Yellow;
    pub const DIM: Color = Color::Grey;
}

pub fn category_color(category: DiagnosticCategory) -> Color {
    match category {
        DiagnosticCategory::Error => colors::ERROR,
        DiagnosticCategory::Warning => colors::WARNING,
        DiagnosticCategory::Suggestion => colors::DIM,
        DiagnosticCategory::Message => colors::MESSAGE,
    }
}

pub fn dim(text: &str) -> StyledContent<&str> {
    text.with(colors::DIM)
}

/// Reversed gutter cell of a code excerpt.
pub fn gutter(text: &str) -> StyledContent<&str> {
    text.reverse()
}
