//! Line terminator style

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewLineKind {
    #[default]
    Lf,
    Crlf,
}

impl NewLineKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NewLineKind::Lf => "\n",
            NewLineKind::Crlf => "\r\n",
        }
    }

    /// Line terminator of the platform this binary was built for.
    pub fn platform() -> Self {
        if cfg!(windows) {
            NewLineKind::Crlf
        } else {
            NewLineKind::Lf
        }
    }

    /// Parse `lf` or `crlf`, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lf" => Some(NewLineKind::Lf),
            "crlf" => Some(NewLineKind::Crlf),
            _ => None,
        }
    }
}
