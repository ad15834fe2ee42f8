use is_terminal::IsTerminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalCapabilities {
    pub is_tty: bool,
    pub supports_color: bool,
    pub is_ci: bool,
}

impl TerminalCapabilities {
    /// Pretty diagnostics need color on an interactive terminal.
    pub fn wants_pretty(&self) -> bool {
        self.supports_color && !self.is_ci
    }
}

pub fn detect_capabilities() -> TerminalCapabilities {
    detect_capabilities_impl(|key| std::env::var(key).ok(), std::io::stdout().is_terminal())
}

/// Default for `pretty` when neither the command line nor the config sets it.
pub fn default_pretty() -> bool {
    detect_capabilities().wants_pretty()
}

fn detect_capabilities_impl(get_env: impl Fn(&str) -> Option<String>, is_tty: bool) -> TerminalCapabilities {
    let term = get_env("TERM").unwrap_or_default();
    let term_is_dumb = term.eq_ignore_ascii_case("dumb");
    let no_color = get_env("NO_COLOR").is_some();

    TerminalCapabilities {
        is_tty,
        supports_color: is_tty && !term_is_dumb && !no_color,
        is_ci: is_ci_env(&get_env),
    }
}

fn is_ci_env(get_env: &impl Fn(&str) -> Option<String>) -> bool {
    const KEYS: &[&str] = &[
        "CI",
        "GITHUB_ACTIONS",
        "JENKINS_HOME",
        "BUILDKITE",
        "CIRCLECI",
        "TRAVIS",
        "TEAMCITY_VERSION",
    ];

    KEYS.iter().any(|k| get_env(k).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn caps(env: &[(&str, &str)], is_tty: bool) -> TerminalCapabilities {
        let map: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        detect_capabilities_impl(|k| map.get(k).cloned(), is_tty)
    }

    #[test]
    fn tty_with_color_is_pretty() {
        let c = caps(&[("TERM", "xterm-256color")], true);
        assert!(c.supports_color);
        assert!(c.wants_pretty());
    }

    #[test]
    fn no_color_disables_pretty() {
        let c = caps(&[("NO_COLOR", "1"), ("TERM", "xterm-256color")], true);
        assert!(!c.wants_pretty());
    }

    #[test]
    fn term_dumb_disables_pretty() {
        assert!(!caps(&[("TERM", "dumb")], true).wants_pretty());
    }

    #[test]
    fn piped_output_is_plain() {
        assert!(!caps(&[("TERM", "xterm")], false).wants_pretty());
    }

    #[test]
    fn ci_is_plain() {
        let c = caps(&[("CI", "true"), ("TERM", "xterm-256color")], true);
        assert!(c.is_ci);
        assert!(!c.wants_pretty());
    }
}
