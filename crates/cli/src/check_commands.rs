//! `autoping check`: config validation without connecting.
//!
//! Prints a report with `[ok]`, `[warn]`, `[fail]` or `[info]` per item and
//! exits non-zero when any item failed.

use std::path::{Path, PathBuf};

use {
    anyhow::Result,
    autoping_config::{AutoPingConfig, Severity, ValidationResult},
    secrecy::ExposeSecret,
};

// ── ANSI helpers ────────────────────────────────────────────────────────────

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Warn,
    Fail,
    Info,
}

impl Status {
    fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Fail => "fail",
            Self::Info => "info",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Ok => GREEN,
            Self::Warn => YELLOW,
            Self::Fail => RED,
            Self::Info => CYAN,
        }
    }
}

impl From<Severity> for Status {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => Self::Fail,
            Severity::Warning => Self::Warn,
            Severity::Info => Self::Info,
        }
    }
}

struct CheckItem {
    status: Status,
    message: String,
}

struct Section {
    title: String,
    items: Vec<CheckItem>,
}

impl Section {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    fn push(&mut self, status: Status, message: impl Into<String>) {
        self.items.push(CheckItem {
            status,
            message: message.into(),
        });
    }
}

fn print_report(sections: &[Section]) -> (usize, usize) {
    let mut errors = 0usize;
    let mut warnings = 0usize;

    for section in sections {
        eprintln!("{BOLD}{}{RESET}", section.title);
        for item in &section.items {
            let color = item.status.color();
            let label = item.status.label();
            eprintln!("  [{color}{label}{RESET}]  {}", item.message);
            match item.status {
                Status::Fail => errors += 1,
                Status::Warn => warnings += 1,
                _ => {},
            }
        }
        eprintln!();
    }

    (errors, warnings)
}

// ── Entry point ─────────────────────────────────────────────────────────────

pub fn handle_check(explicit: Option<&Path>) -> Result<()> {
    eprintln!("{BOLD}autoping check{RESET}");
    eprintln!("{BOLD}=============={RESET}\n");

    let path: Option<PathBuf> = explicit
        .map(Path::to_path_buf)
        .or_else(autoping_config::find_config_file);

    let (mut config, load_error) = match &path {
        Some(path) => match autoping_config::load_config(path) {
            Ok(config) => (config, None),
            Err(e) => (AutoPingConfig::default(), Some(e.to_string())),
        },
        None => (AutoPingConfig::default(), None),
    };
    autoping_config::apply_env_overrides(&mut config);
    let result = autoping_config::validate_config(&config, path.as_deref());

    let sections = [
        file_section(path.as_deref(), load_error.as_deref(), &result),
        settings_section(&config),
    ];
    let (errors, warnings) = print_report(&sections);

    eprintln!("{BOLD}Summary:{RESET} {errors} error(s), {warnings} warning(s)");

    if errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn file_section(path: Option<&Path>, load_error: Option<&str>, result: &ValidationResult) -> Section {
    let label = path.map_or_else(|| "defaults + environment".to_string(), |p| p.display().to_string());
    let mut section = Section::new(format!("Config ({label})"));

    let syntax_reported = result.diagnostics.iter().any(|d| d.category == "syntax");
    if let Some(e) = load_error
        && !syntax_reported
    {
        section.push(Status::Fail, format!("failed to load: {e}"));
    }

    for d in &result.diagnostics {
        let message = if d.path.is_empty() {
            d.message.clone()
        } else {
            format!("{}: {}", d.path, d.message)
        };
        section.push(d.severity.into(), message);
    }

    if section.items.is_empty() {
        section.push(Status::Ok, "no problems found");
    }
    section
}

fn settings_section(config: &AutoPingConfig) -> Section {
    let mut section = Section::new("Effective settings");

    let token_set = !config.discord.token.expose_secret().trim().is_empty();
    section.push(
        if token_set {
            Status::Ok
        } else {
            Status::Fail
        },
        if token_set {
            "token: set (redacted)"
        } else {
            "token: missing"
        },
    );

    let channel = config.watch.channel_id.trim();
    section.push(
        Status::Info,
        format!(
            "channel: {}",
            if channel.is_empty() {
                "not configured"
            } else {
                channel
            }
        ),
    );
    section.push(
        Status::Info,
        format!("message: {:?}", config.watch.auto_message),
    );
    section.push(
        Status::Info,
        match config.watch.wait_for_message_ms {
            0 => "mode: reply immediately".to_string(),
            ms => format!("mode: wait up to {ms}ms for the first message"),
        },
    );
    match config.discord.operator_id.as_deref() {
        Some(operator) => section.push(Status::Info, format!("operator: {operator}")),
        None => {
            section.push(Status::Info, "operator: logged-in account");
            section.push(
                Status::Info,
                "no operator_id set: commands only work when typed by the logged-in \
                 account itself (a bot token cannot type); set OPERATOR_ID to your user id",
            );
        },
    }
    section.push(
        Status::Info,
        format!("commands: `{} ajuda`", config.commands.prefix),
    );
    section
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, secrecy::Secret};

    #[test]
    fn print_report_counts_errors_and_warnings() {
        let mut section = Section::new("test");
        section.push(Status::Ok, "fine");
        section.push(Status::Warn, "caution");
        section.push(Status::Fail, "broken");
        section.push(Status::Info, "note");

        let (errors, warnings) = print_report(&[section]);
        assert_eq!(errors, 1);
        assert_eq!(warnings, 1);
    }

    #[test]
    fn clean_config_reports_ok() {
        let mut config = AutoPingConfig::default();
        config.discord.token = Secret::new("MTIz.real.token".into());
        config.watch.channel_id = "123456789012345678".into();
        config.watch.auto_message = "hi".into();
        let result = autoping_config::validate_config(&config, None);

        let section = file_section(None, None, &result);
        assert_eq!(section.items.len(), 1);
        assert_eq!(section.items[0].status, Status::Ok);
    }

    #[test]
    fn diagnostics_become_items() {
        let config = AutoPingConfig::default();
        let result = autoping_config::validate_config(&config, None);
        let section = file_section(None, None, &result);
        assert!(section.items.iter().any(|i| i.status == Status::Fail
            && i.message.starts_with("discord.token")));
    }

    #[test]
    fn load_error_without_syntax_diagnostic_is_reported() {
        let result = ValidationResult::default();
        let section = file_section(
            Some(Path::new("autoping.json")),
            Some("expected value at line 1"),
            &result,
        );
        assert_eq!(section.items[0].status, Status::Fail);
        assert!(section.items[0].message.contains("expected value"));
    }

    #[test]
    fn missing_operator_is_pointed_out() {
        let config = AutoPingConfig::default();
        let section = settings_section(&config);
        assert!(section.items.iter().any(|i| i.status == Status::Info
            && i.message.contains("set OPERATOR_ID")));

        let mut config = AutoPingConfig::default();
        config.discord.operator_id = Some("555555555555555555".into());
        let section = settings_section(&config);
        assert!(section.items.iter().any(|i| i.message == "operator: 555555555555555555"));
        assert!(section.items.iter().all(|i| !i.message.contains("OPERATOR_ID")));
    }

    #[test]
    fn settings_never_print_the_token() {
        let mut config = AutoPingConfig::default();
        config.discord.token = Secret::new("super-secret".into());
        let section = settings_section(&config);
        assert!(section.items.iter().all(|i| !i.message.contains("super-secret")));
        assert_eq!(section.items[0].status, Status::Ok);
    }
}
