//! Configuration validation.
//!
//! Checks the effective configuration (file + environment) before the
//! gateway connects, and flags unknown or misspelled keys in TOML files.

use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;

use crate::schema::AutoPingConfig;

/// Channel ids shorter than this are never valid snowflakes.
const MIN_CHANNEL_ID_LEN: usize = 17;

/// Platform limit for a single message.
const MAX_MESSAGE_LEN: usize = 2000;

/// Fragments left in the token by the sample `.env`.
const TOKEN_PLACEHOLDERS: &[&str] = &["seu_token", "your_token", "changeme"];

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "credential", "watch", "unknown-field", "syntax"
    pub category: &'static str,
    /// Dotted path, e.g. "watch.channel_id"
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}: {}", self.severity, self.message)
        } else {
            write!(f, "{}: {}: {}", self.severity, self.path, self.message)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(
        &mut self,
        severity: Severity,
        category: &'static str,
        path: &str,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(Diagnostic {
            severity,
            category,
            path: path.to_string(),
            message: message.into(),
        });
    }
}

/// Validate the effective configuration and, when given, the raw file it was
/// loaded from.
#[must_use]
pub fn validate_config(config: &AutoPingConfig, file: Option<&Path>) -> ValidationResult {
    let mut result = ValidationResult {
        config_path: file.map(Path::to_path_buf),
        ..Default::default()
    };

    if let Some(path) = file.filter(|p| p.extension().is_some_and(|e| e == "toml")) {
        match std::fs::read_to_string(path) {
            Ok(raw) => check_toml_keys(&raw, &mut result),
            Err(e) => result.push(
                Severity::Error,
                "syntax",
                "",
                format!("failed to read config file: {e}"),
            ),
        }
    }

    check_semantics(config, &mut result);
    result
}

fn check_semantics(config: &AutoPingConfig, result: &mut ValidationResult) {
    let token = config.discord.token.expose_secret();
    if token.trim().is_empty() {
        result.push(
            Severity::Error,
            "credential",
            "discord.token",
            "DISCORD_TOKEN is not configured",
        );
    } else if TOKEN_PLACEHOLDERS.iter().any(|p| token.contains(p)) {
        result.push(
            Severity::Error,
            "credential",
            "discord.token",
            "DISCORD_TOKEN still holds the placeholder value",
        );
    }

    let channel_id = config.watch.channel_id.trim();
    if channel_id.is_empty() {
        result.push(
            Severity::Info,
            "watch",
            "watch.channel_id",
            "no channel configured; set one at runtime with the `canal` command",
        );
    } else if channel_id.len() < MIN_CHANNEL_ID_LEN {
        result.push(
            Severity::Warning,
            "watch",
            "watch.channel_id",
            format!("channel id must have at least {MIN_CHANNEL_ID_LEN} digits"),
        );
    }

    let message = &config.watch.auto_message;
    if message.trim().is_empty() {
        result.push(
            Severity::Warning,
            "watch",
            "watch.auto_message",
            "no auto message configured; new threads will be skipped",
        );
    } else if message.chars().count() > MAX_MESSAGE_LEN {
        result.push(
            Severity::Error,
            "watch",
            "watch.auto_message",
            format!("auto message exceeds {MAX_MESSAGE_LEN} characters"),
        );
    }

    if config.commands.prefix.trim().is_empty() {
        result.push(
            Severity::Error,
            "commands",
            "commands.prefix",
            "command prefix cannot be empty",
        );
    }

    if config.listing.max_per_message == 0 {
        result.push(
            Severity::Error,
            "listing",
            "listing.max_per_message",
            "must be at least 1",
        );
    }
}

// ── Unknown keys ────────────────────────────────────────────────────────────

const SECTIONS: &[(&str, &[&str])] = &[
    ("discord", &["token", "operator_id"]),
    ("watch", &[
        "channel_id",
        "auto_message",
        "wait_for_message_ms",
        "enabled",
    ]),
    ("commands", &["prefix", "delete_after_ms"]),
    ("listing", &["max_per_message"]),
];

fn check_toml_keys(raw: &str, result: &mut ValidationResult) {
    let value: toml::Value = match toml::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            result.push(
                Severity::Error,
                "syntax",
                "",
                format!("TOML syntax error: {e}"),
            );
            return;
        },
    };
    let Some(table) = value.as_table() else {
        return;
    };

    let section_names: Vec<&str> = SECTIONS.iter().map(|(name, _)| *name).collect();
    for (key, child) in table {
        let Some((_, fields)) = SECTIONS.iter().find(|(name, _)| *name == key.as_str()) else {
            result.push(
                Severity::Error,
                "unknown-field",
                key,
                unknown_field_message(key, &section_names, "at top level "),
            );
            continue;
        };
        let Some(child) = child.as_table() else {
            continue;
        };
        for field in child.keys() {
            if !fields.contains(&field.as_str()) {
                result.push(
                    Severity::Error,
                    "unknown-field",
                    &format!("{key}.{field}"),
                    unknown_field_message(field, fields, ""),
                );
            }
        }
    }
}

fn unknown_field_message(key: &str, candidates: &[&str], level: &str) -> String {
    let msg = match suggest(key, candidates, 3) {
        Some(s) => format!("unknown field {level}(did you mean \"{s}\"?)"),
        None => format!("unknown field {level}"),
    };
    msg.trim().to_string()
}

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_len = b.chars().count();
    if a.is_empty() {
        return b_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_len]
}

/// Closest candidate within `max_distance` edits, if any.
fn suggest<'a>(needle: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (*c, levenshtein(needle, c)))
        .filter(|(_, d)| *d > 0 && *d <= max_distance)
        .min_by_key(|(_, d)| *d)
        .map(|(c, _)| c)
}
