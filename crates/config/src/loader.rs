use std::path::{Path, PathBuf};

use {secrecy::Secret, tracing::debug};

use crate::schema::AutoPingConfig;

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "autoping.toml",
    "autoping.yaml",
    "autoping.yml",
    "autoping.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<AutoPingConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    parse_config(&raw, path)
}

/// Find the first config file in standard locations.
///
/// Search order:
/// 1. `./autoping.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/autoping/autoping.{toml,yaml,yml,json}` (user-global)
pub fn find_config_file() -> Option<PathBuf> {
    let found = find_config_file_in(Path::new("."))
        .or_else(|| config_dir().and_then(|dir| find_config_file_in(&dir)));
    if found.is_none() {
        debug!("no config file found, using defaults");
    }
    found
}

fn find_config_file_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/autoping/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "autoping").map(|d| d.config_dir().to_path_buf())
}

/// Apply `DISCORD_TOKEN`, `CHANNEL_ID`, `AUTO_MESSAGE`, `WAIT_FOR_MESSAGE`
/// and `OPERATOR_ID` from the process environment.
pub fn apply_env_overrides(config: &mut AutoPingConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

/// Same as [`apply_env_overrides`] with a custom lookup, so tests do not
/// have to mutate the process environment.
fn apply_env_overrides_with(config: &mut AutoPingConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(token) = lookup("DISCORD_TOKEN").filter(|t| !t.is_empty()) {
        config.discord.token = Secret::new(token);
    }
    if let Some(operator) = lookup("OPERATOR_ID").filter(|o| !o.trim().is_empty()) {
        config.discord.operator_id = Some(operator.trim().to_string());
    }
    if let Some(channel) = lookup("CHANNEL_ID") {
        config.watch.channel_id = channel.trim().to_string();
    }
    if let Some(message) = lookup("AUTO_MESSAGE") {
        config.watch.auto_message = message;
    }
    if let Some(wait) = lookup("WAIT_FOR_MESSAGE") {
        config.watch.wait_for_message_ms = parse_wait_ms(&wait);
    }
}

/// Lenient millisecond parser: reads the leading digits and falls back to 0
/// (immediate mode) for anything unparsable or negative.
fn parse_wait_ms(raw: &str) -> u64 {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<AutoPingConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, secrecy::ExposeSecret, std::collections::HashMap};

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = AutoPingConfig::default();
        cfg.watch.channel_id = "111111111111111111".into();

        apply_env_overrides_with(
            &mut cfg,
            env(&[
                ("DISCORD_TOKEN", "tok"),
                ("CHANNEL_ID", " 222222222222222222 "),
                ("AUTO_MESSAGE", "hi there"),
                ("WAIT_FOR_MESSAGE", "5000"),
            ]),
        );

        assert_eq!(cfg.discord.token.expose_secret(), "tok");
        assert_eq!(cfg.watch.channel_id, "222222222222222222");
        assert_eq!(cfg.watch.auto_message, "hi there");
        assert_eq!(cfg.watch.wait_for_message_ms, 5000);
        assert!(cfg.discord.operator_id.is_none());
    }

    #[test]
    fn missing_env_keeps_file_values() {
        let mut cfg = AutoPingConfig::default();
        cfg.watch.auto_message = "from file".into();
        apply_env_overrides_with(&mut cfg, env(&[]));
        assert_eq!(cfg.watch.auto_message, "from file");
    }

    #[test]
    fn wait_ms_is_lenient() {
        assert_eq!(parse_wait_ms("2500"), 2500);
        assert_eq!(parse_wait_ms(" 2500ms"), 2500);
        assert_eq!(parse_wait_ms("abc"), 0);
        assert_eq!(parse_wait_ms("-10"), 0);
        assert_eq!(parse_wait_ms(""), 0);
    }

    #[test]
    fn loads_each_supported_format() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("autoping.toml");
        std::fs::write(&toml_path, "[watch]\nauto_message = \"toml\"\n").unwrap();
        assert_eq!(load_config(&toml_path).unwrap().watch.auto_message, "toml");

        let yaml_path = dir.path().join("autoping.yaml");
        std::fs::write(&yaml_path, "watch:\n  auto_message: yaml\n").unwrap();
        assert_eq!(load_config(&yaml_path).unwrap().watch.auto_message, "yaml");

        let json_path = dir.path().join("autoping.json");
        std::fs::write(&json_path, r#"{"watch": {"auto_message": "json"}}"#).unwrap();
        assert_eq!(load_config(&json_path).unwrap().watch.auto_message, "json");
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autoping.ini");
        std::fs::write(&path, "x=1").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn finds_first_matching_file_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_config_file_in(dir.path()).is_none());

        std::fs::write(dir.path().join("autoping.json"), "{}").unwrap();
        std::fs::write(dir.path().join("autoping.toml"), "").unwrap();
        let found = find_config_file_in(dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "autoping.toml");
    }
}
