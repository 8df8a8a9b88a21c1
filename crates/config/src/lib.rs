//! Startup configuration: schema, discovery, env overrides, and diagnostics.
//!
//! Config files: `autoping.toml`, `autoping.yaml`, or `autoping.json`,
//! searched in `./` then `~/.config/autoping/`. Environment variables
//! (`DISCORD_TOKEN`, `CHANNEL_ID`, `AUTO_MESSAGE`, `WAIT_FOR_MESSAGE`,
//! `OPERATOR_ID`) override file values.

pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{apply_env_overrides, config_dir, find_config_file, load_config},
    schema::{
        AutoPingConfig, CommandsConfig, DEFAULT_COMMAND_PREFIX, DiscordConfig, ListingConfig,
        WatchConfig,
    },
    validate::{Diagnostic, Severity, ValidationResult, validate_config},
};
