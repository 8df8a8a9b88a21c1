/// Config schema types (discord account, watched channel, commands, listing).
use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Literal that marks a message as an in-band command.
pub const DEFAULT_COMMAND_PREFIX: &str = "!autoPing";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoPingConfig {
    pub discord: DiscordConfig,
    pub watch: WatchConfig,
    pub commands: CommandsConfig,
    pub listing: ListingConfig,
}

/// Credentials and identity for the chat account.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// Account allowed to issue commands. Defaults to the logged-in account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_id: Option<String>,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"[REDACTED]")
            .field("operator_id", &self.operator_id)
            .finish()
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            operator_id: None,
        }
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Initial values for the runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WatchConfig {
    /// Container channel to watch. Empty means unconfigured.
    pub channel_id: String,
    /// Text posted into every new thread. Empty means unconfigured.
    pub auto_message: String,
    /// How long to wait for the thread creator's first message (0 = reply
    /// immediately).
    pub wait_for_message_ms: u64,
    pub enabled: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            channel_id: String::new(),
            auto_message: String::new(),
            wait_for_message_ms: 0,
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CommandsConfig {
    pub prefix: String,
    /// Delay before a processed command message is deleted.
    pub delete_after_ms: u64,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_COMMAND_PREFIX.into(),
            delete_after_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ListingConfig {
    /// Maximum channels per listing message.
    pub max_per_message: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            max_per_message: 15,
        }
    }
}
