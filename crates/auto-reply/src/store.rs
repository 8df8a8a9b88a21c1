use std::{
    sync::{Arc, RwLock},
    time::Duration,
};

use autoping_config::AutoPingConfig;

/// Live configuration consulted by every event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Container channel to watch; empty when unconfigured.
    pub monitored_channel_id: String,
    /// Text posted into new threads; empty when unconfigured.
    pub auto_message: String,
    /// 0 replies immediately, anything else waits up to this long for the
    /// thread creator's first message.
    pub wait_window_ms: u64,
    /// Fixed for the process lifetime.
    pub command_prefix: String,
    pub enabled: bool,
}

impl RuntimeConfig {
    /// The wait window, or `None` in immediate mode.
    #[must_use]
    pub fn wait_window(&self) -> Option<Duration> {
        (self.wait_window_ms > 0).then(|| Duration::from_millis(self.wait_window_ms))
    }
}

impl From<&AutoPingConfig> for RuntimeConfig {
    fn from(config: &AutoPingConfig) -> Self {
        Self {
            monitored_channel_id: config.watch.channel_id.trim().to_string(),
            auto_message: config.watch.auto_message.clone(),
            wait_window_ms: config.watch.wait_for_message_ms,
            command_prefix: config.commands.prefix.clone(),
            enabled: config.watch.enabled,
        }
    }
}

/// Fields to merge into the live configuration. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPatch {
    pub monitored_channel_id: Option<String>,
    pub auto_message: Option<String>,
    pub wait_window_ms: Option<u64>,
    pub enabled: Option<bool>,
}

/// The single shared configuration instance.
///
/// Cloning the store clones the handle, not the data. Updates are
/// last-write-wins and visible to every read that happens afterwards; there
/// is no snapshot isolation across multiple reads.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    inner: Arc<RwLock<RuntimeConfig>>,
}

impl ConfigStore {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Current configuration snapshot.
    pub fn get(&self) -> RuntimeConfig {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Merge `patch` into the live configuration and return the previous
    /// values.
    pub fn set(&self, patch: ConfigPatch) -> RuntimeConfig {
        let mut config = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let previous = config.clone();
        if let Some(channel_id) = patch.monitored_channel_id {
            config.monitored_channel_id = channel_id;
        }
        if let Some(message) = patch.auto_message {
            config.auto_message = message;
        }
        if let Some(wait) = patch.wait_window_ms {
            config.wait_window_ms = wait;
        }
        if let Some(enabled) = patch.enabled {
            config.enabled = enabled;
        }
        previous
    }
}

impl From<&AutoPingConfig> for ConfigStore {
    fn from(config: &AutoPingConfig) -> Self {
        Self::new(RuntimeConfig::from(config))
    }
}
