/// Channel type normalized once at the platform boundary.
///
/// Platforms report channel types either symbolically or numerically; the
/// adapter converts whatever it receives into this enum so the core never
/// has to care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Text,
    Announcement,
    Forum,
    Media,
    /// Anything that cannot host threads (voice, category, DM, ...), with the
    /// raw platform code.
    Other(u8),
}

impl ChannelKind {
    /// Map a raw Discord channel type code.
    #[must_use]
    pub fn from_discord_code(code: u8) -> Self {
        match code {
            0 => Self::Text,
            5 => Self::Announcement,
            15 => Self::Forum,
            16 => Self::Media,
            other => Self::Other(other),
        }
    }

    /// Container types that can host threads.
    #[must_use]
    pub fn supports_threads(self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Icon used in channel listings.
    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::Forum => "\u{1F4CB}",
            Self::Announcement => "\u{1F4E2}",
            Self::Text | Self::Media | Self::Other(_) => "\u{1F4AC}",
        }
    }
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Announcement => write!(f, "announcement"),
            Self::Forum => write!(f, "forum"),
            Self::Media => write!(f, "media"),
            Self::Other(code) => write!(f, "type {code}"),
        }
    }
}

/// Outcome of a best-effort "can send messages" check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionCheck {
    Allowed,
    Denied,
    /// The check could not be evaluated; sending may still work.
    Indeterminate(String),
}

/// A channel as seen by the platform at lookup time. Never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSnapshot {
    pub id: String,
    pub name: String,
    pub workspace_id: Option<String>,
    pub workspace_name: Option<String>,
    /// Name of the parent category, if the channel sits in one.
    pub category: Option<String>,
    pub kind: ChannelKind,
    pub send_permission: PermissionCheck,
}

/// A thread-creation notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadEvent {
    pub thread_id: String,
    pub parent_channel_id: Option<String>,
    pub creator_id: Option<String>,
    pub name: String,
    /// False for replays (reconnects, being added to an existing thread).
    pub newly_created: bool,
    /// Whether the current account is already a member of the thread.
    pub joined: bool,
}

/// A message received over the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub id: String,
    pub channel_id: String,
    pub author_id: String,
    pub content: String,
}
