//! Channel and auto-message validation.

use std::sync::Arc;

use {
    autoping_channels::{
        ChannelKind, ChannelSnapshot, ChatGateway, PermissionCheck, PlatformErrorCode,
    },
    thiserror::Error,
    tracing::debug,
};

/// Ids shorter than this cannot be snowflakes; rejected before any lookup.
pub const MIN_CHANNEL_ID_LEN: usize = 17;

/// Platform limit for a single message.
pub const MAX_MESSAGE_LEN: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid channel id, it must have 17-19 digits")]
    InvalidFormat,

    #[error("channel not found, the id may be wrong or you have no access to it")]
    NotFound,

    #[error("no permission to access this channel")]
    NoAccess,

    #[error("channel type ({0}) not supported, use a text, forum, media or announcement channel")]
    UnsupportedType(ChannelKind),

    #[error("no permission to send messages in this channel")]
    MissingSendPermission,

    #[error("failed to validate channel: {0}")]
    Lookup(String),

    #[error("the message cannot be empty")]
    Empty,

    #[error("the message cannot exceed {MAX_MESSAGE_LEN} characters (got {0})")]
    TooLong(usize),
}

/// A channel that passed validation, with its display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedChannel {
    pub channel: ChannelSnapshot,
    /// `#name (workspace)`
    pub label: String,
}

/// Checks a channel reference for existence, type, and send permission.
#[derive(Clone)]
pub struct ChannelValidator {
    gateway: Arc<dyn ChatGateway>,
}

impl ChannelValidator {
    pub fn new(gateway: Arc<dyn ChatGateway>) -> Self {
        Self { gateway }
    }

    pub async fn validate(&self, channel_id: &str) -> Result<ValidatedChannel, ValidationError> {
        let channel_id = channel_id.trim();
        if channel_id.chars().count() < MIN_CHANNEL_ID_LEN {
            return Err(ValidationError::InvalidFormat);
        }

        let channel = match self.gateway.fetch_channel(channel_id).await {
            Ok(Some(channel)) => channel,
            Ok(None) => return Err(ValidationError::NotFound),
            Err(e) => {
                return Err(match e.platform_code() {
                    Some(code) if code.is_not_found() => ValidationError::NotFound,
                    Some(PlatformErrorCode::MissingAccess) => ValidationError::NoAccess,
                    _ => ValidationError::Lookup(e.reason()),
                });
            },
        };

        debug!(channel_id, kind = %channel.kind, "channel lookup");

        if !channel.kind.supports_threads() {
            return Err(ValidationError::UnsupportedType(channel.kind));
        }

        match &channel.send_permission {
            PermissionCheck::Allowed => {},
            PermissionCheck::Denied => return Err(ValidationError::MissingSendPermission),
            PermissionCheck::Indeterminate(reason) => {
                debug!(channel_id, reason = %reason, "send permission could not be checked");
            },
        }

        let label = channel_label(&channel);
        Ok(ValidatedChannel { channel, label })
    }
}

/// `#name (workspace)` display label.
pub fn channel_label(channel: &ChannelSnapshot) -> String {
    format!(
        "#{} ({})",
        channel.name,
        channel.workspace_name.as_deref().unwrap_or("unknown server")
    )
}

/// Check a candidate auto message. The text is never transformed.
pub fn validate_message(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::Empty);
    }
    let len = text.chars().count();
    if len > MAX_MESSAGE_LEN {
        return Err(ValidationError::TooLong(len));
    }
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::testing::{FakeGateway, channel},
        rstest::rstest,
    };

    const ID: &str = "123456789012345678";

    fn validator(gateway: FakeGateway) -> (ChannelValidator, Arc<FakeGateway>) {
        let gateway = Arc::new(gateway);
        (ChannelValidator::new(gateway.clone()), gateway)
    }

    #[rstest]
    #[case("")]
    #[case("123")]
    #[case("1234567890123456")]
    #[tokio::test]
    async fn short_ids_rejected_without_lookup(#[case] id: &str) {
        let (validator, gateway) = validator(FakeGateway::new());
        assert_eq!(
            validator.validate(id).await,
            Err(ValidationError::InvalidFormat)
        );
        assert!(gateway.lookups.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn valid_channel_gets_label() {
        let (validator, _) = validator(
            FakeGateway::new().with_channel(channel(ID, "pedidos", "Loja", ChannelKind::Forum)),
        );
        let validated = validator.validate(ID).await.unwrap();
        assert_eq!(validated.label, "#pedidos (Loja)");
        assert_eq!(validated.channel.kind, ChannelKind::Forum);
    }

    #[tokio::test]
    async fn missing_channel_is_not_found() {
        let (validator, _) = validator(FakeGateway::new());
        assert_eq!(validator.validate(ID).await, Err(ValidationError::NotFound));
    }

    #[rstest]
    #[case(PlatformErrorCode::UnknownChannel, ValidationError::NotFound)]
    #[case(PlatformErrorCode::MissingAccess, ValidationError::NoAccess)]
    #[tokio::test]
    async fn lookup_errors_are_classified(
        #[case] code: PlatformErrorCode,
        #[case] expected: ValidationError,
    ) {
        let (validator, _) = validator(FakeGateway::new().fail_lookup(ID, code));
        assert_eq!(validator.validate(ID).await, Err(expected));
    }

    #[tokio::test]
    async fn other_lookup_errors_keep_reason() {
        let (validator, _) =
            validator(FakeGateway::new().fail_lookup(ID, PlatformErrorCode::Other(500)));
        assert!(matches!(
            validator.validate(ID).await,
            Err(ValidationError::Lookup(_))
        ));
    }

    #[rstest]
    #[case(2)]
    #[case(4)]
    #[case(13)]
    #[tokio::test]
    async fn unsupported_types_rejected(#[case] code: u8) {
        let kind = ChannelKind::from_discord_code(code);
        let (validator, _) =
            validator(FakeGateway::new().with_channel(channel(ID, "voz", "Loja", kind)));
        assert_eq!(
            validator.validate(ID).await,
            Err(ValidationError::UnsupportedType(kind))
        );
    }

    #[tokio::test]
    async fn denied_send_permission_rejected() {
        let mut snapshot = channel(ID, "avisos", "Loja", ChannelKind::Announcement);
        snapshot.send_permission = PermissionCheck::Denied;
        let (validator, _) = validator(FakeGateway::new().with_channel(snapshot));
        assert_eq!(
            validator.validate(ID).await,
            Err(ValidationError::MissingSendPermission)
        );
    }

    #[tokio::test]
    async fn indeterminate_permission_proceeds() {
        let mut snapshot = channel(ID, "geral", "Loja", ChannelKind::Text);
        snapshot.send_permission = PermissionCheck::Indeterminate("guild not cached".into());
        let (validator, _) = validator(FakeGateway::new().with_channel(snapshot));
        assert!(validator.validate(ID).await.is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\t")]
    fn empty_messages_rejected(#[case] text: &str) {
        assert_eq!(validate_message(text), Err(ValidationError::Empty));
    }

    #[test]
    fn message_length_limit() {
        assert!(validate_message(&"a".repeat(2000)).is_ok());
        assert_eq!(
            validate_message(&"a".repeat(2001)),
            Err(ValidationError::TooLong(2001))
        );
        // Counted in characters, not bytes.
        assert!(validate_message(&"é".repeat(2000)).is_ok());
    }
}
