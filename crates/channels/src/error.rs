use std::error::Error as StdError;

/// Crate-wide result type for gateway operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Normalized error codes returned by the chat platform.
///
/// Only the codes the core reacts to get their own variant; everything else
/// is kept as `Other` so the raw code still shows up in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformErrorCode {
    /// 10003: the channel or thread does not exist.
    UnknownChannel,
    /// 10008: the message does not exist or was deleted.
    UnknownMessage,
    /// 40001: the credential was rejected.
    Unauthorized,
    /// 50001: the account cannot see the resource.
    MissingAccess,
    /// 50013: the account can see the resource but lacks a permission.
    MissingPermissions,
    /// 50035: the payload was rejected (too long, malformed).
    InvalidFormBody,
    Other(i64),
}

impl PlatformErrorCode {
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        match code {
            10003 => Self::UnknownChannel,
            10008 => Self::UnknownMessage,
            40001 => Self::Unauthorized,
            50001 => Self::MissingAccess,
            50013 => Self::MissingPermissions,
            50035 => Self::InvalidFormBody,
            other => Self::Other(other),
        }
    }

    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::UnknownChannel => 10003,
            Self::UnknownMessage => 10008,
            Self::Unauthorized => 40001,
            Self::MissingAccess => 50001,
            Self::MissingPermissions => 50013,
            Self::InvalidFormBody => 50035,
            Self::Other(code) => code,
        }
    }

    /// Human-readable explanation shown to the operator and written to logs.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::UnknownChannel => "channel or thread not found",
            Self::UnknownMessage => "message not found or already deleted",
            Self::Unauthorized => "account not authorized, check the token",
            Self::MissingAccess => "no permission to access this channel",
            Self::MissingPermissions => "no permission to send messages here",
            Self::InvalidFormBody => "invalid message (too long or malformed)",
            Self::Other(_) => "unexpected platform error",
        }
    }

    /// True when the platform says the resource does not exist.
    #[must_use]
    pub fn is_not_found(self) -> bool {
        matches!(self, Self::UnknownChannel | Self::UnknownMessage)
    }
}

impl std::fmt::Display for PlatformErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.describe(), self.code())
    }
}

/// Typed gateway errors shared between the core and platform adapters.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The platform rejected the request with a known error code.
    #[error("{code}: {message}")]
    Platform {
        code: PlatformErrorCode,
        message: String,
    },

    /// Input payload or parameter is invalid.
    #[error("invalid channel input: {message}")]
    InvalidInput { message: String },

    /// Operation is currently unavailable (not connected, subscription closed).
    #[error("channel operation unavailable: {message}")]
    Unavailable { message: String },

    /// Wrapped source error from the platform SDK.
    #[error("channel operation failed: {context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn platform(code: PlatformErrorCode, message: impl std::fmt::Display) -> Self {
        Self::Platform {
            code,
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn invalid_input(message: impl std::fmt::Display) -> Self {
        Self::InvalidInput {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn unavailable(message: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Platform code carried by this error, if any.
    #[must_use]
    pub fn platform_code(&self) -> Option<PlatformErrorCode> {
        match self {
            Self::Platform { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Operator-facing reason: the mapped description for platform errors,
    /// the full message otherwise. Raw platform payloads are never shown.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Platform { code, .. } => code.describe().to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case(10003, PlatformErrorCode::UnknownChannel)]
    #[case(10008, PlatformErrorCode::UnknownMessage)]
    #[case(40001, PlatformErrorCode::Unauthorized)]
    #[case(50001, PlatformErrorCode::MissingAccess)]
    #[case(50013, PlatformErrorCode::MissingPermissions)]
    #[case(50035, PlatformErrorCode::InvalidFormBody)]
    #[case(30007, PlatformErrorCode::Other(30007))]
    fn maps_raw_codes(#[case] raw: i64, #[case] expected: PlatformErrorCode) {
        let code = PlatformErrorCode::from_code(raw);
        assert_eq!(code, expected);
        assert_eq!(code.code(), raw);
    }

    #[test]
    fn reason_hides_raw_platform_message() {
        let err = Error::platform(
            PlatformErrorCode::MissingAccess,
            "{\"message\": \"Missing Access\", \"code\": 50001}",
        );
        assert_eq!(err.reason(), "no permission to access this channel");
        assert_eq!(err.platform_code(), Some(PlatformErrorCode::MissingAccess));
    }

    #[test]
    fn reason_keeps_non_platform_message() {
        let err = Error::unavailable("gateway not connected");
        assert_eq!(
            err.reason(),
            "channel operation unavailable: gateway not connected"
        );
        assert!(err.platform_code().is_none());
    }
}
