use {
    autoping_channels::PlatformErrorCode,
    serenity::{gateway::GatewayError, http::HttpError},
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum Error {
    /// The gateway could not be reached or refused the session.
    #[error("gateway connection failed: {}", .0.reason())]
    Connection(#[source] autoping_channels::Error),

    #[error("{message}")]
    Message { message: String },

    #[error("{context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

impl Error {
    /// Map a `Client::start` (or builder) failure. Unauthorized credentials
    /// surface as the bad token description, never serenity's raw text.
    pub(crate) fn connection(err: serenity::Error) -> Self {
        Self::Connection(to_channel_error("gateway connection", err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Normalize a serenity failure for the core. Discord JSON error codes keep
/// their meaning; everything else is wrapped with `context`.
pub(crate) fn to_channel_error(context: &str, err: serenity::Error) -> autoping_channels::Error {
    match err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
            let code = i64::try_from(response.error.code).unwrap_or_default();
            autoping_channels::Error::platform(
                PlatformErrorCode::from_code(code),
                response.error.message,
            )
        },
        serenity::Error::Gateway(GatewayError::InvalidAuthentication) => {
            autoping_channels::Error::platform(
                PlatformErrorCode::Unauthorized,
                "invalid authentication",
            )
        },
        other => autoping_channels::Error::external(context, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_authentication_maps_to_unauthorized() {
        let err = to_channel_error(
            "send",
            serenity::Error::Gateway(GatewayError::InvalidAuthentication),
        );
        assert_eq!(err.platform_code(), Some(PlatformErrorCode::Unauthorized));
        assert_eq!(err.reason(), "account not authorized, check the token");
    }

    #[test]
    fn rejected_token_reads_as_bad_token() {
        let err = Error::connection(serenity::Error::Gateway(
            GatewayError::InvalidAuthentication,
        ));
        let text = err.to_string();
        assert_eq!(
            text,
            "gateway connection failed: account not authorized, check the token"
        );
        assert!(!text.contains("Sent invalid authentication"));
    }

    #[test]
    fn other_errors_keep_context() {
        let err = to_channel_error("join thread", serenity::Error::Other("boom"));
        assert!(err.platform_code().is_none());
        assert!(err.to_string().contains("join thread"), "{err}");
    }
}
