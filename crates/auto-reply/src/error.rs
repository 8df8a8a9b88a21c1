use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Channel(#[from] autoping_channels::Error),
}

impl Error {
    /// Operator-facing reason; platform errors use their mapped description.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Channel(e) => e.reason(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
