use crate::api;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The service could not be reached, or answered something that could
    /// not be understood
    #[error("transport failure: {0:#}")]
    Transport(#[from] anyhow::Error),

    /// The service answered with a well-formed refusal
    #[error(transparent)]
    Rejected(#[from] api::Error),
}

impl Error {
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    pub fn rejection(&self) -> Option<&api::Error> {
        match self {
            Error::Rejected(err) => Some(err),
            Error::Transport(_) => None,
        }
    }
}
