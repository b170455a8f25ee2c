use std::fmt::{self, Display};

/// The kind of error that occurred while talking to the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A credential could not be minted for the current identity.
    Auth,
    /// The request failed in transit or timed out.
    Network,
    /// The backend answered with a non-success status.
    Rejected,
    /// The response body could not be understood.
    InvalidResponse,
    /// The request body could not be encoded. Nothing was sent.
    InvalidRequest,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Auth => write!(f, "authentication failure"),
            ErrorKind::Network => write!(f, "network failure"),
            ErrorKind::Rejected => write!(f, "rejected by backend"),
            ErrorKind::InvalidResponse => write!(f, "invalid response"),
            ErrorKind::InvalidRequest => write!(f, "invalid request"),
        }
    }
}
