use std::error::Error;
use std::fmt::{self, Display};

use async_trait::async_trait;

/// An authenticated end-user principal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Identity {
    /// Stable identifier assigned by the identity provider.
    pub uid: String,
    /// Human readable name, if the provider knows one.
    pub display_name: Option<String>,
}

impl Identity {
    /// Creates an identity with only a uid.
    #[inline]
    pub fn new<S: Into<String>>(uid: S) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
        }
    }

    /// Attaches a display name.
    #[inline]
    pub fn with_display_name<S: Into<String>>(mut self, name: S) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Failed to mint a credential.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenError {
    reason: String,
}

impl TokenError {
    /// Creates an error with the given reason.
    #[inline]
    pub fn new<S: Into<String>>(reason: S) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Returns the reason for the error.
    #[inline]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot mint token: {}", self.reason)
    }
}

impl Error for TokenError {}

/// The externally owned source of the current identity and its
/// short-lived bearer credentials.
///
/// Callers must ask for a fresh token on every request and never cache
/// it beyond that request.
#[async_trait]
pub trait TokenProvider: Send + Sync + 'static {
    /// Returns the identity that is signed in right now, if any.
    fn current_identity(&self) -> Option<Identity>;

    /// Mints a bearer token for `identity`.
    async fn mint_token(
        &self,
        identity: &Identity,
    ) -> Result<String, TokenError>;
}
