use std::env;
use std::fmt::{self, Debug};
use std::sync::Arc;

use async_trait::async_trait;
use movli_model::{Identity, TokenError, TokenProvider};
use tokio::sync::watch;

/// A token provider backed by an ID token issued elsewhere, for example
/// one copied out of the web app.
///
/// The identity can be signed out and back in, but the provider never
/// obtains a new token by itself.
#[derive(Clone)]
pub struct StaticTokenProvider {
    inner: Arc<Inner>,
}

struct Inner {
    identity: Identity,
    token: String,
    signed_in: watch::Sender<Option<Identity>>,
}

impl StaticTokenProvider {
    /// Creates a provider that is signed in as `identity`.
    pub fn new<S: Into<String>>(identity: Identity, token: S) -> Self {
        let signed_in = watch::Sender::new(Some(identity.clone()));
        Self {
            inner: Arc::new(Inner {
                identity,
                token: token.into(),
                signed_in,
            }),
        }
    }

    /// Reads `MOVLI_USER_ID` and `MOVLI_ID_TOKEN` from the environment.
    pub fn from_env() -> Option<Self> {
        let uid = env::var("MOVLI_USER_ID").ok()?;
        let token = env::var("MOVLI_ID_TOKEN").ok()?;
        Some(Self::new(Identity::new(uid), token))
    }

    /// Signs the identity back in.
    #[inline]
    pub fn sign_in(&self) {
        self.inner
            .signed_in
            .send_replace(Some(self.inner.identity.clone()));
    }

    /// Signs the identity out. Further calls go out unauthenticated.
    #[inline]
    pub fn sign_out(&self) {
        self.inner.signed_in.send_replace(None);
    }

    /// Subscribes to sign-in and sign-out events.
    #[inline]
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.inner.signed_in.subscribe()
    }
}

impl Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("identity", &self.inner.identity)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    fn current_identity(&self) -> Option<Identity> {
        self.inner.signed_in.borrow().clone()
    }

    async fn mint_token(
        &self,
        identity: &Identity,
    ) -> Result<String, TokenError> {
        if self.current_identity().as_ref() != Some(identity) {
            return Err(TokenError::new("identity is not signed in"));
        }
        Ok(self.inner.token.clone())
    }
}
