use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use movli_model::{Identity, TokenError, TokenProvider};
use tokio::sync::watch;

/// A token provider whose identity is switched by the test.
///
/// Minted tokens look like `token-<uid>-<n>` where `n` counts every
/// successful mint, so tests can tell that a fresh token was requested.
#[derive(Clone)]
pub struct FakeTokenProvider {
    inner: Arc<Inner>,
}

struct Inner {
    identity: watch::Sender<Option<Identity>>,
    fail_minting: AtomicBool,
    minted: AtomicU64,
}

impl Default for FakeTokenProvider {
    fn default() -> Self {
        Self {
            inner: Arc::new(Inner {
                identity: watch::Sender::new(None),
                fail_minting: AtomicBool::new(false),
                minted: AtomicU64::new(0),
            }),
        }
    }
}

impl FakeTokenProvider {
    /// Creates a provider that starts signed in as `identity`.
    #[inline]
    pub fn signed_in(identity: Identity) -> Self {
        let provider = Self::default();
        provider.sign_in(identity);
        provider
    }

    #[inline]
    pub fn sign_in(&self, identity: Identity) {
        self.inner.identity.send_replace(Some(identity));
    }

    #[inline]
    pub fn sign_out(&self) {
        self.inner.identity.send_replace(None);
    }

    /// Makes every following mint fail (or succeed again).
    #[inline]
    pub fn set_fail_minting(&self, fail: bool) {
        self.inner.fail_minting.store(fail, Ordering::SeqCst);
    }

    #[inline]
    pub fn minted_count(&self) -> u64 {
        self.inner.minted.load(Ordering::SeqCst)
    }

    /// Subscribes to identity changes.
    #[inline]
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.inner.identity.subscribe()
    }
}

#[async_trait]
impl TokenProvider for FakeTokenProvider {
    fn current_identity(&self) -> Option<Identity> {
        self.inner.identity.borrow().clone()
    }

    async fn mint_token(
        &self,
        identity: &Identity,
    ) -> Result<String, TokenError> {
        if self.inner.fail_minting.load(Ordering::SeqCst) {
            return Err(TokenError::new("minting disabled"));
        }
        let n = self.inner.minted.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("token-{}-{n}", identity.uid))
    }
}
