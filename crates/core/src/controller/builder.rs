use movli_model::{ChatBackend, Identity};

use super::{ChatController, Snapshot};
use crate::backend_client::BackendClient;

/// [`ChatController`] builder.
pub struct ChatControllerBuilder {
    pub(super) backend: BackendClient,
    pub(super) identity: Option<Identity>,
    pub(super) on_change: Option<Box<dyn Fn(&Snapshot) + Send + Sync>>,
    pub(super) on_idle: Option<Box<dyn Fn() + Send + Sync>>,
}

impl ChatControllerBuilder {
    /// Creates a new builder with the specified backend.
    #[inline]
    pub fn with_backend<B: ChatBackend + 'static>(backend: B) -> Self {
        Self {
            backend: BackendClient::new(backend),
            identity: None,
            on_change: None,
            on_idle: None,
        }
    }

    /// Sets who is signed in when the controller starts.
    #[inline]
    pub fn with_identity(mut self, identity: Option<Identity>) -> Self {
        self.identity = identity;
        self
    }

    /// Attaches a callback to be invoked after every state change.
    ///
    /// The callback runs on the controller's task and should return
    /// quickly.
    #[inline]
    pub fn on_change(
        mut self,
        on_change: impl Fn(&Snapshot) + Send + Sync + 'static,
    ) -> Self {
        self.on_change = Some(Box::new(on_change));
        self
    }

    /// Attaches a callback to be invoked whenever the controller settles
    /// in [`Idle`](super::SessionStatus::Idle) or
    /// [`LoggedOut`](super::SessionStatus::LoggedOut).
    #[inline]
    pub fn on_idle(
        mut self,
        on_idle: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.on_idle = Some(Box::new(on_idle));
        self
    }

    /// Builds the controller. Must be called within a tokio runtime.
    #[inline]
    pub fn build(self) -> ChatController {
        ChatController::spawn_from_builder(self)
    }
}
