use std::sync::Arc;

use movli_core::{
    ActorDeadError, ChatController, ChatControllerBuilder, Snapshot,
    SubmitOutcome,
};
use movli_http::{ApiConfig, HttpBackend};
use movli_model::{Identity, TokenProvider};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    tokens: Arc<dyn TokenProvider>,
    config: ApiConfig,
    identity_rx: Option<watch::Receiver<Option<Identity>>>,
    on_change: Option<Box<dyn Fn(&Snapshot) + Send + Sync>>,
    on_idle: Option<Box<dyn Fn() + Send + Sync>>,
}

impl SessionBuilder {
    /// Creates a session builder that authenticates through `tokens`.
    pub fn with_token_provider<T: TokenProvider>(tokens: T) -> Self {
        Self {
            tokens: Arc::new(tokens),
            config: ApiConfig::default(),
            identity_rx: None,
            on_change: None,
            on_idle: None,
        }
    }

    /// Sets the backend configuration.
    #[inline]
    pub fn with_config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    /// Follows sign-in and sign-out events from `identity_rx`.
    #[inline]
    pub fn with_identity_updates(
        mut self,
        identity_rx: watch::Receiver<Option<Identity>>,
    ) -> Self {
        self.identity_rx = Some(identity_rx);
        self
    }

    /// Attaches a callback to be invoked after every state change.
    #[inline]
    pub fn on_change(
        mut self,
        on_change: impl Fn(&Snapshot) + Send + Sync + 'static,
    ) -> Self {
        self.on_change = Some(Box::new(on_change));
        self
    }

    /// Attaches a callback to be invoked when the session settles.
    #[inline]
    pub fn on_idle(
        mut self,
        on_idle: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.on_idle = Some(Box::new(on_idle));
        self
    }

    /// Builds a new session. Must be called within a tokio runtime.
    pub fn build(self) -> Session {
        let Self {
            tokens,
            config,
            identity_rx,
            on_change,
            on_idle,
        } = self;

        let identity = tokens.current_identity();
        let backend = HttpBackend::new(config, tokens);
        let mut builder =
            ChatControllerBuilder::with_backend(backend).with_identity(identity);
        if let Some(on_change) = on_change {
            builder = builder.on_change(on_change);
        }
        if let Some(on_idle) = on_idle {
            builder = builder.on_idle(on_idle);
        }
        let controller = builder.build();

        let identity_task =
            identity_rx.map(|rx| controller.observe_identity(rx));
        Session {
            controller,
            identity_task,
        }
    }
}

/// A chat session with the movli assistant, like a chat window that
/// shows the conversation and has an input box.
///
/// The session is basically a wrapper around a [`ChatController`] that
/// talks to the real backend.
pub struct Session {
    controller: ChatController,
    identity_task: Option<JoinHandle<()>>,
}

impl Session {
    /// Sends a message to the session.
    #[inline]
    pub async fn send_message(
        &self,
        message: &str,
    ) -> Result<SubmitOutcome, ActorDeadError> {
        self.controller.send_message(message).await
    }

    /// Returns what the session shows right now.
    #[inline]
    pub async fn snapshot(&self) -> Result<Snapshot, ActorDeadError> {
        self.controller.snapshot().await
    }

    /// Reports an identity change that did not come through the
    /// identity feed.
    #[inline]
    pub fn identity_changed(
        &self,
        identity: Option<Identity>,
    ) -> Result<(), ActorDeadError> {
        self.controller.identity_changed(identity)
    }

    /// Returns the underlying controller.
    #[inline]
    pub fn controller(&self) -> &ChatController {
        &self.controller
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(task) = self.identity_task.take() {
            task.abort();
        }
        self.controller.shutdown();
    }
}
