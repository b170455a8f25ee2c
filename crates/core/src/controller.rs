mod builder;
mod state;
#[cfg(test)]
mod tests;

use movli_actor::{Actor, ActorDeadError};
use movli_model::{Identity, Message};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::backend_client::BackendClient;
use crate::conversation::Conversation;
pub use builder::ChatControllerBuilder;
use state::{IdentityChanged, Submit, UpdateDraft};

/// Shown in place of the history when it could not be fetched.
pub const HISTORY_UNAVAILABLE: &str = "Could not load chat history.";

/// Shown as the reply when a prompt could not be answered.
pub const CONNECTION_TROUBLE: &str =
    "Sorry, I'm having trouble connecting. Please try again later.";

/// The stage a session is in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// Nobody is signed in and the conversation is empty.
    #[default]
    LoggedOut,
    /// Waiting for the signed-in identity's history.
    HydratingHistory,
    /// Signed in and ready to send.
    Idle,
    /// Waiting for the reply to the last prompt.
    Sending,
}

impl SessionStatus {
    /// Returns `true` while a request is outstanding.
    #[inline]
    pub fn is_pending(self) -> bool {
        matches!(self, Self::HydratingHistory | Self::Sending)
    }
}

/// The result of a submit attempt.
///
/// Only [`SubmitOutcome::Accepted`] changes any state or reaches the
/// backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubmitOutcome {
    /// The prompt was appended and sent.
    Accepted,
    /// The input was empty or only whitespace.
    EmptyInput,
    /// Another request is still outstanding.
    Busy,
    /// Nobody is signed in.
    NoIdentity,
}

/// A point-in-time view of a session, for rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    /// The conversation, oldest first.
    pub messages: Vec<Message>,
    /// The current stage.
    pub status: SessionStatus,
    /// Whether a history fetch or a send is outstanding.
    pub pending: bool,
    /// Who the conversation belongs to.
    pub identity: Option<Identity>,
    /// The input that has not been submitted yet.
    pub draft: String,
}

/// Drives one conversation for whoever is signed in.
///
/// The controller is the only writer of its conversation. User intents,
/// identity changes and backend completions are all delivered to it as
/// messages and handled one at a time, so completions can never
/// interleave out of order. At most one request is outstanding at a
/// time, and the result of a request issued for an identity that has
/// since signed out (or been replaced) is dropped when it arrives.
#[derive(Clone)]
pub struct ChatController {
    handle: Actor<ControllerState>,
}

struct ControllerState {
    backend: BackendClient,
    conversation: Conversation,
    status: SessionStatus,
    identity: Option<Identity>,
    /// Bumped on every identity change; requests carry the value they
    /// were issued under.
    epoch: u64,
    draft: String,

    on_change: Option<Box<dyn Fn(&Snapshot) + Send + Sync>>,
    on_idle: Option<Box<dyn Fn() + Send + Sync>>,
}

impl ChatController {
    /// Tells the controller who is signed in now.
    ///
    /// Reporting the same identity again is a no-op.
    #[inline]
    pub fn identity_changed(
        &self,
        identity: Option<Identity>,
    ) -> Result<(), ActorDeadError> {
        self.handle.send(IdentityChanged(identity))
    }

    /// Follows an identity feed, starting with its current value.
    ///
    /// The returned task ends when the feed closes or the controller
    /// stops.
    pub fn observe_identity(
        &self,
        mut identity_rx: watch::Receiver<Option<Identity>>,
    ) -> JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(
            async move {
                let identity = identity_rx.borrow_and_update().clone();
                if controller.identity_changed(identity).is_err() {
                    return;
                }
                while identity_rx.changed().await.is_ok() {
                    let identity = identity_rx.borrow_and_update().clone();
                    if controller.identity_changed(identity).is_err() {
                        break;
                    }
                }
                debug!("stopped observing identity");
            }
            .instrument(debug_span!("observe identity")),
        )
    }

    /// Replaces the pending input.
    #[inline]
    pub fn update_draft<S: Into<String>>(
        &self,
        draft: S,
    ) -> Result<(), ActorDeadError> {
        self.handle.send(UpdateDraft(draft.into()))
    }

    /// Submits the pending input.
    pub async fn submit(&self) -> Result<SubmitOutcome, ActorDeadError> {
        self.submit_inner(None).await
    }

    /// Submits `text` directly, bypassing the pending input.
    ///
    /// The pending input is left alone unless the submission is
    /// accepted, in which case it is cleared.
    pub async fn send_message<S: Into<String>>(
        &self,
        text: S,
    ) -> Result<SubmitOutcome, ActorDeadError> {
        self.submit_inner(Some(text.into())).await
    }

    /// Returns the state after every message queued so far has been
    /// handled.
    #[inline]
    pub async fn snapshot(&self) -> Result<Snapshot, ActorDeadError> {
        self.handle.ask(ControllerState::snapshot).await
    }

    /// Stops the controller. Outstanding requests are left to finish and
    /// their results are dropped.
    #[inline]
    pub fn shutdown(&self) {
        self.handle.try_kill();
    }

    async fn submit_inner(
        &self,
        text: Option<String>,
    ) -> Result<SubmitOutcome, ActorDeadError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.handle.send(Submit { text, reply_tx })?;
        reply_rx.await.map_err(|_| ActorDeadError)
    }
}

impl ChatController {
    fn spawn_from_builder(builder: ChatControllerBuilder) -> Self {
        let ChatControllerBuilder {
            backend,
            identity,
            on_change,
            on_idle,
        } = builder;

        let state = ControllerState {
            backend,
            conversation: Default::default(),
            status: Default::default(),
            identity: None,
            epoch: 0,
            draft: Default::default(),
            on_change,
            on_idle,
        };
        let controller = Self {
            handle: Actor::spawn(state, Some("chat controller")),
        };
        if identity.is_some() {
            // The actor was just spawned and is still alive.
            controller.identity_changed(identity).ok();
        }
        controller
    }
}
