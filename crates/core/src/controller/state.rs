use std::fmt::{self, Debug};
use std::mem;

use movli_actor::{Actor, Message as ActorMessage};
use movli_model::{BackendError, Identity, Message};
use tokio::sync::oneshot;
use tracing::Instrument;

use super::{
    CONNECTION_TROUBLE, ControllerState, HISTORY_UNAVAILABLE, SessionStatus,
    Snapshot, SubmitOutcome,
};
use crate::backend_client::{BackendResult, BoxedBackendFuture};

/// Identifies the session a request was issued for.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Ticket {
    epoch: u64,
    identity: Identity,
}

impl ControllerState {
    pub(super) fn snapshot(&self) -> Snapshot {
        Snapshot {
            messages: self.conversation.snapshot(),
            status: self.status,
            pending: self.status.is_pending(),
            identity: self.identity.clone(),
            draft: self.draft.clone(),
        }
    }

    fn identity_changed(
        &mut self,
        identity: Option<Identity>,
        handle: &Actor<Self>,
    ) {
        if self.identity == identity {
            trace!("identity unchanged");
            return;
        }

        self.epoch += 1;
        if self.status.is_pending() {
            debug!(status = ?self.status, "dropping the in-flight request");
        }
        self.identity = identity;
        self.conversation.clear();
        self.draft.clear();

        match self.identity.clone() {
            Some(identity) => {
                info!(uid = %identity.uid, epoch = self.epoch, "signed in");
                self.start_hydration(identity, handle);
            }
            None => {
                info!(epoch = self.epoch, "signed out");
                self.settle(SessionStatus::LoggedOut);
            }
        }
    }

    fn start_hydration(&mut self, identity: Identity, handle: &Actor<Self>) {
        self.status = SessionStatus::HydratingHistory;
        let ticket = self.ticket(identity);
        let fut = self.backend.fetch_history();
        self.spawn_request(fut, handle, move |result| HistoryLoaded {
            ticket,
            result,
        });
        self.notify();
    }

    fn history_loaded(
        &mut self,
        ticket: Ticket,
        result: BackendResult<Vec<Message>>,
    ) {
        if !self.is_current(&ticket, SessionStatus::HydratingHistory) {
            debug!(epoch = ticket.epoch, "dropping stale history");
            return;
        }

        match result {
            Ok(messages) => {
                debug!(count = messages.len(), "history hydrated");
                self.conversation.replace_all(messages);
            }
            Err(err) => {
                warn!(kind = %err.kind(), "cannot load history: {err}");
                self.conversation
                    .replace_all([Message::assistant(HISTORY_UNAVAILABLE)]);
            }
        }
        self.settle(SessionStatus::Idle);
    }

    fn submit(
        &mut self,
        text: Option<String>,
        handle: &Actor<Self>,
    ) -> SubmitOutcome {
        let Some(identity) = self.identity.clone() else {
            return SubmitOutcome::NoIdentity;
        };
        if self.status.is_pending() {
            return SubmitOutcome::Busy;
        }
        let input = text.as_deref().unwrap_or(&self.draft);
        if input.trim().is_empty() {
            return SubmitOutcome::EmptyInput;
        }

        let prompt = match text {
            Some(text) => {
                self.draft.clear();
                text
            }
            None => mem::take(&mut self.draft),
        };

        // The user message stays even if the request fails.
        self.conversation.append(Message::user(prompt.clone()));
        self.status = SessionStatus::Sending;
        let ticket = self.ticket(identity);
        let fut = self.backend.send_prompt(&prompt);
        self.spawn_request(fut, handle, move |result| ReplyReceived {
            ticket,
            result,
        });
        self.notify();
        SubmitOutcome::Accepted
    }

    fn reply_received(
        &mut self,
        ticket: Ticket,
        result: BackendResult<String>,
    ) {
        if !self.is_current(&ticket, SessionStatus::Sending) {
            debug!(epoch = ticket.epoch, "dropping stale reply");
            return;
        }

        let reply = match result {
            Ok(reply) => Message::assistant(reply),
            Err(err) => {
                warn!(kind = %err.kind(), "cannot send prompt: {err}");
                Message::assistant(CONNECTION_TROUBLE)
            }
        };
        self.conversation.append(reply);
        self.settle(SessionStatus::Idle);
    }

    #[inline]
    fn ticket(&self, identity: Identity) -> Ticket {
        Ticket {
            epoch: self.epoch,
            identity,
        }
    }

    /// A result may be applied only while the session it was issued for
    /// is still the current one and still waiting for it.
    #[inline]
    fn is_current(&self, ticket: &Ticket, expected: SessionStatus) -> bool {
        ticket.epoch == self.epoch
            && self.status == expected
            && self.identity.as_ref() == Some(&ticket.identity)
    }

    fn settle(&mut self, status: SessionStatus) {
        self.status = status;
        self.notify();
        if let Some(on_idle) = &self.on_idle {
            on_idle();
        }
    }

    fn notify(&self) {
        if let Some(on_change) = &self.on_change {
            on_change(&self.snapshot());
        }
    }

    fn spawn_request<T, M, F>(
        &self,
        fut: BoxedBackendFuture<T>,
        handle: &Actor<Self>,
        make_msg: F,
    ) where
        T: Send + 'static,
        M: ActorMessage<Self> + 'static,
        F: FnOnce(BackendResult<T>) -> M + Send + 'static,
    {
        let handle = handle.clone();
        tokio::spawn(
            async move {
                let result = fut.await;
                // The controller may have been shut down meanwhile.
                handle.send(make_msg(result)).ok();
            }
            .instrument(debug_span!("request", epoch = self.epoch)),
        );
    }
}

#[derive(Debug)]
pub struct IdentityChanged(pub Option<Identity>);

impl ActorMessage<ControllerState> for IdentityChanged {
    fn handle(
        self,
        state: &mut ControllerState,
        handle: &Actor<ControllerState>,
    ) {
        state.identity_changed(self.0, handle);
    }
}

#[derive(Debug)]
pub struct UpdateDraft(pub String);

impl ActorMessage<ControllerState> for UpdateDraft {
    fn handle(
        self,
        state: &mut ControllerState,
        _handle: &Actor<ControllerState>,
    ) {
        state.draft = self.0;
        state.notify();
    }
}

#[derive(Debug)]
pub struct Submit {
    pub text: Option<String>,
    pub reply_tx: oneshot::Sender<SubmitOutcome>,
}

impl ActorMessage<ControllerState> for Submit {
    fn handle(
        self,
        state: &mut ControllerState,
        handle: &Actor<ControllerState>,
    ) {
        let outcome = state.submit(self.text, handle);
        if outcome != SubmitOutcome::Accepted {
            debug!(?outcome, "submit ignored");
        }
        self.reply_tx.send(outcome).ok();
    }
}

struct HistoryLoaded {
    ticket: Ticket,
    result: BackendResult<Vec<Message>>,
}

impl Debug for HistoryLoaded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryLoaded")
            .field("ticket", &self.ticket)
            .field("count", &self.result.as_ref().map(Vec::len))
            .finish()
    }
}

impl ActorMessage<ControllerState> for HistoryLoaded {
    fn handle(
        self,
        state: &mut ControllerState,
        _handle: &Actor<ControllerState>,
    ) {
        state.history_loaded(self.ticket, self.result);
    }
}

#[derive(Debug)]
struct ReplyReceived {
    ticket: Ticket,
    result: BackendResult<String>,
}

impl ActorMessage<ControllerState> for ReplyReceived {
    fn handle(
        self,
        state: &mut ControllerState,
        _handle: &Actor<ControllerState>,
    ) {
        state.reply_received(self.ticket, self.result);
    }
}
