//! Core logic of the chat client: the conversation store and the session
//! controller that keeps it in step with the signed-in identity.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod backend_client;
mod controller;
pub mod conversation;

pub use controller::{
    CONNECTION_TROUBLE, ChatController, ChatControllerBuilder,
    HISTORY_UNAVAILABLE, SessionStatus, Snapshot, SubmitOutcome,
};
pub use movli_actor::ActorDeadError;
