//! A single-writer actor runtime.
//!
//! An actor owns its state exclusively. Every mutation is delivered as a
//! message through the mailbox and handled one at a time on the actor's
//! own task, so handlers never race with each other or with readers.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod error;
mod handle;
mod mailbox;
mod scheduler;

pub use error::ActorDeadError;
pub use handle::Actor;
pub use mailbox::Message;
