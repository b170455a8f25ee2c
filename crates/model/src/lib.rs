//! Shared vocabulary of the movli chat client.
//!
//! This crate defines the conversation types and the two seams the
//! session controller talks through: the [`TokenProvider`] that knows who
//! is signed in, and the [`ChatBackend`] that stores history and produces
//! replies.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod backend;
mod error;
mod identity;
mod message;

pub use backend::*;
pub use error::*;
pub use identity::*;
pub use message::*;
